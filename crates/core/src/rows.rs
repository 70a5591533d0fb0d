//! Table rows for the enrollment list.
//!
//! Each enrollment becomes a fixed record whose action is resolved once, when the row is
//! built: active enrollments offer "Discontinue", everything else offers "Enroll".

use crate::constants::{
    ACTIONS_HEADER, DISCONTINUE_LABEL, ENROLL_LABEL, PROGRAMS_HEADER, STATUS_HEADER,
};
use crate::launch::ActionKind;
use crate::models::Enrollment;
use serde::Serialize;

/// Column header of the enrollment table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct TableHeader {
    pub key: String,
    pub header: String,
}

/// The three columns, in display order.
pub fn table_headers() -> Vec<TableHeader> {
    [
        ("display", PROGRAMS_HEADER),
        ("status", STATUS_HEADER),
        ("actions", ACTIONS_HEADER),
    ]
    .into_iter()
    .map(|(key, header)| TableHeader {
        key: key.into(),
        header: header.into(),
    })
    .collect()
}

/// What a row's action control does.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RowAction {
    Enroll { form_uuid: String },
    Discontinue { form_uuid: String },
}

impl RowAction {
    pub fn for_enrollment(enrollment: &Enrollment) -> Self {
        if enrollment.status.is_active() {
            RowAction::Discontinue {
                form_uuid: enrollment.discontinuation_form_uuid.clone(),
            }
        } else {
            RowAction::Enroll {
                form_uuid: enrollment.enrollment_form_uuid.clone(),
            }
        }
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            RowAction::Enroll { .. } => ActionKind::Enroll,
            RowAction::Discontinue { .. } => ActionKind::Discontinue,
        }
    }

    pub fn form_uuid(&self) -> &str {
        match self {
            RowAction::Enroll { form_uuid } | RowAction::Discontinue { form_uuid } => form_uuid,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RowAction::Enroll { .. } => ENROLL_LABEL,
            RowAction::Discontinue { .. } => DISCONTINUE_LABEL,
        }
    }
}

/// One row of the enrollment table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct ProgramRow {
    /// Enrollment uuid.
    pub id: String,
    pub display: String,
    /// Capitalised status label.
    pub status: String,
    pub action: RowAction,
}

impl From<&Enrollment> for ProgramRow {
    fn from(enrollment: &Enrollment) -> Self {
        Self {
            id: enrollment.uuid.clone(),
            display: enrollment.display.clone(),
            status: enrollment.status.label(),
            action: RowAction::for_enrollment(enrollment),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EnrollmentStatus;

    fn enrollment(status: EnrollmentStatus) -> Enrollment {
        Enrollment {
            uuid: "e1".into(),
            display: "HIV Program".into(),
            program_uuid: "hiv".into(),
            status,
            enrollment_form_uuid: "hiv-enroll".into(),
            discontinuation_form_uuid: "hiv-discontinue".into(),
        }
    }

    #[test]
    fn active_enrollment_offers_discontinue() {
        let row = ProgramRow::from(&enrollment(EnrollmentStatus::Active));
        assert_eq!(
            row.action,
            RowAction::Discontinue {
                form_uuid: "hiv-discontinue".into()
            }
        );
        assert_eq!(row.action.label(), "Discontinue");
        assert_eq!(row.action.kind(), ActionKind::Discontinue);
        assert_eq!(row.status, "Active");
    }

    #[test]
    fn other_statuses_offer_enroll() {
        for status in [
            EnrollmentStatus::Completed,
            EnrollmentStatus::Other("TRANSFERRED".into()),
        ] {
            let row = ProgramRow::from(&enrollment(status));
            assert_eq!(row.action.form_uuid(), "hiv-enroll");
            assert_eq!(row.action.kind(), ActionKind::Enroll);
        }
    }

    #[test]
    fn action_serialises_with_kind_tag() {
        let json = serde_json::to_value(RowAction::Enroll {
            form_uuid: "f".into(),
        })
        .expect("serialise");
        assert_eq!(json, serde_json::json!({"kind": "enroll", "form_uuid": "f"}));
    }

    #[test]
    fn headers_are_in_display_order() {
        let keys: Vec<String> = table_headers().into_iter().map(|h| h.key).collect();
        assert_eq!(keys, ["display", "status", "actions"]);
    }
}
