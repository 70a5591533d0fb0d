//! Program and enrollment models, plus translation from the OpenMRS wire format.
//!
//! Responsibilities:
//! - Define the domain-level [`Program`] and [`Enrollment`] types used by the rest of the crate
//! - Define lenient wire models for the REST payloads (unknown keys such as `links` are ignored)
//! - Unwrap the three list envelopes the server family uses: a bare array, `{ "data": [...] }`
//!   and `{ "results": [...] }`
//! - Report decode failures with the JSON path of the offending field

use crate::text::NonEmptyText;
use crate::{ProgramsError, ProgramsResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

// ============================================================================
// Public domain-level types
// ============================================================================

/// A care pathway a patient can be enrolled into.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, utoipa::ToSchema)]
pub struct Program {
    pub uuid: String,
    pub display: String,
}

/// A patient's association with a [`Program`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Enrollment {
    pub uuid: String,
    pub display: String,
    pub program_uuid: String,
    pub status: EnrollmentStatus,
    /// Form used to (re-)enroll the patient.
    pub enrollment_form_uuid: String,
    /// Form used to discontinue an active enrollment.
    pub discontinuation_form_uuid: String,
}

/// Enrollment status as reported by the server.
///
/// Only [`EnrollmentStatus::Active`] changes behaviour; every other status is terminal from
/// the widget's point of view.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EnrollmentStatus {
    Active,
    Completed,
    Other(String),
}

impl EnrollmentStatus {
    /// Parse a wire status. Matching is case-insensitive and ignores surrounding whitespace.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("active") {
            EnrollmentStatus::Active
        } else if trimmed.eq_ignore_ascii_case("completed") {
            EnrollmentStatus::Completed
        } else {
            EnrollmentStatus::Other(trimmed.to_string())
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, EnrollmentStatus::Active)
    }

    /// Display label: first letter upper-cased, the rest lower-cased.
    pub fn label(&self) -> String {
        match self {
            EnrollmentStatus::Active => "Active".into(),
            EnrollmentStatus::Completed => "Completed".into(),
            EnrollmentStatus::Other(raw) => capitalise(raw),
        }
    }
}

fn capitalise(raw: &str) -> String {
    let lower = raw.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ============================================================================
// Wire decoding
// ============================================================================

/// Decode a list of programs from a response body.
pub fn decode_programs(url: &str, body: &str) -> ProgramsResult<Vec<Program>> {
    decode_list::<ProgramWire>(url, body)?
        .into_iter()
        .enumerate()
        .map(|(index, wire)| program_from_wire(url, index, wire))
        .collect()
}

/// Decode a list of enrollments from a response body.
pub fn decode_enrollments(url: &str, body: &str) -> ProgramsResult<Vec<Enrollment>> {
    decode_list::<EnrollmentWire>(url, body)?
        .into_iter()
        .enumerate()
        .map(|(index, wire)| enrollment_from_wire(url, index, wire))
        .collect()
}

fn decode_list<T: DeserializeOwned>(url: &str, body: &str) -> ProgramsResult<Vec<T>> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| ProgramsError::Decode {
            url: url.to_string(),
            message: format!("invalid JSON: {e}"),
        })?;

    let (prefix, items) = match value {
        serde_json::Value::Array(items) => ("", serde_json::Value::Array(items)),
        serde_json::Value::Object(mut map) => {
            if let Some(items) = map.remove("data") {
                ("data", items)
            } else if let Some(items) = map.remove("results") {
                ("results", items)
            } else {
                return Err(ProgramsError::Decode {
                    url: url.to_string(),
                    message: "expected an array or an object with `data` or `results`".into(),
                });
            }
        }
        other => {
            return Err(ProgramsError::Decode {
                url: url.to_string(),
                message: format!("expected a list, got {other}"),
            })
        }
    };

    serde_path_to_error::deserialize::<_, Vec<T>>(items).map_err(|err| {
        let path = err.path().to_string();
        let source = err.into_inner();
        let location = match (prefix.is_empty(), path == ".") {
            (true, true) => "<root>".to_string(),
            (true, false) => path,
            (false, true) => prefix.to_string(),
            (false, false) => format!("{prefix}{path}"),
        };
        ProgramsError::Decode {
            url: url.to_string(),
            message: format!("schema mismatch at {location}: {source}"),
        }
    })
}

#[derive(Debug, Deserialize)]
struct ProgramWire {
    uuid: String,
    #[serde(default)]
    display: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EnrollmentWire {
    uuid: String,
    #[serde(default)]
    display: Option<String>,
    program: ProgramRefWire,
    enrollment_status: String,
    enrollment_form_uuid: String,
    discontinuation_form_uuid: String,
}

#[derive(Debug, Deserialize)]
struct ProgramRefWire {
    uuid: String,
}

fn required(url: &str, index: usize, field: &str, value: &str) -> ProgramsResult<String> {
    NonEmptyText::new(value)
        .map(NonEmptyText::into_inner)
        .map_err(|_| ProgramsError::Decode {
            url: url.to_string(),
            message: format!("[{index}].{field} cannot be empty"),
        })
}

fn program_from_wire(url: &str, index: usize, wire: ProgramWire) -> ProgramsResult<Program> {
    let uuid = required(url, index, "uuid", &wire.uuid)?;
    let display = [wire.display, wire.name]
        .into_iter()
        .flatten()
        .find_map(|candidate| NonEmptyText::new(candidate).ok())
        .map(NonEmptyText::into_inner)
        .unwrap_or_else(|| uuid.clone());

    Ok(Program { uuid, display })
}

fn enrollment_from_wire(
    url: &str,
    index: usize,
    wire: EnrollmentWire,
) -> ProgramsResult<Enrollment> {
    let program_uuid = required(url, index, "program.uuid", &wire.program.uuid)?;
    let display = wire
        .display
        .and_then(|d| NonEmptyText::new(d).ok())
        .map(NonEmptyText::into_inner)
        .unwrap_or_else(|| program_uuid.clone());

    Ok(Enrollment {
        uuid: required(url, index, "uuid", &wire.uuid)?,
        display,
        program_uuid,
        status: EnrollmentStatus::parse(&wire.enrollment_status),
        enrollment_form_uuid: required(
            url,
            index,
            "enrollmentFormUuid",
            &wire.enrollment_form_uuid,
        )?,
        discontinuation_form_uuid: required(
            url,
            index,
            "discontinuationFormUuid",
            &wire.discontinuation_form_uuid,
        )?,
    })
}
