//! The Care Programs overview: fetch slots in, view model and commands out.
//!
//! [`ProgramsOverview`] is mounted for one patient. It owns the enrollment and catalog
//! fetchers, a [`Pager`], and the [`CommandHandler`] its commands go to. [`ProgramsOverview::view`]
//! classifies the current state:
//!
//! ```text
//! enrollments slot   ──► Loading ──► Error
//!                                └─► Empty     (0 enrollments)
//!                                └─► Populated (≥1 enrollment, paged)
//! catalog slot       ──► eligible set ──► "fully enrolled" notice / Add enabled
//! ```
//!
//! Paging changes which rows are shown, never the classification. Lists only change by
//! re-fetching; nothing here edits them locally. Table rows, including each row's action,
//! are resolved once whenever the enrollment slot settles.

use crate::client::ProgramsApi;
use crate::constants::{
    ADD_LABEL, CATALOG_SECTION_TITLE, EMPTY_DISPLAY_TEXT, FULLY_ENROLLED_SUBTITLE,
    FULLY_ENROLLED_TITLE, HEADER_TITLE, SEE_ALL_LABEL,
};
use crate::eligibility::{eligible_programs, is_fully_enrolled};
use crate::fetch::{FetchState, Fetcher, Ticket};
use crate::launch::{Command, CommandHandler, FormEntryCommand};
use crate::models::{Enrollment, Program};
use crate::pager::Pager;
use crate::revalidate::{MutationBus, Subscription};
use crate::rows::{table_headers, ProgramRow, TableHeader};
use crate::text::PatientUuid;
use crate::{CoreConfig, ProgramsError, ProgramsResult};
use futures_util::future::BoxFuture;
use serde::Serialize;
use std::sync::Arc;

/// Non-fatal failure of one section of the widget.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct ErrorPanel {
    pub section: String,
    pub message: String,
    /// Upstream HTTP status, when the server answered.
    pub status: Option<u16>,
}

impl ErrorPanel {
    fn new(section: &str, error: &ProgramsError) -> Self {
        Self {
            section: section.into(),
            message: error.to_string(),
            status: error.upstream_status(),
        }
    }
}

/// Inline informational notice.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct Notice {
    pub title: String,
    pub subtitle: String,
}

/// State of the pagination control under the table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct PaginationView {
    pub current_items: usize,
    pub page_number: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
    pub dashboard_link_url: String,
    pub dashboard_link_label: String,
}

/// Everything a renderer needs to draw the widget.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum OverviewView {
    /// No enrollment data yet.
    Loading,
    /// The enrollment fetch failed.
    Error {
        header_title: String,
        error: ErrorPanel,
    },
    /// The patient has no enrollments; the call to action launches the programs workspace.
    Empty {
        header_title: String,
        display_text: String,
        catalog_error: Option<ErrorPanel>,
    },
    Populated {
        header_title: String,
        /// An enrollment re-fetch is in flight; rows show the previous data.
        revalidating: bool,
        add_label: String,
        add_enabled: bool,
        fully_enrolled: Option<Notice>,
        catalog_error: Option<ErrorPanel>,
        headers: Vec<TableHeader>,
        rows: Vec<ProgramRow>,
        pagination: PaginationView,
    },
}

/// Chart path the widget is mounted under when the host does not say otherwise.
pub fn chart_base_path(patient: &PatientUuid) -> String {
    format!("/patient/{patient}/chart")
}

/// Headless Care Programs widget mounted for one patient.
pub struct ProgramsOverview {
    patient: PatientUuid,
    base_path: String,
    cfg: Arc<CoreConfig>,
    enrollments: Fetcher<Vec<Enrollment>>,
    catalog: Fetcher<Vec<Program>>,
    rows: Vec<ProgramRow>,
    pager: Pager,
    handler: Arc<dyn CommandHandler>,
}

impl std::fmt::Debug for ProgramsOverview {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgramsOverview")
            .field("patient", &self.patient)
            .field("base_path", &self.base_path)
            .field("enrollments", &self.enrollments)
            .field("catalog", &self.catalog)
            .field("rows", &self.rows.len())
            .field("pager", &self.pager)
            .finish()
    }
}

impl ProgramsOverview {
    /// Create an overview for `patient`. Nothing is fetched until [`ProgramsOverview::mount`].
    ///
    /// `base_path` is the chart path the widget is shown under; it prefixes the "See all"
    /// dashboard link.
    pub fn new(
        api: Arc<dyn ProgramsApi>,
        cfg: Arc<CoreConfig>,
        patient: PatientUuid,
        base_path: impl Into<String>,
        handler: Arc<dyn CommandHandler>,
    ) -> Self {
        Self {
            enrollments: Fetcher::enrollments(Arc::clone(&api), patient.clone()),
            catalog: Fetcher::available_programs(api),
            rows: Vec::new(),
            pager: Pager::new(cfg.page_size()),
            patient,
            base_path: base_path.into(),
            cfg,
            handler,
        }
    }

    pub fn patient(&self) -> &PatientUuid {
        &self.patient
    }

    /// Fetch enrollments and the catalog concurrently, settling each into its own slot.
    pub async fn mount(&mut self) {
        tokio::join!(self.enrollments.load(), self.catalog.load());
        self.resolve_rows();
    }

    /// Re-fetch enrollments only; the previous list stays visible while this runs.
    pub async fn revalidate(&mut self) {
        self.enrollments.revalidate().await;
        self.resolve_rows();
    }

    /// Start an enrollment re-fetch without waiting for it, so the revalidating state can be
    /// rendered. Finish with [`ProgramsOverview::complete_revalidate`], or
    /// [`ProgramsOverview::abandon_revalidate`] if the future is dropped.
    pub fn begin_revalidate(
        &mut self,
    ) -> (Ticket, BoxFuture<'static, ProgramsResult<Vec<Enrollment>>>) {
        self.enrollments.begin()
    }

    pub fn complete_revalidate(
        &mut self,
        ticket: Ticket,
        result: ProgramsResult<Vec<Enrollment>>,
    ) {
        self.enrollments.complete(ticket, result);
        self.resolve_rows();
    }

    pub fn abandon_revalidate(&mut self, ticket: Ticket) {
        self.enrollments.abandon(ticket);
    }

    pub fn enrollment_state(&self) -> FetchState<'_, Vec<Enrollment>> {
        self.enrollments.state()
    }

    pub fn catalog_state(&self) -> FetchState<'_, Vec<Program>> {
        self.catalog.state()
    }

    /// Listen for enrollment changes of this overview's patient.
    pub fn subscribe(&self, bus: &MutationBus) -> Subscription {
        bus.subscribe(self.patient.clone())
    }

    /// Wait for the next change notification and revalidate once.
    ///
    /// Returns `Ok(false)` once every [`MutationBus`] has been dropped. Call it in a loop and
    /// render between calls. A subscription for another patient is rejected.
    pub async fn on_change(&mut self, subscription: &mut Subscription) -> ProgramsResult<bool> {
        if subscription.patient() != &self.patient {
            return Err(ProgramsError::InvalidInput(format!(
                "subscription is for patient {}, overview is for {}",
                subscription.patient(),
                self.patient
            )));
        }
        if !subscription.changed().await {
            return Ok(false);
        }
        // Coalesce a burst of notifications into one re-fetch.
        subscription.take_pending();
        self.revalidate().await;
        Ok(true)
    }

    /// Rows of the whole enrollment list, resolved when the slot last settled.
    pub fn rows(&self) -> &[ProgramRow] {
        &self.rows
    }

    /// Move to `page` (1-indexed, clamped). Returns the page now shown.
    pub fn go_to_page(&mut self, page: usize) -> usize {
        let total = self.rows.len();
        self.pager.go_to(page, total)
    }

    pub fn current_page(&self) -> usize {
        self.pager.current_page()
    }

    /// Catalog programs the patient has no enrollment for.
    pub fn eligible_programs(&self) -> Vec<Program> {
        eligible_programs(
            self.catalog_data(),
            self.enrollments.resource().data().map(Vec::as_slice),
        )
    }

    pub fn is_fully_enrolled(&self) -> bool {
        is_fully_enrolled(self.catalog_data(), &self.eligible_programs())
    }

    pub fn view(&self) -> OverviewView {
        let resource = self.enrollments.resource();
        if resource.is_loading() {
            return OverviewView::Loading;
        }
        if let Some(error) = resource.error() {
            return OverviewView::Error {
                header_title: HEADER_TITLE.into(),
                error: ErrorPanel::new(HEADER_TITLE, error),
            };
        }

        let catalog_error = self
            .catalog
            .resource()
            .error()
            .map(|e| ErrorPanel::new(CATALOG_SECTION_TITLE, e));

        if self.rows.is_empty() {
            return OverviewView::Empty {
                header_title: HEADER_TITLE.into(),
                display_text: EMPTY_DISPLAY_TEXT.into(),
                catalog_error,
            };
        }

        let fully_enrolled = self.is_fully_enrolled();
        let page = self.pager.page(&self.rows);

        OverviewView::Populated {
            header_title: HEADER_TITLE.into(),
            revalidating: resource.is_validating(),
            add_label: ADD_LABEL.into(),
            add_enabled: !fully_enrolled,
            fully_enrolled: fully_enrolled.then(|| Notice {
                title: FULLY_ENROLLED_TITLE.into(),
                subtitle: FULLY_ENROLLED_SUBTITLE.into(),
            }),
            catalog_error,
            headers: table_headers(),
            rows: page.items.to_vec(),
            pagination: PaginationView {
                current_items: page.items.len(),
                page_number: page.page_number,
                page_size: page.page_size,
                total_items: page.total_items,
                total_pages: page.total_pages,
                dashboard_link_url: self.cfg.dashboard_link(&self.base_path),
                dashboard_link_label: SEE_ALL_LABEL.into(),
            },
        }
    }

    /// "Add" button / empty-state call to action.
    ///
    /// Returns `None` without dispatching when the patient is already in every program.
    pub fn launch_programs_form(&self) -> Option<Command> {
        if self.is_fully_enrolled() {
            tracing::debug!(patient = %self.patient, "add ignored: patient fully enrolled");
            return None;
        }
        let command = Command::LaunchProgramsWorkspace {
            patient_uuid: self.patient.to_string(),
        };
        self.handler.dispatch(command.clone());
        Some(command)
    }

    /// Invoke the action control of the row for `enrollment_uuid`.
    ///
    /// The command is dispatched to the handler and also returned; the overview does not
    /// wait for, or observe, what the host does with it.
    pub fn invoke_row_action(&self, enrollment_uuid: &str) -> ProgramsResult<Command> {
        if self.enrollments.resource().data().is_none() {
            return Err(ProgramsError::NotLoaded);
        }
        let row = self
            .rows
            .iter()
            .find(|row| row.id == enrollment_uuid)
            .ok_or_else(|| ProgramsError::EnrollmentNotFound(enrollment_uuid.to_string()))?;

        let command = Command::FormEntry {
            form: FormEntryCommand {
                action: row.action.kind(),
                form_uuid: row.action.form_uuid().to_string(),
                patient_uuid: self.patient.to_string(),
                encounter_uuid: None,
                form_name: None,
            },
        };
        self.handler.dispatch(command.clone());
        Ok(command)
    }

    /// Rebuild the table rows from the current enrollment data.
    fn resolve_rows(&mut self) {
        self.rows = self
            .enrollments
            .resource()
            .data()
            .map(|enrollments| enrollments.iter().map(ProgramRow::from).collect())
            .unwrap_or_default();
    }

    fn catalog_data(&self) -> Option<&[Program]> {
        self.catalog.resource().data().map(Vec::as_slice)
    }
}
