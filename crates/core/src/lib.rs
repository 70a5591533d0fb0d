//! # Programs Core
//!
//! Core logic for the patient-chart "Care Programs" widget.
//!
//! This crate contains everything the widget computes, independent of how it is drawn:
//! - Fetching a patient's program enrollments and the facility's program catalog from an
//!   OpenMRS REST server
//! - Deriving the programs a patient is still eligible for
//! - Paging the enrollment list
//! - Classifying the widget into loading / error / empty / populated views
//! - Dispatching explicit launch commands (form entry, workspace, navigation)
//!
//! **No server or terminal concerns**: the REST facade lives in `api-rest` and the terminal
//! front end in `cli`. Environment variables are never read here; callers resolve a
//! [`CoreConfig`] once at startup.

pub mod client;
pub mod config;
pub mod constants;
pub mod eligibility;
pub mod error;
pub mod fetch;
pub mod launch;
pub mod models;
pub mod overview;
pub mod pager;
pub mod revalidate;
pub mod rows;
pub mod text;

pub use client::{OpenmrsClient, ProgramsApi};
pub use config::{CoreConfig, Credentials};
pub use constants::DEFAULT_PAGE_SIZE;
pub use eligibility::{eligible_programs, is_fully_enrolled};
pub use error::{ProgramsError, ProgramsResult};
pub use fetch::{FetchState, Fetcher, Resource, Ticket};
pub use launch::{
    ActionKind, Command, CommandHandler, CommandLog, FormEntryCommand, FormEntryRequest,
    FormEntrySink, LaunchDispatcher, Navigator, WorkspaceLauncher, WorkspaceOptions,
};
pub use models::{Enrollment, EnrollmentStatus, Program};
pub use overview::{
    chart_base_path, ErrorPanel, Notice, OverviewView, PaginationView, ProgramsOverview,
};
pub use pager::{Page, Pager};
pub use revalidate::{MutationBus, Subscription};
pub use rows::{ProgramRow, RowAction, TableHeader};
pub use text::{NonEmptyText, PatientUuid, TextError};
