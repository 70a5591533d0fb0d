//! Constants used throughout the programs core crate.
//!
//! Endpoint paths, workspace identifiers and the default (English) labels shown by the
//! widget. Translation is left to whoever renders the view.

/// Number of enrollments shown per page.
pub const DEFAULT_PAGE_SIZE: usize = 5;

/// Default OpenMRS server root when none is configured.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8080/openmrs";

/// REST prefix below the server root.
pub const DEFAULT_REST_PATH: &str = "/ws/rest/v1";

/// Base path of the single-page application, used for navigation targets and links.
pub const DEFAULT_SPA_BASE: &str = "/openmrs/spa";

/// Enrollment listing for one patient (queried with `patientUuid`).
pub const DEFAULT_ENROLLMENTS_PATH: &str = "kenyaemr/program";

/// Facility program catalog.
pub const DEFAULT_CATALOG_PATH: &str = "program?v=custom:(uuid,display,name)";

/// Programs the server itself considers a patient eligible for.
pub const ELIGIBLE_PROGRAMS_PATH: &str = "kenyaemr/eligiblePrograms";

/// Query parameter carrying the patient identifier.
pub const PATIENT_QUERY_PARAM: &str = "patientUuid";

/// Workspace opened by the "Add" button and the empty-state call to action.
pub const PROGRAMS_FORM_WORKSPACE: &str = "programs-form-workspace";

/// Workspace hosting the enrollment / discontinuation forms.
pub const FORM_ENTRY_WORKSPACE: &str = "patient-form-entry-workspace";

pub const HEADER_TITLE: &str = "Care Programs";
pub const EMPTY_DISPLAY_TEXT: &str = "Program enrollments";
pub const SEE_ALL_LABEL: &str = "See all";
pub const ADD_LABEL: &str = "Add";
pub const FULLY_ENROLLED_TITLE: &str = "Enrolled in all programs";
pub const FULLY_ENROLLED_SUBTITLE: &str =
    "There are no more programs left to enroll this patient in";
pub const CATALOG_SECTION_TITLE: &str = "Available programs";

pub const PROGRAMS_HEADER: &str = "Programs";
pub const STATUS_HEADER: &str = "Status";
pub const ACTIONS_HEADER: &str = "Actions";

pub const ENROLL_LABEL: &str = "Enroll";
pub const DISCONTINUE_LABEL: &str = "Discontinue";
