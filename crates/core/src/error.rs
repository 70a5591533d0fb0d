use crate::text::TextError;

/// Errors produced by the programs core.
///
/// Transport failures are flattened to strings so the error can be stored in a fetch slot,
/// cloned into every view derived from it, and compared in tests.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProgramsError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },
    #[error("request to {url} returned status {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },
    #[error("failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },
    #[error("enrollment not found: {0}")]
    EnrollmentNotFound(String),
    #[error("enrollments have not been loaded")]
    NotLoaded,
}

impl ProgramsError {
    /// HTTP status reported by the upstream server, if the failure carried one.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            ProgramsError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<TextError> for ProgramsError {
    fn from(e: TextError) -> Self {
        ProgramsError::InvalidInput(e.to_string())
    }
}

pub type ProgramsResult<T> = std::result::Result<T, ProgramsError>;
