//! REST access to program enrollments and the program catalog.
//!
//! [`ProgramsApi`] is the seam the fetchers depend on; [`OpenmrsClient`] is the reqwest-backed
//! implementation used by the binaries. Tests substitute in-memory implementations.

use crate::constants::PATIENT_QUERY_PARAM;
use crate::models::{decode_enrollments, decode_programs, Enrollment, Program};
use crate::text::PatientUuid;
use crate::{CoreConfig, ProgramsError, ProgramsResult};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;

/// Read access to the remote programs service.
#[async_trait]
pub trait ProgramsApi: Send + Sync {
    /// Current enrollments for one patient, in server order.
    async fn enrollments(&self, patient: &PatientUuid) -> ProgramsResult<Vec<Enrollment>>;

    /// Every program offered at the facility.
    async fn available_programs(&self) -> ProgramsResult<Vec<Program>>;

    /// Programs the server reports the patient as eligible for.
    async fn eligible_programs(&self, patient: &PatientUuid) -> ProgramsResult<Vec<Program>>;
}

/// reqwest-backed [`ProgramsApi`] talking to an OpenMRS server.
#[derive(Clone, Debug)]
pub struct OpenmrsClient {
    http: Client,
    cfg: Arc<CoreConfig>,
}

impl OpenmrsClient {
    /// Create a client for the server described by `cfg`.
    ///
    /// No request timeout is configured here; transport timeout policy belongs to whoever
    /// builds the `reqwest::Client` passed to [`OpenmrsClient::with_http`].
    pub fn new(cfg: Arc<CoreConfig>) -> ProgramsResult<Self> {
        let http = Client::builder()
            .build()
            .map_err(|e| ProgramsError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self::with_http(http, cfg))
    }

    pub fn with_http(http: Client, cfg: Arc<CoreConfig>) -> Self {
        Self { http, cfg }
    }

    /// Issue a GET and return the body text of a successful response.
    async fn get_text(&self, url: &str, patient: Option<&PatientUuid>) -> ProgramsResult<String> {
        let mut request = self
            .http
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(patient) = patient {
            request = request.query(&[(PATIENT_QUERY_PARAM, patient.as_str())]);
        }
        if let Some(creds) = self.cfg.credentials() {
            request = request.basic_auth(&creds.username, Some(&creds.password));
        }

        tracing::debug!(url, "requesting programs resource");

        let response = request.send().await.map_err(|e| ProgramsError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| ProgramsError::Transport {
            url: url.to_string(),
            message: format!("failed to read body: {e}"),
        })?;

        if !status.is_success() {
            tracing::warn!(url, status = status.as_u16(), "programs resource request failed");
            return Err(ProgramsError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }
}

#[async_trait]
impl ProgramsApi for OpenmrsClient {
    async fn enrollments(&self, patient: &PatientUuid) -> ProgramsResult<Vec<Enrollment>> {
        let url = self.cfg.enrollments_url();
        let body = self.get_text(&url, Some(patient)).await?;
        let enrollments = decode_enrollments(&url, &body)?;
        tracing::debug!(count = enrollments.len(), %patient, "fetched enrollments");
        Ok(enrollments)
    }

    async fn available_programs(&self) -> ProgramsResult<Vec<Program>> {
        let url = self.cfg.catalog_url();
        let body = self.get_text(&url, None).await?;
        let programs = decode_programs(&url, &body)?;
        tracing::debug!(count = programs.len(), "fetched program catalog");
        Ok(programs)
    }

    async fn eligible_programs(&self, patient: &PatientUuid) -> ProgramsResult<Vec<Program>> {
        let url = self.cfg.eligible_programs_url();
        let body = self.get_text(&url, Some(patient)).await?;
        let programs = decode_programs(&url, &body)?;
        tracing::debug!(count = programs.len(), %patient, "fetched eligible programs");
        Ok(programs)
    }
}
