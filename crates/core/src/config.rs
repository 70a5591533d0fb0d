//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into core services.
//! Nothing in this crate reads process-wide environment variables; binaries hand
//! [`CoreConfig::from_lookup`] a closure over `std::env::var` instead, which keeps tests free
//! of global state.

use crate::constants::{
    DEFAULT_CATALOG_PATH, DEFAULT_ENROLLMENTS_PATH, DEFAULT_PAGE_SIZE, DEFAULT_REST_PATH,
    DEFAULT_SERVER_URL, DEFAULT_SPA_BASE, ELIGIBLE_PROGRAMS_PATH,
};
use crate::{ProgramsError, ProgramsResult};
use std::num::NonZeroUsize;

pub const SERVER_URL_VAR: &str = "OPENMRS_SERVER_URL";
pub const REST_PATH_VAR: &str = "OPENMRS_REST_PATH";
pub const SPA_BASE_VAR: &str = "OPENMRS_SPA_BASE";
pub const USERNAME_VAR: &str = "OPENMRS_USERNAME";
pub const PASSWORD_VAR: &str = "OPENMRS_PASSWORD";
pub const PAGE_SIZE_VAR: &str = "PROGRAMS_PAGE_SIZE";
pub const ENROLLMENTS_PATH_VAR: &str = "PROGRAMS_ENROLLMENTS_PATH";
pub const CATALOG_PATH_VAR: &str = "PROGRAMS_CATALOG_PATH";

/// Basic credentials sent with every REST request.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    server_url: String,
    rest_path: String,
    spa_base: String,
    page_size: NonZeroUsize,
    credentials: Option<Credentials>,
    enrollments_path: String,
    catalog_path: String,
}

impl CoreConfig {
    /// Create a new `CoreConfig` with default endpoint paths.
    ///
    /// # Errors
    ///
    /// Returns [`ProgramsError::Config`] if `server_url` is blank or is not an http(s) URL.
    pub fn new(
        server_url: impl Into<String>,
        spa_base: impl Into<String>,
        page_size: NonZeroUsize,
    ) -> ProgramsResult<Self> {
        let spa_base: String = spa_base.into();
        let server_url: String = server_url.into();
        let server_url = server_url.trim().trim_end_matches('/').to_string();
        if server_url.is_empty() {
            return Err(ProgramsError::Config("server url cannot be empty".into()));
        }
        if !(server_url.starts_with("http://") || server_url.starts_with("https://")) {
            return Err(ProgramsError::Config(format!(
                "server url must start with http:// or https://, got: '{server_url}'"
            )));
        }

        Ok(Self {
            server_url,
            rest_path: DEFAULT_REST_PATH.into(),
            spa_base: normalise_base(&spa_base),
            page_size,
            credentials: None,
            enrollments_path: DEFAULT_ENROLLMENTS_PATH.into(),
            catalog_path: DEFAULT_CATALOG_PATH.into(),
        })
    }

    /// Build a configuration from a key lookup, falling back to defaults for unset keys.
    ///
    /// Blank values are treated as unset. `OPENMRS_USERNAME` without `OPENMRS_PASSWORD` (or
    /// the reverse) is a configuration error.
    pub fn from_lookup<F>(lookup: F) -> ProgramsResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let page_size = page_size_from_env_value(get(PAGE_SIZE_VAR))?;
        let mut cfg = Self::new(
            get(SERVER_URL_VAR).unwrap_or_else(|| DEFAULT_SERVER_URL.into()),
            get(SPA_BASE_VAR).unwrap_or_else(|| DEFAULT_SPA_BASE.into()),
            page_size,
        )?;

        if let Some(rest_path) = get(REST_PATH_VAR) {
            cfg.rest_path = normalise_base(&rest_path);
        }
        if let Some(path) = get(ENROLLMENTS_PATH_VAR) {
            cfg = cfg.with_enrollments_path(path);
        }
        if let Some(path) = get(CATALOG_PATH_VAR) {
            cfg = cfg.with_catalog_path(path);
        }

        match (get(USERNAME_VAR), get(PASSWORD_VAR)) {
            (Some(username), Some(password)) => {
                cfg = cfg.with_credentials(Credentials { username, password });
            }
            (None, None) => {}
            _ => {
                return Err(ProgramsError::Config(format!(
                    "{USERNAME_VAR} and {PASSWORD_VAR} must be set together"
                )))
            }
        }

        Ok(cfg)
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn with_enrollments_path(mut self, path: impl Into<String>) -> Self {
        let path: String = path.into();
        self.enrollments_path = path.trim_start_matches('/').to_string();
        self
    }

    pub fn with_catalog_path(mut self, path: impl Into<String>) -> Self {
        let path: String = path.into();
        self.catalog_path = path.trim_start_matches('/').to_string();
        self
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    pub fn spa_base(&self) -> &str {
        &self.spa_base
    }

    pub fn page_size(&self) -> NonZeroUsize {
        self.page_size
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    /// Absolute URL of a REST resource, e.g. `rest_url("program")`.
    pub fn rest_url(&self, path: &str) -> String {
        format!(
            "{}{}/{}",
            self.server_url,
            self.rest_path,
            path.trim_start_matches('/')
        )
    }

    pub fn enrollments_url(&self) -> String {
        self.rest_url(&self.enrollments_path)
    }

    pub fn catalog_url(&self) -> String {
        self.rest_url(&self.catalog_path)
    }

    pub fn eligible_programs_url(&self) -> String {
        self.rest_url(ELIGIBLE_PROGRAMS_PATH)
    }

    /// Navigation target for a patient's chart.
    pub fn patient_chart_path(&self, patient_uuid: &str) -> String {
        format!("{}/patient/{}/chart", self.spa_base, patient_uuid)
    }

    /// "See all" link for the programs dashboard below `base_path`.
    pub fn dashboard_link(&self, base_path: &str) -> String {
        format!("{}{}/programs", self.spa_base, base_path.trim_end_matches('/'))
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.into(),
            rest_path: DEFAULT_REST_PATH.into(),
            spa_base: DEFAULT_SPA_BASE.into(),
            page_size: default_page_size(),
            credentials: None,
            enrollments_path: DEFAULT_ENROLLMENTS_PATH.into(),
            catalog_path: DEFAULT_CATALOG_PATH.into(),
        }
    }
}

/// Parse the page size from an optional string value.
///
/// If `value` is `None` or blank, returns [`DEFAULT_PAGE_SIZE`].
pub fn page_size_from_env_value(value: Option<String>) -> ProgramsResult<NonZeroUsize> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    match value {
        None => Ok(default_page_size()),
        Some(raw) => raw.parse::<NonZeroUsize>().map_err(|_| {
            ProgramsError::Config(format!(
                "page size must be a positive integer, got: '{raw}'"
            ))
        }),
    }
}

fn default_page_size() -> NonZeroUsize {
    NonZeroUsize::new(DEFAULT_PAGE_SIZE).unwrap_or(NonZeroUsize::MIN)
}

/// Leading slash, no trailing slash. An empty base stays empty.
fn normalise_base(value: &str) -> String {
    let trimmed = value.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}
