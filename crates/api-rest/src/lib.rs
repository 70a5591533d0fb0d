//! # API REST
//!
//! HTTP facade over the Care Programs widget core.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS, status codes)
//!
//! Every request mounts a fresh [`ProgramsOverview`] for the patient in the path, so the
//! responses always reflect the upstream server. Commands produced by the overview are
//! returned to the caller rather than executed; the caller is the shell that opens forms.

#![warn(rust_2018_idioms)]

use axum::{
    extract::{Path as AxumPath, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use programs_core::{
    chart_base_path, Command, CommandLog, CoreConfig, FetchState, Fetcher, OverviewView,
    PatientUuid, Program, ProgramsApi, ProgramsError, ProgramsOverview,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::{IntoParams, OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

/// Shared state for the request handlers.
#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<CoreConfig>,
    pub api: Arc<dyn ProgramsApi>,
}

impl AppState {
    pub fn new(cfg: Arc<CoreConfig>, api: Arc<dyn ProgramsApi>) -> Self {
        Self { cfg, api }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub error: String,
    /// Status returned by the OpenMRS server, when the failure came from upstream.
    pub upstream_status: Option<u16>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EligibleProgramsRes {
    pub programs: Vec<Program>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OverviewQuery {
    /// 1-indexed page of the enrollment table; clamped to the available pages.
    pub page: Option<usize>,
    /// Chart path the widget is shown under; prefixes the "See all" link.
    pub base_path: Option<String>,
}

type ApiError = (StatusCode, Json<ErrorRes>);

fn error_response(err: &ProgramsError) -> ApiError {
    let status = match err {
        ProgramsError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        ProgramsError::EnrollmentNotFound(_) => StatusCode::NOT_FOUND,
        ProgramsError::Transport { .. }
        | ProgramsError::Status { .. }
        | ProgramsError::Decode { .. } => StatusCode::BAD_GATEWAY,
        ProgramsError::Config(_) | ProgramsError::NotLoaded => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        tracing::error!("programs request failed: {err}");
    } else {
        tracing::debug!("programs request rejected: {err}");
    }
    (
        status,
        Json(ErrorRes {
            error: err.to_string(),
            upstream_status: err.upstream_status(),
        }),
    )
}

fn parse_patient(raw: &str) -> Result<PatientUuid, ApiError> {
    PatientUuid::parse(raw).map_err(|e| error_response(&ProgramsError::from(e)))
}

/// Mount an overview for `patient` and wait for both fetches to settle.
async fn mounted_overview(
    state: &AppState,
    patient: PatientUuid,
    base_path: Option<String>,
    log: Arc<CommandLog>,
) -> ProgramsOverview {
    let base_path = base_path.unwrap_or_else(|| chart_base_path(&patient));
    let mut overview = ProgramsOverview::new(
        Arc::clone(&state.api),
        Arc::clone(&state.cfg),
        patient,
        base_path,
        log,
    );
    overview.mount().await;
    overview
}

#[derive(OpenApi)]
#[openapi(
    paths(health, programs_overview, eligible_programs, row_action, add_program),
    components(schemas(
        HealthRes,
        ErrorRes,
        EligibleProgramsRes,
        programs_core::OverviewView,
        programs_core::ErrorPanel,
        programs_core::Notice,
        programs_core::PaginationView,
        programs_core::ProgramRow,
        programs_core::RowAction,
        programs_core::TableHeader,
        programs_core::Program,
        programs_core::Command,
        programs_core::FormEntryCommand,
        programs_core::ActionKind,
    ))
)]
pub struct ApiDoc;

/// Build the REST router with Swagger UI and permissive CORS.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/patients/:patient/programs", get(programs_overview))
        .route("/patients/:patient/programs/eligible", get(eligible_programs))
        .route("/patients/:patient/programs/add", post(add_program))
        .route(
            "/patients/:patient/programs/:enrollment/action",
            post(row_action),
        )
        .merge(
            SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Liveness check.
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthRes {
        ok: true,
        message: "Care Programs REST API is alive".into(),
    })
}

#[utoipa::path(
    get,
    path = "/patients/{patient}/programs",
    params(
        ("patient" = String, Path, description = "Patient uuid"),
        OverviewQuery
    ),
    responses(
        (status = 200, description = "Widget view for the patient", body = OverviewView),
        (status = 400, description = "Blank patient id", body = ErrorRes)
    )
)]
/// Current Care Programs view for a patient.
///
/// Upstream failures are part of the view (`state = "error"`, or a `catalog_error` panel),
/// so this endpoint answers 200 whenever the patient id is valid.
#[axum::debug_handler]
async fn programs_overview(
    State(state): State<AppState>,
    AxumPath(patient): AxumPath<String>,
    Query(query): Query<OverviewQuery>,
) -> Result<Json<OverviewView>, ApiError> {
    let patient = parse_patient(&patient)?;
    let mut overview =
        mounted_overview(&state, patient, query.base_path, Arc::new(CommandLog::new())).await;
    if let Some(page) = query.page {
        overview.go_to_page(page);
    }
    Ok(Json(overview.view()))
}

#[utoipa::path(
    get,
    path = "/patients/{patient}/programs/eligible",
    params(("patient" = String, Path, description = "Patient uuid")),
    responses(
        (status = 200, description = "Programs the server reports as eligible", body = EligibleProgramsRes),
        (status = 400, description = "Blank patient id", body = ErrorRes),
        (status = 502, description = "Upstream failure", body = ErrorRes)
    )
)]
#[axum::debug_handler]
async fn eligible_programs(
    State(state): State<AppState>,
    AxumPath(patient): AxumPath<String>,
) -> Result<Json<EligibleProgramsRes>, ApiError> {
    let patient = parse_patient(&patient)?;
    let mut fetcher = Fetcher::eligible_programs(Arc::clone(&state.api), patient);
    fetcher.load().await;
    match fetcher.state() {
        FetchState::Success(programs) | FetchState::Revalidating(programs) => {
            Ok(Json(EligibleProgramsRes {
                programs: programs.clone(),
            }))
        }
        FetchState::Error(err) => Err(error_response(err)),
        FetchState::Loading => Err(error_response(&ProgramsError::NotLoaded)),
    }
}

#[utoipa::path(
    post,
    path = "/patients/{patient}/programs/{enrollment}/action",
    params(
        ("patient" = String, Path, description = "Patient uuid"),
        ("enrollment" = String, Path, description = "Enrollment uuid of the row")
    ),
    responses(
        (status = 200, description = "Form-entry command for the row", body = Command),
        (status = 404, description = "No such enrollment for the patient", body = ErrorRes),
        (status = 502, description = "Upstream failure", body = ErrorRes)
    )
)]
/// Resolve the action control of one enrollment row.
#[axum::debug_handler]
async fn row_action(
    State(state): State<AppState>,
    AxumPath((patient, enrollment)): AxumPath<(String, String)>,
) -> Result<Json<Command>, ApiError> {
    let patient = parse_patient(&patient)?;
    let overview = mounted_overview(&state, patient, None, Arc::new(CommandLog::new())).await;
    if let FetchState::Error(err) = overview.enrollment_state() {
        return Err(error_response(err));
    }
    overview
        .invoke_row_action(&enrollment)
        .map(Json)
        .map_err(|e| error_response(&e))
}

#[utoipa::path(
    post,
    path = "/patients/{patient}/programs/add",
    params(("patient" = String, Path, description = "Patient uuid")),
    responses(
        (status = 200, description = "Command opening the programs workspace", body = Command),
        (status = 409, description = "Patient is enrolled in every program", body = ErrorRes),
        (status = 502, description = "Upstream failure", body = ErrorRes)
    )
)]
/// "Add" button / empty-state call to action.
#[axum::debug_handler]
async fn add_program(
    State(state): State<AppState>,
    AxumPath(patient): AxumPath<String>,
) -> Result<Json<Command>, ApiError> {
    let patient = parse_patient(&patient)?;
    let overview = mounted_overview(&state, patient, None, Arc::new(CommandLog::new())).await;
    if let FetchState::Error(err) = overview.enrollment_state() {
        return Err(error_response(err));
    }
    match overview.launch_programs_form() {
        Some(command) => Ok(Json(command)),
        None => Err((
            StatusCode::CONFLICT,
            Json(ErrorRes {
                error: "patient is already enrolled in all programs".into(),
                upstream_status: None,
            }),
        )),
    }
}
