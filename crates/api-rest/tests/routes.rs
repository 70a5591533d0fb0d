use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use programs_api_rest::{router, AppState};
use programs_core::{
    CoreConfig, Enrollment, EnrollmentStatus, PatientUuid, Program, ProgramsApi, ProgramsError,
    ProgramsResult,
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

/// Patients known to the fake: "new" has no enrollments, "busy" is enrolled in everything,
/// "partial" has one active and one completed enrollment. Anything else is an upstream 500.
struct FakeApi;

fn program(uuid: &str) -> Program {
    Program {
        uuid: uuid.into(),
        display: uuid.to_uppercase(),
    }
}

fn enrollment(uuid: &str, program_uuid: &str, status: EnrollmentStatus) -> Enrollment {
    Enrollment {
        uuid: uuid.into(),
        display: program_uuid.to_uppercase(),
        program_uuid: program_uuid.into(),
        status,
        enrollment_form_uuid: format!("{program_uuid}-enroll"),
        discontinuation_form_uuid: format!("{program_uuid}-discontinue"),
    }
}

#[async_trait]
impl ProgramsApi for FakeApi {
    async fn enrollments(&self, patient: &PatientUuid) -> ProgramsResult<Vec<Enrollment>> {
        match patient.as_str() {
            "new" => Ok(Vec::new()),
            "busy" => Ok(vec![
                enrollment("e1", "hiv", EnrollmentStatus::Active),
                enrollment("e2", "tb", EnrollmentStatus::Active),
                enrollment("e3", "mch", EnrollmentStatus::Active),
            ]),
            "partial" => Ok(vec![
                enrollment("e1", "hiv", EnrollmentStatus::Active),
                enrollment("e2", "tb", EnrollmentStatus::Completed),
            ]),
            _ => Err(ProgramsError::Status {
                url: "http://emr/ws/rest/v1/kenyaemr/program".into(),
                status: 500,
                body: "boom".into(),
            }),
        }
    }

    async fn available_programs(&self) -> ProgramsResult<Vec<Program>> {
        Ok(vec![program("hiv"), program("tb"), program("mch")])
    }

    async fn eligible_programs(&self, patient: &PatientUuid) -> ProgramsResult<Vec<Program>> {
        match patient.as_str() {
            "new" => Ok(vec![program("hiv"), program("tb"), program("mch")]),
            "unreachable" => Err(ProgramsError::Status {
                url: "http://emr/ws/rest/v1/kenyaemr/eligiblePrograms".into(),
                status: 500,
                body: "boom".into(),
            }),
            _ => Ok(Vec::new()),
        }
    }
}

fn app() -> axum::Router {
    router(AppState::new(
        Arc::new(CoreConfig::default()),
        Arc::new(FakeApi),
    ))
}

async fn call(method: Method, uri: &str) -> (StatusCode, Value) {
    let response = app()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("router response");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    let json = serde_json::from_slice(&bytes).expect("json body");
    (status, json)
}

#[tokio::test]
async fn health_reports_alive() {
    let (status, body) = call(Method::GET, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
}

#[tokio::test]
async fn overview_for_patient_without_enrollments_is_empty() {
    let (status, body) = call(Method::GET, "/patients/new/programs").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "empty");
    assert_eq!(body["display_text"], "Program enrollments");
}

#[tokio::test]
async fn overview_for_enrolled_patient_is_populated() {
    let (status, body) = call(
        Method::GET,
        "/patients/busy/programs?page=2&base_path=/patient/busy/chart",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "populated");
    assert_eq!(body["add_enabled"], false);
    assert_eq!(body["fully_enrolled"]["title"], "Enrolled in all programs");
    assert_eq!(body["rows"][0]["action"]["kind"], "discontinue");
    assert_eq!(body["pagination"]["page_number"], 1);
    assert_eq!(
        body["pagination"]["dashboard_link_url"],
        "/openmrs/spa/patient/busy/chart/programs"
    );
}

#[tokio::test]
async fn upstream_failure_is_an_error_view() {
    let (status, body) = call(Method::GET, "/patients/unknown/programs").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "error");
    assert_eq!(body["error"]["status"], 500);
}

#[tokio::test]
async fn eligible_programs_pass_through() {
    let (status, body) = call(Method::GET, "/patients/new/programs/eligible").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["programs"].as_array().map(Vec::len), Some(3));
}

#[tokio::test]
async fn eligible_programs_upstream_failure_is_bad_gateway() {
    let (status, body) = call(Method::GET, "/patients/unreachable/programs/eligible").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["upstream_status"], 500);
    assert!(body["error"].as_str().expect("error text").contains("boom"));
}

#[tokio::test]
async fn row_action_returns_form_entry_command() {
    let (status, body) = call(Method::POST, "/patients/partial/programs/e2/action").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["command"], "form_entry");
    assert_eq!(body["form"]["action"], "enroll");
    assert_eq!(body["form"]["form_uuid"], "tb-enroll");
    assert_eq!(body["form"]["patient_uuid"], "partial");
}

#[tokio::test]
async fn row_action_for_unknown_enrollment_is_not_found() {
    let (status, body) = call(Method::POST, "/patients/partial/programs/nope/action").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"]
        .as_str()
        .is_some_and(|e| e.contains("nope")));
}

#[tokio::test]
async fn row_action_with_upstream_failure_is_bad_gateway() {
    let (status, body) = call(Method::POST, "/patients/unknown/programs/e1/action").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["upstream_status"], 500);
}

#[tokio::test]
async fn add_launches_programs_workspace() {
    let (status, body) = call(Method::POST, "/patients/partial/programs/add").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["command"], "launch_programs_workspace");
    assert_eq!(body["patient_uuid"], "partial");
}

#[tokio::test]
async fn add_is_refused_when_fully_enrolled() {
    let (status, _) = call(Method::POST, "/patients/busy/programs/add").await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn blank_patient_is_rejected() {
    let (status, _) = call(Method::GET, "/patients/%20/programs").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
