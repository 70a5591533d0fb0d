use programs_api_rest::{router, AppState};
use programs_core::{CoreConfig, OpenmrsClient};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the Care Programs service
///
/// Serves the REST facade (with OpenAPI/Swagger UI) over the configured OpenMRS server.
///
/// # Environment Variables
/// - `PROGRAMS_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `OPENMRS_SERVER_URL`, `OPENMRS_REST_PATH`, `OPENMRS_SPA_BASE`: upstream locations
/// - `OPENMRS_USERNAME` / `OPENMRS_PASSWORD`: optional basic credentials
/// - `PROGRAMS_PAGE_SIZE`, `PROGRAMS_ENROLLMENTS_PATH`, `PROGRAMS_CATALOG_PATH`
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the configuration is invalid,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("care_programs_run=info".parse()?)
                .add_directive("programs_api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = Arc::new(CoreConfig::from_lookup(|key| std::env::var(key).ok())?);
    let api = Arc::new(OpenmrsClient::new(Arc::clone(&cfg))?);

    let rest_addr =
        std::env::var("PROGRAMS_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    tracing::info!(
        "-- Starting Care Programs REST API on {} (upstream {})",
        rest_addr,
        cfg.server_url()
    );

    let app = router(AppState::new(cfg, api));
    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
