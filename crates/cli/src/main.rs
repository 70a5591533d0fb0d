use clap::{Parser, Subcommand};
use programs_core::{
    chart_base_path, CoreConfig, FetchState, Fetcher, LaunchDispatcher, OpenmrsClient,
    PatientUuid, ProgramsApi, ProgramsOverview,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod render;

use render::{render_programs, render_view, TerminalShell};

#[derive(Parser)]
#[command(name = "care-programs")]
#[command(about = "Care Programs widget in the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a patient's program enrollments
    Overview {
        /// Patient uuid
        patient: String,
        /// Page of the enrollment table (1-indexed)
        #[arg(long, default_value_t = 1)]
        page: usize,
        /// Chart path the "See all" link is built from
        #[arg(long)]
        base_path: Option<String>,
    },
    /// List the programs the server reports the patient as eligible for
    Eligible {
        /// Patient uuid
        patient: String,
    },
    /// Trigger the enroll/discontinue action of one enrollment row
    Act {
        /// Patient uuid
        patient: String,
        /// Enrollment uuid of the row
        enrollment: String,
    },
    /// Open the program enrollment workspace
    Add {
        /// Patient uuid
        patient: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("programs_cli=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("Use --help to see available commands.");
        return Ok(());
    };

    let cfg = Arc::new(CoreConfig::from_lookup(|key| std::env::var(key).ok())?);
    let api: Arc<dyn ProgramsApi> = Arc::new(OpenmrsClient::new(Arc::clone(&cfg))?);

    match command {
        Commands::Overview {
            patient,
            page,
            base_path,
        } => {
            let mut overview = mount(&cfg, &api, &patient, base_path).await?;
            overview.go_to_page(page);
            print!("{}", render_view(&overview.view()));
        }
        Commands::Eligible { patient } => {
            let patient = PatientUuid::parse(&patient)?;
            let mut fetcher = Fetcher::eligible_programs(Arc::clone(&api), patient);
            fetcher.load().await;
            match fetcher.state() {
                FetchState::Success(programs) | FetchState::Revalidating(programs) => {
                    print!("{}", render_programs(programs));
                }
                FetchState::Error(err) => anyhow::bail!("could not load eligible programs: {err}"),
                FetchState::Loading => anyhow::bail!("eligible programs did not load"),
            }
        }
        Commands::Act {
            patient,
            enrollment,
        } => {
            let overview = mount(&cfg, &api, &patient, None).await?;
            if let FetchState::Error(err) = overview.enrollment_state() {
                anyhow::bail!("could not load enrollments: {err}");
            }
            overview.invoke_row_action(&enrollment)?;
        }
        Commands::Add { patient } => {
            let overview = mount(&cfg, &api, &patient, None).await?;
            if let FetchState::Error(err) = overview.enrollment_state() {
                anyhow::bail!("could not load enrollments: {err}");
            }
            if overview.launch_programs_form().is_none() {
                println!("Patient is already enrolled in all programs.");
            }
        }
    }

    Ok(())
}

/// Mount an overview whose commands are printed by [`TerminalShell`].
async fn mount(
    cfg: &Arc<CoreConfig>,
    api: &Arc<dyn ProgramsApi>,
    patient: &str,
    base_path: Option<String>,
) -> anyhow::Result<ProgramsOverview> {
    let patient = PatientUuid::parse(patient)?;
    let base_path = base_path.unwrap_or_else(|| chart_base_path(&patient));
    let handler = Arc::new(LaunchDispatcher::new(
        TerminalShell,
        TerminalShell,
        TerminalShell,
        cfg.spa_base(),
    ));
    let mut overview =
        ProgramsOverview::new(Arc::clone(api), Arc::clone(cfg), patient, base_path, handler);
    overview.mount().await;
    Ok(overview)
}
