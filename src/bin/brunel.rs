//! Runs one reconciliation pass between the collaboration and business
//! stores.
//!
//! Usage:
//!
//! ```text
//! brunel [--mode push|pull|full] [--project-id <GUID>] [--json]
//! ```
//!
//! All connection settings come from the environment; see
//! [`brunel::config`] for the variable names. The run report is printed per
//! record type with a total line, or as a JSON document with `--json`. The
//! process exits non-zero when the run aborts or when any record counted a
//! contained failure.

use brunel::config::SyncSettings;
use brunel::sync::adapters::dataverse::DataverseBusinessStore;
use brunel::sync::adapters::graph::GraphCollaborationStore;
use brunel::sync::adapters::identity::ClientCredentialsProvider;
use brunel::sync::domain::{ParseRunModeError, ProjectId, RunMode, SyncReport};
use brunel::sync::services::SyncOrchestrator;
use clap::Parser;
use mockable::DefaultClock;
use std::env;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::error;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use uuid::Uuid;

/// Boxed error type for the main result.
type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Reconcile collaboration checklists and WBS lists with the business store",
    long_about = None
)]
struct Cli {
    /// Reconciliation direction for this run.
    #[arg(long, default_value = "full", value_parser = parse_mode)]
    mode: RunMode,

    /// Project GUID binding the WBS surface; overrides the environment.
    #[arg(long, value_name = "GUID")]
    project_id: Option<Uuid>,

    /// Emit the run report as JSON instead of human-readable text.
    #[arg(long)]
    json: bool,
}

/// Parses the `--mode` flag through the domain vocabulary.
fn parse_mode(raw: &str) -> Result<RunMode, ParseRunModeError> {
    RunMode::try_from(raw)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("BRUNEL_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "brunel=debug,info"
        } else {
            "brunel=info,warn"
        })
    });

    let format = env::var("BRUNEL_LOG_FORMAT").unwrap_or_else(|_| "compact".to_owned());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry.with(fmt::layer().json().with_ansi(false)).init();
        }
        _ => {
            registry.with(fmt::layer().compact()).init();
        }
    }
}

/// Loads settings, wires the stores, and performs the requested run.
async fn run(cli: &Cli) -> Result<SyncReport, BoxError> {
    let settings = SyncSettings::from_env()?;
    let scope = cli.project_id.map_or(settings.scope(), |project| {
        settings.scope().with_project(ProjectId::from_uuid(project))
    });

    let tokens = Arc::new(ClientCredentialsProvider::new(settings.identity().clone()));
    let collaboration = Arc::new(GraphCollaborationStore::new(
        settings.graph().clone(),
        Arc::clone(&tokens),
    ));
    let business = Arc::new(DataverseBusinessStore::new(
        settings.dataverse().clone(),
        tokens,
    ));
    let orchestrator = SyncOrchestrator::new(collaboration, business, Arc::new(DefaultClock));

    let report = orchestrator.run(cli.mode, &scope).await?;
    print_report(&report, cli.json)?;
    Ok(report)
}

/// Prints the run report in the selected format.
#[expect(clippy::print_stdout, reason = "run summaries are the command's output")]
fn print_report(report: &SyncReport, as_json: bool) -> Result<(), BoxError> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }
    println!("{:>9}: {}", "CHECKLIST", report.checklist());
    println!("{:>9}: {}", "WBS", report.wbs());
    println!("{:>9}: {}", "TOTAL", report.total());
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(&cli).await {
        Ok(report) if report.has_errors() => ExitCode::FAILURE,
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "reconciliation run failed");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_defaults_to_full() {
        let cli = Cli::parse_from(["brunel"]);
        assert_eq!(cli.mode, RunMode::Full);
        assert!(cli.project_id.is_none());
        assert!(!cli.json);
    }

    #[test]
    fn mode_flag_selects_direction() {
        let cli = Cli::parse_from(["brunel", "--mode", "push"]);
        assert_eq!(cli.mode, RunMode::Push);
    }

    #[test]
    fn mode_flag_rejects_unknown_direction() {
        let result = Cli::try_parse_from(["brunel", "--mode", "sideways"]);
        assert!(result.is_err());
    }

    #[test]
    fn project_id_flag_parses_guid() {
        let cli = Cli::parse_from([
            "brunel",
            "--project-id",
            "3e9b1c2a-0b5e-4d6f-9a7c-1d2e3f405162",
        ]);
        assert_eq!(
            cli.project_id,
            Some(uuid::uuid!("3e9b1c2a-0b5e-4d6f-9a7c-1d2e3f405162"))
        );
    }

    #[test]
    fn project_id_flag_rejects_malformed_guid() {
        let result = Cli::try_parse_from(["brunel", "--project-id", "not-a-guid"]);
        assert!(result.is_err());
    }

    #[test]
    fn json_flag_parsed() {
        let cli = Cli::parse_from(["brunel", "--json"]);
        assert!(cli.json);
    }
}
