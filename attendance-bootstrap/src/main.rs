use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing::instrument::WithSubscriber;

use attendance_bootstrap::desk::{issue_credential, run_scanner_desk};
use attendance_bootstrap::telemetry::{bootstrap_dispatch, init_tracing};
use attendance_bootstrap::{run_server, shutdown_signal, AppContext};
use attendance_infrastructure::StaticIdentityProvider;

#[derive(Parser, Debug)]
#[command(name = "attendance-tracker")]
#[command(about = "Event attendance tracker", long_about = None)]
struct Args {
    /// Path to config file
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API (default)
    Serve,
    /// Issue a credential and save it as PNG
    Issue {
        #[arg(long)]
        name: String,
        #[arg(long = "registration-number")]
        registration_number: String,
    },
    /// Scan credentials from an image file or directory and mark attendance
    Scan {
        source: PathBuf,
        #[arg(long)]
        volunteer_name: Option<String>,
        #[arg(long)]
        volunteer_email: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = AppContext::load_config(args.config.as_deref())
        .with_subscriber(bootstrap_dispatch())
        .await?;
    let _log_guard = init_tracing(config.log_dir.as_deref());
    let context = AppContext::new(config)?;
    let state = context.state;

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => run_server(state).await,
        Command::Issue {
            name,
            registration_number,
        } => {
            let location =
                issue_credential(&state, &name, &registration_number, &state.shutdown).await?;
            info!("credential saved to {}", location);
            Ok(())
        }
        Command::Scan {
            source,
            volunteer_name,
            volunteer_email,
        } => {
            let identity = StaticIdentityProvider::new(
                volunteer_name.or(context.config.volunteer_name.clone()),
                volunteer_email.or(context.config.volunteer_email.clone()),
            );
            let cancel: CancellationToken = state.shutdown.clone();
            tokio::spawn({
                let cancel = cancel.clone();
                async move {
                    shutdown_signal().await;
                    cancel.cancel();
                }
            });
            let summary = run_scanner_desk(&state, source, identity, &cancel).await?;
            info!(
                "scanner desk closed: scanned={}, marked={}, failed={}",
                summary.scanned, summary.marked, summary.failed
            );
            Ok(())
        }
    }
}
