use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cmd;

#[derive(Parser)]
#[command(name = "phasewatch")]
#[command(version, about = "Local workflow phase manager")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true)]
    pub project_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the dashboard and HTTP API
    Serve {
        /// Port to serve on
        #[arg(short, long, default_value = "3100")]
        port: u16,

        /// Do not open the browser after the server starts
        #[arg(long)]
        no_open: bool,

        /// Enable dev mode (bind all interfaces, permissive CORS)
        #[arg(long)]
        dev: bool,
    },
    /// Show the derived phase state
    Status,
    /// Show the phase history log
    History,
    /// Append a manual status-change entry to the history
    Intervene {
        /// Phase id the entry applies to
        #[arg(long)]
        phase: String,

        /// Status to record (complete, reject, or free-form)
        #[arg(long)]
        status: String,

        #[arg(long)]
        comment: Option<String>,

        /// Phase to re-open (only meaningful with --status reject)
        #[arg(long)]
        target: Option<String>,
    },
    /// Erase the phase history
    Reset {
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let project_dir = match cli.project_dir.clone() {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };

    match &cli.command {
        Commands::Serve { port, no_open, dev } => {
            cmd::cmd_serve(&project_dir, *port, !*no_open, *dev).await?;
        }
        Commands::Status => cmd::cmd_status(&project_dir)?,
        Commands::History => cmd::cmd_history(&project_dir)?,
        Commands::Intervene {
            phase,
            status,
            comment,
            target,
        } => {
            cmd::cmd_intervene(
                &project_dir,
                phase,
                status,
                comment.as_deref(),
                target.as_deref(),
            )?;
        }
        Commands::Reset { force } => cmd::cmd_reset(&project_dir, *force)?,
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "phasewatch=debug" } else { "phasewatch=warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
