//! sync-push CLI
//!
//! Watches the current directory and pushes it to its remote with
//! rsync whenever something changes. The remote for each directory is
//! remembered in `~/locations.ini`.

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use syncpush_core::DEFAULT_QUIET_PERIOD;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "sync-push")]
#[command(author = "sync-push Contributors")]
#[command(version)]
#[command(about = "Watch and sync files from the current directory to a remote directory", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(flatten)]
    watch: WatchArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Options for watching (the default action).
#[derive(Args, Debug, Clone)]
pub struct WatchArgs {
    /// Delete extraneous files from destination dirs
    #[arg(long)]
    pub delete: bool,

    /// How long changes must settle before syncing, in milliseconds
    #[arg(long, value_name = "MS", default_value_t = DEFAULT_QUIET_PERIOD.as_millis() as u64)]
    pub debounce_ms: u64,

    /// Extra argument passed to rsync verbatim (repeatable)
    #[arg(long = "rsync-arg", value_name = "ARG", allow_hyphen_values = true)]
    pub rsync_args: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show or change the remote mapped to the current directory
    Remote {
        #[command(subcommand)]
        action: RemoteAction,
    },
}

#[derive(Subcommand)]
enum RemoteAction {
    /// Print the remote for the current directory
    Show {
        /// Print every known mapping
        #[arg(short, long)]
        all: bool,
    },

    /// Map the current directory to a remote
    Set {
        /// Remote location (eg. user@host:/path/to/remote/dir)
        remote: String,
    },

    /// Forget the current directory's remote
    Remove,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();

    let result = match cli.command {
        None => commands::watch(&cli.watch).await,
        Some(Commands::Remote { action }) => match action {
            RemoteAction::Show { all } => commands::remote_show(all),
            RemoteAction::Set { remote } => commands::remote_set(&remote),
            RemoteAction::Remove => commands::remote_remove(),
        },
    };

    if let Err(e) = result {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}
