//! CLI command implementations.

use crate::WatchArgs;
use colored::Colorize;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use syncpush_core::{
    ensure_installed, LocationStore, ProcessTransfer, SyncConfig, SyncError, DEFAULT_PROGRAM,
    LOCATIONS_FILE_NAME,
};
use syncpush_watcher::{FileWatcher, SyncReport, WatchLoop};
use tokio::sync::mpsc::unbounded_channel;
use tracing::warn;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

const REMOTE_PROMPT: &str = "Remote Location (eg. user@host:/path/to/remote/dir): ";

/// Watch the current directory and sync it on every change.
pub async fn watch(args: &WatchArgs) -> Result<()> {
    ensure_installed(DEFAULT_PROGRAM)?;

    let local = std::env::current_dir()?;
    let remote = resolve_remote(&local)?;
    let config = build_config(&local, &remote, args)?;

    let (observer, events) = FileWatcher::new()?;
    let watch = WatchLoop::new(&config, observer, events, ProcessTransfer)?;

    println!(
        "{} Watching {} -> {}",
        "✓".green(),
        local.display(),
        remote.cyan()
    );
    if let Some(exclude_file) = watch.invocation().exclude_file() {
        println!(
            "  Exclusion rules from {}",
            exclude_file.display().to_string().dimmed()
        );
    }
    println!("  Press {} to stop", "Ctrl+C".cyan());

    let (reports_tx, mut reports_rx) = unbounded_channel();
    let printer = tokio::spawn(async move {
        while let Some(report) = reports_rx.recv().await {
            print_report(&report);
        }
    });

    watch
        .with_reports(reports_tx)
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await;

    printer.await?;
    Ok(())
}

/// Print the remote for the current directory, or every mapping.
pub fn remote_show(all: bool) -> Result<()> {
    let store = LocationStore::open(locations_path()?)?;

    if all {
        let mut any = false;
        for entry in store.entries() {
            println!("  {}", entry);
            any = true;
        }
        if !any {
            println!("No remotes configured in {}", store.path().display());
        }
        return Ok(());
    }

    let local = std::env::current_dir()?;
    match store.lookup(&local) {
        Some(remote) => println!("{} -> {}", local.display(), remote.cyan()),
        None => println!("No remote set for {}", local.display()),
    }
    Ok(())
}

/// Map the current directory to `remote`.
pub fn remote_set(remote: &str) -> Result<()> {
    let local = std::env::current_dir()?;
    let remote = remote.trim();
    if remote.is_empty() {
        return Err(SyncError::MissingRemote(local).into());
    }

    let mut store = LocationStore::open(locations_path()?)?;
    store.set(&local, remote);
    store.save()?;

    println!("{} {} -> {}", "✓".green(), local.display(), remote.cyan());
    Ok(())
}

/// Forget the current directory's mapping.
pub fn remote_remove() -> Result<()> {
    let local = std::env::current_dir()?;
    let mut store = LocationStore::open(locations_path()?)?;

    if store.remove(&local) {
        store.save()?;
        println!("{} Removed remote for {}", "✓".green(), local.display());
    } else {
        println!("No remote set for {}", local.display());
    }
    Ok(())
}

fn locations_path() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or("could not determine the home directory")?;
    Ok(home.join(LOCATIONS_FILE_NAME))
}

/// Looks up the remote for `local`, asking for one if none is stored yet.
fn resolve_remote(local: &Path) -> Result<String> {
    let mut store = LocationStore::open(locations_path()?)?;
    if let Some(remote) = store.lookup(local) {
        return Ok(remote.to_string());
    }

    let stdin = io::stdin();
    let remote = prompt_remote(&mut stdin.lock(), &mut io::stdout())?;
    if remote.is_empty() {
        return Err(SyncError::MissingRemote(local.to_path_buf()).into());
    }

    store.set(local, &remote);
    store.save()?;
    println!(
        "{} Saved remote to {}",
        "✓".green(),
        store.path().display().to_string().dimmed()
    );
    Ok(remote)
}

fn prompt_remote(input: &mut impl BufRead, output: &mut impl Write) -> Result<String> {
    write!(output, "{}", REMOTE_PROMPT)?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn build_config(local: &Path, remote: &str, args: &WatchArgs) -> Result<SyncConfig> {
    let mut config = SyncConfig::new(local, remote)?
        .with_quiet_period(Duration::from_millis(args.debounce_ms));
    if args.delete {
        config = config.with_delete();
    }
    Ok(config.with_extra_options(args.rsync_args.iter().cloned()))
}

fn print_report(report: &SyncReport) {
    let cause = report.cause.to_string();
    match &report.outcome {
        Ok(transfer) => {
            print_output(&transfer.output);
            println!("{} Synced {}", "✓".green(), cause.dimmed());
        }
        Err(SyncError::TransferFailed(failure)) => {
            print_output(&failure.output);
            eprintln!("{} Sync failed: {} {}", "✗".red(), failure, cause.dimmed());
            eprintln!("  Will retry on the next change");
        }
        Err(e) => {
            eprintln!("{} Sync failed: {} {}", "✗".red(), e, cause.dimmed());
        }
    }
}

fn print_output(output: &str) {
    let output = output.trim_end();
    if !output.is_empty() {
        println!("{}", output);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::tempdir;

    fn args(delete: bool, rsync_args: &[&str]) -> WatchArgs {
        WatchArgs {
            delete,
            debounce_ms: 50,
            rsync_args: rsync_args.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_prompt_remote_trims_answer() {
        let mut input = Cursor::new("me@host:/srv/site\n");
        let mut output = Vec::new();

        let remote = prompt_remote(&mut input, &mut output).unwrap();

        assert_eq!(remote, "me@host:/srv/site");
        assert_eq!(String::from_utf8(output).unwrap(), REMOTE_PROMPT);
    }

    #[test]
    fn test_prompt_remote_empty_input() {
        let mut input = Cursor::new("");
        let remote = prompt_remote(&mut input, &mut Vec::new()).unwrap();
        assert!(remote.is_empty());
    }

    #[test]
    fn test_build_config() {
        let dir = tempdir().unwrap();
        let config = build_config(dir.path(), "host:/dst", &args(true, &["--dry-run"])).unwrap();

        assert_eq!(config.quiet_period(), Duration::from_millis(50));
        assert_eq!(config.extra_options(), ["--delete", "--force", "--dry-run"]);
        assert_eq!(config.program(), DEFAULT_PROGRAM);
    }

    #[test]
    fn test_build_config_rejects_blank_remote() {
        let dir = tempdir().unwrap();
        assert!(build_config(dir.path(), " ", &args(false, &[])).is_err());
    }
}
