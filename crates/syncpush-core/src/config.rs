//! Startup configuration.
//!
//! Everything a sync needs is decided once, up front, and then only
//! read. The CLI builds a [`SyncConfig`] and hands references to it
//! to the watcher and the transfer layer.

use crate::error::{Result, SyncError};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Transfer program used unless overridden.
pub const DEFAULT_PROGRAM: &str = "rsync";

/// Name of the exclusion-rule file looked up under the local root.
pub const EXCLUDE_FILE_NAME: &str = ".syncignore";

/// Quiet period a burst of changes must settle for before syncing.
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(10);

/// Extra transfer options enabled by `--delete`.
pub const DELETE_OPTIONS: [&str; 2] = ["--delete", "--force"];

/// Immutable configuration for one sync-push session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    local_root: PathBuf,
    remote: String,
    extra_options: Vec<String>,
    quiet_period: Duration,
    program: String,
}

impl SyncConfig {
    /// Creates a configuration mirroring `local_root` to `remote`.
    ///
    /// The local root must be an absolute path to an existing directory,
    /// and the remote must not be blank.
    pub fn new(local_root: impl Into<PathBuf>, remote: impl Into<String>) -> Result<Self> {
        let local_root = local_root.into();
        if !local_root.is_absolute() || !local_root.is_dir() {
            return Err(SyncError::InvalidLocalRoot(local_root));
        }

        let remote = remote.into().trim().to_string();
        if remote.is_empty() {
            return Err(SyncError::MissingRemote(local_root));
        }

        Ok(Self {
            local_root,
            remote,
            extra_options: Vec::new(),
            quiet_period: DEFAULT_QUIET_PERIOD,
            program: DEFAULT_PROGRAM.to_string(),
        })
    }

    /// Deletes extraneous files on the remote side.
    pub fn with_delete(mut self) -> Self {
        for option in DELETE_OPTIONS {
            if !self.extra_options.iter().any(|o| o == option) {
                self.extra_options.push(option.to_string());
            }
        }
        self
    }

    /// Appends options passed verbatim to the transfer program.
    pub fn with_extra_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_options.extend(options.into_iter().map(Into::into));
        self
    }

    pub fn with_quiet_period(mut self, quiet_period: Duration) -> Self {
        self.quiet_period = quiet_period;
        self
    }

    /// Uses a different transfer program (mostly useful for tests).
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn local_root(&self) -> &Path {
        &self.local_root
    }

    pub fn remote(&self) -> &str {
        &self.remote
    }

    pub fn extra_options(&self) -> &[String] {
        &self.extra_options
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet_period
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Where the exclusion-rule file would live for this root.
    pub fn exclude_file(&self) -> PathBuf {
        self.local_root.join(EXCLUDE_FILE_NAME)
    }
}
