//! Error types for configuration, transfers and the location file.
//!
//! Setup problems stop the program before watching starts. A failed
//! transfer is only reported, and the next change retries it.

use std::path::PathBuf;
use thiserror::Error;

/// Convenience type for functions that can fail while preparing or running a sync.
pub type Result<T> = std::result::Result<T, SyncError>;

/// Things that can go wrong before or during a transfer.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Couldn't read or write a file we own (e.g. the location file).
    #[error("failed to access '{path}': {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The local root must be an absolute path to an existing directory.
    #[error("local root '{0}' is not an absolute path to a directory")]
    InvalidLocalRoot(PathBuf),

    /// No remote destination was configured or entered.
    #[error("no remote destination configured for '{0}'")]
    MissingRemote(PathBuf),

    /// The transfer program is not installed or refused `--version`.
    #[error("{program} is not installed or not runnable: {reason}")]
    ToolUnavailable { program: String, reason: String },

    /// The transfer process could not be launched at all.
    #[error("failed to launch '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The transfer process ran and exited non-zero.
    #[error(transparent)]
    TransferFailed(#[from] TransferFailure),

    /// The task running the transfer died before reporting back.
    #[error("transfer task aborted: {0}")]
    Aborted(String),
}

impl SyncError {
    /// Creates an IO error with the path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::IoError {
            path: path.into(),
            source,
        }
    }
}

/// A transfer that ran to completion but did not succeed.
///
/// Carries the combined stdout/stderr so the operator can see what
/// the external tool complained about.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("transfer exited with {}", describe_exit(.code))]
pub struct TransferFailure {
    /// Exit code, or `None` if the process was killed by a signal.
    pub code: Option<i32>,

    /// Combined output captured from the process.
    pub output: String,
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "no status (terminated by signal)".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_failure_display() {
        let failure = TransferFailure {
            code: Some(23),
            output: "rsync error".into(),
        };
        assert_eq!(failure.to_string(), "transfer exited with status 23");

        let killed = TransferFailure {
            code: None,
            output: String::new(),
        };
        assert!(killed.to_string().contains("signal"));
    }

    #[test]
    fn test_transfer_failure_converts() {
        let err: SyncError = TransferFailure {
            code: Some(1),
            output: String::new(),
        }
        .into();
        assert!(matches!(err, SyncError::TransferFailed(_)));
    }
}
