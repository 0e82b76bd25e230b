//! Running the external transfer program.
//!
//! The program is opaque to us: we hand it the arguments from a
//! [`SyncInvocation`] and only look at its exit status and output.

use crate::error::{Result, SyncError, TransferFailure};
use crate::invocation::SyncInvocation;
use std::process::{Command, Output};
use tracing::{debug, info};

/// What a successful transfer printed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferOutput {
    /// Combined stdout and stderr.
    pub output: String,
}

/// Something that can push the local tree to the remote.
///
/// `execute` blocks until the transfer is over. Callers must not run
/// two transfers for the same invocation at once.
pub trait Transfer: Send + Sync + 'static {
    fn execute(&self, invocation: &SyncInvocation) -> Result<TransferOutput>;
}

/// Runs the invocation's program as a child process.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessTransfer;

impl Transfer for ProcessTransfer {
    fn execute(&self, invocation: &SyncInvocation) -> Result<TransferOutput> {
        debug!("Running {}", invocation.command_line());

        let output = Command::new(invocation.program())
            .args(invocation.args())
            .output()
            .map_err(|source| SyncError::Spawn {
                program: invocation.program().to_string(),
                source,
            })?;

        let combined = combined_output(&output);
        if output.status.success() {
            info!("Synced {} -> {}", invocation.local_root().display(), invocation.remote());
            Ok(TransferOutput { output: combined })
        } else {
            Err(TransferFailure {
                code: output.status.code(),
                output: combined,
            }
            .into())
        }
    }
}

/// Checks that `program` can be started, by asking it for its version.
pub fn ensure_installed(program: &str) -> Result<()> {
    match Command::new(program).arg("--version").output() {
        Ok(output) if output.status.success() => Ok(()),
        Ok(output) => Err(SyncError::ToolUnavailable {
            program: program.to_string(),
            reason: format!("`{} --version` exited with {}", program, output.status),
        }),
        Err(e) => Err(SyncError::ToolUnavailable {
            program: program.to_string(),
            reason: e.to_string(),
        }),
    }
}

fn combined_output(output: &Output) -> String {
    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));
    combined
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::config::SyncConfig;
    use tempfile::tempdir;

    fn invocation_for(program: &str) -> (tempfile::TempDir, SyncInvocation) {
        let dir = tempdir().unwrap();
        let config = SyncConfig::new(dir.path(), "host:/dst")
            .unwrap()
            .with_program(program);
        let invocation = SyncInvocation::build(&config);
        (dir, invocation)
    }

    #[test]
    fn test_zero_exit_is_success() {
        let (_dir, invocation) = invocation_for("true");
        let result = ProcessTransfer.execute(&invocation);
        assert_eq!(result.unwrap(), TransferOutput::default());
    }

    #[test]
    fn test_non_zero_exit_is_transfer_failure() {
        let (_dir, invocation) = invocation_for("false");
        match ProcessTransfer.execute(&invocation) {
            Err(SyncError::TransferFailed(failure)) => assert_eq!(failure.code, Some(1)),
            other => panic!("expected TransferFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_output_is_captured() {
        // `echo` prints its arguments, so the output is the argument list.
        let (_dir, invocation) = invocation_for("echo");
        let output = ProcessTransfer.execute(&invocation).unwrap();
        assert!(output.output.starts_with("-aiz "));
        assert!(output.output.trim_end().ends_with("host:/dst"));
    }

    #[test]
    fn test_missing_program_fails_to_spawn() {
        let (_dir, invocation) = invocation_for("sync-push-no-such-program");
        let result = ProcessTransfer.execute(&invocation);
        assert!(matches!(result, Err(SyncError::Spawn { .. })));
    }

    #[test]
    fn test_ensure_installed() {
        assert!(matches!(
            ensure_installed("sync-push-no-such-program"),
            Err(SyncError::ToolUnavailable { .. })
        ));
    }
}
