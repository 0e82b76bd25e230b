//! sync-push core - configuration and transfer plumbing
//!
//! This crate knows how to push a local tree to a remote, but not
//! when. It provides:
//! - [`SyncConfig`], the immutable startup configuration
//! - [`SyncInvocation`], the resolved transfer command line
//! - [`Transfer`] and [`ProcessTransfer`], which run it
//! - [`LocationStore`], the local-to-remote mapping file
//!
//! # Example
//!
//! ```no_run
//! use syncpush_core::{ProcessTransfer, SyncConfig, SyncInvocation, Transfer};
//!
//! let config = SyncConfig::new("/home/me/site", "me@host:/srv/site").unwrap();
//! let invocation = SyncInvocation::build(&config);
//! let output = ProcessTransfer.execute(&invocation).unwrap();
//! print!("{}", output.output);
//! ```

pub mod config;
pub mod error;
pub mod invocation;
pub mod locations;
pub mod transfer;

pub use config::{SyncConfig, DEFAULT_PROGRAM, DEFAULT_QUIET_PERIOD, EXCLUDE_FILE_NAME};
pub use error::{Result, SyncError, TransferFailure};
pub use invocation::SyncInvocation;
pub use locations::{LocationStore, LOCATIONS_FILE_NAME};
pub use transfer::{ensure_installed, ProcessTransfer, Transfer, TransferOutput};
