//! Building the transfer command line.

use crate::config::SyncConfig;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Archive mode, itemized changes, compressed transfer.
pub const BASE_FLAGS: &str = "-aiz";

/// Flag telling the transfer program to read exclusion rules from a file.
pub const EXCLUDE_FROM_FLAG: &str = "--exclude-from";

/// One fully resolved transfer command.
///
/// Built once per session and reused for every trigger. Nothing in
/// here changes after [`SyncInvocation::build`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncInvocation {
    program: String,
    local_root: PathBuf,
    remote: String,
    extra_options: Vec<String>,
    exclude_file: Option<PathBuf>,
}

impl SyncInvocation {
    /// Resolves the invocation for `config`.
    ///
    /// The exclusion file is picked up only if it exists right now;
    /// creating it later does not change an already built invocation.
    pub fn build(config: &SyncConfig) -> Self {
        let candidate = config.exclude_file();
        let exclude_file = candidate.is_file().then_some(candidate);

        match &exclude_file {
            Some(path) => debug!("Using exclusion rules from {}", path.display()),
            None => debug!("No exclusion file under {}", config.local_root().display()),
        }

        Self {
            program: config.program().to_string(),
            local_root: config.local_root().to_path_buf(),
            remote: config.remote().to_string(),
            extra_options: config.extra_options().to_vec(),
            exclude_file,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn local_root(&self) -> &Path {
        &self.local_root
    }

    pub fn remote(&self) -> &str {
        &self.remote
    }

    pub fn exclude_file(&self) -> Option<&Path> {
        self.exclude_file.as_deref()
    }

    /// Arguments passed to the program, in order:
    /// base flags, local root, remote, extra options, exclusion flag.
    pub fn args(&self) -> Vec<OsString> {
        let mut args = Vec::with_capacity(5 + self.extra_options.len());
        args.push(OsString::from(BASE_FLAGS));
        args.push(self.local_root.clone().into_os_string());
        args.push(OsString::from(&self.remote));
        args.extend(self.extra_options.iter().map(OsString::from));
        if let Some(exclude_file) = &self.exclude_file {
            args.push(OsString::from(EXCLUDE_FROM_FLAG));
            args.push(exclude_file.clone().into_os_string());
        }
        args
    }

    /// Human readable command line, for logs.
    pub fn command_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in self.args() {
            line.push(' ');
            line.push_str(&arg.to_string_lossy());
        }
        line
    }
}
