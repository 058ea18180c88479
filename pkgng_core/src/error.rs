/*============================================================
  Synavera Project: Syn-Pkgng
  Module: pkgng_core::error
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Centralise pkgng-core error types to provide consistent
    diagnostics and exit semantics.

  Security / Safety Notes:
    Error contexts carry pkg stderr verbatim; no credentials
    are ever passed to pkg, so nothing is redacted.

  Dependencies:
    thiserror for ergonomic error definitions.

  Operational Scope:
    Used across modules to propagate recoverable failures and
    consolidate exit codes for the binary entry point.

  Revision History:
    2025-11-12 COD  Established shared error definitions.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Explicit error taxonomy with actionable context
    - No silent failure paths for package mutations
    - Stable exit codes for operational tooling
============================================================*/

use std::io;
use std::process::ExitCode;

use thiserror::Error;

/// Result alias for pkgng-core operations.
pub type Result<T> = std::result::Result<T, PkgngError>;

/// Enumerates high-level error domains surfaced by pkgng-core.
#[derive(Debug, Error)]
pub enum PkgngError {
    #[error("Required command `{command}` not found")]
    CommandMissing { command: String },
    #[error("Command `{command}` failed with status {status}: {stderr}")]
    CommandFailure {
        command: String,
        status: i32,
        stderr: String,
    },
    #[error("Command `{command}` timed out after {seconds}s")]
    Timeout { command: String, seconds: u64 },
    #[error("Configuration: {0}")]
    Config(String),
    #[error("Serialization: {0}")]
    Serialization(String),
    #[error("Filesystem: {0}")]
    Filesystem(String),
    #[error("Runtime: {0}")]
    Runtime(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl PkgngError {
    /// Map error category to a deterministic exit code.
    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.code())
    }

    fn code(&self) -> u8 {
        match self {
            PkgngError::CommandMissing { .. } => 10,
            PkgngError::CommandFailure { .. } => 11,
            PkgngError::Timeout { .. } => 12,
            PkgngError::Config(_) => 20,
            PkgngError::Serialization(_) => 31,
            PkgngError::Filesystem(_) => 40,
            PkgngError::Io(_) => 41,
            PkgngError::Runtime(_) => 50,
        }
    }
}
