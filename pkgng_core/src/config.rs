/*============================================================
  Synavera Project: Syn-Pkgng
  Module: pkgng_core::config
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Load operator configuration: where pkg lives, how long a
    pkg invocation may run, and where session logs go.

  Security / Safety Notes:
    Reads a TOML file from operator-controlled paths only.

  Dependencies:
    serde + toml for parsing, dirs for default locations.

  Operational Scope:
    Resolved once at startup and passed explicitly to the
    runner and logger.

  Revision History:
    2025-11-12 COD  Introduced pkgng-core configuration.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Sensible defaults when no file is present
    - Configuration errors surfaced with file context
============================================================*/

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{PkgngError, Result};

const APP_DIR: &str = "syn-pkgng";
const DEFAULT_PKG_PATH: &str = "/usr/local/sbin/pkg";

/// Top-level configuration document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PkgngConfig {
    pub pkg: PkgConfig,
    pub logging: LoggingConfig,
}

/// `[pkg]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PkgConfig {
    pub path: PathBuf,
    /// Upper bound for a single pkg invocation; unset means wait forever.
    pub timeout_secs: Option<u64>,
    /// Provider identifier looked up in the registry.
    pub provider: String,
}

impl Default for PkgConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_PKG_PATH),
            timeout_secs: None,
            provider: "pkgng".to_string(),
        }
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub dir: Option<PathBuf>,
}

impl PkgngConfig {
    /// Load from `path`, or from the default location; a missing file yields defaults.
    pub fn load_from_optional_path(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(explicit) => Self::load(explicit),
            None => match default_config_path() {
                Some(candidate) if candidate.exists() => Self::load(&candidate),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|err| {
            PkgngError::Config(format!("Failed to read {}: {err}", path.display()))
        })?;
        Self::parse(&raw)
            .map_err(|err| PkgngError::Config(format!("{}: {err}", path.display())))
    }

    pub fn parse(raw: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.pkg
            .timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    pub fn log_dir(&self) -> PathBuf {
        if let Some(dir) = &self.logging.dir {
            return dir.clone();
        }
        dirs::state_dir()
            .or_else(dirs::data_local_dir)
            .unwrap_or_else(std::env::temp_dir)
            .join(APP_DIR)
            .join("logs")
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.toml"))
}
