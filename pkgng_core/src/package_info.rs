/*============================================================
  Synavera Project: Syn-Pkgng
  Module: pkgng_core::package_info
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Shared structures describing installed package records
    and the desired state requested by a caller.

  Security / Safety Notes:
    Pure data container; no I/O performed in this module.

  Dependencies:
    serde for CLI output; PkgngError for rejected directives.

  Operational Scope:
    Used across the inventory parser, command synthesizer and
    reconciler to pass package identity and version data.

  Revision History:
    2025-11-12 COD  Introduced PackageRecord and DesiredSpec.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Clear data contracts between modules
    - Serializable structures for CLI output
============================================================*/

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::PkgngError;

/// A package currently installed on the system, as seen by pkg.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageRecord {
    pub name: String,
    pub origin: String,
    pub installed_version: String,
    pub latest_version: Option<String>,
}

impl PackageRecord {
    pub fn new(name: String, origin: String, installed_version: String) -> Self {
        Self {
            name,
            origin,
            installed_version,
            latest_version: None,
        }
    }
}

/// Desired-state directive for a managed package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Ensure {
    Present,
    Absent,
    Latest,
    Version(String),
}

impl FromStr for Ensure {
    type Err = PkgngError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ok(match value.trim() {
            "" => {
                return Err(PkgngError::Config(
                    "ensure must be present, absent, latest or a version".into(),
                ))
            }
            "present" | "installed" => Ensure::Present,
            "absent" | "purged" => Ensure::Absent,
            "latest" => Ensure::Latest,
            other => Ensure::Version(other.to_string()),
        })
    }
}

impl fmt::Display for Ensure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ensure::Present => f.write_str("present"),
            Ensure::Absent => f.write_str("absent"),
            Ensure::Latest => f.write_str("latest"),
            Ensure::Version(version) => f.write_str(version),
        }
    }
}

/// What the caller wants a package to look like after reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DesiredSpec {
    /// Short name (`curl`) or origin (`ftp/curl`).
    pub name: String,
    pub version: Option<String>,
    pub ensure: Option<Ensure>,
    /// `urn:freebsd:repo:<Repo>` or a path/URL to a package file.
    pub source: Option<String>,
}

impl DesiredSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_ensure(mut self, ensure: Ensure) -> Self {
        self.ensure = Some(ensure);
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Version to pin, from either `version` or `ensure = <version>`.
    pub fn requested_version(&self) -> Option<&str> {
        if let Some(version) = self.version.as_deref() {
            return Some(version);
        }
        match &self.ensure {
            Some(Ensure::Version(version)) => Some(version.as_str()),
            _ => None,
        }
    }

    /// Short package name with any `category/` prefix dropped.
    pub fn short_name(&self) -> &str {
        short_name(&self.name)
    }
}

/// Drop the category from an origin; plain names pass through.
pub fn short_name(identifier: &str) -> &str {
    identifier
        .split_once('/')
        .map(|(_, name)| name)
        .unwrap_or(identifier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_parses_keywords_and_versions() {
        assert_eq!("latest".parse::<Ensure>().unwrap(), Ensure::Latest);
        assert_eq!("installed".parse::<Ensure>().unwrap(), Ensure::Present);
        assert_eq!("absent".parse::<Ensure>().unwrap(), Ensure::Absent);
        assert_eq!(
            "7.33.1".parse::<Ensure>().unwrap(),
            Ensure::Version("7.33.1".into())
        );
    }

    #[test]
    fn blank_ensure_is_rejected() {
        assert!(matches!("".parse::<Ensure>(), Err(PkgngError::Config(_))));
        assert!(matches!("   ".parse::<Ensure>(), Err(PkgngError::Config(_))));
    }

    #[test]
    fn requested_version_prefers_explicit_version() {
        let spec = DesiredSpec::new("curl")
            .with_ensure(Ensure::Version("7.30.0".into()))
            .with_version("7.33.1");
        assert_eq!(spec.requested_version(), Some("7.33.1"));

        let spec = DesiredSpec::new("curl").with_ensure(Ensure::Version("7.30.0".into()));
        assert_eq!(spec.requested_version(), Some("7.30.0"));

        let spec = DesiredSpec::new("curl").with_ensure(Ensure::Latest);
        assert_eq!(spec.requested_version(), None);
    }

    #[test]
    fn short_name_strips_category() {
        assert_eq!(short_name("ftp/curl"), "curl");
        assert_eq!(short_name("curl"), "curl");
    }
}
