/*============================================================
  Synavera Project: Syn-Pkgng
  Module: pkgng_core::command
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Synthesize pkg argument vectors from desired package
    specifications.

  Security / Safety Notes:
    Builds argument lists only; nothing here spawns a process.
    Repository URNs are validated before use.

  Dependencies:
    None beyond std.

  Operational Scope:
    Used by the pkgng provider for install, add, upgrade,
    remove and version-pin invocations.

  Revision History:
    2025-11-12 COD  Authored pkg command synthesizer.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Pure functions for every command line
    - Explicit rejection of malformed repository sources
============================================================*/

use crate::error::{PkgngError, Result};
use crate::inventory::QUERY_FORMAT;
use crate::package_info::{short_name, DesiredSpec};

const REPO_URN_PREFIX: &str = "urn:freebsd:repo:";

fn owned(args: &[&str]) -> Vec<String> {
    args.iter().map(|arg| arg.to_string()).collect()
}

/// `pkg query -a "%n %v %o"`
pub fn query_all() -> Vec<String> {
    owned(&["query", "-a", QUERY_FORMAT])
}

/// `pkg query "%n %v %o" <identifier>`
pub fn query_one(identifier: &str) -> Vec<String> {
    owned(&["query", QUERY_FORMAT, identifier])
}

/// `pkg version -voR`: compare every installed origin against the remote catalogue.
pub fn version_list() -> Vec<String> {
    owned(&["version", "-voR"])
}

/// Extract the repository tag from `urn:freebsd:repo:<tag>`.
pub fn repo_tag_from_urn(urn: &str) -> Result<&str> {
    match urn.strip_prefix(REPO_URN_PREFIX) {
        Some(tag) if !tag.is_empty() && !tag.contains(char::is_whitespace) => Ok(tag),
        _ => Err(PkgngError::Config(format!(
            "Unsupported package source `{urn}`; expected {REPO_URN_PREFIX}<name>"
        ))),
    }
}

/// Package target handed to `pkg install`.
///
/// A requested version turns the target into `<name>-<version>`; pkg does
/// not accept `category/name-version`, so origins lose their category.
pub fn install_target(spec: &DesiredSpec) -> String {
    match spec.requested_version() {
        Some(version) => format!("{}-{version}", spec.short_name()),
        None => spec.name.clone(),
    }
}

/// Arguments installing `spec`, honouring its source.
pub fn install(spec: &DesiredSpec) -> Result<Vec<String>> {
    let target = install_target(spec);
    let args = match spec.source.as_deref() {
        None => vec!["install".into(), "-qy".into(), target],
        Some(source) if source.starts_with("urn:") => {
            let repo = repo_tag_from_urn(source)?;
            vec![
                "install".into(),
                "-qy".into(),
                "-r".into(),
                repo.to_string(),
                target,
            ]
        }
        Some(file) => vec!["add".into(), "-q".into(), file.to_string()],
    };
    Ok(args)
}

/// `pkg upgrade -qy <origin>`
pub fn upgrade(origin: &str) -> Vec<String> {
    owned(&["upgrade", "-qy", origin])
}

/// `pkg remove -qy <name>`
pub fn remove(name: &str) -> Vec<String> {
    owned(&["remove", "-qy", name])
}

/// `pkg install -qfy <name>-<version>`: force reinstall at another version.
pub fn pin_version(name: &str, version: &str) -> Vec<String> {
    vec![
        "install".into(),
        "-qfy".into(),
        format!("{}-{version}", short_name(name)),
    ]
}
