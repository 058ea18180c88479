/*============================================================
  Synavera Project: Syn-Pkgng
  Module: pkgng_core::provider
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Define the package-provider capability and implement it
    for FreeBSD pkg (pkgng).

  Security / Safety Notes:
    install/update/uninstall/set_version mutate system package
    state; failures are always propagated to the caller.

  Dependencies:
    async-trait so providers can live behind trait objects.

  Operational Scope:
    Consumed by the registry, the reconciler and the CLI.

  Revision History:
    2025-11-12 COD  Implemented pkgng provider.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Fresh pkg queries on every call, no hidden caches
    - Parse skips logged, execution failures surfaced
============================================================*/

use std::sync::Arc;

use async_trait::async_trait;

use crate::command;
use crate::error::{PkgngError, Result};
use crate::inventory::{parse_info_line, Inventory, VersionList};
use crate::logger::Logger;
use crate::package_info::{DesiredSpec, PackageRecord};
use crate::runner::PkgRunner;

/// Identifier the pkgng provider registers under.
pub const PKGNG: &str = "pkgng";

/// Operations a package provider offers to the reconciliation layer.
#[async_trait]
pub trait PackageProvider: Send + Sync {
    /// Registry identifier.
    fn id(&self) -> &'static str;

    /// Every installed package with its latest available version.
    async fn instances(&self) -> Result<Inventory>;

    /// Installed state of one package by name or origin; `None` when absent.
    ///
    /// Issues a single info query, so `latest_version` is left unset.
    async fn query(&self, identifier: &str) -> Result<Option<PackageRecord>>;

    /// Upgrade target for `origin`, `None` when current or unknown.
    async fn latest(&self, origin: &str) -> Result<Option<String>>;

    async fn install(&self, spec: &DesiredSpec) -> Result<()>;

    /// Upgrade `origin` to the newest version in its repository.
    async fn update(&self, origin: &str) -> Result<()>;

    async fn uninstall(&self, name: &str) -> Result<()>;

    /// Reinstall an installed package at a specific version.
    async fn set_version(&self, name: &str, version: &str) -> Result<()>;
}

/// FreeBSD pkg(8) provider.
pub struct PkgngProvider {
    runner: Arc<dyn PkgRunner>,
    logger: Arc<Logger>,
}

impl PkgngProvider {
    pub fn new(runner: Arc<dyn PkgRunner>, logger: Arc<Logger>) -> Self {
        Self { runner, logger }
    }

    /// Run pkg and return stdout, failing on a non-zero exit.
    async fn pkg(&self, args: Vec<String>) -> Result<String> {
        let description = self.runner.describe(&args);
        self.logger.debug("PKG", &description);
        let output = self.runner.run(&args).await?;
        output.into_stdout(description)
    }

    async fn version_list(&self) -> Result<VersionList> {
        let text = self.pkg(command::version_list()).await?;
        let versions = VersionList::parse(&text);
        if versions.skipped() > 0 {
            self.logger.debug(
                "PARSE",
                format!("Skipped {} unusable pkg version lines", versions.skipped()),
            );
        }
        Ok(versions)
    }

    async fn mutate(&self, code: &str, args: Vec<String>) -> Result<()> {
        let description = self.runner.describe(&args);
        match self.pkg(args).await {
            Ok(_) => {
                self.logger.info(code, format!("Completed `{description}`"));
                Ok(())
            }
            Err(err) => {
                self.logger.error(code, err.to_string());
                Err(err)
            }
        }
    }
}

fn is_no_match(stderr: &str) -> bool {
    let stderr = stderr.trim();
    stderr.is_empty() || stderr.contains("No package(s) matching") || stderr.contains("No match")
}

#[async_trait]
impl PackageProvider for PkgngProvider {
    fn id(&self) -> &'static str {
        PKGNG
    }

    async fn instances(&self) -> Result<Inventory> {
        let info = self.pkg(command::query_all()).await?;
        let versions = self.pkg(command::version_list()).await?;
        let inventory = Inventory::build(&info, &versions);

        if inventory.stats.total() > 0 {
            self.logger.debug(
                "PARSE",
                format!(
                    "Skipped {} info and {} version lines while listing packages",
                    inventory.stats.info_skipped, inventory.stats.version_skipped
                ),
            );
        }
        self.logger.info(
            "INVENTORY",
            format!("Detected {} installed packages", inventory.len()),
        );
        Ok(inventory)
    }

    async fn query(&self, identifier: &str) -> Result<Option<PackageRecord>> {
        let args = command::query_one(identifier);
        let description = self.runner.describe(&args);
        let output = self.runner.run(&args).await?;

        if !output.success() {
            if output.stdout.trim().is_empty() && is_no_match(&output.stderr) {
                self.logger
                    .debug("QUERY", format!("{identifier} is not installed"));
                return Ok(None);
            }
            return Err(PkgngError::CommandFailure {
                command: description,
                status: output.status.unwrap_or(-1),
                stderr: output.stderr.trim().to_string(),
            });
        }

        let mut records: Vec<PackageRecord> =
            output.stdout.lines().filter_map(parse_info_line).collect();
        if records.is_empty() {
            self.logger
                .debug("QUERY", format!("{identifier} is not installed"));
            return Ok(None);
        }
        let index = records
            .iter()
            .position(|r| r.origin == identifier || r.name == identifier)
            .unwrap_or(0);
        Ok(Some(records.swap_remove(index)))
    }

    async fn latest(&self, origin: &str) -> Result<Option<String>> {
        let versions = self.version_list().await?;
        let latest = versions.latest_for(origin).map(str::to_string);
        self.logger.debug(
            "LATEST",
            format!("{origin} → {}", latest.as_deref().unwrap_or("current")),
        );
        Ok(latest)
    }

    async fn install(&self, spec: &DesiredSpec) -> Result<()> {
        let args = command::install(spec)?;
        self.mutate("INSTALL", args).await
    }

    async fn update(&self, origin: &str) -> Result<()> {
        self.mutate("UPDATE", command::upgrade(origin)).await
    }

    async fn uninstall(&self, name: &str) -> Result<()> {
        self.mutate("REMOVE", command::remove(name)).await
    }

    async fn set_version(&self, name: &str, version: &str) -> Result<()> {
        self.mutate("PIN", command::pin_version(name, version)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package_info::Ensure;
    use crate::runner::testing::ScriptedRunner;
    use crate::runner::PkgOutput;

    const INFO: &str = include_str!("../tests/fixtures/pkg.info");
    const VERSIONS: &str = include_str!("../tests/fixtures/pkg.version");
    const QUERY: &str = include_str!("../tests/fixtures/pkg.query");
    const QUERY_ABSENT: &str = include_str!("../tests/fixtures/pkg.query_absent");

    fn fixture_runner() -> ScriptedRunner {
        ScriptedRunner::new()
            .respond(&["query", "-a"], INFO)
            .respond(&["version"], VERSIONS)
    }

    fn provider(runner: &Arc<ScriptedRunner>) -> PkgngProvider {
        PkgngProvider::new(runner.clone(), Arc::new(Logger::quiet()))
    }

    #[tokio::test]
    async fn instances_is_empty_without_packages() {
        let runner = Arc::new(
            ScriptedRunner::new()
                .respond(&["query", "-a"], "")
                .respond(&["version"], ""),
        );
        let inventory = provider(&runner).instances().await.unwrap();
        assert!(inventory.is_empty());
    }

    #[tokio::test]
    async fn instances_runs_info_and_version_queries() {
        let runner = Arc::new(fixture_runner());
        let inventory = provider(&runner).instances().await.unwrap();
        assert_eq!(inventory.len(), 8);
        assert_eq!(
            runner.calls(),
            vec![command::query_all(), command::version_list()]
        );
    }

    #[tokio::test]
    async fn instances_logs_skipped_lines_at_debug() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("pkgng.log");
        let logger = Arc::new(Logger::new(Some(log_path.clone()), false).unwrap());
        let runner = Arc::new(fixture_runner());
        let inventory = PkgngProvider::new(runner.clone(), logger)
            .instances()
            .await
            .unwrap();
        assert_eq!(inventory.stats.version_skipped, 1);

        let log = std::fs::read_to_string(&log_path).unwrap();
        assert!(log.contains("[DEBUG] [PARSE] Skipped 0 info and 1 version lines"));
        assert!(!log.contains("[WARN]"));
    }

    #[tokio::test]
    async fn instances_surfaces_tool_failure() {
        let runner = Arc::new(
            ScriptedRunner::new()
                .respond(&["query", "-a"], INFO)
                .respond_with(
                    &["version"],
                    PkgOutput {
                        status: Some(3),
                        stdout: String::new(),
                        stderr: "pkg: Repository FreeBSD missing. 'pkg update' required".into(),
                    },
                ),
        );
        let err = provider(&runner).instances().await.unwrap_err();
        assert!(matches!(err, PkgngError::CommandFailure { status: 3, .. }));
    }

    #[tokio::test]
    async fn query_returns_none_for_absent_package() {
        let runner = Arc::new(fixture_runner().respond_with(
            &["query", "%n %v %o", "bash"],
            PkgOutput {
                status: Some(1),
                stdout: QUERY_ABSENT.to_string(),
                stderr: String::new(),
            },
        ));
        assert_eq!(provider(&runner).query("bash").await.unwrap(), None);
    }

    #[tokio::test]
    async fn query_returns_installed_record() {
        let runner = Arc::new(fixture_runner().respond(&["query", "%n %v %o", "zsh"], QUERY));
        let zsh = provider(&runner).query("zsh").await.unwrap().unwrap();
        assert_eq!(zsh.origin, "shells/zsh");
        assert_eq!(zsh.installed_version, "5.0.2_1");
        assert_eq!(zsh.latest_version, None);
    }

    #[tokio::test]
    async fn query_issues_one_pkg_call_and_ignores_version_catalogue() {
        let runner = Arc::new(
            ScriptedRunner::new()
                .respond(&["query", "%n %v %o", "zsh"], QUERY)
                .respond_with(
                    &["version"],
                    PkgOutput {
                        status: Some(3),
                        stdout: String::new(),
                        stderr: "pkg: Repository FreeBSD missing. 'pkg update' required".into(),
                    },
                ),
        );
        let zsh = provider(&runner).query("zsh").await.unwrap().unwrap();
        assert_eq!(zsh.origin, "shells/zsh");
        assert_eq!(runner.calls(), vec![command::query_one("zsh")]);
        assert_eq!(runner.calls().len(), 1);
    }

    #[tokio::test]
    async fn query_propagates_unexpected_failures() {
        let runner = Arc::new(fixture_runner().respond_with(
            &["query", "%n %v %o", "zsh"],
            PkgOutput {
                status: Some(74),
                stdout: String::new(),
                stderr: "pkg: Cannot open database".into(),
            },
        ));
        assert!(provider(&runner).query("zsh").await.is_err());
    }

    #[tokio::test]
    async fn latest_is_none_when_current() {
        let runner = Arc::new(fixture_runner());
        let provider = provider(&runner);
        assert_eq!(provider.latest("security/nmap").await.unwrap(), None);
        assert_eq!(
            provider.latest("ftp/curl").await.unwrap().as_deref(),
            Some("7.33.0_2")
        );
    }

    #[tokio::test]
    async fn latest_matches_origin_exactly() {
        let runner = Arc::new(fixture_runner());
        let provider = provider(&runner);
        assert_eq!(
            provider
                .latest("shells/bash-completion")
                .await
                .unwrap()
                .as_deref(),
            Some("2.1_3")
        );
        assert_eq!(provider.latest("shells/bash").await.unwrap(), None);
    }

    #[tokio::test]
    async fn install_passes_version_target() {
        let runner = Arc::new(ScriptedRunner::new());
        let spec = DesiredSpec::new("curl").with_version("7.33.1");
        provider(&runner).install(&spec).await.unwrap();
        assert!(runner.calls()[0].contains(&"curl-7.33.1".to_string()));
    }

    #[tokio::test]
    async fn install_from_origin_with_version() {
        let runner = Arc::new(ScriptedRunner::new());
        let spec = DesiredSpec::new("ftp/curl").with_ensure(Ensure::Version("7.33.1".into()));
        provider(&runner).install(&spec).await.unwrap();
        assert!(runner.calls()[0].contains(&"curl-7.33.1".to_string()));
    }

    #[tokio::test]
    async fn install_passes_repository() {
        let runner = Arc::new(ScriptedRunner::new());
        let spec = DesiredSpec::new("curl").with_source("urn:freebsd:repo:FreeBSD");
        provider(&runner).install(&spec).await.unwrap();
        assert!(runner.calls()[0].contains(&"FreeBSD".to_string()));
    }

    #[tokio::test]
    async fn install_rejects_bad_urn_without_running_pkg() {
        let runner = Arc::new(ScriptedRunner::new());
        let spec = DesiredSpec::new("curl").with_source("urn:openbsd:repo:main");
        assert!(provider(&runner).install(&spec).await.is_err());
        assert!(runner.calls().is_empty());
    }

    #[tokio::test]
    async fn failed_install_is_surfaced() {
        let runner = Arc::new(ScriptedRunner::new().respond_with(
            &["install"],
            PkgOutput {
                status: Some(1),
                stdout: String::new(),
                stderr: "pkg: No packages available to install matching 'curl-9.9'".into(),
            },
        ));
        let spec = DesiredSpec::new("curl").with_version("9.9");
        let err = provider(&runner).install(&spec).await.unwrap_err();
        assert!(matches!(err, PkgngError::CommandFailure { status: 1, .. }));
    }

    #[tokio::test]
    async fn update_upgrades_origin() {
        let runner = Arc::new(ScriptedRunner::new());
        provider(&runner).update("ftp/curl").await.unwrap();
        assert_eq!(runner.calls(), vec![command::upgrade("ftp/curl")]);
    }
}
