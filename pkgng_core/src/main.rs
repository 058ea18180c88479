/*============================================================
  Synavera Project: Syn-Pkgng
  Module: pkgng_core::main
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Entry point for pkgng-core. Lists installed packages,
    reports available upgrades, and converges individual
    packages to a declared state through FreeBSD pkg.

  Security / Safety Notes:
    install/update/remove/ensure mutate system packages and
    usually require root; query commands are read-only.

  Dependencies:
    clap for CLI parsing, chrono for session stamps,
    serde_json for reports.

  Operational Scope:
    Invoked by operators or configuration tooling that needs
    a pkg provider without embedding the library.

  Revision History:
    2025-11-12 COD  Authored pkgng-core runtime.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Result-first error handling with deterministic exits
    - Structured logging following Synavera cadence
    - Configurable execution via CLI and config file
============================================================*/

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use chrono::Utc;
use clap::{ArgAction, Parser, Subcommand};
use serde::Serialize;

use pkgng_core::config::PkgngConfig;
use pkgng_core::logger::Logger;
use pkgng_core::reconcile::reconcile;
use pkgng_core::{
    DesiredSpec, Ensure, PackageProvider, PkgCommand, PkgngError, ProviderRegistry, Result,
};

/// Command-line arguments for pkgng-core.
#[derive(Debug, Parser)]
#[command(
    name = "pkgng-core",
    version,
    author = "Synavera Systems",
    about = "FreeBSD pkg provider: inventory, upgrades and package convergence"
)]
struct Cli {
    /// Override configuration file path.
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Explicit log file path.
    #[arg(long, value_name = "PATH", global = true)]
    log: Option<PathBuf>,
    /// Provider to use instead of the configured one.
    #[arg(long, value_name = "ID", global = true)]
    provider: Option<String>,
    /// Enable verbose logging to stderr.
    #[arg(long, action = ArgAction::SetTrue, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Operation,
}

#[derive(Debug, Subcommand)]
enum Operation {
    /// List every installed package with its latest available version.
    Instances,
    /// Show one installed package by name or origin.
    Query { identifier: String },
    /// Print the upgrade target for an origin, if any.
    Latest { origin: String },
    /// Install a package, optionally pinned to a version or repository.
    Install {
        name: String,
        #[arg(long)]
        version: Option<String>,
        /// `urn:freebsd:repo:<Repo>` or a package file.
        #[arg(long)]
        source: Option<String>,
    },
    /// Upgrade an origin to its newest version.
    Update { origin: String },
    /// Remove an installed package.
    Remove { name: String },
    /// Converge a package to present, absent, latest or a specific version.
    Ensure {
        name: String,
        #[arg(long = "ensure", value_name = "STATE", default_value = "present")]
        state: Ensure,
        #[arg(long)]
        source: Option<String>,
        /// Report the planned action without changing anything.
        #[arg(long, action = ArgAction::SetTrue)]
        noop: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("[pkgng-core] {}", err);
            err.exit_code()
        }
    }
}

async fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = PkgngConfig::load_from_optional_path(cli.config.as_deref())?;

    let session_stamp = Utc::now().format("%Y-%m-%d_%H-%M-%S").to_string();
    let log_path = cli
        .log
        .clone()
        .unwrap_or_else(|| config.log_dir().join(format!("pkgng_{session_stamp}.log")));
    let logger = Arc::new(Logger::new(Some(log_path), cli.verbose)?);
    logger.info(
        "INIT",
        format!("pkgng-core starting with {}", config.pkg.path.display()),
    );

    let runner = Arc::new(PkgCommand::new(config.pkg.path.clone(), config.timeout()));
    let registry = ProviderRegistry::new(runner, Arc::clone(&logger));
    let provider_id = cli.provider.as_deref().unwrap_or(&config.pkg.provider);
    let provider = registry.resolve(provider_id)?;

    let result = dispatch(cli.command, provider.as_ref(), &logger).await;

    if let Err(err) = &result {
        logger.error("FAIL", err.to_string());
    }
    logger.info("COMPLETE", "pkgng-core finished.");
    logger.finalize()?;
    result.map(|()| ExitCode::SUCCESS)
}

async fn dispatch(
    operation: Operation,
    provider: &dyn PackageProvider,
    logger: &Logger,
) -> Result<()> {
    match operation {
        Operation::Instances => {
            let inventory = provider.instances().await?;
            emit(&inventory)
        }
        Operation::Query { identifier } => {
            let record = provider.query(&identifier).await?;
            if record.is_none() {
                logger.warn("PKG404", format!("{identifier} is not installed"));
            }
            emit(&record)
        }
        Operation::Latest { origin } => {
            let latest = provider.latest(&origin).await?;
            emit(&latest)
        }
        Operation::Install {
            name,
            version,
            source,
        } => {
            let spec = DesiredSpec {
                name,
                version,
                ensure: None,
                source,
            };
            provider.install(&spec).await
        }
        Operation::Update { origin } => provider.update(&origin).await,
        Operation::Remove { name } => provider.uninstall(&name).await,
        Operation::Ensure {
            name,
            state,
            source,
            noop,
        } => {
            let spec = DesiredSpec {
                name,
                version: None,
                ensure: Some(state),
                source,
            };
            let outcome = reconcile(provider, &spec, noop, logger).await?;
            emit(&outcome)
        }
    }
}

fn emit<T: Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|err| PkgngError::Serialization(format!("Failed to render report: {err}")))?;
    println!("{rendered}");
    Ok(())
}
