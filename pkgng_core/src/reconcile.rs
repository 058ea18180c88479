/*============================================================
  Synavera Project: Syn-Pkgng
  Module: pkgng_core::reconcile
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Converge one package towards its desired state by picking
    the provider operation its current state calls for.

  Security / Safety Notes:
    Mutating provider calls are skipped entirely in noop mode.

  Dependencies:
    serde for reporting planned and applied actions.

  Operational Scope:
    Driven by the CLI `ensure` subcommand and by embedding
    hosts holding a provider from the registry.

  Revision History:
    2025-11-12 COD  Authored package state reconciler.
  ------------------------------------------------------------
  SSE Principles Observed:
    - State derived from fresh queries on every cycle
    - Upgrades issued only when an upgrade exists
============================================================*/

use serde::Serialize;

use crate::error::Result;
use crate::logger::Logger;
use crate::package_info::{DesiredSpec, Ensure, PackageRecord};
use crate::provider::PackageProvider;

/// Observed state of a managed package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PackageState {
    Absent,
    Installed { origin: String, version: String },
    Upgradable {
        origin: String,
        installed: String,
        latest: String,
    },
}

impl PackageState {
    fn from_parts(record: Option<&PackageRecord>, latest: Option<String>) -> Self {
        match (record, latest) {
            (None, _) => PackageState::Absent,
            (Some(record), Some(latest)) if latest != record.installed_version => {
                PackageState::Upgradable {
                    origin: record.origin.clone(),
                    installed: record.installed_version.clone(),
                    latest,
                }
            }
            (Some(record), _) => PackageState::Installed {
                origin: record.origin.clone(),
                version: record.installed_version.clone(),
            },
        }
    }

    pub fn installed_version(&self) -> Option<&str> {
        match self {
            PackageState::Absent => None,
            PackageState::Installed { version, .. } => Some(version),
            PackageState::Upgradable { installed, .. } => Some(installed),
        }
    }
}

/// Operation chosen for a package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    Install { name: String },
    Update { origin: String, from: String, to: String },
    Pin { name: String, from: String, to: String },
    Remove { name: String },
    Unchanged,
}

/// Result of one reconciliation pass.
#[derive(Debug, Clone, Serialize)]
pub struct Outcome {
    pub name: String,
    pub ensure: Ensure,
    pub before: PackageState,
    pub action: Action,
    pub applied: bool,
}

/// Query the provider and derive the current state of `identifier`.
pub async fn observe(provider: &dyn PackageProvider, identifier: &str) -> Result<PackageState> {
    let Some(record) = provider.query(identifier).await? else {
        return Ok(PackageState::Absent);
    };
    let latest = provider.latest(&record.origin).await?;
    Ok(PackageState::from_parts(Some(&record), latest))
}

/// Directive in force for `spec`: explicit ensure, else a pinned version, else present.
pub fn effective_ensure(spec: &DesiredSpec) -> Ensure {
    match (&spec.ensure, spec.version.as_deref()) {
        (Some(ensure), _) => ensure.clone(),
        (None, Some(version)) => Ensure::Version(version.to_string()),
        (None, None) => Ensure::Present,
    }
}

/// Pick the action taking `state` to `ensure`.
pub fn plan(spec: &DesiredSpec, ensure: &Ensure, state: &PackageState) -> Action {
    match (ensure, state) {
        (Ensure::Absent, PackageState::Absent) => Action::Unchanged,
        (Ensure::Absent, _) => Action::Remove {
            name: spec.name.clone(),
        },
        (_, PackageState::Absent) => Action::Install {
            name: spec.name.clone(),
        },
        (
            Ensure::Latest,
            PackageState::Upgradable {
                origin,
                installed,
                latest,
            },
        ) => Action::Update {
            origin: origin.clone(),
            from: installed.clone(),
            to: latest.clone(),
        },
        (Ensure::Version(wanted), current) => match current.installed_version() {
            Some(installed) if installed != wanted => Action::Pin {
                name: spec.name.clone(),
                from: installed.to_string(),
                to: wanted.clone(),
            },
            _ => Action::Unchanged,
        },
        (Ensure::Present | Ensure::Latest, _) => Action::Unchanged,
    }
}

/// Observe, plan and (unless `noop`) apply one package's desired state.
pub async fn reconcile(
    provider: &dyn PackageProvider,
    spec: &DesiredSpec,
    noop: bool,
    logger: &Logger,
) -> Result<Outcome> {
    let ensure = effective_ensure(spec);
    let before = observe(provider, &spec.name).await?;
    let action = plan(spec, &ensure, &before);
    logger.info(
        "PLAN",
        format!("{} ensure={ensure} state={before:?} → {action:?}", spec.name),
    );

    let applied = !noop && action != Action::Unchanged;
    if applied {
        apply(provider, spec, &action).await?;
    }

    Ok(Outcome {
        name: spec.name.clone(),
        ensure,
        before,
        action,
        applied,
    })
}

async fn apply(provider: &dyn PackageProvider, spec: &DesiredSpec, action: &Action) -> Result<()> {
    match action {
        Action::Install { .. } => provider.install(spec).await,
        Action::Update { origin, .. } => provider.update(origin).await,
        Action::Pin { name, to, .. } => provider.set_version(name, to).await,
        Action::Remove { name } => provider.uninstall(name).await,
        Action::Unchanged => Ok(()),
    }
}
