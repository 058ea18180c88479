/*============================================================
  Synavera Project: Syn-Pkgng
  Module: pkgng_core
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Library surface of pkgng-core: FreeBSD pkg inventory
    parsing, command synthesis and package reconciliation.

  Security / Safety Notes:
    Mutating operations execute pkg with the caller's
    privileges; nothing escalates on its own.

  Dependencies:
    See individual modules.

  Operational Scope:
    Linked by the `pkgng-core` binary and by hosts embedding
    the provider registry.

  Revision History:
    2025-11-12 COD  Split library from binary entry point.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Narrow public API re-exported from one place
============================================================*/

pub mod command;
pub mod config;
pub mod error;
pub mod inventory;
pub mod logger;
pub mod package_info;
pub mod provider;
pub mod reconcile;
pub mod registry;
pub mod runner;

pub use error::{PkgngError, Result};
pub use inventory::{Inventory, ParseStats};
pub use package_info::{DesiredSpec, Ensure, PackageRecord};
pub use provider::{PackageProvider, PkgngProvider};
pub use registry::ProviderRegistry;
pub use runner::{PkgCommand, PkgOutput, PkgRunner};
