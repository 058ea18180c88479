/*============================================================
  Synavera Project: Syn-Pkgng
  Module: pkgng_core::registry
  Etiquette: Synavera Script Etiquette — Rust Profile v1.1.1
  ------------------------------------------------------------
  Purpose:
    Map provider identifiers to concrete package providers.

  Security / Safety Notes:
    Registration happens at construction only; lookups never
    spawn processes.

  Dependencies:
    None beyond std.

  Operational Scope:
    Used by the CLI to resolve `--provider` and by embedding
    hosts that need a provider by name.

  Revision History:
    2025-11-12 COD  Added explicit provider registry.
  ------------------------------------------------------------
  SSE Principles Observed:
    - Explicit wiring in place of dynamic lookup
============================================================*/

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::{PkgngError, Result};
use crate::logger::Logger;
use crate::provider::{PackageProvider, PkgngProvider};
use crate::runner::PkgRunner;

/// Registry of available package providers.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: BTreeMap<&'static str, Arc<dyn PackageProvider>>,
}

impl ProviderRegistry {
    /// Registry holding every built-in provider.
    pub fn new(runner: Arc<dyn PkgRunner>, logger: Arc<Logger>) -> Self {
        let mut registry = Self::default();
        registry.register(Arc::new(PkgngProvider::new(runner, Arc::clone(&logger))));
        logger.debug(
            "REGISTRY",
            format!("Registered providers: {}", registry.ids().join(", ")),
        );
        registry
    }

    /// Register a provider, replacing any previous one with the same id.
    pub fn register(&mut self, provider: Arc<dyn PackageProvider>) {
        self.providers.insert(provider.id(), provider);
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn PackageProvider>> {
        self.providers.get(id).cloned()
    }

    /// Like [`get`](Self::get), but unknown ids are a configuration error.
    pub fn resolve(&self, id: &str) -> Result<Arc<dyn PackageProvider>> {
        self.get(id).ok_or_else(|| {
            PkgngError::Config(format!(
                "Unknown package provider `{id}` (available: {})",
                self.ids().join(", ")
            ))
        })
    }

    pub fn ids(&self) -> Vec<&'static str> {
        self.providers.keys().copied().collect()
    }
}
