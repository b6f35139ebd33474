use super::rules::{InterceptionTable, RewriteAction, RewriteRule};
use crate::core::{HotswapError, Result};
use crate::mode::{ClassLoader, Mode, ModeRegistry};
use log::{debug, error};

use super::rules::{MethodSig, WrapEntry};

/// A synthesized replacement entry point: keeps the original public
/// signature, calls the internal alias, and routes the result through a
/// wrapping entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delegation {
    pub method: String,
    pub calls_alias: String,
    pub wrap_entry: WrapEntry,
}

/// A candidate class representation handed over by the host pipeline for
/// in-place modification at prepare time.
#[derive(Debug, Clone)]
pub struct TargetClass {
    pub name: String,
    pub methods: Vec<MethodSig>,
    /// Replacement methods synthesized by a rewrite
    pub delegations: Vec<Delegation>,
    /// Whether the class currently forbids subclassing/wrapping
    pub sealed: bool,
}

impl TargetClass {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            methods: Vec::new(),
            delegations: Vec::new(),
            sealed: false,
        }
    }

    pub fn with_method(mut self, method: MethodSig) -> Self {
        self.methods.push(method);
        self
    }

    pub fn sealed(mut self) -> Self {
        self.sealed = true;
        self
    }

    pub fn method(&self, name: &str) -> Option<&MethodSig> {
        self.methods.iter().find(|m| m.name == name)
    }
}

/// The pluggable code-rewriting backend. The host supplies the real one; this
/// crate only describes the transformations it wants.
pub trait RewriteBackend: Send + Sync {
    /// Apply one rule to one class, in place.
    ///
    /// Fails with [`HotswapError::Instrumentation`] when the targeted entry
    /// point is absent or its signature does not match; the class must be
    /// left unmodified in that case.
    fn apply(&self, class: &mut TargetClass, rule: &RewriteRule) -> Result<()>;
}

/// Apply every matching rule of the table to a class the host is preparing.
///
/// Runs once per class, at prepare time. An instrumentation failure is fatal
/// to that one transformation only: it is logged and skipped, the remaining
/// rules still run, and the host keeps going. A factory type that could not
/// be instrumented simply loses hot-reload.
pub fn instrument_class(
    table: &InterceptionTable,
    backend: &dyn RewriteBackend,
    class: &mut TargetClass,
) -> usize {
    let class_name = class.name.clone();
    let mut applied = 0;
    for rule in table.rules_for(&class_name) {
        if apply_rule(backend, class, rule) {
            applied += 1;
        }
    }
    applied
}

/// Loader-aware installation: like [`instrument_class`], but consults the
/// mode cache first. The two construction paths are mutually exclusive, so
/// when the loader classifies as managed the standalone construction hook is
/// skipped; otherwise a managed process would hand out standalone proxies
/// that no refresh ever rebuilds.
pub fn install(
    table: &InterceptionTable,
    backend: &dyn RewriteBackend,
    modes: &ModeRegistry,
    loader: &dyn ClassLoader,
    class: &mut TargetClass,
) -> usize {
    let mode = modes.classify(loader);
    let class_name = class.name.clone();
    let mut applied = 0;
    for rule in table.rules_for(&class_name) {
        if mode == Mode::Managed
            && matches!(
                rule.action,
                RewriteAction::RenameAndDelegate {
                    wrap_entry: WrapEntry::Standalone,
                    ..
                }
            )
        {
            debug!(
                "managed path active on loader {}, skipping standalone hook for {}",
                loader.id(),
                class_name
            );
            continue;
        }
        if apply_rule(backend, class, rule) {
            applied += 1;
        }
    }
    applied
}

fn apply_rule(backend: &dyn RewriteBackend, class: &mut TargetClass, rule: &RewriteRule) -> bool {
    match backend.apply(class, rule) {
        Ok(()) => {
            debug!("applied {:?} to {}", rule.action, class.name);
            true
        }
        Err(HotswapError::Instrumentation(reason)) => {
            error!(
                "could not instrument {}: {} (hot-reload disabled for this type)",
                class.name, reason
            );
            false
        }
        Err(other) => {
            error!("rewrite backend failed on {}: {}", class.name, other);
            false
        }
    }
}
