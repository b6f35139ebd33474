//! Per-loader construction mode detection.
//!
//! A loader is classified exactly once, by probing whether the managed-path
//! provider type resolves through it. The result is cached and never
//! re-evaluated, even if the loader's resolvable types change afterwards.
//! The managed factory type is constructed at most once per loader in normal
//! operation, so a later re-probe could only produce a stale answer anyway.

use log::warn;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, PoisonError};
use thiserror::Error;
use uuid::Uuid;

/// Which of the two mutually exclusive construction paths is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Container-style construction through the managed provider
    Managed,
    /// Direct construction from a standalone configuration
    Standalone,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Managed => write!(f, "managed"),
            Mode::Standalone => write!(f, "standalone"),
        }
    }
}

/// Stable identity of one class loader instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoaderId(Uuid);

impl LoaderId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for LoaderId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LoaderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Outcome of probing a loader for a type
#[derive(Error, Debug)]
pub enum ResolveError {
    /// The type is not visible through this loader. Expected and non-fatal:
    /// this is the standalone-mode signal.
    #[error("type not found")]
    NotFound,

    /// The probe itself failed for some other reason
    #[error("resolution failed: {0}")]
    Failed(String),
}

/// Host-side view of a class loader: the coordinator only ever asks it to
/// resolve a type by name.
pub trait ClassLoader: Send + Sync {
    fn id(&self) -> LoaderId;

    fn resolve_type(&self, type_name: &str) -> std::result::Result<(), ResolveError>;
}

/// Keyed mode cache: loader identity -> classification.
///
/// Initialized lazily per loader, never invalidated.
pub struct ModeRegistry {
    /// Managed-path marker type probed through each loader
    marker_type: String,
    modes: Mutex<HashMap<LoaderId, Mode>>,
}

impl ModeRegistry {
    pub fn new(marker_type: impl Into<String>) -> Self {
        Self {
            marker_type: marker_type.into(),
            modes: Mutex::new(HashMap::new()),
        }
    }

    /// Classify a loader, probing it on first sight and serving the cached
    /// answer forever after.
    pub fn classify(&self, loader: &dyn ClassLoader) -> Mode {
        let mut modes = self.modes.lock().unwrap_or_else(PoisonError::into_inner);
        *modes
            .entry(loader.id())
            .or_insert_with(|| self.probe(loader))
    }

    /// Return the cached classification, if the loader was seen before
    pub fn cached(&self, id: LoaderId) -> Option<Mode> {
        let modes = self.modes.lock().unwrap_or_else(PoisonError::into_inner);
        modes.get(&id).copied()
    }

    fn probe(&self, loader: &dyn ClassLoader) -> Mode {
        match loader.resolve_type(&self.marker_type) {
            Ok(()) => Mode::Managed,
            Err(ResolveError::NotFound) => Mode::Standalone,
            Err(ResolveError::Failed(reason)) => {
                // Anything but a clean "not found" is unexpected, but must not
                // take the host down. Fall back to standalone.
                warn!(
                    "probe for '{}' on loader {} failed ({}), defaulting to standalone",
                    self.marker_type,
                    loader.id(),
                    reason
                );
                Mode::Standalone
            }
        }
    }
}
