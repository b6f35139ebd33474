// ============================================================================
// persist-hotswap
//
// Live-reload coordination for an embeddable persistence engine: keeps the
// engine's mapping consistent with entity classes that are redefined while
// the process keeps running. Construction entry points are intercepted so
// every factory is handed out behind a swappable proxy; relevant class
// changes schedule a deduplicated whole-factory rebuild.
// ============================================================================

pub mod config;
pub mod core;
pub mod intercept;
pub mod mode;
pub mod plugin;
pub mod proxy;
pub mod refresh;
pub mod sched;
pub mod watch;

// Re-export main types for convenience
pub use config::HotswapConfig;
pub use core::{ChangeEvent, ClassDefinition, HotswapError, Result};
pub use plugin::HotswapCoordinator;

pub use intercept::{
    install, instrument_class, InterceptionTable, MethodSig, ModelRewriteBackend, RewriteBackend,
    RewriteRule, TargetClass,
};
pub use mode::{ClassLoader, LoaderId, Mode, ModeRegistry, ResolveError};
pub use proxy::{
    FactoryBuilder, FactoryConfig, FactoryProxy, PersistenceFactory, ProxyRegistry, ProxyStats,
    SessionHandle,
};
pub use refresh::{ChangePredicate, RefreshCommand, DEFAULT_ENTITY_MARKER};
pub use sched::{Command, DebounceScheduler, Scheduler};
pub use watch::{FileEvent, FileEventKind, WatchSpec};
