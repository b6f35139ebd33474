use super::factory::{FactoryBuilder, FactoryConfig, PersistenceFactory, SessionHandle};
use crate::core::{HotswapError, Result};
use crate::mode::Mode;
use arc_swap::ArcSwap;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{info, warn};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

/// The delegate snapshot behind the proxy. Swapped atomically as a unit so a
/// forwarding call never observes a half-replaced delegate.
struct DelegateSlot {
    factory: Arc<dyn PersistenceFactory>,
    generation: u64,
}

/// Stable stand-in for a constructed factory.
///
/// Holders keep one `Arc<FactoryProxy>` for the life of the process; rebuilds
/// replace the delegate inside it. Forwarding reads the current delegate
/// lock-free; mutual exclusion exists only around replacement.
pub struct FactoryProxy {
    config: FactoryConfig,
    mode: Mode,
    delegate: ArcSwap<DelegateSlot>,
    builder: Arc<dyn FactoryBuilder>,
    /// Serializes rebuilds; forwarding never takes it
    rebuild_lock: Mutex<()>,
    rebuild_failures: AtomicU64,
    created_at: DateTime<Utc>,
}

/// Point-in-time proxy counters, in the spirit of pool statistics
#[derive(Debug, Clone)]
pub struct ProxyStats {
    pub unit_name: String,
    pub generation: u64,
    pub rebuild_failures: u64,
    pub created_at: DateTime<Utc>,
}

impl fmt::Display for ProxyStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Proxy '{}': generation {}, {} failed rebuilds",
            self.unit_name, self.generation, self.rebuild_failures
        )
    }
}

impl FactoryProxy {
    pub(crate) fn new(
        config: FactoryConfig,
        mode: Mode,
        delegate: Arc<dyn PersistenceFactory>,
        builder: Arc<dyn FactoryBuilder>,
    ) -> Self {
        Self {
            config,
            mode,
            delegate: ArcSwap::from_pointee(DelegateSlot {
                factory: delegate,
                generation: 1,
            }),
            builder,
            rebuild_lock: Mutex::new(()),
            rebuild_failures: AtomicU64::new(0),
            created_at: Utc::now(),
        }
    }

    pub fn config(&self) -> &FactoryConfig {
        &self.config
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// The currently installed delegate
    pub fn current(&self) -> Arc<dyn PersistenceFactory> {
        Arc::clone(&self.delegate.load().factory)
    }

    pub fn stats(&self) -> ProxyStats {
        ProxyStats {
            unit_name: self.config.unit_name.clone(),
            generation: self.delegate.load().generation,
            rebuild_failures: self.rebuild_failures.load(Ordering::Relaxed),
            created_at: self.created_at,
        }
    }

    /// Install a freshly constructed delegate directly, without running the
    /// builder. Used when the host re-runs a construction entry point for a
    /// configuration that is already wrapped. Serialized against rebuilds;
    /// the displaced delegate is closed like any other replaced delegate.
    pub(crate) async fn install(&self, fresh: Arc<dyn PersistenceFactory>) {
        let _serialized = self.rebuild_lock.lock().await;
        let old = self.replace(fresh);
        self.close_replaced(old).await;
    }

    /// Construct a brand-new delegate from the original construction
    /// arguments and swap it in.
    ///
    /// All-or-nothing: on builder failure the previous delegate keeps
    /// serving, the failure is counted, and the error is returned to the
    /// caller (the refresh command) for reporting. Calls in flight during the
    /// swap complete against whichever delegate they captured; calls issued
    /// after this returns `Ok` reach the new delegate.
    pub async fn rebuild(&self) -> Result<()> {
        let _serialized = self.rebuild_lock.lock().await;

        let fresh = self
            .builder
            .build(&self.config, self.mode)
            .await
            .map_err(|e| {
                self.rebuild_failures.fetch_add(1, Ordering::Relaxed);
                HotswapError::RebuildFailed(format!(
                    "factory '{}': {}",
                    self.config.unit_name, e
                ))
            })?;

        let old = self.replace(fresh);
        info!(
            "factory '{}' rebuilt (generation {})",
            self.config.unit_name,
            old.generation + 1
        );
        self.close_replaced(old).await;
        Ok(())
    }

    /// Swap the delegate slot, returning the displaced one. Callers must hold
    /// `rebuild_lock`.
    fn replace(&self, fresh: Arc<dyn PersistenceFactory>) -> Arc<DelegateSlot> {
        let old = self.delegate.load_full();
        self.delegate.store(Arc::new(DelegateSlot {
            factory: fresh,
            generation: old.generation + 1,
        }));
        old
    }

    /// The replaced delegate is dead to new callers; shut it down politely.
    async fn close_replaced(&self, old: Arc<DelegateSlot>) {
        if let Err(e) = old.factory.close().await {
            warn!(
                "closing replaced delegate of '{}' failed: {}",
                self.config.unit_name, e
            );
        }
    }
}

#[async_trait]
impl PersistenceFactory for FactoryProxy {
    fn name(&self) -> &str {
        &self.config.unit_name
    }

    fn is_open(&self) -> bool {
        self.current().is_open()
    }

    async fn open_session(&self) -> Result<SessionHandle> {
        self.current().open_session().await
    }

    async fn close(&self) -> Result<()> {
        self.current().close().await
    }
}
