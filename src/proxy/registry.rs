use super::factory::{FactoryBuilder, FactoryConfig, PersistenceFactory};
use super::swap::FactoryProxy;
use crate::mode::Mode;
use log::debug;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use uuid::Uuid;

/// All live proxies, keyed by construction identity.
///
/// Wrapping is idempotent: a second wrap call for an already-registered
/// configuration refreshes the existing proxy's delegate and returns the same
/// handle, so holders never end up with two proxies for one factory.
pub struct ProxyRegistry {
    proxies: Mutex<HashMap<Uuid, Arc<FactoryProxy>>>,
}

impl ProxyRegistry {
    pub fn new() -> Self {
        Self {
            proxies: Mutex::new(HashMap::new()),
        }
    }

    /// Wrap a freshly constructed delegate, reusing any proxy already
    /// registered for this configuration. On reuse the fresh delegate is
    /// installed behind the existing handle and the displaced one is closed.
    pub async fn wrap(
        &self,
        config: FactoryConfig,
        mode: Mode,
        delegate: Arc<dyn PersistenceFactory>,
        builder: Arc<dyn FactoryBuilder>,
    ) -> Arc<FactoryProxy> {
        let id = config.id;
        let existing = {
            let mut proxies = self.proxies.lock().unwrap_or_else(PoisonError::into_inner);
            match proxies.entry(id) {
                Entry::Occupied(entry) => Arc::clone(entry.get()),
                Entry::Vacant(entry) => {
                    debug!("wrapping new {} factory '{}'", mode, config.unit_name);
                    let proxy = Arc::new(FactoryProxy::new(config, mode, delegate, builder));
                    entry.insert(Arc::clone(&proxy));
                    return proxy;
                }
            }
        };

        debug!(
            "re-registration for '{}', refreshing existing proxy",
            existing.config().unit_name
        );
        existing.install(delegate).await;
        existing
    }

    pub fn get(&self, id: Uuid) -> Option<Arc<FactoryProxy>> {
        let proxies = self.proxies.lock().unwrap_or_else(PoisonError::into_inner);
        proxies.get(&id).cloned()
    }

    /// Every registered proxy built under the given mode
    pub fn by_mode(&self, mode: Mode) -> Vec<Arc<FactoryProxy>> {
        let proxies = self.proxies.lock().unwrap_or_else(PoisonError::into_inner);
        proxies
            .values()
            .filter(|p| p.mode() == mode)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        let proxies = self.proxies.lock().unwrap_or_else(PoisonError::into_inner);
        proxies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ProxyRegistry {
    fn default() -> Self {
        Self::new()
    }
}
