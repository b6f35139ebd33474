use crate::core::Result;
use crate::mode::Mode;
use crate::proxy::ProxyRegistry;
use crate::sched::Command;
use async_trait::async_trait;
use log::{debug, error, info};
use std::sync::Arc;

/// Rebuilds every registered factory of one mode.
///
/// Exactly two canonical instances exist per coordinator, one per mode, and
/// every dispatch reuses them; the scheduler collapses duplicates by `Arc`
/// identity, so a burst of entity changes ends in one rebuild.
pub struct RefreshCommand {
    mode: Mode,
    registry: Arc<ProxyRegistry>,
}

impl RefreshCommand {
    pub fn new(mode: Mode, registry: Arc<ProxyRegistry>) -> Arc<Self> {
        Arc::new(Self { mode, registry })
    }
}

#[async_trait]
impl Command for RefreshCommand {
    fn name(&self) -> &str {
        match self.mode {
            Mode::Managed => "refresh-managed-factories",
            Mode::Standalone => "refresh-standalone-factories",
        }
    }

    async fn execute(&self) -> Result<()> {
        let proxies = self.registry.by_mode(self.mode);
        if proxies.is_empty() {
            debug!("no {} factories registered, nothing to rebuild", self.mode);
            return Ok(());
        }

        info!(
            "rebuilding {} {} factory(ies) after entity change",
            proxies.len(),
            self.mode
        );
        for proxy in proxies {
            if let Err(e) = proxy.rebuild().await {
                // A failed rebuild leaves the previous delegate serving;
                // report it and move on to the next factory.
                error!("{}", e);
            }
        }
        Ok(())
    }
}
