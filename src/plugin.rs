use crate::config::HotswapConfig;
use crate::core::{ChangeEvent, HotswapError, Result};
use crate::intercept::{install, InterceptionTable, RewriteBackend, TargetClass};
use crate::mode::{ClassLoader, Mode, ModeRegistry};
use crate::proxy::{FactoryBuilder, FactoryConfig, FactoryProxy, PersistenceFactory, ProxyRegistry};
use crate::refresh::{ChangePredicate, RefreshCommand};
use crate::sched::{Command, Scheduler};
use crate::watch::{FileEvent, FileEventKind, WatchSpec};
use log::{debug, info};
use std::collections::HashMap;
use std::sync::Arc;

/// The live-reload coordinator.
///
/// Wires the pieces together: publishes the interception table for the host's
/// loading pipeline, owns the wrapping entry points the synthesized
/// replacements call, watches redefinition events through the change
/// predicate, and dispatches the canonical refresh command for the active
/// mode to the scheduler.
///
/// # Examples
///
/// ```no_run
/// use persist_hotswap::{DebounceScheduler, HotswapConfig, HotswapCoordinator};
/// use std::sync::Arc;
///
/// # use persist_hotswap::FactoryBuilder;
/// # fn demo(builder: Arc<dyn FactoryBuilder>) -> persist_hotswap::Result<()> {
/// # let rt = tokio::runtime::Runtime::new().unwrap();
/// # let _guard = rt.enter();
/// let config = HotswapConfig::new();
/// let scheduler = Arc::new(DebounceScheduler::new(config.quiet_window));
/// let coordinator = HotswapCoordinator::new(config, builder, scheduler)?;
/// # Ok(())
/// # }
/// ```
pub struct HotswapCoordinator {
    config: HotswapConfig,
    table: InterceptionTable,
    predicate: ChangePredicate,
    modes: ModeRegistry,
    proxies: Arc<ProxyRegistry>,
    builder: Arc<dyn FactoryBuilder>,
    scheduler: Arc<dyn Scheduler>,
    refresh_managed: Arc<dyn Command>,
    refresh_standalone: Arc<dyn Command>,
}

impl HotswapCoordinator {
    /// Build a coordinator from its configuration and collaborators.
    pub fn new(
        config: HotswapConfig,
        builder: Arc<dyn FactoryBuilder>,
        scheduler: Arc<dyn Scheduler>,
    ) -> Result<Self> {
        config.validate().map_err(HotswapError::Config)?;

        let table = InterceptionTable::with_default_rules(&config)
            .map_err(|e| HotswapError::Config(format!("bad target pattern: {e}")))?;
        let proxies = Arc::new(ProxyRegistry::new());
        // The canonical command pair: created once, reused for every
        // dispatch, deduplicated by identity in the scheduler.
        let refresh_managed: Arc<dyn Command> =
            RefreshCommand::new(Mode::Managed, Arc::clone(&proxies));
        let refresh_standalone: Arc<dyn Command> =
            RefreshCommand::new(Mode::Standalone, Arc::clone(&proxies));

        Ok(Self {
            predicate: ChangePredicate::new(config.entity_marker.clone()),
            modes: ModeRegistry::new(config.managed_provider_class.clone()),
            config,
            table,
            proxies,
            builder,
            scheduler,
            refresh_managed,
            refresh_standalone,
        })
    }

    /// The rewrite rules the host's loading pipeline should apply
    pub fn interception_table(&self) -> &InterceptionTable {
        &self.table
    }

    /// Apply the table's rules to a class the given loader is preparing.
    ///
    /// Loader-aware: when the loader classifies as managed, the standalone
    /// construction hook is skipped (the two paths are mutually exclusive).
    /// Returns the number of rules applied.
    pub fn instrument(
        &self,
        backend: &dyn RewriteBackend,
        loader: &dyn ClassLoader,
        class: &mut TargetClass,
    ) -> usize {
        install(&self.table, backend, &self.modes, loader, class)
    }

    /// Notification from the instrumented engine that a factory finished
    /// initializing.
    pub fn factory_initialized(&self, engine_version: &str, mode: Mode) {
        debug!(
            "hot-reload attached to persistence engine '{}' ({} mode)",
            engine_version, mode
        );
    }

    /// Wrapping entry point for the managed (container-style) construction
    /// variant. Called by the synthesized replacement with the construction
    /// info, the extra call arguments, and the raw factory the renamed
    /// original produced.
    pub async fn wrap_managed(
        &self,
        info: FactoryConfig,
        extra_properties: HashMap<String, String>,
        delegate: Arc<dyn PersistenceFactory>,
    ) -> Arc<FactoryProxy> {
        let mut info = info;
        info.properties.extend(extra_properties);
        self.proxies
            .wrap(info, Mode::Managed, delegate, Arc::clone(&self.builder))
            .await
    }

    /// Wrapping entry point for the standalone (direct) construction variant.
    pub async fn wrap_standalone(
        &self,
        config: FactoryConfig,
        delegate: Arc<dyn PersistenceFactory>,
    ) -> Arc<FactoryProxy> {
        self.proxies
            .wrap(config, Mode::Standalone, delegate, Arc::clone(&self.builder))
            .await
    }

    /// Redefinition event from the host's loading pipeline. Non-blocking:
    /// relevance is decided synchronously, the rebuild itself is scheduled.
    pub fn on_class_redefined(&self, loader: &dyn ClassLoader, event: &ChangeEvent) {
        if !self.predicate.is_mapping_relevant(event) {
            return;
        }
        debug!(
            "entity change detected for {}, scheduling refresh",
            event.class_name
        );
        self.refresh(loader);
    }

    /// Creation event from the host's file watcher.
    ///
    /// Currently inert: new entity class files are observed but do not
    /// dispatch a refresh. Creation coverage is a known gap in the reload
    /// mechanism, kept visible here rather than silently dropped.
    pub fn on_class_file_created(&self, event: &FileEvent) {
        if event.kind != FileEventKind::Create {
            return;
        }
        info!(
            "new class file {:?} observed; creation-triggered refresh is not implemented",
            event.path
        );
    }

    /// What the host should watch for creation events
    pub fn watch_spec(&self) -> WatchSpec {
        WatchSpec::new(self.config.watch_root.clone(), &self.config.watch_glob)
    }

    pub fn proxies(&self) -> &Arc<ProxyRegistry> {
        &self.proxies
    }

    pub fn modes(&self) -> &ModeRegistry {
        &self.modes
    }

    fn refresh(&self, loader: &dyn ClassLoader) {
        let command = match self.modes.classify(loader) {
            Mode::Managed => &self.refresh_managed,
            Mode::Standalone => &self.refresh_standalone,
        };
        self.scheduler.schedule_command(command);
    }
}
