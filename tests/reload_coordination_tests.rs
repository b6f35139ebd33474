/// Reload coordination tests
///
/// End-to-end coverage of the change-detection -> dispatch -> deduplicated
/// rebuild pipeline.
/// Run with: cargo test --test reload_coordination_tests
use async_trait::async_trait;
use persist_hotswap::{
    ChangeEvent, ClassDefinition, ClassLoader, DebounceScheduler, FactoryBuilder, FactoryConfig,
    FileEvent, HotswapConfig, HotswapCoordinator, LoaderId, MethodSig, Mode, ModelRewriteBackend,
    PersistenceFactory, ResolveError, Result, SessionHandle, TargetClass,
};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

const MARKER: &str = "persist.Entity";
const PROVIDER: &str = "persist.container.ContainerProvider";

struct FakeFactory {
    label: String,
}

#[async_trait]
impl PersistenceFactory for FakeFactory {
    fn name(&self) -> &str {
        &self.label
    }

    fn is_open(&self) -> bool {
        true
    }

    async fn open_session(&self) -> Result<SessionHandle> {
        Ok(SessionHandle {
            id: Uuid::new_v4(),
            factory_name: self.label.clone(),
        })
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// Builder that counts invocations and bakes the current "class state" into
/// the factories it constructs, so tests can check that a rebuild picked up
/// the latest state.
struct RecordingBuilder {
    builds: AtomicU64,
    class_state: Mutex<String>,
}

impl RecordingBuilder {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            builds: AtomicU64::new(0),
            class_state: Mutex::new("initial".to_string()),
        })
    }

    fn set_class_state(&self, state: &str) {
        *self.class_state.lock().unwrap() = state.to_string();
    }

    fn build_count(&self) -> u64 {
        self.builds.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FactoryBuilder for RecordingBuilder {
    async fn build(
        &self,
        config: &FactoryConfig,
        _mode: Mode,
    ) -> Result<Arc<dyn PersistenceFactory>> {
        self.builds.fetch_add(1, Ordering::SeqCst);
        let state = self.class_state.lock().unwrap().clone();
        Ok(Arc::new(FakeFactory {
            label: format!("{}@{}", config.unit_name, state),
        }))
    }
}

struct FakeLoader {
    id: LoaderId,
    types: HashSet<String>,
}

impl FakeLoader {
    fn standalone() -> Self {
        Self {
            id: LoaderId::new(),
            types: HashSet::new(),
        }
    }

    fn managed() -> Self {
        Self {
            id: LoaderId::new(),
            types: [PROVIDER.to_string()].into_iter().collect(),
        }
    }
}

impl ClassLoader for FakeLoader {
    fn id(&self) -> LoaderId {
        self.id
    }

    fn resolve_type(&self, type_name: &str) -> std::result::Result<(), ResolveError> {
        if self.types.contains(type_name) {
            Ok(())
        } else {
            Err(ResolveError::NotFound)
        }
    }
}

fn coordinator_with(builder: Arc<RecordingBuilder>) -> HotswapCoordinator {
    let config = HotswapConfig::new().quiet_window(Duration::from_millis(40));
    let scheduler = Arc::new(DebounceScheduler::new(config.quiet_window));
    HotswapCoordinator::new(config, builder, scheduler).unwrap()
}

fn entity(name: &str) -> ClassDefinition {
    ClassDefinition::new(name).with_attribute(MARKER)
}

fn plain(name: &str) -> ClassDefinition {
    ClassDefinition::new(name)
}

#[tokio::test]
async fn burst_of_relevant_changes_rebuilds_exactly_once() {
    let builder = RecordingBuilder::new();
    let coordinator = coordinator_with(Arc::clone(&builder));
    let loader = FakeLoader::standalone();

    let proxy = coordinator
        .wrap_standalone(
            FactoryConfig::new("orders"),
            Arc::new(FakeFactory {
                label: "orders@initial".to_string(),
            }),
        )
        .await;

    // One batch: marker added, marker unchanged, marker removed.
    builder.set_class_state("v2");
    coordinator.on_class_redefined(
        &loader,
        &ChangeEvent::new("shop.ClassA", Some(plain("shop.ClassA")), Some(entity("shop.ClassA"))),
    );
    coordinator.on_class_redefined(
        &loader,
        &ChangeEvent::new("shop.ClassB", Some(entity("shop.ClassB")), Some(entity("shop.ClassB"))),
    );
    coordinator.on_class_redefined(
        &loader,
        &ChangeEvent::new("shop.ClassC", Some(entity("shop.ClassC")), Some(plain("shop.ClassC"))),
    );

    tokio::time::sleep(Duration::from_millis(400)).await;

    assert_eq!(builder.build_count(), 1, "batch must collapse to one rebuild");

    // The single rebuild reflects the latest class state.
    let session = proxy.open_session().await.unwrap();
    assert_eq!(session.factory_name, "orders@v2");
}

#[tokio::test]
async fn irrelevant_changes_schedule_nothing() {
    let builder = RecordingBuilder::new();
    let coordinator = coordinator_with(Arc::clone(&builder));
    let loader = FakeLoader::standalone();

    coordinator
        .wrap_standalone(
            FactoryConfig::new("orders"),
            Arc::new(FakeFactory {
                label: "orders@initial".to_string(),
            }),
        )
        .await;

    coordinator.on_class_redefined(
        &loader,
        &ChangeEvent::new("util.Helper", Some(plain("util.Helper")), Some(plain("util.Helper"))),
    );
    coordinator.on_class_redefined(
        &loader,
        &ChangeEvent::new("util.Fresh", None, Some(plain("util.Fresh"))),
    );

    tokio::time::sleep(Duration::from_millis(300)).await;

    assert_eq!(builder.build_count(), 0);
}

#[tokio::test]
async fn managed_loader_rebuilds_only_managed_factories() {
    let builder = RecordingBuilder::new();
    let coordinator = coordinator_with(Arc::clone(&builder));
    let loader = FakeLoader::managed();

    let managed = coordinator
        .wrap_managed(
            FactoryConfig::new("managed-unit"),
            HashMap::new(),
            Arc::new(FakeFactory {
                label: "managed-unit@initial".to_string(),
            }),
        )
        .await;
    let standalone = coordinator
        .wrap_standalone(
            FactoryConfig::new("standalone-unit"),
            Arc::new(FakeFactory {
                label: "standalone-unit@initial".to_string(),
            }),
        )
        .await;

    builder.set_class_state("v2");
    coordinator.on_class_redefined(
        &loader,
        &ChangeEvent::new("shop.Order", None, Some(entity("shop.Order"))),
    );

    tokio::time::sleep(Duration::from_millis(400)).await;

    assert_eq!(builder.build_count(), 1);
    assert_eq!(
        managed.open_session().await.unwrap().factory_name,
        "managed-unit@v2"
    );
    assert_eq!(
        standalone.open_session().await.unwrap().factory_name,
        "standalone-unit@initial"
    );
}

#[tokio::test]
async fn mode_is_classified_once_per_loader() {
    let builder = RecordingBuilder::new();
    let coordinator = coordinator_with(Arc::clone(&builder));
    let loader = FakeLoader::standalone();

    coordinator.on_class_redefined(
        &loader,
        &ChangeEvent::new("shop.Order", None, Some(entity("shop.Order"))),
    );

    assert_eq!(coordinator.modes().cached(loader.id()), Some(Mode::Standalone));
}

#[tokio::test]
async fn created_class_files_are_observed_but_do_not_dispatch() {
    let builder = RecordingBuilder::new();
    let coordinator = coordinator_with(Arc::clone(&builder));

    coordinator
        .wrap_standalone(
            FactoryConfig::new("orders"),
            Arc::new(FakeFactory {
                label: "orders@initial".to_string(),
            }),
        )
        .await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("NewEntity.model");
    std::fs::write(&path, b"entity NewEntity {}").unwrap();

    coordinator.on_class_file_created(&FileEvent::created(path));

    tokio::time::sleep(Duration::from_millis(300)).await;

    // Known gap: the creation path performs no refresh dispatch.
    assert_eq!(builder.build_count(), 0);
}

#[tokio::test]
async fn managed_loader_skips_the_standalone_construction_hook() {
    let builder = RecordingBuilder::new();
    let coordinator = coordinator_with(Arc::clone(&builder));
    let backend = ModelRewriteBackend;

    let standalone_class = || {
        TargetClass::new("persist.Configuration").with_method(MethodSig::new(
            "build_factory",
            &["ServiceRegistry"],
            "PersistenceFactory",
        ))
    };

    // Managed process: the standalone entry point must stay untouched, or it
    // would hand out proxies no refresh command ever rebuilds.
    let mut class = standalone_class();
    let applied = coordinator.instrument(&backend, &FakeLoader::managed(), &mut class);
    assert_eq!(applied, 0);
    assert!(class.method("_build_factory").is_none());

    // The managed construction hook still applies in that same process.
    let mut provider = TargetClass::new(PROVIDER).with_method(MethodSig::new(
        "create_container_factory",
        &["ConstructionInfo", "Properties"],
        "PersistenceFactory",
    ));
    let applied = coordinator.instrument(&backend, &FakeLoader::managed(), &mut provider);
    assert_eq!(applied, 1);
    assert!(provider.method("_create_container_factory").is_some());

    // Standalone process: the standalone hook goes in as usual.
    let mut class = standalone_class();
    let applied = coordinator.instrument(&backend, &FakeLoader::standalone(), &mut class);
    assert_eq!(applied, 1);
    assert!(class.method("_build_factory").is_some());
}

#[tokio::test]
async fn watch_registration_reflects_configuration() {
    let builder = RecordingBuilder::new();
    let coordinator = coordinator_with(Arc::clone(&builder));

    let spec = coordinator.watch_spec();
    assert_eq!(spec.root, std::path::PathBuf::from("."));
    assert_eq!(spec.glob, "**/*.model");

    // Attachment notification is informational only.
    coordinator.factory_initialized("0.1.2", Mode::Standalone);
}

#[tokio::test]
async fn wrapping_entry_points_are_idempotent() {
    let builder = RecordingBuilder::new();
    let coordinator = coordinator_with(Arc::clone(&builder));
    let config = FactoryConfig::new("orders");

    let first = coordinator
        .wrap_standalone(
            config.clone(),
            Arc::new(FakeFactory {
                label: "orders@first".to_string(),
            }),
        )
        .await;
    let second = coordinator
        .wrap_standalone(
            config,
            Arc::new(FakeFactory {
                label: "orders@second".to_string(),
            }),
        )
        .await;

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(coordinator.proxies().len(), 1);
}

#[tokio::test]
async fn managed_wrap_merges_extra_properties() {
    let builder = RecordingBuilder::new();
    let coordinator = coordinator_with(Arc::clone(&builder));

    let extra: HashMap<String, String> =
        [("pool.size".to_string(), "8".to_string())].into_iter().collect();
    let proxy = coordinator
        .wrap_managed(
            FactoryConfig::new("managed-unit").property("dialect", "memory"),
            extra,
            Arc::new(FakeFactory {
                label: "managed-unit@initial".to_string(),
            }),
        )
        .await;

    let config = proxy.config();
    assert_eq!(config.properties.get("dialect").map(String::as_str), Some("memory"));
    assert_eq!(config.properties.get("pool.size").map(String::as_str), Some("8"));
    assert_eq!(proxy.mode(), Mode::Managed);
}
