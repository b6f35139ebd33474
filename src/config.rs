use std::path::PathBuf;
use std::time::Duration;

/// Hot-reload coordinator configuration
///
/// Names the well-known engine types and entry points the coordinator hooks,
/// plus scheduling and watcher settings.
#[derive(Debug, Clone)]
pub struct HotswapConfig {
    /// Marker attribute identifying a mapped entity class
    pub entity_marker: String,

    /// Managed-path provider type; its presence on a loader selects managed mode
    pub managed_provider_class: String,

    /// Standalone construction type (direct factory building)
    pub standalone_config_class: String,

    /// Concrete factory implementation type whose visibility must be relaxed
    /// before a proxy can wrap it
    pub factory_impl_class: String,

    /// Managed (container-style) construction entry point
    pub managed_constructor: String,

    /// Standalone (direct) construction entry point
    pub standalone_constructor: String,

    /// Quiet window the scheduler waits for after the last enqueued command
    /// before draining a batch
    pub quiet_window: Duration,

    /// Root directory watched for newly created model definition files
    pub watch_root: PathBuf,

    /// Glob selecting model definition files under the watch root
    pub watch_glob: String,
}

impl HotswapConfig {
    pub fn new() -> Self {
        Self {
            entity_marker: "persist.Entity".to_string(),
            managed_provider_class: "persist.container.ContainerProvider".to_string(),
            standalone_config_class: "persist.Configuration".to_string(),
            factory_impl_class: "persist.internal.FactoryImpl".to_string(),
            managed_constructor: "create_container_factory".to_string(),
            standalone_constructor: "build_factory".to_string(),
            quiet_window: Duration::from_millis(100),
            watch_root: PathBuf::from("."),
            watch_glob: "**/*.model".to_string(),
        }
    }

    /// Set the entity marker attribute
    pub fn entity_marker(mut self, marker: &str) -> Self {
        self.entity_marker = marker.to_string();
        self
    }

    /// Set the managed-path provider type name
    pub fn managed_provider_class(mut self, class: &str) -> Self {
        self.managed_provider_class = class.to_string();
        self
    }

    /// Set the standalone construction type name
    pub fn standalone_config_class(mut self, class: &str) -> Self {
        self.standalone_config_class = class.to_string();
        self
    }

    /// Set the scheduler quiet window
    pub fn quiet_window(mut self, window: Duration) -> Self {
        self.quiet_window = window;
        self
    }

    /// Set the watched root directory
    pub fn watch_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.watch_root = root.into();
        self
    }

    /// Set the watcher glob
    pub fn watch_glob(mut self, glob: &str) -> Self {
        self.watch_glob = glob.to_string();
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.entity_marker.is_empty() {
            return Err("entity_marker must not be empty".to_string());
        }
        if self.managed_provider_class.is_empty() || self.standalone_config_class.is_empty() {
            return Err("construction class names must not be empty".to_string());
        }
        if self.quiet_window.is_zero() {
            return Err("quiet_window must be greater than zero".to_string());
        }
        Ok(())
    }
}

impl Default for HotswapConfig {
    fn default() -> Self {
        Self::new()
    }
}
