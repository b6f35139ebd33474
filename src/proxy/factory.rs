use crate::core::Result;
use crate::mode::Mode;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// The construction identity of one factory: the configuration object the
/// engine was asked to build it from. Two wrap calls carrying the same
/// configuration id refer to the same factory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactoryConfig {
    pub id: Uuid,
    pub unit_name: String,
    pub properties: HashMap<String, String>,
}

impl FactoryConfig {
    pub fn new(unit_name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            unit_name: unit_name.to_string(),
            properties: HashMap::new(),
        }
    }

    /// Set a construction property (builder style)
    pub fn property(mut self, key: &str, value: &str) -> Self {
        self.properties.insert(key.to_string(), value.to_string());
        self
    }
}

/// Handle to one session produced by a factory
#[derive(Debug, Clone)]
pub struct SessionHandle {
    pub id: Uuid,
    pub factory_name: String,
}

/// The wrapped contract: what external holders of "the factory" call.
///
/// The persistence runtime provides the real implementations; this crate only
/// forwards to them.
#[async_trait]
pub trait PersistenceFactory: Send + Sync {
    fn name(&self) -> &str;

    fn is_open(&self) -> bool;

    async fn open_session(&self) -> Result<SessionHandle>;

    async fn close(&self) -> Result<()>;
}

/// Constructs delegates. A rebuild calls this with the original construction
/// arguments to obtain a brand-new factory.
#[async_trait]
pub trait FactoryBuilder: Send + Sync {
    async fn build(&self, config: &FactoryConfig, mode: Mode) -> Result<Arc<dyn PersistenceFactory>>;
}
