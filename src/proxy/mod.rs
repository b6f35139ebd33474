//! Swappable factory proxies.
//!
//! One [`FactoryProxy`] per constructed factory: external holders keep the
//! proxy for the life of the process while rebuilds replace the delegate
//! inside it.

pub mod factory;
pub mod registry;
pub mod swap;

pub use factory::{FactoryBuilder, FactoryConfig, PersistenceFactory, SessionHandle};
pub use registry::ProxyRegistry;
pub use swap::{FactoryProxy, ProxyStats};
