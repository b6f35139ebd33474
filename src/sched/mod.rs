//! Command scheduling.
//!
//! Refresh dispatch only ever enqueues one of the canonical command objects;
//! everything about batching lives behind the [`Scheduler`] trait. The
//! contract callers rely on: enqueuing is non-blocking, execution happens off
//! the caller's thread, and enqueuing the same command reference N times
//! before it runs yields exactly one execution.

pub mod debounce;

use crate::core::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// A deferred unit of work
#[async_trait]
pub trait Command: Send + Sync {
    /// Name used in log output
    fn name(&self) -> &str;

    async fn execute(&self) -> Result<()>;
}

/// External scheduler contract. Identity of the `Arc` is the dedup key, which
/// is why canonical command instances are created once and reused.
pub trait Scheduler: Send + Sync {
    fn schedule_command(&self, command: &Arc<dyn Command>);
}

pub use debounce::DebounceScheduler;
