//! Change detection and refresh dispatch.

pub mod command;
pub mod predicate;

pub use command::RefreshCommand;
pub use predicate::{ChangePredicate, DEFAULT_ENTITY_MARKER};
