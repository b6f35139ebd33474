//! Construction interception.
//!
//! The coordinator never rewrites code itself: it publishes an
//! [`InterceptionTable`] of rewrite rules and leaves their application to a
//! [`RewriteBackend`] owned by the host's loading pipeline. Two entry points
//! are hooked, one per construction variant, so that the constructed factory
//! is routed through the wrapping entry points before any caller sees it.

pub mod backend;
pub mod model;
pub mod rules;

pub use backend::{install, instrument_class, Delegation, RewriteBackend, TargetClass};
pub use model::ModelRewriteBackend;
pub use rules::{
    InterceptionTable, MethodSig, RewriteAction, RewriteRule, WrapEntry, INTERNAL_ALIAS_PREFIX,
};
