//! Reference rewrite backend operating on the in-memory class model.
//!
//! Real deployments plug in a backend that talks to the host's actual
//! code-rewriting machinery; this one applies the same transformations to
//! [`TargetClass`] records and is what the crate's own tests run against.

use super::backend::{Delegation, RewriteBackend, TargetClass};
use super::rules::{RewriteAction, RewriteRule};
use crate::core::{HotswapError, Result};

pub struct ModelRewriteBackend;

impl RewriteBackend for ModelRewriteBackend {
    fn apply(&self, class: &mut TargetClass, rule: &RewriteRule) -> Result<()> {
        match &rule.action {
            RewriteAction::RenameAndDelegate { alias, wrap_entry } => {
                let sig = rule.entry_point.as_ref().ok_or_else(|| {
                    HotswapError::Instrumentation(format!(
                        "rename rule for {} has no entry point signature",
                        class.name
                    ))
                })?;

                let position = class
                    .methods
                    .iter()
                    .position(|m| m.name == sig.name)
                    .ok_or_else(|| {
                        HotswapError::Instrumentation(format!(
                            "entry point '{}' not found on {}",
                            sig.name, class.name
                        ))
                    })?;

                if class.methods[position].params != sig.params {
                    return Err(HotswapError::Instrumentation(format!(
                        "entry point '{}' on {} has unexpected signature {:?}",
                        sig.name, class.name, class.methods[position].params
                    )));
                }

                // Keep the original alive under the alias, then synthesize
                // the replacement with the original public signature.
                let original_name = class.methods[position].name.clone();
                class.methods[position].name = alias.clone();
                let replacement = replacement_sig(&original_name, &class.methods[position]);
                class.methods.push(replacement);
                class.delegations.push(Delegation {
                    method: original_name,
                    calls_alias: alias.clone(),
                    wrap_entry: *wrap_entry,
                });
                Ok(())
            }
            RewriteAction::RelaxVisibility => {
                class.sealed = false;
                Ok(())
            }
        }
    }
}

fn replacement_sig(public_name: &str, aliased: &super::rules::MethodSig) -> super::rules::MethodSig {
    super::rules::MethodSig {
        name: public_name.to_string(),
        params: aliased.params.clone(),
        returns: aliased.returns.clone(),
    }
}
