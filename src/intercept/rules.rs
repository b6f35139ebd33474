use crate::config::HotswapConfig;
use regex::Regex;

/// Prefix under which an intercepted entry point is kept alive internally
pub const INTERNAL_ALIAS_PREFIX: &str = "_";

/// Signature of one construction entry point
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSig {
    pub name: String,
    pub params: Vec<String>,
    pub returns: String,
}

impl MethodSig {
    pub fn new(name: &str, params: &[&str], returns: &str) -> Self {
        Self {
            name: name.to_string(),
            params: params.iter().map(|p| p.to_string()).collect(),
            returns: returns.to_string(),
        }
    }
}

/// Which wrapping entry point a synthesized replacement hands its result to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapEntry {
    Managed,
    Standalone,
}

/// What a rule does to its target class
#[derive(Debug, Clone)]
pub enum RewriteAction {
    /// Rename the original entry point to an internal alias and synthesize a
    /// replacement with the original public signature. The replacement calls
    /// the alias and passes its result, together with the original call
    /// arguments, to the named wrapping entry point.
    RenameAndDelegate {
        alias: String,
        wrap_entry: WrapEntry,
    },

    /// Remove the "cannot subclass/wrap" restriction from the target so a
    /// proxy can legally be constructed around it
    RelaxVisibility,
}

/// One registered rewrite rule: target-type pattern, entry-point signature,
/// and the action to apply.
#[derive(Debug, Clone)]
pub struct RewriteRule {
    pub target_pattern: Regex,
    pub entry_point: Option<MethodSig>,
    pub action: RewriteAction,
}

impl RewriteRule {
    pub fn matches(&self, class_name: &str) -> bool {
        self.target_pattern.is_match(class_name)
    }
}

/// The interception registration table: every transformation the coordinator
/// wants applied to classes the host prepares, as plain data. A pluggable
/// [`RewriteBackend`](super::backend::RewriteBackend) interprets it.
pub struct InterceptionTable {
    rules: Vec<RewriteRule>,
}

impl InterceptionTable {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn register(&mut self, rule: RewriteRule) {
        self.rules.push(rule);
    }

    /// All rules whose pattern matches the given class name
    pub fn rules_for<'a>(&'a self, class_name: &'a str) -> impl Iterator<Item = &'a RewriteRule> {
        self.rules.iter().filter(move |r| r.matches(class_name))
    }

    pub fn rules(&self) -> &[RewriteRule] {
        &self.rules
    }

    /// Build the default table for a configuration: one construction hook per
    /// variant plus the visibility relaxation on the factory implementation.
    pub fn with_default_rules(config: &HotswapConfig) -> std::result::Result<Self, regex::Error> {
        let mut table = Self::new();

        // Managed (container-style) construction
        table.register(RewriteRule {
            target_pattern: Regex::new(&regex::escape(&config.managed_provider_class))?,
            entry_point: Some(MethodSig::new(
                &config.managed_constructor,
                &["ConstructionInfo", "Properties"],
                "PersistenceFactory",
            )),
            action: RewriteAction::RenameAndDelegate {
                alias: format!("{}{}", INTERNAL_ALIAS_PREFIX, config.managed_constructor),
                wrap_entry: WrapEntry::Managed,
            },
        });

        // Standalone (direct) construction
        table.register(RewriteRule {
            target_pattern: Regex::new(&regex::escape(&config.standalone_config_class))?,
            entry_point: Some(MethodSig::new(
                &config.standalone_constructor,
                &["ServiceRegistry"],
                "PersistenceFactory",
            )),
            action: RewriteAction::RenameAndDelegate {
                alias: format!("{}{}", INTERNAL_ALIAS_PREFIX, config.standalone_constructor),
                wrap_entry: WrapEntry::Standalone,
            },
        });

        // The engine casts to the concrete factory type, so the proxy must be
        // able to stand in for it; drop the subclassing restriction.
        table.register(RewriteRule {
            target_pattern: Regex::new(&regex::escape(&config.factory_impl_class))?,
            entry_point: None,
            action: RewriteAction::RelaxVisibility,
        });

        Ok(table)
    }
}

impl Default for InterceptionTable {
    fn default() -> Self {
        Self::new()
    }
}
