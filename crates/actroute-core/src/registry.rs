//! Action configuration registry
//!
//! An [`ActionRegistry`] is an immutable snapshot built once by the
//! configuration owner. [`RegistryHandle`] publishes replacement snapshots;
//! readers keep the `Arc` they obtained for as long as they need it.

use crate::{
    allowed::{AllowedMethods, AllowedTemplate},
    error::{RouteError, RouteResult},
    types::{ActionConfig, PackageConfig},
    wildcard::{self, Captures, WildcardPattern},
};
use indexmap::IndexMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// A compiled action entry
#[derive(Debug, Clone)]
struct ActionEntry {
    config: ActionConfig,
    pattern: Option<WildcardPattern>,
    allowed: EntryPolicy,
}

/// Allowed methods of an entry: parsed once, or per match when the rules
/// reference captures
#[derive(Debug, Clone)]
enum EntryPolicy {
    Fixed(AllowedMethods),
    Deferred(AllowedTemplate),
}

impl EntryPolicy {
    fn apply(&self, captures: &Captures) -> RouteResult<AllowedMethods> {
        match self {
            Self::Fixed(allowed) => Ok(allowed.clone()),
            Self::Deferred(template) => template.apply(captures),
        }
    }
}

#[derive(Debug, Clone, Default)]
struct NamespaceEntries {
    literals: IndexMap<String, ActionEntry>,
    /// Wildcard entries in registration order; the first match wins
    wildcards: Vec<ActionEntry>,
}

/// Result of a registry lookup, with wildcard captures already applied
#[derive(Debug, Clone)]
pub struct MatchedAction {
    /// Namespace the entry was found in
    pub namespace: String,
    /// Concrete config (placeholders substituted)
    pub config: ActionConfig,
    pub allowed: AllowedMethods,
    pub captures: Captures,
    /// Pattern the action name matched, when it was a wildcard entry
    pub pattern: Option<String>,
}

impl MatchedAction {
    pub fn is_wildcard(&self) -> bool {
        self.pattern.is_some()
    }
}

/// Immutable snapshot of packages and actions
#[derive(Debug, Clone, Default)]
pub struct ActionRegistry {
    packages: IndexMap<String, PackageConfig>,
    namespaces: IndexMap<String, NamespaceEntries>,
}

impl ActionRegistry {
    pub fn builder() -> ActionRegistryBuilder {
        ActionRegistryBuilder::default()
    }

    /// Number of action entries (literal and wildcard) across all namespaces
    pub fn action_count(&self) -> usize {
        self.namespaces
            .values()
            .map(|ns| ns.literals.len() + ns.wildcards.len())
            .sum()
    }

    /// Find `name` in `namespace` only: literal entries first, then wildcard
    /// entries in registration order.
    pub fn find(&self, namespace: &str, name: &str) -> RouteResult<Option<MatchedAction>> {
        let Some(entries) = self.namespaces.get(namespace) else {
            return Ok(None);
        };

        if let Some(entry) = entries.literals.get(name) {
            let captures = Captures::whole(name);
            return Ok(Some(MatchedAction {
                namespace: namespace.to_string(),
                config: entry.config.clone(),
                allowed: entry.allowed.apply(&captures)?,
                captures,
                pattern: None,
            }));
        }

        for entry in &entries.wildcards {
            let Some(pattern) = &entry.pattern else { continue };
            if let Some(captures) = pattern.matches(name) {
                debug!(
                    namespace,
                    action = name,
                    pattern = pattern.as_str(),
                    "wildcard action matched"
                );
                return Ok(Some(MatchedAction {
                    namespace: namespace.to_string(),
                    config: entry.config.materialize(&captures),
                    allowed: entry.allowed.apply(&captures)?,
                    captures,
                    pattern: Some(pattern.as_str().to_string()),
                }));
            }
        }

        Ok(None)
    }

    /// Find `name` in `namespace`, retrying in `fallback` when given.
    pub fn lookup(
        &self,
        namespace: &str,
        name: &str,
        fallback: Option<&str>,
    ) -> RouteResult<MatchedAction> {
        if let Some(found) = self.find(namespace, name)? {
            return Ok(found);
        }
        if let Some(fallback) = fallback.filter(|f| *f != namespace) {
            if let Some(found) = self.find(fallback, name)? {
                debug!(
                    namespace,
                    fallback,
                    action = name,
                    "action resolved in fallback namespace"
                );
                return Ok(found);
            }
        }
        Err(RouteError::action_not_found(namespace, name))
    }
}

/// Builder collecting packages and actions into an [`ActionRegistry`]
#[derive(Debug, Default)]
pub struct ActionRegistryBuilder {
    packages: Vec<PackageConfig>,
    actions: Vec<ActionConfig>,
}

impl ActionRegistryBuilder {
    pub fn package(mut self, package: PackageConfig) -> Self {
        self.packages.push(package);
        self
    }

    pub fn action(mut self, action: ActionConfig) -> Self {
        self.actions.push(action);
        self
    }

    pub fn actions<I>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = ActionConfig>,
    {
        self.actions.extend(actions);
        self
    }

    pub fn build(self) -> RouteResult<ActionRegistry> {
        let mut packages: IndexMap<String, PackageConfig> = IndexMap::new();
        for package in self.packages {
            if packages.contains_key(&package.name) {
                return Err(RouteError::DuplicatePackage(package.name));
            }
            packages.insert(package.name.clone(), package);
        }

        let mut namespaces: IndexMap<String, NamespaceEntries> = IndexMap::new();
        for action in self.actions {
            let package = packages
                .get(&action.package)
                .ok_or_else(|| RouteError::UnknownPackage(action.package.clone()))?;

            let allowed = if package.strict_method_invocation {
                let rules: Vec<&String> = action
                    .allowed_methods
                    .iter()
                    .chain(package.global_allowed_methods.iter())
                    .collect();
                if rules.iter().any(|rule| wildcard::has_placeholder(rule)) {
                    EntryPolicy::Deferred(AllowedTemplate::new(rules)?)
                } else {
                    EntryPolicy::Fixed(AllowedMethods::restricted(rules)?)
                }
            } else {
                EntryPolicy::Fixed(AllowedMethods::Unrestricted)
            };

            let entries = namespaces.entry(package.namespace.clone()).or_default();
            if action.is_wildcard() {
                let pattern = WildcardPattern::compile(&action.name)?;
                entries.wildcards.push(ActionEntry {
                    config: action,
                    pattern: Some(pattern),
                    allowed,
                });
            } else {
                let name = action.name.clone();
                let entry = ActionEntry { config: action, pattern: None, allowed };
                if entries.literals.insert(name.clone(), entry).is_some() {
                    warn!(
                        namespace = %package.namespace,
                        action = %name,
                        "action redefined, keeping the last definition"
                    );
                }
            }
        }

        let registry = ActionRegistry { packages, namespaces };
        debug!(
            packages = registry.packages.len(),
            actions = registry.action_count(),
            "action registry built"
        );
        Ok(registry)
    }
}

/// Publishes immutable registry snapshots to concurrent readers
#[derive(Debug, Clone)]
pub struct RegistryHandle {
    current: Arc<RwLock<Arc<ActionRegistry>>>,
}

impl RegistryHandle {
    pub fn new(registry: ActionRegistry) -> Self {
        Self { current: Arc::new(RwLock::new(Arc::new(registry))) }
    }

    /// The snapshot current at the time of the call
    pub async fn snapshot(&self) -> Arc<ActionRegistry> {
        self.current.read().await.clone()
    }

    /// Replace the current snapshot, returning the previous one.
    /// Readers holding the previous snapshot are unaffected.
    pub async fn publish(&self, registry: ActionRegistry) -> Arc<ActionRegistry> {
        let mut current = self.current.write().await;
        std::mem::replace(&mut *current, Arc::new(registry))
    }
}

impl Default for RegistryHandle {
    fn default() -> Self {
        Self::new(ActionRegistry::default())
    }
}
