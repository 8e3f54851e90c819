//! Placeholder registry: name to resolver mapping.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use tracing::{debug, warn};

use super::engine::{Engine, token_names};
use crate::context::EvalContext;
use crate::error::TemplateError;
use crate::settings::MissPolicy;

/// A resolver computes a text value from an evaluation context.
///
/// Resolvers are infallible by construction; a resolver that cannot produce
/// a meaningful value returns an empty string.
pub type Resolver = Arc<dyn Fn(&EvalContext) -> String + Send + Sync>;

/// One named placeholder and its resolver.
#[derive(Clone)]
pub struct PlaceholderDefinition {
    name: String,
    resolver: Resolver,
}

impl PlaceholderDefinition {
    /// Creates a definition from a resolver.
    pub fn new(name: impl Into<String>, resolver: Resolver) -> Self {
        Self {
            name: name.into(),
            resolver,
        }
    }

    /// Creates a definition from a plain function or closure.
    pub fn from_fn<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&EvalContext) -> String + Send + Sync + 'static,
    {
        Self::new(name, Arc::new(f))
    }

    /// The placeholder name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolves this placeholder against a context.
    pub fn resolve(&self, ctx: &EvalContext) -> String {
        (self.resolver)(ctx)
    }
}

impl std::fmt::Debug for PlaceholderDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaceholderDefinition")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Mapping from placeholder name to definition.
///
/// Built in full from a settings snapshot; reloads build a fresh registry
/// rather than patching the existing one.
#[derive(Debug, Clone, Default)]
pub struct PlaceholderRegistry {
    entries: HashMap<String, PlaceholderDefinition>,
    miss: MissPolicy,
}

impl PlaceholderRegistry {
    /// Builds a registry from the engine's settings snapshot.
    ///
    /// Every template becomes a definition whose resolver expands the
    /// template body through the engine. Templates that reference themselves
    /// (directly or through other templates) are dropped and reported; the
    /// rest of the registry still builds. Construction is deterministic.
    pub fn build(engine: &Engine) -> (Self, Vec<TemplateError>) {
        let templates = engine.settings().templates();
        let cyclic = find_cycles(templates);

        let mut entries = HashMap::with_capacity(templates.len());
        let mut errors = Vec::new();

        for (name, body) in templates {
            if let Some(via) = cyclic.get(name) {
                warn!(template = %name, via = %via, "Dropping cyclic template");
                errors.push(TemplateError::CyclicTemplate {
                    name: name.clone(),
                    via: via.clone(),
                });
                continue;
            }

            let engine = engine.clone();
            let body = body.clone();
            entries.insert(
                name.clone(),
                PlaceholderDefinition::from_fn(name.clone(), move |ctx| engine.apply(&body, ctx)),
            );
        }

        debug!(
            entries = entries.len(),
            dropped = errors.len(),
            "Built placeholder registry"
        );

        (
            Self {
                entries,
                miss: engine.settings().miss_policy(),
            },
            errors,
        )
    }

    /// Registers a programmatic placeholder.
    ///
    /// The last registration for a name wins; overwriting is not an error.
    pub fn register(&mut self, definition: PlaceholderDefinition) {
        let name = definition.name().to_string();
        if self.entries.insert(name.clone(), definition).is_some() {
            debug!(placeholder = %name, "Overwrote placeholder registration");
        }
    }

    /// Looks up a definition by name.
    pub fn lookup(&self, name: &str) -> Option<&PlaceholderDefinition> {
        self.entries.get(name)
    }

    /// Number of registered placeholders.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when no placeholders are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// What a lookup miss resolves to.
    pub fn miss_policy(&self) -> MissPolicy {
        self.miss
    }
}

/// Finds templates that reach themselves through template references.
///
/// Returns offender name mapped to the neighbor the cycle goes through.
fn find_cycles(templates: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    let mut adjacency: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for (name, body) in templates {
        let mut refs = Vec::new();
        for token in token_names(body) {
            if let Some((key, _)) = templates.get_key_value(token.as_str()) {
                refs.push(key.as_str());
            }
        }
        adjacency.insert(name.as_str(), refs);
    }

    let mut cyclic = BTreeMap::new();
    for name in adjacency.keys().copied().collect::<Vec<_>>() {
        for &via in &adjacency[name] {
            if via == name || reaches(&adjacency, via, name) {
                cyclic.insert(name.to_string(), via.to_string());
                break;
            }
        }
    }
    cyclic
}

fn reaches(adjacency: &BTreeMap<&str, Vec<&str>>, from: &str, to: &str) -> bool {
    let mut stack = vec![from];
    let mut seen = HashSet::new();
    while let Some(node) = stack.pop() {
        if node == to {
            return true;
        }
        if !seen.insert(node) {
            continue;
        }
        if let Some(next) = adjacency.get(node) {
            stack.extend(next.iter().copied());
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::Catalog;
    use crate::settings::Settings;
    use chrono::{TimeZone, Utc};

    fn engine_for(templates: &[(&str, &str)]) -> Engine {
        let templates = templates
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let settings = Settings::new(
            templates,
            BTreeMap::new(),
            BTreeMap::new(),
            MissPolicy::Token,
        );
        Engine::new(Arc::new(settings), Arc::new(Catalog::builtin_en_us()))
    }

    fn ctx() -> EvalContext {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        EvalContext::new("launch", "Launch window", now).with_var("player", "Ari")
    }

    #[test]
    fn test_build_has_one_entry_per_template() {
        let engine = engine_for(&[
            ("greeting", "Hello, {player}!"),
            ("farewell", "Bye, {player}."),
            ("status", "{id}: {remaining}"),
        ]);
        let (registry, errors) = PlaceholderRegistry::build(&engine);
        assert!(errors.is_empty());
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.names(), vec!["farewell", "greeting", "status"]);
    }

    #[test]
    fn test_template_resolution() {
        let engine = engine_for(&[("greeting", "Hello, {player}!")]);
        let (registry, _) = PlaceholderRegistry::build(&engine);
        let def = registry.lookup("greeting").unwrap();
        assert_eq!(def.resolve(&ctx()), "Hello, Ari!");
    }

    #[test]
    fn test_direct_self_reference_dropped() {
        let engine = engine_for(&[("loop", "again: {loop}"), ("ok", "{id}")]);
        let (registry, errors) = PlaceholderRegistry::build(&engine);
        assert_eq!(registry.len(), 1);
        assert!(registry.lookup("loop").is_none());
        assert_eq!(
            errors,
            vec![TemplateError::CyclicTemplate {
                name: "loop".to_string(),
                via: "loop".to_string(),
            }]
        );
    }

    #[test]
    fn test_transitive_cycle_dropped() {
        let engine = engine_for(&[("a", "{b}"), ("b", "{c}"), ("c", "{a}"), ("solo", "{id}")]);
        let (registry, errors) = PlaceholderRegistry::build(&engine);
        assert_eq!(registry.len(), 1);
        assert!(registry.lookup("solo").is_some());
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_acyclic_reference_is_kept() {
        // "outer" mentions "inner" but nothing points back: no cycle
        let engine = engine_for(&[("outer", "-> {inner}"), ("inner", "{id}")]);
        let (registry, errors) = PlaceholderRegistry::build(&engine);
        assert!(errors.is_empty());
        assert_eq!(registry.len(), 2);
        // resolution is non-recursive: the inner template token stays verbatim
        assert_eq!(registry.lookup("outer").unwrap().resolve(&ctx()), "-> {inner}");
    }

    #[test]
    fn test_register_last_write_wins() {
        let engine = engine_for(&[]);
        let (mut registry, _) = PlaceholderRegistry::build(&engine);
        registry.register(PlaceholderDefinition::from_fn("version", |_| "1".to_string()));
        registry.register(PlaceholderDefinition::from_fn("version", |_| "2".to_string()));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.lookup("version").unwrap().resolve(&ctx()), "2");
    }

    #[test]
    fn test_build_is_deterministic() {
        let engine = engine_for(&[("status", "{id}: {remaining} {player}")]);
        let (r1, _) = PlaceholderRegistry::build(&engine);
        let (r2, _) = PlaceholderRegistry::build(&engine);
        let c = ctx();
        assert_eq!(
            r1.lookup("status").unwrap().resolve(&c),
            r2.lookup("status").unwrap().resolve(&c)
        );
    }
}
