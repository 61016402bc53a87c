#![forbid(unsafe_code)]

//! Mode lookup for cross-grammar delegation.
//!
//! Delegate targets qualified with a mode name (`"javascript::MAIN"`) are
//! resolved through a [`ModeResolver`] injected into
//! [`TokenMarker::mark_tokens`](crate::TokenMarker::mark_tokens) rather than
//! a process-wide singleton, so tests can supply synthetic grammars.
//! Resolution is name-based and lazy, which is what lets grammars reference
//! each other cyclically (HTML delegating to JS delegating back to HTML)
//! without eager construction recursion.

use crate::marker::TokenMarker;
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Read-only capability mapping a mode name to its tokenizer.
pub trait ModeResolver {
    fn resolve_mode(&self, mode: &str) -> Option<Arc<TokenMarker>>;
}

/// Resolver for grammars that never delegate across modes.
impl ModeResolver for () {
    fn resolve_mode(&self, _mode: &str) -> Option<Arc<TokenMarker>> {
        None
    }
}

/// A table of named modes backing [`ModeResolver`].
#[derive(Debug, Clone, Default)]
pub struct ModeRegistry {
    modes: FxHashMap<String, Arc<TokenMarker>>,
}

impl ModeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a mode. Later registrations under the same name override
    /// earlier ones.
    pub fn register(&mut self, name: &str, marker: Arc<TokenMarker>) {
        self.modes.insert(name.to_string(), marker);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<TokenMarker>> {
        self.modes.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.modes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.modes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }
}

impl ModeResolver for ModeRegistry {
    fn resolve_mode(&self, mode: &str) -> Option<Arc<TokenMarker>> {
        self.modes.get(mode).cloned()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule_set::ParserRuleSet;

    fn marker() -> Arc<TokenMarker> {
        let mut m = TokenMarker::new();
        m.add_rule_set(ParserRuleSet::new("MAIN"));
        Arc::new(m)
    }

    #[test]
    fn register_and_resolve() {
        let mut registry = ModeRegistry::new();
        registry.register("html", marker());
        assert!(registry.resolve_mode("html").is_some());
        assert!(registry.resolve_mode("tex").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn later_registration_overrides() {
        let mut registry = ModeRegistry::new();
        let first = marker();
        let second = marker();
        registry.register("html", first);
        registry.register("html", second.clone());
        let resolved = registry.resolve_mode("html").unwrap();
        assert!(Arc::ptr_eq(&resolved, &second));
    }

    #[test]
    fn unit_resolver_resolves_nothing() {
        assert!(().resolve_mode("anything").is_none());
    }
}
