#![forbid(unsafe_code)]

//! Continuation state threaded between consecutive lines.
//!
//! A [`LineContext`] records which rule set is active, which span rule (if
//! any) is currently open, and a parent chain for returning out of delegated
//! sub-grammars. The chain is a persistent linked structure: parent frames
//! are immutable behind `Arc`, so the clone a caller caches per line is
//! cheap structural sharing, and contexts for different lines can safely
//! share ancestor frames across threads.

use crate::marker::TokenMarker;
use crate::rule::ParserRule;
use crate::rule_set::ParserRuleSet;
use std::sync::Arc;

/// One frame of carried-forward parser state.
///
/// `parent == None` means the grammar's top-level context. A non-`None`
/// parent means a delegate span is active: `rules` is the delegate set and
/// the parent frame's `in_rule` records the span rule that caused the
/// delegation, so its end sequence pops back.
///
/// `marker` is the grammar owning `rules` once delegation has crossed into
/// another mode; unqualified delegate names inside the frame resolve against
/// it. `None` means the marker the tokenization call was entered through.
#[derive(Debug, Clone)]
pub struct LineContext {
    parent: Option<Arc<LineContext>>,
    in_rule: Option<Arc<ParserRule>>,
    rules: Arc<ParserRuleSet>,
    marker: Option<Arc<TokenMarker>>,
}

impl LineContext {
    /// Fresh top-level context for the given rule set.
    pub fn new(rules: Arc<ParserRuleSet>) -> Self {
        Self {
            parent: None,
            in_rule: None,
            rules,
            marker: None,
        }
    }

    /// Context entered when a span delegates into `rules`, owned by
    /// `marker` when the target crossed a mode boundary.
    pub(crate) fn delegated(
        parent: Arc<LineContext>,
        rules: Arc<ParserRuleSet>,
        marker: Option<Arc<TokenMarker>>,
    ) -> Self {
        Self {
            parent: Some(parent),
            in_rule: None,
            rules,
            marker,
        }
    }

    pub fn parent(&self) -> Option<&Arc<LineContext>> {
        self.parent.as_ref()
    }

    /// The span or mark-following rule currently open, if any.
    pub fn in_rule(&self) -> Option<&Arc<ParserRule>> {
        self.in_rule.as_ref()
    }

    /// The active rule set (the delegate set while delegation is active).
    pub fn rules(&self) -> &Arc<ParserRuleSet> {
        &self.rules
    }

    /// The grammar owning the active rule set, when it differs from the
    /// marker the scan was entered through.
    pub(crate) fn marker(&self) -> Option<&Arc<TokenMarker>> {
        self.marker.as_ref()
    }

    /// Whether this is the grammar's top-level context with nothing open.
    pub fn is_initial(&self) -> bool {
        self.parent.is_none() && self.in_rule.is_none()
    }

    pub(crate) fn set_in_rule(&mut self, rule: Arc<ParserRule>) {
        self.in_rule = Some(rule);
    }

    pub(crate) fn clear_in_rule(&mut self) {
        self.in_rule = None;
    }
}

/// Identity-based equality: two contexts are equal when they reference the
/// same rules and rule sets through the same chain shape. This is what line
/// caches compare to decide whether a downstream line needs re-tokenizing.
impl PartialEq for LineContext {
    fn eq(&self, other: &Self) -> bool {
        let rule_eq = match (&self.in_rule, &other.in_rule) {
            (None, None) => true,
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        };
        let parent_eq = match (&self.parent, &other.parent) {
            (None, None) => true,
            (Some(a), Some(b)) => Arc::ptr_eq(a, b) || **a == **b,
            _ => false,
        };
        let marker_eq = match (&self.marker, &other.marker) {
            (None, None) => true,
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        };
        rule_eq && parent_eq && marker_eq && Arc::ptr_eq(&self.rules, &other.rules)
    }
}

impl Eq for LineContext {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
