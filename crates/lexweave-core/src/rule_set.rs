#![forbid(unsafe_code)]

//! Named collections of lexical rules.
//!
//! A [`ParserRuleSet`] is one lexical mode within a grammar (MAIN, or a
//! sub-state like "inside a tag"). Rules are bucketed by the upper-cased
//! first character of their start sequence so the scanner dispatches in O(1)
//! to a short chain; insertion order within a bucket is match priority.
//! Buckets for different first characters never compete.

use crate::keyword::{KeywordMap, fold};
use crate::rule::ParserRule;
use crate::token::TokenType;
use std::sync::Arc;

const RULE_BUCKETS: usize = 32;

/// A named, bucketed rule table plus keyword map and per-set policy.
///
/// Rule sets are frozen behind `Arc` once registered with a
/// [`TokenMarker`](crate::TokenMarker); the scanner only ever reads them.
#[derive(Debug, Clone)]
pub struct ParserRuleSet {
    name: String,
    default_token: TokenType,
    ignore_case: bool,
    highlight_digits: bool,
    terminate_char: Option<usize>,
    keywords: Option<KeywordMap>,
    escape_rule: Option<Arc<ParserRule>>,
    buckets: Vec<Vec<Arc<ParserRule>>>,
}

impl ParserRuleSet {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            default_token: TokenType::Null,
            ignore_case: false,
            highlight_digits: false,
            terminate_char: None,
            keywords: None,
            escape_rule: None,
            buckets: vec![Vec::new(); RULE_BUCKETS],
        }
    }

    /// An empty rule set with only a default token type. Fallback for
    /// markers with no MAIN set and for truncated-tail scanning.
    pub fn standard(default_token: TokenType) -> Self {
        let mut set = Self::new("STANDARD");
        set.default_token = default_token;
        set
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn default_token(&self) -> TokenType {
        self.default_token
    }

    pub fn set_default(&mut self, token: TokenType) {
        self.default_token = token;
    }

    pub fn ignore_case(&self) -> bool {
        self.ignore_case
    }

    pub fn set_ignore_case(&mut self, ignore_case: bool) {
        self.ignore_case = ignore_case;
    }

    pub fn highlight_digits(&self) -> bool {
        self.highlight_digits
    }

    pub fn set_highlight_digits(&mut self, highlight: bool) {
        self.highlight_digits = highlight;
    }

    /// Column after which scanning stops and the rest of the line is emitted
    /// as the default type. `None` scans the whole line.
    pub fn terminate_char(&self) -> Option<usize> {
        self.terminate_char
    }

    pub fn set_terminate_char(&mut self, column: usize) {
        self.terminate_char = Some(column);
    }

    pub fn keywords(&self) -> Option<&KeywordMap> {
        self.keywords.as_ref()
    }

    pub fn set_keywords(&mut self, keywords: KeywordMap) {
        self.keywords = Some(keywords);
    }

    pub fn escape_rule(&self) -> Option<&Arc<ParserRule>> {
        self.escape_rule.as_ref()
    }

    /// Install the escape sequence recognized inside this set's spans and
    /// runs.
    pub fn set_escape(&mut self, rule: ParserRule) {
        self.escape_rule = Some(Arc::new(rule));
    }

    /// Append a rule to the bucket keyed by its first character. Rules with
    /// an empty start sequence are ignored; empty triggers are legal only
    /// for terminator-style use and never dispatch by character.
    pub fn add_rule(&mut self, rule: ParserRule) {
        let Some(first) = rule.first_char() else {
            return;
        };
        let bucket = Self::bucket_of(first);
        self.buckets[bucket].push(Arc::new(rule));
    }

    /// The rule chain that could match at a position starting with `ch`.
    pub fn rules_for(&self, ch: char) -> &[Arc<ParserRule>] {
        &self.buckets[Self::bucket_of(ch)]
    }

    /// Total number of rules, for diagnostics.
    pub fn rule_count(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    fn bucket_of(ch: char) -> usize {
        fold(ch) as usize % RULE_BUCKETS
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
