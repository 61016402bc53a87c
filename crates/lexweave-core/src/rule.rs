#![forbid(unsafe_code)]

//! Lexical rule descriptions.
//!
//! A [`ParserRule`] is an immutable value describing one lexical pattern:
//! the character sequences to match, what kind of pattern it is
//! ([`RuleAction`]), its token type, and modifier flags ([`RuleFlags`]).
//! Rules are built once by grammar loaders and never mutated afterwards,
//! which is what makes the grammar tables safely shareable across concurrent
//! tokenization calls.

use crate::token::TokenType;
use bitflags::bitflags;

bitflags! {
    /// Modifier flags altering how a rule matches and tokenizes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct RuleFlags: u8 {
        /// The matched delimiter is tokenized as the rule set's default type
        /// instead of the rule's own type (quotes not colored as string).
        const EXCLUDE_MATCH = 1 << 0;
        /// The rule fires only when its match starts at column 0 (for
        /// mark-previous rules: when the pending run starts at column 0).
        const AT_LINE_START = 1 << 1;
        /// A span with this flag left open at end of line is emitted as
        /// `Invalid` and closed instead of carrying into the next line.
        const NO_LINE_BREAK = 1 << 2;
        /// A span with this flag is "soft": a word break terminates it as
        /// `Invalid`, and ordinary rules may interrupt it.
        const NO_WORD_BREAK = 1 << 3;
    }
}

/// What a rule does when its start sequence matches.
///
/// This replaces the action bitmask of data-driven lexers of this family
/// with a sum type matched exhaustively, so illegal combinations cannot be
/// constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleAction {
    /// Fixed character sequence, one token covering the match.
    Seq,
    /// Start/end delimited region, possibly crossing lines, optionally
    /// routing its interior to another rule set.
    Span { delegate: Option<DelegateTarget> },
    /// Span implicitly ending at end of line.
    EolSpan,
    /// Retroactively classifies the pending run before the match.
    MarkPrevious,
    /// Classifies the run following the match, until the next word break.
    MarkFollowing,
    /// Hides the next character from every other rule.
    Escape,
    /// Contributes only a keyword boundary, no visible token of its own.
    Whitespace,
}

/// Name of a rule set a span delegates to, optionally qualified by mode:
/// `"javascript::MAIN"` or just `"TAGS"` for a set in the same grammar.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DelegateTarget {
    mode: Option<String>,
    set: String,
}

impl DelegateTarget {
    /// Parse a `"Mode::Set"` or `"Set"` reference.
    pub fn parse(name: &str) -> Self {
        match name.split_once("::") {
            Some((mode, set)) => Self {
                mode: Some(mode.to_string()),
                set: set.to_string(),
            },
            None => Self {
                mode: None,
                set: name.to_string(),
            },
        }
    }

    /// The mode component, if the target crosses grammar boundaries.
    pub fn mode(&self) -> Option<&str> {
        self.mode.as_deref()
    }

    /// The rule set name within the target grammar.
    pub fn set(&self) -> &str {
        &self.set
    }

    /// The fully qualified `"Mode::Set"` form for diagnostics.
    pub fn qualified(&self) -> String {
        match &self.mode {
            Some(mode) => format!("{mode}::{}", self.set),
            None => self.set.clone(),
        }
    }
}

/// One immutable lexical rule.
#[derive(Debug, Clone)]
pub struct ParserRule {
    start: Vec<char>,
    end: Vec<char>,
    action: RuleAction,
    flags: RuleFlags,
    token: TokenType,
}

impl ParserRule {
    fn new(start: &str, end: &str, action: RuleAction, token: TokenType) -> Self {
        Self {
            start: start.chars().collect(),
            end: end.chars().collect(),
            action,
            flags: RuleFlags::empty(),
            token,
        }
    }

    /// Fixed sequence rule.
    pub fn seq(start: &str, token: TokenType) -> Self {
        Self::new(start, "", RuleAction::Seq, token)
    }

    /// Plain span rule.
    pub fn span(start: &str, end: &str, token: TokenType) -> Self {
        Self::new(start, end, RuleAction::Span { delegate: None }, token)
    }

    /// Span routing its interior to another rule set, named as
    /// `"Mode::Set"` or `"Set"`.
    pub fn delegate_span(start: &str, end: &str, token: TokenType, target: &str) -> Self {
        Self::new(
            start,
            end,
            RuleAction::Span {
                delegate: Some(DelegateTarget::parse(target)),
            },
            token,
        )
    }

    /// Span consuming the remainder of the line.
    pub fn eol_span(start: &str, token: TokenType) -> Self {
        Self::new(start, "", RuleAction::EolSpan, token)
    }

    /// Trailing-delimiter rule classifying the run before the match.
    pub fn mark_previous(start: &str, token: TokenType) -> Self {
        Self::new(start, "", RuleAction::MarkPrevious, token)
    }

    /// Leading-delimiter rule classifying the run after the match.
    pub fn mark_following(start: &str, token: TokenType) -> Self {
        Self::new(start, "", RuleAction::MarkFollowing, token)
    }

    /// Escape sequence rule; carries no token type of its own.
    pub fn escape(start: &str) -> Self {
        Self::new(start, "", RuleAction::Escape, TokenType::Null)
    }

    /// Whitespace rule; affects keyword boundaries only.
    pub fn whitespace(start: &str) -> Self {
        Self::new(start, "", RuleAction::Whitespace, TokenType::Whitespace)
    }

    /// Attach modifier flags; consumes and returns the rule so grammar
    /// builders can chain it.
    pub fn with_flags(mut self, flags: RuleFlags) -> Self {
        self.flags |= flags;
        self
    }

    pub fn start(&self) -> &[char] {
        &self.start
    }

    pub fn end(&self) -> &[char] {
        &self.end
    }

    pub fn action(&self) -> &RuleAction {
        &self.action
    }

    pub fn flags(&self) -> RuleFlags {
        self.flags
    }

    pub fn token(&self) -> TokenType {
        self.token
    }

    /// First character of the start sequence, used for rule set bucketing.
    pub fn first_char(&self) -> Option<char> {
        self.start.first().copied()
    }

    /// Whether a word break terminates this rule while it is active.
    pub(crate) fn is_soft(&self) -> bool {
        matches!(self.action, RuleAction::MarkFollowing)
            || self.flags.contains(RuleFlags::NO_WORD_BREAK)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
