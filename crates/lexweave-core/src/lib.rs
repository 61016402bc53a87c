#![forbid(unsafe_code)]

//! Rule-set-driven incremental tokenizer for syntax highlighting.
//!
//! This crate implements the lexer core that drives editor highlighting:
//! a data-driven state machine converting one line of text at a time into a
//! sequence of classified tokens, while carrying multi-line parsing state
//! (open comments, open strings, mode delegation) between lines.
//!
//! - [`TokenMarker`] - owns a grammar's named rule sets and runs the scan
//! - [`ParserRuleSet`] / [`ParserRule`] - the immutable rule tables
//! - [`KeywordMap`] - allocation-free whole-word classification
//! - [`LineContext`] - the continuation state cached per line
//! - [`TokenSink`] / [`TokenList`] - push-style token consumers
//! - [`ModeRegistry`] - name-based resolution for cross-grammar delegation
//!
//! Grammar tables are immutable once loaded; `mark_tokens` mutates only its
//! call-local scan state, so one grammar can tokenize different lines
//! concurrently (a background relex alongside foreground display).
//!
//! # Example
//! ```
//! use lexweave_core::{ParserRule, ParserRuleSet, TokenMarker, TokenType};
//!
//! let mut main = ParserRuleSet::new("MAIN");
//! main.add_rule(ParserRule::span("/*", "*/", TokenType::Comment1));
//!
//! let mut marker = TokenMarker::new();
//! marker.add_rule_set(main);
//!
//! let (tokens, context) = marker.tokenize_line(&(), None, "a /* b");
//! assert_eq!(tokens[1].kind, TokenType::Comment1);
//! // the comment is still open, the context says so
//! assert!(context.in_rule().is_some());
//! ```

pub mod context;
pub mod digit;
pub mod keyword;
pub mod marker;
pub mod registry;
pub mod rule;
pub mod rule_set;
pub mod token;

pub use context::LineContext;
pub use keyword::KeywordMap;
pub use marker::{MAIN_RULE_SET, TokenMarker};
pub use registry::{ModeRegistry, ModeResolver};
pub use rule::{DelegateTarget, ParserRule, RuleAction, RuleFlags};
pub use rule_set::ParserRuleSet;
pub use token::{Token, TokenList, TokenSink, TokenType};
