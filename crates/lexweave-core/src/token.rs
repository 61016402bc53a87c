#![forbid(unsafe_code)]

//! Token model and the push-style consumer interface.
//!
//! Tokens are produced per line by [`TokenMarker`](crate::TokenMarker) and
//! pushed into a [`TokenSink`]. A token is a classified run of characters;
//! the tokens emitted for a line tile it exactly (the sum of their lengths
//! equals the line's character count), followed by a zero-length
//! [`TokenType::End`] sentinel.

use crate::rule_set::ParserRuleSet;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Token types
// ---------------------------------------------------------------------------

/// Semantic token categories.
///
/// `Whitespace` and `Tab` are pseudo-types used only while a grammar is being
/// authored; the marker rewrites them to the active rule set's default type
/// before emission, so consumers never observe them. `End` is the zero-length
/// terminator appended after every line.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TokenType {
    /// Unclassified text, displayed with the default style.
    #[default]
    Null,
    Comment1,
    Comment2,
    Literal1,
    Literal2,
    Label,
    Keyword1,
    Keyword2,
    Keyword3,
    Function,
    Markup,
    Operator,
    Digit,
    /// Malformed text, e.g. an unterminated no-line-break span.
    Invalid,
    /// Pseudo-type, resolved to the rule set default before emission.
    Whitespace,
    /// Pseudo-type, resolved to the rule set default before emission.
    Tab,
    /// Zero-length line terminator.
    End,
}

impl TokenType {
    /// Whether this is one of the internal pseudo-types that must be
    /// rewritten before a token becomes visible to consumers.
    pub fn is_pseudo(self) -> bool {
        matches!(self, Self::Whitespace | Self::Tab)
    }

    /// Whether this is a keyword category.
    pub fn is_keyword(self) -> bool {
        matches!(self, Self::Keyword1 | Self::Keyword2 | Self::Keyword3)
    }

    /// Whether this is a comment category.
    pub fn is_comment(self) -> bool {
        matches!(self, Self::Comment1 | Self::Comment2)
    }

    /// Whether this is a literal category.
    pub fn is_literal(self) -> bool {
        matches!(self, Self::Literal1 | Self::Literal2)
    }
}

// ---------------------------------------------------------------------------
// Token
// ---------------------------------------------------------------------------

/// A classified run of characters within one line.
///
/// Offsets and lengths count characters, not bytes, matching the `&[char]`
/// line buffers the marker scans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub offset: usize,
    pub length: usize,
    pub kind: TokenType,
}

impl Token {
    pub fn new(offset: usize, length: usize, kind: TokenType) -> Self {
        Self {
            offset,
            length,
            kind,
        }
    }

    /// The slice of the line this token covers.
    pub fn chars<'a>(&self, line: &'a [char]) -> &'a [char] {
        &line[self.offset..self.offset + self.length]
    }

    /// The token's text, materialized from the line buffer.
    pub fn text(&self, line: &[char]) -> String {
        self.chars(line).iter().collect()
    }
}

// ---------------------------------------------------------------------------
// TokenSink
// ---------------------------------------------------------------------------

/// Consumer of the token stream produced by a line tokenization pass.
///
/// `rules` is the rule set that was active when the token was produced;
/// painters use it to look up per-set default styles. The final call for a
/// line carries [`TokenType::End`] with length zero.
pub trait TokenSink {
    fn token(&mut self, offset: usize, length: usize, kind: TokenType, rules: &Arc<ParserRuleSet>);
}

/// A [`TokenSink`] that collects tokens into a `Vec`, dropping the `End`
/// sentinel.
#[derive(Debug, Clone, Default)]
pub struct TokenList {
    tokens: Vec<Token>,
}

impl TokenList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }

    /// Token kinds in emission order, handy for assertions.
    pub fn kinds(&self) -> Vec<TokenType> {
        self.tokens.iter().map(|t| t.kind).collect()
    }

    /// Sum of token lengths (the line length, by the tiling invariant).
    pub fn total_length(&self) -> usize {
        self.tokens.iter().map(|t| t.length).sum()
    }

    pub fn clear(&mut self) {
        self.tokens.clear();
    }
}

impl TokenSink for TokenList {
    fn token(&mut self, offset: usize, length: usize, kind: TokenType, _rules: &Arc<ParserRuleSet>) {
        if kind == TokenType::End {
            return;
        }
        self.tokens.push(Token::new(offset, length, kind));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
