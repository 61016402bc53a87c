#![forbid(unsafe_code)]

//! Keyword lookup over character runs.
//!
//! A [`KeywordMap`] classifies a whole-word run of characters without
//! materializing a string. Entries are bucketed by the run's first and last
//! characters so a lookup scans only a handful of candidates even for large
//! keyword tables.

use crate::token::TokenType;

const BUCKETS: usize = 52;

/// Case-fold a character the way the map hashes and compares: first uppercase
/// mapping, identity for caseless characters.
pub(crate) fn fold(ch: char) -> char {
    ch.to_uppercase().next().unwrap_or(ch)
}

#[derive(Debug, Clone)]
struct Keyword {
    chars: Vec<char>,
    kind: TokenType,
}

/// A hash lookup from character runs to token types.
///
/// Bucket key is `(upper(first) + upper(last)) % 52`; within a bucket,
/// candidates are compared by length and then character by character,
/// honoring the map's case flag for both hashing and comparison.
#[derive(Debug, Clone)]
pub struct KeywordMap {
    ignore_case: bool,
    buckets: Vec<Vec<Keyword>>,
    no_word_sep: Vec<char>,
}

impl KeywordMap {
    pub fn new(ignore_case: bool) -> Self {
        Self {
            ignore_case,
            buckets: vec![Vec::new(); BUCKETS],
            no_word_sep: Vec::new(),
        }
    }

    pub fn ignore_case(&self) -> bool {
        self.ignore_case
    }

    /// Characters that appear in keywords but are neither letters nor digits.
    ///
    /// Word-boundary detection treats these as word characters so keywords
    /// like `#include` or `end-if` survive as single runs. Also consumed by
    /// completion-style collaborators.
    pub fn no_word_sep(&self) -> &[char] {
        &self.no_word_sep
    }

    /// Register a keyword. Non-alphanumeric characters in the keyword are
    /// recorded into the non-word-separator set.
    pub fn add(&mut self, keyword: &str, kind: TokenType) {
        let chars: Vec<char> = keyword.chars().collect();
        if chars.is_empty() {
            return;
        }
        for &ch in &chars {
            if !ch.is_alphanumeric() && !self.no_word_sep.contains(&ch) {
                self.no_word_sep.push(ch);
            }
        }
        let bucket = self.bucket_of(chars[0], chars[chars.len() - 1]);
        self.buckets[bucket].push(Keyword { chars, kind });
    }

    /// Classify a run. Returns [`TokenType::Null`] for the empty run and for
    /// runs matching no keyword.
    pub fn lookup(&self, run: &[char]) -> TokenType {
        if run.is_empty() {
            return TokenType::Null;
        }
        let bucket = self.bucket_of(run[0], run[run.len() - 1]);
        for keyword in &self.buckets[bucket] {
            if keyword.chars.len() != run.len() {
                continue;
            }
            let matches = if self.ignore_case {
                keyword
                    .chars
                    .iter()
                    .zip(run)
                    .all(|(&a, &b)| fold(a) == fold(b))
            } else {
                keyword.chars == run
            };
            if matches {
                return keyword.kind;
            }
        }
        TokenType::Null
    }

    fn bucket_of(&self, first: char, last: char) -> usize {
        (fold(first) as usize + fold(last) as usize) % BUCKETS
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
