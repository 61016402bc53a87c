#![forbid(unsafe_code)]

//! The line tokenization state machine.
//!
//! A [`TokenMarker`] owns a grammar's named rule sets and converts one line
//! of text at a time into a token stream, carrying multi-line state (open
//! comments, open strings, mode delegation) between lines through
//! [`LineContext`] snapshots.
//!
//! Scanning a position proceeds in a fixed order:
//! 1. delegation unwind: does the delegating span's end sequence match here?
//! 2. escape sequences, which hide the next character from every other check
//! 3. active span end: hard spans accumulate, soft spans fall through
//! 4. bucket dispatch, where the first matching rule in insertion order wins
//! 5. word-break boundary: digit heuristic, then keyword lookup
//!
//! The marker never fails for data-driven reasons: malformed input degrades
//! to `Invalid` or default classifications, and an unresolvable delegate
//! target is logged and treated as a non-match.

use crate::context::LineContext;
use crate::digit::is_digit_run;
use crate::keyword::fold;
use crate::registry::ModeResolver;
use crate::rule::{DelegateTarget, ParserRule, RuleAction, RuleFlags};
use crate::rule_set::ParserRuleSet;
use crate::token::{Token, TokenList, TokenSink, TokenType};
use rustc_hash::FxHashMap;
use std::sync::Arc;
use tracing::warn;

/// The name under which a grammar's entry rule set is registered.
pub const MAIN_RULE_SET: &str = "MAIN";

// ---------------------------------------------------------------------------
// TokenMarker
// ---------------------------------------------------------------------------

/// A grammar's rule set table plus the line tokenization algorithm.
///
/// Markers are immutable once grammar loading completes; `mark_tokens` only
/// mutates its call-local scan state and the caller's sink, so one marker
/// can tokenize different lines concurrently.
#[derive(Debug, Clone, Default)]
pub struct TokenMarker {
    rule_sets: FxHashMap<String, Arc<ParserRuleSet>>,
    main: Option<Arc<ParserRuleSet>>,
}

impl TokenMarker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rule set under its name. The set named `MAIN` becomes the
    /// grammar's entry point.
    pub fn add_rule_set(&mut self, rules: ParserRuleSet) {
        let rules = Arc::new(rules);
        if rules.name() == MAIN_RULE_SET {
            self.main = Some(rules.clone());
        }
        self.rule_sets.insert(rules.name().to_string(), rules);
    }

    pub fn rule_set(&self, name: &str) -> Option<&Arc<ParserRuleSet>> {
        self.rule_sets.get(name)
    }

    pub fn main_rule_set(&self) -> Option<&Arc<ParserRuleSet>> {
        self.main.as_ref()
    }

    /// Tokenize one line, pushing tokens into `sink` and returning the
    /// continuation state to cache for the next line.
    ///
    /// `prev` is the context the previous line ended with, or `None` for the
    /// first line (or when upstream highlighting was invalidated). The token
    /// stream tiles the line exactly and ends with a zero-length
    /// [`TokenType::End`] sentinel.
    pub fn mark_tokens(
        &self,
        resolver: &dyn ModeResolver,
        prev: Option<&LineContext>,
        line: &[char],
        sink: &mut dyn TokenSink,
    ) -> LineContext {
        let context = match prev {
            Some(prev) => prev.clone(),
            None => LineContext::new(self.main_or_standard()),
        };
        let scan = Scan {
            marker: self,
            resolver,
            line,
            sink,
            context,
            pos: 0,
            last_offset: 0,
            last_keyword: 0,
            escaped: false,
        };
        scan.run()
    }

    /// Convenience wrapper collecting the line's tokens into a `Vec`.
    pub fn tokenize_line(
        &self,
        resolver: &dyn ModeResolver,
        prev: Option<&LineContext>,
        text: &str,
    ) -> (Vec<Token>, LineContext) {
        let line: Vec<char> = text.chars().collect();
        let mut list = TokenList::new();
        let context = self.mark_tokens(resolver, prev, &line, &mut list);
        (list.into_tokens(), context)
    }

    fn main_or_standard(&self) -> Arc<ParserRuleSet> {
        match &self.main {
            Some(main) => main.clone(),
            None => {
                warn!("token marker has no MAIN rule set, using an empty fallback");
                Arc::new(ParserRuleSet::standard(TokenType::Null))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Scan state
// ---------------------------------------------------------------------------

/// Outcome of the active-span check at one position.
enum SpanStep {
    /// The position was consumed (span body character or matched end).
    Consumed,
    /// Soft span or no span: continue with ordinary dispatch.
    FallThrough,
}

/// Call-local state for tokenizing a single line.
///
/// `last_offset` is the start of the pending not-yet-emitted run;
/// `last_keyword` is the start of the current keyword candidate within it.
/// Both invariantly satisfy `last_offset <= last_keyword <= pos`.
struct Scan<'a> {
    marker: &'a TokenMarker,
    resolver: &'a dyn ModeResolver,
    line: &'a [char],
    sink: &'a mut dyn TokenSink,
    context: LineContext,
    pos: usize,
    last_offset: usize,
    last_keyword: usize,
    escaped: bool,
}

impl Scan<'_> {
    fn run(mut self) -> LineContext {
        let len = self.line.len();
        let limit = match self.context.rules().terminate_char() {
            Some(column) if column < len => column,
            _ => len,
        };

        while self.pos < limit {
            if self.escaped {
                // the escaped character joins the ambient run untested
                self.escaped = false;
                self.pos += 1;
                continue;
            }

            if self.try_delegate_end() {
                continue;
            }

            if self.try_escape() {
                continue;
            }

            match self.span_step() {
                SpanStep::Consumed => continue,
                SpanStep::FallThrough => {}
            }

            if self.dispatch() {
                continue;
            }

            let ch = self.line[self.pos];
            if !self.is_word_char(ch) {
                self.word_break();
            }
            self.pos += 1;
        }

        self.finish(limit, len)
    }

    // -- position checks, in scan order -------------------------------------

    /// Step 1: pop out of a delegated grammar if the delegating span's end
    /// sequence matches here.
    fn try_delegate_end(&mut self) -> bool {
        let Some(parent) = self.context.parent().cloned() else {
            return false;
        };
        let Some(rule) = parent.in_rule().cloned() else {
            return false;
        };
        if rule.end().is_empty() {
            return false;
        }
        if !self.seq_matches_with(rule.end(), parent.rules().ignore_case()) {
            return false;
        }

        let pos = self.pos;
        let end_len = rule.end().len();

        // a span left open inside the delegate closes with it
        if let Some(inner) = self.context.in_rule().cloned() {
            self.emit_run(self.last_offset, pos, inner.token());
            self.last_offset = pos;
            self.last_keyword = pos;
            self.context.clear_in_rule();
        }

        // flush what the delegate set accumulated
        self.mark_keyword(pos);
        self.flush_default(pos);

        let delimiter = if rule.flags().contains(RuleFlags::EXCLUDE_MATCH) {
            parent.rules().default_token()
        } else {
            rule.token()
        };
        self.emit(pos, end_len, delimiter);

        let mut restored = (*parent).clone();
        restored.clear_in_rule();
        self.context = restored;
        self.last_offset = pos + end_len;
        self.last_keyword = pos + end_len;
        self.pos = pos + end_len;
        true
    }

    /// Step 2: escape sequences fold into the ambient token and hide the
    /// next character from every other rule.
    fn try_escape(&mut self) -> bool {
        let Some(escape) = self.context.rules().escape_rule().cloned() else {
            return false;
        };
        if !self.seq_matches(escape.start()) {
            return false;
        }
        self.escaped = true;
        self.pos += escape.start().len();
        true
    }

    /// Step 3: active span handling. Hard spans consume the character; soft
    /// spans (mark-following, no-word-break) fall through so ordinary rules
    /// can interrupt them.
    fn span_step(&mut self) -> SpanStep {
        let Some(rule) = self.context.in_rule().cloned() else {
            return SpanStep::FallThrough;
        };
        match rule.action() {
            RuleAction::Span { .. } => {
                if !rule.end().is_empty() && self.seq_matches(rule.end()) {
                    self.close_span(&rule);
                    return SpanStep::Consumed;
                }
                if rule.is_soft() {
                    SpanStep::FallThrough
                } else {
                    self.pos += 1;
                    SpanStep::Consumed
                }
            }
            RuleAction::MarkFollowing => SpanStep::FallThrough,
            _ => unreachable!("only span and mark-following rules stay active across positions"),
        }
    }

    /// Step 4: try every rule in the bucket for the current character, in
    /// insertion order; the first full match wins.
    fn dispatch(&mut self) -> bool {
        let rules = self.context.rules().clone();
        let chain = rules.rules_for(self.line[self.pos]);
        for rule in chain {
            if self.try_rule(rule) {
                return true;
            }
        }
        false
    }

    /// Step 5: the current character ends a keyword candidate. Also closes
    /// soft spans, which cannot contain word breaks.
    fn word_break(&mut self) {
        if let Some(rule) = self.context.in_rule().cloned() {
            match rule.action() {
                RuleAction::MarkFollowing => {
                    // following runs end at the first word break
                    self.emit_run(self.last_offset, self.pos, rule.token());
                    self.last_offset = self.pos;
                    self.last_keyword = self.pos;
                    self.context.clear_in_rule();
                }
                RuleAction::Span { .. } if rule.flags().contains(RuleFlags::NO_WORD_BREAK) => {
                    self.emit_run(self.last_offset, self.pos, TokenType::Invalid);
                    self.last_offset = self.pos;
                    self.last_keyword = self.pos;
                    self.context.clear_in_rule();
                }
                _ => {}
            }
        }
        self.mark_keyword(self.pos);
        self.last_keyword = self.pos + 1;
    }

    // -- rule application ----------------------------------------------------

    /// Resolve a delegate target against the grammar owning the active rule
    /// set: unqualified names stay within the owning marker (which differs
    /// from the entry marker once delegation has crossed modes), `Mode::Set`
    /// names go through the resolver. Returns the delegate set and the
    /// marker owning the new frame, or `None` when either the mode or the
    /// set is unknown.
    fn resolve_delegate(
        &self,
        target: &DelegateTarget,
    ) -> Option<(Arc<ParserRuleSet>, Option<Arc<TokenMarker>>)> {
        match target.mode() {
            None => {
                let set = match self.context.marker() {
                    Some(owner) => owner.rule_sets.get(target.set()).cloned()?,
                    None => self.marker.rule_sets.get(target.set()).cloned()?,
                };
                Some((set, self.context.marker().cloned()))
            }
            Some(mode) => {
                let owner = self.resolver.resolve_mode(mode)?;
                let set = owner.rule_sets.get(target.set()).cloned()?;
                Some((set, Some(owner)))
            }
        }
    }

    /// Match `rule` at the current position and, on success, apply its
    /// action. Returns whether the rule fired.
    fn try_rule(&mut self, rule: &Arc<ParserRule>) -> bool {
        let start = rule.start();
        if start.is_empty() {
            return false;
        }
        if rule.flags().contains(RuleFlags::AT_LINE_START) {
            let anchor = if matches!(rule.action(), RuleAction::MarkPrevious) {
                self.last_keyword
            } else {
                self.pos
            };
            if anchor != 0 {
                return false;
            }
        }
        if !self.seq_matches(start) {
            return false;
        }

        // an unresolvable delegate makes the whole rule a non-match
        let delegate = match rule.action() {
            RuleAction::Span {
                delegate: Some(target),
            } => match self.resolve_delegate(target) {
                Some(resolved) => Some(resolved),
                None => {
                    warn!(target = %target.qualified(), "unresolvable delegate rule set");
                    return false;
                }
            },
            _ => None,
        };

        let len = start.len();
        let pos = self.pos;

        // escapes are transparent: no boundary, no soft-span interruption
        if matches!(rule.action(), RuleAction::Escape) {
            self.escaped = true;
            self.pos = pos + len;
            return true;
        }

        // any other matching rule interrupts a still-open soft span
        self.close_soft();

        match rule.action() {
            RuleAction::Whitespace => {
                self.mark_keyword(pos);
                self.last_keyword = pos + len;
            }
            RuleAction::Seq => {
                self.mark_keyword(pos);
                self.flush_default(pos);
                self.emit(pos, len, rule.token());
                self.last_offset = pos + len;
                self.last_keyword = pos + len;
            }
            RuleAction::Span { .. } => {
                self.mark_keyword(pos);
                self.flush_default(pos);
                let exclude = rule.flags().contains(RuleFlags::EXCLUDE_MATCH);
                match delegate {
                    Some((set, owner)) => {
                        // the start delimiter belongs to the host grammar,
                        // the interior to the delegate set
                        let delimiter = if exclude {
                            self.context.rules().default_token()
                        } else {
                            rule.token()
                        };
                        self.emit(pos, len, delimiter);
                        self.last_offset = pos + len;
                        let mut parent = self.context.clone();
                        parent.set_in_rule(rule.clone());
                        self.context = LineContext::delegated(Arc::new(parent), set, owner);
                    }
                    None => {
                        if exclude {
                            self.emit(pos, len, self.context.rules().default_token());
                            self.last_offset = pos + len;
                        } else {
                            self.last_offset = pos;
                        }
                        self.context.set_in_rule(rule.clone());
                    }
                }
                self.last_keyword = pos + len;
            }
            RuleAction::EolSpan => {
                self.mark_keyword(pos);
                self.flush_default(pos);
                let len_line = self.line.len();
                if rule.flags().contains(RuleFlags::EXCLUDE_MATCH) {
                    self.emit(pos, len, self.context.rules().default_token());
                    self.emit_run(pos + len, len_line, rule.token());
                } else {
                    self.emit_run(pos, len_line, rule.token());
                }
                self.last_offset = len_line;
                self.last_keyword = len_line;
                self.pos = len_line;
                return true;
            }
            RuleAction::MarkPrevious => {
                // classify the pending run retroactively, then the delimiter
                self.flush_default(self.last_keyword);
                self.emit_run(self.last_keyword, pos, rule.token());
                let delimiter = if rule.flags().contains(RuleFlags::EXCLUDE_MATCH) {
                    self.context.rules().default_token()
                } else {
                    rule.token()
                };
                self.emit(pos, len, delimiter);
                self.last_offset = pos + len;
                self.last_keyword = pos + len;
            }
            RuleAction::MarkFollowing => {
                self.mark_keyword(pos);
                self.flush_default(pos);
                if rule.flags().contains(RuleFlags::EXCLUDE_MATCH) {
                    self.emit(pos, len, self.context.rules().default_token());
                    self.last_offset = pos + len;
                } else {
                    self.last_offset = pos;
                }
                self.last_keyword = pos + len;
                self.context.set_in_rule(rule.clone());
            }
            RuleAction::Escape => unreachable!("handled above"),
        }

        self.pos = pos + len;
        true
    }

    /// Close a non-delegating span whose end sequence matched at `pos`.
    fn close_span(&mut self, rule: &Arc<ParserRule>) {
        let pos = self.pos;
        let end_len = rule.end().len();
        if rule.flags().contains(RuleFlags::EXCLUDE_MATCH) {
            self.emit_run(self.last_offset, pos, rule.token());
            self.emit(pos, end_len, self.context.rules().default_token());
        } else {
            self.emit_run(self.last_offset, pos + end_len, rule.token());
        }
        self.last_offset = pos + end_len;
        self.last_keyword = pos + end_len;
        self.context.clear_in_rule();
        self.pos = pos + end_len;
    }

    /// Close an open soft span because another rule matched. The
    /// accumulated run keeps the soft rule's own type; only word breaks
    /// invalidate a no-word-break span.
    fn close_soft(&mut self) {
        let Some(rule) = self.context.in_rule().cloned() else {
            return;
        };
        if !rule.is_soft() {
            return;
        }
        self.emit_run(self.last_offset, self.pos, rule.token());
        self.last_offset = self.pos;
        self.last_keyword = self.pos;
        self.context.clear_in_rule();
    }

    // -- end of line ---------------------------------------------------------

    fn finish(mut self, limit: usize, len: usize) -> LineContext {
        // settle the innermost frame's open rule first
        if let Some(rule) = self.context.in_rule().cloned() {
            match rule.action() {
                // following runs never cross lines
                RuleAction::MarkFollowing => {
                    self.emit_run(self.last_offset, len, rule.token());
                    self.last_offset = len;
                    self.last_keyword = len;
                    self.context.clear_in_rule();
                }
                _ if rule.flags().contains(RuleFlags::NO_LINE_BREAK) => {
                    // containment: one broken span must not corrupt the
                    // rest of the buffer
                    self.emit_run(self.last_offset, len, TokenType::Invalid);
                    self.last_offset = len;
                    self.last_keyword = len;
                    self.context.clear_in_rule();
                }
                _ => {
                    self.emit_run(self.last_offset, len, rule.token());
                    self.last_offset = len;
                    self.last_keyword = len;
                }
            }
        }

        // delegating spans that forbid line breaks unwind here too; frames
        // can stack, so pop every such frame, open inner state included
        while let Some(parent) = self.context.parent().cloned() {
            let Some(rule) = parent.in_rule() else {
                break;
            };
            if !rule.flags().contains(RuleFlags::NO_LINE_BREAK) {
                break;
            }
            self.emit_run(self.last_offset, len, TokenType::Invalid);
            self.last_offset = len;
            self.last_keyword = len;
            let mut restored = (*parent).clone();
            restored.clear_in_rule();
            self.context = restored;
        }

        // nothing open anymore: classify the run scanned before the
        // terminate limit, then flush the remainder as the default type
        if self.context.in_rule().is_none() {
            self.mark_keyword(limit);
            self.flush_default(len);
        }

        self.emit(len, 0, TokenType::End);
        self.context
    }

    // -- run bookkeeping -----------------------------------------------------

    /// Test the pending keyword candidate `[last_keyword, to)`: the digit
    /// heuristic first (it always wins over the keyword map), then the
    /// keyword map. A hit flushes the default prefix and emits the run.
    fn mark_keyword(&mut self, to: usize) {
        if self.last_keyword >= to {
            return;
        }
        let rules = self.context.rules().clone();
        let line = self.line;
        let run = &line[self.last_keyword..to];

        if rules.highlight_digits() && is_digit_run(run) {
            self.flush_default(self.last_keyword);
            self.emit(self.last_keyword, to - self.last_keyword, TokenType::Digit);
            self.last_offset = to;
            return;
        }

        if let Some(keywords) = rules.keywords() {
            let kind = keywords.lookup(run);
            if kind != TokenType::Null {
                self.flush_default(self.last_keyword);
                self.emit(self.last_keyword, to - self.last_keyword, kind);
                self.last_offset = to;
            }
        }
    }

    /// Emit `[last_offset, to)` as the active set's default type.
    fn flush_default(&mut self, to: usize) {
        if self.last_offset < to {
            let default = self.context.rules().default_token();
            self.emit(self.last_offset, to - self.last_offset, default);
            self.last_offset = to;
        }
    }

    fn emit_run(&mut self, from: usize, to: usize, kind: TokenType) {
        if from < to {
            self.emit(from, to - from, kind);
        }
    }

    /// Push one token, rewriting the whitespace/tab pseudo-types to the
    /// active set's default so they never escape the marker.
    fn emit(&mut self, offset: usize, length: usize, kind: TokenType) {
        if length == 0 && kind != TokenType::End {
            return;
        }
        let kind = if kind.is_pseudo() {
            self.context.rules().default_token()
        } else {
            kind
        };
        self.sink.token(offset, length, kind, self.context.rules());
    }

    // -- character helpers ---------------------------------------------------

    fn seq_matches(&self, seq: &[char]) -> bool {
        self.seq_matches_with(seq, self.context.rules().ignore_case())
    }

    fn seq_matches_with(&self, seq: &[char], ignore_case: bool) -> bool {
        let end = self.pos + seq.len();
        if seq.is_empty() || end > self.line.len() {
            return false;
        }
        self.line[self.pos..end].iter().zip(seq).all(|(&a, &b)| {
            if ignore_case {
                fold(a) == fold(b)
            } else {
                a == b
            }
        })
    }

    fn is_word_char(&self, ch: char) -> bool {
        if ch.is_alphanumeric() || ch == '_' {
            return true;
        }
        self.context
            .rules()
            .keywords()
            .is_some_and(|map| map.no_word_sep().contains(&ch))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyword::KeywordMap;
    use crate::rule::{ParserRule, RuleFlags};

    /// A small C-flavored grammar used throughout the unit tests.
    fn c_marker() -> TokenMarker {
        let mut keywords = KeywordMap::new(false);
        keywords.add("if", TokenType::Keyword1);
        keywords.add("int", TokenType::Keyword3);

        let mut main = ParserRuleSet::new("MAIN");
        main.set_keywords(keywords);
        main.set_highlight_digits(true);
        main.add_rule(ParserRule::span("/*", "*/", TokenType::Comment1));
        main.add_rule(ParserRule::eol_span("//", TokenType::Comment1));
        main.add_rule(
            ParserRule::span("\"", "\"", TokenType::Literal1).with_flags(RuleFlags::NO_LINE_BREAK),
        );
        main.add_rule(ParserRule::seq("+", TokenType::Operator));
        main.set_escape(ParserRule::escape("\\"));

        let mut marker = TokenMarker::new();
        marker.add_rule_set(main);
        marker
    }

    fn kinds(tokens: &[Token]) -> Vec<TokenType> {
        tokens.iter().map(|t| t.kind).collect()
    }

    #[test]
    fn keywords_beat_default() {
        let marker = c_marker();
        let (tokens, context) = marker.tokenize_line(&(), None, "if x");
        assert_eq!(tokens[0], Token::new(0, 2, TokenType::Keyword1));
        assert_eq!(tokens[1], Token::new(2, 2, TokenType::Null));
        assert!(context.is_initial());
    }

    #[test]
    fn digit_heuristic_beats_keyword_lookup() {
        let mut keywords = KeywordMap::new(false);
        keywords.add("0x1F", TokenType::Keyword1);
        let mut main = ParserRuleSet::new("MAIN");
        main.set_keywords(keywords);
        main.set_highlight_digits(true);
        let mut marker = TokenMarker::new();
        marker.add_rule_set(main);

        let (tokens, _) = marker.tokenize_line(&(), None, "0x1F");
        assert_eq!(kinds(&tokens), vec![TokenType::Digit]);
    }

    #[test]
    fn digit_runs() {
        let marker = c_marker();
        let (tokens, _) = marker.tokenize_line(&(), None, "0x1F");
        assert_eq!(kinds(&tokens), vec![TokenType::Digit]);

        let (tokens, _) = marker.tokenize_line(&(), None, "0x1G");
        assert_eq!(kinds(&tokens), vec![TokenType::Null]);
    }

    #[test]
    fn seq_rule_emits_operator() {
        let marker = c_marker();
        let (tokens, _) = marker.tokenize_line(&(), None, "a+b");
        assert_eq!(
            tokens,
            vec![
                Token::new(0, 1, TokenType::Null),
                Token::new(1, 1, TokenType::Operator),
                Token::new(2, 1, TokenType::Null),
            ]
        );
    }

    #[test]
    fn eol_span_consumes_remainder() {
        let marker = c_marker();
        let (tokens, context) = marker.tokenize_line(&(), None, "x // trailing");
        assert_eq!(
            tokens,
            vec![
                Token::new(0, 2, TokenType::Null),
                Token::new(2, 11, TokenType::Comment1),
            ]
        );
        assert!(context.is_initial());
    }

    #[test]
    fn escape_hides_span_delimiter() {
        let marker = c_marker();
        let (tokens, context) = marker.tokenize_line(&(), None, r#""a\"b""#);
        assert_eq!(kinds(&tokens), vec![TokenType::Literal1]);
        assert_eq!(tokens[0].length, 6);
        assert!(context.is_initial());
    }

    #[test]
    fn unterminated_no_line_break_span_is_invalid() {
        let marker = c_marker();
        let (tokens, context) = marker.tokenize_line(&(), None, "\"open");
        assert_eq!(kinds(&tokens), vec![TokenType::Invalid]);
        assert!(context.is_initial(), "next line must start fresh");
    }

    #[test]
    fn multi_line_comment_carries_context() {
        let marker = c_marker();
        let (tokens, context) = marker.tokenize_line(&(), None, "a /* open");
        assert_eq!(
            tokens,
            vec![
                Token::new(0, 2, TokenType::Null),
                Token::new(2, 7, TokenType::Comment1),
            ]
        );
        assert!(context.in_rule().is_some());

        let (tokens, context) = marker.tokenize_line(&(), Some(&context), "still */ if");
        assert_eq!(
            tokens,
            vec![
                Token::new(0, 8, TokenType::Comment1),
                Token::new(8, 1, TokenType::Null),
                Token::new(9, 2, TokenType::Keyword1),
            ]
        );
        assert!(context.is_initial());
    }

    #[test]
    fn empty_line_preserves_open_span() {
        let marker = c_marker();
        let (_, context) = marker.tokenize_line(&(), None, "/* open");
        let (tokens, context) = marker.tokenize_line(&(), Some(&context), "");
        assert!(tokens.is_empty());
        assert!(context.in_rule().is_some());
    }

    #[test]
    fn exclude_match_delimiters_use_default() {
        let mut main = ParserRuleSet::new("MAIN");
        main.add_rule(
            ParserRule::span("\"", "\"", TokenType::Literal1)
                .with_flags(RuleFlags::EXCLUDE_MATCH),
        );
        let mut marker = TokenMarker::new();
        marker.add_rule_set(main);

        let (tokens, _) = marker.tokenize_line(&(), None, "\"ab\"");
        assert_eq!(
            tokens,
            vec![
                Token::new(0, 1, TokenType::Null),
                Token::new(1, 2, TokenType::Literal1),
                Token::new(3, 1, TokenType::Null),
            ]
        );
    }

    #[test]
    fn at_line_start_only_fires_in_column_zero() {
        let mut main = ParserRuleSet::new("MAIN");
        main.add_rule(
            ParserRule::seq("#", TokenType::Keyword2).with_flags(RuleFlags::AT_LINE_START),
        );
        let mut marker = TokenMarker::new();
        marker.add_rule_set(main);

        let (tokens, _) = marker.tokenize_line(&(), None, "#a");
        assert_eq!(kinds(&tokens), vec![TokenType::Keyword2, TokenType::Null]);

        let (tokens, _) = marker.tokenize_line(&(), None, "a#");
        assert_eq!(kinds(&tokens), vec![TokenType::Null]);
    }

    #[test]
    fn mark_previous_classifies_pending_run() {
        let mut main = ParserRuleSet::new("MAIN");
        main.add_rule(
            ParserRule::mark_previous(":", TokenType::Label).with_flags(RuleFlags::EXCLUDE_MATCH),
        );
        let mut marker = TokenMarker::new();
        marker.add_rule_set(main);

        let (tokens, _) = marker.tokenize_line(&(), None, "loop: x");
        assert_eq!(
            tokens,
            vec![
                Token::new(0, 4, TokenType::Label),
                Token::new(4, 1, TokenType::Null),
                Token::new(5, 2, TokenType::Null),
            ]
        );
    }

    #[test]
    fn mark_following_runs_to_word_break() {
        let mut main = ParserRuleSet::new("MAIN");
        main.add_rule(ParserRule::mark_following("$", TokenType::Keyword2));
        let mut marker = TokenMarker::new();
        marker.add_rule_set(main);

        let (tokens, _) = marker.tokenize_line(&(), None, "$var rest");
        assert_eq!(
            tokens,
            vec![
                Token::new(0, 4, TokenType::Keyword2),
                Token::new(4, 5, TokenType::Null),
            ]
        );
    }

    #[test]
    fn mark_following_cleared_at_eol() {
        // regression: following runs are strictly single-line, unlike spans
        let mut main = ParserRuleSet::new("MAIN");
        main.add_rule(ParserRule::mark_following("$", TokenType::Keyword2));
        let mut marker = TokenMarker::new();
        marker.add_rule_set(main);

        let (tokens, context) = marker.tokenize_line(&(), None, "$var");
        assert_eq!(kinds(&tokens), vec![TokenType::Keyword2]);
        assert!(context.in_rule().is_none());

        let (tokens, _) = marker.tokenize_line(&(), Some(&context), "next");
        assert_eq!(kinds(&tokens), vec![TokenType::Null]);
    }

    #[test]
    fn no_word_break_span_invalidated_at_word_break() {
        let mut main = ParserRuleSet::new("MAIN");
        main.add_rule(
            ParserRule::span("'", "'", TokenType::Literal2).with_flags(RuleFlags::NO_WORD_BREAK),
        );
        let mut marker = TokenMarker::new();
        marker.add_rule_set(main);

        let (tokens, _) = marker.tokenize_line(&(), None, "'ab cd'");
        assert_eq!(tokens[0], Token::new(0, 3, TokenType::Invalid));
    }

    #[test]
    fn escape_checked_before_soft_span_interrupt() {
        // regression: an escaped delimiter inside a soft span must fold into
        // the span instead of interrupting it
        let mut main = ParserRuleSet::new("MAIN");
        main.set_escape(ParserRule::escape("\\"));
        main.add_rule(
            ParserRule::span("'", "'", TokenType::Literal2).with_flags(RuleFlags::NO_WORD_BREAK),
        );
        main.add_rule(ParserRule::seq("+", TokenType::Operator));
        let mut marker = TokenMarker::new();
        marker.add_rule_set(main);

        let (tokens, _) = marker.tokenize_line(&(), None, r"'a\+b'");
        assert_eq!(kinds(&tokens), vec![TokenType::Literal2]);
        assert_eq!(tokens[0].length, 6);
    }

    #[test]
    fn unresolvable_delegate_degrades() {
        let mut main = ParserRuleSet::new("MAIN");
        main.add_rule(ParserRule::delegate_span(
            "<",
            ">",
            TokenType::Markup,
            "Foo::Bar",
        ));
        let mut marker = TokenMarker::new();
        marker.add_rule_set(main);

        let (tokens, context) = marker.tokenize_line(&(), None, "<x>");
        assert_eq!(kinds(&tokens), vec![TokenType::Null]);
        assert_eq!(tokens[0].length, 3);
        assert!(context.is_initial());
    }

    #[test]
    fn terminate_char_truncates_scanning() {
        let mut keywords = KeywordMap::new(false);
        keywords.add("if", TokenType::Keyword1);
        let mut main = ParserRuleSet::new("MAIN");
        main.set_keywords(keywords);
        main.set_terminate_char(2);
        let mut marker = TokenMarker::new();
        marker.add_rule_set(main);

        // "if" would match a keyword, but scanning stops at column 2
        let (tokens, _) = marker.tokenize_line(&(), None, "ab if cd");
        assert_eq!(kinds(&tokens), vec![TokenType::Null]);
        assert_eq!(tokens[0].length, 8);
    }

    #[test]
    fn terminate_char_still_classifies_the_scanned_run() {
        let mut keywords = KeywordMap::new(false);
        keywords.add("if", TokenType::Keyword1);
        let mut main = ParserRuleSet::new("MAIN");
        main.set_keywords(keywords);
        main.set_highlight_digits(true);
        main.set_terminate_char(2);
        let mut marker = TokenMarker::new();
        marker.add_rule_set(main);

        // the run scanned before the limit still gets keyword treatment
        let (tokens, _) = marker.tokenize_line(&(), None, "if x");
        assert_eq!(
            tokens,
            vec![
                Token::new(0, 2, TokenType::Keyword1),
                Token::new(2, 2, TokenType::Null),
            ]
        );

        // and digit treatment
        let (tokens, _) = marker.tokenize_line(&(), None, "42 if");
        assert_eq!(
            tokens,
            vec![
                Token::new(0, 2, TokenType::Digit),
                Token::new(2, 3, TokenType::Null),
            ]
        );
    }

    #[test]
    fn ignore_case_rule_matching() {
        let mut main = ParserRuleSet::new("MAIN");
        main.set_ignore_case(true);
        main.add_rule(ParserRule::eol_span("REM", TokenType::Comment1));
        let mut marker = TokenMarker::new();
        marker.add_rule_set(main);

        let (tokens, _) = marker.tokenize_line(&(), None, "rem hello");
        assert_eq!(kinds(&tokens), vec![TokenType::Comment1]);
    }

    #[test]
    fn marker_without_main_degrades_to_default() {
        let marker = TokenMarker::new();
        let (tokens, _) = marker.tokenize_line(&(), None, "abc");
        assert_eq!(tokens, vec![Token::new(0, 3, TokenType::Null)]);
    }

    #[test]
    fn end_to_end_two_line_scenario() {
        let marker = c_marker();

        let (tokens, context) = marker.tokenize_line(&(), None, "int x; /* start");
        assert_eq!(tokens[0], Token::new(0, 3, TokenType::Keyword3));
        assert_eq!(tokens[1], Token::new(3, 4, TokenType::Null));
        assert_eq!(tokens[2], Token::new(7, 8, TokenType::Comment1));
        assert!(context.in_rule().is_some());

        let (tokens, context) =
            marker.tokenize_line(&(), Some(&context), "comment end */ int y;");
        assert_eq!(tokens[0], Token::new(0, 14, TokenType::Comment1));
        assert_eq!(tokens[1], Token::new(14, 1, TokenType::Null));
        assert_eq!(tokens[2], Token::new(15, 3, TokenType::Keyword3));
        assert_eq!(tokens[3], Token::new(18, 3, TokenType::Null));
        assert!(context.in_rule().is_none());
    }
}
