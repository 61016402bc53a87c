//! Multi-line continuation behavior.
//!
//! These tests thread `LineContext` snapshots across simulated buffers the
//! way an editor's line cache does, and pin the containment policies around
//! unterminated spans.

use lexweave_core::{
    KeywordMap, LineContext, ParserRule, ParserRuleSet, RuleFlags, Token, TokenMarker, TokenType,
};

fn c_marker() -> TokenMarker {
    let mut keywords = KeywordMap::new(false);
    keywords.add("int", TokenType::Keyword1);
    keywords.add("return", TokenType::Keyword1);

    let mut main = ParserRuleSet::new("MAIN");
    main.set_keywords(keywords);
    main.set_highlight_digits(true);
    main.add_rule(ParserRule::span("/*", "*/", TokenType::Comment1));
    main.add_rule(ParserRule::eol_span("//", TokenType::Comment1));
    main.add_rule(
        ParserRule::span("\"", "\"", TokenType::Literal1).with_flags(RuleFlags::NO_LINE_BREAK),
    );
    main.set_escape(ParserRule::escape("\\"));

    let mut marker = TokenMarker::new();
    marker.add_rule_set(main);
    marker
}

/// Tokenize a whole buffer, threading contexts, returning per-line tokens
/// and the context each line ended with.
fn tokenize_buffer(marker: &TokenMarker, lines: &[&str]) -> Vec<(Vec<Token>, LineContext)> {
    let mut out = Vec::with_capacity(lines.len());
    let mut context: Option<LineContext> = None;
    for line in lines {
        let (tokens, after) = marker.tokenize_line(&(), context.as_ref(), line);
        context = Some(after.clone());
        out.push((tokens, after));
    }
    out
}

#[test]
fn span_opens_on_one_line_and_closes_on_the_next() {
    let marker = c_marker();
    let result = tokenize_buffer(&marker, &["int a; /* note", "done */ int b;"]);

    let (tokens, context) = &result[0];
    assert_eq!(tokens[0], Token::new(0, 3, TokenType::Keyword1));
    assert_eq!(tokens.last().unwrap().kind, TokenType::Comment1);
    assert!(context.in_rule().is_some());

    let (tokens, context) = &result[1];
    // the comment token runs through the end delimiter
    assert_eq!(tokens[0], Token::new(0, 7, TokenType::Comment1));
    assert_eq!(tokens[2], Token::new(8, 3, TokenType::Keyword1));
    assert!(context.in_rule().is_none());
}

#[test]
fn span_crossing_many_lines() {
    let marker = c_marker();
    let result = tokenize_buffer(&marker, &["/* a", "b", "", "c */ int x;"]);

    for (tokens, context) in &result[..3] {
        for token in tokens {
            assert_eq!(token.kind, TokenType::Comment1);
        }
        assert!(context.in_rule().is_some());
    }
    let (tokens, context) = &result[3];
    assert_eq!(tokens[0], Token::new(0, 4, TokenType::Comment1));
    assert!(context.in_rule().is_none());
}

#[test]
fn no_line_break_string_does_not_leak_into_next_line() {
    let marker = c_marker();
    let result = tokenize_buffer(&marker, &["\"unterminated", "int x;"]);

    let (tokens, context) = &result[0];
    assert_eq!(tokens[0], Token::new(0, 13, TokenType::Invalid));
    assert!(context.in_rule().is_none(), "containment resets the context");

    let (tokens, _) = &result[1];
    assert_eq!(tokens[0], Token::new(0, 3, TokenType::Keyword1));
}

#[test]
fn escaped_quote_keeps_string_open_across_lines_when_allowed() {
    // same grammar but a string span allowed to cross lines
    let mut main = ParserRuleSet::new("MAIN");
    main.add_rule(ParserRule::span("\"", "\"", TokenType::Literal1));
    main.set_escape(ParserRule::escape("\\"));
    let mut marker = TokenMarker::new();
    marker.add_rule_set(main);

    let result = tokenize_buffer(&marker, &[r#""a \" still"#, r#"closed""#]);
    let (tokens, context) = &result[0];
    assert_eq!(tokens[0], Token::new(0, 11, TokenType::Literal1));
    assert!(context.in_rule().is_some());

    let (tokens, context) = &result[1];
    assert_eq!(tokens[0], Token::new(0, 7, TokenType::Literal1));
    assert!(context.in_rule().is_none());
}

#[test]
fn context_equality_detects_stable_downstream_state() {
    // an editor stops re-tokenizing once the ending context matches the
    // cached one; equality must hold across identical reruns
    let marker = c_marker();
    let (_, first) = marker.tokenize_line(&(), None, "/* open");
    let (_, second) = marker.tokenize_line(&(), None, "/* open");
    assert_eq!(first, second);

    let (_, closed) = marker.tokenize_line(&(), Some(&first), "done */");
    assert_ne!(first, closed);
}

#[test]
fn tokens_tile_every_line() {
    let marker = c_marker();
    let lines = [
        "int main() { /* entry",
        "   still a comment",
        "*/ return \"x\\\"y\"; // done",
        "",
    ];
    let result = tokenize_buffer(&marker, &lines);
    for (line, (tokens, _)) in lines.iter().zip(&result) {
        let total: usize = tokens.iter().map(|t| t.length).sum();
        assert_eq!(total, line.chars().count(), "line {line:?} must tile");
    }
}
