#![forbid(unsafe_code)]

//! HTML and JavaScript grammars.
//!
//! The HTML grammar is the delegation showcase: `<script>` blocks hand
//! their interior to the JavaScript grammar through a resolver, and
//! ordinary tags delegate to a local `TAGS` rule set for attribute
//! highlighting.

use lexweave_core::{
    KeywordMap, ParserRule, ParserRuleSet, RuleFlags, TokenMarker, TokenType,
};

const JS_KEYWORDS: &[&str] = &[
    "var", "let", "const", "function", "return", "if", "else", "for", "while", "do", "switch",
    "case", "break", "continue", "new", "delete", "typeof", "instanceof", "in", "of", "this",
    "throw", "try", "catch", "finally",
];

const JS_LITERALS: &[&str] = &["true", "false", "null", "undefined"];

/// Build a tokenizer for HTML markup.
///
/// `<script>` regions are delegated to the `javascript` mode and need a
/// resolver that knows it, such as [`crate::web_registry`]. Everything
/// else is self-contained.
pub fn html() -> TokenMarker {
    let mut main = ParserRuleSet::new("MAIN");
    main.add_rule(ParserRule::span("<!--", "-->", TokenType::Comment1));
    main.add_rule(ParserRule::delegate_span(
        "<script>",
        "</script>",
        TokenType::Markup,
        "javascript::MAIN",
    ));
    // generic tags come after the script rule so insertion order keeps
    // "<script>" from being swallowed as a plain tag
    main.add_rule(ParserRule::delegate_span("<", ">", TokenType::Markup, "TAGS"));
    main.add_rule(
        ParserRule::span("&", ";", TokenType::Literal2).with_flags(RuleFlags::NO_WORD_BREAK),
    );

    let mut tags = ParserRuleSet::new("TAGS");
    tags.set_default(TokenType::Markup);
    tags.add_rule(ParserRule::span("\"", "\"", TokenType::Literal1));
    tags.add_rule(ParserRule::span("'", "'", TokenType::Literal1));
    tags.add_rule(ParserRule::seq("=", TokenType::Operator));

    let mut marker = TokenMarker::new();
    marker.add_rule_set(main);
    marker.add_rule_set(tags);
    marker
}

/// Build a tokenizer for JavaScript source.
pub fn javascript() -> TokenMarker {
    let mut keywords = KeywordMap::new(false);
    for kw in JS_KEYWORDS {
        keywords.add(kw, TokenType::Keyword1);
    }
    for kw in JS_LITERALS {
        keywords.add(kw, TokenType::Literal2);
    }

    let mut main = ParserRuleSet::new("MAIN");
    main.set_keywords(keywords);
    main.set_highlight_digits(true);
    main.set_escape(ParserRule::escape("\\"));

    main.add_rule(ParserRule::span("/*", "*/", TokenType::Comment1));
    main.add_rule(ParserRule::eol_span("//", TokenType::Comment2));
    main.add_rule(
        ParserRule::span("\"", "\"", TokenType::Literal1).with_flags(RuleFlags::NO_LINE_BREAK),
    );
    main.add_rule(
        ParserRule::span("'", "'", TokenType::Literal1).with_flags(RuleFlags::NO_LINE_BREAK),
    );

    for op in [
        "===", "!==", "==", "!=", "<=", ">=", "&&", "||", "=>", "+", "-", "*", "/", "%", "=",
        "<", ">", "!",
    ] {
        main.add_rule(ParserRule::seq(op, TokenType::Operator));
    }

    let mut marker = TokenMarker::new();
    marker.add_rule_set(main);
    marker
}
