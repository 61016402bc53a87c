#![forbid(unsafe_code)]

//! C-family grammar.

use lexweave_core::{
    KeywordMap, ParserRule, ParserRuleSet, RuleFlags, TokenMarker, TokenType,
};

const KEYWORDS: &[&str] = &[
    "if", "else", "for", "while", "do", "switch", "case", "default", "break", "continue",
    "return", "goto", "sizeof", "typedef", "extern", "static", "const", "volatile", "inline",
];

const TYPE_KEYWORDS: &[&str] = &[
    "void", "char", "short", "int", "long", "float", "double", "signed", "unsigned", "struct",
    "union", "enum",
];

/// Build a tokenizer for C-family source.
///
/// Covers block and line comments, string and character literals with
/// backslash escapes (strings must close on their own line), `label:`
/// classification, numeric literals, and two keyword tiers.
pub fn clike() -> TokenMarker {
    let mut keywords = KeywordMap::new(false);
    for kw in KEYWORDS {
        keywords.add(kw, TokenType::Keyword1);
    }
    for kw in TYPE_KEYWORDS {
        keywords.add(kw, TokenType::Keyword3);
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
        ParserRule::span("'", "'", TokenType::Literal2).with_flags(RuleFlags::NO_LINE_BREAK),
    );
    // preprocessor directives own the rest of the line
    main.add_rule(
        ParserRule::eol_span("#", TokenType::Keyword2).with_flags(RuleFlags::AT_LINE_START),
    );
    // goto targets: the run before a trailing colon
    main.add_rule(
        ParserRule::mark_previous(":", TokenType::Label).with_flags(RuleFlags::EXCLUDE_MATCH),
    );

    for op in [
        "==", "!=", "<=", ">=", "&&", "||", "<<", ">>", "+", "-", "*", "/", "%", "=", "<", ">",
        "!", "&", "|", "^", "~", "?",
    ] {
        main.add_rule(ParserRule::seq(op, TokenType::Operator));
    }

    let mut marker = TokenMarker::new();
    marker.add_rule_set(main);
    marker
}
