#![forbid(unsafe_code)]

//! POSIX shell grammar.

use lexweave_core::{
    KeywordMap, ParserRule, ParserRuleSet, RuleFlags, TokenMarker, TokenType,
};

const KEYWORDS: &[&str] = &[
    "if", "then", "elif", "else", "fi", "for", "in", "do", "done", "while", "until", "case",
    "esac", "function", "local", "export", "return", "break", "continue", "exit",
];

/// Build a tokenizer for shell scripts.
///
/// `#` comments run to end of line, double quotes honor backslash escapes,
/// single quotes do not, and `$name` variable references are classified up
/// to the next word break.
pub fn shell() -> TokenMarker {
    let mut keywords = KeywordMap::new(false);
    for kw in KEYWORDS {
        keywords.add(kw, TokenType::Keyword1);
    }

    let mut main = ParserRuleSet::new("MAIN");
    main.set_keywords(keywords);
    main.set_escape(ParserRule::escape("\\"));

    main.add_rule(ParserRule::eol_span("#", TokenType::Comment1));
    main.add_rule(ParserRule::span("\"", "\"", TokenType::Literal1));
    main.add_rule(
        ParserRule::span("'", "'", TokenType::Literal2).with_flags(RuleFlags::NO_LINE_BREAK),
    );
    // ${...} interpolations must close on their own line
    main.add_rule(
        ParserRule::span("${", "}", TokenType::Keyword2).with_flags(RuleFlags::NO_LINE_BREAK),
    );
    main.add_rule(ParserRule::mark_following("$", TokenType::Keyword2));

    for op in ["&&", "||", "|", ";", "&", "<", ">"] {
        main.add_rule(ParserRule::seq(op, TokenType::Operator));
    }

    let mut marker = TokenMarker::new();
    marker.add_rule_set(main);
    marker
}
