#![forbid(unsafe_code)]

//! Built-in grammar definitions for the lexweave tokenizer.
//!
//! These are programmatically-built rule tables standing in for an external
//! mode loader: each builder returns a ready [`TokenMarker`] the way a
//! grammar file would be compiled into one.
//!
//! - [`clike`] - C-family grammar (comments, strings, labels, keywords)
//! - [`shell`] - POSIX shell grammar (`#` comments, `$` variables)
//! - [`html`] / [`javascript`] - markup grammar delegating embedded
//!   `<script>` code to the JavaScript grammar
//! - [`web_registry`] - a [`ModeRegistry`] wiring the html/javascript pair
//!
//! # Example
//! ```
//! use lexweave_grammars::{html, web_registry};
//! use lexweave_core::TokenType;
//!
//! let registry = web_registry();
//! let html = html();
//! let (tokens, _) = html.tokenize_line(&registry, None, "<script>var x</script>");
//! assert!(tokens.iter().any(|t| t.kind == TokenType::Keyword1));
//! ```

use lexweave_core::ModeRegistry;
use std::sync::Arc;

mod clike;
mod shell;
mod web;

pub use clike::clike;
pub use shell::shell;
pub use web::{html, javascript};

/// Registry wiring the html/javascript grammar pair for cross-mode
/// delegation.
pub fn web_registry() -> ModeRegistry {
    let mut registry = ModeRegistry::new();
    registry.register("html", Arc::new(html()));
    registry.register("javascript", Arc::new(javascript()));
    registry
}
