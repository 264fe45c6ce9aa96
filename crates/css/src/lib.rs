//! cssval CSS engine
//!
//! CSS tokenizer, stylesheet parser and the passes that run over the parse
//! tree: URL extraction, media query checks and `!important` collection.
//! Problems with the input are reported as [`ErrorToken`]s appended to a
//! caller supplied list; none of these functions fail on bad CSS.

mod config;
mod error;
mod important;
mod json;
mod media;
mod parser;
mod tokenizer;
mod urls;
mod visitor;

pub use config::{BlockType, ParsingConfig};
pub use error::{CssError, CssResult, ErrorCode, ErrorToken, SourceLocation};
pub use important::extract_important_declarations;
pub use json::{ToJson, JSON_KEY_PRIORITY};
pub use media::parse_media_queries;
pub use parser::{
    parse_a_stylesheet, parse_inline_style, strip_min_max, strip_vendor_prefix, AtRule,
    Declaration, QualifiedRule, Rule, Stylesheet, TokenStream,
};
pub use tokenizer::{tokenize, HashType, Numeric, NumericType, Token, TokenKind, TokenType, Tokenizer};
pub use urls::{extract_urls, extract_urls_from_declaration, ParsedCssUrl};
pub use visitor::RuleVisitor;
