//! URL extraction
//!
//! Finds the URLs referenced from declarations, both bare `url(...)` tokens
//! and `url("...")` functions with a string argument.

use crate::error::{ErrorCode, ErrorToken, SourceLocation};
use crate::parser::{AtRule, Declaration, QualifiedRule, Stylesheet};
use crate::tokenizer::{Token, TokenKind};
use crate::visitor::RuleVisitor;

/// A URL found in a declaration value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCssUrl {
    /// Position of the URL token or `url(` function token
    pub pos: SourceLocation,
    /// The URL with escapes decoded and quotes removed
    pub utf8_url: String,
    /// Name of the enclosing at-rule, or empty at the top level
    pub at_rule_scope: String,
}

/// Extract the URLs of every declaration in `stylesheet`.
///
/// If a malformed `url(` function is found, an error is added and none of
/// the URLs from this call are kept.
pub fn extract_urls(
    stylesheet: &Stylesheet,
    parsed_urls: &mut Vec<ParsedCssUrl>,
    errors: &mut Vec<ErrorToken>,
) {
    let urls_before = parsed_urls.len();
    let errors_before = errors.len();

    stylesheet.accept(&mut UrlFunctionVisitor::new(parsed_urls, errors));

    if errors.len() != errors_before {
        parsed_urls.truncate(urls_before);
    }
    log::debug!("Extracted {} urls", parsed_urls.len() - urls_before);
}

/// Same as [`extract_urls`] for a single declaration, such as one from a
/// style attribute
pub fn extract_urls_from_declaration(
    declaration: &Declaration,
    parsed_urls: &mut Vec<ParsedCssUrl>,
    errors: &mut Vec<ErrorToken>,
) {
    let urls_before = parsed_urls.len();
    let errors_before = errors.len();

    declaration.accept(&mut UrlFunctionVisitor::new(parsed_urls, errors));

    if errors.len() != errors_before {
        parsed_urls.truncate(urls_before);
    }
}

struct UrlFunctionVisitor<'u> {
    parsed_urls: &'u mut Vec<ParsedCssUrl>,
    errors: &'u mut Vec<ErrorToken>,
    at_rule_scope: String,
}

impl<'u> UrlFunctionVisitor<'u> {
    fn new(parsed_urls: &'u mut Vec<ParsedCssUrl>, errors: &'u mut Vec<ErrorToken>) -> Self {
        Self {
            parsed_urls,
            errors,
            at_rule_scope: String::new(),
        }
    }

    fn push(&mut self, pos: SourceLocation, utf8_url: &str) {
        self.parsed_urls.push(ParsedCssUrl {
            pos,
            utf8_url: utf8_url.to_string(),
            at_rule_scope: self.at_rule_scope.clone(),
        });
    }
}

impl<'a> RuleVisitor<'a> for UrlFunctionVisitor<'_> {
    fn visit_at_rule(&mut self, at_rule: &'a AtRule) {
        self.at_rule_scope = at_rule.name.clone();
    }

    fn leave_at_rule(&mut self, _at_rule: &'a AtRule) {
        self.at_rule_scope.clear();
    }

    fn visit_qualified_rule(&mut self, _rule: &'a QualifiedRule) {
        self.at_rule_scope.clear();
    }

    fn visit_declaration(&mut self, declaration: &'a Declaration) {
        let value = &declaration.value;
        let mut i = 0;
        // The last token is the EOF terminator
        while i + 1 < value.len() {
            let token = &value[i];
            match &token.kind {
                TokenKind::Url(url) => {
                    self.push(token.pos, url);
                    i += 1;
                }
                TokenKind::Function(name) if name.eq_ignore_ascii_case("url") => {
                    match parse_url_function(value, i) {
                        Some((url, next)) => {
                            self.push(token.pos, url);
                            i = next;
                        }
                        None => {
                            self.errors
                                .push(ErrorToken::style(token.pos, ErrorCode::CssSyntaxBadUrl));
                            return;
                        }
                    }
                }
                _ => i += 1,
            }
        }
    }
}

/// Parse `url( ws? STRING ws? )` starting at the function token.
///
/// Returns the string and the index just past the ')'.
fn parse_url_function(tokens: &[Token], start: usize) -> Option<(&str, usize)> {
    let skip_whitespace = |mut i: usize| {
        while tokens.get(i).is_some_and(Token::is_whitespace) {
            i += 1;
        }
        i
    };

    let i = skip_whitespace(start + 1);
    let url = match tokens.get(i).map(|t| &t.kind) {
        Some(TokenKind::String(url)) => url.as_str(),
        _ => return None,
    };

    let i = skip_whitespace(i + 1);
    match tokens.get(i).map(|t| &t.kind) {
        Some(TokenKind::CloseParen) => Some((url, i + 1)),
        _ => None,
    }
}
