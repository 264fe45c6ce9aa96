//! Media queries
//!
//! Checks the prelude of every `@media` rule against the CSS3 media query
//! grammar and collects the media types and features it names.
//!
//! ```text
//! media_query_list : S* [media_query [ ',' S* media_query ]* ]?
//! media_query      : (expression | [ONLY | NOT]? S* media_type S*)
//!                    [ AND S* expression ]*
//! expression       : '(' S* media_feature S* [ ':' S* expr ]? ')' S*
//! ```

use crate::error::{ErrorCode, ErrorToken};
use crate::parser::{AtRule, Stylesheet, TokenStream};
use crate::tokenizer::{Token, TokenType};
use crate::visitor::RuleVisitor;

/// Parse the media queries of every `@media` rule in `stylesheet`.
///
/// Media types and feature names are appended as their IDENT tokens. A
/// malformed query list reports `CSS_SYNTAX_MALFORMED_MEDIA_QUERY` at the
/// `@media` rule.
pub fn parse_media_queries(
    stylesheet: &Stylesheet,
    media_types: &mut Vec<Token>,
    media_features: &mut Vec<Token>,
    errors: &mut Vec<ErrorToken>,
) {
    let mut visitor = MediaQueryVisitor {
        media_types,
        media_features,
        errors,
    };
    stylesheet.accept(&mut visitor);
}

struct MediaQueryVisitor<'m> {
    media_types: &'m mut Vec<Token>,
    media_features: &'m mut Vec<Token>,
    errors: &'m mut Vec<ErrorToken>,
}

impl<'a> RuleVisitor<'a> for MediaQueryVisitor<'_> {
    fn visit_at_rule(&mut self, at_rule: &'a AtRule) {
        if !at_rule.name.eq_ignore_ascii_case("media") {
            return;
        }

        let mut stream = TokenStream::new(&at_rule.prelude);
        stream.consume();
        if !self.parse_a_media_query_list(&mut stream) {
            log::debug!("Malformed media query at {}", at_rule.pos);
            self.errors.push(ErrorToken::style(
                at_rule.pos,
                ErrorCode::CssSyntaxMalformedMediaQuery,
            ));
        }
    }
}

impl MediaQueryVisitor<'_> {
    fn parse_a_media_query_list(&mut self, stream: &mut TokenStream) -> bool {
        maybe_consume_whitespace(stream);
        if !stream.current().is_eof() {
            if !self.parse_a_media_query(stream) {
                return false;
            }
            while stream.current().token_type() == TokenType::Comma {
                stream.consume();
                maybe_consume_whitespace(stream);
                if !self.parse_a_media_query(stream) {
                    return false;
                }
            }
        }
        stream.current().is_eof()
    }

    fn parse_a_media_query(&mut self, stream: &mut TokenStream) -> bool {
        // Expressions start with '(' which tells them apart from media types
        if stream.current().token_type() == TokenType::OpenParen {
            if !self.parse_a_media_expression(stream) {
                return false;
            }
        } else {
            if stream.current().is_ident("only") || stream.current().is_ident("not") {
                stream.consume();
            }
            maybe_consume_whitespace(stream);
            if !self.parse_a_media_type(stream) {
                return false;
            }
            maybe_consume_whitespace(stream);
        }

        while stream.current().is_ident("and") {
            stream.consume();
            maybe_consume_whitespace(stream);
            if !self.parse_a_media_expression(stream) {
                return false;
            }
        }
        true
    }

    fn parse_a_media_type(&mut self, stream: &mut TokenStream) -> bool {
        if stream.current().token_type() != TokenType::Ident {
            return false;
        }
        self.media_types.push(stream.current().clone());
        stream.consume();
        true
    }

    fn parse_a_media_expression(&mut self, stream: &mut TokenStream) -> bool {
        if stream.current().token_type() != TokenType::OpenParen {
            return false;
        }
        stream.consume();
        maybe_consume_whitespace(stream);
        if !self.parse_a_media_feature(stream) {
            return false;
        }
        maybe_consume_whitespace(stream);

        if stream.current().token_type() == TokenType::Colon {
            stream.consume();
            maybe_consume_whitespace(stream);
            // Feature values are not checked; media features take single
            // values, so the first ')' ends the expression.
            while !stream.current().is_eof()
                && stream.current().token_type() != TokenType::CloseParen
            {
                stream.consume();
            }
        }

        if stream.current().token_type() != TokenType::CloseParen {
            return false;
        }
        stream.consume();
        maybe_consume_whitespace(stream);
        true
    }

    fn parse_a_media_feature(&mut self, stream: &mut TokenStream) -> bool {
        if stream.current().token_type() != TokenType::Ident {
            return false;
        }
        self.media_features.push(stream.current().clone());
        stream.consume();
        true
    }
}

/// The tokenizer merges whitespace runs, so there is at most one token
fn maybe_consume_whitespace(stream: &mut TokenStream) {
    if stream.current().is_whitespace() {
        stream.consume();
    }
}
