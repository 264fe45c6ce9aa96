//! CSS Parser
//!
//! Builds a stylesheet tree out of a token list. At-rule bodies are parsed
//! as nested rules, as declarations or not at all, depending on the
//! [`ParsingConfig`]. Like the tokenizer, the parser never fails: problems
//! are appended to the caller's error list and parsing carries on.

use std::borrow::Cow;
use std::fmt::Write;

use crate::config::{BlockType, ParsingConfig};
use crate::error::{ErrorCode, ErrorToken, SourceLocation};
use crate::tokenizer::{tokenize, Token, TokenKind, TokenType};

/// Deepest nesting of blocks and functions the parser descends into
const MAX_NESTING_DEPTH: usize = 100;

/// A CSS stylesheet
#[derive(Debug, Clone, PartialEq)]
pub struct Stylesheet {
    /// Top level rules
    pub rules: Vec<Rule>,
    /// The EOF token that ended the input
    pub eof: Token,
    pub pos: SourceLocation,
}

impl Stylesheet {
    /// Tokenize and parse a CSS stylesheet
    pub fn parse(input: &str, config: &ParsingConfig, errors: &mut Vec<ErrorToken>) -> Self {
        let tokens = tokenize(input, 1, 0, errors);
        parse_a_stylesheet(&tokens, config, errors)
    }
}

/// A CSS rule
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    /// Prelude followed by a declaration block (e.g., `a { color: red }`)
    Qualified(QualifiedRule),
    /// `@name prelude;` or `@name prelude { ... }`
    At(AtRule),
}

impl Rule {
    pub fn pos(&self) -> SourceLocation {
        match self {
            Rule::Qualified(rule) => rule.pos,
            Rule::At(rule) => rule.pos,
        }
    }
}

/// An at-rule. Which of `rules`/`declarations` gets filled depends on the
/// block type configured for `name`.
#[derive(Debug, Clone, PartialEq)]
pub struct AtRule {
    /// Name without the '@'
    pub name: String,
    /// Tokens up to the block or ';', terminated by an EOF token
    pub prelude: Vec<Token>,
    pub rules: Vec<Rule>,
    pub declarations: Vec<Declaration>,
    pub pos: SourceLocation,
}

impl AtRule {
    pub fn new(name: impl Into<String>, pos: SourceLocation) -> Self {
        Self {
            name: name.into(),
            prelude: Vec::new(),
            rules: Vec::new(),
            declarations: Vec::new(),
            pos,
        }
    }
}

/// A qualified rule (selector block)
#[derive(Debug, Clone, PartialEq)]
pub struct QualifiedRule {
    /// Selector tokens, terminated by an EOF token at the '{'
    pub prelude: Vec<Token>,
    pub declarations: Vec<Declaration>,
    pub pos: SourceLocation,
}

impl QualifiedRule {
    pub fn new(pos: SourceLocation) -> Self {
        Self {
            prelude: Vec::new(),
            declarations: Vec::new(),
            pos,
        }
    }

    /// Concatenated values of the prelude tokens, e.g. `h2.bar` or `100`.
    ///
    /// Whitespace and EOF contribute nothing; neither do zero-valued
    /// numbers. Overflowing numbers print as `Infinity`.
    pub fn rule_name(&self) -> String {
        let mut name = String::new();
        for token in &self.prelude {
            match &token.kind {
                TokenKind::Number(n) | TokenKind::Percentage(n) | TokenKind::Dimension(n, _) => {
                    if n.value.is_infinite() {
                        name.push_str(if n.value > 0.0 { "Infinity" } else { "-Infinity" });
                    } else if n.value != 0.0 && !n.value.is_nan() {
                        let _ = write!(name, "{}", n.value);
                    }
                }
                TokenKind::Delim(c) => name.push(*c),
                _ => {
                    if let Some(c) = token.grouping_char() {
                        name.push(c);
                    } else if let Some(value) = token.string_value() {
                        name.push_str(value);
                    }
                }
            }
        }
        name
    }
}

/// A CSS declaration (property: value)
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    /// Property name
    pub name: String,
    /// Value tokens after the ':', terminated by an EOF token at the ';'
    /// (or wherever the declaration ended). `!important` is not included.
    /// The EOF stays when `!important` is removed, so JSON output keeps it
    /// where a plain truncation of the value would drop it.
    pub value: Vec<Token>,
    /// Whether !important was specified
    pub important: bool,
    /// Position of the '!' of `!important`
    pub important_pos: Option<SourceLocation>,
    pub pos: SourceLocation,
}

impl Declaration {
    pub fn new(name: impl Into<String>, pos: SourceLocation) -> Self {
        Self {
            name: name.into(),
            value: Vec::new(),
            important: false,
            important_pos: None,
            pos,
        }
    }

    /// The value's identifier if it is the first non-whitespace token,
    /// otherwise the empty string
    pub fn first_ident(&self) -> &str {
        let mut tokens = self.value.iter();
        let first = match tokens.next() {
            Some(token) if token.is_whitespace() => tokens.next(),
            other => other,
        };
        match first.map(|t| &t.kind) {
            Some(TokenKind::Ident(s)) => s.as_str(),
            _ => "",
        }
    }

    /// Detect a trailing `! important` and remove it from the value
    fn extract_important(&mut self) {
        let mut found_important = false;
        // The last token is always EOF
        for i in (0..self.value.len().saturating_sub(1)).rev() {
            let token = &self.value[i];
            if token.is_whitespace() {
                continue;
            }
            if token.is_ident("important") {
                found_important = true;
                continue;
            }
            if found_important && token.is_delim('!') {
                let pos = token.pos;
                self.important = true;
                self.important_pos = Some(pos);
                let end = self.value.len() - 1;
                self.value.drain(i..end);
            }
            break;
        }
    }
}

/// A cursor over a token list.
///
/// Reads past the end yield the list's trailing EOF token, so callers never
/// run off the end of input.
pub struct TokenStream<'t> {
    tokens: &'t [Token],
    /// Index of the current token plus one; zero before the first consume
    pos: usize,
    eof: Token,
}

impl<'t> TokenStream<'t> {
    pub fn new(tokens: &'t [Token]) -> Self {
        let eof = match tokens.last() {
            Some(last) if last.is_eof() => last.clone(),
            Some(last) => Token::eof(last.pos),
            None => Token::eof(SourceLocation::new(1, 0)),
        };
        Self { tokens, pos: 0, eof }
    }

    /// Token at an absolute index
    pub fn token_at(&self, index: usize) -> &Token {
        self.tokens.get(index).unwrap_or(&self.eof)
    }

    pub fn current(&self) -> &Token {
        match self.pos.checked_sub(1) {
            Some(index) => self.token_at(index),
            None => &self.eof,
        }
    }

    pub fn next(&self) -> &Token {
        self.token_at(self.pos)
    }

    /// Advance by one token
    pub fn consume(&mut self) {
        self.pos += 1;
    }

    /// Step back one token
    pub fn reconsume(&mut self) {
        self.pos = self.pos.saturating_sub(1);
    }

    /// The EOF token returned for reads past the end
    pub fn eof(&self) -> &Token {
        &self.eof
    }
}

/// Parse a token list into a stylesheet.
///
/// COMMENT tokens are skipped. The stylesheet sits at the first token's
/// position and keeps the final EOF token.
pub fn parse_a_stylesheet(
    tokens: &[Token],
    config: &ParsingConfig,
    errors: &mut Vec<ErrorToken>,
) -> Stylesheet {
    let tokens = without_comments(tokens);
    let canonicalizer = Canonicalizer::new(config);
    let rules = canonicalizer.parse_a_list_of_rules(&tokens, true, errors);

    log::debug!("Parsed stylesheet with {} top level rules", rules.len());

    Stylesheet {
        rules,
        eof: TokenStream::new(&tokens).eof().clone(),
        pos: tokens.first().map_or(SourceLocation::new(1, 0), |t| t.pos),
    }
}

/// Parse the token list of a style attribute into declarations
pub fn parse_inline_style(tokens: &[Token], errors: &mut Vec<ErrorToken>) -> Vec<Declaration> {
    let tokens = without_comments(tokens);
    let config = ParsingConfig::new(BlockType::Declarations);
    Canonicalizer::new(&config).parse_a_list_of_declarations(&tokens, errors)
}

/// Strip a vendor prefix: `-moz-keyframes` becomes `keyframes`
pub fn strip_vendor_prefix(name: &str) -> &str {
    if !name.starts_with('-') {
        return name;
    }
    ["-o-", "-moz-", "-ms-", "-webkit-"]
        .iter()
        .find_map(|prefix| name.strip_prefix(prefix))
        .unwrap_or(name)
}

/// Strip `min-`/`max-` from a media feature: `min-width` becomes `width`
pub fn strip_min_max(name: &str) -> &str {
    name.strip_prefix("min-")
        .or_else(|| name.strip_prefix("max-"))
        .unwrap_or(name)
}

fn without_comments(tokens: &[Token]) -> Cow<'_, [Token]> {
    if tokens.iter().any(|t| t.token_type() == TokenType::Comment) {
        Cow::Owned(
            tokens
                .iter()
                .filter(|t| t.token_type() != TokenType::Comment)
                .cloned()
                .collect(),
        )
    } else {
        Cow::Borrowed(tokens)
    }
}

fn at_declaration_end(token: &Token) -> bool {
    matches!(token.kind, TokenKind::Semicolon | TokenKind::Eof)
}

/// Applies a parsing config while turning tokens into rules
struct Canonicalizer<'c> {
    config: &'c ParsingConfig,
}

impl<'c> Canonicalizer<'c> {
    fn new(config: &'c ParsingConfig) -> Self {
        Self { config }
    }

    /// Parse rules until EOF. CDO/CDC are only skipped at the top level.
    fn parse_a_list_of_rules(
        &self,
        tokens: &[Token],
        top_level: bool,
        errors: &mut Vec<ErrorToken>,
    ) -> Vec<Rule> {
        let mut stream = TokenStream::new(tokens);
        let mut rules = Vec::new();
        loop {
            stream.consume();
            match stream.current().token_type() {
                TokenType::Whitespace => continue,
                TokenType::EofToken => return rules,
                TokenType::Cdo | TokenType::Cdc if top_level => continue,
                TokenType::AtKeyword => {
                    rules.push(Rule::At(self.parse_an_at_rule(&mut stream, errors)));
                }
                _ => {
                    if let Some(rule) = self.parse_a_qualified_rule(&mut stream, errors) {
                        rules.push(Rule::Qualified(rule));
                    }
                }
            }
        }
    }

    /// Parse an at-rule; the current token is its AT_KEYWORD
    fn parse_an_at_rule(&self, stream: &mut TokenStream, errors: &mut Vec<ErrorToken>) -> AtRule {
        let start = stream.current();
        let mut rule = AtRule::new(start.string_value().unwrap_or_default(), start.pos);

        loop {
            stream.consume();
            match stream.current().token_type() {
                TokenType::Semicolon | TokenType::EofToken => {
                    rule.prelude.push(stream.current().clone());
                    return rule;
                }
                TokenType::OpenCurly => {
                    rule.prelude.push(Token::eof(stream.current().pos));
                    let contents = extract_a_rule_body(stream, errors);

                    match self.config.block_type_for(&rule.name) {
                        BlockType::Rules => {
                            rule.rules = self.parse_a_list_of_rules(&contents, false, errors);
                        }
                        BlockType::Declarations => {
                            rule.declarations =
                                self.parse_a_list_of_declarations(&contents, errors);
                        }
                        BlockType::Ignore => {}
                    }
                    return rule;
                }
                _ => consume_a_component_value_or_report(stream, &mut rule.prelude, errors),
            }
        }
    }

    /// Parse a qualified rule starting at the current token. Running out of
    /// input before the block drops the rule.
    fn parse_a_qualified_rule(
        &self,
        stream: &mut TokenStream,
        errors: &mut Vec<ErrorToken>,
    ) -> Option<QualifiedRule> {
        let mut rule = QualifiedRule::new(stream.current().pos);
        stream.reconsume();

        loop {
            stream.consume();
            match stream.current().token_type() {
                TokenType::EofToken => {
                    errors.push(ErrorToken::style(
                        rule.pos,
                        ErrorCode::CssSyntaxEofInPreludeOfQualifiedRule,
                    ));
                    return None;
                }
                TokenType::OpenCurly => {
                    rule.prelude.push(Token::eof(stream.current().pos));
                    let contents = extract_a_rule_body(stream, errors);
                    rule.declarations = self.parse_a_list_of_declarations(&contents, errors);
                    return Some(rule);
                }
                _ => consume_a_component_value_or_report(stream, &mut rule.prelude, errors),
            }
        }
    }

    fn parse_a_list_of_declarations(
        &self,
        tokens: &[Token],
        errors: &mut Vec<ErrorToken>,
    ) -> Vec<Declaration> {
        let mut stream = TokenStream::new(tokens);
        let mut declarations = Vec::new();
        loop {
            stream.consume();
            match stream.current().token_type() {
                TokenType::Whitespace | TokenType::Semicolon => continue,
                TokenType::EofToken => return declarations,
                TokenType::AtKeyword => {
                    // Parsed so that its block is skipped, then dropped
                    let at_rule = self.parse_an_at_rule(&mut stream, errors);
                    errors.push(ErrorToken::new(
                        at_rule.pos,
                        ErrorCode::CssSyntaxInvalidAtRule,
                        &["style", at_rule.name.as_str()],
                    ));
                }
                TokenType::Ident => {
                    if let Some(declaration) = parse_a_declaration(&mut stream, errors) {
                        declarations.push(declaration);
                    }
                }
                _ => {
                    errors.push(ErrorToken::style(
                        stream.current().pos,
                        ErrorCode::CssSyntaxInvalidDeclaration,
                    ));
                    stream.reconsume();
                    while !at_declaration_end(stream.next()) {
                        stream.consume();
                        consume_a_component_value_or_report(&mut stream, &mut Vec::new(), errors);
                    }
                }
            }
        }
    }
}

/// Parse a declaration; the current token is its name
fn parse_a_declaration(
    stream: &mut TokenStream,
    errors: &mut Vec<ErrorToken>,
) -> Option<Declaration> {
    let start = stream.current();
    let mut declaration = Declaration::new(start.string_value().unwrap_or_default(), start.pos);

    while stream.next().is_whitespace() {
        stream.consume();
    }

    stream.consume();
    if stream.current().token_type() != TokenType::Colon {
        errors.push(ErrorToken::style(
            declaration.pos,
            ErrorCode::CssSyntaxIncompleteDeclaration,
        ));
        stream.reconsume();
        while !at_declaration_end(stream.next()) {
            stream.consume();
        }
        return None;
    }

    while !at_declaration_end(stream.next()) {
        stream.consume();
        consume_a_component_value_or_report(stream, &mut declaration.value, errors);
    }
    declaration.value.push(Token::eof(stream.next().pos));
    declaration.extract_important();

    Some(declaration)
}

fn consume_a_component_value_or_report(
    stream: &mut TokenStream,
    out: &mut Vec<Token>,
    errors: &mut Vec<ErrorToken>,
) {
    if !consume_a_component_value(stream, out, 0) {
        errors.push(ErrorToken::style(
            stream.current().pos,
            ErrorCode::CssExcessivelyNested,
        ));
    }
}

/// Append the current component value (a token, a block or a function) to
/// `out`. Returns false when nesting goes past [`MAX_NESTING_DEPTH`].
fn consume_a_component_value(stream: &mut TokenStream, out: &mut Vec<Token>, depth: usize) -> bool {
    match stream.current().token_type() {
        TokenType::OpenCurly | TokenType::OpenSquare | TokenType::OpenParen => {
            consume_a_simple_block(stream, out, depth)
        }
        TokenType::FunctionToken => consume_a_function(stream, out, depth),
        _ => {
            out.push(stream.current().clone());
            true
        }
    }
}

/// Append a block, both grouping tokens included. Only the opener's mirror
/// or EOF closes it.
fn consume_a_simple_block(stream: &mut TokenStream, out: &mut Vec<Token>, depth: usize) -> bool {
    if depth > MAX_NESTING_DEPTH {
        return false;
    }
    let start = stream.current().clone();
    let mirror = start.mirror();
    out.push(start);

    loop {
        stream.consume();
        let current = stream.current();
        if current.is_eof() || mirror.as_ref() == Some(&current.kind) {
            out.push(current.clone());
            return true;
        }
        if !consume_a_component_value(stream, out, depth + 1) {
            return false;
        }
    }
}

/// Append a function, from its FUNCTION_TOKEN through ')' or EOF
fn consume_a_function(stream: &mut TokenStream, out: &mut Vec<Token>, depth: usize) -> bool {
    if depth > MAX_NESTING_DEPTH {
        return false;
    }
    out.push(stream.current().clone());

    loop {
        stream.consume();
        let current = stream.current();
        if matches!(current.kind, TokenKind::Eof | TokenKind::CloseParen) {
            out.push(current.clone());
            return true;
        }
        if !consume_a_component_value(stream, out, depth + 1) {
            return false;
        }
    }
}

/// Contents of the `{...}` block at the current token, without the braces
/// and terminated by an EOF token where the block ended
fn extract_a_rule_body(stream: &mut TokenStream, errors: &mut Vec<ErrorToken>) -> Vec<Token> {
    let open = stream.current().pos;
    let mut consumed = Vec::new();
    if !consume_a_simple_block(stream, &mut consumed, 0) {
        errors.push(ErrorToken::style(
            stream.current().pos,
            ErrorCode::CssExcessivelyNested,
        ));
    } else if consumed.last().is_some_and(Token::is_eof) {
        errors.push(ErrorToken::style(open, ErrorCode::CssSyntaxUnterminatedBlock));
    }

    let mut contents: Vec<Token> = consumed.into_iter().skip(1).collect();
    let end = contents.pop().map_or(open, |t| t.pos);
    contents.push(Token::eof(end));
    contents
}
