//! CSS Tokenizer
//!
//! Tokenizes CSS input according to CSS Syntax Module Level 3. Every token
//! records the line and column of its first code point. Malformed input never
//! stops the tokenizer: the problem is reported as an [`ErrorToken`] and
//! tokenizing continues with the next code point.

use crate::error::{ErrorCode, ErrorToken, SourceLocation};

/// Whether a numeric token was written as an integer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericType {
    /// No fraction and no exponent
    Integer,
    /// Has a fraction or an exponent
    Number,
}

impl NumericType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Number => "number",
        }
    }
}

/// Value shared by number, percentage and dimension tokens
#[derive(Debug, Clone, PartialEq)]
pub struct Numeric {
    /// Parsed value
    pub value: f64,
    /// Source text of the number, sign and exponent included
    pub repr: String,
    pub numeric_type: NumericType,
}

/// Hash token type (id or unrestricted)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashType {
    /// The name would start an identifier, so it could be an ID selector
    Id,
    /// Anything else (e.g., a color like `#123`)
    Unrestricted,
}

impl HashType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Unrestricted => "unrestricted",
        }
    }
}

/// CSS Token kinds
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Identifier (e.g., property names, keywords)
    Ident(String),
    /// Function token (identifier followed by '('), without the paren
    Function(String),
    /// At-keyword without the '@' (e.g., media, keyframes)
    AtKeyword(String),
    /// Hash token (e.g., #id, #fff)
    Hash(String, HashType),
    /// String token, escapes decoded
    String(String),
    /// Unquoted url(...) contents
    Url(String),
    /// Number (without unit)
    Number(Numeric),
    /// Percentage
    Percentage(Numeric),
    /// Dimension (number with unit)
    Dimension(Numeric, String),
    /// Run of whitespace
    Whitespace,
    /// Comment text, only produced when comments are kept
    Comment(String),
    /// `<!--`
    Cdo,
    /// `-->`
    Cdc,
    Colon,
    Semicolon,
    Comma,
    /// `~=`
    IncludeMatch,
    /// `|=`
    DashMatch,
    /// `^=`
    PrefixMatch,
    /// `$=`
    SuffixMatch,
    /// `*=`
    SubstringMatch,
    /// `||`
    Column,
    OpenCurly,
    CloseCurly,
    OpenSquare,
    CloseSquare,
    OpenParen,
    CloseParen,
    /// Delim (any other single code point)
    Delim(char),
    /// End of file
    Eof,
}

/// Type tag of tokens and parse tree nodes, as exposed in JSON views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    AtKeyword,
    Cdc,
    Cdo,
    CloseCurly,
    CloseParen,
    CloseSquare,
    Colon,
    Column,
    Comma,
    Comment,
    DashMatch,
    Delim,
    Dimension,
    EofToken,
    Error,
    FunctionToken,
    Hash,
    Ident,
    IncludeMatch,
    Number,
    OpenCurly,
    OpenParen,
    OpenSquare,
    Percentage,
    PrefixMatch,
    Semicolon,
    String,
    SubstringMatch,
    SuffixMatch,
    Whitespace,
    Url,
    Stylesheet,
    AtRule,
    QualifiedRule,
    Declaration,
    ParsedCssUrl,
}

impl TokenType {
    pub fn name(&self) -> &'static str {
        match self {
            Self::AtKeyword => "AT_KEYWORD",
            Self::Cdc => "CDC",
            Self::Cdo => "CDO",
            Self::CloseCurly => "CLOSE_CURLY",
            Self::CloseParen => "CLOSE_PAREN",
            Self::CloseSquare => "CLOSE_SQUARE",
            Self::Colon => "COLON",
            Self::Column => "COLUMN",
            Self::Comma => "COMMA",
            Self::Comment => "COMMENT",
            Self::DashMatch => "DASH_MATCH",
            Self::Delim => "DELIM",
            Self::Dimension => "DIMENSION",
            Self::EofToken => "EOF_TOKEN",
            Self::Error => "ERROR",
            Self::FunctionToken => "FUNCTION_TOKEN",
            Self::Hash => "HASH",
            Self::Ident => "IDENT",
            Self::IncludeMatch => "INCLUDE_MATCH",
            Self::Number => "NUMBER",
            Self::OpenCurly => "OPEN_CURLY",
            Self::OpenParen => "OPEN_PAREN",
            Self::OpenSquare => "OPEN_SQUARE",
            Self::Percentage => "PERCENTAGE",
            Self::PrefixMatch => "PREFIX_MATCH",
            Self::Semicolon => "SEMICOLON",
            Self::String => "STRING",
            Self::SubstringMatch => "SUBSTRING_MATCH",
            Self::SuffixMatch => "SUFFIX_MATCH",
            Self::Whitespace => "WHITESPACE",
            Self::Url => "URL",
            Self::Stylesheet => "STYLESHEET",
            Self::AtRule => "AT_RULE",
            Self::QualifiedRule => "QUALIFIED_RULE",
            Self::Declaration => "DECLARATION",
            Self::ParsedCssUrl => "PARSED_CSS_URL",
        }
    }
}

/// A token and where it starts
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub pos: SourceLocation,
}

impl Token {
    pub fn new(kind: TokenKind, pos: SourceLocation) -> Self {
        Self { kind, pos }
    }

    /// An EOF token at `pos`; the parser uses these to terminate sub-lists
    pub fn eof(pos: SourceLocation) -> Self {
        Self::new(TokenKind::Eof, pos)
    }

    pub fn token_type(&self) -> TokenType {
        match &self.kind {
            TokenKind::Ident(_) => TokenType::Ident,
            TokenKind::Function(_) => TokenType::FunctionToken,
            TokenKind::AtKeyword(_) => TokenType::AtKeyword,
            TokenKind::Hash(..) => TokenType::Hash,
            TokenKind::String(_) => TokenType::String,
            TokenKind::Url(_) => TokenType::Url,
            TokenKind::Number(_) => TokenType::Number,
            TokenKind::Percentage(_) => TokenType::Percentage,
            TokenKind::Dimension(..) => TokenType::Dimension,
            TokenKind::Whitespace => TokenType::Whitespace,
            TokenKind::Comment(_) => TokenType::Comment,
            TokenKind::Cdo => TokenType::Cdo,
            TokenKind::Cdc => TokenType::Cdc,
            TokenKind::Colon => TokenType::Colon,
            TokenKind::Semicolon => TokenType::Semicolon,
            TokenKind::Comma => TokenType::Comma,
            TokenKind::IncludeMatch => TokenType::IncludeMatch,
            TokenKind::DashMatch => TokenType::DashMatch,
            TokenKind::PrefixMatch => TokenType::PrefixMatch,
            TokenKind::SuffixMatch => TokenType::SuffixMatch,
            TokenKind::SubstringMatch => TokenType::SubstringMatch,
            TokenKind::Column => TokenType::Column,
            TokenKind::OpenCurly => TokenType::OpenCurly,
            TokenKind::CloseCurly => TokenType::CloseCurly,
            TokenKind::OpenSquare => TokenType::OpenSquare,
            TokenKind::CloseSquare => TokenType::CloseSquare,
            TokenKind::OpenParen => TokenType::OpenParen,
            TokenKind::CloseParen => TokenType::CloseParen,
            TokenKind::Delim(_) => TokenType::Delim,
            TokenKind::Eof => TokenType::EofToken,
        }
    }

    /// Payload of identifier-like, hash, string and url tokens
    pub fn string_value(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Ident(s)
            | TokenKind::Function(s)
            | TokenKind::AtKeyword(s)
            | TokenKind::Hash(s, _)
            | TokenKind::String(s)
            | TokenKind::Url(s) => Some(s),
            _ => None,
        }
    }

    /// True for an IDENT equal to `name`, ignoring ASCII case
    pub fn is_ident(&self, name: &str) -> bool {
        matches!(&self.kind, TokenKind::Ident(s) if s.eq_ignore_ascii_case(name))
    }

    pub fn is_delim(&self, c: char) -> bool {
        self.kind == TokenKind::Delim(c)
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }

    pub fn is_whitespace(&self) -> bool {
        self.kind == TokenKind::Whitespace
    }

    /// Character of a block or paren token
    pub fn grouping_char(&self) -> Option<char> {
        match self.kind {
            TokenKind::OpenCurly => Some('{'),
            TokenKind::CloseCurly => Some('}'),
            TokenKind::OpenSquare => Some('['),
            TokenKind::CloseSquare => Some(']'),
            TokenKind::OpenParen => Some('('),
            TokenKind::CloseParen => Some(')'),
            _ => None,
        }
    }

    /// Closing token kind matching an opening block token
    pub fn mirror(&self) -> Option<TokenKind> {
        match self.kind {
            TokenKind::OpenCurly => Some(TokenKind::CloseCurly),
            TokenKind::OpenSquare => Some(TokenKind::CloseSquare),
            TokenKind::OpenParen | TokenKind::Function(_) => Some(TokenKind::CloseParen),
            _ => None,
        }
    }
}

/// Tokenize `input`, with positions counted from `line`/`col`.
///
/// The returned list always ends with an EOF token. Problems are appended
/// to `errors`.
pub fn tokenize(
    input: &str,
    line: usize,
    col: usize,
    errors: &mut Vec<ErrorToken>,
) -> Vec<Token> {
    Tokenizer::new(input, line, col).tokenize_all(errors)
}

/// CSS Tokenizer
pub struct Tokenizer {
    /// Preprocessed code points
    chars: Vec<char>,
    /// Location of each code point
    positions: Vec<SourceLocation>,
    start: SourceLocation,
    eof_pos: SourceLocation,
    /// Number of code points consumed; the current code point is at `cursor - 1`
    cursor: usize,
    current: Option<char>,
    keep_comments: bool,
    errors: Vec<ErrorToken>,
}

impl Tokenizer {
    /// Create a new tokenizer whose first code point sits at `line`/`col`
    pub fn new(input: &str, line: usize, col: usize) -> Self {
        let chars = preprocess(input);
        let mut positions = Vec::with_capacity(chars.len());
        let mut current = SourceLocation::new(line, col);
        for &c in &chars {
            positions.push(current);
            if c == '\n' {
                current.line += 1;
                current.col = 0;
            } else {
                current.col += 1;
            }
        }

        Self {
            chars,
            positions,
            start: SourceLocation::new(line, col),
            eof_pos: current,
            cursor: 0,
            current: None,
            keep_comments: false,
            errors: Vec::new(),
        }
    }

    /// Emit comments as COMMENT tokens instead of dropping them
    pub fn keep_comments(mut self, keep: bool) -> Self {
        self.keep_comments = keep;
        self
    }

    /// Tokenize all input, moving any problems found into `errors`
    pub fn tokenize_all(mut self, errors: &mut Vec<ErrorToken>) -> Vec<Token> {
        let mut tokens = Vec::new();
        while self.next(1).is_some() {
            let before = self.cursor;
            if let Some(token) = self.consume_a_token() {
                tokens.push(token);
            }
            debug_assert!(self.cursor > before, "tokenizer made no progress");
        }
        tokens.push(Token::eof(self.eof_pos));

        log::trace!(
            "Tokenized {} code points into {} tokens ({} errors)",
            self.chars.len(),
            tokens.len(),
            self.errors.len()
        );
        errors.append(&mut self.errors);
        tokens
    }

    /// Location of the current code point
    fn location(&self) -> SourceLocation {
        match self.cursor.checked_sub(1) {
            None => self.start,
            Some(index) => self.positions.get(index).copied().unwrap_or(self.eof_pos),
        }
    }

    /// Peek `n` code points ahead of the current one
    fn next(&self, n: usize) -> Option<char> {
        debug_assert!((1..=3).contains(&n), "at most three code points of lookahead");
        self.chars.get(self.cursor + n - 1).copied()
    }

    /// Move ahead `n` code points; may move past the end of input
    fn consume(&mut self, n: usize) {
        self.cursor += n;
        self.current = self.chars.get(self.cursor - 1).copied();
    }

    /// Back up exactly one code point
    fn reconsume(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
        self.current = self
            .cursor
            .checked_sub(1)
            .and_then(|index| self.chars.get(index).copied());
    }

    /// Consume the current code point into `out`
    fn consume_into(&mut self, out: &mut String) {
        self.consume(1);
        if let Some(c) = self.current {
            out.push(c);
        }
    }

    fn consume_digits(&mut self, out: &mut String) {
        while is_digit(self.next(1)) {
            self.consume_into(out);
        }
    }

    /// Get the next token, or `None` if what was consumed produced no token
    fn consume_a_token(&mut self) -> Option<Token> {
        if let Some(comment) = self.consume_comments() {
            return Some(comment);
        }
        // A trailing comment may have run to the end of input.
        self.next(1)?;

        self.consume(1);
        let mark = self.location();
        let c = self.current?;

        let kind = match c {
            c if is_whitespace(c) => {
                // Merge consecutive whitespace into one token
                while self.next(1).is_some_and(is_whitespace) {
                    self.consume(1);
                }
                Ok(TokenKind::Whitespace)
            }
            '"' | '\'' => self.consume_a_string_token(),
            '#' => {
                if self.next(1).is_some_and(is_name_char)
                    || are_a_valid_escape(self.next(1), self.next(2))
                {
                    let hash_type =
                        if would_start_an_identifier(self.next(1), self.next(2), self.next(3)) {
                            HashType::Id
                        } else {
                            HashType::Unrestricted
                        };
                    Ok(TokenKind::Hash(self.consume_a_name(), hash_type))
                } else {
                    Ok(TokenKind::Delim(c))
                }
            }
            '$' => Ok(self.consume_a_match('=', TokenKind::SuffixMatch, c)),
            '(' => Ok(TokenKind::OpenParen),
            ')' => Ok(TokenKind::CloseParen),
            '*' => Ok(self.consume_a_match('=', TokenKind::SubstringMatch, c)),
            '+' | '.' => {
                if self.starts_with_a_number() {
                    self.reconsume();
                    Ok(self.consume_a_numeric_token())
                } else {
                    Ok(TokenKind::Delim(c))
                }
            }
            ',' => Ok(TokenKind::Comma),
            '-' => {
                if self.starts_with_a_number() {
                    self.reconsume();
                    Ok(self.consume_a_numeric_token())
                } else if self.next(1) == Some('-') && self.next(2) == Some('>') {
                    self.consume(2);
                    Ok(TokenKind::Cdc)
                } else if self.starts_with_an_identifier() {
                    self.reconsume();
                    self.consume_an_identlike_token()
                } else {
                    Ok(TokenKind::Delim(c))
                }
            }
            ':' => Ok(TokenKind::Colon),
            ';' => Ok(TokenKind::Semicolon),
            '<' => {
                if self.next(1) == Some('!') && self.next(2) == Some('-') && self.next(3) == Some('-')
                {
                    self.consume(3);
                    Ok(TokenKind::Cdo)
                } else {
                    Ok(TokenKind::Delim(c))
                }
            }
            '@' => {
                if would_start_an_identifier(self.next(1), self.next(2), self.next(3)) {
                    Ok(TokenKind::AtKeyword(self.consume_a_name()))
                } else {
                    Ok(TokenKind::Delim(c))
                }
            }
            '[' => Ok(TokenKind::OpenSquare),
            '\\' => {
                if self.starts_with_a_valid_escape() {
                    self.reconsume();
                    self.consume_an_identlike_token()
                } else {
                    // A backslash directly before a newline
                    Err(ErrorCode::CssSyntaxStrayTrailingBackslash)
                }
            }
            ']' => Ok(TokenKind::CloseSquare),
            '^' => Ok(self.consume_a_match('=', TokenKind::PrefixMatch, c)),
            '{' => Ok(TokenKind::OpenCurly),
            '|' => {
                if self.next(1) == Some('|') {
                    self.consume(1);
                    Ok(TokenKind::Column)
                } else {
                    Ok(self.consume_a_match('=', TokenKind::DashMatch, c))
                }
            }
            '}' => Ok(TokenKind::CloseCurly),
            '~' => Ok(self.consume_a_match('=', TokenKind::IncludeMatch, c)),
            c if c.is_ascii_digit() => {
                self.reconsume();
                Ok(self.consume_a_numeric_token())
            }
            c if is_name_start_char(c) => {
                self.reconsume();
                self.consume_an_identlike_token()
            }
            c => Ok(TokenKind::Delim(c)),
        };

        match kind {
            Ok(kind) => Some(Token::new(kind, mark)),
            Err(code) => {
                self.errors.push(ErrorToken::style(mark, code));
                None
            }
        }
    }

    /// Two code point token if `second` follows, otherwise a delim
    fn consume_a_match(&mut self, second: char, kind: TokenKind, first: char) -> TokenKind {
        if self.next(1) == Some(second) {
            self.consume(1);
            kind
        } else {
            TokenKind::Delim(first)
        }
    }

    /// Consume comments starting at the next code point.
    ///
    /// Dropped comments produce nothing; kept comments are returned one at
    /// a time. Running out of input inside a comment is reported at the
    /// code point before the comment.
    fn consume_comments(&mut self) -> Option<Token> {
        let mark = self.location();
        while self.next(1) == Some('/') && self.next(2) == Some('*') {
            self.consume(1);
            let start = self.location();
            self.consume(1);

            let mut text = String::new();
            loop {
                self.consume(1);
                match self.current {
                    Some('*') if self.next(1) == Some('/') => {
                        self.consume(1);
                        break;
                    }
                    Some(c) => text.push(c),
                    None => {
                        self.errors.push(ErrorToken::style(
                            mark,
                            ErrorCode::CssSyntaxUnterminatedComment,
                        ));
                        return self
                            .keep_comments
                            .then(|| Token::new(TokenKind::Comment(text), start));
                    }
                }
            }

            if self.keep_comments {
                return Some(Token::new(TokenKind::Comment(text), start));
            }
        }
        None
    }

    /// Number, percentage or dimension
    fn consume_a_numeric_token(&mut self) -> TokenKind {
        let number = self.consume_a_number();
        if would_start_an_identifier(self.next(1), self.next(2), self.next(3)) {
            let unit = self.consume_a_name();
            TokenKind::Dimension(number, unit)
        } else if self.next(1) == Some('%') {
            self.consume(1);
            TokenKind::Percentage(number)
        } else {
            TokenKind::Number(number)
        }
    }

    /// Ident, function or url token
    fn consume_an_identlike_token(&mut self) -> Result<TokenKind, ErrorCode> {
        let name = self.consume_a_name();

        if name.eq_ignore_ascii_case("url") && self.next(1) == Some('(') {
            self.consume(1);
            while self.next(1).is_some_and(is_whitespace) && self.next(2).is_some_and(is_whitespace)
            {
                self.consume(1);
            }
            let is_quote = |c: Option<char>| matches!(c, Some('"') | Some('\''));
            if is_quote(self.next(1))
                || (self.next(1).is_some_and(is_whitespace) && is_quote(self.next(2)))
            {
                // Quoted url - the parser sees a function with a string argument
                return Ok(TokenKind::Function(name));
            }
            return self.consume_a_url_token();
        }

        if self.next(1) == Some('(') {
            self.consume(1);
            return Ok(TokenKind::Function(name));
        }

        Ok(TokenKind::Ident(name))
    }

    /// Consume a string token; the current code point is the opening quote
    fn consume_a_string_token(&mut self) -> Result<TokenKind, ErrorCode> {
        let ending = self.current;
        let mut value = String::new();

        loop {
            self.consume(1);
            match self.current {
                None => return Ok(TokenKind::String(value)),
                c if c == ending => return Ok(TokenKind::String(value)),
                Some('\n') => {
                    self.reconsume();
                    return Err(ErrorCode::CssSyntaxUnterminatedString);
                }
                Some('\\') => match self.next(1) {
                    None => {}
                    // Line continuation
                    Some('\n') => self.consume(1),
                    Some(_) => value.push(self.consume_escape()),
                },
                Some(c) => value.push(c),
            }
        }
    }

    /// Consume the contents of an unquoted url(...)
    fn consume_a_url_token(&mut self) -> Result<TokenKind, ErrorCode> {
        let mut value = String::new();
        while self.next(1).is_some_and(is_whitespace) {
            self.consume(1);
        }
        if self.next(1).is_none() {
            return Ok(TokenKind::Url(value));
        }

        loop {
            self.consume(1);
            match self.current {
                None | Some(')') => return Ok(TokenKind::Url(value)),
                Some(c) if is_whitespace(c) => {
                    while self.next(1).is_some_and(is_whitespace) {
                        self.consume(1);
                    }
                    if matches!(self.next(1), None | Some(')')) {
                        self.consume(1);
                        return Ok(TokenKind::Url(value));
                    }
                    self.consume_the_remnants_of_a_bad_url();
                    return Err(ErrorCode::CssSyntaxBadUrl);
                }
                Some('"') | Some('\'') | Some('(') => {
                    self.consume_the_remnants_of_a_bad_url();
                    return Err(ErrorCode::CssSyntaxBadUrl);
                }
                Some(c) if is_non_printable(c) => {
                    self.consume_the_remnants_of_a_bad_url();
                    return Err(ErrorCode::CssSyntaxBadUrl);
                }
                Some('\\') => {
                    if self.starts_with_a_valid_escape() {
                        value.push(self.consume_escape());
                    } else {
                        self.consume_the_remnants_of_a_bad_url();
                        return Err(ErrorCode::CssSyntaxBadUrl);
                    }
                }
                Some(c) => value.push(c),
            }
        }
    }

    /// Consume an escape such as `\26` (plus one trailing whitespace).
    ///
    /// The current code point is the backslash, which is not followed by a
    /// newline.
    fn consume_escape(&mut self) -> char {
        self.consume(1);
        match self.current {
            Some(first) if first.is_ascii_hexdigit() => {
                let mut digits = String::from(first);
                while digits.len() < 6 {
                    match self.next(1).filter(char::is_ascii_hexdigit) {
                        Some(_) => self.consume_into(&mut digits),
                        None => break,
                    }
                }
                if self.next(1).is_some_and(is_whitespace) {
                    self.consume(1);
                }
                let value = u32::from_str_radix(&digits, 16).unwrap_or(0);
                if value == 0 {
                    char::REPLACEMENT_CHARACTER
                } else {
                    char::from_u32(value).unwrap_or(char::REPLACEMENT_CHARACTER)
                }
            }
            None => char::REPLACEMENT_CHARACTER,
            Some(c) => c,
        }
    }

    fn starts_with_a_valid_escape(&self) -> bool {
        are_a_valid_escape(self.current, self.next(1))
    }

    fn starts_with_an_identifier(&self) -> bool {
        would_start_an_identifier(self.current, self.next(1), self.next(2))
    }

    fn starts_with_a_number(&self) -> bool {
        would_start_a_number(self.current, self.next(1), self.next(2))
    }

    /// Consume a name made of name code points and escapes
    fn consume_a_name(&mut self) -> String {
        let mut result = String::new();
        loop {
            self.consume(1);
            match self.current {
                Some(c) if is_name_char(c) => result.push(c),
                _ if self.starts_with_a_valid_escape() => result.push(self.consume_escape()),
                _ => {
                    self.reconsume();
                    return result;
                }
            }
        }
    }

    /// Consume a number, keeping its exact source text
    fn consume_a_number(&mut self) -> Numeric {
        let mut repr = String::new();
        let mut numeric_type = NumericType::Integer;

        if matches!(self.next(1), Some('+') | Some('-')) {
            self.consume_into(&mut repr);
        }
        self.consume_digits(&mut repr);

        if self.next(1) == Some('.') && is_digit(self.next(2)) {
            self.consume_into(&mut repr);
            numeric_type = NumericType::Number;
            self.consume_digits(&mut repr);
        }

        let (c1, c2, c3) = (self.next(1), self.next(2), self.next(3));
        if matches!(c1, Some('e') | Some('E')) {
            if is_digit(c2) {
                self.consume_into(&mut repr);
                numeric_type = NumericType::Number;
                self.consume_digits(&mut repr);
            } else if matches!(c2, Some('+') | Some('-')) && is_digit(c3) {
                self.consume_into(&mut repr);
                self.consume_into(&mut repr);
                numeric_type = NumericType::Number;
                self.consume_digits(&mut repr);
            }
        }

        Numeric {
            value: repr.parse().unwrap_or(0.0),
            repr,
            numeric_type,
        }
    }

    /// Skip what is left of a bad url, through the closing paren
    fn consume_the_remnants_of_a_bad_url(&mut self) {
        loop {
            self.consume(1);
            match self.current {
                None | Some(')') => return,
                _ if self.starts_with_a_valid_escape() => {
                    self.consume_escape();
                }
                _ => {}
            }
        }
    }
}

/// Newline normalization and NUL replacement
fn preprocess(input: &str) -> Vec<char> {
    let mut out = Vec::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                chars.next_if_eq(&'\n');
                out.push('\n');
            }
            '\x0C' => out.push('\n'),
            '\0' => out.push(char::REPLACEMENT_CHARACTER),
            c => out.push(c),
        }
    }
    out
}

fn is_digit(c: Option<char>) -> bool {
    c.is_some_and(|c| c.is_ascii_digit())
}

fn is_whitespace(c: char) -> bool {
    matches!(c, '\n' | '\t' | ' ')
}

fn is_non_printable(c: char) -> bool {
    matches!(c, '\0'..='\x08' | '\x0B' | '\x0E'..='\x1F' | '\x7F')
}

/// Check if character can start a name
fn is_name_start_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

/// Check if character can be part of a name
fn is_name_char(c: char) -> bool {
    is_name_start_char(c) || c.is_ascii_digit() || c == '-'
}

fn are_a_valid_escape(c1: Option<char>, c2: Option<char>) -> bool {
    c1 == Some('\\') && c2 != Some('\n')
}

fn would_start_an_identifier(c1: Option<char>, c2: Option<char>, c3: Option<char>) -> bool {
    match c1 {
        Some('-') => {
            c2.is_some_and(is_name_start_char) || c2 == Some('-') || are_a_valid_escape(c2, c3)
        }
        Some('\\') => are_a_valid_escape(c1, c2),
        Some(c) => is_name_start_char(c),
        None => false,
    }
}

fn would_start_a_number(c1: Option<char>, c2: Option<char>, c3: Option<char>) -> bool {
    match c1 {
        Some('+') | Some('-') => is_digit(c2) || (c2 == Some('.') && is_digit(c3)),
        Some('.') => is_digit(c2),
        c => is_digit(c),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(input: &str) -> (Vec<Token>, Vec<ErrorToken>) {
        let mut errors = Vec::new();
        let tokens = tokenize(input, 1, 0, &mut errors);
        (tokens, errors)
    }

    fn kinds(input: &str) -> Vec<TokenKind> {
        lex(input).0.into_iter().map(|t| t.kind).collect()
    }

    fn at(line: usize, col: usize) -> SourceLocation {
        SourceLocation::new(line, col)
    }

    #[test]
    fn test_simple_rule_positions() {
        let (tokens, errors) = lex("foo { bar: baz; }");
        let summary: Vec<_> = tokens.iter().map(|t| (t.token_type(), t.pos.col)).collect();
        assert_eq!(
            summary,
            vec![
                (TokenType::Ident, 0),
                (TokenType::Whitespace, 3),
                (TokenType::OpenCurly, 4),
                (TokenType::Whitespace, 5),
                (TokenType::Ident, 6),
                (TokenType::Colon, 9),
                (TokenType::Whitespace, 10),
                (TokenType::Ident, 11),
                (TokenType::Semicolon, 14),
                (TokenType::Whitespace, 15),
                (TokenType::CloseCurly, 16),
                (TokenType::EofToken, 17),
            ]
        );
        assert!(tokens.iter().all(|t| t.pos.line == 1));
        assert!(errors.is_empty());
    }

    #[test]
    fn test_unterminated_string_on_newline() {
        let (tokens, errors) = lex(" \"\n \"");
        assert_eq!(tokens.len(), 4);
        assert_eq!(tokens[0], Token::new(TokenKind::Whitespace, at(1, 0)));
        assert_eq!(tokens[1], Token::new(TokenKind::Whitespace, at(1, 2)));
        assert_eq!(tokens[2], Token::new(TokenKind::String(String::new()), at(2, 1)));
        assert_eq!(tokens[3], Token::eof(at(2, 2)));
        assert_eq!(
            errors,
            vec![ErrorToken::style(at(1, 1), ErrorCode::CssSyntaxUnterminatedString)]
        );
    }

    #[test]
    fn test_error_positions_use_start_offset() {
        let css = "line 1 \"unterminated\nline 2 \"unterminated\n";

        let mut errors = Vec::new();
        tokenize(css, 1, 0, &mut errors);
        let positions: Vec<_> = errors.iter().map(|e| e.pos).collect();
        assert_eq!(positions, vec![at(1, 7), at(2, 7)]);

        let mut errors = Vec::new();
        tokenize(css, 5, 5, &mut errors);
        let positions: Vec<_> = errors.iter().map(|e| e.pos).collect();
        assert_eq!(positions, vec![at(5, 12), at(6, 7)]);
        assert!(errors.iter().all(|e| e.code == ErrorCode::CssSyntaxUnterminatedString));
    }

    #[test]
    fn test_stray_trailing_backslash() {
        let (tokens, errors) = lex("a trailing \\\nbackslash");
        assert_eq!(
            errors,
            vec![ErrorToken::style(at(1, 11), ErrorCode::CssSyntaxStrayTrailingBackslash)]
        );
        assert!(tokens.iter().any(|t| t.kind == TokenKind::Ident("backslash".into())));
    }

    #[test]
    fn test_unterminated_comment() {
        let (tokens, errors) = lex("h1 {color: red; } /*");
        assert_eq!(
            errors,
            vec![ErrorToken::style(at(1, 17), ErrorCode::CssSyntaxUnterminatedComment)]
        );
        // Exactly one EOF token, at the very end
        assert_eq!(tokens.iter().filter(|t| t.is_eof()).count(), 1);
        assert_eq!(tokens.last(), Some(&Token::eof(at(1, 20))));
    }

    #[test]
    fn test_bad_url() {
        let (_, errors) = lex("oh hi url(foo\"bar)");
        assert_eq!(errors, vec![ErrorToken::style(at(1, 6), ErrorCode::CssSyntaxBadUrl)]);
    }

    #[test]
    fn test_bad_url_recovers_after_paren() {
        let (tokens, errors) = lex("url(a b) c");
        assert_eq!(errors, vec![ErrorToken::style(at(1, 0), ErrorCode::CssSyntaxBadUrl)]);
        assert_eq!(
            tokens,
            vec![
                Token::new(TokenKind::Whitespace, at(1, 8)),
                Token::new(TokenKind::Ident("c".into()), at(1, 9)),
                Token::eof(at(1, 10)),
            ]
        );
    }

    #[test]
    fn test_class_selector() {
        let tokens = kinds(".container");
        assert!(matches!(tokens[0], TokenKind::Delim('.')));
        assert!(matches!(tokens[1], TokenKind::Ident(ref s) if s == "container"));
    }

    #[test]
    fn test_hash_types() {
        let tokens = kinds("#main #123 #-x");
        assert!(matches!(tokens[0], TokenKind::Hash(ref s, HashType::Id) if s == "main"));
        assert!(matches!(tokens[2], TokenKind::Hash(ref s, HashType::Unrestricted) if s == "123"));
        assert!(matches!(tokens[4], TokenKind::Hash(ref s, HashType::Id) if s == "-x"));
    }

    #[test]
    fn test_lone_hash_is_delim() {
        let tokens = kinds("# a");
        assert!(matches!(tokens[0], TokenKind::Delim('#')));
    }

    #[test]
    fn test_integer() {
        let tokens = kinds("42");
        assert!(matches!(tokens[0], TokenKind::Number(ref n)
            if n.value == 42.0 && n.repr == "42" && n.numeric_type == NumericType::Integer));
    }

    #[test]
    fn test_float() {
        let tokens = kinds("2.5");
        assert!(matches!(tokens[0], TokenKind::Number(ref n)
            if n.value == 2.5 && n.repr == "2.5" && n.numeric_type == NumericType::Number));
    }

    #[test]
    fn test_signed_numbers() {
        let tokens = kinds("+.5 -7");
        assert!(matches!(tokens[0], TokenKind::Number(ref n) if n.value == 0.5 && n.repr == "+.5"));
        assert!(matches!(tokens[2], TokenKind::Number(ref n) if n.value == -7.0 && n.repr == "-7"));
    }

    #[test]
    fn test_exponent() {
        let tokens = kinds("1e3 2E-2");
        assert!(matches!(tokens[0], TokenKind::Number(ref n)
            if n.value == 1000.0 && n.repr == "1e3" && n.numeric_type == NumericType::Number));
        assert!(matches!(tokens[2], TokenKind::Number(ref n) if n.value == 0.02 && n.repr == "2E-2"));
    }

    #[test]
    fn test_exponent_without_digits_is_a_unit() {
        let tokens = kinds("1e");
        assert!(matches!(tokens[0], TokenKind::Dimension(ref n, ref u)
            if n.value == 1.0 && n.numeric_type == NumericType::Integer && u == "e"));
    }

    #[test]
    fn test_percentage() {
        let tokens = kinds("50%");
        assert!(matches!(tokens[0], TokenKind::Percentage(ref n) if n.value == 50.0 && n.repr == "50"));
    }

    #[test]
    fn test_dimension_px() {
        let tokens = kinds("100px");
        assert!(matches!(tokens[0], TokenKind::Dimension(ref n, ref u) if n.value == 100.0 && u == "px"));
    }

    #[test]
    fn test_negative_dimension() {
        let tokens = kinds("-10px");
        assert!(matches!(tokens[0], TokenKind::Dimension(ref n, ref u) if n.value == -10.0 && u == "px"));
    }

    #[test]
    fn test_string_double() {
        let tokens = kinds("\"hello world\"");
        assert!(matches!(tokens[0], TokenKind::String(ref s) if s == "hello world"));
    }

    #[test]
    fn test_string_single_with_escapes() {
        let tokens = kinds("'a\\26 b\\\nc\\''");
        assert!(matches!(tokens[0], TokenKind::String(ref s) if s == "a&bc'"));
    }

    #[test]
    fn test_string_ends_at_eof_without_error() {
        let (tokens, errors) = lex("'abc");
        assert!(matches!(tokens[0].kind, TokenKind::String(ref s) if s == "abc"));
        assert!(errors.is_empty());
    }

    #[test]
    fn test_at_keyword() {
        let tokens = kinds("@media @-webkit-keyframes @ 1");
        assert!(matches!(tokens[0], TokenKind::AtKeyword(ref s) if s == "media"));
        assert!(matches!(tokens[2], TokenKind::AtKeyword(ref s) if s == "-webkit-keyframes"));
        assert!(matches!(tokens[4], TokenKind::Delim('@')));
    }

    #[test]
    fn test_function() {
        let tokens = kinds("rgb(255, 0, 0)");
        assert!(matches!(tokens[0], TokenKind::Function(ref s) if s == "rgb"));
        assert!(matches!(tokens[1], TokenKind::Number(ref n) if n.value == 255.0));
        assert!(matches!(tokens[2], TokenKind::Comma));
        assert!(matches!(tokens[8], TokenKind::CloseParen));
    }

    #[test]
    fn test_url_bare() {
        let tokens = kinds("url( http://example.com/image.png )");
        assert!(matches!(tokens[0], TokenKind::Url(ref s) if s == "http://example.com/image.png"));
        assert!(matches!(tokens[1], TokenKind::Eof));
    }

    #[test]
    fn test_url_quoted() {
        let tokens = kinds("url(\"http://example.com\") URL( 'x')");
        assert!(matches!(tokens[0], TokenKind::Function(ref s) if s == "url"));
        assert!(matches!(tokens[1], TokenKind::String(ref s) if s == "http://example.com"));
        assert!(matches!(tokens[4], TokenKind::Function(ref s) if s == "URL"));
        assert!(matches!(tokens[5], TokenKind::Whitespace));
        assert!(matches!(tokens[6], TokenKind::String(ref s) if s == "x"));
    }

    #[test]
    fn test_url_escape() {
        let tokens = kinds("url(a\\29 b)");
        assert!(matches!(tokens[0], TokenKind::Url(ref s) if s == "a)b"));
    }

    #[test]
    fn test_match_tokens() {
        let tokens = kinds("~= |= ^= $= *= || |");
        let types: Vec<_> = tokens
            .iter()
            .filter(|k| **k != TokenKind::Whitespace)
            .cloned()
            .collect();
        assert_eq!(
            types,
            vec![
                TokenKind::IncludeMatch,
                TokenKind::DashMatch,
                TokenKind::PrefixMatch,
                TokenKind::SuffixMatch,
                TokenKind::SubstringMatch,
                TokenKind::Column,
                TokenKind::Delim('|'),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_cdo_cdc() {
        let tokens = kinds("<!-- -->");
        assert_eq!(
            tokens,
            vec![TokenKind::Cdo, TokenKind::Whitespace, TokenKind::Cdc, TokenKind::Eof]
        );
    }

    #[test]
    fn test_dash_ident_and_custom_property() {
        let tokens = kinds("-moz-box var(--main-color) - 1");
        assert!(matches!(tokens[0], TokenKind::Ident(ref s) if s == "-moz-box"));
        assert!(matches!(tokens[2], TokenKind::Function(ref s) if s == "var"));
        assert!(matches!(tokens[3], TokenKind::Ident(ref s) if s == "--main-color"));
        assert!(matches!(tokens[6], TokenKind::Delim('-')));
    }

    #[test]
    fn test_ident_escape() {
        let tokens = kinds("\\41 b");
        assert!(matches!(tokens[0], TokenKind::Ident(ref s) if s == "Ab"));
    }

    #[test]
    fn test_escape_out_of_range_is_replaced() {
        let tokens = kinds("\\110000x");
        assert!(matches!(tokens[0], TokenKind::Ident(ref s) if s == "\u{FFFD}x"));
    }

    #[test]
    fn test_pseudo_element() {
        let tokens = kinds("::before");
        assert!(matches!(tokens[0], TokenKind::Colon));
        assert!(matches!(tokens[1], TokenKind::Colon));
        assert!(matches!(tokens[2], TokenKind::Ident(ref s) if s == "before"));
    }

    #[test]
    fn test_comment_dropped_by_default() {
        let (tokens, errors) = lex("/* comment */p");
        assert_eq!(tokens[0], Token::new(TokenKind::Ident("p".into()), at(1, 13)));
        assert!(errors.is_empty());
    }

    #[test]
    fn test_comment_kept_on_request() {
        let mut errors = Vec::new();
        let tokens = Tokenizer::new("a/* hi */b", 1, 0)
            .keep_comments(true)
            .tokenize_all(&mut errors);
        assert_eq!(
            tokens,
            vec![
                Token::new(TokenKind::Ident("a".into()), at(1, 0)),
                Token::new(TokenKind::Comment(" hi ".into()), at(1, 1)),
                Token::new(TokenKind::Ident("b".into()), at(1, 9)),
                Token::eof(at(1, 10)),
            ]
        );
    }

    #[test]
    fn test_newline_normalization() {
        let (tokens, _) = lex("a\r\nb\rc\x0Cd");
        let idents: Vec<_> = tokens
            .iter()
            .filter(|t| matches!(t.kind, TokenKind::Ident(_)))
            .map(|t| t.pos)
            .collect();
        assert_eq!(idents, vec![at(1, 0), at(2, 0), at(3, 0), at(4, 0)]);
    }

    #[test]
    fn test_nul_is_replaced() {
        let tokens = kinds("a\0b");
        assert!(matches!(tokens[0], TokenKind::Ident(ref s) if s == "a\u{FFFD}b"));
    }

    #[test]
    fn test_positions_are_monotonic() {
        let css = "@media print {\n  h2.bar { size: 4px; }\n}\n/* x */ a{b:url(c)}";
        let (tokens, _) = lex(css);
        assert!(tokens.windows(2).all(|w| w[0].pos <= w[1].pos));
    }

    #[test]
    fn test_empty_input() {
        let (tokens, errors) = lex("");
        assert_eq!(tokens, vec![Token::eof(at(1, 0))]);
        assert!(errors.is_empty());
    }
}
