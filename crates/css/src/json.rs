//! JSON views
//!
//! Tokens, errors and parse trees as `serde_json` values. Every view carries
//! `line`, `col` and `tokenType`; the remaining fields depend on the kind.

use serde_json::{Map, Value};

use crate::error::{ErrorToken, SourceLocation};
use crate::parser::{AtRule, Declaration, QualifiedRule, Rule, Stylesheet};
use crate::tokenizer::{Numeric, Token, TokenKind, TokenType};
use crate::urls::ParsedCssUrl;

/// Key order that reads well for these views
pub const JSON_KEY_PRIORITY: &[&str] = &[
    "line",
    "col",
    "tokenType",
    "code",
    "params",
    "name",
    "prelude",
    "declarations",
    "rules",
    "type",
    "value",
    "repr",
    "unit",
    "eof",
];

pub trait ToJson {
    fn to_json(&self) -> Value;
}

impl<T: ToJson> ToJson for [T] {
    fn to_json(&self) -> Value {
        Value::Array(self.iter().map(ToJson::to_json).collect())
    }
}

impl<T: ToJson> ToJson for Vec<T> {
    fn to_json(&self) -> Value {
        self.as_slice().to_json()
    }
}

fn node(pos: SourceLocation, token_type: TokenType) -> Map<String, Value> {
    let mut json = Map::new();
    json.insert("line".into(), pos.line.into());
    json.insert("col".into(), pos.col.into());
    json.insert("tokenType".into(), token_type.name().into());
    json
}

/// Integral values print without a fraction, as they would in JavaScript
fn number(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        Value::from(value as i64)
    } else {
        serde_json::Number::from_f64(value)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

fn insert_numeric(json: &mut Map<String, Value>, numeric: &Numeric, with_type: bool) {
    json.insert("value".into(), number(numeric.value));
    if with_type {
        json.insert("type".into(), numeric.numeric_type.as_str().into());
    }
    json.insert("repr".into(), numeric.repr.as_str().into());
}

impl ToJson for Token {
    fn to_json(&self) -> Value {
        let mut json = node(self.pos, self.token_type());
        match &self.kind {
            TokenKind::Ident(s)
            | TokenKind::Function(s)
            | TokenKind::AtKeyword(s)
            | TokenKind::String(s)
            | TokenKind::Url(s)
            | TokenKind::Comment(s) => {
                json.insert("value".into(), s.as_str().into());
            }
            TokenKind::Hash(s, hash_type) => {
                json.insert("value".into(), s.as_str().into());
                json.insert("type".into(), hash_type.as_str().into());
            }
            TokenKind::Delim(c) => {
                json.insert("value".into(), c.to_string().into());
            }
            TokenKind::Number(numeric) => insert_numeric(&mut json, numeric, true),
            TokenKind::Percentage(numeric) => insert_numeric(&mut json, numeric, false),
            TokenKind::Dimension(numeric, unit) => {
                insert_numeric(&mut json, numeric, true);
                json.insert("unit".into(), unit.as_str().into());
            }
            _ => {}
        }
        Value::Object(json)
    }
}

impl ToJson for ErrorToken {
    fn to_json(&self) -> Value {
        let mut json = node(self.pos, TokenType::Error);
        json.insert("code".into(), self.code.as_str().into());
        json.insert(
            "params".into(),
            self.params.iter().map(|p| Value::from(p.as_str())).collect(),
        );
        Value::Object(json)
    }
}

impl ToJson for Stylesheet {
    fn to_json(&self) -> Value {
        let mut json = node(self.pos, TokenType::Stylesheet);
        json.insert("rules".into(), self.rules.to_json());
        json.insert("eof".into(), self.eof.to_json());
        Value::Object(json)
    }
}

impl ToJson for Rule {
    fn to_json(&self) -> Value {
        match self {
            Rule::Qualified(rule) => rule.to_json(),
            Rule::At(rule) => rule.to_json(),
        }
    }
}

impl ToJson for AtRule {
    fn to_json(&self) -> Value {
        let mut json = node(self.pos, TokenType::AtRule);
        json.insert("name".into(), self.name.as_str().into());
        json.insert("prelude".into(), self.prelude.to_json());
        json.insert("rules".into(), self.rules.to_json());
        json.insert("declarations".into(), self.declarations.to_json());
        Value::Object(json)
    }
}

impl ToJson for QualifiedRule {
    fn to_json(&self) -> Value {
        let mut json = node(self.pos, TokenType::QualifiedRule);
        json.insert("prelude".into(), self.prelude.to_json());
        json.insert("declarations".into(), self.declarations.to_json());
        Value::Object(json)
    }
}

impl ToJson for Declaration {
    fn to_json(&self) -> Value {
        let mut json = node(self.pos, TokenType::Declaration);
        json.insert("name".into(), self.name.as_str().into());
        json.insert("important".into(), self.important.into());
        json.insert("value".into(), self.value.to_json());
        Value::Object(json)
    }
}

impl ToJson for ParsedCssUrl {
    fn to_json(&self) -> Value {
        let mut json = node(self.pos, TokenType::ParsedCssUrl);
        json.insert("utf8Url".into(), self.utf8_url.as_str().into());
        json.insert("atRuleScope".into(), self.at_rule_scope.as_str().into());
        Value::Object(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BlockType, ParsingConfig};
    use crate::tokenizer::tokenize;
    use crate::urls::extract_urls;
    use cssval_testutil::{make_json_key_cmp_fn, render_json};
    use serde_json::json;

    fn assert_json_eq<T: ToJson + ?Sized>(expected: Value, actual: &T) {
        let cmp = make_json_key_cmp_fn(JSON_KEY_PRIORITY);
        assert_eq!(
            render_json(&expected, &cmp, 4),
            render_json(&actual.to_json(), &cmp, 4)
        );
    }

    fn amp_config() -> ParsingConfig {
        ParsingConfig::new(BlockType::Ignore)
            .with_at_rule("font-face", BlockType::Declarations)
            .with_at_rule("media", BlockType::Rules)
    }

    #[test]
    fn test_simple_token_list() {
        let mut errors = Vec::new();
        let tokens = tokenize("foo { bar: baz; }", 1, 0, &mut errors);
        assert!(errors.is_empty());
        assert_json_eq(
            json!([
                {"line": 1, "col": 0, "tokenType": "IDENT", "value": "foo"},
                {"line": 1, "col": 3, "tokenType": "WHITESPACE"},
                {"line": 1, "col": 4, "tokenType": "OPEN_CURLY"},
                {"line": 1, "col": 5, "tokenType": "WHITESPACE"},
                {"line": 1, "col": 6, "tokenType": "IDENT", "value": "bar"},
                {"line": 1, "col": 9, "tokenType": "COLON"},
                {"line": 1, "col": 10, "tokenType": "WHITESPACE"},
                {"line": 1, "col": 11, "tokenType": "IDENT", "value": "baz"},
                {"line": 1, "col": 14, "tokenType": "SEMICOLON"},
                {"line": 1, "col": 15, "tokenType": "WHITESPACE"},
                {"line": 1, "col": 16, "tokenType": "CLOSE_CURLY"},
                {"line": 1, "col": 17, "tokenType": "EOF_TOKEN"}
            ]),
            &tokens,
        );
    }

    #[test]
    fn test_numeric_tokens() {
        let mut errors = Vec::new();
        let tokens = tokenize("rgb(255, 0, 127) 2.5em 50%", 1, 0, &mut errors);
        assert!(errors.is_empty());
        assert_json_eq(
            json!([
                {"line": 1, "col": 0, "tokenType": "FUNCTION_TOKEN", "value": "rgb"},
                {"line": 1, "col": 4, "tokenType": "NUMBER", "type": "integer", "value": 255, "repr": "255"},
                {"line": 1, "col": 7, "tokenType": "COMMA"},
                {"line": 1, "col": 8, "tokenType": "WHITESPACE"},
                {"line": 1, "col": 9, "tokenType": "NUMBER", "type": "integer", "value": 0, "repr": "0"},
                {"line": 1, "col": 10, "tokenType": "COMMA"},
                {"line": 1, "col": 11, "tokenType": "WHITESPACE"},
                {"line": 1, "col": 12, "tokenType": "NUMBER", "type": "integer", "value": 127, "repr": "127"},
                {"line": 1, "col": 15, "tokenType": "CLOSE_PAREN"},
                {"line": 1, "col": 16, "tokenType": "WHITESPACE"},
                {
                    "line": 1,
                    "col": 17,
                    "tokenType": "DIMENSION",
                    "type": "number",
                    "value": 2.5,
                    "repr": "2.5",
                    "unit": "em"
                },
                {"line": 1, "col": 22, "tokenType": "WHITESPACE"},
                {"line": 1, "col": 23, "tokenType": "PERCENTAGE", "value": 50, "repr": "50"},
                {"line": 1, "col": 26, "tokenType": "EOF_TOKEN"}
            ]),
            &tokens,
        );
    }

    #[test]
    fn test_errors() {
        let mut errors = Vec::new();
        let tokens = tokenize(" \"\n \"", 1, 0, &mut errors);
        assert_json_eq(
            json!([
                {"line": 1, "col": 0, "tokenType": "WHITESPACE"},
                {"line": 1, "col": 2, "tokenType": "WHITESPACE"},
                {"line": 2, "col": 1, "tokenType": "STRING", "value": ""},
                {"line": 2, "col": 2, "tokenType": "EOF_TOKEN"}
            ]),
            &tokens,
        );
        assert_json_eq(
            json!([{
                "line": 1,
                "col": 1,
                "tokenType": "ERROR",
                "code": "CSS_SYNTAX_UNTERMINATED_STRING",
                "params": ["style"]
            }]),
            &errors,
        );
    }

    #[test]
    fn test_hash_rule() {
        let mut errors = Vec::new();
        let sheet = Stylesheet::parse("#foo {}", &amp_config(), &mut errors);
        assert!(errors.is_empty());
        assert_json_eq(
            json!({
                "line": 1,
                "col": 0,
                "tokenType": "STYLESHEET",
                "rules": [{
                    "line": 1,
                    "col": 0,
                    "tokenType": "QUALIFIED_RULE",
                    "prelude": [
                        {"line": 1, "col": 0, "tokenType": "HASH", "type": "id", "value": "foo"},
                        {"line": 1, "col": 4, "tokenType": "WHITESPACE"},
                        {"line": 1, "col": 5, "tokenType": "EOF_TOKEN"}
                    ],
                    "declarations": []
                }],
                "eof": {"line": 1, "col": 7, "tokenType": "EOF_TOKEN"}
            }),
            &sheet,
        );
    }

    #[test]
    fn test_media_rule() {
        let mut errors = Vec::new();
        let sheet = Stylesheet::parse("@media {}", &amp_config(), &mut errors);
        assert!(errors.is_empty());
        assert_json_eq(
            json!({
                "line": 1,
                "col": 0,
                "tokenType": "STYLESHEET",
                "rules": [{
                    "line": 1,
                    "col": 0,
                    "tokenType": "AT_RULE",
                    "name": "media",
                    "prelude": [
                        {"line": 1, "col": 6, "tokenType": "WHITESPACE"},
                        {"line": 1, "col": 7, "tokenType": "EOF_TOKEN"}
                    ],
                    "declarations": [],
                    "rules": []
                }],
                "eof": {"line": 1, "col": 9, "tokenType": "EOF_TOKEN"}
            }),
            &sheet,
        );
    }

    #[test]
    fn test_declaration() {
        let mut errors = Vec::new();
        let sheet = Stylesheet::parse("a{b:c !important}", &amp_config(), &mut errors);
        assert!(errors.is_empty());
        let Rule::Qualified(rule) = &sheet.rules[0] else {
            panic!("expected a qualified rule");
        };
        assert_json_eq(
            json!([{
                "line": 1,
                "col": 2,
                "tokenType": "DECLARATION",
                "name": "b",
                "important": true,
                "value": [
                    {"line": 1, "col": 4, "tokenType": "IDENT", "value": "c"},
                    {"line": 1, "col": 5, "tokenType": "WHITESPACE"},
                    {"line": 1, "col": 16, "tokenType": "EOF_TOKEN"}
                ]
            }]),
            &rule.declarations,
        );
    }

    #[test]
    fn test_parsed_url() {
        let mut errors = Vec::new();
        let sheet = Stylesheet::parse(
            "@font-face { src: url(a.woff) }",
            &amp_config(),
            &mut errors,
        );
        let mut urls = Vec::new();
        extract_urls(&sheet, &mut urls, &mut errors);
        assert!(errors.is_empty());
        assert_json_eq(
            json!([{
                "line": 1,
                "col": 18,
                "tokenType": "PARSED_CSS_URL",
                "utf8Url": "a.woff",
                "atRuleScope": "font-face"
            }]),
            &urls,
        );
    }

    #[test]
    fn test_integral_numbers() {
        assert_eq!(number(4.0), json!(4));
        assert_eq!(number(-0.5), json!(-0.5));
        assert_eq!(number(1e300), json!(1e300));
    }
}
