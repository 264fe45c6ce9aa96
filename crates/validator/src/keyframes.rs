//! Keyframes stylesheets
//!
//! Stylesheets that may only hold animations: qualified rules must sit
//! inside a `@keyframes` rule, possibly wrapped in `@media` or `@supports`,
//! and keyframes rules must not nest. Rules under a disallowed at-rule are
//! still checked when the config parsed its block as rules.

use cssval_css::{
    parse_a_stylesheet, tokenize, AtRule, BlockType, ErrorCode, ErrorToken, ParsingConfig,
    QualifiedRule, Rule, Stylesheet,
};

/// At-rules that open a keyframes block
const KEYFRAMES_RULES: &[&str] = &[
    "keyframes",
    "-webkit-keyframes",
    "-moz-keyframes",
    "-o-keyframes",
];

/// At-rules that may wrap keyframes rules
const CONDITIONAL_RULES: &[&str] = &["media", "supports"];

/// Block types for keyframes stylesheets. Vendor prefixed keyframes rules
/// resolve to `keyframes`; anything else is not parsed.
pub fn parsing_config() -> ParsingConfig {
    ParsingConfig::new(BlockType::Ignore)
        .with_at_rule("keyframes", BlockType::Rules)
        .with_at_rule("media", BlockType::Rules)
        .with_at_rule("supports", BlockType::Rules)
}

/// Check `stylesheet` for rules that are not allowed in a keyframes
/// stylesheet. Every violation is reported; checking does not stop at the
/// first one.
pub fn validate_keyframes_css(stylesheet: &Stylesheet, errors: &mut Vec<ErrorToken>) {
    let errors_before = errors.len();
    for rule in &stylesheet.rules {
        validate_rule(rule, false, errors);
    }
    log::debug!(
        "Keyframes validation found {} violations",
        errors.len() - errors_before
    );
}

/// Tokenize, parse and validate `source` as a keyframes stylesheet
pub fn validate_keyframes_source(source: &str, errors: &mut Vec<ErrorToken>) -> Stylesheet {
    let tokens = tokenize(source, 1, 0, errors);
    let stylesheet = parse_a_stylesheet(&tokens, &parsing_config(), errors);
    validate_keyframes_css(&stylesheet, errors);
    stylesheet
}

fn validate_rule(rule: &Rule, inside_keyframes: bool, errors: &mut Vec<ErrorToken>) {
    match rule {
        Rule::At(at_rule) => validate_at_rule(at_rule, inside_keyframes, errors),
        Rule::Qualified(rule) => validate_qualified_rule(rule, inside_keyframes, errors),
    }
}

fn validate_at_rule(at_rule: &AtRule, inside_keyframes: bool, errors: &mut Vec<ErrorToken>) {
    let is_named = |names: &[&str]| names.iter().any(|n| at_rule.name.eq_ignore_ascii_case(n));

    let inside_keyframes = if is_named(KEYFRAMES_RULES) {
        if inside_keyframes {
            errors.push(ErrorToken::style(
                at_rule.pos,
                ErrorCode::CssSyntaxDisallowedKeyframeInsideKeyframe,
            ));
        }
        true
    } else if is_named(CONDITIONAL_RULES) {
        inside_keyframes
    } else {
        errors.push(ErrorToken::new(
            at_rule.pos,
            ErrorCode::CssSyntaxInvalidAtRule,
            &["style", at_rule.name.as_str()],
        ));
        inside_keyframes
    };

    for rule in &at_rule.rules {
        validate_rule(rule, inside_keyframes, errors);
    }
}

fn validate_qualified_rule(rule: &QualifiedRule, inside_keyframes: bool, errors: &mut Vec<ErrorToken>) {
    if !inside_keyframes {
        let rule_name = rule.rule_name();
        errors.push(ErrorToken::new(
            rule.pos,
            ErrorCode::CssSyntaxDisallowedQualifiedRuleMustBeInsideKeyframe,
            &["style", rule_name.as_str()],
        ));
    }
}
