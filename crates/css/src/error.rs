//! CSS diagnostics and error types
//!
//! Problems found in the CSS input are reported as [`ErrorToken`]s that the
//! caller collects; they never abort tokenizing, parsing or validation.
//! [`CssError`] is reserved for mistakes made by the caller, such as an
//! unreadable parsing config.

use std::fmt;

use smallvec::SmallVec;
use thiserror::Error;

/// CSS engine result type
pub type CssResult<T> = Result<T, CssError>;

/// Source location in CSS
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceLocation {
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (0-indexed, counted in code points)
    pub col: usize,
}

impl SourceLocation {
    pub fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// Machine-readable diagnostic codes.
///
/// The string form of each code and the order of its parameters are relied
/// upon by callers that map codes to user-facing messages, so neither may
/// change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    CssSyntaxStrayTrailingBackslash,
    CssSyntaxUnterminatedComment,
    CssSyntaxUnterminatedString,
    CssSyntaxBadUrl,
    CssSyntaxEofInPreludeOfQualifiedRule,
    CssSyntaxInvalidDeclaration,
    CssSyntaxIncompleteDeclaration,
    CssSyntaxInvalidAtRule,
    CssSyntaxUnterminatedBlock,
    CssSyntaxMalformedMediaQuery,
    CssExcessivelyNested,
    CssSyntaxDisallowedQualifiedRuleMustBeInsideKeyframe,
    CssSyntaxDisallowedKeyframeInsideKeyframe,
}

impl ErrorCode {
    /// Stable external name of the code
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CssSyntaxStrayTrailingBackslash => "CSS_SYNTAX_STRAY_TRAILING_BACKSLASH",
            Self::CssSyntaxUnterminatedComment => "CSS_SYNTAX_UNTERMINATED_COMMENT",
            Self::CssSyntaxUnterminatedString => "CSS_SYNTAX_UNTERMINATED_STRING",
            Self::CssSyntaxBadUrl => "CSS_SYNTAX_BAD_URL",
            Self::CssSyntaxEofInPreludeOfQualifiedRule => {
                "CSS_SYNTAX_EOF_IN_PRELUDE_OF_QUALIFIED_RULE"
            }
            Self::CssSyntaxInvalidDeclaration => "CSS_SYNTAX_INVALID_DECLARATION",
            Self::CssSyntaxIncompleteDeclaration => "CSS_SYNTAX_INCOMPLETE_DECLARATION",
            Self::CssSyntaxInvalidAtRule => "CSS_SYNTAX_INVALID_AT_RULE",
            Self::CssSyntaxUnterminatedBlock => "CSS_SYNTAX_UNTERMINATED_BLOCK",
            Self::CssSyntaxMalformedMediaQuery => "CSS_SYNTAX_MALFORMED_MEDIA_QUERY",
            Self::CssExcessivelyNested => "CSS_EXCESSIVELY_NESTED",
            Self::CssSyntaxDisallowedQualifiedRuleMustBeInsideKeyframe => {
                "CSS_SYNTAX_DISALLOWED_QUALIFIED_RULE_MUST_BE_INSIDE_KEYFRAME"
            }
            Self::CssSyntaxDisallowedKeyframeInsideKeyframe => {
                "CSS_SYNTAX_DISALLOWED_KEYFRAME_INSIDE_KEYFRAME"
            }
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A diagnostic: where it happened, what it is, and its positional parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorToken {
    pub pos: SourceLocation,
    pub code: ErrorCode,
    pub params: SmallVec<[String; 2]>,
}

impl ErrorToken {
    pub fn new(pos: SourceLocation, code: ErrorCode, params: &[&str]) -> Self {
        Self {
            pos,
            code,
            params: params.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// Diagnostic whose only parameter is the `style` context marker
    pub fn style(pos: SourceLocation, code: ErrorCode) -> Self {
        Self::new(pos, code, &["style"])
    }

    pub fn line(&self) -> usize {
        self.pos.line
    }

    pub fn col(&self) -> usize {
        self.pos.col
    }
}

impl fmt::Display for ErrorToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} [{}]", self.pos, self.code, self.params.join(", "))
    }
}

/// Errors caused by the caller rather than the CSS being checked
#[derive(Debug, Error)]
pub enum CssError {
    #[error("Unknown block type '{0}'")]
    UnknownBlockType(String),

    #[error("Invalid parsing config: {0}")]
    InvalidConfig(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_location_display() {
        let loc = SourceLocation::new(10, 5);
        assert_eq!(format!("{}", loc), "10:5");
    }

    #[test]
    fn test_error_token_display() {
        let err = ErrorToken::new(
            SourceLocation::new(1, 27),
            ErrorCode::CssSyntaxDisallowedQualifiedRuleMustBeInsideKeyframe,
            &["style", "100"],
        );
        assert_eq!(
            err.to_string(),
            "1:27 CSS_SYNTAX_DISALLOWED_QUALIFIED_RULE_MUST_BE_INSIDE_KEYFRAME [style, 100]"
        );
    }

    #[test]
    fn test_style_params() {
        let err = ErrorToken::style(SourceLocation::new(2, 0), ErrorCode::CssSyntaxBadUrl);
        assert_eq!(err.params.as_slice(), ["style".to_string()]);
        assert_eq!(err.line(), 2);
        assert_eq!(err.col(), 0);
    }

    #[test]
    fn test_unknown_block_type_display() {
        let err = CssError::UnknownBlockType("PARSE_AS_WHATEVER".into());
        assert_eq!(format!("{}", err), "Unknown block type 'PARSE_AS_WHATEVER'");
    }
}
