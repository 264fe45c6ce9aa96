//! Parsing configuration
//!
//! Decides how the `{...}` body of each at-rule is interpreted. Configs are
//! built in code or loaded from JSON such as
//! `{"atRules": {"media": "PARSE_AS_RULES"}, "default": "PARSE_AS_IGNORE"}`.

use std::fmt;
use std::str::FromStr;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{CssError, CssResult};
use crate::parser::strip_vendor_prefix;

/// How to parse the block of an at-rule
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockType {
    /// Nested qualified rules and at-rules (e.g., `@media`)
    #[serde(rename = "PARSE_AS_RULES")]
    Rules,
    /// A declaration list (e.g., `@font-face`)
    #[serde(rename = "PARSE_AS_DECLARATIONS")]
    Declarations,
    /// Skip the block entirely
    #[default]
    #[serde(rename = "PARSE_AS_IGNORE")]
    Ignore,
}

impl BlockType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rules => "PARSE_AS_RULES",
            Self::Declarations => "PARSE_AS_DECLARATIONS",
            Self::Ignore => "PARSE_AS_IGNORE",
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlockType {
    type Err = CssError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        let short = name
            .get(..9)
            .filter(|p| p.eq_ignore_ascii_case("PARSE_AS_"))
            .map_or(name, |_| &name[9..]);

        if short.eq_ignore_ascii_case("rules") {
            Ok(Self::Rules)
        } else if short.eq_ignore_ascii_case("declarations") {
            Ok(Self::Declarations)
        } else if short.eq_ignore_ascii_case("ignore") {
            Ok(Self::Ignore)
        } else {
            Err(CssError::UnknownBlockType(s.to_string()))
        }
    }
}

/// Block type per at-rule name, plus a fallback
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsingConfig {
    /// Keyed by at-rule name, normally without a vendor prefix
    #[serde(rename = "atRules", default)]
    pub at_rules: FxHashMap<String, BlockType>,
    #[serde(rename = "default", default)]
    pub default_block_type: BlockType,
}

impl ParsingConfig {
    /// Config with no per-rule entries
    pub fn new(default_block_type: BlockType) -> Self {
        Self {
            at_rules: FxHashMap::default(),
            default_block_type,
        }
    }

    /// Add or replace the block type for one at-rule
    pub fn with_at_rule(mut self, name: impl Into<String>, block_type: BlockType) -> Self {
        self.at_rules.insert(name.into(), block_type);
        self
    }

    /// Block type for an at-rule name. An exact entry wins, otherwise the
    /// name is looked up without its vendor prefix.
    pub fn block_type_for(&self, name: &str) -> BlockType {
        self.at_rules
            .get(name)
            .or_else(|| self.at_rules.get(strip_vendor_prefix(name)))
            .copied()
            .unwrap_or(self.default_block_type)
    }

    /// The at-rules allowed in AMP stylesheets
    pub fn amp() -> Self {
        Self::new(BlockType::Ignore)
            .with_at_rule("font-face", BlockType::Declarations)
            .with_at_rule("page", BlockType::Declarations)
            .with_at_rule("keyframes", BlockType::Rules)
            .with_at_rule("media", BlockType::Rules)
            .with_at_rule("supports", BlockType::Rules)
            .with_at_rule("-moz-document", BlockType::Rules)
    }

    /// Load a config from its JSON form
    pub fn from_json(json: &str) -> CssResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        log::debug!(
            "Loaded parsing config with {} at-rules, default {}",
            config.at_rules.len(),
            config.default_block_type
        );
        Ok(config)
    }
}
