//! cssval validators
//!
//! Semantic checks that run over a parsed stylesheet and add to the same
//! error list the tokenizer and parser use.

pub mod keyframes;

pub use keyframes::{parsing_config, validate_keyframes_css, validate_keyframes_source};
