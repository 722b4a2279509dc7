//! Checker configuration

use serde::{Deserialize, Serialize};

/// How strictly repetition is checked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrictnessLevel {
    /// Strict: a `oneOrMore` directly inside a repeated group or interleave
    /// is rejected, and every `oneOrMore` checks its attributes against a
    /// detector of its own
    #[default]
    Strict,
    /// Lenient: nested repetition is allowed and inherits the enclosing
    /// repeat context and duplicate-attribute detector
    Lenient,
}

/// Restriction checker configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckConfig {
    /// Repetition strictness
    pub strictness: StrictnessLevel,
    /// Deepest element nesting the recursion guard accepts
    pub max_recursion_depth: usize,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            strictness: StrictnessLevel::Strict,
            max_recursion_depth: 1024,
        }
    }
}

impl CheckConfig {
    /// Create a configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the strictness level
    #[must_use]
    pub fn strictness(mut self, strictness: StrictnessLevel) -> Self {
        self.strictness = strictness;
        self
    }

    /// Set the recursion depth limit
    #[must_use]
    pub fn max_recursion_depth(mut self, depth: usize) -> Self {
        self.max_recursion_depth = depth;
        self
    }

    /// Whether the strict repetition rules apply
    pub fn is_strict(&self) -> bool {
        self.strictness == StrictnessLevel::Strict
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CheckConfig::default();
        assert_eq!(config.strictness, StrictnessLevel::Strict);
        assert_eq!(config.max_recursion_depth, 1024);
        assert!(config.is_strict());
    }

    #[test]
    fn test_config_builder() {
        let config = CheckConfig::new()
            .strictness(StrictnessLevel::Lenient)
            .max_recursion_depth(8);
        assert!(!config.is_strict());
        assert_eq!(config.max_recursion_depth, 8);
    }

    #[test]
    fn test_config_from_partial_json() {
        let config: CheckConfig = serde_json::from_str(r#"{ "strictness": "lenient" }"#).unwrap();
        assert_eq!(config.strictness, StrictnessLevel::Lenient);
        assert_eq!(config.max_recursion_depth, 1024);
    }
}
