//! Interner configuration

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Largest accepted [`InternerConfig::initial_capacity`]
pub const MAX_INITIAL_CAPACITY: usize = 1 << 30;

/// Sizing of the hash-consing tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InternerConfig {
    /// Slots in a fresh table (rounded up to a power of two)
    pub initial_capacity: usize,
    /// Fraction of slots that may be used before the table doubles
    pub load_factor: f64,
}

impl Default for InternerConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 256,
            load_factor: 0.3,
        }
    }
}

impl InternerConfig {
    /// Create a configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the initial capacity
    #[must_use]
    pub fn initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Set the load factor
    #[must_use]
    pub fn load_factor(mut self, load_factor: f64) -> Self {
        self.load_factor = load_factor;
        self
    }

    /// Check the configuration is usable
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for a capacity outside
    /// `1..=MAX_INITIAL_CAPACITY` or a load factor outside the open interval
    /// (0, 1).
    pub fn validate(&self) -> Result<()> {
        if self.initial_capacity == 0 || self.initial_capacity > MAX_INITIAL_CAPACITY {
            return Err(Error::InvalidConfig(format!(
                "initial_capacity must be in 1..={MAX_INITIAL_CAPACITY}, got {}",
                self.initial_capacity
            )));
        }
        if !(self.load_factor > 0.0 && self.load_factor < 1.0) {
            return Err(Error::InvalidConfig(format!(
                "load_factor must be in (0, 1), got {}",
                self.load_factor
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = InternerConfig::default();
        assert_eq!(config.initial_capacity, 256);
        assert!((config.load_factor - 0.3).abs() < f64::EPSILON);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_config() {
        assert!(InternerConfig::new().initial_capacity(0).validate().is_err());
        assert!(InternerConfig::new()
            .initial_capacity(MAX_INITIAL_CAPACITY)
            .validate()
            .is_ok());
        assert!(InternerConfig::new()
            .initial_capacity(MAX_INITIAL_CAPACITY + 1)
            .validate()
            .is_err());
        assert!(InternerConfig::new().initial_capacity(usize::MAX).validate().is_err());
        assert!(InternerConfig::new().load_factor(1.0).validate().is_err());
        assert!(InternerConfig::new().load_factor(f64::NAN).validate().is_err());
    }

    #[test]
    fn test_partial_config_from_json() {
        let config: InternerConfig = serde_json::from_str(r#"{ "initial_capacity": 8 }"#).unwrap();
        assert_eq!(config.initial_capacity, 8);
        assert!((config.load_factor - 0.3).abs() < f64::EPSILON);
    }
}
