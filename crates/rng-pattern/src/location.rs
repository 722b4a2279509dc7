//! Source locations for diagnostics
#![allow(clippy::must_use_candidate)] // Constructor helpers are clear at call sites without #[must_use].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where in the schema source a pattern was written.
///
/// Locations never take part in pattern identity: two structurally equal
/// patterns written at different places intern to one node, which keeps the
/// location of the first occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// Schema file path or URI, if known
    pub system_id: Option<String>,

    /// Line number (1-indexed, 0 when unknown)
    pub line: usize,

    /// Column number (1-indexed, 0 when unknown)
    pub column: usize,
}

impl Location {
    /// Create a location without a system identifier
    pub fn new(line: usize, column: usize) -> Self {
        Self {
            system_id: None,
            line,
            column,
        }
    }

    /// Create a location inside a named schema document
    pub fn in_file(system_id: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            system_id: Some(system_id.into()),
            line,
            column,
        }
    }

    /// `" at <location>"`, or nothing when the location is unknown
    pub fn suffix(location: Option<&Location>) -> String {
        location.map(|l| format!(" at {l}")).unwrap_or_default()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.system_id {
            Some(id) => write!(f, "{}:{}:{}", id, self.line, self.column),
            None => write!(f, "line {}, column {}", self.line, self.column),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_display() {
        assert_eq!(Location::new(3, 7).to_string(), "line 3, column 7");
        assert_eq!(
            Location::in_file("doc.rng", 12, 4).to_string(),
            "doc.rng:12:4"
        );
        assert_eq!(Location::suffix(Some(&Location::new(1, 2))), " at line 1, column 2");
        assert_eq!(Location::suffix(None), "");
    }

    #[test]
    fn test_location_default() {
        let loc = Location::default();
        assert!(loc.system_id.is_none());
        assert_eq!(loc.line, 0);
        assert_eq!(loc.column, 0);
    }

    #[test]
    fn test_location_serde() {
        let loc = Location::in_file("a.rnc", 1, 2);
        let json = serde_json::to_string(&loc).unwrap();
        let back: Location = serde_json::from_str(&json).unwrap();
        assert_eq!(back, loc);
    }
}
