//! Restriction violations and their stable rule identifiers

use rng_pattern::Location;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A schema restriction that can be violated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    StartContainsAttribute,
    StartContainsData,
    StartContainsValue,
    StartContainsText,
    StartContainsEmpty,
    StartContainsList,
    StartContainsGroup,
    StartContainsInterleave,
    StartContainsOneOrMore,
    OpenNameClassNotRepeated,
    OneOrMoreContainsGroupContainsAttribute,
    OneOrMoreContainsInterleaveContainsAttribute,
    OneOrMoreContainsGroupContainsOneOrMore,
    OneOrMoreContainsInterleaveContainsOneOrMore,
    ListContainsAttribute,
    ListContainsElement,
    ListContainsInterleave,
    ListContainsText,
    ListContainsList,
    AttributeContainsAttribute,
    AttributeContainsElement,
    DataExceptContainsAttribute,
    DataExceptContainsElement,
    DataExceptContainsGroup,
    DataExceptContainsInterleave,
    DataExceptContainsOneOrMore,
    DataExceptContainsText,
    DataExceptContainsEmpty,
    DataExceptContainsList,
    DuplicateAttribute,
    GroupString,
    InterleaveString,
    InterleaveTextOverlap,
    InterleaveElementOverlap,
}

impl Rule {
    /// Stable identifier of the rule
    pub fn as_str(self) -> &'static str {
        match self {
            Self::StartContainsAttribute => "start_contains_attribute",
            Self::StartContainsData => "start_contains_data",
            Self::StartContainsValue => "start_contains_value",
            Self::StartContainsText => "start_contains_text",
            Self::StartContainsEmpty => "start_contains_empty",
            Self::StartContainsList => "start_contains_list",
            Self::StartContainsGroup => "start_contains_group",
            Self::StartContainsInterleave => "start_contains_interleave",
            Self::StartContainsOneOrMore => "start_contains_one_or_more",
            Self::OpenNameClassNotRepeated => "open_name_class_not_repeated",
            Self::OneOrMoreContainsGroupContainsAttribute => {
                "one_or_more_contains_group_contains_attribute"
            }
            Self::OneOrMoreContainsInterleaveContainsAttribute => {
                "one_or_more_contains_interleave_contains_attribute"
            }
            Self::OneOrMoreContainsGroupContainsOneOrMore => {
                "one_or_more_contains_group_contains_one_or_more"
            }
            Self::OneOrMoreContainsInterleaveContainsOneOrMore => {
                "one_or_more_contains_interleave_contains_one_or_more"
            }
            Self::ListContainsAttribute => "list_contains_attribute",
            Self::ListContainsElement => "list_contains_element",
            Self::ListContainsInterleave => "list_contains_interleave",
            Self::ListContainsText => "list_contains_text",
            Self::ListContainsList => "list_contains_list",
            Self::AttributeContainsAttribute => "attribute_contains_attribute",
            Self::AttributeContainsElement => "attribute_contains_element",
            Self::DataExceptContainsAttribute => "data_except_contains_attribute",
            Self::DataExceptContainsElement => "data_except_contains_element",
            Self::DataExceptContainsGroup => "data_except_contains_group",
            Self::DataExceptContainsInterleave => "data_except_contains_interleave",
            Self::DataExceptContainsOneOrMore => "data_except_contains_one_or_more",
            Self::DataExceptContainsText => "data_except_contains_text",
            Self::DataExceptContainsEmpty => "data_except_contains_empty",
            Self::DataExceptContainsList => "data_except_contains_list",
            Self::DuplicateAttribute => "duplicate_attribute",
            Self::GroupString => "group_string",
            Self::InterleaveString => "interleave_string",
            Self::InterleaveTextOverlap => "interleave_text_overlap",
            Self::InterleaveElementOverlap => "interleave_element_overlap",
        }
    }

    /// Human-readable description
    pub fn message(self) -> &'static str {
        match self {
            Self::StartContainsAttribute => "start pattern contains an attribute",
            Self::StartContainsData => "start pattern contains data",
            Self::StartContainsValue => "start pattern contains a value",
            Self::StartContainsText => "start pattern contains text",
            Self::StartContainsEmpty => "start pattern contains empty",
            Self::StartContainsList => "start pattern contains a list",
            Self::StartContainsGroup => "start pattern contains a group",
            Self::StartContainsInterleave => "start pattern contains an interleave",
            Self::StartContainsOneOrMore => "start pattern contains oneOrMore",
            Self::OpenNameClassNotRepeated => {
                "attribute with an open name class must be repeated"
            }
            Self::OneOrMoreContainsGroupContainsAttribute => {
                "oneOrMore contains a group that contains an attribute"
            }
            Self::OneOrMoreContainsInterleaveContainsAttribute => {
                "oneOrMore contains an interleave that contains an attribute"
            }
            Self::OneOrMoreContainsGroupContainsOneOrMore => {
                "oneOrMore contains a group that contains oneOrMore"
            }
            Self::OneOrMoreContainsInterleaveContainsOneOrMore => {
                "oneOrMore contains an interleave that contains oneOrMore"
            }
            Self::ListContainsAttribute => "list contains an attribute",
            Self::ListContainsElement => "list contains an element",
            Self::ListContainsInterleave => "list contains an interleave",
            Self::ListContainsText => "list contains text",
            Self::ListContainsList => "list contains a list",
            Self::AttributeContainsAttribute => "attribute contains an attribute",
            Self::AttributeContainsElement => "attribute contains an element",
            Self::DataExceptContainsAttribute => "data except contains an attribute",
            Self::DataExceptContainsElement => "data except contains an element",
            Self::DataExceptContainsGroup => "data except contains a group",
            Self::DataExceptContainsInterleave => "data except contains an interleave",
            Self::DataExceptContainsOneOrMore => "data except contains oneOrMore",
            Self::DataExceptContainsText => "data except contains text",
            Self::DataExceptContainsEmpty => "data except contains empty",
            Self::DataExceptContainsList => "data except contains a list",
            Self::DuplicateAttribute => "duplicate attribute",
            Self::GroupString => "group of a string with other content",
            Self::InterleaveString => "interleave of a string with other content",
            Self::InterleaveTextOverlap => "both operands of an interleave contain text",
            Self::InterleaveElementOverlap => {
                "both operands of an interleave can match the same element"
            }
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The first restriction a schema breaks
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}{}{}", .rule.message(), name_suffix(.name.as_deref()), Location::suffix(.location.as_ref()))]
pub struct RestrictionViolation {
    /// Which rule was broken
    pub rule: Rule,
    /// Offending name, when there is a single one to report
    pub name: Option<String>,
    /// Where the offending pattern was written
    pub location: Option<Location>,
}

impl RestrictionViolation {
    /// A violation with no name or location
    pub fn new(rule: Rule) -> Self {
        Self {
            rule,
            name: None,
            location: None,
        }
    }

    /// A violation naming the offending attribute or element
    pub fn named(rule: Rule, name: impl Into<String>) -> Self {
        Self {
            rule,
            name: Some(name.into()),
            location: None,
        }
    }

    /// Attach `location` unless a more specific one is already present
    #[must_use]
    pub fn with_location(mut self, location: Option<&Location>) -> Self {
        if self.location.is_none() {
            self.location = location.cloned();
        }
        self
    }
}

fn name_suffix(name: Option<&str>) -> String {
    name.map(|n| format!(" \"{n}\"")).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_identifiers_match_serde() {
        for rule in [
            Rule::DuplicateAttribute,
            Rule::ListContainsElement,
            Rule::OneOrMoreContainsGroupContainsAttribute,
            Rule::InterleaveElementOverlap,
            Rule::StartContainsOneOrMore,
        ] {
            let json = serde_json::to_string(&rule).unwrap();
            assert_eq!(json, format!("\"{}\"", rule.as_str()));
        }
    }

    #[test]
    fn test_violation_display() {
        let v = RestrictionViolation::named(Rule::DuplicateAttribute, "id")
            .with_location(Some(&Location::new(4, 2)));
        assert_eq!(v.to_string(), "duplicate attribute \"id\" at line 4, column 2");
        assert_eq!(
            RestrictionViolation::new(Rule::GroupString).to_string(),
            "group of a string with other content"
        );
    }

    #[test]
    fn test_with_location_keeps_innermost() {
        let inner = Location::new(1, 1);
        let outer = Location::new(9, 9);
        let v = RestrictionViolation::new(Rule::ListContainsText)
            .with_location(Some(&inner))
            .with_location(Some(&outer));
        assert_eq!(v.location, Some(inner));
        let v = RestrictionViolation::new(Rule::ListContainsText).with_location(None);
        assert!(v.location.is_none());
    }
}
