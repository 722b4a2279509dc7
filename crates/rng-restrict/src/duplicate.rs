//! Duplicate-attribute detection within one element
//!
//! Attributes on mutually exclusive branches of a choice may share a name;
//! attributes that can occur together may not. The detector keeps every
//! registered name class in order and a stack of open choices, each
//! remembering where it started and where its current branch started.

use rng_pattern::NameClass;

#[derive(Debug, Clone, Copy)]
struct Alternative {
    start: usize,
    end: usize,
}

/// Accumulates the attribute name classes seen in one element's content
#[derive(Debug, Default)]
pub struct DuplicateAttributeDetector {
    name_classes: Vec<NameClass>,
    alternatives: Vec<Alternative>,
}

impl DuplicateAttributeDetector {
    /// Create an empty detector
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an attribute name class.
    ///
    /// Returns `false`, without registering, if the class overlaps one that
    /// can occur alongside it.
    pub fn add_attribute(&mut self, name_class: &NameClass) -> bool {
        let mut limit = self.name_classes.len();
        for alt in self.alternatives.iter().rev() {
            // Classes from earlier branches of this choice are exclusive.
            if self.overlaps_any(name_class, alt.end, limit) {
                return false;
            }
            limit = alt.start;
        }
        if self.overlaps_any(name_class, 0, limit) {
            return false;
        }
        self.name_classes.push(name_class.clone());
        true
    }

    /// Enter a choice; the first branch starts here.
    pub fn start_choice(&mut self) {
        let here = self.name_classes.len();
        self.alternatives.push(Alternative {
            start: here,
            end: here,
        });
    }

    /// Start the next branch of the innermost choice.
    pub fn alternative(&mut self) {
        let here = self.name_classes.len();
        if let Some(alt) = self.alternatives.last_mut() {
            alt.end = here;
        }
    }

    /// Leave the innermost choice. Its classes stay registered.
    pub fn end_choice(&mut self) {
        self.alternatives.pop();
    }

    /// Number of registered classes
    pub fn len(&self) -> usize {
        self.name_classes.len()
    }

    /// Whether nothing has been registered
    pub fn is_empty(&self) -> bool {
        self.name_classes.is_empty()
    }

    fn overlaps_any(&self, name_class: &NameClass, from: usize, to: usize) -> bool {
        self.name_classes
            .get(from..to)
            .is_some_and(|classes| classes.iter().any(|nc| nc.overlaps(name_class)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_conflicts() {
        let mut dad = DuplicateAttributeDetector::new();
        assert!(dad.add_attribute(&NameClass::local("id")));
        assert!(dad.add_attribute(&NameClass::local("ref")));
        assert!(!dad.add_attribute(&NameClass::local("id")));
        assert!(!dad.add_attribute(&NameClass::any_name()));
        assert_eq!(dad.len(), 2);
    }

    #[test]
    fn test_choice_branches_do_not_conflict() {
        let mut dad = DuplicateAttributeDetector::new();
        dad.start_choice();
        assert!(dad.add_attribute(&NameClass::local("a")));
        dad.alternative();
        assert!(dad.add_attribute(&NameClass::local("a")));
        dad.end_choice();
        // After the choice, `a` may occur, so another `a` conflicts.
        assert!(!dad.add_attribute(&NameClass::local("a")));
    }

    #[test]
    fn test_choice_branch_conflicts_with_outside() {
        let mut dad = DuplicateAttributeDetector::new();
        assert!(dad.add_attribute(&NameClass::local("x")));
        dad.start_choice();
        assert!(dad.add_attribute(&NameClass::local("a")));
        dad.alternative();
        assert!(!dad.add_attribute(&NameClass::local("x")));
    }

    #[test]
    fn test_conflict_within_one_branch() {
        let mut dad = DuplicateAttributeDetector::new();
        dad.start_choice();
        assert!(dad.add_attribute(&NameClass::local("a")));
        dad.alternative();
        assert!(dad.add_attribute(&NameClass::local("b")));
        assert!(!dad.add_attribute(&NameClass::local("b")));
    }

    #[test]
    fn test_nested_choices() {
        let mut dad = DuplicateAttributeDetector::new();
        dad.start_choice();
        assert!(dad.add_attribute(&NameClass::local("a")));
        dad.alternative();
        dad.start_choice();
        assert!(dad.add_attribute(&NameClass::local("a")));
        dad.alternative();
        assert!(dad.add_attribute(&NameClass::local("a")));
        dad.end_choice();
        dad.end_choice();
        assert_eq!(dad.len(), 3);
    }
}
