//! Element-name alphabets for interleave ambiguity checks

use crate::violation::{RestrictionViolation, Rule};
use rng_pattern::NameClass;

/// Union of the element name classes reachable in some content
///
/// Kept as a flat list of classes rather than one nested union, so an
/// interleave over thousands of element alternatives stays shallow.
#[derive(Debug, Clone, Default)]
pub struct Alphabet {
    name_classes: Vec<NameClass>,
}

impl Alphabet {
    /// Create an empty alphabet
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether no element has been added
    pub fn is_empty(&self) -> bool {
        self.name_classes.is_empty()
    }

    /// Add the names an element accepts
    pub fn add_element(&mut self, name_class: &NameClass) {
        if !name_class.is_null() {
            self.name_classes.push(name_class.clone());
        }
    }

    /// Add every name of `other`
    pub fn add_alphabet(&mut self, other: &Alphabet) {
        self.name_classes.extend(other.name_classes.iter().cloned());
    }

    /// The classes added so far, in order
    pub fn name_classes(&self) -> &[NameClass] {
        &self.name_classes
    }

    /// Fail if some element name is in both alphabets.
    ///
    /// # Errors
    ///
    /// Returns an [`Rule::InterleaveElementOverlap`] violation, naming the
    /// shared element when it is a concrete name.
    pub fn check_overlap(&self, other: &Alphabet) -> Result<(), RestrictionViolation> {
        let mut overlapping = false;
        for a in &self.name_classes {
            for b in &other.name_classes {
                if !a.overlaps(b) {
                    continue;
                }
                if let Some(name) = a.concrete_overlap(b) {
                    return Err(RestrictionViolation::named(
                        Rule::InterleaveElementOverlap,
                        name.to_string(),
                    ));
                }
                overlapping = true;
            }
        }
        if overlapping {
            return Err(RestrictionViolation::new(Rule::InterleaveElementOverlap));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_alphabets_never_overlap() {
        let mut a = Alphabet::new();
        assert!(a.is_empty());
        assert!(a.check_overlap(&Alphabet::new()).is_ok());
        a.add_element(&NameClass::any_name());
        assert!(a.check_overlap(&Alphabet::new()).is_ok());
    }

    #[test]
    fn test_overlap_names_the_element() {
        let mut a = Alphabet::new();
        a.add_element(&NameClass::local("x"));
        a.add_element(&NameClass::local("y"));
        let mut b = Alphabet::new();
        b.add_element(&NameClass::local("y"));

        let err = a.check_overlap(&b).unwrap_err();
        assert_eq!(err.rule, Rule::InterleaveElementOverlap);
        assert_eq!(err.name.as_deref(), Some("y"));
    }

    #[test]
    fn test_wildcard_overlap_has_no_name() {
        let mut a = Alphabet::new();
        a.add_element(&NameClass::any_name());
        let mut b = Alphabet::new();
        b.add_element(&NameClass::ns_name("urn:x"));
        let err = a.check_overlap(&b).unwrap_err();
        assert!(err.name.is_none());
    }

    #[test]
    fn test_add_alphabet() {
        let mut a = Alphabet::new();
        let mut b = Alphabet::new();
        b.add_element(&NameClass::local("z"));
        a.add_alphabet(&b);
        assert_eq!(a.name_classes(), [NameClass::local("z")]);
        a.add_alphabet(&Alphabet::new());
        a.add_element(&NameClass::Null);
        assert_eq!(a.name_classes(), [NameClass::local("z")]);
    }
}
