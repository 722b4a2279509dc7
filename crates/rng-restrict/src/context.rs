//! Checking contexts

use std::fmt;

/// Where in the schema the pattern being checked occurs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Context {
    /// The start pattern itself
    Start,
    /// Content of an element
    Element,
    /// Value of an attribute
    Attribute,
    /// Content of a `list`
    List,
    /// Except clause of `data`
    DataExcept,
    /// Element content under `oneOrMore`
    ElementRepeat,
    /// A group under `oneOrMore` in element content
    ElementRepeatGroup,
    /// An interleave under `oneOrMore` in element content
    ElementRepeatInterleave,
}

impl Context {
    /// Inside element content, repeated or not
    pub fn is_element_content(self) -> bool {
        matches!(
            self,
            Self::Element
                | Self::ElementRepeat
                | Self::ElementRepeatGroup
                | Self::ElementRepeatInterleave
        )
    }

    /// Context for the operands of a group
    pub(crate) fn for_group(self) -> Self {
        if self == Self::ElementRepeat {
            Self::ElementRepeatGroup
        } else {
            self
        }
    }

    /// Context for the operands of an interleave
    pub(crate) fn for_interleave(self) -> Self {
        if self == Self::ElementRepeat {
            Self::ElementRepeatInterleave
        } else {
            self
        }
    }

    /// Context for the content of a `oneOrMore`
    pub(crate) fn for_repeat(self) -> Self {
        if self == Self::Element {
            Self::ElementRepeat
        } else {
            self
        }
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::Element => "element",
            Self::Attribute => "attribute",
            Self::List => "list",
            Self::DataExcept => "data except",
            Self::ElementRepeat => "repeated element content",
            Self::ElementRepeatGroup => "repeated group",
            Self::ElementRepeatInterleave => "repeated interleave",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeat_translation() {
        assert_eq!(Context::Element.for_repeat(), Context::ElementRepeat);
        assert_eq!(Context::ElementRepeat.for_group(), Context::ElementRepeatGroup);
        assert_eq!(
            Context::ElementRepeat.for_interleave(),
            Context::ElementRepeatInterleave
        );
        assert_eq!(Context::Element.for_group(), Context::Element);
        assert_eq!(Context::List.for_repeat(), Context::List);
        assert_eq!(
            Context::ElementRepeatGroup.for_repeat(),
            Context::ElementRepeatGroup
        );
    }

    #[test]
    fn test_element_content() {
        assert!(Context::ElementRepeatInterleave.is_element_content());
        assert!(!Context::Attribute.is_element_content());
        assert!(!Context::Start.is_element_content());
    }
}
