//! Pattern nodes of the content-model algebra
//!
//! A [`Pattern`] is immutable once built, with one exception: an element's
//! content slot (and the flags guarding it) is filled in once so recursive
//! definitions can refer to the element before its content exists.

use crate::datatype::{same_datatype, DatatypeRef};
use crate::location::Location;
use crate::name_class::NameClass;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Handle of a pattern node inside a [`PatternArena`](crate::PatternArena).
///
/// Handles of interned patterns compare equal iff the patterns are
/// structurally equal.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PatternId(u32);

impl PatternId {
    pub(crate) const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw index into the arena
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for PatternId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Coarse classification of what a pattern can match.
///
/// The ordering matters: combinators take the `max` of their operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ContentType {
    /// Nothing, or attributes only
    Empty,
    /// Child elements
    Complex,
    /// Child elements interleaved with free text
    Mixed,
    /// A single typed value
    Simple,
}

impl ContentType {
    /// Can content of these two types sit side by side in a group or
    /// interleave? Typed values only combine with empty content.
    pub fn groupable(a: ContentType, b: ContentType) -> bool {
        match (a, b) {
            (ContentType::Empty, _) | (_, ContentType::Empty) => true,
            (ContentType::Simple, _) | (_, ContentType::Simple) => false,
            _ => true,
        }
    }
}

/// Element node payload.
#[derive(Debug, Clone)]
pub struct ElementPattern {
    pub(crate) name_class: NameClass,
    pub(crate) orig_name_class: NameClass,
    pub(crate) content: PatternId,
    pub(crate) location: Option<Location>,
    pub(crate) defined: bool,
    pub(crate) expanded: bool,
    pub(crate) restrictions_checked: bool,
}

impl ElementPattern {
    /// Name class used for matching. Empty once expansion has found the
    /// content can never match.
    pub fn name_class(&self) -> &NameClass {
        &self.name_class
    }

    /// Name class as written in the schema
    pub fn orig_name_class(&self) -> &NameClass {
        &self.orig_name_class
    }

    /// Content pattern
    pub fn content(&self) -> PatternId {
        self.content
    }

    /// Where the element was declared
    pub fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }

    /// Whether content has been supplied
    pub fn is_defined(&self) -> bool {
        self.defined
    }

    /// Whether expansion has resolved this element
    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// Whether the restriction checker has already accepted this element's content
    pub fn restrictions_checked(&self) -> bool {
        self.restrictions_checked
    }
}

/// The variants of the pattern algebra
#[derive(Debug, Clone)]
pub enum PatternKind {
    Empty,
    NotAllowed,
    /// Placeholder that becomes `NotAllowed` only on expansion, so the
    /// builder's annihilation rules do not fire while a grammar is still
    /// being assembled.
    UnexpandedNotAllowed,
    /// Stands in for a schema fragment that already failed; propagates like
    /// `NotAllowed`
    Error,
    Text,
    Data {
        datatype: DatatypeRef,
    },
    DataExcept {
        datatype: DatatypeRef,
        except: PatternId,
        location: Option<Location>,
    },
    Value {
        datatype: DatatypeRef,
        value: String,
    },
    List {
        content: PatternId,
        location: Option<Location>,
    },
    Attribute {
        name_class: NameClass,
        content: PatternId,
        location: Option<Location>,
    },
    Element(ElementPattern),
    Choice(PatternId, PatternId),
    Group(PatternId, PatternId),
    Interleave(PatternId, PatternId),
    OneOrMore(PatternId),
}

impl PatternKind {
    /// Short variant name for diagnostics
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::NotAllowed => "notAllowed",
            Self::UnexpandedNotAllowed => "unexpandedNotAllowed",
            Self::Error => "error",
            Self::Text => "text",
            Self::Data { .. } => "data",
            Self::DataExcept { .. } => "dataExcept",
            Self::Value { .. } => "value",
            Self::List { .. } => "list",
            Self::Attribute { .. } => "attribute",
            Self::Element(_) => "element",
            Self::Choice(..) => "choice",
            Self::Group(..) => "group",
            Self::Interleave(..) => "interleave",
            Self::OneOrMore(_) => "oneOrMore",
        }
    }

    /// Same variant and same children by identity. Locations are ignored;
    /// elements are only ever the same as themselves.
    pub(crate) fn same_as(&self, other: &PatternKind) -> bool {
        match (self, other) {
            (Self::Empty, Self::Empty)
            | (Self::NotAllowed, Self::NotAllowed)
            | (Self::UnexpandedNotAllowed, Self::UnexpandedNotAllowed)
            | (Self::Error, Self::Error)
            | (Self::Text, Self::Text) => true,
            (Self::Data { datatype: a }, Self::Data { datatype: b }) => same_datatype(a, b),
            (
                Self::DataExcept { datatype: a, except: ea, .. },
                Self::DataExcept { datatype: b, except: eb, .. },
            ) => ea == eb && same_datatype(a, b),
            (
                Self::Value { datatype: a, value: va },
                Self::Value { datatype: b, value: vb },
            ) => same_datatype(a, b) && a.same_value(va, vb),
            (Self::List { content: a, .. }, Self::List { content: b, .. }) => a == b,
            (
                Self::Attribute { name_class: na, content: ca, .. },
                Self::Attribute { name_class: nb, content: cb, .. },
            ) => ca == cb && na == nb,
            (Self::Choice(a1, a2), Self::Choice(b1, b2))
            | (Self::Group(a1, a2), Self::Group(b1, b2))
            | (Self::Interleave(a1, a2), Self::Interleave(b1, b2)) => a1 == b1 && a2 == b2,
            (Self::OneOrMore(a), Self::OneOrMore(b)) => a == b,
            _ => false,
        }
    }

    pub(crate) fn structural_hash(&self) -> u32 {
        let mut h = DefaultHasher::new();
        std::mem::discriminant(self).hash(&mut h);
        match self {
            Self::Empty
            | Self::NotAllowed
            | Self::UnexpandedNotAllowed
            | Self::Error
            | Self::Text => {}
            Self::Data { datatype } => {
                datatype.library().hash(&mut h);
                datatype.name().hash(&mut h);
            }
            Self::DataExcept { datatype, except, .. } => {
                datatype.library().hash(&mut h);
                datatype.name().hash(&mut h);
                except.hash(&mut h);
            }
            Self::Value { datatype, value } => {
                datatype.library().hash(&mut h);
                datatype.name().hash(&mut h);
                datatype.value_hash(value).hash(&mut h);
            }
            Self::List { content, .. } | Self::OneOrMore(content) => content.hash(&mut h),
            Self::Attribute { name_class, content, .. } => {
                name_class.hash(&mut h);
                content.hash(&mut h);
            }
            Self::Element(e) => e.location.hash(&mut h),
            Self::Choice(a, b) | Self::Group(a, b) | Self::Interleave(a, b) => {
                a.hash(&mut h);
                b.hash(&mut h);
            }
        }
        // Truncation is fine: the interner only uses the low bits.
        #[allow(clippy::cast_possible_truncation)]
        let hash = h.finish() as u32;
        hash
    }
}

/// A node of the pattern graph with its derived properties
#[derive(Debug, Clone)]
pub struct Pattern {
    kind: PatternKind,
    nullable: bool,
    content_type: ContentType,
    hash: u32,
}

impl Pattern {
    pub(crate) fn from_parts(kind: PatternKind, nullable: bool, content_type: ContentType) -> Self {
        let hash = kind.structural_hash();
        Self {
            kind,
            nullable,
            content_type,
            hash,
        }
    }

    /// The variant and its payload
    pub fn kind(&self) -> &PatternKind {
        &self.kind
    }

    pub(crate) fn kind_mut(&mut self) -> &mut PatternKind {
        &mut self.kind
    }

    /// Can this pattern match empty content?
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// What kind of content this pattern matches
    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    /// Precomputed structural hash
    pub fn hash_code(&self) -> u32 {
        self.hash
    }

    /// `NotAllowed` or `Error`: can never match anything.
    ///
    /// The unexpanded placeholder does not count until it is expanded.
    pub fn is_not_allowed(&self) -> bool {
        matches!(self.kind, PatternKind::NotAllowed | PatternKind::Error)
    }

    /// The element payload, if this is an element
    pub fn as_element(&self) -> Option<&ElementPattern> {
        match &self.kind {
            PatternKind::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Source location carried by the node, if any
    pub fn location(&self) -> Option<&Location> {
        match &self.kind {
            PatternKind::DataExcept { location, .. }
            | PatternKind::List { location, .. }
            | PatternKind::Attribute { location, .. } => location.as_ref(),
            PatternKind::Element(e) => e.location.as_ref(),
            _ => None,
        }
    }

    pub(crate) fn same_pattern(&self, other: &Pattern) -> bool {
        self.hash == other.hash && self.kind.same_as(&other.kind)
    }
}
