//! Qualified names and name classes
//!
//! Element and attribute patterns accept names through a [`NameClass`]. The
//! algebra only needs three questions answered: does a name match, do two
//! classes overlap, and is a class open (accepts unboundedly many names).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Namespace or local part that no real name can carry. Used to build the
/// representative names of wildcards.
const UNMATCHABLE: &str = "\u{1b}";

/// A namespace-qualified name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QName {
    /// Namespace URI, empty for no namespace
    pub namespace: String,

    /// Local part
    pub local: String,
}

impl QName {
    /// Create a qualified name
    pub fn new(namespace: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            local: local.into(),
        }
    }

    /// Create a name in no namespace
    pub fn local(local: impl Into<String>) -> Self {
        Self::new("", local)
    }

    fn is_concrete(&self) -> bool {
        self.namespace != UNMATCHABLE && self.local != UNMATCHABLE
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "{}", self.local)
        } else {
            write!(f, "{{{}}}{}", self.namespace, self.local)
        }
    }
}

/// A predicate over qualified names
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NameClass {
    /// Matches no name at all
    Null,

    /// Matches exactly one name
    Name(QName),

    /// Matches every name in a namespace, minus an optional exception
    NsName {
        namespace: String,
        except: Option<Box<NameClass>>,
    },

    /// Matches every name, minus an optional exception
    AnyName { except: Option<Box<NameClass>> },

    /// Matches names matched by either side
    Choice(Box<NameClass>, Box<NameClass>),
}

impl NameClass {
    /// A class matching a single name
    pub fn named(namespace: impl Into<String>, local: impl Into<String>) -> Self {
        Self::Name(QName::new(namespace, local))
    }

    /// A class matching a single name in no namespace
    pub fn local(local: impl Into<String>) -> Self {
        Self::Name(QName::local(local))
    }

    /// A class matching every name in `namespace`
    pub fn ns_name(namespace: impl Into<String>) -> Self {
        Self::NsName {
            namespace: namespace.into(),
            except: None,
        }
    }

    /// A class matching every name in `namespace` not matched by `except`
    pub fn ns_name_except(namespace: impl Into<String>, except: NameClass) -> Self {
        Self::NsName {
            namespace: namespace.into(),
            except: Some(Box::new(except)),
        }
    }

    /// A class matching every name
    pub fn any_name() -> Self {
        Self::AnyName { except: None }
    }

    /// A class matching every name not matched by `except`
    pub fn any_name_except(except: NameClass) -> Self {
        Self::AnyName {
            except: Some(Box::new(except)),
        }
    }

    /// Union of two classes. `Null` is the identity.
    #[must_use]
    pub fn union(self, other: NameClass) -> Self {
        match (self, other) {
            (Self::Null, nc) | (nc, Self::Null) => nc,
            (a, b) if a == b => a,
            (a, b) => Self::Choice(Box::new(a), Box::new(b)),
        }
    }

    /// Does this class accept `name`?
    pub fn matches(&self, name: &QName) -> bool {
        match self {
            Self::Null => false,
            Self::Name(n) => n == name,
            Self::NsName { namespace, except } => {
                *namespace == name.namespace && !except.as_ref().is_some_and(|e| e.matches(name))
            }
            Self::AnyName { except } => !except.as_ref().is_some_and(|e| e.matches(name)),
            Self::Choice(a, b) => a.matches(name) || b.matches(name),
        }
    }

    /// Does this class contain a wildcard, i.e. accept unboundedly many names?
    pub fn is_open(&self) -> bool {
        match self {
            Self::Null | Self::Name(_) => false,
            Self::NsName { .. } | Self::AnyName { .. } => true,
            Self::Choice(a, b) => a.is_open() || b.is_open(),
        }
    }

    /// Is this the empty class?
    pub fn is_null(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Choice(a, b) => a.is_null() && b.is_null(),
            _ => false,
        }
    }

    /// The single name accepted, if this is a `Name` class
    pub fn simple_name(&self) -> Option<&QName> {
        match self {
            Self::Name(n) => Some(n),
            _ => None,
        }
    }

    /// Is there at least one name accepted by both classes?
    pub fn overlaps(&self, other: &NameClass) -> bool {
        self.overlap_witness(other).is_some()
    }

    /// A name accepted by both classes, if any.
    ///
    /// The witness may contain unmatchable parts when the overlap is between
    /// two wildcards; [`concrete_overlap`](Self::concrete_overlap) filters
    /// those out.
    pub fn overlap_witness(&self, other: &NameClass) -> Option<QName> {
        let mut reps = Vec::new();
        self.representatives(&mut reps);
        other.representatives(&mut reps);
        reps.into_iter()
            .find(|name| self.matches(name) && other.matches(name))
    }

    /// A real qualified name accepted by both classes, if the overlap can be
    /// named. Wildcard-on-wildcard overlaps yield `None` here even though
    /// [`overlaps`](Self::overlaps) is true.
    pub fn concrete_overlap(&self, other: &NameClass) -> Option<QName> {
        let mut reps = Vec::new();
        self.representatives(&mut reps);
        other.representatives(&mut reps);
        reps.into_iter()
            .filter(QName::is_concrete)
            .find(|name| self.matches(name) && other.matches(name))
    }

    fn representatives(&self, out: &mut Vec<QName>) {
        match self {
            Self::Null => {}
            Self::Name(n) => out.push(n.clone()),
            Self::NsName { namespace, except } => {
                out.push(QName::new(namespace.clone(), UNMATCHABLE));
                if let Some(e) = except {
                    e.representatives(out);
                }
            }
            Self::AnyName { except } => {
                out.push(QName::new(UNMATCHABLE, UNMATCHABLE));
                if let Some(e) = except {
                    e.representatives(out);
                }
            }
            Self::Choice(a, b) => {
                a.representatives(out);
                b.representatives(out);
            }
        }
    }
}

impl fmt::Display for NameClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "#null"),
            Self::Name(n) => write!(f, "{n}"),
            Self::NsName { namespace, except } => {
                write!(f, "{{{namespace}}}*")?;
                if let Some(e) = except {
                    write!(f, " - ({e})")?;
                }
                Ok(())
            }
            Self::AnyName { except } => {
                write!(f, "*")?;
                if let Some(e) = except {
                    write!(f, " - ({e})")?;
                }
                Ok(())
            }
            Self::Choice(a, b) => write!(f, "{a} | {b}"),
        }
    }
}
