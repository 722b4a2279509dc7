//! Datatype capability consumed by `data` and `value` patterns

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// Namespace of the RELAX NG built-in datatype library
pub const BUILTIN_LIBRARY: &str = "";

/// Namespace of the W3C XML Schema datatype library
pub const XSD_LIBRARY: &str = "http://www.w3.org/2001/XMLSchema-datatypes";

/// ID-ness of a datatype, as used by ID/IDREF uniqueness checking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IdType {
    /// Not an ID-related type
    #[default]
    Null,
    /// `xsd:ID`
    Id,
    /// `xsd:IDREF`
    IdRef,
    /// `xsd:IDREFS`
    IdRefs,
}

/// A datatype as seen by the pattern algebra.
///
/// Only identity and ID-ness matter here; lexical and value-space semantics
/// belong to the datatype library. Implementations must keep `equals` and
/// `value_hash` consistent with how the pattern interner hashes them:
/// equal datatypes must share `library()` and `name()`.
pub trait Datatype: fmt::Debug {
    /// Namespace URI of the library defining this type
    fn library(&self) -> &str;

    /// Local name of the type within its library
    fn name(&self) -> &str;

    /// ID-ness of the type
    fn id_type(&self) -> IdType {
        IdType::Null
    }

    /// Whether the type takes part in ID/IDREF checking
    fn is_id_type(&self) -> bool {
        self.id_type() != IdType::Null
    }

    /// Structural equality with another datatype
    fn equals(&self, other: &dyn Datatype) -> bool {
        self.library() == other.library() && self.name() == other.name()
    }

    /// Whether two literals denote the same value
    fn same_value(&self, a: &str, b: &str) -> bool {
        a == b
    }

    /// Hash of a literal, consistent with [`same_value`](Self::same_value)
    fn value_hash(&self, value: &str) -> u64 {
        let mut h = DefaultHasher::new();
        value.hash(&mut h);
        h.finish()
    }
}

/// Shared handle to a datatype
pub type DatatypeRef = Rc<dyn Datatype>;

/// Whether two datatype handles denote the same datatype
pub fn same_datatype(a: &DatatypeRef, b: &DatatypeRef) -> bool {
    Rc::ptr_eq(a, b) || a.equals(b.as_ref())
}

/// How a builtin datatype compares literals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Whitespace {
    Preserve,
    Collapse,
}

/// Simple datatype implementation for the built-in library and for named
/// library types whose value semantics are plain string equality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltinDatatype {
    library: String,
    name: String,
    id_type: IdType,
    whitespace: Whitespace,
}

impl BuiltinDatatype {
    /// The RELAX NG built-in `string` type
    pub fn string() -> DatatypeRef {
        Rc::new(Self {
            library: BUILTIN_LIBRARY.to_string(),
            name: "string".to_string(),
            id_type: IdType::Null,
            whitespace: Whitespace::Preserve,
        })
    }

    /// The RELAX NG built-in `token` type
    pub fn token() -> DatatypeRef {
        Rc::new(Self {
            library: BUILTIN_LIBRARY.to_string(),
            name: "token".to_string(),
            id_type: IdType::Null,
            whitespace: Whitespace::Collapse,
        })
    }

    /// A named type in an arbitrary library with string-equality values
    pub fn named(library: impl Into<String>, name: impl Into<String>, id_type: IdType) -> DatatypeRef {
        Rc::new(Self {
            library: library.into(),
            name: name.into(),
            id_type,
            whitespace: Whitespace::Collapse,
        })
    }

    /// `xsd:ID`
    pub fn xsd_id() -> DatatypeRef {
        Self::named(XSD_LIBRARY, "ID", IdType::Id)
    }

    /// `xsd:IDREF`
    pub fn xsd_idref() -> DatatypeRef {
        Self::named(XSD_LIBRARY, "IDREF", IdType::IdRef)
    }

    fn normalize<'a>(&self, value: &'a str) -> std::borrow::Cow<'a, str> {
        match self.whitespace {
            Whitespace::Preserve => value.into(),
            Whitespace::Collapse => value.split_whitespace().collect::<Vec<_>>().join(" ").into(),
        }
    }
}

impl Datatype for BuiltinDatatype {
    fn library(&self) -> &str {
        &self.library
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn id_type(&self) -> IdType {
        self.id_type
    }

    fn same_value(&self, a: &str, b: &str) -> bool {
        self.normalize(a) == self.normalize(b)
    }

    fn value_hash(&self, value: &str) -> u64 {
        let mut h = DefaultHasher::new();
        self.normalize(value).hash(&mut h);
        h.finish()
    }
}
