#![deny(warnings)]
#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]

//! # rng-pattern
//!
//! The pattern algebra at the core of a RELAX NG schema implementation.
//!
//! Patterns live in a [`PatternArena`] and are built through smart
//! constructors that simplify locally (`group(empty, p) = p`,
//! `group(notAllowed, p) = notAllowed`, ...) and then hash-cons the result,
//! so structurally equal patterns share one node. Recursive element
//! definitions are assembled with element shells and resolved by
//! [`SchemaBuilder::expand`].
//!
//! ```
//! use rng_pattern::{BuiltinDatatype, NameClass, SchemaBuilder};
//!
//! let mut b = SchemaBuilder::new();
//! let id = b.data(BuiltinDatatype::string());
//! let attr = b.attribute(NameClass::local("id"), id, None);
//! let text = b.text();
//! let body = b.group(attr, text);
//! let doc = b.element(NameClass::local("doc"), body, None);
//! let doc = b.expand(doc).unwrap();
//! assert_eq!(rng_pattern::dump(b.arena(), doc), "element doc { attribute id { string }, text }");
//! ```

/// Node storage addressed by [`PatternId`].
pub mod arena;
/// Structural smart constructors.
pub mod builder;
/// Interner sizing.
pub mod config;
/// Datatype capability consumed by data and value patterns.
pub mod datatype;
/// Compact textual rendering of patterns.
pub mod dump;
/// Resolution of recursive definitions.
pub mod expand;
/// Hash-consing tables.
pub mod interner;
/// Source locations.
pub mod location;
/// Qualified names and name classes.
pub mod name_class;
/// Pattern variants and derived properties.
pub mod pattern;
/// Schema-level constructors on top of the structural builder.
pub mod schema_builder;

pub use arena::PatternArena;
pub use builder::PatternBuilder;
pub use config::InternerConfig;
pub use datatype::{BuiltinDatatype, Datatype, DatatypeRef, IdType};
pub use dump::dump;
pub use interner::Interner;
pub use location::Location;
pub use name_class::{NameClass, QName};
pub use pattern::{ContentType, ElementPattern, Pattern, PatternId, PatternKind};
pub use schema_builder::SchemaBuilder;

use thiserror::Error;

/// Fatal errors while constructing or expanding a pattern graph
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Content of element {0} is already defined")]
    ElementContentRedefined(PatternId),

    #[error("Pattern {0} is not an element")]
    NotAnElement(PatternId),

    #[error("Element {id} was referenced but never given content{}", Location::suffix(.location.as_ref()))]
    UnresolvedElement {
        id: PatternId,
        location: Option<Location>,
    },

    #[error("Cannot leave a builder scope that was never entered")]
    ScopeUnderflow,

    #[error("Invalid interner configuration: {0}")]
    InvalidConfig(String),
}

/// Crate-local result type for pattern construction.
pub type Result<T> = std::result::Result<T, Error>;
