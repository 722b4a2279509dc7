#![deny(warnings)]
#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]

//! # rng-restrict
//!
//! Restriction checking for expanded RELAX NG pattern graphs.
//!
//! A schema that parses can still be unusable: attributes in the start
//! pattern, elements inside lists, the same attribute twice on one element,
//! interleaves whose branches compete for the same element. This crate finds
//! the first such problem, and also bounds element nesting depth.
//!
//! ## Example Usage
//!
//! ```rust
//! use rng_pattern::{BuiltinDatatype, NameClass, SchemaBuilder};
//! use rng_restrict::{check_schema, Error, Rule};
//!
//! let mut b = SchemaBuilder::new();
//! let string = b.data(BuiltinDatatype::string());
//! let id = b.attribute(NameClass::local("id"), string, None);
//! let token = b.data(BuiltinDatatype::token());
//! let id_again = b.attribute(NameClass::local("id"), token, None);
//! let both = b.group(id, id_again);
//! let doc = b.element(NameClass::local("doc"), both, None);
//!
//! match check_schema(&mut b, doc) {
//!     Err(Error::Violation(v)) => {
//!         assert_eq!(v.rule, Rule::DuplicateAttribute);
//!         assert_eq!(v.name.as_deref(), Some("id"));
//!     }
//!     other => panic!("expected a violation, got {other:?}"),
//! }
//! ```

/// Element-name alphabets for interleave checks.
pub mod alphabet;
/// The restriction checker.
pub mod checker;
/// Checker configuration.
pub mod config;
/// Checking contexts.
pub mod context;
/// Duplicate-attribute detection.
pub mod duplicate;
/// Element nesting depth guard.
pub mod recursion;
/// Violations and rule identifiers.
pub mod violation;

pub use alphabet::Alphabet;
pub use checker::RestrictionChecker;
pub use config::{CheckConfig, StrictnessLevel};
pub use context::Context;
pub use duplicate::DuplicateAttributeDetector;
pub use recursion::RecursionGuard;
pub use violation::{RestrictionViolation, Rule};

use rng_pattern::{Location, PatternId, SchemaBuilder};
use thiserror::Error;
use tracing::info;

/// Errors that can occur while checking a schema
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Restriction violated: {0}")]
    Violation(#[from] RestrictionViolation),

    #[error("Element nesting reaches depth {depth}, over the limit of {limit}{}", Location::suffix(.location.as_ref()))]
    NestingTooDeep {
        depth: usize,
        limit: usize,
        location: Option<Location>,
    },

    #[error("Element {name} recurses into itself with no way to stop{}", Location::suffix(.location.as_ref()))]
    UnboundedRecursion {
        name: String,
        location: Option<Location>,
    },

    #[error(transparent)]
    Pattern(#[from] rng_pattern::Error),
}

impl Error {
    /// The violation, if this is one
    pub fn violation(&self) -> Option<&RestrictionViolation> {
        match self {
            Self::Violation(v) => Some(v),
            _ => None,
        }
    }

    /// Attach `location` to a violation that has none yet
    #[must_use]
    pub(crate) fn with_location(self, location: Option<&Location>) -> Self {
        match self {
            Self::Violation(v) => Self::Violation(v.with_location(location)),
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Expand `start`, guard its nesting depth and check its restrictions with
/// default settings. Returns the expanded start pattern.
///
/// # Errors
///
/// Returns the first construction error, depth overrun or restriction
/// violation found.
pub fn check_schema(builder: &mut SchemaBuilder, start: PatternId) -> Result<PatternId> {
    check_schema_with_config(builder, start, &CheckConfig::default())
}

/// [`check_schema`] with explicit settings
///
/// # Errors
///
/// Returns the first construction error, depth overrun or restriction
/// violation found.
pub fn check_schema_with_config(
    builder: &mut SchemaBuilder,
    start: PatternId,
    config: &CheckConfig,
) -> Result<PatternId> {
    let start = builder.expand(start)?;
    let depth = RecursionGuard::with_config(builder.arena(), config).check_recursion(start, 0)?;
    RestrictionChecker::with_config(builder.arena_mut(), config.clone()).check_start(start)?;
    info!(
        "Schema checked: start pattern {}, {} patterns, element depth {}, ID types {}",
        start,
        builder.arena().len(),
        depth,
        builder.has_id_types()
    );
    Ok(start)
}
