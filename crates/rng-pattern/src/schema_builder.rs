//! Schema-level constructors
//!
//! [`SchemaBuilder`] adds elements, attributes, data, values and lists on top
//! of the structural [`PatternBuilder`]. These leaves are canonicalized by a
//! second interner, separate from the one used for combinators.

use crate::builder::PatternBuilder;
use crate::config::InternerConfig;
use crate::datatype::DatatypeRef;
use crate::interner::Interner;
use crate::location::Location;
use crate::name_class::NameClass;
use crate::pattern::{ElementPattern, PatternId, PatternKind};
use crate::{Error, Result};
use std::ops::{Deref, DerefMut};
use tracing::trace;

/// Builder for a complete schema
///
/// Dereferences to [`PatternBuilder`] for `group`, `choice` and the other
/// structural constructors.
#[derive(Debug)]
pub struct SchemaBuilder {
    builder: PatternBuilder,
    schema_interner: Interner,
    scopes: Vec<(Interner, Interner)>,
    has_id_types: bool,
}

impl SchemaBuilder {
    /// Create a builder with default interner sizing
    pub fn new() -> Self {
        Self {
            builder: PatternBuilder::new(),
            schema_interner: Interner::new(),
            scopes: Vec::new(),
            has_id_types: false,
        }
    }

    /// Create a builder whose interners use `config`
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for an unusable configuration.
    pub fn with_config(config: &InternerConfig) -> Result<Self> {
        Ok(Self {
            builder: PatternBuilder::with_config(config)?,
            schema_interner: Interner::with_config(config)?,
            scopes: Vec::new(),
            has_id_types: false,
        })
    }

    /// Whether any datatype used so far is ID-typed.
    ///
    /// When false, instance validation can skip ID/IDREF checking entirely.
    pub fn has_id_types(&self) -> bool {
        self.has_id_types
    }

    /// The shared `text` pattern
    pub fn text(&self) -> PatternId {
        self.builder.text_pattern()
    }

    /// Placeholder for a definition that is not known yet.
    ///
    /// Behaves as an opaque leaf until [`expand`](Self::expand) turns it into
    /// `notAllowed`.
    pub fn unexpanded_not_allowed(&self) -> PatternId {
        self.builder.unexpanded_not_allowed_pattern()
    }

    /// `element nc { content }`. Every call yields a new node.
    pub fn element(
        &mut self,
        name_class: NameClass,
        content: PatternId,
        location: Option<Location>,
    ) -> PatternId {
        let id = self.alloc_element(name_class, content, location);
        if let Some(element) = self.builder.arena_mut().element_mut(id) {
            element.defined = true;
        }
        id
    }

    /// An element whose content is supplied later with
    /// [`define_element`](Self::define_element), so it can occur inside its
    /// own content.
    pub fn element_shell(&mut self, name_class: NameClass, location: Option<Location>) -> PatternId {
        let placeholder = self.unexpanded_not_allowed();
        self.alloc_element(name_class, placeholder, location)
    }

    /// Fill the content slot of an element shell.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotAnElement`] if `element` is not an element and
    /// [`Error::ElementContentRedefined`] if its content was already set.
    pub fn define_element(&mut self, element: PatternId, content: PatternId) -> Result<()> {
        let slot = self
            .builder
            .arena_mut()
            .element_mut(element)
            .ok_or(Error::NotAnElement(element))?;
        if slot.defined {
            return Err(Error::ElementContentRedefined(element));
        }
        slot.content = content;
        slot.defined = true;
        Ok(())
    }

    /// `attribute nc { value }`
    pub fn attribute(
        &mut self,
        name_class: NameClass,
        value: PatternId,
        location: Option<Location>,
    ) -> PatternId {
        if self.builder.is_not_allowed(value) {
            return value;
        }
        self.intern_schema(PatternKind::Attribute {
            name_class,
            content: value,
            location,
        })
    }

    /// `data dt`
    pub fn data(&mut self, datatype: DatatypeRef) -> PatternId {
        self.note_datatype(&datatype);
        self.intern_schema(PatternKind::Data { datatype })
    }

    /// `data dt - except`
    pub fn data_except(
        &mut self,
        datatype: DatatypeRef,
        except: PatternId,
        location: Option<Location>,
    ) -> PatternId {
        if self.builder.is_not_allowed(except) {
            return self.data(datatype);
        }
        self.note_datatype(&datatype);
        self.intern_schema(PatternKind::DataExcept {
            datatype,
            except,
            location,
        })
    }

    /// `dt "literal"`
    pub fn value(&mut self, datatype: DatatypeRef, literal: impl Into<String>) -> PatternId {
        self.note_datatype(&datatype);
        self.intern_schema(PatternKind::Value {
            datatype,
            value: literal.into(),
        })
    }

    /// `list { content }`
    pub fn list(&mut self, content: PatternId, location: Option<Location>) -> PatternId {
        if self.builder.is_not_allowed(content) {
            return content;
        }
        self.intern_schema(PatternKind::List { content, location })
    }

    /// `mixed { content }`, i.e. `text & content`
    pub fn mixed(&mut self, content: PatternId) -> PatternId {
        let text = self.text();
        self.builder.interleave(text, content)
    }

    /// Start a nested scope of construction.
    ///
    /// Both interners continue from a snapshot of their current tables;
    /// [`exit_scope`](Self::exit_scope) restores the tables as they were here.
    pub fn enter_scope(&mut self) {
        self.scopes
            .push((self.builder.interner().child(), self.schema_interner.child()));
        trace!("Entered builder scope {}", self.scopes.len());
    }

    /// Leave the innermost scope, discarding the interner entries made in it.
    ///
    /// Patterns built inside the scope stay valid; they are just no longer
    /// canonical for later requests.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ScopeUnderflow`] if no scope is open.
    pub fn exit_scope(&mut self) -> Result<()> {
        let (structural, schema) = self.scopes.pop().ok_or(Error::ScopeUnderflow)?;
        trace!("Leaving builder scope {}", self.scopes.len() + 1);
        self.builder.replace_interner(structural);
        self.schema_interner = schema;
        Ok(())
    }

    /// Number of open scopes
    pub fn scope_depth(&self) -> usize {
        self.scopes.len()
    }

    fn alloc_element(
        &mut self,
        name_class: NameClass,
        content: PatternId,
        location: Option<Location>,
    ) -> PatternId {
        let arena = self.builder.arena_mut();
        let pattern = arena.make(PatternKind::Element(ElementPattern {
            orig_name_class: name_class.clone(),
            name_class,
            content,
            location,
            defined: false,
            expanded: false,
            restrictions_checked: false,
        }));
        arena.alloc(pattern)
    }

    fn intern_schema(&mut self, kind: PatternKind) -> PatternId {
        let pattern = self.builder.arena().make(kind);
        self.schema_interner.intern(self.builder.arena_mut(), pattern)
    }

    fn note_datatype(&mut self, datatype: &DatatypeRef) {
        if datatype.is_id_type() {
            self.has_id_types = true;
        }
    }
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for SchemaBuilder {
    type Target = PatternBuilder;

    fn deref(&self) -> &PatternBuilder {
        &self.builder
    }
}

impl DerefMut for SchemaBuilder {
    fn deref_mut(&mut self) -> &mut PatternBuilder {
        &mut self.builder
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatype::BuiltinDatatype;
    use crate::pattern::ContentType;

    #[test]
    fn test_attribute_short_circuits_on_not_allowed() {
        let mut b = SchemaBuilder::new();
        let na = b.not_allowed();
        assert_eq!(b.attribute(NameClass::local("a"), na, None), na);
        let err = b.error();
        assert_eq!(b.list(err, None), err);
    }

    #[test]
    fn test_data_except_nothing_is_data() {
        let mut b = SchemaBuilder::new();
        let na = b.not_allowed();
        let data = b.data(BuiltinDatatype::token());
        assert_eq!(b.data_except(BuiltinDatatype::token(), na, None), data);
    }

    #[test]
    fn test_leaves_are_shared() {
        let mut b = SchemaBuilder::new();
        let v1 = b.value(BuiltinDatatype::token(), "a  b");
        let v2 = b.value(BuiltinDatatype::token(), " a b ");
        assert_eq!(v1, v2);

        let d = b.data(BuiltinDatatype::string());
        let a1 = b.attribute(NameClass::local("x"), d, Some(Location::new(1, 1)));
        let a2 = b.attribute(NameClass::local("x"), d, Some(Location::new(5, 5)));
        assert_eq!(a1, a2);
        assert_eq!(b.arena()[a1].location(), Some(&Location::new(1, 1)));
        assert_eq!(b.arena().content_type(d), ContentType::Simple);
    }

    #[test]
    fn test_elements_are_never_shared() {
        let mut b = SchemaBuilder::new();
        let empty = b.empty();
        let e1 = b.element(NameClass::local("a"), empty, None);
        let e2 = b.element(NameClass::local("a"), empty, None);
        assert_ne!(e1, e2);
        assert!(b.arena().element(e1).is_some_and(ElementPattern::is_defined));
    }

    #[test]
    fn test_define_element_once() {
        let mut b = SchemaBuilder::new();
        let shell = b.element_shell(NameClass::local("a"), None);
        let una = b.unexpanded_not_allowed();
        assert_eq!(b.arena().element(shell).map(ElementPattern::content), Some(una));

        let body = b.optional(shell);
        b.define_element(shell, body).unwrap();
        assert_eq!(
            b.define_element(shell, body),
            Err(Error::ElementContentRedefined(shell))
        );
        let text = b.text();
        assert_eq!(b.define_element(text, body), Err(Error::NotAnElement(text)));
    }

    #[test]
    fn test_has_id_types() {
        let mut b = SchemaBuilder::new();
        b.data(BuiltinDatatype::string());
        assert!(!b.has_id_types());
        b.value(BuiltinDatatype::xsd_idref(), "x");
        assert!(b.has_id_types());
        // Scoped to the builder instance.
        assert!(!SchemaBuilder::new().has_id_types());
    }

    #[test]
    fn test_mixed_is_text_interleave() {
        let mut b = SchemaBuilder::new();
        let empty = b.empty();
        let e = b.element(NameClass::local("p"), empty, None);
        let m = b.mixed(e);
        let text = b.text();
        assert_eq!(b.arena().children(m), vec![text, e]);
        assert_eq!(b.arena().content_type(m), ContentType::Mixed);
    }

    #[test]
    fn test_scopes_discard_child_entries() {
        let mut b = SchemaBuilder::new();
        let d = b.data(BuiltinDatatype::string());
        let outer = b.list(d, None);

        b.enter_scope();
        assert_eq!(b.list(d, None), outer);
        let inner = b.attribute(NameClass::local("a"), d, None);
        assert_eq!(b.attribute(NameClass::local("a"), d, None), inner);
        b.exit_scope().unwrap();

        assert_ne!(b.attribute(NameClass::local("a"), d, None), inner);
        assert_eq!(b.scope_depth(), 0);
        assert_eq!(b.exit_scope(), Err(Error::ScopeUnderflow));
    }
}
