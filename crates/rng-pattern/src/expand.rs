//! Expansion of recursive definitions
//!
//! Expansion replaces the unexpanded placeholder by `notAllowed`, rebuilds
//! every combinator whose children changed so the simplification rules get a
//! second chance, and resolves the content of each element exactly once.

use crate::builder::PatternBuilder;
use crate::name_class::NameClass;
use crate::pattern::{PatternId, PatternKind};
use crate::schema_builder::SchemaBuilder;
use crate::{Error, Result};
use std::collections::HashMap;
use tracing::debug;

impl SchemaBuilder {
    /// Expand `pattern`, returning the pattern to use in its place.
    ///
    /// Idempotent. Element nodes are updated in place: their content slot is
    /// replaced by its expansion, and an element whose content can never match
    /// gets the empty name class.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnresolvedElement`] if an element shell reachable from
    /// `pattern` was never given content.
    pub fn expand(&mut self, pattern: PatternId) -> Result<PatternId> {
        let mut expander = Expander {
            builder: self,
            memo: HashMap::new(),
            emptied: 0,
        };
        let expanded = expander.expand(pattern)?;
        debug!(
            "Expanded pattern {} to {} ({} patterns visited, {} elements emptied)",
            pattern,
            expanded,
            expander.memo.len(),
            expander.emptied
        );
        Ok(expanded)
    }
}

struct Expander<'a> {
    builder: &'a mut SchemaBuilder,
    memo: HashMap<PatternId, PatternId>,
    emptied: usize,
}

impl Expander<'_> {
    fn expand(&mut self, p: PatternId) -> Result<PatternId> {
        if let Some(&done) = self.memo.get(&p) {
            return Ok(done);
        }
        let kind = self.builder.arena().kind(p).clone();
        let expanded = match kind {
            PatternKind::UnexpandedNotAllowed => self.builder.not_allowed(),
            PatternKind::Empty
            | PatternKind::NotAllowed
            | PatternKind::Error
            | PatternKind::Text
            | PatternKind::Data { .. }
            | PatternKind::Value { .. } => p,
            PatternKind::Element(_) => {
                self.expand_element(p)?;
                p
            }
            PatternKind::Attribute {
                name_class,
                content,
                location,
            } => {
                let c = self.expand(content)?;
                if c == content {
                    p
                } else {
                    self.builder.attribute(name_class, c, location)
                }
            }
            PatternKind::List { content, location } => {
                let c = self.expand(content)?;
                if c == content {
                    p
                } else {
                    self.builder.list(c, location)
                }
            }
            PatternKind::DataExcept {
                datatype,
                except,
                location,
            } => {
                let e = self.expand(except)?;
                if e == except {
                    p
                } else {
                    self.builder.data_except(datatype, e, location)
                }
            }
            PatternKind::Choice(..) => self.expand_run(p, PatternBuilder::choice)?,
            PatternKind::Group(..) => self.expand_run(p, PatternBuilder::group)?,
            PatternKind::Interleave(..) => self.expand_run(p, PatternBuilder::interleave)?,
            PatternKind::OneOrMore(content) => {
                let c = self.expand(content)?;
                if c == content {
                    p
                } else {
                    self.builder.one_or_more(c)
                }
            }
        };
        self.memo.insert(p, expanded);
        Ok(expanded)
    }

    /// Expand a run of one binary combinator as a single n-ary node.
    ///
    /// The run is kept if no operand changed; otherwise it is rebuilt
    /// right-nested through `combine`.
    fn expand_run(
        &mut self,
        p: PatternId,
        combine: fn(&mut PatternBuilder, PatternId, PatternId) -> PatternId,
    ) -> Result<PatternId> {
        let mut operands = Vec::new();
        self.builder.arena().fill_children(p, &mut operands);
        let mut changed = false;
        for operand in &mut operands {
            let expanded = self.expand(*operand)?;
            changed |= expanded != *operand;
            *operand = expanded;
        }
        if !changed {
            return Ok(p);
        }
        let mut rest = operands.into_iter().rev();
        let Some(mut result) = rest.next() else {
            return Ok(p);
        };
        for operand in rest {
            result = combine(&mut **self.builder, operand, result);
        }
        Ok(result)
    }

    fn expand_element(&mut self, id: PatternId) -> Result<()> {
        let arena = self.builder.arena_mut();
        let element = arena.element_mut(id).ok_or(Error::NotAnElement(id))?;
        if element.expanded {
            return Ok(());
        }
        if !element.defined {
            return Err(Error::UnresolvedElement {
                id,
                location: element.location.clone(),
            });
        }
        // Set before descending so a cycle back to this element stops here.
        element.expanded = true;
        let content = element.content;

        let expanded = match self.expand(content) {
            Ok(expanded) => expanded,
            Err(e) => {
                // Left unexpanded so a later call can finish it once the
                // missing definition is supplied.
                if let Some(element) = self.builder.arena_mut().element_mut(id) {
                    element.expanded = false;
                }
                return Err(e);
            }
        };
        let dead = self.builder.is_not_allowed(expanded);
        let element = self
            .builder
            .arena_mut()
            .element_mut(id)
            .ok_or(Error::NotAnElement(id))?;
        element.content = expanded;
        if dead {
            element.name_class = NameClass::Null;
            self.emptied += 1;
            debug!(
                "Element {} ({}) can never match; its name class is now empty",
                id, element.orig_name_class
            );
        }
        Ok(())
    }
}
