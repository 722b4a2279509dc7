//! Arena storage for pattern nodes
//!
//! Nodes are addressed by [`PatternId`] and never freed, so a handle stays
//! valid for the life of the arena. This is what lets an element refer to
//! itself: its content slot holds a handle that may point back at the element.

use crate::pattern::{ContentType, ElementPattern, Pattern, PatternId, PatternKind};
use crate::{Error, Result};
use std::mem;
use std::ops::Index;

/// Contiguous storage for every pattern node of a schema
#[derive(Debug, Default)]
pub struct PatternArena {
    nodes: Vec<Pattern>,
}

impl PatternArena {
    /// Create an empty arena
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the arena holds no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look up a node, returning `None` for a handle from another arena
    pub fn get(&self, id: PatternId) -> Option<&Pattern> {
        self.nodes.get(id.index())
    }

    /// Iterate over every handle in allocation order
    pub fn ids(&self) -> impl Iterator<Item = PatternId> + '_ {
        (0..self.nodes.len()).map(Self::id_at)
    }

    /// The variant of a node
    pub fn kind(&self, id: PatternId) -> &PatternKind {
        self[id].kind()
    }

    /// Whether a node matches empty content
    pub fn is_nullable(&self, id: PatternId) -> bool {
        self[id].is_nullable()
    }

    /// Content type of a node
    pub fn content_type(&self, id: PatternId) -> ContentType {
        self[id].content_type()
    }

    /// Element payload of a node, if it is an element
    pub fn element(&self, id: PatternId) -> Option<&ElementPattern> {
        self[id].as_element()
    }

    /// Flattened operands of a choice, group or interleave.
    ///
    /// A right- or left-nested run of the same combinator is returned as one
    /// ordered list; other nodes yield an empty list.
    pub fn children(&self, id: PatternId) -> Vec<PatternId> {
        let mut out = Vec::new();
        self.fill_children(id, &mut out);
        out
    }

    /// Append the flattened operands of `id` to `out`. See [`children`](Self::children).
    pub fn fill_children(&self, id: PatternId, out: &mut Vec<PatternId>) {
        self.walk_run(id, |_, _| {}, out);
    }

    /// Flatten the same-kind run rooted at `id` into `out`, calling `node`
    /// with the operands of every binary node of the run.
    ///
    /// Runs are walked with an explicit stack, so an enumeration of any
    /// length flattens without deep recursion.
    pub fn walk_run(
        &self,
        id: PatternId,
        mut node: impl FnMut(PatternId, PatternId),
        out: &mut Vec<PatternId>,
    ) {
        let tag = mem::discriminant(self[id].kind());
        let mut stack = vec![id];
        while let Some(p) = stack.pop() {
            let kind = self[p].kind();
            let operands = match kind {
                PatternKind::Choice(a, b)
                | PatternKind::Group(a, b)
                | PatternKind::Interleave(a, b)
                    if mem::discriminant(kind) == tag =>
                {
                    Some((*a, *b))
                }
                _ => None,
            };
            match operands {
                Some((a, b)) => {
                    node(a, b);
                    stack.push(b);
                    stack.push(a);
                }
                None if p != id => out.push(p),
                None => {}
            }
        }
    }

    /// Record whether the restriction checker accepted an element's content.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotAnElement`] if `id` is not an element.
    pub fn set_restrictions_checked(&mut self, id: PatternId, checked: bool) -> Result<()> {
        let element = self.element_mut(id).ok_or(Error::NotAnElement(id))?;
        element.restrictions_checked = checked;
        Ok(())
    }

    /// Build a node for `kind`, deriving nullability and content type from
    /// the children already in the arena. The node is not stored.
    pub(crate) fn make(&self, kind: PatternKind) -> Pattern {
        let (nullable, content_type) = match &kind {
            PatternKind::Empty => (true, ContentType::Empty),
            PatternKind::NotAllowed
            | PatternKind::UnexpandedNotAllowed
            | PatternKind::Error
            | PatternKind::Attribute { .. } => (false, ContentType::Empty),
            PatternKind::Text => (true, ContentType::Mixed),
            PatternKind::Data { .. }
            | PatternKind::DataExcept { .. }
            | PatternKind::Value { .. }
            | PatternKind::List { .. } => (false, ContentType::Simple),
            PatternKind::Element(_) => (false, ContentType::Complex),
            PatternKind::Choice(a, b) => (
                self[*a].is_nullable() || self[*b].is_nullable(),
                self[*a].content_type().max(self[*b].content_type()),
            ),
            PatternKind::Group(a, b) | PatternKind::Interleave(a, b) => (
                self[*a].is_nullable() && self[*b].is_nullable(),
                self[*a].content_type().max(self[*b].content_type()),
            ),
            PatternKind::OneOrMore(p) => (self[*p].is_nullable(), self[*p].content_type()),
        };
        Pattern::from_parts(kind, nullable, content_type)
    }

    pub(crate) fn alloc(&mut self, pattern: Pattern) -> PatternId {
        let id = Self::id_at(self.nodes.len());
        self.nodes.push(pattern);
        id
    }

    pub(crate) fn element_mut(&mut self, id: PatternId) -> Option<&mut ElementPattern> {
        match self.nodes.get_mut(id.index())?.kind_mut() {
            PatternKind::Element(e) => Some(e),
            _ => None,
        }
    }

    #[allow(clippy::cast_possible_truncation)] // Arenas beyond u32::MAX nodes are not supported.
    fn id_at(index: usize) -> PatternId {
        PatternId::new(index as u32)
    }
}

impl Index<PatternId> for PatternArena {
    type Output = Pattern;

    /// # Panics
    ///
    /// Panics if `id` was issued by a different arena.
    fn index(&self, id: PatternId) -> &Pattern {
        &self.nodes[id.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(arena: &mut PatternArena, kind: PatternKind) -> PatternId {
        let p = arena.make(kind);
        arena.alloc(p)
    }

    #[test]
    fn test_derived_properties() {
        let mut arena = PatternArena::new();
        let empty = leaf(&mut arena, PatternKind::Empty);
        let text = leaf(&mut arena, PatternKind::Text);
        let na = leaf(&mut arena, PatternKind::NotAllowed);

        let choice = leaf(&mut arena, PatternKind::Choice(na, text));
        assert!(arena.is_nullable(choice));
        assert_eq!(arena.content_type(choice), ContentType::Mixed);

        let group = leaf(&mut arena, PatternKind::Group(empty, na));
        assert!(!arena.is_nullable(group));
        assert_eq!(arena.content_type(group), ContentType::Empty);

        let more = leaf(&mut arena, PatternKind::OneOrMore(text));
        assert!(arena.is_nullable(more));
        assert_eq!(arena.content_type(more), ContentType::Mixed);
    }

    #[test]
    fn test_children_flatten_same_kind_runs() {
        let mut arena = PatternArena::new();
        let a = leaf(&mut arena, PatternKind::Empty);
        let b = leaf(&mut arena, PatternKind::Text);
        let c = leaf(&mut arena, PatternKind::NotAllowed);
        let d = leaf(&mut arena, PatternKind::Error);

        let bc = leaf(&mut arena, PatternKind::Choice(b, c));
        let abc = leaf(&mut arena, PatternKind::Choice(a, bc));
        let group = leaf(&mut arena, PatternKind::Group(abc, d));

        assert_eq!(arena.children(abc), vec![a, b, c]);
        // A choice nested in a group is a single operand of the group.
        assert_eq!(arena.children(group), vec![abc, d]);
        assert!(arena.children(a).is_empty());
    }

    #[test]
    fn test_set_restrictions_checked_rejects_non_elements() {
        let mut arena = PatternArena::new();
        let text = leaf(&mut arena, PatternKind::Text);
        assert!(matches!(
            arena.set_restrictions_checked(text, true),
            Err(Error::NotAnElement(id)) if id == text
        ));
    }
}
