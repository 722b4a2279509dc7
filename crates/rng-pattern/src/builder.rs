//! Smart constructors for the structural combinators
//!
//! Every constructor applies the local algebraic identities first and then
//! interns the result, so identical requests always return the same handle.

use crate::arena::PatternArena;
use crate::config::InternerConfig;
use crate::interner::Interner;
use crate::pattern::{PatternId, PatternKind};
use crate::Result;
use std::collections::HashSet;

/// Builder for `group`, `choice`, `interleave` and repetition
#[derive(Debug)]
pub struct PatternBuilder {
    arena: PatternArena,
    interner: Interner,
    empty: PatternId,
    not_allowed: PatternId,
    unexpanded_not_allowed: PatternId,
    error: PatternId,
    text: PatternId,
}

impl PatternBuilder {
    /// Create a builder with default interner sizing
    pub fn new() -> Self {
        Self::from_interner(Interner::new())
    }

    /// Create a builder with explicit interner sizing
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidConfig`] for an unusable configuration.
    pub fn with_config(config: &InternerConfig) -> Result<Self> {
        Ok(Self::from_interner(Interner::with_config(config)?))
    }

    fn from_interner(interner: Interner) -> Self {
        let mut arena = PatternArena::new();
        let empty = Self::singleton(&mut arena, PatternKind::Empty);
        let not_allowed = Self::singleton(&mut arena, PatternKind::NotAllowed);
        let unexpanded_not_allowed = Self::singleton(&mut arena, PatternKind::UnexpandedNotAllowed);
        let error = Self::singleton(&mut arena, PatternKind::Error);
        let text = Self::singleton(&mut arena, PatternKind::Text);
        Self {
            arena,
            interner,
            empty,
            not_allowed,
            unexpanded_not_allowed,
            error,
            text,
        }
    }

    fn singleton(arena: &mut PatternArena, kind: PatternKind) -> PatternId {
        let pattern = arena.make(kind);
        arena.alloc(pattern)
    }

    /// The node storage
    pub fn arena(&self) -> &PatternArena {
        &self.arena
    }

    /// Mutable node storage, for passes that update element flags
    pub fn arena_mut(&mut self) -> &mut PatternArena {
        &mut self.arena
    }

    /// The shared `empty` pattern
    pub fn empty(&self) -> PatternId {
        self.empty
    }

    /// The shared `notAllowed` pattern
    pub fn not_allowed(&self) -> PatternId {
        self.not_allowed
    }

    /// The shared error sentinel
    pub fn error(&self) -> PatternId {
        self.error
    }

    pub(crate) fn text_pattern(&self) -> PatternId {
        self.text
    }

    pub(crate) fn unexpanded_not_allowed_pattern(&self) -> PatternId {
        self.unexpanded_not_allowed
    }

    /// Whether `p` can never match (`notAllowed` or the error sentinel)
    pub fn is_not_allowed(&self, p: PatternId) -> bool {
        self.arena[p].is_not_allowed()
    }

    /// `p1, p2`
    pub fn group(&mut self, p1: PatternId, p2: PatternId) -> PatternId {
        if p1 == self.empty {
            return p2;
        }
        if p2 == self.empty {
            return p1;
        }
        if let Some(dead) = self.annihilator(p1, p2) {
            return dead;
        }
        self.intern(PatternKind::Group(p1, p2))
    }

    /// `p1 & p2`
    pub fn interleave(&mut self, p1: PatternId, p2: PatternId) -> PatternId {
        if p1 == self.empty {
            return p2;
        }
        if p2 == self.empty {
            return p1;
        }
        if let Some(dead) = self.annihilator(p1, p2) {
            return dead;
        }
        self.intern(PatternKind::Interleave(p1, p2))
    }

    /// `p1 | p2`
    pub fn choice(&mut self, p1: PatternId, p2: PatternId) -> PatternId {
        if p1 == self.empty && self.arena.is_nullable(p2) {
            return p2;
        }
        if p2 == self.empty && self.arena.is_nullable(p1) {
            return p1;
        }
        if p1 == self.not_allowed {
            return p2;
        }
        if p2 == self.not_allowed || p1 == p2 {
            return p1;
        }
        if self.is_alternative_of(p1, p2) {
            return p2;
        }
        if self.is_alternative_of(p2, p1) {
            return p1;
        }
        self.intern(PatternKind::Choice(p1, p2))
    }

    /// `p+`
    pub fn one_or_more(&mut self, p: PatternId) -> PatternId {
        if p == self.empty
            || self.arena[p].is_not_allowed()
            || matches!(self.arena.kind(p), PatternKind::OneOrMore(_))
        {
            return p;
        }
        self.intern(PatternKind::OneOrMore(p))
    }

    /// `p?`
    pub fn optional(&mut self, p: PatternId) -> PatternId {
        let empty = self.empty;
        self.choice(p, empty)
    }

    /// `p*`
    pub fn zero_or_more(&mut self, p: PatternId) -> PatternId {
        let more = self.one_or_more(p);
        self.optional(more)
    }

    /// Build a right-nested group of `items`; `empty` for none
    pub fn group_all(&mut self, items: &[PatternId]) -> PatternId {
        let mut result = self.empty;
        for &p in items.iter().rev() {
            result = self.group(p, result);
        }
        result
    }

    /// Build a right-nested choice of `items`; `notAllowed` for none.
    ///
    /// Repeated items are dropped, keeping the first occurrence.
    pub fn choice_all(&mut self, items: &[PatternId]) -> PatternId {
        let mut seen = HashSet::with_capacity(items.len());
        let distinct: Vec<PatternId> = items.iter().copied().filter(|p| seen.insert(*p)).collect();
        let mut result = self.not_allowed;
        for &p in distinct.iter().rev() {
            result = self.choice(p, result);
        }
        result
    }

    pub(crate) fn intern(&mut self, kind: PatternKind) -> PatternId {
        let pattern = self.arena.make(kind);
        self.interner.intern(&mut self.arena, pattern)
    }

    pub(crate) fn interner(&self) -> &Interner {
        &self.interner
    }

    pub(crate) fn replace_interner(&mut self, interner: Interner) -> Interner {
        std::mem::replace(&mut self.interner, interner)
    }

    fn annihilator(&self, p1: PatternId, p2: PatternId) -> Option<PatternId> {
        if p1 == self.error || p2 == self.error {
            Some(self.error)
        } else if p1 == self.not_allowed || p2 == self.not_allowed {
            Some(self.not_allowed)
        } else {
            None
        }
    }

    /// Whether `p` is a direct operand of `choice`
    fn is_alternative_of(&self, p: PatternId, choice: PatternId) -> bool {
        matches!(self.arena.kind(choice), PatternKind::Choice(a, b) if *a == p || *b == p)
    }
}

impl Default for PatternBuilder {
    fn default() -> Self {
        Self::new()
    }
}
