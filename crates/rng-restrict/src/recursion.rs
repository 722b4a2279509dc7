//! Element recursion guard
//!
//! A lighter pass than the restriction checker: it only follows element
//! nesting. It rejects two things. A chain of distinct nested elements deeper
//! than the configured limit is [`Error::NestingTooDeep`]. An element that
//! recurses into itself and has no way to stop, such as `a = element a { a }`,
//! is [`Error::UnboundedRecursion`].
//!
//! An element met again while its own content is being walked is a recursive
//! definition and is not descended into a second time. Whether such a cycle
//! can stop is decided afterwards: an element is finite if its content can be
//! matched using only elements already known to be finite, repeated until
//! nothing changes. A recursive element that never becomes finite has no base
//! case.

use crate::config::CheckConfig;
use crate::{Error, Result};
use rng_pattern::{PatternArena, PatternId, PatternKind};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Recursion guard over one arena
pub struct RecursionGuard<'a> {
    arena: &'a PatternArena,
    limit: usize,
    active: HashSet<PatternId>,
    heights: HashMap<PatternId, usize>,
    /// Elements whose content has been walked, children before parents
    finished: Vec<PatternId>,
    /// Elements reached again while their own content was being walked
    recursive: HashSet<PatternId>,
}

impl<'a> RecursionGuard<'a> {
    /// Create a guard that accepts at most `limit` levels of element nesting
    pub fn new(arena: &'a PatternArena, limit: usize) -> Self {
        Self {
            arena,
            limit,
            active: HashSet::new(),
            heights: HashMap::new(),
            finished: Vec::new(),
            recursive: HashSet::new(),
        }
    }

    /// Create a guard using [`CheckConfig::max_recursion_depth`]
    pub fn with_config(arena: &'a PatternArena, config: &CheckConfig) -> Self {
        Self::new(arena, config.max_recursion_depth)
    }

    /// Walk `pattern`, which sits `depth` elements deep, and return the
    /// deepest element nesting reached.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NestingTooDeep`] if nesting exceeds the limit and
    /// [`Error::UnboundedRecursion`] for a recursive element with no base
    /// case.
    pub fn check_recursion(&mut self, pattern: PatternId, depth: usize) -> Result<usize> {
        let deepest = self.walk(pattern, depth)?;
        self.check_base_cases()?;
        debug!(
            "Element nesting from pattern {} reaches depth {} (limit {}, {} recursive elements)",
            pattern,
            deepest,
            self.limit,
            self.recursive.len()
        );
        Ok(deepest)
    }

    fn walk(&mut self, p: PatternId, depth: usize) -> Result<usize> {
        let arena = self.arena;
        match arena.kind(p) {
            PatternKind::Element(element) => {
                if self.active.contains(&p) {
                    self.recursive.insert(p);
                    return Ok(depth);
                }
                let inside = depth + 1;
                if let Some(&height) = self.heights.get(&p) {
                    self.within_limit(p, depth + height)?;
                    return Ok(depth + height);
                }
                self.within_limit(p, inside)?;
                self.active.insert(p);
                let deepest = self.walk(element.content(), inside);
                self.active.remove(&p);
                let deepest = deepest?;
                self.heights.insert(p, deepest - depth);
                self.finished.push(p);
                Ok(deepest)
            }
            PatternKind::Attribute { content, .. }
            | PatternKind::List { content, .. }
            | PatternKind::OneOrMore(content)
            | PatternKind::DataExcept {
                except: content, ..
            } => self.walk(*content, depth),
            PatternKind::Choice(..) | PatternKind::Group(..) | PatternKind::Interleave(..) => {
                let mut deepest = depth;
                for member in arena.children(p) {
                    deepest = deepest.max(self.walk(member, depth)?);
                }
                Ok(deepest)
            }
            PatternKind::Empty
            | PatternKind::NotAllowed
            | PatternKind::UnexpandedNotAllowed
            | PatternKind::Error
            | PatternKind::Text
            | PatternKind::Data { .. }
            | PatternKind::Value { .. } => Ok(depth),
        }
    }

    fn within_limit(&self, p: PatternId, depth: usize) -> Result<()> {
        if depth > self.limit {
            return Err(Error::NestingTooDeep {
                depth,
                limit: self.limit,
                location: self.arena[p].location().cloned(),
            });
        }
        Ok(())
    }

    fn check_base_cases(&self) -> Result<()> {
        if self.recursive.is_empty() {
            return Ok(());
        }
        let mut finite = HashSet::new();
        loop {
            let before = finite.len();
            for &element in &self.finished {
                if !finite.contains(&element) && self.matchable(self.content(element), &finite) {
                    finite.insert(element);
                }
            }
            if finite.len() == before {
                break;
            }
        }
        for &element in &self.finished {
            if self.recursive.contains(&element) && !finite.contains(&element) {
                let name = self
                    .arena
                    .element(element)
                    .map(|e| e.orig_name_class().to_string())
                    .unwrap_or_default();
                return Err(Error::UnboundedRecursion {
                    name,
                    location: self.arena[element].location().cloned(),
                });
            }
        }
        Ok(())
    }

    fn content(&self, element: PatternId) -> PatternId {
        self.arena.element(element).map_or(element, |e| e.content())
    }

    /// Whether some finite tree matches `p`, given the elements already
    /// known to be finite.
    fn matchable(&self, p: PatternId, finite: &HashSet<PatternId>) -> bool {
        match self.arena.kind(p) {
            PatternKind::Empty
            | PatternKind::Text
            | PatternKind::Data { .. }
            | PatternKind::DataExcept { .. }
            | PatternKind::Value { .. } => true,
            PatternKind::NotAllowed | PatternKind::UnexpandedNotAllowed | PatternKind::Error => {
                false
            }
            PatternKind::Element(_) => finite.contains(&p),
            PatternKind::Attribute { content, .. }
            | PatternKind::List { content, .. }
            | PatternKind::OneOrMore(content) => self.matchable(*content, finite),
            PatternKind::Choice(..) => self
                .arena
                .children(p)
                .into_iter()
                .any(|member| self.matchable(member, finite)),
            PatternKind::Group(..) | PatternKind::Interleave(..) => self
                .arena
                .children(p)
                .into_iter()
                .all(|member| self.matchable(member, finite)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rng_pattern::{BuiltinDatatype, Location, NameClass, SchemaBuilder};

    /// `element l0 { element l1 { ... element l{n-1} { empty } } }`
    fn chain(b: &mut SchemaBuilder, n: usize) -> PatternId {
        let mut content = b.empty();
        for i in (0..n).rev() {
            content = b.element(NameClass::local(format!("l{i}")), content, Some(Location::new(i + 1, 1)));
        }
        content
    }

    #[test]
    fn test_depth_of_chain() {
        let mut b = SchemaBuilder::new();
        let top = chain(&mut b, 5);
        let mut guard = RecursionGuard::new(b.arena(), 10);
        assert_eq!(guard.check_recursion(top, 0).unwrap(), 5);
        assert_eq!(guard.check_recursion(top, 2).unwrap(), 7);
    }

    #[test]
    fn test_chain_too_deep() {
        let mut b = SchemaBuilder::new();
        let top = chain(&mut b, 5);
        let mut guard = RecursionGuard::new(b.arena(), 4);
        match guard.check_recursion(top, 0) {
            Err(Error::NestingTooDeep {
                depth,
                limit,
                location,
            }) => {
                assert_eq!(depth, 5);
                assert_eq!(limit, 4);
                assert_eq!(location, Some(Location::new(5, 1)));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_self_recursion_is_cut() {
        let mut b = SchemaBuilder::new();
        let shell = b.element_shell(NameClass::local("tree"), None);
        let kids = b.zero_or_more(shell);
        b.define_element(shell, kids).unwrap();
        let mut guard = RecursionGuard::new(b.arena(), 3);
        assert_eq!(guard.check_recursion(shell, 0).unwrap(), 1);
    }

    #[test]
    fn test_self_recursion_without_base_case() {
        let mut b = SchemaBuilder::new();
        let a = b.element_shell(NameClass::local("a"), Some(Location::new(3, 5)));
        b.define_element(a, a).unwrap();
        let mut guard = RecursionGuard::new(b.arena(), 16);
        match guard.check_recursion(a, 0) {
            Err(Error::UnboundedRecursion { name, location }) => {
                assert_eq!(name, "a");
                assert_eq!(location, Some(Location::new(3, 5)));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_repeated_recursion_still_needs_a_base_case() {
        // element a { text, a+ } can never finish; element b { text, b* } can.
        let mut b = SchemaBuilder::new();
        let a = b.element_shell(NameClass::local("a"), None);
        let text = b.text();
        let more = b.one_or_more(a);
        let body = b.group(text, more);
        b.define_element(a, body).unwrap();
        let mut guard = RecursionGuard::new(b.arena(), 16);
        assert!(matches!(
            guard.check_recursion(a, 0),
            Err(Error::UnboundedRecursion { .. })
        ));

        let bb = b.element_shell(NameClass::local("b"), None);
        let many = b.zero_or_more(bb);
        let body = b.group(text, many);
        b.define_element(bb, body).unwrap();
        let mut guard = RecursionGuard::new(b.arena(), 16);
        assert!(guard.check_recursion(bb, 0).is_ok());
    }

    #[test]
    fn test_mutual_recursion_with_and_without_exit() {
        // even { odd? } / odd { even } has an exit through the optional.
        let mut b = SchemaBuilder::new();
        let even = b.element_shell(NameClass::local("even"), None);
        let odd = b.element_shell(NameClass::local("odd"), None);
        let maybe_odd = b.optional(odd);
        b.define_element(even, maybe_odd).unwrap();
        b.define_element(odd, even).unwrap();
        let mut guard = RecursionGuard::new(b.arena(), 16);
        assert!(guard.check_recursion(even, 0).is_ok());

        // ping { pong } / pong { ping, text } has none.
        let ping = b.element_shell(NameClass::local("ping"), None);
        let pong = b.element_shell(NameClass::local("pong"), None);
        let text = b.text();
        let pong_body = b.group(ping, text);
        b.define_element(ping, pong).unwrap();
        b.define_element(pong, pong_body).unwrap();
        let mut guard = RecursionGuard::new(b.arena(), 16);
        assert!(matches!(
            guard.check_recursion(ping, 0),
            Err(Error::UnboundedRecursion { .. })
        ));
    }

    #[test]
    fn test_shared_element_uses_memo() {
        let mut b = SchemaBuilder::new();
        let leaf = chain(&mut b, 3);
        let a = b.element(NameClass::local("a"), leaf, None);
        let c = b.element(NameClass::local("c"), leaf, None);
        let both = b.group(a, c);
        let mut guard = RecursionGuard::new(b.arena(), 4);
        assert_eq!(guard.check_recursion(both, 0).unwrap(), 4);
        // The memoized height still counts against the limit at a deeper start.
        assert!(guard.check_recursion(leaf, 2).is_err());
    }

    #[test]
    fn test_long_choice_is_walked_iteratively() {
        let mut b = SchemaBuilder::new();
        let token = BuiltinDatatype::token();
        let values: Vec<PatternId> = (0..20_000)
            .map(|i| b.value(token.clone(), format!("v{i}")))
            .collect();
        let all = b.choice_all(&values);
        let el = b.element(NameClass::local("code"), all, None);
        let mut guard = RecursionGuard::new(b.arena(), 4);
        assert_eq!(guard.check_recursion(el, 0).unwrap(), 1);
    }
}
