//! Compact textual rendering of patterns
//!
//! Output loosely follows the RELAX NG compact syntax and is meant for log
//! messages and test assertions, not for re-parsing.

use crate::arena::PatternArena;
use crate::datatype::{Datatype, BUILTIN_LIBRARY, XSD_LIBRARY};
use crate::pattern::{PatternId, PatternKind};
use std::collections::HashSet;
use std::fmt::Write;

/// Render `id` and everything reachable from it.
///
/// An element is written out in full the first time it is reached; later
/// occurrences (including recursive ones) print only its name class.
pub fn dump(arena: &PatternArena, id: PatternId) -> String {
    let mut dumper = Dumper {
        arena,
        seen: HashSet::new(),
        out: String::new(),
    };
    dumper.pattern(id);
    dumper.out
}

struct Dumper<'a> {
    arena: &'a PatternArena,
    seen: HashSet<PatternId>,
    out: String,
}

impl Dumper<'_> {
    fn pattern(&mut self, id: PatternId) {
        let arena = self.arena;
        match arena.kind(id) {
            PatternKind::Empty => self.out.push_str("empty"),
            PatternKind::NotAllowed => self.out.push_str("notAllowed"),
            PatternKind::UnexpandedNotAllowed => self.out.push_str("#unexpanded"),
            PatternKind::Error => self.out.push_str("#error"),
            PatternKind::Text => self.out.push_str("text"),
            PatternKind::Data { datatype } => self.datatype(datatype.as_ref()),
            PatternKind::DataExcept {
                datatype, except, ..
            } => {
                self.datatype(datatype.as_ref());
                self.out.push_str(" - ");
                self.operand(*except);
            }
            PatternKind::Value { datatype, value } => {
                if datatype.library() != BUILTIN_LIBRARY || datatype.name() != "token" {
                    self.datatype(datatype.as_ref());
                    self.out.push(' ');
                }
                let _ = write!(self.out, "{value:?}");
            }
            PatternKind::List { content, .. } => {
                self.out.push_str("list { ");
                self.pattern(*content);
                self.out.push_str(" }");
            }
            PatternKind::Attribute {
                name_class,
                content,
                ..
            } => {
                let _ = write!(self.out, "attribute {name_class} {{ ");
                self.pattern(*content);
                self.out.push_str(" }");
            }
            PatternKind::Element(element) => {
                if self.seen.insert(id) {
                    let _ = write!(self.out, "element {} {{ ", element.orig_name_class());
                    self.pattern(element.content());
                    self.out.push_str(" }");
                } else {
                    let _ = write!(self.out, "{}", element.orig_name_class());
                }
            }
            PatternKind::Choice(..) => self.choice(id),
            PatternKind::Group(..) => self.join(id, ", "),
            PatternKind::Interleave(..) => self.join(id, " & "),
            PatternKind::OneOrMore(content) => {
                self.operand(*content);
                self.out.push('+');
            }
        }
    }

    fn choice(&mut self, id: PatternId) {
        let arena = self.arena;
        let Some(rest) = optional_operand(arena, id) else {
            self.join(id, " | ");
            return;
        };
        if let PatternKind::OneOrMore(content) = *arena.kind(rest) {
            self.operand(content);
            self.out.push('*');
        } else {
            self.operand(rest);
            self.out.push('?');
        }
    }

    fn join(&mut self, id: PatternId, separator: &str) {
        for (i, child) in self.arena.children(id).into_iter().enumerate() {
            if i > 0 {
                self.out.push_str(separator);
            }
            self.operand(child);
        }
    }

    /// A child of a combinator: parenthesized unless it is atomic or postfix.
    fn operand(&mut self, id: PatternId) {
        let needs_parens = match self.arena.kind(id) {
            PatternKind::Group(..) | PatternKind::Interleave(..) | PatternKind::DataExcept { .. } => {
                true
            }
            PatternKind::Choice(..) => optional_operand(self.arena, id).is_none(),
            _ => false,
        };
        if needs_parens {
            self.out.push('(');
            self.pattern(id);
            self.out.push(')');
        } else {
            self.pattern(id);
        }
    }

    fn datatype(&mut self, datatype: &dyn Datatype) {
        match datatype.library() {
            BUILTIN_LIBRARY => self.out.push_str(datatype.name()),
            XSD_LIBRARY => {
                let _ = write!(self.out, "xsd:{}", datatype.name());
            }
            library => {
                let _ = write!(self.out, "{{{library}}}{}", datatype.name());
            }
        }
    }
}

/// For `p | empty` (either order), the `p`.
fn optional_operand(arena: &PatternArena, id: PatternId) -> Option<PatternId> {
    match *arena.kind(id) {
        PatternKind::Choice(p, e) | PatternKind::Choice(e, p)
            if matches!(arena.kind(e), PatternKind::Empty) =>
        {
            Some(p)
        }
        _ => None,
    }
}
