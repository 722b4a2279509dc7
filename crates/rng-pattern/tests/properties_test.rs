//! Property-based tests for the pattern algebra
//!
//! Random expression trees are built twice through the same builder; every
//! law below must hold for all of them.

use proptest::prelude::*;
use rng_pattern::{BuiltinDatatype, NameClass, PatternId, PatternKind, SchemaBuilder};

// ===== Strategies for generating test data =====

/// A pattern expression, independent of any builder
#[derive(Debug, Clone)]
enum Expr {
    Empty,
    NotAllowed,
    Text,
    Value(String),
    Attribute(String, Box<Expr>),
    Choice(Box<Expr>, Box<Expr>),
    Group(Box<Expr>, Box<Expr>),
    Interleave(Box<Expr>, Box<Expr>),
    OneOrMore(Box<Expr>),
}

fn arb_expr() -> impl Strategy<Value = Expr> {
    let leaf = prop_oneof![
        Just(Expr::Empty),
        Just(Expr::NotAllowed),
        Just(Expr::Text),
        "[a-c]".prop_map(Expr::Value),
    ];

    leaf.prop_recursive(4, 64, 2, |inner| {
        prop_oneof![
            ("[xy]", inner.clone()).prop_map(|(n, e)| Expr::Attribute(n, Box::new(e))),
            (inner.clone(), inner.clone())
                .prop_map(|(a, b)| Expr::Choice(Box::new(a), Box::new(b))),
            (inner.clone(), inner.clone())
                .prop_map(|(a, b)| Expr::Group(Box::new(a), Box::new(b))),
            (inner.clone(), inner.clone())
                .prop_map(|(a, b)| Expr::Interleave(Box::new(a), Box::new(b))),
            inner.prop_map(|e| Expr::OneOrMore(Box::new(e))),
        ]
    })
}

fn build(b: &mut SchemaBuilder, expr: &Expr) -> PatternId {
    match expr {
        Expr::Empty => b.empty(),
        Expr::NotAllowed => b.not_allowed(),
        Expr::Text => b.text(),
        Expr::Value(v) => b.value(BuiltinDatatype::token(), v.as_str()),
        Expr::Attribute(name, e) => {
            let content = build(b, e);
            b.attribute(NameClass::local(name.as_str()), content, None)
        }
        Expr::Choice(x, y) => {
            let (x, y) = (build(b, x), build(b, y));
            b.choice(x, y)
        }
        Expr::Group(x, y) => {
            let (x, y) = (build(b, x), build(b, y));
            b.group(x, y)
        }
        Expr::Interleave(x, y) => {
            let (x, y) = (build(b, x), build(b, y));
            b.interleave(x, y)
        }
        Expr::OneOrMore(x) => {
            let x = build(b, x);
            b.one_or_more(x)
        }
    }
}

// ===== Property Tests =====

proptest! {
    #[test]
    fn prop_building_twice_yields_same_handle(e in arb_expr()) {
        let mut b = SchemaBuilder::new();
        let first = build(&mut b, &e);
        let len = b.arena().len();
        let second = build(&mut b, &e);
        prop_assert_eq!(first, second);
        prop_assert_eq!(b.arena().len(), len);
    }

    #[test]
    fn prop_one_or_more_idempotent(e in arb_expr()) {
        let mut b = SchemaBuilder::new();
        let p = build(&mut b, &e);
        let once = b.one_or_more(p);
        prop_assert_eq!(b.one_or_more(once), once);
    }

    #[test]
    fn prop_not_allowed_annihilates(e in arb_expr()) {
        let mut b = SchemaBuilder::new();
        let p = build(&mut b, &e);
        let na = b.not_allowed();
        prop_assert_eq!(b.group(p, na), na);
        prop_assert_eq!(b.group(na, p), na);
        prop_assert_eq!(b.interleave(p, na), na);
        prop_assert_eq!(b.interleave(na, p), na);
    }

    #[test]
    fn prop_empty_is_group_identity(e in arb_expr()) {
        let mut b = SchemaBuilder::new();
        let p = build(&mut b, &e);
        let empty = b.empty();
        prop_assert_eq!(b.group(empty, p), p);
        prop_assert_eq!(b.group(p, empty), p);
    }

    #[test]
    fn prop_nullability_algebra(e in arb_expr()) {
        let mut b = SchemaBuilder::new();
        let root = build(&mut b, &e);
        let arena = b.arena();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            match *arena.kind(id) {
                PatternKind::Choice(x, y) => {
                    prop_assert_eq!(
                        arena.is_nullable(id),
                        arena.is_nullable(x) || arena.is_nullable(y)
                    );
                    stack.extend([x, y]);
                }
                PatternKind::Group(x, y) | PatternKind::Interleave(x, y) => {
                    prop_assert_eq!(
                        arena.is_nullable(id),
                        arena.is_nullable(x) && arena.is_nullable(y)
                    );
                    prop_assert_eq!(
                        arena.content_type(id),
                        arena.content_type(x).max(arena.content_type(y))
                    );
                    stack.extend([x, y]);
                }
                PatternKind::OneOrMore(x) => {
                    prop_assert_eq!(arena.is_nullable(id), arena.is_nullable(x));
                    stack.push(x);
                }
                PatternKind::Attribute { content, .. } => stack.push(content),
                _ => {}
            }
        }
    }

    #[test]
    fn prop_expand_idempotent(e in arb_expr()) {
        let mut b = SchemaBuilder::new();
        let p = build(&mut b, &e);
        let once = b.expand(p).unwrap();
        prop_assert_eq!(b.expand(once).unwrap(), once);
    }
}
