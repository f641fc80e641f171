// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

//! Property tests: a failing node never moves the source, a
//! successful one ends where its span ends.

use pegmatch::{
    Expression, Grammar, GrammarBuilder, Modifier, NodeId, PresetCharClass, Source, Trace,
};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Tree {
    Literal(String),
    IgnoreCase(String),
    Digit,
    Sequence(Box<Tree>, Box<Tree>),
    Choice(Box<Tree>, Box<Tree>),
    Negate(Box<Tree>),
    Optional(Box<Tree>),
    Repeat(Box<Tree>, usize),
    Span(Box<Tree>),
    Capture(Box<Tree>),
}

fn tree_strategy() -> impl Strategy<Value = Tree> {
    let leaf = prop_oneof![
        "[ab]{1,3}".prop_map(Tree::Literal),
        "[AB]{1,2}".prop_map(Tree::IgnoreCase),
        Just(Tree::Digit),
    ];

    leaf.prop_recursive(4, 32, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone())
                .prop_map(|(l, r)| Tree::Sequence(Box::new(l), Box::new(r))),
            (inner.clone(), inner.clone())
                .prop_map(|(l, r)| Tree::Choice(Box::new(l), Box::new(r))),
            inner.clone().prop_map(|t| Tree::Negate(Box::new(t))),
            inner.clone().prop_map(|t| Tree::Optional(Box::new(t))),
            (inner.clone(), 1usize..4).prop_map(|(t, n)| Tree::Repeat(Box::new(t), n)),
            inner.clone().prop_map(|t| Tree::Span(Box::new(t))),
            inner.prop_map(|t| Tree::Capture(Box::new(t))),
        ]
    })
}

fn build_tree(tree: &Tree, builder: &mut GrammarBuilder) -> NodeId {
    match tree {
        Tree::Literal(text) => builder.literal(text),
        Tree::IgnoreCase(text) => builder.literal_ignore_case(text),
        Tree::Digit => builder.preset(PresetCharClass::CharDigit),
        Tree::Sequence(left, right) => {
            let left = build_tree(left, builder);
            let right = build_tree(right, builder);
            builder.sequence(left, right)
        }
        Tree::Choice(left, right) => {
            let left = build_tree(left, builder);
            let right = build_tree(right, builder);
            builder.choice(left, right)
        }
        Tree::Negate(inner) => {
            let inner = build_tree(inner, builder);
            builder.negate(inner)
        }
        Tree::Optional(inner) => {
            let inner = build_tree(inner, builder);
            builder.optional(inner)
        }
        Tree::Repeat(inner, count) => {
            let inner = build_tree(inner, builder);
            builder.repeat(inner, *count).unwrap()
        }
        Tree::Span(inner) => {
            let inner = build_tree(inner, builder);
            builder.span(inner)
        }
        Tree::Capture(inner) => {
            let inner = build_tree(inner, builder);
            let name = format!("c{}", builder.len());
            builder.capture(inner, &name).0
        }
    }
}

fn build_grammar(tree: &Tree) -> Grammar {
    let mut builder = GrammarBuilder::new();
    let root = build_tree(tree, &mut builder);
    builder.build(root).unwrap()
}

fn expression_strategy() -> impl Strategy<Value = Expression> {
    let leaf = "[a-z\"\\\\ ]{0,4}".prop_map(Expression::Literal);

    leaf.prop_recursive(4, 24, 2, |inner| {
        prop_oneof![
            (
                inner.clone(),
                prop_oneof![
                    Just(Modifier::OneOrMore),
                    Just(Modifier::Optional),
                    Just(Modifier::Negate)
                ]
            )
                .prop_map(|(e, m)| Expression::Modified(Box::new(e), m)),
            (inner.clone(), 1usize..5).prop_map(|(e, n)| Expression::Repeat(Box::new(e), n)),
            (inner.clone(), inner.clone())
                .prop_map(|(l, r)| Expression::Then(Box::new(l), Box::new(r))),
            (inner.clone(), inner).prop_map(|(l, r)| Expression::Or(Box::new(l), Box::new(r))),
        ]
    })
}

proptest! {
    #[test]
    fn test_failure_restores_position(
        tree in tree_strategy(),
        text in "[abAB1 ]{0,10}",
        start in 0usize..11
    ) {
        let grammar = build_grammar(&tree);
        let start = start.min(text.chars().count());

        // every node of the graph, not only the root
        for node in grammar.node_ids() {
            let mut source = Source::new(&text);
            source.advance(start);

            let outcome = grammar.consume_node(node, &mut source, None).unwrap();
            match outcome.span() {
                Some(span) => {
                    prop_assert_eq!(span.start, start);
                    prop_assert_eq!(source.position(), span.end);
                }
                None => {
                    prop_assert_eq!(source.position(), start);
                    prop_assert!(!outcome.error().is_none());
                }
            }
        }
    }

    #[test]
    fn test_trace_has_no_influence(
        tree in tree_strategy(),
        text in "[abAB1]{0,10}"
    ) {
        let grammar = build_grammar(&tree);

        let mut trace = Trace::new();
        let traced = grammar.parse_with_trace(&text, &mut trace);
        let plain = grammar.parse(&text);

        prop_assert_eq!(traced.span(), plain.span());
        prop_assert_eq!(traced.error(), plain.error());
        prop_assert!(!trace.is_empty());
        prop_assert_eq!(trace[0].node, grammar.root());
        prop_assert_eq!(trace[0].end, plain.span().map(|span| span.end));
    }

    #[test]
    fn test_expression_display_round_trip(expression in expression_strategy()) {
        let printed = expression.to_string();
        prop_assert_eq!(Expression::parse(&printed), Ok(expression));
    }
}
