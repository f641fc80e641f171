// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

use std::fmt::{Display, Write};

use crate::{
    ast::{Expression, Modifier},
    error::ErrorKind,
    pattern::{CaseRule, Grammar, Node, NodeId},
    trace::Trace,
};

fn write_quoted(f: &mut impl Write, text: &str) -> std::fmt::Result {
    f.write_char('"')?;
    for c in text.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            _ => f.write_char(c)?,
        }
    }
    f.write_char('"')
}

impl Display for Modifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Modifier::OneOrMore => f.write_str("+"),
            Modifier::Optional => f.write_str("?"),
            Modifier::Negate => f.write_str("-"),
        }
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expression::Literal(text) => write_quoted(f, text),
            Expression::Modified(inner, modifier) => {
                if matches!(
                    inner.as_ref(),
                    Expression::Then(..) | Expression::Or(..) | Expression::Repeat(..)
                ) {
                    write!(f, "({}){}", inner, modifier)
                } else {
                    write!(f, "{}{}", inner, modifier)
                }
            }
            Expression::Repeat(inner, count) => {
                if matches!(inner.as_ref(), Expression::Literal(_)) {
                    write!(f, "{} x{}", inner, count)
                } else {
                    write!(f, "({}) x{}", inner, count)
                }
            }
            Expression::Then(left, right) => {
                if matches!(left.as_ref(), Expression::Or(..)) {
                    write!(f, "({})", left)?;
                } else {
                    write!(f, "{}", left)?;
                }

                f.write_str(" then ")?;

                if matches!(right.as_ref(), Expression::Or(..) | Expression::Then(..)) {
                    write!(f, "({})", right)
                } else {
                    write!(f, "{}", right)
                }
            }
            Expression::Or(left, right) => {
                if matches!(left.as_ref(), Expression::Or(..)) {
                    write!(f, "({}) or {}", left, right)
                } else {
                    write!(f, "{} or {}", left, right)
                }
            }
        }
    }
}

/// Displays one node of a grammar, see `Grammar::describe`.
pub struct NodeDisplay<'g> {
    grammar: &'g Grammar,
    id: NodeId,
}

impl Display for NodeDisplay<'_> {
    // compound nodes are always parenthesized so that the postfix
    // operators stay unambiguous. Rules print their name only, which
    // also stops the recursion of self-referencing grammars.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let grammar = self.grammar;
        let sub = |id: NodeId| NodeDisplay { grammar, id };

        let node = match grammar.node(self.id) {
            Some(node) => node,
            None => return write!(f, "#{}", self.id.index()),
        };

        match node {
            Node::Literal(literal) => {
                write_quoted(f, &literal.text)?;
                if literal.case == CaseRule::Insensitive {
                    f.write_char('i')?;
                }
                Ok(())
            }
            Node::Checker(checker) => f.write_str(&checker.name),
            Node::Concatenate(left, right) => write!(f, "({} then {})", sub(*left), sub(*right)),
            Node::Alternate(left, right) => write!(f, "({} or {})", sub(*left), sub(*right)),
            Node::Negate(inner) => write!(f, "{}-", sub(*inner)),
            Node::Optional(inner) => write!(f, "{}?", sub(*inner)),
            Node::Repeat(inner, count) => write!(f, "{} x{}", sub(*inner), count),
            Node::Span(inner) => write!(f, "{}*", sub(*inner)),
            Node::Capture(inner, handle) => match grammar.capture_name(*handle) {
                Some(name) => write!(f, "{}:{}", name, sub(*inner)),
                None => write!(f, "{}", sub(*inner)),
            },
            Node::Rule(rule) => f.write_str(&rule.name),
        }
    }
}

impl Grammar {
    /// A textual description of a node, used by error messages and traces.
    pub fn describe(&self, id: NodeId) -> String {
        self.display_node(id).to_string()
    }

    pub fn display_node(&self, id: NodeId) -> NodeDisplay<'_> {
        NodeDisplay { grammar: self, id }
    }

    // For a negation node, the description of the negated node.
    pub(crate) fn describe_negated(&self, id: NodeId) -> String {
        match self.node(id) {
            Some(Node::Negate(inner)) => self.describe(*inner),
            _ => self.describe(id),
        }
    }
}

/// Renders a trace one step per line:
///
/// ```text
/// position  node (indented by depth)  outcome
/// ```
pub struct TraceDisplay<'t, 'g> {
    trace: &'t Trace,
    grammar: &'g Grammar,
}

impl Display for TraceDisplay<'_, '_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for step in self.trace {
            write!(
                f,
                "{:>5} {}{}",
                step.position,
                "  ".repeat(step.depth),
                self.grammar.display_node(step.node)
            )?;

            match (step.end, step.outcome) {
                (Some(end), _) => writeln!(f, " => {}..{}", step.position, end)?,
                (None, ErrorKind::LimitExceeded(limit)) => {
                    writeln!(f, " !! LimitExceeded ({})", limit)?
                }
                (None, kind) => writeln!(f, " !! {}", kind)?,
            }
        }

        Ok(())
    }
}

impl Trace {
    pub fn display<'t, 'g>(&'t self, grammar: &'g Grammar) -> TraceDisplay<'t, 'g> {
        TraceDisplay {
            trace: self,
            grammar,
        }
    }
}
