// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

use log::debug;

use crate::{
    ast::{Expression, Modifier},
    error::PatternError,
    expression::PARSER_MAX_NESTING,
    pattern::{Grammar, GrammarBuilder, NodeId},
};

// The maximum height of an expression tree, the same bound the
// expression parser applies to the text.
pub const COMPILER_MAX_DEPTH: usize = PARSER_MAX_NESTING;

/// Compile from grammar expression text.
pub fn compile_from_str(s: &str) -> Result<Grammar, PatternError> {
    let expression = crate::expression::parse_from_str(s)?;
    compile(&expression)
}

/// Compile from AST `Expression` into a new sealed grammar.
pub fn compile(expression: &Expression) -> Result<Grammar, PatternError> {
    let mut builder = GrammarBuilder::new();
    let root = compile_into(expression, &mut builder)?;
    builder.build(root)
}

/// Append the nodes of `expression` to an existing builder,
/// so a compiled expression can be part of a larger hand-built graph.
pub fn compile_into(
    expression: &Expression,
    builder: &mut GrammarBuilder,
) -> Result<NodeId, PatternError> {
    let mut compiler = Compiler::new(builder);
    let root = compiler.emit_expression(expression)?;

    debug!(
        "compiled expression: {}, nodes: {}",
        expression,
        compiler.builder.len()
    );

    Ok(root)
}

pub struct Compiler<'a> {
    // The compilation target
    builder: &'a mut GrammarBuilder,

    // the nesting of the expression being emitted
    depth: usize,
}

impl<'a> Compiler<'a> {
    fn new(builder: &'a mut GrammarBuilder) -> Self {
        Compiler { builder, depth: 0 }
    }

    // Nodes are emitted children first, in the order they appear
    // in the text, so the same expression always produces the same graph.
    fn emit_expression(&mut self, expression: &Expression) -> Result<NodeId, PatternError> {
        if self.depth >= COMPILER_MAX_DEPTH {
            return Err(PatternError::PatternConstruction(
                "The expression is nested too deeply.".to_owned(),
            ));
        }

        self.depth += 1;
        let result = self.emit_node(expression);
        self.depth -= 1;
        result
    }

    fn emit_node(&mut self, expression: &Expression) -> Result<NodeId, PatternError> {
        match expression {
            Expression::Literal(text) => Ok(self.builder.literal(text)),
            Expression::Modified(inner, modifier) => self.emit_modified(inner, modifier),
            Expression::Repeat(inner, count) => {
                let inner_node = self.emit_expression(inner)?;
                self.builder.repeat(inner_node, *count)
            }
            Expression::Then(left, right) => {
                let left_node = self.emit_expression(left)?;
                let right_node = self.emit_expression(right)?;
                Ok(self.builder.sequence(left_node, right_node))
            }
            Expression::Or(left, right) => {
                let left_node = self.emit_expression(left)?;
                let right_node = self.emit_expression(right)?;
                Ok(self.builder.choice(left_node, right_node))
            }
        }
    }

    fn emit_modified(
        &mut self,
        inner: &Expression,
        modifier: &Modifier,
    ) -> Result<NodeId, PatternError> {
        let inner_node = self.emit_expression(inner)?;

        let node = match modifier {
            // `Concatenate(t, Span(t))` sharing the one node `t`
            Modifier::OneOrMore => self.builder.one_or_more(inner_node),
            Modifier::Optional => self.builder.optional(inner_node),
            Modifier::Negate => self.builder.negate(inner_node),
        };

        Ok(node)
    }
}
