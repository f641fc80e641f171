// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

mod lexer;
mod parser;
mod token;

pub use parser::parse_from_str;
pub(crate) use parser::PARSER_MAX_NESTING;

use crate::{
    ast::Expression,
    compiler::{compile, compile_into},
    error::PatternError,
    pattern::{Grammar, GrammarBuilder, NodeId},
};

impl Expression {
    /// Parse grammar expression text, e.g. `"a" then "b"+ or "c" x3`.
    pub fn parse(text: &str) -> Result<Expression, PatternError> {
        parse_from_str(text)
    }

    /// Build a sealed grammar with the same nodes a hand-built
    /// graph would use, e.g. `"hi!"+` gives
    /// `Concatenate(Literal("hi!"), Span(Literal("hi!")))`.
    pub fn evaluate(&self) -> Result<Grammar, PatternError> {
        compile(self)
    }

    pub fn evaluate_into(&self, builder: &mut GrammarBuilder) -> Result<NodeId, PatternError> {
        compile_into(self, builder)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::{ast::Expression, pattern::GrammarBuilder};

    #[test]
    fn test_parse_and_evaluate() {
        let grammar = Expression::parse(r#""hi!"+"#).unwrap().evaluate().unwrap();

        assert!(grammar.is_match("hi!"));
        assert!(grammar.is_match("hi!hi!"));
        assert!(!grammar.is_match("hi!hi!bye"));
        assert!(!grammar.is_match(""));

        // same graph as the hand-built one
        let mut builder = GrammarBuilder::new();
        let hi = builder.literal("hi!");
        let span = builder.span(hi);
        let root = builder.sequence(hi, span);
        let expected = builder.build(root).unwrap();

        assert_eq!(
            grammar.describe(grammar.root()),
            expected.describe(expected.root())
        );
        assert_eq!(grammar.nodes().len(), expected.nodes().len());
    }

    #[test]
    fn test_display_round_trip() {
        for text in [
            r#""a""#,
            r#""say \"hi\" \\""#,
            r#""a"+?-"#,
            r#""a" then "b" then "c""#,
            r#""a" then ("b" then "c")"#,
            r#"("a" or "b") or "c""#,
            r#""a" or "b" then "c" or "d""#,
            r#"("a"+) x2 then "b"-"#,
            r#"(("a" or "b") x2)?"#,
        ] {
            let expression = Expression::parse(text).unwrap();
            let printed = expression.to_string();
            assert_eq!(Expression::parse(&printed).unwrap(), expression);
        }

        assert_eq!(
            Expression::parse(r#"  "a"   THEN ( "b" )x3 "#).unwrap().to_string(),
            r#""a" then "b" x3"#
        );
    }
}
