// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

/// The syntax tree of a grammar expression, e.g.
///
/// `"a" then "b"+ or "c" x3`
///
/// It only lives between parsing and evaluating, see `Expression::parse`
/// and `Expression::evaluate`.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Expression {
    // a double-quoted literal, with escapes already decoded
    Literal(String),

    // a term followed by `+`, `?` or `-`
    Modified(Box<Expression>, Modifier),

    // a term followed by `x<digits>`
    Repeat(Box<Expression>, usize),

    /**
     * `then` is left-associative:
     * `"a" then "b" then "c"` is `("a" then "b") then "c"`
     * */
    Then(Box<Expression>, Box<Expression>),

    /**
     * `or` binds looser than `then` and is right-associative:
     * `"a" or "b" then "c" or "d"` is `"a" or (("b" then "c") or "d")`
     * */
    Or(Box<Expression>, Box<Expression>),
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Modifier {
    // `+`
    OneOrMore,

    // `?`
    Optional,

    // `-`
    Negate,
}
