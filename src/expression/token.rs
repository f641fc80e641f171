// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

use std::fmt::Display;

use crate::location::Location;

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Token {
    // A double-quoted literal, the escapes are decoded.
    Literal(String),

    // Any other run of word chars ([a-zA-Z0-9_] and non-ASCII letters),
    // only valid as a keyword or a repeat count.
    Word(String),

    // The keyword `then` (case-insensitive).
    Then,

    // The keyword `or` (case-insensitive).
    Or,

    // `x<digits>`, e.g. `x3`
    Repeat(usize),

    // `+`
    Plus,

    // `?`
    Question,

    // `-`
    Minus,

    // `(`
    LeftParen,
    // `)`
    RightParen,
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Literal(text) => write!(f, "literal \"{}\"", text),
            Token::Word(word) => write!(f, "bare word \"{}\"", word),
            Token::Then => f.write_str("keyword \"then\""),
            Token::Or => f.write_str("keyword \"or\""),
            Token::Repeat(count) => write!(f, "repeat count \"x{}\"", count),
            Token::Plus => f.write_str("\"+\""),
            Token::Question => f.write_str("\"?\""),
            Token::Minus => f.write_str("\"-\""),
            Token::LeftParen => f.write_str("\"(\""),
            Token::RightParen => f.write_str("\")\""),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct TokenWithRange {
    // The token itself.
    pub token: Token,
    // The range of the token in the expression text.
    pub range: Location,
}

impl TokenWithRange {
    pub fn from_position_and_length(token: Token, position: &Location, length: usize) -> Self {
        Self {
            token,
            range: Location::from_position_and_length(position, length),
        }
    }
}
