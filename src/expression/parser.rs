// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

pub const PARSER_PEEK_TOKEN_MAX_COUNT: usize = 2;

// The maximum number of nested groups, and the maximum height
// of the expression tree.
pub const PARSER_MAX_NESTING: usize = 256;

use crate::{
    ast::{Expression, Modifier},
    error::PatternError,
    location::Location,
    peekableiter::PeekableIter,
};

use super::{
    lexer::lex_from_str,
    token::{Token, TokenWithRange},
};

pub struct Parser<'a> {
    upstream: &'a mut PeekableIter<'a, TokenWithRange>,
    last_range: Location,

    // the number of currently open groups
    nesting: usize,
}

impl<'a> Parser<'a> {
    fn new(upstream: &'a mut PeekableIter<'a, TokenWithRange>) -> Self {
        Self {
            upstream,
            last_range: Location::new_range(0, 0, 0, 0),
            nesting: 0,
        }
    }

    fn next_token(&mut self) -> Option<Token> {
        match self.upstream.next() {
            Some(TokenWithRange { token, range }) => {
                self.last_range = range;
                Some(token)
            }
            None => None,
        }
    }

    fn peek_range(&self, offset: usize) -> Option<&Location> {
        match self.upstream.peek(offset) {
            Some(TokenWithRange { range, .. }) => Some(range),
            None => None,
        }
    }

    fn peek_token(&self, offset: usize) -> Option<&Token> {
        match self.upstream.peek(offset) {
            Some(TokenWithRange { token, .. }) => Some(token),
            None => None,
        }
    }

    fn expect_token(&self, offset: usize, expected_token: &Token) -> bool {
        matches!(
            self.peek_token(offset),
            Some(token) if token == expected_token)
    }

    fn consume_token(
        &mut self,
        expected_token: &Token,
        token_description: &str,
    ) -> Result<(), PatternError> {
        match self.next_token() {
            Some(token) => {
                if &token == expected_token {
                    Ok(())
                } else {
                    Err(PatternError::MessageWithLocation(
                        format!("Expect token: {}.", token_description),
                        self.last_range.get_position_by_range_start(),
                    ))
                }
            }
            None => Err(PatternError::UnexpectedEndOfExpression(format!(
                "Expect token: {}.",
                token_description
            ))),
        }
    }

    // ')'
    fn consume_right_paren(&mut self) -> Result<(), PatternError> {
        self.consume_token(&Token::RightParen, "right parenthese")
    }

    // The error for a token that can not appear at the current position.
    fn unexpected_token(&self, message: &str) -> PatternError {
        match (self.peek_token(0), self.peek_range(0)) {
            (Some(token), Some(range)) => PatternError::MessageWithLocation(
                format!("{}, found {}.", message, token),
                range.get_position_by_range_start(),
            ),
            _ => PatternError::UnexpectedEndOfExpression(format!("{}.", message)),
        }
    }

    fn nested_too_deeply(&self) -> PatternError {
        PatternError::MessageWithLocation(
            "The expression is nested too deeply.".to_owned(),
            self.last_range.get_position_by_range_start(),
        )
    }

    // The height of a new node whose tallest child is `height`.
    fn grow(&self, height: usize) -> Result<usize, PatternError> {
        if height >= PARSER_MAX_NESTING {
            Err(self.nested_too_deeply())
        } else {
            Ok(height + 1)
        }
    }

    fn join_or(
        &self,
        (left, left_height): (Expression, usize),
        (right, right_height): (Expression, usize),
    ) -> Result<(Expression, usize), PatternError> {
        let height = self.grow(left_height.max(right_height))?;
        Ok((Expression::Or(Box::new(left), Box::new(right)), height))
    }
}

// Each of the following functions returns the expression together
// with the height of its tree.

impl Parser<'_> {
    pub fn parse_expression_text(&mut self) -> Result<Expression, PatternError> {
        let (expression, _) = self.parse_expression()?;

        if self.peek_token(0).is_some() {
            return Err(self.unexpected_token("Expect keyword \"then\" or \"or\""));
        }

        Ok(expression)
    }

    fn parse_expression(&mut self) -> Result<(Expression, usize), PatternError> {
        // the expression parsing order:
        //
        //    > precedence low <
        // 1. or
        // 2. then
        // 3. modifiers and repeat count
        // 4. literal and group
        //    > precedence high <

        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<(Expression, usize), PatternError> {
        // term_then ... [ "or" term_then ]*
        // ---------
        // ^
        // | current

        let first = self.parse_then()?;
        let mut rest = vec![];

        while self.expect_token(0, &Token::Or) {
            self.next_token(); // consume "or"
            rest.push(self.parse_then()?);
        }

        // right-associative
        // a or b or c -> a or (b or c)
        let mut right = match rest.pop() {
            Some(last) => last,
            None => return Ok(first),
        };

        while let Some(left) = rest.pop() {
            right = self.join_or(left, right)?;
        }

        self.join_or(first, right)
    }

    fn parse_then(&mut self) -> Result<(Expression, usize), PatternError> {
        // term ... [ "then" term ]*
        // ----
        // ^
        // | current

        let (mut left, mut height) = self.parse_modified()?;

        while self.expect_token(0, &Token::Then) {
            self.next_token(); // consume "then"

            // left-associative
            // a then b then c -> (a then b) then c
            let (right, right_height) = self.parse_modified()?;
            height = self.grow(height.max(right_height))?;
            left = Expression::Then(Box::new(left), Box::new(right));
        }

        Ok((left, height))
    }

    fn parse_modified(&mut self) -> Result<(Expression, usize), PatternError> {
        // primary ... [ "x" count | ("+" | "?" | "-")* ]
        // -------
        // ^
        // | current

        let (mut expression, mut height) = self.parse_primary()?;

        if let Some(Token::Repeat(count)) = self.peek_token(0) {
            let count = *count;
            self.next_token(); // consume "x<digits>"

            if matches!(
                self.peek_token(0),
                Some(Token::Plus | Token::Question | Token::Minus | Token::Repeat(_))
            ) {
                return Err(self.unexpected_token(
                    "A term with a repeat count can not take other modifiers, group the term first",
                ));
            }

            height = self.grow(height)?;
            return Ok((Expression::Repeat(Box::new(expression), count), height));
        }

        while let Some(token) = self.peek_token(0) {
            let modifier = match token {
                Token::Plus => Modifier::OneOrMore,
                Token::Question => Modifier::Optional,
                Token::Minus => Modifier::Negate,
                Token::Repeat(_) => {
                    return Err(self.unexpected_token(
                        "A modified term can not take a repeat count, group the term first",
                    ));
                }
                _ => break,
            };

            self.next_token(); // consume modifier
            height = self.grow(height)?;
            expression = Expression::Modified(Box::new(expression), modifier);
        }

        Ok((expression, height))
    }

    fn parse_primary(&mut self) -> Result<(Expression, usize), PatternError> {
        // literal | "(" expression ")"

        match self.peek_token(0) {
            Some(Token::Literal(text)) => {
                let expression = Expression::Literal(text.to_owned());
                self.next_token(); // consume literal
                Ok((expression, 1))
            }
            Some(Token::LeftParen) => {
                self.next_token(); // consume '('

                if self.nesting >= PARSER_MAX_NESTING {
                    return Err(self.nested_too_deeply());
                }

                self.nesting += 1;
                let result = self.parse_expression();
                self.nesting -= 1;

                let expression = result?;
                self.consume_right_paren()?;
                Ok(expression)
            }
            _ => Err(self.unexpected_token("Expect a quoted literal or a group")),
        }
    }
}

pub fn parse_from_str(s: &str) -> Result<Expression, PatternError> {
    let tokens = lex_from_str(s)?;
    let mut token_iter = tokens.into_iter();
    let mut peekable_token_iter = PeekableIter::new(&mut token_iter, PARSER_PEEK_TOKEN_MAX_COUNT);
    let mut parser = Parser::new(&mut peekable_token_iter);
    parser.parse_expression_text()
}
