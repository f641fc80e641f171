// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

// syntax summary
//
// - "..."    literal, `\"` and `\\` are the only escapes
// - then     sequence (case-insensitive)
// - or       ordered choice (case-insensitive)
// - x3       repeat the preceding term 3 times
// - + ? -    one-or-more, optional, negate
// - ( )      group
//
// tokens are separated by optional whitespace.
//
// The tokens are recognized by a grammar built from the pattern
// nodes of this crate, so the lexer runs on the same process as
// any other grammar.

use once_cell::sync::Lazy;

use crate::{
    charclass::{is_space, PresetCharClass},
    error::PatternError,
    location::Location,
    outcome::{Match, Span},
    pattern::{CaptureHandle, Grammar, GrammarBuilder, NodeId},
    source::Source,
};

use super::token::{Token, TokenWithRange};

struct TokenGrammar {
    grammar: Grammar,
    whitespace: NodeId,
    token: NodeId,
    literal: CaptureHandle,
    word: CaptureHandle,
    symbol: CaptureHandle,
}

static TOKEN_GRAMMAR: Lazy<Result<TokenGrammar, PatternError>> = Lazy::new(build_token_grammar);

fn build_token_grammar() -> Result<TokenGrammar, PatternError> {
    let mut builder = GrammarBuilder::new();

    let space = builder.checker("whitespace", is_space);
    let whitespace = builder.span(space);

    // literal = '"' (('\' char_any) or string_char)* '"'
    let quote = builder.literal("\"");
    let backslash = builder.literal("\\");
    let any = builder.preset(PresetCharClass::CharAny);
    let escape = builder.sequence(backslash, any);
    let string_char = builder.checker("string_char", |c| c != '"' && c != '\\');
    let element = builder.choice(escape, string_char);
    let body = builder.span(element);
    let quoted = builder
        .sequence_of(&[quote, body, quote])
        .ok_or_else(|| PatternError::PatternConstruction("Empty literal token.".to_owned()))?;
    let (literal_node, literal) = builder.capture(quoted, "literal");

    let word_char = builder.checker("word_char", |c| c.is_alphanumeric() || c == '_');
    let word_chars = builder.one_or_more(word_char);
    let (word_node, word) = builder.capture(word_chars, "word");

    let symbol_char = builder.char_set(&['+', '?', '-', '(', ')']);
    let (symbol_node, symbol) = builder.capture(symbol_char, "symbol");

    let token = builder
        .choice_of(&[literal_node, word_node, symbol_node])
        .ok_or_else(|| PatternError::PatternConstruction("Empty token choice.".to_owned()))?;

    let grammar = builder.build(token)?;

    Ok(TokenGrammar {
        grammar,
        whitespace,
        token,
        literal,
        word,
        symbol,
    })
}

pub fn lex_from_str(s: &str) -> Result<Vec<TokenWithRange>, PatternError> {
    let token_grammar = match &*TOKEN_GRAMMAR {
        Ok(token_grammar) => token_grammar,
        Err(e) => return Err(e.clone()),
    };
    let mut lexer = Lexer::new(token_grammar, s);
    lexer.lex()
}

struct Lexer<'g, 'a> {
    token_grammar: &'g TokenGrammar,
    source: Source<'a>,

    // the location of the previous token
    located: Location,
}

impl<'g, 'a> Lexer<'g, 'a> {
    fn new(token_grammar: &'g TokenGrammar, text: &'a str) -> Self {
        Self {
            token_grammar,
            source: Source::new(text),
            located: Location::new_position(0, 0, 0),
        }
    }

    fn lex(&mut self) -> Result<Vec<TokenWithRange>, PatternError> {
        let mut token_with_ranges = vec![];

        loop {
            self.skip_whitespace()?;

            if self.source.at_end() {
                break;
            }

            let token_with_range = self.lex_token()?;
            token_with_ranges.push(token_with_range);
        }

        Ok(token_with_ranges)
    }

    fn skip_whitespace(&mut self) -> Result<(), PatternError> {
        let token_grammar = self.token_grammar;
        token_grammar
            .grammar
            .consume_node(token_grammar.whitespace, &mut self.source, None)?;
        Ok(())
    }

    fn lex_token(&mut self) -> Result<TokenWithRange, PatternError> {
        let token_grammar = self.token_grammar;
        let start = self.source.position();

        let outcome =
            token_grammar
                .grammar
                .consume_node(token_grammar.token, &mut self.source, None)?;

        if !outcome.is_success() {
            return Err(self.unexpected_char(start));
        }

        let (token, m) = if let Some(m) = outcome.capture(token_grammar.literal) {
            (Token::Literal(self.unescape(m)?), m)
        } else if let Some(m) = outcome.capture(token_grammar.word) {
            (self.classify_word(m)?, m)
        } else if let Some(m) = outcome.capture(token_grammar.symbol) {
            let token = match m.as_str() {
                "+" => Token::Plus,
                "?" => Token::Question,
                "-" => Token::Minus,
                "(" => Token::LeftParen,
                _ => Token::RightParen,
            };
            (token, m)
        } else {
            return Err(self.unexpected_char(start));
        };

        let location = self.locate(m.start());
        Ok(TokenWithRange::from_position_and_length(
            token,
            &location,
            m.len(),
        ))
    }

    // Tokens are located in increasing order, so each location
    // continues from the previous one.
    fn locate(&mut self, position: usize) -> Location {
        let position = position.min(self.source.len());
        if position < self.located.index {
            return self.source.location(position);
        }

        let Location {
            index,
            mut line,
            mut column,
            ..
        } = self.located;

        for c in self.source.slice(Span::new(index, position)).chars() {
            if c == '\n' {
                line += 1;
                column = 0;
            } else {
                column += 1;
            }
        }

        self.located = Location::new_position(position, line, column);
        self.located
    }

    fn unexpected_char(&self, position: usize) -> PatternError {
        let location = self.source.location(position);

        match self.source.text().chars().nth(position) {
            Some('"') => PatternError::MessageWithLocation(
                "Incomplete literal, missing the closing quote.".to_owned(),
                location,
            ),
            Some(c) => PatternError::MessageWithLocation(format!("Unexpected char '{}'.", c), location),
            None => PatternError::UnexpectedEndOfExpression("Expect a token.".to_owned()),
        }
    }

    // The text between the quotes with the escapes decoded.
    fn unescape(&self, m: &Match) -> Result<String, PatternError> {
        let mut text = String::new();
        let mut chars = m.as_str().chars().enumerate().skip(1);
        let last = m.len() - 1;

        while let Some((offset, c)) = chars.next() {
            if offset == last {
                break;
            }

            if c != '\\' {
                text.push(c);
                continue;
            }

            match chars.next() {
                Some((_, escaped @ ('"' | '\\'))) => text.push(escaped),
                Some((_, other)) => {
                    return Err(PatternError::MessageWithLocation(
                        format!("Unsupported escape char '\\{}'.", other),
                        self.source.location(m.start() + offset),
                    ));
                }
                None => break,
            }
        }

        Ok(text)
    }

    fn classify_word(&self, m: &Match) -> Result<Token, PatternError> {
        let word = m.as_str();
        let lowercase = word.to_lowercase();

        let token = match lowercase.as_str() {
            "then" => Token::Then,
            "or" => Token::Or,
            _ => match lowercase.strip_prefix('x') {
                Some(digits) if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) => {
                    let count = digits.parse::<usize>().map_err(|_| {
                        PatternError::MessageWithLocation(
                            format!("The repeat count \"{}\" is too large.", digits),
                            self.source.location(m.start()),
                        )
                    })?;
                    Token::Repeat(count)
                }
                _ => Token::Word(word.to_owned()),
            },
        };

        Ok(token)
    }
}
