// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

use std::ops::Range;

use crate::{
    error::{ErrorSlot, MatchError},
    pattern::{CaptureHandle, Grammar},
    source::Source,
};

/// A region of a `Source`, counted in scalars.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default, Hash)]
pub struct Span {
    pub start: usize, // position included
    pub end: usize,   // position excluded
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end);
        Span { start, end }
    }

    pub fn empty(position: usize) -> Self {
        Span {
            start: position,
            end: position,
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Match<'g, 'a> {
    pub start: usize, // position included
    pub end: usize,   // position excluded
    pub name: Option<&'g str>,
    pub value: &'a str,
}

impl<'g, 'a> Match<'g, 'a> {
    pub fn new(start: usize, end: usize, name: Option<&'g str>, value: &'a str) -> Self {
        Match {
            start,
            end,
            name,
            value,
        }
    }

    pub(crate) fn from_span(source: &Source<'a>, span: Span, name: Option<&'g str>) -> Self {
        Match::new(span.start, span.end, name, source.slice(span))
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }

    pub fn as_str(&self) -> &'a str {
        self.value
    }
}

/// The capture slots of one process, indexed by `CaptureHandle`.
///
/// A slot stays `None` when its sub-pattern never succeeded.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct Captures<'g, 'a> {
    pub matches: Vec<Option<Match<'g, 'a>>>,
}

impl<'g, 'a> Captures<'g, 'a> {
    pub fn get(&self, index: usize) -> Option<&Match<'g, 'a>> {
        self.matches.get(index).and_then(|item| item.as_ref())
    }

    pub fn name(&self, name: &str) -> Option<&Match<'g, 'a>> {
        self.iter().find(|item| item.name == Some(name))
    }

    /// The number of capture slots, bound or not.
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// The bound captures, in handle order.
    pub fn iter(&self) -> impl Iterator<Item = &Match<'g, 'a>> {
        self.matches.iter().flatten()
    }
}

/// The result of consuming a pattern graph against a `Source`.
#[derive(Debug, Clone)]
pub struct Outcome<'g, 'a> {
    grammar: &'g Grammar,
    matched: Option<Match<'g, 'a>>,
    error: ErrorSlot,
    captures: Captures<'g, 'a>,
    position: usize,
}

impl<'g, 'a> Outcome<'g, 'a> {
    pub(crate) fn new(
        grammar: &'g Grammar,
        source: &Source<'a>,
        matched: Option<Span>,
        error: ErrorSlot,
        capture_spans: &[Option<Span>],
    ) -> Self {
        let matches = capture_spans
            .iter()
            .enumerate()
            .map(|(idx, span)| {
                span.map(|span| {
                    Match::from_span(source, span, grammar.capture_name(CaptureHandle(idx)))
                })
            })
            .collect();

        Outcome {
            grammar,
            matched: matched.map(|span| Match::from_span(source, span, None)),
            error,
            captures: Captures { matches },
            position: source.position(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.matched.is_some()
    }

    pub fn matched(&self) -> Option<&Match<'g, 'a>> {
        self.matched.as_ref()
    }

    pub fn span(&self) -> Option<Span> {
        self.matched.as_ref().map(|item| item.span())
    }

    /// The error slot as it was when the process finished.
    ///
    /// A successful process may still carry the failure of
    /// an alternative that was tried and abandoned.
    pub fn error(&self) -> ErrorSlot {
        self.error
    }

    /// The source position after the process.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn capture(&self, handle: CaptureHandle) -> Option<&Match<'g, 'a>> {
        self.captures.get(handle.index())
    }

    pub fn capture_by_name(&self, name: &str) -> Option<&Match<'g, 'a>> {
        self.captures.name(name)
    }

    pub fn captures(&self) -> &Captures<'g, 'a> {
        &self.captures
    }

    /// Raise the recorded failure if the process failed.
    pub fn throw_if_failed(&self) -> Result<(), MatchError> {
        if self.is_success() {
            Ok(())
        } else {
            self.error.raise(self.grammar)
        }
    }

    pub fn into_match(self) -> Result<Match<'g, 'a>, MatchError> {
        self.throw_if_failed()?;

        // `throw_if_failed` returns `Ok` for a failed process only when
        // the slot is empty, which a failing node never leaves behind.
        let grammar = self.grammar;
        let position = self.position;
        self.matched.ok_or_else(|| MatchError::ConsumeFailed {
            expected: grammar.describe(grammar.root()),
            position,
        })
    }
}
