// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

use crate::{location::Location, outcome::Span};

/// The text being matched plus a scan position.
///
/// The text is indexed by Unicode scalar values (`char`), so every
/// position and every `Span` counts scalars, not bytes.
///
/// Invariant: `0 <= position <= len()`. No operation moves the
/// position past the end of the text.
#[derive(Debug, Clone)]
pub struct Source<'a> {
    text: &'a str,
    chars: Vec<char>,

    // byte offset of each scalar, with `text.len()` appended,
    // so that a scalar span can be turned into a `&str` slice.
    byte_offsets: Vec<usize>,

    position: usize,
}

/// A snapshot of the scan position, see `Source::mark` and `Source::reset`.
#[derive(Debug, PartialEq, Eq, Clone, Copy, PartialOrd, Ord)]
pub struct Mark(pub(crate) usize);

impl Mark {
    pub fn position(&self) -> usize {
        self.0
    }
}

impl<'a> Source<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut chars = Vec::with_capacity(text.len());
        let mut byte_offsets = Vec::with_capacity(text.len() + 1);

        for (offset, c) in text.char_indices() {
            chars.push(c);
            byte_offsets.push(offset);
        }
        byte_offsets.push(text.len());

        Self {
            text,
            chars,
            byte_offsets,
            position: 0,
        }
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    /// The number of scalars in the text.
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn at_end(&self) -> bool {
        self.position == self.chars.len()
    }

    pub fn mark(&self) -> Mark {
        Mark(self.position)
    }

    pub fn reset(&mut self, mark: Mark) {
        debug_assert!(mark.0 <= self.chars.len());
        self.position = mark.0.min(self.chars.len());
    }

    /// Move to an arbitrary position, clamped to the end of the text.
    pub(crate) fn seek(&mut self, position: usize) {
        self.position = position.min(self.chars.len());
    }

    /// The scalar at the current position, `None` at the end of the text.
    pub fn peek(&self) -> Option<char> {
        self.chars.get(self.position).copied()
    }

    /// The next `n` scalars without moving the position.
    ///
    /// Returns `None` when fewer than `n` scalars are left.
    pub fn read_ahead(&self, n: usize) -> Option<&[char]> {
        let end = self.position.checked_add(n)?;
        self.chars.get(self.position..end)
    }

    /// All scalars from the current position to the end of the text.
    pub fn remaining(&self) -> &[char] {
        &self.chars[self.position..]
    }

    /// Move forward by `n` scalars.
    ///
    /// Returns `false` and leaves the position unchanged
    /// when that would move past the end of the text.
    pub fn advance(&mut self, n: usize) -> bool {
        match self.position.checked_add(n) {
            Some(end) if end <= self.chars.len() => {
                self.position = end;
                true
            }
            _ => false,
        }
    }

    /// The text covered by `span`.
    ///
    /// Out-of-range spans are clamped to the text.
    pub fn slice(&self, span: Span) -> &'a str {
        let last = self.chars.len();
        let start = span.start.min(last);
        let end = span.end.min(last).max(start);
        &self.text[self.byte_offsets[start]..self.byte_offsets[end]]
    }

    /// The line and column of a scalar position.
    pub fn location(&self, position: usize) -> Location {
        Location::locate(&self.chars, position.min(self.chars.len()))
    }
}

impl<'a> From<&'a str> for Source<'a> {
    fn from(text: &'a str) -> Self {
        Source::new(text)
    }
}
