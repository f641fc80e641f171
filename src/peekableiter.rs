// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

use std::collections::VecDeque;

/// An iterator adapter that allows looking ahead a bounded
/// number of items without consuming them.
///
/// The look-ahead window is kept full, so `peek` only needs `&self`.
pub struct PeekableIter<'a, T> {
    upstream: &'a mut dyn Iterator<Item = T>,
    buffer: VecDeque<T>,
    max_peek_count: usize,
}

impl<'a, T> PeekableIter<'a, T> {
    pub fn new(upstream: &'a mut dyn Iterator<Item = T>, max_peek_count: usize) -> Self {
        let mut buffer = VecDeque::with_capacity(max_peek_count);
        for _ in 0..max_peek_count {
            match upstream.next() {
                Some(item) => buffer.push_back(item),
                None => break,
            }
        }

        Self {
            upstream,
            buffer,
            max_peek_count,
        }
    }

    /// Returns the item at `offset` (0 is the next item) without consuming it.
    ///
    /// Offsets outside the look-ahead window always yield `None`.
    pub fn peek(&self, offset: usize) -> Option<&T> {
        if offset >= self.max_peek_count {
            return None;
        }

        self.buffer.get(offset)
    }
}

impl<T> Iterator for PeekableIter<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.buffer.pop_front()?;

        if let Some(following) = self.upstream.next() {
            self.buffer.push_back(following);
        }

        Some(item)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::PeekableIter;

    #[test]
    fn test_peek_and_next() {
        let mut chars = "abc".chars();
        let mut iter = PeekableIter::new(&mut chars, 2);

        assert_eq!(iter.peek(0), Some(&'a'));
        assert_eq!(iter.peek(1), Some(&'b'));
        assert_eq!(iter.peek(2), None); // out of the window

        assert_eq!(iter.next(), Some('a'));
        assert_eq!(iter.peek(1), Some(&'c'));
        assert_eq!(iter.next(), Some('b'));
        assert_eq!(iter.next(), Some('c'));
        assert_eq!(iter.peek(0), None);
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn test_short_upstream() {
        let mut empty = std::iter::empty::<u8>();
        let mut iter = PeekableIter::new(&mut empty, 3);
        assert_eq!(iter.peek(0), None);
        assert_eq!(iter.next(), None);
    }
}
