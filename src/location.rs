// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

use std::fmt::Display;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub struct Location {
    pub index: usize,  // The scalar (char) index in the text
    pub line: usize,   // The line number (0-based index)
    pub column: usize, // The column number (0-based index)
    pub length: usize, // The length of the text range; 0 for a single position
}

impl Location {
    /// Create a new `Location` representing a single position.
    pub fn new_position(index: usize, line: usize, column: usize) -> Self {
        Self {
            index,
            line,
            column,
            length: 0,
        }
    }

    /// Create a new `Location` representing a range of text.
    pub fn new_range(index: usize, line: usize, column: usize, length: usize) -> Self {
        Self {
            index,
            line,
            column,
            length,
        }
    }

    /// Create a range `Location` from a starting position and a length.
    pub fn from_position_and_length(position: &Location, length: usize) -> Self {
        Self::new_range(position.index, position.line, position.column, length)
    }

    /// Locate the scalar at `index` within `chars`.
    ///
    /// `index` may equal `chars.len()`, which yields the position
    /// just after the last scalar.
    pub fn locate(chars: &[char], index: usize) -> Self {
        let mut line = 0;
        let mut column = 0;

        for c in chars.iter().take(index) {
            if *c == '\n' {
                line += 1;
                column = 0;
            } else {
                column += 1;
            }
        }

        Self::new_position(index, line, column)
    }

    /// Get the starting position of a range as a `Location`.
    pub fn get_position_by_range_start(&self) -> Self {
        Self::new_position(self.index, self.line, self.column)
    }
}

impl Display for Location {
    // line and column are shown 1-based, the way editors count them.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}, column {}", self.line + 1, self.column + 1)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::Location;

    #[test]
    fn test_locate() {
        let chars: Vec<char> = "a\nmn\nxyz".chars().collect();

        assert_eq!(Location::locate(&chars, 0), Location::new_position(0, 0, 0));
        assert_eq!(Location::locate(&chars, 1), Location::new_position(1, 0, 1));
        assert_eq!(Location::locate(&chars, 2), Location::new_position(2, 1, 0));
        assert_eq!(Location::locate(&chars, 4), Location::new_position(4, 1, 2));
        assert_eq!(Location::locate(&chars, 7), Location::new_position(7, 2, 2));

        // the position after the last char
        assert_eq!(Location::locate(&chars, 8), Location::new_position(8, 2, 3));
    }

    #[test]
    fn test_range() {
        let position = Location::new_position(5, 1, 2);
        let range = Location::from_position_and_length(&position, 3);
        assert_eq!(range, Location::new_range(5, 1, 2, 3));
        assert_eq!(range.get_position_by_range_start(), position);
        assert_eq!(range.to_string(), "line 2, column 3");
    }
}
