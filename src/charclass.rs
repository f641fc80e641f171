// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

use std::fmt::Display;

// Built-in predicates for `Checker` nodes.
//
// Classification follows the Unicode properties exposed by `char`,
// except `char_word` and `char_digit` which keep the ASCII
// meaning of the traditional regex classes `\w` and `\d`.

#[allow(clippy::enum_variant_names)]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum PresetCharClass {
    CharAny,
    CharWord,
    CharNotWord,
    CharDigit,
    CharNotDigit,
    CharSpace,
    CharNotSpace,
    CharLetter,
    CharNotLetter,
}

impl PresetCharClass {
    pub fn matches(&self, c: char) -> bool {
        match self {
            PresetCharClass::CharAny => true,
            PresetCharClass::CharWord => is_word(c),
            PresetCharClass::CharNotWord => !is_word(c),
            PresetCharClass::CharDigit => is_digit(c),
            PresetCharClass::CharNotDigit => !is_digit(c),
            PresetCharClass::CharSpace => is_space(c),
            PresetCharClass::CharNotSpace => !is_space(c),
            PresetCharClass::CharLetter => is_letter(c),
            PresetCharClass::CharNotLetter => !is_letter(c),
        }
    }
}

impl Display for PresetCharClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name_str = match self {
            PresetCharClass::CharAny => "char_any",
            PresetCharClass::CharWord => "char_word",
            PresetCharClass::CharNotWord => "char_not_word",
            PresetCharClass::CharDigit => "char_digit",
            PresetCharClass::CharNotDigit => "char_not_digit",
            PresetCharClass::CharSpace => "char_space",
            PresetCharClass::CharNotSpace => "char_not_space",
            PresetCharClass::CharLetter => "char_letter",
            PresetCharClass::CharNotLetter => "char_not_letter",
        };
        f.write_str(name_str)
    }
}

// [A-Za-z0-9_]
pub fn is_word(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

// [0-9]
pub fn is_digit(c: char) -> bool {
    c.is_ascii_digit()
}

pub fn is_space(c: char) -> bool {
    c.is_whitespace()
}

pub fn is_letter(c: char) -> bool {
    c.is_alphabetic()
}

/// Compare two scalars under the Unicode lowercase mapping.
///
/// Scalars whose lowercase form spans several chars (e.g. 'İ')
/// compare the whole mapped sequence.
pub fn eq_ignore_case(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::{eq_ignore_case, PresetCharClass};

    #[test]
    fn test_preset_classes() {
        assert!(PresetCharClass::CharWord.matches('a'));
        assert!(PresetCharClass::CharWord.matches('_'));
        assert!(!PresetCharClass::CharWord.matches('-'));
        assert!(PresetCharClass::CharNotWord.matches('*'));

        assert!(PresetCharClass::CharDigit.matches('7'));
        assert!(!PresetCharClass::CharDigit.matches('٣')); // arabic-indic digit three
        assert!(PresetCharClass::CharNotDigit.matches('x'));

        assert!(PresetCharClass::CharSpace.matches('\t'));
        assert!(PresetCharClass::CharSpace.matches('\u{3000}'));
        assert!(!PresetCharClass::CharNotSpace.matches('\n'));

        assert!(PresetCharClass::CharLetter.matches('文'));
        assert!(PresetCharClass::CharNotLetter.matches('1'));
        assert!(PresetCharClass::CharAny.matches('\n'));

        assert_eq!(PresetCharClass::CharNotSpace.to_string(), "char_not_space");
    }

    #[test]
    fn test_eq_ignore_case() {
        assert!(eq_ignore_case('a', 'A'));
        assert!(eq_ignore_case('Ä', 'ä'));
        assert!(eq_ignore_case('Σ', 'σ'));
        assert!(!eq_ignore_case('a', 'b'));
        assert!(!eq_ignore_case('1', 'l'));
    }
}
