// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

use std::fmt::Display;

use thiserror::Error;

use crate::{
    location::Location,
    pattern::{Grammar, NodeId},
};

/// The kind of the most recent failure recorded in an `ErrorSlot`.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum ErrorKind {
    #[default]
    None,

    // An expected literal or predicate did not match at the current position.
    ConsumeFailed,

    // A negated sub-pattern unexpectedly matched.
    NeglectFailed,

    // A read was attempted at or past the end of the source.
    EndOfSource,

    // The process ran out of its depth or step budget and was aborted.
    LimitExceeded(Limit),
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Limit {
    Depth,
    Steps,
}

impl Display for Limit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Limit::Depth => f.write_str("maximum depth"),
            Limit::Steps => f.write_str("maximum steps"),
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::None => f.write_str("None"),
            ErrorKind::ConsumeFailed => f.write_str("ConsumeFailed"),
            ErrorKind::NeglectFailed => f.write_str("NeglectFailed"),
            ErrorKind::EndOfSource => f.write_str("EndOfSource"),
            ErrorKind::LimitExceeded(_) => f.write_str("LimitExceeded"),
        }
    }
}

/// The reusable failure slot of one process.
///
/// It is a plain value: the failing node is kept as a `NodeId` and only
/// turned into text by `raise`, so recording a failure never allocates.
/// Every failing attempt overwrites the slot, copy it to keep an
/// earlier failure.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub struct ErrorSlot {
    kind: ErrorKind,
    node: Option<NodeId>,
    position: usize,
}

impl ErrorSlot {
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The node that was being attempted.
    ///
    /// For `NeglectFailed` this is the negation node itself.
    pub fn node(&self) -> Option<NodeId> {
        self.node
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn is_none(&self) -> bool {
        self.kind == ErrorKind::None
    }

    pub(crate) fn set(&mut self, kind: ErrorKind, node: NodeId, position: usize) {
        self.kind = kind;
        self.node = Some(node);
        self.position = position;
    }

    pub fn clear(&mut self) {
        *self = ErrorSlot::default();
    }

    /// Convert the slot into the matching `MatchError`.
    ///
    /// Does nothing when the slot holds no failure.
    pub fn raise(&self, grammar: &Grammar) -> Result<(), MatchError> {
        let describe = |node: Option<NodeId>| match node {
            Some(id) => grammar.describe(id),
            None => "<unknown>".to_owned(),
        };

        let position = self.position;
        match self.kind {
            ErrorKind::None => Ok(()),
            ErrorKind::ConsumeFailed => Err(MatchError::ConsumeFailed {
                expected: describe(self.node),
                position,
            }),
            ErrorKind::NeglectFailed => {
                let pattern = match self.node {
                    Some(id) => grammar.describe_negated(id),
                    None => describe(None),
                };
                Err(MatchError::NeglectFailed { pattern, position })
            }
            ErrorKind::EndOfSource => Err(MatchError::EndOfSource {
                expected: describe(self.node),
                position,
            }),
            ErrorKind::LimitExceeded(limit) => Err(MatchError::LimitExceeded { limit, position }),
        }
    }
}

/// The raised form of a failed process.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum MatchError {
    #[error("Expect {expected} at position {position}.")]
    ConsumeFailed { expected: String, position: usize },

    #[error("Unexpected {pattern} at position {position}.")]
    NeglectFailed { pattern: String, position: usize },

    #[error("Unexpected end of source at position {position}, expect {expected}.")]
    EndOfSource { expected: String, position: usize },

    #[error("Process aborted at position {position}, the {limit} is exceeded.")]
    LimitExceeded { limit: Limit, position: usize },
}

impl MatchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MatchError::ConsumeFailed { .. } => ErrorKind::ConsumeFailed,
            MatchError::NeglectFailed { .. } => ErrorKind::NeglectFailed,
            MatchError::EndOfSource { .. } => ErrorKind::EndOfSource,
            MatchError::LimitExceeded { limit, .. } => ErrorKind::LimitExceeded(*limit),
        }
    }

    pub fn position(&self) -> usize {
        match self {
            MatchError::ConsumeFailed { position, .. }
            | MatchError::NeglectFailed { position, .. }
            | MatchError::EndOfSource { position, .. }
            | MatchError::LimitExceeded { position, .. } => *position,
        }
    }
}

/// Errors raised while building a pattern graph or compiling an expression.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum PatternError {
    #[error("Pattern \"{0}\" is declared but never defined.")]
    PatternUndefined(String),

    #[error("{0}")]
    PatternConstruction(String),

    // Malformed expression text.
    #[error("{0} At {1}.")]
    MessageWithLocation(String, Location),

    #[error("Unexpected end of expression. {0}")]
    UnexpectedEndOfExpression(String),
}

impl PatternError {
    /// Whether the error comes from malformed expression text
    /// rather than from graph construction.
    pub fn is_expression_error(&self) -> bool {
        matches!(
            self,
            PatternError::MessageWithLocation(..) | PatternError::UnexpectedEndOfExpression(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::{location::Location, pattern::GrammarBuilder};

    use super::{ErrorKind, ErrorSlot, Limit, MatchError, PatternError};

    #[test]
    fn test_raise() {
        let mut builder = GrammarBuilder::new();
        let hello = builder.literal("Hello");
        let not_hello = builder.negate(hello);
        let grammar = builder.build(not_hello).unwrap();

        let mut slot = ErrorSlot::default();
        assert!(slot.is_none());
        assert_eq!(slot.raise(&grammar), Ok(()));

        slot.set(ErrorKind::ConsumeFailed, hello, 3);
        assert_eq!(
            slot.raise(&grammar),
            Err(MatchError::ConsumeFailed {
                expected: "\"Hello\"".to_owned(),
                position: 3
            })
        );

        slot.set(ErrorKind::NeglectFailed, not_hello, 0);
        let err = slot.raise(&grammar).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NeglectFailed);
        assert_eq!(err.to_string(), "Unexpected \"Hello\" at position 0.");

        slot.set(ErrorKind::EndOfSource, hello, 2);
        assert_eq!(
            slot.raise(&grammar).unwrap_err().to_string(),
            "Unexpected end of source at position 2, expect \"Hello\"."
        );

        slot.set(ErrorKind::LimitExceeded(Limit::Depth), hello, 1);
        assert_eq!(
            slot.raise(&grammar).unwrap_err(),
            MatchError::LimitExceeded {
                limit: Limit::Depth,
                position: 1
            }
        );

        slot.clear();
        assert_eq!(slot, ErrorSlot::default());
    }

    #[test]
    fn test_slot_is_a_value() {
        let mut builder = GrammarBuilder::new();
        let a = builder.literal("a");
        let _ = builder.build(a).unwrap();

        let mut slot = ErrorSlot::default();
        slot.set(ErrorKind::ConsumeFailed, a, 0);

        // a caller keeps a failure by copying the slot
        let saved = slot;
        slot.set(ErrorKind::EndOfSource, a, 1);

        assert_eq!(saved.kind(), ErrorKind::ConsumeFailed);
        assert_eq!(saved.position(), 0);
        assert_eq!(slot.kind(), ErrorKind::EndOfSource);
        assert_ne!(saved, slot);
    }

    #[test]
    fn test_pattern_error_message() {
        let err = PatternError::MessageWithLocation(
            "Expect a quoted literal.".to_owned(),
            Location::new_position(4, 0, 4),
        );
        assert!(err.is_expression_error());
        assert_eq!(err.to_string(), "Expect a quoted literal. At line 1, column 5.");

        let err = PatternError::PatternUndefined("value".to_owned());
        assert!(!err.is_expression_error());
        assert_eq!(
            err.to_string(),
            "Pattern \"value\" is declared but never defined."
        );
    }
}
