// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

mod ast;
mod charclass;
mod compiler;
mod error;
mod expression;
mod location;
mod outcome;
mod pattern;
mod peekableiter;
mod printer;
mod source;
mod trace;

pub mod process;

pub use ast::{Expression, Modifier};
pub use charclass::PresetCharClass;
pub use compiler::{compile, compile_from_str, compile_into};
pub use error::{ErrorKind, ErrorSlot, Limit, MatchError, PatternError};
pub use location::Location;
pub use outcome::{Captures, Match, Outcome, Span};
pub use pattern::{
    CaptureHandle, CaseRule, CheckerNode, Grammar, GrammarBuilder, LiteralNode, Node, NodeId,
    Predicate, RuleNode,
};
pub use printer::{NodeDisplay, TraceDisplay};
pub use process::{Matches, Process, ProcessConfig, Repetitions};
pub use source::{Mark, Source};
pub use trace::{Step, Trace};
