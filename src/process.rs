// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

use std::iter::FusedIterator;

use log::{debug, trace};

use crate::{
    error::{ErrorKind, ErrorSlot, Limit, PatternError},
    outcome::{Match, Outcome, Span},
    pattern::{CheckerNode, Grammar, LiteralNode, Node, NodeId},
    source::Source,
    trace::Trace,
};

/// Default maximum nesting depth of node evaluations.
///
/// Every node on the evaluation path counts, not only rules. One level
/// of `nested = "(" nested? ")"` costs four: the rule, two sequences
/// and the optional. The default therefore allows about 250 levels of
/// such a rule.
pub const DEFAULT_MAX_DEPTH: usize = 1000;

/// Default maximum number of node evaluations (0 = no limit).
pub const DEFAULT_MAX_STEPS: usize = 0;

/// Limits of one process.
///
/// A limit of `0` disables it. When a limit is hit the process is
/// aborted: every pending node fails and the source is rolled back.
///
/// `max_depth` is measured in nested node evaluations, see
/// `DEFAULT_MAX_DEPTH`. A deeply recursive grammar needs a limit of
/// its recursion depth times the nodes of one recursion.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct ProcessConfig {
    pub max_depth: usize,
    pub max_steps: usize,
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

impl ProcessConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// No depth and no step limit.
    pub fn unlimited() -> Self {
        Self {
            max_depth: 0,
            max_steps: 0,
        }
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_max_steps(mut self, steps: usize) -> Self {
        self.max_steps = steps;
        self
    }
}

/// The state of one evaluation of a `Grammar` against a `Source`.
///
/// Everything here is scratch state of a single process: the error
/// slot, the capture slots, and the optional trace.
pub struct Process<'g, 'p, 'a> {
    grammar: &'g Grammar,
    source: &'p mut Source<'a>,
    trace: Option<&'p mut Trace>,
    config: ProcessConfig,
    error: ErrorSlot,
    captures: Vec<Option<Span>>,
    depth: usize,
    steps: usize,
    aborted: bool,
}

impl<'g, 'p, 'a> Process<'g, 'p, 'a> {
    pub fn new(
        grammar: &'g Grammar,
        source: &'p mut Source<'a>,
        trace: Option<&'p mut Trace>,
    ) -> Self {
        Self {
            grammar,
            source,
            trace,
            config: grammar.config(),
            error: ErrorSlot::default(),
            captures: vec![None; grammar.capture_names().len()],
            depth: 0,
            steps: 0,
            aborted: false,
        }
    }

    pub fn with_config(mut self, config: ProcessConfig) -> Self {
        self.config = config;
        self
    }

    pub fn error(&self) -> ErrorSlot {
        self.error
    }

    /// Consume the root node of the grammar.
    pub fn run(self) -> Outcome<'g, 'a> {
        let root = self.grammar.root();
        self.finish(root)
    }

    /// Consume the graph starting at `node` instead of the root.
    pub fn run_node(self, node: NodeId) -> Result<Outcome<'g, 'a>, PatternError> {
        if self.grammar.node(node).is_none() {
            return Err(PatternError::PatternConstruction(format!(
                "Node #{} does not belong to this grammar.",
                node.index()
            )));
        }

        Ok(self.finish(node))
    }

    /// Iterate the repetitions of a `Span` node one by one.
    ///
    /// Each item is the match of one repetition of the inner node, the
    /// iterator ends at the first repetition that fails or does not
    /// advance, and cannot be restarted.
    pub fn repetitions(self, span_node: NodeId) -> Result<Repetitions<'g, 'p, 'a>, PatternError> {
        let mut current = span_node;

        // look through named rules, a cycle of rules ends the lookup
        for _ in 0..=self.grammar.nodes().len() {
            match self.grammar.node(current) {
                Some(Node::Span(inner)) => {
                    return Ok(Repetitions {
                        inner: *inner,
                        process: self,
                        finished: false,
                    });
                }
                Some(Node::Rule(rule)) => current = rule.target,
                _ => break,
            }
        }

        Err(PatternError::PatternConstruction(format!(
            "Node #{} is not a span pattern.",
            span_node.index()
        )))
    }

    fn finish(mut self, node: NodeId) -> Outcome<'g, 'a> {
        let start = self.source.position();
        trace!("process start, node: {}, position: {}", node.index(), start);

        let matched = self.consume(node);

        match matched {
            Some(span) => trace!(
                "process finish, node: {}, span: {}..{}",
                node.index(),
                span.start,
                span.end
            ),
            None => trace!(
                "process failed, node: {}, error: {}, position: {}",
                node.index(),
                self.error.kind(),
                self.error.position()
            ),
        }

        Outcome::new(self.grammar, self.source, matched, self.error, &self.captures)
    }

    /// Evaluate a node.
    ///
    /// On failure the source position is restored to what it was
    /// before the call, and the error slot holds the failure.
    pub(crate) fn consume(&mut self, id: NodeId) -> Option<Span> {
        if self.aborted {
            return None;
        }

        let position = self.source.position();
        let depth = self.depth;
        let step_index = self
            .trace
            .as_deref_mut()
            .map(|trace| trace.begin(id, position, depth));

        let result = if self.enter(id) {
            let result = self.consume_node(id);
            self.depth -= 1;
            result
        } else {
            None
        };

        debug_assert!(result.is_some() || self.source.position() == position);

        if let (Some(trace), Some(index)) = (self.trace.as_deref_mut(), step_index) {
            let outcome = match result {
                Some(_) => ErrorKind::None,
                None => self.error.kind(),
            };
            trace.finish(index, outcome, result.map(|span| span.end));
        }

        result
    }

    fn enter(&mut self, id: NodeId) -> bool {
        self.steps += 1;

        if self.config.max_steps > 0 && self.steps > self.config.max_steps {
            self.abort(Limit::Steps, id);
            return false;
        }

        if self.config.max_depth > 0 && self.depth >= self.config.max_depth {
            self.abort(Limit::Depth, id);
            return false;
        }

        self.depth += 1;
        true
    }

    fn abort(&mut self, limit: Limit, id: NodeId) {
        debug!(
            "process aborted, {} exceeded at node: {}, position: {}",
            limit,
            id.index(),
            self.source.position()
        );

        self.aborted = true;
        self.fail(ErrorKind::LimitExceeded(limit), id);
    }

    fn fail(&mut self, kind: ErrorKind, id: NodeId) {
        self.error.set(kind, id, self.source.position());
    }

    fn consume_node(&mut self, id: NodeId) -> Option<Span> {
        let grammar = self.grammar;

        match grammar.node_unchecked(id) {
            Node::Literal(literal) => self.consume_literal(id, literal),
            Node::Checker(checker) => self.consume_checker(id, checker),
            Node::Concatenate(left, right) => self.consume_concatenate(*left, *right),
            Node::Alternate(left, right) => self.consume_alternate(*left, *right),
            Node::Negate(inner) => self.consume_negate(id, *inner),
            Node::Optional(inner) => self.consume_optional(*inner),
            Node::Repeat(inner, count) => self.consume_repeat(*inner, *count),
            Node::Span(inner) => self.consume_span(*inner),
            Node::Capture(inner, handle) => {
                let span = self.consume(*inner)?;
                if let Some(slot) = self.captures.get_mut(handle.index()) {
                    *slot = Some(span);
                }
                Some(span)
            }
            Node::Rule(rule) => self.consume(rule.target),
        }
    }

    fn consume_literal(&mut self, id: NodeId, literal: &LiteralNode) -> Option<Span> {
        let start = self.source.position();

        // a mismatch within the remaining text is reported before
        // running out of text.
        let failure = {
            let remaining = self.source.remaining();
            literal
                .chars
                .iter()
                .enumerate()
                .find_map(|(offset, expected)| match remaining.get(offset) {
                    None => Some(ErrorKind::EndOfSource),
                    Some(actual) if !literal.case.compare(*expected, *actual) => {
                        Some(ErrorKind::ConsumeFailed)
                    }
                    Some(_) => None,
                })
        };

        if let Some(kind) = failure {
            self.fail(kind, id);
            return None;
        }

        let length = literal.chars.len();
        self.source.advance(length);
        Some(Span::new(start, start + length))
    }

    fn consume_checker(&mut self, id: NodeId, checker: &CheckerNode) -> Option<Span> {
        let start = self.source.position();

        match self.source.peek() {
            None => {
                self.fail(ErrorKind::EndOfSource, id);
                None
            }
            Some(c) if (checker.predicate)(c) => {
                self.source.advance(1);
                Some(Span::new(start, start + 1))
            }
            Some(_) => {
                self.fail(ErrorKind::ConsumeFailed, id);
                None
            }
        }
    }

    fn consume_concatenate(&mut self, left: NodeId, right: NodeId) -> Option<Span> {
        let mark = self.source.mark();

        if self.consume(left).is_none() {
            self.source.reset(mark);
            return None;
        }

        match self.consume(right) {
            Some(span) => Some(Span::new(mark.position(), span.end)),
            None => {
                // roll back the whole sequence, not only the right side
                self.source.reset(mark);
                None
            }
        }
    }

    fn consume_alternate(&mut self, left: NodeId, right: NodeId) -> Option<Span> {
        let mark = self.source.mark();

        if let Some(span) = self.consume(left) {
            return Some(span);
        }

        self.source.reset(mark);
        self.consume(right)
    }

    fn consume_negate(&mut self, id: NodeId, inner: NodeId) -> Option<Span> {
        let mark = self.source.mark();

        match self.consume(inner) {
            Some(_) => {
                self.source.reset(mark);
                self.fail(ErrorKind::NeglectFailed, id);
                None
            }
            None if self.aborted => None,
            None => Some(Span::empty(mark.position())),
        }
    }

    fn consume_optional(&mut self, inner: NodeId) -> Option<Span> {
        let mark = self.source.mark();

        match self.consume(inner) {
            Some(span) => Some(span),
            None if self.aborted => None,
            None => {
                self.source.reset(mark);
                Some(Span::empty(mark.position()))
            }
        }
    }

    fn consume_repeat(&mut self, inner: NodeId, count: usize) -> Option<Span> {
        let mark = self.source.mark();

        for _ in 0..count {
            if self.consume(inner).is_none() {
                self.source.reset(mark);
                return None;
            }
        }

        Some(Span::new(mark.position(), self.source.position()))
    }

    fn consume_span(&mut self, inner: NodeId) -> Option<Span> {
        let mark = self.source.mark();

        loop {
            let before = self.source.position();
            match self.consume(inner) {
                // a repetition without progress ends the span,
                // otherwise `Span(Optional(..))` never terminates.
                Some(span) if span.end > before => {}
                Some(_) => break,
                None if self.aborted => {
                    self.source.reset(mark);
                    return None;
                }
                None => break,
            }
        }

        Some(Span::new(mark.position(), self.source.position()))
    }
}

/// The repetitions of a `Span` node, see `Process::repetitions`.
pub struct Repetitions<'g, 'p, 'a> {
    process: Process<'g, 'p, 'a>,
    inner: NodeId,
    finished: bool,
}

impl Repetitions<'_, '_, '_> {
    /// The error slot of the underlying process, it holds the
    /// failure that ended the repetitions.
    pub fn error(&self) -> ErrorSlot {
        self.process.error
    }

    pub fn position(&self) -> usize {
        self.process.source.position()
    }
}

impl<'g, 'a> Iterator for Repetitions<'g, '_, 'a> {
    type Item = Match<'g, 'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let before = self.process.source.position();
        match self.process.consume(self.inner) {
            Some(span) if span.end > before => {
                Some(Match::from_span(self.process.source, span, None))
            }
            _ => {
                self.finished = true;
                None
            }
        }
    }
}

impl FusedIterator for Repetitions<'_, '_, '_> {}

/// Successive non-overlapping matches, see `Grammar::find_iter`.
pub struct Matches<'g, 'a> {
    grammar: &'g Grammar,
    source: Source<'a>,
    next_start: usize,
}

impl<'g, 'a> Matches<'g, 'a> {
    fn new(grammar: &'g Grammar, text: &'a str) -> Self {
        Matches {
            grammar,
            source: Source::new(text),
            next_start: 0,
        }
    }
}

impl<'g, 'a> Iterator for Matches<'g, 'a> {
    type Item = Match<'g, 'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.next_start <= self.source.len() {
            let start = self.next_start;
            self.source.seek(start);

            let outcome = Process::new(self.grammar, &mut self.source, None).run();
            if let Some(span) = outcome.span() {
                // an empty match moves forward one char to guarantee progress
                self.next_start = if span.is_empty() {
                    span.end + 1
                } else {
                    span.end
                };
                return outcome.matched().cloned();
            }

            // move forward one character and try again
            self.next_start = start + 1;
        }

        None
    }
}

impl FusedIterator for Matches<'_, '_> {}

impl Grammar {
    /// Consume the root node at the current position of `source`.
    ///
    /// On success the source is left after the match, on failure it
    /// is left where it was.
    pub fn consume<'g, 'a>(
        &'g self,
        source: &mut Source<'a>,
        trace: Option<&mut Trace>,
    ) -> Outcome<'g, 'a> {
        Process::new(self, source, trace).run()
    }

    /// Like `consume`, but entered at `node`.
    pub fn consume_node<'g, 'a>(
        &'g self,
        node: NodeId,
        source: &mut Source<'a>,
        trace: Option<&mut Trace>,
    ) -> Result<Outcome<'g, 'a>, PatternError> {
        Process::new(self, source, trace).run_node(node)
    }

    /// Consume the root node at the start of `text`.
    pub fn parse<'g, 'a>(&'g self, text: &'a str) -> Outcome<'g, 'a> {
        let mut source = Source::new(text);
        self.consume(&mut source, None)
    }

    pub fn parse_with_trace<'g, 'a>(&'g self, text: &'a str, trace: &mut Trace) -> Outcome<'g, 'a> {
        let mut source = Source::new(text);
        self.consume(&mut source, Some(trace))
    }

    /// Whether the root node matches the whole of `text`.
    pub fn is_match(&self, text: &str) -> bool {
        let mut source = Source::new(text);
        let outcome = self.consume(&mut source, None);
        outcome.is_success() && source.at_end()
    }

    /// The first match at any position of `text`.
    pub fn find<'g, 'a>(&'g self, text: &'a str) -> Option<Match<'g, 'a>> {
        self.find_iter(text).next()
    }

    pub fn find_iter<'g, 'a>(&'g self, text: &'a str) -> Matches<'g, 'a> {
        Matches::new(self, text)
    }
}
