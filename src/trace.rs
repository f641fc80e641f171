// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

use std::ops::Index;

use crate::{error::ErrorKind, pattern::NodeId};

/// One attempted node evaluation.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Step {
    pub node: NodeId,

    // the source position when the node was attempted
    pub position: usize,

    // the nesting depth of the attempt, the root node is 0
    pub depth: usize,

    // `ErrorKind::None` on success
    pub outcome: ErrorKind,

    // the source position after a successful attempt
    pub end: Option<usize>,
}

impl Step {
    pub fn is_success(&self) -> bool {
        self.end.is_some()
    }
}

/// An append-only log of attempted nodes.
///
/// Steps are stored in the order the nodes were entered, a compound
/// node comes before the nodes it tried. The log has no influence on
/// the process.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct Trace {
    steps: Vec<Step>,
}

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Step> {
        self.steps.get(index)
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Step> {
        self.steps.iter()
    }

    /// The steps that failed, in order.
    pub fn failures(&self) -> impl Iterator<Item = &Step> {
        self.steps.iter().filter(|step| !step.is_success())
    }

    pub fn clear(&mut self) {
        self.steps.clear();
    }

    // Append a pending step, its outcome is filled in by `finish`.
    pub(crate) fn begin(&mut self, node: NodeId, position: usize, depth: usize) -> usize {
        let index = self.steps.len();
        self.steps.push(Step {
            node,
            position,
            depth,
            outcome: ErrorKind::None,
            end: None,
        });
        index
    }

    pub(crate) fn finish(&mut self, index: usize, outcome: ErrorKind, end: Option<usize>) {
        if let Some(step) = self.steps.get_mut(index) {
            step.outcome = outcome;
            step.end = end;
        }
    }
}

impl Index<usize> for Trace {
    type Output = Step;

    fn index(&self, index: usize) -> &Self::Output {
        &self.steps[index]
    }
}

impl<'a> IntoIterator for &'a Trace {
    type Item = &'a Step;
    type IntoIter = std::slice::Iter<'a, Step>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::{error::ErrorKind, pattern::NodeId};

    use super::{Step, Trace};

    #[test]
    fn test_begin_and_finish() {
        let mut trace = Trace::new();
        let outer = trace.begin(NodeId(2), 0, 0);
        let inner = trace.begin(NodeId(0), 0, 1);
        trace.finish(inner, ErrorKind::ConsumeFailed, None);
        trace.finish(outer, ErrorKind::None, Some(3));

        assert_eq!(trace.len(), 2);
        assert_eq!(
            trace[0],
            Step {
                node: NodeId(2),
                position: 0,
                depth: 0,
                outcome: ErrorKind::None,
                end: Some(3)
            }
        );
        assert!(!trace[1].is_success());
        assert_eq!(trace.failures().count(), 1);
        assert_eq!((&trace).into_iter().map(|s| s.depth).collect::<Vec<_>>(), vec![0, 1]);

        trace.clear();
        assert!(trace.is_empty());
    }
}
