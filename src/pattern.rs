// Copyright (c) 2025 Hemashushu <hippospark@gmail.com>, All rights reserved.
//
// This Source Code Form is subject to the terms of
// the Mozilla Public License version 2.0 and additional exceptions.
// For more details, see the LICENSE, LICENSE.additional, and CONTRIBUTING files.

use std::{fmt::Debug, sync::Arc};

use crate::{
    charclass::{eq_ignore_case, PresetCharClass},
    error::PatternError,
    process::ProcessConfig,
};

/// The index of a node in the arena of a `GrammarBuilder`/`Grammar`.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Names the capture slot bound by a `Capture` node.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct CaptureHandle(pub(crate) usize);

impl CaptureHandle {
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum CaseRule {
    #[default]
    Sensitive,
    Insensitive,
}

impl CaseRule {
    pub fn compare(&self, expected: char, actual: char) -> bool {
        match self {
            CaseRule::Sensitive => expected == actual,
            CaseRule::Insensitive => eq_ignore_case(expected, actual),
        }
    }
}

pub type Predicate = Arc<dyn Fn(char) -> bool + Send + Sync>;

#[derive(Debug, Clone)]
pub enum Node {
    Literal(LiteralNode),
    Checker(CheckerNode),

    // all-or-nothing sequence
    Concatenate(NodeId, NodeId),

    // ordered choice, the first successful branch wins
    Alternate(NodeId, NodeId),

    // succeeds without consuming when the inner node fails
    Negate(NodeId),
    Optional(NodeId),
    Repeat(NodeId, usize),

    // zero or more, greedy
    Span(NodeId),
    Capture(NodeId, CaptureHandle),

    // a named reference, the target of a forward declaration
    Rule(RuleNode),
}

#[derive(Debug, Clone)]
pub struct LiteralNode {
    pub text: String,
    pub chars: Vec<char>,
    pub case: CaseRule,
}

#[derive(Clone)]
pub struct CheckerNode {
    pub name: String,
    pub predicate: Predicate,
}

impl Debug for CheckerNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckerNode")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct RuleNode {
    pub name: String,
    pub target: NodeId,
}

impl Node {
    /// The nodes referenced by this node.
    pub fn children(&self) -> Vec<NodeId> {
        match self {
            Node::Literal(_) | Node::Checker(_) => vec![],
            Node::Concatenate(left, right) | Node::Alternate(left, right) => vec![*left, *right],
            Node::Negate(inner)
            | Node::Optional(inner)
            | Node::Repeat(inner, _)
            | Node::Span(inner)
            | Node::Capture(inner, _) => vec![*inner],
            Node::Rule(rule) => vec![rule.target],
        }
    }
}

// The builder form of an arena slot.
#[derive(Debug, Clone)]
enum Slot {
    Ready(Node),
    Declared { name: String, target: Option<NodeId> },
}

/// The mutable construction form of a pattern graph.
///
/// Nodes are appended to an arena and referenced by `NodeId`, a
/// recursive rule is created with `declare` and bound later with
/// `define`. `build` seals the arena into an immutable `Grammar`.
#[derive(Debug, Clone, Default)]
pub struct GrammarBuilder {
    slots: Vec<Slot>,
    capture_names: Vec<String>,
}

impl GrammarBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.slots.len());
        self.slots.push(Slot::Ready(node));
        id
    }

    pub fn literal(&mut self, text: &str) -> NodeId {
        self.literal_with_case(text, CaseRule::Sensitive)
    }

    pub fn literal_ignore_case(&mut self, text: &str) -> NodeId {
        self.literal_with_case(text, CaseRule::Insensitive)
    }

    pub fn literal_with_case(&mut self, text: &str, case: CaseRule) -> NodeId {
        self.push(Node::Literal(LiteralNode {
            text: text.to_owned(),
            chars: text.chars().collect(),
            case,
        }))
    }

    /// A node that matches one scalar accepted by `predicate`.
    ///
    /// `name` is used in error messages and traces.
    pub fn checker<F>(&mut self, name: &str, predicate: F) -> NodeId
    where
        F: Fn(char) -> bool + Send + Sync + 'static,
    {
        self.push(Node::Checker(CheckerNode {
            name: name.to_owned(),
            predicate: Arc::new(predicate),
        }))
    }

    pub fn preset(&mut self, class: PresetCharClass) -> NodeId {
        self.checker(&class.to_string(), move |c| class.matches(c))
    }

    pub fn char_range(&mut self, start: char, end_included: char) -> NodeId {
        let name = format!("'{}'..'{}'", start, end_included);
        self.checker(&name, move |c| (start..=end_included).contains(&c))
    }

    pub fn char_set(&mut self, chars: &[char]) -> NodeId {
        let items: Vec<String> = chars.iter().map(|c| format!("'{}'", c)).collect();
        let name = format!("[{}]", items.join(", "));
        let chars = chars.to_vec();
        self.checker(&name, move |c| chars.contains(&c))
    }

    pub fn sequence(&mut self, left: NodeId, right: NodeId) -> NodeId {
        self.push(Node::Concatenate(left, right))
    }

    /// Chain the nodes into left-nested `Concatenate` nodes.
    ///
    /// Returns `None` for an empty list.
    pub fn sequence_of(&mut self, nodes: &[NodeId]) -> Option<NodeId> {
        let (first, rest) = nodes.split_first()?;
        Some(
            rest.iter()
                .fold(*first, |left, right| self.sequence(left, *right)),
        )
    }

    pub fn choice(&mut self, left: NodeId, right: NodeId) -> NodeId {
        self.push(Node::Alternate(left, right))
    }

    /// Chain the nodes into right-nested `Alternate` nodes, which
    /// keeps the order of the alternatives.
    ///
    /// Returns `None` for an empty list.
    pub fn choice_of(&mut self, nodes: &[NodeId]) -> Option<NodeId> {
        let (last, rest) = nodes.split_last()?;
        Some(
            rest.iter()
                .rev()
                .fold(*last, |right, left| self.choice(*left, right)),
        )
    }

    pub fn negate(&mut self, inner: NodeId) -> NodeId {
        self.push(Node::Negate(inner))
    }

    pub fn optional(&mut self, inner: NodeId) -> NodeId {
        self.push(Node::Optional(inner))
    }

    pub fn repeat(&mut self, inner: NodeId, count: usize) -> Result<NodeId, PatternError> {
        if count == 0 {
            return Err(PatternError::PatternConstruction(
                "The repeat count must be greater than 0.".to_owned(),
            ));
        }

        Ok(self.push(Node::Repeat(inner, count)))
    }

    pub fn span(&mut self, inner: NodeId) -> NodeId {
        self.push(Node::Span(inner))
    }

    /// `inner` followed by zero or more `inner`.
    pub fn one_or_more(&mut self, inner: NodeId) -> NodeId {
        let rest = self.span(inner);
        self.sequence(inner, rest)
    }

    /// Capture the match of `inner` under `name`.
    ///
    /// Captures with the same name share one slot, which holds the
    /// most recent success of any of them.
    pub fn capture(&mut self, inner: NodeId, name: &str) -> (NodeId, CaptureHandle) {
        let handle = match self.capture_names.iter().position(|item| item == name) {
            Some(index) => CaptureHandle(index),
            None => {
                self.capture_names.push(name.to_owned());
                CaptureHandle(self.capture_names.len() - 1)
            }
        };

        (self.push(Node::Capture(inner, handle)), handle)
    }

    /// Create a named rule whose body is supplied later by `define`.
    ///
    /// The returned id may be used immediately, which makes
    /// self-referencing grammars possible.
    pub fn declare(&mut self, name: &str) -> NodeId {
        let id = NodeId(self.slots.len());
        self.slots.push(Slot::Declared {
            name: name.to_owned(),
            target: None,
        });
        id
    }

    /// A named rule that is defined right away.
    pub fn rule(&mut self, name: &str, target: NodeId) -> NodeId {
        self.push(Node::Rule(RuleNode {
            name: name.to_owned(),
            target,
        }))
    }

    pub fn define(&mut self, rule: NodeId, body: NodeId) -> Result<(), PatternError> {
        match self.slots.get_mut(rule.0) {
            Some(Slot::Declared { name, target }) => {
                if target.is_some() {
                    return Err(PatternError::PatternConstruction(format!(
                        "Pattern \"{}\" is already defined.",
                        name
                    )));
                }

                *target = Some(body);
                Ok(())
            }
            Some(Slot::Ready(_)) => Err(PatternError::PatternConstruction(format!(
                "Node #{} is not a declared pattern.",
                rule.0
            ))),
            None => Err(PatternError::PatternConstruction(format!(
                "Node #{} does not belong to this builder.",
                rule.0
            ))),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Seal the arena into an immutable `Grammar` whose entry is `root`.
    pub fn build(self, root: NodeId) -> Result<Grammar, PatternError> {
        let len = self.slots.len();
        let check = |id: NodeId| {
            if id.0 < len {
                Ok(())
            } else {
                Err(PatternError::PatternConstruction(format!(
                    "Node #{} does not belong to this grammar.",
                    id.0
                )))
            }
        };

        check(root)?;

        let mut nodes = Vec::with_capacity(len);
        for (index, slot) in self.slots.into_iter().enumerate() {
            let node = match slot {
                Slot::Ready(node) => node,
                Slot::Declared {
                    name,
                    target: Some(target),
                } => Node::Rule(RuleNode { name, target }),
                Slot::Declared { name, target: None } => {
                    return Err(PatternError::PatternUndefined(name));
                }
            };

            // nodes are only appended, so any node other than a rule
            // refers to nodes created before it
            let is_rule = matches!(node, Node::Rule(_));
            for child in node.children() {
                check(child)?;

                if !is_rule && child.0 >= index {
                    return Err(PatternError::PatternConstruction(format!(
                        "Node #{} refers to node #{}, which does not precede it.",
                        index, child.0
                    )));
                }
            }

            nodes.push(node);
        }

        Ok(Grammar {
            nodes,
            root,
            capture_names: self.capture_names,
            config: ProcessConfig::default(),
        })
    }
}

/// An immutable, sealed pattern graph.
///
/// A `Grammar` can be shared between threads and evaluated
/// concurrently, each process owns its own `Source`.
#[derive(Debug, Clone)]
pub struct Grammar {
    nodes: Vec<Node>,
    root: NodeId,
    capture_names: Vec<String>,
    config: ProcessConfig,
}

impl Grammar {
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub(crate) fn node_unchecked(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// The ids of all nodes, in the order they were created.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId)
    }

    pub fn capture_names(&self) -> &[String] {
        &self.capture_names
    }

    pub fn capture_name(&self, handle: CaptureHandle) -> Option<&str> {
        self.capture_names.get(handle.0).map(|s| s.as_str())
    }

    pub fn capture_handle(&self, name: &str) -> Option<CaptureHandle> {
        self.capture_names
            .iter()
            .position(|item| item == name)
            .map(CaptureHandle)
    }

    pub fn config(&self) -> ProcessConfig {
        self.config
    }

    pub fn with_config(mut self, config: ProcessConfig) -> Self {
        self.config = config;
        self
    }

    /// The same graph entered at another node.
    pub fn with_root(mut self, root: NodeId) -> Result<Self, PatternError> {
        if root.0 >= self.nodes.len() {
            return Err(PatternError::PatternConstruction(format!(
                "Node #{} does not belong to this grammar.",
                root.0
            )));
        }

        self.root = root;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::{error::PatternError, process::ProcessConfig};

    use super::{GrammarBuilder, Node, NodeId};

    #[test]
    fn test_build() {
        let mut builder = GrammarBuilder::new();
        let he = builder.literal("he");
        let llo = builder.literal("llo");
        let hello = builder.sequence(he, llo);
        assert_eq!(builder.len(), 3);

        let grammar = builder.build(hello).unwrap();
        assert_eq!(grammar.root(), hello);
        assert!(matches!(grammar.node(hello), Some(Node::Concatenate(l, r)) if *l == he && *r == llo));
        assert!(grammar.node(NodeId(3)).is_none());
        assert_eq!(grammar.config(), ProcessConfig::default());
    }

    #[test]
    fn test_repeat_count_zero() {
        let mut builder = GrammarBuilder::new();
        let dot = builder.literal(".");
        assert!(matches!(
            builder.repeat(dot, 0),
            Err(PatternError::PatternConstruction(_))
        ));
        assert!(builder.repeat(dot, 1).is_ok());
    }

    #[test]
    fn test_forward_declaration() {
        // list = "a" then (", " then list)?
        let mut builder = GrammarBuilder::new();
        let list = builder.declare("list");
        let a = builder.literal("a");
        let comma = builder.literal(", ");
        let tail = builder.sequence(comma, list);
        let optional_tail = builder.optional(tail);
        let body = builder.sequence(a, optional_tail);
        builder.define(list, body).unwrap();

        let grammar = builder.build(list).unwrap();
        match grammar.node(list) {
            Some(Node::Rule(rule)) => {
                assert_eq!(rule.name, "list");
                assert_eq!(rule.target, body);
            }
            _ => panic!("expect a rule node"),
        }
    }

    #[test]
    fn test_undefined_declaration() {
        let mut builder = GrammarBuilder::new();
        let value = builder.declare("value");
        let x = builder.literal("x");
        let root = builder.sequence(x, value);

        assert_eq!(
            builder.build(root).unwrap_err(),
            PatternError::PatternUndefined("value".to_owned())
        );
    }

    #[test]
    fn test_define_errors() {
        let mut builder = GrammarBuilder::new();
        let rule = builder.declare("rule");
        let x = builder.literal("x");

        builder.define(rule, x).unwrap();
        assert!(matches!(
            builder.define(rule, x),
            Err(PatternError::PatternConstruction(_))
        ));
        assert!(matches!(
            builder.define(x, x),
            Err(PatternError::PatternConstruction(_))
        ));
        assert!(matches!(
            builder.define(NodeId(99), x),
            Err(PatternError::PatternConstruction(_))
        ));
    }

    #[test]
    fn test_foreign_node() {
        let mut other = GrammarBuilder::new();
        for _ in 0..5 {
            other.literal("z");
        }
        let foreign = other.literal("z");

        let mut builder = GrammarBuilder::new();
        let a = builder.literal("a");
        let root = builder.sequence(a, foreign);
        assert!(matches!(
            builder.build(root),
            Err(PatternError::PatternConstruction(_))
        ));

        // a foreign id that happens to name the node itself
        let mut other = GrammarBuilder::new();
        other.literal("a");
        let foreign = other.literal("b");

        let mut builder = GrammarBuilder::new();
        let a = builder.literal("a");
        let optional = builder.optional(foreign);
        assert_eq!(optional, foreign);
        let root = builder.sequence(a, optional);
        assert_eq!(
            builder.build(root).unwrap_err(),
            PatternError::PatternConstruction(
                "Node #1 refers to node #1, which does not precede it.".to_owned()
            )
        );

        // a foreign id that names a later node
        let mut builder = GrammarBuilder::new();
        let negate = builder.negate(NodeId(1));
        let b = builder.literal("b");
        let root = builder.sequence(negate, b);
        assert!(matches!(
            builder.build(root),
            Err(PatternError::PatternConstruction(_))
        ));

        // only a rule may refer forward
        let mut builder = GrammarBuilder::new();
        let rule = builder.rule("later", NodeId(1));
        builder.literal("later");
        let grammar = builder.build(rule).unwrap();
        assert!(grammar.is_match("later"));
    }

    #[test]
    fn test_captures_and_lists() {
        let mut builder = GrammarBuilder::new();
        let a = builder.literal("a");
        let b = builder.literal("b");
        let c = builder.literal("c");
        let (word, handle) = builder.capture(a, "word");
        let seq = builder.sequence_of(&[word, b, c]).unwrap();
        let alt = builder.choice_of(&[a, b, c]).unwrap();
        assert!(builder.sequence_of(&[]).is_none());

        let grammar = builder.build(seq).unwrap();
        assert_eq!(grammar.capture_handle("word"), Some(handle));
        assert_eq!(grammar.capture_name(handle), Some("word"));
        assert_eq!(grammar.capture_handle("nothing"), None);

        // ("a" or ("b" or "c"))
        match grammar.node(alt) {
            Some(Node::Alternate(left, right)) => {
                assert_eq!(*left, a);
                assert!(matches!(grammar.node(*right), Some(Node::Alternate(l, r)) if *l == b && *r == c));
            }
            _ => panic!("expect an alternate node"),
        }

        let grammar = grammar.with_root(alt).unwrap();
        assert_eq!(grammar.root(), alt);
        assert!(grammar.with_root(NodeId(100)).is_err());
    }

    #[test]
    fn test_duplicate_capture_names() {
        // key = ("k" then "1") or ("k" then "2")
        let mut builder = GrammarBuilder::new();
        let k = builder.literal("k");
        let one = builder.literal("1");
        let two = builder.literal("2");
        let (first, first_handle) = builder.capture(one, "digit");
        let (second, second_handle) = builder.capture(two, "digit");
        let (_, other_handle) = builder.capture(k, "key");
        assert_eq!(first_handle, second_handle);
        assert_ne!(first_handle, other_handle);

        let left = builder.sequence(k, first);
        let right = builder.sequence(k, second);
        let root = builder.choice(left, right);
        let grammar = builder.build(root).unwrap();
        assert_eq!(grammar.capture_names(), &["digit".to_owned(), "key".to_owned()]);

        let outcome = grammar.parse("k2");
        let by_handle = grammar
            .capture_handle("digit")
            .and_then(|handle| outcome.capture(handle));
        assert_eq!(by_handle.map(|m| m.as_str()), Some("2"));
        assert_eq!(by_handle, outcome.capture_by_name("digit"));
    }

    #[test]
    fn test_grammar_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<super::Grammar>();
    }
}
