//! Arena-allocated parse tree.
//!
//! Nodes live in one vector and refer to each other by [`NodeId`]. Children
//! are appended in the order the parser entered rules and consumed tokens,
//! recovery included, so the shape mirrors the run exactly.

use crate::token::{Token, escape_whitespace};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Rule {
        name: String,
        /// Label name to child index, in binding order.
        labels: Vec<(String, usize)>,
    },
    Terminal(Token),
    /// A token consumed by recovery, or one conjured by single-token insertion.
    Error { token: Token, conjured: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTree {
    nodes: Vec<Node>,
}

impl ParseTree {
    /// A tree whose root is a rule node named `root`.
    pub(crate) fn new(root: &str) -> Self {
        let mut tree = Self { nodes: Vec::new() };
        tree.push(
            NodeKind::Rule {
                name: root.to_owned(),
                labels: Vec::new(),
            },
            None,
        );
        tree
    }

    fn push(&mut self, kind: NodeKind, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            kind,
            parent,
            children: Vec::new(),
        });
        if let Some(parent) = parent {
            self.nodes[parent.index()].children.push(id);
        }
        id
    }

    pub(crate) fn add_rule(&mut self, parent: NodeId, name: &str) -> NodeId {
        let kind = NodeKind::Rule {
            name: name.to_owned(),
            labels: Vec::new(),
        };
        self.push(kind, Some(parent))
    }

    pub(crate) fn add_terminal(&mut self, parent: NodeId, token: Token) -> NodeId {
        self.push(NodeKind::Terminal(token), Some(parent))
    }

    pub(crate) fn add_error(&mut self, parent: NodeId, token: Token, conjured: bool) -> NodeId {
        self.push(NodeKind::Error { token, conjured }, Some(parent))
    }

    /// Bind `label` in `node` to the child `child`.
    pub(crate) fn bind_label(&mut self, node: NodeId, label: &str, child: NodeId) {
        let Some(index) = self.children(node).iter().position(|&c| c == child) else {
            return;
        };
        if let NodeKind::Rule { labels, .. } = &mut self.nodes[node.index()].kind {
            labels.push((label.to_owned(), index));
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.node(id).kind
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn rule_name(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            NodeKind::Rule { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Token of a terminal or error node.
    pub fn token(&self, id: NodeId) -> Option<&Token> {
        match self.kind(id) {
            NodeKind::Terminal(token) | NodeKind::Error { token, .. } => Some(token),
            NodeKind::Rule { .. } => None,
        }
    }

    pub fn is_error(&self, id: NodeId) -> bool {
        matches!(self.kind(id), NodeKind::Error { .. })
    }

    /// Child bound to `label`. A label bound more than once yields the last binding.
    pub fn label(&self, id: NodeId, label: &str) -> Option<NodeId> {
        self.labels(id, label).last().copied()
    }

    /// Every child bound to `label`, in binding order.
    pub fn labels(&self, id: NodeId, label: &str) -> Vec<NodeId> {
        let NodeKind::Rule { labels, .. } = self.kind(id) else {
            return Vec::new();
        };
        labels
            .iter()
            .filter(|(name, _)| name == label)
            .map(|&(_, index)| self.children(id)[index])
            .collect()
    }

    /// Concatenated text of all tokens under `id`, left to right.
    ///
    /// Tokens discarded by recovery are included; conjured ones are not.
    pub fn text(&self, id: NodeId) -> String {
        let mut out = String::new();
        for node in self.preorder_from(id) {
            match self.kind(node) {
                NodeKind::Terminal(token) => out.push_str(&token.text),
                NodeKind::Error {
                    token,
                    conjured: false,
                } => out.push_str(&token.text),
                _ => {}
            }
        }
        out
    }

    /// Rule names from `id` up to the root, innermost first.
    pub fn rule_invocation_stack(&self, id: NodeId) -> Vec<&str> {
        let mut stack = Vec::new();
        let mut current = Some(id);
        while let Some(node) = current {
            if let Some(name) = self.rule_name(node) {
                stack.push(name);
            }
            current = self.parent(node);
        }
        stack
    }

    /// Nodes in document order.
    pub fn preorder(&self) -> Vec<NodeId> {
        self.preorder_from(self.root())
    }

    pub fn preorder_from(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(node).iter().rev());
        }
        out
    }

    pub fn error_nodes(&self) -> Vec<NodeId> {
        self.preorder()
            .into_iter()
            .filter(|&id| self.is_error(id))
            .collect()
    }

    /// Lisp-style rendering: `(a x (b y) z)`. A rule without children
    /// renders as its bare name.
    pub fn to_string_tree(&self) -> String {
        self.to_string_tree_at(self.root())
    }

    pub fn to_string_tree_at(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_tree(id, &mut out);
        out
    }

    fn write_tree(&self, id: NodeId, out: &mut String) {
        let children = self.children(id);
        if children.is_empty() {
            out.push_str(&self.node_text(id));
            return;
        }
        out.push('(');
        out.push_str(&self.node_text(id));
        for &child in children {
            out.push(' ');
            self.write_tree(child, out);
        }
        out.push(')');
    }

    fn node_text(&self, id: NodeId) -> String {
        match self.kind(id) {
            NodeKind::Rule { name, .. } => name.clone(),
            NodeKind::Terminal(token) => escape_whitespace(&token.text),
            NodeKind::Error { token, conjured } => {
                if *conjured {
                    token.text.clone()
                } else {
                    escape_whitespace(&token.text)
                }
            }
        }
    }
}

impl std::fmt::Display for ParseTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_string_tree())
    }
}
