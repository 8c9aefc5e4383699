//! Nested element tree adapter
//!
//! Text nodes are the leaves. Each one is identified by its child-index
//! path from the root ("0", "0.2", "0.2.1", ...). Text under `script`,
//! `style` and existing `mark` elements is not content and is skipped, which
//! also keeps a second pass from marking text twice.

use anchor_engine::{AnchorError, FragmentSink, LeafSource};
use serde::{Deserialize, Serialize};
use shared_types::{Fragment, LeafFragments, LeafSegment, MatchKind};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

/// Elements whose text never takes part in anchoring
pub const SKIPPED_TAGS: &[&str] = &["script", "style", "mark"];

const ROOT_PATH: &str = "0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Text(String),
    Element {
        tag: String,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        attrs: BTreeMap<String, String>,
        #[serde(default)]
        children: Vec<Node>,
    },
}

impl Node {
    pub fn element(tag: &str, children: Vec<Node>) -> Self {
        Node::Element {
            tag: tag.to_string(),
            attrs: BTreeMap::new(),
            children,
        }
    }

    pub fn text(text: &str) -> Self {
        Node::Text(text.to_string())
    }
}

#[derive(Error, Debug)]
pub enum TreeError {
    #[error(transparent)]
    Anchor(#[from] AnchorError),

    #[error("Leaf {0} no longer matches the tree it was taken from")]
    StaleLeaf(String),

    #[error("Leaf {0} was not found in the tree")]
    MissingLeaf(String),
}

fn is_skipped(tag: &str) -> bool {
    SKIPPED_TAGS.iter().any(|t| t.eq_ignore_ascii_case(tag))
}

/// Owned leaf snapshot of a tree.
#[derive(Debug, Clone)]
pub struct TreeSource {
    leaves: Vec<LeafSegment>,
}

impl TreeSource {
    pub fn snapshot(root: &Node) -> Self {
        let mut leaves = Vec::new();
        collect(root, ROOT_PATH.to_string(), &mut leaves);
        Self { leaves }
    }
}

fn collect(node: &Node, path: String, leaves: &mut Vec<LeafSegment>) {
    match node {
        Node::Text(text) => {
            let position = leaves.len();
            leaves.push(LeafSegment::new(path, text.as_str(), position));
        }
        Node::Element { tag, children, .. } => {
            if is_skipped(tag) {
                return;
            }
            for (i, child) in children.iter().enumerate() {
                collect(child, format!("{}.{}", path, i), leaves);
            }
        }
    }
}

impl LeafSource for TreeSource {
    fn leaves(&self) -> Vec<LeafSegment> {
        self.leaves.clone()
    }
}

/// Writes marked fragments back into a tree, replacing each marked text
/// node with its plain text pieces and `mark` elements.
pub struct TreeSink<'a> {
    root: &'a mut Node,
}

impl<'a> TreeSink<'a> {
    pub fn new(root: &'a mut Node) -> Self {
        Self { root }
    }
}

impl FragmentSink for TreeSink<'_> {
    type Error = TreeError;

    fn apply(&mut self, fragments: &[LeafFragments]) -> Result<(), TreeError> {
        let mut pending: HashMap<&str, &LeafFragments> = fragments
            .iter()
            .filter(|leaf| leaf.has_marks())
            .map(|leaf| (leaf.leaf_id.as_str(), leaf))
            .collect();

        if let Node::Text(text) = &*self.root {
            // A bare text root becomes a span so it can hold several nodes
            if let Some(leaf) = pending.remove(ROOT_PATH) {
                if leaf.text() != *text {
                    return Err(TreeError::StaleLeaf(ROOT_PATH.to_string()));
                }
                *self.root = Node::element("span", fragment_nodes(leaf));
            }
        } else {
            replace_marked(self.root, ROOT_PATH, &mut pending)?;
        }

        // Report the smallest leftover id so the error is stable
        match pending.keys().min() {
            Some(id) => Err(TreeError::MissingLeaf(id.to_string())),
            None => Ok(()),
        }
    }
}

fn replace_marked(
    node: &mut Node,
    path: &str,
    pending: &mut HashMap<&str, &LeafFragments>,
) -> Result<(), TreeError> {
    let children = match node {
        Node::Element { tag, children, .. } if !is_skipped(tag.as_str()) => children,
        _ => return Ok(()),
    };

    let original = std::mem::take(children);
    for (i, child) in original.into_iter().enumerate() {
        let child_path = format!("{}.{}", path, i);
        match child {
            Node::Text(text) => match pending.remove(child_path.as_str()) {
                Some(leaf) => {
                    if leaf.text() != text {
                        return Err(TreeError::StaleLeaf(child_path));
                    }
                    children.extend(fragment_nodes(leaf));
                }
                None => children.push(Node::Text(text)),
            },
            mut element => {
                replace_marked(&mut element, &child_path, pending)?;
                children.push(element);
            }
        }
    }
    Ok(())
}

/// Nodes standing in for one leaf's fragments.
pub fn fragment_nodes(leaf: &LeafFragments) -> Vec<Node> {
    leaf.fragments.iter().map(fragment_node).collect()
}

fn fragment_node(fragment: &Fragment) -> Node {
    match fragment {
        Fragment::Plain { text } => Node::Text(text.clone()),
        Fragment::Marked {
            text,
            leaf_id,
            local_start,
            local_end,
            category,
            explanation,
            kind,
            quotation,
        } => {
            let match_kind = match kind {
                MatchKind::Exact => "exact",
                MatchKind::PrefixFallback => "prefix-fallback",
            };
            let attrs = BTreeMap::from([
                ("data-category".to_string(), category.clone()),
                ("data-explanation".to_string(), explanation.clone()),
                ("data-leaf".to_string(), leaf_id.to_string()),
                ("data-start".to_string(), local_start.to_string()),
                ("data-end".to_string(), local_end.to_string()),
                ("data-match".to_string(), match_kind.to_string()),
                ("data-quotation".to_string(), quotation.to_string()),
            ]);
            Node::Element {
                tag: "mark".to_string(),
                attrs,
                children: vec![Node::Text(text.clone())],
            }
        }
    }
}

/// Serialize a tree as escaped markup.
pub fn render_markup(node: &Node) -> String {
    let mut out = String::new();
    render_into(node, &mut out);
    out
}

fn render_into(node: &Node, out: &mut String) {
    match node {
        Node::Text(text) => escape_into(text, out),
        Node::Element {
            tag,
            attrs,
            children,
        } => {
            out.push('<');
            out.push_str(tag);
            for (name, value) in attrs {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                escape_into(value, out);
                out.push('"');
            }
            out.push('>');
            for child in children {
                render_into(child, out);
            }
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
    }
}

fn escape_into(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}
