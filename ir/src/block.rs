//! Basic blocks: an ordered sequence of node handles plus the predecessor
//! and successor edges discovered from the block's terminator.

use crate::index::{BlockIndex, NodeIndex};

/// A single basic block. Well-formed blocks end in exactly one
/// terminator; the builder does not enforce this as it emits (see
/// [`crate::verify`] for the pass that checks it after the fact).
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Block {
    /// Handles of the nodes that belong to this block, in emission order.
    pub nodes: Vec<NodeIndex>,
    /// Blocks whose terminator can transfer control here.
    pub predecessors: Vec<BlockIndex>,
    /// Blocks this block's terminator can transfer control to.
    pub successors: Vec<BlockIndex>,
    /// Empty for unnamed blocks.
    pub label: String,
}

impl Block {
    pub fn new(label: impl Into<String>) -> Self {
        Self { nodes: Vec::new(), predecessors: Vec::new(), successors: Vec::new(), label: label.into() }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn last_node(&self) -> Option<NodeIndex> {
        self.nodes.last().copied()
    }
}
