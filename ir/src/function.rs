//! [`Function`]: the immutable artifact produced by
//! [`crate::builder::FunctionBuilder::build`].

use bract_ir_utils::Span;
use index_vec::IndexVec;

use crate::{
    block::Block,
    index::{BlockIndex, LocalIdx, NodeIndex},
    local::Local,
    node::Node,
    types::TypeIndex,
};

/// A fully built function. Every slice here is owned and, once a `Function`
/// exists, immutable: all further mutation happens through a fresh
/// [`crate::builder::FunctionBuilder`] that produces a new `Function`, never
/// through this one.
#[derive(Debug, Clone)]
pub struct Function {
    pub name: String,
    pub fn_ty: TypeIndex,
    pub return_ty: TypeIndex,
    /// Indices into `locals` for every local with `is_param = true`, in
    /// parameter order. A view, not a separate owning collection — the
    /// locals themselves still live in `locals`.
    pub params: Vec<LocalIdx>,
    pub locals: IndexVec<LocalIdx, Local>,
    pub blocks: IndexVec<BlockIndex, Block>,
    pub nodes: IndexVec<NodeIndex, Node>,
    /// Always `0`; kept as an explicit field (rather than a bare constant)
    /// so call sites read as "the function's entry block" and not "block
    /// zero, which happens to be the entry".
    pub entry_block: BlockIndex,
    pub span: Span,
    /// Computed by the stack-frame layout algorithm at `build()`.
    pub frame_size: u32,
    pub string_literals: Vec<Box<str>>,
}

impl Function {
    /// The node at `idx`.
    pub fn node(&self, idx: NodeIndex) -> &Node {
        &self.nodes[idx]
    }

    /// The local at `idx`, including parameters.
    pub fn local(&self, idx: LocalIdx) -> &Local {
        &self.locals[idx]
    }

    /// The block at `idx`.
    pub fn block(&self, idx: BlockIndex) -> &Block {
        &self.blocks[idx]
    }

    pub fn entry(&self) -> &Block {
        &self.blocks[self.entry_block]
    }

    /// The string literal at `idx`, as stored by `addStringLiteral`.
    pub fn string_literal(&self, idx: crate::index::StringIdx) -> &str {
        &self.string_literals[idx.raw() as usize]
    }
}
