//! The closed tagged union of IR operations ([`Data`]) and the [`Node`]
//! that pairs a payload with a result type, a source span, and the block
//! that owns it.

use bract_ir_utils::Span;

use crate::{
    index::{BlockIndex, GlobalIdx, LocalIdx, NodeIndex, StringIdx},
    ops::{BinaryOp, UnaryOp},
    types::TypeIndex,
};

/// One source of a [`Data::Phi`] node: the value flows in from `block`
/// carrying the result of `value`.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct PhiSource {
    pub block: BlockIndex,
    pub value: NodeIndex,
}

/// A field access offset pair shared by every struct-field variant.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct FieldRef {
    pub field_idx: u32,
    pub offset: u32,
}

/// The payload of a [`Node`]. This is a closed sum: every IR operation the
/// builder can emit has exactly one variant here, and each variant carries
/// exactly the fields that operation needs. Matching on `Data` is
/// exhaustive everywhere in this crate (no catch-all arms), so adding a
/// variant is a compile error at every site that needs updating.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Data {
    // --- Constants -----------------------------------------------------
    ConstInt(i64),
    ConstFloat(u64), // bit pattern of an f64; avoids a non-Eq payload.
    ConstBool(bool),
    ConstNull,
    ConstSlice(StringIdx),

    // --- Variable access -------------------------------------------------
    LocalRef(LocalIdx),
    GlobalRef(GlobalIdx, Box<str>),
    AddrLocal(LocalIdx),
    LoadLocal(LocalIdx),
    StoreLocal(LocalIdx, NodeIndex),

    // --- Binary / unary --------------------------------------------------
    Binary(BinaryOp, NodeIndex, NodeIndex),
    Unary(UnaryOp, NodeIndex),

    // --- Struct access -----------------------------------------------------
    FieldLocal { local: LocalIdx, field: FieldRef },
    StoreLocalField { local: LocalIdx, field: FieldRef, value: NodeIndex },
    StoreField { base: NodeIndex, field: FieldRef, value: NodeIndex },
    FieldValue { base: NodeIndex, field: FieldRef },

    // --- Array / slice -----------------------------------------------------
    IndexLocal { local: LocalIdx, index: NodeIndex, elem_size: u32 },
    IndexValue { base: NodeIndex, index: NodeIndex, elem_size: u32 },
    StoreIndexLocal { local: LocalIdx, index: NodeIndex, elem_size: u32, value: NodeIndex },
    StoreIndexValue { base: NodeIndex, index: NodeIndex, elem_size: u32, value: NodeIndex },
    SliceLocal { local: LocalIdx, elem_size: u32, start: Option<NodeIndex>, end: Option<NodeIndex> },
    SliceValue { base: NodeIndex, elem_size: u32, start: Option<NodeIndex>, end: Option<NodeIndex> },

    // --- Pointer -----------------------------------------------------------
    PtrLoad(LocalIdx),
    PtrStore(LocalIdx, NodeIndex),
    PtrField { local: LocalIdx, field: FieldRef },
    PtrFieldStore { local: LocalIdx, field: FieldRef, value: NodeIndex },
    PtrLoadValue(NodeIndex),
    PtrStoreValue(NodeIndex, NodeIndex),
    AddrOffset { base: NodeIndex, offset: i64 },
    AddrIndex { base: NodeIndex, index: NodeIndex, elem_size: u32 },

    // --- Control flow --------------------------------------------------
    Call { name: Box<str>, args: Box<[NodeIndex]>, is_builtin: bool },
    Ret(Option<NodeIndex>),
    Jump(BlockIndex),
    Branch { cond: NodeIndex, then_block: BlockIndex, else_block: BlockIndex },
    Phi(Box<[PhiSource]>),
    Select { cond: NodeIndex, then_value: NodeIndex, else_value: NodeIndex },

    // --- Conversion ------------------------------------------------------
    Convert { operand: NodeIndex, from_type: TypeIndex, to_type: TypeIndex },

    // --- Containers: list --------------------------------------------------
    ListNew,
    ListPush { list: NodeIndex, value: NodeIndex },
    ListGet { list: NodeIndex, index: NodeIndex },
    ListSet { list: NodeIndex, index: NodeIndex, value: NodeIndex },
    ListLen(NodeIndex),
    ListFree(NodeIndex),

    // --- Containers: map -----------------------------------------------
    MapNew,
    MapSet { map: NodeIndex, key: NodeIndex, value: NodeIndex },
    MapGet { map: NodeIndex, key: NodeIndex },
    MapHas { map: NodeIndex, key: NodeIndex },
    MapFree(NodeIndex),

    // --- String ----------------------------------------------------------
    StrConcat(NodeIndex, NodeIndex),

    // --- Union (sum type) --------------------------------------------------
    UnionInit { variant_idx: u32, payload: Option<NodeIndex> },
    UnionTag(NodeIndex),
    UnionPayload { variant_idx: u32, value: NodeIndex },

    // --- Misc --------------------------------------------------------------
    Nop,
}

impl Data {
    /// True for `ret`, `jump`, `branch` — the only operations that end a
    /// block.
    pub fn is_terminator(&self) -> bool {
        matches!(self, Data::Ret(_) | Data::Jump(_) | Data::Branch { .. })
    }

    /// True for every operation whose effect is observable beyond
    /// producing its result value: stores of any kind, calls,
    /// terminators, and mutating container operations.
    pub fn has_side_effects(&self) -> bool {
        use Data::*;
        match self {
            StoreLocal(..)
            | StoreLocalField { .. }
            | StoreField { .. }
            | StoreIndexLocal { .. }
            | StoreIndexValue { .. }
            | PtrStore(..)
            | PtrFieldStore { .. }
            | PtrStoreValue(..)
            | Call { .. }
            | Ret(_)
            | Jump(_)
            | Branch { .. }
            | ListNew
            | ListPush { .. }
            | ListSet { .. }
            | ListFree(_)
            | MapNew
            | MapSet { .. }
            | MapFree(_) => true,

            ConstInt(_)
            | ConstFloat(_)
            | ConstBool(_)
            | ConstNull
            | ConstSlice(_)
            | LocalRef(_)
            | GlobalRef(..)
            | AddrLocal(_)
            | LoadLocal(_)
            | Binary(..)
            | Unary(..)
            | FieldLocal { .. }
            | FieldValue { .. }
            | IndexLocal { .. }
            | IndexValue { .. }
            | SliceLocal { .. }
            | SliceValue { .. }
            | PtrLoad(_)
            | PtrField { .. }
            | PtrLoadValue(_)
            | AddrOffset { .. }
            | AddrIndex { .. }
            | Phi(_)
            | Select { .. }
            | Convert { .. }
            | ListGet { .. }
            | ListLen(_)
            | MapGet { .. }
            | MapHas { .. }
            | StrConcat(..)
            | UnionInit { .. }
            | UnionTag(_)
            | UnionPayload { .. }
            | Nop => false,
        }
    }

    /// True for the five constant variants.
    pub fn is_constant(&self) -> bool {
        matches!(self, Data::ConstInt(_) | Data::ConstFloat(_) | Data::ConstBool(_) | Data::ConstNull | Data::ConstSlice(_))
    }

    /// Visit every [`NodeIndex`] this payload references, in a fixed,
    /// deterministic order. Used by the verifier to check use-before-def
    /// and by the debug formatter to list operands.
    pub fn for_each_node_ref(&self, mut visit: impl FnMut(NodeIndex)) {
        use Data::*;
        match self {
            ConstInt(_) | ConstFloat(_) | ConstBool(_) | ConstNull | ConstSlice(_) => {}
            LocalRef(_) | GlobalRef(..) | AddrLocal(_) | LoadLocal(_) => {}
            StoreLocal(_, v) => visit(*v),
            Binary(_, a, b) => {
                visit(*a);
                visit(*b);
            }
            Unary(_, a) => visit(*a),
            FieldLocal { .. } => {}
            StoreLocalField { value, .. } => visit(*value),
            StoreField { base, value, .. } => {
                visit(*base);
                visit(*value);
            }
            FieldValue { base, .. } => visit(*base),
            IndexLocal { index, .. } => visit(*index),
            IndexValue { base, index, .. } => {
                visit(*base);
                visit(*index);
            }
            StoreIndexLocal { index, value, .. } => {
                visit(*index);
                visit(*value);
            }
            StoreIndexValue { base, index, value, .. } => {
                visit(*base);
                visit(*index);
                visit(*value);
            }
            SliceLocal { start, end, .. } => {
                if let Some(s) = start {
                    visit(*s);
                }
                if let Some(e) = end {
                    visit(*e);
                }
            }
            SliceValue { base, start, end, .. } => {
                visit(*base);
                if let Some(s) = start {
                    visit(*s);
                }
                if let Some(e) = end {
                    visit(*e);
                }
            }
            PtrLoad(_) => {}
            PtrStore(_, v) => visit(*v),
            PtrField { .. } => {}
            PtrFieldStore { value, .. } => visit(*value),
            PtrLoadValue(p) => visit(*p),
            PtrStoreValue(p, v) => {
                visit(*p);
                visit(*v);
            }
            AddrOffset { base, .. } => visit(*base),
            AddrIndex { base, index, .. } => {
                visit(*base);
                visit(*index);
            }
            Call { args, .. } => {
                for a in args.iter() {
                    visit(*a);
                }
            }
            Ret(v) => {
                if let Some(v) = v {
                    visit(*v);
                }
            }
            Jump(_) => {}
            Branch { cond, .. } => visit(*cond),
            Phi(sources) => {
                for s in sources.iter() {
                    visit(s.value);
                }
            }
            Select { cond, then_value, else_value } => {
                visit(*cond);
                visit(*then_value);
                visit(*else_value);
            }
            Convert { operand, .. } => visit(*operand),
            ListNew | MapNew => {}
            ListPush { list, value } => {
                visit(*list);
                visit(*value);
            }
            ListGet { list, index } => {
                visit(*list);
                visit(*index);
            }
            ListSet { list, index, value } => {
                visit(*list);
                visit(*index);
                visit(*value);
            }
            ListLen(l) => visit(*l),
            ListFree(l) => visit(*l),
            MapSet { map, key, value } => {
                visit(*map);
                visit(*key);
                visit(*value);
            }
            MapGet { map, key } => {
                visit(*map);
                visit(*key);
            }
            MapHas { map, key } => {
                visit(*map);
                visit(*key);
            }
            MapFree(m) => visit(*m),
            StrConcat(a, b) => {
                visit(*a);
                visit(*b);
            }
            UnionInit { payload, .. } => {
                if let Some(p) = payload {
                    visit(*p);
                }
            }
            UnionTag(v) => visit(*v),
            UnionPayload { value, .. } => visit(*value),
            Nop => {}
        }
    }

    /// Visit every [`LocalIdx`] this payload references.
    pub fn for_each_local_ref(&self, mut visit: impl FnMut(LocalIdx)) {
        use Data::*;
        match self {
            LocalRef(l) | AddrLocal(l) | LoadLocal(l) | PtrLoad(l) => visit(*l),
            StoreLocal(l, _) | PtrStore(l, _) => visit(*l),
            FieldLocal { local, .. }
            | StoreLocalField { local, .. }
            | PtrField { local, .. }
            | PtrFieldStore { local, .. }
            | IndexLocal { local, .. }
            | StoreIndexLocal { local, .. }
            | SliceLocal { local, .. } => visit(*local),
            _ => {}
        }
    }

    /// Visit every [`BlockIndex`] this payload references.
    pub fn for_each_block_ref(&self, mut visit: impl FnMut(BlockIndex)) {
        use Data::*;
        match self {
            Jump(b) => visit(*b),
            Branch { then_block, else_block, .. } => {
                visit(*then_block);
                visit(*else_block);
            }
            Phi(sources) => {
                for s in sources.iter() {
                    visit(s.block);
                }
            }
            _ => {}
        }
    }

    /// Visit every [`StringIdx`] this payload references.
    pub fn for_each_string_ref(&self, mut visit: impl FnMut(StringIdx)) {
        if let Data::ConstSlice(s) = self {
            visit(*s);
        }
    }
}

/// A single emitted IR operation: a [`Data`] payload plus the result type,
/// source span, and owning block it was emitted with.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Node {
    pub data: Data,
    pub result_ty: TypeIndex,
    pub span: Span,
    pub block: BlockIndex,
}

impl Node {
    pub fn is_terminator(&self) -> bool {
        self.data.is_terminator()
    }

    pub fn has_side_effects(&self) -> bool {
        self.data.has_side_effects()
    }

    pub fn is_constant(&self) -> bool {
        self.data.is_constant()
    }
}
