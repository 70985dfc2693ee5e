//! A read-only verifier pass over a built [`Function`] (and, transitively,
//! an [`Ir`] program), checking the ten invariant classes of §8. This is
//! the separate verifier the base spec repeatedly invites (§4.4, §9, the
//! Open Question) but never specifies the shape of; it is not run
//! automatically by `build()`/`get_ir()` — construction and validation stay
//! separable, per the spec's design stance (§7).

use std::fmt;

use crate::{
    function::Function,
    index::{BlockIndex, LocalIdx, NodeIndex, StringIdx},
    program::Ir,
    types::TypeIndex,
};

/// One violated invariant instance. Every variant carries enough context
/// (which node, which local, …) to locate the problem without re-walking
/// the function.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum VerifyError {
    /// `node.block` names a block index past the end of `function.blocks`.
    OwningBlockOutOfRange { node: NodeIndex, block: BlockIndex },
    /// `node.block` is in range, but that block's node list does not
    /// contain `node`.
    NodeMissingFromBlock { node: NodeIndex, block: BlockIndex },
    /// A payload referenced a `NodeIndex` that was not emitted earlier in
    /// the same function's node pool.
    UseBeforeDef { node: NodeIndex, used: NodeIndex },
    /// A payload referenced a `LocalIdx` past the end of `function.locals`.
    DanglingLocalIdx { node: NodeIndex, local: LocalIdx },
    /// A payload referenced a `BlockIndex` past the end of `function.blocks`.
    DanglingBlockIndex { node: NodeIndex, block: BlockIndex },
    /// A `const_slice` referenced a `StringIdx` past the end of the
    /// function's string literal table.
    DanglingStringIdx { node: NodeIndex, string: StringIdx },
    /// `function.blocks` is empty, so there is no entry block.
    MissingEntryBlock,
    /// A block's node list contains more than one terminator.
    MultipleTerminators { block: BlockIndex },
    /// A block has a terminator, but it is not the last node.
    TerminatorNotLast { block: BlockIndex },
    /// A block's recorded `successors` does not match what its terminator
    /// implies (`{t}` for jump, `{then, else}` for branch, `{}` for ret).
    SuccessorMismatch { block: BlockIndex, expected: Vec<BlockIndex>, actual: Vec<BlockIndex> },
    /// A `const_bool` or binary comparison node's result type is not the
    /// caller-supplied boolean handle.
    NonBooleanResult { node: NodeIndex },
    /// A local's `frame_offset + size` is not `<= 0` (it must lie entirely
    /// below the frame pointer).
    FrameOffsetOutOfRange { local: LocalIdx },
    /// A local's `frame_offset` is not a multiple of its `alignment`.
    FrameOffsetMisaligned { local: LocalIdx },
    /// Two locals' `[offset, offset + size)` intervals overlap.
    FrameIntervalOverlap { a: LocalIdx, b: LocalIdx },
    /// `frame_size` is not a multiple of 16, or is smaller than
    /// `max(|offset|) + 96`.
    FrameSizeInvalid { frame_size: u32 },
}

impl fmt::Display for VerifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OwningBlockOutOfRange { node, block } => {
                write!(f, "node {} claims owning block {} which does not exist", node.raw(), block.raw())
            }
            Self::NodeMissingFromBlock { node, block } => {
                write!(f, "node {} claims block {} but is not in that block's node list", node.raw(), block.raw())
            }
            Self::UseBeforeDef { node, used } => {
                write!(f, "node {} references node {} which has not been emitted yet", node.raw(), used.raw())
            }
            Self::DanglingLocalIdx { node, local } => {
                write!(f, "node {} references local {} which does not exist", node.raw(), local.raw())
            }
            Self::DanglingBlockIndex { node, block } => {
                write!(f, "node {} references block {} which does not exist", node.raw(), block.raw())
            }
            Self::DanglingStringIdx { node, string } => {
                write!(f, "node {} references string literal {} which does not exist", node.raw(), string.raw())
            }
            Self::MissingEntryBlock => write!(f, "function has no block 0 (entry block)"),
            Self::MultipleTerminators { block } => write!(f, "block {} has more than one terminator", block.raw()),
            Self::TerminatorNotLast { block } => write!(f, "block {}'s terminator is not its last node", block.raw()),
            Self::SuccessorMismatch { block, expected, actual } => write!(
                f,
                "block {}'s successors {:?} do not match its terminator's targets {:?}",
                block.raw(),
                actual,
                expected
            ),
            Self::NonBooleanResult { node } => write!(f, "node {} must have boolean result type", node.raw()),
            Self::FrameOffsetOutOfRange { local } => write!(f, "local {}'s frame interval extends above the frame pointer", local.raw()),
            Self::FrameOffsetMisaligned { local } => write!(f, "local {}'s frame offset is not aligned to its alignment", local.raw()),
            Self::FrameIntervalOverlap { a, b } => write!(f, "locals {} and {} have overlapping frame intervals", a.raw(), b.raw()),
            Self::FrameSizeInvalid { frame_size } => write!(f, "frame size {frame_size} is invalid (not 16-aligned or too small)"),
        }
    }
}

impl std::error::Error for VerifyError {}

/// The frame layout invariant's fixed constants (§8, property 8): these are
/// part of the *checked contract*, independent of whatever
/// `FrameLayoutConfig` a particular build happened to use.
const FRAME_RESERVED_BYTES: u32 = 96;
const FRAME_FINAL_ALIGNMENT: u32 = 16;

/// Walk every block and node of `function` exactly once, checking the ten
/// invariant classes of §8. `bool_ty` is the registry's boolean handle,
/// needed to check property 7 (comparisons and `const_bool` always produce
/// a boolean result).
pub fn verify(function: &Function, bool_ty: TypeIndex) -> Vec<VerifyError> {
    let mut errors = Vec::new();

    if function.blocks.is_empty() {
        errors.push(VerifyError::MissingEntryBlock);
        return errors;
    }

    check_node_block_consistency(function, &mut errors);
    check_operand_bounds(function, &mut errors);
    check_terminator_discipline(function, &mut errors);
    check_boolean_results(function, bool_ty, &mut errors);
    check_frame_layout(function, &mut errors);

    errors
}

fn check_node_block_consistency(function: &Function, errors: &mut Vec<VerifyError>) {
    for (idx, node) in function.nodes.iter_enumerated() {
        if (node.block.raw() as usize) >= function.blocks.len() {
            errors.push(VerifyError::OwningBlockOutOfRange { node: idx, block: node.block });
            continue;
        }
        if !function.blocks[node.block].nodes.contains(&idx) {
            errors.push(VerifyError::NodeMissingFromBlock { node: idx, block: node.block });
        }
    }
}

fn check_operand_bounds(function: &Function, errors: &mut Vec<VerifyError>) {
    for (idx, node) in function.nodes.iter_enumerated() {
        node.data.for_each_node_ref(|used| {
            if used.raw() >= idx.raw() {
                errors.push(VerifyError::UseBeforeDef { node: idx, used });
            }
        });
        node.data.for_each_local_ref(|local| {
            if (local.raw() as usize) >= function.locals.len() {
                errors.push(VerifyError::DanglingLocalIdx { node: idx, local });
            }
        });
        node.data.for_each_block_ref(|block| {
            if (block.raw() as usize) >= function.blocks.len() {
                errors.push(VerifyError::DanglingBlockIndex { node: idx, block });
            }
        });
        node.data.for_each_string_ref(|string| {
            if (string.raw() as usize) >= function.string_literals.len() {
                errors.push(VerifyError::DanglingStringIdx { node: idx, string });
            }
        });
    }
}

fn check_terminator_discipline(function: &Function, errors: &mut Vec<VerifyError>) {
    for (block_idx, block) in function.blocks.iter_enumerated() {
        let terminator_positions: Vec<usize> =
            block.nodes.iter().enumerate().filter(|(_, n)| function.nodes[**n].is_terminator()).map(|(i, _)| i).collect();

        match terminator_positions.len() {
            0 => {}
            1 => {
                if terminator_positions[0] != block.nodes.len() - 1 {
                    errors.push(VerifyError::TerminatorNotLast { block: block_idx });
                } else {
                    let expected = expected_successors(function, block);
                    if expected != block.successors {
                        errors.push(VerifyError::SuccessorMismatch {
                            block: block_idx,
                            expected,
                            actual: block.successors.clone(),
                        });
                    }
                }
            }
            _ => errors.push(VerifyError::MultipleTerminators { block: block_idx }),
        }
    }
}

fn expected_successors(function: &Function, block: &crate::block::Block) -> Vec<BlockIndex> {
    use crate::node::Data;
    match block.last_node().map(|n| &function.nodes[n].data) {
        Some(Data::Jump(target)) => vec![*target],
        Some(Data::Branch { then_block, else_block, .. }) => vec![*then_block, *else_block],
        Some(Data::Ret(_)) => vec![],
        _ => vec![],
    }
}

fn check_boolean_results(function: &Function, bool_ty: TypeIndex, errors: &mut Vec<VerifyError>) {
    use crate::node::Data;
    for (idx, node) in function.nodes.iter_enumerated() {
        let must_be_bool = match &node.data {
            Data::ConstBool(_) => true,
            Data::Binary(op, ..) => op.is_comparison(),
            _ => false,
        };
        if must_be_bool && node.result_ty != bool_ty {
            errors.push(VerifyError::NonBooleanResult { node: idx });
        }
    }
}

fn check_frame_layout(function: &Function, errors: &mut Vec<VerifyError>) {
    let mut max_abs_offset: i64 = 0;

    for (idx, local) in function.locals.iter_enumerated() {
        let end = local.frame_offset as i64 + local.size as i64;
        if end > 0 {
            errors.push(VerifyError::FrameOffsetOutOfRange { local: idx });
        }
        if local.alignment != 0 && local.frame_offset.rem_euclid(local.alignment as i32) != 0 {
            errors.push(VerifyError::FrameOffsetMisaligned { local: idx });
        }
        max_abs_offset = max_abs_offset.max(-(local.frame_offset as i64));
    }

    for (i, a) in function.locals.iter_enumerated() {
        let a_start = a.frame_offset as i64;
        let a_end = a_start + a.size as i64;
        for (j, b) in function.locals.iter_enumerated() {
            if j.raw() <= i.raw() {
                continue;
            }
            let b_start = b.frame_offset as i64;
            let b_end = b_start + b.size as i64;
            if a_start < b_end && b_start < a_end {
                errors.push(VerifyError::FrameIntervalOverlap { a: i, b: j });
            }
        }
    }

    if function.frame_size % FRAME_FINAL_ALIGNMENT != 0 || (function.frame_size as i64) < max_abs_offset + FRAME_RESERVED_BYTES as i64 {
        errors.push(VerifyError::FrameSizeInvalid { frame_size: function.frame_size });
    }
}

/// A [`VerifyError`] tagged with the name of the function it was found in,
/// as produced by [`verify_ir`].
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct FunctionVerifyError {
    pub function: String,
    pub error: VerifyError,
}

impl fmt::Display for FunctionVerifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "in function `{}`: {}", self.function, self.error)
    }
}

impl std::error::Error for FunctionVerifyError {}

/// Run [`verify`] over every function in `ir`, tagging each resulting error
/// with its owning function's name.
pub fn verify_ir(ir: &Ir, bool_ty: TypeIndex) -> Vec<FunctionVerifyError> {
    ir.functions
        .iter()
        .flat_map(|f| verify(f, bool_ty).into_iter().map(move |error| FunctionVerifyError { function: f.name.clone(), error }))
        .collect()
}

#[cfg(test)]
mod tests {
    use bract_ir_utils::Span;

    use super::*;
    use crate::{builder::FunctionBuilder, types::TypeRegistry};

    // S7 — verifier catches a dangling jump.
    #[test]
    fn dangling_jump_target_is_reported() {
        let reg = TypeRegistry::new();
        let mut b = FunctionBuilder::new("f", TypeIndex::NULL, reg.void(), Span::DUMMY, reg.void(), reg.bool_ty(), reg.string());
        // Only block 0 exists; jump to block 1, which is never created.
        b.emit_jump(BlockIndex::new(1), Span::DUMMY);
        let f = b.build();

        let errors = verify(&f, reg.bool_ty());
        assert!(
            errors.iter().any(|e| matches!(e, VerifyError::DanglingBlockIndex { block, .. } if *block == BlockIndex::new(1))),
            "expected a DanglingBlockIndex error, got {errors:?}"
        );
    }

    // S8 — verifier catches use-before-def.
    #[test]
    fn use_before_def_is_reported() {
        let reg = TypeRegistry::new();
        let mut b = FunctionBuilder::new("f", TypeIndex::NULL, reg.void(), Span::DUMMY, reg.void(), reg.bool_ty(), reg.string());
        let int_ty = reg.void();
        let n0 = b.emit_const_int(1, int_ty, Span::DUMMY);
        let mut f = b.build();

        // Hand-construct a node whose binary payload references a
        // NodeIndex larger than its own index.
        f.nodes.push(crate::node::Node {
            data: crate::node::Data::Binary(crate::ops::BinaryOp::Add, n0, NodeIndex::new(5)),
            result_ty: int_ty,
            span: Span::DUMMY,
            block: BlockIndex::new(0),
        });

        let errors = verify(&f, reg.bool_ty());
        assert!(
            errors.iter().any(|e| matches!(e, VerifyError::UseBeforeDef { used, .. } if used.raw() == 5)),
            "expected a UseBeforeDef error, got {errors:?}"
        );
    }

    #[test]
    fn well_formed_function_verifies_clean() {
        let reg = TypeRegistry::new();
        let int_ty = reg.void();
        let mut b = FunctionBuilder::new("main", TypeIndex::NULL, int_ty, Span::DUMMY, reg.void(), reg.bool_ty(), reg.string());
        let n0 = b.emit_const_int(42, int_ty, Span::DUMMY);
        b.emit_ret(Some(n0), Span::DUMMY);
        let f = b.build();

        assert!(verify(&f, reg.bool_ty()).is_empty());
    }

    #[test]
    fn missing_entry_block_is_reported() {
        let f = Function {
            name: "empty".into(),
            fn_ty: TypeIndex::NULL,
            return_ty: TypeIndex::NULL,
            params: vec![],
            locals: Default::default(),
            blocks: Default::default(),
            nodes: Default::default(),
            entry_block: BlockIndex::new(0),
            span: Span::DUMMY,
            frame_size: 0,
            string_literals: vec![],
        };
        let errors = verify(&f, TypeIndex::NULL);
        assert_eq!(errors, vec![VerifyError::MissingEntryBlock]);
    }
}
