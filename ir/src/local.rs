//! Stack-allocated variable descriptors ([`Local`]), module-scoped
//! variables ([`Global`]), and struct registration records ([`StructDef`]).

use bract_ir_utils::Span;

use crate::types::TypeIndex;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Mutability {
    Mutable,
    Immutable,
}

/// A single stack-allocated variable: either a declared local or a
/// function parameter (parameters are just locals with `is_param = true`).
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Local {
    pub name: String,
    pub ty: TypeIndex,
    pub mutability: Mutability,
    pub is_param: bool,
    /// Position within the parameter list; `None` for non-parameters.
    pub param_index: Option<crate::index::ParamIdx>,
    pub size: u32,
    pub alignment: u32,
    /// Assigned by the frame layout algorithm at `build()`; `0` until then.
    pub frame_offset: i32,
}

/// The default size/alignment used for a local that was not given an
/// explicit size (e.g. via `addLocalWithSize`).
pub const DEFAULT_LOCAL_SIZE: u32 = 8;
pub const DEFAULT_LOCAL_ALIGNMENT: u32 = 8;

impl Local {
    pub fn new_local(name: impl Into<String>, ty: TypeIndex, mutability: Mutability) -> Self {
        Self {
            name: name.into(),
            ty,
            mutability,
            is_param: false,
            param_index: None,
            size: DEFAULT_LOCAL_SIZE,
            alignment: DEFAULT_LOCAL_ALIGNMENT,
            frame_offset: 0,
        }
    }

    pub fn new_local_with_size(
        name: impl Into<String>,
        ty: TypeIndex,
        mutability: Mutability,
        size: u32,
        alignment: u32,
    ) -> Self {
        Self {
            name: name.into(),
            ty,
            mutability,
            is_param: false,
            param_index: None,
            size,
            alignment,
            frame_offset: 0,
        }
    }

    pub fn new_param(
        name: impl Into<String>,
        ty: TypeIndex,
        size: u32,
        param_index: crate::index::ParamIdx,
    ) -> Self {
        Self {
            name: name.into(),
            ty,
            mutability: Mutability::Immutable,
            is_param: true,
            param_index: Some(param_index),
            size,
            // Parameters are passed in registers/on the stack at their
            // natural alignment; we conservatively reuse the default here
            // since the type registry is the real source of truth and this
            // subsystem does not model per-type alignment beyond what is
            // passed in explicitly.
            alignment: DEFAULT_LOCAL_ALIGNMENT,
            frame_offset: 0,
        }
    }
}

/// A module-scoped variable. Immutable once inserted into an
/// [`crate::ir::Ir`].
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Global {
    pub name: String,
    pub ty: TypeIndex,
    pub is_constant: bool,
    pub span: Span,
    pub size: u32,
}

/// A registration record for a struct type. The field shape itself lives
/// in the (external) type registry; this just ties a name and span to a
/// `TypeIndex` so diagnostics and lookups have somewhere to point.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct StructDef {
    pub name: String,
    pub ty: TypeIndex,
    pub span: Span,
}
