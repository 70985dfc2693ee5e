//! [`Ir`], the built program, and [`ProgramBuilder`], the top-level
//! collection point for functions, globals, and struct registrations.

use log::{debug, warn};

use crate::{builder::FunctionBuilder, function::Function, local::{Global, StructDef}, types::TypeIndex};
use bract_ir_utils::Span;

/// A fully built program: every function, global, and struct registration
/// produced by a [`ProgramBuilder`], plus nothing else — the shared type
/// registry lives outside the IR crate entirely (§3) and is threaded
/// through by the caller, not stored here.
#[derive(Debug, Clone, Default)]
pub struct Ir {
    pub functions: Vec<Function>,
    pub globals: Vec<Global>,
    pub structs: Vec<StructDef>,
}

impl Ir {
    pub fn get_func(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name == name)
    }

    pub fn get_global(&self, name: &str) -> Option<&Global> {
        self.globals.iter().find(|g| g.name == name)
    }
}

/// Drives construction of an [`Ir`]. Holds at most one in-progress
/// [`FunctionBuilder`] at a time; `start_func` while one is already open
/// drops it, per §4.3 ("calling while another is in progress drops the
/// in-progress one").
#[derive(Debug)]
pub struct ProgramBuilder {
    current: Option<FunctionBuilder>,
    functions: Vec<Function>,
    globals: Vec<Global>,
    structs: Vec<StructDef>,

    void_ty: TypeIndex,
    bool_ty: TypeIndex,
    string_ty: TypeIndex,
}

impl ProgramBuilder {
    /// `void_ty`/`bool_ty`/`string_ty` are forwarded to every
    /// [`FunctionBuilder`] this program builder opens — see §6's reserved
    /// type handles.
    pub fn new(void_ty: TypeIndex, bool_ty: TypeIndex, string_ty: TypeIndex) -> Self {
        Self { current: None, functions: Vec::new(), globals: Vec::new(), structs: Vec::new(), void_ty, bool_ty, string_ty }
    }

    /// Begin building a new function. If one is already in progress, it is
    /// silently discarded (a caller error the spec permits but expects
    /// tests to catch).
    pub fn start_func(&mut self, name: impl Into<String>, ty: TypeIndex, return_ty: TypeIndex, span: Span) {
        let name = name.into();
        if self.current.is_some() {
            warn!("start_func(`{name}`) called while another function was still open; dropping it");
        }
        self.current = Some(FunctionBuilder::new(name, ty, return_ty, span, self.void_ty, self.bool_ty, self.string_ty));
    }

    /// Escape hatch for emit helpers that operate against "whatever
    /// function is currently being built".
    pub fn func(&mut self) -> Option<&mut FunctionBuilder> {
        self.current.as_mut()
    }

    /// Build the current function and append it. No-op (but logs a
    /// warning) if no function is in progress.
    pub fn end_func(&mut self) {
        match self.current.take() {
            Some(builder) => {
                let f = builder.build();
                debug!("closed function `{}`", f.name);
                self.functions.push(f);
            }
            None => warn!("end_func() called with no function in progress"),
        }
    }

    pub fn add_global(&mut self, global: Global) {
        self.globals.push(global);
    }

    pub fn add_struct(&mut self, def: StructDef) {
        self.structs.push(def);
    }

    /// Transfer ownership of every accumulated buffer into an [`Ir`],
    /// leaving this builder empty.
    pub fn get_ir(&mut self) -> Ir {
        Ir {
            functions: std::mem::take(&mut self.functions),
            globals: std::mem::take(&mut self.globals),
            structs: std::mem::take(&mut self.structs),
        }
    }
}
