//! The IR's only runtime failure mode: allocator exhaustion while growing
//! one of the builder's internal buffers (locals, blocks, nodes, string
//! literals, or a duplicated `call.args` slice). Modeled on the plain
//! enum-and-`Display` style used by the reporting crate — no `anyhow` or
//! `thiserror` is introduced here.

use std::fmt;

/// A single, unit-like error: the builder could not grow a buffer. Callers
/// are expected to abort compilation of the current unit on receiving this.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct AllocError;

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "allocation failed while growing an IR builder buffer")
    }
}

impl std::error::Error for AllocError {}

/// Convenience alias for fallible builder operations. In practice, the only
/// `Err` this crate ever returns is [`AllocError`]; `Vec::push` aborts the
/// process on exhaustion rather than returning one, so this exists mainly
/// to document the contract in §7 and to give callers a single error type
/// to propagate with `?`.
pub type Result<T> = std::result::Result<T, AllocError>;
