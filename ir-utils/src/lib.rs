//! Leaf utilities shared by the IR crate and (eventually) its sibling
//! compiler stages.
//!
//! This crate is intentionally small: it hosts the two external
//! collaborators the IR subsystem depends on but does not itself define —
//! source positions ([`span`]) and a generic interned-by-index store
//! ([`store`]) — so that the IR crate can be built and tested in isolation.

pub mod span;
pub mod store;

pub use span::{SourceId, Span};
pub use store::{DefaultStore, Store};
