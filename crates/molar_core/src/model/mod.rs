//! Domain model for elements, compounds and the compound accumulator.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep validation next to the types it protects.
//!
//! # Invariants
//! - Elements are identified by their unique `symbol`.
//! - Accumulator state is process-local and never persisted implicitly.

pub mod accumulator;
pub mod compound;
pub mod element;
