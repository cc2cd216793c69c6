//! Compound records kept next to the element table.
//!
//! # Invariants
//! - Reference compounds are seeded once and never written by core.
//! - Saved compounds are immutable after insert; only hard delete by id
//!   exists.

use serde::{Deserialize, Serialize};

/// Well-known substance seeded with a precomputed molar mass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceCompound {
    pub name: String,
    /// Display formula, never parsed.
    pub formula: String,
    pub molar_mass: f64,
    pub description: Option<String>,
}

/// Persisted result of a user save action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedCompound {
    /// Store-assigned row id.
    pub id: i64,
    pub name: String,
    /// Rendered accumulator formula, e.g. `H₍2.0₎ + O`.
    pub formula: String,
    pub molar_mass: f64,
    /// `symbol:quantity` pairs joined by `;`.
    pub composition: String,
    /// `YYYY-MM-DD HH:MM:SS` in UTC, assigned by SQLite.
    pub created_at: String,
}

/// Insert payload for `saved_compounds`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSavedCompound {
    pub name: String,
    pub formula: String,
    pub molar_mass: f64,
    pub composition: String,
}
