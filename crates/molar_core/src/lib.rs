//! Core domain logic for the molar mass calculator.
//! This crate is the single source of truth for element-store and
//! accumulator invariants.

pub mod db;
pub mod interchange;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod session;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::accumulator::{
    format_quantity, parse_composition, parse_entry, Accumulator, AccumulatorEntry,
    CompositionError,
};
pub use model::compound::{NewSavedCompound, ReferenceCompound, SavedCompound};
pub use model::element::{Element, ElementValidationError};
pub use repo::compound_repo::{CompoundRepository, SqliteCompoundRepository};
pub use repo::element_repo::{ElementRepository, RepoError, RepoResult, SqliteElementRepository};
pub use service::calculator_service::{
    CalcError, CalcResult, CalculatorService, Contribution, MassComputation,
};
pub use service::element_service::ElementService;
pub use session::{Command, ComputationView, EntriesView, Payload, Response, Session};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
