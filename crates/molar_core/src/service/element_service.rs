//! Element use-case service.
//!
//! # Responsibility
//! - Provide stable element CRUD, search, category filter and CSV entry points.
//! - Apply entry-time rules on top of repository validation.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Service layer remains storage-agnostic.

use crate::interchange::csv::{export_elements_csv, import_elements_csv};
use crate::model::element::Element;
use crate::repo::element_repo::{ElementRepository, RepoResult};
use std::path::Path;

/// Use-case service wrapper for element operations.
pub struct ElementService<R: ElementRepository> {
    repo: R,
}

impl<R: ElementRepository> ElementService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn lookup(&self, symbol: &str) -> RepoResult<Option<Element>> {
        self.repo.get_element(symbol.trim())
    }

    /// Elements whose symbol or name contains `query`, by atomic number.
    pub fn search(&self, query: &str) -> RepoResult<Vec<Element>> {
        self.repo.search_elements(query.trim())
    }

    pub fn list_all(&self) -> RepoResult<Vec<Element>> {
        self.repo.list_elements()
    }

    /// Elements whose category equals `category` after trimming.
    pub fn by_category(&self, category: &str) -> RepoResult<Vec<Element>> {
        self.repo.list_elements_by_category(category.trim())
    }

    /// Adds a hand-entered element.
    ///
    /// # Contract
    /// - Requires `atomic_number >= 1`.
    /// - Returns `DuplicateKey` when the symbol exists; the stored row is
    ///   left unchanged.
    pub fn add(&self, element: &Element) -> RepoResult<()> {
        element.validate_for_entry()?;
        self.repo.create_element(element)
    }

    /// Replaces the row stored under `old_symbol`.
    ///
    /// Returns `NotFound` when `old_symbol` is missing and `DuplicateKey`
    /// when the new symbol belongs to another row.
    pub fn update(&self, old_symbol: &str, element: &Element) -> RepoResult<()> {
        element.validate_for_entry()?;
        self.repo.update_element(old_symbol.trim(), element)
    }

    pub fn delete(&self, symbol: &str) -> RepoResult<()> {
        self.repo.delete_element(symbol.trim())
    }

    /// Writes the element table as CSV; returns the number of rows.
    pub fn export_csv(&self, path: impl AsRef<Path>) -> RepoResult<usize> {
        export_elements_csv(&self.repo, path)
    }

    /// Imports new elements from CSV; returns the number inserted.
    pub fn import_csv(&self, path: impl AsRef<Path>) -> RepoResult<usize> {
        import_elements_csv(&self.repo, path)
    }
}
