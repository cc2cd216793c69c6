//! Reference and saved compound persistence.
//!
//! # Invariants
//! - `common_compounds` is read-only from core.
//! - Saved compounds are listed newest first (`created_date DESC, id DESC`).

use crate::model::compound::{NewSavedCompound, ReferenceCompound, SavedCompound};
use crate::repo::element_repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const SAVED_SELECT_SQL: &str = "SELECT
    id,
    name,
    formula,
    molar_mass,
    composition,
    created_date
FROM saved_compounds";

/// Repository interface for compound tables.
pub trait CompoundRepository {
    /// Seeded reference compounds in insertion order.
    fn list_reference_compounds(&self) -> RepoResult<Vec<ReferenceCompound>>;
    /// Inserts one saved compound and returns its row id.
    fn create_saved_compound(&self, compound: &NewSavedCompound) -> RepoResult<i64>;
    fn get_saved_compound(&self, id: i64) -> RepoResult<Option<SavedCompound>>;
    fn list_saved_compounds(&self) -> RepoResult<Vec<SavedCompound>>;
    /// Hard-deletes one saved compound.
    fn delete_saved_compound(&self, id: i64) -> RepoResult<()>;
}

/// SQLite-backed compound repository.
pub struct SqliteCompoundRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCompoundRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl CompoundRepository for SqliteCompoundRepository<'_> {
    fn list_reference_compounds(&self) -> RepoResult<Vec<ReferenceCompound>> {
        let mut stmt = self.conn.prepare(
            "SELECT name, formula, molar_mass, description
             FROM common_compounds
             ORDER BY id ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut compounds = Vec::new();
        while let Some(row) = rows.next()? {
            compounds.push(ReferenceCompound {
                name: row.get("name")?,
                formula: row.get("formula")?,
                molar_mass: row.get("molar_mass")?,
                description: row.get("description")?,
            });
        }
        Ok(compounds)
    }

    fn create_saved_compound(&self, compound: &NewSavedCompound) -> RepoResult<i64> {
        if compound.name.trim().is_empty() {
            return Err(RepoError::InvalidInput(
                "saved compound name cannot be empty".to_string(),
            ));
        }
        if compound.composition.trim().is_empty() {
            return Err(RepoError::InvalidInput(
                "saved compound composition cannot be empty".to_string(),
            ));
        }
        if !compound.molar_mass.is_finite() {
            return Err(RepoError::InvalidInput(format!(
                "molar mass must be finite, got {}",
                compound.molar_mass
            )));
        }

        self.conn.execute(
            "INSERT INTO saved_compounds (name, formula, molar_mass, composition)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                compound.name.as_str(),
                compound.formula.as_str(),
                compound.molar_mass,
                compound.composition.as_str(),
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn get_saved_compound(&self, id: i64) -> RepoResult<Option<SavedCompound>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SAVED_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_saved_row(row)?));
        }
        Ok(None)
    }

    fn list_saved_compounds(&self) -> RepoResult<Vec<SavedCompound>> {
        let mut stmt = self.conn.prepare(&format!(
            "{SAVED_SELECT_SQL} ORDER BY created_date DESC, id DESC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut compounds = Vec::new();
        while let Some(row) = rows.next()? {
            compounds.push(parse_saved_row(row)?);
        }
        Ok(compounds)
    }

    fn delete_saved_compound(&self, id: i64) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM saved_compounds WHERE id = ?1;", params![id])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "saved compound",
                key: id.to_string(),
            });
        }
        Ok(())
    }
}

fn parse_saved_row(row: &Row<'_>) -> RepoResult<SavedCompound> {
    Ok(SavedCompound {
        id: row.get("id")?,
        name: row.get("name")?,
        formula: row.get("formula")?,
        molar_mass: row.get("molar_mass")?,
        composition: row.get("composition")?,
        created_at: row
            .get::<_, Option<String>>("created_date")?
            .unwrap_or_default(),
    })
}
