//! Element repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide lookup/search/CRUD APIs over the `elements` table.
//! - Translate SQLite constraint failures into semantic errors.
//!
//! # Invariants
//! - Write paths call `Element::validate()` before SQL mutations.
//! - Read paths skip rows that fail validation (older tools accepted any
//!   symbol length or mass) and log each skipped row; one bad row never
//!   hides the rest of the table.
//! - Listing order is `atomic_number ASC, symbol ASC`.

use crate::db::DbError;
use crate::model::element::{Element, ElementValidationError};
use log::warn;
use rusqlite::{params, Connection, ErrorCode, Row, Rows};
use std::error::Error;
use std::fmt::{Display, Formatter};

const ELEMENT_SELECT_SQL: &str = "SELECT
    symbol,
    name,
    atomic_mass,
    atomic_number,
    category,
    discovered_year
FROM elements";

const ELEMENT_ORDER_SQL: &str = " ORDER BY atomic_number ASC, symbol ASC";

pub type RepoResult<T> = Result<T, RepoError>;

/// Error shared by the element/compound repositories and CSV interchange.
#[derive(Debug)]
pub enum RepoError {
    Validation(ElementValidationError),
    Db(DbError),
    /// Insert or rename onto a symbol that already exists.
    DuplicateKey(String),
    NotFound {
        entity: &'static str,
        key: String,
    },
    /// Malformed interchange input; `line` is 1-based.
    Parse {
        line: u64,
        message: String,
    },
    Io(std::io::Error),
    InvalidInput(String),
    InvalidData(String),
}

impl RepoError {
    pub(crate) fn element_not_found(symbol: &str) -> Self {
        Self::NotFound {
            entity: "element",
            key: symbol.to_string(),
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::DuplicateKey(symbol) => {
                write!(f, "element with symbol `{symbol}` already exists")
            }
            Self::NotFound { entity, key } => write!(f, "{entity} not found: {key}"),
            Self::Parse { line, message } => write!(f, "parse error at line {line}: {message}"),
            Self::Io(err) => write!(f, "{err}"),
            Self::InvalidInput(message) => write!(f, "invalid input: {message}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::DuplicateKey(_)
            | Self::NotFound { .. }
            | Self::Parse { .. }
            | Self::InvalidInput(_)
            | Self::InvalidData(_) => None,
        }
    }
}

impl From<ElementValidationError> for RepoError {
    fn from(value: ElementValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<std::io::Error> for RepoError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// Repository interface for element operations.
pub trait ElementRepository {
    /// Exact, case-sensitive symbol lookup.
    fn get_element(&self, symbol: &str) -> RepoResult<Option<Element>>;
    fn list_elements(&self) -> RepoResult<Vec<Element>>;
    /// Substring match on symbol or name.
    fn search_elements(&self, query: &str) -> RepoResult<Vec<Element>>;
    /// Exact, case-sensitive category match.
    fn list_elements_by_category(&self, category: &str) -> RepoResult<Vec<Element>>;
    fn create_element(&self, element: &Element) -> RepoResult<()>;
    /// Replaces every field of the row keyed by `old_symbol`, symbol included.
    fn update_element(&self, old_symbol: &str, element: &Element) -> RepoResult<()>;
    fn delete_element(&self, symbol: &str) -> RepoResult<()>;
}

/// SQLite-backed element repository.
pub struct SqliteElementRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteElementRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ElementRepository for SqliteElementRepository<'_> {
    fn get_element(&self, symbol: &str) -> RepoResult<Option<Element>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ELEMENT_SELECT_SQL} WHERE symbol = ?1;"))?;

        let rows = stmt.query([symbol])?;
        Ok(collect_valid_rows(rows)?.into_iter().next())
    }

    fn list_elements(&self) -> RepoResult<Vec<Element>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ELEMENT_SELECT_SQL}{ELEMENT_ORDER_SQL};"))?;
        let rows = stmt.query([])?;
        collect_valid_rows(rows)
    }

    fn search_elements(&self, query: &str) -> RepoResult<Vec<Element>> {
        let pattern = format!("%{}%", escape_like(query));
        let mut stmt = self.conn.prepare(&format!(
            "{ELEMENT_SELECT_SQL}
             WHERE name LIKE ?1 ESCAPE '\\'
                OR symbol LIKE ?1 ESCAPE '\\'
             {ELEMENT_ORDER_SQL};"
        ))?;

        let rows = stmt.query([pattern])?;
        collect_valid_rows(rows)
    }

    fn list_elements_by_category(&self, category: &str) -> RepoResult<Vec<Element>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ELEMENT_SELECT_SQL} WHERE category = ?1{ELEMENT_ORDER_SQL};"
        ))?;
        let rows = stmt.query([category])?;
        collect_valid_rows(rows)
    }

    fn create_element(&self, element: &Element) -> RepoResult<()> {
        element.validate()?;

        self.conn
            .execute(
                "INSERT INTO elements (
                    symbol,
                    name,
                    atomic_mass,
                    atomic_number,
                    category,
                    discovered_year
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
                params![
                    element.symbol.as_str(),
                    element.name.as_str(),
                    element.atomic_mass,
                    element.atomic_number,
                    element.category.as_deref(),
                    element.discovered_year,
                ],
            )
            .map_err(|err| map_unique_violation(err, &element.symbol))?;

        Ok(())
    }

    fn update_element(&self, old_symbol: &str, element: &Element) -> RepoResult<()> {
        element.validate()?;

        let changed = self
            .conn
            .execute(
                "UPDATE elements
                 SET
                    symbol = ?1,
                    name = ?2,
                    atomic_mass = ?3,
                    atomic_number = ?4,
                    category = ?5,
                    discovered_year = ?6
                 WHERE symbol = ?7;",
                params![
                    element.symbol.as_str(),
                    element.name.as_str(),
                    element.atomic_mass,
                    element.atomic_number,
                    element.category.as_deref(),
                    element.discovered_year,
                    old_symbol,
                ],
            )
            .map_err(|err| map_unique_violation(err, &element.symbol))?;

        if changed == 0 {
            return Err(RepoError::element_not_found(old_symbol));
        }

        Ok(())
    }

    fn delete_element(&self, symbol: &str) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM elements WHERE symbol = ?1;", [symbol])?;

        if changed == 0 {
            return Err(RepoError::element_not_found(symbol));
        }

        Ok(())
    }
}

/// Decodes every row, dropping the ones that fail validation.
fn collect_valid_rows(mut rows: Rows<'_>) -> RepoResult<Vec<Element>> {
    let mut elements = Vec::new();
    while let Some(row) = rows.next()? {
        match parse_element_row(row) {
            Ok(element) => elements.push(element),
            Err(err @ (RepoError::Validation(_) | RepoError::InvalidData(_))) => {
                warn!(
                    "event=element_read module=repo status=skipped error={}",
                    err
                );
            }
            Err(err) => return Err(err),
        }
    }
    Ok(elements)
}

fn parse_element_row(row: &Row<'_>) -> RepoResult<Element> {
    let symbol: String = row.get("symbol")?;

    let atomic_number_raw: i64 = row.get("atomic_number")?;
    let atomic_number = u32::try_from(atomic_number_raw).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid atomic_number `{atomic_number_raw}` for element `{symbol}`"
        ))
    })?;

    let discovered_year = match row.get::<_, Option<i64>>("discovered_year")? {
        Some(raw) => Some(i32::try_from(raw).map_err(|_| {
            RepoError::InvalidData(format!(
                "invalid discovered_year `{raw}` for element `{symbol}`"
            ))
        })?),
        None => None,
    };

    // Files written by older tools store "no category" as an empty string.
    let category = row
        .get::<_, Option<String>>("category")?
        .filter(|value| !value.trim().is_empty());

    let element = Element {
        symbol,
        name: row.get("name")?,
        atomic_mass: row.get("atomic_mass")?,
        atomic_number,
        category,
        discovered_year,
    };
    element.validate()?;
    Ok(element)
}

fn map_unique_violation(err: rusqlite::Error, symbol: &str) -> RepoError {
    match &err {
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == ErrorCode::ConstraintViolation
                && failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            RepoError::DuplicateKey(symbol.to_string())
        }
        _ => err.into(),
    }
}

fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
