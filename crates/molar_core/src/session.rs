//! Command dispatch over one owned store connection and accumulator.
//!
//! # Responsibility
//! - Map every user action to one `Command` variant.
//! - Convert all core errors into a `Response` envelope at this boundary.
//!
//! # Invariants
//! - `dispatch` never panics and never returns an error; failures are
//!   reported as `ok = false` with a message naming the action.
//! - The accumulator is only mutated through `CalculatorService`.
//! - CSV import reports `-1` when it failed and `0` when nothing was new.

use crate::db::{open_db, open_db_in_memory, DbResult};
use crate::interchange::report::{write_report, ReportInput, REPORT_TIMESTAMP_FORMAT};
use crate::model::accumulator::{Accumulator, AccumulatorEntry};
use crate::model::compound::{ReferenceCompound, SavedCompound};
use crate::model::element::Element;
use crate::repo::compound_repo::{CompoundRepository, SqliteCompoundRepository};
use crate::repo::element_repo::SqliteElementRepository;
use crate::service::calculator_service::{CalcError, CalculatorService, MassComputation};
use crate::service::element_service::ElementService;
use log::{info, warn};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Count reported when a CSV import failed entirely.
pub const IMPORT_FAILED: i64 = -1;

/// One user action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    AddEntry { symbol: String, quantity: f64 },
    RemoveEntry { index: usize },
    ClearEntries,
    SetName { name: String },
    ShowEntries,
    Compute,
    /// Saves under `name`, or under the accumulator name when `None`.
    SaveCompound { name: Option<String> },
    ExportReport { path: PathBuf },
    LookupElement { symbol: String },
    SearchElements { query: String },
    ListElements,
    FilterElements { category: String },
    AddElement { element: Element },
    UpdateElement { old_symbol: String, element: Element },
    DeleteElement { symbol: String },
    ExportCsv { path: PathBuf },
    ImportCsv { path: PathBuf },
    ListReferenceCompounds,
    /// Takes the name of the reference compound at `index` (0-based, list
    /// order) as the accumulator name; entries are left as they are.
    UseReferenceCompound { index: usize },
    ListSavedCompounds,
    LoadSavedCompound { id: i64 },
    DeleteSavedCompound { id: i64 },
}

impl Command {
    /// Stable action name used in messages and log events.
    pub fn action(&self) -> &'static str {
        match self {
            Self::AddEntry { .. } => "add_entry",
            Self::RemoveEntry { .. } => "remove_entry",
            Self::ClearEntries => "clear_entries",
            Self::SetName { .. } => "set_name",
            Self::ShowEntries => "show_entries",
            Self::Compute => "compute",
            Self::SaveCompound { .. } => "save_compound",
            Self::ExportReport { .. } => "export_report",
            Self::LookupElement { .. } => "lookup_element",
            Self::SearchElements { .. } => "search_elements",
            Self::ListElements => "list_elements",
            Self::FilterElements { .. } => "filter_elements",
            Self::AddElement { .. } => "add_element",
            Self::UpdateElement { .. } => "update_element",
            Self::DeleteElement { .. } => "delete_element",
            Self::ExportCsv { .. } => "export_csv",
            Self::ImportCsv { .. } => "import_csv",
            Self::ListReferenceCompounds => "list_reference_compounds",
            Self::UseReferenceCompound { .. } => "use_reference_compound",
            Self::ListSavedCompounds => "list_saved_compounds",
            Self::LoadSavedCompound { .. } => "load_saved_compound",
            Self::DeleteSavedCompound { .. } => "delete_saved_compound",
        }
    }
}

/// Snapshot of the accumulator after a mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntriesView {
    pub name: Option<String>,
    pub formula: String,
    pub entries: Vec<AccumulatorEntry>,
}

/// Computation together with the rendered formula it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputationView {
    pub name: Option<String>,
    pub formula: String,
    pub result: MassComputation,
}

/// Data returned alongside a response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum Payload {
    None,
    Entries(EntriesView),
    Computation(ComputationView),
    Element(Element),
    Elements(Vec<Element>),
    ReferenceCompounds(Vec<ReferenceCompound>),
    SavedCompounds(Vec<SavedCompound>),
    SavedId(i64),
    /// Rows written or imported; `-1` marks a failed import.
    Count(i64),
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Whether the action succeeded.
    pub ok: bool,
    /// Human-readable result for the user.
    pub message: String,
    pub payload: Payload,
}

impl Response {
    fn success(message: impl Into<String>, payload: Payload) -> Self {
        Self {
            ok: true,
            message: message.into(),
            payload,
        }
    }

    fn failure(action: &str, err: impl Display) -> Self {
        Self {
            ok: false,
            message: format!("{action} failed: {err}"),
            payload: Payload::None,
        }
    }
}

/// Owned pairing of a store connection and one accumulator.
pub struct Session {
    conn: Connection,
    accumulator: Accumulator,
}

impl Session {
    /// Opens (and seeds on first use) the store at `path`.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        Ok(Self::with_connection(open_db(path)?))
    }

    pub fn open_in_memory() -> DbResult<Self> {
        Ok(Self::with_connection(open_db_in_memory()?))
    }

    /// Wraps a connection that has already been bootstrapped.
    pub fn with_connection(conn: Connection) -> Self {
        Self {
            conn,
            accumulator: Accumulator::new(),
        }
    }

    pub fn accumulator(&self) -> &Accumulator {
        &self.accumulator
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Runs one command and reports the outcome.
    pub fn dispatch(&mut self, command: Command) -> Response {
        let action = command.action();
        let started_at = Instant::now();
        let response = self.run(command);

        if response.ok {
            info!(
                "event=command module=session status=ok action={} duration_ms={}",
                action,
                started_at.elapsed().as_millis()
            );
        } else {
            warn!(
                "event=command module=session status=error action={} duration_ms={}",
                action,
                started_at.elapsed().as_millis()
            );
        }
        response
    }

    fn run(&mut self, command: Command) -> Response {
        let action = command.action();
        let calculator = CalculatorService::new(
            SqliteElementRepository::new(&self.conn),
            SqliteCompoundRepository::new(&self.conn),
        );
        let elements = ElementService::new(SqliteElementRepository::new(&self.conn));
        let accumulator = &mut self.accumulator;

        match command {
            Command::AddEntry { symbol, quantity } => {
                match calculator.add_entry(accumulator, &symbol, quantity) {
                    Ok(()) => Response::success(
                        format!(
                            "Element {} added. Entries: {}",
                            symbol.trim(),
                            accumulator.len()
                        ),
                        entries_payload(accumulator),
                    ),
                    Err(err) => Response::failure(action, err),
                }
            }
            Command::RemoveEntry { index } => match calculator.remove_entry(accumulator, index) {
                Ok(removed) => Response::success(
                    format!("Element {} removed.", removed.symbol),
                    entries_payload(accumulator),
                ),
                Err(err) => Response::failure(action, err),
            },
            Command::ClearEntries => {
                accumulator.clear();
                Response::success("Element list cleared.", entries_payload(accumulator))
            }
            Command::SetName { name } => {
                accumulator.set_name(name);
                Response::success("Compound name set.", entries_payload(accumulator))
            }
            Command::ShowEntries => {
                let message = format!("{} entries.", accumulator.len());
                Response::success(message, entries_payload(accumulator))
            }
            Command::Compute => match calculator.compute(accumulator) {
                Ok(result) => Response::success(
                    format!("Molar mass: {:.4} g/mol", result.total_mass),
                    Payload::Computation(ComputationView {
                        name: accumulator.name().map(str::to_string),
                        formula: accumulator.render_formula(),
                        result,
                    }),
                ),
                Err(err) => Response::failure(action, err),
            },
            Command::SaveCompound { name } => {
                let name = name
                    .or_else(|| accumulator.name().map(str::to_string))
                    .unwrap_or_default();
                match calculator.save(accumulator, &name) {
                    Ok((id, result)) => Response::success(
                        format!(
                            "Compound saved with id {id} ({:.4} g/mol).",
                            result.total_mass
                        ),
                        Payload::SavedId(id),
                    ),
                    Err(err) => Response::failure(action, err),
                }
            }
            Command::ExportReport { path } => {
                let result = match calculator.compute(accumulator) {
                    Ok(result) => result,
                    Err(err) => return Response::failure(action, err),
                };
                let formula = accumulator.render_formula();
                let calculated_at = chrono::Local::now()
                    .format(REPORT_TIMESTAMP_FORMAT)
                    .to_string();
                let input = ReportInput {
                    compound_name: accumulator.name(),
                    formula: &formula,
                    computation: &result,
                    calculated_at: &calculated_at,
                };
                match write_report(&path, &input) {
                    Ok(()) => Response::success(
                        format!("Report written to {}.", path.display()),
                        Payload::None,
                    ),
                    Err(err) => Response::failure(action, err),
                }
            }
            Command::LookupElement { symbol } => match elements.lookup(&symbol) {
                Ok(Some(element)) => Response::success(
                    format!("Found {}.", element.symbol),
                    Payload::Element(element),
                ),
                Ok(None) => Response::failure(
                    action,
                    format!("element `{}` not found", symbol.trim()),
                ),
                Err(err) => Response::failure(action, err),
            },
            Command::SearchElements { query } => match elements.search(&query) {
                Ok(found) => {
                    Response::success(found_message(found.len()), Payload::Elements(found))
                }
                Err(err) => Response::failure(action, err),
            },
            Command::ListElements => match elements.list_all() {
                Ok(all) => Response::success(
                    format!("{} elements.", all.len()),
                    Payload::Elements(all),
                ),
                Err(err) => Response::failure(action, err),
            },
            Command::FilterElements { category } => match elements.by_category(&category) {
                Ok(found) => {
                    Response::success(found_message(found.len()), Payload::Elements(found))
                }
                Err(err) => Response::failure(action, err),
            },
            Command::AddElement { element } => match elements.add(&element) {
                Ok(()) => Response::success(
                    format!("Element {} added to the database.", element.symbol),
                    Payload::Element(element),
                ),
                Err(err) => Response::failure(action, err),
            },
            Command::UpdateElement {
                old_symbol,
                element,
            } => match elements.update(&old_symbol, &element) {
                Ok(()) => Response::success(
                    format!("Element {} updated.", old_symbol.trim()),
                    Payload::Element(element),
                ),
                Err(err) => Response::failure(action, err),
            },
            Command::DeleteElement { symbol } => match elements.delete(&symbol) {
                Ok(()) => Response::success(
                    format!("Element {} deleted.", symbol.trim()),
                    Payload::None,
                ),
                Err(err) => Response::failure(action, err),
            },
            Command::ExportCsv { path } => match elements.export_csv(&path) {
                Ok(rows) => Response::success(
                    format!("Exported {rows} elements to {}.", path.display()),
                    Payload::Count(count_to_i64(rows)),
                ),
                Err(err) => Response::failure(action, err),
            },
            Command::ImportCsv { path } => match elements.import_csv(&path) {
                Ok(0) => Response::success("No new elements to import.", Payload::Count(0)),
                Ok(imported) => Response::success(
                    format!("Imported {imported} elements."),
                    Payload::Count(count_to_i64(imported)),
                ),
                Err(err) => Response {
                    payload: Payload::Count(IMPORT_FAILED),
                    ..Response::failure(action, err)
                },
            },
            Command::ListReferenceCompounds => {
                let compounds = SqliteCompoundRepository::new(&self.conn);
                match compounds.list_reference_compounds() {
                    Ok(items) => Response::success(
                        format!("{} reference compounds.", items.len()),
                        Payload::ReferenceCompounds(items),
                    ),
                    Err(err) => Response::failure(action, err),
                }
            }
            Command::UseReferenceCompound { index } => {
                let compounds = SqliteCompoundRepository::new(&self.conn);
                let items = match compounds.list_reference_compounds() {
                    Ok(items) => items,
                    Err(err) => return Response::failure(action, err),
                };
                let len = items.len();
                match items.into_iter().nth(index) {
                    Some(item) => {
                        accumulator.set_name(item.name.as_str());
                        Response::success(
                            format!(
                                "Compound {} loaded. Formula: {}",
                                item.name, item.formula
                            ),
                            entries_payload(accumulator),
                        )
                    }
                    None => Response::failure(action, CalcError::IndexOutOfRange { index, len }),
                }
            }
            Command::ListSavedCompounds => {
                let compounds = SqliteCompoundRepository::new(&self.conn);
                match compounds.list_saved_compounds() {
                    Ok(items) => Response::success(
                        format!("Saved compounds: {}.", items.len()),
                        Payload::SavedCompounds(items),
                    ),
                    Err(err) => Response::failure(action, err),
                }
            }
            Command::LoadSavedCompound { id } => match calculator.load_saved(accumulator, id) {
                Ok(()) => Response::success(
                    format!("Saved compound {id} loaded."),
                    entries_payload(accumulator),
                ),
                Err(err) => Response::failure(action, err),
            },
            Command::DeleteSavedCompound { id } => {
                let compounds = SqliteCompoundRepository::new(&self.conn);
                match compounds.delete_saved_compound(id) {
                    Ok(()) => {
                        Response::success(format!("Saved compound {id} deleted."), Payload::None)
                    }
                    Err(err) => Response::failure(action, err),
                }
            }
        }
    }
}

fn entries_payload(accumulator: &Accumulator) -> Payload {
    Payload::Entries(EntriesView {
        name: accumulator.name().map(str::to_string),
        formula: accumulator.render_formula(),
        entries: accumulator.entries().to_vec(),
    })
}

fn found_message(count: usize) -> String {
    if count == 0 {
        "No results.".to_string()
    } else {
        format!("Found {count} result(s).")
    }
}

fn count_to_i64(count: usize) -> i64 {
    i64::try_from(count).unwrap_or(i64::MAX)
}
