//! Element table CSV export/import.
//!
//! # Invariants
//! - Column order is symbol, name, atomic mass, category; rows end in CRLF.
//! - The first line is always a header and is never imported.
//! - Import never overwrites an existing symbol.
//! - An unparseable row aborts the import; rows inserted before it stay.

use crate::model::element::Element;
use crate::repo::element_repo::{ElementRepository, RepoError, RepoResult};
use ::csv::{ReaderBuilder, StringRecord, Terminator, WriterBuilder};
use log::{error, info};
use std::fs::File;
use std::path::Path;

/// Localized header written on export.
pub const CSV_HEADER: [&str; 4] = ["Символ", "Название", "Атомная масса", "Категория"];

const MIN_IMPORT_FIELDS: usize = 3;

/// Writes every element to `path` and returns the number of data rows.
pub fn export_elements_csv<R: ElementRepository>(
    repo: &R,
    path: impl AsRef<Path>,
) -> RepoResult<usize> {
    let elements = repo.list_elements()?;
    let file = File::create(path.as_ref())?;
    let mut writer = WriterBuilder::new()
        .terminator(Terminator::CRLF)
        .from_writer(file);

    writer.write_record(CSV_HEADER).map_err(csv_error)?;
    for element in &elements {
        writer
            .write_record([
                element.symbol.as_str(),
                element.name.as_str(),
                element.atomic_mass.to_string().as_str(),
                element.category.as_deref().unwrap_or(""),
            ])
            .map_err(csv_error)?;
    }
    writer.flush()?;

    info!(
        "event=csv_export module=interchange status=ok rows={}",
        elements.len()
    );
    Ok(elements.len())
}

/// Imports elements whose symbol is not yet stored.
///
/// Imported rows get `atomic_number = 0`; the file format has no column
/// for it.
///
/// # Errors
/// - `Io` when the file cannot be opened.
/// - `Parse` on a malformed record, a non-numeric atomic mass or a row
///   that fails element validation.
pub fn import_elements_csv<R: ElementRepository>(
    repo: &R,
    path: impl AsRef<Path>,
) -> RepoResult<usize> {
    let file = File::open(path.as_ref())?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file);

    let header_is_empty = reader.headers().map_err(csv_error)?.is_empty();
    if header_is_empty {
        return Err(RepoError::Parse {
            line: 1,
            message: "missing header row".to_string(),
        });
    }

    let mut imported = 0;
    let mut skipped = 0;
    for result in reader.records() {
        let record = result.map_err(csv_error)?;
        if record.len() < MIN_IMPORT_FIELDS {
            skipped += 1;
            continue;
        }

        let element = match element_from_record(&record) {
            Ok(element) => element,
            Err(err) => {
                error!(
                    "event=csv_import module=interchange status=error imported={} error={}",
                    imported, err
                );
                return Err(err);
            }
        };

        if repo.get_element(&element.symbol)?.is_some() {
            skipped += 1;
            continue;
        }
        // A stored row that fails validation is invisible to reads but
        // still owns its symbol.
        match repo.create_element(&element) {
            Ok(()) => imported += 1,
            Err(RepoError::DuplicateKey(_)) => skipped += 1,
            Err(err) => return Err(err),
        }
    }

    info!(
        "event=csv_import module=interchange status=ok imported={} skipped={}",
        imported, skipped
    );
    Ok(imported)
}

fn element_from_record(record: &StringRecord) -> RepoResult<Element> {
    let line = record.position().map_or(0, |position| position.line());
    let field = |index: usize| record.get(index).unwrap_or("").trim();

    let mass_text = field(2);
    let atomic_mass = mass_text.parse::<f64>().map_err(|_| RepoError::Parse {
        line,
        message: format!("atomic mass `{mass_text}` is not a number"),
    })?;

    let element = Element::new(field(0), field(1), atomic_mass, 0).with_category(field(3));
    element.validate().map_err(|err| RepoError::Parse {
        line,
        message: err.to_string(),
    })?;
    Ok(element)
}

fn csv_error(err: ::csv::Error) -> RepoError {
    let line = err.position().map_or(0, |position| position.line());
    match err.into_kind() {
        ::csv::ErrorKind::Io(io) => RepoError::Io(io),
        ::csv::ErrorKind::Utf8 { err, .. } => RepoError::Parse {
            line,
            message: err.to_string(),
        },
        other => RepoError::Parse {
            line,
            message: format!("{other:?}"),
        },
    }
}
