//! Ordered schema and seed scripts.
//!
//! # Invariants
//! - Versions start at 1 and increase by one.
//! - `PRAGMA user_version` holds the last applied version.
//! - Seed scripts run only when `elements` did not exist before this
//!   migration pass. Unversioned files written by earlier tools report
//!   version 0 but already carry user data, so they are never re-seeded.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

struct Script {
    name: &'static str,
    sql: &'static str,
    /// Inserts reference data instead of changing the schema.
    seed: bool,
}

/// The position plus one is the version.
const SCRIPTS: &[Script] = &[
    Script {
        name: "init",
        sql: include_str!("0001_init.sql"),
        seed: false,
    },
    Script {
        name: "seed",
        sql: include_str!("0002_seed.sql"),
        seed: true,
    },
];

/// Highest schema version this build can produce.
pub fn latest_version() -> u32 {
    u32::try_from(SCRIPTS.len()).unwrap_or(u32::MAX)
}

/// Brings the store up to [`latest_version`] inside one transaction.
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the file was written by a newer build.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let from: u32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    let latest = latest_version();
    if from > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from,
            latest_supported: latest,
        });
    }
    if from == latest {
        return Ok(());
    }

    let fresh_store = !table_exists(conn, "elements")?;
    let tx = conn.transaction()?;
    for (version, script) in (1..=latest).zip(SCRIPTS.iter()) {
        if version <= from {
            continue;
        }
        let status = if script.seed && !fresh_store {
            "skipped"
        } else {
            tx.execute_batch(script.sql)?;
            "applied"
        };
        tx.pragma_update(None, "user_version", version)?;
        info!(
            "event=db_migrate module=db status={} version={} name={}",
            status, version, script.name
        );
    }
    tx.commit()?;
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> DbResult<bool> {
    let exists = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1);",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists)
}
