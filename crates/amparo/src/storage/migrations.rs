//! Database migration system for the flag store.
//!
//! This module handles database schema versioning and migrations,
//! ensuring stored flags stay readable as the key layout evolves.

use rusqlite::{params, Connection};
use tracing::info;

use crate::error::{Error, Result};
use crate::flags::Flag;

use super::schema::SCHEMA_STATEMENTS;

/// The current schema version.
pub const CURRENT_VERSION: i32 = 2;

/// Key used to store the schema version in the metadata table.
const VERSION_KEY: &str = "schema_version";

/// Unprefixed spellings of the launch-gate keys, resolved onto the `@` keys.
const LEGACY_KEYS: &[(&str, Flag)] = &[
    ("has_seen_onboarding", Flag::SeenOnboarding),
    ("is_authenticated", Flag::Authenticated),
    ("has_completed_setup", Flag::CompletedSetup),
];

/// Initialize the database schema.
///
/// Creates all tables if they don't exist, then runs any pending migrations
/// to bring the schema up to the current version.
///
/// # Errors
///
/// Returns an error if schema creation or migration fails.
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    for statement in SCHEMA_STATEMENTS {
        conn.execute(statement, [])?;
    }

    let version = get_schema_version(conn)?;
    if version < CURRENT_VERSION {
        run_migrations(conn, version)?;
    }

    Ok(())
}

/// Get the current schema version from the database.
///
/// Returns 0 if no version is set (fresh database).
fn get_schema_version(conn: &Connection) -> Result<i32> {
    let result: std::result::Result<String, rusqlite::Error> = conn.query_row(
        "SELECT value FROM metadata WHERE key = ?1",
        [VERSION_KEY],
        |row| row.get(0),
    );

    match result {
        Ok(value) => value.parse().map_err(|_| Error::DatabaseMigration {
            message: format!("invalid schema version: {value}"),
        }),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(0),
        Err(e) => Err(e.into()),
    }
}

/// Set the schema version in the database.
fn set_schema_version(conn: &Connection, version: i32) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO metadata (key, value) VALUES (?1, ?2)",
        (VERSION_KEY, version.to_string()),
    )?;
    Ok(())
}

/// Run migrations from the given version to the current version.
fn run_migrations(conn: &Connection, from_version: i32) -> Result<()> {
    let mut current = from_version;

    while current < CURRENT_VERSION {
        current += 1;
        run_migration(conn, current)?;
    }

    set_schema_version(conn, CURRENT_VERSION)?;
    Ok(())
}

/// Run a specific migration version.
fn run_migration(conn: &Connection, version: i32) -> Result<()> {
    match version {
        1 => migrate_v1(conn),
        2 => migrate_v2(conn),
        _ => Err(Error::DatabaseMigration {
            message: format!("unknown migration version: {version}"),
        }),
    }
}

/// Migration to version 1 (initial schema).
///
/// Version 1 is the base schema created by `SCHEMA_STATEMENTS`.
fn migrate_v1(conn: &Connection) -> Result<()> {
    set_schema_version(conn, 1)?;
    Ok(())
}

/// Migration to version 2: move unprefixed launch-gate keys to their `@` keys.
///
/// A value already stored under the current key wins over the legacy one.
fn migrate_v2(conn: &Connection) -> Result<()> {
    let mut moved = 0;
    for (legacy, flag) in LEGACY_KEYS {
        moved += conn.execute(
            r"
            INSERT OR IGNORE INTO flags (key, value, updated_at)
            SELECT ?1, value, updated_at FROM flags WHERE key = ?2
            ",
            params![flag.key(), legacy],
        )?;
        conn.execute("DELETE FROM flags WHERE key = ?1", [legacy])?;
    }
    if moved > 0 {
        info!("Migrated {} legacy flag keys", moved);
    }
    set_schema_version(conn, 2)?;
    Ok(())
}
