//! Storage layer for amparo.
//!
//! This module provides the `SQLite`-backed [`FlagStore`] that keeps setup
//! flags across restarts.

pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::flags::{self, Flag, FlagStore};

/// Durable flag store.
///
/// The connection is shared behind a mutex; every async operation runs its
/// query on the blocking thread pool.
#[derive(Debug, Clone)]
pub struct SqliteFlagStore {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Arc<Mutex<Connection>>,
}

impl SqliteFlagStore {
    /// Open or create a flag database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening flag database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        migrations::initialize_schema(&conn)?;

        info!("Flag database opened at {}", path.display());
        Ok(Self {
            path,
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Create an in-memory store.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::internal("flag database lock poisoned"))
    }

    /// Run a query on the blocking pool, reporting any failure against `flag`.
    async fn with_conn<T, F>(&self, flag: Flag, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        let outcome = tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| Error::internal("flag database lock poisoned"))?;
            op(&guard)
        })
        .await
        .map_err(|e| Error::storage_unavailable(flag.key(), e))?;

        outcome.map_err(|e| match e {
            Error::StorageUnavailable { .. } => e,
            other => Error::storage_unavailable(flag.key(), other),
        })
    }
}

fn read_value(conn: &Connection, key: &str) -> Result<Option<String>> {
    let value = conn
        .query_row("SELECT value FROM flags WHERE key = ?1", [key], |row| {
            row.get(0)
        })
        .optional()?;
    Ok(value)
}

fn write_value(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        r"
        INSERT INTO flags (key, value, updated_at) VALUES (?1, ?2, ?3)
        ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
        ",
        params![key, value, Utc::now().to_rfc3339()],
    )?;
    Ok(())
}

#[async_trait]
impl FlagStore for SqliteFlagStore {
    async fn get(&self, flag: Flag) -> Result<Option<bool>> {
        let value = self
            .with_conn(flag, move |conn| read_value(conn, flag.key()))
            .await?;
        Ok(value.map(|v| flags::decode(&v)))
    }

    async fn set(&self, flag: Flag, value: bool) -> Result<()> {
        self.with_conn(flag, move |conn| {
            write_value(conn, flag.key(), flags::encode(value))
        })
        .await?;
        debug!("Stored flag {} = {}", flag, value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_store() -> SqliteFlagStore {
        SqliteFlagStore::open_in_memory().expect("failed to create test store")
    }

    fn stored_rows(store: &SqliteFlagStore) -> Vec<(String, String)> {
        let conn = store.lock().unwrap();
        let mut stmt = conn
            .prepare("SELECT key, value FROM flags ORDER BY key ASC")
            .unwrap();
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
            .unwrap()
            .collect::<std::result::Result<Vec<(String, String)>, _>>()
            .unwrap();
        rows
    }

    fn temp_db_path(name: &str) -> PathBuf {
        let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
        std::env::temp_dir()
            .join(format!("amparo-test-{}-{nanos}", std::process::id()))
            .join(name)
    }

    #[test]
    fn test_open_in_memory() {
        let store = SqliteFlagStore::open_in_memory();
        assert!(store.is_ok());
        assert_eq!(store.unwrap().path(), Path::new(":memory:"));
    }

    #[tokio::test]
    async fn test_absent_flag_is_none() {
        let store = create_test_store();
        assert_eq!(store.get(Flag::SeenOnboarding).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_and_get() {
        let store = create_test_store();
        store.set(Flag::Authenticated, true).await.unwrap();
        assert_eq!(store.get(Flag::Authenticated).await.unwrap(), Some(true));

        store.set(Flag::Authenticated, false).await.unwrap();
        assert_eq!(store.get(Flag::Authenticated).await.unwrap(), Some(false));
    }

    #[tokio::test]
    async fn test_values_stored_as_strings() {
        let store = create_test_store();
        store.set(Flag::ElderlyRegistered, true).await.unwrap();

        assert_eq!(
            stored_rows(&store),
            vec![("elderlyRegistered".to_string(), "true".to_string())]
        );
    }

    #[tokio::test]
    async fn test_unexpected_value_reads_false() {
        let store = create_test_store();
        {
            let conn = store.lock().unwrap();
            write_value(&conn, Flag::CompletedSetup.key(), "True").unwrap();
        }
        assert_eq!(store.get(Flag::CompletedSetup).await.unwrap(), Some(false));
    }

    #[tokio::test]
    async fn test_one_row_per_key() {
        let store = create_test_store();
        store.set(Flag::NotificationsConfigured, true).await.unwrap();
        store.set(Flag::SeenOnboarding, true).await.unwrap();
        store.set(Flag::ElderlyRegistered, true).await.unwrap();

        store.set(Flag::ElderlyRegistered, false).await.unwrap();

        let keys: Vec<String> = stored_rows(&store).into_iter().map(|(key, _)| key).collect();
        assert_eq!(
            keys,
            vec![
                "@has_seen_onboarding".to_string(),
                "elderlyRegistered".to_string(),
                "notificationsConfigured".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_flags_persist_across_reopen() {
        let path = temp_db_path("flags.db");
        {
            let store = SqliteFlagStore::open(&path).unwrap();
            store.set(Flag::SeenOnboarding, true).await.unwrap();
            store.set(Flag::LocationsRegistered, true).await.unwrap();
        }

        let store = SqliteFlagStore::open(&path).unwrap();
        assert_eq!(store.get(Flag::SeenOnboarding).await.unwrap(), Some(true));
        assert_eq!(store.get(Flag::LocationsRegistered).await.unwrap(), Some(true));
        assert_eq!(store.get(Flag::Authenticated).await.unwrap(), None);

        drop(store);
        if let Some(dir) = path.parent() {
            let _ = std::fs::remove_dir_all(dir);
        }
    }

    #[tokio::test]
    async fn test_missing_table_surfaces_storage_unavailable() {
        let store = create_test_store();
        {
            let conn = store.lock().unwrap();
            conn.execute("DROP TABLE flags", []).unwrap();
        }

        let err = store.get(Flag::Authenticated).await.unwrap_err();
        assert!(matches!(err, Error::StorageUnavailable { ref key, .. } if key == "@is_authenticated"));

        let err = store.set(Flag::Authenticated, true).await.unwrap_err();
        assert!(err.is_storage_error());
    }
}
