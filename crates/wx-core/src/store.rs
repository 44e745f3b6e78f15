//! Weather document storage implementation using SQLite
//!
//! Provider responses are persisted verbatim as JSON text and queried
//! with SQLite's JSON1 functions.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use serde_json::Value as JsonValue;
use tracing::{debug, info};

use crate::{Error, Result};

/// SQLite-backed document store for weather observations
pub struct WeatherStore {
    conn: Mutex<Connection>,
}

impl WeatherStore {
    /// Open (or create) a store at the given database path
    pub fn new(db_path: &str) -> Result<Self> {
        debug!("Opening weather database at: {}", db_path);

        if let Some(parent) = Path::new(db_path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(db_path)?;
        let store = Self { conn: Mutex::new(conn) };
        store.init_tables()?;
        info!("WeatherStore initialized successfully");
        Ok(store)
    }

    /// Create an in-memory store (useful for testing)
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn: Mutex::new(conn) };
        store.init_tables()?;
        Ok(store)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::Store("connection mutex poisoned".to_string()))
    }

    /// Initialize database tables
    fn init_tables(&self) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS weather_records (
                id TEXT PRIMARY KEY,
                document TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_weather_records_name
             ON weather_records (json_extract(document, '$.location.name'))",
            [],
        )?;
        Ok(())
    }

    /// Persist a provider document verbatim, returning its id
    pub fn insert(&self, document: &JsonValue) -> Result<String> {
        let id = uuid::Uuid::new_v4().to_string();
        let body = serde_json::to_string(document)?;

        self.conn()?.execute(
            "INSERT INTO weather_records (id, document, created_at) VALUES (?1, ?2, ?3)",
            params![id, body, Utc::now().to_rfc3339()],
        )?;

        debug!("Saved weather record with id: {}", id);
        Ok(id)
    }

    /// Most recent document for a city (and optional region)
    ///
    /// Matches `location.name == city`, `location.region == city`, or
    /// `location.region == region` when a region is given. Ordered by
    /// `location.localtime_epoch`, newest first.
    pub fn find_latest(&self, city: &str, region: Option<&str>) -> Result<Option<JsonValue>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT document FROM weather_records
             WHERE json_extract(document, '$.location.name') = ?1
                OR json_extract(document, '$.location.region') = ?1
                OR (?2 IS NOT NULL AND json_extract(document, '$.location.region') = ?2)
             ORDER BY json_extract(document, '$.location.localtime_epoch') DESC
             LIMIT 1",
        )?;

        let body: Option<String> = stmt
            .query_row(params![city, region], |row| row.get(0))
            .optional()?;

        match body {
            Some(body) => Ok(Some(serde_json::from_str(&body)?)),
            None => {
                debug!("No weather record for city={} region={:?}", city, region);
                Ok(None)
            }
        }
    }

    /// Count stored documents
    pub fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn()?
            .query_row("SELECT COUNT(*) FROM weather_records", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
