//! Durable storage for radio session state.
//!
//! The radio only needs a tiny key/value store: one JSON document per
//! logical state name. [`SqliteStore`] keeps it in a `SQLite` database in the
//! platform data directory, [`MemoryStore`] keeps it in-process.

use crate::state::SessionState;
use anyhow::{Context, Result};
use log::{debug, trace};
use rusqlite::{Connection, OptionalExtension};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// Logical name the radio state is saved under.
pub const STATE_NAME: &str = "radio-state";

/// Key/value persistence for [`SessionState`].
pub trait StateStore {
    /// Load the state saved under `name`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be read or the saved
    /// document is not a valid state.
    fn load(&self, name: &str) -> Result<Option<SessionState>>;

    /// Save `state` under `name`, replacing any previous document.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be serialized or written.
    fn save(&self, name: &str, state: &SessionState) -> Result<()>;

    /// Remove the state saved under `name`. Removing a missing state is not
    /// an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn clear(&self, name: &str) -> Result<()>;
}

/// `SQLite` backed store. One row per state name.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) the database at `db_path` and make sure the state
    /// table exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or the table
    /// cannot be created.
    pub fn open(db_path: &Path) -> Result<Self> {
        let conn = Connection::open(db_path)
            .with_context(|| format!("Failed to open radio database at {}", db_path.display()))?;
        debug!("Opened radio database at {}", db_path.display());
        Self::init(conn)
    }

    /// Database that lives only as long as the store. Good for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if `SQLite` cannot allocate the database.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory radio database")?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS radio_state (
                name       TEXT    PRIMARY KEY,
                data       TEXT    NOT NULL,
                updated_at INTEGER NOT NULL
            )",
            (),
        )
        .context("Invalid SQL command when CREATEing radio_state TABLE")?;

        Ok(Self { conn })
    }
}

impl StateStore for SqliteStore {
    fn load(&self, name: &str) -> Result<Option<SessionState>> {
        let data: Option<String> = self
            .conn
            .query_row("SELECT data FROM radio_state WHERE name = ?1", [name], |row| row.get(0))
            .optional()
            .with_context(|| format!("Failed to SELECT radio state `{name}'"))?;

        data.map(|json| decode(name, &json)).transpose()
    }

    fn save(&self, name: &str, state: &SessionState) -> Result<()> {
        let json = encode(name, state)?;
        self.conn
            .execute(
                "INSERT INTO radio_state (name, data, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(name) DO UPDATE SET data = excluded.data, updated_at = excluded.updated_at",
                (name, &json, unix_now()),
            )
            .with_context(|| format!("Failed to save radio state `{name}'"))?;
        trace!("Saved radio state `{name}' ({} bytes)", json.len());
        Ok(())
    }

    fn clear(&self, name: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM radio_state WHERE name = ?1", [name])
            .with_context(|| format!("Failed to DELETE radio state `{name}'"))?;
        Ok(())
    }
}

/// In-process store. Still round-trips through JSON so it behaves like the
/// durable one.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with `state` under `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if `state` cannot be serialized.
    pub fn with_state(name: &str, state: &SessionState) -> Result<Self> {
        let store = Self::new();
        store.save(name, state)?;
        Ok(store)
    }
}

impl StateStore for MemoryStore {
    fn load(&self, name: &str) -> Result<Option<SessionState>> {
        self.documents
            .borrow()
            .get(name)
            .map(|json| decode(name, json))
            .transpose()
    }

    fn save(&self, name: &str, state: &SessionState) -> Result<()> {
        let json = encode(name, state)?;
        self.documents.borrow_mut().insert(name.to_string(), json);
        Ok(())
    }

    fn clear(&self, name: &str) -> Result<()> {
        self.documents.borrow_mut().remove(name);
        Ok(())
    }
}

fn encode(name: &str, state: &SessionState) -> Result<String> {
    serde_json::to_string(state).with_context(|| format!("Failed to serialize radio state `{name}'"))
}

fn decode(name: &str, json: &str) -> Result<SessionState> {
    serde_json::from_str(json).with_context(|| format!("Saved radio state `{name}' is corrupt"))
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_secs()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_state() -> SessionState {
        let mut state = SessionState::new();
        state.push_played("t1", 25);
        state.push_played("t2", 25);
        state
            .cache
            .insert("related_artists_a".to_string(), serde_json::json!(["b", "c"]));
        state
    }

    #[test]
    fn test_sqlite_missing_state_is_none() {
        let store = SqliteStore::open_in_memory().expect("in-memory db");
        assert!(store.load(STATE_NAME).expect("load").is_none());
    }

    #[test]
    fn test_sqlite_save_then_load() {
        let store = SqliteStore::open_in_memory().expect("in-memory db");
        let state = sample_state();

        store.save(STATE_NAME, &state).expect("save");
        assert_eq!(store.load(STATE_NAME).expect("load"), Some(state));
    }

    #[test]
    fn test_sqlite_save_overwrites() {
        let store = SqliteStore::open_in_memory().expect("in-memory db");
        store.save(STATE_NAME, &sample_state()).expect("first save");
        store.save(STATE_NAME, &SessionState::new()).expect("second save");

        assert_eq!(store.load(STATE_NAME).expect("load"), Some(SessionState::new()));
    }

    #[test]
    fn test_sqlite_clear() {
        let store = SqliteStore::open_in_memory().expect("in-memory db");
        store.save(STATE_NAME, &sample_state()).expect("save");
        store.clear(STATE_NAME).expect("clear");
        store.clear(STATE_NAME).expect("clearing twice is fine");

        assert!(store.load(STATE_NAME).expect("load").is_none());
    }

    #[test]
    fn test_sqlite_persists_across_connections() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("radio.db");

        SqliteStore::open(&db_path)
            .expect("open")
            .save(STATE_NAME, &sample_state())
            .expect("save");

        let reopened = SqliteStore::open(&db_path).expect("reopen");
        assert_eq!(reopened.load(STATE_NAME).expect("load"), Some(sample_state()));
    }

    #[test]
    fn test_sqlite_open_in_missing_directory_fails() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("missing").join("radio.db");

        let err = SqliteStore::open(&db_path).expect_err("parent directory does not exist");
        assert!(err.to_string().contains("Failed to open radio database"));
    }

    #[test]
    fn test_sqlite_corrupt_state_is_error() {
        let store = SqliteStore::open_in_memory().expect("in-memory db");
        store
            .conn
            .execute(
                "INSERT INTO radio_state (name, data, updated_at) VALUES (?1, 'not json', 0)",
                [STATE_NAME],
            )
            .expect("raw insert");

        let err = store.load(STATE_NAME).expect_err("corrupt data must not load");
        assert!(err.to_string().contains("corrupt"));
    }

    #[test]
    fn test_memory_store_names_are_independent() {
        let store = MemoryStore::with_state("one", &sample_state()).expect("seed");

        assert!(store.load("two").expect("load").is_none());
        assert_eq!(store.load("one").expect("load"), Some(sample_state()));

        store.clear("one").expect("clear");
        assert!(store.load("one").expect("load").is_none());
    }
}
