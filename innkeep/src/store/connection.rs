//! Store connection management.
//!
//! This module provides the store handle with the PRAGMA settings the rest
//! of the crate relies on for concurrent access.

use rusqlite::{Connection, OpenFlags, TransactionBehavior};

use crate::error::Result;

use super::config::StoreConfig;

/// A handle to the innkeep store.
///
/// The handle wraps a `SQLite` connection configured for concurrent
/// access: WAL journal mode, `synchronous = NORMAL`, enforced foreign
/// keys, and a busy timeout so writers queue on the write lock instead of
/// failing immediately. Components receive the handle explicitly at
/// construction; there is no process-wide singleton.
///
/// # Examples
///
/// ```no_run
/// use innkeep::{Store, StoreConfig};
///
/// let config = StoreConfig::new("/tmp/innkeep.db");
/// let store = Store::open(config).unwrap();
/// ```
#[derive(Debug)]
pub struct Store {
    pub(super) conn: Connection,
    #[allow(dead_code)]
    config: StoreConfig,
}

impl Store {
    /// Opens the store with the given configuration.
    ///
    /// This function will:
    /// - Create the parent directory if `auto_create` is enabled
    /// - Open the database with appropriate flags
    /// - Set WAL mode, busy timeout, and foreign key enforcement
    /// - Initialize or verify the schema
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened, the PRAGMAs cannot
    /// be applied, or schema initialization/verification fails.
    pub fn open(config: StoreConfig) -> Result<Self> {
        if config.auto_create && !config.path.exists() {
            if let Some(parent) = config.path.parent() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let flags = if config.read_only {
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX
        } else if config.auto_create {
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX
        } else {
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX
        };

        let conn = Connection::open_with_flags(&config.path, flags)?;

        // PRAGMA journal_mode returns a row, so it needs query_row.
        let _: String = conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
        conn.execute_batch("PRAGMA synchronous = NORMAL")?;
        conn.execute_batch("PRAGMA foreign_keys = ON")?;
        conn.execute_batch(&format!(
            "PRAGMA busy_timeout = {}",
            config.busy_timeout.as_millis()
        ))?;

        super::migrations::check_schema_compatibility(&conn)?;

        Ok(Self { conn, config })
    }

    /// Returns a reference to the underlying `SQLite` connection.
    #[must_use]
    pub const fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Returns a mutable reference to the underlying `SQLite` connection.
    pub fn connection_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }

    /// Begins a write transaction, taking the write lock immediately.
    ///
    /// Every multi-step unit of work in the crate runs inside one of
    /// these: the lock is held from the first read, so a check performed
    /// inside the transaction cannot be invalidated by a concurrent
    /// writer before the matching write commits. Dropping the returned
    /// transaction without committing rolls back every statement issued
    /// through it.
    ///
    /// # Errors
    ///
    /// Returns an error if the write lock cannot be acquired within the
    /// configured busy timeout.
    pub fn begin_transaction(&mut self) -> Result<rusqlite::Transaction<'_>> {
        Ok(self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?)
    }
}
