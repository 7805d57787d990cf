use async_trait::async_trait;
use log::{debug, info};
use mea::mutex::Mutex;
use rusqlite::{Connection, OptionalExtension, params, params_from_iter};
use serde_json::Value;
use std::{fmt, path::PathBuf, sync::Arc, time::Duration};

use silt_core::{
    backend::{StoreBackend, StoreBackendBuilder, UpsertOutcome},
    document::{DocId, Document},
    error::{StoreError, StoreResult},
    query::Query,
};

use crate::{ident::IdentGuard, query::SqlQueryTranslator};

const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Document store backend holding one persistent SQLite connection.
///
/// The connection is owned by the store value and shared behind an async
/// mutex. Each operation acquires it, runs its statements, and has committed
/// (autocommit) by the time it returns; the guard is released on every exit
/// path. Cloning shares the same connection.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
    path: Option<PathBuf>,
}

impl fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl SqliteStore {
    /// Creates a builder for an on-disk store at `path`.
    pub fn builder(path: impl Into<PathBuf>) -> SqliteStoreBuilder {
        SqliteStoreBuilder::new(path)
    }

    /// Opens a private in-memory store, for development and tests.
    pub fn in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StoreError::Initialization(e.to_string()))?;

        Ok(Self { conn: Arc::new(Mutex::new(conn)), path: None })
    }

    /// Ensures the collection table exists and returns its quoted name.
    ///
    /// Every document operation goes through here, so first use of a
    /// collection provisions it.
    fn ensure_table(conn: &Connection, name: &str) -> StoreResult<String> {
        let table = IdentGuard::quoted(name)?;

        if !Self::table_exists(conn, name)? {
            conn.execute(
                &format!(
                    "CREATE TABLE IF NOT EXISTS {table} \
                     (id INTEGER PRIMARY KEY, deleted INTEGER NOT NULL DEFAULT 0, \
                      payload TEXT NOT NULL)"
                ),
                [],
            )
            .map_err(backend_err)?;
            info!("collection {name} provisioned");
        }

        Ok(table)
    }

    fn table_exists(conn: &Connection, name: &str) -> StoreResult<bool> {
        conn.query_row(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1",
            params![name],
            |_| Ok(()),
        )
        .optional()
        .map(|row| row.is_some())
        .map_err(backend_err)
    }

    fn document_exists(conn: &Connection, table: &str, id: DocId) -> StoreResult<bool> {
        conn.query_row(
            &format!("SELECT 1 FROM {table} WHERE id = ?1"),
            params![id],
            |_| Ok(()),
        )
        .optional()
        .map(|row| row.is_some())
        .map_err(backend_err)
    }

    fn decode_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<(DocId, bool, String)> {
        Ok((row.get(0)?, row.get(1)?, row.get(2)?))
    }

    fn document_from_parts((id, deleted, payload): (DocId, bool, String)) -> StoreResult<Document> {
        Ok(Document { id, deleted, payload: serde_json::from_str(&payload)? })
    }
}

#[async_trait]
impl StoreBackend for SqliteStore {
    async fn create_collection(&self, name: &str) -> StoreResult<()> {
        let conn = self.conn.lock().await;
        Self::ensure_table(&conn, name)?;

        Ok(())
    }

    async fn collection_exists(&self, name: &str) -> StoreResult<bool> {
        let conn = self.conn.lock().await;
        Self::table_exists(&conn, name)
    }

    async fn list_collections(&self) -> StoreResult<Vec<String>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare(
                "SELECT name FROM sqlite_master \
                 WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
            )
            .map_err(backend_err)?;
        let names = stmt
            .query_map([], |row| row.get(0))
            .map_err(backend_err)?
            .collect::<rusqlite::Result<Vec<String>>>()
            .map_err(backend_err)?;

        Ok(names)
    }

    async fn insert_document(
        &self,
        collection: &str,
        id: Option<DocId>,
        payload: Value,
    ) -> StoreResult<DocId> {
        let conn = self.conn.lock().await;
        let table = Self::ensure_table(&conn, collection)?;
        let payload_text = payload.to_string();

        match id {
            Some(id) => {
                if Self::document_exists(&conn, &table, id)? {
                    return Err(StoreError::DocumentAlreadyExists(id, collection.to_string()));
                }
                conn.execute(
                    &format!("INSERT INTO {table} (id, deleted, payload) VALUES (?1, 0, ?2)"),
                    params![id, payload_text],
                )
                .map_err(backend_err)?;

                Ok(id)
            }
            None => {
                conn.execute(
                    &format!("INSERT INTO {table} (deleted, payload) VALUES (0, ?1)"),
                    params![payload_text],
                )
                .map_err(backend_err)?;

                Ok(conn.last_insert_rowid())
            }
        }
    }

    async fn get_document(&self, collection: &str, id: DocId) -> StoreResult<Document> {
        let conn = self.conn.lock().await;
        let table = Self::ensure_table(&conn, collection)?;

        let row = conn
            .query_row(
                &format!(
                    "SELECT id, deleted, payload FROM {table} WHERE id = ?1 AND deleted = 0"
                ),
                params![id],
                Self::decode_row,
            )
            .optional()
            .map_err(backend_err)?;

        match row {
            Some(parts) => Self::document_from_parts(parts),
            None => Err(StoreError::DocumentNotFound(id, collection.to_string())),
        }
    }

    async fn upsert_document(
        &self,
        collection: &str,
        id: DocId,
        payload: Value,
    ) -> StoreResult<UpsertOutcome> {
        let conn = self.conn.lock().await;
        let table = Self::ensure_table(&conn, collection)?;
        let payload_text = payload.to_string();

        // Existence ignores the soft-delete state: modifying a soft-deleted
        // document replaces its payload and leaves the flag set.
        if Self::document_exists(&conn, &table, id)? {
            conn.execute(
                &format!("UPDATE {table} SET payload = ?1 WHERE id = ?2"),
                params![payload_text, id],
            )
            .map_err(backend_err)?;

            Ok(UpsertOutcome::Updated)
        } else {
            conn.execute(
                &format!("INSERT INTO {table} (id, deleted, payload) VALUES (?1, 0, ?2)"),
                params![id, payload_text],
            )
            .map_err(backend_err)?;

            Ok(UpsertOutcome::Created)
        }
    }

    async fn soft_delete_document(&self, collection: &str, id: DocId) -> StoreResult<()> {
        let conn = self.conn.lock().await;
        let table = Self::ensure_table(&conn, collection)?;

        // Zero affected rows means already deleted or never present; both are
        // fine, the operation is idempotent.
        conn.execute(&format!("UPDATE {table} SET deleted = 1 WHERE id = ?1"), params![id])
            .map_err(backend_err)?;

        Ok(())
    }

    async fn count_documents(&self, collection: &str, include_deleted: bool) -> StoreResult<u64> {
        let conn = self.conn.lock().await;
        let table = Self::ensure_table(&conn, collection)?;

        let sql = if include_deleted {
            format!("SELECT COUNT(*) FROM {table}")
        } else {
            format!("SELECT COUNT(*) FROM {table} WHERE deleted = 0")
        };
        let count: i64 = conn
            .query_row(&sql, [], |row| row.get(0))
            .map_err(backend_err)?;

        Ok(count as u64)
    }

    async fn list_documents(
        &self,
        collection: &str,
        include_deleted: bool,
    ) -> StoreResult<Vec<Document>> {
        let conn = self.conn.lock().await;
        let table = Self::ensure_table(&conn, collection)?;

        let sql = if include_deleted {
            format!("SELECT id, deleted, payload FROM {table} ORDER BY id DESC")
        } else {
            format!("SELECT id, deleted, payload FROM {table} WHERE deleted = 0 ORDER BY id DESC")
        };
        let mut stmt = conn.prepare(&sql).map_err(backend_err)?;
        let rows = stmt
            .query_map([], Self::decode_row)
            .map_err(backend_err)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(backend_err)?;

        rows.into_iter()
            .map(Self::document_from_parts)
            .collect()
    }

    async fn query_documents(&self, query: Query, collection: &str) -> StoreResult<Vec<Document>> {
        let conn = self.conn.lock().await;
        let table = Self::ensure_table(&conn, collection)?;

        let statement = SqlQueryTranslator::select(&table, &query);
        debug!("executing query: {}", statement.sql);

        let mut stmt = conn.prepare(&statement.sql).map_err(query_err)?;
        let rows = stmt
            .query_map(params_from_iter(statement.params), Self::decode_row)
            .map_err(query_err)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(query_err)?;

        rows.into_iter()
            .map(Self::document_from_parts)
            .collect()
    }
}

fn backend_err(err: rusqlite::Error) -> StoreError {
    StoreError::Backend(err.to_string())
}

fn query_err(err: rusqlite::Error) -> StoreError {
    StoreError::QueryExecution(err.to_string())
}

/// Builder for on-disk [`SqliteStore`] instances.
pub struct SqliteStoreBuilder {
    path: PathBuf,
    busy_timeout: Duration,
    wal: bool,
}

impl SqliteStoreBuilder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
            wal: true,
        }
    }

    /// How long the engine waits on a locked database before giving up.
    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    /// Whether the database uses write-ahead logging (on by default).
    pub fn wal(mut self, wal: bool) -> Self {
        self.wal = wal;
        self
    }
}

#[async_trait]
impl StoreBackendBuilder for SqliteStoreBuilder {
    type Backend = SqliteStore;

    async fn build(self) -> StoreResult<Self::Backend> {
        let conn = Connection::open(&self.path)
            .map_err(|e| StoreError::Initialization(e.to_string()))?;
        conn.busy_timeout(self.busy_timeout)
            .map_err(|e| StoreError::Initialization(e.to_string()))?;
        if self.wal {
            conn.pragma_update(None, "journal_mode", "wal")
                .map_err(|e| StoreError::Initialization(e.to_string()))?;
        }

        Ok(SqliteStore {
            conn: Arc::new(Mutex::new(conn)),
            path: Some(self.path),
        })
    }
}
