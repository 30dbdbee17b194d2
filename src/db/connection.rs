use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use thiserror::Error;
use tracing::{debug, info};

/// Name of the single business table. Lookups against it are
/// case-insensitive, the creation statement uses this exact spelling.
pub const CONTACT_TABLE: &str = "Contact";

const CREATE_CONTACT_TABLE: &str = "CREATE TABLE Contact (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    last_name TEXT NOT NULL,
    first_name TEXT NOT NULL,
    address TEXT,
    phone_number TEXT,
    email TEXT
)";

const TABLE_EXISTS: &str = "SELECT COUNT(*) AS matches FROM sqlite_master
     WHERE type = 'table' AND lower(name) = lower(?1)";

/// Failures raised by the storage layer. Construction errors come back from
/// `Store::open` so the caller decides whether the UI may start at all.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to create data directory {path}")]
    DataDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to open database at {path}")]
    Open {
        path: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("database at {path} is in use by another process")]
    Locked {
        path: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("failed to check whether table {table} exists")]
    SchemaCheck {
        table: &'static str,
        #[source]
        source: Box<StoreError>,
    },

    #[error("failed to create table {table}")]
    SchemaCreate {
        table: &'static str,
        #[source]
        source: Box<StoreError>,
    },

    #[error("statement failed: {sql}")]
    Statement {
        sql: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("column {column} missing or of unexpected type")]
    Column { column: String },

    #[error("failed to close database")]
    Close(#[source] rusqlite::Error),

    #[error("database connection is closed")]
    Closed,
}

/// Hold the file lock for the lifetime of `conn` so a second process cannot
/// open the same database. Fails at once instead of waiting for the lock.
fn lock_exclusively(conn: &Connection, path: &Path) -> Result<(), StoreError> {
    let open_error = |source: rusqlite::Error| StoreError::Open {
        path: path.display().to_string(),
        source,
    };
    conn.busy_timeout(Duration::ZERO).map_err(open_error)?;
    conn.pragma_update_and_check(None, "locking_mode", "EXCLUSIVE", |row| {
        row.get::<_, String>(0)
    })
    .map_err(open_error)?;
    conn.execute_batch("BEGIN EXCLUSIVE; COMMIT;")
        .map_err(|source| StoreError::Locked {
            path: path.display().to_string(),
            source,
        })
}

/// Owner of the one live SQLite handle. Every read and write in the
/// application goes through the four primitives below.
pub struct Store {
    conn: Option<Connection>,
}

impl Store {
    /// Open (creating if absent) the database file at `path` and make sure the
    /// contact table exists.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| StoreError::DataDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let conn = Connection::open(path).map_err(|source| StoreError::Open {
            path: path.display().to_string(),
            source,
        })?;
        lock_exclusively(&conn, path)?;
        info!(path = %path.display(), "database connection established");
        Self::from_connection(conn)
    }

    /// Private, throwaway database used by tests.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(|source| StoreError::Open {
            path: ":memory:".to_string(),
            source,
        })?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        let store = Self { conn: Some(conn) };
        store.ensure_contact_table()?;
        Ok(store)
    }

    fn ensure_contact_table(&self) -> Result<(), StoreError> {
        let exists = self
            .table_exists(CONTACT_TABLE)
            .map_err(|source| StoreError::SchemaCheck {
                table: CONTACT_TABLE,
                source: Box::new(source),
            })?;
        if exists {
            debug!(table = CONTACT_TABLE, "table already present");
            return Ok(());
        }

        self.update(CREATE_CONTACT_TABLE)
            .map_err(|source| StoreError::SchemaCreate {
                table: CONTACT_TABLE,
                source: Box::new(source),
            })?;
        info!(table = CONTACT_TABLE, "table created");
        Ok(())
    }

    /// Case-insensitive check against `sqlite_master`.
    pub fn table_exists(&self, name: &str) -> Result<bool, StoreError> {
        let result = self.query_with_params(TABLE_EXISTS, &[name])?;
        let matches = result
            .rows()
            .next()
            .and_then(|row| row.integer("matches"))
            .unwrap_or(0);
        Ok(matches > 0)
    }

    /// Run a read-only statement without parameters.
    pub fn query(&self, sql: &str) -> Result<ResultSet, StoreError> {
        self.query_with_params(sql, &[])
    }

    /// Run a read-only statement, binding `params` to the positional
    /// placeholders in order.
    pub fn query_with_params(&self, sql: &str, params: &[&str]) -> Result<ResultSet, StoreError> {
        let conn = self.connection()?;
        let statement_error = |source| StoreError::Statement {
            sql: sql.to_string(),
            source,
        };

        let mut stmt = conn.prepare(sql).map_err(statement_error)?;
        let columns: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect();
        let width = columns.len();

        let mut rows = stmt
            .query(params_from_iter(params.iter().copied()))
            .map_err(statement_error)?;
        let mut collected = Vec::new();
        while let Some(row) = rows.next().map_err(statement_error)? {
            let mut values = Vec::with_capacity(width);
            for idx in 0..width {
                values.push(row.get::<_, Value>(idx).map_err(statement_error)?);
            }
            collected.push(values);
        }

        Ok(ResultSet {
            columns,
            rows: collected,
        })
    }

    /// Run a mutating statement without parameters, returning the number of
    /// affected rows.
    pub fn update(&self, sql: &str) -> Result<usize, StoreError> {
        self.update_with_params(sql, &[])
    }

    /// Run a mutating statement with positional text parameters.
    pub fn update_with_params(&self, sql: &str, params: &[&str]) -> Result<usize, StoreError> {
        let conn = self.connection()?;
        conn.execute(sql, params_from_iter(params.iter().copied()))
            .map_err(|source| StoreError::Statement {
                sql: sql.to_string(),
                source,
            })
    }

    /// Row id generated by the most recent successful insert.
    pub fn last_insert_id(&self) -> Result<i64, StoreError> {
        Ok(self.connection()?.last_insert_rowid())
    }

    pub fn is_open(&self) -> bool {
        self.conn.is_some()
    }

    /// Release the handle. Only the first call does anything; the connection
    /// is gone afterwards even when SQLite reports an error while closing.
    pub fn close(&mut self) -> Result<(), StoreError> {
        let Some(conn) = self.conn.take() else {
            return Ok(());
        };
        conn.close().map_err(|(_, err)| StoreError::Close(err))?;
        info!("database connection closed");
        Ok(())
    }

    fn connection(&self) -> Result<&Connection, StoreError> {
        self.conn.as_ref().ok_or(StoreError::Closed)
    }
}

/// Materialized rows of a query, detached from the statement that produced
/// them.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl ResultSet {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate rows in the order the engine returned them.
    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().map(move |values| Row {
            columns: &self.columns,
            values,
        })
    }
}

/// Borrowed view of a single row.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    columns: &'a [String],
    values: &'a [Value],
}

impl<'a> Row<'a> {
    /// Raw value by column name, compared case-insensitively.
    pub fn value(&self, column: &str) -> Option<&'a Value> {
        let idx = self
            .columns
            .iter()
            .position(|name| name.eq_ignore_ascii_case(column))?;
        self.values.get(idx)
    }

    /// Text column; `None` for SQL NULL or non-text values.
    pub fn text(&self, column: &str) -> Option<&'a str> {
        match self.value(column)? {
            Value::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn integer(&self, column: &str) -> Option<i64> {
        match self.value(column)? {
            Value::Integer(value) => Some(*value),
            _ => None,
        }
    }
}
