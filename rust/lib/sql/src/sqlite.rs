use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::Connection;

use crate::error::SQLError;
use crate::traits::{Row, SQLConnection, SQLGateway, Value};

/// SqliteGateway is a SQLGateway backed by rusqlite (bundled SQLite).
///
/// Every [`SQLGateway::connect`] opens the database file anew and begins a
/// transaction; nothing is cached between calls.
pub struct SqliteGateway {
    path: PathBuf,
    busy_timeout: Duration,
}

impl SqliteGateway {
    /// Create a gateway for the database at `path`. Does not touch the file.
    pub fn new(path: impl Into<PathBuf>, busy_timeout: Duration) -> Self {
        Self {
            path: path.into(),
            busy_timeout,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SQLGateway for SqliteGateway {
    fn connect(&self) -> Result<Box<dyn SQLConnection>, SQLError> {
        let conn = Connection::open(&self.path)
            .map_err(|e| SQLError::Connection(e.to_string()))?;
        conn.busy_timeout(self.busy_timeout)
            .map_err(|e| SQLError::Connection(e.to_string()))?;

        // WAL keeps readers from blocking the ingest writer.
        conn.query_row("PRAGMA journal_mode=WAL", [], |_| Ok(()))
            .map_err(|e| SQLError::Connection(e.to_string()))?;
        conn.execute_batch("BEGIN")
            .map_err(|e| SQLError::Connection(e.to_string()))?;

        Ok(Box::new(SqliteConnection {
            conn,
            finished: false,
        }))
    }
}

/// A single SQLite connection with an open transaction.
pub struct SqliteConnection {
    conn: Connection,
    finished: bool,
}

/// Convert our Value enum to rusqlite's ToSql.
fn bind_params(params: &[Value]) -> Vec<Box<dyn rusqlite::types::ToSql + '_>> {
    params
        .iter()
        .map(|v| -> Box<dyn rusqlite::types::ToSql + '_> {
            match v {
                Value::Null => Box::new(rusqlite::types::Null),
                Value::Integer(i) => Box::new(*i),
                Value::Real(f) => Box::new(*f),
                Value::Text(s) => Box::new(s.as_str()),
                Value::Blob(b) => Box::new(b.as_slice()),
            }
        })
        .collect()
}

impl SQLConnection for SqliteConnection {
    fn query(&mut self, sql: &str, params: &[Value]) -> Result<Vec<Row>, SQLError> {
        let bound = bind_params(params);
        let param_refs: Vec<&dyn rusqlite::types::ToSql> =
            bound.iter().map(|b| b.as_ref()).collect();

        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|e| SQLError::Query(e.to_string()))?;

        let column_names: Vec<String> = stmt
            .column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        let rows = stmt
            .query_map(param_refs.as_slice(), |row| {
                let mut columns = Vec::with_capacity(column_names.len());
                for (i, name) in column_names.iter().enumerate() {
                    columns.push((name.clone(), row_value_at(row, i)));
                }
                Ok(Row { columns })
            })
            .map_err(|e| SQLError::Query(e.to_string()))?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row.map_err(|e| SQLError::Query(e.to_string()))?);
        }
        Ok(result)
    }

    fn exec(&mut self, sql: &str, params: &[Value]) -> Result<u64, SQLError> {
        let bound = bind_params(params);
        let param_refs: Vec<&dyn rusqlite::types::ToSql> =
            bound.iter().map(|b| b.as_ref()).collect();

        let affected = self
            .conn
            .execute(sql, param_refs.as_slice())
            .map_err(|e| SQLError::Execution(e.to_string()))?;

        Ok(affected as u64)
    }

    fn exec_batch(&mut self, sql: &str) -> Result<(), SQLError> {
        self.conn
            .execute_batch(sql)
            .map_err(|e| SQLError::Execution(e.to_string()))
    }

    fn commit(mut self: Box<Self>) -> Result<(), SQLError> {
        self.finished = true;
        self.conn
            .execute_batch("COMMIT")
            .map_err(|e| SQLError::Execution(e.to_string()))
    }
}

impl Drop for SqliteConnection {
    fn drop(&mut self) {
        if !self.finished {
            if let Err(e) = self.conn.execute_batch("ROLLBACK") {
                tracing::debug!("rollback on drop failed: {}", e);
            }
        }
    }
}

/// Extract a Value from a rusqlite row at a given column index.
fn row_value_at(row: &rusqlite::Row, idx: usize) -> Value {
    // Try integer first, then real, then text, then blob, then null.
    if let Ok(i) = row.get::<_, i64>(idx) {
        return Value::Integer(i);
    }
    if let Ok(f) = row.get::<_, f64>(idx) {
        return Value::Real(f);
    }
    if let Ok(s) = row.get::<_, String>(idx) {
        return Value::Text(s);
    }
    if let Ok(b) = row.get::<_, Vec<u8>>(idx) {
        return Value::Blob(b);
    }
    Value::Null
}
