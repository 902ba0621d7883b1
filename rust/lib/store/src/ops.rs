//! CRUD operations for a [`ResourceDef`] over an open connection.
//!
//! Every operation runs inside the caller's connection, so several calls
//! made for one request share its transaction.

use scanguard_core::ServiceError;
use scanguard_sql::{Row, SQLConnection, SQLError, Value};

use crate::filter::{Filter, where_clause};
use crate::resource::{Draft, ResourceDef};

/// Map a typed model out of a row.
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> Result<Self, ServiceError>;
}

/// Map every row, failing on the first bad one.
pub fn rows_into<T: FromRow>(rows: &[Row]) -> Result<Vec<T>, ServiceError> {
    rows.iter().map(T::from_row).collect()
}

/// Translate a driver error. Connection failures become `Unavailable`.
pub fn storage_err(e: SQLError) -> ServiceError {
    match e {
        SQLError::Connection(msg) => ServiceError::Unavailable(msg),
        other => ServiceError::Storage(other.to_string()),
    }
}

impl ResourceDef {
    /// Insert a record and return the stored row, server defaults included.
    pub fn insert(&self, conn: &mut dyn SQLConnection, draft: &Draft) -> Result<Row, ServiceError> {
        let values = draft.values();
        if values.is_empty() {
            return Err(ServiceError::Internal(format!("empty {} insert", self.label)));
        }
        let cols: Vec<&str> = values.iter().map(|(c, _)| *c).collect();
        let placeholders: Vec<String> = (1..=values.len()).map(|i| format!("?{i}")).collect();
        let params: Vec<Value> = values.iter().map(|(_, v)| v.clone()).collect();

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING *",
            self.table,
            cols.join(", "),
            placeholders.join(", "),
        );
        let rows = conn.query(&sql, &params).map_err(storage_err)?;
        rows.into_iter()
            .next()
            .ok_or_else(|| ServiceError::Storage(format!("{} insert returned no row", self.label)))
    }

    /// Newest-first rows matching `filters`, at most `limit`.
    pub fn list(
        &self,
        conn: &mut dyn SQLConnection,
        filters: &[Filter],
        limit: usize,
    ) -> Result<Vec<Row>, ServiceError> {
        let (where_sql, mut params) = where_clause(filters);
        let sql = format!(
            "SELECT * FROM {} {where_sql} ORDER BY {} DESC, id DESC LIMIT ?{}",
            self.table,
            self.order_by,
            params.len() + 1
        );
        params.push(Value::Integer(limit as i64));
        conn.query(&sql, &params).map_err(storage_err)
    }

    /// The newest row matching `filters`, if any.
    pub fn latest(
        &self,
        conn: &mut dyn SQLConnection,
        filters: &[Filter],
    ) -> Result<Option<Row>, ServiceError> {
        Ok(self.list(conn, filters, 1)?.into_iter().next())
    }

    /// Find a row by a column value.
    pub fn find(
        &self,
        conn: &mut dyn SQLConnection,
        column: &'static str,
        value: Value,
    ) -> Result<Option<Row>, ServiceError> {
        self.latest(conn, &[Filter::Eq(column, value)])
    }

    /// Count rows matching `filters`.
    pub fn count(&self, conn: &mut dyn SQLConnection, filters: &[Filter]) -> Result<i64, ServiceError> {
        let value = self.aggregate(conn, "COUNT(*)", filters)?;
        match value {
            Value::Integer(n) => Ok(n),
            other => Err(ServiceError::Storage(format!("unexpected count value {other:?}"))),
        }
    }

    /// Evaluate one aggregate expression (`AVG(distance)`, `MAX(created_at)`)
    /// over the rows matching `filters`. Empty sets yield `Value::Null`
    /// for everything but `COUNT`.
    pub fn aggregate(
        &self,
        conn: &mut dyn SQLConnection,
        expr: &str,
        filters: &[Filter],
    ) -> Result<Value, ServiceError> {
        let (where_sql, params) = where_clause(filters);
        let sql = format!("SELECT {expr} AS value FROM {} {where_sql}", self.table);
        let rows = conn.query(&sql, &params).map_err(storage_err)?;
        Ok(rows
            .first()
            .and_then(|r| r.get("value").cloned())
            .unwrap_or(Value::Null))
    }

    /// Retention: delete every row except the newest `keep`.
    /// Returns the number of rows deleted.
    pub fn retain_newest(&self, conn: &mut dyn SQLConnection, keep: usize) -> Result<u64, ServiceError> {
        let sql = format!(
            "DELETE FROM {table} WHERE id NOT IN (\
                SELECT id FROM {table} ORDER BY {order} DESC, id DESC LIMIT ?1\
             )",
            table = self.table,
            order = self.order_by,
        );
        conn.exec(&sql, &[Value::Integer(keep as i64)])
            .map_err(storage_err)
    }
}
