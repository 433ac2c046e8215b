//! Core DataHaus functionality
//!
//! This module contains the [`DataAccess`] facade: generic CRUD operations over
//! a single [`Connection`], driven by declarative filter and data mappings.

use config::DatabaseConfig;
use serde_json::Value;
use sql_builder::sanitize::parse_integer;
use sql_builder::{bind_placeholders, normalize, BoundParams, BuiltStatement, DialectProfile, Statement};

use crate::connection::{Connection, ExecResult, SqlxConnection};
use crate::errors::{DataAccessError, DataAccessResult};
use crate::row::Record;

/// Data-access facade over one database session
///
/// Every operation takes `&mut self`: a `DataAccess` owns exactly one
/// connection and runs one statement at a time.
pub struct DataAccess<C: Connection = SqlxConnection> {
    connection: C,
    dialect: DialectProfile,
}

impl DataAccess<SqlxConnection> {
    /// Validate `config` and open a connection for it
    pub async fn connect(config: &DatabaseConfig) -> DataAccessResult<Self> {
        config.validate()?;
        let connection = SqlxConnection::connect(config).await?;
        Ok(Self::with_connection(connection))
    }
}

impl<C: Connection> DataAccess<C> {
    /// Wrap an already open connection
    pub fn with_connection(connection: C) -> Self {
        let dialect = connection.dialect();
        Self {
            connection,
            dialect,
        }
    }

    /// Dialect used to render every statement
    pub fn dialect(&self) -> DialectProfile {
        self.dialect
    }

    /// First row matching `filters`, if any
    pub async fn get_row(&mut self, table: &str, filters: &Value) -> DataAccessResult<Option<Record>> {
        let rows = self.read_all(table, filters, 1).await?;
        Ok(rows.into_iter().next())
    }

    /// All rows matching `filters`; `limit <= 0` means no limit
    pub async fn read_all(
        &mut self,
        table: &str,
        filters: &Value,
        limit: i64,
    ) -> DataAccessResult<Vec<Record>> {
        crate::debug_log!("[READ_ALL] Table: {}, limit: {}", table, limit);

        let built = Statement::select(table, filters, limit)?.build(self.dialect)?;
        self.fetch_built(built).await
    }

    /// Update rows matching `filters` with `data`; returns the affected row count
    pub async fn write(&mut self, table: &str, filters: &Value, data: &Value) -> DataAccessResult<u64> {
        crate::debug_log!("[WRITE] Table: {}", table);

        let built = Statement::update(table, filters, data)?.build(self.dialect)?;
        let result = self.execute_built(built).await?;
        Ok(result.rows_affected)
    }

    /// Insert one row; returns the generated id when the backend reports one
    pub async fn add_row(&mut self, table: &str, data: &Value) -> DataAccessResult<Option<i64>> {
        crate::debug_log!("[ADD_ROW] Table: {}", table);

        let built = Statement::insert(table, data)?.build(self.dialect)?;
        let result = self.execute_built(built).await?;
        Ok(result.last_insert_id)
    }

    /// Number of rows matching `filters`
    pub async fn count(&mut self, table: &str, filters: &Value) -> DataAccessResult<i64> {
        let built = Statement::count(table, filters)?.build(self.dialect)?;
        let rows = self.fetch_built(built).await?;
        first_integer(&rows)
    }

    pub async fn exists(&mut self, table: &str, filters: &Value) -> DataAccessResult<bool> {
        Ok(self.count(table, filters).await? > 0)
    }

    /// Run caller-written SQL that returns rows.
    ///
    /// `arguments` is a JSON array for `?` placeholders or an object for
    /// `:name` placeholders. The SQL is normalized for the dialect first.
    pub async fn query(&mut self, sql: &str, arguments: &Value) -> DataAccessResult<Vec<Record>> {
        let (sql, values) = self.prepare_raw(sql, arguments)?;
        crate::debug_log!("[QUERY] SQL: {}, params: {}", sql, values.len());

        self.connection.fetch_all(&sql, &values).await
    }

    /// Run caller-written SQL that returns no rows; returns the affected row count
    pub async fn execute(&mut self, sql: &str, arguments: &Value) -> DataAccessResult<u64> {
        let (sql, values) = self.prepare_raw(sql, arguments)?;
        crate::debug_log!("[EXECUTE] SQL: {}, params: {}", sql, values.len());

        let result = self.connection.execute(&sql, &values).await?;
        Ok(result.rows_affected)
    }

    /// Close the underlying connection
    pub async fn close(mut self) -> DataAccessResult<()> {
        crate::debug_log!("[CLOSE] Dialect: {}", self.dialect);
        self.connection.close().await
    }

    fn prepare_raw(&self, sql: &str, arguments: &Value) -> DataAccessResult<(String, Vec<Value>)> {
        let params = BoundParams::from_arguments(arguments)?;
        let sql = normalize(sql, self.dialect);
        Ok(bind_placeholders(&sql, &params, self.dialect)?)
    }

    async fn fetch_built(&mut self, built: BuiltStatement) -> DataAccessResult<Vec<Record>> {
        let (sql, values) = built.bind()?;
        crate::debug_log!("[FETCH] SQL: {}, params: {}", sql, values.len());

        self.connection.fetch_all(&sql, &values).await
    }

    async fn execute_built(&mut self, built: BuiltStatement) -> DataAccessResult<ExecResult> {
        let (sql, values) = built.bind()?;
        crate::debug_log!("[EXEC] SQL: {}, params: {}", sql, values.len());

        let result = self.connection.execute(&sql, &values).await?;
        crate::trace_log!(
            "[EXEC] Rows affected: {}, last insert id: {:?}",
            result.rows_affected,
            result.last_insert_id
        );
        Ok(result)
    }
}

/// First column of the first row as an integer, as returned by `COUNT(*)`
fn first_integer(rows: &[Record]) -> DataAccessResult<i64> {
    let value = rows
        .first()
        .and_then(|row| row.values().next())
        .ok_or_else(|| DataAccessError::decode("COUNT(*) returned no rows"))?;

    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .ok_or_else(|| DataAccessError::decode(format!("COUNT(*) returned {}", n))),
        Value::String(s) if s.trim().chars().all(|c| c.is_ascii_digit()) && !s.trim().is_empty() => {
            Ok(parse_integer(s))
        }
        other => Err(DataAccessError::decode(format!("COUNT(*) returned {}", other))),
    }
}
