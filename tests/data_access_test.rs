//! Integration tests for the DataAccess facade
//!
//! A recording connection stands in for the database, so these tests check
//! the exact SQL and parameters each operation sends for every dialect.

use std::sync::{Arc, Mutex};

use datahaus::prelude::*;
use serde_json::{Map, Value, json};

type CallLog = Arc<Mutex<Vec<(String, Vec<Value>)>>>;

/// Connection that records every statement and replays canned results
struct RecordingConnection {
    dialect: DialectProfile,
    calls: CallLog,
    rows: Vec<Record>,
    exec: ExecResult,
    closed: bool,
}

impl RecordingConnection {
    fn new(dialect: DialectProfile) -> (Self, CallLog) {
        let calls = CallLog::default();
        let connection = Self {
            dialect,
            calls: calls.clone(),
            rows: Vec::new(),
            exec: ExecResult::default(),
            closed: false,
        };
        (connection, calls)
    }

    fn with_rows(mut self, rows: Vec<Value>) -> Self {
        self.rows = rows
            .into_iter()
            .map(|row| match row {
                Value::Object(map) => map,
                _ => Map::new(),
            })
            .collect();
        self
    }

    fn with_exec(mut self, rows_affected: u64, last_insert_id: Option<i64>) -> Self {
        self.exec = ExecResult {
            rows_affected,
            last_insert_id,
        };
        self
    }

    fn record(&self, sql: &str, params: &[Value]) -> DataAccessResult<()> {
        if self.closed {
            return Err(DataAccessError::Closed);
        }
        self.calls
            .lock()
            .unwrap()
            .push((sql.to_string(), params.to_vec()));
        Ok(())
    }
}

#[async_trait::async_trait]
impl Connection for RecordingConnection {
    fn dialect(&self) -> DialectProfile {
        self.dialect
    }

    async fn fetch_all(&mut self, sql: &str, params: &[Value]) -> DataAccessResult<Vec<Record>> {
        self.record(sql, params)?;
        Ok(self.rows.clone())
    }

    async fn execute(&mut self, sql: &str, params: &[Value]) -> DataAccessResult<ExecResult> {
        self.record(sql, params)?;
        Ok(self.exec)
    }

    async fn close(&mut self) -> DataAccessResult<()> {
        self.closed = true;
        Ok(())
    }
}

fn last_call(calls: &CallLog) -> (String, Vec<Value>) {
    calls.lock().unwrap().last().cloned().expect("no statement was sent")
}

// ========================================
// Reads
// ========================================

#[tokio::test]
async fn test_read_all_limits() {
    let (connection, calls) = RecordingConnection::new(DialectProfile::Default);
    let mut db = DataAccess::with_connection(connection);

    db.read_all("users", &json!({"status": "active"}), 0).await.unwrap();
    let (sql, params) = last_call(&calls);
    assert_eq!(sql, "SELECT * FROM `users` WHERE (`status` = ?);");
    assert_eq!(params, vec![json!("active")]);

    db.read_all("users", &json!({"status": "active"}), 5).await.unwrap();
    let (sql, _) = last_call(&calls);
    assert_eq!(sql, "SELECT * FROM `users` WHERE (`status` = ?) LIMIT 5;");
}

#[tokio::test]
async fn test_get_row_returns_first_row() {
    let (connection, calls) = RecordingConnection::new(DialectProfile::Default);
    let connection = connection.with_rows(vec![json!({"id": 1, "name": "Ada"})]);
    let mut db = DataAccess::with_connection(connection);

    let row = db.get_row("users", &json!({"id": 1})).await.unwrap();
    assert_eq!(row.and_then(|r| r.get("name").cloned()), Some(json!("Ada")));

    let (sql, _) = last_call(&calls);
    assert_eq!(sql, "SELECT * FROM `users` WHERE (`id` = ?) LIMIT 1;");
}

#[tokio::test]
async fn test_get_row_without_match() {
    let (connection, _) = RecordingConnection::new(DialectProfile::Default);
    let mut db = DataAccess::with_connection(connection);

    let row = db.get_row("users", &json!({"id": 404})).await.unwrap();
    assert!(row.is_none());
}

#[tokio::test]
async fn test_get_row_sql_server() {
    let (connection, calls) = RecordingConnection::new(DialectProfile::SqlServer);
    let mut db = DataAccess::with_connection(connection);
    assert_eq!(db.dialect(), DialectProfile::SqlServer);

    db.get_row("users", &json!({"id": 7})).await.unwrap();
    let (sql, params) = last_call(&calls);
    assert_eq!(sql, "SELECT TOP 1 * FROM [users] WHERE ([id] = ?);");
    assert_eq!(params, vec![json!(7)]);
}

#[tokio::test]
async fn test_count_postgres() {
    let (connection, calls) = RecordingConnection::new(DialectProfile::Postgres);
    let connection = connection.with_rows(vec![json!({"count": 4})]);
    let mut db = DataAccess::with_connection(connection);

    let count = db.count("users", &json!({"age[>]": 30, "id": [1, 2]})).await.unwrap();
    assert_eq!(count, 4);

    let (sql, params) = last_call(&calls);
    assert_eq!(
        sql,
        "SELECT COUNT(*) FROM \"users\" WHERE (\"age\" > $1 AND \"id\" IN ($2, $3));"
    );
    assert_eq!(params, vec![json!(30), json!(1), json!(2)]);
}

#[tokio::test]
async fn test_exists_matches_count() {
    for (count, expected) in [(0, false), (1, true), (12, true)] {
        let (connection, _) = RecordingConnection::new(DialectProfile::Default);
        let connection = connection.with_rows(vec![json!({"COUNT(*)": count})]);
        let mut db = DataAccess::with_connection(connection);

        let filters = json!({"email": "ada@example.com"});
        assert_eq!(db.count("users", &filters).await.unwrap() > 0, expected);
        assert_eq!(db.exists("users", &filters).await.unwrap(), expected);
    }
}

// ========================================
// Writes
// ========================================

#[tokio::test]
async fn test_write_two_factor_code() {
    let (connection, calls) = RecordingConnection::new(DialectProfile::Default);
    let connection = connection.with_exec(1, None);
    let mut db = DataAccess::with_connection(connection);

    let affected = db
        .write("tbl_2fa_login", &json!({"2fa_id": 1}), &json!({"2fa_code": 4821}))
        .await
        .unwrap();
    assert_eq!(affected, 1);

    let (sql, params) = last_call(&calls);
    assert_eq!(
        sql,
        "UPDATE `tbl_2fa_login` SET `2fa_code` = ? WHERE (`2fa_id` = ?);"
    );
    assert_eq!(params, vec![json!(4821), json!(1)]);
}

#[tokio::test]
async fn test_write_postgres_numbering() {
    let (connection, calls) = RecordingConnection::new(DialectProfile::Postgres);
    let mut db = DataAccess::with_connection(connection);

    db.write("users", &json!({"id[IN]": [3, 4]}), &json!({"name": "Ada", "active": true}))
        .await
        .unwrap();

    let (sql, params) = last_call(&calls);
    assert_eq!(
        sql,
        "UPDATE \"users\" SET \"name\" = $1, \"active\" = $2 WHERE (\"id\" IN ($3, $4));"
    );
    assert_eq!(params, vec![json!("Ada"), json!(true), json!(3), json!(4)]);
}

#[tokio::test]
async fn test_add_row_returns_generated_id() {
    let (connection, calls) = RecordingConnection::new(DialectProfile::Default);
    let connection = connection.with_exec(1, Some(42));
    let mut db = DataAccess::with_connection(connection);

    let id = db
        .add_row("users", &json!({"name": "Ada", "email": "ada@example.com"}))
        .await
        .unwrap();
    assert_eq!(id, Some(42));

    let (sql, params) = last_call(&calls);
    assert_eq!(sql, "INSERT INTO `users` (`name`, `email`) VALUES (?, ?);");
    assert_eq!(params, vec![json!("Ada"), json!("ada@example.com")]);
}

#[tokio::test]
async fn test_rejected_shapes_send_nothing() {
    let (connection, calls) = RecordingConnection::new(DialectProfile::Default);
    let mut db = DataAccess::with_connection(connection);

    let result = db.write("users", &json!({"id": 1}), &json!({"3": "a", "5": "b"})).await;
    assert!(matches!(
        result,
        Err(DataAccessError::Builder(BuilderError::UnsupportedShape(_)))
    ));

    let result = db.add_row("users", &json!({})).await;
    assert!(matches!(
        result,
        Err(DataAccessError::Builder(BuilderError::EmptyData(_)))
    ));

    let result = db.read_all("users", &json!({"id[~*]": 1}), 0).await;
    assert!(matches!(
        result,
        Err(DataAccessError::Builder(BuilderError::UnsupportedOperator { .. }))
    ));

    assert!(calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_colliding_columns_send_nothing() {
    let (connection, calls) = RecordingConnection::new(DialectProfile::Default);
    let mut db = DataAccess::with_connection(connection);

    let data = json!({"first name": "Ada", "first_name": "Bob"});

    let result = db.write("users", &json!({"id": 1}), &data).await;
    assert!(matches!(
        result,
        Err(DataAccessError::Builder(BuilderError::ParameterCollision(ref name))) if name == "first_name"
    ));

    let result = db.add_row("users", &data).await;
    assert!(matches!(
        result,
        Err(DataAccessError::Builder(BuilderError::ParameterCollision(_)))
    ));

    assert!(calls.lock().unwrap().is_empty());
}

// ========================================
// Raw SQL
// ========================================

#[tokio::test]
async fn test_query_named_arguments() {
    let (connection, calls) = RecordingConnection::new(DialectProfile::Default);
    let mut db = DataAccess::with_connection(connection);

    db.query(
        "SELECT *\n  FROM `users`   WHERE `id` = :id OR `parent_id` = :id",
        &json!({":id": 7}),
    )
    .await
    .unwrap();

    let (sql, params) = last_call(&calls);
    assert_eq!(sql, "SELECT * FROM `users` WHERE `id` = ? OR `parent_id` = ?;");
    assert_eq!(params, vec![json!(7), json!(7)]);
}

#[tokio::test]
async fn test_query_sql_server_normalization() {
    let (connection, calls) = RecordingConnection::new(DialectProfile::SqlServer);
    let mut db = DataAccess::with_connection(connection);

    db.query("SELECT * FROM `users` WHERE `age` > ? LIMIT 3", &json!([18]))
        .await
        .unwrap();

    let (sql, params) = last_call(&calls);
    assert_eq!(sql, "SELECT TOP 3 * FROM [users] WHERE [age] > ?;");
    assert_eq!(params, vec![json!(18)]);
}

#[tokio::test]
async fn test_execute_argument_errors() {
    let (connection, calls) = RecordingConnection::new(DialectProfile::Default);
    let mut db = DataAccess::with_connection(connection);

    let result = db.execute("DELETE FROM `users` WHERE `id` = ?", &json!([1, 2])).await;
    assert!(matches!(
        result,
        Err(DataAccessError::Builder(BuilderError::ParameterCountMismatch { .. }))
    ));

    let result = db.execute("DELETE FROM `users` WHERE `id` = :id", &json!({})).await;
    assert!(matches!(
        result,
        Err(DataAccessError::Builder(BuilderError::MissingParameter(_)))
    ));

    assert!(calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_execute_returns_affected_rows() {
    let (connection, _) = RecordingConnection::new(DialectProfile::Default);
    let connection = connection.with_exec(3, None);
    let mut db = DataAccess::with_connection(connection);

    let affected = db
        .execute("DELETE FROM `sessions` WHERE `expired` = ?", &json!([true]))
        .await
        .unwrap();
    assert_eq!(affected, 3);
}

// ========================================
// Connection lifecycle
// ========================================

#[tokio::test]
async fn test_connect_rejects_invalid_config() {
    let result = DataAccess::connect(&DatabaseConfig::sqlite("")).await;
    assert!(matches!(result, Err(DataAccessError::Config(_))));
}

#[tokio::test]
async fn test_close() {
    let (connection, calls) = RecordingConnection::new(DialectProfile::Default);
    let db = DataAccess::with_connection(connection);

    db.close().await.unwrap();
    assert!(calls.lock().unwrap().is_empty());
}
