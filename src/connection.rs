//! Connection seam
//!
//! [`DataAccess`](crate::DataAccess) talks to the database only through the
//! [`Connection`] trait. [`SqlxConnection`] is the production implementation:
//! MySQL sessions use `sqlx`'s native MySQL driver so every column type can be
//! decoded, SQLite and PostgreSQL go through the `Any` driver. Tests and SQL
//! Server deployments plug in their own.

use async_trait::async_trait;
use config::DatabaseConfig;
use serde::Serialize;
use serde_json::Value;
use sql_builder::DialectProfile;
use sqlx::any::Any;
use sqlx::AnyConnection;
#[cfg(feature = "mysql")]
use sqlx::mysql::{MySql, MySqlConnection};
use sqlx::Connection as _;

use crate::errors::{DataAccessError, DataAccessResult};
#[cfg(feature = "mysql")]
use crate::row::decode_mysql_row;
use crate::row::{decode_row, Record};

/// Outcome of a statement that returns no rows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExecResult {
    pub rows_affected: u64,
    pub last_insert_id: Option<i64>,
}

/// A single database session that executes positional-placeholder SQL
#[async_trait]
pub trait Connection: Send {
    /// SQL flavour spoken by the server on the other end
    fn dialect(&self) -> DialectProfile;

    /// Run a row-returning statement
    async fn fetch_all(&mut self, sql: &str, params: &[Value]) -> DataAccessResult<Vec<Record>>;

    /// Run a statement that returns no rows
    async fn execute(&mut self, sql: &str, params: &[Value]) -> DataAccessResult<ExecResult>;

    /// Close the session; later calls fail with [`DataAccessError::Closed`].
    /// Closing twice is a no-op.
    async fn close(&mut self) -> DataAccessResult<()>;
}

/// Bind a JSON value with the closest native type the `Any` driver accepts
macro_rules! bind_json_param {
    ($query:expr, $param:expr) => {
        match $param {
            Value::String(s) => $query.bind(s),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    $query.bind(i)
                } else if let Some(f) = n.as_f64() {
                    $query.bind(f)
                } else {
                    $query.bind(n.to_string())
                }
            }
            Value::Bool(b) => $query.bind(b),
            Value::Null => $query.bind(Option::<String>::None),
            other => $query.bind(other.to_string()),
        }
    };
}

/// Prepare `sql` for database `$db` with every JSON parameter bound in order
macro_rules! bound_query {
    ($db:ty, $sql:expr, $params:expr) => {{
        let mut query = sqlx::query::<$db>($sql);
        for param in $params {
            query = bind_json_param!(query, param.clone());
        }
        query
    }};
}

fn is_sqlite_driver(driver: &str) -> bool {
    matches!(driver.trim().to_ascii_lowercase().as_str(), "sqlite" | "sqlite3")
}

/// Fail early when the configured driver was not compiled in
fn ensure_driver(driver: &str, dialect: DialectProfile) -> DataAccessResult<()> {
    let compiled = match dialect {
        DialectProfile::SqlServer => false,
        DialectProfile::Postgres => cfg!(feature = "postgres"),
        DialectProfile::Default if is_sqlite_driver(driver) => cfg!(feature = "sqlite"),
        DialectProfile::Default => cfg!(feature = "mysql"),
    };

    if compiled {
        Ok(())
    } else {
        Err(DataAccessError::MissingDependency(format!(
            "no database driver available for '{}'",
            driver
        )))
    }
}

/// The driver session behind a [`SqlxConnection`]
enum Session {
    Any(AnyConnection),
    #[cfg(feature = "mysql")]
    MySql(MySqlConnection),
}

impl Session {
    async fn open(config: &DatabaseConfig, dialect: DialectProfile) -> DataAccessResult<Self> {
        let url = config.connection_string();

        // The `Any` driver rejects DATETIME, DECIMAL, TINYINT and friends
        #[cfg(feature = "mysql")]
        {
            if dialect == DialectProfile::Default && !is_sqlite_driver(&config.driver) {
                let connection = MySqlConnection::connect(&url)
                    .await
                    .map_err(DataAccessError::ConnectionFailure)?;
                return Ok(Self::MySql(connection));
            }
        }

        sqlx::any::install_default_drivers();
        let connection = AnyConnection::connect(&url)
            .await
            .map_err(DataAccessError::ConnectionFailure)?;
        crate::trace_log!(
            "[CONNECT] Opened {} session for {} dialect",
            connection.backend_name(),
            dialect
        );
        Ok(Self::Any(connection))
    }

    fn backend_name(&self) -> &str {
        match self {
            Self::Any(connection) => connection.backend_name(),
            #[cfg(feature = "mysql")]
            Self::MySql(_) => "MySQL",
        }
    }
}

/// MySQL reports `0` when the statement generated no id
#[cfg(feature = "mysql")]
fn mysql_insert_id(id: u64) -> Option<i64> {
    i64::try_from(id).ok().filter(|id| *id != 0)
}

/// [`Connection`] backed by one `sqlx` driver session
pub struct SqlxConnection {
    inner: Option<Session>,
    dialect: DialectProfile,
}

impl SqlxConnection {
    /// Open a session for `config`
    pub async fn connect(config: &DatabaseConfig) -> DataAccessResult<Self> {
        let dialect = DialectProfile::from_driver(&config.driver).ok_or_else(|| {
            DataAccessError::MissingDependency(format!("unknown database driver '{}'", config.driver))
        })?;
        ensure_driver(&config.driver, dialect)?;

        let session = Session::open(config, dialect).await?;

        // The server's own report wins over the configured driver name
        let dialect = DialectProfile::from_backend_name(session.backend_name()).unwrap_or(dialect);

        crate::debug_log!(
            "[CONNECT] Driver: {}, backend: {}, dialect: {}",
            config.driver,
            session.backend_name(),
            dialect
        );

        Ok(Self {
            inner: Some(session),
            dialect,
        })
    }

    fn session(&mut self) -> DataAccessResult<&mut Session> {
        self.inner.as_mut().ok_or(DataAccessError::Closed)
    }
}

#[async_trait]
impl Connection for SqlxConnection {
    fn dialect(&self) -> DialectProfile {
        self.dialect
    }

    async fn fetch_all(&mut self, sql: &str, params: &[Value]) -> DataAccessResult<Vec<Record>> {
        match self.session()? {
            Session::Any(connection) => {
                let rows = bound_query!(Any, sql, params)
                    .fetch_all(&mut *connection)
                    .await
                    .map_err(|e| DataAccessError::execution(sql, e))?;

                rows.iter()
                    .map(|row| decode_row(row).map_err(|e| DataAccessError::decode(e.to_string())))
                    .collect()
            }
            #[cfg(feature = "mysql")]
            Session::MySql(connection) => {
                let rows = bound_query!(MySql, sql, params)
                    .fetch_all(&mut *connection)
                    .await
                    .map_err(|e| DataAccessError::execution(sql, e))?;

                rows.iter()
                    .map(|row| {
                        decode_mysql_row(row).map_err(|e| DataAccessError::decode(e.to_string()))
                    })
                    .collect()
            }
        }
    }

    async fn execute(&mut self, sql: &str, params: &[Value]) -> DataAccessResult<ExecResult> {
        match self.session()? {
            Session::Any(connection) => {
                let result = bound_query!(Any, sql, params)
                    .execute(&mut *connection)
                    .await
                    .map_err(|e| DataAccessError::execution(sql, e))?;

                Ok(ExecResult {
                    rows_affected: result.rows_affected(),
                    last_insert_id: result.last_insert_id(),
                })
            }
            #[cfg(feature = "mysql")]
            Session::MySql(connection) => {
                let result = bound_query!(MySql, sql, params)
                    .execute(&mut *connection)
                    .await
                    .map_err(|e| DataAccessError::execution(sql, e))?;

                Ok(ExecResult {
                    rows_affected: result.rows_affected(),
                    last_insert_id: mysql_insert_id(result.last_insert_id()),
                })
            }
        }
    }

    async fn close(&mut self) -> DataAccessResult<()> {
        match self.inner.take() {
            Some(Session::Any(connection)) => connection
                .close()
                .await
                .map_err(DataAccessError::ConnectionFailure),
            #[cfg(feature = "mysql")]
            Some(Session::MySql(connection)) => connection
                .close()
                .await
                .map_err(DataAccessError::ConnectionFailure),
            None => Ok(()),
        }
    }
}
