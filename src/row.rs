//! Row decoding
//!
//! Rows come back from the driver as loosely typed columns and are handed to
//! callers as [`Record`] maps in column order.

use serde_json::{Map, Value};
use sqlx::any::AnyRow;
use sqlx::{Column, Row};
#[cfg(feature = "mysql")]
use sqlx::mysql::MySqlRow;
#[cfg(feature = "mysql")]
use sqlx::{TypeInfo, ValueRef};

/// One result row: column name to value, in select order
pub type Record = Map<String, Value>;

fn bytes_to_value(bytes: Vec<u8>) -> Value {
    Value::Array(bytes.into_iter().map(Value::from).collect())
}

/// Decode one column, trying the value kinds the `Any` driver produces
fn decode_column(row: &AnyRow, index: usize) -> Result<Value, sqlx::Error> {
    if let Ok(value) = row.try_get::<Option<i64>, _>(index) {
        return Ok(value.map(Value::from).unwrap_or(Value::Null));
    }
    if let Ok(value) = row.try_get::<Option<f64>, _>(index) {
        return Ok(value.map(Value::from).unwrap_or(Value::Null));
    }
    if let Ok(value) = row.try_get::<Option<bool>, _>(index) {
        return Ok(value.map(Value::Bool).unwrap_or(Value::Null));
    }
    if let Ok(value) = row.try_get::<Option<String>, _>(index) {
        return Ok(value.map(Value::String).unwrap_or(Value::Null));
    }

    let value = row.try_get::<Option<Vec<u8>>, _>(index)?;
    Ok(value.map(bytes_to_value).unwrap_or(Value::Null))
}

/// Decode a driver row into a [`Record`]
pub fn decode_row(row: &AnyRow) -> Result<Record, sqlx::Error> {
    let mut record = Map::with_capacity(row.columns().len());

    for column in row.columns() {
        let value = decode_column(row, column.ordinal())?;
        record.insert(column.name().to_string(), value);
    }

    Ok(record)
}

/// How a MySQL column is turned into JSON, keyed by the server's type name
#[cfg(feature = "mysql")]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MySqlKind {
    Boolean,
    Signed,
    Unsigned,
    Year,
    Float,
    Double,
    /// DECIMAL travels as text in both protocols and stays text
    Decimal,
    DateTime,
    Date,
    Time,
    Json,
    Bit,
    Binary,
    Text,
}

#[cfg(feature = "mysql")]
impl MySqlKind {
    fn from_type_name(name: &str) -> Self {
        let name = name.trim().to_ascii_uppercase();
        match name.as_str() {
            "BOOLEAN" => Self::Boolean,
            "YEAR" => Self::Year,
            "FLOAT" => Self::Float,
            "DOUBLE" => Self::Double,
            "DECIMAL" | "NUMERIC" => Self::Decimal,
            "DATETIME" | "TIMESTAMP" => Self::DateTime,
            "DATE" => Self::Date,
            "TIME" => Self::Time,
            "JSON" => Self::Json,
            "BIT" => Self::Bit,
            "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB"
            | "GEOMETRY" => Self::Binary,
            n if n.ends_with("INT UNSIGNED") => Self::Unsigned,
            n if n.ends_with("INT") => Self::Signed,
            _ => Self::Text,
        }
    }
}

/// BIT(n) arrives as big-endian bytes
#[cfg(feature = "mysql")]
fn bits_to_value(bytes: &[u8]) -> Value {
    let value = bytes
        .iter()
        .fold(0u64, |acc, byte| (acc << 8) | u64::from(*byte));
    Value::from(value)
}

#[cfg(feature = "mysql")]
fn decode_mysql_column(row: &MySqlRow, index: usize) -> Result<Value, sqlx::Error> {
    let raw = row.try_get_raw(index)?;
    if raw.is_null() {
        return Ok(Value::Null);
    }
    let kind = MySqlKind::from_type_name(raw.type_info().name());

    let value = match kind {
        MySqlKind::Boolean => Value::Bool(row.try_get::<bool, _>(index)?),
        MySqlKind::Signed => Value::from(row.try_get::<i64, _>(index)?),
        MySqlKind::Unsigned => Value::from(row.try_get::<u64, _>(index)?),
        MySqlKind::Year => Value::from(row.try_get_unchecked::<u16, _>(index)?),
        MySqlKind::Float => Value::from(f64::from(row.try_get::<f32, _>(index)?)),
        MySqlKind::Double => Value::from(row.try_get::<f64, _>(index)?),
        MySqlKind::Decimal => Value::String(row.try_get_unchecked::<String, _>(index)?),
        MySqlKind::DateTime => {
            let value = row.try_get::<chrono::NaiveDateTime, _>(index)?;
            Value::String(value.format("%Y-%m-%d %H:%M:%S%.f").to_string())
        }
        MySqlKind::Date => {
            let value = row.try_get::<chrono::NaiveDate, _>(index)?;
            Value::String(value.format("%Y-%m-%d").to_string())
        }
        MySqlKind::Time => {
            let value = row.try_get::<chrono::NaiveTime, _>(index)?;
            Value::String(value.format("%H:%M:%S%.f").to_string())
        }
        MySqlKind::Json => row.try_get::<Value, _>(index)?,
        MySqlKind::Bit => bits_to_value(&row.try_get_unchecked::<Vec<u8>, _>(index)?),
        MySqlKind::Binary => bytes_to_value(row.try_get_unchecked::<Vec<u8>, _>(index)?),
        MySqlKind::Text => match row.try_get_unchecked::<String, _>(index) {
            Ok(text) => Value::String(text),
            Err(_) => bytes_to_value(row.try_get_unchecked::<Vec<u8>, _>(index)?),
        },
    };

    Ok(value)
}

/// Decode a native MySQL row into a [`Record`].
///
/// Temporal columns become `YYYY-MM-DD HH:MM:SS` text and DECIMAL keeps its
/// exact digits as text, the way PDO hands them out.
#[cfg(feature = "mysql")]
pub fn decode_mysql_row(row: &MySqlRow) -> Result<Record, sqlx::Error> {
    let mut record = Map::with_capacity(row.columns().len());

    for column in row.columns() {
        let value = decode_mysql_column(row, column.ordinal())?;
        record.insert(column.name().to_string(), value);
    }

    Ok(record)
}
