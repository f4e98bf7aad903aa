//! JSON <-> `Any` driver value conversion.

use sqlx::any::{AnyArguments, AnyRow, AnyTypeInfoKind};
use sqlx::query::Query;
use sqlx::{Any, Column, Row, ValueRef};
use serde_json::{Map, Value};

pub(crate) type AnyQuery<'q> = Query<'q, Any, AnyArguments<'q>>;

/// Bind JSON values in order.
///
/// Arrays and objects are bound as their JSON text.
pub(crate) fn bind_all<'q>(mut query: AnyQuery<'q>, params: &[Value]) -> AnyQuery<'q> {
    for value in params {
        query = match value {
            Value::Null => query.bind(Option::<String>::None),
            Value::Bool(b) => query.bind(*b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    query.bind(i)
                } else if let Some(f) = n.as_f64() {
                    query.bind(f)
                } else {
                    query.bind(n.to_string())
                }
            }
            Value::String(s) => query.bind(s.clone()),
            other => query.bind(other.to_string()),
        };
    }
    query
}

/// Decode every column of a row into a JSON object keyed by column name.
pub(crate) fn decode_row(row: &AnyRow) -> Result<Map<String, Value>, sqlx::Error> {
    let mut out = Map::new();
    for (index, column) in row.columns().iter().enumerate() {
        out.insert(column.name().to_string(), decode_column(row, index)?);
    }
    Ok(out)
}

/// Decode one column by the runtime type of its value.
///
/// The declared column type is not used: SQLite reports none for
/// expressions and `RETURNING` columns.
pub(crate) fn decode_column(row: &AnyRow, index: usize) -> Result<Value, sqlx::Error> {
    let raw = row.try_get_raw(index)?;
    if raw.is_null() {
        return Ok(Value::Null);
    }
    let kind = raw.type_info().kind();
    let value = match kind {
        AnyTypeInfoKind::Null => Value::Null,
        AnyTypeInfoKind::Bool => row.try_get::<Option<bool>, _>(index)?.map(Value::Bool).unwrap_or(Value::Null),
        AnyTypeInfoKind::SmallInt | AnyTypeInfoKind::Integer | AnyTypeInfoKind::BigInt => row
            .try_get::<Option<i64>, _>(index)?
            .map(Value::from)
            .unwrap_or(Value::Null),
        AnyTypeInfoKind::Real => row
            .try_get::<Option<f32>, _>(index)?
            .map(|f| Value::from(f64::from(f)))
            .unwrap_or(Value::Null),
        AnyTypeInfoKind::Double => row
            .try_get::<Option<f64>, _>(index)?
            .map(Value::from)
            .unwrap_or(Value::Null),
        AnyTypeInfoKind::Text => row
            .try_get::<Option<String>, _>(index)?
            .map(Value::String)
            .unwrap_or(Value::Null),
        AnyTypeInfoKind::Blob => row
            .try_get::<Option<Vec<u8>>, _>(index)?
            .map(Value::from)
            .unwrap_or(Value::Null),
        #[allow(unreachable_patterns)]
        _ => row
            .try_get::<Option<String>, _>(index)?
            .map(Value::String)
            .unwrap_or(Value::Null),
    };
    Ok(value)
}
