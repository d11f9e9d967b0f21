//! Conversions between typed models and port rows.

use port::{Row, StoreError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Serialize a model (or patch) into a flat row object.
pub(crate) fn to_row<T: Serialize>(value: &T) -> Result<Row, StoreError> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::backend(format!(
            "expected an object row, got {other}"
        ))),
    }
}

/// Deserialize a port row into a typed model.
pub(crate) fn from_row<T: DeserializeOwned>(row: Row) -> Result<T, StoreError> {
    Ok(serde_json::from_value(Value::Object(row))?)
}
