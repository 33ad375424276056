use arrow::array::{Array, ArrayRef, Float64Array, StringArray, TimestampMillisecondArray};

use crate::error::{NormalizeError, Result};

/// One index cell in a hashable form.
///
/// Floats are keyed by bit pattern, so two cells compare equal exactly when
/// their stored representation is identical.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyValue {
    Text(String),
    Timestamp(i64),
    Float(u64),
    Null,
}

/// Ordered tuple of index cells identifying a row or a row group.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IndexKey(pub Vec<KeyValue>);

/// Extract the key form of a single cell.
pub fn key_value_at(name: &str, column: &ArrayRef, row: usize) -> Result<KeyValue> {
    if column.is_null(row) {
        return Ok(KeyValue::Null);
    }
    if let Some(arr) = column.as_any().downcast_ref::<StringArray>() {
        return Ok(KeyValue::Text(arr.value(row).to_string()));
    }
    if let Some(arr) = column.as_any().downcast_ref::<TimestampMillisecondArray>() {
        return Ok(KeyValue::Timestamp(arr.value(row)));
    }
    if let Some(arr) = column.as_any().downcast_ref::<Float64Array>() {
        return Ok(KeyValue::Float(arr.value(row).to_bits()));
    }
    Err(NormalizeError::TypeMismatch {
        column: name.to_string(),
        expected: "Utf8, Float64, or Timestamp(Millisecond)".into(),
        found: format!("{:?}", column.data_type()),
    })
}

/// Build a row key from the given named columns.
pub fn row_key(columns: &[(&str, ArrayRef)], row: usize) -> Result<IndexKey> {
    let mut parts = Vec::with_capacity(columns.len());
    for (name, column) in columns {
        parts.push(key_value_at(name, column, row)?);
    }
    Ok(IndexKey(parts))
}
