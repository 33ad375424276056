use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Builder, StringBuilder, TimestampMillisecondBuilder};
use arrow::datatypes::{DataType, Field, TimeUnit};

use crate::error::{NormalizeError, Result};
use crate::ingest::date_parser;

/// Column names parsed as timestamps, matched exactly.
pub const TEMPORAL_COLUMNS: [&str; 3] = ["date", "Date", "timestamp"];

pub fn is_temporal(name: &str) -> bool {
    TEMPORAL_COLUMNS.contains(&name)
}

fn is_numeric(values: &[&str]) -> bool {
    let mut any = false;
    for value in values {
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        if value.parse::<f64>().is_err() {
            return false;
        }
        any = true;
    }
    any
}

/// Build one typed column from raw string cells. Empty cells become null.
/// Temporal columns hard-fail on an unparseable non-empty value; numeric
/// inference requires every non-empty value to parse, otherwise the column
/// stays text.
pub fn build_column(name: &str, values: &[&str]) -> Result<(Field, ArrayRef)> {
    if is_temporal(name) {
        let mut builder = TimestampMillisecondBuilder::with_capacity(values.len());
        for value in values {
            if value.trim().is_empty() {
                builder.append_null();
                continue;
            }
            match date_parser::parse_timestamp_millis(value) {
                Some(millis) => builder.append_value(millis),
                None => {
                    return Err(NormalizeError::TimestampParse {
                        column: name.into(),
                        value: value.to_string(),
                    })
                }
            }
        }
        let field = Field::new(name, DataType::Timestamp(TimeUnit::Millisecond, None), true);
        return Ok((field, Arc::new(builder.finish())));
    }

    if is_numeric(values) {
        let mut builder = Float64Builder::with_capacity(values.len());
        for value in values {
            builder.append_option(value.trim().parse().ok());
        }
        return Ok((Field::new(name, DataType::Float64, true), Arc::new(builder.finish())));
    }

    let mut builder = StringBuilder::new();
    for value in values {
        if value.is_empty() {
            builder.append_null();
        } else {
            builder.append_value(value);
        }
    }
    Ok((Field::new(name, DataType::Utf8, true), Arc::new(builder.finish())))
}
