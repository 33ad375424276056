use std::collections::HashMap;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, StringArray, UInt32Array};
use arrow::compute;
use arrow::datatypes::{Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;

use crate::error::{NormalizeError, Result};

pub mod key;
mod reshape;

pub use key::{IndexKey, KeyValue};

/// Selects the first measurement column of a table, either by header name or
/// by zero-based position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnSelector {
    ByName(String),
    ByPosition(usize),
}

/// Names of the columns holding measurement data, from a cutoff position to
/// the end of the table, in table order.
pub type DataColumns = Vec<String>;

/// A typed table with an explicit, possibly empty, composite index.
///
/// The index is an ordered list of column names; the referenced columns stay
/// in the table, so indexing is non-destructive. An empty list means plain
/// positional ordering. Every operation returns a new `Table` and leaves the
/// receiver untouched.
#[derive(Debug, Clone)]
pub struct Table {
    batch: RecordBatch,
    index: Vec<String>,
}

impl Table {
    pub fn new(batch: RecordBatch) -> Self {
        Self {
            batch,
            index: Vec::new(),
        }
    }

    pub fn from_columns(fields: Vec<Field>, columns: Vec<ArrayRef>) -> Result<Self> {
        let schema = Arc::new(Schema::new(fields));
        Ok(Self::new(RecordBatch::try_new(schema, columns)?))
    }

    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    pub fn num_columns(&self) -> usize {
        self.batch.num_columns()
    }

    pub fn schema(&self) -> SchemaRef {
        self.batch.schema()
    }

    pub fn record_batch(&self) -> &RecordBatch {
        &self.batch
    }

    /// The composite index column names, outermost first. Empty when the
    /// table is positionally ordered.
    pub fn index(&self) -> &[String] {
        &self.index
    }

    pub fn column_names(&self) -> Vec<String> {
        self.batch
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect()
    }

    pub fn position_of(&self, name: &str) -> Result<usize> {
        self.batch
            .schema()
            .fields()
            .iter()
            .position(|f| f.name().as_str() == name)
            .ok_or_else(|| NormalizeError::ColumnNotFound { name: name.into() })
    }

    pub fn column(&self, name: &str) -> Result<ArrayRef> {
        Ok(self.batch.column(self.position_of(name)?).clone())
    }

    /// Resolve a selector to a column position. `ByPosition` is taken as-is;
    /// past-the-end positions simply yield an empty data column set.
    pub fn resolve(&self, selector: &ColumnSelector) -> Result<usize> {
        match selector {
            ColumnSelector::ByName(name) => self.position_of(name),
            ColumnSelector::ByPosition(position) => Ok(*position),
        }
    }

    /// Column names from `position` to the end of the table.
    pub fn data_columns_from(&self, position: usize) -> DataColumns {
        self.batch
            .schema()
            .fields()
            .iter()
            .skip(position)
            .map(|f| f.name().clone())
            .collect()
    }

    /// Re-index by the named columns. Each must exist and hold no nulls.
    pub fn with_index(&self, columns: Vec<String>) -> Result<Self> {
        for name in &columns {
            let column = self.column(name)?;
            if column.null_count() > 0 {
                return Err(NormalizeError::NullIndexValue {
                    column: name.clone(),
                });
            }
        }
        Ok(Self {
            batch: self.batch.clone(),
            index: columns,
        })
    }

    /// Reorder the existing index levels. The requested names must be exactly
    /// the current index columns, in any order.
    pub fn reorder_index(&self, columns: &[&str]) -> Result<Self> {
        let requested: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
        let mut sorted_requested = requested.clone();
        let mut sorted_current = self.index.clone();
        sorted_requested.sort();
        sorted_current.sort();
        if sorted_requested != sorted_current {
            return Err(NormalizeError::IndexMismatch {
                requested,
                current: self.index.clone(),
            });
        }
        Ok(Self {
            batch: self.batch.clone(),
            index: requested,
        })
    }

    /// Drop the named columns. Dropped names disappear from the index too.
    pub fn drop_columns(&self, names: &[&str]) -> Result<Self> {
        for name in names {
            self.position_of(name)?;
        }
        let keep: Vec<String> = self
            .column_names()
            .into_iter()
            .filter(|c| !names.contains(&c.as_str()))
            .collect();
        self.project(&keep)
    }

    /// Keep only the named columns, in the given order.
    pub fn keep_columns(&self, names: &[&str]) -> Result<Self> {
        let keep: Vec<String> = names.iter().map(|c| c.to_string()).collect();
        self.project(&keep)
    }

    fn project(&self, keep: &[String]) -> Result<Self> {
        let mut fields = Vec::with_capacity(keep.len());
        let mut columns = Vec::with_capacity(keep.len());
        for name in keep {
            let position = self.position_of(name)?;
            fields.push(self.batch.schema().field(position).clone());
            columns.push(self.batch.column(position).clone());
        }
        let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?;
        let index: Vec<String> = self
            .index
            .iter()
            .filter(|c| keep.contains(*c))
            .cloned()
            .collect();
        Ok(Self { batch, index })
    }

    /// Rename columns per the given map; names absent from the map are kept.
    /// Index entries follow the renames.
    pub fn rename_columns(&self, renames: &HashMap<String, String>) -> Result<Self> {
        let renamed = |name: &String| renames.get(name).unwrap_or(name).clone();
        let fields: Vec<Field> = self
            .batch
            .schema()
            .fields()
            .iter()
            .map(|f| Field::new(renamed(f.name()), f.data_type().clone(), f.is_nullable()))
            .collect();
        let batch = RecordBatch::try_new(
            Arc::new(Schema::new(fields)),
            self.batch.columns().to_vec(),
        )?;
        let index = self.index.iter().map(renamed).collect();
        Ok(Self { batch, index })
    }

    /// Select rows by position. Null positions yield null rows.
    pub fn take(&self, indices: &UInt32Array) -> Result<Self> {
        let columns = self
            .batch
            .columns()
            .iter()
            .map(|c| compute::take(c, indices, None))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let batch = RecordBatch::try_new(self.batch.schema(), columns)?;
        Ok(Self {
            batch,
            index: self.index.clone(),
        })
    }

    /// Rows whose text column equals `value` exactly.
    pub fn filter_text_eq(&self, column: &str, value: &str) -> Result<Self> {
        let array = self.column(column)?;
        let strings = array
            .as_any()
            .downcast_ref::<StringArray>()
            .ok_or_else(|| NormalizeError::TypeMismatch {
                column: column.into(),
                expected: "Utf8".into(),
                found: format!("{:?}", array.data_type()),
            })?;
        let matches: Vec<u32> = (0..strings.len())
            .filter(|&i| !strings.is_null(i) && strings.value(i) == value)
            .map(|i| i as u32)
            .collect();
        self.take(&UInt32Array::from(matches))
    }

    /// Distinct non-null values of a text column, in first-appearance order.
    pub fn distinct_text_values(&self, column: &str) -> Result<Vec<String>> {
        let array = self.column(column)?;
        let strings = array
            .as_any()
            .downcast_ref::<StringArray>()
            .ok_or_else(|| NormalizeError::TypeMismatch {
                column: column.into(),
                expected: "Utf8".into(),
                found: format!("{:?}", array.data_type()),
            })?;
        let mut seen = std::collections::HashSet::new();
        let mut values = Vec::new();
        for value in strings.iter().flatten() {
            if seen.insert(value.to_string()) {
                values.push(value.to_string());
            }
        }
        Ok(values)
    }

    /// One key per row, built from the index columns.
    pub fn index_keys(&self) -> Result<Vec<IndexKey>> {
        self.row_keys(&self.index.clone())
    }

    /// One key per row, built from the named columns.
    pub fn row_keys(&self, columns: &[String]) -> Result<Vec<IndexKey>> {
        let mut named: Vec<(&str, ArrayRef)> = Vec::with_capacity(columns.len());
        for name in columns {
            named.push((name.as_str(), self.column(name)?));
        }
        (0..self.num_rows())
            .map(|row| key::row_key(&named, row))
            .collect()
    }
}
