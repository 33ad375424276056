//! Row- and shape-level transformations: de-duplication, index sorting,
//! index joins, and wide-to-long melting.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use arrow::array::{new_empty_array, Array, ArrayRef, StringArray, UInt32Array};
use arrow::compute::{self, SortColumn};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;

use crate::error::{NormalizeError, Result};
use crate::table::Table;

impl Table {
    /// Remove rows that duplicate an earlier row in every column. The first
    /// occurrence survives; row order is otherwise preserved.
    pub fn distinct_rows(&self) -> Result<Self> {
        let keys = self.row_keys(&self.column_names())?;
        let mut seen = HashSet::new();
        let mut keep = Vec::new();
        for (row, key) in keys.into_iter().enumerate() {
            if seen.insert(key) {
                keep.push(row as u32);
            }
        }
        self.take(&UInt32Array::from(keep))
    }

    /// Sort rows by the index columns, outermost level first. A table with no
    /// index is returned unchanged.
    pub fn sort_by_index(&self) -> Result<Self> {
        if self.index().is_empty() {
            return Ok(self.clone());
        }
        let sort_columns: Vec<SortColumn> = self
            .index()
            .iter()
            .map(|name| {
                Ok(SortColumn {
                    values: self.column(name)?,
                    options: None,
                })
            })
            .collect::<Result<_>>()?;
        let order = compute::lexsort_to_indices(&sort_columns, None)?;
        self.take(&order)
    }

    /// Left join: append `other`'s non-index columns, matching rows by index
    /// key. Rows of `self` with no partner get nulls; rows of `other` with no
    /// partner are ignored. Both tables must carry an index.
    pub fn join_on_index(&self, other: &Table) -> Result<Self> {
        if self.index().is_empty() || other.index().is_empty() {
            return Err(NormalizeError::IndexMismatch {
                requested: other.index().to_vec(),
                current: self.index().to_vec(),
            });
        }

        let mut partner: HashMap<_, u32> = HashMap::new();
        for (row, key) in other.index_keys()?.into_iter().enumerate() {
            partner.entry(key).or_insert(row as u32);
        }
        let positions: Vec<Option<u32>> = self
            .index_keys()?
            .into_iter()
            .map(|key| partner.get(&key).copied())
            .collect();
        let positions = UInt32Array::from(positions);

        let own_names = self.column_names();
        let incoming: Vec<String> = other
            .column_names()
            .into_iter()
            .filter(|name| !other.index().contains(name))
            .collect();
        for name in &incoming {
            if own_names.contains(name) {
                return Err(NormalizeError::DuplicateColumn { name: name.clone() });
            }
        }

        let mut fields: Vec<Field> = self
            .schema()
            .fields()
            .iter()
            .map(|f| f.as_ref().clone())
            .collect();
        let mut columns = self.record_batch().columns().to_vec();
        for name in &incoming {
            let position = other.position_of(name)?;
            let field = other.schema().field(position).clone();
            let taken = compute::take(other.record_batch().column(position), &positions, None)?;
            fields.push(field.with_nullable(true));
            columns.push(taken);
        }
        let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?;
        Ok(Self {
            batch,
            index: self.index().to_vec(),
        })
    }

    /// Wide-to-long reshape. The first `id_count` columns are repeated for
    /// every remaining column; each remaining column contributes one block of
    /// rows labelled with its name in `var_name`, its values in `value_name`.
    /// Blocks are emitted in source column order. All melted columns must
    /// share one type. The result has no index.
    pub fn melt(&self, id_count: usize, var_name: &str, value_name: &str) -> Result<Self> {
        let names = self.column_names();
        let split = id_count.min(names.len());
        let id_names = &names[..split];
        let value_names = &names[split..];

        let value_type = match value_names.first() {
            Some(name) => self.column(name)?.data_type().clone(),
            None => DataType::Float64,
        };
        for name in value_names {
            let found = self.column(name)?.data_type().clone();
            if found != value_type {
                return Err(NormalizeError::TypeMismatch {
                    column: name.clone(),
                    expected: format!("{:?}", value_type),
                    found: format!("{:?}", found),
                });
            }
        }

        let rows = self.num_rows();
        let blocks = value_names.len();

        let mut fields = Vec::with_capacity(split + 2);
        let mut columns: Vec<ArrayRef> = Vec::with_capacity(split + 2);

        for name in id_names {
            let position = self.position_of(name)?;
            let array = self.record_batch().column(position).clone();
            let repeated = if blocks == 0 {
                new_empty_array(array.data_type())
            } else {
                let copies: Vec<&dyn Array> = (0..blocks).map(|_| array.as_ref()).collect();
                compute::concat(&copies)?
            };
            fields.push(self.schema().field(position).clone());
            columns.push(repeated);
        }

        let labels: Vec<&str> = value_names
            .iter()
            .flat_map(|name| std::iter::repeat(name.as_str()).take(rows))
            .collect();
        fields.push(Field::new(var_name, DataType::Utf8, true));
        columns.push(Arc::new(StringArray::from(labels)));

        let values = if blocks == 0 {
            new_empty_array(&value_type)
        } else {
            let parts: Vec<ArrayRef> = value_names
                .iter()
                .map(|name| self.column(name))
                .collect::<Result<_>>()?;
            let refs: Vec<&dyn Array> = parts.iter().map(|a| a.as_ref()).collect();
            compute::concat(&refs)?
        };
        fields.push(Field::new(value_name, value_type, true));
        columns.push(values);

        Table::from_columns(fields, columns)
    }

    /// Drop every column whose values are null in all rows.
    pub fn drop_all_null_columns(&self) -> Result<Self> {
        let rows = self.num_rows();
        let keep: Vec<String> = self
            .column_names()
            .into_iter()
            .enumerate()
            .filter(|(position, _)| {
                rows == 0 || self.record_batch().column(*position).null_count() < rows
            })
            .map(|(_, name)| name)
            .collect();
        let keep: Vec<&str> = keep.iter().map(String::as_str).collect();
        self.keep_columns(&keep)
    }
}

#[cfg(test)]
mod tests {
    use arrow::array::{Float64Array, StringArray, TimestampMillisecondArray};
    use arrow::datatypes::TimeUnit;

    use super::*;

    fn text_field(name: &str) -> Field {
        Field::new(name, DataType::Utf8, true)
    }

    fn number_field(name: &str) -> Field {
        Field::new(name, DataType::Float64, true)
    }

    fn sample_wide() -> Table {
        // one timestamp column plus one value column per city
        let fields = vec![
            Field::new("Date", DataType::Timestamp(TimeUnit::Millisecond, None), true),
            number_field("Amsterdam"),
            number_field("Berlin"),
        ];
        let columns: Vec<ArrayRef> = vec![
            Arc::new(TimestampMillisecondArray::from(vec![0_i64, 86_400_000])),
            Arc::new(Float64Array::from(vec![Some(0.9), Some(0.8)])),
            Arc::new(Float64Array::from(vec![Some(0.7), None])),
        ];
        Table::from_columns(fields, columns).unwrap()
    }

    #[test]
    fn melt_emits_one_block_per_value_column() {
        let melted = sample_wide().melt(1, "city", "index_value").unwrap();

        assert_eq!(melted.num_rows(), 4);
        assert_eq!(melted.column_names(), vec!["Date", "city", "index_value"]);

        let cities = melted.column("city").unwrap();
        let cities = cities.as_any().downcast_ref::<StringArray>().unwrap();
        let labels: Vec<&str> = (0..cities.len()).map(|i| cities.value(i)).collect();
        assert_eq!(labels, vec!["Amsterdam", "Amsterdam", "Berlin", "Berlin"]);

        // every (city, Date) pair appears exactly once
        let keyed = melted
            .with_index(vec!["city".into(), "Date".into()])
            .unwrap();
        let keys = keyed.index_keys().unwrap();
        let distinct: HashSet<_> = keys.iter().cloned().collect();
        assert_eq!(distinct.len(), keys.len());
    }

    #[test]
    fn melt_rejects_mixed_value_types() {
        let fields = vec![text_field("id"), number_field("a"), text_field("b")];
        let columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from(vec!["x"])),
            Arc::new(Float64Array::from(vec![1.0])),
            Arc::new(StringArray::from(vec!["y"])),
        ];
        let table = Table::from_columns(fields, columns).unwrap();

        let err = table.melt(1, "var", "value").unwrap_err();
        assert!(matches!(err, NormalizeError::TypeMismatch { .. }));
    }

    #[test]
    fn distinct_rows_keeps_first_occurrence() {
        let fields = vec![text_field("country"), number_field("year")];
        let columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from(vec!["AU", "AU", "NZ", "AU"])),
            Arc::new(Float64Array::from(vec![2020.0, 2020.0, 2020.0, 2021.0])),
        ];
        let table = Table::from_columns(fields, columns).unwrap();

        let distinct = table.distinct_rows().unwrap();
        assert_eq!(distinct.num_rows(), 3);
        let countries = distinct.column("country").unwrap();
        let countries = countries.as_any().downcast_ref::<StringArray>().unwrap();
        assert_eq!(countries.value(0), "AU");
        assert_eq!(countries.value(1), "NZ");
        assert_eq!(countries.value(2), "AU");
    }

    #[test]
    fn sort_by_index_orders_all_levels() {
        let fields = vec![text_field("country"), number_field("value")];
        let columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from(vec!["NZ", "AU", "FR"])),
            Arc::new(Float64Array::from(vec![1.0, 2.0, 3.0])),
        ];
        let table = Table::from_columns(fields, columns)
            .unwrap()
            .with_index(vec!["country".into()])
            .unwrap();

        let sorted = table.sort_by_index().unwrap();
        let countries = sorted.column("country").unwrap();
        let countries = countries.as_any().downcast_ref::<StringArray>().unwrap();
        let order: Vec<&str> = (0..countries.len()).map(|i| countries.value(i)).collect();
        assert_eq!(order, vec!["AU", "FR", "NZ"]);
    }

    #[test]
    fn join_on_index_fills_missing_rows_with_nulls() {
        let base = Table::from_columns(
            vec![text_field("country")],
            vec![Arc::new(StringArray::from(vec!["AU", "NZ"])) as ArrayRef],
        )
        .unwrap()
        .with_index(vec!["country".into()])
        .unwrap();

        let other = Table::from_columns(
            vec![text_field("country"), number_field("co2")],
            vec![
                Arc::new(StringArray::from(vec!["AU"])) as ArrayRef,
                Arc::new(Float64Array::from(vec![5.5])) as ArrayRef,
            ],
        )
        .unwrap()
        .with_index(vec!["country".into()])
        .unwrap();

        let joined = base.join_on_index(&other).unwrap();
        assert_eq!(joined.column_names(), vec!["country", "co2"]);
        let co2 = joined.column("co2").unwrap();
        let co2 = co2.as_any().downcast_ref::<Float64Array>().unwrap();
        assert_eq!(co2.value(0), 5.5);
        assert!(co2.is_null(1));
    }

    #[test]
    fn join_rejects_colliding_column_names() {
        let make = |values: Vec<f64>| {
            Table::from_columns(
                vec![text_field("country"), number_field("co2")],
                vec![
                    Arc::new(StringArray::from(vec!["AU"])) as ArrayRef,
                    Arc::new(Float64Array::from(values)) as ArrayRef,
                ],
            )
            .unwrap()
            .with_index(vec!["country".into()])
            .unwrap()
        };

        let err = make(vec![1.0]).join_on_index(&make(vec![2.0])).unwrap_err();
        assert!(matches!(err, NormalizeError::DuplicateColumn { .. }));
    }

    #[test]
    fn drop_all_null_columns_removes_only_fully_null() {
        let fields = vec![text_field("a"), number_field("b"), number_field("c")];
        let columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from(vec![Some("x"), None])),
            Arc::new(Float64Array::from(vec![None::<f64>, None])),
            Arc::new(Float64Array::from(vec![Some(1.0), Some(2.0)])),
        ];
        let table = Table::from_columns(fields, columns).unwrap();

        let kept = table.drop_all_null_columns().unwrap();
        assert_eq!(kept.column_names(), vec!["a", "c"]);
    }
}
