//! Thin inspection helpers over loaded datasets.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::error::Result;
use crate::table::{DataColumns, Table};

/// Log a short profile of every loaded dataset: shape, index, measurement
/// columns, and per-column types at debug level.
pub fn summarise_data(
    data_sets: &BTreeMap<String, Table>,
    data_columns: &BTreeMap<String, DataColumns>,
) {
    for (name, table) in data_sets {
        info!(
            dataset = %name,
            rows = table.num_rows(),
            columns = table.num_columns(),
            index = ?table.index(),
            "dataset"
        );
        if let Some(columns) = data_columns.get(name) {
            info!(dataset = %name, data_columns = ?columns, "measurement columns");
        }
        for field in table.schema().fields() {
            debug!(dataset = %name, column = %field.name(), kind = ?field.data_type(), "column");
        }
    }
}

/// Distinct values of `search_col` containing `find` and not containing
/// `exclude`, in first-appearance order.
pub fn find_matching_geo_id(
    table: &Table,
    find: &str,
    exclude: &str,
    search_col: &str,
) -> Result<Vec<String>> {
    Ok(table
        .distinct_text_values(search_col)?
        .into_iter()
        .filter(|value| value.contains(find) && !value.contains(exclude))
        .collect())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use anyhow::Result;
    use arrow::array::{ArrayRef, StringArray};
    use arrow::datatypes::{DataType, Field};

    use super::*;
    use crate::error::NormalizeError;

    fn geo_table(values: Vec<&str>) -> Table {
        Table::from_columns(
            vec![Field::new("unique_geo_id", DataType::Utf8, true)],
            vec![Arc::new(StringArray::from(values)) as ArrayRef],
        )
        .unwrap()
    }

    #[test]
    fn matches_are_distinct_and_in_first_appearance_order() -> Result<()> {
        let table = geo_table(vec![
            "FR_France",
            "FR_France_Overseas",
            "FR_France",
            "DE_Germany",
        ]);

        let matches = find_matching_geo_id(&table, "FR_France", "Overseas", "unique_geo_id")?;
        assert_eq!(matches, vec!["FR_France".to_string()]);

        let all = find_matching_geo_id(&table, "FR_France", "no such value", "unique_geo_id")?;
        assert_eq!(
            all,
            vec!["FR_France".to_string(), "FR_France_Overseas".to_string()]
        );
        Ok(())
    }

    #[test]
    fn missing_search_column_is_an_error() {
        let table = geo_table(vec!["FR_France"]);
        let err = find_matching_geo_id(&table, "FR", "", "geo").unwrap_err();
        assert!(matches!(err, NormalizeError::ColumnNotFound { .. }));
    }
}
