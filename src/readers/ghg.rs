//! Historical greenhouse-gas emissions normalization.
//!
//! Raw files carry one row per (gas, country, date) with the gas repeated
//! down a column. The normalized shape has one row per (country, date) and
//! one measurement column per (measurement, gas) pair.

use std::collections::HashMap;
use std::path::Path;

use tracing::debug;

use crate::error::Result;
use crate::ingest::read_indexed_csv;
use crate::table::{ColumnSelector, DataColumns, Table};

pub const GAS_COLUMN: &str = "GH_Gas";
pub const COUNTRY_COLUMN: &str = "Country";
pub const DATE_COLUMN: &str = "date";
const MAX_YEAR_COLUMN: &str = "max_year";

/// Position of the first measurement column in the raw emissions layout.
const DATA_POSITION: usize = 6;

pub fn read_historical_ghg(file_name: &str, dir: &Path) -> Result<(Table, DataColumns)> {
    let (table, data_columns) =
        read_indexed_csv(file_name, ColumnSelector::ByPosition(DATA_POSITION), dir)?;

    // gas moves to the outer level so each gas can be sliced off and pivoted
    // into its own set of columns
    let table = table.reorder_index(&[GAS_COLUMN, COUNTRY_COLUMN, DATE_COLUMN])?;

    // skeleton: one row per (country, date), nothing gas-specific left
    let mut gas_specific: Vec<&str> = vec![MAX_YEAR_COLUMN, GAS_COLUMN];
    gas_specific.extend(data_columns.iter().map(String::as_str));
    let mut result = table
        .drop_columns(&gas_specific)?
        .distinct_rows()?
        .with_index(vec![COUNTRY_COLUMN.into(), DATE_COLUMN.into()])?;

    for gas in table.distinct_text_values(GAS_COLUMN)? {
        let mut keep: Vec<&str> = vec![COUNTRY_COLUMN, DATE_COLUMN];
        keep.extend(data_columns.iter().map(String::as_str));
        let renames: HashMap<String, String> = data_columns
            .iter()
            .map(|column| (column.clone(), format!("{column} ({gas})")))
            .collect();
        let slice = table
            .filter_text_eq(GAS_COLUMN, &gas)?
            .keep_columns(&keep)?
            .with_index(vec![COUNTRY_COLUMN.into(), DATE_COLUMN.into()])?
            .rename_columns(&renames)?;
        debug!(gas = %gas, rows = slice.num_rows(), "joining gas slice");
        result = result.join_on_index(&slice)?;
    }

    let result = result.drop_all_null_columns()?.sort_by_index()?;
    let data_columns = result.data_columns_from(DATA_POSITION - 2);
    Ok((result, data_columns))
}
