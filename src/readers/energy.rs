//! UK energy usage normalization.

use std::path::Path;

use crate::error::Result;
use crate::ingest::read_indexed_csv;
use crate::table::{ColumnSelector, DataColumns, Table};

pub const TIMESTAMP_COLUMN: &str = "timestamp";

/// Energy files are long-form already; index by the raw timestamp column,
/// which stays in place as a regular column.
pub fn read_uk_energy(file_name: &str, dir: &Path) -> Result<(Table, DataColumns)> {
    let (table, data_columns) = read_indexed_csv(file_name, ColumnSelector::ByPosition(1), dir)?;
    let table = table.with_index(vec![TIMESTAMP_COLUMN.into()])?;
    Ok((table, data_columns))
}
