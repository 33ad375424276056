//! Generic tabular loading: one delimited file in, one typed, possibly
//! multi-indexed [`Table`] out, plus the list of measurement columns.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use tracing::debug;

use crate::error::{NormalizeError, Result};
use crate::table::{ColumnSelector, DataColumns, Table};

pub mod date_parser;
mod typing;

pub use typing::TEMPORAL_COLUMNS;

/// Suffix marking a column as a redundant repeat of its unsuffixed sibling.
pub const DUPLICATE_SUFFIX: &str = ".1";

/// Read `dir/file_name` into a typed table.
///
/// Columns named `date`, `Date`, or `timestamp` are parsed as timestamps.
/// Every column `C` accompanied by a `C.1` sibling is treated as an index
/// column; the `.1` copies are dropped and the originals, in column order,
/// become the table's composite index. `first_data_column` is resolved
/// against the post-drop column list; the returned [`DataColumns`] runs from
/// there to the end of the table.
#[tracing::instrument(level = "debug", skip(dir), fields(dir = %dir.display()))]
pub fn read_indexed_csv(
    file_name: &str,
    first_data_column: ColumnSelector,
    dir: &Path,
) -> Result<(Table, DataColumns)> {
    let path = dir.join(file_name);
    let file = File::open(&path).map_err(|source| NormalizeError::Io {
        path: path.clone(),
        source,
    })?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(BufReader::new(file));

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
    let mut rows: Vec<csv::StringRecord> = Vec::new();
    for record in reader.records() {
        rows.push(record?);
    }

    // repeated index columns come back from preprocessing with a .1 suffix
    let index_columns: Vec<String> = headers
        .iter()
        .filter(|name| {
            let duplicate = format!("{name}{DUPLICATE_SUFFIX}");
            headers.iter().any(|other| *other == duplicate)
        })
        .cloned()
        .collect();
    let duplicates: Vec<String> = index_columns
        .iter()
        .map(|name| format!("{name}{DUPLICATE_SUFFIX}"))
        .collect();

    let mut fields = Vec::with_capacity(headers.len());
    let mut columns = Vec::with_capacity(headers.len());
    for (position, name) in headers.iter().enumerate() {
        if duplicates.contains(name) {
            continue;
        }
        let values: Vec<&str> = rows
            .iter()
            .map(|row| row.get(position).unwrap_or(""))
            .collect();
        let (field, column) = typing::build_column(name, &values)?;
        fields.push(field);
        columns.push(column);
    }

    let table = Table::from_columns(fields, columns)?;
    let table = if index_columns.is_empty() {
        table
    } else {
        table.with_index(index_columns)?
    };

    let first = table.resolve(&first_data_column)?;
    let data_columns = table.data_columns_from(first);
    debug!(
        rows = table.num_rows(),
        columns = table.num_columns(),
        index = ?table.index(),
        "loaded csv"
    );
    Ok((table, data_columns))
}
