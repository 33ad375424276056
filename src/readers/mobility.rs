//! Mobility-index normalization for the three provider layouts.

use std::path::Path;

use crate::error::Result;
use crate::ingest::read_indexed_csv;
use crate::table::{ColumnSelector, DataColumns, Table};

pub const CITY_COLUMN: &str = "city";
pub const CITYMAPPER_VALUE_COLUMN: &str = "citymapper_mobility_index";

/// Google reports are already long-form; measurement columns start at the
/// retail-and-recreation baseline change.
pub fn read_mobility_google(file_name: &str, dir: &Path) -> Result<(Table, DataColumns)> {
    read_indexed_csv(
        file_name,
        ColumnSelector::ByName("retail_and_recreation_percent_change_from_baseline".into()),
        dir,
    )
}

/// Apple reports are already long-form; measurement columns start at
/// `driving`.
pub fn read_mobility_apple(file_name: &str, dir: &Path) -> Result<(Table, DataColumns)> {
    read_indexed_csv(file_name, ColumnSelector::ByName("driving".into()), dir)
}

/// Citymapper ships wide: a `Date` column plus one column per city. Melt to
/// one row per (city, date) and re-index accordingly.
pub fn read_mobility_citymapper(file_name: &str, dir: &Path) -> Result<(Table, DataColumns)> {
    let (table, _) = read_indexed_csv(file_name, ColumnSelector::ByPosition(1), dir)?;
    let melted = table
        .melt(1, CITY_COLUMN, CITYMAPPER_VALUE_COLUMN)?
        .with_index(vec![CITY_COLUMN.into(), "Date".into()])?;
    let data_columns = melted.data_columns_from(2);
    Ok((melted, data_columns))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::fs;

    use anyhow::Result;
    use arrow::array::{Array, Float64Array};
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn google_returns_data_from_named_column() -> Result<()> {
        let dir = TempDir::new()?;
        fs::write(
            dir.path().join("mobility_google.csv"),
            "unique_geo_id,date,retail_and_recreation_percent_change_from_baseline,workplaces_percent_change_from_baseline,unique_geo_id.1,date.1\n\
             FR_France,2020-03-01,-12.0,-3.0,FR_France,2020-03-01\n\
             FR_France,2020-03-02,-14.0,-5.0,FR_France,2020-03-02\n",
        )?;

        let (table, data_columns) = read_mobility_google("mobility_google.csv", dir.path())?;

        assert_eq!(
            table.index(),
            &["unique_geo_id".to_string(), "date".to_string()]
        );
        assert_eq!(
            data_columns,
            vec![
                "retail_and_recreation_percent_change_from_baseline".to_string(),
                "workplaces_percent_change_from_baseline".to_string(),
            ]
        );
        Ok(())
    }

    #[test]
    fn apple_returns_data_from_driving_onward() -> Result<()> {
        let dir = TempDir::new()?;
        fs::write(
            dir.path().join("mobility_apple.csv"),
            "region,date,driving,walking\nParis,2020-03-01,1.1,0.9\n",
        )?;

        let (table, data_columns) = read_mobility_apple("mobility_apple.csv", dir.path())?;

        assert!(table.index().is_empty());
        assert_eq!(data_columns, vec!["driving".to_string(), "walking".to_string()]);
        Ok(())
    }

    #[test]
    fn citymapper_melts_one_row_per_city_and_date() -> Result<()> {
        let dir = TempDir::new()?;
        fs::write(
            dir.path().join("mobility_citymapper.csv"),
            "Date,Amsterdam,Berlin,Paris\n\
             2020-03-01,0.91,0.77,0.88\n\
             2020-03-02,0.85,0.70,0.80\n",
        )?;

        let (table, data_columns) =
            read_mobility_citymapper("mobility_citymapper.csv", dir.path())?;

        // 2 input rows x 3 city columns
        assert_eq!(table.num_rows(), 6);
        assert_eq!(
            table.column_names(),
            vec!["Date", "city", "citymapper_mobility_index"]
        );
        assert_eq!(table.index(), &["city".to_string(), "Date".to_string()]);
        assert_eq!(data_columns, vec!["citymapper_mobility_index".to_string()]);

        // every (city, date) pair exactly once
        let keys = table.index_keys()?;
        let distinct: HashSet<_> = keys.iter().cloned().collect();
        assert_eq!(distinct.len(), keys.len());

        let values = table.column("citymapper_mobility_index")?;
        let values = values.as_any().downcast_ref::<Float64Array>().unwrap();
        assert_eq!(values.value(0), 0.91);
        assert_eq!(values.value(2), 0.77);
        Ok(())
    }
}
