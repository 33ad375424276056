//! Dataset readers and the filename-dispatch batch loader.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use once_cell::sync::Lazy;
use tracing::{debug, info};

use crate::error::{NormalizeError, Result};
use crate::table::{DataColumns, Table};

mod energy;
mod ghg;
mod mobility;

pub use energy::read_uk_energy;
pub use ghg::read_historical_ghg;
pub use mobility::{read_mobility_apple, read_mobility_citymapper, read_mobility_google};

/// Where preprocessed dataset files live unless a caller says otherwise.
pub const DEFAULT_DATA_DIR: &str = "data/processed";

/// A dataset reader: file name and directory in, normalized table and its
/// measurement columns out.
pub type ReaderFn = fn(&str, &Path) -> Result<(Table, DataColumns)>;

/// Maps exact file names (extension included) to the reader that understands
/// their layout.
pub type ReaderRegistry = HashMap<String, ReaderFn>;

/// Built-in registry covering the preprocessed files shipped with the
/// project.
pub static DEFAULT_READERS: Lazy<ReaderRegistry> = Lazy::new(|| {
    let mut readers: ReaderRegistry = HashMap::new();
    readers.insert(
        "historical_GHG_Sectors_GCP.csv".into(),
        read_historical_ghg as ReaderFn,
    );
    readers.insert(
        "historical_GHG_Sectors_PIK.csv".into(),
        read_historical_ghg as ReaderFn,
    );
    readers.insert(
        "historical_GHG_Sectors_UNFCCC.csv".into(),
        read_historical_ghg as ReaderFn,
    );
    readers.insert("mobility_apple.csv".into(), read_mobility_apple as ReaderFn);
    readers.insert(
        "mobility_citymapper.csv".into(),
        read_mobility_citymapper as ReaderFn,
    );
    readers.insert("mobility_google.csv".into(), read_mobility_google as ReaderFn);
    readers.insert("uk_energy_daily.csv".into(), read_uk_energy as ReaderFn);
    readers
});

/// List the plain files in `dir`, in filesystem order.
pub fn list_data_files(dir: &Path) -> Result<Vec<String>> {
    let pattern = format!("{}/*", dir.display());
    let paths = glob::glob(&pattern).map_err(|e| NormalizeError::Io {
        path: dir.to_path_buf(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidInput, e),
    })?;
    let mut names = Vec::new();
    for entry in paths {
        let path = entry.map_err(|e| NormalizeError::Io {
            path: dir.to_path_buf(),
            source: e.into_error(),
        })?;
        if path.is_file() {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                names.push(name.to_string());
            }
        }
    }
    Ok(names)
}

/// Load a batch of data files, keyed by file name minus its extension.
///
/// Defaults: `data_dir` falls back to [`DEFAULT_DATA_DIR`], `data_files` to
/// the directory listing (filesystem order; pass an explicit list when order
/// matters), `readers` to [`DEFAULT_READERS`]. Processing is strictly
/// sequential in input order and fail-fast: a file without a registered
/// reader, or a reader failure, aborts the whole batch.
#[tracing::instrument(level = "info", skip_all)]
pub fn load_data_files(
    data_files: Option<Vec<String>>,
    readers: Option<&ReaderRegistry>,
    data_dir: Option<&Path>,
) -> Result<(BTreeMap<String, Table>, BTreeMap<String, DataColumns>)> {
    let dir = data_dir.unwrap_or_else(|| Path::new(DEFAULT_DATA_DIR));
    let files = match data_files {
        Some(files) => files,
        None => list_data_files(dir)?,
    };
    let readers = readers.unwrap_or(&DEFAULT_READERS);

    let mut data_sets = BTreeMap::new();
    let mut data_columns = BTreeMap::new();
    for file in files {
        let reader = readers
            .get(&file)
            .ok_or_else(|| NormalizeError::UnregisteredFile { file: file.clone() })?;
        let name = Path::new(&file)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or(file.as_str())
            .to_string();
        debug!(file = %file, dataset = %name, "reading data file");
        let (table, columns) = reader(&file, dir)?;
        info!(
            dataset = %name,
            rows = table.num_rows(),
            columns = table.num_columns(),
            "loaded"
        );
        data_sets.insert(name.clone(), table);
        data_columns.insert(name, columns);
    }
    Ok((data_sets, data_columns))
}
