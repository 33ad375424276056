//! Normalizes heterogeneous preprocessed datasets (greenhouse-gas
//! emissions, mobility indices, energy usage) from delimited files with
//! irregular layouts into typed tables sharing an (entity, time) composite
//! index.
//!
//! The generic loader ([`ingest::read_indexed_csv`]) handles duplicated
//! index columns and temporal typing; per-dataset readers in [`readers`]
//! apply layout-specific reshaping; [`readers::load_data_files`] dispatches
//! a whole directory through a filename registry.

pub mod error;
pub mod ingest;
pub mod readers;
pub mod summary;
pub mod table;

pub use error::{NormalizeError, Result};
pub use ingest::read_indexed_csv;
pub use readers::{
    load_data_files, read_historical_ghg, read_mobility_apple, read_mobility_citymapper,
    read_mobility_google, read_uk_energy, ReaderFn, ReaderRegistry, DEFAULT_DATA_DIR,
    DEFAULT_READERS,
};
pub use summary::{find_matching_geo_id, summarise_data};
pub use table::{ColumnSelector, DataColumns, Table};
