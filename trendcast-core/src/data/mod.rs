//! Series loaders: the pipeline's data collaborators.

pub mod csv_file;
pub mod provider;
pub mod synthetic;
pub mod yahoo;

pub use csv_file::CsvLoader;
pub use provider::{normalize_rows, DataError, SeriesLoader};
pub use synthetic::SyntheticLoader;
pub use yahoo::YahooLoader;
