pub mod csv_loader;
pub mod normalizer;

pub use csv_loader::CsvLoader;
pub use normalizer::normalize_row;
