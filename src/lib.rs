//! StockLens — client-side inventory lookup
//!
//! Loads a spreadsheet of stock items into memory, filters it with
//! substring/wildcard queries, memoizes generated scannable-code markup
//! in a bounded local cache, resolves scanned codes back to records, and
//! produces print-ready label output for a selected item.

pub mod artifact_cache;
pub mod capture;
pub mod config;
pub mod errors;
pub mod ingestor;
pub mod labels;
pub mod models;
pub mod query;
pub mod render;
pub mod state;
