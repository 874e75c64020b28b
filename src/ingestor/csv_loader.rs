//! CSV spreadsheet loading
//!
//! Reads a tabular byte stream into ordered raw rows and hands each one
//! to the normalizer. The whole record set is replaced on every load
//! event; callers clear any derived caches themselves.

use std::io::Read;

use anyhow::Result;
use tracing::{debug, info};

use crate::errors::IngestError;
use crate::ingestor::normalize_row;
use crate::models::{LoadSummary, RawRow, StockRecord};

pub struct CsvLoader {
    delimiter: u8,
}

impl CsvLoader {
    pub fn new(delimiter: char) -> Self {
        Self {
            delimiter: delimiter as u8,
        }
    }

    /// Load and normalize an entire spreadsheet.
    ///
    /// Fails only for a structurally absent table (unreadable stream, no
    /// header row). Per-row anomalies are recovered by the normalizer and
    /// counted in the summary.
    pub fn load<R: Read>(
        &self,
        reader: R,
        source_name: &str,
    ) -> Result<(Vec<StockRecord>, LoadSummary), IngestError> {
        info!("Loading stock spreadsheet from '{}'", source_name);

        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader
            .headers()
            .map_err(IngestError::Parse)?
            .iter()
            .map(|h| h.trim().to_lowercase())
            .collect();

        if headers.iter().all(|h| h.is_empty()) {
            return Err(IngestError::missing_header(source_name));
        }

        let mut records = Vec::new();
        let mut summary = LoadSummary::default();

        for (line, row_result) in csv_reader.records().enumerate() {
            let raw = match row_result {
                Ok(raw) => raw,
                Err(e) => {
                    // A single unreadable line is a row-level anomaly, not
                    // a structural failure.
                    debug!("Skipping unreadable row {}: {}", line + 2, e);
                    summary.skipped += 1;
                    continue;
                }
            };

            let row: RawRow = headers
                .iter()
                .cloned()
                .zip(raw.iter().map(str::to_string))
                .collect();

            match normalize_row(&row) {
                Some(record) => records.push(record),
                None => {
                    debug!("Skipping row {} with no identifying data", line + 2);
                    summary.skipped += 1;
                }
            }

            if records.len() % 1000 == 0 && !records.is_empty() {
                debug!("Parsed {} records from '{}'", records.len(), source_name);
            }
        }

        summary.loaded = records.len();
        info!(
            "Load completed for '{}': {} records, {} rows skipped",
            source_name, summary.loaded, summary.skipped
        );

        Ok((records, summary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_records_in_source_order() {
        let data = "Code,Name,Qty,Reserve\nTC-1001,Tile,150,25\nTC-1002,Grout,80,0\n";
        let loader = CsvLoader::new(',');
        let (records, summary) = loader.load(data.as_bytes(), "test.csv").unwrap();
        assert_eq!(summary.loaded, 2);
        assert_eq!(summary.skipped, 0);
        assert_eq!(records[0].code, "TC-1001");
        assert_eq!(records[1].code, "TC-1002");
    }

    #[test]
    fn header_case_does_not_matter() {
        let data = "SKU,Description,Quantity\ntc-9,Spacer bag,40\n";
        let loader = CsvLoader::new(',');
        let (records, _) = loader.load(data.as_bytes(), "test.csv").unwrap();
        assert_eq!(records[0].code, "TC-9");
        assert_eq!(records[0].name, "Spacer bag");
        assert_eq!(records[0].quantity_on_hand, 40);
    }

    #[test]
    fn blank_rows_are_counted_as_skipped() {
        let data = "Code,Name,Qty\nTC-1,Tile,5\n,,\n,,9\n";
        let loader = CsvLoader::new(',');
        let (records, summary) = loader.load(data.as_bytes(), "test.csv").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(summary.skipped, 2);
    }

    #[test]
    fn empty_header_row_is_a_structural_error() {
        let data = ",,\nTC-1,Tile,5\n";
        let loader = CsvLoader::new(',');
        let result = loader.load(data.as_bytes(), "test.csv");
        assert!(matches!(result, Err(IngestError::MissingHeader { .. })));
    }

    #[test]
    fn semicolon_delimiter_is_supported() {
        let data = "Code;Name;Qty\nTC-1;Tile;5\n";
        let loader = CsvLoader::new(';');
        let (records, _) = loader.load(data.as_bytes(), "test.csv").unwrap();
        assert_eq!(records[0].quantity_on_hand, 5);
    }
}
