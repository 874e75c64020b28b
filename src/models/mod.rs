use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One normalized inventory line.
///
/// Records are immutable after creation; the working set is replaced
/// wholesale on every load event, so there is no update or per-record
/// deletion API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StockRecord {
    /// Trimmed, uppercased identifier. Uniqueness is not enforced;
    /// first match wins on lookup.
    pub code: String,
    /// Free-text label; may contain embedded line breaks.
    pub name: String,
    pub quantity_on_hand: i64,
    pub reserved: i64,
}

impl StockRecord {
    /// Derived availability. May be negative, which is a
    /// display-flaggable state rather than an error.
    pub fn available(&self) -> i64 {
        self.quantity_on_hand - self.reserved
    }

    /// First line of the name, for compact displays and labels.
    pub fn display_name(&self) -> &str {
        self.name.lines().next().unwrap_or("")
    }
}

/// A raw spreadsheet row: lowercased header name -> raw cell value.
///
/// Produced by the loader before normalization; cells may be absent or
/// hold arbitrary text.
pub type RawRow = HashMap<String, String>;

/// Accepted header spellings for each `StockRecord` field.
///
/// Source spreadsheets drift between exports (`Code` vs `SKU`, `Qty` vs
/// `Quantity`); lookup is over the lowercased header.
pub const CODE_HEADERS: &[&str] = &["code", "item code", "sku", "barcode"];
pub const NAME_HEADERS: &[&str] = &["name", "item name", "description"];
pub const QUANTITY_HEADERS: &[&str] = &["qty", "quantity", "qty on hand", "on hand", "stock"];
pub const RESERVED_HEADERS: &[&str] = &["reserve", "reserved", "allocated"];

/// Outcome of one load event.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct LoadSummary {
    /// Rows that produced a record
    pub loaded: usize,
    /// Rows dropped for having no identifying data
    pub skipped: usize,
}

/// One stored artifact-cache entry, serialized as JSON in the backing
/// store. Owned exclusively by the cache; a re-render replaces the entry
/// rather than patching it in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: String,
    pub payload: String,
    pub size_bytes: u64,
    pub created_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(key: String, payload: String) -> Self {
        let size_bytes = payload.len() as u64;
        Self {
            key,
            payload,
            size_bytes,
            created_at: Utc::now(),
        }
    }
}
