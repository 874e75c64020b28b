//! Row normalization: heterogeneous spreadsheet rows -> canonical records
//!
//! Source spreadsheets drift between exports, so this is deliberately
//! forgiving: header spellings vary, numeric cells may hold anything, and
//! the only way a row is dropped is by having no identifying data at all.

use crate::models::{
    RawRow, StockRecord, CODE_HEADERS, NAME_HEADERS, QUANTITY_HEADERS, RESERVED_HEADERS,
};

/// Normalize one raw row into a `StockRecord`.
///
/// Returns `None` when both code and name are empty after trimming.
/// Pure and total over arbitrary cell content: malformed numeric cells
/// default to 0, never an error.
pub fn normalize_row(row: &RawRow) -> Option<StockRecord> {
    let code = first_present(row, CODE_HEADERS)
        .map(|v| v.trim().to_uppercase())
        .unwrap_or_default();
    let name = first_present(row, NAME_HEADERS)
        .map(|v| v.trim().to_string())
        .unwrap_or_default();

    if code.is_empty() && name.is_empty() {
        return None;
    }

    let quantity_on_hand = parse_quantity(first_present(row, QUANTITY_HEADERS));
    let reserved = parse_quantity(first_present(row, RESERVED_HEADERS));

    Some(StockRecord {
        code,
        name,
        quantity_on_hand,
        reserved,
    })
}

fn first_present<'a>(row: &'a RawRow, headers: &[&str]) -> Option<&'a str> {
    headers
        .iter()
        .find_map(|h| row.get(*h).map(String::as_str))
        .filter(|v| !v.trim().is_empty())
}

/// Defensive integer parse: trims, strips ASCII thousands separators,
/// and falls back to 0 on anything that still fails.
fn parse_quantity(cell: Option<&str>) -> i64 {
    cell.map(|v| v.trim().replace(',', ""))
        .and_then(|v| v.parse::<i64>().ok())
        .unwrap_or(0)
}
