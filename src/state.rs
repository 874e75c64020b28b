//! Application state
//!
//! One explicit struct owns the working record set, the active query,
//! the filtered view, and the current selection. UI/CLI handlers are
//! thin adapters calling into this state rather than owners of it.

use tracing::debug;

use crate::models::StockRecord;
use crate::query::QueryEngine;

#[derive(Default)]
pub struct AppState {
    records: Vec<StockRecord>,
    query: String,
    view: Vec<StockRecord>,
    selected: Option<StockRecord>,
    engine: QueryEngine,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the record set wholesale (the only load semantics).
    /// The active query is re-applied to the new set and the selection
    /// is dropped, since codes may now refer to different items.
    pub fn set_records(&mut self, records: Vec<StockRecord>) {
        debug!(
            "Replacing record set: {} -> {} records",
            self.records.len(),
            records.len()
        );
        self.records = records;
        self.selected = None;
        self.view = self.engine.filter(&self.records, &self.query);
    }

    /// Change the active query and recompute the filtered view in full.
    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_string();
        self.view = self.engine.filter(&self.records, &self.query);
    }

    /// Resolve a scanned/entered code to a record and select it.
    /// `None` is the normal negative result for an unknown code.
    pub fn select_code(&mut self, code: &str) -> Option<&StockRecord> {
        let found = self.engine.lookup(&self.records, code).cloned();
        self.selected = found;
        self.selected.as_ref()
    }

    pub fn records(&self) -> &[StockRecord] {
        &self.records
    }

    /// The ordered filtered view for the active query.
    pub fn view(&self) -> &[StockRecord] {
        &self.view
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn selected(&self) -> Option<&StockRecord> {
        self.selected.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Vec<StockRecord> {
        vec![
            StockRecord {
                code: "TC-1001".to_string(),
                name: "Tile".to_string(),
                quantity_on_hand: 150,
                reserved: 25,
            },
            StockRecord {
                code: "XY-2001".to_string(),
                name: "Spacer".to_string(),
                quantity_on_hand: 400,
                reserved: 10,
            },
        ]
    }

    #[test]
    fn reload_reapplies_the_active_query() {
        let mut state = AppState::new();
        state.set_records(records());
        state.set_query("TC-%");
        assert_eq!(state.view().len(), 1);

        state.set_records(vec![records()[1].clone()]);
        assert!(state.view().is_empty());
        assert_eq!(state.records().len(), 1);
    }

    #[test]
    fn reload_drops_the_selection() {
        let mut state = AppState::new();
        state.set_records(records());
        assert!(state.select_code("TC-1001").is_some());
        state.set_records(records());
        assert!(state.selected().is_none());
    }

    #[test]
    fn unknown_code_is_a_normal_negative_result() {
        let mut state = AppState::new();
        state.set_records(records());
        assert!(state.select_code("ZZ-404").is_none());
        assert!(state.selected().is_none());
    }
}
