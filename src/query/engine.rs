//! Query/filter engine over the normalized record set
//!
//! Matching is case-insensitive substring over code and name, with `%`
//! as a wildcard for any run of characters. Every other regex
//! metacharacter in the user query is escaped literally, so user input
//! can never inject pattern syntax. Output order always follows source
//! order; results are never relevance-ranked.

use anyhow::Result;
use regex::{Regex, RegexBuilder};
use std::collections::HashMap;

use crate::models::StockRecord;

pub struct QueryEngine {
    // Cache compiled regexes for performance
    regex_cache: HashMap<String, Regex>,
}

impl Default for QueryEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryEngine {
    pub fn new() -> Self {
        Self {
            regex_cache: HashMap::new(),
        }
    }

    /// Filter records by the active query, preserving source order.
    ///
    /// An empty or whitespace-only query returns every record. A query
    /// containing `%` is compiled as a wildcard pattern; anything else is
    /// a plain case-insensitive substring match.
    pub fn filter(&mut self, records: &[StockRecord], query: &str) -> Vec<StockRecord> {
        let query = query.trim();
        if query.is_empty() {
            return records.to_vec();
        }

        if query.contains('%') {
            match self.get_or_compile_wildcard(query) {
                Ok(regex) => records
                    .iter()
                    .filter(|r| regex.is_match(&r.code) || regex.is_match(&r.name))
                    .cloned()
                    .collect(),
                // An uncompilable pattern cannot happen with escaped input,
                // but degrade to substring matching rather than erroring.
                Err(_) => self.substring_filter(records, query),
            }
        } else {
            self.substring_filter(records, query)
        }
    }

    /// Resolve an externally scanned code to a record.
    ///
    /// The probe is trimmed and uppercased the same way codes are
    /// normalized on load; first exact match wins. Absence is a normal
    /// negative result.
    pub fn lookup<'a>(&self, records: &'a [StockRecord], code: &str) -> Option<&'a StockRecord> {
        let probe = code.trim().to_uppercase();
        records.iter().find(|r| r.code == probe)
    }

    fn substring_filter(&self, records: &[StockRecord], query: &str) -> Vec<StockRecord> {
        let needle = query.to_lowercase();
        records
            .iter()
            .filter(|r| {
                r.code.to_lowercase().contains(&needle) || r.name.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect()
    }

    // Compiled `Regex` is cheap to clone (shared internals), so the memo
    // hands out owned copies.
    fn get_or_compile_wildcard(&mut self, query: &str) -> Result<Regex> {
        if !self.regex_cache.contains_key(query) {
            let pattern = Self::wildcard_to_pattern(query);
            let regex = RegexBuilder::new(&pattern).case_insensitive(true).build()?;
            self.regex_cache.insert(query.to_string(), regex);
        }

        Ok(self.regex_cache[query].clone())
    }

    /// Compile a `%`-wildcard query into a regex pattern, escaping all
    /// other metacharacters literally.
    fn wildcard_to_pattern(query: &str) -> String {
        let escaped: Vec<String> = query.split('%').map(|part| regex::escape(part)).collect();
        escaped.join(".*")
    }
}
