//! Text histogram over projected rows.

use std::collections::HashMap;

use restq_proto::{Row, TextCount, Value};

/// Running count of distinct text values, keyed by content.
#[derive(Debug, Default)]
pub struct TextHistogram {
    entries: HashMap<blake3::Hash, TextCount>,
}

impl TextHistogram {
    /// Create an empty histogram.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count every non-null text value of a row.
    pub fn record_row(&mut self, row: &Row) {
        for (field, value) in row.iter() {
            if let Value::String(text) = value {
                self.record(field, text);
            }
        }
    }

    /// Count one occurrence of `text` in `field`.
    pub fn record(&mut self, field: &str, text: &str) {
        self.entries
            .entry(blake3::hash(text.as_bytes()))
            .or_insert_with(|| TextCount::new(text))
            .record(field);
    }

    /// Number of distinct values.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing has been counted.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Finish counting. Entries are ordered by descending count, then text.
    pub fn into_entries(self) -> Vec<TextCount> {
        let mut entries: Vec<_> = self.entries.into_values().collect();
        entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.text.cmp(&b.text)));
        entries
    }
}

impl<'a> Extend<&'a Row> for TextHistogram {
    fn extend<I: IntoIterator<Item = &'a Row>>(&mut self, rows: I) {
        for row in rows {
            self.record_row(row);
        }
    }
}
