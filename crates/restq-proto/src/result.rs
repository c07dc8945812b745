//! Response shapes produced by the query engine.

use std::collections::BTreeSet;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::value::Value;

/// Pagination envelope returned when a request has `page > 0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResult<T> {
    /// Whether the query executed.
    pub succeeded: bool,
    /// Records of the requested page.
    pub data: Vec<T>,
    /// One-based page number.
    pub current_page: u32,
    /// Records per page.
    pub page_size: u32,
    /// Matching records before the page window was applied.
    pub total_count: u64,
    /// `ceil(total_count / page_size)`.
    pub total_pages: u64,
    /// Whether a page precedes this one.
    pub has_previous_page: bool,
    /// Whether a page follows this one.
    pub has_next_page: bool,
}

impl<T> PaginatedResult<T> {
    /// Wrap a page of records.
    pub fn success(data: Vec<T>, current_page: u32, page_size: u32, total_count: u64) -> Self {
        let total_pages = total_pages(total_count, page_size);
        Self {
            succeeded: true,
            data,
            current_page,
            page_size,
            total_count,
            total_pages,
            has_previous_page: current_page > 1,
            has_next_page: u64::from(current_page) < total_pages,
        }
    }
}

/// Number of pages needed for `total` records.
pub fn total_pages(total: u64, page_size: u32) -> u64 {
    if page_size == 0 {
        0
    } else {
        total.div_ceil(u64::from(page_size))
    }
}

/// Result of the count operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountResult {
    /// Records matching the filters and search.
    pub count: u64,
    /// Whether any filter or non-blank search term was applied.
    pub with_filter: bool,
}

/// One distinct text value seen by the histogram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextCount {
    /// The text value.
    pub text: String,
    /// Occurrences across every scanned field.
    pub count: u64,
    /// Fields in which the value was seen.
    pub fields: BTreeSet<String>,
}

impl TextCount {
    /// Create an entry for a value not yet counted.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            count: 0,
            fields: BTreeSet::new(),
        }
    }

    /// Record one more occurrence in `field`.
    pub fn record(&mut self, field: &str) {
        self.count += 1;
        if !self.fields.contains(field) {
            self.fields.insert(field.to_string());
        }
    }
}

/// A projected record: field values in the order they were requested.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row(Vec<(String, Value)>);

impl Row {
    /// Create an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field.
    pub fn push(&mut self, name: impl Into<String>, value: Value) {
        self.0.push((name.into(), value));
    }

    /// Get a field value by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Field names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(n, _)| n.as_str())
    }

    /// Iterate over `(name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the row has no fields.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(3, 1), 3);
        assert_eq!(total_pages(21, 10), 3);
        assert_eq!(total_pages(20, 10), 2);
        assert_eq!(total_pages(5, 0), 0);
    }

    #[test]
    fn test_envelope_flags() {
        let first = PaginatedResult::success(vec![1], 1, 1, 3);
        assert!(!first.has_previous_page);
        assert!(first.has_next_page);

        let last = PaginatedResult::success(vec![3], 3, 1, 3);
        assert!(last.has_previous_page);
        assert!(!last.has_next_page);
        assert_eq!(last.total_pages, 3);
    }

    #[test]
    fn test_envelope_json_is_camel_case() {
        let json = serde_json::to_value(PaginatedResult::success(vec!["a"], 2, 1, 3)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "succeeded": true,
                "data": ["a"],
                "currentPage": 2,
                "pageSize": 1,
                "totalCount": 3,
                "totalPages": 3,
                "hasPreviousPage": true,
                "hasNextPage": true
            })
        );
    }

    #[test]
    fn test_count_json() {
        let count = CountResult {
            count: 2,
            with_filter: true,
        };
        let json = serde_json::to_value(count).unwrap();
        assert_eq!(json, serde_json::json!({ "count": 2, "withFilter": true }));
    }

    #[test]
    fn test_text_count_record() {
        let mut entry = TextCount::new("Apple");
        entry.record("name");
        entry.record("description");
        entry.record("name");
        assert_eq!(entry.count, 3);
        assert_eq!(entry.fields.len(), 2);
    }

    #[test]
    fn test_row_keeps_order() {
        let mut row = Row::new();
        row.push("price", Value::Int64(10));
        row.push("name", Value::from("Apple"));
        assert_eq!(row.names().collect::<Vec<_>>(), vec!["price", "name"]);
        assert_eq!(row.get("name"), Some(&Value::from("Apple")));
        assert_eq!(
            serde_json::to_string(&row).unwrap(),
            r#"{"price":10,"name":"Apple"}"#
        );
    }
}
