//! Round-trip serializer: renders a [`QueryRequest`] back into the URL grammar.

use std::fmt;

use url::form_urlencoded;

use crate::parse::{DESC_MARKER, RULE_SEPARATOR};
use crate::query::{FilterRule, QueryRequest, SearchMethod, SortRule};

impl FilterRule {
    /// Render as a `field||$op||value` token (unescaped).
    pub fn to_token(&self) -> String {
        match &self.value {
            Some(value) => format!(
                "{}{RULE_SEPARATOR}{}{RULE_SEPARATOR}{}",
                self.field,
                self.operator.symbol(),
                value
            ),
            None => format!("{}{RULE_SEPARATOR}{}", self.field, self.operator.symbol()),
        }
    }
}

impl fmt::Display for FilterRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_token())
    }
}

impl SortRule {
    /// Render as a `field` or `field,DESC` token.
    pub fn to_token(&self) -> String {
        if self.descending {
            format!("{},{DESC_MARKER}", self.field)
        } else {
            self.field.clone()
        }
    }
}

impl fmt::Display for SortRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_token())
    }
}

impl QueryRequest {
    /// Render as unescaped parameter pairs in canonical order.
    ///
    /// Defaults are omitted: zero pagination values, the `Contains` method,
    /// a case-insensitive search and a disabled cache flag.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();

        for rule in &self.filters().rules {
            pairs.push(("filter", rule.to_token()));
        }
        for rule in &self.inclusive().rules {
            pairs.push(("or", rule.to_token()));
        }
        for sort in &self.sorts {
            pairs.push(("sort", sort.to_token()));
        }
        if !self.select.is_empty() {
            pairs.push(("select", self.select.join(",")));
        }
        if !self.joins.is_empty() {
            pairs.push(("join", self.joins.join(",")));
        }

        if !self.search.term.is_empty() {
            pairs.push(("search", self.search.term.clone()));
        }
        if self.search.method != SearchMethod::Contains {
            pairs.push(("searchMethod", self.search.method.as_str().to_string()));
        }
        if self.search.case_sensitive {
            pairs.push(("caseSensitive", "true".to_string()));
        }
        if !self.search.fields.is_empty() {
            pairs.push(("searchFields", self.search.fields.join(",")));
        }

        if self.page > 0 {
            pairs.push(("page", self.page.to_string()));
        }
        if self.limit > 0 {
            pairs.push(("limit", self.limit.to_string()));
        }
        if self.offset > 0 {
            pairs.push(("offset", self.offset.to_string()));
        }
        if self.cache {
            pairs.push(("cache", "1".to_string()));
        }

        pairs
    }

    /// Render as a form-encoded query string with a leading `?`.
    ///
    /// An empty request renders as an empty string.
    pub fn to_query_string(&self) -> String {
        let pairs = self.to_pairs();
        if pairs.is_empty() {
            return String::new();
        }
        let mut serializer = form_urlencoded::Serializer::new(String::from("?"));
        serializer.extend_pairs(pairs);
        serializer.finish()
    }
}
