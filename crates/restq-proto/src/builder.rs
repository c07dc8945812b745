//! Fluent client-side construction of query requests.

use crate::query::{FilterRule, QueryRequest, SearchMethod, SortRule};

/// Builds a [`QueryRequest`] one directive at a time.
///
/// ```
/// use restq_proto::{FilterRule, QueryBuilder};
///
/// let query = QueryBuilder::new()
///     .filter(FilterRule::eq("name", "Apple"))
///     .or(FilterRule::gt("price", "15"))
///     .sort_desc("price")
///     .page(1, 20)
///     .to_query_string();
///
/// assert!(query.starts_with("?filter="));
/// ```
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    request: QueryRequest,
}

impl QueryBuilder {
    /// Create a new builder for an empty request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule to the required AND-group.
    pub fn filter(mut self, rule: FilterRule) -> Self {
        self.request.filters_mut().push(rule);
        self
    }

    /// Add a rule to the inclusive OR-group.
    pub fn or(mut self, rule: FilterRule) -> Self {
        self.request.inclusive_mut().push(rule);
        self
    }

    /// Add an ascending ordering key.
    pub fn sort_asc(mut self, field: impl Into<String>) -> Self {
        self.request.sorts.push(SortRule::asc(field));
        self
    }

    /// Add a descending ordering key.
    pub fn sort_desc(mut self, field: impl Into<String>) -> Self {
        self.request.sorts.push(SortRule::desc(field));
        self
    }

    /// Project the response onto the given fields.
    pub fn select<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.request.select.extend(fields.into_iter().map(Into::into));
        self
    }

    /// Add an eager-load hint.
    pub fn join(mut self, relation: impl Into<String>) -> Self {
        self.request.joins.push(relation.into());
        self
    }

    /// Set the search term.
    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.request.search.term = term.into();
        self
    }

    /// Set the search match mode.
    pub fn search_method(mut self, method: SearchMethod) -> Self {
        self.request.search.method = method;
        self
    }

    /// Make the search case-sensitive.
    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.request.search.case_sensitive = case_sensitive;
        self
    }

    /// Restrict the search to the given fields.
    pub fn search_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.request.search.fields.extend(fields.into_iter().map(Into::into));
        self
    }

    /// Switch to pagination mode.
    pub fn page(mut self, page: u32, page_size: u32) -> Self {
        self.request.page = page;
        self.request.limit = page_size;
        self
    }

    /// Set the take count (limit/offset mode).
    pub fn limit(mut self, limit: u32) -> Self {
        self.request.limit = limit;
        self
    }

    /// Set the skip count (limit/offset mode).
    pub fn offset(mut self, offset: u32) -> Self {
        self.request.offset = offset;
        self
    }

    /// Allow a cached response.
    pub fn cached(mut self) -> Self {
        self.request.cache = true;
        self
    }

    /// Finish building.
    pub fn build(self) -> QueryRequest {
        self.request
    }

    /// Render the request as a query string.
    pub fn to_query_string(&self) -> String {
        self.request.to_query_string()
    }
}

impl From<QueryBuilder> for QueryRequest {
    fn from(builder: QueryBuilder) -> Self {
        builder.build()
    }
}
