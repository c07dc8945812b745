//! Structured query request types.
//!
//! A [`QueryRequest`] is the decoded form of the URL grammar: two filter
//! groups, ordering keys, a search directive, a projection list, eager-load
//! hints and pagination parameters. Nothing here knows about schemas; field
//! names are resolved later by the compilers in `restq-core`.

use serde::{Deserialize, Serialize};

/// Comparison semantics of a filter rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Operator {
    /// Field equals value.
    Equal,
    /// Field not equals value.
    NotEqual,
    /// Field greater than value.
    Greater,
    /// Field greater than or equal to value.
    GreaterOrEqual,
    /// Field less than value.
    Less,
    /// Field less than or equal to value.
    LessOrEqual,
    /// Field is null.
    IsNull,
    /// Field is not null.
    IsNotNull,
}

impl Operator {
    /// Every operator in the table.
    pub const ALL: [Operator; 8] = [
        Operator::Equal,
        Operator::NotEqual,
        Operator::Greater,
        Operator::GreaterOrEqual,
        Operator::Less,
        Operator::LessOrEqual,
        Operator::IsNull,
        Operator::IsNotNull,
    ];

    /// The wire symbol for this operator.
    ///
    /// Note that `$le` is the strict "less" and `$lte` is "less or equal".
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Equal => "$eq",
            Operator::NotEqual => "$ne",
            Operator::Greater => "$gt",
            Operator::GreaterOrEqual => "$gte",
            Operator::Less => "$le",
            Operator::LessOrEqual => "$lte",
            Operator::IsNull => "$isnull",
            Operator::IsNotNull => "$notnull",
        }
    }

    /// Look up a wire symbol. Surrounding whitespace is ignored.
    pub fn from_symbol(symbol: &str) -> Option<Operator> {
        let symbol = symbol.trim();
        Self::ALL.into_iter().find(|op| op.symbol() == symbol)
    }

    /// Whether a rule with this operator needs a value segment.
    pub fn requires_value(&self) -> bool {
        !matches!(self, Operator::IsNull | Operator::IsNotNull)
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

/// One atomic comparison: `field||$op||value`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterRule {
    /// Field name, resolved against the schema at compile time.
    pub field: String,
    /// Comparison operator.
    pub operator: Operator,
    /// Literal in string form; absent for null checks.
    pub value: Option<String>,
}

impl FilterRule {
    /// Create a rule.
    pub fn new(field: impl Into<String>, operator: Operator, value: Option<String>) -> Self {
        Self {
            field: field.into(),
            operator,
            value,
        }
    }

    /// Create an equality rule.
    pub fn eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, Operator::Equal, Some(value.into()))
    }

    /// Create a not-equal rule.
    pub fn ne(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, Operator::NotEqual, Some(value.into()))
    }

    /// Create a greater-than rule.
    pub fn gt(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, Operator::Greater, Some(value.into()))
    }

    /// Create a greater-than-or-equal rule.
    pub fn gte(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, Operator::GreaterOrEqual, Some(value.into()))
    }

    /// Create a less-than rule.
    pub fn lt(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, Operator::Less, Some(value.into()))
    }

    /// Create a less-than-or-equal rule.
    pub fn lte(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, Operator::LessOrEqual, Some(value.into()))
    }

    /// Create an IS NULL rule.
    pub fn is_null(field: impl Into<String>) -> Self {
        Self::new(field, Operator::IsNull, None)
    }

    /// Create an IS NOT NULL rule.
    pub fn is_not_null(field: impl Into<String>) -> Self {
        Self::new(field, Operator::IsNotNull, None)
    }
}

/// How the rules of a group are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Combinator {
    /// Every rule must match.
    And,
    /// At least one rule must match.
    Or,
}

/// An ordered set of filter rules combined one way.
///
/// A request owns exactly two groups, and the slot a group sits in fixes
/// its combinator: see [`QueryRequest::filters`] and
/// [`QueryRequest::inclusive`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FilterGroup {
    combinator: Combinator,
    /// Rules in request order.
    pub rules: Vec<FilterRule>,
}

impl FilterGroup {
    pub(crate) fn all() -> Self {
        Self {
            combinator: Combinator::And,
            rules: Vec::new(),
        }
    }

    pub(crate) fn any() -> Self {
        Self {
            combinator: Combinator::Or,
            rules: Vec::new(),
        }
    }

    /// How the rules are combined.
    pub fn combinator(&self) -> Combinator {
        self.combinator
    }

    /// Append a rule.
    pub fn push(&mut self, rule: FilterRule) {
        self.rules.push(rule);
    }

    /// Check if the group has no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }
}

/// One ordering key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortRule {
    /// Field to order by.
    pub field: String,
    /// Descending when set.
    pub descending: bool,
}

impl SortRule {
    /// Create an ascending key.
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: false,
        }
    }

    /// Create a descending key.
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            descending: true,
        }
    }
}

/// How a search term is matched against a text field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SearchMethod {
    /// Substring match.
    #[default]
    Contains,
    /// Prefix match.
    StartsWith,
    /// Suffix match.
    EndsWith,
}

impl SearchMethod {
    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchMethod::Contains => "Contains",
            SearchMethod::StartsWith => "StartsWith",
            SearchMethod::EndsWith => "EndsWith",
        }
    }

    /// Look up a wire name.
    pub fn from_name(name: &str) -> Option<SearchMethod> {
        match name {
            "Contains" => Some(SearchMethod::Contains),
            "StartsWith" => Some(SearchMethod::StartsWith),
            "EndsWith" => Some(SearchMethod::EndsWith),
            _ => None,
        }
    }

    /// Apply the match to an already case-folded haystack and needle.
    pub fn matches(&self, haystack: &str, needle: &str) -> bool {
        match self {
            SearchMethod::Contains => haystack.contains(needle),
            SearchMethod::StartsWith => haystack.starts_with(needle),
            SearchMethod::EndsWith => haystack.ends_with(needle),
        }
    }
}

/// Free-text search directive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchSpec {
    /// Search term; blank means no search.
    pub term: String,
    /// Match mode.
    pub method: SearchMethod,
    /// Compare verbatim when set, otherwise fold case on both sides.
    pub case_sensitive: bool,
    /// Explicit field subset; empty means every text field.
    pub fields: Vec<String>,
}

impl SearchSpec {
    /// A case-insensitive `Contains` search over every text field.
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            ..Self::default()
        }
    }

    /// Set the match mode.
    pub fn with_method(mut self, method: SearchMethod) -> Self {
        self.method = method;
        self
    }

    /// Set case sensitivity.
    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    /// Restrict the search to the given fields.
    pub fn with_fields(mut self, fields: Vec<String>) -> Self {
        self.fields = fields;
        self
    }

    /// A blank term disables the search.
    pub fn is_blank(&self) -> bool {
        self.term.trim().is_empty()
    }
}

/// The fully parsed request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct QueryRequest {
    filters: FilterGroup,
    inclusive: FilterGroup,
    /// Ordering keys, highest priority first.
    pub sorts: Vec<SortRule>,
    /// Projection field list; empty means full records.
    pub select: Vec<String>,
    /// Eager-load hints forwarded to the collection provider.
    pub joins: Vec<String>,
    /// Search directive.
    pub search: SearchSpec,
    /// Page number; zero selects limit/offset mode.
    pub page: u32,
    /// Page size in pagination mode, otherwise a take count.
    pub limit: u32,
    /// Skip count in limit/offset mode.
    pub offset: u32,
    /// Whether the caller allows a cached response.
    pub cache: bool,
}

impl Default for QueryRequest {
    fn default() -> Self {
        Self {
            filters: FilterGroup::all(),
            inclusive: FilterGroup::any(),
            sorts: Vec::new(),
            select: Vec::new(),
            joins: Vec::new(),
            search: SearchSpec::default(),
            page: 0,
            limit: 0,
            offset: 0,
            cache: false,
        }
    }
}

impl QueryRequest {
    /// Create an empty request (matches everything).
    pub fn new() -> Self {
        Self::default()
    }

    /// Required AND-group (`filter=`).
    pub fn filters(&self) -> &FilterGroup {
        &self.filters
    }

    /// Mutable access to the AND-group. Its combinator cannot change.
    pub fn filters_mut(&mut self) -> &mut FilterGroup {
        &mut self.filters
    }

    /// Inclusive OR-group (`or=`).
    pub fn inclusive(&self) -> &FilterGroup {
        &self.inclusive
    }

    /// Mutable access to the OR-group. Its combinator cannot change.
    pub fn inclusive_mut(&mut self) -> &mut FilterGroup {
        &mut self.inclusive
    }

    /// Whether the response is wrapped in a pagination envelope.
    pub fn is_paginated(&self) -> bool {
        self.page > 0
    }

    /// Whether any filter rule or non-blank search term is present.
    pub fn has_filters(&self) -> bool {
        !self.filters.is_empty() || !self.inclusive.is_empty() || !self.search.is_blank()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_table() {
        assert_eq!(Operator::from_symbol("$eq"), Some(Operator::Equal));
        assert_eq!(Operator::from_symbol("$ne"), Some(Operator::NotEqual));
        assert_eq!(Operator::from_symbol("$gt"), Some(Operator::Greater));
        assert_eq!(Operator::from_symbol("$gte"), Some(Operator::GreaterOrEqual));
        assert_eq!(Operator::from_symbol("$lte"), Some(Operator::LessOrEqual));
        assert_eq!(Operator::from_symbol("$le"), Some(Operator::Less));
        assert_eq!(Operator::from_symbol("$isnull"), Some(Operator::IsNull));
        assert_eq!(Operator::from_symbol("$notnull"), Some(Operator::IsNotNull));
        assert_eq!(Operator::from_symbol("$like"), None);
    }

    #[test]
    fn test_operator_symbol_whitespace() {
        assert_eq!(Operator::from_symbol("$notnull "), Some(Operator::IsNotNull));
        assert_eq!(Operator::from_symbol(" $gt"), Some(Operator::Greater));
    }

    #[test]
    fn test_symbols_are_unique() {
        for op in Operator::ALL {
            assert_eq!(Operator::from_symbol(op.symbol()), Some(op));
        }
    }

    #[test]
    fn test_requires_value() {
        assert!(Operator::Equal.requires_value());
        assert!(!Operator::IsNull.requires_value());
        assert!(!Operator::IsNotNull.requires_value());
    }

    #[test]
    fn test_search_method_matching() {
        assert!(SearchMethod::Contains.matches("apple pie", "le p"));
        assert!(SearchMethod::StartsWith.matches("apple pie", "apple"));
        assert!(!SearchMethod::StartsWith.matches("apple pie", "pie"));
        assert!(SearchMethod::EndsWith.matches("apple pie", "pie"));
    }

    #[test]
    fn test_blank_search() {
        assert!(SearchSpec::new("   ").is_blank());
        assert!(!SearchSpec::new("x").is_blank());
    }

    #[test]
    fn test_default_request() {
        let request = QueryRequest::new();
        assert!(!request.is_paginated());
        assert!(!request.has_filters());
        assert_eq!(request.filters().combinator(), Combinator::And);
        assert_eq!(request.inclusive().combinator(), Combinator::Or);
    }
}
