//! Rule parser: decodes the URL grammar into a [`QueryRequest`].
//!
//! Parsing is schema-independent. Field names are kept as written and only
//! resolved when the request is compiled, and a missing value segment is
//! accepted here for every operator since only the compiler knows whether
//! the field and operator combination needs one.

use tracing::warn;

use crate::error::Error;
use crate::query::{FilterRule, Operator, QueryRequest, SearchMethod, SortRule};

/// Separator between the segments of a filter token.
pub const RULE_SEPARATOR: &str = "||";

/// Marker in the second segment of a sort token that flips it to descending.
pub const DESC_MARKER: &str = "DESC";

/// Knobs for the rule parser.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Reject unknown operator symbols instead of falling back to equality.
    pub strict_operators: bool,
}

impl ParseOptions {
    /// Options that reject unknown operator symbols.
    pub fn strict() -> Self {
        Self {
            strict_operators: true,
        }
    }
}

impl FilterRule {
    /// Parse a `field||$op||value` token with permissive operator lookup.
    pub fn parse(token: &str) -> Result<FilterRule, Error> {
        Self::parse_with(token, ParseOptions::default())
    }

    /// Parse a `field||$op||value` token.
    ///
    /// Everything after the second separator is the value, so a value may
    /// itself contain `||`.
    pub fn parse_with(token: &str, options: ParseOptions) -> Result<FilterRule, Error> {
        if token.is_empty() {
            return Err(Error::parse("empty filter rule"));
        }

        let mut segments = token.splitn(3, RULE_SEPARATOR);
        let field = segments.next().unwrap_or_default();
        if field.is_empty() {
            return Err(Error::parse(format!("filter rule `{token}` has no field")));
        }

        let symbol = segments
            .next()
            .ok_or_else(|| Error::parse(format!("filter rule `{token}` has no operator")))?;
        let operator = resolve_operator(symbol, options)?;
        let value = segments.next().map(str::to_string);

        Ok(FilterRule::new(field, operator, value))
    }
}

fn resolve_operator(symbol: &str, options: ParseOptions) -> Result<Operator, Error> {
    if let Some(operator) = Operator::from_symbol(symbol) {
        return Ok(operator);
    }
    if options.strict_operators {
        return Err(Error::UnsupportedOperator(symbol.trim().to_string()));
    }
    warn!(symbol = %symbol, "unknown operator symbol, falling back to $eq");
    Ok(Operator::Equal)
}

impl SortRule {
    /// Parse a `field` or `field,DESC` token.
    ///
    /// Only the second comma segment is the direction, compared verbatim;
    /// anything else means ascending and later segments are ignored.
    pub fn parse(token: &str) -> Result<SortRule, Error> {
        let mut segments = token.split(',');
        let field = segments.next().unwrap_or_default();
        if field.is_empty() {
            return Err(Error::parse(format!("sort rule `{token}` has no field")));
        }
        Ok(SortRule {
            field: field.to_string(),
            descending: segments.next() == Some(DESC_MARKER),
        })
    }
}

/// Split a comma-joined field list, dropping blank entries.
pub fn split_field_list(list: &str) -> impl Iterator<Item = String> + '_ {
    list.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}

fn parse_count(key: &str, value: &str) -> Result<u32, Error> {
    value
        .trim()
        .parse::<u32>()
        .map_err(|_| Error::parse(format!("`{key}` must be a non-negative integer, got `{value}`")))
}

fn parse_flag(key: &str, value: &str) -> Result<bool, Error> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if value.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(Error::parse(format!("`{key}` must be true or false, got `{value}`")))
    }
}

impl QueryRequest {
    /// Decode already-unescaped parameter pairs with permissive options.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<QueryRequest, Error>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        Self::from_pairs_with(pairs, ParseOptions::default())
    }

    /// Decode already-unescaped parameter pairs.
    ///
    /// List-valued parameters accumulate across repeats; for scalar
    /// parameters the last occurrence wins. Unknown keys are ignored.
    pub fn from_pairs_with<I, K, V>(pairs: I, options: ParseOptions) -> Result<QueryRequest, Error>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut request = QueryRequest::new();

        for (key, value) in pairs {
            let key = key.as_ref();
            let value = value.as_ref();
            match key {
                "filter" => request.filters_mut().push(FilterRule::parse_with(value, options)?),
                "or" => request.inclusive_mut().push(FilterRule::parse_with(value, options)?),
                "sort" => request.sorts.push(SortRule::parse(value)?),
                "select" => request.select.extend(split_field_list(value)),
                "join" => request.joins.extend(split_field_list(value)),
                "searchFields" => request.search.fields.extend(split_field_list(value)),
                "search" => request.search.term = value.to_string(),
                "searchMethod" => {
                    request.search.method = if value.trim().is_empty() {
                        SearchMethod::default()
                    } else {
                        SearchMethod::from_name(value.trim()).ok_or_else(|| {
                            Error::parse(format!("unknown search method `{value}`"))
                        })?
                    };
                }
                "caseSensitive" => request.search.case_sensitive = parse_flag(key, value)?,
                "page" => request.page = parse_count(key, value)?,
                "limit" => request.limit = parse_count(key, value)?,
                "offset" => request.offset = parse_count(key, value)?,
                "cache" => {
                    request.cache = value
                        .trim()
                        .parse::<i64>()
                        .map_err(|_| Error::parse(format!("`cache` must be 0 or 1, got `{value}`")))?
                        == 1;
                }
                _ => {}
            }
        }

        Ok(request)
    }

    /// Decode a raw `application/x-www-form-urlencoded` query string.
    ///
    /// A leading `?` is tolerated.
    pub fn from_query_string(query: &str) -> Result<QueryRequest, Error> {
        Self::from_query_string_with(query, ParseOptions::default())
    }

    /// Decode a raw query string with explicit options.
    pub fn from_query_string_with(query: &str, options: ParseOptions) -> Result<QueryRequest, Error> {
        let query = query.strip_prefix('?').unwrap_or(query);
        Self::from_pairs_with(url::form_urlencoded::parse(query.as_bytes()), options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Combinator;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_filter_rule() {
        let rule = FilterRule::parse("name||$eq||Apple").unwrap();
        assert_eq!(rule, FilterRule::eq("name", "Apple"));
    }

    #[test]
    fn test_parse_null_check_without_value() {
        let rule = FilterRule::parse("deleted_at||$isnull").unwrap();
        assert_eq!(rule, FilterRule::is_null("deleted_at"));
    }

    #[test]
    fn test_missing_value_is_left_to_compiler() {
        let rule = FilterRule::parse("price||$gt").unwrap();
        assert_eq!(rule.operator, Operator::Greater);
        assert_eq!(rule.value, None);
    }

    #[test]
    fn test_value_may_contain_separator() {
        let rule = FilterRule::parse("code||$eq||a||b").unwrap();
        assert_eq!(rule.value.as_deref(), Some("a||b"));
    }

    #[test]
    fn test_empty_and_partial_tokens_fail() {
        assert!(matches!(FilterRule::parse(""), Err(Error::Parse(_))));
        assert!(matches!(FilterRule::parse("name"), Err(Error::Parse(_))));
        assert!(matches!(FilterRule::parse("||$eq||x"), Err(Error::Parse(_))));
    }

    #[test]
    fn test_unknown_operator_permissive() {
        let rule = FilterRule::parse("name||$like||App").unwrap();
        assert_eq!(rule.operator, Operator::Equal);
    }

    #[test]
    fn test_unknown_operator_strict() {
        let result = FilterRule::parse_with("name||$like||App", ParseOptions::strict());
        assert_eq!(result, Err(Error::UnsupportedOperator("$like".into())));
    }

    #[test]
    fn test_trailing_space_operator() {
        let rule = FilterRule::parse_with("name||$notnull ", ParseOptions::strict()).unwrap();
        assert_eq!(rule.operator, Operator::IsNotNull);
    }

    #[test]
    fn test_parse_sort_rule() {
        assert_eq!(SortRule::parse("price").unwrap(), SortRule::asc("price"));
        assert_eq!(SortRule::parse("price,DESC").unwrap(), SortRule::desc("price"));
        // Direction marker is case-sensitive.
        assert_eq!(SortRule::parse("price,desc").unwrap(), SortRule::asc("price"));
        assert_eq!(SortRule::parse("price,ASC").unwrap(), SortRule::asc("price"));
        assert!(SortRule::parse(",DESC").is_err());
    }

    #[test]
    fn test_sort_direction_is_second_segment_only() {
        assert_eq!(SortRule::parse("price,DESC,x").unwrap(), SortRule::desc("price"));
        assert_eq!(SortRule::parse("price,x,DESC").unwrap(), SortRule::asc("price"));
        assert_eq!(SortRule::parse("price, DESC").unwrap(), SortRule::asc("price"));
        assert_eq!(SortRule::parse("price,DESC ").unwrap(), SortRule::asc("price"));
    }

    #[test]
    fn test_field_names_kept_verbatim() {
        assert_eq!(FilterRule::parse(" name||$eq||x").unwrap().field, " name");
        assert_eq!(SortRule::parse(" price").unwrap().field, " price");
    }

    #[test]
    fn test_split_field_list() {
        let fields: Vec<_> = split_field_list(" name, ,price,").collect();
        assert_eq!(fields, vec!["name".to_string(), "price".to_string()]);
    }

    #[test]
    fn test_from_query_string() {
        let request = QueryRequest::from_query_string(
            "?filter=name%7C%7C%24eq%7C%7CApple&or=price||$gt||15&sort=price,DESC&sort=name\
             &select=id,name&join=owner&search=app&searchMethod=StartsWith&caseSensitive\
             &searchFields=name&page=2&limit=5&cache=1",
        )
        .unwrap();

        assert_eq!(request.filters().combinator(), Combinator::And);
        assert_eq!(request.filters().rules, vec![FilterRule::eq("name", "Apple")]);
        assert_eq!(request.inclusive().rules, vec![FilterRule::gt("price", "15")]);
        assert_eq!(request.sorts, vec![SortRule::desc("price"), SortRule::asc("name")]);
        assert_eq!(request.select, vec!["id".to_string(), "name".to_string()]);
        assert_eq!(request.joins, vec!["owner".to_string()]);
        assert_eq!(request.search.term, "app");
        assert_eq!(request.search.method, SearchMethod::StartsWith);
        assert!(request.search.case_sensitive);
        assert_eq!(request.search.fields, vec!["name".to_string()]);
        assert_eq!(request.page, 2);
        assert_eq!(request.limit, 5);
        assert!(request.cache);
    }

    #[test]
    fn test_plus_decodes_to_space() {
        let request = QueryRequest::from_query_string("filter=name||$eq||apple+pie").unwrap();
        assert_eq!(request.filters().rules[0].value.as_deref(), Some("apple pie"));
    }

    #[test]
    fn test_last_scalar_wins() {
        let request = QueryRequest::from_query_string("page=1&page=3&search=a&search=b").unwrap();
        assert_eq!(request.page, 3);
        assert_eq!(request.search.term, "b");
    }

    #[test]
    fn test_bad_scalars() {
        assert!(QueryRequest::from_query_string("page=-1").is_err());
        assert!(QueryRequest::from_query_string("limit=ten").is_err());
        assert!(QueryRequest::from_query_string("cache=yes").is_err());
        assert!(QueryRequest::from_query_string("caseSensitive=maybe").is_err());
        assert!(QueryRequest::from_query_string("searchMethod=Fuzzy").is_err());
    }

    #[test]
    fn test_cache_flag_values() {
        assert!(!QueryRequest::from_query_string("cache=0").unwrap().cache);
        assert!(!QueryRequest::from_query_string("cache=2").unwrap().cache);
        assert!(QueryRequest::from_query_string("cache=1").unwrap().cache);
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let request = QueryRequest::from_query_string("utm_source=mail&limit=3").unwrap();
        assert_eq!(request.limit, 3);
        assert!(!request.has_filters());
    }
}
