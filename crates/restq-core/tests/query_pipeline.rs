//! Integration tests for the query pipeline.

use pretty_assertions::assert_eq;
use restq_core::proto::{FilterRule, QueryBuilder, QueryRequest, SearchMethod};
use restq_core::{
    Entity, Error, FieldDescriptor, MemoryCollection, QueryExecutor, QueryResponse,
    SchemaDescriptor, SchemaRegistry,
};

#[derive(Debug, Clone, PartialEq)]
struct Product {
    id: i64,
    name: String,
    price: i64,
}

impl Entity for Product {
    fn schema() -> Result<SchemaDescriptor<Self>, Error> {
        SchemaDescriptor::builder("products")
            .with_field(FieldDescriptor::identifier("id", |p: &Product| p.id))
            .with_field(FieldDescriptor::text("name", |p: &Product| p.name.clone()))
            .with_field(FieldDescriptor::number("price", |p: &Product| p.price))
            .with_identity("id")
            .build()
    }
}

fn product(id: i64, name: &str, price: i64) -> Product {
    Product {
        id,
        name: name.to_string(),
        price,
    }
}

struct TestContext {
    registry: SchemaRegistry,
    collection: MemoryCollection<Product>,
}

impl TestContext {
    fn new() -> Self {
        Self {
            registry: SchemaRegistry::new(),
            collection: MemoryCollection::from(vec![
                product(1, "Apple", 10),
                product(2, "Banana", 20),
                product(3, "apple pie", 5),
            ]),
        }
    }

    fn run(&self, request: &QueryRequest) -> Result<QueryResponse<Product>, Error> {
        let schema = self.registry.schema_of::<Product>()?;
        QueryExecutor::new(&schema, &self.collection).execute(request)
    }

    fn ids(&self, query: &str) -> Vec<i64> {
        let request = QueryRequest::from_query_string(query).unwrap();
        self.run(&request)
            .unwrap()
            .records()
            .iter()
            .map(|r| r.as_full().unwrap().id)
            .collect()
    }
}

#[test]
fn test_and_group_or_inclusive_group() {
    let ctx = TestContext::new();
    assert_eq!(ctx.ids("filter=name||$eq||Apple&or=price||$gt||15"), vec![1, 2]);
}

#[test]
fn test_groups_are_not_intersected() {
    let ctx = TestContext::new();
    // A record matching only the inclusive rule is still returned.
    assert_eq!(ctx.ids("filter=name||$eq||Cherry&or=price||$gt||15"), vec![2]);
    // A record matching only the required rule is still returned.
    assert_eq!(ctx.ids("filter=price||$le||6&or=name||$eq||Cherry"), vec![3]);
}

#[test]
fn test_case_insensitive_contains_search() {
    let ctx = TestContext::new();
    assert_eq!(ctx.ids("search=apple"), vec![1, 3]);
}

#[test]
fn test_case_sensitivity_toggle() {
    let ctx = TestContext::new();
    // Term case differs from "Apple": the flag changes the outcome.
    assert_eq!(ctx.ids("search=apple&caseSensitive=true"), vec![3]);
    assert_eq!(ctx.ids("search=apple&caseSensitive=false"), vec![1, 3]);
    // Term case matches "Banana": the flag does not matter.
    assert_eq!(ctx.ids("search=Banana&caseSensitive=true"), vec![2]);
    assert_eq!(ctx.ids("search=Banana&caseSensitive=false"), vec![2]);
}

#[test]
fn test_search_method_and_filters_combine() {
    let ctx = TestContext::new();
    assert_eq!(ctx.ids("search=pie&searchMethod=EndsWith"), vec![3]);
    assert_eq!(ctx.ids("search=apple&filter=price||$gte||10"), vec![1]);
}

#[test]
fn test_second_page_sorted_by_price() {
    let ctx = TestContext::new();
    let request = QueryRequest::from_query_string("page=2&limit=1&sort=price").unwrap();
    let response = ctx.run(&request).unwrap();

    let page = response.page().expect("paginated response");
    assert_eq!(page.total_count, 3);
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.current_page, 2);
    assert_eq!(page.data.len(), 1);
    assert_eq!(page.data[0].as_full().unwrap().price, 10);
}

#[test]
fn test_pages_cover_filtered_set() {
    let ctx = TestContext::new();
    let filtered = ctx.ids("filter=price||$gte||5&sort=price,DESC");

    for page_size in 1..=4u32 {
        let mut seen = Vec::new();
        let first = QueryBuilder::new()
            .filter(FilterRule::gte("price", "5"))
            .sort_desc("price")
            .page(1, page_size)
            .build();
        let total_pages = ctx.run(&first).unwrap().page().unwrap().total_pages;
        assert_eq!(total_pages, 3u64.div_ceil(u64::from(page_size)));

        for page in 1..=total_pages as u32 {
            let mut request = first.clone();
            request.page = page;
            let response = ctx.run(&request).unwrap();
            seen.extend(response.records().iter().map(|r| r.as_full().unwrap().id));
        }
        assert_eq!(seen, filtered);
    }
}

#[test]
fn test_equality_matches_exactly() {
    let ctx = TestContext::new();
    for (literal, expected) in [("10", vec![1]), ("20", vec![2]), ("7", vec![])] {
        assert_eq!(ctx.ids(&format!("filter=price||$eq||{literal}")), expected);
    }
    assert_eq!(ctx.ids("filter=name||$eq||apple+pie"), vec![3]);
}

#[test]
fn test_unknown_field_fails_fast() {
    let ctx = TestContext::new();
    for query in [
        "filter=colour||$eq||red",
        "or=colour||$isnull",
        "sort=colour",
        "select=id,colour",
        "search=x&searchFields=colour",
    ] {
        let request = QueryRequest::from_query_string(query).unwrap();
        let err = ctx.run(&request).unwrap_err();
        assert!(
            matches!(err, Error::FieldNotFound { ref field, .. } if field == "colour"),
            "{query}: {err}"
        );
    }
}

#[test]
fn test_request_errors() {
    let ctx = TestContext::new();

    let request = QueryRequest::from_query_string("filter=price||$gt||cheap").unwrap();
    assert!(matches!(ctx.run(&request), Err(Error::LiteralTypeMismatch { .. })));

    let request = QueryRequest::from_query_string("filter=price||$gt").unwrap();
    assert!(matches!(ctx.run(&request), Err(Error::MissingRequiredValue { .. })));
}

#[test]
fn test_round_trip_preserves_results() {
    let ctx = TestContext::new();
    let built = QueryBuilder::new()
        .filter(FilterRule::eq("name", "apple pie"))
        .or(FilterRule::gt("price", "15"))
        .sort_desc("price")
        .search("a")
        .search_method(SearchMethod::Contains)
        .build();

    let reparsed = QueryRequest::from_query_string(&built.to_query_string()).unwrap();
    assert_eq!(reparsed, built);

    let direct = ctx.run(&built).unwrap();
    let via_text = ctx.run(&reparsed).unwrap();
    assert_eq!(direct, via_text);
    assert_eq!(direct.records().len(), 2);
}
