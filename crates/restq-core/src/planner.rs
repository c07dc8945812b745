//! Query planning: compiles a request against a schema.
//!
//! Planning resolves every field name and coerces every literal. A request
//! that plans successfully cannot fail on account of its own text once the
//! scan starts.

use restq_proto::{QueryRequest, Value};
use tracing::debug;

use crate::error::Error;
use crate::predicate::{CompareOp, Predicate, PredicateCompiler};
use crate::projection::Projection;
use crate::schema::SchemaDescriptor;
use crate::search::compile_search;
use crate::sort::SortPlan;

/// Page size used when a paginated request carries no `limit`.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Which slice of the ordered, filtered records is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    /// Pagination mode: one page plus totals.
    Page { page: u32, page_size: u32 },
    /// Limit/offset mode: `take(limit)` then `skip(offset)`, each only when
    /// non-zero.
    Slice { limit: u32, offset: u32 },
}

impl Window {
    /// Whether the response carries a pagination envelope.
    pub fn is_paginated(&self) -> bool {
        matches!(self, Window::Page { .. })
    }
}

/// A compiled query, ready to run against a collection.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    /// Entity the plan was compiled for.
    pub entity: String,
    /// Filter groups ANDed with the search predicate.
    pub predicate: Predicate,
    /// Ordering keys.
    pub sort: SortPlan,
    /// Result window.
    pub window: Window,
    /// Output shape.
    pub projection: Projection,
    /// Eager-load hints, forwarded to the collection.
    pub includes: Vec<String>,
}

/// Compiles requests against one schema.
pub struct QueryPlanner<'a, T> {
    schema: &'a SchemaDescriptor<T>,
    default_page_size: u32,
}

impl<'a, T> QueryPlanner<'a, T> {
    /// Create a new planner with the default page size.
    pub fn new(schema: &'a SchemaDescriptor<T>) -> Self {
        Self {
            schema,
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Override the page size used when `limit` is zero.
    pub fn with_default_page_size(mut self, page_size: u32) -> Self {
        self.default_page_size = page_size.max(1);
        self
    }

    /// Plan the full query pipeline.
    pub fn plan(&self, request: &QueryRequest) -> Result<QueryPlan, Error> {
        let predicate = self.plan_filter(request)?;
        let sort = SortPlan::compile(self.schema, &request.sorts)?;
        let projection = Projection::compile(self.schema, &request.select)?;

        let window = if request.is_paginated() {
            Window::Page {
                page: request.page,
                page_size: if request.limit > 0 {
                    request.limit
                } else {
                    self.default_page_size
                },
            }
        } else {
            Window::Slice {
                limit: request.limit,
                offset: request.offset,
            }
        };

        debug!(
            entity = self.schema.entity(),
            filter_leaves = predicate.leaf_count(),
            sort_keys = sort.keys().len(),
            projected = !projection.is_identity(),
            paginated = window.is_paginated(),
            "planned query"
        );

        Ok(QueryPlan {
            entity: self.schema.entity().to_string(),
            predicate,
            sort,
            window,
            projection,
            includes: request.joins.clone(),
        })
    }

    /// Compile the filter groups and the search directive only.
    pub fn plan_filter(&self, request: &QueryRequest) -> Result<Predicate, Error> {
        let filters = PredicateCompiler::new(self.schema).compile_filters(request)?;
        Ok(match compile_search(self.schema, &request.search)? {
            Some(search) => filters.and(Predicate::Search(search)),
            None => filters,
        })
    }

    /// Compile an identity lookup.
    pub fn plan_lookup(&self, id: &str) -> Result<Predicate, Error> {
        let field = self
            .schema
            .identity()
            .ok_or_else(|| Error::field_not_found(self.schema.entity(), "<identity>"))?;
        let kind = self.schema.descriptor(&field).kind();
        let value = Value::from_literal(kind, id).ok_or_else(|| Error::LiteralTypeMismatch {
            field: field.name.clone(),
            kind,
            literal: id.to_string(),
        })?;
        Ok(Predicate::Compare {
            field,
            op: CompareOp::Eq,
            value,
        })
    }
}
