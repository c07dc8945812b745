//! Query execution against a collection.
//!
//! The executor runs the strictly ordered pipeline: filter, order, window
//! (counting the filtered set before the page is cut), then shape. Planning
//! happens before the collection cursor is opened, so a bad request never
//! starts a scan.

use restq_proto::{CountResult, PaginatedResult, QueryRequest, Row, TextCount};
use serde::Serialize;
use tracing::debug;

use crate::collection::Collection;
use crate::error::Error;
use crate::histogram::TextHistogram;
use crate::planner::{QueryPlan, QueryPlanner, Window};
use crate::projection::Projection;
use crate::schema::SchemaDescriptor;

/// A full or projected record in a response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Record<T> {
    /// The record as stored.
    Full(T),
    /// Only the selected fields.
    Projected(Row),
}

impl<T> Record<T> {
    /// The full record, if no projection was applied.
    pub fn as_full(&self) -> Option<&T> {
        match self {
            Record::Full(record) => Some(record),
            Record::Projected(_) => None,
        }
    }

    /// The projected row, if a projection was applied.
    pub fn as_projected(&self) -> Option<&Row> {
        match self {
            Record::Full(_) => None,
            Record::Projected(row) => Some(row),
        }
    }
}

/// Output of the query pipeline.
///
/// Pagination mode wraps the records in an envelope; limit/offset mode
/// returns the bare list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QueryResponse<T> {
    Page(PaginatedResult<Record<T>>),
    List(Vec<Record<T>>),
}

impl<T> QueryResponse<T> {
    /// The returned records.
    pub fn records(&self) -> &[Record<T>] {
        match self {
            QueryResponse::Page(page) => &page.data,
            QueryResponse::List(list) => list,
        }
    }

    /// The pagination envelope, in pagination mode.
    pub fn page(&self) -> Option<&PaginatedResult<Record<T>>> {
        match self {
            QueryResponse::Page(page) => Some(page),
            QueryResponse::List(_) => None,
        }
    }
}

/// Runs queries for one schema against one collection.
pub struct QueryExecutor<'a, T> {
    schema: &'a SchemaDescriptor<T>,
    collection: &'a dyn Collection<T>,
    planner: QueryPlanner<'a, T>,
}

impl<'a, T> QueryExecutor<'a, T> {
    /// Create a new executor.
    pub fn new(schema: &'a SchemaDescriptor<T>, collection: &'a dyn Collection<T>) -> Self {
        Self {
            schema,
            collection,
            planner: QueryPlanner::new(schema),
        }
    }

    /// Override the page size used when a paginated request has no `limit`.
    pub fn with_default_page_size(mut self, page_size: u32) -> Self {
        self.planner = self.planner.with_default_page_size(page_size);
        self
    }

    /// Plan and run a request.
    pub fn execute(&self, request: &QueryRequest) -> Result<QueryResponse<T>, Error> {
        let plan = self.planner.plan(request)?;
        self.execute_plan(&plan)
    }

    /// Run a pre-planned query.
    pub fn execute_plan(&self, plan: &QueryPlan) -> Result<QueryResponse<T>, Error> {
        let mut records: Vec<T> = self
            .collection
            .cursor(&plan.includes)?
            .filter(|record| plan.predicate.matches(self.schema, record))
            .collect();

        plan.sort.apply(self.schema, &mut records);

        let response = match plan.window {
            Window::Page { page, page_size } => {
                let total = records.len() as u64;
                let skip = (page.saturating_sub(1) as usize).saturating_mul(page_size as usize);
                let data = records
                    .into_iter()
                    .skip(skip)
                    .take(page_size as usize)
                    .map(|record| self.shape(&plan.projection, record))
                    .collect();
                QueryResponse::Page(PaginatedResult::success(data, page, page_size, total))
            }
            Window::Slice { limit, offset } => {
                if limit > 0 {
                    records.truncate(limit as usize);
                }
                if offset > 0 {
                    let skip = (offset as usize).min(records.len());
                    records.drain(..skip);
                }
                QueryResponse::List(
                    records
                        .into_iter()
                        .map(|record| self.shape(&plan.projection, record))
                        .collect(),
                )
            }
        };

        debug!(
            entity = %plan.entity,
            returned = response.records().len(),
            "executed query"
        );
        Ok(response)
    }

    /// Count records matching the filters and search of a request.
    pub fn count(&self, request: &QueryRequest) -> Result<CountResult, Error> {
        let predicate = self.planner.plan_filter(request)?;
        let count = self
            .collection
            .cursor(&request.joins)?
            .filter(|record| predicate.matches(self.schema, record))
            .count() as u64;
        Ok(CountResult {
            count,
            with_filter: request.has_filters(),
        })
    }

    /// Find the record whose identity field equals `id`.
    pub fn find_by_id(&self, id: &str) -> Result<Option<T>, Error> {
        let predicate = self.planner.plan_lookup(id)?;
        Ok(self
            .collection
            .cursor(&[])?
            .find(|record| predicate.matches(self.schema, record)))
    }

    /// Histogram of every text value across the collection.
    pub fn text_counts(&self) -> Result<Vec<TextCount>, Error> {
        let projection = Projection::all_text(self.schema);
        let mut histogram = TextHistogram::new();
        for record in self.collection.cursor(&[])? {
            histogram.record_row(&projection.apply(self.schema, &record));
        }
        debug!(
            entity = self.schema.entity(),
            distinct = histogram.len(),
            "counted text values"
        );
        Ok(histogram.into_entries())
    }

    fn shape(&self, projection: &Projection, record: T) -> Record<T> {
        match projection {
            Projection::Identity => Record::Full(record),
            fields => Record::Projected(fields.apply(self.schema, &record)),
        }
    }
}
