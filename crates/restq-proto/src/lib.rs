//! restq wire types and the URL query grammar.
//!
//! This crate is shared by the engine and by clients. It knows nothing about
//! schemas: it decodes query strings into structured requests and renders
//! them back.
//!
//! # Modules
//!
//! - [`value`] - Runtime values and kind-aware literal coercion
//! - [`query`] - Request types: filter groups, sort keys, search, pagination
//! - [`parse`] - Rule parser for the textual grammar
//! - [`query_string`] - Round-trip serializer back into the grammar
//! - [`builder`] - Fluent client-side request builder
//! - [`result`] - Response envelopes
//! - [`error`] - Grammar error types
//!
//! # Grammar
//!
//! ```
//! use restq_proto::{FilterRule, QueryRequest};
//!
//! let request = QueryRequest::from_query_string("filter=name||$eq||Apple&or=price||$gt||15").unwrap();
//! assert_eq!(request.filters().rules, vec![FilterRule::eq("name", "Apple")]);
//!
//! let again = QueryRequest::from_query_string(&request.to_query_string()).unwrap();
//! assert_eq!(again, request);
//! ```

pub mod builder;
pub mod error;
pub mod parse;
pub mod query;
pub mod query_string;
pub mod result;
pub mod value;

pub use error::Error;

// Re-export commonly used types at crate root
pub use builder::QueryBuilder;
pub use parse::ParseOptions;
pub use query::{
    Combinator, FilterGroup, FilterRule, Operator, QueryRequest, SearchMethod, SearchSpec,
    SortRule,
};
pub use result::{CountResult, PaginatedResult, Row, TextCount};
pub use value::{FieldKind, Value};
