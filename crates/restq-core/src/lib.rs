//! restq core - schema registry, query compilers and executor.
//!
//! Requests decoded by `restq-proto` are compiled here against an explicit
//! per-type [`SchemaDescriptor`] into a predicate AST, a sort plan, a window
//! and a projection, then run over a [`Collection`].
//!
//! ```
//! use restq_core::{FieldDescriptor, MemoryCollection, QueryExecutor, SchemaDescriptor};
//! use restq_core::proto::QueryRequest;
//!
//! #[derive(Clone)]
//! struct Fruit {
//!     name: String,
//!     price: i64,
//! }
//!
//! let schema = SchemaDescriptor::builder("fruit")
//!     .with_field(FieldDescriptor::text("name", |f: &Fruit| f.name.clone()))
//!     .with_field(FieldDescriptor::number("price", |f: &Fruit| f.price))
//!     .build()
//!     .unwrap();
//! let collection = MemoryCollection::from(vec![
//!     Fruit { name: "Apple".into(), price: 10 },
//!     Fruit { name: "Banana".into(), price: 20 },
//! ]);
//!
//! let request = QueryRequest::from_query_string("filter=price||$gt||15").unwrap();
//! let response = QueryExecutor::new(&schema, &collection).execute(&request).unwrap();
//! assert_eq!(response.records().len(), 1);
//! ```

pub mod cache;
pub mod collection;
pub mod error;
pub mod executor;
pub mod histogram;
pub mod planner;
pub mod predicate;
pub mod projection;
pub mod schema;
pub mod search;
pub mod sort;

pub use cache::{CacheStats, QueryFingerprint, ResultCache};
pub use collection::{Collection, Cursor, MemoryCollection};
pub use error::Error;
pub use executor::{QueryExecutor, QueryResponse, Record};
pub use histogram::TextHistogram;
pub use planner::{QueryPlan, QueryPlanner, Window, DEFAULT_PAGE_SIZE};
pub use predicate::{CompareOp, Predicate, PredicateCompiler};
pub use projection::Projection;
pub use schema::{
    Entity, FieldDescriptor, FieldInfo, FieldRef, SchemaBuilder, SchemaDescriptor, SchemaInfo,
    SchemaRegistry,
};
pub use search::{compile_search, SearchPredicate};
pub use sort::{SortKey, SortPlan};

/// Re-export protocol types.
pub use restq_proto as proto;
