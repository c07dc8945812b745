//! Type-erased entity endpoints.
//!
//! Each registered entity pairs a typed schema with a collection. The HTTP
//! layer only sees [`EntityService`], so handlers stay independent of the
//! record types behind them.

use std::collections::BTreeMap;
use std::sync::Arc;

use restq_core::{Collection, Error, QueryExecutor, SchemaDescriptor, SchemaInfo};
use restq_proto::{CountResult, QueryRequest, TextCount};
use serde::Serialize;

/// Operations the gateway can run against one entity.
pub trait EntityService: Send + Sync {
    /// Entity name used in URLs.
    fn name(&self) -> &str;

    /// Schema summary.
    fn schema(&self) -> SchemaInfo;

    /// Run the full query pipeline, returning the response as JSON.
    fn query(&self, request: &QueryRequest) -> Result<serde_json::Value, Error>;

    /// Count records matching filters and search.
    fn count(&self, request: &QueryRequest) -> Result<CountResult, Error>;

    /// Text histogram over the whole collection.
    fn text_counts(&self) -> Result<Vec<TextCount>, Error>;

    /// Look up one record by its identity field.
    fn find(&self, id: &str) -> Result<Option<serde_json::Value>, Error>;
}

/// An [`EntityService`] backed by a typed schema and collection.
pub struct TypedEntity<T, C> {
    schema: Arc<SchemaDescriptor<T>>,
    collection: C,
    default_page_size: u32,
}

impl<T, C> TypedEntity<T, C> {
    /// Create a new typed endpoint.
    pub fn new(schema: Arc<SchemaDescriptor<T>>, collection: C) -> Self {
        Self {
            schema,
            collection,
            default_page_size: restq_core::DEFAULT_PAGE_SIZE,
        }
    }

    /// Set the page size used when a paginated request has no `limit`.
    pub fn with_default_page_size(mut self, page_size: u32) -> Self {
        self.default_page_size = page_size;
        self
    }

    /// The backing collection.
    pub fn collection(&self) -> &C {
        &self.collection
    }
}

impl<T, C> TypedEntity<T, C>
where
    C: Collection<T>,
{
    fn executor(&self) -> QueryExecutor<'_, T> {
        QueryExecutor::new(&self.schema, &self.collection)
            .with_default_page_size(self.default_page_size)
    }
}

impl<T, C> EntityService for TypedEntity<T, C>
where
    T: Serialize + Send + Sync + 'static,
    C: Collection<T> + 'static,
{
    fn name(&self) -> &str {
        self.schema.entity()
    }

    fn schema(&self) -> SchemaInfo {
        self.schema.info()
    }

    fn query(&self, request: &QueryRequest) -> Result<serde_json::Value, Error> {
        let response = self.executor().execute(request)?;
        Ok(serde_json::to_value(response)?)
    }

    fn count(&self, request: &QueryRequest) -> Result<CountResult, Error> {
        self.executor().count(request)
    }

    fn text_counts(&self) -> Result<Vec<TextCount>, Error> {
        self.executor().text_counts()
    }

    fn find(&self, id: &str) -> Result<Option<serde_json::Value>, Error> {
        self.executor()
            .find_by_id(id)?
            .map(serde_json::to_value)
            .transpose()
            .map_err(Error::from)
    }
}

/// Entities served by the gateway, by name.
#[derive(Default, Clone)]
pub struct EntityRegistry {
    entities: BTreeMap<String, Arc<dyn EntityService>>,
}

impl EntityRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entity under its own name.
    pub fn register(&mut self, service: impl EntityService + 'static) {
        self.entities
            .insert(service.name().to_string(), Arc::new(service));
    }

    /// Builder-style registration.
    pub fn with_entity(mut self, service: impl EntityService + 'static) -> Self {
        self.register(service);
        self
    }

    /// Look up an entity.
    pub fn get(&self, name: &str) -> Result<Arc<dyn EntityService>, Error> {
        self.entities
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownEntity(name.to_string()))
    }

    /// Registered entity names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.entities.keys().cloned().collect()
    }

    /// Number of registered entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Check if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use restq_core::{FieldDescriptor, MemoryCollection};

    #[derive(Clone, Serialize)]
    struct City {
        name: String,
    }

    fn cities() -> TypedEntity<City, MemoryCollection<City>> {
        let schema = SchemaDescriptor::builder("cities")
            .with_field(FieldDescriptor::text("name", |c: &City| c.name.clone()))
            .with_identity("name")
            .build()
            .unwrap();
        let collection = MemoryCollection::from(vec![
            City {
                name: "Oslo".into(),
            },
            City {
                name: "Lima".into(),
            },
        ]);
        TypedEntity::new(Arc::new(schema), collection)
    }

    #[test]
    fn test_registry_lookup() {
        let registry = EntityRegistry::new().with_entity(cities());
        assert_eq!(registry.names(), vec!["cities".to_string()]);
        assert!(registry.get("cities").is_ok());
        assert!(matches!(registry.get("towns"), Err(Error::UnknownEntity(_))));
    }

    #[test]
    fn test_service_operations() {
        let service = cities();
        let json = service
            .query(&QueryRequest::from_query_string("sort=name").unwrap())
            .unwrap();
        assert_eq!(json, serde_json::json!([{ "name": "Lima" }, { "name": "Oslo" }]));

        assert_eq!(
            service.find("Oslo").unwrap(),
            Some(serde_json::json!({ "name": "Oslo" }))
        );
        assert_eq!(service.find("Rome").unwrap(), None);
        assert_eq!(service.collection().len(), 2);
    }
}
