//! Schema registry: explicit per-type field tables.
//!
//! A [`SchemaDescriptor`] is built once per record type and maps field names
//! to typed accessors and a [`FieldKind`]. Every compiler resolves names
//! through it; nothing on the request path inspects the record type itself.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use restq_proto::{FieldKind, Value};
use serde::Serialize;

use crate::error::Error;

type Accessor<T> = Arc<dyn Fn(&T) -> Value + Send + Sync>;

/// One addressable field of a record type.
pub struct FieldDescriptor<T> {
    name: String,
    kind: FieldKind,
    accessor: Accessor<T>,
}

impl<T> FieldDescriptor<T> {
    /// Create a new field with an accessor.
    pub fn new<F, V>(name: impl Into<String>, kind: FieldKind, accessor: F) -> Self
    where
        F: Fn(&T) -> V + Send + Sync + 'static,
        V: Into<Value>,
    {
        Self {
            name: name.into(),
            kind,
            accessor: Arc::new(move |record: &T| -> Value { accessor(record).into() }),
        }
    }

    /// Create a text field.
    pub fn text<F, V>(name: impl Into<String>, accessor: F) -> Self
    where
        F: Fn(&T) -> V + Send + Sync + 'static,
        V: Into<Value>,
    {
        Self::new(name, FieldKind::Text, accessor)
    }

    /// Create a numeric field.
    pub fn number<F, V>(name: impl Into<String>, accessor: F) -> Self
    where
        F: Fn(&T) -> V + Send + Sync + 'static,
        V: Into<Value>,
    {
        Self::new(name, FieldKind::Number, accessor)
    }

    /// Create a boolean field.
    pub fn boolean<F, V>(name: impl Into<String>, accessor: F) -> Self
    where
        F: Fn(&T) -> V + Send + Sync + 'static,
        V: Into<Value>,
    {
        Self::new(name, FieldKind::Boolean, accessor)
    }

    /// Create a temporal field.
    pub fn temporal<F, V>(name: impl Into<String>, accessor: F) -> Self
    where
        F: Fn(&T) -> V + Send + Sync + 'static,
        V: Into<Value>,
    {
        Self::new(name, FieldKind::Temporal, accessor)
    }

    /// Create an identifier field.
    pub fn identifier<F, V>(name: impl Into<String>, accessor: F) -> Self
    where
        F: Fn(&T) -> V + Send + Sync + 'static,
        V: Into<Value>,
    {
        Self::new(name, FieldKind::Identifier, accessor)
    }

    /// Field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Field kind.
    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Read this field from a record.
    pub fn read(&self, record: &T) -> Value {
        (self.accessor)(record)
    }
}

impl<T> Clone for FieldDescriptor<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            kind: self.kind,
            accessor: Arc::clone(&self.accessor),
        }
    }
}

impl<T> fmt::Debug for FieldDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// A resolved reference to a field: its position in the schema plus its name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldRef {
    /// Position in [`SchemaDescriptor::fields`].
    pub index: usize,
    /// Field name, kept for output and diagnostics.
    pub name: String,
}

/// The registered shape of one record type. Immutable once built.
pub struct SchemaDescriptor<T> {
    entity: String,
    fields: Vec<FieldDescriptor<T>>,
    by_name: HashMap<String, usize>,
    identity: Option<usize>,
}

impl<T> SchemaDescriptor<T> {
    /// Start building a schema for `entity`.
    pub fn builder(entity: impl Into<String>) -> SchemaBuilder<T> {
        SchemaBuilder::new(entity)
    }

    /// Entity name.
    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// Fields in registration order.
    pub fn fields(&self) -> &[FieldDescriptor<T>] {
        &self.fields
    }

    /// Get a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor<T>> {
        self.by_name.get(name).map(|&i| &self.fields[i])
    }

    /// Resolve a field name, failing with `FieldNotFound`.
    pub fn resolve(&self, name: &str) -> Result<FieldRef, Error> {
        self.by_name
            .get(name)
            .map(|&index| FieldRef {
                index,
                name: self.fields[index].name.clone(),
            })
            .ok_or_else(|| Error::field_not_found(&self.entity, name))
    }

    /// Get the descriptor behind a resolved reference.
    pub fn descriptor(&self, field: &FieldRef) -> &FieldDescriptor<T> {
        &self.fields[field.index]
    }

    /// Read a resolved field from a record.
    pub fn read(&self, field: &FieldRef, record: &T) -> Value {
        self.fields[field.index].read(record)
    }

    /// The identity field, if one was designated.
    pub fn identity(&self) -> Option<FieldRef> {
        self.identity.map(|index| FieldRef {
            index,
            name: self.fields[index].name.clone(),
        })
    }

    /// References to every text field, in registration order.
    pub fn text_fields(&self) -> Vec<FieldRef> {
        self.fields
            .iter()
            .enumerate()
            .filter(|(_, f)| f.kind.is_text())
            .map(|(index, f)| FieldRef {
                index,
                name: f.name.clone(),
            })
            .collect()
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the schema has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// A serializable summary of the schema.
    pub fn info(&self) -> SchemaInfo {
        SchemaInfo {
            entity: self.entity.clone(),
            identity: self.identity.map(|i| self.fields[i].name.clone()),
            fields: self
                .fields
                .iter()
                .map(|f| FieldInfo {
                    name: f.name.clone(),
                    kind: f.kind,
                })
                .collect(),
        }
    }
}

impl<T> fmt::Debug for SchemaDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaDescriptor")
            .field("entity", &self.entity)
            .field("fields", &self.fields)
            .field("identity", &self.identity)
            .finish()
    }
}

/// Builder for [`SchemaDescriptor`].
pub struct SchemaBuilder<T> {
    entity: String,
    fields: Vec<FieldDescriptor<T>>,
    identity: Option<String>,
}

impl<T> SchemaBuilder<T> {
    /// Create a new builder.
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            fields: Vec::new(),
            identity: None,
        }
    }

    /// Add a field.
    pub fn with_field(mut self, field: FieldDescriptor<T>) -> Self {
        self.fields.push(field);
        self
    }

    /// Add several fields.
    pub fn with_fields(mut self, fields: impl IntoIterator<Item = FieldDescriptor<T>>) -> Self {
        self.fields.extend(fields);
        self
    }

    /// Designate the identity field used by lookups.
    pub fn with_identity(mut self, name: impl Into<String>) -> Self {
        self.identity = Some(name.into());
        self
    }

    /// Validate and freeze the schema.
    pub fn build(self) -> Result<SchemaDescriptor<T>, Error> {
        let mut by_name = HashMap::with_capacity(self.fields.len());
        for (index, field) in self.fields.iter().enumerate() {
            if by_name.insert(field.name.clone(), index).is_some() {
                return Err(Error::DuplicateField {
                    entity: self.entity.clone(),
                    field: field.name.clone(),
                });
            }
        }

        let identity = match &self.identity {
            Some(name) => Some(
                *by_name
                    .get(name)
                    .ok_or_else(|| Error::field_not_found(&self.entity, name))?,
            ),
            None => None,
        };

        Ok(SchemaDescriptor {
            entity: self.entity,
            fields: self.fields,
            by_name,
            identity,
        })
    }
}

/// A record type that knows its own schema.
pub trait Entity: Sized + Send + Sync + 'static {
    /// Describe the record type. Called once per registry.
    fn schema() -> Result<SchemaDescriptor<Self>, Error>;
}

/// Process-wide table of schemas, one per record type.
#[derive(Default)]
pub struct SchemaRegistry {
    schemas: RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
}

impl SchemaRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a schema for `T`, replacing any previous one.
    pub fn register<T: Send + Sync + 'static>(
        &self,
        schema: SchemaDescriptor<T>,
    ) -> Arc<SchemaDescriptor<T>> {
        let schema = Arc::new(schema);
        self.schemas
            .write()
            .insert(TypeId::of::<T>(), schema.clone() as Arc<dyn Any + Send + Sync>);
        schema
    }

    /// Look up the schema for `T`.
    pub fn get<T: Send + Sync + 'static>(&self) -> Option<Arc<SchemaDescriptor<T>>> {
        self.schemas
            .read()
            .get(&TypeId::of::<T>())
            .cloned()
            .and_then(|any| any.downcast::<SchemaDescriptor<T>>().ok())
    }

    /// Get the schema for `T`, building it with `init` on first use.
    pub fn get_or_try_insert_with<T, F>(&self, init: F) -> Result<Arc<SchemaDescriptor<T>>, Error>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> Result<SchemaDescriptor<T>, Error>,
    {
        if let Some(schema) = self.get::<T>() {
            return Ok(schema);
        }

        let mut guard = self.schemas.write();
        if let Some(existing) = guard.get(&TypeId::of::<T>()) {
            if let Ok(schema) = existing.clone().downcast::<SchemaDescriptor<T>>() {
                return Ok(schema);
            }
        }
        let schema = Arc::new(init()?);
        guard.insert(TypeId::of::<T>(), schema.clone() as Arc<dyn Any + Send + Sync>);
        Ok(schema)
    }

    /// Get the schema of an [`Entity`] type, describing it on first use.
    pub fn schema_of<T: Entity>(&self) -> Result<Arc<SchemaDescriptor<T>>, Error> {
        self.get_or_try_insert_with(T::schema)
    }

    /// Number of registered schemas.
    pub fn len(&self) -> usize {
        self.schemas.read().len()
    }

    /// Check if no schema is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Serializable summary of a schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaInfo {
    /// Entity name.
    pub entity: String,
    /// Identity field name.
    pub identity: Option<String>,
    /// Fields in registration order.
    pub fields: Vec<FieldInfo>,
}

/// One field of a [`SchemaInfo`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldInfo {
    /// Field name.
    pub name: String,
    /// Field kind.
    pub kind: FieldKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Product {
        id: i64,
        name: String,
        price: f64,
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

    fn apple() -> Product {
        Product {
            id: 1,
            name: "Apple".into(),
            price: 10.0,
        }
    }

    #[test]
    fn test_resolve_and_read() {
        let schema = Product::schema().unwrap();
        let name = schema.resolve("name").unwrap();
        assert_eq!(name.index, 1);
        assert_eq!(schema.read(&name, &apple()), Value::String("Apple".into()));
        assert_eq!(schema.identity().map(|f| f.name), Some("id".to_string()));
    }

    #[test]
    fn test_unknown_field() {
        let schema = Product::schema().unwrap();
        let err = schema.resolve("colour").unwrap_err();
        assert!(matches!(err, Error::FieldNotFound { ref field, .. } if field == "colour"));
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let result = SchemaDescriptor::<Product>::builder("products")
            .with_field(FieldDescriptor::text("name", |p: &Product| p.name.clone()))
            .with_field(FieldDescriptor::text("name", |p: &Product| p.name.clone()))
            .build();
        assert!(matches!(result, Err(Error::DuplicateField { .. })));
    }

    #[test]
    fn test_unknown_identity_rejected() {
        let result = SchemaDescriptor::<Product>::builder("products")
            .with_field(FieldDescriptor::text("name", |p: &Product| p.name.clone()))
            .with_identity("id")
            .build();
        assert!(matches!(result, Err(Error::FieldNotFound { .. })));
    }

    #[test]
    fn test_text_fields() {
        let schema = Product::schema().unwrap();
        let names: Vec<_> = schema.text_fields().into_iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["name".to_string()]);
    }

    #[test]
    fn test_registry_builds_once() {
        let registry = SchemaRegistry::new();
        let first = registry.schema_of::<Product>().unwrap();
        let second = registry.schema_of::<Product>().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_info() {
        let info = Product::schema().unwrap().info();
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["entity"], "products");
        assert_eq!(json["identity"], "id");
        assert_eq!(json["fields"][2]["kind"], "number");
    }
}
