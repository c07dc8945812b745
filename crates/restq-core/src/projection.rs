//! Projection compiler.

use restq_proto::Row;

use crate::error::Error;
use crate::schema::{FieldRef, SchemaDescriptor};

/// Which fields of a record reach the response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Projection {
    /// Full records.
    #[default]
    Identity,
    /// Exactly these fields, in this order.
    Fields(Vec<FieldRef>),
}

impl Projection {
    /// Resolve a select list. An empty list is the identity projection.
    pub fn compile<T>(schema: &SchemaDescriptor<T>, select: &[String]) -> Result<Self, Error> {
        if select.is_empty() {
            return Ok(Projection::Identity);
        }
        let fields = select
            .iter()
            .map(|name| schema.resolve(name))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Projection::Fields(fields))
    }

    /// Every text field of the schema, for the histogram pathway.
    pub fn all_text<T>(schema: &SchemaDescriptor<T>) -> Self {
        Projection::Fields(schema.text_fields())
    }

    /// Whether records pass through unchanged.
    pub fn is_identity(&self) -> bool {
        matches!(self, Projection::Identity)
    }

    /// Narrow a record to a row.
    ///
    /// The identity projection yields every field of the schema.
    pub fn apply<T>(&self, schema: &SchemaDescriptor<T>, record: &T) -> Row {
        match self {
            Projection::Identity => schema
                .fields()
                .iter()
                .map(|f| (f.name().to_string(), f.read(record)))
                .collect(),
            Projection::Fields(fields) => fields
                .iter()
                .map(|f| (f.name.clone(), schema.read(f, record)))
                .collect(),
        }
    }
}
