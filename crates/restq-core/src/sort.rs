//! Sort compiler: stable multi-key ordering.

use std::cmp::Ordering;

use restq_proto::{SortRule, Value};

use crate::error::Error;
use crate::predicate::compare_values;
use crate::schema::{FieldRef, SchemaDescriptor};

/// One resolved ordering key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: FieldRef,
    pub descending: bool,
}

/// Ordered list of keys; the first is the primary key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortPlan {
    keys: Vec<SortKey>,
}

impl SortPlan {
    /// Resolve sort rules against a schema.
    pub fn compile<T>(schema: &SchemaDescriptor<T>, rules: &[SortRule]) -> Result<Self, Error> {
        let keys = rules
            .iter()
            .map(|rule| {
                Ok(SortKey {
                    field: schema.resolve(&rule.field)?,
                    descending: rule.descending,
                })
            })
            .collect::<Result<Vec<_>, Error>>()?;
        Ok(Self { keys })
    }

    /// Keys in priority order.
    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }

    /// Check if no ordering is requested.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Sort records in place.
    ///
    /// Each key is read once per record. The sort is stable, so records equal
    /// under every key keep the collection's order.
    pub fn apply<T>(&self, schema: &SchemaDescriptor<T>, records: &mut Vec<T>) {
        if self.keys.is_empty() || records.len() < 2 {
            return;
        }

        let mut decorated: Vec<(Vec<Value>, T)> = records
            .drain(..)
            .map(|record| {
                let key = self
                    .keys
                    .iter()
                    .map(|k| schema.read(&k.field, &record))
                    .collect();
                (key, record)
            })
            .collect();

        decorated.sort_by(|(a, _), (b, _)| self.compare_keys(a, b));
        records.extend(decorated.into_iter().map(|(_, record)| record));
    }

    fn compare_keys(&self, a: &[Value], b: &[Value]) -> Ordering {
        for ((key, a), b) in self.keys.iter().zip(a).zip(b) {
            let cmp = compare_for_sort(a, b);
            let cmp = if key.descending { cmp.reverse() } else { cmp };
            if cmp != Ordering::Equal {
                return cmp;
            }
        }
        Ordering::Equal
    }
}

/// Sort comparison: nulls first, incomparable pairs equal.
fn compare_for_sort(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        (a, b) => compare_values(a, b).unwrap_or(Ordering::Equal),
    }
}
