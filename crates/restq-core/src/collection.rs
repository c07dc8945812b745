//! Collection providers: where records come from.

use parking_lot::RwLock;
use tracing::debug;

use crate::error::Error;

/// A boxed cursor over records.
pub type Cursor<'a, T> = Box<dyn Iterator<Item = T> + Send + 'a>;

/// A source of records of one type.
///
/// Include hints are eager-load directives taken verbatim from the request.
/// Providers apply the ones they understand; the engine never looks at them.
pub trait Collection<T>: Send + Sync {
    /// Open a cursor over every record.
    fn cursor(&self, includes: &[String]) -> Result<Cursor<'_, T>, Error>;
}

/// An in-memory collection.
#[derive(Debug)]
pub struct MemoryCollection<T> {
    records: RwLock<Vec<T>>,
}

impl<T> MemoryCollection<T> {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
        }
    }

    /// Append a record.
    pub fn insert(&self, record: T) {
        self.records.write().push(record);
    }

    /// Append many records.
    pub fn insert_all(&self, records: impl IntoIterator<Item = T>) {
        self.records.write().extend(records);
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Check if the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl<T> Default for MemoryCollection<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<Vec<T>> for MemoryCollection<T> {
    fn from(records: Vec<T>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }
}

impl<T> Extend<T> for MemoryCollection<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.records.get_mut().extend(iter);
    }
}

impl<T: Clone + Send + Sync> Collection<T> for MemoryCollection<T> {
    fn cursor(&self, includes: &[String]) -> Result<Cursor<'_, T>, Error> {
        if !includes.is_empty() {
            debug!(includes = ?includes, "memory collection has no relations to load");
        }
        let snapshot = self.records.read().clone();
        Ok(Box::new(snapshot.into_iter()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_collection() {
        let collection = MemoryCollection::from(vec![1, 2]);
        collection.insert(3);
        collection.insert_all([4, 5]);
        assert_eq!(collection.len(), 5);

        let all: Vec<_> = collection.cursor(&["owner".into()]).unwrap().collect();
        assert_eq!(all, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_cursor_is_a_snapshot() {
        let collection = MemoryCollection::from(vec!["a"]);
        let cursor = collection.cursor(&[]).unwrap();
        collection.insert("b");
        assert_eq!(cursor.count(), 1);
    }
}
