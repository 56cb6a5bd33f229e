//! The shared record shape and name-keyed record sets

use std::collections::HashMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::scanner::Definition;
use crate::{Error, Kind, Result};

/// One named configuration unit within a kind.
///
/// Records are immutable values: an update is always a whole-record
/// replacement. The remote service may attach a surrogate `id`, which
/// never takes part in content comparison.
pub trait Record: Clone + fmt::Debug + Serialize + DeserializeOwned {
    /// The kind every value of this type belongs to.
    const KIND: Kind;

    /// Unique name within the kind and organization.
    fn name(&self) -> &str;

    /// Surrogate identifier assigned by the remote service, if any.
    fn remote_id(&self) -> Option<&str>;

    /// Return the record with its surrogate identifier replaced.
    fn with_remote_id(self, id: Option<String>) -> Self;

    /// Kind-specific content equality. Defaults to [`structural_eq`].
    fn same_content(&self, other: &Self) -> bool {
        structural_eq(self, other)
    }

    /// Build a record from a scanned definition file.
    ///
    /// The resolved identity always wins over whatever `name` the document
    /// carries, so `metadata.name`-only files deserialize cleanly.
    fn from_definition(definition: &Definition) -> Result<Self> {
        let mut value = definition.document.value.clone();
        if let Value::Object(map) = &mut value {
            map.insert("name".to_string(), Value::String(definition.name.clone()));
        }
        serde_json::from_value(value).map_err(|e| Error::InvalidRecord {
            kind: Self::KIND,
            path: definition.document.path.to_native(),
            message: e.to_string(),
        })
    }
}

/// Compare two records by their serialized form, ignoring the surrogate
/// `id`. Records that fail to serialize never compare equal.
pub fn structural_eq<R: Serialize>(a: &R, b: &R) -> bool {
    match (content_value(a), content_value(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

fn content_value<R: Serialize>(record: &R) -> Option<Value> {
    let mut value = serde_json::to_value(record).ok()?;
    if let Value::Object(map) = &mut value {
        map.remove("id");
    }
    Some(value)
}

/// Sort a list into canonical order for order-insensitive comparison.
pub fn sorted<T: Ord + Clone>(items: &[T]) -> Vec<T> {
    let mut items = items.to_vec();
    items.sort();
    items
}

/// An ordered collection of records keyed by name.
///
/// Insertion order is kept for deterministic display; lookups go through
/// the name index. Empty and duplicate names are rejected on insert, so a
/// set never carries an unidentifiable record into a diff.
#[derive(Debug, Clone)]
pub struct RecordSet<R> {
    records: Vec<R>,
    index: HashMap<String, usize>,
}

impl<R> Default for RecordSet<R> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<R: Record> RecordSet<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from records, failing on the first empty or duplicate name.
    pub fn from_records(records: impl IntoIterator<Item = R>) -> Result<Self> {
        let mut set = Self::new();
        for record in records {
            set.insert(record)?;
        }
        Ok(set)
    }

    pub fn insert(&mut self, record: R) -> Result<()> {
        let name = record.name();
        if name.trim().is_empty() {
            return Err(Error::EmptyName { kind: R::KIND });
        }
        if self.index.contains_key(name) {
            return Err(Error::DuplicateRecord {
                kind: R::KIND,
                name: name.to_string(),
            });
        }
        self.index.insert(name.to_string(), self.records.len());
        self.records.push(record);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&R> {
        self.index.get(name).map(|&i| &self.records[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, R> {
        self.records.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.name())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_vec(self) -> Vec<R> {
        self.records
    }
}

impl<'a, R> IntoIterator for &'a RecordSet<R> {
    type Item = &'a R;
    type IntoIter = std::slice::Iter<'a, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl<R: Serialize> Serialize for RecordSet<R> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.records)
    }
}
