//! [`FakeRemote`]: an in-memory remote service for engine tests.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};

use polsync_core::remote::{BulkItemError, BulkOutcome, RemoteAccessor, RemoteError};
use polsync_meta::{Kind, Record, RecordSet};
use serde_json::Value;

/// One call made against a [`FakeRemote`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    FetchAll(Kind),
    Create(Kind, String),
    Replace(Kind, String),
    Delete(Kind, String),
    Bulk(Kind, usize),
}

impl Call {
    /// Anything other than a fetch.
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Call::FetchAll(_))
    }
}

/// Stores records as JSON per kind, in insertion order, and records every
/// call. Behaves like the service: creating an existing name is a 409,
/// replacing or deleting a missing one is a 404.
///
/// ```rust,no_run
/// use polsync_meta::{Kind, Team};
/// use polsync_test_utils::FakeRemote;
///
/// let remote = FakeRemote::new();
/// remote.seed([Team { name: "platform".into(), ..Team::default() }]);
/// remote.fail_on(Kind::Teams, "platform", 500);
/// ```
#[derive(Default)]
pub struct FakeRemote {
    state: RefCell<BTreeMap<Kind, Vec<(String, Value)>>>,
    calls: RefCell<Vec<Call>>,
    record_failures: RefCell<HashMap<(Kind, String), RemoteError>>,
    fetch_failures: RefCell<HashMap<Kind, RemoteError>>,
    bulk: bool,
    next_id: Cell<u64>,
}

impl FakeRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// A remote that also serves the bulk endpoint.
    pub fn with_bulk() -> Self {
        Self {
            bulk: true,
            ..Self::default()
        }
    }

    /// Store `records` without recording calls. Records without a
    /// surrogate id get one.
    pub fn seed<R: Record>(&self, records: impl IntoIterator<Item = R>) {
        for record in records {
            let record = match record.remote_id() {
                Some(_) => record,
                None => {
                    let id = self.allocate_id(R::KIND);
                    record.with_remote_id(Some(id))
                }
            };
            let value = serde_json::to_value(&record).unwrap();
            self.state
                .borrow_mut()
                .entry(R::KIND)
                .or_default()
                .push((record.name().to_string(), value));
        }
    }

    /// Make every call touching `kind`/`name` fail with `status`.
    pub fn fail_on(&self, kind: Kind, name: &str, status: u16) {
        self.record_failures.borrow_mut().insert(
            (kind, name.to_string()),
            RemoteError::Status {
                status,
                body: format!("injected failure for {}", name),
            },
        );
    }

    pub fn fail_fetch(&self, kind: Kind, error: RemoteError) {
        self.fetch_failures.borrow_mut().insert(kind, error);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn mutations(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_mutation).collect()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    /// Current remote contents of kind `R`.
    pub fn records<R: Record>(&self) -> RecordSet<R> {
        let state = self.state.borrow();
        let values = state.get(&R::KIND).map(Vec::as_slice).unwrap_or(&[]);
        RecordSet::from_records(
            values
                .iter()
                .map(|(_, v)| serde_json::from_value::<R>(v.clone()).unwrap()),
        )
        .unwrap()
    }

    pub fn names(&self, kind: Kind) -> Vec<String> {
        self.state
            .borrow()
            .get(&kind)
            .map(|records| records.iter().map(|(n, _)| n.clone()).collect())
            .unwrap_or_default()
    }

    fn allocate_id(&self, kind: Kind) -> String {
        let n = self.next_id.get() + 1;
        self.next_id.set(n);
        format!("{}-{}", kind, n)
    }

    fn injected(&self, kind: Kind, name: &str) -> Option<RemoteError> {
        self.record_failures
            .borrow()
            .get(&(kind, name.to_string()))
            .cloned()
    }

    fn position(&self, kind: Kind, name: &str) -> Option<usize> {
        self.state
            .borrow()
            .get(&kind)
            .and_then(|records| records.iter().position(|(n, _)| n == name))
    }

    fn store_new<R: Record>(&self, record: &R) {
        let id = self.allocate_id(R::KIND);
        let value = serde_json::to_value(record.clone().with_remote_id(Some(id))).unwrap();
        self.state
            .borrow_mut()
            .entry(R::KIND)
            .or_default()
            .push((record.name().to_string(), value));
    }

    fn store_replacement<R: Record>(&self, index: usize, record: &R) {
        let mut state = self.state.borrow_mut();
        let slot = &mut state.get_mut(&R::KIND).unwrap()[index];
        let id = slot.1.get("id").and_then(Value::as_str).map(str::to_string);
        slot.1 = serde_json::to_value(record.clone().with_remote_id(id)).unwrap();
    }

    fn remove(&self, kind: Kind, index: usize) {
        if let Some(records) = self.state.borrow_mut().get_mut(&kind) {
            records.remove(index);
        }
    }
}

fn not_found(name: &str) -> RemoteError {
    RemoteError::Status {
        status: 404,
        body: format!("'{}' not found", name),
    }
}

impl RemoteAccessor for FakeRemote {
    fn fetch_all<R: Record>(&self) -> Result<RecordSet<R>, RemoteError> {
        self.calls.borrow_mut().push(Call::FetchAll(R::KIND));
        if let Some(error) = self.fetch_failures.borrow().get(&R::KIND) {
            return Err(error.clone());
        }
        Ok(self.records())
    }

    fn create<R: Record>(&self, record: &R) -> Result<(), RemoteError> {
        let name = record.name();
        self.calls
            .borrow_mut()
            .push(Call::Create(R::KIND, name.to_string()));
        if let Some(error) = self.injected(R::KIND, name) {
            return Err(error);
        }
        if self.position(R::KIND, name).is_some() {
            return Err(RemoteError::Status {
                status: 409,
                body: format!("'{}' already exists", name),
            });
        }
        self.store_new(record);
        Ok(())
    }

    fn replace<R: Record>(&self, record: &R) -> Result<(), RemoteError> {
        let name = record.name();
        self.calls
            .borrow_mut()
            .push(Call::Replace(R::KIND, name.to_string()));
        if let Some(error) = self.injected(R::KIND, name) {
            return Err(error);
        }
        let index = self.position(R::KIND, name).ok_or_else(|| not_found(name))?;
        self.store_replacement(index, record);
        Ok(())
    }

    fn delete(&self, kind: Kind, name: &str) -> Result<(), RemoteError> {
        self.calls
            .borrow_mut()
            .push(Call::Delete(kind, name.to_string()));
        if let Some(error) = self.injected(kind, name) {
            return Err(error);
        }
        let index = self.position(kind, name).ok_or_else(|| not_found(name))?;
        self.remove(kind, index);
        Ok(())
    }

    fn bulk_reconcile<R: Record>(
        &self,
        records: &[R],
        delete_missing: bool,
    ) -> Result<BulkOutcome, RemoteError> {
        self.calls
            .borrow_mut()
            .push(Call::Bulk(R::KIND, records.len()));
        if !self.bulk {
            return Err(RemoteError::Unsupported);
        }

        let existing: RecordSet<R> = self.records();
        let mut outcome = BulkOutcome::default();

        for record in records {
            let name = record.name();
            if let Some(error) = self.injected(R::KIND, name) {
                outcome.errors.push(BulkItemError {
                    name: name.to_string(),
                    message: error.to_string(),
                });
                continue;
            }
            match (existing.get(name), self.position(R::KIND, name)) {
                (Some(current), Some(index)) => {
                    if !record.same_content(current) {
                        self.store_replacement(index, record);
                        outcome.updated += 1;
                    }
                }
                _ => {
                    self.store_new(record);
                    outcome.created += 1;
                }
            }
        }

        if delete_missing {
            for name in existing.names() {
                if records.iter().any(|r| r.name() == name) {
                    continue;
                }
                if let Some(index) = self.position(R::KIND, name) {
                    self.remove(R::KIND, index);
                    outcome.deleted += 1;
                }
            }
        }

        Ok(outcome)
    }
}
