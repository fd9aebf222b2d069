//! Record store abstraction
//!
//! The shop never talks to files or tables directly. It issues declarative
//! `scan` / `insert` / `update_where` / `delete_where` calls against a
//! [`Transaction`], and the [`RecordStore`] persists the staged result in one
//! all-or-nothing [`commit`](RecordStore::commit).
//!
//! # Staged commit
//!
//! ```text
//! write_lock()  ─┐
//! snapshot()     │  Transaction { staged: Tables, changed: {kinds} }
//! f(&mut tx)     │  mutate the staged copy only
//! commit(...)    │  persist every changed collection, or none
//! drop(guard)   ─┘  released on every exit path
//! ```
//!
//! If the closure fails nothing is committed; if the commit fails the backend
//! guarantees the previous state is still what `snapshot` returns.

use crate::core::entity::{EntityKind, Record, RecordId};
use crate::core::error::StoreError;
use crate::entities::{Customer, Device, Invoice, Service, Ticket};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::MutexGuard;

/// In-memory image of every collection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tables {
    #[serde(default)]
    pub customers: Vec<Customer>,
    #[serde(default)]
    pub devices: Vec<Device>,
    #[serde(default)]
    pub tickets: Vec<Ticket>,
    #[serde(default)]
    pub services: Vec<Service>,
    #[serde(default)]
    pub invoices: Vec<Invoice>,
}

impl Tables {
    /// Whether a record of `kind` with `id` exists
    pub fn contains(&self, kind: EntityKind, id: RecordId) -> bool {
        match kind {
            EntityKind::Customer => self.customers.iter().any(|r| r.id == id),
            EntityKind::Device => self.devices.iter().any(|r| r.id == id),
            EntityKind::Ticket => self.tickets.iter().any(|r| r.id == id),
            EntityKind::Service => self.services.iter().any(|r| r.id == id),
            EntityKind::Invoice => self.invoices.iter().any(|r| r.id == id),
        }
    }

    /// Find a record by id
    pub fn get<R: Record>(&self, id: RecordId) -> Option<&R> {
        R::collection(self).iter().find(|r| r.id() == id)
    }

    /// Records whose parent reference points at nothing.
    ///
    /// Always empty for a store only mutated through the shop.
    pub fn orphans(&self) -> Vec<(EntityKind, RecordId)> {
        fn dangling<R: Record>(tables: &Tables, out: &mut Vec<(EntityKind, RecordId)>) {
            for record in R::collection(tables) {
                if let Some((kind, parent)) = record.parent() {
                    if !tables.contains(kind, parent) {
                        out.push((R::KIND, record.id()));
                    }
                }
            }
        }

        let mut out = Vec::new();
        dangling::<Device>(self, &mut out);
        dangling::<Ticket>(self, &mut out);
        dangling::<Service>(self, &mut out);
        dangling::<Invoice>(self, &mut out);
        out
    }
}

/// Persistence capability consumed by the shop.
///
/// Implementations only move whole collections; all record-level logic lives
/// in [`Transaction`]. The trait is object safe so callers can hold an
/// `Arc<dyn RecordStore>`.
pub trait RecordStore: Send + Sync {
    /// Read the committed state of every collection
    fn snapshot(&self) -> Result<Tables, StoreError>;

    /// Persist the collections listed in `changed` from `staged`.
    ///
    /// Either every listed collection is replaced or none is.
    fn commit(&self, staged: &Tables, changed: &BTreeSet<EntityKind>) -> Result<(), StoreError>;

    /// Store-wide exclusive write lock, held around every read-modify-write
    fn write_lock(&self) -> Result<MutexGuard<'_, ()>, StoreError>;

    /// Incremented after every successful commit
    fn generation(&self) -> u64;
}

/// A staged copy of the store being mutated under the write lock
#[derive(Debug)]
pub struct Transaction {
    staged: Tables,
    changed: BTreeSet<EntityKind>,
}

impl Transaction {
    pub fn new(staged: Tables) -> Self {
        Self {
            staged,
            changed: BTreeSet::new(),
        }
    }

    /// Read-only view of the staged collections
    pub fn tables(&self) -> &Tables {
        &self.staged
    }

    /// Kinds touched so far
    pub fn changed(&self) -> &BTreeSet<EntityKind> {
        &self.changed
    }

    /// Records of type `R` matching `predicate`
    pub fn scan<R: Record>(&self, predicate: impl Fn(&R) -> bool) -> Vec<R> {
        R::collection(&self.staged)
            .iter()
            .filter(|r| predicate(r))
            .cloned()
            .collect()
    }

    pub fn get<R: Record>(&self, id: RecordId) -> Option<&R> {
        self.staged.get(id)
    }

    /// Insert a record, assigning `max(existing id) + 1`
    pub fn insert<R: Record>(&mut self, mut record: R) -> Result<RecordId, StoreError> {
        let collection = R::collection_mut(&mut self.staged);
        let id = collection
            .iter()
            .map(|r| r.id())
            .max()
            .unwrap_or(0)
            .checked_add(1)
            .ok_or_else(|| StoreError::Rejected(format!("{} ids exhausted", R::KIND.plural())))?;
        record.assign_id(id);
        collection.push(record);
        self.changed.insert(R::KIND);
        Ok(id)
    }

    /// Apply `mutation` to every record matching `predicate`; returns the count.
    ///
    /// The id is restored after the mutation so it cannot be rewritten here.
    pub fn update_where<R: Record>(
        &mut self,
        predicate: impl Fn(&R) -> bool,
        mut mutation: impl FnMut(&mut R),
    ) -> usize {
        let mut updated = 0;
        for record in R::collection_mut(&mut self.staged).iter_mut() {
            if predicate(record) {
                let id = record.id();
                mutation(record);
                record.assign_id(id);
                updated += 1;
            }
        }
        if updated > 0 {
            self.changed.insert(R::KIND);
        }
        updated
    }

    /// Remove every record matching `predicate`; returns the count
    pub fn delete_where<R: Record>(&mut self, predicate: impl Fn(&R) -> bool) -> usize {
        let collection = R::collection_mut(&mut self.staged);
        let before = collection.len();
        collection.retain(|r| !predicate(r));
        let removed = before - collection.len();
        if removed > 0 {
            self.changed.insert(R::KIND);
        }
        removed
    }

    pub(crate) fn into_parts(self) -> (Tables, BTreeSet<EntityKind>) {
        (self.staged, self.changed)
    }
}

/// Record-level helpers available on every [`RecordStore`], including
/// `dyn RecordStore`.
///
/// Each mutating helper is its own transaction.
pub trait RecordStoreExt: RecordStore {
    /// Run `f` against a staged copy under the write lock and commit what it touched
    fn transaction<T, E>(&self, f: impl FnOnce(&mut Transaction) -> Result<T, E>) -> Result<T, E>
    where
        E: From<StoreError>,
    {
        let _guard = self.write_lock()?;
        let mut tx = Transaction::new(self.snapshot()?);
        let output = f(&mut tx)?;
        let (staged, changed) = tx.into_parts();
        if !changed.is_empty() {
            self.commit(&staged, &changed)?;
        }
        Ok(output)
    }

    /// Committed records of type `R` matching `predicate`; takes no lock
    fn scan<R: Record>(&self, predicate: impl Fn(&R) -> bool) -> Result<Vec<R>, StoreError> {
        let tables = self.snapshot()?;
        Ok(R::collection(&tables)
            .iter()
            .filter(|r| predicate(r))
            .cloned()
            .collect())
    }

    fn insert<R: Record>(&self, record: R) -> Result<RecordId, StoreError> {
        self.transaction(|tx| tx.insert(record))
    }

    fn update_where<R: Record>(
        &self,
        predicate: impl Fn(&R) -> bool,
        mutation: impl FnMut(&mut R),
    ) -> Result<usize, StoreError> {
        self.transaction(|tx| Ok(tx.update_where(predicate, mutation)))
    }

    fn delete_where<R: Record>(&self, predicate: impl Fn(&R) -> bool) -> Result<usize, StoreError> {
        self.transaction(|tx| Ok(tx.delete_where(predicate)))
    }
}

impl<S: RecordStore + ?Sized> RecordStoreExt for S {}
