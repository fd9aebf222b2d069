//! In-memory implementation of RecordStore for testing and development

use crate::core::entity::EntityKind;
use crate::core::error::StoreError;
use crate::core::store::{RecordStore, Tables};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

/// In-memory record store
///
/// Useful for testing and development. Uses RwLock for the data and a
/// separate Mutex as the store-wide write lock; a commit swaps the changed
/// collections under a single write guard, so readers never see half of it.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
    write_lock: Arc<Mutex<()>>,
    generation: Arc<AtomicU64>,
}

impl InMemoryStore {
    /// Create an empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `tables`
    pub fn with_tables(tables: Tables) -> Self {
        Self {
            tables: Arc::new(RwLock::new(tables)),
            ..Self::default()
        }
    }
}

impl RecordStore for InMemoryStore {
    fn snapshot(&self) -> Result<Tables, StoreError> {
        let tables = self.tables.read().map_err(|_| StoreError::Poisoned)?;
        Ok(tables.clone())
    }

    fn commit(&self, staged: &Tables, changed: &BTreeSet<EntityKind>) -> Result<(), StoreError> {
        let mut tables = self.tables.write().map_err(|_| StoreError::Poisoned)?;

        for kind in changed {
            match kind {
                EntityKind::Customer => tables.customers.clone_from(&staged.customers),
                EntityKind::Device => tables.devices.clone_from(&staged.devices),
                EntityKind::Ticket => tables.tickets.clone_from(&staged.tickets),
                EntityKind::Service => tables.services.clone_from(&staged.services),
                EntityKind::Invoice => tables.invoices.clone_from(&staged.invoices),
            }
        }

        self.generation.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn write_lock(&self) -> Result<MutexGuard<'_, ()>, StoreError> {
        self.write_lock.lock().map_err(|_| StoreError::Poisoned)
    }

    fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }
}
