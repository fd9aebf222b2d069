//! Cached selection lists ("combos") for pickers
//!
//! Each entry remembers the store generation it was built from; a lookup
//! after any commit rebuilds it, so a cascade delete can never leave a
//! removed record selectable.

use crate::core::entity::RecordId;
use crate::core::error::{ShopError, StoreError};
use crate::core::store::{RecordStore, Tables};
use crate::entities::TicketStatus;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, RwLock};

/// Which selection list to build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComboKind {
    /// `"Name (ID: n)"`
    Customers,
    /// `"Brand Model - Customer (ID: n)"`
    Devices,
    /// `"Ticket #n - Brand Model (Customer)"`
    Tickets,
    /// Completed tickets with services and no invoice yet
    InvoiceableTickets,
}

impl FromStr for ComboKind {
    type Err = ShopError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customers" => Ok(ComboKind::Customers),
            "devices" => Ok(ComboKind::Devices),
            "tickets" => Ok(ComboKind::Tickets),
            "invoiceable-tickets" => Ok(ComboKind::InvoiceableTickets),
            other => Err(ShopError::invalid("kind", format!("unknown combo '{}'", other))),
        }
    }
}

/// One selectable entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComboOption {
    pub id: RecordId,
    pub label: String,
}

impl ComboOption {
    fn new(id: RecordId, label: String) -> Self {
        Self { id, label }
    }
}

/// Build a selection list straight from a snapshot
pub fn build(tables: &Tables, kind: ComboKind) -> Vec<ComboOption> {
    let customer_name = |id: RecordId| {
        tables
            .customers
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.name.as_str())
            .unwrap_or("Unknown")
    };

    match kind {
        ComboKind::Customers => tables
            .customers
            .iter()
            .map(|c| ComboOption::new(c.id, format!("{} (ID: {})", c.name, c.id)))
            .collect(),
        ComboKind::Devices => tables
            .devices
            .iter()
            .map(|d| {
                let label = format!("{} - {} (ID: {})", d.label(), customer_name(d.customer_id), d.id);
                ComboOption::new(d.id, label)
            })
            .collect(),
        ComboKind::Tickets | ComboKind::InvoiceableTickets => tables
            .tickets
            .iter()
            .filter(|t| {
                kind == ComboKind::Tickets
                    || (t.status == TicketStatus::Completed
                        && tables.services.iter().any(|s| s.ticket_id == t.id)
                        && !tables.invoices.iter().any(|i| i.ticket_id == t.id))
            })
            .filter_map(|t| {
                let device = tables.devices.iter().find(|d| d.id == t.device_id)?;
                let label = format!(
                    "Ticket #{} - {} ({})",
                    t.id,
                    device.label(),
                    customer_name(device.customer_id)
                );
                Some(ComboOption::new(t.id, label))
            })
            .collect(),
    }
}

type Entry = (u64, Arc<Vec<ComboOption>>);

/// Selection lists keyed by store generation
#[derive(Debug, Default)]
pub struct ListingCache {
    entries: RwLock<HashMap<ComboKind, Entry>>,
}

impl ListingCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached list for `kind`, rebuilt if the store committed since it was made
    pub fn get(
        &self,
        store: &dyn RecordStore,
        kind: ComboKind,
    ) -> Result<Arc<Vec<ComboOption>>, StoreError> {
        // Read before the snapshot: a commit racing in between only makes
        // the entry look older than it is.
        let generation = store.generation();

        {
            let entries = self.entries.read().map_err(|_| StoreError::Poisoned)?;
            if let Some((built_at, options)) = entries.get(&kind) {
                if *built_at == generation {
                    return Ok(Arc::clone(options));
                }
            }
        }

        let options = Arc::new(build(&store.snapshot()?, kind));
        let mut entries = self.entries.write().map_err(|_| StoreError::Poisoned)?;
        entries.insert(kind, (generation, Arc::clone(&options)));
        tracing::debug!(?kind, generation, "rebuilt combo listing");
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::RecordStoreExt;
    use crate::entities::{Customer, NewCustomer, NewDevice};
    use crate::storage::InMemoryStore;

    fn store() -> InMemoryStore {
        let store = InMemoryStore::new();
        store
            .transaction(|tx| {
                let asha = tx.insert(NewCustomer::new("Asha").into_record(0).unwrap())?;
                tx.insert(NewDevice::new(asha, "Apple", "iPhone 12").into_record(0).unwrap())?;
                Ok::<_, StoreError>(())
            })
            .unwrap();
        store
    }

    #[test]
    fn test_labels() {
        let tables = store().snapshot().unwrap();
        assert_eq!(
            build(&tables, ComboKind::Customers),
            vec![ComboOption::new(1, "Asha (ID: 1)".into())]
        );
        assert_eq!(
            build(&tables, ComboKind::Devices)[0].label,
            "Apple iPhone 12 - Asha (ID: 1)"
        );
    }

    #[test]
    fn test_cache_hit_until_commit() {
        let store = store();
        let cache = ListingCache::new();

        let first = cache.get(&store, ComboKind::Customers).unwrap();
        let second = cache.get(&store, ComboKind::Customers).unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        store.delete_where(|c: &Customer| c.id == 1).unwrap();
        let third = cache.get(&store, ComboKind::Customers).unwrap();
        assert!(third.is_empty());
    }

    #[test]
    fn test_combo_kind_names() {
        assert_eq!("invoiceable-tickets".parse::<ComboKind>().unwrap(), ComboKind::InvoiceableTickets);
        assert!("printers".parse::<ComboKind>().is_err());
    }
}
