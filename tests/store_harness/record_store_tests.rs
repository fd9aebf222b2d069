//! Macro-generated test suite for `RecordStore` contract validation.
//!
//! # Usage
//!
//! ```rust,ignore
//! #[macro_use]
//! mod store_harness;
//!
//! use store_harness::*;
//! use fixdesk::storage::InMemoryStore;
//!
//! record_store_tests!(InMemoryStore::new());
//! ```
//!
//! # Generated Tests
//!
//! - `test_empty_snapshot`: a fresh store holds no records
//! - `test_insert_assigns_max_plus_one`: per-kind ids, reuse after the max is deleted
//! - `test_scan_with_predicate`: filtered read of committed records
//! - `test_update_where`: count of affected records, change persisted
//! - `test_delete_where`: count of removed records, others untouched
//! - `test_transaction_spans_collections`: one commit for several kinds
//! - `test_failed_transaction_commits_nothing`: closure error leaves store as is
//! - `test_generation_tracks_commits`: only real commits advance it
//! - `test_concurrent_writers`: parallel inserts never hand out the same id

/// Generate a full `RecordStore` conformance test suite.
///
/// `$factory` must evaluate to a fresh store; it is re-evaluated per test.
#[macro_export]
macro_rules! record_store_tests {
    ($factory:expr) => {
        mod record_store_contract_tests {
            use super::*;
            use fixdesk::core::error::StoreError;
            use fixdesk::core::store::{RecordStore, RecordStoreExt, Tables};
            use fixdesk::entities::{Customer, Device, Service};
            use rust_decimal_macros::dec;
            use std::collections::BTreeSet;

            #[test]
            fn test_empty_snapshot() {
                let store = $factory;
                assert_eq!(store.snapshot().unwrap(), Tables::default());
            }

            #[test]
            fn test_insert_assigns_max_plus_one() {
                let store = $factory;
                assert_eq!(store.insert(customer("Asha")).unwrap(), 1);
                assert_eq!(store.insert(customer("Bala")).unwrap(), 2);
                // Ids are per kind
                assert_eq!(store.insert(device(1, "Nokia", "3310")).unwrap(), 1);

                store.delete_where(|c: &Customer| c.id == 2).unwrap();
                assert_eq!(store.insert(customer("Chitra")).unwrap(), 2);

                store.delete_where(|c: &Customer| c.id == 1).unwrap();
                assert_eq!(store.insert(customer("Deepa")).unwrap(), 3);
            }

            #[test]
            fn test_scan_with_predicate() {
                let store = $factory;
                for name in ["Asha", "Bala", "Asha"] {
                    store.insert(customer(name)).unwrap();
                }

                let found = store.scan(|c: &Customer| c.name == "Asha").unwrap();
                assert_eq!(found.iter().map(|c| c.id).collect::<Vec<_>>(), vec![1, 3]);
                assert!(store.scan(|c: &Customer| c.name == "Zoe").unwrap().is_empty());
            }

            #[test]
            fn test_update_where() {
                let store = $factory;
                store.insert(device(1, "Apple", "iPhone 11")).unwrap();
                store.insert(device(1, "Apple", "iPhone 12")).unwrap();
                store.insert(device(2, "Dell", "XPS 13")).unwrap();

                let updated = store
                    .update_where(|d: &Device| d.brand == "Apple", |d| d.issue = "Battery".into())
                    .unwrap();
                assert_eq!(updated, 2);

                let tables = store.snapshot().unwrap();
                assert_eq!(tables.devices.iter().filter(|d| d.issue == "Battery").count(), 2);
                assert_eq!(tables.get::<Device>(3).unwrap().issue, "");
            }

            #[test]
            fn test_delete_where() {
                let store = $factory;
                store.insert(service(1, "Screen", dec!(500))).unwrap();
                store.insert(service(1, "Battery", dec!(250.50))).unwrap();
                store.insert(service(2, "Cleaning", dec!(0))).unwrap();

                let removed = store.delete_where(|s: &Service| s.ticket_id == 1).unwrap();
                assert_eq!(removed, 2);

                let left = store.scan(|_: &Service| true).unwrap();
                assert_eq!(left.len(), 1);
                assert_eq!(left[0].description, "Cleaning");
                assert_eq!(left[0].cost, dec!(0));
            }

            #[test]
            fn test_transaction_spans_collections() {
                let store = $factory;
                let before = store.generation();

                let (customer_id, device_id) = store
                    .transaction(|tx| {
                        let c = tx.insert(customer("Asha"))?;
                        let d = tx.insert(device(c, "OnePlus", "9"))?;
                        Ok::<_, StoreError>((c, d))
                    })
                    .unwrap();

                assert_eq!(store.generation(), before + 1);
                let tables = store.snapshot().unwrap();
                assert_eq!(tables.get::<Device>(device_id).unwrap().customer_id, customer_id);
                assert!(tables.orphans().is_empty());
            }

            #[test]
            fn test_failed_transaction_commits_nothing() {
                let store = $factory;
                store.insert(customer("Asha")).unwrap();
                let before = store.snapshot().unwrap();

                let result: Result<(), StoreError> = store.transaction(|tx| {
                    tx.insert(customer("Bala"))?;
                    tx.delete_where(|_: &Customer| true);
                    Err(StoreError::Rejected("abandoned".into()))
                });

                assert!(result.is_err());
                assert_eq!(store.snapshot().unwrap(), before);
                // Lock released on the error path
                store.insert(customer("Chitra")).unwrap();
            }

            #[test]
            fn test_generation_tracks_commits() {
                let store = $factory;
                let start = store.generation();

                store.insert(customer("Asha")).unwrap();
                assert_eq!(store.generation(), start + 1);

                // Nothing matched: nothing to commit
                store.update_where(|c: &Customer| c.id == 99, |c| c.name.clear()).unwrap();
                store.delete_where(|c: &Customer| c.id == 99).unwrap();
                assert_eq!(store.generation(), start + 1);

                store.commit(&store.snapshot().unwrap(), &BTreeSet::new()).unwrap();
                assert_eq!(store.generation(), start + 2);
            }

            #[test]
            fn test_concurrent_writers() {
                let store = $factory;

                std::thread::scope(|scope| {
                    for worker in 0..4 {
                        let store = &store;
                        scope.spawn(move || {
                            for n in 0..10 {
                                store.insert(customer(&format!("w{}-{}", worker, n))).unwrap();
                            }
                        });
                    }
                });

                let ids: BTreeSet<u64> = store
                    .scan(|_: &Customer| true)
                    .unwrap()
                    .into_iter()
                    .map(|c| c.id)
                    .collect();
                assert_eq!(ids.len(), 40);
                assert_eq!(ids.iter().copied().max(), Some(40));
            }
        }
    };
}
