//! Integration tests for InMemoryStore using the store test harness.
//!
//! This file invokes `record_store_tests!` to validate that InMemoryStore
//! fully conforms to the RecordStore contract.

#[macro_use]
mod store_harness;

use fixdesk::storage::InMemoryStore;
use store_harness::*;

record_store_tests!(InMemoryStore::new());
