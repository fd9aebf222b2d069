//! Shared test harness for record store and shop testing
//!
//! Provides record builders, a seeded shop fixture, and [`FailingStore`], a
//! wrapper that makes the next commit fail so atomicity can be checked.
//!
//! # Usage
//!
//! From any integration test file in `tests/`:
//! ```rust,ignore
//! #[macro_use]
//! mod store_harness;
//! use store_harness::*;
//! ```

#![allow(dead_code)]

#[macro_use]
pub mod record_store_tests;

use fixdesk::core::entity::EntityKind;
use fixdesk::core::error::StoreError;
use fixdesk::core::store::{RecordStore, Tables};
use fixdesk::entities::{
    Customer, Device, InvoiceTerms, NewCustomer, NewDevice, NewService, NewTicket, Service,
    TicketStatus,
};
use fixdesk::shop::RepairShop;
use fixdesk::storage::InMemoryStore;
use rust_decimal_macros::dec;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, MutexGuard};

// ---------------------------------------------------------------------------
// Record builders
// ---------------------------------------------------------------------------

/// A customer record ready for insertion (id assigned by the store)
pub fn customer(name: &str) -> Customer {
    NewCustomer::new(name).into_record(0).unwrap()
}

/// A device record for `customer_id`
pub fn device(customer_id: u64, brand: &str, model: &str) -> Device {
    NewDevice::new(customer_id, brand, model).into_record(0).unwrap()
}

/// A service record for `ticket_id`
pub fn service(ticket_id: u64, description: &str, cost: rust_decimal::Decimal) -> Service {
    NewService::new(ticket_id, description, cost).into_record(0).unwrap()
}

// ---------------------------------------------------------------------------
// Shop fixture
// ---------------------------------------------------------------------------

/// Ids created by [`seed_shop`]
#[derive(Debug, Clone, Copy)]
pub struct Seeded {
    pub customer: u64,
    pub device: u64,
    pub ticket: u64,
    pub invoice: u64,
    /// A second customer with one bare device, untouched by most tests
    pub bystander: u64,
    pub bystander_device: u64,
}

/// One fully billed repair plus an unrelated customer.
///
/// Ticket services are 500.00 and 250.50; the invoice uses 18% tax and a
/// discount of 50, so its total is 835.59.
pub fn seed_shop(shop: &RepairShop) -> Seeded {
    let anita = shop
        .add_customer(NewCustomer::new("Anita Rao").with_email("anita@example.com"))
        .unwrap();
    let phone = shop
        .add_device(NewDevice::new(anita.id, "Samsung", "Galaxy S21").with_issue("Cracked screen"))
        .unwrap();
    let ticket = shop
        .add_ticket(NewTicket::new(phone.id, "Jane Smith").with_status(TicketStatus::Completed))
        .unwrap();
    shop.add_service(NewService::new(ticket.id, "Screen replacement", dec!(500.00)))
        .unwrap();
    shop.add_service(NewService::new(ticket.id, "Battery", dec!(250.50)))
        .unwrap();
    let invoice = shop
        .generate_invoice(ticket.id, InvoiceTerms::new(dec!(18), dec!(50)))
        .unwrap();

    let vikram = shop.add_customer(NewCustomer::new("Vikram Shah")).unwrap();
    let laptop = shop
        .add_device(NewDevice::new(vikram.id, "Dell", "XPS 13"))
        .unwrap();

    Seeded {
        customer: anita.id,
        device: phone.id,
        ticket: ticket.id,
        invoice: invoice.id,
        bystander: vikram.id,
        bystander_device: laptop.id,
    }
}

/// A shop over a fresh in-memory store
pub fn memory_shop() -> RepairShop {
    RepairShop::new(Arc::new(InMemoryStore::new()))
}

// ---------------------------------------------------------------------------
// FailingStore: commit failure injection
// ---------------------------------------------------------------------------

/// Delegates to an inner store, but every commit fails while armed.
pub struct FailingStore<S> {
    inner: S,
    armed: AtomicBool,
}

impl<S: RecordStore> FailingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            armed: AtomicBool::new(false),
        }
    }

    /// Make commits fail until [`disarm`](Self::disarm)
    pub fn arm(&self) {
        self.armed.store(true, Ordering::SeqCst);
    }

    pub fn disarm(&self) {
        self.armed.store(false, Ordering::SeqCst);
    }
}

impl<S: RecordStore> RecordStore for FailingStore<S> {
    fn snapshot(&self) -> Result<Tables, StoreError> {
        self.inner.snapshot()
    }

    fn commit(&self, staged: &Tables, changed: &BTreeSet<EntityKind>) -> Result<(), StoreError> {
        if self.armed.load(Ordering::SeqCst) {
            return Err(StoreError::Rejected("storage full".to_string()));
        }
        self.inner.commit(staged, changed)
    }

    fn write_lock(&self) -> Result<MutexGuard<'_, ()>, StoreError> {
        self.inner.write_lock()
    }

    fn generation(&self) -> u64 {
        self.inner.generation()
    }
}

/// A shop whose store can be made to fail, plus the handle to arm it
pub fn failing_shop() -> (RepairShop, Arc<FailingStore<InMemoryStore>>) {
    let store = Arc::new(FailingStore::new(InMemoryStore::new()));
    let shop = RepairShop::new(store.clone());
    (shop, store)
}
