//! # fixdesk
//!
//! Record keeping for a device repair shop: customers, their devices, repair
//! tickets, billable service lines and invoices.
//!
//! ## Features
//!
//! - **Injected storage**: the shop talks to a [`RecordStore`](core::store::RecordStore)
//!   trait; in-memory and JSON-file backends are provided
//! - **Staged commits**: every multi-record mutation is built in memory and
//!   committed all at once, under a store-wide write lock
//! - **Cascading deletes**: removing a customer, device or ticket removes
//!   everything that depends on it, leaves first, or nothing at all
//! - **Live invoice totals**: totals are recomputed whenever a service or the
//!   invoice terms change, with exact decimal arithmetic
//! - **REST exposure**: an axum router over the whole shop
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use fixdesk::prelude::*;
//!
//! let shop = RepairShop::new(Arc::new(InMemoryStore::new()));
//!
//! let customer = shop.add_customer(NewCustomer::new("Anita Rao").with_phone("98450 12345"))?;
//! let device = shop.add_device(NewDevice::new(customer.id, "Samsung", "Galaxy S21"))?;
//! let ticket = shop.add_ticket(
//!     NewTicket::new(device.id, "Jane Smith").with_status(TicketStatus::Completed),
//! )?;
//! shop.add_service(NewService::new(ticket.id, "Screen replacement", dec!(500.00)))?;
//!
//! let invoice = shop.generate_invoice(ticket.id, InvoiceTerms::new(dec!(18), dec!(50)))?;
//! println!("{}", shop.receipt(invoice.id)?);
//!
//! // Removes the device, the ticket, its service and its invoice
//! shop.delete_customer(customer.id)?;
//! ```

pub mod billing;
pub mod config;
pub mod core;
pub mod entities;
pub mod server;
pub mod shop;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        entity::{EntityKind, Record, RecordId},
        error::{ErrorResponse, ShopError, StoreError},
        field::{FieldFormat, FieldValue},
        store::{RecordStore, RecordStoreExt, Tables, Transaction},
    };

    // === Macros ===
    pub use crate::impl_record;

    // === Records ===
    pub use crate::entities::{
        Customer, Device, Invoice, InvoiceTerms, NewCustomer, NewDevice, NewService, NewTicket,
        PaidStatus, Service, Ticket, TicketStatus,
    };

    // === Billing ===
    pub use crate::billing::{InvoiceTotals, Receipt, compute, format_currency, parse_amount};

    // === Shop ===
    pub use crate::shop::{
        CascadePlan, CascadeReport, ComboKind, ComboOption, ListingCache, RepairShop, ShopSummary,
    };

    // === Storage ===
    pub use crate::storage::InMemoryStore;
    #[cfg(feature = "file-store")]
    pub use crate::storage::JsonFileStore;

    // === Config ===
    pub use crate::config::{BillingConfig, ServerConfig, ShopConfig, StorageBackend, StorageConfig};

    // === Server ===
    pub use crate::server::{ServerBuilder, build_router};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use chrono::{DateTime, Utc};
    pub use rust_decimal::Decimal;
    pub use serde::{Deserialize, Serialize};
    pub use std::sync::Arc;
}
