//! Repair shop records and the inputs used to create them
//!
//! Ownership chain: a [`Customer`] owns devices, a [`Device`] owns tickets,
//! and a [`Ticket`] owns its [`Service`] lines and at most one [`Invoice`].

pub mod macros;

mod customer;
mod device;
mod invoice;
mod service;
mod ticket;

pub use customer::{Customer, NewCustomer};
pub use device::{Device, NewDevice};
pub use invoice::{Invoice, InvoiceTerms, PaidStatus};
pub use service::{NewService, Service};
pub use ticket::{NewTicket, Ticket, TicketStatus};

use crate::core::error::ShopError;

/// Trim a required text field, rejecting blanks
pub(crate) fn required(field: &str, value: &str) -> Result<String, ShopError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ShopError::invalid(field, "is required"));
    }
    Ok(trimmed.to_string())
}
