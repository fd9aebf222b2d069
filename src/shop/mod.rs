//! The repair shop facade
//!
//! [`RepairShop`] is the only entry point presentation layers use. Every
//! multi-record mutation runs inside one
//! [`transaction`](crate::core::store::RecordStoreExt::transaction), so it is
//! serialised by the store's write lock and committed all at once.
//!
//! Invoice totals are never trusted: any change to a ticket's services, or to
//! the invoice's own terms, recomputes `total_amount` through the calculator
//! in the same transaction.

pub mod cascade;
pub mod listing;

pub use cascade::{CascadePlan, CascadeReport};
pub use listing::{ComboKind, ComboOption, ListingCache};

use crate::billing::{InvoiceTotals, Receipt, calculator};
use crate::config::BillingConfig;
use crate::core::entity::{EntityKind, Record, RecordId};
use crate::core::error::{ShopError, StoreError};
use crate::core::store::{RecordStore, RecordStoreExt, Tables, Transaction};
use crate::entities::{
    Customer, Device, Invoice, InvoiceTerms, NewCustomer, NewDevice, NewService, NewTicket,
    PaidStatus, Service, Ticket, TicketStatus,
};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;

/// Dashboard figures
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShopSummary {
    pub customers: usize,
    pub devices: usize,
    pub tickets: usize,
    pub completed_tickets: usize,
    pub invoices: usize,
    pub paid_invoices: usize,
    /// Sum of every invoice total, recomputed from live services
    pub revenue: Decimal,
}

/// Look up a record by id or report it missing
fn require<R: Record>(tables: &Tables, id: RecordId) -> Result<&R, ShopError> {
    tables
        .get::<R>(id)
        .ok_or_else(|| ShopError::not_found(R::KIND, id))
}

fn service_costs(tables: &Tables, ticket_id: RecordId) -> Vec<Decimal> {
    tables
        .services
        .iter()
        .filter(|s| s.ticket_id == ticket_id)
        .map(|s| s.cost)
        .collect()
}

/// Rewrite the total of the ticket's invoice, if it has one
fn refresh_invoice(tx: &mut Transaction, ticket_id: RecordId) -> Result<Option<Invoice>, ShopError> {
    let Some(invoice) = tx.tables().invoices.iter().find(|i| i.ticket_id == ticket_id).cloned() else {
        return Ok(None);
    };

    let totals = calculator::compute(
        &service_costs(tx.tables(), ticket_id),
        invoice.tax_rate,
        invoice.discount,
    )?;

    if totals.total != invoice.total_amount {
        tx.update_where(|i: &Invoice| i.id == invoice.id, |i| i.total_amount = totals.total);
        tracing::debug!(
            invoice_id = invoice.id,
            ticket_id,
            total = %totals.total,
            "recomputed invoice total"
        );
    }

    Ok(Some(Invoice {
        total_amount: totals.total,
        ..invoice
    }))
}

/// Repair shop operations over an injected [`RecordStore`]
#[derive(Clone)]
pub struct RepairShop {
    store: Arc<dyn RecordStore>,
    listings: Arc<ListingCache>,
    billing: BillingConfig,
}

impl RepairShop {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            listings: Arc::new(ListingCache::new()),
            billing: BillingConfig::default(),
        }
    }

    pub fn with_billing(mut self, billing: BillingConfig) -> Self {
        self.billing = billing;
        self
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    pub fn billing(&self) -> &BillingConfig {
        &self.billing
    }

    fn get<R: Record>(&self, id: RecordId) -> Result<R, ShopError> {
        let tables = self.store.snapshot()?;
        require::<R>(&tables, id).cloned()
    }

    fn list<R: Record>(&self) -> Result<Vec<R>, ShopError> {
        Ok(self.store.scan(|_: &R| true)?)
    }

    // -------------------------------------------------------------------
    // Customers
    // -------------------------------------------------------------------

    pub fn add_customer(&self, input: NewCustomer) -> Result<Customer, ShopError> {
        let mut customer = input.into_record(0)?;
        self.store.transaction(|tx| {
            customer.id = tx.insert(customer.clone())?;
            Ok(customer)
        })
    }

    pub fn update_customer(&self, id: RecordId, input: NewCustomer) -> Result<Customer, ShopError> {
        let customer = input.into_record(id)?;
        self.store.transaction(|tx| {
            require::<Customer>(tx.tables(), id)?;
            tx.update_where(|c: &Customer| c.id == id, |c| *c = customer.clone());
            Ok(customer)
        })
    }

    pub fn get_customer(&self, id: RecordId) -> Result<Customer, ShopError> {
        self.get(id)
    }

    pub fn list_customers(&self) -> Result<Vec<Customer>, ShopError> {
        self.list()
    }

    /// Delete a customer with all devices, tickets, services and invoices under it
    pub fn delete_customer(&self, id: RecordId) -> Result<CascadeReport, ShopError> {
        self.cascade(|tables| CascadePlan::for_customer(tables, id))
    }

    // -------------------------------------------------------------------
    // Devices
    // -------------------------------------------------------------------

    pub fn add_device(&self, input: NewDevice) -> Result<Device, ShopError> {
        let mut device = input.into_record(0)?;
        self.store.transaction(|tx| {
            require::<Customer>(tx.tables(), device.customer_id)?;
            device.id = tx.insert(device.clone())?;
            Ok(device)
        })
    }

    /// Replace a device's details; it may move to another existing customer
    pub fn update_device(&self, id: RecordId, input: NewDevice) -> Result<Device, ShopError> {
        let device = input.into_record(id)?;
        self.store.transaction(|tx| {
            require::<Device>(tx.tables(), id)?;
            require::<Customer>(tx.tables(), device.customer_id)?;
            tx.update_where(|d: &Device| d.id == id, |d| *d = device.clone());
            Ok(device)
        })
    }

    pub fn get_device(&self, id: RecordId) -> Result<Device, ShopError> {
        self.get(id)
    }

    pub fn list_devices(&self) -> Result<Vec<Device>, ShopError> {
        self.list()
    }

    /// Delete a device with all tickets, services and invoices under it
    pub fn delete_device(&self, id: RecordId) -> Result<CascadeReport, ShopError> {
        self.cascade(|tables| CascadePlan::for_device(tables, id))
    }

    // -------------------------------------------------------------------
    // Tickets
    // -------------------------------------------------------------------

    pub fn add_ticket(&self, input: NewTicket) -> Result<Ticket, ShopError> {
        let mut ticket = input.into_record(0, Utc::now())?;
        self.store.transaction(|tx| {
            require::<Device>(tx.tables(), ticket.device_id)?;
            ticket.id = tx.insert(ticket.clone())?;
            Ok(ticket)
        })
    }

    /// Change technician and status; device and creation time are kept
    pub fn update_ticket(&self, id: RecordId, input: NewTicket) -> Result<Ticket, ShopError> {
        self.store.transaction(|tx| {
            let current = require::<Ticket>(tx.tables(), id)?.clone();
            let ticket = NewTicket {
                device_id: current.device_id,
                ..input
            }
            .into_record(id, current.created_at)?;
            tx.update_where(|t: &Ticket| t.id == id, |t| *t = ticket.clone());
            Ok(ticket)
        })
    }

    pub fn set_ticket_status(&self, id: RecordId, status: TicketStatus) -> Result<Ticket, ShopError> {
        self.store.transaction(|tx| {
            let mut ticket = require::<Ticket>(tx.tables(), id)?.clone();
            ticket.status = status;
            tx.update_where(|t: &Ticket| t.id == id, |t| t.status = status);
            Ok(ticket)
        })
    }

    pub fn get_ticket(&self, id: RecordId) -> Result<Ticket, ShopError> {
        self.get(id)
    }

    pub fn list_tickets(&self) -> Result<Vec<Ticket>, ShopError> {
        self.list()
    }

    /// Delete a ticket with its services and invoice
    pub fn delete_ticket(&self, id: RecordId) -> Result<CascadeReport, ShopError> {
        self.cascade(|tables| CascadePlan::for_ticket(tables, id))
    }

    fn cascade(
        &self,
        plan: impl FnOnce(&Tables) -> Result<CascadePlan, ShopError>,
    ) -> Result<CascadeReport, ShopError> {
        let report = self.store.transaction(|tx| {
            let plan = plan(tx.tables())?;
            Ok::<_, ShopError>(plan.apply(tx))
        });

        match &report {
            Ok(report) => tracing::info!(
                kind = %report.kind,
                id = report.id,
                customers = report.customers,
                devices = report.devices,
                tickets = report.tickets,
                services = report.services,
                invoices = report.invoices,
                "cascade delete committed"
            ),
            Err(ShopError::Storage(err)) => {
                tracing::warn!(error = %err, "cascade delete rolled back")
            }
            Err(_) => {}
        }
        report
    }

    // -------------------------------------------------------------------
    // Services
    // -------------------------------------------------------------------

    pub fn add_service(&self, input: NewService) -> Result<Service, ShopError> {
        let mut service = input.into_record(0)?;
        self.store.transaction(|tx| {
            require::<Ticket>(tx.tables(), service.ticket_id)?;
            service.id = tx.insert(service.clone())?;
            refresh_invoice(tx, service.ticket_id)?;
            Ok(service)
        })
    }

    pub fn update_service(
        &self,
        id: RecordId,
        description: &str,
        cost: Decimal,
    ) -> Result<Service, ShopError> {
        self.store.transaction(|tx| {
            let current = require::<Service>(tx.tables(), id)?;
            let service = NewService::new(current.ticket_id, description, cost).into_record(id)?;
            tx.update_where(|s: &Service| s.id == id, |s| *s = service.clone());
            refresh_invoice(tx, service.ticket_id)?;
            Ok(service)
        })
    }

    pub fn delete_service(&self, id: RecordId) -> Result<Service, ShopError> {
        self.store.transaction(|tx| {
            let service = require::<Service>(tx.tables(), id)?.clone();
            tx.delete_where(|s: &Service| s.id == id);
            refresh_invoice(tx, service.ticket_id)?;
            Ok(service)
        })
    }

    pub fn get_service(&self, id: RecordId) -> Result<Service, ShopError> {
        self.get(id)
    }

    pub fn list_services(&self) -> Result<Vec<Service>, ShopError> {
        self.list()
    }

    pub fn services_for_ticket(&self, ticket_id: RecordId) -> Result<Vec<Service>, ShopError> {
        let tables = self.store.snapshot()?;
        require::<Ticket>(&tables, ticket_id)?;
        Ok(tables
            .services
            .into_iter()
            .filter(|s| s.ticket_id == ticket_id)
            .collect())
    }

    // -------------------------------------------------------------------
    // Invoices
    // -------------------------------------------------------------------

    /// Bill a completed ticket. A ticket has at most one invoice and needs at
    /// least one service.
    pub fn generate_invoice(
        &self,
        ticket_id: RecordId,
        terms: InvoiceTerms,
    ) -> Result<Invoice, ShopError> {
        self.store.transaction(|tx| {
            let status = require::<Ticket>(tx.tables(), ticket_id)?.status;
            if let Some(existing) = tx.tables().invoices.iter().find(|i| i.ticket_id == ticket_id) {
                return Err(ShopError::AlreadyInvoiced {
                    ticket_id,
                    invoice_id: existing.id,
                });
            }
            if status != TicketStatus::Completed {
                return Err(ShopError::invalid("ticket_id", "ticket is not completed"));
            }

            let costs = service_costs(tx.tables(), ticket_id);
            if costs.is_empty() {
                return Err(ShopError::invalid("ticket_id", "ticket has no services to bill"));
            }
            let totals = calculator::compute(&costs, terms.tax_rate, terms.discount)?;

            let mut invoice = Invoice {
                id: 0,
                ticket_id,
                total_amount: totals.total,
                paid_status: terms.paid_status,
                date: Utc::now(),
                tax_rate: terms.tax_rate,
                discount: terms.discount,
            };
            invoice.id = tx.insert(invoice.clone())?;
            tracing::debug!(invoice_id = invoice.id, ticket_id, total = %invoice.total_amount, "generated invoice");
            Ok(invoice)
        })
    }

    /// Store new terms verbatim and recompute the total from live services
    pub fn update_invoice(&self, id: RecordId, terms: InvoiceTerms) -> Result<Invoice, ShopError> {
        self.store.transaction(|tx| {
            let ticket_id = require::<Invoice>(tx.tables(), id)?.ticket_id;
            calculator::compute(&[], terms.tax_rate, terms.discount)?;
            tx.update_where(
                |i: &Invoice| i.id == id,
                |i| {
                    i.tax_rate = terms.tax_rate;
                    i.discount = terms.discount;
                    i.paid_status = terms.paid_status;
                },
            );
            refreshed(tx, ticket_id, id)
        })
    }

    pub fn set_invoice_status(&self, id: RecordId, status: PaidStatus) -> Result<Invoice, ShopError> {
        self.store.transaction(|tx| {
            let ticket_id = require::<Invoice>(tx.tables(), id)?.ticket_id;
            tx.update_where(|i: &Invoice| i.id == id, |i| i.paid_status = status);
            refreshed(tx, ticket_id, id)
        })
    }

    /// Rewrite an invoice's stored total from its ticket's current services
    pub fn recompute_invoice(&self, id: RecordId) -> Result<Invoice, ShopError> {
        self.store.transaction(|tx| {
            let ticket_id = require::<Invoice>(tx.tables(), id)?.ticket_id;
            refreshed(tx, ticket_id, id)
        })
    }

    pub fn get_invoice(&self, id: RecordId) -> Result<Invoice, ShopError> {
        self.get(id)
    }

    pub fn list_invoices(&self) -> Result<Vec<Invoice>, ShopError> {
        self.list()
    }

    pub fn delete_invoice(&self, id: RecordId) -> Result<Invoice, ShopError> {
        self.store.transaction(|tx| {
            let invoice = require::<Invoice>(tx.tables(), id)?.clone();
            tx.delete_where(|i: &Invoice| i.id == id);
            Ok(invoice)
        })
    }

    /// Totals for arbitrary amounts; nothing is stored
    pub fn quote(
        &self,
        costs: &[Decimal],
        tax_rate: Decimal,
        discount: Decimal,
    ) -> Result<InvoiceTotals, ShopError> {
        calculator::compute(costs, tax_rate, discount)
    }

    /// Plain-text receipt built from live records
    pub fn receipt(&self, invoice_id: RecordId) -> Result<String, ShopError> {
        let tables = self.store.snapshot()?;
        Receipt::build(&tables, invoice_id)?.render_text(&self.billing)
    }

    // -------------------------------------------------------------------
    // Reporting
    // -------------------------------------------------------------------

    pub fn summary(&self) -> Result<ShopSummary, ShopError> {
        let tables = self.store.snapshot()?;

        let totals = tables
            .invoices
            .iter()
            .map(|invoice| {
                let costs = service_costs(&tables, invoice.ticket_id);
                Ok(calculator::compute(&costs, invoice.tax_rate, invoice.discount)?.total)
            })
            .collect::<Result<Vec<_>, ShopError>>()?;
        let revenue = calculator::checked_sum(&totals)
            .ok_or_else(|| ShopError::invalid("total_amount", "revenue is too large"))?;

        Ok(ShopSummary {
            customers: tables.customers.len(),
            devices: tables.devices.len(),
            tickets: tables.tickets.len(),
            completed_tickets: tables
                .tickets
                .iter()
                .filter(|t| t.status == TicketStatus::Completed)
                .count(),
            invoices: tables.invoices.len(),
            paid_invoices: tables
                .invoices
                .iter()
                .filter(|i| i.paid_status == PaidStatus::Paid)
                .count(),
            revenue,
        })
    }

    /// Cached selection list
    pub fn combo(&self, kind: ComboKind) -> Result<Arc<Vec<ComboOption>>, ShopError> {
        Ok(self.listings.get(self.store.as_ref(), kind)?)
    }

    /// Records of `kind` whose `field` matches `value`, as JSON
    pub fn search(
        &self,
        kind: EntityKind,
        field: &str,
        value: &str,
    ) -> Result<Vec<serde_json::Value>, ShopError> {
        let tables = self.store.snapshot()?;
        match kind {
            EntityKind::Customer => matching::<Customer>(&tables, field, value),
            EntityKind::Device => matching::<Device>(&tables, field, value),
            EntityKind::Ticket => matching::<Ticket>(&tables, field, value),
            EntityKind::Service => matching::<Service>(&tables, field, value),
            EntityKind::Invoice => matching::<Invoice>(&tables, field, value),
        }
    }
}

/// Refresh the invoice's total and return the stored invoice
fn refreshed(tx: &mut Transaction, ticket_id: RecordId, id: RecordId) -> Result<Invoice, ShopError> {
    refresh_invoice(tx, ticket_id)?;
    require::<Invoice>(tx.tables(), id).cloned()
}

fn matching<R: Record>(
    tables: &Tables,
    field: &str,
    value: &str,
) -> Result<Vec<serde_json::Value>, ShopError> {
    if !R::FIELDS.contains(&field) {
        return Err(ShopError::invalid(
            "field",
            format!("{} has no field '{}'", R::KIND, field),
        ));
    }

    R::collection(tables)
        .iter()
        .filter(|r| r.field_value(field).is_some_and(|v| v.matches_str(value)))
        .map(|r| {
            serde_json::to_value(r).map_err(|source| {
                ShopError::from(StoreError::Codec {
                    collection: R::KIND.plural(),
                    source,
                })
            })
        })
        .collect()
}
