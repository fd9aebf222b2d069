//! Cascade Deleter
//!
//! Deleting a record deletes everything that transitively references it:
//!
//! ```text
//! Customer ─► Device ─► Ticket ─┬─► Service
//!                               └─► Invoice
//! ```
//!
//! A [`CascadePlan`] is the closure of dependent ids computed against a
//! snapshot; [`CascadePlan::apply`] removes them from a staged
//! [`Transaction`] leaves first. The caller commits the transaction once, so
//! the whole cascade lands or none of it does.

use crate::core::entity::{EntityKind, RecordId};
use crate::core::error::ShopError;
use crate::core::store::{Tables, Transaction};
use crate::entities::{Customer, Device, Invoice, Service, Ticket};
use serde::Serialize;
use std::collections::BTreeSet;

/// Ids scheduled for removal, per kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadePlan {
    root: (EntityKind, RecordId),
    customers: BTreeSet<RecordId>,
    devices: BTreeSet<RecordId>,
    tickets: BTreeSet<RecordId>,
    services: BTreeSet<RecordId>,
    invoices: BTreeSet<RecordId>,
}

impl CascadePlan {
    fn rooted(kind: EntityKind, id: RecordId, tables: &Tables) -> Result<Self, ShopError> {
        if !tables.contains(kind, id) {
            return Err(ShopError::not_found(kind, id));
        }
        Ok(Self {
            root: (kind, id),
            customers: BTreeSet::new(),
            devices: BTreeSet::new(),
            tickets: BTreeSet::new(),
            services: BTreeSet::new(),
            invoices: BTreeSet::new(),
        })
    }

    /// The customer, its devices, their tickets and everything under those
    pub fn for_customer(tables: &Tables, id: RecordId) -> Result<Self, ShopError> {
        let mut plan = Self::rooted(EntityKind::Customer, id, tables)?;
        plan.customers.insert(id);
        plan.devices = tables
            .devices
            .iter()
            .filter(|d| d.customer_id == id)
            .map(|d| d.id)
            .collect();
        plan.collect_tickets(tables);
        Ok(plan)
    }

    /// The device, its tickets and everything under those
    pub fn for_device(tables: &Tables, id: RecordId) -> Result<Self, ShopError> {
        let mut plan = Self::rooted(EntityKind::Device, id, tables)?;
        plan.devices.insert(id);
        plan.collect_tickets(tables);
        Ok(plan)
    }

    /// The ticket with its services and invoice
    pub fn for_ticket(tables: &Tables, id: RecordId) -> Result<Self, ShopError> {
        let mut plan = Self::rooted(EntityKind::Ticket, id, tables)?;
        plan.tickets.insert(id);
        plan.collect_leaves(tables);
        Ok(plan)
    }

    fn collect_tickets(&mut self, tables: &Tables) {
        self.tickets.extend(
            tables
                .tickets
                .iter()
                .filter(|t| self.devices.contains(&t.device_id))
                .map(|t| t.id),
        );
        self.collect_leaves(tables);
    }

    fn collect_leaves(&mut self, tables: &Tables) {
        self.services = tables
            .services
            .iter()
            .filter(|s| self.tickets.contains(&s.ticket_id))
            .map(|s| s.id)
            .collect();
        self.invoices = tables
            .invoices
            .iter()
            .filter(|i| self.tickets.contains(&i.ticket_id))
            .map(|i| i.id)
            .collect();
    }

    /// Ids of `kind` this plan removes
    pub fn ids(&self, kind: EntityKind) -> &BTreeSet<RecordId> {
        match kind {
            EntityKind::Customer => &self.customers,
            EntityKind::Device => &self.devices,
            EntityKind::Ticket => &self.tickets,
            EntityKind::Service => &self.services,
            EntityKind::Invoice => &self.invoices,
        }
    }

    /// Remove every planned record from `tx`, children before parents
    pub fn apply(&self, tx: &mut Transaction) -> CascadeReport {
        let mut report = CascadeReport::new(self.root.0, self.root.1);

        for kind in EntityKind::LEAVES_FIRST {
            let ids = self.ids(kind);
            if ids.is_empty() {
                continue;
            }
            let removed = match kind {
                EntityKind::Service => tx.delete_where(|s: &Service| ids.contains(&s.id)),
                EntityKind::Invoice => tx.delete_where(|i: &Invoice| ids.contains(&i.id)),
                EntityKind::Ticket => tx.delete_where(|t: &Ticket| ids.contains(&t.id)),
                EntityKind::Device => tx.delete_where(|d: &Device| ids.contains(&d.id)),
                EntityKind::Customer => tx.delete_where(|c: &Customer| ids.contains(&c.id)),
            };
            report.set(kind, removed);
        }

        report
    }
}

/// What a cascade removed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CascadeReport {
    /// Kind of the record the caller asked to delete
    pub kind: EntityKind,
    /// Id of the record the caller asked to delete
    pub id: RecordId,
    pub customers: usize,
    pub devices: usize,
    pub tickets: usize,
    pub services: usize,
    pub invoices: usize,
}

impl CascadeReport {
    fn new(kind: EntityKind, id: RecordId) -> Self {
        Self {
            kind,
            id,
            customers: 0,
            devices: 0,
            tickets: 0,
            services: 0,
            invoices: 0,
        }
    }

    fn set(&mut self, kind: EntityKind, removed: usize) {
        match kind {
            EntityKind::Customer => self.customers = removed,
            EntityKind::Device => self.devices = removed,
            EntityKind::Ticket => self.tickets = removed,
            EntityKind::Service => self.services = removed,
            EntityKind::Invoice => self.invoices = removed,
        }
    }

    /// Total number of records removed, the root included
    pub fn total(&self) -> usize {
        self.customers + self.devices + self.tickets + self.services + self.invoices
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{PaidStatus, TicketStatus};
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn device(id: RecordId, customer_id: RecordId) -> Device {
        Device {
            id,
            customer_id,
            brand: "Apple".into(),
            model: "iPhone 12".into(),
            serial: String::new(),
            issue: String::new(),
        }
    }

    fn ticket(id: RecordId, device_id: RecordId) -> Ticket {
        Ticket {
            id,
            device_id,
            technician: "Mike Johnson".into(),
            status: TicketStatus::Received,
            created_at: Utc::now(),
        }
    }

    fn service(id: RecordId, ticket_id: RecordId) -> Service {
        Service {
            id,
            ticket_id,
            description: "Labour".into(),
            cost: Decimal::ONE,
        }
    }

    /// Two customers; customer 1 owns devices 1 and 2, customer 2 owns device 3.
    fn tables() -> Tables {
        let customer = |id, name: &str| Customer {
            id,
            name: name.into(),
            phone: String::new(),
            email: String::new(),
            address: String::new(),
        };
        Tables {
            customers: vec![customer(1, "Asha"), customer(2, "Vikram")],
            devices: vec![device(1, 1), device(2, 1), device(3, 2)],
            tickets: vec![ticket(1, 1), ticket(2, 2), ticket(3, 3)],
            services: vec![service(1, 1), service(2, 1), service(3, 2), service(4, 3)],
            invoices: vec![Invoice {
                id: 1,
                ticket_id: 1,
                total_amount: Decimal::TWO,
                paid_status: PaidStatus::Unpaid,
                date: Utc::now(),
                tax_rate: Decimal::ZERO,
                discount: Decimal::ZERO,
            }],
        }
    }

    #[test]
    fn test_customer_plan_is_transitive() {
        let plan = CascadePlan::for_customer(&tables(), 1).unwrap();
        assert_eq!(plan.ids(EntityKind::Device), &BTreeSet::from([1, 2]));
        assert_eq!(plan.ids(EntityKind::Ticket), &BTreeSet::from([1, 2]));
        assert_eq!(plan.ids(EntityKind::Service), &BTreeSet::from([1, 2, 3]));
        assert_eq!(plan.ids(EntityKind::Invoice), &BTreeSet::from([1]));
    }

    #[test]
    fn test_apply_leaves_no_orphans() {
        let tables = tables();
        let plan = CascadePlan::for_customer(&tables, 1).unwrap();
        let mut tx = Transaction::new(tables);
        let report = plan.apply(&mut tx);

        assert_eq!(report.total(), 9);
        assert_eq!((report.kind, report.id), (EntityKind::Customer, 1));
        assert!(tx.tables().orphans().is_empty());
        assert_eq!(tx.tables().devices, vec![device(3, 2)]);
        assert_eq!(tx.tables().services, vec![service(4, 3)]);
    }

    #[test]
    fn test_ticket_without_dependents_removes_only_itself() {
        let mut tables = tables();
        tables.tickets.push(ticket(4, 3));
        let plan = CascadePlan::for_ticket(&tables, 4).unwrap();
        let mut tx = Transaction::new(tables);
        let report = plan.apply(&mut tx);

        assert_eq!(report.tickets, 1);
        assert_eq!(report.total(), 1);
        assert_eq!(
            tx.changed().iter().copied().collect::<Vec<_>>(),
            vec![EntityKind::Ticket]
        );
    }

    #[test]
    fn test_missing_root_is_not_found() {
        let err = CascadePlan::for_device(&tables(), 42).unwrap_err();
        assert!(matches!(
            err,
            ShopError::NotFound {
                kind: EntityKind::Device,
                id: 42
            }
        ));
    }
}
