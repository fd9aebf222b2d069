//! Printable receipt for an invoice
//!
//! A [`Receipt`] is assembled from live records, so its amounts always come
//! from the current service lines rather than the stored `total_amount`.

use crate::billing::calculator::{self, InvoiceTotals, format_currency};
use crate::config::BillingConfig;
use crate::core::entity::{Record, RecordId};
use crate::core::error::ShopError;
use crate::core::store::Tables;
use crate::entities::{Customer, Device, Invoice, Service, Ticket};
use serde::Serialize;
use tera::{Context, Tera};

const TEMPLATE: &str = r#"{{ shop_name }}
{{ tagline }}

Invoice #: {{ invoice_id }}
Date: {{ date }}
Status: {{ status }}

Bill To:
  {{ customer.name }}
{%- if customer.address %}
  {{ customer.address }}
{%- endif %}
{%- if customer.phone %}
  Phone: {{ customer.phone }}
{%- endif %}
{%- if customer.email %}
  Email: {{ customer.email }}
{%- endif %}

Device Information:
  Device: {{ device.brand }} {{ device.model }}
{%- if device.serial %}
  Serial Number: {{ device.serial }}
{%- endif %}
{%- if device.issue %}
  Issue: {{ device.issue }}
{%- endif %}
  Technician: {{ technician }}

Services:
{%- for line in lines %}
  {{ line.description }}  {{ line.amount }}
{%- endfor %}

  Subtotal  {{ subtotal }}
  Tax ({{ tax_rate }}%)  {{ tax_amount }}
  Discount  -{{ discount }}
  Total  {{ total }}

Thank you for choosing our services!
For any queries, please contact us at {{ support_email }}
"#;

#[derive(Debug, Serialize)]
struct Line {
    description: String,
    amount: String,
}

/// Everything printed on a receipt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Receipt {
    pub invoice: Invoice,
    pub ticket: Ticket,
    pub device: Device,
    pub customer: Customer,
    pub services: Vec<Service>,
    pub totals: InvoiceTotals,
}

fn lookup<R: Record>(tables: &Tables, id: RecordId) -> Result<R, ShopError> {
    tables
        .get::<R>(id)
        .cloned()
        .ok_or_else(|| ShopError::not_found(R::KIND, id))
}

impl Receipt {
    /// Gather the invoice and its ticket, device, customer and services
    pub fn build(tables: &Tables, invoice_id: RecordId) -> Result<Self, ShopError> {
        let invoice: Invoice = lookup(tables, invoice_id)?;
        let ticket: Ticket = lookup(tables, invoice.ticket_id)?;
        let device: Device = lookup(tables, ticket.device_id)?;
        let customer: Customer = lookup(tables, device.customer_id)?;

        let services: Vec<Service> = tables
            .services
            .iter()
            .filter(|s| s.ticket_id == ticket.id)
            .cloned()
            .collect();
        let costs: Vec<_> = services.iter().map(|s| s.cost).collect();
        let totals = calculator::compute(&costs, invoice.tax_rate, invoice.discount)?;

        Ok(Self {
            invoice,
            ticket,
            device,
            customer,
            services,
            totals,
        })
    }

    /// Render the receipt as plain text
    pub fn render_text(&self, billing: &BillingConfig) -> Result<String, ShopError> {
        let symbol = billing.currency_symbol.as_str();
        let lines: Vec<Line> = self
            .services
            .iter()
            .map(|s| Line {
                description: s.description.clone(),
                amount: format_currency(s.cost, symbol),
            })
            .collect();

        let mut context = Context::new();
        context.insert("shop_name", &billing.shop_name);
        context.insert("tagline", &billing.tagline);
        context.insert("support_email", &billing.support_email);
        context.insert("invoice_id", &self.invoice.id);
        context.insert("date", &self.invoice.date.format("%B %d, %Y").to_string());
        context.insert("status", self.invoice.paid_status.as_str());
        context.insert("customer", &self.customer);
        context.insert("device", &self.device);
        context.insert("technician", &self.ticket.technician);
        context.insert("lines", &lines);
        context.insert("subtotal", &format_currency(self.totals.subtotal, symbol));
        context.insert("tax_rate", &self.invoice.tax_rate.normalize().to_string());
        context.insert("tax_amount", &format_currency(self.totals.tax_amount, symbol));
        context.insert("discount", &format_currency(self.invoice.discount, symbol));
        context.insert("total", &format_currency(self.totals.total, symbol));

        Ok(Tera::one_off(TEMPLATE, &context, false)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entity::EntityKind;
    use crate::entities::{InvoiceTerms, PaidStatus, TicketStatus};
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn tables() -> Tables {
        let date = Utc.with_ymd_and_hms(2024, 3, 5, 10, 30, 0).unwrap();
        Tables {
            customers: vec![Customer {
                id: 1,
                name: "Anita Rao".into(),
                phone: "98450 12345".into(),
                email: "anita@example.com".into(),
                address: String::new(),
            }],
            devices: vec![Device {
                id: 1,
                customer_id: 1,
                brand: "Samsung".into(),
                model: "Galaxy S21".into(),
                serial: "R58N12".into(),
                issue: "Cracked screen".into(),
            }],
            tickets: vec![Ticket {
                id: 1,
                device_id: 1,
                technician: "Jane Smith".into(),
                status: TicketStatus::Completed,
                created_at: date,
            }],
            services: vec![
                Service {
                    id: 1,
                    ticket_id: 1,
                    description: "Screen replacement".into(),
                    cost: dec!(500.00),
                },
                Service {
                    id: 2,
                    ticket_id: 1,
                    description: "Battery".into(),
                    cost: dec!(250.50),
                },
            ],
            invoices: vec![Invoice {
                id: 1,
                ticket_id: 1,
                // Deliberately stale; the receipt must not trust it
                total_amount: dec!(1),
                paid_status: PaidStatus::Paid,
                date,
                tax_rate: dec!(18),
                discount: dec!(50),
            }],
        }
    }

    #[test]
    fn test_build_recomputes_from_services() {
        let receipt = Receipt::build(&tables(), 1).unwrap();
        assert_eq!(receipt.totals.total, dec!(835.59));
        assert_eq!(receipt.services.len(), 2);
        assert_eq!(receipt.invoice.terms(), InvoiceTerms::new(dec!(18), dec!(50)).paid());
    }

    #[test]
    fn test_build_missing_invoice() {
        let err = Receipt::build(&tables(), 9).unwrap_err();
        assert!(matches!(
            err,
            ShopError::NotFound {
                kind: EntityKind::Invoice,
                id: 9
            }
        ));
    }

    #[test]
    fn test_render_text() {
        let text = Receipt::build(&tables(), 1)
            .unwrap()
            .render_text(&BillingConfig::default())
            .unwrap();

        assert!(text.starts_with("Repair Center\nProfessional Device Repair Services"));
        assert!(text.contains("Invoice #: 1"));
        assert!(text.contains("Date: March 05, 2024"));
        assert!(text.contains("Status: Paid"));
        assert!(text.contains("Phone: 98450 12345"));
        assert!(!text.contains("Email: \n"));
        assert!(text.contains("Device: Samsung Galaxy S21"));
        assert!(text.contains("Screen replacement  ₹500.00"));
        assert!(text.contains("Subtotal  ₹750.50"));
        assert!(text.contains("Tax (18%)  ₹135.09"));
        assert!(text.contains("Discount  -₹50.00"));
        assert!(text.contains("Total  ₹835.59"));
        assert!(text.contains("support@repaircenter.com"));
    }

    #[test]
    fn test_render_does_not_escape() {
        let mut tables = tables();
        tables.customers[0].name = "Rao & Sons <Ltd>".into();
        let text = Receipt::build(&tables, 1)
            .unwrap()
            .render_text(&BillingConfig::default())
            .unwrap();
        assert!(text.contains("Rao & Sons <Ltd>"));
    }
}
