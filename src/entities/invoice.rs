use crate::core::entity::RecordId;
use crate::core::error::ShopError;
use crate::core::field::FieldValue;
use crate::impl_record;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Payment state of an invoice
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaidStatus {
    Paid,
    #[default]
    Unpaid,
}

impl PaidStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaidStatus::Paid => "Paid",
            PaidStatus::Unpaid => "Unpaid",
        }
    }
}

impl fmt::Display for PaidStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaidStatus {
    type Err = ShopError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "paid" => Ok(PaidStatus::Paid),
            "unpaid" => Ok(PaidStatus::Unpaid),
            other => Err(ShopError::invalid(
                "paid_status",
                format!("'{}' is not one of Paid, Unpaid", other),
            )),
        }
    }
}

impl From<PaidStatus> for FieldValue {
    fn from(value: PaidStatus) -> Self {
        FieldValue::String(value.as_str().to_string())
    }
}

/// The bill for a ticket.
///
/// `tax_rate` (percent) and `discount` (currency) are stored verbatim.
/// `total_amount` is a cached derivation of those two plus the ticket's
/// current services; the shop rewrites it whenever any input changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: RecordId,
    pub ticket_id: RecordId,
    pub total_amount: Decimal,
    pub paid_status: PaidStatus,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub tax_rate: Decimal,
    #[serde(default)]
    pub discount: Decimal,
}

impl_record!(
    Invoice,
    Invoice,
    invoices,
    ticket_id => Ticket,
    [total_amount, paid_status, date, tax_rate, discount]
);

impl Invoice {
    /// The terms this invoice was issued under
    pub fn terms(&self) -> InvoiceTerms {
        InvoiceTerms {
            tax_rate: self.tax_rate,
            discount: self.discount,
            paid_status: self.paid_status,
        }
    }
}

/// User-editable inputs of an invoice
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct InvoiceTerms {
    #[serde(default)]
    pub tax_rate: Decimal,
    #[serde(default)]
    pub discount: Decimal,
    #[serde(default)]
    pub paid_status: PaidStatus,
}

impl InvoiceTerms {
    pub fn new(tax_rate: Decimal, discount: Decimal) -> Self {
        Self {
            tax_rate,
            discount,
            paid_status: PaidStatus::Unpaid,
        }
    }

    pub fn paid(mut self) -> Self {
        self.paid_status = PaidStatus::Paid;
        self
    }
}
