//! Invoice arithmetic and receipt rendering

pub mod calculator;
pub mod receipt;

pub use calculator::{InvoiceTotals, compute, format_currency, parse_amount};
pub use receipt::Receipt;
