//! Invoice Calculator
//!
//! The single place an invoice total is derived:
//!
//! ```text
//! subtotal   = Σ costs
//! tax_amount = subtotal × tax_rate / 100
//! total      = max(0, subtotal + tax_amount − discount)
//! ```
//!
//! Arithmetic is exact ([`Decimal`]); rounding only happens when a value is
//! formatted for display.

use crate::core::error::ShopError;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Result of [`compute`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceTotals {
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub total: Decimal,
}

/// Compute invoice totals from service costs, a tax percentage and a discount.
///
/// A discount larger than the taxed subtotal clamps the total to zero; that
/// is a business rule, not an error. Negative inputs are rejected, as are
/// amounts whose sum or product leaves the `Decimal` range.
pub fn compute(
    costs: &[Decimal],
    tax_rate: Decimal,
    discount: Decimal,
) -> Result<InvoiceTotals, ShopError> {
    if let Some(cost) = costs.iter().find(|c| **c < Decimal::ZERO) {
        return Err(ShopError::invalid(
            "cost",
            format!("service cost {} is negative", cost),
        ));
    }
    non_negative("tax_rate", tax_rate)?;
    non_negative("discount", discount)?;

    let subtotal = checked_sum(costs).ok_or_else(|| overflow("cost"))?;
    let tax_amount = subtotal
        .checked_mul(tax_rate)
        .and_then(|taxed| taxed.checked_div(Decimal::ONE_HUNDRED))
        .ok_or_else(|| overflow("tax_rate"))?;
    let total = subtotal
        .checked_add(tax_amount)
        .and_then(|gross| gross.checked_sub(discount))
        .ok_or_else(|| overflow("tax_rate"))?
        .max(Decimal::ZERO);

    Ok(InvoiceTotals {
        subtotal,
        tax_amount,
        total,
    })
}

/// Sum of amounts, `None` past the representable range
pub(crate) fn checked_sum(amounts: &[Decimal]) -> Option<Decimal> {
    amounts
        .iter()
        .try_fold(Decimal::ZERO, |sum, amount| sum.checked_add(*amount))
}

fn overflow(field: &str) -> ShopError {
    ShopError::invalid(field, "amount is too large")
}

fn non_negative(field: &str, value: Decimal) -> Result<Decimal, ShopError> {
    if value < Decimal::ZERO {
        return Err(ShopError::invalid(field, "must not be negative"));
    }
    Ok(value)
}

/// Parse a form-supplied amount.
///
/// Blank input means zero (an untouched tax or discount field). Anything
/// that is not a plain non-negative decimal is `InvalidInput`.
pub fn parse_amount(field: &str, raw: &str) -> Result<Decimal, ShopError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(Decimal::ZERO);
    }

    let value = Decimal::from_str(trimmed)
        .map_err(|_| ShopError::invalid(field, format!("'{}' is not a number", trimmed)))?;
    non_negative(field, value)
}

/// Format an amount for display: symbol prefix, two decimals, half away from zero
pub fn format_currency(amount: Decimal, symbol: &str) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{}{:.2}", symbol, rounded)
}
