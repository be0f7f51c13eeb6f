//! Monetary invariants checked at the ingestion boundary.
//!
//! Totals supplied by callers are recomputed from their inputs and rejected
//! when they drift by more than one cent.

use crate::{
    core::{
        money::{line_total, within_tolerance},
        records::{InvoiceKind, InvoiceRecord, LineItemRecord, MaintenanceRecord},
    },
    errors::{Error, Result},
};
use rust_decimal::Decimal;

/// Parts/services totals derived from a maintenance's invoices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RecordTotals {
    /// Sum of net values of parts invoices
    pub parts: Decimal,
    /// Sum of net values of services invoices
    pub services: Decimal,
    /// `parts + services`
    pub total: Decimal,
}

fn check(field: &str, expected: Decimal, actual: Decimal) -> Result<()> {
    if within_tolerance(expected, actual) {
        Ok(())
    } else {
        Err(Error::Validation {
            field: field.to_string(),
            expected,
            actual,
        })
    }
}

fn non_negative(field: &str, value: Decimal) -> Result<()> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(Error::invalid_input(format!("{field} cannot be negative: {value}")));
    }
    Ok(())
}

/// Checks `line_total == round_cents(quantity * unit_price)`.
pub fn validate_line_item(item: &LineItemRecord) -> Result<()> {
    non_negative("line_item.quantity", item.quantity)?;
    non_negative("line_item.unit_price", item.unit_price)?;
    check(
        "line_item.line_total",
        line_total(item.quantity, item.unit_price),
        item.line_total,
    )
}

/// Checks `net_value == gross_value - discount` and every line item.
pub fn validate_invoice(invoice: &InvoiceRecord) -> Result<()> {
    non_negative("invoice.gross_value", invoice.gross_value)?;
    non_negative("invoice.discount", invoice.discount)?;
    if invoice.discount > invoice.gross_value {
        return Err(Error::invalid_input(format!(
            "invoice {} discount {} exceeds gross value {}",
            invoice.number, invoice.discount, invoice.gross_value
        )));
    }
    check(
        "invoice.net_value",
        invoice.gross_value - invoice.discount,
        invoice.net_value,
    )?;
    invoice.items.iter().try_for_each(validate_line_item)
}

/// Sums invoice net values into the parts and services buckets.
#[must_use]
pub fn derive_totals(invoices: &[InvoiceRecord]) -> RecordTotals {
    let (parts, services) =
        invoices
            .iter()
            .fold((Decimal::ZERO, Decimal::ZERO), |(p, s), inv| match inv.kind {
                InvoiceKind::Parts => (p + inv.net_value, s),
                InvoiceKind::Services => (p, s + inv.net_value),
            });
    RecordTotals {
        parts,
        services,
        total: parts + services,
    }
}

/// Validates a full record: invoices, the `total == parts + services`
/// invariant and, when invoices are attached, agreement between the stored
/// totals and the ones derived from them.
pub fn validate_record(record: &MaintenanceRecord) -> Result<()> {
    record.invoices.iter().try_for_each(validate_invoice)?;

    check(
        "maintenance.total",
        record.total_parts + record.total_services,
        record.total,
    )?;

    if !record.invoices.is_empty() {
        let derived = derive_totals(&record.invoices);
        check("maintenance.total_parts", derived.parts, record.total_parts)?;
        check(
            "maintenance.total_services",
            derived.services,
            record.total_services,
        )?;
    }
    Ok(())
}
