//! Shared test utilities for the fleet maintenance engine.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{
        fleet::{
            self, NewInvoice, NewLineItem, NewMaintenance, NewSupplier, NewVehicle,
            seed_organizational_units,
        },
        records::InvoiceKind,
    },
    entities,
    errors::Result,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized and
/// the department table seeded.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    seed_organizational_units(&db).await?;
    Ok(db)
}

/// Shorthand for a calendar date; panics on an invalid date.
#[allow(clippy::unwrap_used)]
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Creates a test vehicle.
///
/// # Defaults
/// * `model`: "Gol"
pub async fn create_test_vehicle(
    db: &DatabaseConnection,
    plate: &str,
    unit_code: Option<&str>,
) -> Result<entities::vehicle::Model> {
    fleet::register_vehicle(
        db,
        NewVehicle {
            plate: plate.to_string(),
            model: "Gol".to_string(),
            unit_code: unit_code.map(str::to_string),
            ..Default::default()
        },
    )
    .await
}

/// Creates a test supplier.
///
/// # Defaults
/// * `legal_name`: "Silva Peças LTDA"
pub async fn create_test_supplier(
    db: &DatabaseConnection,
    cnpj: &str,
    trade_name: Option<&str>,
) -> Result<entities::supplier::Model> {
    fleet::register_supplier(
        db,
        NewSupplier {
            cnpj: cnpj.to_string(),
            legal_name: "Silva Peças LTDA".to_string(),
            trade_name: trade_name.map(str::to_string),
            ..Default::default()
        },
    )
    .await
}

/// Builds an invoice from `(quantity, unit_price)` lines. Gross and net are
/// left for ingestion to derive.
pub fn test_invoice(kind: InvoiceKind, lines: &[(i64, i64)], discount: i64) -> NewInvoice {
    NewInvoice {
        kind,
        number: "1".to_string(),
        series: None,
        access_key: None,
        issue_date: date(2024, 3, 15),
        gross_value: None,
        discount: Decimal::from(discount),
        net_value: None,
        items: lines
            .iter()
            .map(|&(quantity, unit_price)| NewLineItem {
                description: "Item de teste".to_string(),
                product_code: None,
                unit: None,
                quantity: Decimal::from(quantity),
                unit_price: Decimal::from(unit_price),
                line_total: None,
                category_id: None,
            })
            .collect(),
    }
}

/// Records a maintenance with a single one-line parts invoice worth `amount`.
pub async fn create_test_maintenance(
    db: &DatabaseConnection,
    vehicle_id: i64,
    supplier_id: i64,
    on: NaiveDate,
    commitment_code: Option<&str>,
    amount: i64,
) -> Result<entities::maintenance::Model> {
    fleet::create_maintenance(
        db,
        NewMaintenance {
            vehicle_id,
            supplier_id,
            date: on,
            commitment_code: commitment_code.map(str::to_string),
            description: None,
            invoices: vec![test_invoice(InvoiceKind::Parts, &[(1, amount)], 0)],
        },
    )
    .await
}

/// Sets up a complete test environment with one vehicle and one supplier.
/// Returns (db, vehicle, supplier) for maintenance tests.
pub async fn setup_with_fleet() -> Result<(
    DatabaseConnection,
    entities::vehicle::Model,
    entities::supplier::Model,
)> {
    let db = setup_test_db().await?;
    let vehicle = create_test_vehicle(&db, "QBX-1A23", None).await?;
    let supplier = create_test_supplier(&db, "12.345.678/0001-90", Some("Auto Center")).await?;
    Ok((db, vehicle, supplier))
}
