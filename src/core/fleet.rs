//! Fleet registration and maintenance ingestion.
//!
//! This module provides functions for registering vehicles, suppliers and
//! categories and for recording maintenances with their invoices. Totals are
//! recomputed from invoice inputs and checked before anything is written; a
//! maintenance and all of its invoices and lines are inserted in one database
//! transaction.

use crate::{
    core::{
        classifier::{UNITS, normalize_commitment_code, resolve_unit},
        money::{line_total, round_quantity, within_tolerance},
        records::{CategoryKind, InvoiceKind, InvoiceRecord, LineItemRecord},
        validation::{derive_totals, validate_invoice},
    },
    entities::{
        OrganizationalUnit, Supplier, Vehicle, category, invoice, line_item,
        maintenance, organizational_unit, supplier, vehicle,
    },
    errors::{Error, Result},
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{PaginatorTrait, Set, TransactionTrait, prelude::*};
use tracing::{debug, info, instrument, warn};

/// Inserts every department from the static table that is missing from the
/// store. Returns how many rows were added; running it again adds none.
#[instrument(skip(db))]
pub async fn seed_organizational_units(db: &DatabaseConnection) -> Result<usize> {
    let mut inserted = 0;
    for unit in &UNITS {
        if OrganizationalUnit::find_by_id(unit.code4.to_string())
            .one(db)
            .await?
            .is_some()
        {
            continue;
        }
        organizational_unit::ActiveModel {
            code: Set(unit.code4.to_string()),
            abbreviation: Set(unit.abbreviation.to_string()),
            name: Set(unit.name.to_string()),
            active: Set(true),
        }
        .insert(db)
        .await?;
        inserted += 1;
    }
    info!(inserted, "Organizational units seeded");
    Ok(inserted)
}

/// Uppercases a plate and strips everything but ASCII letters and digits.
#[must_use]
pub fn normalize_plate(input: &str) -> String {
    input
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Keeps only the digits of a CNPJ.
#[must_use]
pub fn clean_cnpj(input: &str) -> String {
    input.chars().filter(char::is_ascii_digit).collect()
}

/// Formats a CNPJ as `12.345.678/0001-90`; `None` unless it has 14 digits.
#[must_use]
pub fn format_cnpj(input: &str) -> Option<String> {
    let digits = clean_cnpj(input);
    if digits.len() != 14 {
        return None;
    }
    Some(format!(
        "{}.{}.{}/{}-{}",
        &digits[0..2],
        &digits[2..5],
        &digits[5..8],
        &digits[8..12],
        &digits[12..14]
    ))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Fields for a new vehicle.
#[derive(Debug, Clone, Default)]
pub struct NewVehicle {
    /// License plate in any formatting
    pub plate: String,
    /// Model name
    pub model: String,
    /// Manufacturer
    pub make: Option<String>,
    /// Manufacture year
    pub manufacture_year: Option<i32>,
    /// Department code to assign
    pub unit_code: Option<String>,
    /// Asset tag
    pub asset_tag: Option<String>,
}

/// Registers a vehicle. The plate is normalized and must be unique; an
/// assigned department must exist.
#[instrument(skip(db, new), fields(plate = %new.plate))]
pub async fn register_vehicle(db: &DatabaseConnection, new: NewVehicle) -> Result<vehicle::Model> {
    let plate = normalize_plate(&new.plate);
    if plate.is_empty() || new.model.trim().is_empty() {
        return Err(Error::invalid_input("plate and model are required"));
    }

    if Vehicle::find()
        .filter(vehicle::Column::Plate.eq(plate.as_str()))
        .one(db)
        .await?
        .is_some()
    {
        return Err(Error::invalid_input(format!("plate {plate} already registered")));
    }

    let unit_code = non_blank(new.unit_code);
    if let Some(code) = &unit_code {
        OrganizationalUnit::find_by_id(code.clone())
            .one(db)
            .await?
            .ok_or_else(|| Error::NotFound {
                entity: "organizational unit",
                id: code.clone(),
            })?;
    }

    let model = vehicle::ActiveModel {
        plate: Set(plate),
        model: Set(new.model.trim().to_string()),
        make: Set(non_blank(new.make)),
        manufacture_year: Set(new.manufacture_year),
        unit_code: Set(unit_code),
        asset_tag: Set(non_blank(new.asset_tag)),
        active: Set(true),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    debug!(id = model.id, "Vehicle registered");
    Ok(model)
}

/// Number of active vehicles (dashboard KPI).
pub async fn count_active_vehicles(db: &DatabaseConnection) -> Result<u64> {
    Vehicle::find()
        .filter(vehicle::Column::Active.eq(true))
        .count(db)
        .await
        .map_err(Into::into)
}

/// Fields for a new supplier.
#[derive(Debug, Clone, Default)]
pub struct NewSupplier {
    /// CNPJ in any formatting
    pub cnpj: String,
    /// Registered legal name
    pub legal_name: String,
    /// Trade name
    pub trade_name: Option<String>,
    /// City
    pub city: Option<String>,
    /// Two-letter state code
    pub state: Option<String>,
    /// Contact phone
    pub phone: Option<String>,
    /// Contact email
    pub email: Option<String>,
}

/// Registers a supplier. The CNPJ must have 14 digits and be unique.
#[instrument(skip(db, new))]
pub async fn register_supplier(
    db: &DatabaseConnection,
    new: NewSupplier,
) -> Result<supplier::Model> {
    let cnpj = clean_cnpj(&new.cnpj);
    if cnpj.len() != 14 {
        return Err(Error::invalid_input("CNPJ must have 14 digits"));
    }
    if new.legal_name.trim().is_empty() {
        return Err(Error::invalid_input("legal name is required"));
    }

    if Supplier::find()
        .filter(supplier::Column::Cnpj.eq(cnpj.as_str()))
        .one(db)
        .await?
        .is_some()
    {
        return Err(Error::invalid_input(format!("CNPJ {cnpj} already registered")));
    }

    supplier::ActiveModel {
        cnpj: Set(cnpj),
        legal_name: Set(new.legal_name.trim().to_string()),
        trade_name: Set(non_blank(new.trade_name)),
        city: Set(non_blank(new.city)),
        state: Set(non_blank(new.state).map(|s| s.to_uppercase())),
        phone: Set(non_blank(new.phone)),
        email: Set(non_blank(new.email)),
        active: Set(true),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Registers a line-item category.
pub async fn register_category(
    db: &DatabaseConnection,
    name: &str,
    kind: CategoryKind,
) -> Result<category::Model> {
    if name.trim().is_empty() {
        return Err(Error::invalid_input("category name is required"));
    }
    category::ActiveModel {
        name: Set(name.trim().to_string()),
        kind: Set(kind.as_str().to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// One invoice line to record.
#[derive(Debug, Clone)]
pub struct NewLineItem {
    /// What was bought or done
    pub description: String,
    /// Supplier's product code
    pub product_code: Option<String>,
    /// Unit of measure; defaults to `"UN"`
    pub unit: Option<String>,
    /// Quantity
    pub quantity: Decimal,
    /// Price per unit
    pub unit_price: Decimal,
    /// Caller-computed total; recomputed when absent, checked when present
    pub line_total: Option<Decimal>,
    /// Reporting category
    pub category_id: Option<i64>,
}

/// One invoice to record.
#[derive(Debug, Clone)]
pub struct NewInvoice {
    /// Parts or services
    pub kind: InvoiceKind,
    /// Invoice number
    pub number: String,
    /// Series
    pub series: Option<String>,
    /// Electronic access key
    pub access_key: Option<String>,
    /// Issue date
    pub issue_date: NaiveDate,
    /// Value before discount; the sum of line totals when absent
    pub gross_value: Option<Decimal>,
    /// Discount granted
    pub discount: Decimal,
    /// `gross_value - discount` when absent, checked when present
    pub net_value: Option<Decimal>,
    /// Lines
    pub items: Vec<NewLineItem>,
}

/// A maintenance to record.
#[derive(Debug, Clone)]
pub struct NewMaintenance {
    /// Serviced vehicle
    pub vehicle_id: i64,
    /// Supplier
    pub supplier_id: i64,
    /// Date of the maintenance
    pub date: NaiveDate,
    /// Commitment code as typed
    pub commitment_code: Option<String>,
    /// Description
    pub description: Option<String>,
    /// Invoices
    pub invoices: Vec<NewInvoice>,
}

fn resolve_invoice(new: &NewInvoice) -> Result<InvoiceRecord> {
    if new.number.trim().is_empty() {
        return Err(Error::invalid_input("invoice number is required"));
    }

    let items = new
        .items
        .iter()
        .map(|item| {
            if item.description.trim().is_empty() {
                return Err(Error::invalid_input(format!(
                    "invoice {}: line description is required",
                    new.number
                )));
            }
            let quantity = round_quantity(item.quantity);
            let unit_price = round_quantity(item.unit_price);
            Ok(LineItemRecord {
                description: item.description.trim().to_string(),
                quantity,
                unit_price,
                line_total: item
                    .line_total
                    .unwrap_or_else(|| line_total(quantity, unit_price)),
                category: None,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let lines_total: Decimal = items.iter().map(|i| i.line_total).sum();
    let gross_value = match new.gross_value {
        Some(gross) if !items.is_empty() && !within_tolerance(gross, lines_total) => {
            return Err(Error::Validation {
                field: "invoice.gross_value".to_string(),
                expected: lines_total,
                actual: gross,
            });
        }
        Some(gross) => gross,
        None if !items.is_empty() => lines_total,
        None => {
            return Err(Error::invalid_input(format!(
                "invoice {} needs a gross value or at least one line",
                new.number
            )));
        }
    };

    let record = InvoiceRecord {
        kind: new.kind,
        number: new.number.trim().to_string(),
        gross_value,
        discount: new.discount,
        net_value: new.net_value.unwrap_or(gross_value - new.discount),
        items,
    };
    validate_invoice(&record)?;
    Ok(record)
}

/// Records a maintenance with its invoices and lines.
///
/// Invoices are validated and the maintenance totals derived from their net
/// values before the transaction starts. When the commitment code resolves to
/// a department, that department is assigned to the vehicle.
#[instrument(skip(db, new), fields(vehicle_id = new.vehicle_id, date = %new.date))]
pub async fn create_maintenance(
    db: &DatabaseConnection,
    new: NewMaintenance,
) -> Result<maintenance::Model> {
    let commitment_code = new
        .commitment_code
        .as_deref()
        .and_then(normalize_commitment_code);
    let invoices = new
        .invoices
        .iter()
        .map(resolve_invoice)
        .collect::<Result<Vec<_>>>()?;
    let totals = derive_totals(&invoices);

    let txn = db.begin().await?;

    let vehicle = Vehicle::find_by_id(new.vehicle_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::NotFound {
            entity: "vehicle",
            id: new.vehicle_id.to_string(),
        })?;
    Supplier::find_by_id(new.supplier_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::NotFound {
            entity: "supplier",
            id: new.supplier_id.to_string(),
        })?;

    let now = Utc::now().naive_utc();
    let created = maintenance::ActiveModel {
        vehicle_id: Set(new.vehicle_id),
        supplier_id: Set(new.supplier_id),
        date: Set(new.date),
        commitment_code: Set(commitment_code.clone()),
        description: Set(non_blank(new.description)),
        total_parts: Set(totals.parts),
        total_services: Set(totals.services),
        total: Set(totals.total),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    for (source, record) in new.invoices.iter().zip(&invoices) {
        let inserted = invoice::ActiveModel {
            maintenance_id: Set(created.id),
            kind: Set(record.kind.as_str().to_string()),
            number: Set(record.number.clone()),
            series: Set(non_blank(source.series.clone())),
            access_key: Set(non_blank(source.access_key.clone())),
            issue_date: Set(source.issue_date),
            gross_value: Set(record.gross_value),
            discount: Set(record.discount),
            net_value: Set(record.net_value),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        for (item_source, item) in source.items.iter().zip(&record.items) {
            line_item::ActiveModel {
                invoice_id: Set(inserted.id),
                description: Set(item.description.clone()),
                product_code: Set(non_blank(item_source.product_code.clone())),
                unit: Set(non_blank(item_source.unit.clone()).unwrap_or_else(|| "UN".to_string())),
                quantity: Set(item.quantity),
                unit_price: Set(item.unit_price),
                line_total: Set(item.line_total),
                category_id: Set(item_source.category_id),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
        }
    }

    if let Some(unit) = commitment_code.as_deref().and_then(resolve_unit) {
        if OrganizationalUnit::find_by_id(unit.code4.to_string())
            .one(&txn)
            .await?
            .is_some()
        {
            let mut active: vehicle::ActiveModel = vehicle.into();
            active.unit_code = Set(Some(unit.code4.to_string()));
            active.update(&txn).await?;
            debug!(unit = unit.abbreviation, "Vehicle assigned from commitment code");
        } else {
            warn!(code = unit.code4, "Department not seeded; vehicle left unassigned");
        }
    }

    txn.commit().await?;

    info!(
        id = created.id,
        total = %created.total,
        invoices = invoices.len(),
        "Maintenance recorded"
    );
    Ok(created)
}
