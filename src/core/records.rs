//! Denormalized maintenance records as they leave the store.
//!
//! These are the shapes the aggregator consumes: each maintenance carries its
//! vehicle, supplier, invoices and line items already joined. Missing amounts
//! deserialize as zero and missing references as `None`.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Which rollup bucket an invoice's net value feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceKind {
    /// Parts and products ("peça")
    Parts,
    /// Labour and services ("serviço")
    Services,
}

impl InvoiceKind {
    /// Storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Parts => "parts",
            Self::Services => "services",
        }
    }

    /// Parses the storage representation.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "parts" => Some(Self::Parts),
            "services" => Some(Self::Services),
            _ => None,
        }
    }
}

/// Reporting tag on a line-item category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryKind {
    /// Used for parts only
    Parts,
    /// Used for services only
    Services,
    /// Used for either
    Both,
}

impl CategoryKind {
    /// Storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Parts => "parts",
            Self::Services => "services",
            Self::Both => "both",
        }
    }

    /// Parses the storage representation.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "parts" => Some(Self::Parts),
            "services" => Some(Self::Services),
            "both" => Some(Self::Both),
            _ => None,
        }
    }
}

/// Department assigned to a vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitRef {
    /// Short display code
    pub abbreviation: String,
    /// Full display name
    pub name: String,
}

/// Vehicle display fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleRef {
    /// License plate, normalized
    pub plate: String,
    /// Model name
    #[serde(default)]
    pub model: String,
    /// Assigned department, when known
    #[serde(default)]
    pub unit: Option<UnitRef>,
}

/// Supplier display fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierRef {
    /// Tax id; identifies the supplier in rollups
    #[serde(default)]
    pub cnpj: Option<String>,
    /// Trade name ("nome fantasia")
    #[serde(default)]
    pub trade_name: Option<String>,
    /// Registered legal name ("razão social")
    pub legal_name: String,
}

impl SupplierRef {
    /// Grouping key: the CNPJ when known, otherwise the display name.
    #[must_use]
    pub fn key(&self) -> &str {
        self.cnpj
            .as_deref()
            .filter(|cnpj| !cnpj.is_empty())
            .unwrap_or_else(|| self.display_name())
    }

    /// The trade name when it is present and non-blank, otherwise the legal name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.trade_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.legal_name)
    }
}

/// Category attached to a line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    /// Display name
    pub name: String,
    /// Reporting tag
    pub kind: CategoryKind,
}

/// One line of an invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItemRecord {
    /// What was bought or done
    #[serde(default)]
    pub description: String,
    /// Quantity
    #[serde(default)]
    pub quantity: Decimal,
    /// Price per unit
    #[serde(default)]
    pub unit_price: Decimal,
    /// `round_cents(quantity * unit_price)`
    #[serde(default)]
    pub line_total: Decimal,
    /// Optional reporting category
    #[serde(default)]
    pub category: Option<CategoryRef>,
}

/// A fiscal invoice ("nota fiscal") attached to a maintenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    /// Parts or services
    pub kind: InvoiceKind,
    /// Invoice number
    #[serde(default)]
    pub number: String,
    /// Value before discount
    #[serde(default)]
    pub gross_value: Decimal,
    /// Discount granted
    #[serde(default)]
    pub discount: Decimal,
    /// `gross_value - discount`
    #[serde(default)]
    pub net_value: Decimal,
    /// Invoice lines
    #[serde(default)]
    pub items: Vec<LineItemRecord>,
}

/// One maintenance event with its joined references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceRecord {
    /// Store identifier
    #[serde(default)]
    pub id: i64,
    /// Local calendar date of the maintenance
    pub date: NaiveDate,
    /// Commitment code ("empenho"), uppercase
    #[serde(default)]
    pub commitment_code: Option<String>,
    /// Free-text description
    #[serde(default)]
    pub description: Option<String>,
    /// Vehicle, when joined
    #[serde(default)]
    pub vehicle: Option<VehicleRef>,
    /// Supplier, when joined
    #[serde(default)]
    pub supplier: Option<SupplierRef>,
    /// Net value of parts invoices
    #[serde(default)]
    pub total_parts: Decimal,
    /// Net value of services invoices
    #[serde(default)]
    pub total_services: Decimal,
    /// `total_parts + total_services`
    #[serde(default)]
    pub total: Decimal,
    /// Invoices, when requested
    #[serde(default)]
    pub invoices: Vec<InvoiceRecord>,
}

impl MaintenanceRecord {
    /// Case-insensitive substring search over the fields shown in list views:
    /// plate, model, supplier names, commitment code and description.
    #[must_use]
    pub fn matches_search(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }

        let contains = |field: &str| field.to_lowercase().contains(&query);

        let vehicle_hit = self
            .vehicle
            .as_ref()
            .is_some_and(|v| contains(&v.plate) || contains(&v.model));
        let supplier_hit = self.supplier.as_ref().is_some_and(|s| {
            contains(&s.legal_name) || s.trade_name.as_deref().is_some_and(contains)
        });

        vehicle_hit
            || supplier_hit
            || self.commitment_code.as_deref().is_some_and(contains)
            || self.description.as_deref().is_some_and(contains)
    }
}

/// Inclusive calendar range used to scope a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// First day included
    pub start: NaiveDate,
    /// Last day included
    pub end: NaiveDate,
}

impl DateRange {
    /// Builds a range, rejecting `start > end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> crate::errors::Result<Self> {
        if start > end {
            return Err(crate::errors::Error::invalid_input(format!(
                "date range start {start} is after end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// True when `date` falls inside the range.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}
