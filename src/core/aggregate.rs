//! Cost aggregation over maintenance records.
//!
//! Every function here is a pure reduction over a slice of records already
//! fetched in full. The dashboard and the report screens call the same
//! functions with different scopes (all-time or a date range), so department
//! and supplier totals always agree with the KPI summary.

use crate::core::{
    classifier::resolve_unit,
    records::{DateRange, MaintenanceRecord},
};
use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// Code and display name of the catch-all bucket for unresolved groups.
pub const UNCLASSIFIED: &str = "OUTROS";

/// Number of rows shown in bounded rollup tables.
pub const DEFAULT_TOP_N: usize = 10;

/// Headline figures for a record set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct KpiSummary {
    /// Sum of record totals
    pub total_cost: Decimal,
    /// Sum of parts totals
    pub total_parts: Decimal,
    /// Sum of services totals
    pub total_services: Decimal,
    /// Number of records, including zero-value ones
    pub count: usize,
    /// `total_cost / count`, or zero for an empty set
    pub average_ticket: Decimal,
}

impl KpiSummary {
    /// Parts as a percentage of total cost (zero when there is no cost).
    #[must_use]
    pub fn parts_share(&self) -> Decimal {
        percentage(self.total_parts, self.total_cost)
    }

    /// Services as a percentage of total cost (zero when there is no cost).
    #[must_use]
    pub fn services_share(&self) -> Decimal {
        percentage(self.total_services, self.total_cost)
    }
}

fn percentage(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        Decimal::ZERO
    } else {
        part / whole * Decimal::ONE_HUNDRED
    }
}

/// Computes the KPI summary. An empty set yields all zeros.
#[must_use]
pub fn kpi_summary(records: &[MaintenanceRecord]) -> KpiSummary {
    let mut summary = records.iter().fold(KpiSummary::default(), |mut acc, r| {
        acc.total_cost += r.total;
        acc.total_parts += r.total_parts;
        acc.total_services += r.total_services;
        acc.count += 1;
        acc
    });
    if summary.count > 0 {
        summary.average_ticket = summary.total_cost / Decimal::from(summary.count);
    }
    summary
}

/// One row of a grouped cost table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RollupEntry {
    /// Grouping key (unit abbreviation, supplier name or category name)
    pub code: String,
    /// Human-facing label
    pub display_name: String,
    /// Summed cost of the group
    pub total_cost: Decimal,
    /// Number of records (or line items) in the group
    pub count: usize,
}

/// Department a record is attributed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Department {
    /// Unit abbreviation, or [`UNCLASSIFIED`]
    pub code: String,
    /// Unit name, or [`UNCLASSIFIED`]
    pub name: String,
}

impl Department {
    fn unclassified() -> Self {
        Self {
            code: UNCLASSIFIED.to_string(),
            name: UNCLASSIFIED.to_string(),
        }
    }

    /// True for the catch-all bucket.
    #[must_use]
    pub fn is_unclassified(&self) -> bool {
        self.code == UNCLASSIFIED
    }
}

/// Attributes a record to a department: the vehicle's assigned unit first,
/// then the unit encoded in the commitment code, then [`UNCLASSIFIED`].
#[must_use]
pub fn resolve_department(record: &MaintenanceRecord) -> Department {
    if let Some(unit) = record.vehicle.as_ref().and_then(|v| v.unit.as_ref()) {
        return Department {
            code: unit.abbreviation.clone(),
            name: unit.name.clone(),
        };
    }
    record
        .commitment_code
        .as_deref()
        .and_then(resolve_unit)
        .map_or_else(Department::unclassified, |unit| Department {
            code: unit.abbreviation.to_string(),
            name: unit.name.to_string(),
        })
}

#[derive(Default)]
struct Group {
    display_name: String,
    total_cost: Decimal,
    count: usize,
}

fn into_sorted_entries(groups: BTreeMap<String, Group>) -> Vec<RollupEntry> {
    let mut entries: Vec<RollupEntry> = groups
        .into_iter()
        .map(|(code, g)| RollupEntry {
            code,
            display_name: g.display_name,
            total_cost: g.total_cost,
            count: g.count,
        })
        .collect();
    entries.sort_by(|a, b| {
        b.total_cost
            .cmp(&a.total_cost)
            .then_with(|| a.code.cmp(&b.code))
    });
    entries
}

fn add_to_group(
    groups: &mut BTreeMap<String, Group>,
    code: String,
    display_name: &str,
    amount: Decimal,
) {
    let group = groups.entry(code).or_insert_with(|| Group {
        display_name: display_name.to_string(),
        ..Group::default()
    });
    group.total_cost += amount;
    group.count += 1;
}

/// Groups record totals by department, largest cost first.
///
/// Records that resolve to no department land in the [`UNCLASSIFIED`] bucket,
/// so the rollup always sums to [`KpiSummary::total_cost`].
#[must_use]
pub fn department_rollup(records: &[MaintenanceRecord]) -> Vec<RollupEntry> {
    let mut groups = BTreeMap::new();
    for record in records {
        let dept = resolve_department(record);
        add_to_group(&mut groups, dept.code, &dept.name, record.total);
    }
    into_sorted_entries(groups)
}

/// Groups record totals by supplier, largest cost first.
///
/// Suppliers are told apart by CNPJ and labelled with their display name, so
/// two suppliers sharing a trade name stay in separate rows. Records without a
/// supplier land in [`UNCLASSIFIED`].
#[must_use]
pub fn supplier_rollup(records: &[MaintenanceRecord]) -> Vec<RollupEntry> {
    let mut groups = BTreeMap::new();
    for record in records {
        match &record.supplier {
            Some(s) => add_to_group(&mut groups, s.key().to_string(), s.display_name(), record.total),
            None => add_to_group(&mut groups, UNCLASSIFIED.to_string(), UNCLASSIFIED, record.total),
        }
    }
    into_sorted_entries(groups)
}

/// Line-item totals grouped by category name, largest first. Items without a
/// category are grouped under [`UNCLASSIFIED`]; `count` is the number of items.
#[must_use]
pub fn category_breakdown(records: &[MaintenanceRecord]) -> Vec<RollupEntry> {
    let mut groups = BTreeMap::new();
    let items = records
        .iter()
        .flat_map(|r| &r.invoices)
        .flat_map(|inv| &inv.items);
    for item in items {
        let name = item
            .category
            .as_ref()
            .map_or(UNCLASSIFIED, |c| c.name.as_str());
        add_to_group(&mut groups, name.to_string(), name, item.line_total);
    }
    into_sorted_entries(groups)
}

/// Keeps the first `n` rows of a sorted rollup for bounded displays.
///
/// This is a presentation cut only; totals should come from the full rollup
/// or from [`kpi_summary`].
#[must_use]
pub fn top_n(entries: &[RollupEntry], n: usize) -> &[RollupEntry] {
    &entries[..entries.len().min(n)]
}

/// One labelled value of the parts-vs-services split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SplitEntry {
    /// Display label
    pub label: &'static str,
    /// Amount
    pub value: Decimal,
}

/// Parts versus services totals, in that order.
#[must_use]
pub fn cost_split(summary: &KpiSummary) -> [SplitEntry; 2] {
    [
        SplitEntry {
            label: "Peças",
            value: summary.total_parts,
        },
        SplitEntry {
            label: "Serviços",
            value: summary.total_services,
        },
    ]
}

/// Costs for one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyBucket {
    /// Sortable key, `YYYY-MM`
    pub month_key: String,
    /// Short pt-BR label, e.g. `mar/24`
    pub label: String,
    /// Sum of record totals
    pub total: Decimal,
    /// Sum of parts totals
    pub total_parts: Decimal,
    /// Sum of services totals
    pub total_services: Decimal,
}

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "jan", "fev", "mar", "abr", "mai", "jun", "jul", "ago", "set", "out", "nov", "dez",
];

fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn empty_bucket(month: NaiveDate) -> MonthlyBucket {
    let abbreviation = MONTH_ABBREVIATIONS[month.month0() as usize];
    MonthlyBucket {
        month_key: format!("{:04}-{:02}", month.year(), month.month()),
        label: format!("{abbreviation}/{:02}", month.year().rem_euclid(100)),
        total: Decimal::ZERO,
        total_parts: Decimal::ZERO,
        total_services: Decimal::ZERO,
    }
}

/// Groups records by the calendar month of their date, oldest first.
///
/// Only months with at least one record appear; use [`fill_month_gaps`] for a
/// continuous calendar.
#[must_use]
pub fn monthly_series(records: &[MaintenanceRecord]) -> Vec<MonthlyBucket> {
    let mut months: BTreeMap<NaiveDate, MonthlyBucket> = BTreeMap::new();
    for record in records {
        let month = month_start(record.date);
        let bucket = months
            .entry(month)
            .or_insert_with(|| empty_bucket(month));
        bucket.total += record.total;
        bucket.total_parts += record.total_parts;
        bucket.total_services += record.total_services;
    }
    months.into_values().collect()
}

/// Inserts zero buckets so that every month in the span appears once.
///
/// The span is `range` when given, otherwise the first to the last month of
/// `series`. Buckets outside `range` are kept.
#[must_use]
pub fn fill_month_gaps(series: Vec<MonthlyBucket>, range: Option<DateRange>) -> Vec<MonthlyBucket> {
    let mut by_key: BTreeMap<String, MonthlyBucket> = series
        .into_iter()
        .map(|b| (b.month_key.clone(), b))
        .collect();

    let span = match range {
        Some(r) => Some((month_start(r.start), month_start(r.end))),
        None => {
            let first = by_key.keys().next().and_then(|k| parse_month_key(k));
            let last = by_key.keys().next_back().and_then(|k| parse_month_key(k));
            first.zip(last)
        }
    };

    if let Some((first, last)) = span {
        let mut month = first;
        while month <= last {
            let bucket = empty_bucket(month);
            by_key.entry(bucket.month_key.clone()).or_insert(bucket);
            match month.checked_add_months(Months::new(1)) {
                Some(next) => month = next,
                None => break,
            }
        }
    }
    by_key.into_values().collect()
}

fn parse_month_key(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{key}-01"), "%Y-%m-%d").ok()
}
