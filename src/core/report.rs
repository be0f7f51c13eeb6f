//! Report generation business logic.
//!
//! This module bundles every aggregate view of a record set into one
//! [`CostReport`] and renders it as text. All functions are framework-agnostic
//! and operate on records already fetched.

use crate::{
    config::settings::ReportSettings,
    core::{
        aggregate::{
            DEFAULT_TOP_N, KpiSummary, MonthlyBucket, RollupEntry, SplitEntry, category_breakdown,
            cost_split, department_rollup, fill_month_gaps, kpi_summary, monthly_series,
            supplier_rollup, top_n,
        },
        money::format_brl,
        records::{DateRange, MaintenanceRecord},
    },
};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt::Write;

/// How a report is scoped and presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportOptions {
    /// Rows kept in the department and supplier tables
    pub top_n: usize,
    /// Zero-fill months without records
    pub fill_empty_months: bool,
    /// Period covered; `None` means all time
    pub range: Option<DateRange>,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            fill_empty_months: false,
            range: None,
        }
    }
}

impl ReportOptions {
    /// Options from the `[report]` settings for the given period.
    #[must_use]
    pub fn from_settings(settings: &ReportSettings, range: Option<DateRange>) -> Self {
        Self {
            top_n: settings.top_n,
            fill_empty_months: settings.fill_empty_months,
            range,
        }
    }
}

/// Every view of one record set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostReport {
    /// Period covered
    pub range: Option<DateRange>,
    /// Headline figures over all records
    pub kpi: KpiSummary,
    /// Parts versus services
    pub split: [SplitEntry; 2],
    /// Largest departments, truncated to `top_n`
    pub departments: Vec<RollupEntry>,
    /// Number of departments before truncation
    pub department_count: usize,
    /// Largest suppliers, truncated to `top_n`
    pub suppliers: Vec<RollupEntry>,
    /// Number of suppliers before truncation
    pub supplier_count: usize,
    /// Line-item totals by category
    pub categories: Vec<RollupEntry>,
    /// Costs per month, oldest first
    pub monthly: Vec<MonthlyBucket>,
}

/// Builds every view of `records`.
///
/// Department and supplier tables are cut to `options.top_n` rows; the KPI
/// summary is computed over all records and is unaffected by the cut.
#[must_use]
pub fn build_report(records: &[MaintenanceRecord], options: &ReportOptions) -> CostReport {
    let kpi = kpi_summary(records);
    let departments = department_rollup(records);
    let suppliers = supplier_rollup(records);

    let mut monthly = monthly_series(records);
    if options.fill_empty_months {
        monthly = fill_month_gaps(monthly, options.range);
    }

    CostReport {
        range: options.range,
        kpi,
        split: cost_split(&kpi),
        department_count: departments.len(),
        departments: top_n(&departments, options.top_n).to_vec(),
        supplier_count: suppliers.len(),
        suppliers: top_n(&suppliers, options.top_n).to_vec(),
        categories: category_breakdown(records),
        monthly,
    }
}

fn percent(value: Decimal) -> String {
    format!("{:.1}%", value.round_dp(1))
}

fn write_table(out: &mut String, title: &str, rows: &[RollupEntry], total: usize) {
    let _ = writeln!(out, "\n{title} ({} de {total})", rows.len());
    for (i, row) in rows.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>3}. {:<12} {:>16}  {:>4}x  {}",
            i + 1,
            row.code,
            format_brl(row.total_cost),
            row.count,
            row.display_name
        );
    }
}

/// Renders a report as plain text.
#[must_use]
pub fn format_report_summary(report: &CostReport) -> String {
    let mut out = String::new();

    let period = report.range.map_or_else(
        || "todo o período".to_string(),
        |r| format!("{} a {}", r.start.format("%d/%m/%Y"), r.end.format("%d/%m/%Y")),
    );
    let _ = writeln!(out, "Relatório de manutenção: {period}");

    let kpi = &report.kpi;
    let _ = writeln!(out, "Custo total:   {}", format_brl(kpi.total_cost));
    let _ = writeln!(
        out,
        "Peças:         {} ({})",
        format_brl(kpi.total_parts),
        percent(kpi.parts_share())
    );
    let _ = writeln!(
        out,
        "Serviços:      {} ({})",
        format_brl(kpi.total_services),
        percent(kpi.services_share())
    );
    let _ = writeln!(out, "Manutenções:   {}", kpi.count);
    let _ = writeln!(out, "Ticket médio:  {}", format_brl(kpi.average_ticket));

    if kpi.count == 0 {
        let _ = writeln!(out, "\nNenhuma manutenção no período.");
        return out;
    }

    write_table(&mut out, "Secretarias", &report.departments, report.department_count);
    write_table(&mut out, "Fornecedores", &report.suppliers, report.supplier_count);

    let _ = writeln!(out, "\nEvolução mensal");
    for bucket in &report.monthly {
        let _ = writeln!(out, "  {:<7} {:>16}", bucket.label, format_brl(bucket.total));
    }

    out
}
