//! Flat CSV projection of maintenance records.

use crate::core::{
    aggregate::resolve_department,
    money::format_amount,
    records::{DateRange, MaintenanceRecord},
};

/// Column separator.
pub const DELIMITER: &str = ";";

/// Placeholder for missing fields.
pub const MISSING: &str = "-";

/// Header row.
pub const HEADER: [&str; 7] = [
    "Data",
    "Veiculo",
    "Secretaria",
    "Empenho",
    "Pecas",
    "Servicos",
    "Total",
];

fn or_missing(value: Option<&str>) -> String {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map_or_else(|| MISSING.to_string(), |v| v.replace(DELIMITER, ","))
}

fn export_row(record: &MaintenanceRecord) -> String {
    let department = resolve_department(record);
    let unit = (!department.is_unclassified()).then_some(department.code.as_str());

    [
        record.date.format("%Y-%m-%d").to_string(),
        or_missing(record.vehicle.as_ref().map(|v| v.plate.as_str())),
        or_missing(unit),
        or_missing(record.commitment_code.as_deref()),
        format_amount(record.total_parts),
        format_amount(record.total_services),
        format_amount(record.total),
    ]
    .join(DELIMITER)
}

/// Renders records as semicolon-delimited CSV with a header row.
///
/// Rows keep the input order. The unit column uses the same department
/// resolution as the rollups; unresolved departments and any absent field
/// are written as `-`.
#[must_use]
pub fn export_csv(records: &[MaintenanceRecord]) -> String {
    std::iter::once(HEADER.join(DELIMITER))
        .chain(records.iter().map(export_row))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Download name for an export covering `range`.
#[must_use]
pub fn export_file_name(range: &DateRange) -> String {
    format!(
        "relatorio_manutencao_{}_{}.csv",
        range.start.format("%Y-%m-%d"),
        range.end.format("%Y-%m-%d")
    )
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::records::{UnitRef, VehicleRef};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn record() -> MaintenanceRecord {
        MaintenanceRecord {
            id: 1,
            date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            commitment_code: Some("2011000045/2026".to_string()),
            description: None,
            vehicle: Some(VehicleRef {
                plate: "QBX1A23".to_string(),
                model: "Gol".to_string(),
                unit: None,
            }),
            supplier: None,
            total_parts: Decimal::from(60),
            total_services: Decimal::new(405, 1),
            total: Decimal::new(1005, 1),
            invoices: Vec::new(),
        }
    }

    #[test]
    fn test_header_only_for_empty_input() {
        assert_eq!(
            export_csv(&[]),
            "Data;Veiculo;Secretaria;Empenho;Pecas;Servicos;Total"
        );
    }

    #[test]
    fn test_row_formatting() {
        let csv = export_csv(&[record()]);
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "2024-03-15;QBX1A23;SME;2011000045/2026;60.00;40.50;100.50");
    }

    #[test]
    fn test_missing_fields_use_placeholder() {
        let mut r = record();
        r.vehicle = None;
        r.commitment_code = None;
        let csv = export_csv(&[r]);
        assert_eq!(
            csv.lines().nth(1).unwrap(),
            "2024-03-15;-;-;-;60.00;40.50;100.50"
        );
    }

    #[test]
    fn test_embedded_delimiter_is_replaced() {
        let mut r = record();
        r.commitment_code = Some("2011;45".to_string());
        let csv = export_csv(&[r]);
        assert!(csv.lines().nth(1).unwrap().contains(";2011,45;"));
    }

    #[test]
    fn test_vehicle_unit_takes_precedence() {
        let mut r = record();
        if let Some(v) = r.vehicle.as_mut() {
            v.unit = Some(UnitRef {
                abbreviation: "SMS".to_string(),
                name: "Secretaria Municipal de Saúde".to_string(),
            });
        }
        let csv = export_csv(&[r]);
        assert!(csv.lines().nth(1).unwrap().starts_with("2024-03-15;QBX1A23;SMS;"));
    }

    #[test]
    fn test_file_name() {
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
        )
        .unwrap();
        assert_eq!(
            export_file_name(&range),
            "relatorio_manutencao_2024-01-01_2024-06-30.csv"
        );
    }
}
