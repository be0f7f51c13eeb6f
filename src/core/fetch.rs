//! Loading denormalized maintenance records and guarding report refreshes.
//!
//! Records are assembled from one query per table and joined in memory. A
//! fetch either returns every matching record or an error; callers never see a
//! partially joined set.

use crate::{
    core::{
        money::{round_cents, round_quantity},
        records::{
            CategoryKind, CategoryRef, DateRange, InvoiceKind, InvoiceRecord, LineItemRecord,
            MaintenanceRecord, SupplierRef, UnitRef, VehicleRef,
        },
        report::{CostReport, ReportOptions, build_report},
    },
    entities::{
        Category, Invoice, LineItem, Maintenance, OrganizationalUnit, Supplier, Vehicle,
        category, invoice, line_item, maintenance, organizational_unit, supplier, vehicle,
    },
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, QuerySelect, Select, prelude::*};
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

/// Loads every maintenance in `range` (all of them when `None`), oldest
/// first, with vehicle, department, supplier, invoices, items and categories.
#[instrument(skip(db))]
pub async fn fetch_records(
    db: &DatabaseConnection,
    range: Option<DateRange>,
) -> Result<Vec<MaintenanceRecord>> {
    let mut query = Maintenance::find();
    if let Some(range) = range {
        query = query.filter(maintenance::Column::Date.between(range.start, range.end));
    }
    let query = query
        .order_by_asc(maintenance::Column::Date)
        .order_by_asc(maintenance::Column::Id);

    let records = load_records(db, query).await?;
    info!(count = records.len(), "Maintenance records fetched");
    Ok(records)
}

/// Loads one maintenance for the detail view.
#[instrument(skip(db))]
pub async fn fetch_record(db: &DatabaseConnection, id: i64) -> Result<MaintenanceRecord> {
    let query = Maintenance::find().filter(maintenance::Column::Id.eq(id));
    load_records(db, query)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| Error::NotFound {
            entity: "maintenance",
            id: id.to_string(),
        })
}

/// The `limit` most recent maintenances, newest first.
pub async fn recent_records(db: &DatabaseConnection, limit: u64) -> Result<Vec<MaintenanceRecord>> {
    let query = Maintenance::find()
        .order_by_desc(maintenance::Column::Date)
        .order_by_desc(maintenance::Column::Id)
        .limit(limit);
    load_records(db, query).await
}

fn unique_ids(ids: impl Iterator<Item = i64>) -> Vec<i64> {
    ids.collect::<BTreeSet<_>>().into_iter().collect()
}

async fn load_records(
    db: &DatabaseConnection,
    query: Select<Maintenance>,
) -> Result<Vec<MaintenanceRecord>> {
    let maintenances = query.all(db).await?;
    if maintenances.is_empty() {
        return Ok(Vec::new());
    }

    let vehicle_ids = unique_ids(maintenances.iter().map(|m| m.vehicle_id));
    let supplier_ids = unique_ids(maintenances.iter().map(|m| m.supplier_id));
    let maintenance_ids: Vec<i64> = maintenances.iter().map(|m| m.id).collect();

    let vehicles: HashMap<i64, vehicle::Model> = Vehicle::find()
        .filter(vehicle::Column::Id.is_in(vehicle_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|v| (v.id, v))
        .collect();
    let units: HashMap<String, organizational_unit::Model> = OrganizationalUnit::find()
        .all(db)
        .await?
        .into_iter()
        .map(|u| (u.code.clone(), u))
        .collect();
    let suppliers: HashMap<i64, supplier::Model> = Supplier::find()
        .filter(supplier::Column::Id.is_in(supplier_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|s| (s.id, s))
        .collect();

    let invoices = Invoice::find()
        .filter(invoice::Column::MaintenanceId.is_in(maintenance_ids))
        .order_by_asc(invoice::Column::Id)
        .all(db)
        .await?;
    let invoice_ids: Vec<i64> = invoices.iter().map(|i| i.id).collect();

    let mut items_by_invoice: HashMap<i64, Vec<line_item::Model>> = HashMap::new();
    if !invoice_ids.is_empty() {
        let items = LineItem::find()
            .filter(line_item::Column::InvoiceId.is_in(invoice_ids))
            .order_by_asc(line_item::Column::Id)
            .all(db)
            .await?;
        for item in items {
            items_by_invoice.entry(item.invoice_id).or_default().push(item);
        }
    }
    let categories: HashMap<i64, category::Model> = Category::find()
        .all(db)
        .await?
        .into_iter()
        .map(|c| (c.id, c))
        .collect();

    let mut invoices_by_maintenance: HashMap<i64, Vec<InvoiceRecord>> = HashMap::new();
    for inv in invoices {
        let items = items_by_invoice
            .remove(&inv.id)
            .unwrap_or_default()
            .into_iter()
            .map(|item| to_line_item(item, &categories))
            .collect::<Result<Vec<_>>>()?;
        let maintenance_id = inv.maintenance_id;
        invoices_by_maintenance
            .entry(maintenance_id)
            .or_default()
            .push(to_invoice(inv, items)?);
    }

    let records = maintenances
        .into_iter()
        .map(|m| {
            let vehicle = vehicles.get(&m.vehicle_id).map(|v| to_vehicle_ref(v, &units));
            if vehicle.is_none() {
                warn!(id = m.id, vehicle_id = m.vehicle_id, "Maintenance without vehicle");
            }
            MaintenanceRecord {
                id: m.id,
                date: m.date,
                commitment_code: m.commitment_code,
                description: m.description,
                vehicle,
                supplier: suppliers.get(&m.supplier_id).map(|s| SupplierRef {
                    cnpj: Some(s.cnpj.clone()),
                    trade_name: s.trade_name.clone(),
                    legal_name: s.legal_name.clone(),
                }),
                total_parts: round_cents(m.total_parts),
                total_services: round_cents(m.total_services),
                total: round_cents(m.total),
                invoices: invoices_by_maintenance.remove(&m.id).unwrap_or_default(),
            }
        })
        .collect::<Vec<_>>();

    debug!(count = records.len(), "Records assembled");
    Ok(records)
}

fn to_vehicle_ref(
    vehicle: &vehicle::Model,
    units: &HashMap<String, organizational_unit::Model>,
) -> VehicleRef {
    VehicleRef {
        plate: vehicle.plate.clone(),
        model: vehicle.model.clone(),
        unit: vehicle
            .unit_code
            .as_ref()
            .and_then(|code| units.get(code))
            .map(|u| UnitRef {
                abbreviation: u.abbreviation.clone(),
                name: u.name.clone(),
            }),
    }
}

fn to_invoice(inv: invoice::Model, items: Vec<LineItemRecord>) -> Result<InvoiceRecord> {
    let kind = InvoiceKind::parse(&inv.kind)
        .ok_or_else(|| Error::invalid_input(format!("unknown invoice kind: {}", inv.kind)))?;
    Ok(InvoiceRecord {
        kind,
        number: inv.number,
        gross_value: round_cents(inv.gross_value),
        discount: round_cents(inv.discount),
        net_value: round_cents(inv.net_value),
        items,
    })
}

fn to_line_item(
    item: line_item::Model,
    categories: &HashMap<i64, category::Model>,
) -> Result<LineItemRecord> {
    let category = match item.category_id.and_then(|id| categories.get(&id)) {
        Some(c) => Some(CategoryRef {
            name: c.name.clone(),
            kind: CategoryKind::parse(&c.kind).ok_or_else(|| {
                Error::invalid_input(format!("unknown category kind: {}", c.kind))
            })?,
        }),
        None => None,
    };
    Ok(LineItemRecord {
        description: item.description,
        quantity: round_quantity(item.quantity),
        unit_price: round_quantity(item.unit_price),
        line_total: round_cents(item.line_total),
        category,
    })
}

/// Identifies one report refresh. Tickets are ordered by the time `begin`
/// was called.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestTicket {
    seq: u64,
}

/// What happened to a completed refresh.
#[derive(Debug)]
pub enum RefreshOutcome {
    /// The report became the current one
    Applied,
    /// A later refresh already completed; the result was dropped
    Stale,
    /// The refresh failed; the current report is unchanged
    Failed(Error),
}

#[derive(Debug, Default)]
struct SessionState {
    applied: u64,
    report: Option<CostReport>,
    last_error: Option<String>,
}

/// Holds the report currently on screen and drops results that arrive after a
/// newer refresh has completed.
#[derive(Debug, Default)]
pub struct ReportSession {
    next: AtomicU64,
    state: RwLock<SessionState>,
}

impl ReportSession {
    /// Creates an empty session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a refresh.
    pub fn begin(&self) -> RequestTicket {
        RequestTicket {
            seq: self.next.fetch_add(1, Ordering::SeqCst) + 1,
        }
    }

    /// Completes a refresh. Results older than the last completed refresh are
    /// discarded whether they succeeded or not. A failure keeps the current
    /// report and is recorded for [`take_error`](Self::take_error).
    pub async fn complete(&self, ticket: RequestTicket, result: Result<CostReport>) -> RefreshOutcome {
        let mut state = self.state.write().await;
        if ticket.seq <= state.applied {
            debug!(seq = ticket.seq, applied = state.applied, "Stale report dropped");
            return RefreshOutcome::Stale;
        }
        state.applied = ticket.seq;
        match result {
            Ok(report) => {
                state.report = Some(report);
                state.last_error = None;
                RefreshOutcome::Applied
            }
            Err(e) => {
                warn!(seq = ticket.seq, error = %e, "Report refresh failed");
                state.last_error = Some(e.to_string());
                RefreshOutcome::Failed(e)
            }
        }
    }

    /// Fetches records for `options.range`, builds the report and completes.
    pub async fn refresh(&self, db: &DatabaseConnection, options: &ReportOptions) -> RefreshOutcome {
        let ticket = self.begin();
        let result = fetch_records(db, options.range)
            .await
            .map(|records| build_report(&records, options));
        self.complete(ticket, result).await
    }

    /// The current report, if any refresh has succeeded.
    pub async fn current(&self) -> Option<CostReport> {
        self.state.read().await.report.clone()
    }

    /// Returns the last failure message once, clearing it.
    pub async fn take_error(&self) -> Option<String> {
        self.state.write().await.last_error.take()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::fleet::{NewMaintenance, create_maintenance, register_category};
    use crate::core::aggregate::supplier_rollup;
    use crate::core::validation::validate_record;
    use crate::test_utils::*;
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn test_fetch_records_empty_store() -> Result<()> {
        let db = setup_test_db().await?;
        assert!(fetch_records(&db, None).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_fetch_records_joins_everything() -> Result<()> {
        let (db, vehicle, supplier) = setup_with_fleet().await?;
        let category = register_category(&db, "Freios", CategoryKind::Parts).await?;

        let mut parts = test_invoice(InvoiceKind::Parts, &[(2, 30)], 0);
        parts.items[0].category_id = Some(category.id);
        create_maintenance(
            &db,
            NewMaintenance {
                vehicle_id: vehicle.id,
                supplier_id: supplier.id,
                date: date(2024, 3, 15),
                commitment_code: Some("2011000045/2026".to_string()),
                description: Some("Pastilhas".to_string()),
                invoices: vec![parts, test_invoice(InvoiceKind::Services, &[(1, 40)], 0)],
            },
        )
        .await?;

        let records = fetch_records(&db, None).await?;
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.total, Decimal::from(100));
        assert_eq!(r.vehicle.as_ref().unwrap().plate, "QBX1A23");
        // Assigned from the commitment code on insert
        assert_eq!(
            r.vehicle.as_ref().unwrap().unit.as_ref().unwrap().abbreviation,
            "SME"
        );
        assert_eq!(r.supplier.as_ref().unwrap().display_name(), "Auto Center");
        assert_eq!(r.invoices.len(), 2);
        assert_eq!(r.invoices[0].kind, InvoiceKind::Parts);
        assert_eq!(
            r.invoices[0].items[0].category.as_ref().unwrap().name,
            "Freios"
        );
        assert!(r.invoices[1].items[0].category.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_saved_record_passes_validation_after_fetch() -> Result<()> {
        let (db, vehicle, supplier) = setup_with_fleet().await?;
        let mut parts = test_invoice(InvoiceKind::Parts, &[(1, 1000)], 0);
        parts.items[0].quantity = Decimal::new(100_005, 5);
        parts.items[0].unit_price = Decimal::new(100_000_005, 5);
        create_maintenance(
            &db,
            NewMaintenance {
                vehicle_id: vehicle.id,
                supplier_id: supplier.id,
                date: date(2024, 3, 15),
                commitment_code: None,
                description: None,
                invoices: vec![parts],
            },
        )
        .await?;

        let record = fetch_records(&db, None).await?.remove(0);
        let item = &record.invoices[0].items[0];
        assert_eq!(item.quantity, Decimal::new(10001, 4));
        assert_eq!(item.unit_price, Decimal::new(10_000_001, 4));
        validate_record(&record)?;
        Ok(())
    }

    #[tokio::test]
    async fn test_same_trade_name_suppliers_rolled_up_separately() -> Result<()> {
        let (db, vehicle, first) = setup_with_fleet().await?;
        let second = create_test_supplier(&db, "98.765.432/0001-10", Some("Auto Center")).await?;
        create_test_maintenance(&db, vehicle.id, first.id, date(2024, 2, 1), None, 100).await?;
        create_test_maintenance(&db, vehicle.id, second.id, date(2024, 2, 2), None, 50).await?;

        let rollup = supplier_rollup(&fetch_records(&db, None).await?);
        let rows: Vec<_> = rollup
            .iter()
            .map(|e| (e.code.as_str(), e.display_name.as_str(), e.total_cost))
            .collect();
        assert_eq!(
            rows,
            [
                ("12345678000190", "Auto Center", Decimal::from(100)),
                ("98765432000110", "Auto Center", Decimal::from(50)),
            ]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_fetch_records_range_and_order() -> Result<()> {
        let (db, vehicle, supplier) = setup_with_fleet().await?;
        for (d, amount) in [(date(2024, 5, 1), 10), (date(2024, 1, 10), 20), (date(2024, 3, 3), 30)] {
            create_test_maintenance(&db, vehicle.id, supplier.id, d, None, amount).await?;
        }

        let all = fetch_records(&db, None).await?;
        let dates: Vec<_> = all.iter().map(|r| r.date).collect();
        assert_eq!(dates, [date(2024, 1, 10), date(2024, 3, 3), date(2024, 5, 1)]);

        let range = DateRange::new(date(2024, 3, 3), date(2024, 5, 1))?;
        let scoped = fetch_records(&db, Some(range)).await?;
        assert_eq!(scoped.len(), 2);
        assert_eq!(scoped[0].total, Decimal::from(30));
        Ok(())
    }

    #[tokio::test]
    async fn test_fetch_record_and_not_found() -> Result<()> {
        let (db, vehicle, supplier) = setup_with_fleet().await?;
        let m = create_test_maintenance(&db, vehicle.id, supplier.id, date(2024, 2, 2), None, 15)
            .await?;

        let record = fetch_record(&db, m.id).await?;
        assert_eq!(record.id, m.id);
        assert!(matches!(
            fetch_record(&db, m.id + 100).await,
            Err(Error::NotFound { entity: "maintenance", .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_recent_records_newest_first() -> Result<()> {
        let (db, vehicle, supplier) = setup_with_fleet().await?;
        for day in 1..=4 {
            create_test_maintenance(&db, vehicle.id, supplier.id, date(2024, 4, day), None, 5)
                .await?;
        }
        let recent = recent_records(&db, 2).await?;
        let dates: Vec<_> = recent.iter().map(|r| r.date).collect();
        assert_eq!(dates, [date(2024, 4, 4), date(2024, 4, 3)]);
        Ok(())
    }

    #[tokio::test]
    async fn test_session_drops_stale_results() {
        let session = ReportSession::new();
        let first = session.begin();
        let second = session.begin();
        let options = ReportOptions::default();

        let newer = build_report(&[], &options);
        assert!(matches!(
            session.complete(second, Ok(newer)).await,
            RefreshOutcome::Applied
        ));
        assert!(matches!(
            session.complete(first, Ok(build_report(&[], &options))).await,
            RefreshOutcome::Stale
        ));
        assert!(session.current().await.is_some());
    }

    #[tokio::test]
    async fn test_session_failure_keeps_report_and_surfaces_once() {
        let session = ReportSession::new();
        let options = ReportOptions::default();

        let ok = session.begin();
        session.complete(ok, Ok(build_report(&[], &options))).await;

        let failing = session.begin();
        let outcome = session
            .complete(failing, Err(Error::invalid_input("store offline")))
            .await;
        assert!(matches!(outcome, RefreshOutcome::Failed(_)));
        assert!(session.current().await.is_some());
        assert!(session.take_error().await.unwrap().contains("store offline"));
        assert!(session.take_error().await.is_none());
    }

    #[tokio::test]
    async fn test_session_late_failure_does_not_override_newer_success() {
        let session = ReportSession::new();
        let older = session.begin();
        let newer = session.begin();

        session
            .complete(newer, Ok(build_report(&[], &ReportOptions::default())))
            .await;
        let outcome = session
            .complete(older, Err(Error::invalid_input("timeout")))
            .await;
        assert!(matches!(outcome, RefreshOutcome::Stale));
        assert!(session.take_error().await.is_none());
    }

    #[tokio::test]
    async fn test_session_refresh_from_store() -> Result<()> {
        let (db, vehicle, supplier) = setup_with_fleet().await?;
        create_test_maintenance(&db, vehicle.id, supplier.id, date(2024, 4, 1), None, 25).await?;

        let session = ReportSession::new();
        let outcome = session.refresh(&db, &ReportOptions::default()).await;
        assert!(matches!(outcome, RefreshOutcome::Applied));
        let report = session.current().await.unwrap();
        assert_eq!(report.kpi.total_cost, Decimal::from(25));
        Ok(())
    }

    #[tokio::test]
    async fn test_session_refresh_surfaces_store_error() -> Result<()> {
        // No tables: the fetch fails
        let db = sea_orm::Database::connect("sqlite::memory:").await?;
        let session = ReportSession::new();
        let outcome = session.refresh(&db, &ReportOptions::default()).await;
        assert!(matches!(outcome, RefreshOutcome::Failed(Error::Database(_))));
        assert!(session.current().await.is_none());
        assert!(session.take_error().await.is_some());
        Ok(())
    }
}
