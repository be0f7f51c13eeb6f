use chrono::NaiveDate;
use dotenvy::dotenv;
use fleet_maintenance::{
    config::{
        database::{DEFAULT_DATABASE_URL, create_connection, create_tables, get_database_url},
        settings::load_default_config,
    },
    core::{
        export::{export_csv, export_file_name},
        fetch::{RefreshOutcome, ReportSession, fetch_records},
        fleet::{count_active_vehicles, seed_organizational_units},
        records::DateRange,
        report::{ReportOptions, format_report_summary},
    },
    errors::{Error, Result},
};
use std::{env, path::Path};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn parse_date_var(name: &str) -> Result<Option<NaiveDate>> {
    match env::var(name) {
        Ok(value) => NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
            .map(Some)
            .map_err(|e| Error::invalid_input(format!("{name}={value}: {e}"))),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// `REPORT_START`/`REPORT_END` as an inclusive range; both or neither.
fn report_range() -> Result<Option<DateRange>> {
    match (parse_date_var("REPORT_START")?, parse_date_var("REPORT_END")?) {
        (Some(start), Some(end)) => DateRange::new(start, end).map(Some),
        (None, None) => Ok(None),
        _ => Err(Error::invalid_input(
            "REPORT_START and REPORT_END must be set together",
        )),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; variables may also be set externally
    dotenv().ok();

    // 3. Settings and report scope
    let settings = load_default_config()
        .inspect_err(|e| error!("Critical error loading configuration: {}", e))?;
    let range = report_range().inspect_err(|e| error!("Invalid report period: {}", e))?;
    let options = ReportOptions::from_settings(&settings.report, range);

    // 4. Initialize database
    let url = get_database_url(settings.database.url.as_deref());
    if url == DEFAULT_DATABASE_URL {
        std::fs::create_dir_all("data")?;
    }
    let db = create_connection(&url)
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;
    seed_organizational_units(&db)
        .await
        .inspect_err(|e| error!("Failed to seed organizational units: {}", e))?;

    // 5. Fetch and build the report
    let session = ReportSession::new();
    if let RefreshOutcome::Failed(e) = session.refresh(&db, &options).await {
        error!("Failed to build report: {}", e);
        return Err(e);
    }

    if let Some(report) = session.current().await {
        print!("{}", format_report_summary(&report));
    }
    println!("Veículos ativos: {}", count_active_vehicles(&db).await?);

    // 6. Optional CSV export
    if let Ok(dir) = env::var("REPORT_EXPORT_DIR") {
        let records = fetch_records(&db, range)
            .await
            .inspect_err(|e| error!("Failed to fetch records for export: {}", e))?;
        let span = range.or_else(|| {
            let first = records.first()?.date;
            let last = records.last()?.date;
            DateRange::new(first, last).ok()
        });
        match span {
            Some(span) => {
                let path = Path::new(&dir).join(export_file_name(&span));
                std::fs::write(&path, export_csv(&records))?;
                info!("CSV export written to {}", path.display());
            }
            None => warn!("No records to export"),
        }
    }

    Ok(())
}
