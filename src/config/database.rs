//! Database configuration module.
//!
//! This module handles the `SQLite` connection and table creation using `SeaORM`.
//! Tables are generated with `Schema::create_table_from_entity`, so the schema
//! always matches the entity definitions. Creation follows foreign key order.

use crate::entities::{
    Category, Invoice, LineItem, Maintenance, OrganizationalUnit, Supplier, Vehicle,
};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use tracing::{debug, info};

/// Local `SQLite` file used when nothing else is configured.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/fleet_maintenance.sqlite?mode=rwc";

/// Resolves the database URL: `DATABASE_URL` from the environment wins over
/// the configured value, which wins over [`DEFAULT_DATABASE_URL`].
#[must_use]
pub fn get_database_url(configured: Option<&str>) -> String {
    std::env::var("DATABASE_URL")
        .ok()
        .or_else(|| configured.map(str::to_string))
        .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database at `url`.
pub async fn create_connection(url: &str) -> Result<DatabaseConnection> {
    info!("Connecting to database");
    debug!(url, "database url");
    Database::connect(url).await.map_err(Into::into)
}

/// Creates all tables that do not exist yet.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut statements = [
        schema.create_table_from_entity(OrganizationalUnit),
        schema.create_table_from_entity(Vehicle),
        schema.create_table_from_entity(Supplier),
        schema.create_table_from_entity(Category),
        schema.create_table_from_entity(Maintenance),
        schema.create_table_from_entity(Invoice),
        schema.create_table_from_entity(LineItem),
    ];

    for statement in &mut statements {
        statement.if_not_exists();
        db.execute(builder.build(&*statement)).await?;
    }

    Ok(())
}
