//! Maintenance entity - One maintenance event on a vehicle.
//!
//! The three money columns are derived from the attached invoices when the
//! maintenance is created and are never edited independently.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Maintenance database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "maintenances")]
pub struct Model {
    /// Unique identifier for the maintenance
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Vehicle that was serviced
    pub vehicle_id: i64,
    /// Supplier that did the work
    pub supplier_id: i64,
    /// Local calendar date of the maintenance
    pub date: Date,
    /// Commitment code ("empenho"), uppercase
    pub commitment_code: Option<String>,
    /// Short description of the work
    pub description: Option<String>,
    /// Net value of parts invoices
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub total_parts: Decimal,
    /// Net value of services invoices
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub total_services: Decimal,
    /// `total_parts + total_services`
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub total: Decimal,
    /// When the maintenance was recorded
    pub created_at: DateTime,
}

/// Defines relationships between Maintenance and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each maintenance belongs to one vehicle
    #[sea_orm(
        belongs_to = "super::vehicle::Entity",
        from = "Column::VehicleId",
        to = "super::vehicle::Column::Id"
    )]
    Vehicle,
    /// Each maintenance belongs to one supplier
    #[sea_orm(
        belongs_to = "super::supplier::Entity",
        from = "Column::SupplierId",
        to = "super::supplier::Column::Id"
    )]
    Supplier,
    /// One maintenance has many invoices
    #[sea_orm(has_many = "super::invoice::Entity")]
    Invoices,
}

impl Related<super::vehicle::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vehicle.def()
    }
}

impl Related<super::supplier::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Supplier.def()
    }
}

impl Related<super::invoice::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Invoices.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
