//! Invoice entity - A fiscal invoice ("nota fiscal") for parts or services.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Invoice database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "invoices")]
pub struct Model {
    /// Unique identifier for the invoice
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Maintenance this invoice belongs to
    pub maintenance_id: i64,
    /// `"parts"` or `"services"`
    pub kind: String,
    /// Invoice number
    pub number: String,
    /// Invoice series
    pub series: Option<String>,
    /// 44-digit electronic invoice access key
    pub access_key: Option<String>,
    /// Date the invoice was issued
    pub issue_date: Date,
    /// Value before discount
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub gross_value: Decimal,
    /// Discount granted
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub discount: Decimal,
    /// `gross_value - discount`
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub net_value: Decimal,
    /// When the invoice was recorded
    pub created_at: DateTime,
}

/// Defines relationships between Invoice and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each invoice belongs to one maintenance
    #[sea_orm(
        belongs_to = "super::maintenance::Entity",
        from = "Column::MaintenanceId",
        to = "super::maintenance::Column::Id"
    )]
    Maintenance,
    /// One invoice has many line items
    #[sea_orm(has_many = "super::line_item::Entity")]
    LineItems,
}

impl Related<super::maintenance::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Maintenance.def()
    }
}

impl Related<super::line_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LineItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
