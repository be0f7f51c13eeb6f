//! Vehicle entity - A fleet vehicle, optionally assigned to a department.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Vehicle database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vehicles")]
pub struct Model {
    /// Unique identifier for the vehicle
    #[sea_orm(primary_key)]
    pub id: i64,
    /// License plate, uppercase alphanumerics only
    #[sea_orm(unique)]
    pub plate: String,
    /// Model name (e.g. "Gol 1.0")
    pub model: String,
    /// Manufacturer
    pub make: Option<String>,
    /// Manufacture year
    pub manufacture_year: Option<i32>,
    /// Assigned department code, when known
    pub unit_code: Option<String>,
    /// Municipal asset tag ("patrimônio")
    pub asset_tag: Option<String>,
    /// Soft delete flag - inactive vehicles are hidden from entry forms
    pub active: bool,
    /// When the vehicle was registered
    pub created_at: DateTime,
}

/// Defines relationships between Vehicle and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each vehicle may belong to one department
    #[sea_orm(
        belongs_to = "super::organizational_unit::Entity",
        from = "Column::UnitCode",
        to = "super::organizational_unit::Column::Code"
    )]
    OrganizationalUnit,
    /// One vehicle has many maintenances
    #[sea_orm(has_many = "super::maintenance::Entity")]
    Maintenances,
}

impl Related<super::organizational_unit::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrganizationalUnit.def()
    }
}

impl Related<super::maintenance::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Maintenances.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
