//! Organizational unit entity - A municipal department ("secretaria").
//!
//! Rows are seeded from the static classifier table and keyed by the
//! four-digit commitment code prefix.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Organizational unit database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "organizational_units")]
pub struct Model {
    /// Four-digit commitment code prefix (e.g. `"2011"`)
    #[sea_orm(primary_key, auto_increment = false)]
    pub code: String,
    /// Short display code (e.g. `"SME"`)
    pub abbreviation: String,
    /// Full department name
    pub name: String,
    /// Whether the unit is still in use
    pub active: bool,
}

/// Defines relationships between `OrganizationalUnit` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One unit has many assigned vehicles
    #[sea_orm(has_many = "super::vehicle::Entity")]
    Vehicles,
}

impl Related<super::vehicle::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vehicles.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
