//! Supplier entity - A workshop or parts vendor identified by CNPJ.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Supplier database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "suppliers")]
pub struct Model {
    /// Unique identifier for the supplier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Company registration number, 14 digits without punctuation
    #[sea_orm(unique)]
    pub cnpj: String,
    /// Registered legal name ("razão social")
    pub legal_name: String,
    /// Trade name ("nome fantasia")
    pub trade_name: Option<String>,
    /// City
    pub city: Option<String>,
    /// Two-letter state code
    pub state: Option<String>,
    /// Contact phone
    pub phone: Option<String>,
    /// Contact email
    pub email: Option<String>,
    /// Soft delete flag
    pub active: bool,
    /// When the supplier was registered
    pub created_at: DateTime,
}

/// Defines relationships between Supplier and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One supplier has many maintenances
    #[sea_orm(has_many = "super::maintenance::Entity")]
    Maintenances,
}

impl Related<super::maintenance::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Maintenances.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
