//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the fleet tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod category;
pub mod invoice;
pub mod line_item;
pub mod maintenance;
pub mod organizational_unit;
pub mod supplier;
pub mod vehicle;

// Re-export specific types to avoid conflicts
pub use category::{Column as CategoryColumn, Entity as Category, Model as CategoryModel};
pub use invoice::{Column as InvoiceColumn, Entity as Invoice, Model as InvoiceModel};
pub use line_item::{Column as LineItemColumn, Entity as LineItem, Model as LineItemModel};
pub use maintenance::{
    Column as MaintenanceColumn, Entity as Maintenance, Model as MaintenanceModel,
};
pub use organizational_unit::{
    Column as OrganizationalUnitColumn, Entity as OrganizationalUnit,
    Model as OrganizationalUnitModel,
};
pub use supplier::{Column as SupplierColumn, Entity as Supplier, Model as SupplierModel};
pub use vehicle::{Column as VehicleColumn, Entity as Vehicle, Model as VehicleModel};
