/// Cost rollups, KPI summary and monthly series
pub mod aggregate;

/// Commitment code to department resolution
pub mod classifier;

/// CSV export of maintenance records
pub mod export;

/// Loading joined records and guarding report refreshes
pub mod fetch;

/// Vehicle, supplier and maintenance registration
pub mod fleet;

/// Cent rounding and currency formatting
pub mod money;

/// Denormalized record types
pub mod records;

/// Report assembly and text rendering
pub mod report;

/// Monetary consistency checks
pub mod validation;
