//! Business logic services for the Inventario backend

pub mod auth;
pub mod catalog;
pub mod dashboard;
pub mod ledger;
pub mod movement;
pub mod organization;
pub mod purchasing;
pub mod reporting;
pub mod settings;
pub mod warehouse;

/// Trimmed text, or `None` when blank. Optional columns store NULL rather
/// than empty strings.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

pub use auth::AuthService;
pub use catalog::CatalogService;
pub use dashboard::DashboardService;
pub use ledger::LedgerService;
pub use movement::MovementService;
pub use organization::OrganizationService;
pub use purchasing::PurchasingService;
pub use reporting::ReportingService;
pub use settings::SettingsService;
pub use warehouse::WarehouseService;
