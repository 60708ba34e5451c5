//! Per-organization settings

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_BUSINESS_NAME: &str = "Inventario";
pub const DEFAULT_CURRENCY: &str = "DOP";
pub const DEFAULT_TIME_ZONE: &str = "America/Santo_Domingo";
pub const DEFAULT_DATE_FORMAT: &str = "YYYY-MM-DD";

/// One row per organization, created with defaults on first read
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Settings {
    pub org_id: Uuid,
    pub business_name: String,
    pub currency: String,
    pub low_stock_threshold: Decimal,
    pub enable_alerts: bool,
    pub time_zone: String,
    pub date_format: String,
    pub require_reference_on_movements: bool,
    pub default_warehouse_id: Option<Uuid>,
}

impl Settings {
    pub fn defaults(org_id: Uuid) -> Self {
        Self {
            org_id,
            business_name: DEFAULT_BUSINESS_NAME.to_string(),
            currency: DEFAULT_CURRENCY.to_string(),
            low_stock_threshold: Decimal::ZERO,
            enable_alerts: true,
            time_zone: DEFAULT_TIME_ZONE.to_string(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            require_reference_on_movements: false,
            default_warehouse_id: None,
        }
    }
}

/// Minimum used for low-stock checks: the product's own minimum, or the
/// org-wide threshold when the product has none
pub fn effective_min_stock(product_min: Decimal, low_stock_threshold: Decimal) -> Decimal {
    if product_min > Decimal::ZERO {
        product_min
    } else {
        low_stock_threshold
    }
}

/// Whether `stock` counts as low against an effective minimum. Without any
/// minimum only oversold (negative) stock is low.
pub fn is_low_stock(stock: Decimal, effective_min: Decimal) -> bool {
    if effective_min > Decimal::ZERO {
        stock <= effective_min
    } else {
        stock < Decimal::ZERO
    }
}
