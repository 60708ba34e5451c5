//! Aggregate read models for the alerts page and the dashboard
//!
//! Each overview fans out independent ledger queries concurrently. A query
//! that fails is logged and replaced by an empty result so the rest of the
//! page still renders.

use serde::Serialize;
use shared::ledger::{DashboardKpis, ExpiringRow, LowStockRow, OverstockRow, StockHealth, SupplyPoint, TopProduct};
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::LedgerConfig;
use crate::error::AppResult;
use crate::services::ledger::{today, LedgerService};
use crate::services::settings::SettingsService;

#[derive(Debug, Default, Serialize)]
pub struct AlertsOverview {
    pub enabled: bool,
    pub low_stock: Vec<LowStockRow>,
    pub expiring: Vec<ExpiringRow>,
    pub overstock: Vec<OverstockRow>,
}

#[derive(Debug, Default, Serialize)]
pub struct DashboardOverview {
    pub kpis: DashboardKpis,
    pub top_products: Vec<TopProduct>,
    pub supply: Vec<SupplyPoint>,
    pub health: StockHealth,
}

/// Keep a successful result; log a failure and fall back to the default
pub fn or_default<T: Default>(query: &str, result: AppResult<T>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => {
            tracing::error!(query, error = %err, "Aggregate query failed, using empty result");
            T::default()
        }
    }
}

/// Dashboard service
#[derive(Clone)]
pub struct DashboardService {
    db: PgPool,
    limits: LedgerConfig,
}

impl DashboardService {
    pub fn new(db: PgPool, limits: LedgerConfig) -> Self {
        Self { db, limits }
    }

    /// Whether alert lists should be shown at all for this org
    pub async fn alerts_enabled(&self, org_id: Uuid) -> AppResult<bool> {
        Ok(SettingsService::new(self.db.clone()).get(org_id).await?.enable_alerts)
    }

    pub async fn alerts_overview(&self, org_id: Uuid) -> AppResult<AlertsOverview> {
        if !self.alerts_enabled(org_id).await? {
            return Ok(AlertsOverview::default());
        }

        let ledger = LedgerService::new(self.db.clone());
        let (low_stock, expiring, overstock) = tokio::join!(
            ledger.low_stock(org_id),
            ledger.expiring_soon(org_id, today(), self.limits.expiring_horizon_days),
            ledger.overstock(org_id),
        );

        Ok(AlertsOverview {
            enabled: true,
            low_stock: or_default("low_stock", low_stock),
            expiring: or_default("expiring_soon", expiring),
            overstock: or_default("overstock", overstock),
        })
    }

    pub async fn overview(&self, org_id: Uuid) -> DashboardOverview {
        let ledger = LedgerService::new(self.db.clone());
        let (kpis, top_products, supply, health) = tokio::join!(
            ledger.kpis(org_id),
            ledger.top_products(org_id, self.limits.top_products_limit),
            ledger.supply(org_id, self.limits.supply_buckets),
            ledger.health(org_id),
        );

        DashboardOverview {
            kpis: or_default("dashboard_kpis", kpis),
            top_products: or_default("dashboard_top_products", top_products),
            supply: or_default("dashboard_supply", supply),
            health: or_default("dashboard_health", health),
        }
    }
}
