//! Ledger queries
//!
//! Loads tenant-scoped movement sums with SQL and hands them to
//! `shared::ledger` for aggregation and classification.

use chrono::{NaiveDate, Utc};
use shared::ledger::{
    self, DashboardKpis, ExpiringRow, KardexLine, LedgerEntry, LowStockRow, MonthlyMovementTotal, OverstockRow,
    StockHealth, StockRow, SupplyPoint, TopProduct, WarehouseStockRow,
};
use shared::models::Product;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::catalog::CatalogService;
use crate::services::movement::MovementService;
use crate::services::settings::SettingsService;

/// Ledger service
#[derive(Clone)]
pub struct LedgerService {
    db: PgPool,
}

impl LedgerService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Movement sums grouped by product, warehouse, destination and type
    pub async fn entries(&self, org_id: Uuid) -> AppResult<Vec<LedgerEntry>> {
        let entries = sqlx::query_as::<_, LedgerEntry>(
            r#"
            SELECT product_id, warehouse_id, destination_warehouse_id,
                   type AS movement_type, SUM(quantity) AS quantity
            FROM inventory_movements
            WHERE org_id = $1
            GROUP BY product_id, warehouse_id, destination_warehouse_id, type
            "#,
        )
        .bind(org_id)
        .fetch_all(&self.db)
        .await?;

        Ok(entries)
    }

    async fn products(&self, org_id: Uuid) -> AppResult<Vec<Product>> {
        CatalogService::new(self.db.clone()).all_products(org_id).await
    }

    pub async fn stock_by_product(&self, org_id: Uuid) -> AppResult<Vec<StockRow>> {
        let (products, entries) = tokio::try_join!(self.products(org_id), self.entries(org_id))?;
        Ok(ledger::stock_by_product(&products, &entries))
    }

    pub async fn stock_by_product_and_warehouse(&self, org_id: Uuid) -> AppResult<Vec<WarehouseStockRow>> {
        let entries = self.entries(org_id).await?;
        Ok(ledger::stock_by_product_and_warehouse(&entries))
    }

    /// Products at or below their minimum (or the org-wide threshold)
    pub async fn low_stock(&self, org_id: Uuid) -> AppResult<Vec<LowStockRow>> {
        let settings = SettingsService::new(self.db.clone());
        let (rows, settings) = tokio::try_join!(self.stock_by_product(org_id), settings.get(org_id))?;
        Ok(ledger::low_stock(&rows, settings.low_stock_threshold))
    }

    pub async fn expiring_soon(&self, org_id: Uuid, today: NaiveDate, horizon_days: i64) -> AppResult<Vec<ExpiringRow>> {
        let products = self.products(org_id).await?;
        Ok(ledger::expiring_soon(&products, today, horizon_days))
    }

    pub async fn overstock(&self, org_id: Uuid) -> AppResult<Vec<OverstockRow>> {
        let rows = self.stock_by_product(org_id).await?;
        Ok(ledger::overstock(&rows))
    }

    /// Movements recorded since midnight UTC
    pub async fn movements_today(&self, org_id: Uuid) -> AppResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM inventory_movements
            WHERE org_id = $1 AND created_at >= date_trunc('day', NOW() AT TIME ZONE 'UTC') AT TIME ZONE 'UTC'
            "#,
        )
        .bind(org_id)
        .fetch_one(&self.db)
        .await?;

        Ok(count)
    }

    pub async fn kpis(&self, org_id: Uuid) -> AppResult<DashboardKpis> {
        let (rows, low, today) = tokio::try_join!(
            self.stock_by_product(org_id),
            self.low_stock(org_id),
            self.movements_today(org_id)
        )?;
        Ok(ledger::dashboard_kpis(&rows, low.len(), today))
    }

    pub async fn top_products(&self, org_id: Uuid, limit: usize) -> AppResult<Vec<TopProduct>> {
        let (rows, entries) = tokio::try_join!(self.stock_by_product(org_id), self.entries(org_id))?;
        Ok(ledger::top_products(&rows, &entries, limit))
    }

    /// Monthly supply split for the most recent `months` months
    pub async fn supply(&self, org_id: Uuid, months: usize) -> AppResult<Vec<SupplyPoint>> {
        let months = months.max(1);
        let rows = sqlx::query_as::<_, MonthlyMovementTotal>(
            r#"
            SELECT date_trunc('month', created_at)::date AS period,
                   type AS movement_type,
                   SUM(quantity) AS quantity
            FROM inventory_movements
            WHERE org_id = $1
              AND created_at >= date_trunc('month', NOW()) - make_interval(months => $2 - 1)
            GROUP BY 1, 2
            "#,
        )
        .bind(org_id)
        .bind(months as i32)
        .fetch_all(&self.db)
        .await?;

        let buckets = ledger::monthly_supply(&rows, months);
        Ok(ledger::normalize_supply(&buckets))
    }

    pub async fn health(&self, org_id: Uuid) -> AppResult<StockHealth> {
        let settings = SettingsService::new(self.db.clone());
        let (rows, settings) = tokio::try_join!(self.stock_by_product(org_id), settings.get(org_id))?;
        Ok(ledger::stock_health(&rows, settings.low_stock_threshold))
    }

    pub async fn kardex(&self, org_id: Uuid, product_id: Uuid) -> AppResult<(Product, Vec<KardexLine>)> {
        let product = CatalogService::new(self.db.clone()).get_product(org_id, product_id).await?;
        let movements = MovementService::new(self.db.clone())
            .product_history(org_id, product_id)
            .await?;
        Ok((product, ledger::kardex(&movements)))
    }
}

/// Today's date for expiry checks
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}
