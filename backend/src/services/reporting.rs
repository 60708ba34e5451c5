//! Tabular reports (stock, low stock, kardex, valuation) with CSV export

use rust_decimal::Decimal;
use serde::Serialize;
use shared::ledger::{KardexLine, LowStockRow, StockRow};
use shared::models::{Product, Settings};
use shared::types::ReportTable;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::ledger::LedgerService;
use crate::services::settings::SettingsService;

/// Reporting service
#[derive(Clone)]
pub struct ReportingService {
    db: PgPool,
}

fn money(value: Decimal, currency: &str) -> String {
    format!("{} {}", currency, value.round_dp(2))
}

/// Current stock per product
pub fn stock_table(rows: &[StockRow], settings: &Settings) -> ReportTable {
    let mut table = ReportTable::new(
        "Reporte de stock",
        settings.business_name.clone(),
        &["SKU", "Producto", "Unidad", "Stock", "Mínimo", "Máximo"],
    );
    for row in rows.iter().filter(|r| r.active) {
        table.push_row(vec![
            row.sku.clone(),
            row.name.clone(),
            row.unit.clone(),
            row.stock.normalize().to_string(),
            row.min_stock.normalize().to_string(),
            row.max_stock.map(|m| m.normalize().to_string()).unwrap_or_default(),
        ]);
    }
    table
}

pub fn low_stock_table(rows: &[LowStockRow], settings: &Settings) -> ReportTable {
    let mut table = ReportTable::new(
        "Productos con stock bajo",
        settings.business_name.clone(),
        &["SKU", "Producto", "Stock", "Mínimo", "Faltante", "Severidad"],
    );
    for row in rows {
        table.push_row(vec![
            row.sku.clone(),
            row.name.clone(),
            row.stock.normalize().to_string(),
            row.min_stock.normalize().to_string(),
            row.diff.normalize().to_string(),
            row.severity.label().to_string(),
        ]);
    }
    table
}

pub fn kardex_table(product: &Product, lines: &[KardexLine], settings: &Settings) -> ReportTable {
    let mut table = ReportTable::new(
        format!("Kardex {} - {}", product.sku, product.name),
        settings.business_name.clone(),
        &["Fecha", "Tipo", "Referencia", "Cantidad", "Saldo"],
    );
    for line in lines {
        table.push_row(vec![
            line.created_at.format("%Y-%m-%d %H:%M").to_string(),
            line.label.clone(),
            line.reference.clone().unwrap_or_default(),
            line.quantity.normalize().to_string(),
            line.balance.normalize().to_string(),
        ]);
    }
    table
}

/// Stock valued at cost; negative stock counts as zero
pub fn valuation_table(rows: &[StockRow], settings: &Settings) -> ReportTable {
    let mut table = ReportTable::new(
        "Valorización de inventario",
        settings.business_name.clone(),
        &["SKU", "Producto", "Stock", "Costo", "Valor"],
    );
    let mut total = Decimal::ZERO;
    for row in rows.iter().filter(|r| r.active) {
        let value = row.stock.max(Decimal::ZERO) * row.cost;
        total += value;
        table.push_row(vec![
            row.sku.clone(),
            row.name.clone(),
            row.stock.normalize().to_string(),
            money(row.cost, &settings.currency),
            money(value, &settings.currency),
        ]);
    }
    table.push_row(vec![
        String::new(),
        "Total".to_string(),
        String::new(),
        String::new(),
        money(total, &settings.currency),
    ]);
    table
}

impl ReportingService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn settings(&self, org_id: Uuid) -> AppResult<Settings> {
        SettingsService::new(self.db.clone()).get(org_id).await
    }

    pub async fn stock_report(&self, org_id: Uuid) -> AppResult<ReportTable> {
        let ledger = LedgerService::new(self.db.clone());
        let (rows, settings) = tokio::try_join!(ledger.stock_by_product(org_id), self.settings(org_id))?;
        Ok(stock_table(&rows, &settings))
    }

    pub async fn low_stock_report(&self, org_id: Uuid) -> AppResult<ReportTable> {
        let ledger = LedgerService::new(self.db.clone());
        let (rows, settings) = tokio::try_join!(ledger.low_stock(org_id), self.settings(org_id))?;
        Ok(low_stock_table(&rows, &settings))
    }

    pub async fn kardex_report(&self, org_id: Uuid, product_id: Uuid) -> AppResult<ReportTable> {
        let ledger = LedgerService::new(self.db.clone());
        let ((product, lines), settings) =
            tokio::try_join!(ledger.kardex(org_id, product_id), self.settings(org_id))?;
        Ok(kardex_table(&product, &lines, &settings))
    }

    pub async fn valuation_report(&self, org_id: Uuid) -> AppResult<ReportTable> {
        let ledger = LedgerService::new(self.db.clone());
        let (rows, settings) = tokio::try_join!(ledger.stock_by_product(org_id), self.settings(org_id))?;
        Ok(valuation_table(&rows, &settings))
    }

    /// Export serializable records to CSV format
    pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for record in data {
            wtr.serialize(record)
                .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
        }
        into_string(wtr)
    }

    /// Render a report table as CSV with its header row
    pub fn table_to_csv(table: &ReportTable) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        wtr.write_record(&table.columns)
            .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
        for row in &table.rows {
            wtr.write_record(row)
                .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
        }
        into_string(wtr)
    }
}

fn into_string(wtr: csv::Writer<Vec<u8>>) -> AppResult<String> {
    let bytes = wtr
        .into_inner()
        .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))
}
