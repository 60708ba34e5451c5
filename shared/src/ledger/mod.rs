//! Ledger aggregator
//!
//! Folds signed movement rows into stock levels, then classifies them for
//! alerts and dashboards. Callers load tenant-scoped rows; everything here
//! is pure and order-independent.

mod alerts;
mod dashboard;

pub use alerts::*;
pub use dashboard::*;

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{InventoryMovement, MovementType, Product};

/// A (possibly pre-summed) slice of the ledger. The backend groups movements
/// by product, warehouse, destination and type before loading them, so one
/// entry may stand for many movements.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct LedgerEntry {
    pub product_id: Uuid,
    pub warehouse_id: Uuid,
    pub destination_warehouse_id: Option<Uuid>,
    pub movement_type: MovementType,
    pub quantity: Decimal,
}

/// Current stock for a product with the fields the classifiers need
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockRow {
    pub product_id: Uuid,
    pub sku: String,
    pub name: String,
    pub unit: String,
    pub stock: Decimal,
    pub min_stock: Decimal,
    pub max_stock: Option<Decimal>,
    pub cost: Decimal,
    pub active: bool,
}

/// Stock held by one warehouse
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WarehouseStockRow {
    pub product_id: Uuid,
    pub warehouse_id: Uuid,
    pub stock: Decimal,
}

/// Σ in − Σ out per product. Transfers do not change the total.
pub fn stock_totals(entries: &[LedgerEntry]) -> HashMap<Uuid, Decimal> {
    let mut totals: HashMap<Uuid, Decimal> = HashMap::new();
    for entry in entries {
        *totals.entry(entry.product_id).or_default() += entry.movement_type.signed(entry.quantity);
    }
    totals
}

/// Stock per (product, warehouse). A transfer is taken out of its source and
/// put into its destination.
pub fn stock_totals_by_warehouse(entries: &[LedgerEntry]) -> HashMap<(Uuid, Uuid), Decimal> {
    let mut totals: HashMap<(Uuid, Uuid), Decimal> = HashMap::new();
    for entry in entries {
        match entry.movement_type {
            MovementType::Transfer => {
                *totals.entry((entry.product_id, entry.warehouse_id)).or_default() -= entry.quantity;
                if let Some(dest) = entry.destination_warehouse_id {
                    *totals.entry((entry.product_id, dest)).or_default() += entry.quantity;
                }
            }
            kind => {
                *totals.entry((entry.product_id, entry.warehouse_id)).or_default() +=
                    kind.signed(entry.quantity);
            }
        }
    }
    totals
}

/// One row per product, including products that have never moved (stock 0).
/// Negative stock is reported as is.
pub fn stock_by_product(products: &[Product], entries: &[LedgerEntry]) -> Vec<StockRow> {
    let totals = stock_totals(entries);
    products
        .iter()
        .map(|p| StockRow {
            product_id: p.id,
            sku: p.sku.clone(),
            name: p.name.clone(),
            unit: p.unit.clone(),
            stock: totals.get(&p.id).copied().unwrap_or_default(),
            min_stock: p.min_stock,
            max_stock: p.max_stock,
            cost: p.cost,
            active: p.active,
        })
        .collect()
}

/// Non-zero warehouse balances, ordered by product then warehouse
pub fn stock_by_product_and_warehouse(entries: &[LedgerEntry]) -> Vec<WarehouseStockRow> {
    let mut rows: Vec<WarehouseStockRow> = stock_totals_by_warehouse(entries)
        .into_iter()
        .filter(|(_, stock)| !stock.is_zero())
        .map(|((product_id, warehouse_id), stock)| WarehouseStockRow {
            product_id,
            warehouse_id,
            stock,
        })
        .collect();
    rows.sort_by_key(|r| (r.product_id, r.warehouse_id));
    rows
}

/// A kardex line: one movement with its effect on the running balance
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KardexLine {
    pub movement_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub movement_type: MovementType,
    pub label: String,
    pub reference: Option<String>,
    pub quantity: Decimal,
    pub balance: Decimal,
}

/// Chronological movements of one product with a running balance
pub fn kardex(movements: &[InventoryMovement]) -> Vec<KardexLine> {
    let mut ordered: Vec<&InventoryMovement> = movements.iter().collect();
    ordered.sort_by_key(|m| (m.created_at, m.id));

    let mut balance = Decimal::ZERO;
    ordered
        .into_iter()
        .map(|m| {
            let quantity = m.signed_quantity();
            balance += quantity;
            KardexLine {
                movement_id: m.id,
                created_at: m.created_at,
                movement_type: m.movement_type,
                label: m.movement_type.label().to_string(),
                reference: m.reference.clone(),
                quantity,
                balance,
            }
        })
        .collect()
}
