//! Dashboard aggregates: KPIs, supply split, stock health and top sellers

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{LedgerEntry, StockRow};
use crate::models::{effective_min_stock, is_low_stock, MovementType};

pub const DEFAULT_SUPPLY_BUCKETS: usize = 6;
pub const DEFAULT_TOP_PRODUCTS: usize = 5;

fn round_pct(value: Decimal) -> u32 {
    value
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u32()
        .unwrap_or(0)
}

/// Split three quantities into whole percentages.
///
/// The first two shares are rounded and the third takes the remainder, so
/// for non-negative inputs with a positive sum the parts always add up to
/// 100. Negative inputs count as zero; an all-zero input gives (0, 0, 0).
pub fn to_pct3(a: Decimal, b: Decimal, c: Decimal) -> (u32, u32, u32) {
    let a = a.max(Decimal::ZERO);
    let b = b.max(Decimal::ZERO);
    let c = c.max(Decimal::ZERO);
    let sum = a + b + c;
    if sum.is_zero() {
        return (0, 0, 0);
    }

    let w = round_pct(Decimal::ONE_HUNDRED * a / sum).min(100);
    let t = round_pct(Decimal::ONE_HUNDRED * b / sum).min(100 - w);
    (w, t, 100 - w - t)
}

/// One month of supply activity as it crosses the API boundary.
///
/// `Split` is the current shape. `Legacy` is the older inbound/outbound pair
/// and maps to (inbound, 0, outbound).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum SupplyBucket {
    Split {
        period: String,
        warehouse: Decimal,
        in_transport: Decimal,
        retail: Decimal,
    },
    Legacy {
        period: String,
        inbound: Decimal,
        outbound: Decimal,
    },
}

impl SupplyBucket {
    pub fn period(&self) -> &str {
        match self {
            SupplyBucket::Split { period, .. } | SupplyBucket::Legacy { period, .. } => period,
        }
    }

    /// (warehouse, in_transport, retail)
    pub fn parts(&self) -> (Decimal, Decimal, Decimal) {
        match self {
            SupplyBucket::Split {
                warehouse,
                in_transport,
                retail,
                ..
            } => (*warehouse, *in_transport, *retail),
            SupplyBucket::Legacy {
                inbound, outbound, ..
            } => (*inbound, Decimal::ZERO, *outbound),
        }
    }
}

/// A supply bucket with its percentage split
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SupplyPoint {
    pub period: String,
    pub warehouse: Decimal,
    pub in_transport: Decimal,
    pub retail: Decimal,
    pub warehouse_pct: u32,
    pub in_transport_pct: u32,
    pub retail_pct: u32,
}

impl From<&SupplyBucket> for SupplyPoint {
    fn from(bucket: &SupplyBucket) -> Self {
        let (warehouse, in_transport, retail) = bucket.parts();
        let (warehouse_pct, in_transport_pct, retail_pct) = to_pct3(warehouse, in_transport, retail);
        Self {
            period: bucket.period().to_string(),
            warehouse,
            in_transport,
            retail,
            warehouse_pct,
            in_transport_pct,
            retail_pct,
        }
    }
}

pub fn normalize_supply(buckets: &[SupplyBucket]) -> Vec<SupplyPoint> {
    buckets.iter().map(SupplyPoint::from).collect()
}

/// Movement quantity summed per calendar month and type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct MonthlyMovementTotal {
    /// First day of the month
    pub period: NaiveDate,
    pub movement_type: MovementType,
    pub quantity: Decimal,
}

/// The most recent `max_buckets` months, oldest first. Inbound counts as
/// warehouse, transfers as in transport and outbound as retail.
pub fn monthly_supply(rows: &[MonthlyMovementTotal], max_buckets: usize) -> Vec<SupplyBucket> {
    let mut months: BTreeMap<NaiveDate, (Decimal, Decimal, Decimal)> = BTreeMap::new();
    for row in rows {
        let bucket = months.entry(row.period).or_default();
        match row.movement_type {
            MovementType::In => bucket.0 += row.quantity,
            MovementType::Transfer => bucket.1 += row.quantity,
            MovementType::Out => bucket.2 += row.quantity,
        }
    }

    let skip = months.len().saturating_sub(max_buckets);
    months
        .into_iter()
        .skip(skip)
        .map(|(period, (warehouse, in_transport, retail))| SupplyBucket::Split {
            period: period.format("%Y-%m").to_string(),
            warehouse,
            in_transport,
            retail,
        })
        .collect()
}

/// Share of active products in each stock band, as whole percentages
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct StockHealth {
    /// Neither low nor above max
    pub overall: u32,
    pub over: u32,
    pub under: u32,
}

/// Bands use the same effective minimum as the low-stock alert, so
/// `under` covers exactly the products that alert flags.
pub fn stock_health(rows: &[StockRow], fallback_min: Decimal) -> StockHealth {
    let active: Vec<&StockRow> = rows.iter().filter(|r| r.active).collect();
    if active.is_empty() {
        return StockHealth::default();
    }

    let (mut healthy, mut over, mut under) = (0u32, 0u32, 0u32);
    for row in &active {
        if is_low_stock(row.stock, effective_min_stock(row.min_stock, fallback_min)) {
            under += 1;
        } else if row.max_stock.is_some_and(|max| row.stock > max) {
            over += 1;
        } else {
            healthy += 1;
        }
    }

    let total = Decimal::from(active.len());
    let pct = |n: u32| round_pct(Decimal::ONE_HUNDRED * Decimal::from(n) / total).min(100);
    StockHealth {
        overall: pct(healthy),
        over: pct(over),
        under: pct(under),
    }
}

/// Headline numbers for the dashboard
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DashboardKpis {
    pub stock_total: Decimal,
    pub low_stock_count: usize,
    /// Σ max(stock, 0) × cost
    pub inventory_value: Decimal,
    pub movements_today: i64,
}

pub fn dashboard_kpis(rows: &[StockRow], low_stock_count: usize, movements_today: i64) -> DashboardKpis {
    let active = rows.iter().filter(|r| r.active);
    let (stock_total, inventory_value) = active.fold((Decimal::ZERO, Decimal::ZERO), |(stock, value), r| {
        (stock + r.stock, value + r.stock.max(Decimal::ZERO) * r.cost)
    });
    DashboardKpis {
        stock_total,
        low_stock_count,
        inventory_value,
        movements_today,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TopProduct {
    pub product_id: Uuid,
    pub sku: String,
    pub name: String,
    pub outbound: Decimal,
}

/// Products ranked by outbound quantity. Products that never left stock are
/// not listed.
pub fn top_products(rows: &[StockRow], entries: &[LedgerEntry], limit: usize) -> Vec<TopProduct> {
    let mut outbound: HashMap<Uuid, Decimal> = HashMap::new();
    for entry in entries.iter().filter(|e| e.movement_type == MovementType::Out) {
        *outbound.entry(entry.product_id).or_default() += entry.quantity;
    }

    let mut ranked: Vec<TopProduct> = rows
        .iter()
        .filter_map(|r| {
            let qty = outbound.get(&r.product_id).copied()?;
            (qty > Decimal::ZERO).then(|| TopProduct {
                product_id: r.product_id,
                sku: r.sku.clone(),
                name: r.name.clone(),
                outbound: qty,
            })
        })
        .collect();
    ranked.sort_by(|a, b| b.outbound.cmp(&a.outbound).then_with(|| a.name.cmp(&b.name)));
    ranked.truncate(limit);
    ranked
}
