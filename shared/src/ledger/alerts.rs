//! Low-stock, expiry and overstock classification

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::StockRow;
use crate::models::{effective_min_stock, is_low_stock, Product};
use crate::types::Tone;

/// Default look-ahead for expiring products, in days
pub const DEFAULT_EXPIRING_HORIZON_DAYS: i64 = 30;

/// How far below its minimum a product is
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LowStockSeverity {
    #[serde(rename = "Crítico")]
    Critical,
    #[serde(rename = "Atención")]
    Attention,
    #[serde(rename = "Bajo")]
    Low,
}

impl LowStockSeverity {
    /// `diff` is `min_stock - stock`. Anything under 5 (negative included)
    /// is just "Bajo".
    pub fn classify(diff: Decimal) -> Self {
        if diff >= Decimal::from(20) {
            LowStockSeverity::Critical
        } else if diff >= Decimal::from(5) {
            LowStockSeverity::Attention
        } else {
            LowStockSeverity::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LowStockSeverity::Critical => "Crítico",
            LowStockSeverity::Attention => "Atención",
            LowStockSeverity::Low => "Bajo",
        }
    }

    pub fn tone(&self) -> Tone {
        match self {
            LowStockSeverity::Critical => Tone::Danger,
            LowStockSeverity::Attention => Tone::Warn,
            LowStockSeverity::Low => Tone::Muted,
        }
    }
}

/// How close a product is to its expiration date
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ExpirySeverity {
    #[serde(rename = "Vencido")]
    Expired,
    #[serde(rename = "Urgente")]
    Urgent,
    #[serde(rename = "Pronto")]
    Soon,
    #[serde(rename = "Pendiente")]
    Pending,
}

impl ExpirySeverity {
    pub fn classify(days_left: i64) -> Self {
        match days_left {
            d if d <= 0 => ExpirySeverity::Expired,
            1..=3 => ExpirySeverity::Urgent,
            4..=10 => ExpirySeverity::Soon,
            _ => ExpirySeverity::Pending,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ExpirySeverity::Expired => "Vencido",
            ExpirySeverity::Urgent => "Urgente",
            ExpirySeverity::Soon => "Pronto",
            ExpirySeverity::Pending => "Pendiente",
        }
    }

    pub fn tone(&self) -> Tone {
        match self {
            ExpirySeverity::Expired | ExpirySeverity::Urgent => Tone::Danger,
            ExpirySeverity::Soon => Tone::Warn,
            ExpirySeverity::Pending => Tone::Info,
        }
    }
}

/// Tone for an overstocked product: 20 or more units over is a warning
pub fn overstock_tone(extra: Decimal) -> Tone {
    if extra >= Decimal::from(20) {
        Tone::Warn
    } else {
        Tone::Muted
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LowStockRow {
    pub product_id: Uuid,
    pub sku: String,
    pub name: String,
    pub stock: Decimal,
    pub min_stock: Decimal,
    pub diff: Decimal,
    pub severity: LowStockSeverity,
    pub tone: Tone,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExpiringRow {
    pub product_id: Uuid,
    pub sku: String,
    pub name: String,
    pub expiration_date: NaiveDate,
    pub days_left: i64,
    pub severity: ExpirySeverity,
    pub tone: Tone,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OverstockRow {
    pub product_id: Uuid,
    pub sku: String,
    pub name: String,
    pub stock: Decimal,
    pub max_stock: Decimal,
    pub extra: Decimal,
    pub tone: Tone,
}

/// Active products at or below their minimum, worst first.
///
/// A product with no minimum of its own (`min_stock == 0`) is checked
/// against `fallback_min`. When the effective minimum is zero only
/// negative stock is flagged.
pub fn low_stock(rows: &[StockRow], fallback_min: Decimal) -> Vec<LowStockRow> {
    let mut flagged: Vec<LowStockRow> = rows
        .iter()
        .filter(|r| r.active)
        .filter_map(|r| {
            let min = effective_min_stock(r.min_stock, fallback_min);
            if !is_low_stock(r.stock, min) {
                return None;
            }
            let diff = min - r.stock;
            let severity = LowStockSeverity::classify(diff);
            Some(LowStockRow {
                product_id: r.product_id,
                sku: r.sku.clone(),
                name: r.name.clone(),
                stock: r.stock,
                min_stock: min,
                diff,
                severity,
                tone: severity.tone(),
            })
        })
        .collect();
    flagged.sort_by(|a, b| b.diff.cmp(&a.diff).then_with(|| a.name.cmp(&b.name)));
    flagged
}

/// Active products expiring within `horizon_days` of `today` (already
/// expired ones included), soonest first
pub fn expiring_soon(products: &[Product], today: NaiveDate, horizon_days: i64) -> Vec<ExpiringRow> {
    let mut rows: Vec<ExpiringRow> = products
        .iter()
        .filter(|p| p.active)
        .filter_map(|p| {
            let expiration_date = p.expiration_date?;
            let days_left = (expiration_date - today).num_days();
            if days_left > horizon_days {
                return None;
            }
            let severity = ExpirySeverity::classify(days_left);
            Some(ExpiringRow {
                product_id: p.id,
                sku: p.sku.clone(),
                name: p.name.clone(),
                expiration_date,
                days_left,
                severity,
                tone: severity.tone(),
            })
        })
        .collect();
    rows.sort_by(|a, b| a.days_left.cmp(&b.days_left).then_with(|| a.name.cmp(&b.name)));
    rows
}

/// Active products above their maximum, largest excess first
pub fn overstock(rows: &[StockRow]) -> Vec<OverstockRow> {
    let mut flagged: Vec<OverstockRow> = rows
        .iter()
        .filter(|r| r.active)
        .filter_map(|r| {
            let max_stock = r.max_stock?;
            if r.stock <= max_stock {
                return None;
            }
            let extra = r.stock - max_stock;
            Some(OverstockRow {
                product_id: r.product_id,
                sku: r.sku.clone(),
                name: r.name.clone(),
                stock: r.stock,
                max_stock,
                extra,
                tone: overstock_tone(extra),
            })
        })
        .collect();
    flagged.sort_by(|a, b| b.extra.cmp(&a.extra).then_with(|| a.name.cmp(&b.name)));
    flagged
}
