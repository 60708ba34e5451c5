//! Alert classification tests
//!
//! - Low-stock severity tiers and the org-wide fallback minimum
//! - Expiry tiers and the look-ahead horizon
//! - Overstock detection

use chrono::{Duration, NaiveDate, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::ledger::{
    expiring_soon, low_stock, overstock, overstock_tone, ExpirySeverity, LowStockSeverity, StockRow,
};
use shared::models::Product;
use shared::types::Tone;
use std::str::FromStr;
use uuid::Uuid;

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn row(name: &str, stock: &str, min: &str, max: Option<&str>) -> StockRow {
    StockRow {
        product_id: Uuid::new_v4(),
        sku: name.to_uppercase(),
        name: name.to_string(),
        unit: "unidad".to_string(),
        stock: dec(stock),
        min_stock: dec(min),
        max_stock: max.map(dec),
        cost: dec("1"),
        active: true,
    }
}

fn expiring_product(name: &str, expiration_date: Option<NaiveDate>) -> Product {
    let now = Utc::now();
    Product {
        id: Uuid::new_v4(),
        org_id: Uuid::nil(),
        sku: name.to_uppercase(),
        name: name.to_string(),
        category_id: None,
        unit: "unidad".to_string(),
        cost: Decimal::ZERO,
        price: Decimal::ZERO,
        discount_percent: Decimal::ZERO,
        tax_percent: Decimal::ZERO,
        min_stock: Decimal::ZERO,
        max_stock: None,
        expiration_date,
        barcode: None,
        description: None,
        image_url: None,
        active: true,
        created_at: now,
        updated_at: now,
    }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Stock 5 against a minimum of 30 is 25 short: "Crítico"
    #[test]
    fn test_critical_scenario() {
        let flagged = low_stock(&[row("Arroz", "5", "30", None)], Decimal::ZERO);
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].diff, dec("25"));
        assert_eq!(flagged[0].severity, LowStockSeverity::Critical);
        assert_eq!(flagged[0].severity.label(), "Crítico");
        assert_eq!(flagged[0].tone, Tone::Danger);
    }

    /// Oversold stock is flagged even when no minimum is configured
    #[test]
    fn test_negative_stock_without_minimum() {
        let flagged = low_stock(&[row("Hielo", "-5", "0", None)], Decimal::ZERO);
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].stock, dec("-5"));
        assert_eq!(flagged[0].diff, dec("5"));
    }

    #[test]
    fn test_low_stock_tier_boundaries() {
        assert_eq!(LowStockSeverity::classify(dec("20")), LowStockSeverity::Critical);
        assert_eq!(LowStockSeverity::classify(dec("19.99")), LowStockSeverity::Attention);
        assert_eq!(LowStockSeverity::classify(dec("5")), LowStockSeverity::Attention);
        assert_eq!(LowStockSeverity::classify(dec("4")), LowStockSeverity::Low);
        assert_eq!(LowStockSeverity::classify(dec("0")), LowStockSeverity::Low);
    }

    #[test]
    fn test_stock_at_minimum_is_flagged() {
        let flagged = low_stock(&[row("Sal", "10", "10", None)], Decimal::ZERO);
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].severity, LowStockSeverity::Low);
    }

    #[test]
    fn test_fallback_minimum_applies_without_own_minimum() {
        let rows = [row("Azúcar", "2", "0", None)];
        assert!(low_stock(&rows, Decimal::ZERO).is_empty());

        let flagged = low_stock(&rows, dec("8"));
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].min_stock, dec("8"));
        assert_eq!(flagged[0].diff, dec("6"));
    }

    #[test]
    fn test_inactive_products_are_not_flagged() {
        let mut r = row("Aceite", "0", "50", None);
        r.active = false;
        assert!(low_stock(&[r], Decimal::ZERO).is_empty());
    }

    #[test]
    fn test_low_stock_sorted_worst_first() {
        let flagged = low_stock(
            &[row("B", "9", "10", None), row("A", "0", "40", None), row("C", "3", "10", None)],
            Decimal::ZERO,
        );
        let names: Vec<&str> = flagged.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["A", "C", "B"]);
    }

    #[test]
    fn test_expiry_tiers() {
        assert_eq!(ExpirySeverity::classify(-2), ExpirySeverity::Expired);
        assert_eq!(ExpirySeverity::classify(0), ExpirySeverity::Expired);
        assert_eq!(ExpirySeverity::classify(1), ExpirySeverity::Urgent);
        assert_eq!(ExpirySeverity::classify(3), ExpirySeverity::Urgent);
        assert_eq!(ExpirySeverity::classify(4), ExpirySeverity::Soon);
        assert_eq!(ExpirySeverity::classify(10), ExpirySeverity::Soon);
        assert_eq!(ExpirySeverity::classify(11), ExpirySeverity::Pending);
        assert_eq!(ExpirySeverity::Urgent.label(), "Urgente");
    }

    #[test]
    fn test_expiring_respects_horizon() {
        let products = [
            expiring_product("Leche", Some(today() + Duration::days(2))),
            expiring_product("Queso", Some(today() + Duration::days(45))),
            expiring_product("Yogur", Some(today() - Duration::days(1))),
            expiring_product("Pan", None),
        ];

        let rows = expiring_soon(&products, today(), 30);
        let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Yogur", "Leche"]);
        assert_eq!(rows[0].severity, ExpirySeverity::Expired);
        assert_eq!(rows[1].days_left, 2);
    }

    #[test]
    fn test_overstock_only_with_maximum() {
        let rows = [
            row("Agua", "130", "0", Some("100")),
            row("Jugo", "500", "0", None),
            row("Soda", "105", "0", Some("100")),
        ];
        let flagged = overstock(&rows);
        assert_eq!(flagged.len(), 2);
        assert_eq!(flagged[0].name, "Agua");
        assert_eq!(flagged[0].extra, dec("30"));
        assert_eq!(flagged[0].tone, Tone::Warn);
        assert_eq!(flagged[1].tone, Tone::Muted);
        assert_eq!(overstock_tone(dec("20")), Tone::Warn);
    }

    #[test]
    fn test_severity_serializes_as_label() {
        let json = serde_json::to_string(&LowStockSeverity::Attention).unwrap();
        assert_eq!(json, "\"Atención\"");
        let json = serde_json::to_string(&ExpirySeverity::Pending).unwrap();
        assert_eq!(json, "\"Pendiente\"");
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// A product is flagged exactly when its stock is at or below a
        /// positive minimum, or negative without one; the diff is min − stock
        #[test]
        fn prop_low_stock_flags_iff_at_or_below_min(stock in -50i64..200, min in 0i64..150) {
            let r = StockRow {
                stock: Decimal::from(stock),
                min_stock: Decimal::from(min),
                ..row("P", "0", "0", None)
            };
            let flagged = low_stock(&[r], Decimal::ZERO);

            if (min > 0 && stock <= min) || stock < 0 {
                prop_assert_eq!(flagged.len(), 1);
                prop_assert_eq!(flagged[0].diff, Decimal::from(min - stock));
                prop_assert_eq!(flagged[0].severity, LowStockSeverity::classify(Decimal::from(min - stock)));
            } else {
                prop_assert!(flagged.is_empty());
            }
        }

        /// Severity gets no milder as the shortfall grows
        #[test]
        fn prop_low_stock_severity_monotonic(a in 0i64..100, b in 0i64..100) {
            let rank = |s: LowStockSeverity| match s {
                LowStockSeverity::Low => 0,
                LowStockSeverity::Attention => 1,
                LowStockSeverity::Critical => 2,
            };
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(
                rank(LowStockSeverity::classify(Decimal::from(lo)))
                    <= rank(LowStockSeverity::classify(Decimal::from(hi)))
            );
        }

        /// Nothing beyond the horizon is listed
        #[test]
        fn prop_expiring_within_horizon(offset in -60i64..120, horizon in 0i64..90) {
            let p = expiring_product("P", Some(today() + Duration::days(offset)));
            let rows = expiring_soon(&[p], today(), horizon);
            prop_assert_eq!(rows.len() == 1, offset <= horizon);
        }
    }
}
