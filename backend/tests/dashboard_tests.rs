//! Dashboard aggregate tests
//!
//! - Percentage split of supply buckets
//! - Legacy inbound/outbound buckets
//! - Stock health bands, KPIs and top products

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::ledger::{
    dashboard_kpis, low_stock, monthly_supply, normalize_supply, stock_health, to_pct3, top_products, LedgerEntry,
    MonthlyMovementTotal, StockRow, SupplyBucket,
};
use shared::models::MovementType;
use std::str::FromStr;
use uuid::Uuid;

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn stock_row(name: &str, stock: &str, min: &str, max: Option<&str>, cost: &str) -> StockRow {
    StockRow {
        product_id: Uuid::new_v4(),
        sku: name.to_uppercase(),
        name: name.to_string(),
        unit: "unidad".to_string(),
        stock: dec(stock),
        min_stock: dec(min),
        max_stock: max.map(dec),
        cost: dec(cost),
        active: true,
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// {warehouse: 30, in_transport: 10, retail: 0} → 75 / 25 / 0
    #[test]
    fn test_supply_split_scenario() {
        let bucket = SupplyBucket::Split {
            period: "2024-05".to_string(),
            warehouse: dec("30"),
            in_transport: dec("10"),
            retail: dec("0"),
        };
        let points = normalize_supply(&[bucket]);
        assert_eq!(points[0].warehouse_pct, 75);
        assert_eq!(points[0].in_transport_pct, 25);
        assert_eq!(points[0].retail_pct, 0);
    }

    #[test]
    fn test_legacy_bucket_maps_to_warehouse_and_retail() {
        let json = r#"{"shape":"legacy","period":"2024-04","inbound":"80","outbound":"20"}"#;
        let bucket: SupplyBucket = serde_json::from_str(json).unwrap();
        let point = &normalize_supply(&[bucket])[0];

        assert_eq!(point.period, "2024-04");
        assert_eq!(point.in_transport, Decimal::ZERO);
        assert_eq!(
            (point.warehouse_pct, point.in_transport_pct, point.retail_pct),
            (80, 0, 20)
        );
    }

    #[test]
    fn test_all_zero_bucket() {
        assert_eq!(to_pct3(Decimal::ZERO, Decimal::ZERO, Decimal::ZERO), (0, 0, 0));
    }

    #[test]
    fn test_rounding_thirds() {
        assert_eq!(to_pct3(dec("1"), dec("1"), dec("1")), (33, 33, 34));
        assert_eq!(to_pct3(dec("1"), dec("1"), dec("0")), (50, 50, 0));
    }

    #[test]
    fn test_monthly_supply_keeps_latest_months_oldest_first() {
        let month = |m: u32| NaiveDate::from_ymd_opt(2024, m, 1).unwrap();
        let rows = vec![
            MonthlyMovementTotal { period: month(3), movement_type: MovementType::In, quantity: dec("10") },
            MonthlyMovementTotal { period: month(1), movement_type: MovementType::In, quantity: dec("5") },
            MonthlyMovementTotal { period: month(2), movement_type: MovementType::Out, quantity: dec("4") },
            MonthlyMovementTotal { period: month(3), movement_type: MovementType::Transfer, quantity: dec("2") },
        ];

        let buckets = monthly_supply(&rows, 2);
        let periods: Vec<&str> = buckets.iter().map(|b| b.period()).collect();
        assert_eq!(periods, vec!["2024-02", "2024-03"]);
        assert_eq!(buckets[1].parts(), (dec("10"), dec("2"), Decimal::ZERO));
    }

    #[test]
    fn test_stock_health_bands() {
        let rows = [
            stock_row("A", "50", "10", Some("100"), "1"),
            stock_row("B", "5", "10", None, "1"),
            stock_row("C", "150", "10", Some("100"), "1"),
            stock_row("D", "20", "10", None, "1"),
        ];
        let health = stock_health(&rows, Decimal::ZERO);
        assert_eq!(health.overall, 50);
        assert_eq!(health.under, 25);
        assert_eq!(health.over, 25);
    }

    /// The health chart counts as "under" exactly what the low-stock alert flags
    #[test]
    fn test_stock_health_agrees_with_low_stock() {
        let rows = [
            stock_row("Agua", "4", "0", None, "1"),
            stock_row("Hielo", "-5", "0", None, "1"),
            stock_row("Pan", "50", "10", None, "1"),
            stock_row("Sal", "0", "0", None, "1"),
        ];
        let threshold = dec("10");
        let flagged = low_stock(&rows, threshold);
        let health = stock_health(&rows, threshold);
        assert_eq!(flagged.len(), 2);
        assert_eq!(health.under, 50);
        assert_eq!(health.overall, 50);
    }

    #[test]
    fn test_kpis_ignore_negative_stock_for_value() {
        let rows = [
            stock_row("A", "10", "0", None, "2.50"),
            stock_row("B", "-4", "0", None, "10"),
        ];
        let kpis = dashboard_kpis(&rows, 1, 3);
        assert_eq!(kpis.stock_total, dec("6"));
        assert_eq!(kpis.inventory_value, dec("25.00"));
        assert_eq!(kpis.low_stock_count, 1);
        assert_eq!(kpis.movements_today, 3);
    }

    #[test]
    fn test_top_products_ranked_by_outbound() {
        let a = stock_row("A", "0", "0", None, "1");
        let b = stock_row("B", "0", "0", None, "1");
        let c = stock_row("C", "0", "0", None, "1");
        let w = Uuid::new_v4();
        let out = |p: Uuid, q: &str| LedgerEntry {
            product_id: p,
            warehouse_id: w,
            destination_warehouse_id: None,
            movement_type: MovementType::Out,
            quantity: dec(q),
        };
        let entries = vec![out(a.product_id, "3"), out(b.product_id, "9"), out(a.product_id, "2")];

        let top = top_products(&[a, b, c], &entries, 5);
        let names: Vec<&str> = top.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A"]);
        assert_eq!(top[1].outbound, dec("5"));
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

        /// Any non-empty split sums to exactly 100 with every part in range
        #[test]
        fn prop_pct3_sums_to_hundred(a in 0u32..100_000, b in 0u32..100_000, c in 0u32..100_000) {
            prop_assume!(a + b + c > 0);
            let (w, t, r) = to_pct3(Decimal::from(a), Decimal::from(b), Decimal::from(c));
            prop_assert_eq!(w + t + r, 100);
            prop_assert!(w <= 100 && t <= 100 && r <= 100);
        }

        /// A zero input never receives a share, except as the remainder slot
        #[test]
        fn prop_pct3_zero_first_share(b in 1u32..10_000, c in 0u32..10_000) {
            let (w, _, _) = to_pct3(Decimal::ZERO, Decimal::from(b), Decimal::from(c));
            prop_assert_eq!(w, 0);
        }

        /// Scaling every input by the same factor does not change the split
        #[test]
        fn prop_pct3_scale_invariant(a in 0u32..1000, b in 0u32..1000, c in 0u32..1000, k in 1u32..50) {
            prop_assume!(a + b + c > 0);
            let base = to_pct3(Decimal::from(a), Decimal::from(b), Decimal::from(c));
            let scaled = to_pct3(Decimal::from(a * k), Decimal::from(b * k), Decimal::from(c * k));
            prop_assert_eq!(base, scaled);
        }
    }
}
