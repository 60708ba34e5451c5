//! Stock ledger tests
//!
//! Tests for stock aggregation including:
//! - Stock is Σ in − Σ out per product; transfers move stock between
//!   warehouses without changing the product total
//! - Aggregation does not depend on movement order
//! - Kardex running balance

use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::ledger::{
    kardex, stock_by_product, stock_by_product_and_warehouse, stock_totals, stock_totals_by_warehouse, LedgerEntry,
};
use shared::models::{InventoryMovement, MovementType, Product};
use std::str::FromStr;
use uuid::Uuid;

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn product(id: Uuid, sku: &str) -> Product {
    let now = Utc::now();
    Product {
        id,
        org_id: Uuid::nil(),
        sku: sku.to_string(),
        name: format!("Producto {sku}"),
        category_id: None,
        unit: "unidad".to_string(),
        cost: dec("2.50"),
        price: dec("4.00"),
        discount_percent: Decimal::ZERO,
        tax_percent: dec("18"),
        min_stock: Decimal::ZERO,
        max_stock: None,
        expiration_date: None,
        barcode: None,
        description: None,
        image_url: None,
        active: true,
        created_at: now,
        updated_at: now,
    }
}

fn entry(product_id: Uuid, warehouse_id: Uuid, movement_type: MovementType, quantity: Decimal) -> LedgerEntry {
    LedgerEntry {
        product_id,
        warehouse_id,
        destination_warehouse_id: None,
        movement_type,
        quantity,
    }
}

fn transfer(product_id: Uuid, from: Uuid, to: Uuid, quantity: Decimal) -> LedgerEntry {
    LedgerEntry {
        destination_warehouse_id: Some(to),
        ..entry(product_id, from, MovementType::Transfer, quantity)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Inbound 60 then outbound 10 leaves 50 on hand
    #[test]
    fn test_in_then_out_scenario() {
        let p = Uuid::new_v4();
        let w = Uuid::new_v4();
        let entries = vec![
            entry(p, w, MovementType::In, dec("60")),
            entry(p, w, MovementType::Out, dec("10")),
        ];

        let rows = stock_by_product(&[product(p, "P-1")], &entries);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].stock, dec("50"));
    }

    #[test]
    fn test_product_without_movements_has_zero_stock() {
        let p = Uuid::new_v4();
        let rows = stock_by_product(&[product(p, "P-1")], &[]);
        assert_eq!(rows[0].stock, Decimal::ZERO);
    }

    #[test]
    fn test_negative_stock_is_reported() {
        let p = Uuid::new_v4();
        let w = Uuid::new_v4();
        let entries = vec![
            entry(p, w, MovementType::In, dec("5")),
            entry(p, w, MovementType::Out, dec("8")),
        ];
        let rows = stock_by_product(&[product(p, "P-1")], &entries);
        assert_eq!(rows[0].stock, dec("-3"));
    }

    #[test]
    fn test_transfer_keeps_product_total() {
        let p = Uuid::new_v4();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let entries = vec![entry(p, a, MovementType::In, dec("40")), transfer(p, a, b, dec("15"))];

        assert_eq!(stock_totals(&entries)[&p], dec("40"));

        let by_warehouse = stock_totals_by_warehouse(&entries);
        assert_eq!(by_warehouse[&(p, a)], dec("25"));
        assert_eq!(by_warehouse[&(p, b)], dec("15"));
    }

    #[test]
    fn test_warehouse_rows_skip_empty_balances() {
        let p = Uuid::new_v4();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let entries = vec![entry(p, a, MovementType::In, dec("10")), transfer(p, a, b, dec("10"))];

        let rows = stock_by_product_and_warehouse(&entries);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].warehouse_id, b);
        assert_eq!(rows[0].stock, dec("10"));
    }

    #[test]
    fn test_products_are_isolated() {
        let p1 = Uuid::new_v4();
        let p2 = Uuid::new_v4();
        let w = Uuid::new_v4();
        let entries = vec![
            entry(p1, w, MovementType::In, dec("7")),
            entry(p2, w, MovementType::In, dec("3")),
            entry(p2, w, MovementType::Out, dec("1")),
        ];

        let rows = stock_by_product(&[product(p1, "A"), product(p2, "B")], &entries);
        assert_eq!(rows[0].stock, dec("7"));
        assert_eq!(rows[1].stock, dec("2"));
    }

    #[test]
    fn test_kardex_running_balance() {
        let p = Uuid::new_v4();
        let w = Uuid::new_v4();
        let w2 = Uuid::new_v4();
        let movement = |minute: u32, movement_type: MovementType, qty: &str, dest: Option<Uuid>| InventoryMovement {
            id: Uuid::new_v4(),
            org_id: Uuid::nil(),
            product_id: p,
            warehouse_id: w,
            destination_warehouse_id: dest,
            movement_type,
            quantity: dec(qty),
            reference: None,
            origin: None,
            reason: None,
            notes: None,
            created_by: None,
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 9, minute, 0).unwrap(),
        };

        let lines = kardex(&[
            movement(0, MovementType::In, "60", None),
            movement(5, MovementType::Out, "10", None),
            movement(10, MovementType::Transfer, "20", Some(w2)),
            movement(15, MovementType::Out, "5", None),
        ]);

        let balances: Vec<Decimal> = lines.iter().map(|l| l.balance).collect();
        assert_eq!(balances, vec![dec("60"), dec("50"), dec("50"), dec("45")]);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

fn movement_kind() -> impl Strategy<Value = MovementType> {
    prop_oneof![
        Just(MovementType::In),
        Just(MovementType::Out),
        Just(MovementType::Transfer),
    ]
}

#[cfg(test)]
mod property_tests {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Product stock equals Σ in − Σ out regardless of transfers
        #[test]
        fn prop_stock_is_inbound_minus_outbound(
            moves in prop::collection::vec((movement_kind(), 1u32..1000), 0..40),
        ) {
            let p = Uuid::from_u128(1);
            let a = Uuid::from_u128(10);
            let b = Uuid::from_u128(11);

            let entries: Vec<LedgerEntry> = moves
                .iter()
                .map(|(kind, qty)| match kind {
                    MovementType::Transfer => transfer(p, a, b, Decimal::from(*qty)),
                    other => entry(p, a, *other, Decimal::from(*qty)),
                })
                .collect();

            let expected: Decimal = moves
                .iter()
                .map(|(kind, qty)| match kind {
                    MovementType::In => Decimal::from(*qty),
                    MovementType::Out => -Decimal::from(*qty),
                    MovementType::Transfer => Decimal::ZERO,
                })
                .sum();

            let rows = stock_by_product(&[product(p, "P")], &entries);
            prop_assert_eq!(rows[0].stock, expected);
        }

        /// Warehouse balances always add back up to the product total
        #[test]
        fn prop_warehouse_split_sums_to_total(
            moves in prop::collection::vec((movement_kind(), 1u32..500, any::<bool>()), 0..40),
        ) {
            let p = Uuid::from_u128(1);
            let a = Uuid::from_u128(10);
            let b = Uuid::from_u128(11);

            let entries: Vec<LedgerEntry> = moves
                .iter()
                .map(|(kind, qty, flip)| {
                    let (from, to) = if *flip { (b, a) } else { (a, b) };
                    match kind {
                        MovementType::Transfer => transfer(p, from, to, Decimal::from(*qty)),
                        other => entry(p, from, *other, Decimal::from(*qty)),
                    }
                })
                .collect();

            let total = stock_totals(&entries).get(&p).copied().unwrap_or_default();
            let split: Decimal = stock_totals_by_warehouse(&entries).values().copied().sum();
            prop_assert_eq!(split, total);
        }

        /// Reordering movements does not change any balance
        #[test]
        fn prop_order_independent(
            moves in prop::collection::vec((movement_kind(), 1u32..1000), 1..30),
            seed in any::<u64>(),
        ) {
            let p = Uuid::from_u128(1);
            let a = Uuid::from_u128(10);
            let b = Uuid::from_u128(11);

            let entries: Vec<LedgerEntry> = moves
                .iter()
                .map(|(kind, qty)| match kind {
                    MovementType::Transfer => transfer(p, a, b, Decimal::from(*qty)),
                    other => entry(p, a, *other, Decimal::from(*qty)),
                })
                .collect();

            let mut shuffled = entries.clone();
            let len = shuffled.len();
            shuffled.rotate_left((seed as usize) % len);
            shuffled.reverse();

            prop_assert_eq!(stock_totals(&entries), stock_totals(&shuffled));
            prop_assert_eq!(
                stock_by_product_and_warehouse(&entries),
                stock_by_product_and_warehouse(&shuffled)
            );
        }
    }
}
