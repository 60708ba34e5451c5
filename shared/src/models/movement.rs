//! Stock movement models (the ledger rows)

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::ParseEnumError;

/// Kind of stock movement
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "movement_type", rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
    In,
    Out,
    Transfer,
}

impl MovementType {
    /// Contribution of one unit of this movement to the product total.
    /// Transfers move stock between warehouses and leave the total alone.
    pub fn sign(&self) -> i32 {
        match self {
            MovementType::In => 1,
            MovementType::Out => -1,
            MovementType::Transfer => 0,
        }
    }

    /// Signed quantity for the product total
    pub fn signed(&self, quantity: Decimal) -> Decimal {
        quantity * Decimal::from(self.sign())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::In => "in",
            MovementType::Out => "out",
            MovementType::Transfer => "transfer",
        }
    }

    /// Label shown in movement listings and reports
    pub fn label(&self) -> &'static str {
        match self {
            MovementType::In => "Entrada",
            MovementType::Out => "Salida",
            MovementType::Transfer => "Transfer",
        }
    }
}

impl std::str::FromStr for MovementType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in" => Ok(MovementType::In),
            "out" => Ok(MovementType::Out),
            "transfer" => Ok(MovementType::Transfer),
            other => Err(ParseEnumError::new("movement type", other)),
        }
    }
}

/// Why stock left a warehouse
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "outbound_reason", rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum OutboundReason {
    Sale,
    Shrinkage,
    Adjustment,
    SupplierReturn,
    TransferSent,
    Other,
}

impl OutboundReason {
    pub const ALL: [OutboundReason; 6] = [
        OutboundReason::Sale,
        OutboundReason::Shrinkage,
        OutboundReason::Adjustment,
        OutboundReason::SupplierReturn,
        OutboundReason::TransferSent,
        OutboundReason::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            OutboundReason::Sale => "Venta",
            OutboundReason::Shrinkage => "Merma",
            OutboundReason::Adjustment => "Ajuste",
            OutboundReason::SupplierReturn => "Devolución a proveedor",
            OutboundReason::TransferSent => "Transferencia enviada",
            OutboundReason::Other => "Otro",
        }
    }

    /// Reference stored when the caller gives none. Empty for `Other`.
    pub fn preset_reference(&self) -> &'static str {
        match self {
            OutboundReason::Sale => "VENTA",
            OutboundReason::Shrinkage => "MERMA",
            OutboundReason::Adjustment => "AJUSTE-",
            OutboundReason::SupplierReturn => "DEV-PROV",
            OutboundReason::TransferSent => "TR-OUT",
            OutboundReason::Other => "",
        }
    }
}

/// An immutable ledger row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct InventoryMovement {
    pub id: Uuid,
    pub org_id: Uuid,
    pub product_id: Uuid,
    pub warehouse_id: Uuid,
    pub destination_warehouse_id: Option<Uuid>,
    #[cfg_attr(feature = "sqlx", sqlx(rename = "type"))]
    #[serde(rename = "type")]
    pub movement_type: MovementType,
    pub quantity: Decimal,
    pub reference: Option<String>,
    pub origin: Option<String>,
    pub reason: Option<OutboundReason>,
    pub notes: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl InventoryMovement {
    /// Signed contribution to the product total
    pub fn signed_quantity(&self) -> Decimal {
        self.movement_type.signed(self.quantity)
    }
}

/// Resolve the reference stored for an outbound movement: the caller's own
/// reference wins, then the reason's preset
pub fn outbound_reference(reference: Option<&str>, reason: Option<OutboundReason>) -> Option<String> {
    match reference.map(str::trim) {
        Some(r) if !r.is_empty() => Some(r.to_string()),
        _ => reason
            .map(|r| r.preset_reference())
            .filter(|r| !r.is_empty())
            .map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movement(kind: MovementType, qty: i64, from: Uuid, to: Option<Uuid>) -> InventoryMovement {
        InventoryMovement {
            id: Uuid::new_v4(),
            org_id: Uuid::nil(),
            product_id: Uuid::nil(),
            warehouse_id: from,
            destination_warehouse_id: to,
            movement_type: kind,
            quantity: Decimal::from(qty),
            reference: None,
            origin: None,
            reason: None,
            notes: None,
            created_by: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_signs() {
        assert_eq!(MovementType::In.signed(Decimal::from(7)), Decimal::from(7));
        assert_eq!(MovementType::Out.signed(Decimal::from(7)), Decimal::from(-7));
        assert_eq!(MovementType::Transfer.signed(Decimal::from(7)), Decimal::ZERO);
    }

    #[test]
    fn test_movement_signed_quantity() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(movement(MovementType::Transfer, 4, a, Some(b)).signed_quantity(), Decimal::ZERO);
        assert_eq!(movement(MovementType::Out, 3, a, None).signed_quantity(), Decimal::from(-3));
    }

    #[test]
    fn test_outbound_reference_presets() {
        assert_eq!(
            outbound_reference(None, Some(OutboundReason::Sale)).as_deref(),
            Some("VENTA")
        );
        assert_eq!(
            outbound_reference(Some("F-001"), Some(OutboundReason::Sale)).as_deref(),
            Some("F-001")
        );
        assert_eq!(outbound_reference(Some("  "), Some(OutboundReason::Other)), None);
        assert_eq!(outbound_reference(None, None), None);
    }

    #[test]
    fn test_parse_movement_type() {
        assert_eq!("transfer".parse::<MovementType>().unwrap(), MovementType::Transfer);
        assert!("adjust".parse::<MovementType>().is_err());
    }
}
