//! Supplier and purchase order models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::ParseEnumError;

/// A supplier of goods
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Supplier {
    pub id: Uuid,
    pub org_id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Purchase order lifecycle.
///
/// ```text
/// draft ──▶ sent ──▶ received
///   │        │
///   └────────┴──▶ cancelled
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "purchase_order_status", rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum PurchaseOrderStatus {
    #[default]
    Draft,
    Sent,
    Received,
    Cancelled,
}

impl PurchaseOrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PurchaseOrderStatus::Draft => "draft",
            PurchaseOrderStatus::Sent => "sent",
            PurchaseOrderStatus::Received => "received",
            PurchaseOrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PurchaseOrderStatus::Draft => "Borrador",
            PurchaseOrderStatus::Sent => "Enviada",
            PurchaseOrderStatus::Received => "Recibida",
            PurchaseOrderStatus::Cancelled => "Cancelada",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PurchaseOrderStatus::Received | PurchaseOrderStatus::Cancelled)
    }

    /// Whether an order in this status may move to `next`. Re-applying the
    /// current status is always allowed.
    pub fn can_transition_to(&self, next: PurchaseOrderStatus) -> bool {
        use PurchaseOrderStatus::*;

        if *self == next {
            return true;
        }
        matches!(
            (self, next),
            (Draft, Sent) | (Draft, Cancelled) | (Sent, Received) | (Sent, Cancelled)
        )
    }
}

impl std::str::FromStr for PurchaseOrderStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(PurchaseOrderStatus::Draft),
            "sent" => Ok(PurchaseOrderStatus::Sent),
            "received" => Ok(PurchaseOrderStatus::Received),
            "cancelled" => Ok(PurchaseOrderStatus::Cancelled),
            other => Err(ParseEnumError::new("purchase order status", other)),
        }
    }
}

/// A purchase order header. Line items are not tracked.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct PurchaseOrder {
    pub id: Uuid,
    pub org_id: Uuid,
    pub supplier_id: Uuid,
    pub status: PurchaseOrderStatus,
    pub reference: Option<String>,
    pub notes: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use PurchaseOrderStatus::*;

    #[test]
    fn test_default_is_draft() {
        assert_eq!(PurchaseOrderStatus::default(), Draft);
    }

    #[test]
    fn test_terminal_states_are_final() {
        for next in [Draft, Sent, Received] {
            assert!(!Cancelled.can_transition_to(next));
        }
        for next in [Draft, Sent, Cancelled] {
            assert!(!Received.can_transition_to(next));
        }
        assert!(Received.can_transition_to(Received));
    }

    #[test]
    fn test_draft_cannot_skip_to_received() {
        assert!(!Draft.can_transition_to(Received));
        assert!(Draft.can_transition_to(Sent));
        assert!(Sent.can_transition_to(Received));
    }
}
