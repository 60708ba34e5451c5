//! Suppliers and purchase orders

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::models::{PurchaseOrder, PurchaseOrderStatus, Supplier};
use shared::validation::validate_required;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};

const PO_COLUMNS: &str = "id, org_id, supplier_id, status, reference, notes, created_by, created_at, updated_at";

/// Purchasing service
#[derive(Clone)]
pub struct PurchasingService {
    db: PgPool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SupplierInput {
    #[validate(length(min = 1, max = 200, message = "El nombre es obligatorio"))]
    pub name: String,
    #[validate(email(message = "Formato de email inválido"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePurchaseOrderInput {
    pub supplier_id: Uuid,
    pub reference: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePurchaseOrderInput {
    pub status: Option<PurchaseOrderStatus>,
    pub reference: Option<String>,
    pub notes: Option<String>,
}

/// Listing row with the supplier's name
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PurchaseOrderListItem {
    pub id: Uuid,
    pub supplier_id: Uuid,
    pub supplier_name: String,
    pub status: PurchaseOrderStatus,
    pub reference: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Reject illegal status changes
pub fn check_transition(current: PurchaseOrderStatus, next: PurchaseOrderStatus) -> AppResult<()> {
    if current.can_transition_to(next) {
        Ok(())
    } else {
        Err(AppError::InvalidStateTransition(format!(
            "No se puede pasar de {} a {}",
            current.label(),
            next.label()
        )))
    }
}

impl PurchasingService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    // ========================================================================
    // Suppliers
    // ========================================================================

    pub async fn list_suppliers(&self, org_id: Uuid, active_only: bool) -> AppResult<Vec<Supplier>> {
        let suppliers = sqlx::query_as::<_, Supplier>(
            r#"
            SELECT id, org_id, name, email, phone, active, created_at
            FROM suppliers
            WHERE org_id = $1 AND (NOT $2 OR active)
            ORDER BY name
            "#,
        )
        .bind(org_id)
        .bind(active_only)
        .fetch_all(&self.db)
        .await?;

        Ok(suppliers)
    }

    pub async fn create_supplier(&self, org_id: Uuid, input: SupplierInput) -> AppResult<Supplier> {
        input.validate()?;
        validate_required(&input.name).map_err(|m| AppError::validation("name", m))?;

        let supplier = sqlx::query_as::<_, Supplier>(
            r#"
            INSERT INTO suppliers (org_id, name, email, phone, active)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, org_id, name, email, phone, active, created_at
            "#,
        )
        .bind(org_id)
        .bind(input.name.trim())
        .bind(&input.email)
        .bind(&input.phone)
        .bind(input.active.unwrap_or(true))
        .fetch_one(&self.db)
        .await?;

        tracing::info!(org_id = %org_id, supplier_id = %supplier.id, "Supplier created");
        Ok(supplier)
    }

    pub async fn update_supplier(&self, org_id: Uuid, supplier_id: Uuid, input: SupplierInput) -> AppResult<Supplier> {
        input.validate()?;
        validate_required(&input.name).map_err(|m| AppError::validation("name", m))?;

        sqlx::query_as::<_, Supplier>(
            r#"
            UPDATE suppliers
            SET name = $3, email = $4, phone = $5, active = COALESCE($6, active)
            WHERE id = $1 AND org_id = $2
            RETURNING id, org_id, name, email, phone, active, created_at
            "#,
        )
        .bind(supplier_id)
        .bind(org_id)
        .bind(input.name.trim())
        .bind(&input.email)
        .bind(&input.phone)
        .bind(input.active)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Proveedor".to_string()))
    }

    // ========================================================================
    // Purchase orders
    // ========================================================================

    pub async fn list_orders(
        &self,
        org_id: Uuid,
        status: Option<PurchaseOrderStatus>,
    ) -> AppResult<Vec<PurchaseOrderListItem>> {
        let orders = sqlx::query_as::<_, PurchaseOrderListItem>(
            r#"
            SELECT po.id, po.supplier_id, s.name AS supplier_name, po.status, po.reference,
                   po.notes, po.created_at, po.updated_at
            FROM purchase_orders po
            JOIN suppliers s ON s.id = po.supplier_id
            WHERE po.org_id = $1 AND ($2::purchase_order_status IS NULL OR po.status = $2)
            ORDER BY po.created_at DESC
            "#,
        )
        .bind(org_id)
        .bind(status)
        .fetch_all(&self.db)
        .await?;

        Ok(orders)
    }

    /// Create a draft order for an active supplier of the org
    pub async fn create_order(
        &self,
        org_id: Uuid,
        user_id: Uuid,
        input: CreatePurchaseOrderInput,
    ) -> AppResult<PurchaseOrder> {
        let supplier_active = sqlx::query_scalar::<_, bool>(
            "SELECT active FROM suppliers WHERE id = $1 AND org_id = $2",
        )
        .bind(input.supplier_id)
        .bind(org_id)
        .fetch_optional(&self.db)
        .await?;

        match supplier_active {
            None => return Err(AppError::validation("supplier_id", "El proveedor no existe")),
            Some(false) => return Err(AppError::validation("supplier_id", "El proveedor está inactivo")),
            Some(true) => {}
        }

        let order = sqlx::query_as::<_, PurchaseOrder>(&format!(
            r#"
            INSERT INTO purchase_orders (org_id, supplier_id, status, reference, notes, created_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {PO_COLUMNS}
            "#
        ))
        .bind(org_id)
        .bind(input.supplier_id)
        .bind(PurchaseOrderStatus::Draft)
        .bind(&input.reference)
        .bind(&input.notes)
        .bind(user_id)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(org_id = %org_id, order_id = %order.id, "Purchase order created");
        Ok(order)
    }

    /// Update status, reference or notes. Status changes follow the order
    /// lifecycle; the row is locked while the transition is checked.
    pub async fn update_order(
        &self,
        org_id: Uuid,
        order_id: Uuid,
        input: UpdatePurchaseOrderInput,
    ) -> AppResult<PurchaseOrder> {
        let mut tx = self.db.begin().await?;

        let current = sqlx::query_scalar::<_, PurchaseOrderStatus>(
            "SELECT status FROM purchase_orders WHERE id = $1 AND org_id = $2 FOR UPDATE",
        )
        .bind(order_id)
        .bind(org_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Orden de compra".to_string()))?;

        let status = input.status.unwrap_or(current);
        check_transition(current, status)?;

        let order = sqlx::query_as::<_, PurchaseOrder>(&format!(
            r#"
            UPDATE purchase_orders
            SET status = $3,
                reference = COALESCE($4, reference),
                notes = COALESCE($5, notes),
                updated_at = NOW()
            WHERE id = $1 AND org_id = $2
            RETURNING {PO_COLUMNS}
            "#
        ))
        .bind(order_id)
        .bind(org_id)
        .bind(status)
        .bind(&input.reference)
        .bind(&input.notes)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        if status != current {
            tracing::info!(
                org_id = %org_id,
                order_id = %order_id,
                from = current.as_str(),
                to = status.as_str(),
                "Purchase order status changed"
            );
        }
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_transition_error_names_both_states() {
        let err = check_transition(PurchaseOrderStatus::Received, PurchaseOrderStatus::Draft).unwrap_err();
        match err {
            AppError::InvalidStateTransition(msg) => {
                assert!(msg.contains("Recibida"));
                assert!(msg.contains("Borrador"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(check_transition(PurchaseOrderStatus::Draft, PurchaseOrderStatus::Sent).is_ok());
    }
}
