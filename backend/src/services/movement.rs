//! Stock movement recording (the ledger writes)
//!
//! Movements are append-only: nothing here updates or deletes a row.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::models::{outbound_reference, InventoryMovement, MovementType, OutboundReason};
use shared::validation::{validate_quantity, validate_reference, validate_transfer_destination};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::non_blank;
use crate::services::settings::SettingsService;

const MOVEMENT_COLUMNS: &str = "id, org_id, product_id, warehouse_id, destination_warehouse_id, type, quantity, \
    reference, origin, reason, notes, created_by, created_at";

pub const DEFAULT_MOVEMENT_LIMIT: i64 = 50;

/// Movement service
#[derive(Clone)]
pub struct MovementService {
    db: PgPool,
}

#[derive(Debug, Deserialize)]
pub struct InboundInput {
    pub product_id: Uuid,
    pub warehouse_id: Option<Uuid>,
    pub quantity: Decimal,
    pub reference: Option<String>,
    /// Where the goods came from (supplier, purchase, production...)
    pub origin: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OutboundInput {
    pub product_id: Uuid,
    pub warehouse_id: Option<Uuid>,
    pub quantity: Decimal,
    pub reason: Option<OutboundReason>,
    pub reference: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TransferInput {
    pub product_id: Uuid,
    pub warehouse_id: Option<Uuid>,
    pub destination_warehouse_id: Uuid,
    pub quantity: Decimal,
    pub reference: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MovementFilter {
    #[serde(rename = "type")]
    pub movement_type: Option<MovementType>,
    pub product_id: Option<Uuid>,
    pub limit: Option<i64>,
}

/// Listing row with display names
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MovementListItem {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_sku: String,
    pub product_name: String,
    pub warehouse_id: Uuid,
    pub warehouse_name: String,
    pub destination_warehouse_id: Option<Uuid>,
    pub destination_warehouse_name: Option<String>,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub movement_type: MovementType,
    pub quantity: Decimal,
    pub reference: Option<String>,
    pub origin: Option<String>,
    pub reason: Option<OutboundReason>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A validated movement ready for insert
struct NewMovement {
    product_id: Uuid,
    warehouse_id: Option<Uuid>,
    destination_warehouse_id: Option<Uuid>,
    movement_type: MovementType,
    quantity: Decimal,
    reference: Option<String>,
    origin: Option<String>,
    reason: Option<OutboundReason>,
    notes: Option<String>,
}

impl MovementService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Most recent movements first
    pub async fn list_recent(&self, org_id: Uuid, filter: &MovementFilter) -> AppResult<Vec<MovementListItem>> {
        let limit = filter.limit.unwrap_or(DEFAULT_MOVEMENT_LIMIT).clamp(1, 500);

        let movements = sqlx::query_as::<_, MovementListItem>(
            r#"
            SELECT m.id, m.product_id, p.sku AS product_sku, p.name AS product_name,
                   m.warehouse_id, w.name AS warehouse_name,
                   m.destination_warehouse_id, d.name AS destination_warehouse_name,
                   m.type, m.quantity, m.reference, m.origin, m.reason, m.notes, m.created_at
            FROM inventory_movements m
            JOIN products p ON p.id = m.product_id
            JOIN warehouses w ON w.id = m.warehouse_id
            LEFT JOIN warehouses d ON d.id = m.destination_warehouse_id
            WHERE m.org_id = $1
              AND ($2::movement_type IS NULL OR m.type = $2)
              AND ($3::uuid IS NULL OR m.product_id = $3)
            ORDER BY m.created_at DESC
            LIMIT $4
            "#,
        )
        .bind(org_id)
        .bind(filter.movement_type)
        .bind(filter.product_id)
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        Ok(movements)
    }

    /// Every movement of one product, oldest first
    pub async fn product_history(&self, org_id: Uuid, product_id: Uuid) -> AppResult<Vec<InventoryMovement>> {
        let movements = sqlx::query_as::<_, InventoryMovement>(&format!(
            r#"
            SELECT {MOVEMENT_COLUMNS}
            FROM inventory_movements
            WHERE org_id = $1 AND product_id = $2
            ORDER BY created_at, id
            "#
        ))
        .bind(org_id)
        .bind(product_id)
        .fetch_all(&self.db)
        .await?;

        Ok(movements)
    }

    pub async fn record_inbound(&self, org_id: Uuid, user_id: Uuid, input: InboundInput) -> AppResult<InventoryMovement> {
        self.record(
            org_id,
            user_id,
            NewMovement {
                product_id: input.product_id,
                warehouse_id: input.warehouse_id,
                destination_warehouse_id: None,
                movement_type: MovementType::In,
                quantity: input.quantity,
                reference: non_blank(input.reference),
                origin: non_blank(input.origin),
                reason: None,
                notes: non_blank(input.notes),
            },
        )
        .await
    }

    /// Record an outbound movement. Without an explicit reference, the
    /// reason's preset reference is stored.
    pub async fn record_outbound(&self, org_id: Uuid, user_id: Uuid, input: OutboundInput) -> AppResult<InventoryMovement> {
        let reference = outbound_reference(input.reference.as_deref(), input.reason);
        self.record(
            org_id,
            user_id,
            NewMovement {
                product_id: input.product_id,
                warehouse_id: input.warehouse_id,
                destination_warehouse_id: None,
                movement_type: MovementType::Out,
                quantity: input.quantity,
                reference,
                origin: None,
                reason: input.reason,
                notes: non_blank(input.notes),
            },
        )
        .await
    }

    pub async fn record_transfer(&self, org_id: Uuid, user_id: Uuid, input: TransferInput) -> AppResult<InventoryMovement> {
        self.record(
            org_id,
            user_id,
            NewMovement {
                product_id: input.product_id,
                warehouse_id: input.warehouse_id,
                destination_warehouse_id: Some(input.destination_warehouse_id),
                movement_type: MovementType::Transfer,
                quantity: input.quantity,
                reference: non_blank(input.reference),
                origin: None,
                reason: None,
                notes: non_blank(input.notes),
            },
        )
        .await
    }

    async fn ensure_warehouse(&self, org_id: Uuid, warehouse_id: Uuid, field: &str) -> AppResult<()> {
        let active = sqlx::query_scalar::<_, bool>(
            "SELECT active FROM warehouses WHERE id = $1 AND org_id = $2",
        )
        .bind(warehouse_id)
        .bind(org_id)
        .fetch_optional(&self.db)
        .await?;

        match active {
            Some(true) => Ok(()),
            Some(false) => Err(AppError::validation(field, "El almacén está inactivo")),
            None => Err(AppError::validation(field, "El almacén no existe")),
        }
    }

    async fn record(&self, org_id: Uuid, user_id: Uuid, movement: NewMovement) -> AppResult<InventoryMovement> {
        validate_quantity(movement.quantity).map_err(|m| AppError::validation("quantity", m))?;

        let settings = SettingsService::new(self.db.clone()).get(org_id).await?;

        let warehouse_id = movement
            .warehouse_id
            .or(settings.default_warehouse_id)
            .ok_or_else(|| AppError::validation("warehouse_id", "Selecciona un almacén"))?;

        validate_transfer_destination(movement.movement_type, warehouse_id, movement.destination_warehouse_id)
            .map_err(|m| AppError::validation("destination_warehouse_id", m))?;
        validate_reference(movement.reference.as_deref(), settings.require_reference_on_movements)
            .map_err(|m| AppError::validation("reference", m))?;

        let product_exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM products WHERE id = $1 AND org_id = $2)",
        )
        .bind(movement.product_id)
        .bind(org_id)
        .fetch_one(&self.db)
        .await?;
        if !product_exists {
            return Err(AppError::validation("product_id", "El producto no existe"));
        }

        self.ensure_warehouse(org_id, warehouse_id, "warehouse_id").await?;
        if let Some(destination) = movement.destination_warehouse_id {
            self.ensure_warehouse(org_id, destination, "destination_warehouse_id").await?;
        }

        let recorded = sqlx::query_as::<_, InventoryMovement>(&format!(
            r#"
            INSERT INTO inventory_movements (
                org_id, product_id, warehouse_id, destination_warehouse_id, type, quantity,
                reference, origin, reason, notes, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {MOVEMENT_COLUMNS}
            "#
        ))
        .bind(org_id)
        .bind(movement.product_id)
        .bind(warehouse_id)
        .bind(movement.destination_warehouse_id)
        .bind(movement.movement_type)
        .bind(movement.quantity)
        .bind(&movement.reference)
        .bind(&movement.origin)
        .bind(movement.reason)
        .bind(&movement.notes)
        .bind(user_id)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(
            org_id = %org_id,
            movement_id = %recorded.id,
            product_id = %recorded.product_id,
            kind = recorded.movement_type.as_str(),
            quantity = %recorded.quantity,
            "Movement recorded"
        );
        Ok(recorded)
    }
}
