//! HTTP handlers for stock movements and stock levels

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use shared::ledger::{StockRow, WarehouseStockRow};
use shared::models::{InventoryMovement, MovementType};
use uuid::Uuid;

use crate::error::AppResult;
use crate::handlers::reporting::csv_attachment;
use crate::middleware::CurrentUser;
use crate::services::movement::{InboundInput, MovementFilter, OutboundInput, TransferInput};
use crate::services::{LedgerService, MovementService, ReportingService};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct MovementListQuery {
    #[serde(rename = "type")]
    pub movement_type: Option<MovementType>,
    pub product_id: Option<Uuid>,
    pub limit: Option<i64>,
    /// "json" or "csv"
    pub format: Option<String>,
}

/// Recent movements, newest first
pub async fn list_movements(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<MovementListQuery>,
) -> AppResult<Response> {
    let filter = MovementFilter {
        movement_type: query.movement_type,
        product_id: query.product_id,
        limit: query.limit,
    };
    let service = MovementService::new(state.db);
    let movements = service.list_recent(current_user.0.org_id, &filter).await?;

    if query.format.as_deref() == Some("csv") {
        let csv = ReportingService::export_to_csv(&movements)?;
        Ok(csv_attachment("movimientos.csv", csv))
    } else {
        Ok(Json(movements).into_response())
    }
}

pub async fn record_inbound(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<InboundInput>,
) -> AppResult<(StatusCode, Json<InventoryMovement>)> {
    let service = MovementService::new(state.db);
    let movement = service
        .record_inbound(current_user.0.org_id, current_user.0.user_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(movement)))
}

pub async fn record_outbound(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<OutboundInput>,
) -> AppResult<(StatusCode, Json<InventoryMovement>)> {
    let service = MovementService::new(state.db);
    let movement = service
        .record_outbound(current_user.0.org_id, current_user.0.user_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(movement)))
}

pub async fn record_transfer(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<TransferInput>,
) -> AppResult<(StatusCode, Json<InventoryMovement>)> {
    let service = MovementService::new(state.db);
    let movement = service
        .record_transfer(current_user.0.org_id, current_user.0.user_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(movement)))
}

/// Current stock per product
pub async fn get_stock(State(state): State<AppState>, current_user: CurrentUser) -> AppResult<Json<Vec<StockRow>>> {
    let service = LedgerService::new(state.db);
    Ok(Json(service.stock_by_product(current_user.0.org_id).await?))
}

/// Current stock per product and warehouse
pub async fn get_stock_by_warehouse(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<WarehouseStockRow>>> {
    let service = LedgerService::new(state.db);
    Ok(Json(service.stock_by_product_and_warehouse(current_user.0.org_id).await?))
}
