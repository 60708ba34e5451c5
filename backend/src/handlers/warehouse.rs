//! HTTP handlers for warehouses

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use shared::models::Warehouse;
use uuid::Uuid;

use crate::error::AppResult;
use crate::handlers::catalog::ActiveQuery;
use crate::middleware::CurrentUser;
use crate::services::warehouse::WarehouseInput;
use crate::services::WarehouseService;
use crate::AppState;

pub async fn list_warehouses(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ActiveQuery>,
) -> AppResult<Json<Vec<Warehouse>>> {
    let service = WarehouseService::new(state.db);
    let warehouses = service
        .list(current_user.0.org_id, query.active_only.unwrap_or(false))
        .await?;
    Ok(Json(warehouses))
}

pub async fn create_warehouse(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<WarehouseInput>,
) -> AppResult<(StatusCode, Json<Warehouse>)> {
    let service = WarehouseService::new(state.db);
    let warehouse = service.create(current_user.0.org_id, input).await?;
    Ok((StatusCode::CREATED, Json(warehouse)))
}

pub async fn update_warehouse(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(warehouse_id): Path<Uuid>,
    Json(input): Json<WarehouseInput>,
) -> AppResult<Json<Warehouse>> {
    let service = WarehouseService::new(state.db);
    let warehouse = service
        .update(current_user.0.org_id, warehouse_id, input)
        .await?;
    Ok(Json(warehouse))
}

pub async fn get_primary_warehouse(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Option<Warehouse>>> {
    let service = WarehouseService::new(state.db);
    Ok(Json(service.primary(current_user.0.org_id).await?))
}
