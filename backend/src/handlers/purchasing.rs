//! HTTP handlers for suppliers and purchase orders

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use shared::models::{PurchaseOrder, PurchaseOrderStatus, Supplier};
use uuid::Uuid;

use crate::error::AppResult;
use crate::handlers::catalog::ActiveQuery;
use crate::middleware::CurrentUser;
use crate::services::purchasing::{
    CreatePurchaseOrderInput, PurchaseOrderListItem, SupplierInput, UpdatePurchaseOrderInput,
};
use crate::services::PurchasingService;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct PurchaseOrderQuery {
    pub status: Option<PurchaseOrderStatus>,
}

pub async fn list_suppliers(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ActiveQuery>,
) -> AppResult<Json<Vec<Supplier>>> {
    let service = PurchasingService::new(state.db);
    let suppliers = service
        .list_suppliers(current_user.0.org_id, query.active_only.unwrap_or(false))
        .await?;
    Ok(Json(suppliers))
}

pub async fn create_supplier(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<SupplierInput>,
) -> AppResult<(StatusCode, Json<Supplier>)> {
    let service = PurchasingService::new(state.db);
    let supplier = service.create_supplier(current_user.0.org_id, input).await?;
    Ok((StatusCode::CREATED, Json(supplier)))
}

pub async fn update_supplier(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(supplier_id): Path<Uuid>,
    Json(input): Json<SupplierInput>,
) -> AppResult<Json<Supplier>> {
    let service = PurchasingService::new(state.db);
    let supplier = service
        .update_supplier(current_user.0.org_id, supplier_id, input)
        .await?;
    Ok(Json(supplier))
}

pub async fn list_purchase_orders(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<PurchaseOrderQuery>,
) -> AppResult<Json<Vec<PurchaseOrderListItem>>> {
    let service = PurchasingService::new(state.db);
    let orders = service.list_orders(current_user.0.org_id, query.status).await?;
    Ok(Json(orders))
}

pub async fn create_purchase_order(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreatePurchaseOrderInput>,
) -> AppResult<(StatusCode, Json<PurchaseOrder>)> {
    let service = PurchasingService::new(state.db);
    let order = service
        .create_order(current_user.0.org_id, current_user.0.user_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(order)))
}

pub async fn update_purchase_order(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(order_id): Path<Uuid>,
    Json(input): Json<UpdatePurchaseOrderInput>,
) -> AppResult<Json<PurchaseOrder>> {
    let service = PurchasingService::new(state.db);
    let order = service
        .update_order(current_user.0.org_id, order_id, input)
        .await?;
    Ok(Json(order))
}
