//! HTTP handlers for categories and products

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use shared::models::{Category, Product};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::catalog::{CategoryInput, ProductFilter, ProductInput, ProductListItem};
use crate::services::CatalogService;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ActiveQuery {
    pub active_only: Option<bool>,
}

pub async fn list_categories(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ActiveQuery>,
) -> AppResult<Json<Vec<Category>>> {
    let service = CatalogService::new(state.db);
    let categories = service
        .list_categories(current_user.0.org_id, query.active_only.unwrap_or(false))
        .await?;
    Ok(Json(categories))
}

pub async fn create_category(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CategoryInput>,
) -> AppResult<(StatusCode, Json<Category>)> {
    let service = CatalogService::new(state.db);
    let category = service.create_category(current_user.0.org_id, input).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn update_category(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(category_id): Path<Uuid>,
    Json(input): Json<CategoryInput>,
) -> AppResult<Json<Category>> {
    let service = CatalogService::new(state.db);
    let category = service
        .update_category(current_user.0.org_id, category_id, input)
        .await?;
    Ok(Json(category))
}

pub async fn list_products(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(filter): Query<ProductFilter>,
) -> AppResult<Json<Vec<ProductListItem>>> {
    let service = CatalogService::new(state.db);
    let products = service.list_products(current_user.0.org_id, &filter).await?;
    Ok(Json(products))
}

pub async fn get_product(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(product_id): Path<Uuid>,
) -> AppResult<Json<Product>> {
    let service = CatalogService::new(state.db);
    let product = service.get_product(current_user.0.org_id, product_id).await?;
    Ok(Json(product))
}

pub async fn create_product(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<ProductInput>,
) -> AppResult<(StatusCode, Json<Product>)> {
    let service = CatalogService::new(state.db);
    let product = service.create_product(current_user.0.org_id, input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update_product(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(product_id): Path<Uuid>,
    Json(input): Json<ProductInput>,
) -> AppResult<Json<Product>> {
    let service = CatalogService::new(state.db);
    let product = service
        .update_product(current_user.0.org_id, product_id, input)
        .await?;
    Ok(Json(product))
}
