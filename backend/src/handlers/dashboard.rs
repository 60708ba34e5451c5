//! Alert and dashboard handlers

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use shared::ledger::{DashboardKpis, ExpiringRow, LowStockRow, OverstockRow, StockHealth, SupplyPoint, TopProduct};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::dashboard::{AlertsOverview, DashboardOverview};
use crate::services::ledger::today;
use crate::services::{DashboardService, LedgerService};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ExpiringQuery {
    pub horizon_days: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

const MAX_SUPPLY_MONTHS: usize = 24;

fn dashboard_service(state: &AppState) -> DashboardService {
    DashboardService::new(state.db.clone(), state.config.ledger.clone())
}

// ============================================================================
// Alerts
// ============================================================================

pub async fn get_alerts(State(state): State<AppState>, current_user: CurrentUser) -> AppResult<Json<AlertsOverview>> {
    let service = dashboard_service(&state);
    Ok(Json(service.alerts_overview(current_user.0.org_id).await?))
}

pub async fn get_low_stock_alerts(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<LowStockRow>>> {
    let org_id = current_user.0.org_id;
    if !dashboard_service(&state).alerts_enabled(org_id).await? {
        return Ok(Json(Vec::new()));
    }
    let ledger = LedgerService::new(state.db);
    Ok(Json(ledger.low_stock(org_id).await?))
}

/// Products expiring within `horizon_days` (configured default otherwise)
pub async fn get_expiring_alerts(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ExpiringQuery>,
) -> AppResult<Json<Vec<ExpiringRow>>> {
    let org_id = current_user.0.org_id;
    if !dashboard_service(&state).alerts_enabled(org_id).await? {
        return Ok(Json(Vec::new()));
    }
    let horizon = query
        .horizon_days
        .unwrap_or(state.config.ledger.expiring_horizon_days)
        .max(0);
    let ledger = LedgerService::new(state.db);
    Ok(Json(ledger.expiring_soon(org_id, today(), horizon).await?))
}

pub async fn get_overstock_alerts(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<OverstockRow>>> {
    let org_id = current_user.0.org_id;
    if !dashboard_service(&state).alerts_enabled(org_id).await? {
        return Ok(Json(Vec::new()));
    }
    let ledger = LedgerService::new(state.db);
    Ok(Json(ledger.overstock(org_id).await?))
}

// ============================================================================
// Dashboard
// ============================================================================

pub async fn get_dashboard(State(state): State<AppState>, current_user: CurrentUser) -> Json<DashboardOverview> {
    Json(dashboard_service(&state).overview(current_user.0.org_id).await)
}

pub async fn get_kpis(State(state): State<AppState>, current_user: CurrentUser) -> AppResult<Json<DashboardKpis>> {
    let ledger = LedgerService::new(state.db);
    Ok(Json(ledger.kpis(current_user.0.org_id).await?))
}

pub async fn get_top_products(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<LimitQuery>,
) -> AppResult<Json<Vec<TopProduct>>> {
    let limit = query.limit.unwrap_or(state.config.ledger.top_products_limit);
    let ledger = LedgerService::new(state.db);
    Ok(Json(ledger.top_products(current_user.0.org_id, limit).await?))
}

/// Monthly warehouse/transport/retail split, oldest month first
pub async fn get_supply(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<LimitQuery>,
) -> AppResult<Json<Vec<SupplyPoint>>> {
    let months = query
        .limit
        .unwrap_or(state.config.ledger.supply_buckets)
        .clamp(1, MAX_SUPPLY_MONTHS);
    let ledger = LedgerService::new(state.db);
    Ok(Json(ledger.supply(current_user.0.org_id, months).await?))
}

pub async fn get_health(State(state): State<AppState>, current_user: CurrentUser) -> AppResult<Json<StockHealth>> {
    let ledger = LedgerService::new(state.db);
    Ok(Json(ledger.health(current_user.0.org_id).await?))
}
