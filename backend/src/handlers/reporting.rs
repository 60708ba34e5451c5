//! Report handlers with JSON and CSV output

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use shared::types::ReportTable;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::ReportingService;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    pub format: Option<String>, // "json" or "csv"
}

/// CSV body served as a download
pub fn csv_attachment(filename: &str, csv: String) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{filename}\"")),
        ],
        csv,
    )
        .into_response()
}

fn render(table: ReportTable, query: &ReportQuery, filename: &str) -> AppResult<Response> {
    if query.format.as_deref() == Some("csv") {
        let csv = ReportingService::table_to_csv(&table)?;
        Ok(csv_attachment(filename, csv))
    } else {
        Ok(Json(table).into_response())
    }
}

pub async fn get_stock_report(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ReportQuery>,
) -> AppResult<Response> {
    let service = ReportingService::new(state.db);
    let table = service.stock_report(current_user.0.org_id).await?;
    render(table, &query, "existencias.csv")
}

pub async fn get_low_stock_report(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ReportQuery>,
) -> AppResult<Response> {
    let service = ReportingService::new(state.db);
    let table = service.low_stock_report(current_user.0.org_id).await?;
    render(table, &query, "stock_bajo.csv")
}

/// Per-product movement card with running balance
pub async fn get_kardex_report(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(product_id): Path<Uuid>,
    Query(query): Query<ReportQuery>,
) -> AppResult<Response> {
    let service = ReportingService::new(state.db);
    let table = service.kardex_report(current_user.0.org_id, product_id).await?;
    render(table, &query, "kardex.csv")
}

pub async fn get_valuation_report(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ReportQuery>,
) -> AppResult<Response> {
    let service = ReportingService::new(state.db);
    let table = service.valuation_report(current_user.0.org_id).await?;
    render(table, &query, "valorizacion.csv")
}
