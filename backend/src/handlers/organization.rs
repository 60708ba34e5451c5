//! Organization and settings handlers

use axum::{extract::State, Json};
use shared::models::Settings;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::organization::CurrentOrganization;
use crate::services::settings::UpsertSettingsInput;
use crate::services::{OrganizationService, SettingsService};
use crate::AppState;

/// The session's organization and role
pub async fn get_current_org(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<CurrentOrganization>> {
    let service = OrganizationService::new(state.db);
    let current = service
        .current(current_user.0.org_id, current_user.0.user_id)
        .await?;
    Ok(Json(current))
}

pub async fn get_settings(State(state): State<AppState>, current_user: CurrentUser) -> AppResult<Json<Settings>> {
    let service = SettingsService::new(state.db);
    Ok(Json(service.get(current_user.0.org_id).await?))
}

/// Owners and admins only
pub async fn upsert_settings(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<UpsertSettingsInput>,
) -> AppResult<Json<Settings>> {
    current_user.0.require_manager()?;
    let service = SettingsService::new(state.db);
    Ok(Json(service.upsert(current_user.0.org_id, input).await?))
}
