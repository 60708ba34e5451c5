//! Authentication handlers

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use shared::models::UserProfile;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::auth::{AuthTokens, RegisterInput, SignInResult};
use crate::services::AuthService;
use crate::AppState;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Serialize)]
pub struct RegisterResponse {
    pub user: UserProfile,
    /// False when the user must confirm the email before signing in
    pub can_sign_in: bool,
}

#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    pub full_name: Option<String>,
}

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub password: String,
    pub password_confirmation: String,
}

#[derive(Deserialize)]
pub struct ChangeEmailRequest {
    pub email: String,
}

/// Register endpoint handler
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterInput>,
) -> AppResult<(StatusCode, Json<RegisterResponse>)> {
    let auth_service = AuthService::new(state.db.clone(), &state.config);
    let user = auth_service.register(body).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            can_sign_in: user.email_confirmed_at.is_some(),
            user,
        }),
    ))
}

/// Sign-in endpoint handler
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> AppResult<Json<SignInResult>> {
    let auth_service = AuthService::new(state.db.clone(), &state.config);
    let result = auth_service.login(&body.email, &body.password).await?;
    Ok(Json(result))
}

/// Refresh token endpoint handler
pub async fn refresh(
    State(state): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> AppResult<Json<AuthTokens>> {
    let auth_service = AuthService::new(state.db.clone(), &state.config);
    let tokens = auth_service.refresh_token(&body.refresh_token).await?;
    Ok(Json(tokens))
}

/// Sign-out: revokes the caller's refresh tokens
pub async fn logout(State(state): State<AppState>, current_user: CurrentUser) -> AppResult<StatusCode> {
    let auth_service = AuthService::new(state.db.clone(), &state.config);
    auth_service.logout(current_user.0.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_me(State(state): State<AppState>, current_user: CurrentUser) -> AppResult<Json<UserProfile>> {
    let auth_service = AuthService::new(state.db.clone(), &state.config);
    Ok(Json(auth_service.me(current_user.0.user_id).await?))
}

pub async fn update_me(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(body): Json<UpdateProfileRequest>,
) -> AppResult<Json<UserProfile>> {
    let auth_service = AuthService::new(state.db.clone(), &state.config);
    let user = auth_service
        .update_profile(current_user.0.user_id, body.full_name)
        .await?;
    Ok(Json(user))
}

pub async fn change_password(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(body): Json<ChangePasswordRequest>,
) -> AppResult<StatusCode> {
    let auth_service = AuthService::new(state.db.clone(), &state.config);
    auth_service
        .change_password(current_user.0.user_id, &body.password, &body.password_confirmation)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn change_email(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(body): Json<ChangeEmailRequest>,
) -> AppResult<Json<UserProfile>> {
    let auth_service = AuthService::new(state.db.clone(), &state.config);
    let user = auth_service.change_email(current_user.0.user_id, &body.email).await?;
    Ok(Json(user))
}
