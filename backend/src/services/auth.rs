//! Authentication service for registration, sign-in and token management

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use shared::models::{MemberRole, Organization, UserProfile};
use shared::validation::{validate_email, validate_password, validate_password_change};
use sqlx::PgPool;
use std::sync::OnceLock;
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::services::organization::OrganizationService;

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    db: PgPool,
    jwt_secret: String,
    access_token_expiry: i64,
    refresh_token_expiry: i64,
    auto_confirm_email: bool,
}

/// Input for creating an account
#[derive(Debug, Deserialize)]
pub struct RegisterInput {
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: String,
    pub org_id: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

/// Authentication tokens
#[derive(Debug, Serialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Everything the client needs to start a session
#[derive(Debug, Serialize)]
pub struct SignInResult {
    #[serde(flatten)]
    pub tokens: AuthTokens,
    pub user: UserProfile,
    pub organization: Organization,
    pub role: MemberRole,
}

/// User row including credentials
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    password_hash: String,
    email_confirmed_at: Option<DateTime<Utc>>,
    is_active: bool,
}

const PROFILE_COLUMNS: &str = "id, email, full_name, email_confirmed_at, last_login_at, created_at";

/// Decode and validate an access token
pub fn decode_access_token(token: &str, secret: &str) -> AppResult<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::debug!("Rejected access token: {}", e);
        AppError::InvalidToken
    })
}

/// Normalize an email for storage and lookup
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Hash a refresh token for storage
/// Hash checked when the email is unknown, so a miss costs the same bcrypt
/// work as a wrong password
fn dummy_password_hash() -> &'static str {
    static DUMMY: OnceLock<String> = OnceLock::new();
    DUMMY.get_or_init(|| hash("inventario-sin-cuenta", DEFAULT_COST).unwrap_or_default())
}

fn password_matches(password: &str, stored_hash: Option<&str>) -> AppResult<bool> {
    match stored_hash {
        Some(stored) => verify(password, stored)
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e))),
        None => {
            let _ = verify(password, dummy_password_hash());
            Ok(false)
        }
    }
}

fn hash_token(token: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(token.as_bytes()))
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(db: PgPool, config: &Config) -> Self {
        Self {
            db,
            jwt_secret: config.jwt.secret.clone(),
            access_token_expiry: config.jwt.access_token_expiry,
            refresh_token_expiry: config.jwt.refresh_token_expiry,
            auto_confirm_email: config.auth.auto_confirm_email,
        }
    }

    /// Create a user account. No organization is created here; that
    /// happens on first sign-in.
    pub async fn register(&self, input: RegisterInput) -> AppResult<UserProfile> {
        let email = normalize_email(&input.email);
        validate_email(&email).map_err(|m| AppError::validation("email", m))?;
        validate_password(&input.password).map_err(|m| AppError::validation("password", m))?;

        let password_hash = hash(&input.password, DEFAULT_COST)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

        let full_name = input
            .full_name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        let confirmed_at = self.auto_confirm_email.then(Utc::now);

        let user = sqlx::query_as::<_, UserProfile>(&format!(
            r#"
            INSERT INTO users (email, password_hash, full_name, email_confirmed_at)
            VALUES ($1, $2, $3, $4)
            RETURNING {PROFILE_COLUMNS}
            "#
        ))
        .bind(&email)
        .bind(&password_hash)
        .bind(&full_name)
        .bind(confirmed_at)
        .fetch_one(&self.db)
        .await
        .map_err(|e| AppError::unique_violation(e, "email"))?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Sign in with email and password, bootstrapping an organization for
    /// users that have none
    pub async fn login(&self, email: &str, password: &str) -> AppResult<SignInResult> {
        let user = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, password_hash, email_confirmed_at, is_active
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(normalize_email(email))
        .fetch_optional(&self.db)
        .await?;

        if !password_matches(password, user.as_ref().map(|u| u.password_hash.as_str()))? {
            return Err(AppError::InvalidCredentials);
        }
        let user = user.ok_or(AppError::InvalidCredentials)?;

        if user.email_confirmed_at.is_none() {
            return Err(AppError::EmailNotConfirmed);
        }
        if !user.is_active {
            return Err(AppError::AccountDisabled);
        }

        let orgs = OrganizationService::new(self.db.clone());
        let (org_id, role) = orgs.bootstrap_if_needed(user.id).await?;

        sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = $1")
            .bind(user.id)
            .execute(&self.db)
            .await?;

        let tokens = self.issue_tokens(user.id, org_id, role).await?;
        let organization = orgs.get(org_id).await?;
        let profile = self.me(user.id).await?;

        tracing::info!(user_id = %user.id, org_id = %org_id, "User signed in");

        Ok(SignInResult {
            tokens,
            user: profile,
            organization,
            role,
        })
    }

    /// Exchange a refresh token for a new token pair. The old refresh token
    /// is revoked.
    pub async fn refresh_token(&self, refresh_token: &str) -> AppResult<AuthTokens> {
        let token_hash = hash_token(refresh_token);

        let user_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            UPDATE refresh_tokens rt
            SET revoked_at = NOW()
            FROM users u
            WHERE u.id = rt.user_id
              AND rt.token_hash = $1
              AND rt.expires_at > NOW()
              AND rt.revoked_at IS NULL
              AND u.is_active = true
            RETURNING rt.user_id
            "#,
        )
        .bind(&token_hash)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Sesión expirada o inválida".to_string()))?;

        let (org_id, role) = OrganizationService::new(self.db.clone())
            .bootstrap_if_needed(user_id)
            .await?;

        self.issue_tokens(user_id, org_id, role).await
    }

    /// Revoke every active refresh token of the user
    pub async fn logout(&self, user_id: Uuid) -> AppResult<()> {
        let revoked = sqlx::query(
            "UPDATE refresh_tokens SET revoked_at = NOW() WHERE user_id = $1 AND revoked_at IS NULL",
        )
        .bind(user_id)
        .execute(&self.db)
        .await?
        .rows_affected();

        tracing::info!(user_id = %user_id, revoked, "User signed out");
        Ok(())
    }

    /// Profile of the signed-in user
    pub async fn me(&self, user_id: Uuid) -> AppResult<UserProfile> {
        sqlx::query_as::<_, UserProfile>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Usuario".to_string()))
    }

    /// Update the display name
    pub async fn update_profile(&self, user_id: Uuid, full_name: Option<String>) -> AppResult<UserProfile> {
        let full_name = full_name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        sqlx::query_as::<_, UserProfile>(&format!(
            r#"
            UPDATE users SET full_name = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {PROFILE_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(&full_name)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Usuario".to_string()))
    }

    /// Set a new password. Existing refresh tokens are revoked.
    pub async fn change_password(&self, user_id: Uuid, password: &str, confirmation: &str) -> AppResult<()> {
        validate_password_change(password, confirmation).map_err(|m| AppError::validation("password", m))?;

        let password_hash = hash(password, DEFAULT_COST)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

        let mut tx = self.db.begin().await?;

        let updated = sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
            .bind(user_id)
            .bind(&password_hash)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if updated == 0 {
            return Err(AppError::NotFound("Usuario".to_string()));
        }

        sqlx::query("UPDATE refresh_tokens SET revoked_at = NOW() WHERE user_id = $1 AND revoked_at IS NULL")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(user_id = %user_id, "Password changed");
        Ok(())
    }

    /// Change the sign-in email. Unless emails are auto-confirmed, the new
    /// address must be confirmed again.
    pub async fn change_email(&self, user_id: Uuid, email: &str) -> AppResult<UserProfile> {
        let email = normalize_email(email);
        validate_email(&email).map_err(|m| AppError::validation("email", m))?;
        let confirmed_at = self.auto_confirm_email.then(Utc::now);

        let user = sqlx::query_as::<_, UserProfile>(&format!(
            r#"
            UPDATE users SET email = $2, email_confirmed_at = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING {PROFILE_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(&email)
        .bind(confirmed_at)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| AppError::unique_violation(e, "email"))?
        .ok_or_else(|| AppError::NotFound("Usuario".to_string()))?;

        tracing::info!(user_id = %user_id, "Email changed");
        Ok(user)
    }

    async fn issue_tokens(&self, user_id: Uuid, org_id: Uuid, role: MemberRole) -> AppResult<AuthTokens> {
        let tokens = self.generate_tokens(user_id, org_id, role)?;
        self.store_refresh_token(user_id, &tokens.refresh_token).await?;
        Ok(tokens)
    }

    /// Generate access and refresh tokens
    fn generate_tokens(&self, user_id: Uuid, org_id: Uuid, role: MemberRole) -> AppResult<AuthTokens> {
        let now = Utc::now();
        let access_exp = now + Duration::seconds(self.access_token_expiry);

        let access_claims = Claims {
            sub: user_id.to_string(),
            org_id: org_id.to_string(),
            role: role.as_str().to_string(),
            exp: access_exp.timestamp(),
            iat: now.timestamp(),
        };

        let access_token = encode(
            &Header::default(),
            &access_claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))?;

        let refresh_token = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());

        Ok(AuthTokens {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.access_token_expiry,
        })
    }

    /// Store refresh token in database
    async fn store_refresh_token(&self, user_id: Uuid, token: &str) -> AppResult<()> {
        let expires_at = Utc::now() + Duration::seconds(self.refresh_token_expiry);

        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (user_id, token_hash, expires_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(user_id)
        .bind(hash_token(token))
        .bind(expires_at)
        .execute(&self.db)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_hash_is_stable_and_opaque() {
        let a = hash_token("refresh-token");
        assert_eq!(a, hash_token("refresh-token"));
        assert_ne!(a, hash_token("refresh-token2"));
        assert!(!a.contains("refresh"));
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Ana@Shop.DO "), "ana@shop.do");
    }

    #[test]
    fn test_unknown_email_never_matches() {
        assert!(!password_matches("secreto123", None).unwrap());
        assert!(!dummy_password_hash().is_empty());
    }

    #[test]
    fn test_stored_hash_is_checked() {
        let stored = hash("secreto123", 4).unwrap();
        assert!(password_matches("secreto123", Some(&stored)).unwrap());
        assert!(!password_matches("otra-clave", Some(&stored)).unwrap());
    }

    #[test]
    fn test_access_token_round_trip() {
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            org_id: Uuid::new_v4().to_string(),
            role: "owner".into(),
            exp: (Utc::now() + Duration::minutes(5)).timestamp(),
            iat: Utc::now().timestamp(),
        };
        let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(b"secret")).unwrap();

        let decoded = decode_access_token(&token, "secret").unwrap();
        assert_eq!(decoded.org_id, claims.org_id);
        assert!(decode_access_token(&token, "other").is_err());
    }
}
