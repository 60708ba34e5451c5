//! Organization (tenant) bootstrap and lookup

use serde::Serialize;
use shared::models::{bootstrap_org_slug, MemberRole, Organization, BOOTSTRAP_ORG_NAME};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::settings::insert_default_settings;

/// Organization service
#[derive(Clone)]
pub struct OrganizationService {
    db: PgPool,
}

/// The caller's organization and their role in it
#[derive(Debug, Serialize)]
pub struct CurrentOrganization {
    pub organization: Organization,
    pub role: MemberRole,
}

async fn first_membership(conn: &mut PgConnection, user_id: Uuid) -> AppResult<Option<(Uuid, MemberRole)>> {
    let membership = sqlx::query_as::<_, (Uuid, MemberRole)>(
        r#"
        SELECT org_id, role
        FROM memberships
        WHERE user_id = $1
        ORDER BY created_at
        LIMIT 1
        "#,
    )
    .bind(user_id)
    .fetch_optional(conn)
    .await?;

    Ok(membership)
}

impl OrganizationService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Return the user's organization, creating one (with owner membership
    /// and default settings) when the user has none.
    ///
    /// Runs in a single transaction holding a lock on the user row, so two
    /// concurrent sign-ins cannot create two organizations.
    pub async fn bootstrap_if_needed(&self, user_id: Uuid) -> AppResult<(Uuid, MemberRole)> {
        let mut tx = self.db.begin().await?;

        sqlx::query("SELECT id FROM users WHERE id = $1 FOR UPDATE")
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound("Usuario".to_string()))?;

        if let Some(existing) = first_membership(&mut *tx, user_id).await? {
            tx.commit().await?;
            return Ok(existing);
        }

        let org_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO organizations (name, slug, created_by)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(BOOTSTRAP_ORG_NAME)
        .bind(bootstrap_org_slug(user_id))
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::unique_violation(e, "slug"))?;

        sqlx::query("INSERT INTO memberships (org_id, user_id, role) VALUES ($1, $2, $3)")
            .bind(org_id)
            .bind(user_id)
            .bind(MemberRole::Owner)
            .execute(&mut *tx)
            .await?;

        insert_default_settings(&mut *tx, org_id).await?;

        tx.commit().await?;

        tracing::info!(user_id = %user_id, org_id = %org_id, "Organization bootstrapped");
        Ok((org_id, MemberRole::Owner))
    }

    pub async fn get(&self, org_id: Uuid) -> AppResult<Organization> {
        sqlx::query_as::<_, Organization>(
            "SELECT id, name, slug, created_by, created_at FROM organizations WHERE id = $1",
        )
        .bind(org_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Organización".to_string()))
    }

    /// Organization and role of the session
    pub async fn current(&self, org_id: Uuid, user_id: Uuid) -> AppResult<CurrentOrganization> {
        let role = sqlx::query_scalar::<_, MemberRole>(
            "SELECT role FROM memberships WHERE org_id = $1 AND user_id = $2",
        )
        .bind(org_id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or(AppError::InsufficientPermissions)?;

        Ok(CurrentOrganization {
            organization: self.get(org_id).await?,
            role,
        })
    }
}
