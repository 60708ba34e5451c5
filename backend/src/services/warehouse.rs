//! Warehouse service

use serde::Deserialize;
use shared::models::Warehouse;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::services::non_blank;

const WAREHOUSE_COLUMNS: &str = "id, org_id, name, code, location, is_primary, active, created_at";

/// Warehouse service
#[derive(Clone)]
pub struct WarehouseService {
    db: PgPool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct WarehouseInput {
    #[validate(length(min = 1, max = 120, message = "El nombre es obligatorio"))]
    pub name: String,
    #[validate(length(max = 32, message = "El código es demasiado largo"))]
    pub code: Option<String>,
    pub location: Option<String>,
    #[serde(default)]
    pub is_primary: bool,
    pub active: Option<bool>,
}

impl WarehouseInput {
    /// Blank code and location become NULL, so several warehouses may go
    /// without a code under the per-org unique constraint
    fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            code: non_blank(self.code),
            location: non_blank(self.location),
            ..self
        }
    }
}

/// Clear the primary flag on every other warehouse of the org
async fn clear_other_primaries(conn: &mut PgConnection, org_id: Uuid, keep: Option<Uuid>) -> AppResult<()> {
    sqlx::query(
        r#"
        UPDATE warehouses SET is_primary = false
        WHERE org_id = $1 AND is_primary AND ($2::uuid IS NULL OR id <> $2)
        "#,
    )
    .bind(org_id)
    .bind(keep)
    .execute(conn)
    .await?;
    Ok(())
}

impl WarehouseService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn list(&self, org_id: Uuid, active_only: bool) -> AppResult<Vec<Warehouse>> {
        let warehouses = sqlx::query_as::<_, Warehouse>(&format!(
            r#"
            SELECT {WAREHOUSE_COLUMNS}
            FROM warehouses
            WHERE org_id = $1 AND (NOT $2 OR active)
            ORDER BY is_primary DESC, name
            "#
        ))
        .bind(org_id)
        .bind(active_only)
        .fetch_all(&self.db)
        .await?;

        Ok(warehouses)
    }

    /// Create a warehouse. A primary warehouse takes the flag from any
    /// other in the same transaction.
    pub async fn create(&self, org_id: Uuid, input: WarehouseInput) -> AppResult<Warehouse> {
        input.validate()?;
        let input = input.normalized();

        let mut tx = self.db.begin().await?;

        if input.is_primary {
            clear_other_primaries(&mut *tx, org_id, None).await?;
        }

        let warehouse = sqlx::query_as::<_, Warehouse>(&format!(
            r#"
            INSERT INTO warehouses (org_id, name, code, location, is_primary, active)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {WAREHOUSE_COLUMNS}
            "#
        ))
        .bind(org_id)
        .bind(&input.name)
        .bind(&input.code)
        .bind(&input.location)
        .bind(input.is_primary)
        .bind(input.active.unwrap_or(true))
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::unique_violation(e, "code"))?;

        tx.commit().await?;

        tracing::info!(org_id = %org_id, warehouse_id = %warehouse.id, primary = warehouse.is_primary, "Warehouse created");
        Ok(warehouse)
    }

    /// Update a warehouse. Saving with `is_primary = true` clears the flag
    /// on the others and sets it here atomically.
    pub async fn update(&self, org_id: Uuid, warehouse_id: Uuid, input: WarehouseInput) -> AppResult<Warehouse> {
        input.validate()?;
        let input = input.normalized();

        let mut tx = self.db.begin().await?;

        if input.is_primary {
            clear_other_primaries(&mut *tx, org_id, Some(warehouse_id)).await?;
        }

        let warehouse = sqlx::query_as::<_, Warehouse>(&format!(
            r#"
            UPDATE warehouses
            SET name = $3, code = $4, location = $5, is_primary = $6, active = COALESCE($7, active)
            WHERE id = $1 AND org_id = $2
            RETURNING {WAREHOUSE_COLUMNS}
            "#
        ))
        .bind(warehouse_id)
        .bind(org_id)
        .bind(&input.name)
        .bind(&input.code)
        .bind(&input.location)
        .bind(input.is_primary)
        .bind(input.active)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::unique_violation(e, "code"))?
        .ok_or_else(|| AppError::NotFound("Almacén".to_string()))?;

        tx.commit().await?;

        tracing::info!(org_id = %org_id, warehouse_id = %warehouse.id, primary = warehouse.is_primary, "Warehouse updated");
        Ok(warehouse)
    }

    /// The org's primary warehouse, if one is set
    pub async fn primary(&self, org_id: Uuid) -> AppResult<Option<Warehouse>> {
        let warehouse = sqlx::query_as::<_, Warehouse>(&format!(
            "SELECT {WAREHOUSE_COLUMNS} FROM warehouses WHERE org_id = $1 AND is_primary"
        ))
        .bind(org_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(warehouse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: &str, code: Option<&str>, is_primary: bool) -> WarehouseInput {
        WarehouseInput {
            name: name.to_string(),
            code: code.map(str::to_string),
            location: Some("  ".to_string()),
            is_primary,
            active: None,
        }
    }

    #[test]
    fn test_blank_code_and_location_are_stored_as_null() {
        let normalized = input(" Central ", Some(""), true).normalized();
        assert_eq!(normalized.name, "Central");
        assert_eq!(normalized.code, None);
        assert_eq!(normalized.location, None);
        assert!(normalized.is_primary);

        assert_eq!(input("Norte", Some(" AL-2 "), false).normalized().code.as_deref(), Some("AL-2"));
    }

    #[test]
    fn test_schema_allows_one_primary_per_org() {
        let schema = include_str!("../../migrations/20240101000000_init.sql");
        assert!(schema.contains("CREATE UNIQUE INDEX idx_warehouses_one_primary ON warehouses(org_id) WHERE is_primary;"));
    }

    async fn new_org(pool: &PgPool) -> Uuid {
        sqlx::query_scalar::<_, Uuid>("INSERT INTO organizations (name, slug) VALUES ('Tienda', $1) RETURNING id")
            .bind(format!("tienda-{}", Uuid::new_v4().simple()))
            .fetch_one(pool)
            .await
            .unwrap()
    }

    async fn primaries(pool: &PgPool, org_id: Uuid) -> Vec<Uuid> {
        sqlx::query_scalar::<_, Uuid>("SELECT id FROM warehouses WHERE org_id = $1 AND is_primary")
            .bind(org_id)
            .fetch_all(pool)
            .await
            .unwrap()
    }

    /// Needs a Postgres `DATABASE_URL`; run with `cargo test -- --ignored`
    #[sqlx::test(migrations = "./migrations")]
    #[ignore]
    async fn test_exactly_one_primary_after_each_save(pool: PgPool) {
        let org_id = new_org(&pool).await;
        let service = WarehouseService::new(pool.clone());

        let a = service.create(org_id, input("Central", Some(""), true)).await.unwrap();
        let b = service.create(org_id, input("Norte", Some(""), true)).await.unwrap();
        assert_eq!(primaries(&pool, org_id).await, vec![b.id]);

        service.update(org_id, a.id, input("Central", None, true)).await.unwrap();
        assert_eq!(primaries(&pool, org_id).await, vec![a.id]);

        let primary = service.primary(org_id).await.unwrap().map(|w| w.id);
        assert_eq!(primary, Some(a.id));
    }
}
