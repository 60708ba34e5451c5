//! Per-organization settings

use rust_decimal::Decimal;
use serde::Deserialize;
use shared::models::Settings;
use shared::validation::{validate_precision, validate_required, QUANTITY_PRECISION};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};

const SETTINGS_COLUMNS: &str = "org_id, business_name, currency, low_stock_threshold, enable_alerts, \
    time_zone, date_format, require_reference_on_movements, default_warehouse_id";

/// Settings service
#[derive(Clone)]
pub struct SettingsService {
    db: PgPool,
}

/// Full replacement of the settings row
#[derive(Debug, Deserialize, Validate)]
pub struct UpsertSettingsInput {
    #[validate(length(min = 1, max = 120, message = "El nombre del negocio es obligatorio"))]
    pub business_name: String,
    #[validate(length(min = 3, max = 3, message = "La moneda debe ser un código de 3 letras"))]
    pub currency: String,
    pub low_stock_threshold: Decimal,
    pub enable_alerts: bool,
    #[validate(length(min = 1, message = "La zona horaria es obligatoria"))]
    pub time_zone: String,
    #[validate(length(min = 1, message = "El formato de fecha es obligatorio"))]
    pub date_format: String,
    pub require_reference_on_movements: bool,
    pub default_warehouse_id: Option<Uuid>,
}

/// Insert the default settings row unless one exists
pub async fn insert_default_settings(conn: &mut PgConnection, org_id: Uuid) -> AppResult<Settings> {
    let defaults = Settings::defaults(org_id);

    sqlx::query(&format!(
        r#"
        INSERT INTO settings ({SETTINGS_COLUMNS})
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        ON CONFLICT (org_id) DO NOTHING
        "#
    ))
    .bind(defaults.org_id)
    .bind(&defaults.business_name)
    .bind(&defaults.currency)
    .bind(defaults.low_stock_threshold)
    .bind(defaults.enable_alerts)
    .bind(&defaults.time_zone)
    .bind(&defaults.date_format)
    .bind(defaults.require_reference_on_movements)
    .bind(defaults.default_warehouse_id)
    .execute(&mut *conn)
    .await?;

    let settings = sqlx::query_as::<_, Settings>(&format!(
        "SELECT {SETTINGS_COLUMNS} FROM settings WHERE org_id = $1"
    ))
    .bind(org_id)
    .fetch_one(&mut *conn)
    .await?;

    Ok(settings)
}

impl SettingsService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Current settings, created with defaults on first access
    pub async fn get(&self, org_id: Uuid) -> AppResult<Settings> {
        let existing = sqlx::query_as::<_, Settings>(&format!(
            "SELECT {SETTINGS_COLUMNS} FROM settings WHERE org_id = $1"
        ))
        .bind(org_id)
        .fetch_optional(&self.db)
        .await?;

        match existing {
            Some(settings) => Ok(settings),
            None => {
                let mut conn = self.db.acquire().await?;
                insert_default_settings(&mut *conn, org_id).await
            }
        }
    }

    pub async fn upsert(&self, org_id: Uuid, input: UpsertSettingsInput) -> AppResult<Settings> {
        input.validate()?;
        validate_required(&input.business_name).map_err(|m| AppError::validation("business_name", m))?;
        if input.low_stock_threshold < Decimal::ZERO {
            return Err(AppError::validation(
                "low_stock_threshold",
                "El umbral de stock bajo no puede ser negativo",
            ));
        }
        validate_precision(input.low_stock_threshold, QUANTITY_PRECISION)
            .map_err(|m| AppError::validation("low_stock_threshold", m))?;

        if let Some(warehouse_id) = input.default_warehouse_id {
            let exists = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM warehouses WHERE id = $1 AND org_id = $2 AND active)",
            )
            .bind(warehouse_id)
            .bind(org_id)
            .fetch_one(&self.db)
            .await?;
            if !exists {
                return Err(AppError::validation(
                    "default_warehouse_id",
                    "El almacén por defecto no existe o está inactivo",
                ));
            }
        }

        let settings = sqlx::query_as::<_, Settings>(&format!(
            r#"
            INSERT INTO settings ({SETTINGS_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (org_id) DO UPDATE SET
                business_name = EXCLUDED.business_name,
                currency = EXCLUDED.currency,
                low_stock_threshold = EXCLUDED.low_stock_threshold,
                enable_alerts = EXCLUDED.enable_alerts,
                time_zone = EXCLUDED.time_zone,
                date_format = EXCLUDED.date_format,
                require_reference_on_movements = EXCLUDED.require_reference_on_movements,
                default_warehouse_id = EXCLUDED.default_warehouse_id,
                updated_at = NOW()
            RETURNING {SETTINGS_COLUMNS}
            "#
        ))
        .bind(org_id)
        .bind(input.business_name.trim())
        .bind(input.currency.to_uppercase())
        .bind(input.low_stock_threshold)
        .bind(input.enable_alerts)
        .bind(&input.time_zone)
        .bind(&input.date_format)
        .bind(input.require_reference_on_movements)
        .bind(input.default_warehouse_id)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(org_id = %org_id, "Settings updated");
        Ok(settings)
    }
}
