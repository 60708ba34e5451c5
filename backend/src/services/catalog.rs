//! Catalog service: categories and products

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::models::{Category, Product};
use shared::validation::{
    validate_amount, validate_percent, validate_precision, validate_required, validate_stock_limits, QUANTITY_PRECISION,
};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};

const PRODUCT_COLUMNS: &str = "id, org_id, sku, name, category_id, unit, cost, price, discount_percent, \
    tax_percent, min_stock, max_stock, expiration_date, barcode, description, image_url, active, \
    created_at, updated_at";

/// Catalog service
#[derive(Clone)]
pub struct CatalogService {
    db: PgPool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CategoryInput {
    #[validate(length(min = 1, max = 120, message = "El nombre es obligatorio"))]
    pub name: String,
    pub description: Option<String>,
    pub active: Option<bool>,
}

/// Product create/update payload
#[derive(Debug, Deserialize, Validate)]
pub struct ProductInput {
    #[validate(length(min = 1, max = 64, message = "El SKU es obligatorio"))]
    pub sku: String,
    #[validate(length(min = 1, max = 200, message = "El nombre es obligatorio"))]
    pub name: String,
    pub category_id: Option<Uuid>,
    #[serde(default = "default_unit")]
    pub unit: String,
    #[serde(default)]
    pub cost: Decimal,
    #[serde(default)]
    pub price: Decimal,
    #[serde(default)]
    pub discount_percent: Decimal,
    #[serde(default)]
    pub tax_percent: Decimal,
    #[serde(default)]
    pub min_stock: Decimal,
    pub max_stock: Option<Decimal>,
    pub expiration_date: Option<NaiveDate>,
    pub barcode: Option<String>,
    pub description: Option<String>,
    #[validate(url(message = "La URL de la imagen no es válida"))]
    pub image_url: Option<String>,
    pub active: Option<bool>,
}

fn default_unit() -> String {
    "unidad".to_string()
}

impl ProductInput {
    /// Domain checks on top of the derived payload validation
    fn check(&self) -> AppResult<()> {
        self.validate()?;
        validate_required(&self.sku).map_err(|m| AppError::validation("sku", m))?;
        validate_required(&self.name).map_err(|m| AppError::validation("name", m))?;
        validate_amount(self.cost).map_err(|m| AppError::validation("cost", m))?;
        validate_amount(self.price).map_err(|m| AppError::validation("price", m))?;
        validate_percent(self.discount_percent).map_err(|m| AppError::validation("discount_percent", m))?;
        validate_percent(self.tax_percent).map_err(|m| AppError::validation("tax_percent", m))?;
        validate_precision(self.min_stock, QUANTITY_PRECISION).map_err(|m| AppError::validation("min_stock", m))?;
        validate_stock_limits(self.min_stock, self.max_stock).map_err(|m| AppError::validation("max_stock", m))?;
        Ok(())
    }
}

/// Product listing row with its category name
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProductListItem {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub product: Product,
    pub category_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProductFilter {
    pub active_only: Option<bool>,
    pub category_id: Option<Uuid>,
    /// Matches sku, name or barcode
    pub search: Option<String>,
}

impl CatalogService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    // ========================================================================
    // Categories
    // ========================================================================

    pub async fn list_categories(&self, org_id: Uuid, active_only: bool) -> AppResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, org_id, name, description, active, created_at
            FROM categories
            WHERE org_id = $1 AND (NOT $2 OR active)
            ORDER BY name
            "#,
        )
        .bind(org_id)
        .bind(active_only)
        .fetch_all(&self.db)
        .await?;

        Ok(categories)
    }

    pub async fn create_category(&self, org_id: Uuid, input: CategoryInput) -> AppResult<Category> {
        input.validate()?;
        validate_required(&input.name).map_err(|m| AppError::validation("name", m))?;

        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (org_id, name, description, active)
            VALUES ($1, $2, $3, $4)
            RETURNING id, org_id, name, description, active, created_at
            "#,
        )
        .bind(org_id)
        .bind(input.name.trim())
        .bind(&input.description)
        .bind(input.active.unwrap_or(true))
        .fetch_one(&self.db)
        .await
        .map_err(|e| AppError::unique_violation(e, "name"))?;

        tracing::info!(org_id = %org_id, category_id = %category.id, "Category created");
        Ok(category)
    }

    pub async fn update_category(&self, org_id: Uuid, category_id: Uuid, input: CategoryInput) -> AppResult<Category> {
        input.validate()?;
        validate_required(&input.name).map_err(|m| AppError::validation("name", m))?;

        sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories
            SET name = $3, description = $4, active = COALESCE($5, active)
            WHERE id = $1 AND org_id = $2
            RETURNING id, org_id, name, description, active, created_at
            "#,
        )
        .bind(category_id)
        .bind(org_id)
        .bind(input.name.trim())
        .bind(&input.description)
        .bind(input.active)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| AppError::unique_violation(e, "name"))?
        .ok_or_else(|| AppError::NotFound("Categoría".to_string()))
    }

    // ========================================================================
    // Products
    // ========================================================================

    pub async fn list_products(&self, org_id: Uuid, filter: &ProductFilter) -> AppResult<Vec<ProductListItem>> {
        let search = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", s));

        let products = sqlx::query_as::<_, ProductListItem>(
            r#"
            SELECT p.id, p.org_id, p.sku, p.name, p.category_id, p.unit, p.cost, p.price,
                   p.discount_percent, p.tax_percent, p.min_stock, p.max_stock, p.expiration_date,
                   p.barcode, p.description, p.image_url, p.active, p.created_at, p.updated_at,
                   c.name AS category_name
            FROM products p
            LEFT JOIN categories c ON c.id = p.category_id AND c.org_id = p.org_id
            WHERE p.org_id = $1
              AND (NOT $2 OR p.active)
              AND ($3::uuid IS NULL OR p.category_id = $3)
              AND ($4::text IS NULL OR p.sku ILIKE $4 OR p.name ILIKE $4 OR p.barcode ILIKE $4)
            ORDER BY p.name
            "#,
        )
        .bind(org_id)
        .bind(filter.active_only.unwrap_or(false))
        .bind(filter.category_id)
        .bind(search)
        .fetch_all(&self.db)
        .await?;

        Ok(products)
    }

    /// All products of the org, for the ledger
    pub async fn all_products(&self, org_id: Uuid) -> AppResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE org_id = $1 ORDER BY name"
        ))
        .bind(org_id)
        .fetch_all(&self.db)
        .await?;

        Ok(products)
    }

    pub async fn get_product(&self, org_id: Uuid, product_id: Uuid) -> AppResult<Product> {
        sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1 AND org_id = $2"
        ))
        .bind(product_id)
        .bind(org_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Producto".to_string()))
    }

    async fn ensure_category(&self, org_id: Uuid, category_id: Option<Uuid>) -> AppResult<()> {
        let Some(category_id) = category_id else {
            return Ok(());
        };
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1 AND org_id = $2)",
        )
        .bind(category_id)
        .bind(org_id)
        .fetch_one(&self.db)
        .await?;

        if exists {
            Ok(())
        } else {
            Err(AppError::validation("category_id", "La categoría no existe"))
        }
    }

    pub async fn create_product(&self, org_id: Uuid, input: ProductInput) -> AppResult<Product> {
        input.check()?;
        self.ensure_category(org_id, input.category_id).await?;

        let product = sqlx::query_as::<_, Product>(&format!(
            r#"
            INSERT INTO products (
                org_id, sku, name, category_id, unit, cost, price, discount_percent, tax_percent,
                min_stock, max_stock, expiration_date, barcode, description, image_url, active
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(org_id)
        .bind(input.sku.trim())
        .bind(input.name.trim())
        .bind(input.category_id)
        .bind(&input.unit)
        .bind(input.cost)
        .bind(input.price)
        .bind(input.discount_percent)
        .bind(input.tax_percent)
        .bind(input.min_stock)
        .bind(input.max_stock)
        .bind(input.expiration_date)
        .bind(&input.barcode)
        .bind(&input.description)
        .bind(&input.image_url)
        .bind(input.active.unwrap_or(true))
        .fetch_one(&self.db)
        .await
        .map_err(|e| AppError::unique_violation(e, "sku"))?;

        tracing::info!(org_id = %org_id, product_id = %product.id, sku = %product.sku, "Product created");
        Ok(product)
    }

    pub async fn update_product(&self, org_id: Uuid, product_id: Uuid, input: ProductInput) -> AppResult<Product> {
        input.check()?;
        self.ensure_category(org_id, input.category_id).await?;

        sqlx::query_as::<_, Product>(&format!(
            r#"
            UPDATE products SET
                sku = $3, name = $4, category_id = $5, unit = $6, cost = $7, price = $8,
                discount_percent = $9, tax_percent = $10, min_stock = $11, max_stock = $12,
                expiration_date = $13, barcode = $14, description = $15, image_url = $16,
                active = COALESCE($17, active), updated_at = NOW()
            WHERE id = $1 AND org_id = $2
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(product_id)
        .bind(org_id)
        .bind(input.sku.trim())
        .bind(input.name.trim())
        .bind(input.category_id)
        .bind(&input.unit)
        .bind(input.cost)
        .bind(input.price)
        .bind(input.discount_percent)
        .bind(input.tax_percent)
        .bind(input.min_stock)
        .bind(input.max_stock)
        .bind(input.expiration_date)
        .bind(&input.barcode)
        .bind(&input.description)
        .bind(&input.image_url)
        .bind(input.active)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| AppError::unique_violation(e, "sku"))?
        .ok_or_else(|| AppError::NotFound("Producto".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(extra: serde_json::Value) -> ProductInput {
        let mut payload = serde_json::json!({ "sku": "AG-500", "name": "Agua 500ml" });
        if let (Some(base), Some(extra)) = (payload.as_object_mut(), extra.as_object()) {
            base.extend(extra.clone());
        }
        serde_json::from_value(payload).unwrap()
    }

    fn rejected_field(input: ProductInput) -> Option<String> {
        match input.check() {
            Err(AppError::Validation { field, .. }) => Some(field),
            _ => None,
        }
    }

    #[test]
    fn test_valid_product_passes() {
        let product = input(serde_json::json!({ "cost": "12.50", "min_stock": "2.125", "max_stock": "40" }));
        assert!(product.check().is_ok());
        assert_eq!(product.unit, "unidad");
    }

    #[test]
    fn test_values_that_do_not_fit_their_columns_are_rejected() {
        assert_eq!(rejected_field(input(serde_json::json!({ "cost": "0.001" }))).as_deref(), Some("cost"));
        assert_eq!(rejected_field(input(serde_json::json!({ "price": "1000000000000" }))).as_deref(), Some("price"));
        assert_eq!(rejected_field(input(serde_json::json!({ "min_stock": "0.0004" }))).as_deref(), Some("min_stock"));
        assert_eq!(
            rejected_field(input(serde_json::json!({ "max_stock": "100000000000" }))).as_deref(),
            Some("max_stock")
        );
    }
}
