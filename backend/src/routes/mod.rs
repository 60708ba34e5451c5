//! Route definitions for the Inventario API

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes. Everything except sign-up, sign-in and refresh sits
/// behind the session middleware.
pub fn api_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .nest("/auth", session_routes())
        .route("/orgs/current", get(handlers::get_current_org))
        .route(
            "/settings",
            get(handlers::get_settings).put(handlers::upsert_settings),
        )
        .nest("/categories", category_routes())
        .nest("/products", product_routes())
        .nest("/warehouses", warehouse_routes())
        .nest("/suppliers", supplier_routes())
        .nest("/purchase-orders", purchase_order_routes())
        .nest("/movements", movement_routes())
        .nest("/stock", stock_routes())
        .nest("/alerts", alert_routes())
        .nest("/dashboard", dashboard_routes())
        .nest("/reports", report_routes())
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/auth", auth_routes())
        .merge(protected)
}

/// Authentication routes (public)
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .route("/refresh", post(handlers::refresh))
}

/// Session routes (protected)
fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/logout", post(handlers::logout))
        .route("/me", get(handlers::get_me).put(handlers::update_me))
        .route("/me/password", put(handlers::change_password))
        .route("/me/email", put(handlers::change_email))
}

fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_categories).post(handlers::create_category))
        .route("/:category_id", put(handlers::update_category))
}

fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_products).post(handlers::create_product))
        .route(
            "/:product_id",
            get(handlers::get_product).put(handlers::update_product),
        )
}

fn warehouse_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_warehouses).post(handlers::create_warehouse))
        .route("/primary", get(handlers::get_primary_warehouse))
        .route("/:warehouse_id", put(handlers::update_warehouse))
}

fn supplier_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_suppliers).post(handlers::create_supplier))
        .route("/:supplier_id", put(handlers::update_supplier))
}

fn purchase_order_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_purchase_orders).post(handlers::create_purchase_order),
        )
        .route("/:order_id", put(handlers::update_purchase_order))
}

fn movement_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_movements))
        .route("/in", post(handlers::record_inbound))
        .route("/out", post(handlers::record_outbound))
        .route("/transfer", post(handlers::record_transfer))
}

fn stock_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::get_stock))
        .route("/by-warehouse", get(handlers::get_stock_by_warehouse))
}

fn alert_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::get_alerts))
        .route("/low-stock", get(handlers::get_low_stock_alerts))
        .route("/expiring", get(handlers::get_expiring_alerts))
        .route("/overstock", get(handlers::get_overstock_alerts))
}

fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::get_dashboard))
        .route("/kpis", get(handlers::get_kpis))
        .route("/top-products", get(handlers::get_top_products))
        .route("/supply", get(handlers::get_supply))
        .route("/health", get(handlers::get_health))
}

fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/stock", get(handlers::get_stock_report))
        .route("/low-stock", get(handlers::get_low_stock_report))
        .route("/kardex/:product_id", get(handlers::get_kardex_report))
        .route("/valuation", get(handlers::get_valuation_report))
}
