//! WebAssembly module for the Inventario dashboard
//!
//! Provides client-side computation for:
//! - Supply chart percentages
//! - Low-stock and expiry badges
//! - Signed movement quantities and input checks
//! - Sign-in error messages and the session lifecycle

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use wasm_bindgen::prelude::*;

use shared::ledger::{normalize_supply, ExpirySeverity, LowStockSeverity, SupplyBucket};
use shared::models::{is_low_stock, MovementType, OutboundReason};
use shared::session::{AuthFailure, Session, SessionState};

// Re-export shared types for use in JavaScript
pub use shared::types::*;
pub use shared::validation::*;

fn dec(value: f64) -> Decimal {
    Decimal::try_from(value).unwrap_or(Decimal::ZERO)
}

fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

fn js_error(message: String) -> JsValue {
    web_sys::console::warn_1(&JsValue::from_str(&message));
    JsValue::from_str(&message)
}

// ============================================================================
// Dashboard
// ============================================================================

/// Whole-percent split of three quantities, summing to 100 (or all zero)
#[wasm_bindgen]
pub fn to_pct3(a: f64, b: f64, c: f64) -> Vec<u32> {
    let (w, t, r) = shared::ledger::to_pct3(dec(a), dec(b), dec(c));
    vec![w, t, r]
}

fn supply_points_json(buckets_json: &str) -> Result<String, String> {
    let buckets: Vec<SupplyBucket> =
        serde_json::from_str(buckets_json).map_err(|e| format!("Invalid supply JSON: {}", e))?;
    serde_json::to_string(&normalize_supply(&buckets)).map_err(|e| e.to_string())
}

/// Normalize supply buckets (current or legacy shape) into chart points
#[wasm_bindgen]
pub fn normalize_supply_buckets(buckets_json: &str) -> Result<String, JsValue> {
    supply_points_json(buckets_json).map_err(js_error)
}

// ============================================================================
// Alerts
// ============================================================================

/// Badge label for a product at or below its minimum, `None` when stock is fine
#[wasm_bindgen]
pub fn low_stock_label(stock: f64, min_stock: f64) -> Option<String> {
    let (stock, min_stock) = (dec(stock), dec(min_stock));
    if !is_low_stock(stock, min_stock) {
        return None;
    }
    Some(LowStockSeverity::classify(min_stock - stock).label().to_string())
}

#[wasm_bindgen]
pub fn expiry_label(days_left: i32) -> String {
    ExpirySeverity::classify(i64::from(days_left)).label().to_string()
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|e| format!("Invalid date '{}': {}", value, e))
}

fn days_between_dates(today: &str, expiration: &str) -> Result<i32, String> {
    let days = (parse_date(expiration)? - parse_date(today)?).num_days();
    i32::try_from(days).map_err(|e| e.to_string())
}

/// Days from `today` to `expiration`, both `YYYY-MM-DD`
#[wasm_bindgen]
pub fn days_between(today: &str, expiration: &str) -> Result<i32, JsValue> {
    days_between_dates(today, expiration).map_err(js_error)
}

/// Days left until `expiration` by the browser's local calendar
#[wasm_bindgen]
pub fn days_until(expiration: &str) -> Result<i32, JsValue> {
    let now = js_sys::Date::new_0();
    let today = format!(
        "{:04}-{:02}-{:02}",
        now.get_full_year(),
        now.get_month() + 1,
        now.get_date()
    );
    days_between(&today, expiration)
}

// ============================================================================
// Movements
// ============================================================================

fn parse_movement_type(value: &str) -> Result<MovementType, String> {
    value.parse::<MovementType>().map_err(|e| e.to_string())
}

/// Effect of a movement on the product total: +in, −out, 0 for transfers
#[wasm_bindgen]
pub fn signed_quantity(movement_type: &str, quantity: f64) -> Result<f64, JsValue> {
    let kind = parse_movement_type(movement_type).map_err(js_error)?;
    Ok(to_f64(kind.signed(dec(quantity))))
}

fn outbound_reasons_json() -> Result<String, String> {
    let options: Vec<serde_json::Value> = OutboundReason::ALL
        .iter()
        .map(|reason| {
            serde_json::json!({
                "value": reason,
                "label": reason.label(),
                "reference": reason.preset_reference(),
            })
        })
        .collect();
    serde_json::to_string(&options).map_err(|e| e.to_string())
}

/// Options for the outbound reason picker: `[{value, label, reference}]`
#[wasm_bindgen]
pub fn outbound_reasons() -> Result<String, JsValue> {
    outbound_reasons_json().map_err(js_error)
}

/// Reference prefilled in the outbound form for a reason
#[wasm_bindgen]
pub fn outbound_reason_reference(reason: &str) -> String {
    serde_json::from_value::<OutboundReason>(serde_json::Value::String(reason.to_string()))
        .map(|r| r.preset_reference().to_string())
        .unwrap_or_default()
}

/// First validation error for a movement form, if any
#[wasm_bindgen]
pub fn movement_form_error(
    movement_type: &str,
    quantity: f64,
    reference: Option<String>,
    reference_required: bool,
) -> Option<String> {
    if let Err(e) = parse_movement_type(movement_type) {
        return Some(e);
    }
    validate_quantity(dec(quantity))
        .and_then(|_| validate_reference(reference.as_deref(), reference_required))
        .err()
        .map(str::to_string)
}

// ============================================================================
// Sign-in and session
// ============================================================================

#[wasm_bindgen]
pub fn auth_failure_title(raw: &str) -> String {
    AuthFailure::from_raw(raw).title().to_string()
}

#[wasm_bindgen]
pub fn auth_failure_message(raw: &str) -> String {
    AuthFailure::from_raw(raw).message().to_string()
}

/// Session lifecycle held by the dashboard shell
#[wasm_bindgen]
#[derive(Default)]
pub struct SessionStore {
    state: SessionState,
}

impl SessionStore {
    fn resolve_json(&mut self, session_json: Option<String>) -> Result<(), String> {
        let session = match session_json {
            Some(json) => Some(serde_json::from_str::<Session>(&json).map_err(|e| format!("Invalid session JSON: {}", e))?),
            None => None,
        };
        self.state.resolve(session);
        Ok(())
    }
}

#[wasm_bindgen]
impl SessionStore {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Finish the initial auth check, or store the session after sign-in
    pub fn resolve(&mut self, session_json: Option<String>) -> Result<(), JsValue> {
        self.resolve_json(session_json).map_err(js_error)
    }

    /// Forget the session; returns whether one was held
    pub fn sign_out(&mut self) -> bool {
        self.state.sign_out().is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.is_authenticated()
    }

    /// Bearer token for API calls
    pub fn access_token(&self) -> Option<String> {
        self.state.session().map(|s| s.access_token.clone())
    }
}
