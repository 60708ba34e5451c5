//! Validation utilities for the Inventario platform

use rust_decimal::Decimal;

use crate::models::MovementType;

/// Integer digits and scale of stock columns, `NUMERIC(14, 3)`
pub const QUANTITY_PRECISION: (u32, u32) = (11, 3);

/// Integer digits and scale of money columns, `NUMERIC(14, 2)`
pub const MONEY_PRECISION: (u32, u32) = (12, 2);

/// Validate a value fits a `NUMERIC` column without rounding or overflow
pub fn validate_precision(value: Decimal, (integer_digits, scale): (u32, u32)) -> Result<(), &'static str> {
    if value.normalize().scale() > scale {
        return Err("El valor tiene demasiados decimales");
    }
    if value.abs() >= Decimal::from(10u64.pow(integer_digits)) {
        return Err("El valor es demasiado grande");
    }
    Ok(())
}

// ============================================================================
// Catalog Validations
// ============================================================================

/// Validate a percentage field (discount, tax) is within 0-100
pub fn validate_percent(value: Decimal) -> Result<(), &'static str> {
    if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
        return Err("El porcentaje debe estar entre 0 y 100");
    }
    Ok(())
}

/// Validate a required text field is not blank
pub fn validate_required(value: &str) -> Result<(), &'static str> {
    if value.trim().is_empty() {
        return Err("Este campo es obligatorio");
    }
    Ok(())
}

/// Validate stock limits: min >= 0 and max >= min when present
pub fn validate_stock_limits(min_stock: Decimal, max_stock: Option<Decimal>) -> Result<(), &'static str> {
    if min_stock < Decimal::ZERO {
        return Err("El stock mínimo no puede ser negativo");
    }
    validate_precision(min_stock, QUANTITY_PRECISION)?;
    if let Some(max) = max_stock {
        validate_precision(max, QUANTITY_PRECISION)?;
        if max < min_stock {
            return Err("El stock máximo debe ser mayor o igual al mínimo");
        }
    }
    Ok(())
}

/// Validate money amounts (cost, price) are not negative
pub fn validate_amount(value: Decimal) -> Result<(), &'static str> {
    if value < Decimal::ZERO {
        return Err("El monto no puede ser negativo");
    }
    validate_precision(value, MONEY_PRECISION)
}

// ============================================================================
// Movement Validations
// ============================================================================

/// Validate a movement quantity is strictly positive and storable
pub fn validate_quantity(quantity: Decimal) -> Result<(), &'static str> {
    if quantity <= Decimal::ZERO {
        return Err("La cantidad debe ser mayor que 0");
    }
    validate_precision(quantity, QUANTITY_PRECISION)
}

/// Validate the destination of a movement: transfers need one that differs
/// from the source, other movements must not carry one
pub fn validate_transfer_destination(
    movement_type: MovementType,
    source: uuid::Uuid,
    destination: Option<uuid::Uuid>,
) -> Result<(), &'static str> {
    match (movement_type, destination) {
        (MovementType::Transfer, None) => Err("La transferencia requiere un almacén destino"),
        (MovementType::Transfer, Some(dest)) if dest == source => {
            Err("El almacén destino debe ser distinto al de origen")
        }
        (MovementType::Transfer, Some(_)) => Ok(()),
        (_, Some(_)) => Err("Solo las transferencias tienen almacén destino"),
        (_, None) => Ok(()),
    }
}

/// Validate a movement reference when the organization requires one
pub fn validate_reference(reference: Option<&str>, required: bool) -> Result<(), &'static str> {
    if required && reference.map_or(true, |r| r.trim().is_empty()) {
        return Err("La referencia es obligatoria");
    }
    Ok(())
}

// ============================================================================
// Account Validations
// ============================================================================

/// Validate email format (basic check)
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    let Some((local, domain)) = email.split_once('@') else {
        return Err("Formato de email inválido");
    };
    if local.is_empty() || !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err("Formato de email inválido");
    }
    Ok(())
}

/// Validate password strength
pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.chars().count() < 8 {
        return Err("La contraseña debe tener al menos 8 caracteres");
    }
    Ok(())
}

/// Validate a new password and its confirmation
pub fn validate_password_change(password: &str, confirmation: &str) -> Result<(), &'static str> {
    validate_password(password)?;
    if password != confirmation {
        return Err("Las contraseñas no coinciden");
    }
    Ok(())
}
