//! Authentication and session tests
//!
//! - Sign-in failure mapping and the messages shown to the user
//! - Session lifecycle (loading → resolved, sign-out)
//! - Account input validation
//! - Role checks for organization settings

use proptest::prelude::*;
use shared::models::{bootstrap_org_slug, MemberRole, BOOTSTRAP_ORG_NAME};
use shared::session::{AuthFailure, Session, SessionState};
use shared::validation::{validate_email, validate_password, validate_password_change};
use uuid::Uuid;

// ============================================================================
// Property Test Strategies
// ============================================================================

/// Generate valid email addresses
fn email_strategy() -> impl Strategy<Value = String> {
    "[a-z]{3,10}@[a-z]{3,8}\\.(com|org|net|com\\.do)"
}

/// Generate valid passwords (8+ chars)
fn password_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9!@#$%]{8,20}"
}

fn session() -> Session {
    Session {
        user_id: Uuid::new_v4(),
        email: "ana@tienda.com".to_string(),
        org_id: Uuid::new_v4(),
        role: MemberRole::Owner,
        access_token: "access".to_string(),
        refresh_token: "refresh".to_string(),
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn test_generated_emails_are_accepted(email in email_strategy()) {
        prop_assert!(validate_email(&email).is_ok());
    }

    #[test]
    fn test_generated_passwords_are_accepted(password in password_strategy()) {
        prop_assert!(validate_password(&password).is_ok());
        prop_assert!(validate_password_change(&password, &password).is_ok());
    }

    #[test]
    fn test_short_passwords_are_rejected(password in "[a-z0-9]{0,7}") {
        prop_assert!(validate_password(&password).is_err());
    }

    /// Unknown provider messages never map to a specific failure
    #[test]
    fn test_unrecognized_messages_are_generic(raw in "[0-9 ]{0,30}") {
        prop_assert_eq!(AuthFailure::from_raw(&raw), AuthFailure::Other);
    }

    #[test]
    fn test_bootstrap_slug_shape(id in any::<u128>()) {
        let slug = bootstrap_org_slug(Uuid::from_u128(id));
        prop_assert!(slug.starts_with("inventario-"));
        prop_assert_eq!(slug.len(), "inventario-".len() + 8);
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// A wrong password surfaces as "Credenciales incorrectas" and leaves the
    /// client signed out
    #[test]
    fn test_wrong_password_scenario() {
        let mut state = SessionState::default();
        assert!(state.is_loading());

        let failure = AuthFailure::from_raw("Invalid login credentials");
        assert_eq!(failure, AuthFailure::InvalidCredentials);
        assert_eq!(failure.title(), "Credenciales incorrectas");

        state.resolve(None);
        assert!(!state.is_loading());
        assert!(!state.is_authenticated());
    }

    #[test]
    fn test_unconfirmed_email_message() {
        let failure = AuthFailure::from_raw("Email not confirmed");
        assert_eq!(failure, AuthFailure::EmailNotConfirmed);
        assert_eq!(failure.code(), "EMAIL_NOT_CONFIRMED");
        assert_eq!(failure.title(), "Email no confirmado");
    }

    #[test]
    fn test_sign_in_then_sign_out() {
        let mut state = SessionState::default();
        let s = session();
        state.resolve(Some(s.clone()));
        assert!(state.is_authenticated());
        assert_eq!(state.session().map(|s| s.email.as_str()), Some("ana@tienda.com"));

        assert_eq!(state.sign_out(), Some(s));
        assert!(!state.is_authenticated());
        assert!(!state.is_loading());
    }

    #[test]
    fn test_sign_out_while_loading() {
        let mut state = SessionState::Loading;
        assert_eq!(state.sign_out(), None);
        assert_eq!(state, SessionState::Resolved(None));
    }

    #[test]
    fn test_session_state_wire_format() {
        let json = serde_json::to_value(SessionState::Resolved(None)).unwrap();
        assert_eq!(json["state"], "resolved");
        let json = serde_json::to_value(SessionState::Loading).unwrap();
        assert_eq!(json["state"], "loading");
    }

    #[test]
    fn test_invalid_emails() {
        for email in ["", "ana", "ana@", "@tienda.com", "ana@tienda", "ana@.com", "ana@tienda."] {
            assert!(validate_email(email).is_err(), "{email} should be rejected");
        }
    }

    #[test]
    fn test_password_confirmation_must_match() {
        assert_eq!(
            validate_password_change("secreto123", "secreto124"),
            Err("Las contraseñas no coinciden")
        );
    }

    #[test]
    fn test_only_owners_and_admins_manage_settings() {
        assert!(MemberRole::Owner.can_manage_settings());
        assert!(MemberRole::Admin.can_manage_settings());
        assert!(!MemberRole::Member.can_manage_settings());
    }

    #[test]
    fn test_bootstrap_org_name() {
        assert!(!BOOTSTRAP_ORG_NAME.is_empty());
    }
}
