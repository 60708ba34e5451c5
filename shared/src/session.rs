//! Explicit auth session lifecycle
//!
//! The dashboard holds one `SessionState` value: `Loading` until the first
//! auth check finishes, then `Resolved` with or without a session. Sign-in
//! and sign-out are the only transitions.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::MemberRole;

/// What a signed-in client knows about itself
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub user_id: Uuid,
    pub email: String,
    pub org_id: Uuid,
    pub role: MemberRole,
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(tag = "state", content = "session", rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Loading,
    Resolved(Option<Session>),
}

impl SessionState {
    /// Finish loading (or replace the current session after sign-in)
    pub fn resolve(&mut self, session: Option<Session>) {
        *self = SessionState::Resolved(session);
    }

    /// Drop the session; the state stays resolved
    pub fn sign_out(&mut self) -> Option<Session> {
        match std::mem::replace(self, SessionState::Resolved(None)) {
            SessionState::Resolved(previous) => previous,
            SessionState::Loading => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, SessionState::Loading)
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            SessionState::Resolved(Some(session)) => Some(session),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.session().is_some()
    }
}

/// Sign-in failures the client shows to the user
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuthFailure {
    InvalidCredentials,
    EmailNotConfirmed,
    Other,
}

impl AuthFailure {
    pub fn code(&self) -> &'static str {
        match self {
            AuthFailure::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthFailure::EmailNotConfirmed => "EMAIL_NOT_CONFIRMED",
            AuthFailure::Other => "AUTH_FAILED",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            AuthFailure::InvalidCredentials => "Credenciales incorrectas",
            AuthFailure::EmailNotConfirmed => "Email no confirmado",
            AuthFailure::Other => "No se pudo iniciar sesión",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            AuthFailure::InvalidCredentials => "Verifica tu email y contraseña e inténtalo de nuevo.",
            AuthFailure::EmailNotConfirmed => "Revisa tu bandeja de entrada y confirma tu email antes de entrar.",
            AuthFailure::Other => "Ocurrió un error inesperado. Inténtalo de nuevo.",
        }
    }

    /// Map a raw provider/server message onto a known failure
    pub fn from_raw(raw: &str) -> Self {
        let lower = raw.to_lowercase();
        if lower.contains("invalid login credentials")
            || lower.contains("invalid_credentials")
            || lower.contains("credenciales incorrectas")
        {
            AuthFailure::InvalidCredentials
        } else if lower.contains("email not confirmed")
            || lower.contains("email_not_confirmed")
            || lower.contains("email no confirmado")
        {
            AuthFailure::EmailNotConfirmed
        } else {
            AuthFailure::Other
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session {
            user_id: Uuid::new_v4(),
            email: "ana@shop.do".into(),
            org_id: Uuid::new_v4(),
            role: MemberRole::Owner,
            access_token: "a".into(),
            refresh_token: "r".into(),
        }
    }

    #[test]
    fn test_lifecycle() {
        let mut state = SessionState::default();
        assert!(state.is_loading());

        state.resolve(Some(session()));
        assert!(state.is_authenticated());

        let previous = state.sign_out();
        assert!(previous.is_some());
        assert_eq!(state, SessionState::Resolved(None));
        assert!(!state.is_loading());
    }

    #[test]
    fn test_sign_out_while_loading() {
        let mut state = SessionState::Loading;
        assert!(state.sign_out().is_none());
        assert_eq!(state, SessionState::Resolved(None));
    }

    #[test]
    fn test_failure_from_raw() {
        assert_eq!(AuthFailure::from_raw("Invalid login credentials"), AuthFailure::InvalidCredentials);
        assert_eq!(AuthFailure::from_raw("Email not confirmed"), AuthFailure::EmailNotConfirmed);
        assert_eq!(AuthFailure::from_raw("timeout"), AuthFailure::Other);
        assert_eq!(AuthFailure::InvalidCredentials.title(), "Credenciales incorrectas");
    }
}
