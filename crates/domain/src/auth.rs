//! Explicit authentication context.
//!
//! Components that act on behalf of a user receive an [`AuthSession`] value
//! rather than reading ambient state. The session is acquired from an
//! [`AuthGrant`] at sign-in and cleared at sign-out or when any call reports
//! that the token is no longer valid.

use common::CustomerId;
use serde::{Deserialize, Serialize};

use crate::error::BookingError;

/// Role of an authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "admin")]
    Staff,
    #[serde(rename = "customer")]
    Customer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Staff => "admin",
            Role::Customer => "customer",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque bearer token issued by the store.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// Who the caller is, as reported by `GET /auth/me/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub username: String,
    pub role: Role,
    #[serde(default)]
    pub customer_id: Option<CustomerId>,
}

impl Principal {
    pub fn staff(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            role: Role::Staff,
            customer_id: None,
        }
    }

    pub fn customer(username: impl Into<String>, customer_id: CustomerId) -> Self {
        Self {
            username: username.into(),
            role: Role::Customer,
            customer_id: Some(customer_id),
        }
    }

    pub fn is_staff(&self) -> bool {
        self.role == Role::Staff
    }

    /// The customer identity to book under, if the caller may book for themselves.
    pub fn booking_identity(&self) -> Option<CustomerId> {
        match self.role {
            Role::Customer => self.customer_id,
            Role::Staff => None,
        }
    }
}

/// Token plus identity, returned at registration or sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthGrant {
    pub token: AccessToken,
    #[serde(flatten)]
    pub principal: Principal,
}

/// Self-service sign-up: a username bound to a new customer profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub username: String,
    pub name: String,
    pub phone: String,
    pub national_id: String,
}

/// The caller's authentication state for one user session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthSession {
    grant: Option<AuthGrant>,
}

impl AuthSession {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn signed_in(grant: AuthGrant) -> Self {
        Self { grant: Some(grant) }
    }

    pub fn is_authenticated(&self) -> bool {
        self.grant.is_some()
    }

    pub fn principal(&self) -> Option<&Principal> {
        self.grant.as_ref().map(|g| &g.principal)
    }

    pub fn token(&self) -> Option<&AccessToken> {
        self.grant.as_ref().map(|g| &g.token)
    }

    /// The token, or an `Unauthorized` error for anonymous sessions.
    pub fn require_token(&self) -> Result<&AccessToken, BookingError> {
        self.token().ok_or_else(|| {
            BookingError::Unauthorized("Authentication credentials were not provided.".to_string())
        })
    }

    /// Drops the grant. Called on sign-out or on any authentication failure.
    pub fn clear(&mut self) {
        if let Some(grant) = self.grant.take() {
            tracing::info!(username = %grant.principal.username, "auth session cleared");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_wire_names() {
        assert_eq!(serde_json::to_string(&Role::Staff).unwrap(), "\"admin\"");
        assert_eq!(serde_json::to_string(&Role::Customer).unwrap(), "\"customer\"");
    }

    #[test]
    fn test_only_customers_have_a_booking_identity() {
        let id = CustomerId::new();
        assert_eq!(Principal::customer("amina", id).booking_identity(), Some(id));
        assert_eq!(Principal::staff("desk").booking_identity(), None);
        let unbound = Principal {
            username: "ghost".into(),
            role: Role::Customer,
            customer_id: None,
        };
        assert_eq!(unbound.booking_identity(), None);
    }

    #[test]
    fn test_session_clear() {
        let mut session = AuthSession::signed_in(AuthGrant {
            token: AccessToken::new("abc"),
            principal: Principal::staff("desk"),
        });
        assert!(session.require_token().is_ok());
        session.clear();
        assert!(!session.is_authenticated());
        let err = session.require_token().unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Unauthorized);
    }

    #[test]
    fn test_token_is_redacted_in_debug() {
        assert_eq!(format!("{:?}", AccessToken::new("secret")), "AccessToken(***)");
    }

    #[test]
    fn test_grant_wire_shape() {
        let grant = AuthGrant {
            token: AccessToken::new("tok"),
            principal: Principal::staff("desk"),
        };
        let json = serde_json::to_value(&grant).unwrap();
        assert_eq!(json["token"], "tok");
        assert_eq!(json["role"], "admin");
        assert_eq!(json["username"], "desk");
    }
}
