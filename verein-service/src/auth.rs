//! Caller identity and permission checks
//!
//! Authentication happens at the gateway in front of this service, which
//! forwards the resolved roles in a trusted header (see
//! [`AuthConfig::roles_header`](crate::config::AuthConfig)). This module only
//! reads those roles and decides whether an action is permitted.

use std::collections::BTreeSet;

use axum::extract::{FromRef, FromRequestParts};
use http::request::Parts;

use crate::service::ServiceError;
use crate::state::AppState;

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_USER: &str = "user";

/// Roles of the calling principal
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity {
    roles: BTreeSet<String>,
}

impl Identity {
    /// Caller without any role
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_roles<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            roles: roles
                .into_iter()
                .map(|r| r.as_ref().trim().to_ascii_lowercase())
                .filter(|r| !r.is_empty())
                .collect(),
        }
    }

    /// Parse a comma-separated role list
    pub fn from_header_value(value: &str) -> Self {
        Self::with_roles(value.split(','))
    }

    pub fn is_anonymous(&self) -> bool {
        self.roles.is_empty()
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    pub fn roles(&self) -> impl Iterator<Item = &str> {
        self.roles.iter().map(String::as_str)
    }
}

/// Protected actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Update,
    Delete,
}

impl Action {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }

    /// Roles of which the caller needs at least one
    pub const fn allowed_roles(self) -> &'static [&'static str] {
        match self {
            Self::Create | Self::Update => &[ROLE_ADMIN, ROLE_USER],
            Self::Delete => &[ROLE_ADMIN],
        }
    }
}

/// Check that `identity` may perform `action`
pub fn authorize(identity: &Identity, action: Action) -> Result<(), ServiceError> {
    if identity.is_anonymous() {
        tracing::warn!(action = action.name(), "Rejected unauthenticated write");
        return Err(ServiceError::Unauthorized {
            action: action.name(),
        });
    }
    if action
        .allowed_roles()
        .iter()
        .any(|role| identity.has_role(role))
    {
        Ok(())
    } else {
        tracing::warn!(
            action = action.name(),
            roles = ?identity.roles,
            "Rejected write for insufficient roles"
        );
        Err(ServiceError::Forbidden {
            action: action.name(),
        })
    }
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        Ok(parts
            .headers
            .get(state.config().auth.roles_header.as_str())
            .and_then(|value| value.to_str().ok())
            .map(Identity::from_header_value)
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roles_are_normalized() {
        let identity = Identity::from_header_value(" Admin , user,,");
        assert!(identity.has_role("admin"));
        assert!(identity.has_role("user"));
        assert_eq!(identity.roles().count(), 2);
    }

    #[test]
    fn test_anonymous_is_unauthorized() {
        assert!(matches!(
            authorize(&Identity::anonymous(), Action::Create),
            Err(ServiceError::Unauthorized { action: "create" })
        ));
    }

    #[test]
    fn test_user_may_write_but_not_delete() {
        let user = Identity::with_roles(["user"]);
        assert!(authorize(&user, Action::Create).is_ok());
        assert!(authorize(&user, Action::Update).is_ok());
        assert!(matches!(
            authorize(&user, Action::Delete),
            Err(ServiceError::Forbidden { action: "delete" })
        ));
    }

    #[test]
    fn test_admin_may_delete() {
        assert!(authorize(&Identity::with_roles(["admin"]), Action::Delete).is_ok());
        assert!(authorize(&Identity::with_roles(["guest"]), Action::Delete).is_err());
    }
}
