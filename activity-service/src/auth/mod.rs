//! Per-request identity and the role table that authorizes operations.

pub mod gate;
pub mod policy;

pub use gate::{AuthGate, Identity};
pub use policy::{allowed_roles, ensure_mutable_target, is_allowed, Operation};

use axum::http::StatusCode;
use thiserror::Error;

use crate::models::Role;

/// Terminal outcomes of the gate and of authorization checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthRejection {
    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Account no longer exists")]
    UnknownAccount,

    #[error("Account is inactive, contact an administrator")]
    InactiveAccount,

    #[error("Insufficient role for this operation")]
    InsufficientRole,

    #[error("super_admin accounts cannot be modified")]
    ProtectedAccount,
}

impl AuthRejection {
    pub fn code(&self) -> &'static str {
        match self {
            AuthRejection::InvalidToken => "invalid_token",
            AuthRejection::UnknownAccount => "unknown_account",
            AuthRejection::InactiveAccount => "inactive_account",
            AuthRejection::InsufficientRole => "insufficient_role",
            AuthRejection::ProtectedAccount => "protected_account",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AuthRejection::InvalidToken => StatusCode::UNAUTHORIZED,
            _ => StatusCode::FORBIDDEN,
        }
    }
}

/// Who a request is acting as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    Guest,
    Account(Identity),
}

impl Principal {
    pub fn role(&self) -> Role {
        match self {
            Principal::Guest => Role::Guest,
            Principal::Account(identity) => identity.role,
        }
    }

    pub fn account(&self) -> Option<&Identity> {
        match self {
            Principal::Guest => None,
            Principal::Account(identity) => Some(identity),
        }
    }

    pub fn require(&self, operation: Operation) -> Result<(), AuthRejection> {
        if is_allowed(self.role(), operation) {
            Ok(())
        } else {
            tracing::info!(role = %self.role(), ?operation, "Operation denied");
            metrics::counter!("auth_gate_rejections_total", "reason" => "insufficient_role")
                .increment(1);
            Err(AuthRejection::InsufficientRole)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_and_statuses() {
        assert_eq!(AuthRejection::InvalidToken.status(), StatusCode::UNAUTHORIZED);
        for r in [
            AuthRejection::UnknownAccount,
            AuthRejection::InactiveAccount,
            AuthRejection::InsufficientRole,
            AuthRejection::ProtectedAccount,
        ] {
            assert_eq!(r.status(), StatusCode::FORBIDDEN);
        }
        assert_eq!(AuthRejection::InactiveAccount.code(), "inactive_account");
    }

    #[test]
    fn test_guest_principal() {
        let guest = Principal::Guest;
        assert_eq!(guest.role(), Role::Guest);
        assert!(guest.account().is_none());
        assert!(guest.require(Operation::ReadActivities).is_ok());
        assert_eq!(
            guest.require(Operation::CreateActivity),
            Err(AuthRejection::InsufficientRole)
        );
    }
}
