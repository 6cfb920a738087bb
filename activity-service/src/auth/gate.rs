use std::sync::Arc;

use crate::models::Account;
use crate::services::{JwtService, ServiceError, Store};

use super::{AuthRejection, Principal};

/// Turns the `Authorization` header of a request into a [`Principal`].
///
/// Holds no per-request state; every call re-reads the account row, so
/// deactivation and role changes take effect on the next request.
#[derive(Clone)]
pub struct AuthGate {
    jwt: JwtService,
    store: Arc<dyn Store>,
}

impl AuthGate {
    pub fn new(jwt: JwtService, store: Arc<dyn Store>) -> Self {
        Self { jwt, store }
    }

    /// `header` is the raw `Authorization` value, if any.
    pub async fn authenticate(&self, header: Option<&str>) -> Result<Principal, ServiceError> {
        let Some(header) = header else {
            return Ok(Principal::Guest);
        };

        let result = self.verify(header).await;
        if let Err(ServiceError::Auth(rejection)) = &result {
            metrics::counter!("auth_gate_rejections_total", "reason" => rejection.code())
                .increment(1);
            tracing::info!(reason = rejection.code(), "Request rejected by auth gate");
        }
        result
    }

    async fn verify(&self, header: &str) -> Result<Principal, ServiceError> {
        let token = bearer_token(header).ok_or(AuthRejection::InvalidToken)?;

        let claims = self.jwt.validate_access_token(token).map_err(|e| {
            tracing::debug!(error = %e, "Token verification failed");
            AuthRejection::InvalidToken
        })?;
        let account_id = claims.account_id().ok_or(AuthRejection::InvalidToken)?;

        let account = self
            .store
            .find_account(account_id)
            .await?
            .ok_or(AuthRejection::UnknownAccount)?;

        if !account.active {
            return Err(AuthRejection::InactiveAccount.into());
        }

        Ok(Principal::Account(Identity::from(&account)))
    }
}

/// Token from a well-formed `Bearer <token>` header.
fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() && !token.contains(' '))
        .then_some(token)
}

/// The live account a request acts as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub role: crate::models::Role,
    pub active: bool,
}

impl From<&Account> for Identity {
    fn from(a: &Account) -> Self {
        Self {
            id: a.id,
            email: a.email.clone(),
            name: a.name.clone(),
            role: a.role,
            active: a.active,
        }
    }
}
