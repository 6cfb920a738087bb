use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::{
    auth::{ensure_mutable_target, AuthRejection},
    config::BootstrapConfig,
    dtos::{
        accounts::{CreateAccountRequest, UpdateAccountRequest},
        auth::{LoginRequest, LoginResponse, RegisterRequest},
    },
    models::{normalize_email, Account, AccountChanges, AccountView, NewAccount, Role},
    services::{JwtService, ServiceError, Store},
    utils::{hash_password, verify_password, Password, PasswordHashString, MIN_PASSWORD_LEN},
};

/// Account lifecycle: login, self-registration and super_admin management.
#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn Store>,
    jwt: JwtService,
}

impl AccountService {
    pub fn new(store: Arc<dyn Store>, jwt: JwtService) -> Self {
        Self { store, jwt }
    }

    /// Verifies the credential and issues an access token.
    ///
    /// Unknown email and wrong password are indistinguishable to the caller.
    /// A correct password on an inactive account is reported as such.
    #[instrument(skip(self, req))]
    pub async fn login(&self, req: LoginRequest) -> Result<LoginResponse, ServiceError> {
        let email = normalize_email(&req.email);
        let account = self
            .store
            .find_account_by_email(&email)
            .await?
            .ok_or(ServiceError::InvalidCredentials)?;

        if verify_password(&Password::new(req.password), &account.password_hash).is_err() {
            info!(account_id = account.id, "Login failed: wrong password");
            metrics::counter!("login_attempts_total", "outcome" => "invalid_credentials")
                .increment(1);
            return Err(ServiceError::InvalidCredentials);
        }

        if !account.active {
            info!(account_id = account.id, "Login refused: account inactive");
            metrics::counter!("login_attempts_total", "outcome" => "inactive_account")
                .increment(1);
            return Err(AuthRejection::InactiveAccount.into());
        }

        let token = self
            .jwt
            .generate_access_token(account.id, account.role)
            .map_err(ServiceError::internal)?;

        metrics::counter!("login_attempts_total", "outcome" => "success").increment(1);
        info!(account_id = account.id, role = %account.role, "Login succeeded");

        Ok(LoginResponse {
            token,
            token_type: "Bearer".to_string(),
            expires_in: self.jwt.access_token_expiry_seconds(),
            user: account.view(),
        })
    }

    /// Self-registration always yields an active `user`.
    #[instrument(skip(self, req))]
    pub async fn register(&self, req: RegisterRequest) -> Result<AccountView, ServiceError> {
        let account = self
            .create(req.email, req.name, req.password, Role::User)
            .await?;
        info!(account_id = account.id, "Account self-registered");
        Ok(account.view())
    }

    pub async fn list(&self) -> Result<Vec<AccountView>, ServiceError> {
        let accounts = self.store.list_accounts().await?;
        Ok(accounts.iter().map(Account::view).collect())
    }

    #[instrument(skip(self, req), fields(role = %req.role))]
    pub async fn create_account(
        &self,
        req: CreateAccountRequest,
    ) -> Result<AccountView, ServiceError> {
        if !matches!(req.role, Role::Admin | Role::User) {
            return Err(ServiceError::validation(
                "role",
                "Role must be admin or user",
            ));
        }

        let account = self.create(req.email, req.name, req.password, req.role).await?;
        info!(account_id = account.id, "Account created by super_admin");
        Ok(account.view())
    }

    #[instrument(skip(self, req))]
    pub async fn update_account(
        &self,
        id: i64,
        req: UpdateAccountRequest,
    ) -> Result<AccountView, ServiceError> {
        let target = self.mutable_target(id).await?;

        if let Some(role) = req.role {
            if !matches!(role, Role::Admin | Role::User) {
                return Err(ServiceError::validation(
                    "role",
                    "Role must be admin or user",
                ));
            }
        }

        let email = match req.email.as_deref().map(normalize_email) {
            Some(email) if email != target.email => {
                self.ensure_email_free(&email).await?;
                Some(email)
            }
            _ => None,
        };

        let name = match req.name.map(|n| n.trim().to_string()) {
            Some(name) if name.is_empty() => {
                return Err(ServiceError::validation("name", "Name is required"));
            }
            other => other,
        };

        let password_hash = req
            .password
            .map(|p| hash_new_password(Password::new(p)))
            .transpose()?;

        let changes = AccountChanges {
            email,
            name,
            role: req.role,
            active: req.active,
            password_hash,
        };
        if changes.is_empty() {
            return Ok(target.view());
        }

        let updated = self
            .store
            .update_account(id, changes)
            .await?
            .ok_or(ServiceError::NotFound("Account"))?;

        info!(account_id = id, role = %updated.role, active = updated.active, "Account updated");
        Ok(updated.view())
    }

    /// Soft delete: the row stays, sign-in and tokens stop working.
    #[instrument(skip(self))]
    pub async fn deactivate(&self, id: i64) -> Result<AccountView, ServiceError> {
        self.mutable_target(id).await?;

        let changes = AccountChanges {
            active: Some(false),
            ..Default::default()
        };
        let updated = self
            .store
            .update_account(id, changes)
            .await?
            .ok_or(ServiceError::NotFound("Account"))?;

        info!(account_id = id, "Account deactivated");
        Ok(updated.view())
    }

    #[instrument(skip(self))]
    pub async fn delete_permanently(&self, id: i64) -> Result<(), ServiceError> {
        self.mutable_target(id).await?;

        if !self.store.delete_account(id).await? {
            return Err(ServiceError::NotFound("Account"));
        }

        warn!(account_id = id, "Account permanently deleted");
        Ok(())
    }

    /// Creates the configured super_admin unless its email is already taken.
    /// Returns whether an account was created.
    pub async fn bootstrap_super_admin(
        &self,
        config: &BootstrapConfig,
    ) -> Result<bool, ServiceError> {
        let email = normalize_email(&config.email);
        if self.store.find_account_by_email(&email).await?.is_some() {
            info!("Bootstrap super_admin already present");
            return Ok(false);
        }

        let account = self
            .create(
                email,
                config.name.clone(),
                config.password.clone(),
                Role::SuperAdmin,
            )
            .await?;
        info!(account_id = account.id, "Bootstrap super_admin created");
        Ok(true)
    }

    async fn create(
        &self,
        email: String,
        name: String,
        password: String,
        role: Role,
    ) -> Result<Account, ServiceError> {
        let email = normalize_email(&email);
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(ServiceError::validation("name", "Name is required"));
        }

        // Checked before hashing so a duplicate never reaches the store.
        self.ensure_email_free(&email).await?;

        let password_hash = hash_new_password(Password::new(password))?;
        self.store
            .insert_account(NewAccount {
                email,
                name,
                password_hash,
                role,
                active: true,
            })
            .await
    }

    async fn ensure_email_free(&self, email: &str) -> Result<(), ServiceError> {
        if self.store.find_account_by_email(email).await?.is_some() {
            return Err(ServiceError::EmailTaken);
        }
        Ok(())
    }

    async fn mutable_target(&self, id: i64) -> Result<Account, ServiceError> {
        let target = self
            .store
            .find_account(id)
            .await?
            .ok_or(ServiceError::NotFound("Account"))?;
        ensure_mutable_target(&target)?;
        Ok(target)
    }
}

fn hash_new_password(password: Password) -> Result<PasswordHashString, ServiceError> {
    if password.as_str().chars().count() < MIN_PASSWORD_LEN {
        return Err(ServiceError::validation(
            "password",
            format!("Password must be at least {} characters", MIN_PASSWORD_LEN),
        ));
    }
    hash_password(&password).map_err(ServiceError::internal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::stores::AccountStore;
    use crate::services::InMemoryStore;

    fn service() -> (AccountService, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new());
        let jwt = JwtService::from_pem(
            include_str!("../../tests/fixtures/jwt_test_private.pem").as_bytes(),
            include_str!("../../tests/fixtures/jwt_test_public.pem").as_bytes(),
            60,
        )
        .unwrap();
        (AccountService::new(store.clone(), jwt), store)
    }

    fn register(email: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.to_string(),
            name: "Ana".to_string(),
            password: "secreto1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let (service, _) = service();
        let view = service.register(register("Ana@Example.com")).await.unwrap();
        assert_eq!(view.email, "ana@example.com");
        assert_eq!(view.role, Role::User);

        let response = service
            .login(LoginRequest {
                email: "ANA@example.com".into(),
                password: "secreto1".into(),
            })
            .await
            .unwrap();
        assert_eq!(response.user.id, view.id);
        assert_eq!(response.token_type, "Bearer");
    }

    #[tokio::test]
    async fn test_duplicate_registration_writes_nothing() {
        let (service, store) = service();
        service.register(register("ana@example.com")).await.unwrap();

        let err = service
            .register(register(" ANA@example.com "))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::EmailTaken));
        assert_eq!(store.list_accounts().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_email_look_alike() {
        let (service, _) = service();
        service.register(register("ana@example.com")).await.unwrap();

        for (email, password) in [("ana@example.com", "wrongpw"), ("nobody@example.com", "secreto1")] {
            let err = service
                .login(LoginRequest {
                    email: email.into(),
                    password: password.into(),
                })
                .await
                .unwrap_err();
            assert!(matches!(err, ServiceError::InvalidCredentials));
        }
    }

    #[tokio::test]
    async fn test_inactive_login_is_reported_distinctly() {
        let (service, _) = service();
        let view = service.register(register("ana@example.com")).await.unwrap();
        service.deactivate(view.id).await.unwrap();

        let err = service
            .login(LoginRequest {
                email: "ana@example.com".into(),
                password: "secreto1".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Auth(AuthRejection::InactiveAccount)
        ));
    }

    #[tokio::test]
    async fn test_super_admin_cannot_be_touched() {
        let (service, store) = service();
        let config = BootstrapConfig {
            email: "root@example.com".into(),
            password: "secreto1".into(),
            name: "Root".into(),
        };
        assert!(service.bootstrap_super_admin(&config).await.unwrap());
        assert!(!service.bootstrap_super_admin(&config).await.unwrap());

        let root = store
            .find_account_by_email("root@example.com")
            .await
            .unwrap()
            .unwrap();

        let update = service
            .update_account(
                root.id,
                UpdateAccountRequest {
                    name: Some("Renamed".into()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(
            update,
            Err(ServiceError::Auth(AuthRejection::ProtectedAccount))
        ));
        assert!(matches!(
            service.deactivate(root.id).await,
            Err(ServiceError::Auth(AuthRejection::ProtectedAccount))
        ));
        assert!(matches!(
            service.delete_permanently(root.id).await,
            Err(ServiceError::Auth(AuthRejection::ProtectedAccount))
        ));
    }

    #[tokio::test]
    async fn test_cannot_promote_to_super_admin() {
        let (service, _) = service();
        let view = service.register(register("ana@example.com")).await.unwrap();

        let err = service
            .update_account(
                view.id,
                UpdateAccountRequest {
                    role: Some(Role::SuperAdmin),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation { field: "role", .. }));
    }

    #[tokio::test]
    async fn test_reactivation_and_password_reset() {
        let (service, _) = service();
        let view = service.register(register("ana@example.com")).await.unwrap();
        service.deactivate(view.id).await.unwrap();

        let updated = service
            .update_account(
                view.id,
                UpdateAccountRequest {
                    active: Some(true),
                    password: Some("nuevo123".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(updated.active);

        assert!(service
            .login(LoginRequest {
                email: "ana@example.com".into(),
                password: "nuevo123".into(),
            })
            .await
            .is_ok());
    }
}
