//! Persistence seams. `Database` backs them with PostgreSQL, `InMemoryStore`
//! with plain collections for tests and local runs.

use async_trait::async_trait;

use crate::models::{
    Account, AccountChanges, Activity, ActivityChanges, LocationCombination, LocationSelection,
    NewAccount, NewActivity,
};

use super::ServiceError;

#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_account(&self, id: i64) -> Result<Option<Account>, ServiceError>;

    /// Case-insensitive lookup.
    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, ServiceError>;

    /// Ordered by id.
    async fn list_accounts(&self) -> Result<Vec<Account>, ServiceError>;

    /// Fails with `EmailTaken` when the email is already registered.
    async fn insert_account(&self, account: NewAccount) -> Result<Account, ServiceError>;

    /// `Ok(None)` when no such account exists.
    async fn update_account(
        &self,
        id: i64,
        changes: AccountChanges,
    ) -> Result<Option<Account>, ServiceError>;

    async fn delete_account(&self, id: i64) -> Result<bool, ServiceError>;
}

#[async_trait]
pub trait LocationStore: Send + Sync {
    async fn list_locations(&self) -> Result<Vec<LocationCombination>, ServiceError>;

    /// Fails with `LocationExists` on a duplicate tuple. `selection` must be
    /// normalized and carry a zone.
    async fn insert_location(
        &self,
        selection: &LocationSelection,
    ) -> Result<LocationCombination, ServiceError>;

    async fn update_location(
        &self,
        id: i64,
        selection: &LocationSelection,
    ) -> Result<Option<LocationCombination>, ServiceError>;

    /// Activities pointing at the row lose their location.
    async fn delete_location(&self, id: i64) -> Result<bool, ServiceError>;
}

#[async_trait]
pub trait ActivityStore: Send + Sync {
    /// Newest first.
    async fn list_activities(&self) -> Result<Vec<Activity>, ServiceError>;

    async fn find_activity(&self, id: i64) -> Result<Option<Activity>, ServiceError>;

    /// Fails with `LocationError::NoMatch` if `location_id` does not exist.
    async fn insert_activity(&self, activity: NewActivity) -> Result<Activity, ServiceError>;

    async fn update_activity(
        &self,
        id: i64,
        changes: ActivityChanges,
    ) -> Result<Option<Activity>, ServiceError>;

    async fn delete_activity(&self, id: i64) -> Result<bool, ServiceError>;
}

/// A complete storage backend.
#[async_trait]
pub trait Store: AccountStore + LocationStore + ActivityStore {
    async fn health_check(&self) -> Result<(), ServiceError>;
}
