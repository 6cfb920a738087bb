//! PostgreSQL-backed store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPool, FromRow};
use std::time::Instant;
use tracing::{info, instrument};

use crate::location::LocationError;
use crate::models::{
    Account, AccountChanges, Activity, ActivityChanges, LocationCombination, LocationSelection,
    NewAccount, NewActivity,
};
use crate::utils::PasswordHashString;

use super::{AccountStore, ActivityStore, LocationStore, ServiceError, Store};

const ACCOUNT_COLUMNS: &str =
    "id, email, name, password_hash, role, active, created_at, updated_at";
const LOCATION_COLUMNS: &str = "id, zone, subzone, store, company";
const ACTIVITY_COLUMNS: &str =
    "id, description, status, responsible, location_id, created_at, updated_at";

/// Connection pool wrapper implementing every store trait.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[derive(FromRow)]
struct AccountRow {
    id: i64,
    email: String,
    name: String,
    password_hash: String,
    role: String,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for Account {
    type Error = ServiceError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        Ok(Account {
            id: row.id,
            email: row.email,
            name: row.name,
            password_hash: PasswordHashString::new(row.password_hash),
            role: row.role.parse().map_err(ServiceError::database)?,
            active: row.active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct LocationRow {
    id: i64,
    zone: String,
    subzone: Option<String>,
    store: Option<String>,
    company: Option<String>,
}

impl From<LocationRow> for LocationCombination {
    fn from(row: LocationRow) -> Self {
        LocationCombination {
            id: row.id,
            zone: row.zone,
            subzone: row.subzone,
            store: row.store,
            company: row.company,
        }
    }
}

#[derive(FromRow)]
struct ActivityRow {
    id: i64,
    description: String,
    status: String,
    responsible: Option<String>,
    location_id: Option<i64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ActivityRow> for Activity {
    type Error = ServiceError;

    fn try_from(row: ActivityRow) -> Result<Self, Self::Error> {
        Ok(Activity {
            id: row.id,
            description: row.description,
            status: row.status.parse().map_err(ServiceError::database)?,
            responsible: row.responsible,
            location_id: row.location_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Maps driver errors onto domain errors where the schema encodes a rule.
fn map_db_error(err: sqlx::Error, on_unique: ServiceError) -> ServiceError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => on_unique,
        sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
            LocationError::NoMatch.into()
        }
        _ => ServiceError::database(err),
    }
}

fn record_query(query: &'static str, started: Instant) {
    metrics::histogram!("db_query_duration_seconds", "query" => query)
        .record(started.elapsed().as_secs_f64());
}

#[async_trait]
impl AccountStore for Database {
    #[instrument(skip(self))]
    async fn find_account(&self, id: i64) -> Result<Option<Account>, ServiceError> {
        let started = Instant::now();
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(ServiceError::database)?;
        record_query("find_account", started);

        row.map(Account::try_from).transpose()
    }

    #[instrument(skip(self, email))]
    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, ServiceError> {
        let started = Instant::now();
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE LOWER(email) = LOWER($1)"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(ServiceError::database)?;
        record_query("find_account_by_email", started);

        row.map(Account::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn list_accounts(&self) -> Result<Vec<Account>, ServiceError> {
        let started = Instant::now();
        let rows = sqlx::query_as::<_, AccountRow>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(ServiceError::database)?;
        record_query("list_accounts", started);

        rows.into_iter().map(Account::try_from).collect()
    }

    #[instrument(skip(self, account), fields(role = %account.role))]
    async fn insert_account(&self, account: NewAccount) -> Result<Account, ServiceError> {
        let started = Instant::now();
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "INSERT INTO accounts (email, name, password_hash, role, active) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {ACCOUNT_COLUMNS}"
        ))
        .bind(&account.email)
        .bind(&account.name)
        .bind(account.password_hash.as_str())
        .bind(account.role.as_str())
        .bind(account.active)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, ServiceError::EmailTaken))?;
        record_query("insert_account", started);

        info!(account_id = row.id, "Account created");
        Account::try_from(row)
    }

    #[instrument(skip(self, changes))]
    async fn update_account(
        &self,
        id: i64,
        changes: AccountChanges,
    ) -> Result<Option<Account>, ServiceError> {
        let started = Instant::now();
        let row = sqlx::query_as::<_, AccountRow>(&format!(
            "UPDATE accounts SET \
               email = COALESCE($2, email), \
               name = COALESCE($3, name), \
               role = COALESCE($4, role), \
               active = COALESCE($5, active), \
               password_hash = COALESCE($6, password_hash) \
             WHERE id = $1 RETURNING {ACCOUNT_COLUMNS}"
        ))
        .bind(id)
        .bind(changes.email.as_deref())
        .bind(changes.name.as_deref())
        .bind(changes.role.map(|r| r.as_str()))
        .bind(changes.active)
        .bind(changes.password_hash.as_ref().map(|h| h.as_str()))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error(e, ServiceError::EmailTaken))?;
        record_query("update_account", started);

        row.map(Account::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn delete_account(&self, id: i64) -> Result<bool, ServiceError> {
        let started = Instant::now();
        let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(ServiceError::database)?;
        record_query("delete_account", started);

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl LocationStore for Database {
    #[instrument(skip(self))]
    async fn list_locations(&self) -> Result<Vec<LocationCombination>, ServiceError> {
        let started = Instant::now();
        let rows = sqlx::query_as::<_, LocationRow>(&format!(
            "SELECT {LOCATION_COLUMNS} FROM location_combinations ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(ServiceError::database)?;
        record_query("list_locations", started);

        Ok(rows.into_iter().map(LocationCombination::from).collect())
    }

    #[instrument(skip(self))]
    async fn insert_location(
        &self,
        selection: &LocationSelection,
    ) -> Result<LocationCombination, ServiceError> {
        let started = Instant::now();
        let row = sqlx::query_as::<_, LocationRow>(&format!(
            "INSERT INTO location_combinations (zone, subzone, store, company) \
             VALUES ($1, $2, $3, $4) RETURNING {LOCATION_COLUMNS}"
        ))
        .bind(selection.zone.as_deref())
        .bind(selection.subzone.as_deref())
        .bind(selection.store.as_deref())
        .bind(selection.company.as_deref())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, ServiceError::LocationExists))?;
        record_query("insert_location", started);

        Ok(row.into())
    }

    #[instrument(skip(self))]
    async fn update_location(
        &self,
        id: i64,
        selection: &LocationSelection,
    ) -> Result<Option<LocationCombination>, ServiceError> {
        let started = Instant::now();
        let row = sqlx::query_as::<_, LocationRow>(&format!(
            "UPDATE location_combinations SET zone = $2, subzone = $3, store = $4, company = $5 \
             WHERE id = $1 RETURNING {LOCATION_COLUMNS}"
        ))
        .bind(id)
        .bind(selection.zone.as_deref())
        .bind(selection.subzone.as_deref())
        .bind(selection.store.as_deref())
        .bind(selection.company.as_deref())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error(e, ServiceError::LocationExists))?;
        record_query("update_location", started);

        Ok(row.map(LocationCombination::from))
    }

    #[instrument(skip(self))]
    async fn delete_location(&self, id: i64) -> Result<bool, ServiceError> {
        let started = Instant::now();
        let result = sqlx::query("DELETE FROM location_combinations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(ServiceError::database)?;
        record_query("delete_location", started);

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ActivityStore for Database {
    #[instrument(skip(self))]
    async fn list_activities(&self) -> Result<Vec<Activity>, ServiceError> {
        let started = Instant::now();
        let rows = sqlx::query_as::<_, ActivityRow>(&format!(
            "SELECT {ACTIVITY_COLUMNS} FROM activities ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(ServiceError::database)?;
        record_query("list_activities", started);

        rows.into_iter().map(Activity::try_from).collect()
    }

    #[instrument(skip(self))]
    async fn find_activity(&self, id: i64) -> Result<Option<Activity>, ServiceError> {
        let started = Instant::now();
        let row = sqlx::query_as::<_, ActivityRow>(&format!(
            "SELECT {ACTIVITY_COLUMNS} FROM activities WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(ServiceError::database)?;
        record_query("find_activity", started);

        row.map(Activity::try_from).transpose()
    }

    #[instrument(skip(self, activity), fields(location_id = ?activity.location_id))]
    async fn insert_activity(&self, activity: NewActivity) -> Result<Activity, ServiceError> {
        let started = Instant::now();
        let row = sqlx::query_as::<_, ActivityRow>(&format!(
            "INSERT INTO activities (description, status, responsible, location_id) \
             VALUES ($1, $2, $3, $4) RETURNING {ACTIVITY_COLUMNS}"
        ))
        .bind(&activity.description)
        .bind(activity.status.as_str())
        .bind(activity.responsible.as_deref())
        .bind(activity.location_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, ServiceError::database("duplicate activity")))?;
        record_query("insert_activity", started);

        info!(activity_id = row.id, "Activity created");
        Activity::try_from(row)
    }

    #[instrument(skip(self, changes))]
    async fn update_activity(
        &self,
        id: i64,
        changes: ActivityChanges,
    ) -> Result<Option<Activity>, ServiceError> {
        let started = Instant::now();
        let row = sqlx::query_as::<_, ActivityRow>(&format!(
            "UPDATE activities SET \
               description = COALESCE($2, description), \
               status = COALESCE($3, status), \
               responsible = CASE WHEN $4 THEN $5::text ELSE responsible END, \
               location_id = CASE WHEN $6 THEN $7::bigint ELSE location_id END \
             WHERE id = $1 RETURNING {ACTIVITY_COLUMNS}"
        ))
        .bind(id)
        .bind(changes.description.as_deref())
        .bind(changes.status.map(|s| s.as_str()))
        .bind(changes.responsible.is_some())
        .bind(changes.responsible.clone().flatten())
        .bind(changes.location_id.is_some())
        .bind(changes.location_id.flatten())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error(e, ServiceError::database("duplicate activity")))?;
        record_query("update_activity", started);

        row.map(Activity::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn delete_activity(&self, id: i64) -> Result<bool, ServiceError> {
        let started = Instant::now();
        let result = sqlx::query("DELETE FROM activities WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(ServiceError::database)?;
        record_query("delete_activity", started);

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl Store for Database {
    async fn health_check(&self) -> Result<(), ServiceError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| ServiceError::database(format!("Health check failed: {}", e)))?;
        Ok(())
    }
}
