//! Store held entirely in process memory. Mirrors the constraints the
//! PostgreSQL schema enforces so tests exercise the same failure modes.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::{Mutex, MutexGuard};

use crate::location::LocationError;
use crate::models::{
    Account, AccountChanges, Activity, ActivityChanges, LocationCombination, LocationSelection,
    NewAccount, NewActivity,
};

use super::{AccountStore, ActivityStore, LocationStore, ServiceError, Store};

#[derive(Default)]
struct State {
    accounts: Vec<Account>,
    locations: Vec<LocationCombination>,
    activities: Vec<Activity>,
    next_account_id: i64,
    next_location_id: i64,
    next_activity_id: i64,
}

impl State {
    fn email_taken(&self, email: &str, except: Option<i64>) -> bool {
        self.accounts
            .iter()
            .any(|a| Some(a.id) != except && a.email.eq_ignore_ascii_case(email))
    }

    fn location_exists(&self, selection: &LocationSelection, except: Option<i64>) -> bool {
        self.locations
            .iter()
            .any(|l| Some(l.id) != except && l.selection() == *selection)
    }

    fn check_location(&self, location_id: Option<i64>) -> Result<(), ServiceError> {
        match location_id {
            Some(id) if !self.locations.iter().any(|l| l.id == id) => {
                Err(LocationError::NoMatch.into())
            }
            _ => Ok(()),
        }
    }
}

fn next(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

fn combination(id: i64, selection: &LocationSelection) -> Result<LocationCombination, ServiceError> {
    let zone = selection
        .zone
        .clone()
        .ok_or_else(|| ServiceError::validation("zone", "Zone is required"))?;
    Ok(LocationCombination {
        id,
        zone,
        subzone: selection.subzone.clone(),
        store: selection.store.clone(),
        company: selection.company.clone(),
    })
}

#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> Result<MutexGuard<'_, State>, ServiceError> {
        self.state
            .lock()
            .map_err(|_| ServiceError::database("in-memory store lock poisoned"))
    }
}

#[async_trait]
impl AccountStore for InMemoryStore {
    async fn find_account(&self, id: i64) -> Result<Option<Account>, ServiceError> {
        Ok(self.state()?.accounts.iter().find(|a| a.id == id).cloned())
    }

    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, ServiceError> {
        Ok(self
            .state()?
            .accounts
            .iter()
            .find(|a| a.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn list_accounts(&self) -> Result<Vec<Account>, ServiceError> {
        Ok(self.state()?.accounts.clone())
    }

    async fn insert_account(&self, account: NewAccount) -> Result<Account, ServiceError> {
        let mut state = self.state()?;
        if state.email_taken(&account.email, None) {
            return Err(ServiceError::EmailTaken);
        }

        let now = Utc::now();
        let stored = Account {
            id: next(&mut state.next_account_id),
            email: account.email,
            name: account.name,
            password_hash: account.password_hash,
            role: account.role,
            active: account.active,
            created_at: now,
            updated_at: now,
        };
        state.accounts.push(stored.clone());
        Ok(stored)
    }

    async fn update_account(
        &self,
        id: i64,
        changes: AccountChanges,
    ) -> Result<Option<Account>, ServiceError> {
        let mut state = self.state()?;
        if let Some(email) = &changes.email {
            if state.email_taken(email, Some(id)) {
                return Err(ServiceError::EmailTaken);
            }
        }

        let Some(account) = state.accounts.iter_mut().find(|a| a.id == id) else {
            return Ok(None);
        };
        if let Some(email) = changes.email {
            account.email = email;
        }
        if let Some(name) = changes.name {
            account.name = name;
        }
        if let Some(role) = changes.role {
            account.role = role;
        }
        if let Some(active) = changes.active {
            account.active = active;
        }
        if let Some(hash) = changes.password_hash {
            account.password_hash = hash;
        }
        account.updated_at = Utc::now();
        Ok(Some(account.clone()))
    }

    async fn delete_account(&self, id: i64) -> Result<bool, ServiceError> {
        let mut state = self.state()?;
        let before = state.accounts.len();
        state.accounts.retain(|a| a.id != id);
        Ok(state.accounts.len() != before)
    }
}

#[async_trait]
impl LocationStore for InMemoryStore {
    async fn list_locations(&self) -> Result<Vec<LocationCombination>, ServiceError> {
        Ok(self.state()?.locations.clone())
    }

    async fn insert_location(
        &self,
        selection: &LocationSelection,
    ) -> Result<LocationCombination, ServiceError> {
        let mut state = self.state()?;
        if state.location_exists(selection, None) {
            return Err(ServiceError::LocationExists);
        }
        let row = combination(next(&mut state.next_location_id), selection)?;
        state.locations.push(row.clone());
        Ok(row)
    }

    async fn update_location(
        &self,
        id: i64,
        selection: &LocationSelection,
    ) -> Result<Option<LocationCombination>, ServiceError> {
        let mut state = self.state()?;
        if state.location_exists(selection, Some(id)) {
            return Err(ServiceError::LocationExists);
        }
        let Some(row) = state.locations.iter_mut().find(|l| l.id == id) else {
            return Ok(None);
        };
        *row = combination(id, selection)?;
        Ok(Some(row.clone()))
    }

    async fn delete_location(&self, id: i64) -> Result<bool, ServiceError> {
        let mut state = self.state()?;
        let before = state.locations.len();
        state.locations.retain(|l| l.id != id);
        if state.locations.len() == before {
            return Ok(false);
        }

        let now = Utc::now();
        for activity in state
            .activities
            .iter_mut()
            .filter(|a| a.location_id == Some(id))
        {
            activity.location_id = None;
            activity.updated_at = now;
        }
        Ok(true)
    }
}

#[async_trait]
impl ActivityStore for InMemoryStore {
    async fn list_activities(&self) -> Result<Vec<Activity>, ServiceError> {
        let mut activities = self.state()?.activities.clone();
        activities.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(activities)
    }

    async fn find_activity(&self, id: i64) -> Result<Option<Activity>, ServiceError> {
        Ok(self.state()?.activities.iter().find(|a| a.id == id).cloned())
    }

    async fn insert_activity(&self, activity: NewActivity) -> Result<Activity, ServiceError> {
        let mut state = self.state()?;
        state.check_location(activity.location_id)?;

        let now = Utc::now();
        let stored = Activity {
            id: next(&mut state.next_activity_id),
            description: activity.description,
            status: activity.status,
            responsible: activity.responsible,
            location_id: activity.location_id,
            created_at: now,
            updated_at: now,
        };
        state.activities.push(stored.clone());
        Ok(stored)
    }

    async fn update_activity(
        &self,
        id: i64,
        changes: ActivityChanges,
    ) -> Result<Option<Activity>, ServiceError> {
        let mut state = self.state()?;
        if let Some(location_id) = changes.location_id {
            state.check_location(location_id)?;
        }

        let Some(activity) = state.activities.iter_mut().find(|a| a.id == id) else {
            return Ok(None);
        };
        if let Some(description) = changes.description {
            activity.description = description;
        }
        if let Some(status) = changes.status {
            activity.status = status;
        }
        if let Some(responsible) = changes.responsible {
            activity.responsible = responsible;
        }
        if let Some(location_id) = changes.location_id {
            activity.location_id = location_id;
        }
        activity.updated_at = Utc::now();
        Ok(Some(activity.clone()))
    }

    async fn delete_activity(&self, id: i64) -> Result<bool, ServiceError> {
        let mut state = self.state()?;
        let before = state.activities.len();
        state.activities.retain(|a| a.id != id);
        Ok(state.activities.len() != before)
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn health_check(&self) -> Result<(), ServiceError> {
        self.state().map(|_| ())
    }
}
