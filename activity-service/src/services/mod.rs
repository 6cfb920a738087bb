//! Business logic and persistence behind the HTTP handlers.

mod accounts;
mod activities;
pub mod dashboard;
mod database;
pub mod error;
mod jwt;
mod locations;
mod memory;
pub mod metrics;
mod stores;

pub use accounts::AccountService;
pub use activities::ActivityService;
pub use dashboard::{summarize, DashboardFilter, DashboardSummary};
pub use database::Database;
pub use error::ServiceError;
pub use jwt::{AccessTokenClaims, JwtService};
pub use locations::LocationService;
pub use memory::InMemoryStore;
pub use stores::{AccountStore, ActivityStore, LocationStore, Store};
