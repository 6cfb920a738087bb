//! HTTP handlers. Each one checks its operation against the principal the
//! gate attached before touching a service.

pub mod accounts;
pub mod activities;
pub mod auth;
pub mod dashboard;
pub mod locations;
pub mod metrics;
