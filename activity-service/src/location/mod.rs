//! Location catalogue queries and the four-level picker.
//!
//! Everything here is pure: callers pass in a snapshot of the catalogue and
//! get option lists or a resolved row id back.

pub mod cascade;
pub mod resolver;

pub use cascade::{CascadeEvent, CascadeOptions, CascadeSelection, EditSession};
pub use resolver::LocationResolver;

use crate::models::Level;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("No location matches the selected combination")]
    NoMatch,

    #[error("'{value}' is not a valid {level} for the current selection")]
    NotAnOption { level: Level, value: String },

    #[error("A {0} must be selected")]
    Incomplete(Level),
}

impl LocationError {
    pub fn code(&self) -> &'static str {
        match self {
            LocationError::NoMatch => "location_not_found",
            LocationError::NotAnOption { .. } => "location_not_an_option",
            LocationError::Incomplete(_) => "location_incomplete",
        }
    }

    pub fn level(&self) -> Option<Level> {
        match self {
            LocationError::NoMatch => None,
            LocationError::NotAnOption { level, .. } => Some(*level),
            LocationError::Incomplete(level) => Some(*level),
        }
    }
}
