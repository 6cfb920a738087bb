//! Location catalogue entries: zone / subzone / store / company tuples.

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::{IntoParams, ToSchema};

/// One row of the location catalogue. Only `zone` is mandatory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LocationCombination {
    #[schema(example = 12)]
    pub id: i64,
    #[schema(example = "Caracas")]
    pub zone: String,
    #[schema(example = "Sambil Chacao")]
    pub subzone: Option<String>,
    #[schema(example = "SHOE BOX")]
    pub store: Option<String>,
    #[schema(example = "GG CCS 2024, C.A.")]
    pub company: Option<String>,
}

impl LocationCombination {
    pub fn selection(&self) -> LocationSelection {
        LocationSelection {
            zone: Some(self.zone.clone()),
            subzone: self.subzone.clone(),
            store: self.store.clone(),
            company: self.company.clone(),
        }
        .normalized()
    }
}

/// A (possibly partial) choice of the four levels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LocationSelection {
    pub zone: Option<String>,
    pub subzone: Option<String>,
    pub store: Option<String>,
    pub company: Option<String>,
}

impl LocationSelection {
    /// Trims every level and folds blank or `NULL` markers into `None`.
    pub fn normalized(&self) -> Self {
        Self {
            zone: normalize(self.zone.as_deref()),
            subzone: normalize(self.subzone.as_deref()),
            store: normalize(self.store.as_deref()),
            company: normalize(self.company.as_deref()),
        }
    }

    pub fn get(&self, level: Level) -> Option<&str> {
        match level {
            Level::Zone => self.zone.as_deref(),
            Level::Subzone => self.subzone.as_deref(),
            Level::Store => self.store.as_deref(),
            Level::Company => self.company.as_deref(),
        }
    }

    pub(crate) fn slot_mut(&mut self, level: Level) -> &mut Option<String> {
        match level {
            Level::Zone => &mut self.zone,
            Level::Subzone => &mut self.subzone,
            Level::Store => &mut self.store,
            Level::Company => &mut self.company,
        }
    }

    pub fn is_empty(&self) -> bool {
        Level::ALL.iter().all(|l| self.get(*l).is_none())
    }
}

/// The four cascade levels, top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Zone,
    Subzone,
    Store,
    Company,
}

impl Level {
    pub const ALL: [Level; 4] = [Level::Zone, Level::Subzone, Level::Store, Level::Company];

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Zone => "zone",
            Level::Subzone => "subzone",
            Level::Store => "store",
            Level::Company => "company",
        }
    }

    /// Levels strictly below this one.
    pub fn below(self) -> impl Iterator<Item = Level> {
        Level::ALL.into_iter().filter(move |l| *l > self)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `None` for blank input and for the literal `NULL`/`null` markers found in
/// imported catalogue data; otherwise the trimmed value.
pub fn normalize(value: Option<&str>) -> Option<String> {
    let trimmed = value?.trim();
    if trimmed.is_empty() || trimmed == "NULL" || trimmed == "null" {
        None
    } else {
        Some(trimmed.to_string())
    }
}
