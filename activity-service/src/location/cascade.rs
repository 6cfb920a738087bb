use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{normalize, Level, LocationCombination, LocationSelection};

use super::{LocationError, LocationResolver};

/// Input to the cascade reducer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CascadeEvent {
    /// Choose (or with `None`, clear) the value of one level.
    Select { level: Level, value: Option<String> },
    Reset,
}

impl CascadeEvent {
    pub fn select(level: Level, value: impl Into<String>) -> Self {
        CascadeEvent::Select {
            level,
            value: Some(value.into()),
        }
    }

    pub fn clear(level: Level) -> Self {
        CascadeEvent::Select { level, value: None }
    }
}

/// Option lists for every level, derived from a selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CascadeOptions {
    pub zones: Vec<String>,
    pub subzones: Vec<String>,
    pub stores: Vec<String>,
    pub companies: Vec<String>,
}

/// Current choice in a zone → subzone → store → company picker.
///
/// Every value held here was present in its level's option list when it was
/// selected, and stays only while it remains consistent with the levels above.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CascadeSelection {
    selection: LocationSelection,
}

impl CascadeSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selection(&self) -> &LocationSelection {
        &self.selection
    }

    pub fn get(&self, level: Level) -> Option<&str> {
        self.selection.get(level)
    }

    /// Reducer. Lower levels that stop being valid options under the new
    /// parents are cleared before anything is listed again; once one level is
    /// cleared every level below it is cleared as well.
    pub fn apply(
        &self,
        resolver: &LocationResolver<'_>,
        event: CascadeEvent,
    ) -> Result<Self, LocationError> {
        let (level, value) = match event {
            CascadeEvent::Reset => return Ok(Self::default()),
            CascadeEvent::Select { level, value } => (level, normalize(value.as_deref())),
        };

        if let Some(v) = &value {
            if !resolver.options(level, &self.selection).contains(v) {
                return Err(LocationError::NotAnOption {
                    level,
                    value: v.clone(),
                });
            }
        }

        if self.selection.get(level) == value.as_deref() {
            return Ok(self.clone());
        }

        let mut next = self.selection.clone();
        *next.slot_mut(level) = value;

        let mut stale = false;
        for lower in level.below() {
            if stale {
                *next.slot_mut(lower) = None;
                continue;
            }
            if let Some(current) = next.get(lower).map(str::to_owned) {
                if !resolver.options(lower, &next).contains(&current) {
                    tracing::debug!(level = %lower, value = %current, "Clearing stale selection");
                    *next.slot_mut(lower) = None;
                    stale = true;
                }
            }
        }

        Ok(Self { selection: next })
    }

    /// Option lists recomputed from the current selection.
    pub fn options(&self, resolver: &LocationResolver<'_>) -> CascadeOptions {
        CascadeOptions {
            zones: resolver.options(Level::Zone, &self.selection),
            subzones: resolver.options(Level::Subzone, &self.selection),
            stores: resolver.options(Level::Store, &self.selection),
            companies: resolver.options(Level::Company, &self.selection),
        }
    }
}

/// Location picker state while editing a record that may already point at a
/// catalogue row.
#[derive(Debug, Clone)]
pub struct EditSession {
    original: Option<LocationCombination>,
    current: CascadeSelection,
}

impl EditSession {
    /// Starts prefilled with the record's current combination.
    pub fn new(original: Option<LocationCombination>) -> Self {
        let selection = original
            .as_ref()
            .map(LocationCombination::selection)
            .unwrap_or_default();
        Self {
            original,
            current: CascadeSelection { selection },
        }
    }

    /// A session whose selection was submitted whole, as an API client does.
    pub fn with_selection(original: Option<LocationCombination>, selection: &LocationSelection) -> Self {
        Self {
            original,
            current: CascadeSelection {
                selection: selection.normalized(),
            },
        }
    }

    pub fn apply(
        &mut self,
        resolver: &LocationResolver<'_>,
        event: CascadeEvent,
    ) -> Result<(), LocationError> {
        self.current = self.current.apply(resolver, event)?;
        Ok(())
    }

    pub fn selection(&self) -> &LocationSelection {
        self.current.selection()
    }

    pub fn options(&self, resolver: &LocationResolver<'_>) -> CascadeOptions {
        self.current.options(resolver)
    }

    /// The first level whose value differs from the original record.
    fn first_changed_level(&self) -> Option<Level> {
        let current = self.selection();
        match &self.original {
            None => Some(Level::Zone),
            Some(original) => {
                let original = original.selection();
                Level::ALL
                    .into_iter()
                    .find(|l| original.get(*l) != current.get(*l))
            }
        }
    }

    /// Resolves the id to store on submit.
    ///
    /// An untouched selection keeps the original id as long as that row still
    /// exists. Otherwise every level from the first changed one down must hold
    /// a valid option, and a level left empty is only accepted when its option
    /// list is empty or the tuple already resolves without it.
    pub fn submission(&self, resolver: &LocationResolver<'_>) -> Result<i64, LocationError> {
        let selection = self.selection();
        if selection.zone.is_none() {
            return Err(LocationError::Incomplete(Level::Zone));
        }

        let Some(changed) = self.first_changed_level() else {
            return self
                .original
                .as_ref()
                .and_then(|o| resolver.get(o.id))
                .map(|row| row.id)
                .ok_or(LocationError::NoMatch);
        };

        let resolved = resolver.resolve(selection);
        for level in Level::ALL.into_iter().filter(|l| *l >= changed) {
            let options = resolver.options(level, selection);
            match selection.get(level) {
                Some(value) if !options.iter().any(|o| o == value) => {
                    return Err(LocationError::NotAnOption {
                        level,
                        value: value.to_string(),
                    });
                }
                None if !options.is_empty() && resolved.is_err() => {
                    return Err(LocationError::Incomplete(level));
                }
                _ => {}
            }
        }

        resolved
    }
}
