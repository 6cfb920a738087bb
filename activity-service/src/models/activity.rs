//! Activity model - a tracked support task.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use super::LocationCombination;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ActivityStatus {
    #[default]
    Pending,
    InProgress,
    Scheduled,
    InExecution,
    Completed,
}

impl ActivityStatus {
    pub const ALL: [ActivityStatus; 5] = [
        ActivityStatus::Pending,
        ActivityStatus::InProgress,
        ActivityStatus::Scheduled,
        ActivityStatus::InExecution,
        ActivityStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityStatus::Pending => "pending",
            ActivityStatus::InProgress => "in_progress",
            ActivityStatus::Scheduled => "scheduled",
            ActivityStatus::InExecution => "in_execution",
            ActivityStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for ActivityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActivityStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("Invalid activity status: {}", s))
    }
}

/// Stored activity. `responsible: None` means unassigned.
#[derive(Debug, Clone, PartialEq)]
pub struct Activity {
    pub id: i64,
    pub description: String,
    pub status: ActivityStatus,
    pub responsible: Option<String>,
    pub location_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewActivity {
    pub description: String,
    pub status: ActivityStatus,
    pub responsible: Option<String>,
    pub location_id: Option<i64>,
}

/// Partial update. The nested options distinguish "leave as is" (`None`)
/// from "set to nothing" (`Some(None)`).
#[derive(Debug, Clone, Default)]
pub struct ActivityChanges {
    pub description: Option<String>,
    pub status: Option<ActivityStatus>,
    pub responsible: Option<Option<String>>,
    pub location_id: Option<Option<i64>>,
}

/// Activity joined with its location for API responses.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ActivityView {
    #[schema(example = 41)]
    pub id: i64,
    #[schema(example = "Replace POS printer")]
    pub description: String,
    pub status: ActivityStatus,
    #[schema(example = "Luis")]
    pub responsible: Option<String>,
    pub location: Option<LocationCombination>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ActivityView {
    pub fn new(activity: Activity, locations: &[LocationCombination]) -> Self {
        let location = activity
            .location_id
            .and_then(|id| locations.iter().find(|l| l.id == id).cloned());
        Self {
            id: activity.id,
            description: activity.description,
            status: activity.status,
            responsible: activity.responsible,
            location,
            created_at: activity.created_at,
            updated_at: activity.updated_at,
        }
    }
}
