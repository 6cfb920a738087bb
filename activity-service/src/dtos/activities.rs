use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::models::{ActivityStatus, LocationSelection};

/// The location is given either as `location_id` or as a `location` tuple,
/// not both.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateActivityRequest {
    #[validate(length(min = 1, max = 2000, message = "Description must be 1-2000 characters"))]
    #[schema(example = "Replace POS printer")]
    pub description: String,

    /// Defaults to `pending`.
    pub status: Option<ActivityStatus>,

    /// Staff name; empty or `—` leaves the activity unassigned.
    #[schema(example = "Luis")]
    pub responsible: Option<String>,

    #[schema(example = 12)]
    pub location_id: Option<i64>,

    pub location: Option<LocationSelection>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateActivityRequest {
    #[validate(length(min = 1, max = 2000, message = "Description must be 1-2000 characters"))]
    pub description: Option<String>,

    pub status: Option<ActivityStatus>,

    /// Present and empty (or `—`) unassigns.
    pub responsible: Option<String>,

    pub location_id: Option<i64>,

    pub location: Option<LocationSelection>,

    /// Detach the activity from any location.
    #[serde(default)]
    pub clear_location: bool,
}
