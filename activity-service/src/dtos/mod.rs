pub mod accounts;
pub mod activities;
pub mod auth;
pub mod dashboard;
pub mod locations;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body of every domain error response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = "Insufficient role for this operation")]
    pub error: String,
    #[schema(example = "insufficient_role")]
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "email")]
    pub field: Option<String>,
}
