use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::LocationSelection;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LocationRequest {
    #[validate(length(min = 1, max = 200, message = "Zone is required"))]
    #[schema(example = "Caracas")]
    pub zone: String,
    #[schema(example = "Sambil Chacao")]
    pub subzone: Option<String>,
    #[schema(example = "SHOE BOX")]
    pub store: Option<String>,
    #[schema(example = "GG CCS 2024, C.A.")]
    pub company: Option<String>,
}

impl From<LocationRequest> for LocationSelection {
    fn from(req: LocationRequest) -> Self {
        LocationSelection {
            zone: Some(req.zone),
            subzone: req.subzone,
            store: req.store,
            company: req.company,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ResolveResponse {
    #[schema(example = 11)]
    pub id: i64,
}
