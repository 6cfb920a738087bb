use serde::Deserialize;
use utoipa::IntoParams;

use crate::models::ActivityStatus;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DashboardQuery {
    /// Zone name of the activity's location.
    pub zone: Option<String>,
    pub responsible: Option<String>,
    pub status: Option<ActivityStatus>,
}
