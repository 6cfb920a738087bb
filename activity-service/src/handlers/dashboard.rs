use axum::{
    extract::{Query, State},
    Json,
};

use crate::{
    auth::Operation,
    dtos::dashboard::DashboardQuery,
    middleware::CurrentPrincipal,
    services::{summarize, DashboardFilter, DashboardSummary, ServiceError},
    AppState,
};

/// Activity counts by status and zone
#[utoipa::path(
    get,
    path = "/api/dashboard",
    params(DashboardQuery),
    responses((status = 200, description = "Summary of the filtered activities", body = DashboardSummary)),
    tag = "Dashboard",
    security((), ("bearer_auth" = []))
)]
pub async fn dashboard(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<DashboardSummary>, ServiceError> {
    principal.require(Operation::ReadDashboard)?;

    let activities = state.store.list_activities().await?;
    let locations = state.store.list_locations().await?;
    let filter = DashboardFilter {
        zone: query.zone,
        responsible: query.responsible,
        status: query.status,
    };
    Ok(Json(summarize(&activities, &locations, &filter)))
}
