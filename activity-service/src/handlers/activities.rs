use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    auth::Operation,
    dtos::{
        activities::{CreateActivityRequest, UpdateActivityRequest},
        ErrorResponse,
    },
    middleware::CurrentPrincipal,
    models::ActivityView,
    services::ServiceError,
    utils::ValidatedJson,
    AppState,
};

/// List activities, newest first
#[utoipa::path(
    get,
    path = "/api/activities",
    responses(
        (status = 200, description = "Activities with their locations", body = Vec<ActivityView>)
    ),
    tag = "Activities",
    security((), ("bearer_auth" = []))
)]
pub async fn list_activities(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
) -> Result<impl IntoResponse, ServiceError> {
    principal.require(Operation::ReadActivities)?;
    Ok(Json(state.activities.list().await?))
}

/// Get one activity
#[utoipa::path(
    get,
    path = "/api/activities/{id}",
    params(("id" = i64, Path, description = "Activity id")),
    responses(
        (status = 200, description = "Activity", body = ActivityView),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    tag = "Activities",
    security((), ("bearer_auth" = []))
)]
pub async fn get_activity(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    principal.require(Operation::ReadActivities)?;
    Ok(Json(state.activities.get(id).await?))
}

/// Create an activity
#[utoipa::path(
    post,
    path = "/api/activities",
    request_body = CreateActivityRequest,
    responses(
        (status = 201, description = "Activity created", body = ActivityView),
        (status = 403, description = "Insufficient role", body = ErrorResponse),
        (status = 422, description = "Validation or location error", body = ErrorResponse)
    ),
    tag = "Activities",
    security(("bearer_auth" = []))
)]
pub async fn create_activity(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    ValidatedJson(req): ValidatedJson<CreateActivityRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    principal.require(Operation::CreateActivity)?;
    let activity = state.activities.create(req).await?;
    Ok((StatusCode::CREATED, Json(activity)))
}

/// Update an activity
#[utoipa::path(
    put,
    path = "/api/activities/{id}",
    params(("id" = i64, Path, description = "Activity id")),
    request_body = UpdateActivityRequest,
    responses(
        (status = 200, description = "Activity updated", body = ActivityView),
        (status = 403, description = "Insufficient role", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse),
        (status = 422, description = "Validation or location error", body = ErrorResponse)
    ),
    tag = "Activities",
    security(("bearer_auth" = []))
)]
pub async fn update_activity(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(id): Path<i64>,
    ValidatedJson(req): ValidatedJson<UpdateActivityRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    principal.require(Operation::UpdateActivity)?;
    Ok(Json(state.activities.update(id, req).await?))
}

/// Delete an activity
#[utoipa::path(
    delete,
    path = "/api/activities/{id}",
    params(("id" = i64, Path, description = "Activity id")),
    responses(
        (status = 204, description = "Activity deleted"),
        (status = 403, description = "Insufficient role", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    tag = "Activities",
    security(("bearer_auth" = []))
)]
pub async fn delete_activity(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    principal.require(Operation::DeleteActivity)?;
    state.activities.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Staff names accepted as an activity's responsible
#[utoipa::path(
    get,
    path = "/api/staff",
    responses((status = 200, description = "Staff names", body = Vec<String>)),
    tag = "Activities",
    security((), ("bearer_auth" = []))
)]
pub async fn list_staff(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
) -> Result<impl IntoResponse, ServiceError> {
    principal.require(Operation::ReadActivities)?;
    Ok(Json(state.activities.staff().to_vec()))
}
