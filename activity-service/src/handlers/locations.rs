use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    auth::{Operation, Principal},
    dtos::{
        locations::{LocationRequest, ResolveResponse},
        ErrorResponse,
    },
    location::CascadeOptions,
    middleware::CurrentPrincipal,
    models::{Level, LocationCombination, LocationSelection},
    services::ServiceError,
    utils::ValidatedJson,
    AppState,
};

/// Full location catalogue
#[utoipa::path(
    get,
    path = "/api/locations",
    responses((status = 200, description = "Every combination, by id", body = Vec<LocationCombination>)),
    tag = "Locations",
    security((), ("bearer_auth" = []))
)]
pub async fn list_locations(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
) -> Result<impl IntoResponse, ServiceError> {
    principal.require(Operation::ReadLocations)?;
    Ok(Json(state.locations.snapshot().await?))
}

async fn level_options(
    state: &AppState,
    principal: &Principal,
    level: Level,
    parents: &LocationSelection,
) -> Result<Json<Vec<String>>, ServiceError> {
    principal.require(Operation::ReadLocations)?;
    Ok(Json(state.locations.options(level, parents).await?))
}

/// Distinct zones
#[utoipa::path(
    get,
    path = "/api/locations/zones",
    responses((status = 200, description = "Zones", body = Vec<String>)),
    tag = "Locations",
    security((), ("bearer_auth" = []))
)]
pub async fn zones(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
) -> Result<Json<Vec<String>>, ServiceError> {
    level_options(&state, &principal, Level::Zone, &LocationSelection::default()).await
}

/// Subzones of a zone
#[utoipa::path(
    get,
    path = "/api/locations/subzones",
    params(LocationSelection),
    responses((status = 200, description = "Subzones; empty without a zone", body = Vec<String>)),
    tag = "Locations",
    security((), ("bearer_auth" = []))
)]
pub async fn subzones(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Query(parents): Query<LocationSelection>,
) -> Result<Json<Vec<String>>, ServiceError> {
    level_options(&state, &principal, Level::Subzone, &parents).await
}

/// Stores under a zone and subzone
#[utoipa::path(
    get,
    path = "/api/locations/stores",
    params(LocationSelection),
    responses((status = 200, description = "Stores", body = Vec<String>)),
    tag = "Locations",
    security((), ("bearer_auth" = []))
)]
pub async fn stores(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Query(parents): Query<LocationSelection>,
) -> Result<Json<Vec<String>>, ServiceError> {
    level_options(&state, &principal, Level::Store, &parents).await
}

/// Companies under a zone, subzone and store
#[utoipa::path(
    get,
    path = "/api/locations/companies",
    params(LocationSelection),
    responses((status = 200, description = "Companies", body = Vec<String>)),
    tag = "Locations",
    security((), ("bearer_auth" = []))
)]
pub async fn companies(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Query(parents): Query<LocationSelection>,
) -> Result<Json<Vec<String>>, ServiceError> {
    level_options(&state, &principal, Level::Company, &parents).await
}

/// All four option lists for a partial selection
#[utoipa::path(
    get,
    path = "/api/locations/options",
    params(LocationSelection),
    responses(
        (status = 200, description = "Option lists", body = CascadeOptions),
        (status = 422, description = "A level is not an option under its parents", body = ErrorResponse)
    ),
    tag = "Locations",
    security((), ("bearer_auth" = []))
)]
pub async fn options(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Query(selection): Query<LocationSelection>,
) -> Result<Json<CascadeOptions>, ServiceError> {
    principal.require(Operation::ReadLocations)?;
    Ok(Json(state.locations.cascade(&selection).await?))
}

/// Resolve a full selection to its combination id
#[utoipa::path(
    get,
    path = "/api/locations/resolve",
    params(LocationSelection),
    responses(
        (status = 200, description = "Matching combination", body = ResolveResponse),
        (status = 422, description = "No combination matches", body = ErrorResponse)
    ),
    tag = "Locations",
    security((), ("bearer_auth" = []))
)]
pub async fn resolve(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Query(selection): Query<LocationSelection>,
) -> Result<Json<ResolveResponse>, ServiceError> {
    principal.require(Operation::ReadLocations)?;
    let id = state.locations.resolve(&selection).await?;
    Ok(Json(ResolveResponse { id }))
}

/// Add a combination
#[utoipa::path(
    post,
    path = "/api/locations",
    request_body = LocationRequest,
    responses(
        (status = 201, description = "Combination created", body = LocationCombination),
        (status = 403, description = "Insufficient role", body = ErrorResponse),
        (status = 409, description = "Combination exists", body = ErrorResponse)
    ),
    tag = "Locations",
    security(("bearer_auth" = []))
)]
pub async fn create_location(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    ValidatedJson(req): ValidatedJson<LocationRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    principal.require(Operation::ManageLocations)?;
    let row = state.locations.create(req.into()).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// Replace a combination
#[utoipa::path(
    put,
    path = "/api/locations/{id}",
    params(("id" = i64, Path, description = "Combination id")),
    request_body = LocationRequest,
    responses(
        (status = 200, description = "Combination updated", body = LocationCombination),
        (status = 404, description = "Not found", body = ErrorResponse),
        (status = 409, description = "Combination exists", body = ErrorResponse)
    ),
    tag = "Locations",
    security(("bearer_auth" = []))
)]
pub async fn update_location(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(id): Path<i64>,
    ValidatedJson(req): ValidatedJson<LocationRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    principal.require(Operation::ManageLocations)?;
    Ok(Json(state.locations.update(id, req.into()).await?))
}

/// Delete a combination; activities using it lose their location
#[utoipa::path(
    delete,
    path = "/api/locations/{id}",
    params(("id" = i64, Path, description = "Combination id")),
    responses(
        (status = 204, description = "Combination deleted"),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    tag = "Locations",
    security(("bearer_auth" = []))
)]
pub async fn delete_location(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    principal.require(Operation::ManageLocations)?;
    state.locations.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
