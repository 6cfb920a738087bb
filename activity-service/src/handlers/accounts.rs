use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    auth::Operation,
    dtos::{
        accounts::{CreateAccountRequest, UpdateAccountRequest},
        ErrorResponse,
    },
    middleware::CurrentPrincipal,
    models::AccountView,
    services::ServiceError,
    utils::ValidatedJson,
    AppState,
};

/// List accounts
#[utoipa::path(
    get,
    path = "/api/accounts",
    responses(
        (status = 200, description = "Accounts by id", body = Vec<AccountView>),
        (status = 403, description = "Insufficient role", body = ErrorResponse)
    ),
    tag = "Accounts",
    security(("bearer_auth" = []))
)]
pub async fn list_accounts(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
) -> Result<impl IntoResponse, ServiceError> {
    principal.require(Operation::ListAccounts)?;
    Ok(Json(state.accounts.list().await?))
}

/// Create an admin or user account
#[utoipa::path(
    post,
    path = "/api/accounts",
    request_body = CreateAccountRequest,
    responses(
        (status = 201, description = "Account created", body = AccountView),
        (status = 403, description = "Insufficient role", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Accounts",
    security(("bearer_auth" = []))
)]
pub async fn create_account(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    ValidatedJson(req): ValidatedJson<CreateAccountRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    principal.require(Operation::CreateAccount)?;
    let account = state.accounts.create_account(req).await?;
    Ok((StatusCode::CREATED, Json(account)))
}

/// Update an account, including reactivation and password reset
#[utoipa::path(
    put,
    path = "/api/accounts/{id}",
    params(("id" = i64, Path, description = "Account id")),
    request_body = UpdateAccountRequest,
    responses(
        (status = 200, description = "Account updated", body = AccountView),
        (status = 403, description = "Insufficient role or protected account", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse)
    ),
    tag = "Accounts",
    security(("bearer_auth" = []))
)]
pub async fn update_account(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(id): Path<i64>,
    ValidatedJson(req): ValidatedJson<UpdateAccountRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    principal.require(Operation::UpdateAccount)?;
    Ok(Json(state.accounts.update_account(id, req).await?))
}

/// Deactivate an account
#[utoipa::path(
    delete,
    path = "/api/accounts/{id}",
    params(("id" = i64, Path, description = "Account id")),
    responses(
        (status = 200, description = "Account deactivated", body = AccountView),
        (status = 403, description = "Insufficient role or protected account", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    tag = "Accounts",
    security(("bearer_auth" = []))
)]
pub async fn deactivate_account(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    principal.require(Operation::DeactivateAccount)?;
    Ok(Json(state.accounts.deactivate(id).await?))
}

/// Permanently delete an account
#[utoipa::path(
    delete,
    path = "/api/accounts/{id}/permanent",
    params(("id" = i64, Path, description = "Account id")),
    responses(
        (status = 204, description = "Account deleted"),
        (status = 403, description = "Insufficient role or protected account", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    tag = "Accounts",
    security(("bearer_auth" = []))
)]
pub async fn delete_account(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    principal.require(Operation::DeleteAccount)?;
    state.accounts.delete_permanently(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
