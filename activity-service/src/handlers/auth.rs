use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{
    auth::{AuthRejection, Operation, Principal},
    dtos::{
        auth::{LoginRequest, LoginResponse, ProfileResponse, RegisterRequest},
        ErrorResponse,
    },
    middleware::CurrentPrincipal,
    models::{AccountView, Role},
    services::ServiceError,
    utils::ValidatedJson,
    AppState,
};

/// Exchange email and password for an access token
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 403, description = "Account inactive", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse),
        (status = 429, description = "Too many attempts"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Authentication"
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let response = state.accounts.login(req).await?;
    Ok((StatusCode::OK, Json(response)))
}

/// Self-register a `user` account (guests only)
#[utoipa::path(
    post,
    path = "/api/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AccountView),
        (status = 403, description = "Already signed in", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse),
        (status = 429, description = "Too many attempts")
    ),
    tag = "Authentication"
)]
pub async fn register(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    principal.require(Operation::SelfRegister)?;
    let account = state.accounts.register(req).await?;
    Ok((StatusCode::CREATED, Json(account)))
}

/// Current principal
#[utoipa::path(
    get,
    path = "/api/me",
    responses(
        (status = 200, description = "Signed-in account, or the guest role", body = ProfileResponse),
        (status = 401, description = "Invalid token", body = ErrorResponse),
        (status = 403, description = "Account inactive or gone", body = ErrorResponse)
    ),
    tag = "Authentication",
    security((), ("bearer_auth" = []))
)]
pub async fn me(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
) -> Result<Json<ProfileResponse>, ServiceError> {
    principal.require(Operation::ReadOwnProfile)?;

    let profile = match principal {
        Principal::Guest => ProfileResponse::Guest { role: Role::Guest },
        Principal::Account(identity) => {
            let account = state
                .store
                .find_account(identity.id)
                .await?
                .ok_or(AuthRejection::UnknownAccount)?;
            ProfileResponse::Account(account.view())
        }
    };
    Ok(Json(profile))
}
