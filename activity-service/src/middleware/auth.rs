use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::{auth::Principal, dtos::ErrorResponse, AppState};

/// Runs the auth gate and stores the resulting [`Principal`] in the request
/// extensions. Rejections end the request here.
pub async fn gate_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let header = req
        .headers()
        .get(header::AUTHORIZATION)
        .map(|value| value.to_str().unwrap_or_default());

    let principal = match state.gate.authenticate(header).await {
        Ok(principal) => principal,
        Err(e) => return e.into_response(),
    };

    if let Some(identity) = principal.account() {
        tracing::Span::current().record("account_id", identity.id);
    }
    req.extensions_mut().insert(principal);

    next.run(req).await
}

/// The principal the gate attached to this request.
pub struct CurrentPrincipal(pub Principal);

#[axum::async_trait]
impl<S> FromRequestParts<S> for CurrentPrincipal
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let principal = parts.extensions.get::<Principal>().ok_or_else(|| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Principal missing from request extensions".to_string(),
                    code: "internal_error".to_string(),
                    field: None,
                }),
            )
        })?;

        Ok(CurrentPrincipal(principal.clone()))
    }
}
