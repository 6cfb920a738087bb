use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use service_core::error::AppError;
use thiserror::Error;

use crate::auth::AuthRejection;
use crate::dtos::ErrorResponse;
use crate::location::LocationError;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    Auth(#[from] AuthRejection),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error(transparent)]
    Location(#[from] LocationError),

    #[error("Email already registered")]
    EmailTaken,

    #[error("Location combination already exists")]
    LocationExists,

    #[error("{message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error(transparent)]
    App(#[from] AppError),
}

impl ServiceError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        ServiceError::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn database(err: impl std::fmt::Display) -> Self {
        ServiceError::App(AppError::DatabaseError(anyhow::anyhow!("{}", err)))
    }

    pub fn internal(err: anyhow::Error) -> Self {
        ServiceError::App(AppError::InternalError(err))
    }

    /// Machine-readable code, `None` for infrastructure faults.
    pub fn code(&self) -> Option<&'static str> {
        match self {
            ServiceError::Auth(r) => Some(r.code()),
            ServiceError::InvalidCredentials => Some("invalid_credentials"),
            ServiceError::Location(e) => Some(e.code()),
            ServiceError::EmailTaken => Some("email_taken"),
            ServiceError::LocationExists => Some("location_exists"),
            ServiceError::Validation { .. } => Some("validation_error"),
            ServiceError::NotFound(_) => Some("not_found"),
            ServiceError::App(_) => None,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let err = match self {
            ServiceError::App(inner) => return inner.into_response(),
            other => other,
        };

        let (status, field) = match &err {
            ServiceError::Auth(r) => (r.status(), None),
            ServiceError::InvalidCredentials => (StatusCode::UNAUTHORIZED, None),
            ServiceError::Location(e) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Some(e.level().map_or("location", |l| l.as_str())),
            ),
            ServiceError::EmailTaken => (StatusCode::CONFLICT, Some("email")),
            ServiceError::LocationExists => (StatusCode::CONFLICT, None),
            ServiceError::Validation { field, .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, Some(*field))
            }
            ServiceError::NotFound(_) => (StatusCode::NOT_FOUND, None),
            ServiceError::App(_) => (StatusCode::INTERNAL_SERVER_ERROR, None),
        };

        let body = ErrorResponse {
            error: err.to_string(),
            code: err.code().unwrap_or("internal_error").to_string(),
            field: field.map(str::to_string),
        };
        (status, Json(body)).into_response()
    }
}
