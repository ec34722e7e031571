//! HTTP error type and the mapping of domain errors onto it.

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;

use crate::application::services::auth_service::AuthError;
use crate::domain::errors::{LinkError, ResolutionError, StoreError};

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

/// Error payload of every non-2xx JSON response.
#[derive(Debug, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{message}")]
    Validation { message: String, details: Value },

    #[error("{message}")]
    Unauthorized { message: String, details: Value },

    #[error("{message}")]
    PasswordRequired { message: String, details: Value },

    #[error("{message}")]
    NotFound { message: String, details: Value },

    #[error("{message}")]
    Gone { message: String, details: Value },

    #[error("{message}")]
    AliasConflict { message: String, details: Value },

    #[error("{message}")]
    GenerationExhausted { message: String, details: Value },

    #[error("{message}")]
    Unavailable { message: String, details: Value },

    #[error("{message}")]
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }

    pub fn unauthorized(message: impl Into<String>, details: Value) -> Self {
        Self::Unauthorized {
            message: message.into(),
            details,
        }
    }

    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }

    pub fn unavailable(message: impl Into<String>, details: Value) -> Self {
        Self::Unavailable {
            message: message.into(),
            details,
        }
    }

    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } | AppError::AliasConflict { .. } => StatusCode::BAD_REQUEST,
            AppError::Unauthorized { .. } | AppError::PasswordRequired { .. } => {
                StatusCode::UNAUTHORIZED
            }
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Gone { .. } => StatusCode::GONE,
            AppError::GenerationExhausted { .. } | AppError::Unavailable { .. } => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable error code of the JSON body.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation { .. } => "validation_error",
            AppError::Unauthorized { .. } => "unauthorized",
            AppError::PasswordRequired { .. } => "password_required",
            AppError::NotFound { .. } => "not_found",
            AppError::Gone { .. } => "gone",
            AppError::AliasConflict { .. } => "alias_conflict",
            AppError::GenerationExhausted { .. } => "generation_exhausted",
            AppError::Unavailable { .. } => "unavailable",
            AppError::Internal { .. } => "internal_error",
        }
    }

    /// Converts the error into its JSON payload.
    pub fn to_error_info(&self) -> ErrorInfo {
        let (message, details) = self.parts();
        ErrorInfo {
            code: self.code(),
            message: message.clone(),
            details: details.clone(),
        }
    }

    fn parts(&self) -> (&String, &Value) {
        match self {
            AppError::Validation { message, details }
            | AppError::Unauthorized { message, details }
            | AppError::PasswordRequired { message, details }
            | AppError::NotFound { message, details }
            | AppError::Gone { message, details }
            | AppError::AliasConflict { message, details }
            | AppError::GenerationExhausted { message, details }
            | AppError::Unavailable { message, details }
            | AppError::Internal { message, details } => (message, details),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let challenge = match &self {
            AppError::Unauthorized { .. } => Some("Bearer"),
            AppError::PasswordRequired { .. } => Some("Password"),
            _ => None,
        };

        if status.is_server_error() {
            tracing::error!(code = self.code(), error = %self, "Request failed");
        }

        let body = ErrorBody {
            error: self.to_error_info(),
        };
        let mut response = (status, Json(body)).into_response();

        if let Some(scheme) = challenge {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static(scheme));
        }

        response
    }
}

impl From<LinkError> for AppError {
    fn from(e: LinkError) -> Self {
        let message = e.to_string();
        match e {
            LinkError::NotFound => AppError::not_found(message, json!({})),
            LinkError::AliasConflict(alias) => AppError::AliasConflict {
                message,
                details: json!({ "alias": alias }),
            },
            LinkError::GenerationExhausted(attempts) => AppError::GenerationExhausted {
                message,
                details: json!({ "attempts": attempts }),
            },
            LinkError::Validation(_) => AppError::bad_request(message, json!({})),
            LinkError::Unavailable(_) => {
                AppError::unavailable("Link store unavailable", json!({}))
            }
            LinkError::Internal(_) => AppError::internal(message, json!({})),
        }
    }
}

impl From<ResolutionError> for AppError {
    fn from(e: ResolutionError) -> Self {
        let message = e.to_string();
        match e {
            ResolutionError::NotFound => AppError::not_found(message, json!({})),
            ResolutionError::Gone(reason) => AppError::Gone {
                message,
                details: json!({ "reason": reason.as_str() }),
            },
            ResolutionError::PasswordRequired => AppError::PasswordRequired {
                message,
                details: json!({}),
            },
            ResolutionError::Unavailable(_) => {
                AppError::unavailable("Link store unavailable", json!({}))
            }
        }
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidToken => AppError::unauthorized(
                "Unauthorized",
                json!({ "reason": "Token is invalid or revoked" }),
            ),
            AuthError::Store(e) => e.into(),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateKey(key) => AppError::internal(
                "Unique constraint violation",
                json!({ "constraint": key }),
            ),
            StoreError::Unavailable(_) => {
                AppError::unavailable("Store unavailable", json!({}))
            }
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let fields: serde_json::Map<String, Value> = errors
            .field_errors()
            .iter()
            .map(|(field, errs)| {
                let messages: Vec<String> = errs
                    .iter()
                    .map(|err| {
                        err.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| err.code.to_string())
                    })
                    .collect();
                (field.to_string(), json!(messages))
            })
            .collect();

        AppError::bad_request("Validation failed", json!({ "fields": fields }))
    }
}
