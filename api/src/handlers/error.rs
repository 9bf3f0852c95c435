//! Mapping from domain errors to HTTP responses.
//!
//! Every error leaves through the shared response envelope. Validation and
//! uniqueness conflicts carry per-field detail; storage and persistence
//! failures surface as an opaque 500 with the detail kept in server logs.

use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use tracing::error;

use sd_core::errors::DomainError;
use sd_shared::types::{ApiResponse, FieldErrors};

/// Render a domain error as an HTTP response
pub fn domain_error_response(err: &DomainError) -> HttpResponse {
    let status = status_for(err);

    if status.is_server_error() {
        error!(error = ?err, "request failed with a server-side error");
    }

    let body = match err {
        DomainError::Validation { errors } => {
            ApiResponse::<()>::error_with_fields("Validation errors", errors.clone())
        }
        DomainError::UniquenessConflict { field } => {
            let mut errors = FieldErrors::new();
            errors.insert(field.to_string(), vec![err.to_string()]);
            ApiResponse::<()>::error_with_fields(err.to_string(), errors)
        }
        other => ApiResponse::<()>::error(other.to_string()),
    };

    HttpResponse::build(status).json(body)
}

fn status_for(err: &DomainError) -> StatusCode {
    match err {
        DomainError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        DomainError::TokenInvalidOrExpired
        | DomainError::TokenPhoneMismatch
        | DomainError::OtpChallengeFailed => StatusCode::BAD_REQUEST,
        DomainError::RoleInvalid | DomainError::AccountInactive => StatusCode::FORBIDDEN,
        DomainError::UniquenessConflict { .. } => StatusCode::CONFLICT,
        DomainError::UserNotFound | DomainError::ProfileNotFound => StatusCode::NOT_FOUND,
        DomainError::InvalidCredentials | DomainError::Unauthenticated => StatusCode::UNAUTHORIZED,
        DomainError::Storage { .. }
        | DomainError::Persistence { .. }
        | DomainError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
