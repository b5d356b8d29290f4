/**
 * Routes Module
 * API route handlers and the shared error contract
 */
use axum::{http::StatusCode, Json};
use serde::Serialize;
use sqlx::PgPool;
use std::sync::Arc;
use validator::{Validate, ValidationErrors};

use crate::db::{self, InsertError};

pub mod blog;
pub mod bookings;
pub mod contact;
pub mod health;
pub mod logs;
pub mod notifications;
pub mod packages;
pub mod payments;
pub mod resources;

/// Error body shared by every endpoint.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub(crate) fn error_response(
    status: StatusCode,
    error: impl Into<String>,
    message: Option<String>,
) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
            message,
        }),
    )
}

/// The pool, or the 503 every handler answers with while the store is down.
pub(crate) fn require_pool() -> Result<Arc<PgPool>, ApiError> {
    db::get_pool().ok_or_else(|| {
        error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "Database not available",
            None,
        )
    })
}

/// Run derived validation on an insert-shape, mapping failure to a 400 that
/// names the offending field(s) in the client's casing.
pub(crate) fn validate_payload<T: Validate>(payload: &T) -> Result<(), ApiError> {
    payload
        .validate()
        .map_err(|errors| validation_failure(&errors))
}

fn validation_failure(errors: &ValidationErrors) -> ApiError {
    let mut fields: Vec<String> = errors
        .field_errors()
        .keys()
        .map(|field| to_camel_case(field))
        .collect();
    fields.sort();
    error_response(
        StatusCode::BAD_REQUEST,
        "Validation failed",
        Some(format!("Invalid field(s): {}", fields.join(", "))),
    )
}

/// Map a classified insert failure to the HTTP error contract:
/// duplicate -> 409, dangling reference -> 422, anything else -> opaque 500.
pub(crate) fn insert_failure(context: &str, err: InsertError) -> ApiError {
    match err {
        InsertError::Unique(field) => error_response(
            StatusCode::CONFLICT,
            format!("Duplicate {}", to_camel_case(&field)),
            None,
        ),
        InsertError::ForeignKey(field) => error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("Unknown {} reference", to_camel_case(&field)),
            None,
        ),
        InsertError::Other(e) => {
            tracing::error!("Database error {}: {}", context, e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to {context}"),
                None,
            )
        }
    }
}

/// snake_case -> camelCase, matching the JSON field names clients send.
pub(crate) fn to_camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper_next = false;
    for c in field.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}
