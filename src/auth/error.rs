// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Authentication and authorization failures.
///
/// Each variant carries the HTTP status it is reported with; every variant
/// renders as `{"message": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Token could not be verified (signature, structure, expiry, key).
    /// Holds the verification library's message.
    #[error("{0}")]
    Token(String),

    /// Token is valid but grants none of the resources this API serves.
    #[error(
        "The decoded JWT token has not a valid `resource_access` allowed by API. \
         Allowed resources by API: {allowed}"
    )]
    ResourceAccessNotAllowed { allowed: String },

    /// Database-backed resolution found no user for the credentials.
    #[error("User not found. Credentials: {credentials}")]
    UserNotFound { credentials: String },

    /// Authenticated, but lacking the role a route requires.
    #[error("Role `{role}` is not allowed to access this resource")]
    RoleDenied { role: String },

    /// No authenticated identity where one is required.
    #[error("Unauthenticated")]
    Unauthenticated,
}

#[derive(Serialize)]
struct AuthErrorBody {
    message: String,
}

impl AuthError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Token(_) | AuthError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AuthError::ResourceAccessNotAllowed { .. } | AuthError::RoleDenied { .. } => {
                StatusCode::FORBIDDEN
            }
            AuthError::UserNotFound { .. } => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(AuthErrorBody {
            message: self.to_string(),
        });
        (status, body).into_response()
    }
}
