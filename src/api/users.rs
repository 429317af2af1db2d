// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Endpoints about the calling user.

use axum::{
    extract::{Path, Query, State},
    http::{header::CONTENT_TYPE, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::auth::{AuthContext, AuthError, Authenticated, GuardExpression, UserIdentity};
use crate::error::ApiError;
use crate::state::AppState;

/// Get the current authenticated user.
///
/// Includes the decoded token when the deployment appends it.
#[utoipa::path(
    get,
    path = "/v1/me",
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "User information", body = UserIdentity),
        (status = 401, description = "Missing, invalid or unresolved token"),
        (status = 403, description = "Token grants no allowed resource"),
    )
)]
pub async fn current_user(Authenticated(user): Authenticated) -> Json<UserIdentity> {
    Json(user)
}

/// Get the caller's decoded token claims (`null` without a token).
#[utoipa::path(
    get,
    path = "/v1/token",
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Decoded token claims as JSON"),
        (status = 401, description = "Invalid token"),
    )
)]
pub async fn current_token(context: AuthContext) -> impl IntoResponse {
    ([(CONTENT_TYPE, "application/json")], context.token())
}

/// Roles and permissions to test, both `|`-separated.
#[derive(Debug, Deserialize, IntoParams)]
pub struct AccessQuery {
    /// Roles, e.g. `admin|editor`.
    #[serde(default)]
    pub roles: String,
    /// Permissions, e.g. `post.create|post.delete`.
    #[serde(default)]
    pub permissions: String,
}

/// Outcome of the role and permission predicates for the caller.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AccessResponse {
    /// Holds at least one of the roles.
    pub has_any_role: bool,
    /// Holds every one of the roles.
    pub has_all_roles: bool,
    /// The active role is one of the roles.
    pub has_role_active: bool,
    /// The active role grants at least one of the permissions.
    pub has_permission: bool,
}

/// Evaluate role and permission predicates for the caller.
#[utoipa::path(
    get,
    path = "/v1/access",
    tag = "Users",
    params(AccessQuery),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Predicate results", body = AccessResponse),
        (status = 400, description = "Neither roles nor permissions given"),
        (status = 401, description = "Unauthenticated"),
    )
)]
pub async fn check_access(
    State(state): State<AppState>,
    context: AuthContext,
    Query(query): Query<AccessQuery>,
) -> Result<Json<AccessResponse>, ApiError> {
    let roles = GuardExpression::parse(&query.roles);
    let permissions = GuardExpression::parse(&query.permissions);
    if roles.is_empty() && permissions.is_empty() {
        return Err(ApiError::bad_request(
            "Query must name at least one role or permission",
        ));
    }

    let user = context.identity().ok_or(AuthError::Unauthenticated)?;
    Ok(Json(AccessResponse {
        has_any_role: user.has_role(roles.roles()),
        has_all_roles: context.has_role(roles.roles(), &state.config.client_id),
        has_role_active: user.has_role_active(roles.roles()),
        has_permission: user.has_permission(permissions.roles()),
    }))
}

/// Succeed only if the caller's active role grants `permission`.
#[utoipa::path(
    get,
    path = "/v1/permissions/{permission}",
    tag = "Users",
    params(("permission" = String, Path, description = "Permission name")),
    security(("bearer" = [])),
    responses(
        (status = 204, description = "Permission granted"),
        (status = 401, description = "Unauthenticated"),
        (status = 403, description = "Permission not granted by the active role"),
    )
)]
pub async fn check_permission(
    Authenticated(user): Authenticated,
    Path(permission): Path<String>,
) -> Result<StatusCode, ApiError> {
    if user.has_permission(&[permission.as_str()]) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::forbidden(format!(
            "Permission `{permission}` is not granted by the active role"
        )))
    }
}
