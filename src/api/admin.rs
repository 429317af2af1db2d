// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Role-guarded endpoints.
//!
//! These handlers do no role checks of their own: the router wraps them in
//! `RoleAccessPolicy` layers (`admin`, `admin|auditor`).

use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::Authenticated;

/// Response for GET /v1/admin
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AdminOverviewResponse {
    /// Caller's user ID.
    pub user_id: String,
    /// Caller's client roles.
    pub roles: Vec<String>,
}

/// Response for GET /v1/reports
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReportsResponse {
    /// Caller's user ID.
    pub requested_by: String,
    /// Role the caller is acting as.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_role: Option<String>,
}

/// Administrative overview.
#[utoipa::path(
    get,
    path = "/v1/admin",
    tag = "Admin",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Caller holds the admin role", body = AdminOverviewResponse),
        (status = 401, description = "Unauthenticated"),
        (status = 403, description = "Role `admin` is required"),
    )
)]
pub async fn admin_overview(Authenticated(user): Authenticated) -> Json<AdminOverviewResponse> {
    Json(AdminOverviewResponse {
        user_id: user.id,
        roles: user.roles,
    })
}

/// Reports, open to admins and auditors.
#[utoipa::path(
    get,
    path = "/v1/reports",
    tag = "Admin",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Caller holds admin or auditor", body = ReportsResponse),
        (status = 401, description = "Unauthenticated"),
        (status = 403, description = "Role `admin` or `auditor` is required"),
    )
)]
pub async fn reports(Authenticated(user): Authenticated) -> Json<ReportsResponse> {
    Json(ReportsResponse {
        requested_by: user.id,
        active_role: user.active_role,
    })
}
