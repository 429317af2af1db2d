// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{middleware::from_fn_with_state, routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{enforce_roles, RoleAccessPolicy, UserIdentity},
    state::AppState,
};

pub mod admin;
pub mod health;
pub mod users;

/// Guard expression for `/v1/admin`.
pub const ADMIN_GUARD: &str = "admin";
/// Guard expression for `/v1/reports`.
pub const REPORTS_GUARD: &str = "admin|auditor";

pub fn router(state: AppState) -> Router {
    let admin_routes = Router::new()
        .route("/admin", get(admin::admin_overview))
        .route_layer(from_fn_with_state(
            RoleAccessPolicy::new(state.clone(), ADMIN_GUARD),
            enforce_roles,
        ));

    let report_routes = Router::new()
        .route("/reports", get(admin::reports))
        .route_layer(from_fn_with_state(
            RoleAccessPolicy::new(state.clone(), REPORTS_GUARD),
            enforce_roles,
        ));

    let v1_routes = Router::new()
        .route("/me", get(users::current_user))
        .route("/token", get(users::current_token))
        .route("/access", get(users::check_access))
        .route("/permissions/{permission}", get(users::check_permission))
        .merge(admin_routes)
        .merge(report_routes)
        .with_state(state);

    Router::new()
        .route("/health", get(health::health))
        .nest("/v1", v1_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

struct BearerSecurity;

impl Modify for BearerSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        users::current_user,
        users::current_token,
        users::check_access,
        users::check_permission,
        admin::admin_overview,
        admin::reports
    ),
    components(
        schemas(
            health::HealthResponse,
            UserIdentity,
            users::AccessResponse,
            admin::AdminOverviewResponse,
            admin::ReportsResponse
        )
    ),
    modifiers(&BearerSecurity),
    tags(
        (name = "Health", description = "Liveness"),
        (name = "Users", description = "The calling user"),
        (name = "Admin", description = "Role-guarded endpoints")
    )
)]
struct ApiDoc;
