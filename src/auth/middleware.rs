// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Route-level role enforcement.
//!
//! Attach a [`RoleAccessPolicy`] to a route with a guard expression, a
//! `|`-separated list of acceptable roles:
//!
//! ```rust,ignore
//! let app = Router::new()
//!     .route("/reports", get(reports))
//!     .route_layer(axum::middleware::from_fn_with_state(
//!         RoleAccessPolicy::new(state.clone(), "admin|auditor"),
//!         enforce_roles,
//!     ));
//! ```
//!
//! Any failure on the way, including token errors raised while the
//! context is built, is answered with a `{"message"}` body and the error's
//! status instead of reaching the handler.

use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use super::error::AuthError;
use super::guard::AuthContext;
use crate::state::AppState;

/// Roles accepted by a route. Any one of them is enough.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GuardExpression(Vec<String>);

impl GuardExpression {
    /// Parse a `|`-separated role list. Blank entries are ignored.
    pub fn parse(expression: &str) -> Self {
        Self(
            expression
                .split('|')
                .map(str::trim)
                .filter(|role| !role.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn roles(&self) -> &[String] {
        &self.0
    }

    /// True if `held` contains at least one accepted role.
    pub fn allows(&self, held: &[String]) -> bool {
        self.0.iter().any(|role| held.contains(role))
    }
}

/// Role requirement bound to a route.
#[derive(Clone)]
pub struct RoleAccessPolicy {
    state: AppState,
    guard: GuardExpression,
}

impl RoleAccessPolicy {
    pub fn new(state: AppState, expression: &str) -> Self {
        Self {
            state,
            guard: GuardExpression::parse(expression),
        }
    }

    pub fn guard(&self) -> &GuardExpression {
        &self.guard
    }

    /// Decide whether `context` may proceed.
    ///
    /// An empty guard only needs an authenticated user. Otherwise the user
    /// must hold one of the guard's roles.
    pub fn authorize(&self, context: &AuthContext) -> Result<(), AuthError> {
        if self.guard.is_empty() && context.check() {
            return Ok(());
        }

        let held = context.roles().ok_or(AuthError::Unauthenticated)?;
        if self.guard.allows(held) {
            return Ok(());
        }

        Err(AuthError::RoleDenied {
            role: self.guard.roles().first().cloned().unwrap_or_default(),
        })
    }
}

/// Middleware enforcing a [`RoleAccessPolicy`].
///
/// The authenticated context is left in the request extensions for the
/// handler's extractors.
pub async fn enforce_roles(
    State(policy): State<RoleAccessPolicy>,
    request: Request,
    next: Next,
) -> Response {
    let (mut parts, body) = request.into_parts();

    let outcome = match AuthContext::from_request_parts(&mut parts, &policy.state).await {
        Ok(context) => policy.authorize(&context),
        Err(e) => Err(e),
    };

    match outcome {
        Ok(()) => next.run(Request::from_parts(parts, body)).await,
        Err(e) => {
            warn!(
                path = %parts.uri.path(),
                guard = ?policy.guard.roles(),
                error = %e,
                "Request denied"
            );
            e.into_response()
        }
    }
}
