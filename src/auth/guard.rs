// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-request authentication context.
//!
//! Authentication is eager: building an [`AuthContext`] verifies the bearer
//! token, checks its resource scope, extracts client roles and resolves the
//! user. Construction either fails with an [`AuthError`] or yields a context
//! whose `user()` is settled for the rest of the request.
//!
//! ```rust,ignore
//! async fn handler(ctx: AuthContext) -> impl IntoResponse {
//!     if ctx.has_role(&["editor"], "web-portal") { /* ... */ }
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use tracing::{debug, warn};

use super::claims::{Credentials, DecodedClaims};
use super::error::AuthError;
use super::identity::UserIdentity;
use super::token;
use crate::config::AuthConfig;
use crate::state::AppState;

const BEARER_PREFIX: &str = "Bearer ";

/// Extract the bearer token from request headers.
///
/// Takes the text after the last `Bearer ` in `Authorization`, up to the
/// first comma. A missing or non-bearer header yields `None`.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let position = header.rfind(BEARER_PREFIX)?;
    let token = &header[position + BEARER_PREFIX.len()..];
    let token = token.split(',').next().unwrap_or(token).trim();
    (!token.is_empty()).then_some(token)
}

/// Authentication outcome for one request.
#[derive(Debug, Clone)]
pub struct AuthContext {
    decoded: Option<DecodedClaims>,
    user: Option<UserIdentity>,
    append_decoded_token: bool,
}

impl AuthContext {
    /// Authenticate `token` against the shared state.
    ///
    /// No token yields an anonymous context. A token that fails
    /// verification, grants none of the allowed resources or (in database
    /// mode) matches no user is an error.
    pub fn new(token: Option<&str>, state: &AppState) -> Result<Self, AuthError> {
        let decoded = token::decode(token, &state.key, state.config.leeway).inspect_err(|e| {
            warn!(error = %e, "Bearer token rejected");
        })?;

        let mut context = Self {
            decoded: None,
            user: None,
            append_decoded_token: state.config.append_decoded_token,
        };

        match decoded {
            Some(claims) => context.validate(claims, state)?,
            None => debug!("No bearer token, continuing anonymously"),
        }

        Ok(context)
    }

    fn validate(&mut self, claims: DecodedClaims, state: &AppState) -> Result<(), AuthError> {
        validate_resources(&claims, &state.config)?;

        let roles = claims.client_roles(&state.config.client_id);
        let credentials = Credentials::new(&claims, roles);

        let user = state.users.resolve(&claims, &credentials).inspect_err(|_| {
            warn!(subject = ?claims.subject(), "No user matches token credentials");
        })?;

        match &user {
            Some(user) => debug!(user_id = %user.id, roles = user.roles.len(), "Authenticated"),
            None => debug!(subject = ?claims.subject(), "Token accepted without a local user"),
        }

        self.decoded = Some(claims);
        self.user = user;
        Ok(())
    }

    /// True if a user was resolved.
    pub fn check(&self) -> bool {
        self.user.is_some()
    }

    /// The resolved user, with the decoded token attached when the
    /// deployment appends it.
    pub fn user(&self) -> Option<UserIdentity> {
        let mut user = self.user.clone()?;
        if self.append_decoded_token {
            user.token = self.decoded.clone();
        }
        Some(user)
    }

    /// Borrow the resolved user as stored.
    pub fn identity(&self) -> Option<&UserIdentity> {
        self.user.as_ref()
    }

    pub fn id(&self) -> Option<&str> {
        self.user.as_ref().map(|user| user.id.as_str())
    }

    /// Roles of the resolved user.
    ///
    /// `None` means there is no authenticated user, which is distinct from
    /// `Some(&[])`, an authenticated user holding no roles.
    pub fn roles(&self) -> Option<&[String]> {
        self.user.as_ref().map(|user| user.roles.as_slice())
    }

    /// True if the user holds every role in `required`.
    ///
    /// Roles are already scoped to the configured client, so `resource`
    /// is not consulted. Without a user no non-empty requirement passes.
    pub fn has_role<S: AsRef<str>>(&self, required: &[S], _resource: &str) -> bool {
        let held = self.roles().unwrap_or_default();
        required
            .iter()
            .all(|role| held.iter().any(|r| r == role.as_ref()))
    }

    /// Decoded claims, if a token was presented.
    pub fn claims(&self) -> Option<&DecodedClaims> {
        self.decoded.as_ref()
    }

    /// Decoded claims as JSON; `null` when no token was presented.
    pub fn token(&self) -> String {
        serde_json::to_string(&self.decoded).unwrap_or_else(|_| "null".to_string())
    }
}

/// Reject tokens whose `resource_access` names none of the allowed resources.
fn validate_resources(claims: &DecodedClaims, config: &AuthConfig) -> Result<(), AuthError> {
    let granted = claims.resource_access();
    if granted.keys().any(|resource| config.is_allowed_resource(resource)) {
        return Ok(());
    }

    warn!(
        resources = ?granted.keys().collect::<Vec<_>>(),
        "Token grants no allowed resource"
    );
    Err(AuthError::ResourceAccessNotAllowed {
        allowed: config.allowed_resources_list(),
    })
}

impl FromRequestParts<AppState> for AuthContext {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Reuse the outcome if middleware already authenticated this request
        if let Some(context) = parts.extensions.get::<AuthContext>().cloned() {
            return Ok(context);
        }

        let context = AuthContext::new(bearer_token(&parts.headers), state)?;
        parts.extensions.insert(context.clone());
        Ok(context)
    }
}

/// Extractor that requires an authenticated user.
///
/// ```rust,ignore
/// async fn me(Authenticated(user): Authenticated) -> Json<UserIdentity> {
///     Json(user)
/// }
/// ```
pub struct Authenticated(pub UserIdentity);

impl FromRequestParts<AppState> for Authenticated {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let context = AuthContext::from_request_parts(parts, state).await?;
        context
            .user()
            .map(Authenticated)
            .ok_or(AuthError::Unauthenticated)
    }
}
