// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! The authenticated principal.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

use super::claims::DecodedClaims;

/// Authenticated user resolved for the current request.
///
/// Created per request by the guard and never persisted by it. `roles` are
/// the client roles (from the user directory or from the token), the
/// active role is the one selected as operative for permission checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserIdentity {
    /// Canonical user identifier.
    pub id: String,

    /// Roles held on the configured client.
    #[serde(default)]
    pub roles: Vec<String>,

    /// Role currently selected as operative.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_role: Option<String>,

    /// Permissions granted by the active role.
    #[serde(default)]
    pub active_role_permissions: Vec<String>,

    /// Profile attributes (username, email, ...).
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    #[schema(value_type = Object)]
    pub attributes: Map<String, Value>,

    /// Decoded token, attached when the deployment appends it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub token: Option<DecodedClaims>,
}

impl UserIdentity {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            roles: Vec::new(),
            active_role: None,
            active_role_permissions: Vec::new(),
            attributes: Map::new(),
            token: None,
        }
    }

    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles = roles.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_active_role<I, S>(mut self, role: impl Into<String>, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.active_role = Some(role.into());
        self.active_role_permissions = permissions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// True if the user holds at least one of `roles`.
    pub fn has_role<S: AsRef<str>>(&self, roles: &[S]) -> bool {
        roles
            .iter()
            .any(|wanted| self.roles.iter().any(|r| r == wanted.as_ref()))
    }

    /// True if the active role is one of `roles`. Passes when `roles` is empty.
    pub fn has_role_active<S: AsRef<str>>(&self, roles: &[S]) -> bool {
        if roles.is_empty() {
            return true;
        }
        match &self.active_role {
            Some(active) => roles.iter().any(|r| r.as_ref() == active),
            None => false,
        }
    }

    /// True if the active role grants at least one of `permissions`.
    /// Passes when `permissions` is empty.
    pub fn has_permission<S: AsRef<str>>(&self, permissions: &[S]) -> bool {
        if permissions.is_empty() {
            return true;
        }
        permissions.iter().any(|wanted| {
            self.active_role_permissions
                .iter()
                .any(|p| p == wanted.as_ref())
        })
    }
}
