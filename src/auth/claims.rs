// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Decoded token claims, client-scoped roles and resolution credentials.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Claims of a verified token.
///
/// The payload is kept verbatim so it can be handed back unchanged
/// (`token()`, appended identities). Typed accessors cover the claims the
/// guard relies on.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DecodedClaims(Map<String, Value>);

/// Roles granted to one client in the `resource_access` claim.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResourceAccess {
    #[serde(default)]
    pub roles: Vec<String>,
}

impl DecodedClaims {
    pub fn new(claims: Map<String, Value>) -> Self {
        Self(claims)
    }

    /// Raw claim lookup.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Subject (`sub`), if present and a string.
    pub fn subject(&self) -> Option<&str> {
        self.get("sub").and_then(Value::as_str)
    }

    /// The `resource_access` claim as a map of resource id to granted roles.
    ///
    /// A missing or non-object claim is an empty map. Entries whose `roles`
    /// is missing or not a list grant no roles; non-string elements of the
    /// list are skipped.
    pub fn resource_access(&self) -> BTreeMap<String, ResourceAccess> {
        let Some(Value::Object(resources)) = self.get("resource_access") else {
            return BTreeMap::new();
        };

        resources
            .iter()
            .map(|(resource, access)| {
                let roles = access
                    .get("roles")
                    .and_then(Value::as_array)
                    .map(|roles| {
                        roles
                            .iter()
                            .filter_map(Value::as_str)
                            .map(str::to_string)
                            .collect()
                    })
                    .unwrap_or_default();
                (resource.clone(), ResourceAccess { roles })
            })
            .collect()
    }

    /// Roles granted to `client_id`; empty when the client is absent.
    pub fn client_roles(&self, client_id: &str) -> ResolvedRoles {
        self.resource_access()
            .remove(client_id)
            .map(|access| ResolvedRoles::from(access.roles))
            .unwrap_or_default()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

/// Roles held on the configured client. Order is not significant.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResolvedRoles(Vec<String>);

impl ResolvedRoles {
    pub fn contains(&self, role: &str) -> bool {
        self.0.iter().any(|r| r == role)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl From<Vec<String>> for ResolvedRoles {
    fn from(mut roles: Vec<String>) -> Self {
        roles.sort_unstable();
        roles.dedup();
        Self(roles)
    }
}

/// Claims merged with the resolved `roles`, handed to user resolution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Credentials {
    #[serde(flatten)]
    claims: Map<String, Value>,
    roles: ResolvedRoles,
}

impl Credentials {
    /// Merge `roles` into `claims`. A `roles` claim already present in the
    /// token is replaced.
    pub fn new(claims: &DecodedClaims, roles: ResolvedRoles) -> Self {
        let mut claims = claims.as_map().clone();
        claims.remove("roles");
        Self { claims, roles }
    }

    pub fn roles(&self) -> &ResolvedRoles {
        &self.roles
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.claims.get(name)
    }

    pub fn subject(&self) -> Option<&str> {
        self.get("sub").and_then(Value::as_str)
    }

    /// JSON form used in diagnostics.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn claims(value: Value) -> DecodedClaims {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn missing_resource_access_is_empty() {
        let claims = claims(json!({ "sub": "u1" }));
        assert!(claims.resource_access().is_empty());
        assert!(claims.client_roles("web-portal").is_empty());
    }

    #[test]
    fn extracts_roles_for_client_only() {
        let claims = claims(json!({
            "resource_access": {
                "web-portal": { "roles": ["admin", "viewer"] },
                "account": { "roles": ["manage-account"] }
            }
        }));

        let roles = claims.client_roles("web-portal");
        assert!(roles.contains("admin"));
        assert!(roles.contains("viewer"));
        assert!(!roles.contains("manage-account"));
    }

    #[test]
    fn client_without_roles_list_grants_nothing() {
        let claims = claims(json!({
            "resource_access": { "web-portal": { "scope": "x" } }
        }));
        assert_eq!(claims.resource_access().len(), 1);
        assert!(claims.client_roles("web-portal").is_empty());
    }

    #[test]
    fn non_string_roles_are_skipped() {
        let claims = claims(json!({
            "resource_access": { "web-portal": { "roles": ["admin", 7, null, "viewer"] } }
        }));
        let roles = claims.client_roles("web-portal");
        assert_eq!(roles.as_slice(), ["admin".to_string(), "viewer".to_string()]);
    }

    #[test]
    fn malformed_roles_grant_nothing() {
        let claims = claims(json!({
            "resource_access": { "web-portal": { "roles": "admin" } }
        }));
        assert!(claims.client_roles("web-portal").is_empty());
    }

    #[test]
    fn serializes_back_to_original_payload() {
        let payload = json!({ "sub": "u1", "custom": { "nested": [1, 2] } });
        let claims = claims(payload.clone());
        assert_eq!(serde_json::to_value(&claims).unwrap(), payload);
    }

    #[test]
    fn credentials_merge_roles_into_claims() {
        let claims = claims(json!({ "sub": "u1", "roles": ["spoofed"] }));
        let roles = ResolvedRoles::from(vec!["viewer".to_string()]);
        let credentials = Credentials::new(&claims, roles);

        let value = serde_json::to_value(&credentials).unwrap();
        assert_eq!(value, json!({ "sub": "u1", "roles": ["viewer"] }));
        assert_eq!(credentials.subject(), Some("u1"));
    }
}
