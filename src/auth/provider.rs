// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User resolution.
//!
//! The guard never talks to storage directly. It hands the merged
//! [`Credentials`] to a [`UserProvider`], either through the default
//! `retrieve_by_credentials` or through a named alternate method that the
//! deployment selects in configuration. Named methods are looked up once,
//! when the [`UserResolver`] is built, so an unknown name fails at startup.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use serde_json::Value;

use super::claims::{Credentials, DecodedClaims};
use super::error::AuthError;
use super::identity::UserIdentity;
use crate::config::ConfigError;

/// Alternate retrieval method, called with the decoded token and the
/// merged credentials.
pub type RetrievalMethod =
    Arc<dyn Fn(&DecodedClaims, &Credentials) -> Option<UserIdentity> + Send + Sync>;

/// Source of application users.
pub trait UserProvider: Send + Sync {
    /// Resolve a user from token credentials.
    fn retrieve_by_credentials(&self, credentials: &Credentials) -> Option<UserIdentity>;

    /// Look up a named alternate retrieval method.
    fn retrieval_method(&self, _name: &str) -> Option<RetrievalMethod> {
        None
    }
}

/// Provider selection fixed at configuration load.
#[derive(Clone)]
pub struct UserResolver {
    provider: Arc<dyn UserProvider>,
    custom: Option<RetrievalMethod>,
    require_user: bool,
}

impl UserResolver {
    /// Bind `provider`, resolving `custom_method` if one is configured.
    ///
    /// `require_user` mirrors `load_user_from_database`: when set, the named
    /// method (if any) is used and a missing user is an error. Without it the
    /// named method is never called, so it is not looked up.
    pub fn new(
        provider: Arc<dyn UserProvider>,
        custom_method: Option<&str>,
        require_user: bool,
    ) -> Result<Self, ConfigError> {
        let custom = match custom_method.filter(|_| require_user) {
            Some(name) => Some(
                provider
                    .retrieval_method(name)
                    .ok_or_else(|| ConfigError::UnknownRetrieveMethod(name.to_string()))?,
            ),
            None => None,
        };

        Ok(Self {
            provider,
            custom,
            require_user,
        })
    }

    /// Resolve the user for `credentials`.
    ///
    /// In database mode a missing user is [`AuthError::UserNotFound`]. In
    /// token-trust mode the default retrieval is always used and `None` is
    /// an acceptable outcome.
    pub fn resolve(
        &self,
        claims: &DecodedClaims,
        credentials: &Credentials,
    ) -> Result<Option<UserIdentity>, AuthError> {
        if !self.require_user {
            return Ok(self.provider.retrieve_by_credentials(credentials));
        }

        let user = match &self.custom {
            Some(method) => method(claims, credentials),
            None => self.provider.retrieve_by_credentials(credentials),
        };

        user.map(Some).ok_or_else(|| AuthError::UserNotFound {
            credentials: credentials.to_json(),
        })
    }

    pub fn requires_user(&self) -> bool {
        self.require_user
    }
}

impl fmt::Debug for UserResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserResolver")
            .field("custom", &self.custom.is_some())
            .field("require_user", &self.require_user)
            .finish_non_exhaustive()
    }
}

/// Builds identities straight from token credentials.
///
/// Used when the deployment trusts the token and keeps no user table: the
/// id is `sub`, roles are the client roles and the first role is active.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClaimsUserProvider;

impl UserProvider for ClaimsUserProvider {
    fn retrieve_by_credentials(&self, credentials: &Credentials) -> Option<UserIdentity> {
        let id = credentials.subject()?;
        let roles = credentials.roles().as_slice();

        let mut user = UserIdentity::new(id).with_roles(roles.iter().cloned());
        user.active_role = roles.first().cloned();
        for attribute in ["preferred_username", "email", "name"] {
            if let Some(value) = credentials.get(attribute) {
                user.attributes.insert(attribute.to_string(), value.clone());
            }
        }
        Some(user)
    }
}

/// A stored user record.
#[derive(Debug, Clone, PartialEq)]
pub struct UserRecord {
    pub id: String,
    pub username: String,
    pub roles: Vec<String>,
    pub active_role: Option<String>,
    pub permissions: HashMap<String, Vec<String>>,
}

impl UserRecord {
    pub fn new(id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            roles: Vec::new(),
            active_role: None,
            permissions: HashMap::new(),
        }
    }

    pub fn with_role(mut self, role: impl Into<String>, permissions: &[&str]) -> Self {
        let role = role.into();
        self.permissions.insert(
            role.clone(),
            permissions.iter().map(|p| p.to_string()).collect(),
        );
        if self.active_role.is_none() {
            self.active_role = Some(role.clone());
        }
        self.roles.push(role);
        self
    }

    /// Identity for this record. Stored roles win; when the record has none
    /// the roles from the token are used.
    fn to_identity(&self, credentials: &Credentials) -> UserIdentity {
        let roles = if self.roles.is_empty() {
            credentials.roles().as_slice().to_vec()
        } else {
            self.roles.clone()
        };
        let active_role = self.active_role.clone().or_else(|| roles.first().cloned());
        let permissions = active_role
            .as_ref()
            .and_then(|role| self.permissions.get(role))
            .cloned()
            .unwrap_or_default();

        let mut user = UserIdentity::new(&self.id)
            .with_roles(roles)
            .with_attribute("username", self.username.clone());
        user.active_role = active_role;
        user.active_role_permissions = permissions;
        user
    }
}

/// Name of the alternate retrieval method resolving by `preferred_username`.
pub const RETRIEVE_BY_USERNAME: &str = "retrieveByUsername";

/// In-process user directory keyed by token subject.
#[derive(Clone, Default)]
pub struct InMemoryUserProvider {
    users: Arc<RwLock<HashMap<String, UserRecord>>>,
}

impl InMemoryUserProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, record: UserRecord) {
        let mut users = self.users.write().unwrap_or_else(PoisonError::into_inner);
        users.insert(record.id.clone(), record);
    }

    pub fn len(&self) -> usize {
        self.users.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn find_by_id(&self, id: &str, credentials: &Credentials) -> Option<UserIdentity> {
        let users = self.users.read().unwrap_or_else(PoisonError::into_inner);
        users.get(id).map(|record| record.to_identity(credentials))
    }

    fn find_by_username(&self, username: &str, credentials: &Credentials) -> Option<UserIdentity> {
        let users = self.users.read().unwrap_or_else(PoisonError::into_inner);
        users
            .values()
            .find(|record| record.username == username)
            .map(|record| record.to_identity(credentials))
    }
}

impl UserProvider for InMemoryUserProvider {
    fn retrieve_by_credentials(&self, credentials: &Credentials) -> Option<UserIdentity> {
        self.find_by_id(credentials.subject()?, credentials)
    }

    fn retrieval_method(&self, name: &str) -> Option<RetrievalMethod> {
        match name {
            RETRIEVE_BY_USERNAME => {
                let directory = self.clone();
                let method: RetrievalMethod =
                    Arc::new(move |claims: &DecodedClaims, credentials: &Credentials| {
                        let username = claims.get("preferred_username").and_then(Value::as_str)?;
                        directory.find_by_username(username, credentials)
                    });
                Some(method)
            }
            _ => None,
        }
    }
}
