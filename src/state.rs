// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::{UserProvider, UserResolver, VerificationKey};
use crate::config::{AuthConfig, ConfigError};

/// Process-wide, read-only state shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AuthConfig>,
    pub key: Arc<VerificationKey>,
    pub users: UserResolver,
}

impl AppState {
    /// Derive the verification key and bind the user provider.
    pub fn new(config: AuthConfig, provider: Arc<dyn UserProvider>) -> Result<Self, ConfigError> {
        let key = VerificationKey::from_realm_key(&config.realm_public_key)
            .map_err(|e| ConfigError::InvalidKey(e.to_string()))?;
        let users = UserResolver::new(
            provider,
            config.user_provider_custom_retrieve_method.as_deref(),
            config.load_user_from_database,
        )?;

        Ok(Self {
            config: Arc::new(config),
            key: Arc::new(key),
            users,
        })
    }
}
