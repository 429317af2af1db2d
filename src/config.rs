// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Guard configuration is an explicit [`AuthConfig`] value handed to
//! `AppState` at startup. It is either built in code or read once from the
//! environment with [`AuthConfig::from_env`].
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `SSO_REALM_PUBLIC_KEY` | Base64 body of the realm RSA public key | Required |
//! | `SSO_ALLOWED_RESOURCES` | Comma-separated resources this API accepts | Required |
//! | `SSO_CLIENT_ID` | `resource_access` entry whose roles are used | Required |
//! | `SSO_LOAD_USER_FROM_DATABASE` | Require the user provider to find the user | `false` |
//! | `SSO_USER_PROVIDER_CUSTOM_RETRIEVE_METHOD` | Named alternate retrieval method | unset |
//! | `SSO_APPEND_DECODED_TOKEN` | Attach decoded claims to the returned user | `false` |
//! | `SSO_LEEWAY_SECONDS` | Clock skew tolerance for `exp`/`nbf` | `0` |
//! | `SEED_USER` | `<sub>,<username>,<role>` loaded into the in-memory directory | unset |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use thiserror::Error;

pub const REALM_PUBLIC_KEY_ENV: &str = "SSO_REALM_PUBLIC_KEY";
pub const ALLOWED_RESOURCES_ENV: &str = "SSO_ALLOWED_RESOURCES";
pub const CLIENT_ID_ENV: &str = "SSO_CLIENT_ID";
pub const LOAD_USER_FROM_DATABASE_ENV: &str = "SSO_LOAD_USER_FROM_DATABASE";
pub const CUSTOM_RETRIEVE_METHOD_ENV: &str = "SSO_USER_PROVIDER_CUSTOM_RETRIEVE_METHOD";
pub const APPEND_DECODED_TOKEN_ENV: &str = "SSO_APPEND_DECODED_TOKEN";
pub const LEEWAY_SECONDS_ENV: &str = "SSO_LEEWAY_SECONDS";
/// `<sub>,<username>,<role>` record loaded into the user directory at startup.
pub const SEED_USER_ENV: &str = "SEED_USER";

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

/// Configuration errors, reported at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },

    #[error("invalid realm public key: {0}")]
    InvalidKey(String),

    #[error("user provider has no retrieve method named {0:?}")]
    UnknownRetrieveMethod(String),
}

/// Token guard configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    /// Base64 public key body used to verify signatures.
    pub realm_public_key: String,
    /// Resources this deployment serves.
    pub allowed_resources: Vec<String>,
    /// The `resource_access` key whose roles are extracted.
    pub client_id: String,
    /// Require user resolution to succeed.
    pub load_user_from_database: bool,
    /// Named alternate retrieval method on the user provider.
    pub user_provider_custom_retrieve_method: Option<String>,
    /// Attach decoded claims onto returned users.
    pub append_decoded_token: bool,
    /// Clock skew tolerance in seconds.
    pub leeway: u64,
}

impl AuthConfig {
    /// Create a configuration with defaults for the optional settings.
    ///
    /// `allowed_resources` is the comma-separated list as stored in
    /// configuration files.
    pub fn new(
        realm_public_key: impl Into<String>,
        allowed_resources: &str,
        client_id: impl Into<String>,
    ) -> Self {
        Self {
            realm_public_key: realm_public_key.into(),
            allowed_resources: parse_list(allowed_resources),
            client_id: client_id.into(),
            load_user_from_database: false,
            user_provider_custom_retrieve_method: None,
            append_decoded_token: false,
            leeway: 0,
        }
    }

    pub fn with_load_user_from_database(mut self, enabled: bool) -> Self {
        self.load_user_from_database = enabled;
        self
    }

    pub fn with_custom_retrieve_method(mut self, method: impl Into<String>) -> Self {
        self.user_provider_custom_retrieve_method = Some(method.into());
        self
    }

    pub fn with_append_decoded_token(mut self, enabled: bool) -> Self {
        self.append_decoded_token = enabled;
        self
    }

    pub fn with_leeway(mut self, seconds: u64) -> Self {
        self.leeway = seconds;
        self
    }

    /// Allowed resources in their configured comma-separated form.
    pub fn allowed_resources_list(&self) -> String {
        self.allowed_resources.join(",")
    }

    pub fn is_allowed_resource(&self, resource: &str) -> bool {
        self.allowed_resources.iter().any(|r| r == resource)
    }

    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the configuration through `lookup` (variable name to value).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let mut config = Self::new(
            required(REALM_PUBLIC_KEY_ENV)?,
            &required(ALLOWED_RESOURCES_ENV)?,
            required(CLIENT_ID_ENV)?.trim(),
        );

        if let Some(value) = lookup(LOAD_USER_FROM_DATABASE_ENV) {
            config.load_user_from_database = parse_bool(LOAD_USER_FROM_DATABASE_ENV, &value)?;
        }
        if let Some(value) = lookup(APPEND_DECODED_TOKEN_ENV) {
            config.append_decoded_token = parse_bool(APPEND_DECODED_TOKEN_ENV, &value)?;
        }
        if let Some(value) = lookup(LEEWAY_SECONDS_ENV) {
            config.leeway = value.trim().parse().map_err(|_| ConfigError::InvalidValue {
                name: LEEWAY_SECONDS_ENV,
                value,
            })?;
        }
        config.user_provider_custom_retrieve_method = lookup(CUSTOM_RETRIEVE_METHOD_ENV)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        Ok(config)
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_bool(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            name,
            value: value.to_string(),
        }),
    }
}
