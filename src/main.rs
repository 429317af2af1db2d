// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{env, net::SocketAddr, sync::Arc};

use sso_token_guard::{
    api::router,
    auth::{ClaimsUserProvider, InMemoryUserProvider, UserProvider, UserRecord},
    config::{
        AuthConfig, DEFAULT_HOST, DEFAULT_LOG_FILTER, DEFAULT_PORT, HOST_ENV, LOG_FORMAT_ENV,
        PORT_ENV, SEED_USER_ENV,
    },
    state::AppState,
};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let json = env::var(LOG_FORMAT_ENV).is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

fn user_provider(config: &AuthConfig) -> Arc<dyn UserProvider> {
    if !config.load_user_from_database {
        return Arc::new(ClaimsUserProvider);
    }

    let directory = InMemoryUserProvider::new();
    if let Ok(seed) = env::var(SEED_USER_ENV) {
        match seed.split(',').map(str::trim).collect::<Vec<_>>().as_slice() {
            [id, username, role] => {
                directory.insert(UserRecord::new(*id, *username).with_role(*role, &[]));
            }
            _ => warn!(value = %seed, "Ignoring malformed {SEED_USER_ENV}"),
        }
    }
    info!(users = directory.len(), "Using in-memory user directory");
    Arc::new(directory)
}

#[tokio::main]
async fn main() {
    init_tracing();

    let config = AuthConfig::from_env().expect("Invalid SSO configuration");
    info!(
        client_id = %config.client_id,
        allowed_resources = %config.allowed_resources_list(),
        load_user_from_database = config.load_user_from_database,
        "Loaded token guard configuration"
    );

    let provider = user_provider(&config);
    let state = AppState::new(config, provider).expect("Failed to initialize token guard");
    let app = router(state);

    // Parse bind address
    let host = env::var(HOST_ENV).unwrap_or_else(|_| DEFAULT_HOST.to_string());
    let port: u16 = env::var(PORT_ENV)
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT);

    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .expect("Failed to parse bind address");

    info!("Token guard listening on http://{addr} (docs at /docs)");

    axum_server::bind(addr)
        .serve(app.into_make_service())
        .await
        .expect("HTTP server failed");
}
