// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! SSO Token Guard - bearer token authentication for axum services
//!
//! Verifies RS256 tokens issued by an external identity provider, maps the
//! client-scoped roles of the token onto an application user and enforces
//! role requirements on routes.
//!
//! ## Modules
//!
//! - `api` - Demonstration HTTP API (Axum)
//! - `auth` - Token verification, guard, user resolution and role policy
//! - `config` - Guard configuration
//! - `state` - Shared application state

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod state;
