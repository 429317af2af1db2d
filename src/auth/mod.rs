// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Bearer token authentication against an external identity provider, with
//! client-scoped roles and route-level role checks.
//!
//! ## Auth Flow
//!
//! 1. Client sends `Authorization: Bearer <JWT>`
//! 2. The guard:
//!    - Verifies the RS256 signature against the realm public key
//!    - Checks `exp` / `nbf`
//!    - Requires `resource_access` to name at least one allowed resource
//!    - Extracts `resource_access[client_id].roles`
//!    - Resolves the user through the configured `UserProvider`
//! 3. `RoleAccessPolicy` middleware compares the user's roles with the
//!    route's guard expression (`admin|auditor`)
//!
//! ## Security
//!
//! - Only RS256 is accepted
//! - The verification key is derived once at startup and shared read-only
//! - A request without a token is anonymous, never an error; protected
//!   routes reject it

pub mod claims;
pub mod error;
pub mod guard;
pub mod identity;
pub mod key;
pub mod middleware;
pub mod provider;
pub mod token;

#[cfg(test)]
pub(crate) mod test_support;

pub use claims::{Credentials, DecodedClaims, ResolvedRoles, ResourceAccess};
pub use error::AuthError;
pub use guard::{bearer_token, AuthContext, Authenticated};
pub use identity::UserIdentity;
pub use key::{build_public_key, VerificationKey};
pub use middleware::{enforce_roles, GuardExpression, RoleAccessPolicy};
pub use provider::{
    ClaimsUserProvider, InMemoryUserProvider, RetrievalMethod, UserProvider, UserRecord,
    UserResolver, RETRIEVE_BY_USERNAME,
};
