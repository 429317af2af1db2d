// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! RS256 token verification.

use jsonwebtoken::{decode as jwt_decode, Algorithm, Validation};

use super::claims::DecodedClaims;
use super::error::AuthError;
use super::key::VerificationKey;

/// Verify `token` against `key` and return its claims.
///
/// An absent or empty token is not an error: it yields `Ok(None)` and the
/// request proceeds anonymously. Only RS256 is accepted. `exp` and `nbf` are
/// checked when present, with `leeway` seconds of clock skew; issuer and
/// audience are not checked here (resource scoping is done by the guard).
pub fn decode(
    token: Option<&str>,
    key: &VerificationKey,
    leeway: u64,
) -> Result<Option<DecodedClaims>, AuthError> {
    let Some(token) = token.filter(|t| !t.is_empty()) else {
        return Ok(None);
    };

    let mut validation = Validation::new(Algorithm::RS256);
    validation.algorithms = vec![Algorithm::RS256];
    validation.leeway = leeway;
    validation.validate_nbf = true;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let token_data = jwt_decode::<DecodedClaims>(token, key.decoding_key(), &validation)
        .map_err(|e| AuthError::Token(e.to_string()))?;

    Ok(Some(token_data.claims))
}

/// Like [`decode`], building the key from a bare realm key body first.
///
/// Malformed key material is reported as [`AuthError::Token`]. Services
/// should build a [`VerificationKey`] once at startup instead.
pub fn decode_with_realm_key(
    token: Option<&str>,
    realm_public_key: &str,
    leeway: u64,
) -> Result<Option<DecodedClaims>, AuthError> {
    if token.is_none_or(str::is_empty) {
        return Ok(None);
    }
    let key = VerificationKey::from_realm_key(realm_public_key)?;
    decode(token, &key, leeway)
}
