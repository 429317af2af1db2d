// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Realm public key handling.
//!
//! Identity providers publish the realm signing key as a bare base64
//! SubjectPublicKeyInfo body (no PEM armour, no line breaks). This module
//! turns that value into a `DecodingKey` usable for RS256 verification.

use std::fmt;

use jsonwebtoken::DecodingKey;

use super::error::AuthError;

const PEM_HEADER: &str = "-----BEGIN PUBLIC KEY-----";
const PEM_FOOTER: &str = "-----END PUBLIC KEY-----";

/// PEM body line width.
const PEM_LINE_WIDTH: usize = 64;

/// Wrap a bare base64 key body in PEM armour with 64-column lines.
///
/// Surrounding whitespace is ignored. The body is not decoded here; invalid
/// base64 surfaces when the PEM is parsed by [`VerificationKey::from_realm_key`].
pub fn build_public_key(key: &str) -> String {
    let body: Vec<char> = key.trim().chars().collect();

    let mut pem = String::with_capacity(body.len() + body.len() / PEM_LINE_WIDTH + 64);
    pem.push_str(PEM_HEADER);
    pem.push('\n');
    for line in body.chunks(PEM_LINE_WIDTH) {
        pem.extend(line);
        pem.push('\n');
    }
    pem.push_str(PEM_FOOTER);
    pem
}

/// Public key used to verify token signatures.
///
/// Built once per configuration load and shared read-only by every request.
#[derive(Clone)]
pub struct VerificationKey {
    decoding_key: DecodingKey,
}

impl VerificationKey {
    /// Build a verification key from the configured realm public key body.
    pub fn from_realm_key(key: &str) -> Result<Self, AuthError> {
        let pem = build_public_key(key);
        let decoding_key = DecodingKey::from_rsa_pem(pem.as_bytes())
            .map_err(|e| AuthError::Token(e.to_string()))?;
        Ok(Self { decoding_key })
    }

    pub(crate) fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }
}

impl fmt::Debug for VerificationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerificationKey").finish_non_exhaustive()
    }
}
