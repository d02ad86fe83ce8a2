// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Unverified token decoding.
//!
//! Reads the header and claims of a compact token without checking the
//! signature. Verification happens later in the authentication policy.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde_json::{Map, Value};

use super::claims::Claims;

/// Errors decoding the compact token structure.
#[derive(Debug, thiserror::Error)]
pub enum TokenParseError {
    #[error("token contains an invalid number of segments: {0}")]
    Segments(usize),

    #[error("segment is not base64url: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("segment is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Header and claims read from a token whose signature has not been checked.
#[derive(Debug, Clone)]
pub struct UnverifiedToken {
    pub header: Map<String, Value>,
    pub claims: Claims,
}

impl UnverifiedToken {
    /// Decode `token` without verifying its signature.
    pub fn parse(token: &str) -> Result<Self, TokenParseError> {
        let segments: Vec<&str> = token.split('.').collect();
        let [header, payload, _signature] = segments.as_slice() else {
            return Err(TokenParseError::Segments(segments.len()));
        };

        let header: Map<String, Value> = serde_json::from_slice(&URL_SAFE_NO_PAD.decode(header)?)?;
        let claims: Claims = serde_json::from_slice(&URL_SAFE_NO_PAD.decode(payload)?)?;

        Ok(Self { header, claims })
    }

    /// Raw `kid` header value, if present.
    pub fn kid(&self) -> Option<&Value> {
        self.header.get("kid")
    }
}
