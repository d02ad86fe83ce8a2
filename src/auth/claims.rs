// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWT claims asserted by a signed token.

use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::roles::Role;

/// Claims carried in the payload of a token.
///
/// Roles are a snapshot taken when the token is issued. Only the account's
/// enabled flag is re-checked against the live user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID, UUID string form)
    #[serde(rename = "sub")]
    pub subject: String,

    /// Issuing authority, matched against the configured issuer on verification
    #[serde(rename = "iss")]
    pub issuer: String,

    /// Issued at timestamp
    #[serde(rename = "iat", with = "chrono::serde::ts_seconds")]
    pub issued_at: DateTime<Utc>,

    /// Expiration timestamp
    #[serde(rename = "exp", with = "chrono::serde::ts_seconds")]
    pub expires_at: DateTime<Utc>,

    /// Role names granted to the subject
    #[serde(default)]
    pub roles: Vec<String>,
}

impl Claims {
    /// Build claims for `subject` valid for `ttl` from now.
    ///
    /// Timestamps are truncated to whole seconds so the value survives a
    /// trip through the token unchanged. Duplicate roles are dropped,
    /// keeping the first occurrence.
    pub fn new(subject: Uuid, issuer: impl Into<String>, roles: &[Role], ttl: Duration) -> Self {
        let issued_at = Utc::now().trunc_subsecs(0);
        let mut names: Vec<String> = Vec::with_capacity(roles.len());
        for role in Role::to_strings(roles) {
            if !names.contains(&role) {
                names.push(role);
            }
        }

        Self {
            subject: subject.to_string(),
            issuer: issuer.into(),
            issued_at,
            expires_at: issued_at + ttl,
            roles: names,
        }
    }

    /// Check the validity window is well formed.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.expires_at <= self.issued_at {
            return Err("expiration must be after issued at");
        }
        Ok(())
    }

    /// Check if the claims grant the named role.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Parse the subject as a user id.
    pub fn subject_id(&self) -> Result<Uuid, uuid::Error> {
        Uuid::parse_str(&self.subject)
    }
}
