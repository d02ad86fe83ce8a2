// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token generation, authentication and authorization.
//!
//! Authentication: you are who you say you are.
//! Authorization: you have permission to do what you are requesting to do.

use std::sync::Arc;

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::Value;
use uuid::Uuid;

use super::error::{AuthError, SigningError, UserCheckError};
use super::keys::{KeyError, KeyLookup, KeyStore};
use super::policy::authentication::{AuthenticationInput, RULE_AUTHENTICATE};
use super::policy::authorization::AuthorizationInput;
use super::policy::{PolicyEvaluator, AUTHENTICATION, AUTHORIZATION};
use super::token::UnverifiedToken;
use super::Claims;
use crate::config::AuthSettings;
use crate::store::UserLookup;

/// Information required to build an [`Auth`].
#[derive(Clone)]
pub struct AuthConfig {
    /// Resolves signing and verification keys
    pub key_lookup: Arc<dyn KeyLookup>,
    /// Liveness check source; `None` skips the check
    pub users: Option<Arc<dyn UserLookup>>,
    /// Issuer expected on every token
    pub issuer: String,
    /// Key id written into the header of generated tokens
    pub active_kid: String,
}

/// Generates tokens for a set of claims and recreates the claims by
/// verifying a token.
///
/// Holds no mutable state; share it behind an `Arc`.
#[derive(Clone)]
pub struct Auth {
    key_lookup: Arc<dyn KeyLookup>,
    users: Option<Arc<dyn UserLookup>>,
    evaluator: PolicyEvaluator,
    issuer: String,
    active_kid: String,
}

impl Auth {
    pub fn new(cfg: AuthConfig) -> Self {
        Self {
            key_lookup: cfg.key_lookup,
            users: cfg.users,
            evaluator: PolicyEvaluator::new(),
            issuer: cfg.issuer,
            active_kid: cfg.active_kid,
        }
    }

    /// Build from settings, loading the signing keys from `keys_dir`.
    pub fn from_settings(
        settings: &AuthSettings,
        users: Option<Arc<dyn UserLookup>>,
    ) -> Result<Self, KeyError> {
        let keys = KeyStore::load_rsa_keys(&settings.keys_dir)?;
        Ok(Self::new(AuthConfig {
            key_lookup: Arc::new(keys),
            users,
            issuer: settings.issuer.clone(),
            active_kid: settings.active_kid.clone(),
        }))
    }

    /// The configured issuer used to authenticate tokens.
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn active_kid(&self) -> &str {
        &self.active_kid
    }

    /// Sign `claims` with the active key.
    pub fn generate_token(&self, claims: &Claims) -> Result<String, AuthError> {
        claims.validate().map_err(AuthError::InvalidClaims)?;

        let pem = self
            .key_lookup
            .private_key(&self.active_kid)
            .map_err(|e| AuthError::Signing(SigningError::Key(e)))?;
        let key = EncodingKey::from_rsa_pem(pem.as_bytes())
            .map_err(|e| AuthError::Signing(SigningError::KeyFormat(e)))?;

        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(self.active_kid.clone());

        encode(&header, claims, &key).map_err(|e| AuthError::Signing(SigningError::Encode(e)))
    }

    /// Validate an `Authorization` header value and return the claims it carries.
    ///
    /// Steps run in order and stop at the first failure:
    /// 1. header must be exactly `Bearer <token>`
    /// 2. token is decoded without verification to read claims and `kid`
    /// 3. the public key for `kid` is resolved
    /// 4. the authentication policy verifies signature, issuer and expiry
    /// 5. the subject must exist and be enabled (only with a user lookup)
    pub async fn authenticate(&self, bearer_token: &str) -> Result<Claims, AuthError> {
        let parts: Vec<&str> = bearer_token.split(' ').collect();
        let token = match parts.as_slice() {
            ["Bearer", token] => *token,
            _ => return Err(AuthError::InvalidAuthHeader),
        };

        let unverified = UnverifiedToken::parse(token)?;

        let kid = match unverified.kid() {
            None => return Err(AuthError::MissingKid),
            Some(Value::String(kid)) => kid.as_str(),
            Some(_) => return Err(AuthError::MalformedKid),
        };

        let pem = self.key_lookup.public_key(kid).map_err(AuthError::KeyLookup)?;

        let input = AuthenticationInput {
            key: &pem,
            token,
            issuer: &self.issuer,
        };
        self.evaluator
            .evaluate_input(&AUTHENTICATION, RULE_AUTHENTICATE, &input)
            .map_err(AuthError::AuthenticationFailed)?;

        self.ensure_user_enabled(&unverified.claims)
            .await
            .map_err(AuthError::UserNotEnabled)?;

        Ok(unverified.claims)
    }

    /// Authorize `claims` against `rule` for a resource owned by `resource_owner`.
    pub fn authorize(
        &self,
        claims: &Claims,
        resource_owner: Uuid,
        rule: &str,
    ) -> Result<(), AuthError> {
        let input = AuthorizationInput {
            roles: &claims.roles,
            subject: &claims.subject,
            user_id: resource_owner,
        };

        self.evaluator
            .evaluate_input(&AUTHORIZATION, rule, &input)
            .map_err(AuthError::AuthorizationFailed)
    }

    /// Check the subject's account is still enabled. Skipped when no user
    /// lookup was configured.
    async fn ensure_user_enabled(&self, claims: &Claims) -> Result<(), UserCheckError> {
        let Some(users) = &self.users else {
            return Ok(());
        };

        let user_id = claims.subject_id().map_err(UserCheckError::Parse)?;
        let usr = users
            .query_by_id(user_id)
            .await
            .map_err(UserCheckError::Query)?;

        if !usr.enabled {
            return Err(UserCheckError::Disabled);
        }
        Ok(())
    }
}
