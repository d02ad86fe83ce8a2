// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication and authorization errors.
//!
//! The core only returns errors; it never logs. Each variant keeps its cause
//! in the `source()` chain so the HTTP layer can log the full chain and pick
//! the status to present.

use super::keys::KeyError;
use super::policy::PolicyError;
use super::token::TokenParseError;
use crate::store::LookupError;

/// Broad classification of an [`AuthError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorKind {
    /// Bad header shape, unparseable token, missing or malformed `kid`
    MalformedInput,
    /// No key could be produced for the token's `kid`
    KeyResolution,
    /// The evaluator failed or the policy denied the request
    PolicyEvaluation,
    /// Subject unknown or account disabled
    UserDisabled,
    /// Token could not be signed
    Signing,
}

/// Authentication error type.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Authorization value is not exactly `Bearer <token>`
    #[error("expected authorization header format: Bearer <token>")]
    InvalidAuthHeader,

    /// Token could not be decoded
    #[error("error parsing token: {0}")]
    MalformedToken(#[from] TokenParseError),

    /// Token header has no `kid`
    #[error("kid missing from header")]
    MissingKid,

    /// Token header `kid` is not a string
    #[error("kid malformed")]
    MalformedKid,

    /// Verification key lookup failed
    #[error("failed to fetch public key: {0}")]
    KeyLookup(#[source] KeyError),

    /// Authentication policy denied the token or could not be evaluated
    #[error("authentication failed : {0}")]
    AuthenticationFailed(#[source] PolicyError),

    /// Liveness check rejected the subject
    #[error("user not enabled : {0}")]
    UserNotEnabled(#[source] UserCheckError),

    /// Authorization policy denied the request or could not be evaluated
    #[error("authorization failed : {0}")]
    AuthorizationFailed(#[source] PolicyError),

    /// Claims handed to token generation are not usable
    #[error("invalid claims: {0}")]
    InvalidClaims(&'static str),

    /// Signing failed; details are only available through `source()`
    #[error("failed to sign token")]
    Signing(#[source] SigningError),
}

impl AuthError {
    /// Classify this error.
    pub fn kind(&self) -> AuthErrorKind {
        match self {
            AuthError::InvalidAuthHeader
            | AuthError::MalformedToken(_)
            | AuthError::MissingKid
            | AuthError::MalformedKid => AuthErrorKind::MalformedInput,
            AuthError::KeyLookup(_) => AuthErrorKind::KeyResolution,
            AuthError::AuthenticationFailed(_) | AuthError::AuthorizationFailed(_) => {
                AuthErrorKind::PolicyEvaluation
            }
            AuthError::UserNotEnabled(_) => AuthErrorKind::UserDisabled,
            AuthError::InvalidClaims(_) | AuthError::Signing(_) => AuthErrorKind::Signing,
        }
    }

    /// Whether this is a server fault rather than a rejected client credential.
    pub fn is_internal(&self) -> bool {
        self.kind() == AuthErrorKind::Signing
    }

    /// Whether the policy engine itself failed, as opposed to computing a deny.
    ///
    /// Both cases surface identically to callers; this exists for logging.
    pub fn is_policy_fault(&self) -> bool {
        match self {
            AuthError::AuthenticationFailed(e) | AuthError::AuthorizationFailed(e) => {
                e.is_evaluation_fault()
            }
            _ => false,
        }
    }
}

/// Reasons the liveness check rejects a subject.
#[derive(Debug, thiserror::Error)]
pub enum UserCheckError {
    #[error("parse user: {0}")]
    Parse(#[source] uuid::Error),

    #[error("query user: {0}")]
    Query(#[source] LookupError),

    #[error("user disabled")]
    Disabled,
}

/// Causes of a signing failure.
#[derive(Debug, thiserror::Error)]
pub enum SigningError {
    #[error("private key: {0}")]
    Key(#[source] KeyError),

    #[error("parse private key: {0}")]
    KeyFormat(#[source] jsonwebtoken::errors::Error),

    #[error("encode token: {0}")]
    Encode(#[source] jsonwebtoken::errors::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn header_error_message_is_exact() {
        assert_eq!(
            AuthError::InvalidAuthHeader.to_string(),
            "expected authorization header format: Bearer <token>"
        );
        assert_eq!(AuthError::InvalidAuthHeader.kind(), AuthErrorKind::MalformedInput);
    }

    #[test]
    fn signing_error_hides_detail() {
        let err = AuthError::Signing(SigningError::Key(KeyError::NotFound("kid-1".into())));
        assert_eq!(err.to_string(), "failed to sign token");
        assert!(err.is_internal());
        let source = err.source().expect("signing error keeps its cause");
        assert!(source.to_string().contains("kid-1"));
    }

    #[test]
    fn disabled_user_is_not_internal() {
        let err = AuthError::UserNotEnabled(UserCheckError::Disabled);
        assert_eq!(err.to_string(), "user not enabled : user disabled");
        assert_eq!(err.kind(), AuthErrorKind::UserDisabled);
        assert!(!err.is_internal());
    }

    #[test]
    fn policy_fault_is_distinguished_from_deny() {
        let deny = AuthError::AuthorizationFailed(PolicyError::Denied {
            results: "[]".into(),
            ok: true,
        });
        let fault = AuthError::AuthorizationFailed(PolicyError::Query("boom".into()));
        assert!(!deny.is_policy_fault());
        assert!(fault.is_policy_fault());
        assert_eq!(deny.kind(), fault.kind());
    }
}
