// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Token issuance and verification plus role based authorization.
//!
//! ## Auth Flow
//!
//! 1. A trusted caller builds [`Claims`] and signs them with
//!    [`Auth::generate_token`] using the active key id
//! 2. Clients send `Authorization: Bearer <token>`
//! 3. [`Auth::authenticate`]:
//!    - reads the `kid` header and resolves the public key
//!    - runs the authentication policy (signature, `exp`, issuer)
//!    - optionally checks the subject is still enabled
//! 4. [`Auth::authorize`] evaluates a named rule against the claims and the
//!    owner of the requested resource
//!
//! ## Security
//!
//! - Tokens are RS256 only
//! - No clock skew tolerance on expiry
//! - Roles are taken from the token; only the enabled flag is live

pub mod claims;
pub mod error;
pub mod keys;
pub mod policy;
pub mod roles;
pub mod service;
pub mod token;

#[cfg(test)]
pub(crate) mod test_support;

pub use claims::Claims;
pub use error::{AuthError, AuthErrorKind};
pub use keys::{KeyError, KeyLookup, KeyStore};
pub use policy::authentication::RULE_AUTHENTICATE;
pub use policy::authorization::{
    RULE_ADMIN_ONLY, RULE_ADMIN_OR_SUBJECT, RULE_ANY, RULE_USER_ONLY,
};
pub use roles::Role;
pub use service::{Auth, AuthConfig};
