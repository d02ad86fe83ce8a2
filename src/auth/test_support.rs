// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared fixtures for auth tests.

use std::sync::Arc;

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};

use super::{Auth, AuthConfig, Claims, KeyStore};
use crate::store::UserLookup;

pub const KID: &str = "54bb2165-71e1-41a6-af3e-7da4a0e1e2c1";
pub const ISSUER: &str = "service project";

pub const PRIVATE_KEY_PEM: &str =
    include_str!("../../testdata/keys/54bb2165-71e1-41a6-af3e-7da4a0e1e2c1.pem");
pub const PUBLIC_KEY_PEM: &str = include_str!("../../testdata/public.pem");
pub const FOREIGN_PUBLIC_KEY_PEM: &str = include_str!("../../testdata/foreign_public.pem");

pub fn key_store() -> KeyStore {
    KeyStore::new()
        .with_private_key(KID, PRIVATE_KEY_PEM)
        .expect("fixture key is valid")
        .with_public_key("foreign", FOREIGN_PUBLIC_KEY_PEM)
}

pub fn auth(users: Option<Arc<dyn UserLookup>>) -> Auth {
    Auth::new(AuthConfig {
        key_lookup: Arc::new(key_store()),
        users,
        issuer: ISSUER.to_string(),
        active_kid: KID.to_string(),
    })
}

/// Sign `claims` with the fixture key and an arbitrary header.
pub fn sign_with_header(header: &Header, claims: &Claims) -> String {
    let key = EncodingKey::from_rsa_pem(PRIVATE_KEY_PEM.as_bytes()).expect("fixture key is valid");
    encode(header, claims, &key).expect("fixture token encodes")
}

/// Sign `claims` with the fixture key under [`KID`].
pub fn signed_token(claims: &Claims) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(KID.to_string());
    sign_with_header(&header, claims)
}
