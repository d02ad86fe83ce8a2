// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Signing and verification key lookup.
//!
//! Auth only depends on the [`KeyLookup`] trait. [`KeyStore`] is an in-memory
//! implementation that can be filled from a directory of `<kid>.pem` files.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::{DecodePrivateKey, EncodePublicKey, LineEnding};
use rsa::{RsaPrivateKey, RsaPublicKey};

/// Resolves PEM encoded keys by key id.
pub trait KeyLookup: Send + Sync {
    /// PEM encoded private key used to sign tokens.
    fn private_key(&self, kid: &str) -> Result<String, KeyError>;

    /// PEM encoded public key used to verify tokens.
    fn public_key(&self, kid: &str) -> Result<String, KeyError>;
}

/// Key lookup errors.
#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error("key {0} not found")]
    NotFound(String),

    #[error("private key for {0} not available")]
    NoPrivateKey(String),

    #[error("invalid RSA private key for {kid}: {reason}")]
    InvalidKey { kid: String, reason: String },

    #[error("reading keys: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
struct KeyPair {
    private_pem: Option<String>,
    public_pem: String,
}

/// In-memory key store.
#[derive(Debug, Clone, Default)]
pub struct KeyStore {
    keys: HashMap<String, KeyPair>,
}

impl KeyStore {
    /// Create an empty key store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an RSA private key (PKCS#8 or PKCS#1 PEM); the public key is derived.
    pub fn with_private_key(
        mut self,
        kid: impl Into<String>,
        private_pem: impl Into<String>,
    ) -> Result<Self, KeyError> {
        let kid = kid.into();
        let private_pem = private_pem.into();
        let public_pem = derive_public_pem(&kid, &private_pem)?;
        self.keys.insert(
            kid,
            KeyPair {
                private_pem: Some(private_pem),
                public_pem,
            },
        );
        Ok(self)
    }

    /// Add a verification-only public key.
    pub fn with_public_key(mut self, kid: impl Into<String>, public_pem: impl Into<String>) -> Self {
        self.keys.insert(
            kid.into(),
            KeyPair {
                private_pem: None,
                public_pem: public_pem.into(),
            },
        );
        self
    }

    /// Load every `*.pem` private key in `dir`, keyed by file stem.
    pub fn load_rsa_keys(dir: impl AsRef<Path>) -> Result<Self, KeyError> {
        let mut store = Self::new();
        for entry in fs::read_dir(dir.as_ref())? {
            let path = entry?.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("pem") {
                continue;
            }
            let Some(kid) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let pem = fs::read_to_string(&path)?;
            store = store.with_private_key(kid.to_string(), pem)?;
        }
        Ok(store)
    }

    /// Number of keys held.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl KeyLookup for KeyStore {
    fn private_key(&self, kid: &str) -> Result<String, KeyError> {
        let pair = self
            .keys
            .get(kid)
            .ok_or_else(|| KeyError::NotFound(kid.to_string()))?;
        pair.private_pem
            .clone()
            .ok_or_else(|| KeyError::NoPrivateKey(kid.to_string()))
    }

    fn public_key(&self, kid: &str) -> Result<String, KeyError> {
        self.keys
            .get(kid)
            .map(|pair| pair.public_pem.clone())
            .ok_or_else(|| KeyError::NotFound(kid.to_string()))
    }
}

fn derive_public_pem(kid: &str, private_pem: &str) -> Result<String, KeyError> {
    let invalid = |reason: String| KeyError::InvalidKey {
        kid: kid.to_string(),
        reason,
    };

    let private = RsaPrivateKey::from_pkcs8_pem(private_pem)
        .or_else(|_| RsaPrivateKey::from_pkcs1_pem(private_pem))
        .map_err(|e| invalid(e.to_string()))?;

    RsaPublicKey::from(&private)
        .to_public_key_pem(LineEnding::LF)
        .map_err(|e| invalid(e.to_string()))
}
