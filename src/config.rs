// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Environment variable names and defaults. Configuration is read from the
//! environment at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `AUTH_ISSUER` | Issuer stamped into and expected from tokens | `service project` |
//! | `AUTH_ACTIVE_KID` | Key id used to sign new tokens | `54bb2165-71e1-41a6-af3e-7da4a0e1e2c1` |
//! | `AUTH_KEYS_DIR` | Directory of `<kid>.pem` RSA private keys | `zarf/keys` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info` |

use std::path::PathBuf;

pub const AUTH_ISSUER_ENV: &str = "AUTH_ISSUER";
pub const AUTH_ACTIVE_KID_ENV: &str = "AUTH_ACTIVE_KID";
pub const AUTH_KEYS_DIR_ENV: &str = "AUTH_KEYS_DIR";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_ISSUER: &str = "service project";
pub const DEFAULT_ACTIVE_KID: &str = "54bb2165-71e1-41a6-af3e-7da4a0e1e2c1";
pub const DEFAULT_KEYS_DIR: &str = "zarf/keys";

/// Default tracing filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Settings needed to build [`crate::auth::Auth`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSettings {
    pub issuer: String,
    pub active_kid: String,
    pub keys_dir: PathBuf,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            issuer: DEFAULT_ISSUER.to_string(),
            active_kid: DEFAULT_ACTIVE_KID.to_string(),
            keys_dir: PathBuf::from(DEFAULT_KEYS_DIR),
        }
    }
}

impl AuthSettings {
    /// Read settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read settings through `lookup`; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Self {
            issuer: get(AUTH_ISSUER_ENV).unwrap_or(defaults.issuer),
            active_kid: get(AUTH_ACTIVE_KID_ENV).unwrap_or(defaults.active_kid),
            keys_dir: get(AUTH_KEYS_DIR_ENV)
                .map(PathBuf::from)
                .unwrap_or(defaults.keys_dir),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_when_unset() {
        let settings = AuthSettings::from_lookup(|_| None);
        assert_eq!(settings, AuthSettings::default());
    }

    #[test]
    fn reads_overrides_and_ignores_blank() {
        let env: HashMap<&str, &str> = HashMap::from([
            (AUTH_ISSUER_ENV, "https://auth.example.com"),
            (AUTH_ACTIVE_KID_ENV, "  "),
            (AUTH_KEYS_DIR_ENV, "/etc/keys"),
        ]);
        let settings = AuthSettings::from_lookup(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(settings.issuer, "https://auth.example.com");
        assert_eq!(settings.active_kid, DEFAULT_ACTIVE_KID);
        assert_eq!(settings.keys_dir, PathBuf::from("/etc/keys"));
    }
}
