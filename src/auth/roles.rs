// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Role names granted to a subject at token issuance.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Roles known to the authorization policy.
///
/// Claims carry roles as plain strings; this enum is the typed view used when
/// building claims and by the authorization rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// Administrative access to every resource
    Admin,
    /// Regular account, may act on its own resources
    User,
}

impl Role {
    /// Wire name of the role as it appears in the `roles` claim.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::User => "USER",
        }
    }

    /// Convert a list of roles into the string form stored in claims.
    pub fn to_strings(roles: &[Role]) -> Vec<String> {
        roles.iter().map(|r| r.as_str().to_string()).collect()
    }
}

/// Error returned when a role name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid role {0:?}")]
pub struct ParseRoleError(pub String);

impl FromStr for Role {
    type Err = ParseRoleError;

    /// Role names are matched exactly; the policy compares them case-sensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN" => Ok(Role::Admin),
            "USER" => Ok(Role::User),
            other => Err(ParseRoleError(other.to_string())),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_str_is_case_sensitive() {
        assert_eq!("ADMIN".parse::<Role>(), Ok(Role::Admin));
        assert_eq!("USER".parse::<Role>(), Ok(Role::User));
        assert!("admin".parse::<Role>().is_err());
        assert!("SUPPORT".parse::<Role>().is_err());
    }

    #[test]
    fn to_strings_preserves_order() {
        let roles = Role::to_strings(&[Role::User, Role::Admin]);
        assert_eq!(roles, vec!["USER".to_string(), "ADMIN".to_string()]);
    }

    #[test]
    fn serde_uses_wire_names() {
        let json = serde_json::to_string(&Role::Admin).unwrap();
        assert_eq!(json, r#""ADMIN""#);
        let role: Role = serde_json::from_str(r#""USER""#).unwrap();
        assert_eq!(role, Role::User);
    }
}
