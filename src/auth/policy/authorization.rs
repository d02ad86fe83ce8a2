// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authorization policy.
//!
//! | Rule | Holds when |
//! |------|------------|
//! | `rule_any` | `input.Roles` contains `ADMIN` or `USER` |
//! | `rule_admin_only` | `input.Roles` contains `ADMIN` |
//! | `rule_user_only` | `input.Roles` contains `USER` |
//! | `rule_admin_or_subject` | `ADMIN`, or `USER` with `input.UserID == input.Subject` |
//!
//! Every rule defaults to `false` when its input fields are missing.

use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use super::{input_str, PolicyDocument, Rule, PACKAGE};
use crate::auth::roles::Role;

pub const RULE_ANY: &str = "rule_any";
pub const RULE_ADMIN_ONLY: &str = "rule_admin_only";
pub const RULE_USER_ONLY: &str = "rule_user_only";
pub const RULE_ADMIN_OR_SUBJECT: &str = "rule_admin_or_subject";

/// Authorization policy document.
pub static AUTHORIZATION: PolicyDocument = PolicyDocument {
    name: "authorization.rego",
    package: PACKAGE,
    rules: &[
        Rule {
            name: RULE_ANY,
            eval: rule_any,
        },
        Rule {
            name: RULE_ADMIN_ONLY,
            eval: rule_admin_only,
        },
        Rule {
            name: RULE_USER_ONLY,
            eval: rule_user_only,
        },
        Rule {
            name: RULE_ADMIN_OR_SUBJECT,
            eval: rule_admin_or_subject,
        },
    ],
};

/// Input document for the authorization rules.
#[derive(Debug, Serialize)]
pub struct AuthorizationInput<'a> {
    #[serde(rename = "Roles")]
    pub roles: &'a [String],
    #[serde(rename = "Subject")]
    pub subject: &'a str,
    #[serde(rename = "UserID")]
    pub user_id: Uuid,
}

fn has_role(input: &Value, role: Role) -> bool {
    input
        .get("Roles")
        .and_then(Value::as_array)
        .is_some_and(|roles| roles.iter().any(|r| r.as_str() == Some(role.as_str())))
}

fn rule_any(input: &Value) -> Result<Value, String> {
    Ok(Value::Bool(
        has_role(input, Role::Admin) || has_role(input, Role::User),
    ))
}

fn rule_admin_only(input: &Value) -> Result<Value, String> {
    Ok(Value::Bool(has_role(input, Role::Admin)))
}

fn rule_user_only(input: &Value) -> Result<Value, String> {
    Ok(Value::Bool(has_role(input, Role::User)))
}

fn rule_admin_or_subject(input: &Value) -> Result<Value, String> {
    if has_role(input, Role::Admin) {
        return Ok(Value::Bool(true));
    }

    let is_subject = match (input_str(input, "UserID"), input_str(input, "Subject")) {
        (Some(user_id), Some(subject)) => user_id == subject,
        _ => false,
    };
    Ok(Value::Bool(has_role(input, Role::User) && is_subject))
}
