// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication policy.
//!
//! Rule `auth` holds when `input.Token` carries a valid RS256 signature for
//! `input.Key`, was issued by `input.Issuer` and has not expired.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Serialize;
use serde_json::Value;

use super::{input_str, PolicyDocument, Rule, PACKAGE};

/// Name of the authentication rule.
pub const RULE_AUTHENTICATE: &str = "auth";

/// Authentication policy document.
pub static AUTHENTICATION: PolicyDocument = PolicyDocument {
    name: "authentication.rego",
    package: PACKAGE,
    rules: &[Rule {
        name: RULE_AUTHENTICATE,
        eval: auth,
    }],
};

/// Input document for [`RULE_AUTHENTICATE`].
#[derive(Debug, Serialize)]
pub struct AuthenticationInput<'a> {
    #[serde(rename = "Key")]
    pub key: &'a str,
    #[serde(rename = "Token")]
    pub token: &'a str,
    #[serde(rename = "Issuer")]
    pub issuer: &'a str,
}

fn auth(input: &Value) -> Result<Value, String> {
    let (Some(key), Some(token), Some(issuer)) = (
        input_str(input, "Key"),
        input_str(input, "Token"),
        input_str(input, "Issuer"),
    ) else {
        return Ok(Value::Bool(false));
    };

    let key = DecodingKey::from_rsa_pem(key.as_bytes()).map_err(|e| format!("verification key: {e}"))?;

    let mut validation = Validation::new(Algorithm::RS256);
    validation.leeway = 0;
    validation.validate_aud = false;
    validation.set_issuer(&[issuer]);
    validation.set_required_spec_claims(&["exp", "iss"]);

    Ok(Value::Bool(decode::<Value>(token, &key, &validation).is_ok()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::policy::{PolicyError, PolicyEvaluator};
    use crate::auth::test_support::{signed_token, FOREIGN_PUBLIC_KEY_PEM, ISSUER, PUBLIC_KEY_PEM};
    use crate::auth::{Claims, Role};
    use chrono::Duration;
    use uuid::Uuid;

    fn evaluate(key: &str, token: &str, issuer: &str) -> Result<(), PolicyError> {
        let input = serde_json::to_value(AuthenticationInput { key, token, issuer }).unwrap();
        PolicyEvaluator::new().evaluate(&AUTHENTICATION, RULE_AUTHENTICATE, &input)
    }

    fn claims(ttl: Duration) -> Claims {
        Claims::new(Uuid::new_v4(), ISSUER, &[Role::User], ttl)
    }

    #[test]
    fn accepts_valid_token() {
        let token = signed_token(&claims(Duration::hours(1)));
        assert!(evaluate(PUBLIC_KEY_PEM, &token, ISSUER).is_ok());
    }

    #[test]
    fn rejects_wrong_issuer() {
        let token = signed_token(&claims(Duration::hours(1)));
        let err = evaluate(PUBLIC_KEY_PEM, &token, "someone else").unwrap_err();
        assert!(matches!(err, PolicyError::Denied { ok: true, .. }));
    }

    #[test]
    fn rejects_foreign_key() {
        let token = signed_token(&claims(Duration::hours(1)));
        assert!(evaluate(FOREIGN_PUBLIC_KEY_PEM, &token, ISSUER).is_err());
    }

    #[test]
    fn rejects_expired_token() {
        let mut expired = claims(Duration::hours(1));
        expired.issued_at = expired.issued_at - Duration::hours(2);
        expired.expires_at = expired.issued_at + Duration::hours(1);
        let token = signed_token(&expired);
        assert!(evaluate(PUBLIC_KEY_PEM, &token, ISSUER).is_err());
    }

    #[test]
    fn missing_input_defaults_to_deny() {
        let err = PolicyEvaluator::new()
            .evaluate(&AUTHENTICATION, RULE_AUTHENTICATE, &serde_json::json!({}))
            .unwrap_err();
        assert!(matches!(err, PolicyError::Denied { ok: true, .. }));
    }

    #[test]
    fn unparseable_key_is_an_evaluation_fault() {
        let token = signed_token(&claims(Duration::hours(1)));
        let err = evaluate("not a key", &token, ISSUER).unwrap_err();
        assert!(err.is_evaluation_fault());
    }
}
