// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Policy Evaluation
//!
//! Policies are static documents made of named rules. A rule reads a JSON
//! input document and produces a value; a decision is an allow only when the
//! value bound by the query is boolean `true`.
//!
//! ## Query Shape
//!
//! Every evaluation runs the query `x = data.<package>.<rule>`:
//!
//! - rule not defined in the document: zero result sets, reported as `no results`
//! - rule fails to evaluate: `query: <reason>`
//! - binding is anything but `true`: `bindings results[<sets>] ok[<is bool>]`
//!
//! The last message embeds the raw result sets so callers can surface the
//! exact outcome in their own error text.

use serde::Serialize;
use serde_json::{Map, Value};

pub mod authentication;
pub mod authorization;

pub use authentication::AUTHENTICATION;
pub use authorization::AUTHORIZATION;

/// Package namespace shared by the embedded documents.
pub const PACKAGE: &str = "housi.rego";

/// Variable the query binds the rule value to.
const RESULT_VAR: &str = "x";

/// Compiled rule body.
pub type RuleFn = fn(&Value) -> Result<Value, String>;

/// A named rule inside a policy document.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub eval: RuleFn,
}

/// A static policy document.
#[derive(Debug)]
pub struct PolicyDocument {
    pub name: &'static str,
    pub package: &'static str,
    pub rules: &'static [Rule],
}

impl PolicyDocument {
    /// Look up a rule by name.
    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.name == name)
    }

    /// Query text for `rule` in this document.
    pub fn query(&self, rule: &str) -> String {
        format!("{RESULT_VAR} = data.{}.{rule}", self.package)
    }
}

/// Policy evaluation errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PolicyError {
    /// The rule could not be evaluated
    #[error("query: {0}")]
    Query(String),

    /// The query produced no result sets
    #[error("no results")]
    NoResults,

    /// The bound value was not boolean `true`
    #[error("bindings results[{results}] ok[{ok}]")]
    Denied { results: String, ok: bool },
}

impl PolicyError {
    /// Whether the evaluation itself failed rather than computing a deny.
    pub fn is_evaluation_fault(&self) -> bool {
        !matches!(self, PolicyError::Denied { .. })
    }
}

/// One set of variable bindings produced by a query.
pub type ResultSet = Map<String, Value>;

/// Evaluates rules from static policy documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct PolicyEvaluator;

impl PolicyEvaluator {
    pub fn new() -> Self {
        Self
    }

    /// Run the query for `rule` and return its result sets.
    pub fn query(
        &self,
        document: &PolicyDocument,
        rule: &str,
        input: &Value,
    ) -> Result<Vec<ResultSet>, PolicyError> {
        let Some(rule) = document.rule(rule) else {
            return Ok(Vec::new());
        };

        let value = (rule.eval)(input)
            .map_err(|reason| PolicyError::Query(format!("{}: {reason}", document.query(rule.name))))?;

        let mut bindings = ResultSet::new();
        bindings.insert(RESULT_VAR.to_string(), value);
        Ok(vec![bindings])
    }

    /// Evaluate `rule` against `input`, allowing only on a `true` binding.
    pub fn evaluate(
        &self,
        document: &PolicyDocument,
        rule: &str,
        input: &Value,
    ) -> Result<(), PolicyError> {
        let results = self.query(document, rule, input)?;
        let Some(first) = results.first() else {
            return Err(PolicyError::NoResults);
        };

        let decision = first.get(RESULT_VAR).and_then(Value::as_bool);
        match decision {
            Some(true) => Ok(()),
            _ => Err(PolicyError::Denied {
                results: Value::from(
                    results.into_iter().map(Value::Object).collect::<Vec<_>>(),
                )
                .to_string(),
                ok: decision.is_some(),
            }),
        }
    }

    /// Serialize `input` into the input document and evaluate `rule`.
    pub fn evaluate_input<T: Serialize>(
        &self,
        document: &PolicyDocument,
        rule: &str,
        input: &T,
    ) -> Result<(), PolicyError> {
        let input = serde_json::to_value(input).map_err(|e| PolicyError::Query(format!("input: {e}")))?;
        self.evaluate(document, rule, &input)
    }
}

/// Read a string field of the input document.
pub(crate) fn input_str<'a>(input: &'a Value, field: &str) -> Option<&'a str> {
    input.get(field).and_then(Value::as_str)
}
