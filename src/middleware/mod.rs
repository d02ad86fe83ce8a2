// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum middleware wiring [`crate::auth::Auth`] into request handling.
//!
//! Layers are applied with `from_fn_with_state` on `route_layer`, so path
//! parameters are available to the authorization step:
//!
//! ```rust,ignore
//! let app = Router::new()
//!     .route("/users/{user_id}", get(query_user))
//!     .route_layer(from_fn_with_state(state.guard(RULE_ADMIN_OR_SUBJECT), authorize_user))
//!     .route_layer(from_fn_with_state(state.clone(), authenticate));
//! ```
//!
//! [`authenticate`] must run first; it stores the verified [`Claims`](crate::auth::Claims) and the
//! caller's [`SubjectId`] in the request extensions for the later layers and
//! for the [`AuthClaims`] / [`RequestedUser`] / [`RequestedProduct`] extractors.

pub mod authenticate;
pub mod authorize;
pub mod extractor;

pub use authenticate::authenticate;
pub use authorize::{authorize, authorize_product, authorize_user};
pub use extractor::{AuthClaims, RequestedProduct, RequestedUser};

use uuid::Uuid;

use crate::auth::AuthError;

/// Authenticated caller's user id, parsed from the token subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubjectId(pub Uuid);

/// Log a failed auth step. Policy and signing faults are errors; rejected
/// credentials and computed denials are warnings.
pub(crate) fn log_auth_failure(stage: &'static str, err: &AuthError) {
    if err.is_internal() || err.is_policy_fault() {
        tracing::error!(stage, error = %err, kind = ?err.kind(), "auth evaluation failed");
    } else {
        tracing::warn!(stage, error = %err, kind = ?err.kind(), "request rejected");
    }
}
