// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Rule based authorization middleware.
//!
//! Each layer resolves the owner of the requested resource, then asks
//! [`crate::auth::Auth::authorize`] whether the caller's claims satisfy the
//! guard's rule for that owner. Resource lookups go through the state's
//! coalescing groups so concurrent requests for one id share a query.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use super::{log_auth_failure, SubjectId};
use crate::auth::Claims;
use crate::dedup::{resource_key, GroupError};
use crate::error::ApiError;
use crate::state::RuleGuard;
use crate::store::LookupError;

/// Path parameter naming a user resource.
pub const USER_ID_PARAM: &str = "user_id";

/// Path parameter naming a product resource.
pub const PRODUCT_ID_PARAM: &str = "product_id";

const INVALID_ID: &str = "ID is not in its proper form";

/// Authorize the caller against their own user id.
pub async fn authorize(State(guard): State<RuleGuard>, request: Request, next: Next) -> Response {
    let Some(SubjectId(subject)) = request.extensions().get::<SubjectId>().copied() else {
        return ApiError::unauthenticated("user id missing from request").into_response();
    };

    if let Err(err) = check_rule(&guard, &request, subject) {
        return err.into_response();
    }
    next.run(request).await
}

/// Authorize against the user named by the `user_id` path parameter.
///
/// When the route carries a user id the user is loaded and stored as a
/// request extension. Without one the rule is evaluated against the nil id.
pub async fn authorize_user(
    State(guard): State<RuleGuard>,
    Path(params): Path<HashMap<String, String>>,
    mut request: Request,
    next: Next,
) -> Response {
    let mut owner = Uuid::nil();

    if let Some(id) = params.get(USER_ID_PARAM) {
        let Ok(user_id) = Uuid::parse_str(id) else {
            return ApiError::unauthenticated(INVALID_ID).into_response();
        };

        let users = Arc::clone(&guard.state.users);
        let lookup = guard
            .state
            .user_group
            .run(resource_key(USER_ID_PARAM, user_id), move || async move {
                users.query_by_id(user_id).await
            })
            .await;

        let usr = match lookup {
            Ok(usr) => usr,
            Err(GroupError::Failed(LookupError::NotFound)) => {
                return ApiError::unauthenticated("user not found").into_response();
            }
            Err(err) => {
                tracing::error!(%user_id, error = %err, "user lookup failed");
                return ApiError::unauthenticated(format!("querybyid: userID[{user_id}]: {err}"))
                    .into_response();
            }
        };

        owner = user_id;
        request.extensions_mut().insert(usr);
    }

    if let Err(err) = check_rule(&guard, &request, owner) {
        return err.into_response();
    }
    next.run(request).await
}

/// Authorize against the owner of the product named by the `product_id` path
/// parameter.
///
/// When the route carries a product id the product is loaded and stored as a
/// request extension. Without one the rule is evaluated against the nil id.
pub async fn authorize_product(
    State(guard): State<RuleGuard>,
    Path(params): Path<HashMap<String, String>>,
    mut request: Request,
    next: Next,
) -> Response {
    let mut owner = Uuid::nil();

    if let Some(id) = params.get(PRODUCT_ID_PARAM) {
        let Ok(product_id) = Uuid::parse_str(id) else {
            return ApiError::unauthenticated(INVALID_ID).into_response();
        };

        let products = Arc::clone(&guard.state.products);
        let lookup = guard
            .state
            .product_group
            .run(resource_key(PRODUCT_ID_PARAM, product_id), move || async move {
                products.query_by_id(product_id).await
            })
            .await;

        let prd = match lookup {
            Ok(prd) => prd,
            Err(GroupError::Failed(LookupError::NotFound)) => {
                return ApiError::unauthenticated("product not found").into_response();
            }
            Err(err) => {
                tracing::error!(%product_id, error = %err, "product lookup failed");
                return ApiError::internal("internal server error").into_response();
            }
        };

        owner = prd.user_id;
        request.extensions_mut().insert(prd);
    }

    if let Err(err) = check_rule(&guard, &request, owner) {
        return err.into_response();
    }
    next.run(request).await
}

fn check_rule(guard: &RuleGuard, request: &Request, owner: Uuid) -> Result<(), ApiError> {
    let Some(claims) = request.extensions().get::<Claims>() else {
        return Err(ApiError::unauthenticated(
            "authorize: you are not authorized for that action, no claims",
        ));
    };

    guard
        .state
        .auth
        .authorize(claims, owner, guard.rule)
        .map_err(|err| {
            log_auth_failure("authorize", &err);
            ApiError::unauthenticated(format!(
                "authorize: you are not authorized for that action, claims[[{}]] rule[{}]: {err}",
                claims.roles.join(" "),
                guard.rule
            ))
        })
}
