// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bearer token authentication middleware.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::{log_auth_failure, SubjectId};
use crate::error::ApiError;
use crate::state::AppState;

/// Authenticate the `Authorization` header and store the claims.
///
/// A missing or non-UTF-8 header is treated as empty and rejected by the
/// header format check.
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    let claims = match state.auth.authenticate(header).await {
        Ok(claims) => claims,
        Err(err) => {
            log_auth_failure("authenticate", &err);
            return ApiError::from(err).into_response();
        }
    };

    if claims.subject.is_empty() {
        return ApiError::unauthenticated(
            "authorize: you are not authorized for that action, no claims",
        )
        .into_response();
    }

    let subject = match claims.subject_id() {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!(subject = %claims.subject, error = %e, "token subject is not a user id");
            return ApiError::unauthenticated(format!("parsing subject: {e}")).into_response();
        }
    };

    request.extensions_mut().insert(SubjectId(subject));
    request.extensions_mut().insert(claims);
    next.run(request).await
}
