// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors for values stored by the auth middleware.
//!
//! ```rust,ignore
//! async fn query_user(
//!     AuthClaims(claims): AuthClaims,
//!     RequestedUser(usr): RequestedUser,
//! ) -> impl IntoResponse {
//!     // claims belong to the caller, usr is the user named in the path
//! }
//! ```

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::auth::Claims;
use crate::error::ApiError;
use crate::store::{Product, User};

/// Claims of the authenticated caller.
pub struct AuthClaims(pub Claims);

impl<S: Send + Sync> FromRequestParts<S> for AuthClaims {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(AuthClaims)
            .ok_or_else(|| ApiError::unauthenticated("claims missing from request"))
    }
}

/// User loaded by [`super::authorize_user`].
pub struct RequestedUser(pub User);

impl<S: Send + Sync> FromRequestParts<S> for RequestedUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<User>()
            .cloned()
            .map(RequestedUser)
            .ok_or_else(|| ApiError::unauthenticated("user missing from request"))
    }
}

/// Product loaded by [`super::authorize_product`].
pub struct RequestedProduct(pub Product);

impl<S: Send + Sync> FromRequestParts<S> for RequestedProduct {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Product>()
            .cloned()
            .map(RequestedProduct)
            .ok_or_else(|| ApiError::unauthenticated("product missing from request"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use axum::http::{Request, StatusCode};
    use chrono::Duration;
    use uuid::Uuid;

    fn parts() -> Parts {
        Request::builder()
            .uri("/test")
            .body(())
            .unwrap()
            .into_parts()
            .0
    }

    #[tokio::test]
    async fn claims_extractor_requires_extension() {
        let mut parts = parts();
        let result = AuthClaims::from_request_parts(&mut parts, &()).await;
        let err = result.err().unwrap();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn claims_extractor_reads_extension() {
        let mut parts = parts();
        let claims = Claims::new(Uuid::new_v4(), "issuer", &[Role::Admin], Duration::minutes(5));
        parts.extensions.insert(claims.clone());

        let AuthClaims(found) = AuthClaims::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(found, claims);
    }

    #[tokio::test]
    async fn user_extractor_reads_extension() {
        let mut parts = parts();
        assert!(RequestedUser::from_request_parts(&mut parts, &()).await.is_err());

        let usr = User {
            id: Uuid::new_v4(),
            roles: vec![Role::User],
            enabled: true,
        };
        parts.extensions.insert(usr.clone());
        let RequestedUser(found) = RequestedUser::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(found, usr);
    }
}
