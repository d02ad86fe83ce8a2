// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Lookup capabilities consumed by auth and the middleware.
//!
//! Storage lives outside this crate. Auth only needs to query a user's
//! enabled flag, and the middleware needs to resolve the owner of a user or
//! product resource. [`InMemoryStore`] backs both for tests and demos.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::auth::Role;

/// Account record as far as auth is concerned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub roles: Vec<Role>,
    pub enabled: bool,
}

/// Product record; only ownership matters for authorization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
}

/// Lookup errors.
///
/// Cloneable so a single outcome can be handed to every coalesced caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    #[error("not found")]
    NotFound,

    #[error("store: {0}")]
    Store(String),
}

/// Query users by id.
#[async_trait]
pub trait UserLookup: Send + Sync {
    async fn query_by_id(&self, user_id: Uuid) -> Result<User, LookupError>;
}

/// Query products by id.
#[async_trait]
pub trait ProductLookup: Send + Sync {
    async fn query_by_id(&self, product_id: Uuid) -> Result<Product, LookupError>;
}

#[derive(Default)]
pub struct InMemoryStore {
    users: RwLock<HashMap<Uuid, User>>,
    products: RwLock<HashMap<Uuid, Product>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_user(&self, user: User) {
        self.users.write().await.insert(user.id, user);
    }

    /// Flip a user's enabled flag. Returns `false` if the user is unknown.
    pub async fn set_enabled(&self, user_id: Uuid, enabled: bool) -> bool {
        match self.users.write().await.get_mut(&user_id) {
            Some(user) => {
                user.enabled = enabled;
                true
            }
            None => false,
        }
    }

    pub async fn insert_product(&self, product: Product) {
        self.products.write().await.insert(product.id, product);
    }
}

#[async_trait]
impl UserLookup for InMemoryStore {
    async fn query_by_id(&self, user_id: Uuid) -> Result<User, LookupError> {
        self.users
            .read()
            .await
            .get(&user_id)
            .cloned()
            .ok_or(LookupError::NotFound)
    }
}

#[async_trait]
impl ProductLookup for InMemoryStore {
    async fn query_by_id(&self, product_id: Uuid) -> Result<Product, LookupError> {
        self.products
            .read()
            .await
            .get(&product_id)
            .cloned()
            .ok_or(LookupError::NotFound)
    }
}
