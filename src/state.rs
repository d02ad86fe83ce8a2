// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::Auth;
use crate::dedup::RequestGroup;
use crate::store::{InMemoryStore, LookupError, Product, ProductLookup, User, UserLookup};

/// Shared state for the auth middleware.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<Auth>,
    pub users: Arc<dyn UserLookup>,
    pub products: Arc<dyn ProductLookup>,
    /// Coalesces `user_id:<uuid>` lookups
    pub user_group: RequestGroup<User, LookupError>,
    /// Coalesces `product_id:<uuid>` lookups
    pub product_group: RequestGroup<Product, LookupError>,
}

impl AppState {
    pub fn new(auth: Auth, users: Arc<dyn UserLookup>, products: Arc<dyn ProductLookup>) -> Self {
        Self {
            auth: Arc::new(auth),
            users,
            products,
            user_group: RequestGroup::new(),
            product_group: RequestGroup::new(),
        }
    }

    /// Back users and products with one in-memory store.
    pub fn with_store(auth: Auth, store: Arc<InMemoryStore>) -> Self {
        Self::new(auth, store.clone(), store)
    }

    /// Bind an authorization rule to this state for use as middleware state.
    pub fn guard(&self, rule: &'static str) -> RuleGuard {
        RuleGuard {
            state: self.clone(),
            rule,
        }
    }
}

/// Middleware state carrying the rule to authorize against.
#[derive(Clone)]
pub struct RuleGuard {
    pub state: AppState,
    pub rule: &'static str,
}
