// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! authcore - JWT authentication and policy based authorization
//!
//! This crate issues and verifies RS256 tokens, evaluates role rules against
//! the verified claims, and provides axum middleware that wires both into a
//! router.
//!
//! ## Modules
//!
//! - `auth` - Claims, key lookup, policy evaluation, token generation and verification
//! - `dedup` - Coalescing of concurrent identity lookups
//! - `middleware` - Axum authenticate / authorize layers and extractors
//! - `store` - User and product lookup capabilities
//! - `config` / `logging` - Environment settings and tracing setup

pub mod auth;
pub mod config;
pub mod dedup;
pub mod error;
pub mod logging;
pub mod middleware;
pub mod state;
pub mod store;
