//! # Todo Service
//!
//! A small HTTP service exposing CRUD operations over user-scoped todo items,
//! backed by PostgreSQL.
//!
//! ## Architecture
//!
//! - [`models`]: the todo entity, identifiers, validators and the partial-update patch
//! - [`db`]: repository trait, Postgres and in-memory backends, factory and service layer
//! - [`http`]: axum router, handlers and error mapping
//! - [`config`]: listener settings read from the environment
//!

// Allow large error types - RepositoryError contains rich context for debugging
#![allow(clippy::result_large_err)]

pub mod config;
pub mod db;
pub mod models;

#[cfg(feature = "http-server")]
pub mod http;
