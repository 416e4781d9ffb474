//! Database module for todo storage.
//!
//! This module provides abstractions for database operations via the Repository pattern,
//! allowing different storage backends to be swapped easily.
//!
//! The module includes:
//! - `services`: High-level business logic functions (use these from request handlers)
//! - `repository`: Trait definition and error types for database operations
//! - `repositories::postgres`: Postgres implementation with Diesel ORM
//! - `repositories::local`: In-memory implementation for unit testing and local development
//! - `factory`: Factory for creating repository instances
//! - `repo_config`: `repository.toml` parsing
//!
//! # Recommended Usage
//!
//! ```ignore
//! use todo_service::db::{services, PostgresConfig, RepositoryFactory, RepositoryType};
//! use todo_service::models::UserId;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PostgresConfig::from_env()?;
//!     let repo = RepositoryFactory::create(RepositoryType::Postgres, Some(&config)).await?;
//!
//!     let todos = services::list_todos(repo.as_ref(), &UserId::from("u1")).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod factory;
pub mod repo_config;
pub mod repositories;
pub mod repository;
pub mod services;

pub use config::PostgresConfig;
pub use factory::{RepositoryBuilder, RepositoryFactory, RepositoryType};
pub use repo_config::RepositoryConfig;
pub use repositories::LocalRepository;
#[cfg(feature = "postgres-repo")]
pub use repositories::PostgresRepository;
pub use repository::{ErrorContext, RepositoryError, RepositoryResult, TodoRepository};
pub use services::{ServiceError, ServiceResult};
