//! Postgres repository implementation using Diesel.
//!
//! ## Features
//!
//! - Connection pooling with r2d2
//! - Bounded readiness wait before the first query
//! - Forward-only migrations loaded from a directory at startup
//!
//! Every repository call is one autocommit statement run on the blocking
//! thread pool. Failures are returned as-is; nothing is retried.
//!
//! ## Configuration
//!
//! See [`PostgresConfig::from_env`] for the environment variables read.

use async_trait::async_trait;
use diesel::dsl::sql;
use diesel::expression::SqlLiteral;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_query;
use diesel::sql_types::{Nullable, Timestamptz};
use diesel_migrations::{FileBasedMigrations, MigrationHarness};
use log::{debug, info, warn};
use std::time::{Duration, Instant};
use tokio::task;

use crate::db::config::PostgresConfig;
use crate::db::repository::{ErrorContext, RepositoryError, RepositoryResult, TodoRepository};
use crate::models::{Todo, TodoId, UserId};

mod models;
mod schema;

use models::{NewTodoRow, TodoRow};
use schema::todo;

type PgPool = Pool<ConnectionManager<PgConnection>>;

/// Diesel-backed repository for Postgres.
#[derive(Clone, Debug)]
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Connect, wait for the database to accept queries, and run pending migrations.
    ///
    /// # Errors
    /// * `RepositoryError::TimeoutError` - the database was not reachable within
    ///   `config.ready_timeout_ms`
    /// * `RepositoryError::MigrationError` - migrations could not be loaded or applied
    pub async fn connect(config: PostgresConfig) -> RepositoryResult<Self> {
        task::spawn_blocking(move || Self::connect_blocking(config))
            .await
            .map_err(|e| {
                RepositoryError::internal_with_context(
                    format!("Task join error: {}", e),
                    ErrorContext::new("spawn_blocking"),
                )
            })?
    }

    /// Blocking variant of [`PostgresRepository::connect`].
    pub fn connect_blocking(config: PostgresConfig) -> RepositoryResult<Self> {
        debug!("Connecting to database");
        let manager = ConnectionManager::<PgConnection>::new(&config.database_url);

        // Connections are opened lazily; readiness is checked explicitly below.
        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .min_idle(Some(0))
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .test_on_check_out(true)
            .build_unchecked(manager);

        Self::wait_until_ready(&pool, config.ready_poll_interval(), config.ready_timeout())?;
        info!("Database is ready to use");

        {
            let mut conn = pool.get().map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("get_connection_for_migrations"),
                )
            })?;
            Self::run_migrations(&mut conn, &config)?;
        }

        Ok(Self { pool })
    }

    /// Probe the database every `poll` until it answers or `timeout` elapses.
    fn wait_until_ready(pool: &PgPool, poll: Duration, timeout: Duration) -> RepositoryResult<()> {
        let started = Instant::now();
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            let probe = pool
                .get_timeout(poll)
                .map_err(RepositoryError::from)
                .and_then(|mut conn| ping(&mut conn));

            match probe {
                Ok(()) => return Ok(()),
                Err(e) if started.elapsed() >= timeout => {
                    return Err(RepositoryError::timeout_with_context(
                        "database not ready",
                        ErrorContext::new("wait_until_ready").with_details(format!(
                            "attempts={}, timeout_ms={}, last_error={}",
                            attempts,
                            timeout.as_millis(),
                            e
                        )),
                    ));
                }
                Err(e) => {
                    debug!("Database not ready yet (attempt {}): {}", attempts, e);
                    std::thread::sleep(poll);
                }
            }
        }
    }

    /// Apply every pending migration found in `config.migrations_dir`.
    fn run_migrations(conn: &mut PgConnection, config: &PostgresConfig) -> RepositoryResult<()> {
        let context = || {
            ErrorContext::new("run_migrations")
                .with_details(format!("dir={}", config.migrations_dir.display()))
        };

        let migrations = FileBasedMigrations::from_path(&config.migrations_dir)
            .map_err(|e| RepositoryError::migration_with_context(e.to_string(), context()))?;

        let applied = conn
            .run_pending_migrations(migrations)
            .map_err(|e| RepositoryError::migration_with_context(e.to_string(), context()))?;

        match applied.last() {
            Some(version) => info!(
                "Database migrated: {} migration(s) applied, version={}",
                applied.len(),
                version
            ),
            None => info!("Database schema up to date"),
        }

        Ok(())
    }

    /// Run `f` on a pooled connection from the blocking thread pool.
    ///
    /// Synchronous Diesel offers no way to interrupt a running statement.
    /// Dropping the returned future abandons the result, but the statement
    /// still runs to completion on its worker and the connection then goes
    /// back to the pool.
    async fn with_conn<T, F>(&self, operation: &'static str, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> RepositoryResult<T> + Send + 'static,
    {
        let pool = self.pool.clone();

        task::spawn_blocking(move || {
            let mut conn = pool.get().map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new(operation).with_details("get_connection"),
                )
            })?;

            f(&mut conn).map_err(|e| e.with_operation(operation))
        })
        .await
        .map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Task join error: {}", e),
                ErrorContext::new(operation),
            )
        })?
    }
}

fn ping(conn: &mut PgConnection) -> RepositoryResult<()> {
    sql_query("SELECT 1").execute(conn)?;
    Ok(())
}

/// `NOW()` evaluated by the server, typed for the nullable timestamp columns.
fn db_now() -> SqlLiteral<Nullable<Timestamptz>> {
    sql::<Nullable<Timestamptz>>("NOW()")
}

fn required_id(item: &Todo, operation: &str) -> RepositoryResult<TodoId> {
    item.id.ok_or_else(|| {
        RepositoryError::validation_with_context(
            "todo has no id",
            ErrorContext::new(operation).with_entity("todo"),
        )
    })
}

fn required_field(value: &Option<String>, field: &str, operation: &str) -> RepositoryResult<String> {
    value.clone().ok_or_else(|| {
        RepositoryError::validation_with_context(
            format!("{} is required", field),
            ErrorContext::new(operation).with_entity("todo"),
        )
    })
}

#[async_trait]
impl TodoRepository for PostgresRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.with_conn("health_check", |conn| ping(conn).map(|_| true))
            .await
    }

    async fn create_todo(&self, item: &mut Todo) -> RepositoryResult<()> {
        let row = NewTodoRow {
            user_id: item
                .user_id
                .as_ref()
                .map(|u| u.as_str().to_string())
                .ok_or_else(|| {
                    RepositoryError::validation_with_context(
                        "userID is required",
                        ErrorContext::new("create_todo").with_entity("todo"),
                    )
                })?,
            title: required_field(&item.title, "title", "create_todo")?,
            color: item.color.clone(),
            description: item.description.clone(),
        };

        let id = self
            .with_conn("create_todo", move |conn| {
                let id = diesel::insert_into(todo::table)
                    .values(&row)
                    .returning(todo::todo_id)
                    .get_result::<uuid::Uuid>(conn)?;
                Ok(id)
            })
            .await?;

        item.id = Some(TodoId::new(id));
        Ok(())
    }

    async fn update_todo(&self, item: &Todo) -> RepositoryResult<()> {
        let id = required_id(item, "update_todo")?;
        let title = required_field(&item.title, "title", "update_todo")?;
        let color = item.color.clone();
        let description = item.description.clone();
        let is_finished = item.is_finished;

        let affected = self
            .with_conn("update_todo", move |conn| {
                let affected = diesel::update(todo::table.find(id.value()))
                    .set((
                        todo::title.eq(title),
                        todo::color.eq(color),
                        todo::description.eq(description),
                        todo::is_finished.eq(is_finished),
                        todo::last_edited_at.eq(db_now()),
                    ))
                    .execute(conn)?;
                Ok(affected)
            })
            .await?;

        if affected == 0 {
            return Err(RepositoryError::not_found_with_context(
                "Todo not found",
                ErrorContext::new("update_todo")
                    .with_entity("todo")
                    .with_entity_id(id),
            ));
        }
        Ok(())
    }

    async fn get_todo_by_id(&self, todo_id: TodoId) -> RepositoryResult<Todo> {
        self.with_conn("get_todo_by_id", move |conn| {
            let row = todo::table
                .find(todo_id.value())
                .select(TodoRow::as_select())
                .first::<TodoRow>(conn)
                .map_err(|e| RepositoryError::from(e).for_entity("todo", todo_id))?;
            Ok(Todo::from(row))
        })
        .await
    }

    async fn list_todos_by_user_id(&self, user_id: &UserId) -> RepositoryResult<Vec<Todo>> {
        let owner = user_id.as_str().to_string();
        self.with_conn("list_todos_by_user_id", move |conn| {
            let rows = todo::table
                .filter(todo::user_id.eq(owner))
                .filter(todo::deleted_at.is_null())
                .order(todo::created_at.desc())
                .select(TodoRow::as_select())
                .load::<TodoRow>(conn)?;
            Ok(rows.into_iter().map(Todo::from).collect())
        })
        .await
    }

    async fn delete_todo(&self, todo_id: TodoId) -> RepositoryResult<bool> {
        let affected = self
            .with_conn("delete_todo", move |conn| {
                let affected = diesel::update(
                    todo::table
                        .filter(todo::todo_id.eq(todo_id.value()))
                        .filter(todo::deleted_at.is_null()),
                )
                .set(todo::deleted_at.eq(db_now()))
                .execute(conn)?;
                Ok(affected)
            })
            .await?;

        if affected == 0 {
            warn!("delete_todo: no active todo with id {}", todo_id);
        }
        Ok(affected > 0)
    }
}

#[cfg(test)]
mod tests {
    //! These tests need a running Postgres and are ignored by default:
    //! `TEST_DATABASE_URL=postgres://... cargo test -- --ignored`

    use super::*;

    async fn repository() -> PostgresRepository {
        let url = std::env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL must be set");
        let mut config = PostgresConfig::with_url(url);
        config.migrations_dir = concat!(env!("CARGO_MANIFEST_DIR"), "/migrations").into();
        PostgresRepository::connect(config).await.unwrap()
    }

    fn unique_user() -> UserId {
        UserId::new(format!("pg-test-{}", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn test_readiness_times_out_for_unreachable_database() {
        let mut config = PostgresConfig::with_url("postgres://nobody@127.0.0.1:1/none");
        config.ready_timeout_ms = 300;
        config.connection_timeout_sec = 1;

        let err = PostgresRepository::connect(config).await.unwrap_err();
        assert!(matches!(err, RepositoryError::TimeoutError { .. }), "{err}");
    }

    #[tokio::test]
    #[ignore]
    async fn test_create_get_update_delete_roundtrip() {
        let repo = repository().await;
        let user = unique_user();

        let mut draft = Todo::draft(user.clone(), Some("Buy milk".into()), None, None);
        draft.validate_for_create().unwrap();
        repo.create_todo(&mut draft).await.unwrap();
        let id = draft.id.unwrap();

        let mut stored = repo.get_todo_by_id(id).await.unwrap();
        assert_eq!(stored.title.as_deref(), Some("Buy milk"));
        assert_eq!(stored.color.as_deref(), Some("#FFFFFF"));
        assert!(stored.last_edited_at.is_none());

        stored.is_finished = Some(true);
        repo.update_todo(&stored).await.unwrap();
        let updated = repo.get_todo_by_id(id).await.unwrap();
        assert_eq!(updated.is_finished, Some(true));
        assert!(updated.last_edited_at.unwrap() > updated.created_at.unwrap());

        assert!(repo.delete_todo(id).await.unwrap());
        assert!(!repo.delete_todo(id).await.unwrap());
        assert!(repo.list_todos_by_user_id(&user).await.unwrap().is_empty());
        assert!(repo.get_todo_by_id(id).await.unwrap().is_deleted());
    }

    #[tokio::test]
    #[ignore]
    async fn test_missing_rows() {
        let repo = repository().await;
        let missing = TodoId::new(uuid::Uuid::new_v4());

        assert!(repo.get_todo_by_id(missing).await.unwrap_err().is_not_found());
        assert!(!repo.delete_todo(missing).await.unwrap());

        let ghost = Todo {
            id: Some(missing),
            title: Some("ghost".into()),
            ..Default::default()
        };
        assert!(repo.update_todo(&ghost).await.unwrap_err().is_not_found());
    }
}
