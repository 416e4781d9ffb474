//! Router configuration for the HTTP API.
//!
//! This module sets up all routes, middleware (request logging, tracing, CORS),
//! and creates the axum router ready for serving.

use axum::{middleware, routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::error::AppError;
use super::handlers;
use super::middleware::log_requests;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration - permissive, no authentication is involved
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let todos = Router::new()
        .route(
            "/{user_id}/todos",
            get(handlers::list_todos).post(handlers::create_todo),
        )
        .route(
            "/{user_id}/todos/{todo_id}",
            get(handlers::get_todo)
                .patch(handlers::update_todo)
                .delete(handlers::delete_todo),
        );

    Router::new()
        .route("/", get(handlers::version))
        .route("/version", get(handlers::version))
        .route("/health", get(handlers::health_check))
        .nest("/users", todos)
        .fallback(not_found)
        .layer(middleware::from_fn(log_requests))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn not_found() -> AppError {
    AppError::NotFound("route not found".to_string())
}
