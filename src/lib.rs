//! VesselWatch Backend
//!
//! Flags vessel telemetry as anomalous or normal using two offline-fitted
//! models, alongside user accounts and a contact form.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       VESSELWATCH                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐  ┌───────────┐  ┌─────────────────────────┐ │
//! │  │  HTTP     │  │  Auth     │  │  Inference Pipeline     │ │
//! │  │  Router   │  │  (JWT     │  │  scaler → PCA →         │ │
//! │  │  (Axum)   │  │  session) │  │  SVR / LogReg → verdict │ │
//! │  └─────┬─────┘  └─────┬─────┘  └─────────────────────────┘ │
//! │        └──────────────┤          (read-only, shared)        │
//! │                       ▼                                     │
//! │                ┌─────────────┐                              │
//! │                │   SQLite    │  users, contacts             │
//! │                └─────────────┘                              │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod inference;
pub mod middleware;
pub mod models;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
    middleware as axum_middleware,
};
use tower_http::{
    cors::{CorsLayer, Any},
    trace::TraceLayer,
    compression::CompressionLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use error::{AppError, AppResult};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pool: sqlx::SqlitePool,
    pub config: config::Config,
    pub pipeline: Arc<inference::InferencePipeline>,
}

/// Initialize the tracing subscriber
pub fn init_tracing(log_format: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "vesselwatch=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(filter);

    if log_format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(handlers::health::check))
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        .route("/logout", post(handlers::auth::logout))
        .route("/contact", post(handlers::contact::submit))
        .route("/predict", post(handlers::predict::predict))
        .route("/api/v1/models", get(handlers::models::status));

    // Session routes (logged-in user)
    let user_routes = Router::new()
        .route("/dashboard", get(handlers::auth::dashboard))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_user_auth
        ));

    Router::new()
        .merge(public_routes)
        .merge(user_routes)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}
