//! # verein-service
//!
//! Football club catalog served over REST and GraphQL.
//!
//! ## Features
//!
//! - **Conditional reads**: `ETag` on every club, `304 Not Modified` for a
//!   matching `If-None-Match`
//! - **Optimistic concurrency**: updates require `If-Match` with the version
//!   last read; stale versions are rejected, concurrent writers race on a
//!   compare-and-set so exactly one wins
//! - **Validated search**: query parameters are checked against a fixed
//!   allow-list before any predicate reaches the store
//! - **Pagination**: page envelopes with total counts
//! - **Storage**: PostgreSQL via `sqlx`, or an in-memory store seeded with
//!   demo data when no database is configured
//!
//! ## Example
//!
//! ```rust,no_run
//! use verein_service::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::load()?;
//!     init_tracing(&config)?;
//!
//!     let state = AppState::from_config(config.clone()).await?;
//!     Server::new(config).serve(router(state)).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod config;
#[cfg(feature = "database")]
pub mod database;
pub mod error;
pub mod graphql;
pub mod handlers;
pub mod health;
pub mod middleware;
pub mod model;
pub mod observability;
pub mod repository;
pub mod search;
pub mod server;
pub mod service;
pub mod state;
pub mod validation;

use axum::{
    routing::{get, post},
    Router,
};

/// All routes of the service, without the middleware stack
///
/// [`server::Server::serve`] adds the middleware layers.
pub fn router(state: state::AppState) -> Router {
    Router::new()
        .merge(handlers::routes())
        .route(graphql::GRAPHQL_PATH, post(graphql::graphql_handler))
        .route("/health", get(health::health))
        .route("/ready", get(health::readiness))
        .with_state(state)
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::auth::{authorize, Action, Identity};
    pub use crate::config::Config;
    pub use crate::error::{Error, Result};
    pub use crate::health::{health, readiness};
    pub use crate::model::{Club, ClubId, ClubInclude, ClubInput};
    pub use crate::observability::init_tracing;
    pub use crate::repository::{ClubStore, MemoryClubStore, Pageable, Slice};
    pub use crate::router;
    pub use crate::server::Server;
    pub use crate::service::{ClubService, ServiceError, ServiceResult};
    pub use crate::state::AppState;

    #[cfg(feature = "database")]
    pub use crate::repository::PostgresClubStore;
}
