//! HTTP surface for the navien demo table.
//!
//! # Design
//! Handlers are thin: each one feeds request parts through the
//! `navien_core` pipeline, calls the `Storage` collaborator, and returns a
//! core envelope. The router is generic over `Storage`; the binary wires in
//! `SqliteStorage`.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use navien_core::ReadQueries;
use tokio::net::TcpListener;

pub mod config;
pub mod handlers;
pub mod logging;
pub mod reply;
pub mod storage;

pub use config::{ConfigError, ServerConfig};
pub use storage::{SqliteStorage, Storage, StorageError};

/// Per-process state shared by every request. Nothing in it is mutated
/// after startup.
pub struct AppState<S> {
    pub storage: S,
    pub queries: ReadQueries,
    pub reject_malformed_body: bool,
}

pub type SharedState<S> = Arc<AppState<S>>;

impl<S: Storage> AppState<S> {
    pub fn new(storage: S, config: &ServerConfig) -> Self {
        Self {
            storage,
            queries: ReadQueries::for_table(&config.table),
            reject_malformed_body: config.reject_malformed_body,
        }
    }
}

pub fn app<S: Storage>(state: AppState<S>) -> Router {
    Router::new()
        .route("/demo01", get(handlers::demo01).post(handlers::demo01))
        .route("/navien", post(handlers::insert_named::<S>))
        .route("/navien-2", post(handlers::insert_passthrough::<S>))
        .route("/validate", post(handlers::validate))
        .route("/navien-test/{id}", get(handlers::select_by_id::<S>))
        .route("/navien-test/{val1}/{val2}", get(handlers::select_by_filter::<S>))
        .with_state(Arc::new(state))
}

pub async fn run<S: Storage>(listener: TcpListener, state: AppState<S>) -> Result<(), std::io::Error> {
    axum::serve(listener, app(state)).await
}
