//! Development storage server for `objfs`.
//!
//! Serves an in-memory account (devices, mount points, folders, files) over
//! the HTTP protocol the `objfs` client speaks. Nothing is persisted.

pub mod handlers;
pub mod store;

use axum::{
    Router,
    routing::{get, post},
};
use handlers::*;
use tower_http::trace::TraceLayer;

pub use store::{SharedStore, Store, StoreError};

/// Builds the application's routes around `store`.
pub fn router(store: SharedStore) -> Router {
    Router::new()
        // A simple health check endpoint.
        .route("/health", get(health))
        .route("/devices", get(list_devices))
        .route("/usage", get(usage))
        .route("/meta/*path", get(get_meta))
        .route("/mkdir/*path", post(mkdir))
        // Read, write and delete share one path; DELETE removes the whole subtree.
        .route("/files/*path", get(get_file).put(put_file).delete(delete_file))
        .layer(TraceLayer::new_for_http())
        .with_state(store)
}
