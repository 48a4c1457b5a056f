// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP and WebSocket transport for the presenter.

pub mod assets;
pub mod http;
pub mod state;
pub mod ws;

pub use state::AppState;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use self::http::{commands, slides};

/// Build the axum `Router` with all routes.
///
/// Anything unrouted is served from the directory holding the commands
/// file, so slides can link images and other files next to it.
pub fn build_router(state: Arc<AppState>) -> Router {
    let files = ServeDir::new(&state.assets_root);
    Router::new()
        .route("/presentation", get(slides::presentation))
        .route("/ws", get(ws::ws_handler))
        .route("/slides", get(slides::slide_by_query))
        .route("/slides/", get(slides::slide_by_query))
        .route("/slides/{id}", get(slides::slide_by_index))
        .route("/slides/{id}/", get(slides::slide_by_index))
        .route("/commands/{id}/start", post(commands::start))
        .route("/commands/{id}/status", get(commands::status))
        .route("/commands/{id}/stop", post(commands::stop))
        .route("/static/{name}", get(assets::static_asset))
        .route("/api/v1/health", get(http::health))
        .fallback_service(files)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
