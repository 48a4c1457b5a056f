// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP handlers. Slide and command routes answer with htmx fragments;
//! the health route answers JSON.

pub mod commands;
pub mod slides;

use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::transport::state::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    /// Whether a command run is active.
    pub running: bool,
    pub slides: usize,
    /// Whether a browser terminal is attached.
    pub viewer: bool,
    pub uptime_secs: u64,
}

/// `GET /api/v1/health`
pub async fn health(State(s): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_owned(),
        running: s.session.is_running(),
        slides: s.deck.len(),
        viewer: s.session.viewer().is_attached(),
        uptime_secs: s.started_at.elapsed().as_secs(),
    })
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
