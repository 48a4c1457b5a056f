// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Run control handlers for command slides.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use tracing::info;

use crate::render::running_button;
use crate::transport::state::AppState;

/// `POST /commands/{id}/start`
///
/// Answers with the running controls once the run is installed. Without a
/// viewer nothing starts and the idle controls come back instead.
pub async fn start(State(s): State<Arc<AppState>>, Path(raw): Path<String>) -> Response {
    let (idx, slide) = match s.slide(&raw) {
        Ok(found) => found,
        Err(resp) => return resp.into_response(),
    };
    let started = s.session.run(slide.execute.clone()).await.is_some();
    if !started {
        info!(idx, "no viewer attached, commands not started");
    }
    Html(running_button(idx, started)).into_response()
}

/// `GET /commands/{id}/status`
///
/// Polled while running. 204 leaves the page alone; once idle the execute
/// controls are returned so the poller replaces itself.
pub async fn status(State(s): State<Arc<AppState>>, Path(raw): Path<String>) -> Response {
    let (idx, _) = match s.slide(&raw) {
        Ok(found) => found,
        Err(resp) => return resp.into_response(),
    };
    if s.session.is_running() {
        StatusCode::NO_CONTENT.into_response()
    } else {
        Html(running_button(idx, false)).into_response()
    }
}

/// `POST /commands/{id}/stop`
pub async fn stop(State(s): State<Arc<AppState>>, Path(raw): Path<String>) -> Response {
    let (idx, _) = match s.slide(&raw) {
        Ok(found) => found,
        Err(resp) => return resp.into_response(),
    };
    s.session.stop();
    Html(running_button(idx, false)).into_response()
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
