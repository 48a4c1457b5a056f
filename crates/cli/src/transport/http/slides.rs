// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Page and slide navigation handlers.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use serde::Deserialize;
use tracing::{debug, error};

use crate::error::ErrorCode;
use crate::render::{content_div, index_page};
use crate::transport::state::AppState;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SlideQuery {
    pub idx: Option<String>,
}

/// `GET /presentation`: the full page opened on the first slide.
pub async fn presentation(State(s): State<Arc<AppState>>) -> Response {
    match s.deck.get(0) {
        Ok(slide) => Html(index_page(&content_div(0, s.deck.len(), slide, false))).into_response(),
        Err(_) => {
            error!("could not get first slide, deck is empty");
            ErrorCode::Internal.to_http_response("deck has no slides").into_response()
        }
    }
}

/// `GET /slides/?idx=N`: redirect for the slide picker, which can only
/// send the index as a query parameter.
pub async fn slide_by_query(Query(q): Query<SlideQuery>) -> Response {
    let Some(raw) = q.idx.filter(|v| !v.is_empty()) else {
        return ErrorCode::BadRequest.to_http_response("missing 'idx' parameter").into_response();
    };
    match raw.parse::<usize>() {
        Ok(idx) => {
            (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, format!("/slides/{idx}"))])
                .into_response()
        }
        Err(_) => ErrorCode::BadRequest
            .to_http_response(format!("invalid slide id '{raw}'"))
            .into_response(),
    }
}

/// `GET /slides/{id}`: swap in another slide.
///
/// Leaving a slide stops whatever it was running and wipes the terminal.
pub async fn slide_by_index(State(s): State<Arc<AppState>>, Path(raw): Path<String>) -> Response {
    let (idx, slide) = match s.slide(&raw) {
        Ok(found) => found,
        Err(resp) => return resp.into_response(),
    };
    debug!(idx, "changing slide");
    s.session.stop();
    s.session.clear().await;
    Html(content_div(idx, s.deck.len(), slide, false)).into_response()
}

#[cfg(test)]
#[path = "slides_tests.rs"]
mod tests;
