// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use tracing::warn;

use crate::deck::{Deck, Slide};
use crate::error::{ErrorCode, ErrorResponse};
use crate::terminal::CommandSession;

/// Shared application state passed to all handlers via axum `State` extractor.
pub struct AppState {
    pub deck: Deck,
    pub session: Arc<CommandSession>,
    /// Directory the fallback service serves files from.
    pub assets_root: PathBuf,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(deck: Deck, session: Arc<CommandSession>, assets_root: PathBuf) -> Self {
        Self { deck, session, assets_root, started_at: Instant::now() }
    }

    /// Resolve a raw `{id}` path segment to a slide.
    ///
    /// Non-integer ids are a bad request; ids past the end are not found.
    pub fn slide(
        &self,
        raw: &str,
    ) -> Result<(usize, &Slide), (axum::http::StatusCode, axum::Json<ErrorResponse>)> {
        let idx: usize = raw.parse().map_err(|_| {
            warn!(id = raw, "could not parse slide id");
            ErrorCode::BadRequest.to_http_response(format!("invalid slide id '{raw}'"))
        })?;
        let slide = self.deck.get(idx).map_err(|code| {
            warn!(id = idx, "slide index out of bounds");
            code.to_http_response(format!("slide {idx} out of range (deck has {})", self.deck.len()))
        })?;
        Ok((idx, slide))
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
