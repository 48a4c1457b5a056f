// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Client script and stylesheet, compiled into the binary.

use axum::extract::Path;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

const MAIN_JS: &str = include_str!("../../static/main.js");
const MAIN_CSS: &str = include_str!("../../static/main.css");

/// Look up an embedded asset by file name.
pub fn lookup(name: &str) -> Option<(&'static str, &'static str)> {
    match name {
        "main.js" => Some(("text/javascript; charset=utf-8", MAIN_JS)),
        "main.css" => Some(("text/css; charset=utf-8", MAIN_CSS)),
        _ => None,
    }
}

/// `GET /static/{name}`
pub async fn static_asset(Path(name): Path<String>) -> Response {
    match lookup(&name) {
        Some((content_type, body)) => ([(header::CONTENT_TYPE, content_type)], body).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
