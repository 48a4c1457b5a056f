// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use axum::http::StatusCode;

use crate::test_support::{channel_viewer, AnyhowExt, AppStateBuilder, Frame};
use crate::terminal::CLEAR_SCREEN;
use crate::transport::build_router;

const DECK: &str = "# Intro\n\n$ echo one\n\n$ sleep 10";

#[tokio::test]
async fn presentation_renders_first_slide() -> anyhow::Result<()> {
    let state = AppStateBuilder::new().deck(DECK).build()?;
    let server = axum_test::TestServer::new(build_router(state)).anyhow()?;

    let resp = server.get("/presentation").await;
    resp.assert_status(StatusCode::OK);
    let body = resp.text();
    assert!(body.starts_with("<!DOCTYPE html>"));
    assert!(body.contains("<h1>Intro</h1>"));
    assert!(body.contains(r#"<option value="0" selected>Slide 1/3</option>"#));
    Ok(())
}

#[tokio::test]
async fn presentation_with_empty_deck_is_500() -> anyhow::Result<()> {
    let state = AppStateBuilder::new().build()?;
    let server = axum_test::TestServer::new(build_router(state)).anyhow()?;

    let resp = server.get("/presentation").await;
    resp.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert!(resp.text().contains("INTERNAL"));
    Ok(())
}

#[yare::parameterized(
    plain    = { "/slides/1" },
    trailing = { "/slides/1/" },
)]
#[test_macro(tokio::test)]
async fn slide_fragment(path: &str) {
    let result = async {
        let state = AppStateBuilder::new().deck(DECK).build()?;
        let server = axum_test::TestServer::new(build_router(state)).anyhow()?;
        let resp = server.get(path).await;
        resp.assert_status(StatusCode::OK);
        anyhow::Ok(resp.text())
    }
    .await;
    let body = result.unwrap_or_default();
    assert!(body.starts_with(r#"<div id="command">"#), "body: {body}");
    assert!(body.contains(r#"<div class="command-string"><p>echo one</p></div>"#));
    assert!(!body.contains("<html>"));
}

#[tokio::test]
async fn slide_bad_id_is_400() -> anyhow::Result<()> {
    let state = AppStateBuilder::new().deck(DECK).build()?;
    let server = axum_test::TestServer::new(build_router(state)).anyhow()?;

    let resp = server.get("/slides/abc").await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = serde_json::from_str(&resp.text())?;
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
    Ok(())
}

#[tokio::test]
async fn slide_out_of_range_is_404() -> anyhow::Result<()> {
    let state = AppStateBuilder::new().deck(DECK).build()?;
    let server = axum_test::TestServer::new(build_router(state)).anyhow()?;

    let resp = server.get("/slides/3").await;
    resp.assert_status(StatusCode::NOT_FOUND);
    let body: serde_json::Value = serde_json::from_str(&resp.text())?;
    assert_eq!(body["error"]["code"], "SLIDE_NOT_FOUND");
    Ok(())
}

#[tokio::test]
async fn changing_slide_stops_run_and_clears() -> anyhow::Result<()> {
    let state = AppStateBuilder::new().deck(DECK).build()?;
    let (viewer, mut frames) = channel_viewer();
    state.session.viewer().set_connection(viewer).await;
    let server = axum_test::TestServer::new(build_router(state.clone())).anyhow()?;

    server.post("/commands/2/start").await.assert_status(StatusCode::OK);
    frames.expect_clear().await?;
    assert!(state.session.is_running());

    server.get("/slides/0").await.assert_status(StatusCode::OK);
    assert!(!state.session.is_running());
    assert_eq!(frames.next().await?, Frame::Text(CLEAR_SCREEN.to_owned()));
    Ok(())
}

#[tokio::test]
async fn query_redirects_permanently() -> anyhow::Result<()> {
    let state = AppStateBuilder::new().deck(DECK).build()?;
    let server = axum_test::TestServer::new(build_router(state)).anyhow()?;

    for path in ["/slides/?idx=2", "/slides?idx=2"] {
        let resp = server.get(path).await;
        resp.assert_status(StatusCode::MOVED_PERMANENTLY);
        let location = resp.headers().get("location").and_then(|v| v.to_str().ok());
        assert_eq!(location, Some("/slides/2"), "path: {path}");
    }
    Ok(())
}

#[yare::parameterized(
    missing = { "/slides/" },
    empty   = { "/slides/?idx=" },
    invalid = { "/slides/?idx=two" },
)]
#[test_macro(tokio::test)]
async fn query_without_index_is_400(path: &str) {
    let status = async {
        let state = AppStateBuilder::new().deck(DECK).build()?;
        let server = axum_test::TestServer::new(build_router(state)).anyhow()?;
        anyhow::Ok(server.get(path).await.status_code())
    }
    .await
    .ok();
    assert_eq!(status, Some(StatusCode::BAD_REQUEST));
}
