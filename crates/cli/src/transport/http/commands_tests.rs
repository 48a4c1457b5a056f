// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use axum::http::StatusCode;

use crate::test_support::{channel_viewer, wait_until, AnyhowExt, AppStateBuilder, Frame};
use crate::transport::build_router;

const DECK: &str = "intro\n\n$ echo hello\n\n$ sleep 10";

#[tokio::test]
async fn start_streams_output_and_status_goes_idle() -> anyhow::Result<()> {
    let state = AppStateBuilder::new().deck(DECK).build()?;
    let (viewer, mut frames) = channel_viewer();
    state.session.viewer().set_connection(viewer).await;
    let server = axum_test::TestServer::new(build_router(state.clone())).anyhow()?;

    let resp = server.post("/commands/1/start").await;
    resp.assert_status(StatusCode::OK);
    let body = resp.text();
    assert!(body.contains(r#"hx-get="/commands/1/status""#), "body: {body}");
    assert!(body.contains("<button>stop</button>"));

    frames.expect_clear().await?;
    frames.text_until("hello\n\r").await?;
    wait_until(|| !state.session.is_running()).await?;

    let resp = server.get("/commands/1/status").await;
    resp.assert_status(StatusCode::OK);
    assert!(resp.text().contains(r#"<div id="execute-button">"#));
    Ok(())
}

#[tokio::test]
async fn status_is_204_while_running() -> anyhow::Result<()> {
    let state = AppStateBuilder::new().deck(DECK).build()?;
    let (viewer, _frames) = channel_viewer();
    state.session.viewer().set_connection(viewer).await;
    let server = axum_test::TestServer::new(build_router(state.clone())).anyhow()?;

    server.post("/commands/2/start").await.assert_status(StatusCode::OK);
    let resp = server.get("/commands/2/status").await;
    resp.assert_status(StatusCode::NO_CONTENT);
    assert!(resp.text().is_empty());

    let resp = server.post("/commands/2/stop").await;
    resp.assert_status(StatusCode::OK);
    assert!(resp.text().contains(r#"hx-post="/commands/2/start""#));
    assert!(!state.session.is_running());

    server.get("/commands/2/status").await.assert_status(StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn start_without_viewer_returns_idle_controls() -> anyhow::Result<()> {
    let state = AppStateBuilder::new().deck(DECK).build()?;
    let server = axum_test::TestServer::new(build_router(state.clone())).anyhow()?;

    let resp = server.post("/commands/1/start").await;
    resp.assert_status(StatusCode::OK);
    assert!(resp.text().contains(r#"<div id="execute-button">"#));
    assert!(!state.session.is_running());
    Ok(())
}

#[tokio::test]
async fn spawn_failure_returns_to_idle() -> anyhow::Result<()> {
    let state = AppStateBuilder::new().deck(DECK).shell("/nonexistent/shell").build()?;
    let (viewer, mut frames) = channel_viewer();
    state.session.viewer().set_connection(viewer).await;
    let server = axum_test::TestServer::new(build_router(state.clone())).anyhow()?;

    server.post("/commands/1/start").await.assert_status(StatusCode::OK);
    frames.expect_clear().await?;
    wait_until(|| !state.session.is_running()).await?;

    let resp = server.get("/commands/1/status").await;
    resp.assert_status(StatusCode::OK);
    assert!(resp.text().contains(r#"<div id="execute-button">"#));
    Ok(())
}

#[tokio::test]
async fn start_preempts_other_slide() -> anyhow::Result<()> {
    let state = AppStateBuilder::new().deck(DECK).build()?;
    let (viewer, mut frames) = channel_viewer();
    state.session.viewer().set_connection(viewer).await;
    let server = axum_test::TestServer::new(build_router(state.clone())).anyhow()?;

    server.post("/commands/2/start").await.assert_status(StatusCode::OK);
    frames.expect_clear().await?;
    server.post("/commands/1/start").await.assert_status(StatusCode::OK);
    frames.expect_clear().await?;
    frames.text_until("hello").await?;
    wait_until(|| !state.session.is_running()).await?;
    Ok(())
}

#[tokio::test]
async fn stop_when_idle_is_ok() -> anyhow::Result<()> {
    let state = AppStateBuilder::new().deck(DECK).build()?;
    let (viewer, mut frames) = channel_viewer();
    state.session.viewer().set_connection(viewer).await;
    let server = axum_test::TestServer::new(build_router(state)).anyhow()?;

    server.post("/commands/1/stop").await.assert_status(StatusCode::OK);
    server.post("/commands/1/stop").await.assert_status(StatusCode::OK);
    assert!(frames.drain().iter().all(|f| *f != Frame::Closed));
    Ok(())
}

#[yare::parameterized(
    start_bad     = { "post", "/commands/x/start", StatusCode::BAD_REQUEST },
    start_missing = { "post", "/commands/9/start", StatusCode::NOT_FOUND },
    status_bad    = { "get", "/commands/x/status", StatusCode::BAD_REQUEST },
    status_missing = { "get", "/commands/9/status", StatusCode::NOT_FOUND },
    stop_bad      = { "post", "/commands/-1/stop", StatusCode::BAD_REQUEST },
    stop_missing  = { "post", "/commands/3/stop", StatusCode::NOT_FOUND },
)]
#[test_macro(tokio::test)]
async fn invalid_ids(method: &str, path: &str, expected: StatusCode) {
    let status = async {
        let state = AppStateBuilder::new().deck(DECK).build()?;
        let server = axum_test::TestServer::new(build_router(state)).anyhow()?;
        let resp = match method {
            "post" => server.post(path).await,
            _ => server.get(path).await,
        };
        anyhow::Ok(resp.status_code())
    }
    .await
    .ok();
    assert_eq!(status, Some(expected));
}
