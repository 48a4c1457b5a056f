// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use present::config::Config;
use present::deck::Deck;
use present::terminal::{CommandSession, Runner};
use present::transport::{build_router, AppState};

/// How long open connections get to finish after a shutdown signal.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() {
    let config = Config::parse();

    if let Err(e) = config.validate() {
        eprintln!("error: {e}");
        std::process::exit(2);
    }

    init_tracing(&config);

    if let Err(e) = run(config).await {
        error!("fatal: {e:#}");
        std::process::exit(1);
    }
}

fn init_tracing(config: &Config) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    match config.log_format.as_str() {
        "json" => {
            fmt::fmt().with_env_filter(filter).json().init();
        }
        _ => {
            fmt::fmt().with_env_filter(filter).init();
        }
    }
}

async fn run(config: Config) -> anyhow::Result<()> {
    let deck = Deck::load(&config.commands)?;
    if deck.is_empty() {
        warn!(path = %config.commands.display(), "commands file has no slides");
    }
    info!(slides = deck.len(), path = %config.commands.display(), "loaded slides");

    let session = Arc::new(CommandSession::new(Runner::new(config.shell.clone())));
    let state = Arc::new(AppState::new(
        deck,
        Arc::clone(&session),
        config.assets_root().to_path_buf(),
    ));
    let router = build_router(state);

    let addr = config.bind_addr();
    let listener =
        TcpListener::bind(&addr).await.with_context(|| format!("could not listen on {addr}"))?;
    info!("presentation available at http://{addr}/presentation");

    let shutdown = CancellationToken::new();
    spawn_signal_handler(shutdown.clone());

    // Closing the viewer lets the websocket connection finish so graceful
    // shutdown doesn't wait on it.
    {
        let sd = shutdown.clone();
        let session = Arc::clone(&session);
        tokio::spawn(async move {
            sd.cancelled().await;
            session.shutdown().await;
        });
    }

    let server =
        axum::serve(listener, router).with_graceful_shutdown(shutdown.clone().cancelled_owned());
    tokio::select! {
        result = server.into_future() => result.context("HTTP server error")?,
        _ = async {
            shutdown.cancelled().await;
            tokio::time::sleep(SHUTDOWN_GRACE).await;
        } => {
            warn!("connections still open after {SHUTDOWN_GRACE:?}, exiting");
        }
    }

    info!("shutdown complete");
    Ok(())
}

fn spawn_signal_handler(shutdown: CancellationToken) {
    tokio::spawn(async move {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()).ok();
        let mut sigint =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt()).ok();

        tokio::select! {
            _ = async {
                if let Some(ref mut s) = sigterm { s.recv().await } else { std::future::pending().await }
            } => {
                info!("received SIGTERM");
            }
            _ = async {
                if let Some(ref mut s) = sigint { s.recv().await } else { std::future::pending().await }
            } => {
                info!("received SIGINT");
            }
        }
        shutdown.cancel();
    });
}
