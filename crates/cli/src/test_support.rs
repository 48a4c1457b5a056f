// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test infrastructure: builders, fake viewers, and assertion helpers.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::deck::Deck;
use crate::terminal::sink::ViewerFuture;
use crate::terminal::{CommandSession, Runner, Viewer, CLEAR_SCREEN};
use crate::transport::AppState;

/// How long helpers wait for a frame or condition before failing.
pub const WAIT_TIMEOUT: Duration = Duration::from_secs(5);

/// Builder for constructing `AppState` in tests with sensible defaults.
pub struct AppStateBuilder {
    deck: String,
    shell: String,
    assets_root: PathBuf,
}

impl Default for AppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AppStateBuilder {
    pub fn new() -> Self {
        Self { deck: String::new(), shell: "sh".to_owned(), assets_root: PathBuf::from(".") }
    }

    /// Commands file contents to parse into the deck.
    pub fn deck(mut self, contents: &str) -> Self {
        self.deck = contents.to_owned();
        self
    }

    pub fn shell(mut self, shell: &str) -> Self {
        self.shell = shell.to_owned();
        self
    }

    pub fn assets_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.assets_root = root.into();
        self
    }

    pub fn build(self) -> anyhow::Result<Arc<AppState>> {
        let deck = Deck::parse(&self.deck)?;
        let session = Arc::new(CommandSession::new(Runner::new(self.shell)));
        Ok(Arc::new(AppState::new(deck, session, self.assets_root)))
    }
}

/// What a [`ChannelViewer`] observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Text(String),
    Closed,
}

/// Viewer that forwards every frame to an unbounded channel.
pub struct ChannelViewer {
    tx: mpsc::UnboundedSender<Frame>,
}

impl Viewer for ChannelViewer {
    fn send_text(&mut self, text: String) -> ViewerFuture<'_> {
        Box::pin(async move {
            self.tx.send(Frame::Text(text)).map_err(|_| anyhow::anyhow!("receiver dropped"))
        })
    }

    fn close(&mut self) -> ViewerFuture<'_> {
        Box::pin(async move {
            let _ = self.tx.send(Frame::Closed);
            Ok(())
        })
    }
}

/// Create a viewer and the receiving end of its frames.
pub fn channel_viewer() -> (Box<dyn Viewer>, ViewerFrames) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Box::new(ChannelViewer { tx }), ViewerFrames { rx })
}

/// Receiving end of a [`ChannelViewer`].
pub struct ViewerFrames {
    rx: mpsc::UnboundedReceiver<Frame>,
}

impl ViewerFrames {
    /// Wait for the next frame.
    pub async fn next(&mut self) -> anyhow::Result<Frame> {
        match tokio::time::timeout(WAIT_TIMEOUT, self.rx.recv()).await {
            Ok(Some(frame)) => Ok(frame),
            Ok(None) => anyhow::bail!("viewer channel closed"),
            Err(_) => anyhow::bail!("timed out waiting for a frame"),
        }
    }

    /// Concatenate text frames until the output contains `needle`.
    pub async fn text_until(&mut self, needle: &str) -> anyhow::Result<String> {
        let mut text = String::new();
        while !text.contains(needle) {
            match self.next().await {
                Ok(Frame::Text(t)) => text.push_str(&t),
                Ok(Frame::Closed) => anyhow::bail!("viewer closed before {needle:?}, got {text:?}"),
                Err(e) => return Err(e.context(format!("waiting for {needle:?}, got {text:?}"))),
            }
        }
        Ok(text)
    }

    /// Wait for the clear-screen frame a run starts with.
    pub async fn expect_clear(&mut self) -> anyhow::Result<()> {
        let frame = self.next().await?;
        anyhow::ensure!(frame == Frame::Text(CLEAR_SCREEN.to_owned()), "expected clear, got {frame:?}");
        Ok(())
    }

    /// Frames already delivered, without waiting.
    pub fn drain(&mut self) -> Vec<Frame> {
        let mut frames = Vec::new();
        while let Ok(frame) = self.rx.try_recv() {
            frames.push(frame);
        }
        frames
    }
}

/// Viewer whose sends always fail.
pub struct FailingViewer;

impl Viewer for FailingViewer {
    fn send_text(&mut self, _text: String) -> ViewerFuture<'_> {
        Box::pin(async { Err(anyhow::anyhow!("connection reset")) })
    }

    fn close(&mut self) -> ViewerFuture<'_> {
        Box::pin(async { Ok(()) })
    }
}

/// Viewer that accepts `ok_sends` frames, then never finishes another send,
/// like a half-open socket.
pub struct StallingViewer {
    ok_sends: usize,
}

impl StallingViewer {
    pub fn after(ok_sends: usize) -> Self {
        Self { ok_sends }
    }
}

impl Viewer for StallingViewer {
    fn send_text(&mut self, _text: String) -> ViewerFuture<'_> {
        if self.ok_sends == 0 {
            return Box::pin(std::future::pending());
        }
        self.ok_sends -= 1;
        Box::pin(async { Ok(()) })
    }

    fn close(&mut self) -> ViewerFuture<'_> {
        Box::pin(async { Ok(()) })
    }
}

/// Poll `cond` until it holds or [`WAIT_TIMEOUT`] elapses.
pub async fn wait_until(mut cond: impl FnMut() -> bool) -> anyhow::Result<()> {
    let deadline = tokio::time::Instant::now() + WAIT_TIMEOUT;
    while !cond() {
        anyhow::ensure!(tokio::time::Instant::now() < deadline, "condition not met in time");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    Ok(())
}

/// Extension trait to convert any `Display` error into `anyhow::Error`.
/// Replaces `.map_err(|e| anyhow::anyhow!("{e}"))` with `.anyhow()`.
pub trait AnyhowExt<T> {
    fn anyhow(self) -> anyhow::Result<T>;
}

impl<T, E: std::fmt::Display> AnyhowExt<T> for Result<T, E> {
    fn anyhow(self) -> anyhow::Result<T> {
        self.map_err(|e| anyhow::anyhow!("{e}"))
    }
}

/// Assert that `$expr` is `Err` and its message contains `$substr`.
#[macro_export]
macro_rules! assert_err_contains {
    ($expr:expr, $substr:expr) => {{
        let result = $expr;
        let err = result.expect_err(concat!("expected Err for: ", stringify!($expr)));
        let msg = format!("{err:#}");
        assert!(msg.contains($substr), "expected error containing {:?}, got: {msg:?}", $substr);
    }};
}

/// Spawn an HTTP server on a random port for integration testing.
///
/// Returns the bound address and a join handle for the server task.
pub async fn spawn_http_server(
    state: Arc<AppState>,
) -> anyhow::Result<(std::net::SocketAddr, tokio::task::JoinHandle<()>)> {
    let router = crate::transport::build_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let handle = tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    Ok((addr, handle))
}
