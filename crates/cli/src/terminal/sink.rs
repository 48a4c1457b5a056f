// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The single viewer connection and the write path into it.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::CLEAR_SCREEN;

/// Upper bound on a single viewer send or close.
pub const VIEWER_SEND_TIMEOUT: Duration = Duration::from_secs(5);

/// Boxed future returned by [`Viewer`] methods.
pub type ViewerFuture<'a> = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>>;

/// Send half of a duplex connection to a browser terminal.
///
/// Object-safe for use as `Box<dyn Viewer>`.
pub trait Viewer: Send + 'static {
    /// Send one text frame.
    fn send_text(&mut self, text: String) -> ViewerFuture<'_>;

    /// Close the connection. Called at most once per viewer.
    fn close(&mut self) -> ViewerFuture<'_>;
}

/// Errors from writing to the viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkError {
    /// The run's cancellation token fired before the write.
    Cancelled,
    /// No viewer is attached.
    NotReady,
    /// The viewer rejected the frame.
    Send(String),
}

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cancelled => f.write_str("run cancelled"),
            Self::NotReady => f.write_str("viewer connection not yet ready"),
            Self::Send(e) => write!(f, "error sending to viewer: {e}"),
        }
    }
}

impl std::error::Error for SinkError {}

/// Identifies one attached connection so a stale detach can't evict a newer one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewerId(u64);

impl fmt::Display for ViewerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "viewer-{}", self.0)
    }
}

/// One attached viewer. Sends serialize on its own lock.
type Connection = Arc<Mutex<Box<dyn Viewer>>>;

struct Attached {
    id: ViewerId,
    conn: Connection,
}

/// Holds the one live viewer connection.
///
/// The slot lock is only held long enough to swap or clone the connection
/// handle, so replacing or detaching a viewer never waits on a send. Every
/// send holds the connection's own lock, so frames from concurrent writers
/// never interleave.
pub struct ViewerRegistry {
    slot: parking_lot::Mutex<Option<Attached>>,
    next_id: AtomicU64,
    send_timeout: Duration,
}

impl ViewerRegistry {
    pub fn new() -> Self {
        Self::with_send_timeout(VIEWER_SEND_TIMEOUT)
    }

    /// A registry whose sends and closes give up after `send_timeout`.
    pub fn with_send_timeout(send_timeout: Duration) -> Self {
        Self { slot: parking_lot::Mutex::new(None), next_id: AtomicU64::new(1), send_timeout }
    }

    /// Install `viewer` as the live connection, closing any previous one.
    ///
    /// A run in progress keeps going; its next frame lands on the new viewer.
    /// When the old connection is stuck in a send it is closed in the
    /// background instead.
    pub async fn set_connection(&self, viewer: Box<dyn Viewer>) -> ViewerId {
        let id = ViewerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let conn = Arc::new(Mutex::new(viewer));
        let previous = self.slot.lock().replace(Attached { id, conn });
        let Some(old) = previous else {
            return id;
        };

        debug!(viewer = %old.id, "closing replaced viewer");
        let limit = self.send_timeout;
        match Arc::clone(&old.conn).try_lock_owned() {
            Ok(mut viewer) => {
                if let Err(e) = close_locked(old.id, &mut **viewer, limit).await {
                    warn!(viewer = %old.id, "error closing replaced viewer: {e:#}");
                }
            }
            Err(_) => {
                tokio::spawn(async move {
                    if let Err(e) = close_connection(old.id, old.conn, limit).await {
                        warn!(viewer = %old.id, "error closing replaced viewer: {e:#}");
                    }
                });
            }
        }
        id
    }

    /// Close and clear the current connection, if any.
    pub async fn close(&self) -> anyhow::Result<()> {
        let current = self.slot.lock().take();
        match current {
            Some(Attached { id, conn }) => close_connection(id, conn, self.send_timeout).await,
            None => Ok(()),
        }
    }

    /// Clear the slot only if `id` is still the live connection.
    ///
    /// Returns whether anything was removed.
    pub fn detach(&self, id: ViewerId) -> bool {
        let mut slot = self.slot.lock();
        if slot.as_ref().is_some_and(|a| a.id == id) {
            *slot = None;
            true
        } else {
            false
        }
    }

    pub fn is_attached(&self) -> bool {
        self.slot.lock().is_some()
    }

    /// Send the clear-screen sequence.
    pub async fn clear(&self) -> Result<(), SinkError> {
        self.send(CLEAR_SCREEN.to_owned(), None).await
    }

    /// Send one frame. When `guard` is given, it is checked again once the
    /// connection is locked so a cancelled run can't slip a frame in behind
    /// the next run's clear.
    async fn send(&self, text: String, guard: Option<&CancellationToken>) -> Result<(), SinkError> {
        let conn = self.slot.lock().as_ref().map(|a| Arc::clone(&a.conn));
        let conn = conn.ok_or(SinkError::NotReady)?;
        let mut viewer = conn.lock().await;
        if guard.is_some_and(|t| t.is_cancelled()) {
            return Err(SinkError::Cancelled);
        }
        match tokio::time::timeout(self.send_timeout, viewer.send_text(text)).await {
            Ok(sent) => sent.map_err(|e| SinkError::Send(format!("{e:#}"))),
            Err(_) => Err(SinkError::Send(format!("no progress after {:?}", self.send_timeout))),
        }
    }
}

impl Default for ViewerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait for the connection to go idle, then close it.
async fn close_connection(id: ViewerId, conn: Connection, limit: Duration) -> anyhow::Result<()> {
    let mut viewer = tokio::time::timeout(limit, conn.lock_owned())
        .await
        .map_err(|_| anyhow::anyhow!("{id} still busy after {limit:?}"))?;
    close_locked(id, &mut **viewer, limit).await
}

async fn close_locked(
    id: ViewerId,
    viewer: &mut dyn Viewer,
    limit: Duration,
) -> anyhow::Result<()> {
    tokio::time::timeout(limit, viewer.close())
        .await
        .map_err(|_| anyhow::anyhow!("{id} did not close within {limit:?}"))?
}

/// Terminal emulators need an explicit carriage return after each line feed.
pub fn translate_newlines(text: &str) -> String {
    text.replace('\n', "\n\r")
}

/// Per-run write side: checks cancellation, decodes UTF-8 across chunk
/// boundaries, translates newlines and forwards to the registry.
pub struct OutputSink {
    registry: Arc<ViewerRegistry>,
    token: CancellationToken,
    pending: Vec<u8>,
}

impl OutputSink {
    pub fn new(registry: Arc<ViewerRegistry>, token: CancellationToken) -> Self {
        Self { registry, token, pending: Vec::new() }
    }

    /// Write one chunk of raw process output.
    pub async fn write(&mut self, bytes: &[u8]) -> Result<(), SinkError> {
        if self.token.is_cancelled() {
            return Err(SinkError::Cancelled);
        }
        let text = self.decode(bytes);
        if text.is_empty() {
            return Ok(());
        }
        self.registry.send(translate_newlines(&text), Some(&self.token)).await
    }

    /// Flush bytes held back waiting for the rest of a multi-byte character.
    pub async fn finish(&mut self) -> Result<(), SinkError> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let rest = std::mem::take(&mut self.pending);
        let text = String::from_utf8_lossy(&rest).into_owned();
        self.registry.send(translate_newlines(&text), Some(&self.token)).await
    }

    /// Decode as much of `pending + bytes` as possible. Invalid bytes become
    /// U+FFFD; only an incomplete sequence at the very end is kept for the
    /// next chunk.
    fn decode(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);
        let mut text = String::new();
        let mut rest: &[u8] = &self.pending;
        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    text.push_str(valid);
                    rest = &[];
                    break;
                }
                Err(e) => {
                    let (valid, after) = rest.split_at(e.valid_up_to());
                    text.push_str(&String::from_utf8_lossy(valid));
                    match e.error_len() {
                        Some(len) => {
                            text.push(char::REPLACEMENT_CHARACTER);
                            rest = &after[len..];
                        }
                        None => {
                            rest = after;
                            break;
                        }
                    }
                }
            }
        }
        let consumed = self.pending.len() - rest.len();
        self.pending.drain(..consumed);
        text
    }
}

#[cfg(test)]
#[path = "sink_tests.rs"]
mod tests;
