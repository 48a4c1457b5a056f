// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Idle/running state machine shared by every request handler.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::runner::Runner;
use super::sink::{OutputSink, ViewerRegistry};
use super::RunOutcome;

/// The run that currently owns the session.
struct ActiveRun {
    generation: u64,
    token: CancellationToken,
}

/// Owns the running flag, the active run's cancellation token and the
/// viewer registry. Created once at startup and shared as `Arc`.
///
/// At most one run is active: `run` cancels its predecessor before
/// installing itself, and a finishing run only flips the flag back when it
/// is still the active generation.
pub struct CommandSession {
    running: AtomicBool,
    active: Mutex<Option<ActiveRun>>,
    /// Serializes `run` calls end to end (stop, clear, install).
    start_lock: tokio::sync::Mutex<()>,
    generation: AtomicU64,
    viewer: Arc<ViewerRegistry>,
    runner: Runner,
}

impl CommandSession {
    pub fn new(runner: Runner) -> Self {
        Self {
            running: AtomicBool::new(false),
            active: Mutex::new(None),
            start_lock: tokio::sync::Mutex::new(()),
            generation: AtomicU64::new(0),
            viewer: Arc::new(ViewerRegistry::new()),
            runner,
        }
    }

    pub fn viewer(&self) -> &Arc<ViewerRegistry> {
        &self.viewer
    }

    /// Lock-free; safe to poll from any number of handlers.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Start `script`, stopping whatever was running first.
    ///
    /// Returns immediately. With no viewer attached this only stops the
    /// previous run and returns `None`. Otherwise the returned handle
    /// resolves to the run's outcome; callers are free to drop it.
    pub async fn run(self: &Arc<Self>, script: Vec<String>) -> Option<JoinHandle<RunOutcome>> {
        let _serial = self.start_lock.lock().await;
        self.stop();

        if !self.viewer.is_attached() {
            debug!("no viewer attached, not starting commands");
            return None;
        }
        if let Err(e) = self.viewer.clear().await {
            warn!("error sending clear to viewer: {e}");
        }

        let token = CancellationToken::new();
        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
        {
            let mut active = self.active.lock();
            *active = Some(ActiveRun { generation, token: token.clone() });
            self.running.store(true, Ordering::Release);
        }

        let session = Arc::clone(self);
        Some(tokio::spawn(async move {
            info!(generation, commands = ?script, "starting commands");
            let sink = OutputSink::new(Arc::clone(&session.viewer), token.clone());
            let outcome = session.runner.execute(&script, sink, token).await;
            outcome.log(generation);
            session.finish(generation);
            outcome
        }))
    }

    /// Cancel the active run, if any. Never waits for the process to exit.
    pub fn stop(&self) {
        let mut active = self.active.lock();
        if let Some(run) = active.take() {
            info!(generation = run.generation, "stopping commands");
            run.token.cancel();
        }
        self.running.store(false, Ordering::Release);
    }

    /// Best-effort clear of the viewer's terminal.
    pub async fn clear(&self) {
        if let Err(e) = self.viewer.clear().await {
            debug!("error sending clear to viewer: {e}");
        }
    }

    /// Stop any run and close the viewer connection.
    pub async fn shutdown(&self) {
        self.stop();
        if let Err(e) = self.viewer.close().await {
            warn!("error closing viewer: {e:#}");
        }
    }

    /// Return to idle if `generation` is still the active run.
    fn finish(&self, generation: u64) {
        let mut active = self.active.lock();
        if active.as_ref().is_some_and(|run| run.generation == generation) {
            *active = None;
            self.running.store(false, Ordering::Release);
        }
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
