// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Spawns the shell for one script and pumps its output into the viewer.
//!
//! stdout and stderr are read on separate pipes and forwarded as each read
//! completes. Ordering is FIFO within a stream only: a stderr line may
//! reach the viewer before a stdout line the script printed earlier.

use std::process::Stdio;

use nix::sys::signal::{killpg, Signal};
use nix::unistd::Pid;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, Command};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::sink::{OutputSink, SinkError};
use super::RunOutcome;

/// Read size for the interpreter's pipes.
pub const OUTPUT_CHUNK_SIZE: usize = 1024;

/// Default interpreter.
pub const DEFAULT_SHELL: &str = "sh";

/// Runs scripts through `<shell> -c`.
#[derive(Debug, Clone)]
pub struct Runner {
    shell: String,
}

impl Runner {
    pub fn new(shell: impl Into<String>) -> Self {
        Self { shell: shell.into() }
    }

    /// Build the interpreter command for `script`.
    ///
    /// All lines go to one interpreter so `export` in an early line is
    /// visible to later ones. The child leads its own process group so a
    /// cancel can take out the whole pipeline.
    fn command(&self, script: &[String]) -> Command {
        let mut cmd = Command::new(&self.shell);
        cmd.arg("-c")
            .arg(script.join("\n"))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .process_group(0)
            .kill_on_drop(true);
        cmd
    }

    /// Run `script` to completion or until `token` fires.
    pub async fn execute(
        &self,
        script: &[String],
        mut sink: OutputSink,
        token: CancellationToken,
    ) -> RunOutcome {
        let mut child = match self.command(script).spawn() {
            Ok(child) => child,
            Err(e) => return RunOutcome::SpawnFailed(format!("{}: {e}", self.shell)),
        };
        debug!(pid = child.id(), shell = %self.shell, "spawned interpreter");

        let (Some(mut stdout), Some(mut stderr)) = (child.stdout.take(), child.stderr.take())
        else {
            terminate(&mut child).await;
            return RunOutcome::SpawnFailed("interpreter pipes unavailable".to_owned());
        };

        let mut out_buf = vec![0u8; OUTPUT_CHUNK_SIZE];
        let mut err_buf = vec![0u8; OUTPUT_CHUNK_SIZE];
        let mut out_open = true;
        let mut err_open = true;

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    terminate(&mut child).await;
                    return RunOutcome::Cancelled;
                }
                read = stdout.read(&mut out_buf), if out_open => {
                    match read {
                        Ok(0) => out_open = false,
                        Ok(n) => {
                            if let Err(e) = forward(&mut sink, &token, &out_buf[..n]).await {
                                return abandon(&mut child, &token, e).await;
                            }
                        }
                        Err(e) => {
                            debug!("stdout read failed: {e}");
                            out_open = false;
                        }
                    }
                }
                read = stderr.read(&mut err_buf), if err_open => {
                    match read {
                        Ok(0) => err_open = false,
                        Ok(n) => {
                            if let Err(e) = forward(&mut sink, &token, &err_buf[..n]).await {
                                return abandon(&mut child, &token, e).await;
                            }
                        }
                        Err(e) => {
                            debug!("stderr read failed: {e}");
                            err_open = false;
                        }
                    }
                }
                status = child.wait(), if !out_open && !err_open => {
                    if token.is_cancelled() {
                        return RunOutcome::Cancelled;
                    }
                    let flushed = tokio::select! {
                        biased;
                        _ = token.cancelled() => Err(SinkError::Cancelled),
                        flushed = sink.finish() => flushed,
                    };
                    if let Err(e) = flushed {
                        return abandon(&mut child, &token, e).await;
                    }
                    return match status {
                        Ok(status) if status.success() => RunOutcome::Completed,
                        Ok(status) => RunOutcome::Failed(status.into()),
                        Err(e) => RunOutcome::SpawnFailed(format!("wait failed: {e}")),
                    };
                }
            }
        }
    }
}

impl Default for Runner {
    fn default() -> Self {
        Self::new(DEFAULT_SHELL)
    }
}

/// Write one chunk, giving up as soon as `token` fires so a viewer that
/// stopped reading can't hold the run open.
async fn forward(
    sink: &mut OutputSink,
    token: &CancellationToken,
    bytes: &[u8],
) -> Result<(), SinkError> {
    tokio::select! {
        biased;
        _ = token.cancelled() => Err(SinkError::Cancelled),
        written = sink.write(bytes) => written,
    }
}

/// Tear the run down after a failed write. A cancelled write means the run
/// was stopped rather than lost its viewer.
async fn abandon(
    child: &mut Child,
    token: &CancellationToken,
    error: SinkError,
) -> RunOutcome {
    terminate(child).await;
    if token.is_cancelled() {
        RunOutcome::Cancelled
    } else {
        RunOutcome::Abandoned(error)
    }
}

/// SIGKILL the interpreter's process group, then reap it.
async fn terminate(child: &mut Child) {
    if let Some(pid) = child.id() {
        let pgid = Pid::from_raw(pid as i32);
        if let Err(e) = killpg(pgid, Signal::SIGKILL) {
            warn!(pid, "failed to signal process group: {e}");
            if let Err(e) = child.start_kill() {
                warn!(pid, "failed to kill interpreter: {e}");
            }
        }
    }
    if let Err(e) = child.wait().await {
        debug!("error reaping interpreter: {e}");
    }
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
