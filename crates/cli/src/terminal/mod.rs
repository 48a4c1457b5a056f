// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command execution core: runs one slide script at a time and streams its
//! output to the attached browser terminal.
//!
//! Layering, leaf first:
//! - [`sink`]: the viewer registry and the per-run output sink
//! - [`runner`]: spawns the interpreter and pumps its pipes into the sink
//! - [`session`]: the idle/running state machine handlers talk to

pub mod runner;
pub mod session;
pub mod sink;

pub use runner::Runner;
pub use session::CommandSession;
pub use sink::{OutputSink, SinkError, Viewer, ViewerId, ViewerRegistry};

use tracing::{error, info, warn};

/// Clear the screen and move the cursor home.
pub const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Exit status of a finished interpreter process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitStatus {
    pub code: Option<i32>,
    pub signal: Option<i32>,
}

impl From<std::process::ExitStatus> for ExitStatus {
    fn from(status: std::process::ExitStatus) -> Self {
        use std::os::unix::process::ExitStatusExt;
        Self { code: status.code(), signal: status.signal() }
    }
}

impl std::fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.code, self.signal) {
            (Some(code), _) => write!(f, "exit code {code}"),
            (None, Some(sig)) => write!(f, "signal {sig}"),
            (None, None) => f.write_str("unknown status"),
        }
    }
}

/// How a run ended. Only used to pick a log severity; nothing upstream
/// branches on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The script exited zero.
    Completed,
    /// The script exited non-zero or was killed by something other than us.
    Failed(ExitStatus),
    /// The interpreter could not be started.
    SpawnFailed(String),
    /// Output could not be delivered, so the run was torn down.
    Abandoned(SinkError),
    /// The run was stopped or preempted.
    Cancelled,
}

impl RunOutcome {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Emit the terminal log event for a run.
    pub fn log(&self, generation: u64) {
        match self {
            Self::Completed => info!(generation, "commands completed"),
            Self::Cancelled => info!(generation, "commands stopped"),
            Self::Failed(status) => error!(generation, %status, "commands failed"),
            Self::SpawnFailed(e) => error!(generation, error = %e, "could not start commands"),
            Self::Abandoned(e) => warn!(generation, error = %e, "abandoned run, viewer unavailable"),
        }
    }
}
