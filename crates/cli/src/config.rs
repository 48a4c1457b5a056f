// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::{Path, PathBuf};

use clap::Parser;

/// Serve a slide deck whose command slides run live in the browser.
#[derive(Debug, Clone, Parser)]
#[command(name = "present", version, about)]
pub struct Config {
    /// Commands file containing the slides.
    #[arg(short = 'c', long, env = "PRESENT_COMMANDS")]
    pub commands: PathBuf,

    /// Host address to bind to.
    #[arg(long, env = "PRESENT_HOST", default_value = "localhost")]
    pub host: String,

    /// HTTP port to listen on.
    #[arg(long, env = "PRESENT_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Interpreter used to run command slides (invoked as `<shell> -c`).
    #[arg(long, env = "PRESENT_SHELL", default_value = "sh")]
    pub shell: String,

    /// Log format (json or text).
    #[arg(long, env = "PRESENT_LOG_FORMAT", default_value = "text")]
    pub log_format: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, env = "PRESENT_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Config {
    /// Validate the configuration after parsing.
    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.commands.is_file() {
            anyhow::bail!("commands file not found: {}", self.commands.display());
        }
        if self.port == 0 {
            anyhow::bail!("--port must be non-zero");
        }
        if self.shell.trim().is_empty() {
            anyhow::bail!("--shell must not be empty");
        }
        match self.log_format.as_str() {
            "json" | "text" => {}
            other => anyhow::bail!("invalid log format: {other}"),
        }
        Ok(())
    }

    /// Directory that relative asset links in the slides resolve against.
    pub fn assets_root(&self) -> &Path {
        match self.commands.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        }
    }

    /// Address to bind the HTTP listener on.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Build a minimal `Config` for tests.
    #[doc(hidden)]
    pub fn test(commands: impl Into<PathBuf>) -> Self {
        Self {
            commands: commands.into(),
            host: "127.0.0.1".into(),
            port: 8080,
            shell: "sh".into(),
            log_format: "text".into(),
            log_level: "debug".into(),
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
