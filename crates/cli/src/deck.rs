// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Slide deck parsing.
//!
//! A commands file is a sequence of blocks separated by blank lines. A
//! trailing `\` joins a line with the next one. Each block becomes one
//! slide:
//!
//! - a fenced code block (```` ``` ````) is shown highlighted
//! - a block with a `$ ` or `$! ` line in the first column is a command slide
//! - anything else is markdown

use std::path::Path;

use anyhow::Context;
use pulldown_cmark::{html, Event, Options, Parser};
use regex::Regex;

use crate::error::ErrorCode;

/// A `\` at the end of a line, optionally followed by spaces or tabs.
const LINE_CONTINUATION: &str = r"\\[ \t]*\n";

/// Prefix of an executed line that is hidden unless it is the last line.
const HIDDEN_PREFIX: &str = "$ ";
/// Prefix of an executed line that is always shown.
const SHOWN_PREFIX: &str = "$! ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideKind {
    Plain,
    CodeBlock,
    Command,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slide {
    pub id: usize,
    pub kind: SlideKind,
    /// HTML for plain and code slides; newline-joined display lines for
    /// command slides.
    pub content: String,
    /// Lines handed to the shell. Empty unless `kind` is `Command`.
    pub execute: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Deck {
    slides: Vec<Slide>,
}

impl Deck {
    /// Read and parse a commands file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("could not read content from '{}'", path.display()))?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> anyhow::Result<Self> {
        let mut deck = Self::default();
        for block in split_blocks(contents)? {
            deck.push(block.trim());
        }
        Ok(deck)
    }

    fn push(&mut self, block: &str) {
        if block.is_empty() {
            return;
        }
        let id = self.slides.len();
        let slide = if block.starts_with("```") {
            Slide { id, kind: SlideKind::CodeBlock, content: render_markdown(block), execute: vec![] }
        } else if is_command(block) {
            let (display, execute) = parse_command_block(block);
            Slide { id, kind: SlideKind::Command, content: display.join("\n"), execute }
        } else {
            Slide { id, kind: SlideKind::Plain, content: render_markdown(block), execute: vec![] }
        };
        self.slides.push(slide);
    }

    pub fn get(&self, idx: usize) -> Result<&Slide, ErrorCode> {
        self.slides.get(idx).ok_or(ErrorCode::SlideNotFound)
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }
}

/// Join continued lines and split into non-blank blocks.
fn split_blocks(contents: &str) -> anyhow::Result<Vec<String>> {
    let continuation = Regex::new(LINE_CONTINUATION)?;
    let normalized = contents.replace("\r\n", "\n");
    let joined = continuation.replace_all(&normalized, "");
    Ok(joined
        .split("\n\n")
        .filter(|block| !block.trim().is_empty())
        .map(str::to_owned)
        .collect())
}

/// A block is a command slide when some line starts with a prefix in the
/// first column; indented `$ ` lines stay prose.
fn is_command(block: &str) -> bool {
    block.lines().any(|l| l.starts_with(HIDDEN_PREFIX) || l.starts_with(SHOWN_PREFIX))
}

/// Split a command block into (display lines, executed lines).
///
/// Every `$ ` and `$! ` line starting in the first column is executed in
/// order. `$! ` lines are always shown; the final line is shown when it is
/// a `$ ` line. Indented prefixes are prose.
fn parse_command_block(block: &str) -> (Vec<String>, Vec<String>) {
    let lines: Vec<&str> =
        block.lines().filter(|l| !l.trim().is_empty()).map(str::trim_end).collect();
    let last = lines.len().saturating_sub(1);
    let mut display = Vec::new();
    let mut execute = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        if let Some(cmd) = line.strip_prefix(SHOWN_PREFIX) {
            display.push(cmd.to_owned());
            execute.push(cmd.to_owned());
        } else if let Some(cmd) = line.strip_prefix(HIDDEN_PREFIX) {
            execute.push(cmd.to_owned());
            if i == last {
                display.push(cmd.to_owned());
            }
        }
    }
    (display, execute)
}

/// Render markdown with GitHub-style extensions and hard line breaks.
/// Raw HTML passes through; deck authors are trusted.
pub fn render_markdown(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(markdown, options).map(|event| match event {
        Event::SoftBreak => Event::HardBreak,
        other => other,
    });
    let mut out = String::new();
    html::push_html(&mut out, parser);
    out
}

/// Index of the slide after `idx`, wrapping at the end.
pub fn next_slide(idx: usize, total: usize) -> usize {
    if total == 0 {
        return 0;
    }
    (idx + 1) % total
}

/// Index of the slide before `idx`, wrapping at the start.
pub fn prev_slide(idx: usize, total: usize) -> usize {
    if total == 0 {
        return 0;
    }
    (idx % total + total - 1) % total
}

#[cfg(test)]
#[path = "deck_tests.rs"]
mod tests;
