// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! htmx page fragments.
//!
//! The slide area is swapped as a whole (`#command`); the run controls are
//! swapped on their own (`#run-control`) so the terminal above them keeps
//! its scrollback.

use std::fmt::Write;

use crate::deck::{next_slide, prev_slide, Slide, SlideKind};

const HTMX_JS: &str = "https://unpkg.com/htmx.org@1.9.12/dist/htmx.min.js";
const XTERM_JS: &str = "https://unpkg.com/@xterm/xterm@5.5.0/lib/xterm.js";
const XTERM_CSS: &str = "https://unpkg.com/@xterm/xterm@5.5.0/css/xterm.css";
const HIGHLIGHT_JS: &str = "https://cdnjs.cloudflare.com/ajax/libs/highlight.js/11.9.0/highlight.min.js";
const HIGHLIGHT_CSS: &str =
    "https://cdnjs.cloudflare.com/ajax/libs/highlight.js/11.9.0/styles/github-dark.min.css";

pub const PAGE_TITLE: &str = "Backend Demo Tool";

/// Wrap `content` in the full document.
pub fn index_page(content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<title>{PAGE_TITLE}</title>
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<script src="/static/main.js"></script>
<script src="{HIGHLIGHT_JS}"></script>
<script src="{HTMX_JS}"></script>
<script src="{XTERM_JS}"></script>
<link rel="stylesheet" href="/static/main.css">
<link rel="stylesheet" href="{XTERM_CSS}">
<link rel="stylesheet" href="{HIGHLIGHT_CSS}">
</head>
<body>
{content}
</body>
</html>
"#
    )
}

/// The `#command` fragment for slide `idx` of `total`.
pub fn content_div(idx: usize, total: usize, slide: &Slide, running: bool) -> String {
    let prev = prev_slide(idx, total);
    let next = next_slide(idx, total);
    let is_command = slide.kind == SlideKind::Command;
    let body = match slide.kind {
        SlideKind::Command => {
            format!(r#"<div class="command-string"><p>{}</p></div>"#, html_escape(&slide.content))
        }
        SlideKind::Plain | SlideKind::CodeBlock => {
            format!(r#"<div class="text-string">{}</div>"#, slide.content.trim())
        }
    };
    // Non-command slides get no controls so the space binding stays inert.
    let (hidden, button) = if is_command {
        ("", running_button(slide.id, running))
    } else {
        (r#" hidden="true""#, String::new())
    };

    format!(
        r##"<div id="command">
<div id="controls">
{select}
<form class="control" hx-get="/slides/{prev}" hx-swap="outerHTML" hx-target="#command" hx-trigger="click, keyup[key=='ArrowLeft'] from:body"><button>prev</button></form>
<form class="control" hx-get="/slides/{next}" hx-swap="outerHTML" hx-target="#command" hx-trigger="click, keyup[key=='ArrowRight'] from:body"><button>next</button></form>
</div>
<div id="slide-content">{body}</div>
<div id="terminal-panel"{hidden}>
<div id="terminal" hx-preserve="true"></div>
{button}
</div>
</div>
"##,
        select = slide_select(idx, total),
    )
}

/// Drop-down jumping to any slide via `/slides/?idx=N`.
pub fn slide_select(idx: usize, total: usize) -> String {
    let mut options = String::new();
    for i in 0..total {
        let selected = if i == idx { " selected" } else { "" };
        let _ = write!(options, r#"<option value="{i}"{selected}>Slide {}/{total}</option>"#, i + 1);
    }
    format!(
        r##"<select hx-get="/slides/" hx-target="#command" hx-swap="outerHTML" name="idx">{options}</select>"##
    )
}

/// Execute or stop controls for slide `idx`.
///
/// While running, the wrapper polls the status endpoint and replaces itself
/// with the idle controls once the run ends; the endpoint answers 204 in
/// the meantime so nothing is swapped.
pub fn running_button(idx: usize, running: bool) -> String {
    if running {
        format!(
            r##"<div id="run-control" hx-get="/commands/{idx}/status" hx-trigger="every 100ms" hx-target="#run-control" hx-swap="outerHTML">
<div id="stop-button">
{}
</div>
</div>"##,
            control_forms(idx, "stop")
        )
    } else {
        format!(
            r##"<div id="run-control">
<div id="execute-button">
{}
</div>
</div>"##,
            control_forms(idx, "start")
        )
    }
}

/// A visible button plus a hidden form bound to the space key.
fn control_forms(idx: usize, action: &str) -> String {
    let label = if action == "start" { "execute" } else { "stop" };
    format!(
        r##"<form hx-post="/commands/{idx}/{action}" hx-target="#run-control" hx-swap="outerHTML"><button>{label}</button></form>
<form hx-post="/commands/{idx}/{action}" hx-target="#run-control" hx-swap="outerHTML" hx-trigger="keyup[key==' '] from:body" hidden="true"></form>"##
    )
}

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
#[path = "render_tests.rs"]
mod tests;
