// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::deck::Deck;

fn deck() -> anyhow::Result<Deck> {
    Deck::parse("# Title\n\n$ cd /tmp\n$! echo <b>hi</b>\n\n```rust\nfn main() {}\n```")
}

#[test]
fn index_page_wraps_content() {
    let page = index_page("<p>inner</p>");
    assert!(page.starts_with("<!DOCTYPE html>"));
    assert!(page.contains("<title>Backend Demo Tool</title>"));
    assert!(page.contains(r#"<script src="/static/main.js"></script>"#));
    assert!(page.contains("htmx"));
    assert!(page.contains("xterm"));
    assert!(page.contains("highlight"));
    assert!(page.contains("<body>\n<p>inner</p>\n</body>"));
}

#[test]
fn plain_slide_hides_terminal_panel() -> anyhow::Result<()> {
    let deck = deck()?;
    let html = content_div(0, deck.len(), deck.get(0)?, false);
    assert!(html.contains(r#"<div id="command">"#));
    assert!(html.contains(r#"<div class="text-string"><h1>Title</h1></div>"#));
    assert!(html.contains(r#"<div id="terminal-panel" hidden="true">"#));
    assert!(html.contains(r#"<div id="terminal" hx-preserve="true"></div>"#));
    assert!(!html.contains("run-control"));
    Ok(())
}

#[test]
fn command_slide_escapes_and_shows_controls() -> anyhow::Result<()> {
    let deck = deck()?;
    let html = content_div(1, deck.len(), deck.get(1)?, false);
    assert!(html.contains(r#"<div class="command-string"><p>echo &lt;b&gt;hi&lt;/b&gt;</p></div>"#));
    assert!(html.contains(r#"<div id="terminal-panel">"#));
    assert!(html.contains(r#"hx-post="/commands/1/start""#));
    assert!(html.contains(r#"<div id="execute-button">"#));
    Ok(())
}

#[test]
fn code_slide_keeps_markup() -> anyhow::Result<()> {
    let deck = deck()?;
    let html = content_div(2, deck.len(), deck.get(2)?, false);
    assert!(html.contains(r#"<code class="language-rust">"#));
    Ok(())
}

#[yare::parameterized(
    first = { 0, "/slides/2", "/slides/1" },
    middle = { 1, "/slides/0", "/slides/2" },
    last = { 2, "/slides/1", "/slides/0" },
)]
fn navigation_links_wrap(idx: usize, prev: &str, next: &str) {
    let slides = Deck::parse("a\n\nb\n\nc").map(|d| d.slides().to_vec()).unwrap_or_default();
    assert_eq!(slides.len(), 3);
    let html = content_div(idx, slides.len(), &slides[idx], false);
    assert!(html.contains(&format!(r#"hx-get="{prev}" hx-swap="outerHTML""#)), "{html}");
    assert!(html.contains(&format!(r#"hx-get="{next}" hx-swap="outerHTML""#)), "{html}");
    assert!(html.contains("ArrowLeft"));
    assert!(html.contains("ArrowRight"));
}

#[test]
fn select_marks_current_slide() {
    let html = slide_select(1, 3);
    assert!(html.contains(r#"name="idx""#));
    assert!(html.contains(r#"hx-get="/slides/""#));
    assert!(html.contains(r#"<option value="0">Slide 1/3</option>"#));
    assert!(html.contains(r#"<option value="1" selected>Slide 2/3</option>"#));
    assert!(html.contains(r#"<option value="2">Slide 3/3</option>"#));
}

#[test]
fn idle_button_starts_run() {
    let html = running_button(4, false);
    assert!(html.contains(r#"<div id="execute-button">"#));
    assert!(html.contains(r#"hx-post="/commands/4/start""#));
    assert!(html.contains("<button>execute</button>"));
    assert!(html.contains("keyup[key==' '] from:body"));
    assert!(!html.contains("every 100ms"));
}

#[test]
fn running_button_polls_status_and_stops() {
    let html = running_button(4, true);
    assert!(html.contains(r#"hx-get="/commands/4/status" hx-trigger="every 100ms""#));
    assert!(html.contains(r#"<div id="stop-button">"#));
    assert!(html.contains(r#"hx-post="/commands/4/stop""#));
    assert!(html.contains("<button>stop</button>"));
    assert!(!html.contains("/start"));
}

#[yare::parameterized(
    plain   = { "echo hi", "echo hi" },
    tags    = { "<script>", "&lt;script&gt;" },
    amp     = { "a && b", "a &amp;&amp; b" },
    quotes  = { r#"say "hi" 'there'"#, "say &quot;hi&quot; &#39;there&#39;" },
)]
fn escapes_html(input: &str, expected: &str) {
    assert_eq!(html_escape(input), expected);
}
