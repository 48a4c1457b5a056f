// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use axum::http::StatusCode;

use crate::test_support::AppStateBuilder;

#[yare::parameterized(
    not_a_number = { "abc", StatusCode::BAD_REQUEST, "BAD_REQUEST" },
    negative     = { "-1", StatusCode::BAD_REQUEST, "BAD_REQUEST" },
    empty        = { "", StatusCode::BAD_REQUEST, "BAD_REQUEST" },
    past_end     = { "2", StatusCode::NOT_FOUND, "SLIDE_NOT_FOUND" },
    way_past_end = { "999", StatusCode::NOT_FOUND, "SLIDE_NOT_FOUND" },
)]
fn slide_lookup_errors(raw: &str, status: StatusCode, code: &str) {
    let got = lookup_error(raw).map_err(|e| e.to_string());
    assert_eq!(got, Ok((status, code.to_owned())));
}

fn lookup_error(raw: &str) -> anyhow::Result<(StatusCode, String)> {
    let state = AppStateBuilder::new().deck("one\n\n$ echo two").build()?;
    match state.slide(raw) {
        Ok(_) => anyhow::bail!("lookup of {raw:?} should fail"),
        Err((status, axum::Json(body))) => Ok((status, body.error.code)),
    }
}

#[test]
fn slide_lookup_finds_slide() -> anyhow::Result<()> {
    let state = AppStateBuilder::new().deck("one\n\n$ echo two").build()?;
    let Ok((idx, slide)) = state.slide("1") else {
        anyhow::bail!("slide 1 should resolve");
    };
    assert_eq!(idx, 1);
    assert_eq!(slide.execute, vec!["echo two"]);
    Ok(())
}
