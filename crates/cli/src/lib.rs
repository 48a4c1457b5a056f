// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

pub mod config;
pub mod deck;
pub mod error;
pub mod render;
pub mod terminal;
pub mod test_support;
pub mod transport;
