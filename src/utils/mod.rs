// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipegraph contributors

//! Terminal helpers for the CLI

pub mod colors;
pub mod spinner;

pub use colors::*;
pub use spinner::*;
