// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipegraph contributors

//! Progress spinner utilities
//!
//! Shown on stderr while the pipeline service is being queried.

use indicatif::{ProgressBar, ProgressStyle};
use std::future::Future;
use std::time::Duration;

/// Create a spinner for indeterminate progress
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
        .template("{spinner:.blue} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Await `future` behind a spinner, clearing it when done
pub async fn with_spinner<F, T>(message: &str, future: F) -> T
where
    F: Future<Output = T>,
{
    let pb = create_spinner(message);
    let output = future.await;
    pb.finish_and_clear();
    output
}
