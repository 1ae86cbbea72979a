// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipegraph contributors

//! List command - show available pipelines

use colored::Colorize;
use miette::Result;

use crate::config::EditorConfig;
use crate::editor::EditorSession;
use crate::source;
use crate::utils::{print_header, with_spinner};

/// Run the list command
pub async fn run(config: EditorConfig, verbose: bool) -> Result<()> {
    let source = source::from_config(&config)?;
    let origin = source.describe();
    let mut session = EditorSession::new(config, source);

    let pipelines = with_spinner("Fetching pipelines...", session.refresh_pipelines()).await?;

    if pipelines.is_empty() {
        println!("No pipelines found in {}", origin);
        return Ok(());
    }

    print_header(&format!("Pipelines ({})", pipelines.len()));
    let width = pipelines.iter().map(|p| p.id.len()).max().unwrap_or(0);

    for pipeline in pipelines {
        let id = format!("{:<width$}", pipeline.id, width = width);
        println!("  {}  {}", id.bold(), pipeline.name);
        if verbose {
            if let Some(description) = &pipeline.description {
                println!("  {:<width$}  {}", "", description.dimmed(), width = width);
            }
        }
    }

    Ok(())
}
