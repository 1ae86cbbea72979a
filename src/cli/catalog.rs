// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipegraph contributors

//! Catalog command - show registered step types

use colored::Colorize;
use miette::Result;

use super::open_session;
use crate::config::EditorConfig;
use crate::utils::print_header;

/// Run the catalog command
pub async fn run(config: EditorConfig, verbose: bool) -> Result<()> {
    let session = open_session(config).await?;
    let catalog = session.catalog();

    if catalog.is_empty() {
        println!("Step catalog is empty");
        return Ok(());
    }

    print_header(&format!("Step types ({})", catalog.len()));

    for entry in catalog.entries() {
        let outputs = if entry.outputs.is_empty() {
            "-".dimmed().to_string()
        } else {
            entry.outputs.join(", ")
        };

        println!();
        println!("  {} {}", entry.id.bold(), format!("({})", entry.display_name()).dimmed());
        println!("    inputs:  {}", entry.inputs.join(", "));
        println!("    outputs: {}", outputs);

        if verbose {
            if let Some(description) = &entry.description {
                println!("    {}", description.dimmed());
            }
        }
    }

    Ok(())
}
