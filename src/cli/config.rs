// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipegraph contributors

//! Config command - show the effective configuration or write it to disk

use colored::Colorize;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

use crate::config::{default_config_path, generate_default_config, EditorConfig};
use crate::errors::PipegraphError;

/// Run the config command
pub async fn run(
    config: EditorConfig,
    init: bool,
    output: Option<PathBuf>,
    force: bool,
    verbose: bool,
) -> Result<()> {
    if !init {
        print!("{}", toml::to_string_pretty(&config).into_diagnostic()?);
        return Ok(());
    }

    let Some(path) = output.or_else(default_config_path) else {
        return Err(miette::miette!(
            "Could not determine a config directory for this platform.\n\n\
             Pass --output <FILE> to choose where to write the file."
        ));
    };

    if path.exists() && !force {
        return Err(miette::miette!(
            "{} already exists. Use --force to overwrite.",
            path.display()
        ));
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(PipegraphError::from)?;
    }

    // Untouched defaults get the commented template
    if config == EditorConfig::default() {
        std::fs::write(&path, generate_default_config()).map_err(PipegraphError::from)?;
    } else {
        config.save(&path)?;
    }

    println!("  {} Created {}", "✓".green(), path.display());

    if verbose {
        println!();
        println!("Edit it to change the service URL, layout geometry or timings.");
        println!("Pass {} to use a different file.", "--config <FILE>".cyan());
    }

    Ok(())
}
