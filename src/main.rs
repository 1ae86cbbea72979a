// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipegraph contributors

//! pipegraph - pipeline graph inspector
//!
//! Resolve, validate and lay out node-graph pipelines from the command line.

use clap::Parser;
use miette::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pipegraph::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pipegraph=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    pipegraph::utils::init_colors();

    let cli = Cli::parse();
    let config = cli.editor_config()?;

    // Dispatch to command handlers
    match cli.command {
        Commands::List => pipegraph::cli::list::run(config, cli.verbose).await,
        Commands::Catalog => pipegraph::cli::catalog::run(config, cli.verbose).await,
        Commands::Show { id, format } => {
            pipegraph::cli::show::run(config, id, format, cli.verbose).await
        }
        Commands::Layout { id, format } => {
            pipegraph::cli::layout::run(config, id, format, cli.verbose).await
        }
        Commands::Graph { id, format } => {
            pipegraph::cli::graph::run(config, id, format, cli.verbose).await
        }
        Commands::Validate { id } => pipegraph::cli::validate::run(config, id, cli.verbose).await,
        Commands::Watch { id, debounce } => {
            pipegraph::cli::watch::run(config, id, debounce, cli.verbose).await
        }
        Commands::Config {
            init,
            output,
            force,
        } => pipegraph::cli::config::run(config, init, output, force, cli.verbose).await,
    }
}
