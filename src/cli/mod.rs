// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipegraph contributors

//! CLI command definitions and handlers
//!
//! Defines the command-line interface for pipegraph.

pub mod catalog;
pub mod config;
pub mod graph;
pub mod layout;
pub mod list;
pub mod show;
pub mod validate;
pub mod watch;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use miette::Result;
use std::path::PathBuf;

use crate::config::EditorConfig;
use crate::editor::EditorSession;
use crate::errors::{Diagnostics, RecoverySuggestion};
use crate::source;
use crate::utils::with_spinner;

/// Pipeline graph inspector
///
/// Resolve, lay out and render content-generation pipelines.
#[derive(Parser, Debug)]
#[clap(
    name = "pipegraph",
    version,
    about = "Inspect, validate and lay out node-graph pipelines",
    long_about = None,
    after_help = "Examples:\n\
        pipegraph list                           List pipelines from the service\n\
        pipegraph --dir ./pipelines show demo    Resolve a pipeline from local files\n\
        pipegraph layout demo --format json      Compute node positions\n\
        pipegraph graph demo --format mermaid    Render the graph\n\n\
        See 'pipegraph <command> --help' for more information on a specific command."
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[clap(short, long, global = true)]
    pub verbose: bool,

    /// Base URL of the pipeline service
    #[clap(long, global = true, env = "PIPEGRAPH_API_URL", value_name = "URL")]
    pub api: Option<String>,

    /// Read pipelines from a local folder instead of the service
    #[clap(short = 'd', long, global = true, env = "PIPEGRAPH_DIR", value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Config file (default: <config dir>/pipegraph/config.toml)
    #[clap(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List available pipelines
    List,

    /// List step types and their ports
    Catalog,

    /// Resolve a pipeline and print its nodes and connections
    Show {
        /// Pipeline id
        id: String,

        /// Output format
        #[clap(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Compute auto-layout positions
    Layout {
        /// Pipeline id
        id: String,

        /// Output format
        #[clap(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Show pipeline as a graph
    Graph {
        /// Pipeline id
        id: String,

        /// Output format
        #[clap(short, long, value_enum, default_value_t = GraphFormat::Text)]
        format: GraphFormat,
    },

    /// Validate a pipeline against the step catalog
    Validate {
        /// Pipeline id
        id: String,
    },

    /// Watch mode - re-resolve a pipeline when its files change (requires --dir)
    Watch {
        /// Pipeline id
        id: String,

        /// Debounce delay in milliseconds
        #[clap(long, default_value = "500")]
        debounce: u64,
    },

    /// Show the effective configuration, or write it with --init
    Config {
        /// Write a config file instead of printing
        #[clap(long)]
        init: bool,

        /// Where to write (default: <config dir>/pipegraph/config.toml)
        #[clap(short, long, value_name = "FILE", requires = "init")]
        output: Option<PathBuf>,

        /// Overwrite an existing file
        #[clap(long, requires = "init")]
        force: bool,
    },
}

/// Output format for show and layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Graph output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GraphFormat {
    Text,
    Dot,
    Mermaid,
}

impl Cli {
    /// Configuration with command-line overrides applied
    ///
    /// `--dir` wins over `--api` when both are given.
    pub fn editor_config(&self) -> Result<EditorConfig> {
        let mut config = EditorConfig::discover(self.config.as_deref())?;

        if let Some(api) = &self.api {
            config.service.api_url = api.clone();
            config.service.directory = None;
        }
        if let Some(dir) = &self.dir {
            config.service.directory = Some(dir.clone());
        }

        Ok(config)
    }
}

/// Open a session and fetch the step catalog
pub async fn open_session(config: EditorConfig) -> Result<EditorSession> {
    let source = source::from_config(&config)?;
    tracing::debug!("Using pipeline source {}", source.describe());

    let mut session = EditorSession::new(config, source);
    with_spinner("Fetching step catalog...", session.load_catalog()).await?;
    Ok(session)
}

/// Open a session with pipeline `id` loaded
pub async fn open_pipeline(config: EditorConfig, id: &str) -> Result<EditorSession> {
    let mut session = open_session(config).await?;
    with_spinner(&format!("Fetching pipeline '{}'...", id), session.load_pipeline(id)).await?;
    Ok(session)
}

/// Print load diagnostics, with recovery steps when verbose
pub fn print_diagnostics(diagnostics: &Diagnostics, verbose: bool) {
    if diagnostics.is_empty() {
        return;
    }

    println!();
    println!("{} ({}):", "Diagnostics".yellow().bold(), diagnostics.len());
    for diagnostic in diagnostics.iter() {
        println!("  {} {}", "⚠".yellow(), diagnostic);
        if verbose {
            if let Some(suggestion) = RecoverySuggestion::for_error(diagnostic) {
                for line in suggestion.to_string().lines() {
                    println!("      {}", line.dimmed());
                }
            }
        }
    }
}
