// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipegraph contributors

//! Show command - print the resolved graph of a pipeline

use colored::Colorize;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use super::{open_pipeline, print_diagnostics, OutputFormat};
use crate::config::EditorConfig;
use crate::graph::{Connection, GraphNode};
use crate::pipeline::PipelineSummary;
use crate::utils::{node_kind, print_header, print_section};

#[derive(Serialize)]
struct ShowReport<'a> {
    pipeline: PipelineSummary,
    nodes: Vec<&'a GraphNode>,
    connections: Vec<&'a Connection>,
    diagnostics: Vec<String>,
}

/// Run the show command
pub async fn run(config: EditorConfig, id: String, format: OutputFormat, verbose: bool) -> Result<()> {
    let session = open_pipeline(config, &id).await?;
    let pipeline = session.require_pipeline()?;
    let store = session.store();

    if format == OutputFormat::Json {
        let report = ShowReport {
            pipeline: pipeline.summary(),
            nodes: store.nodes().collect(),
            connections: store.connections().collect(),
            diagnostics: session.diagnostics().messages(),
        };
        println!("{}", serde_json::to_string_pretty(&report).into_diagnostic()?);
        return Ok(());
    }

    let title = if pipeline.name.is_empty() {
        pipeline.id.clone()
    } else {
        format!("{} ({})", pipeline.name, pipeline.id)
    };
    print_header(&title);

    print_section(&format!("Nodes ({})", store.node_count()));
    for node in store.nodes() {
        let mut line = format!("  {} {}", node_kind(node.kind), node.id.bold());
        if node.display_name != node.id {
            line.push_str(&format!(" {}", format!("\"{}\"", node.display_name).dimmed()));
        }
        println!("{}", line);

        if verbose {
            if !node.inputs.is_empty() {
                let ports: Vec<&str> = node.inputs.keys().map(String::as_str).collect();
                println!("      in:  {}", ports.join(", "));
            }
            if !node.outputs.is_empty() {
                let ports: Vec<&str> = node.outputs.keys().map(String::as_str).collect();
                println!("      out: {}", ports.join(", "));
            }
        }
    }

    print_section(&format!("Connections ({})", store.connection_count()));
    for conn in store.connections() {
        println!(
            "  {}.{} {} {}.{}",
            conn.source,
            conn.source_port,
            "→".dimmed(),
            conn.target,
            conn.target_port
        );
    }

    print_diagnostics(session.diagnostics(), verbose);

    Ok(())
}
