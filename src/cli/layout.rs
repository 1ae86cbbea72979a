// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipegraph contributors

//! Layout command - compute auto-arrange positions and viewport fit

use colored::Colorize;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use super::{open_pipeline, print_diagnostics, OutputFormat};
use crate::config::EditorConfig;
use crate::graph::{Layout, ZoomTransform};
use crate::utils::{node_kind, print_header, print_info, print_section, print_warning};

#[derive(Serialize)]
struct LayoutReport<'a> {
    pipeline: &'a str,
    layout: &'a Layout,
    zoom: Option<ZoomTransform>,
    diagnostics: Vec<String>,
}

/// Run the layout command
pub async fn run(config: EditorConfig, id: String, format: OutputFormat, verbose: bool) -> Result<()> {
    let mut session = open_pipeline(config, &id).await?;

    // Run the deferred arrange and zoom passes now
    session.flush_layout();

    let layout = match session.layout() {
        Some(layout) => layout,
        None => return Err(miette::miette!("Layout was not computed for '{}'", id)),
    };

    if format == OutputFormat::Json {
        let report = LayoutReport {
            pipeline: &id,
            layout,
            zoom: session.zoom(),
            diagnostics: session.diagnostics().messages(),
        };
        println!("{}", serde_json::to_string_pretty(&report).into_diagnostic()?);
        return Ok(());
    }

    print_header(&format!("Layout: {}", id));
    print_section(&format!("Positions (max depth {})", layout.max_depth));

    let width = layout.positions.keys().map(|k| k.len()).max().unwrap_or(0);
    for node in session.store().nodes() {
        let Some(position) = layout.position(&node.id) else {
            continue;
        };
        let depth = layout
            .depth(&node.id)
            .map(|d| format!("depth {}", d))
            .unwrap_or_default();
        println!(
            "  {} {:<width$}  ({:>7.1}, {:>7.1})  {}",
            node_kind(node.kind),
            node.id,
            position.x,
            position.y,
            depth.dimmed(),
            width = width
        );
    }

    if !layout.unreached.is_empty() {
        println!();
        print_warning(&format!(
            "Not reachable from any root (placed at depth 0): {}",
            layout.unreached.join(", ")
        ));
    }
    if layout.cycle_bounded {
        print_warning("Depth assignment was cut short by a cycle");
    }

    if let Some(zoom) = session.zoom() {
        println!();
        print_info(&format!(
            "Viewport fit: k={:.3} x={:.1} y={:.1}",
            zoom.k, zoom.x, zoom.y
        ));
    }

    print_diagnostics(session.diagnostics(), verbose);

    Ok(())
}
