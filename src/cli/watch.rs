// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipegraph contributors

//! Watch command - re-resolve a pipeline when its files change

use colored::Colorize;
use miette::Result;
use notify::RecursiveMode;
use notify_debouncer_mini::{new_debouncer, DebouncedEventKind};
use std::path::Path;
use std::sync::mpsc::channel;
use std::time::{Duration, Instant};

use super::{open_session, print_diagnostics};
use crate::config::EditorConfig;
use crate::editor::EditorSession;
use crate::errors::PipegraphError;
use crate::pipeline::graph_fingerprint;
use crate::source::DirectorySource;

/// Run the watch command
pub async fn run(config: EditorConfig, id: String, debounce_ms: u64, verbose: bool) -> Result<()> {
    let Some(dir) = config.service.directory.clone() else {
        return Err(miette::miette!(
            "Watch mode needs a local pipeline folder.\n\n\
             Pass --dir <DIR> or set PIPEGRAPH_DIR."
        ));
    };

    // Fail early if the pipeline is not in the folder
    let path = DirectorySource::new(&dir).pipeline_path(&id)?;

    println!("{}", "Starting watch mode...".bold());
    println!(
        "Watching {} for changes to '{}' (debounce: {}ms)",
        dir.display(),
        id,
        debounce_ms
    );
    if verbose {
        println!("Pipeline file: {}", path.display());
    }
    println!("Press {} to exit.", "Ctrl+C".cyan());
    println!();

    // Create channel for receiving events
    let (tx, rx) = channel();

    // Create debounced watcher
    let mut debouncer =
        new_debouncer(Duration::from_millis(debounce_ms), tx).map_err(PipegraphError::from)?;

    debouncer
        .watcher()
        .watch(&dir, RecursiveMode::Recursive)
        .map_err(PipegraphError::from)?;

    let mut session = open_session(config).await?;
    let mut last_fingerprint = None;

    // Initial run
    refresh(&mut session, &id, &mut last_fingerprint, verbose).await;

    // Watch for changes
    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let relevant: Vec<_> = events
                    .iter()
                    .filter(|e| is_pipeline_file(&e.path))
                    .filter(|e| matches!(e.kind, DebouncedEventKind::Any))
                    .collect();

                if !relevant.is_empty() {
                    println!();
                    println!("{}", "─".repeat(50).dimmed());
                    println!(
                        "{}: {} file(s) changed",
                        "Change detected".yellow(),
                        relevant.len()
                    );

                    if verbose {
                        for event in &relevant {
                            println!("  {}", event.path.display());
                        }
                    }

                    refresh(&mut session, &id, &mut last_fingerprint, verbose).await;
                }
            }
            Ok(Err(e)) => {
                eprintln!("{}: {:?}", "Watch error".red(), e);
            }
            Err(e) => {
                // Channel closed
                eprintln!("{}: {}", "Channel error".red(), e);
                break;
            }
        }
    }

    Ok(())
}

fn is_pipeline_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("json") | Some("yaml") | Some("yml")
    )
}

/// Reload catalog and pipeline; rebuild only if either changed
async fn refresh(
    session: &mut EditorSession,
    id: &str,
    last_fingerprint: &mut Option<String>,
    verbose: bool,
) {
    let start = Instant::now();

    if let Err(e) = session.load_catalog().await {
        eprintln!("{}: {}", "Failed to load step catalog".red(), e);
        return;
    }

    let pipeline = match session.source().fetch_pipeline(id).await {
        Ok(p) => p,
        Err(e) => {
            eprintln!("{}: {}", "Failed to load pipeline".red(), e);
            return;
        }
    };

    let fingerprint = match graph_fingerprint(&pipeline, session.catalog()) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("{}: {}", "Failed to fingerprint pipeline".red(), e);
            return;
        }
    };

    if last_fingerprint.as_deref() == Some(fingerprint.as_str()) {
        println!("{}", "Pipeline unchanged, skipping relayout".dimmed());
        return;
    }

    let ticket = session.begin_load(id);
    if let Err(e) = session.finish_load(ticket, Ok(pipeline), Instant::now()) {
        eprintln!("{}: {}", "Failed to load pipeline".red(), e);
        return;
    }
    session.flush_layout();

    let max_depth = session.layout().map(|l| l.max_depth).unwrap_or(0);
    println!(
        "{} '{}': {} node(s), {} connection(s), max depth {} ({:.2}s)",
        "Resolved".green(),
        id,
        session.store().node_count(),
        session.store().connection_count(),
        max_depth,
        start.elapsed().as_secs_f64()
    );
    if verbose {
        println!("  fingerprint {}", &fingerprint[..16]);
    }
    print_diagnostics(session.diagnostics(), verbose);

    *last_fingerprint = Some(fingerprint);
}
