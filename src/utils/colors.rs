// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipegraph contributors

//! Terminal color utilities
//!
//! Provides consistent color schemes across the CLI.

use colored::{ColoredString, Colorize};
use std::io::IsTerminal;

use crate::graph::NodeKind;

/// Check if colors should be disabled
pub fn should_use_colors() -> bool {
    // Respect NO_COLOR environment variable
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }

    std::io::stdout().is_terminal()
}

/// Turn colors off for the whole process when output is not a terminal
pub fn init_colors() {
    if !should_use_colors() {
        colored::control::set_override(false);
    }
}

/// Node kind label, colored by kind
pub fn node_kind(kind: NodeKind) -> ColoredString {
    let label = format!("{:<10}", kind.to_string());
    match kind {
        NodeKind::Input => label.green(),
        NodeKind::Output => label.magenta(),
        NodeKind::Processing => label.blue(),
        NodeKind::Pipeline => label.cyan(),
    }
}

/// Print a styled header
pub fn print_header(title: &str) {
    println!("{}", title.bold());
    println!("{}", "═".repeat(title.chars().count().max(40)));
}

/// Print a styled section
pub fn print_section(title: &str) {
    println!();
    println!("{}:", title.bold());
}

/// Print a success check
pub fn print_success(msg: &str) {
    println!("  {} {}", "✓".green(), msg);
}

/// Print an error cross
pub fn print_error(msg: &str) {
    println!("  {} {}", "✗".red(), msg);
}

/// Print a warning
pub fn print_warning(msg: &str) {
    println!("  {} {}", "⚠".yellow(), msg);
}

/// Print an info item
pub fn print_info(msg: &str) {
    println!("  {} {}", "→".blue(), msg);
}
