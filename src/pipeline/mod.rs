// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipegraph contributors

//! Pipeline definitions and the step catalog
//!
//! This module defines the data served by the pipeline service: pipeline
//! definitions, step catalog entries and the port sets derived from them.

mod catalog;
mod definition;
mod fingerprint;
mod validation;

pub use catalog::{PortSet, StepCatalog, StepCatalogEntry};
pub use definition::*;
pub use fingerprint::{graph_fingerprint, Fingerprinter};
pub use validation::{PipelineValidator, ValidationResult};
