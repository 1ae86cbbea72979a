// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipegraph contributors

//! Pipeline sources
//!
//! A [`PipelineSource`] serves the three documents the editor consumes:
//! the pipeline list, a single pipeline definition and the step catalog.

mod directory;
mod http;

pub use directory::{DirectorySource, CATALOG_FILE_NAME};
pub use http::HttpSource;

use async_trait::async_trait;
use indexmap::IndexMap;
use std::sync::Arc;

use crate::config::EditorConfig;
use crate::errors::{PipegraphError, PipegraphResult};
use crate::pipeline::{PipelineDefinition, PipelineSummary, StepCatalog, StepCatalogEntry};

/// Trait for pipeline data providers
#[async_trait]
pub trait PipelineSource: Send + Sync {
    /// Short description for logs and messages
    fn describe(&self) -> String;

    /// List available pipelines (`GET /pipelines`)
    async fn list_pipelines(&self) -> PipegraphResult<Vec<PipelineSummary>>;

    /// Fetch one pipeline definition (`GET /pipeline/{id}`)
    async fn fetch_pipeline(&self, id: &str) -> PipegraphResult<PipelineDefinition>;

    /// Fetch the step catalog (`GET /pipeline-steps`)
    async fn fetch_catalog(&self) -> PipegraphResult<StepCatalog>;
}

/// Build the source selected by the configuration
///
/// A configured directory wins over the HTTP service.
pub fn from_config(config: &EditorConfig) -> PipegraphResult<Arc<dyn PipelineSource>> {
    match &config.service.directory {
        Some(dir) => Ok(Arc::new(DirectorySource::new(dir))),
        None => Ok(Arc::new(HttpSource::new(
            &config.service.api_url,
            std::time::Duration::from_secs(config.service.timeout_secs),
        )?)),
    }
}

/// In-memory source, for embedding and tests
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    pipelines: IndexMap<String, PipelineDefinition>,
    catalog: Vec<StepCatalogEntry>,
}

impl MemorySource {
    pub fn new(catalog: Vec<StepCatalogEntry>) -> Self {
        Self {
            pipelines: IndexMap::new(),
            catalog,
        }
    }

    pub fn with_pipeline(mut self, pipeline: PipelineDefinition) -> Self {
        self.pipelines.insert(pipeline.id.clone(), pipeline);
        self
    }
}

#[async_trait]
impl PipelineSource for MemorySource {
    fn describe(&self) -> String {
        format!("memory ({} pipelines)", self.pipelines.len())
    }

    async fn list_pipelines(&self) -> PipegraphResult<Vec<PipelineSummary>> {
        Ok(self.pipelines.values().map(PipelineDefinition::summary).collect())
    }

    async fn fetch_pipeline(&self, id: &str) -> PipegraphResult<PipelineDefinition> {
        self.pipelines
            .get(id)
            .cloned()
            .ok_or_else(|| PipegraphError::PipelineNotFound { id: id.to_string() })
    }

    async fn fetch_catalog(&self) -> PipegraphResult<StepCatalog> {
        Ok(StepCatalog::new(self.catalog.clone()))
    }
}
