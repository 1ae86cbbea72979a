// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipegraph contributors

//! Editor session
//!
//! [`EditorSession`] is the application state of one editor: the step
//! catalog, the loaded pipeline, its graph, the selection and the pending
//! layout passes. Frontends hold it and drive it with user actions and
//! clock ticks.
//!
//! Loading is split into [`EditorSession::begin_load`] and
//! [`EditorSession::finish_load`]. Each call to `begin_load` bumps the load
//! generation, so a response for an older request is discarded when it
//! arrives. Pending layout passes belong to the graph on screen and are only
//! replaced once a newer pipeline actually loads.

mod scheduler;

pub use scheduler::{LayoutScheduler, PassKind};

use std::sync::Arc;
use std::time::Instant;

use crate::config::EditorConfig;
use crate::errors::{Diagnostics, PipegraphError, PipegraphResult};
use crate::graph::{
    truncate_name, Bounds, ConnectionId, ConnectionResolver, DeletionReport, FixedHeight, GraphNode,
    GraphStore, Layout, LayoutEngine, NodeKind, NodeMeasure, Position, SelectionSet, ZoomTransform,
};
use crate::pipeline::{PipelineDefinition, PipelineSummary, StepCatalog, NESTED_PIPELINE_TYPE};
use crate::source::PipelineSource;

/// Handle for an in-flight pipeline request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub id: String,
    pub generation: u64,
}

/// What happened to a finished load
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The pipeline replaced the graph
    Loaded { nodes: usize, connections: usize, diagnostics: usize },
    /// A newer load was started; the response was dropped
    Stale,
}

/// Height source shared with the session
pub type SharedMeasure = Box<dyn NodeMeasure + Send + Sync>;

/// Application state of one pipeline editor
pub struct EditorSession {
    config: EditorConfig,
    source: Arc<dyn PipelineSource>,
    measure: SharedMeasure,
    catalog: StepCatalog,
    pipelines: Vec<PipelineSummary>,
    pipeline: Option<PipelineDefinition>,
    store: GraphStore,
    selection: SelectionSet,
    diagnostics: Diagnostics,
    layout: Option<Layout>,
    zoom: Option<ZoomTransform>,
    generation: u64,
    /// Generation of the graph currently in the store
    loaded_generation: u64,
    scheduler: LayoutScheduler,
    notices: Vec<String>,
}

impl EditorSession {
    pub fn new(config: EditorConfig, source: Arc<dyn PipelineSource>) -> Self {
        let measure = Box::new(FixedHeight(config.layout.default_node_height));
        Self {
            config,
            source,
            measure,
            catalog: StepCatalog::default(),
            pipelines: Vec::new(),
            pipeline: None,
            store: GraphStore::new(),
            selection: SelectionSet::new(),
            diagnostics: Diagnostics::new(),
            layout: None,
            zoom: None,
            generation: 0,
            loaded_generation: 0,
            scheduler: LayoutScheduler::new(),
            notices: Vec::new(),
        }
    }

    /// Replace the node height source
    pub fn with_measure(mut self, measure: SharedMeasure) -> Self {
        self.measure = measure;
        self
    }

    // ─────────────────────────────────────────────────────────────────────
    // Fetching
    // ─────────────────────────────────────────────────────────────────────

    /// Fetch the step catalog; on failure the previous catalog is kept
    pub async fn load_catalog(&mut self) -> PipegraphResult<&StepCatalog> {
        let result = self.source.fetch_catalog().await;
        match result {
            Ok(catalog) => {
                tracing::info!("Loaded step catalog: {} type(s)", catalog.len());
                self.catalog = catalog;
                Ok(&self.catalog)
            }
            Err(e) => Err(self.fetch_failed(e)),
        }
    }

    /// Fetch the pipeline list; on failure the previous list is kept
    pub async fn refresh_pipelines(&mut self) -> PipegraphResult<&[PipelineSummary]> {
        let result = self.source.list_pipelines().await;
        match result {
            Ok(list) => {
                self.pipelines = list;
                Ok(&self.pipelines)
            }
            Err(e) => Err(self.fetch_failed(e)),
        }
    }

    /// Start loading pipeline `id`, invalidating any earlier request
    ///
    /// The current graph and its pending layout passes stay in place until
    /// the response arrives.
    pub fn begin_load(&mut self, id: &str) -> LoadTicket {
        self.generation += 1;
        tracing::debug!("Requesting pipeline '{}' (load #{})", id, self.generation);
        LoadTicket {
            id: id.to_string(),
            generation: self.generation,
        }
    }

    /// Apply the response for `ticket`
    ///
    /// Stale responses are ignored. A failed fetch leaves the editor in its
    /// prior state, pending passes included. Otherwise the graph is rebuilt
    /// from scratch, passes of the previous graph are cancelled, and an
    /// arrange pass followed by a zoom pass are scheduled relative to `now`.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: PipegraphResult<PipelineDefinition>,
        now: Instant,
    ) -> PipegraphResult<LoadOutcome> {
        if ticket.generation != self.generation {
            tracing::info!(
                "Discarding stale response for '{}' (load #{}, current #{})",
                ticket.id,
                ticket.generation,
                self.generation
            );
            return Ok(LoadOutcome::Stale);
        }

        let pipeline = result.map_err(|e| self.fetch_failed(e))?;

        let mut store = GraphStore::new();
        let diagnostics = ConnectionResolver::new(&self.catalog)
            .with_max_name_length(self.config.display.max_name_length)
            .resolve(&pipeline, &mut store);

        tracing::info!("Loaded pipeline '{}' (load #{})", pipeline.id, ticket.generation);

        let outcome = LoadOutcome::Loaded {
            nodes: store.node_count(),
            connections: store.connection_count(),
            diagnostics: diagnostics.len(),
        };

        self.store = store;
        self.diagnostics = diagnostics;
        self.pipeline = Some(pipeline);
        self.selection.clear();
        self.layout = None;
        self.zoom = None;
        self.loaded_generation = ticket.generation;

        self.scheduler.clear();
        let arrange_at = now + self.config.timing.arrange_delay();
        self.scheduler
            .schedule(PassKind::Arrange, self.loaded_generation, arrange_at);
        self.scheduler.schedule(
            PassKind::Zoom,
            self.loaded_generation,
            arrange_at + self.config.timing.zoom_delay(),
        );

        Ok(outcome)
    }

    /// Fetch and apply pipeline `id`
    pub async fn load_pipeline(&mut self, id: &str) -> PipegraphResult<LoadOutcome> {
        let ticket = self.begin_load(id);
        let result = self.source.fetch_pipeline(id).await;
        self.finish_load(ticket, result, Instant::now())
    }

    fn fetch_failed(&mut self, error: PipegraphError) -> PipegraphError {
        tracing::warn!("{}", error);
        self.notices.push(error.to_string());
        error
    }

    // ─────────────────────────────────────────────────────────────────────
    // Layout
    // ─────────────────────────────────────────────────────────────────────

    /// Run the layout passes that are due at `now`
    pub fn tick(&mut self, now: Instant) -> Vec<PassKind> {
        let due = self.scheduler.take_due(now, self.loaded_generation);
        for pass in &due {
            match pass {
                PassKind::Arrange => {
                    self.auto_arrange();
                }
                PassKind::Zoom => {
                    self.auto_zoom();
                }
            }
        }
        due
    }

    /// Arrange now, re-running until measured heights settle
    pub fn auto_arrange(&mut self) -> &Layout {
        let engine = LayoutEngine::new(self.config.layout.clone());
        let report = engine.settle(&mut self.store, &*self.measure);
        tracing::debug!("Arranged in {} pass(es)", report.passes);
        self.layout.insert(report.layout)
    }

    /// Fit the viewport to the current node positions
    pub fn auto_zoom(&mut self) -> Option<ZoomTransform> {
        let bounds = Bounds::from_store(
            &self.store,
            self.config.layout.node_width,
            self.config.layout.default_node_height,
            &*self.measure,
        )?;
        let viewport = &self.config.viewport;
        let zoom = ZoomTransform::fit(&bounds, viewport.width, viewport.height, viewport.padding);
        self.zoom = Some(zoom);
        Some(zoom)
    }

    /// Run every pending pass immediately
    pub fn flush_layout(&mut self) -> Vec<PassKind> {
        let mut ran = Vec::new();
        while let Some(due) = self.scheduler.next_due() {
            ran.extend(self.tick(due));
        }
        ran
    }

    // ─────────────────────────────────────────────────────────────────────
    // Selection and mutation
    // ─────────────────────────────────────────────────────────────────────

    /// Select a node; unknown ids are ignored
    pub fn select(&mut self, id: &str, accumulate: bool) -> bool {
        if !self.store.contains_node(id) {
            return false;
        }
        self.selection.select(id, accumulate);
        true
    }

    pub fn deselect(&mut self, id: &str) -> bool {
        self.selection.deselect(id)
    }

    /// Delete the selected nodes and their connections
    ///
    /// With nothing selected, a notice is recorded and nothing changes.
    pub fn delete_selected(&mut self) -> Option<DeletionReport> {
        match self.selection.delete_selected(&mut self.store) {
            Ok(report) => Some(report),
            Err(e) => {
                self.notices.push(format!("{}.", e));
                None
            }
        }
    }

    /// Create an unconnected node for a catalog step type
    ///
    /// The node id is `<type>_<n>` with the smallest free `n`.
    pub fn add_step_node(&mut self, step_type: &str, position: Position) -> PipegraphResult<String> {
        let entry = self
            .catalog
            .get(step_type)
            .ok_or_else(|| PipegraphError::UnknownStepType {
                step: step_type.to_string(),
                step_type: step_type.to_string(),
            })?;

        let id = (1..)
            .map(|n| format!("{}_{}", step_type, n))
            .find(|id| !self.store.contains_node(id))
            .unwrap_or_else(|| step_type.to_string());

        let kind = if step_type == NESTED_PIPELINE_TYPE {
            NodeKind::Pipeline
        } else {
            NodeKind::Processing
        };

        let mut node = GraphNode::new(
            id.clone(),
            truncate_name(entry.display_name(), self.config.display.max_name_length),
            kind,
            &entry.ports(),
        )
        .with_step_type(step_type);
        node.position = position;

        self.store.add_node(node)?;
        Ok(id)
    }

    pub fn connect(
        &mut self,
        source: &str,
        source_port: &str,
        target: &str,
        target_port: &str,
    ) -> PipegraphResult<ConnectionId> {
        self.store.connect(source, source_port, target, target_port)
    }

    pub fn disconnect(&mut self, id: &ConnectionId) -> PipegraphResult<()> {
        self.store.remove_connection(id).map(|_| ())
    }

    /// Drag a node to a new position
    pub fn move_node(&mut self, id: &str, position: Position) -> bool {
        self.store.set_position(id, position)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Shared handle to the source, for fetching outside the session
    pub fn source(&self) -> Arc<dyn PipelineSource> {
        Arc::clone(&self.source)
    }

    pub fn catalog(&self) -> &StepCatalog {
        &self.catalog
    }

    pub fn pipelines(&self) -> &[PipelineSummary] {
        &self.pipelines
    }

    pub fn pipeline(&self) -> Option<&PipelineDefinition> {
        self.pipeline.as_ref()
    }

    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn layout(&self) -> Option<&Layout> {
        self.layout.as_ref()
    }

    pub fn zoom(&self) -> Option<ZoomTransform> {
        self.zoom
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn scheduler(&self) -> &LayoutScheduler {
        &self.scheduler
    }

    pub fn notices(&self) -> &[String] {
        &self.notices
    }

    /// Drain user-visible notices
    pub fn take_notices(&mut self) -> Vec<String> {
        std::mem::take(&mut self.notices)
    }

    /// The loaded pipeline, or an error if none is loaded
    pub fn require_pipeline(&self) -> PipegraphResult<&PipelineDefinition> {
        self.pipeline.as_ref().ok_or(PipegraphError::NoPipelineLoaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{InputSpec, StepCatalogEntry, StepDefinition};
    use crate::source::MemorySource;
    use std::time::Duration;

    fn summarize() -> PipelineDefinition {
        PipelineDefinition::new("summarize-doc", "Summarize")
            .with_input("doc", InputSpec::default())
            .with_output("summary", "step1.text")
            .with_step(StepDefinition::new("step1", "summarize").with_input("text", "inputs.doc"))
    }

    fn translate() -> PipelineDefinition {
        PipelineDefinition::new("translate", "Translate")
            .with_input("text", InputSpec::default())
            .with_step(StepDefinition::new("t", "translate").with_input("text", "inputs.text"))
    }

    fn session() -> EditorSession {
        let source = MemorySource::new(vec![
            StepCatalogEntry::new("summarize", ["text"], ["text"]),
            StepCatalogEntry::new("translate", ["text"], ["text"]),
        ])
        .with_pipeline(summarize())
        .with_pipeline(translate());
        EditorSession::new(EditorConfig::default(), Arc::new(source))
    }

    async fn loaded() -> EditorSession {
        let mut session = session();
        session.load_catalog().await.unwrap();
        session.load_pipeline("summarize-doc").await.unwrap();
        session
    }

    #[tokio::test]
    async fn test_load_builds_graph() {
        let session = loaded().await;

        assert_eq!(session.store().node_count(), 3);
        assert_eq!(session.store().connection_count(), 2);
        assert!(session.diagnostics().is_empty());
        assert!(!session.scheduler().is_idle());
    }

    #[tokio::test]
    async fn test_stale_response_discarded() {
        let mut session = session();
        session.load_catalog().await.unwrap();

        let first = session.begin_load("summarize-doc");
        let second = session.begin_load("translate");

        let now = Instant::now();
        let late = session.finish_load(first, Ok(summarize()), now).unwrap();
        assert_eq!(late, LoadOutcome::Stale);
        assert!(session.pipeline().is_none());

        session.finish_load(second, Ok(translate()), now).unwrap();
        assert_eq!(session.pipeline().unwrap().id, "translate");
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_prior_state() {
        let mut session = loaded().await;

        let result = session.load_pipeline("missing").await;
        assert!(matches!(result, Err(PipegraphError::PipelineNotFound { .. })));
        assert_eq!(session.pipeline().unwrap().id, "summarize-doc");
        assert_eq!(session.store().node_count(), 3);
        assert_eq!(session.notices().len(), 1);
    }

    #[tokio::test]
    async fn test_timers_run_arrange_then_zoom() {
        let mut session = session();
        session.load_catalog().await.unwrap();

        let start = Instant::now();
        let ticket = session.begin_load("summarize-doc");
        session.finish_load(ticket, Ok(summarize()), start).unwrap();

        assert!(session.tick(start).is_empty());
        assert_eq!(session.tick(start + Duration::from_millis(300)), vec![PassKind::Arrange]);
        assert!(session.layout().is_some());
        assert!(session.zoom().is_none());

        assert_eq!(session.tick(start + Duration::from_millis(1300)), vec![PassKind::Zoom]);
        assert!(session.zoom().is_some());

        let step = session.store().get_node("step1").unwrap();
        assert_eq!(step.position.x, 0.0);
        assert_eq!(session.store().get_node("outputs.summary").unwrap().position.x, 250.0);
    }

    #[tokio::test]
    async fn test_switching_pipelines_replaces_pending_passes() {
        let mut session = session();
        session.load_catalog().await.unwrap();

        let start = Instant::now();
        let first = session.begin_load("summarize-doc");
        session.finish_load(first, Ok(summarize()), start).unwrap();

        // Switch before the first pipeline's passes fire
        let later = start + Duration::from_millis(100);
        let second = session.begin_load("translate");
        session.finish_load(second, Ok(translate()), later).unwrap();

        // The old arrange time passes without anything running
        assert!(session.tick(start + Duration::from_millis(300)).is_empty());
        assert_eq!(
            session.tick(later + Duration::from_millis(300)),
            vec![PassKind::Arrange]
        );
        assert!(session.layout().unwrap().position("t").is_some());
        assert!(session.layout().unwrap().position("step1").is_none());
    }

    #[tokio::test]
    async fn test_failed_switch_keeps_pending_passes() {
        let mut session = session();
        session.load_catalog().await.unwrap();

        let start = Instant::now();
        let ticket = session.begin_load("summarize-doc");
        session.finish_load(ticket, Ok(summarize()), start).unwrap();

        let ticket = session.begin_load("missing");
        let failed = session.finish_load(
            ticket,
            Err(PipegraphError::PipelineNotFound { id: "missing".to_string() }),
            start,
        );
        assert!(failed.is_err());
        assert!(!session.scheduler().is_idle());

        assert_eq!(
            session.tick(start + Duration::from_millis(300)),
            vec![PassKind::Arrange]
        );
        assert_eq!(session.pipeline().unwrap().id, "summarize-doc");
        assert!(session.layout().unwrap().position("step1").is_some());

        assert_eq!(session.flush_layout(), vec![PassKind::Zoom]);
        assert!(session.zoom().is_some());
    }

    #[tokio::test]
    async fn test_pending_passes_survive_an_in_flight_request() {
        let mut session = loaded().await;
        session.begin_load("translate");

        assert!(!session.scheduler().is_idle());
        assert_eq!(session.flush_layout(), vec![PassKind::Arrange, PassKind::Zoom]);
        assert_eq!(session.pipeline().unwrap().id, "summarize-doc");
    }

    #[tokio::test]
    async fn test_delete_selected_and_empty_notice() {
        let mut session = loaded().await;

        assert!(session.delete_selected().is_none());
        assert_eq!(session.take_notices(), vec!["No nodes selected for deletion."]);

        assert!(session.select("step1", false));
        assert!(!session.select("ghost", true));
        let report = session.delete_selected().unwrap();
        assert_eq!(report.connections.len(), 2);
        assert_eq!(session.store().connection_count(), 0);
        assert!(session.selection().is_empty());
    }

    #[tokio::test]
    async fn test_add_step_node_generates_ids() {
        let mut session = loaded().await;

        let a = session.add_step_node("summarize", Position::new(10.0, 20.0)).unwrap();
        let b = session.add_step_node("summarize", Position::default()).unwrap();
        assert_eq!(a, "summarize_1");
        assert_eq!(b, "summarize_2");

        let node = session.store().get_node(&a).unwrap();
        assert_eq!(node.position, Position::new(10.0, 20.0));
        assert_eq!(session.store().incoming(&a).count(), 0);

        assert!(matches!(
            session.add_step_node("nope", Position::default()),
            Err(PipegraphError::UnknownStepType { .. })
        ));
    }

    #[tokio::test]
    async fn test_manual_connect_and_disconnect() {
        let mut session = loaded().await;
        let id = session.add_step_node("translate", Position::default()).unwrap();

        let conn = session.connect("step1", "text", &id, "text").unwrap();
        assert!(matches!(
            session.connect("inputs.doc", "doc", &id, "text"),
            Err(PipegraphError::PortAlreadyConnected { .. })
        ));

        session.disconnect(&conn).unwrap();
        assert!(session.store().input_connection(&id, "text").is_none());
    }

    #[tokio::test]
    async fn test_flush_layout() {
        let mut session = loaded().await;
        assert_eq!(session.flush_layout(), vec![PassKind::Arrange, PassKind::Zoom]);
        assert!(session.scheduler().is_idle());
        assert!(session.zoom().unwrap().k <= 1.0);
    }

    #[test]
    fn test_reload_clears_selection() {
        tokio_test::block_on(async {
            let mut session = loaded().await;
            session.select("step1", false);
            session.load_pipeline("summarize-doc").await.unwrap();
            assert!(session.selection().is_empty());
        });
    }
}
