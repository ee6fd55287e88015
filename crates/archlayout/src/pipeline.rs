//! Layout followed by anchor assignment
//!
//! [`DiagramPipeline`] runs a [`LayoutEngine`] over a graph, assigns anchors
//! to a copy of its edges and packages everything a renderer needs into a
//! [`DiagramLayout`]. When grouped layout fails the pipeline can retry once
//! with every group removed.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{info, span, warn, Level};

use crate::anchors::{assign_anchors, HandleMap};
use crate::core::{ArchitectureGraph, EdgeData, LayoutEngine, LayoutError, LayoutResult};
use crate::layout::LayeredLayout;

/// An edge as handed to the renderer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Handle id on the source node, e.g. `source-right`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    /// Handle id on the target node, e.g. `target-left`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
}

impl From<&EdgeData> for DiagramEdge {
    fn from(edge: &EdgeData) -> Self {
        Self {
            id: edge.id.clone(),
            source: edge.source.clone(),
            target: edge.target.clone(),
            label: edge.label.clone(),
            source_handle: edge.anchors.map(|a| a.source_handle()),
            target_handle: edge.anchors.map(|a| a.target_handle()),
        }
    }
}

/// Positions, anchored edges and used handles of one diagram
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramLayout {
    #[serde(flatten)]
    pub layout: LayoutResult,
    pub edges: Vec<DiagramEdge>,
    pub handles: HandleMap,
    /// Set when groups were dropped after the grouped layout failed
    #[serde(default)]
    pub flat_fallback: bool,
}

impl DiagramLayout {
    pub fn edge(&self, id: &str) -> Option<&DiagramEdge> {
        self.edges.iter().find(|e| e.id == id)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Layout engine plus anchor assignment
pub struct DiagramPipeline {
    engine: Box<dyn LayoutEngine>,
    fallback: bool,
}

impl Default for DiagramPipeline {
    fn default() -> Self {
        Self::new(Box::new(LayeredLayout::new()))
    }
}

impl DiagramPipeline {
    pub fn new(engine: Box<dyn LayoutEngine>) -> Self {
        Self {
            engine,
            fallback: false,
        }
    }

    /// Retry without groups when grouped layout fails
    pub fn with_fallback(mut self, enabled: bool) -> Self {
        self.fallback = enabled;
        self
    }

    pub fn engine(&self) -> &dyn LayoutEngine {
        self.engine.as_ref()
    }

    pub fn run(&self, graph: &ArchitectureGraph) -> Result<DiagramLayout> {
        let pipeline_span = span!(
            Level::INFO,
            "diagram_pipeline",
            engine = self.engine.name(),
            fallback = self.fallback
        );
        let _enter = pipeline_span.enter();

        let (layout, flat_fallback) = match self.engine.layout(graph) {
            Ok(layout) => (layout, false),
            Err(err) if self.fallback && graph.group_count() > 0 && may_succeed_flat(&err) => {
                warn!(error = %err, "Grouped layout failed, retrying without groups");
                (self.engine.layout(&graph.without_groups())?, true)
            }
            Err(err) => return Err(err),
        };

        let mut edges: Vec<EdgeData> = graph.edges().cloned().collect();
        let handles = assign_anchors(&layout, &mut edges);

        info!(
            node_count = layout.node_positions.len(),
            edge_count = edges.len(),
            flat_fallback,
            "Diagram laid out"
        );
        Ok(DiagramLayout {
            layout,
            edges: edges.iter().map(DiagramEdge::from).collect(),
            handles,
            flat_fallback,
        })
    }
}

/// Whether dropping groups could change the outcome. A rejected config or
/// payload fails the flat layout too; engine failures and foreign errors may not.
fn may_succeed_flat(err: &anyhow::Error) -> bool {
    match err.downcast_ref::<LayoutError>() {
        Some(layout_err) => layout_err.is_engine_failure(),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutConfig;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Fails whenever the graph has groups
    struct GroupShyEngine(LayeredLayout);

    impl LayoutEngine for GroupShyEngine {
        fn layout(&self, graph: &ArchitectureGraph) -> Result<LayoutResult> {
            if graph.group_count() > 0 {
                return Err(LayoutError::engine(self.name(), "nested groups unsupported").into());
            }
            self.0.layout(graph)
        }

        fn name(&self) -> &'static str {
            "group-shy"
        }

        fn version(&self) -> &'static str {
            "0.0.1"
        }
    }

    fn grouped_graph() -> ArchitectureGraph {
        let mut graph = ArchitectureGraph::new();
        graph.add_simple_group("g").unwrap();
        graph.add_grouped_node("a", "A", "g").unwrap();
        graph.add_simple_node("b", "B").unwrap();
        graph.add_simple_edge("a", "b").unwrap();
        graph
    }

    #[test]
    fn test_run_assigns_handles() {
        let mut graph = ArchitectureGraph::new();
        graph.add_simple_node("a", "A").unwrap();
        graph.add_simple_node("b", "B").unwrap();
        graph.add_simple_edge("a", "b").unwrap();

        let diagram = DiagramPipeline::default().run(&graph).unwrap();
        let edge = diagram.edge("a->b").unwrap();
        assert_eq!(edge.source_handle.as_deref(), Some("source-right"));
        assert_eq!(edge.target_handle.as_deref(), Some("target-left"));
        assert!(diagram.handles.used_handles("a").outgoing.contains(crate::core::Side::Right));
        assert!(!diagram.flat_fallback);
    }

    #[test]
    fn test_failure_propagates_without_fallback() {
        let pipeline = DiagramPipeline::new(Box::new(GroupShyEngine(LayeredLayout::new())));
        let err = pipeline.run(&grouped_graph()).unwrap_err();
        assert!(err.downcast_ref::<LayoutError>().unwrap().is_engine_failure());
    }

    #[test]
    fn test_fallback_drops_groups() {
        let pipeline =
            DiagramPipeline::new(Box::new(GroupShyEngine(LayeredLayout::new()))).with_fallback(true);
        let diagram = pipeline.run(&grouped_graph()).unwrap();
        assert!(diagram.flat_fallback);
        assert!(diagram.layout.group_boxes.is_empty());
        assert_eq!(diagram.layout.node_positions.len(), 2);
        assert!(diagram.edge("a->b").unwrap().source_handle.is_some());
    }

    #[test]
    fn test_fallback_does_not_mask_flat_failures() {
        let engine = LayeredLayout::with_config(LayoutConfig {
            node_spacing: -1.0,
            ..LayoutConfig::default()
        });
        let pipeline = DiagramPipeline::new(Box::new(engine)).with_fallback(true);
        let mut graph = ArchitectureGraph::new();
        graph.add_simple_node("a", "A").unwrap();
        assert!(pipeline.run(&graph).is_err());
    }

    /// Counts layout calls, optionally failing grouped graphs with an
    /// error that is not a [`LayoutError`]
    struct CountingEngine {
        inner: LayeredLayout,
        calls: Arc<AtomicUsize>,
        opaque_group_failure: bool,
    }

    impl LayoutEngine for CountingEngine {
        fn layout(&self, graph: &ArchitectureGraph) -> Result<LayoutResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.opaque_group_failure && graph.group_count() > 0 {
                anyhow::bail!("renderer backend unavailable");
            }
            self.inner.layout(graph)
        }

        fn name(&self) -> &'static str {
            "counting"
        }

        fn version(&self) -> &'static str {
            "0.0.1"
        }
    }

    #[test]
    fn test_fallback_skips_invalid_config() {
        let calls = Arc::new(AtomicUsize::new(0));
        let engine = CountingEngine {
            inner: LayeredLayout::with_config(LayoutConfig {
                group_padding: -5.0,
                ..LayoutConfig::default()
            }),
            calls: Arc::clone(&calls),
            opaque_group_failure: false,
        };
        let pipeline = DiagramPipeline::new(Box::new(engine)).with_fallback(true);

        let err = pipeline.run(&grouped_graph()).unwrap_err();
        let layout_err = err.downcast_ref::<LayoutError>().unwrap();
        assert!(matches!(layout_err, LayoutError::InvalidConfig { .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_fallback_retries_foreign_errors() {
        let calls = Arc::new(AtomicUsize::new(0));
        let engine = CountingEngine {
            inner: LayeredLayout::new(),
            calls: Arc::clone(&calls),
            opaque_group_failure: true,
        };
        let pipeline = DiagramPipeline::new(Box::new(engine)).with_fallback(true);

        let diagram = pipeline.run(&grouped_graph()).unwrap();
        assert!(diagram.flat_fallback);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_json_shape() {
        let mut graph = grouped_graph();
        graph.add_simple_edge("a", "ghost").unwrap();
        let diagram = DiagramPipeline::default().run(&graph).unwrap();
        let json: serde_json::Value = serde_json::from_str(&diagram.to_json().unwrap()).unwrap();

        assert!(json["nodePositions"]["a"]["x"].is_number());
        assert!(json["groupBoxes"]["g"]["width"].is_number());
        assert!(json["width"].is_number());
        assert_eq!(json["edges"][1]["target"], "ghost");
        assert!(json["edges"][1].get("sourceHandle").is_none());
        assert!(json["handles"].get("ghost").is_none());
        assert_eq!(json["flatFallback"], false);
    }
}
