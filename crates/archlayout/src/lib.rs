//! Archlayout - automatic layout for cloud architecture diagrams
//!
//! Places services (optionally nested in groups) with a layered layout and
//! picks the side every connector leaves and enters each box through.
//!
//! # Quick Start
//!
//! ```rust
//! use archlayout::{layout_graph, ArchitectureGraph, LayoutConfig};
//!
//! let mut graph = ArchitectureGraph::new();
//! graph.add_simple_node("alb", "Load Balancer").unwrap();
//! graph.add_simple_node("api", "API").unwrap();
//! graph.add_simple_edge("alb", "api").unwrap();
//!
//! let diagram = layout_graph(&graph, LayoutConfig::default()).unwrap();
//! let alb = diagram.layout.position("alb").unwrap();
//! let api = diagram.layout.position("api").unwrap();
//! assert!(alb.x < api.x);
//! assert_eq!(diagram.edges[0].source_handle.as_deref(), Some("source-right"));
//! ```
//!
//! # Advanced Usage
//!
//! The layout and anchor passes can be run separately:
//!
//! ```rust
//! use archlayout::prelude::*;
//!
//! let mut graph = ArchitectureGraph::new();
//! graph.add_simple_group("vpc").unwrap();
//! graph.add_grouped_node("api", "API", "vpc").unwrap();
//! graph.add_grouped_node("db", "Database", "vpc").unwrap();
//! graph.add_simple_edge("api", "db").unwrap();
//!
//! let engine = LayeredLayout::with_config(LayoutConfig::with_direction(Direction::TopDown));
//! let layout = engine.layout(&graph).unwrap();
//! let vpc = layout.group_box("vpc").unwrap();
//! assert!(vpc.contains(&layout.node_rect("db").unwrap()));
//!
//! let mut edges: Vec<EdgeData> = graph.edges().cloned().collect();
//! let handles = assign_anchors(&layout, &mut edges);
//! assert!(handles.used_handles("db").incoming.contains(Side::Top));
//! ```

pub mod anchors;
pub mod architecture;
pub mod core;
pub mod layout;
pub mod pipeline;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

pub use crate::core::*;
pub use layout::{LayeredLayout, LayoutConfig};
pub use pipeline::{DiagramLayout, DiagramPipeline};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::anchors::{assign_anchors, classify, HandleMap, SideSet, UsedHandles};
    pub use crate::architecture::ArchitectureData;
    pub use crate::core::{
        ArchitectureGraph, Direction, EdgeAnchors, EdgeData, GroupData, LayoutEngine,
        LayoutError, LayoutResult, NodeData, Point, Rect, Side, Size,
    };
    pub use crate::layout::{LayeredLayout, LayoutConfig};
    pub use crate::pipeline::{DiagramEdge, DiagramLayout, DiagramPipeline};
}

/// Lay out a graph and assign connector anchors
///
/// Uses the layered engine with `config`. A failure is returned as is; use
/// [`DiagramPipeline::with_fallback`] to retry without groups instead.
///
/// # Example
/// ```rust
/// use archlayout::{layout_graph, ArchitectureGraph, LayoutConfig};
///
/// let mut graph = ArchitectureGraph::new();
/// graph.add_simple_node("a", "A").unwrap();
/// graph.add_simple_edge("a", "ghost").unwrap();
///
/// let diagram = layout_graph(&graph, LayoutConfig::default()).unwrap();
/// assert!(diagram.edges[0].source_handle.is_none());
/// assert!(diagram.handles.is_empty());
/// ```
pub fn layout_graph(graph: &ArchitectureGraph, config: LayoutConfig) -> anyhow::Result<DiagramLayout> {
    DiagramPipeline::new(Box::new(LayeredLayout::with_config(config))).run(graph)
}

/// Lay out an architecture payload given as JSON, returning diagram JSON
///
/// Grouped layout failures fall back to a flat layout.
///
/// # Example
/// ```rust
/// use archlayout::layout_architecture_json;
///
/// let payload = r#"{
///     "services": [
///         {"id": "1", "label": "CloudFront", "type": "service"},
///         {"id": "2", "label": "S3", "type": "service"}
///     ],
///     "connections": [{"id": "c1", "sourceId": "1", "targetId": "2"}],
///     "pricing": [],
///     "totalCost": "$0"
/// }"#;
///
/// let json = layout_architecture_json(payload).unwrap();
/// assert!(json.contains("\"sourceHandle\":\"source-right\""));
/// ```
pub fn layout_architecture_json(payload: &str) -> anyhow::Result<String> {
    let graph = architecture::ArchitectureData::from_json(payload)?.to_graph()?;
    DiagramPipeline::default()
        .with_fallback(true)
        .run(&graph)?
        .to_json()
}
