//! Layout engine capability
//!
//! Anything that can turn an [`ArchitectureGraph`] into positions implements
//! [`LayoutEngine`]. Anchor assignment and the pipeline only see this trait,
//! so engines can be swapped without touching them.

use anyhow::Result;

use super::{ArchitectureGraph, LayoutResult};

/// Computes node positions and group boxes for a graph
///
/// # Example
/// ```
/// use archlayout::core::{ArchitectureGraph, LayoutEngine};
/// use archlayout::layout::LayeredLayout;
///
/// let mut graph = ArchitectureGraph::new();
/// graph.add_simple_node("api", "API").unwrap();
///
/// let engine = LayeredLayout::new();
/// let result = engine.layout(&graph).unwrap();
/// assert_eq!(result.node_positions.len(), 1);
/// ```
pub trait LayoutEngine: Send + Sync {
    /// Lay out every node and every non-empty group.
    ///
    /// A failure must be reported as an error, never as partial positions.
    fn layout(&self, graph: &ArchitectureGraph) -> Result<LayoutResult>;

    /// Name of this engine
    fn name(&self) -> &'static str;

    /// Version of this engine
    fn version(&self) -> &'static str;
}
