//! Layered layout engine with nested groups
//!
//! Without groups every node is a sibling in one flat layered graph. With
//! groups, each group is first laid out on its own (intra-group edges only)
//! and shrink-wrapped with padding; the groups then take part in an outer
//! layered graph as single boxes next to the ungrouped nodes, ordered by the
//! edges that cross group boundaries. Member positions are finally
//! translated by their group's position.

use anyhow::Result;
use std::collections::HashMap;
use tracing::{debug, info, span, trace, Level};

use super::layered::{layered_positions, LayerGraph};
use super::LayoutConfig;
use crate::core::{ArchitectureGraph, LayoutEngine, LayoutResult, NodeData, Point, Rect, Size};

/// A group laid out on its own, in group-local coordinates
#[derive(Debug)]
struct PackedGroup<'a> {
    group_id: &'a str,
    members: Vec<&'a NodeData>,
    /// Member offsets from the group's top-left corner, padding included
    offsets: Vec<Point>,
    size: Size,
}

/// Default layout engine: layered placement with group nesting
#[derive(Debug, Clone, Default)]
pub struct LayeredLayout {
    config: LayoutConfig,
}

impl LayeredLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Every node as a sibling in one layered graph
    fn layout_flat(&self, graph: &ArchitectureGraph, result: &mut LayoutResult) {
        let flat_span = span!(Level::DEBUG, "layout_flat");
        let _enter = flat_span.enter();

        let nodes: Vec<&NodeData> = graph.nodes().collect();
        let points = self.layout_members(graph, &nodes);
        for (node, point) in nodes.iter().zip(points) {
            result.node_positions.insert(node.id.clone(), point);
        }
    }

    /// Lay out `members` using only the edges between them
    fn layout_members(&self, graph: &ArchitectureGraph, members: &[&NodeData]) -> Vec<Point> {
        let index: HashMap<&str, usize> = members
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.as_str(), i))
            .collect();

        let mut layer_graph = LayerGraph::uniform(members.len(), self.config.node_size());
        for edge in graph.edges() {
            match (index.get(edge.source.as_str()), index.get(edge.target.as_str())) {
                (Some(&from), Some(&to)) => {
                    layer_graph.add_edge(from, to);
                }
                _ => trace!(edge_id = %edge.id, "Edge leaves this subgraph, skipped"),
            }
        }

        layered_positions(&layer_graph, &self.config)
    }

    /// Lay out one group's members and wrap them in a padded box
    fn pack_group<'a>(
        &self,
        graph: &'a ArchitectureGraph,
        group_id: &'a str,
        members: Vec<&'a NodeData>,
    ) -> PackedGroup<'a> {
        let points = self.layout_members(graph, &members);
        let node_size = self.config.node_size();
        let padding = self.config.group_padding;

        let bounds = points
            .iter()
            .map(|p| Rect::at(*p, node_size))
            .reduce(|acc, r| acc.union(&r))
            .unwrap_or_default();

        let offsets = points
            .iter()
            .map(|p| Point::new(p.x - bounds.x + padding, p.y - bounds.y + padding))
            .collect();
        let size = Size::new(bounds.width + 2.0 * padding, bounds.height + 2.0 * padding);

        debug!(group_id, member_count = members.len(), width = size.width, height = size.height, "Packed group");
        PackedGroup {
            group_id,
            members,
            offsets,
            size,
        }
    }

    fn layout_grouped(&self, graph: &ArchitectureGraph, result: &mut LayoutResult) {
        let grouped_span = span!(Level::DEBUG, "layout_grouped", group_count = graph.group_count());
        let _enter = grouped_span.enter();

        let group_index: HashMap<&str, usize> = graph
            .groups()
            .enumerate()
            .map(|(i, g)| (g.id.as_str(), i))
            .collect();

        let mut members: Vec<Vec<&NodeData>> = vec![Vec::new(); group_index.len()];
        let mut ungrouped: Vec<&NodeData> = Vec::new();
        for node in graph.nodes() {
            match node.group_id.as_deref().and_then(|g| group_index.get(g)) {
                Some(&g) => members[g].push(node),
                None => {
                    if let Some(group_id) = &node.group_id {
                        debug!(node_id = %node.id, group_id = %group_id, "Unknown group, node treated as ungrouped");
                    }
                    ungrouped.push(node);
                }
            }
        }

        let packed: Vec<PackedGroup> = graph
            .groups()
            .zip(members)
            .filter_map(|(group, members)| {
                if members.is_empty() {
                    debug!(group_id = %group.id, "Group has no members, no box produced");
                    None
                } else {
                    Some(self.pack_group(graph, &group.id, members))
                }
            })
            .collect();

        // Outer graph: packed groups first, then ungrouped nodes
        let mut outer_of: HashMap<&str, usize> = HashMap::new();
        let mut sizes: Vec<Size> = Vec::with_capacity(packed.len() + ungrouped.len());
        for group in &packed {
            for member in &group.members {
                outer_of.insert(member.id.as_str(), sizes.len());
            }
            sizes.push(group.size);
        }
        for node in &ungrouped {
            outer_of.insert(node.id.as_str(), sizes.len());
            sizes.push(self.config.node_size());
        }

        let mut outer = LayerGraph::new(sizes);
        for edge in graph.edges() {
            if let (Some(&from), Some(&to)) = (
                outer_of.get(edge.source.as_str()),
                outer_of.get(edge.target.as_str()),
            ) {
                if outer.add_edge(from, to) {
                    trace!(edge_id = %edge.id, from, to, "Cross-boundary edge");
                }
            }
        }
        debug!(box_count = outer.len(), edge_count = outer.edge_count(), "Built outer graph");

        let outer_points = layered_positions(&outer, &self.config);

        for (group, origin) in packed.iter().zip(&outer_points) {
            result
                .group_boxes
                .insert(group.group_id.to_string(), Rect::at(*origin, group.size));
            for (member, offset) in group.members.iter().zip(&group.offsets) {
                result
                    .node_positions
                    .insert(member.id.clone(), origin.offset(*offset));
            }
        }
        for (node, point) in ungrouped.iter().zip(&outer_points[packed.len()..]) {
            result.node_positions.insert(node.id.clone(), *point);
        }
    }
}

impl LayoutEngine for LayeredLayout {
    fn layout(&self, graph: &ArchitectureGraph) -> Result<LayoutResult> {
        let layout_span = span!(
            Level::INFO,
            "layout_architecture",
            node_count = graph.node_count(),
            edge_count = graph.edge_count(),
            group_count = graph.group_count(),
            direction = %self.config.direction
        );
        let _enter = layout_span.enter();

        self.config.validate()?;

        let mut result = LayoutResult::empty(self.config.node_size());
        if graph.node_count() == 0 {
            debug!("Empty graph, returning empty layout");
            return Ok(result);
        }

        if graph.group_count() == 0 {
            self.layout_flat(graph, &mut result);
        } else {
            self.layout_grouped(graph, &mut result);
        }

        result.check_finite(self.name())?;
        result.fit_bounds();

        info!(
            node_count = result.node_positions.len(),
            group_box_count = result.group_boxes.len(),
            width = result.width,
            height = result.height,
            "Layout completed"
        );
        Ok(result)
    }

    fn name(&self) -> &'static str {
        "layered"
    }

    fn version(&self) -> &'static str {
        "0.1.0"
    }
}
