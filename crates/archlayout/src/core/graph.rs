//! Architecture graph store
//!
//! Holds the nodes, edges and groups of one layout request. Insertion order
//! is preserved for all three so that layout is reproducible.

use anyhow::Result;
use std::collections::HashMap;
use tracing::{debug, trace};

use super::{EdgeData, GroupData, NodeData};

/// Nodes, edges and groups of a single architecture diagram
#[derive(Debug, Clone, Default)]
pub struct ArchitectureGraph {
    /// Nodes indexed by ID
    nodes: HashMap<String, NodeData>,
    /// Node IDs in insertion order
    node_order: Vec<String>,
    /// Edges in insertion order
    edges: Vec<EdgeData>,
    /// Groups in insertion order
    groups: Vec<GroupData>,
}

impl ArchitectureGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a node. A replaced node keeps its first position.
    pub fn add_node(&mut self, node: NodeData) -> Result<()> {
        trace!(node_id = %node.id, group_id = ?node.group_id, "Adding node");
        if !self.nodes.contains_key(&node.id) {
            self.node_order.push(node.id.clone());
        }
        self.nodes.insert(node.id.clone(), node);
        Ok(())
    }

    /// Add an edge. Endpoints are not checked; dangling edges are skipped later.
    pub fn add_edge(&mut self, edge: EdgeData) -> Result<()> {
        trace!(edge_id = %edge.id, source = %edge.source, target = %edge.target, "Adding edge");
        self.edges.push(edge);
        Ok(())
    }

    /// Add a group, replacing the label of an existing group with the same ID
    pub fn add_group(&mut self, group: GroupData) -> Result<()> {
        trace!(group_id = %group.id, "Adding group");
        match self.groups.iter_mut().find(|g| g.id == group.id) {
            Some(existing) => existing.label = group.label,
            None => self.groups.push(group),
        }
        Ok(())
    }

    pub fn get_node(&self, id: &str) -> Option<&NodeData> {
        self.nodes.get(id)
    }

    pub fn get_group(&self, id: &str) -> Option<&GroupData> {
        self.groups.iter().find(|g| g.id == id)
    }

    /// Iterate over nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &NodeData> {
        self.node_order.iter().filter_map(|id| self.nodes.get(id))
    }

    pub fn edges(&self) -> impl Iterator<Item = &EdgeData> {
        self.edges.iter()
    }

    pub fn groups(&self) -> impl Iterator<Item = &GroupData> {
        self.groups.iter()
    }

    pub fn has_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn has_group(&self, id: &str) -> bool {
        self.groups.iter().any(|g| g.id == id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// IDs of nodes this node points to
    pub fn successors(&self, node_id: &str) -> Vec<&str> {
        self.edges
            .iter()
            .filter(|e| e.source == node_id)
            .map(|e| e.target.as_str())
            .collect()
    }

    /// IDs of nodes pointing to this node
    pub fn predecessors(&self, node_id: &str) -> Vec<&str> {
        self.edges
            .iter()
            .filter(|e| e.target == node_id)
            .map(|e| e.source.as_str())
            .collect()
    }

    /// The group a node actually belongs to.
    ///
    /// A node naming a group that was never added counts as ungrouped.
    pub fn resolved_group(&self, node_id: &str) -> Option<&GroupData> {
        let group_id = self.nodes.get(node_id)?.group_id.as_deref()?;
        self.get_group(group_id)
    }

    /// Member nodes of a group, in insertion order
    pub fn members_of(&self, group_id: &str) -> Vec<&NodeData> {
        self.nodes()
            .filter(|n| n.group_id.as_deref() == Some(group_id))
            .collect()
    }

    /// Edges whose endpoints both exist
    pub fn resolved_edges(&self) -> impl Iterator<Item = &EdgeData> {
        self.edges
            .iter()
            .filter(|e| self.has_node(&e.source) && self.has_node(&e.target))
    }

    /// A copy with every group and membership removed
    pub fn without_groups(&self) -> Self {
        let mut flat = self.clone();
        flat.groups.clear();
        for node in flat.nodes.values_mut() {
            node.group_id = None;
        }
        debug!(node_count = flat.node_count(), "Stripped groups from graph");
        flat
    }

    /// Add an ungrouped node with the given label
    pub fn add_simple_node(&mut self, id: &str, label: &str) -> Result<()> {
        self.add_node(NodeData::new(id, label))
    }

    /// Add a node that declares membership in `group_id`
    pub fn add_grouped_node(&mut self, id: &str, label: &str, group_id: &str) -> Result<()> {
        self.add_node(NodeData::in_group(id, label, group_id))
    }

    /// Add an unlabeled edge with a generated `source->target` ID
    pub fn add_simple_edge(&mut self, source: &str, target: &str) -> Result<()> {
        let id = format!("{}->{}", source, target);
        self.add_edge(EdgeData::new(id, source, target))
    }

    /// Add a group whose label equals its ID
    pub fn add_simple_group(&mut self, id: &str) -> Result<()> {
        self.add_group(GroupData::new(id, id))
    }
}
