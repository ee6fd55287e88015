//! Architecture payload ingestion
//!
//! Deserializes the architecture description produced upstream (services,
//! connections, optional groups and a pricing table) and converts it into an
//! [`ArchitectureGraph`]. Only the graph-shaped parts are interpreted; the
//! remaining fields are carried through unchanged.

use serde::{Deserialize, Serialize};
use tracing::{debug, span, Level};

use crate::core::{ArchitectureGraph, EdgeData, GroupData, LayoutError, NodeData};

/// A cloud service box
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceNode {
    pub id: String,
    pub label: String,
    /// Service category as named upstream
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Catalogue identifier of the cloud service, when the generator sets one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceGroup {
    pub id: String,
    pub label: String,
}

/// A directed connection between two services
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceConnection {
    pub id: String,
    pub source_id: String,
    pub target_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// One line of the cost table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingItem {
    pub service: String,
    pub description: String,
    pub cost: String,
}

/// The full architecture payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchitectureData {
    #[serde(default)]
    pub services: Vec<ServiceNode>,
    #[serde(default)]
    pub connections: Vec<ServiceConnection>,
    #[serde(default)]
    pub groups: Vec<ServiceGroup>,
    #[serde(default)]
    pub pricing: Vec<PricingItem>,
    #[serde(default, alias = "totalEstimatedCost")]
    pub total_cost: String,
}

impl ArchitectureData {
    /// Parse a payload, reporting malformed JSON as [`LayoutError::Payload`]
    pub fn from_json(input: &str) -> Result<Self, LayoutError> {
        let data: ArchitectureData = serde_json::from_str(input)?;
        debug!(
            service_count = data.services.len(),
            connection_count = data.connections.len(),
            group_count = data.groups.len(),
            "Parsed architecture payload"
        );
        Ok(data)
    }

    /// Services become nodes, connections become edges, groups stay groups
    pub fn to_graph(&self) -> anyhow::Result<ArchitectureGraph> {
        let convert_span = span!(Level::DEBUG, "to_graph", service_count = self.services.len());
        let _enter = convert_span.enter();

        let mut graph = ArchitectureGraph::new();
        for group in &self.groups {
            graph.add_group(GroupData::new(&group.id, &group.label))?;
        }
        for service in &self.services {
            let node = NodeData {
                id: service.id.clone(),
                label: service.label.clone(),
                description: service.description.clone(),
                group_id: service.group_id.clone(),
            };
            graph.add_node(node)?;
        }
        for connection in &self.connections {
            let mut edge = EdgeData::new(
                &connection.id,
                &connection.source_id,
                &connection.target_id,
            );
            edge.label = connection.label.clone();
            graph.add_edge(edge)?;
        }
        Ok(graph)
    }
}
