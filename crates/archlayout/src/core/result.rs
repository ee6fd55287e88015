//! Layout output

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{LayoutError, Point, Rect, Size};

/// Absolute positions produced by a layout engine
///
/// Serializes as `{ nodePositions, groupBoxes, nodeSize, width, height }`.
/// Ordered maps keep the JSON stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutResult {
    /// Top-left corner of every node
    pub node_positions: BTreeMap<String, Point>,
    /// Bounding box of every group that has at least one member
    pub group_boxes: BTreeMap<String, Rect>,
    /// Size shared by all nodes
    pub node_size: Size,
    /// Extent of the whole drawing
    pub width: f64,
    pub height: f64,
}

impl LayoutResult {
    /// An empty result for a graph without nodes
    pub fn empty(node_size: Size) -> Self {
        Self {
            node_size,
            ..Self::default()
        }
    }

    pub fn position(&self, node_id: &str) -> Option<Point> {
        self.node_positions.get(node_id).copied()
    }

    /// The full box of a node
    pub fn node_rect(&self, node_id: &str) -> Option<Rect> {
        self.position(node_id).map(|p| Rect::at(p, self.node_size))
    }

    pub fn group_box(&self, group_id: &str) -> Option<Rect> {
        self.group_boxes.get(group_id).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.node_positions.is_empty()
    }

    /// Recompute `width`/`height` from the node and group boxes
    pub(crate) fn fit_bounds(&mut self) {
        let node_size = self.node_size;
        let rects = self
            .node_positions
            .values()
            .map(|p| Rect::at(*p, node_size))
            .chain(self.group_boxes.values().copied());
        let (width, height) = rects.fold((0.0f64, 0.0f64), |(w, h), r| {
            (w.max(r.right()), h.max(r.bottom()))
        });
        self.width = width;
        self.height = height;
    }

    /// Fail if any coordinate came out NaN or infinite
    pub(crate) fn check_finite(&self, engine: &str) -> Result<(), LayoutError> {
        if let Some((id, _)) = self.node_positions.iter().find(|(_, p)| !p.is_finite()) {
            return Err(LayoutError::engine(
                engine,
                format!("node '{}' received a non-finite position", id),
            ));
        }
        let bad_group = self.group_boxes.iter().find(|(_, r)| {
            !(r.x.is_finite() && r.y.is_finite() && r.width.is_finite() && r.height.is_finite())
        });
        if let Some((id, _)) = bad_group {
            return Err(LayoutError::engine(
                engine,
                format!("group '{}' received a non-finite box", id),
            ));
        }
        Ok(())
    }
}
