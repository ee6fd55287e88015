//! Anchor assignment
//!
//! Once nodes have positions, every edge is given the side of its source it
//! leaves from and the side of its target it enters through. The choice
//! follows the dominant axis of the displacement between the two nodes'
//! top-left corners. Sides that at least one edge uses are collected per
//! node in a [`HandleMap`] so a renderer only draws those attachment points.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, span, trace, Level};

use crate::core::{EdgeAnchors, EdgeData, LayoutResult, Point, Side};

/// A set of node sides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SideSet(u8);

impl SideSet {
    pub fn new() -> Self {
        Self::default()
    }

    fn bit(side: Side) -> u8 {
        match side {
            Side::Top => 1,
            Side::Right => 1 << 1,
            Side::Bottom => 1 << 2,
            Side::Left => 1 << 3,
        }
    }

    pub fn insert(&mut self, side: Side) {
        self.0 |= Self::bit(side);
    }

    pub fn contains(&self, side: Side) -> bool {
        self.0 & Self::bit(side) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Members in `Top, Right, Bottom, Left` order
    pub fn iter(&self) -> impl Iterator<Item = Side> + '_ {
        Side::ALL.into_iter().filter(move |s| self.contains(*s))
    }
}

impl FromIterator<Side> for SideSet {
    fn from_iter<I: IntoIterator<Item = Side>>(iter: I) -> Self {
        let mut set = SideSet::new();
        for side in iter {
            set.insert(side);
        }
        set
    }
}

/// Sides of one node that carry at least one connector
///
/// Serializes as the eight flags `sourceTop`, `sourceRight`, `sourceBottom`,
/// `sourceLeft`, `targetTop`, `targetRight`, `targetBottom`, `targetLeft`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "HandleFlags", into = "HandleFlags")]
pub struct UsedHandles {
    /// Sides edges leave this node from
    pub outgoing: SideSet,
    /// Sides edges enter this node through
    pub incoming: SideSet,
}

impl UsedHandles {
    pub fn is_empty(&self) -> bool {
        self.outgoing.is_empty() && self.incoming.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct HandleFlags {
    source_top: bool,
    source_right: bool,
    source_bottom: bool,
    source_left: bool,
    target_top: bool,
    target_right: bool,
    target_bottom: bool,
    target_left: bool,
}

impl From<UsedHandles> for HandleFlags {
    fn from(used: UsedHandles) -> Self {
        Self {
            source_top: used.outgoing.contains(Side::Top),
            source_right: used.outgoing.contains(Side::Right),
            source_bottom: used.outgoing.contains(Side::Bottom),
            source_left: used.outgoing.contains(Side::Left),
            target_top: used.incoming.contains(Side::Top),
            target_right: used.incoming.contains(Side::Right),
            target_bottom: used.incoming.contains(Side::Bottom),
            target_left: used.incoming.contains(Side::Left),
        }
    }
}

impl From<HandleFlags> for UsedHandles {
    fn from(flags: HandleFlags) -> Self {
        let pick = |pairs: [(bool, Side); 4]| {
            pairs
                .into_iter()
                .filter(|(used, _)| *used)
                .map(|(_, side)| side)
                .collect::<SideSet>()
        };
        Self {
            outgoing: pick([
                (flags.source_top, Side::Top),
                (flags.source_right, Side::Right),
                (flags.source_bottom, Side::Bottom),
                (flags.source_left, Side::Left),
            ]),
            incoming: pick([
                (flags.target_top, Side::Top),
                (flags.target_right, Side::Right),
                (flags.target_bottom, Side::Bottom),
                (flags.target_left, Side::Left),
            ]),
        }
    }
}

/// Used handles of every node touched by a resolved edge
///
/// Built once by [`assign_anchors`] and only read afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HandleMap(BTreeMap<String, UsedHandles>);

impl HandleMap {
    pub fn get(&self, node_id: &str) -> Option<&UsedHandles> {
        self.0.get(node_id)
    }

    /// Handles of a node; nodes without edges use none
    pub fn used_handles(&self, node_id: &str) -> UsedHandles {
        self.get(node_id).copied().unwrap_or_default()
    }

    pub fn contains(&self, node_id: &str) -> bool {
        self.0.contains_key(node_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &UsedHandles)> {
        self.0.iter()
    }
}

/// Sides for a displacement `(dx, dy)` from source to target.
///
/// The edge is horizontal when `|dx| >= |dy|`, so exact diagonals go
/// horizontal. Zero displacement yields `right -> left`.
pub fn classify(dx: f64, dy: f64) -> EdgeAnchors {
    let (source, target) = if dx.abs() >= dy.abs() {
        if dx < 0.0 {
            (Side::Left, Side::Right)
        } else {
            (Side::Right, Side::Left)
        }
    } else if dy > 0.0 {
        (Side::Bottom, Side::Top)
    } else {
        (Side::Top, Side::Bottom)
    };
    EdgeAnchors { source, target }
}

/// Anchors for a single edge, if both endpoints were placed
pub fn anchors_between(layout: &LayoutResult, source: &str, target: &str) -> Option<EdgeAnchors> {
    let from: Point = layout.position(source)?;
    let to: Point = layout.position(target)?;
    Some(classify(to.x - from.x, to.y - from.y))
}

/// Assign anchors to every edge and collect the used sides per node.
///
/// Each edge's `anchors` is overwritten: set when both endpoints have a
/// position, cleared otherwise. Edges with an unplaced endpoint add nothing
/// to the returned map.
pub fn assign_anchors(layout: &LayoutResult, edges: &mut [EdgeData]) -> HandleMap {
    let anchor_span = span!(Level::INFO, "assign_anchors", edge_count = edges.len());
    let _enter = anchor_span.enter();

    let mut handles: BTreeMap<String, UsedHandles> = BTreeMap::new();
    let mut skipped = 0usize;

    for edge in edges.iter_mut() {
        let Some(anchors) = anchors_between(layout, &edge.source, &edge.target) else {
            debug!(
                edge_id = %edge.id,
                source = %edge.source,
                target = %edge.target,
                "Edge endpoint has no position, skipped"
            );
            edge.anchors = None;
            skipped += 1;
            continue;
        };

        trace!(
            edge_id = %edge.id,
            source_side = %anchors.source,
            target_side = %anchors.target,
            "Assigned anchors"
        );
        handles
            .entry(edge.source.clone())
            .or_default()
            .outgoing
            .insert(anchors.source);
        handles
            .entry(edge.target.clone())
            .or_default()
            .incoming
            .insert(anchors.target);
        edge.anchors = Some(anchors);
    }

    info!(
        anchored = edges.len() - skipped,
        skipped,
        node_count = handles.len(),
        "Anchor assignment completed"
    );
    HandleMap(handles)
}
