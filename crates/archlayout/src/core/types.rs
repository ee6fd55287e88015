//! Core type definitions for diagram layout
//!
//! Geometry primitives, flow direction, and the node/edge/group records the
//! layout and anchor passes operate on.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Flow direction of the layered layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Left to right (LR)
    #[default]
    #[serde(rename = "LR", alias = "RIGHT")]
    LeftRight,
    /// Top to bottom (TD or TB)
    #[serde(rename = "TD", alias = "TB", alias = "DOWN")]
    TopDown,
    /// Right to left (RL)
    #[serde(rename = "RL", alias = "LEFT")]
    RightLeft,
    /// Bottom to top (BT)
    #[serde(rename = "BT", alias = "UP")]
    BottomUp,
}

impl Direction {
    /// Parse a direction from `LR`, `TD`/`TB`, `RL`, `BT` (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "LR" | "RIGHT" => Some(Direction::LeftRight),
            "TD" | "TB" | "DOWN" => Some(Direction::TopDown),
            "RL" | "LEFT" => Some(Direction::RightLeft),
            "BT" | "UP" => Some(Direction::BottomUp),
            _ => None,
        }
    }

    /// Returns true if layers advance along the x axis (LR or RL)
    pub fn is_horizontal(&self) -> bool {
        matches!(self, Direction::LeftRight | Direction::RightLeft)
    }

    /// Returns true if layers advance along the y axis (TD or BT)
    pub fn is_vertical(&self) -> bool {
        !self.is_horizontal()
    }

    /// Returns true if the flow runs against the axis (RL or BT)
    pub fn is_reversed(&self) -> bool {
        matches!(self, Direction::RightLeft | Direction::BottomUp)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::LeftRight => write!(f, "LR"),
            Direction::TopDown => write!(f, "TD"),
            Direction::RightLeft => write!(f, "RL"),
            Direction::BottomUp => write!(f, "BT"),
        }
    }
}

/// A point in layout space (top-left origin, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Translate by another point treated as an offset
    pub fn offset(&self, by: Point) -> Point {
        Point::new(self.x + by.x, self.y + by.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Width and height of a box
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// An axis-aligned box positioned by its top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn at(origin: Point, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Smallest rect covering both
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rect::new(
            x,
            y,
            self.right().max(other.right()) - x,
            self.bottom().max(other.bottom()) - y,
        )
    }

    /// Grow by `amount` on every side
    pub fn inflate(&self, amount: f64) -> Rect {
        Rect::new(
            self.x - amount,
            self.y - amount,
            self.width + 2.0 * amount,
            self.height + 2.0 * amount,
        )
    }

    /// Returns true if `other` lies entirely inside (edges may touch)
    pub fn contains(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Returns true if the interiors overlap
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

/// One side of a node's bounding box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::Top, Side::Right, Side::Bottom, Side::Left];

    pub fn opposite(&self) -> Side {
        match self {
            Side::Top => Side::Bottom,
            Side::Right => Side::Left,
            Side::Bottom => Side::Top,
            Side::Left => Side::Right,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Top => "top",
            Side::Right => "right",
            Side::Bottom => "bottom",
            Side::Left => "left",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sides an edge leaves its source from and enters its target through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeAnchors {
    pub source: Side,
    pub target: Side,
}

impl EdgeAnchors {
    /// Handle id on the source node, e.g. `source-right`
    pub fn source_handle(&self) -> String {
        format!("source-{}", self.source)
    }

    /// Handle id on the target node, e.g. `target-left`
    pub fn target_handle(&self) -> String {
        format!("target-{}", self.target)
    }
}

/// A service box in the diagram
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeData {
    /// Unique identifier
    pub id: String,
    /// Display label
    pub label: String,
    pub description: Option<String>,
    /// Declared group membership; may name a group that does not exist
    pub group_id: Option<String>,
}

impl NodeData {
    /// Create an ungrouped node
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            description: None,
            group_id: None,
        }
    }

    /// Create a node that declares membership in `group_id`
    pub fn in_group(
        id: impl Into<String>,
        label: impl Into<String>,
        group_id: impl Into<String>,
    ) -> Self {
        Self {
            group_id: Some(group_id.into()),
            ..Self::new(id, label)
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A directed connection between two nodes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeData {
    /// Unique identifier
    pub id: String,
    /// Source node ID
    pub source: String,
    /// Target node ID
    pub target: String,
    pub label: Option<String>,
    /// Filled in by anchor assignment; `None` when an endpoint has no position
    pub anchors: Option<EdgeAnchors>,
}

impl EdgeData {
    pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            label: None,
            anchors: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

/// A named cluster of nodes; its geometry comes from its members
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupData {
    pub id: String,
    pub label: String,
}

impl GroupData {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_parsing() {
        assert_eq!(Direction::parse("LR"), Some(Direction::LeftRight));
        assert_eq!(Direction::parse("tb"), Some(Direction::TopDown));
        assert_eq!(Direction::parse("TD"), Some(Direction::TopDown));
        assert_eq!(Direction::parse("RL"), Some(Direction::RightLeft));
        assert_eq!(Direction::parse("BT"), Some(Direction::BottomUp));
        assert_eq!(Direction::parse("RIGHT"), Some(Direction::LeftRight));
        assert_eq!(Direction::parse("sideways"), None);
    }

    #[test]
    fn test_direction_properties() {
        assert!(Direction::LeftRight.is_horizontal());
        assert!(Direction::RightLeft.is_horizontal());
        assert!(Direction::TopDown.is_vertical());
        assert!(Direction::RightLeft.is_reversed());
        assert!(Direction::BottomUp.is_reversed());
        assert!(!Direction::LeftRight.is_reversed());
        assert_eq!(Direction::default(), Direction::LeftRight);
    }

    #[test]
    fn test_direction_serde_names() {
        let json = serde_json::to_string(&Direction::TopDown).unwrap();
        assert_eq!(json, "\"TD\"");
        let parsed: Direction = serde_json::from_str("\"TB\"").unwrap();
        assert_eq!(parsed, Direction::TopDown);
    }

    #[test]
    fn test_rect_geometry() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(20.0, 5.0, 10.0, 10.0);
        let u = a.union(&b);
        assert_eq!(u, Rect::new(0.0, 0.0, 30.0, 15.0));
        assert!(u.contains(&a));
        assert!(u.contains(&b));
        assert!(!a.overlaps(&b));
        // Touching edges do not overlap
        assert!(!a.overlaps(&Rect::new(10.0, 0.0, 5.0, 5.0)));
        assert_eq!(a.inflate(2.0), Rect::new(-2.0, -2.0, 14.0, 14.0));
    }

    #[test]
    fn test_handle_ids() {
        let anchors = EdgeAnchors {
            source: Side::Bottom,
            target: Side::Top,
        };
        assert_eq!(anchors.source_handle(), "source-bottom");
        assert_eq!(anchors.target_handle(), "target-top");
        assert_eq!(Side::Left.opposite(), Side::Right);
    }

    #[test]
    fn test_record_constructors() {
        let node = NodeData::in_group("ec2", "Amazon EC2", "core").with_description("App tier");
        assert_eq!(node.group_id.as_deref(), Some("core"));
        assert_eq!(node.description.as_deref(), Some("App tier"));

        let edge = EdgeData::new("c1", "alb", "ec2").with_label("HTTP");
        assert_eq!(edge.label.as_deref(), Some("HTTP"));
        assert!(edge.anchors.is_none());
        assert!(EdgeData::new("c2", "a", "a").is_self_loop());
    }
}
