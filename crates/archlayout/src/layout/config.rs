//! Layout configuration

use serde::{Deserialize, Serialize};

use crate::core::{Direction, LayoutError, Size};

/// Spacing and sizing constants for the layered layout
///
/// Every field has a default, so partial JSON such as
/// `{"direction": "TD"}` deserializes into a complete config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    /// Flow direction of the layers
    pub direction: Direction,
    /// Width of every node box
    pub node_width: f64,
    /// Height of every node box
    pub node_height: f64,
    /// Gap between neighbouring boxes in the same layer
    pub node_spacing: f64,
    /// Gap between consecutive layers
    pub layer_spacing: f64,
    /// Margin between a group's border and its members
    pub group_padding: f64,
    /// Barycenter sweeps used to reduce crossings (0 keeps insertion order)
    pub ordering_iterations: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            direction: Direction::LeftRight,
            node_width: 200.0,
            node_height: 150.0,
            node_spacing: 50.0,
            layer_spacing: 60.0,
            group_padding: 40.0,
            ordering_iterations: 8,
        }
    }
}

impl LayoutConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_direction(direction: Direction) -> Self {
        Self {
            direction,
            ..Self::default()
        }
    }

    /// The uniform size every node is laid out with
    pub fn node_size(&self) -> Size {
        Size::new(self.node_width, self.node_height)
    }

    /// Reject sizes and spacings that would let boxes collapse onto each other
    pub fn validate(&self) -> Result<(), LayoutError> {
        let positive = [
            ("node_width", self.node_width),
            ("node_height", self.node_height),
            ("node_spacing", self.node_spacing),
            ("layer_spacing", self.layer_spacing),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(LayoutError::invalid_config(format!(
                    "{} must be a positive number, got {}",
                    name, value
                )));
            }
        }
        if !self.group_padding.is_finite() || self.group_padding < 0.0 {
            return Err(LayoutError::invalid_config(format!(
                "group_padding must be zero or positive, got {}",
                self.group_padding
            )));
        }
        Ok(())
    }
}
