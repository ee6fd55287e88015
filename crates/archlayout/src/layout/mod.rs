//! Layered layout engine
//!
//! Flat layering lives in [`layered`], crossing reduction in [`ordering`];
//! [`LayeredLayout`] composes them into the grouped layout.

mod compound;
mod config;
pub mod layered;
pub mod ordering;

pub use crate::core::LayoutResult;
pub use compound::LayeredLayout;
pub use config::LayoutConfig;
pub use layered::{layered_positions, LayerGraph};
