//! Core error types for diagram layout
//!
//! Unknown group references, dangling edge endpoints and empty groups are
//! recovered silently by the layout and anchor passes, so they never show up
//! here. What remains are the failures that must abort a layout request.

use thiserror::Error;

/// Errors produced while laying out an architecture diagram
#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("Invalid layout config: {message}")]
    InvalidConfig { message: String },

    #[error("Layout engine '{engine}' failed: {message}")]
    Engine { engine: String, message: String },

    #[error("Malformed architecture payload: {source}")]
    Payload {
        #[from]
        source: serde_json::Error,
    },
}

impl LayoutError {
    /// Create a new invalid-config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create a new engine failure
    pub fn engine(engine: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Engine {
            engine: engine.into(),
            message: message.into(),
        }
    }

    /// Returns true for failures inside the engine itself, as opposed to a
    /// rejected config or payload
    pub fn is_engine_failure(&self) -> bool {
        matches!(self, Self::Engine { .. })
    }
}
