//! Core abstractions for diagram layout
//!
//! Shared geometry and record types, the graph store, the layout engine
//! trait with its result type, errors and logging setup.

mod engine;
mod error;
mod graph;
pub mod logging;
mod result;
mod types;

pub use engine::*;
pub use error::*;
pub use graph::*;
pub use logging::*;
pub use result::*;
pub use types::*;
