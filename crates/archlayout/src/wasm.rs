//! WebAssembly bindings for archlayout
//!
//! Browser entry points exchanging JSON strings. Errors are thrown as
//! JavaScript exceptions carrying the error message.

use wasm_bindgen::prelude::*;

use crate::architecture::ArchitectureData;
use crate::layout::{LayeredLayout, LayoutConfig};
use crate::pipeline::DiagramPipeline;

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Initialize WASM module
///
/// Sets up panic hooks and logging to the browser console.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();

    use crate::core::logging::init_logging;
    let _ = init_logging(Some("info"), None);
}

/// Lay out an architecture payload
///
/// # Arguments
/// * `payload` - Architecture JSON (`services`, `connections`, `groups`, ...)
/// * `options` - Optional layout config JSON; missing fields use defaults
///
/// # Returns
/// * Diagram JSON with `nodePositions`, `groupBoxes`, `edges` and `handles`
/// * Throws a JavaScript error if the payload, options or layout fail
#[wasm_bindgen(js_name = layoutArchitecture)]
pub fn layout_architecture(payload: &str, options: Option<String>) -> Result<String, JsValue> {
    let config = match options.as_deref() {
        Some(json) if !json.trim().is_empty() => {
            serde_json::from_str::<LayoutConfig>(json).map_err(to_js)?
        }
        _ => LayoutConfig::default(),
    };

    let graph = ArchitectureData::from_json(payload)
        .map_err(to_js)?
        .to_graph()
        .map_err(to_js)?;

    DiagramPipeline::new(Box::new(LayeredLayout::with_config(config)))
        .with_fallback(true)
        .run(&graph)
        .and_then(|diagram| diagram.to_json())
        .map_err(to_js)
}

/// Default layout options as JSON
#[wasm_bindgen(js_name = defaultLayoutOptions)]
pub fn default_layout_options() -> Result<String, JsValue> {
    serde_json::to_string(&LayoutConfig::default()).map_err(to_js)
}

/// Get the library version
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
