//! Structured interchange output

use anyhow::Result;
use tracing::debug;

use crate::core::{DiagramIr, Renderer, ScanError};

/// Serializes the IR as pretty JSON
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer;

impl JsonRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for JsonRenderer {
    type Output = String;

    fn render(&self, ir: &DiagramIr) -> Result<String> {
        let json = serde_json::to_string_pretty(ir)
            .map_err(|e| ScanError::render_error(e.to_string()))?;
        debug!(bytes = json.len(), "JSON rendered");
        Ok(json)
    }

    fn name(&self) -> &'static str {
        "json"
    }

    fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    fn format(&self) -> &'static str {
        "json"
    }
}
