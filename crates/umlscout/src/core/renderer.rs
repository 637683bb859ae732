//! Core renderer trait for diagram output
//!
//! Renderers turn a finished [`DiagramIr`] into one textual output format.

use anyhow::Result;

use super::ir::DiagramIr;

/// Core trait for diagram renderers
///
/// # Example
/// ```
/// use umlscout::core::{DiagramIr, Renderer};
/// use umlscout::output::PlantUmlRenderer;
///
/// let renderer = PlantUmlRenderer::new();
/// let text = renderer.render(&DiagramIr::default()).unwrap();
/// assert!(text.starts_with("@startuml"));
/// ```
pub trait Renderer: Send + Sync {
    /// The output type of this renderer
    type Output;

    /// Render the diagram IR into the output format
    fn render(&self, ir: &DiagramIr) -> Result<Self::Output>;

    /// Get the name of this renderer
    fn name(&self) -> &'static str;

    /// Get the version of this renderer
    fn version(&self) -> &'static str;

    /// Get the supported output format (used as file extension)
    fn format(&self) -> &'static str;
}
