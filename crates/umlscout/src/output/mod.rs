//! Output renderers for the diagram IR
//!
//! - [`PlantUmlRenderer`]: PlantUML class-diagram text
//! - [`JsonRenderer`]: pretty-printed JSON of the IR itself

mod json;
mod plantuml;

pub use json::JsonRenderer;
pub use plantuml::PlantUmlRenderer;
