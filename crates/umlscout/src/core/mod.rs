//! Core abstractions for class-model extraction
//!
//! Shared types, the object model, the diagram IR and the traits that the
//! dialect and output layers implement.

pub mod chumsky_utils;
pub mod delimiters;
mod detector;
mod error;
mod ir;
pub mod logging;
mod model;
mod renderer;
mod types;

pub use detector::*;
pub use error::*;
pub use ir::*;
pub use logging::*;
pub use model::*;
pub use renderer::*;
pub use types::*;
