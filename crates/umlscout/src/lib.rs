//! umlscout - Heuristic class-model extraction for UML diagrams
//!
//! Scans C++, Unreal Engine and C# sources for type declarations without a
//! compiler front end, infers inheritance and association edges across the
//! whole project, groups the types and produces a diagram IR that renders to
//! PlantUML or JSON.
//!
//! # Quick Start
//!
//! ```rust
//! use umlscout::{extract, render_plantuml};
//! use umlscout::dialects::Dialect;
//! use umlscout::pipeline::SourceFile;
//!
//! let files = vec![SourceFile::new(
//!     "Hero.h",
//!     "UCLASS()\nclass GAME_API AHero : public ACharacter\n{\n    GENERATED_BODY()\npublic:\n    float Health;\n};",
//! )];
//! let ir = extract(&files, Dialect::unreal());
//! assert_eq!(ir.group_of("AHero"), Some("Characters"));
//!
//! let text = render_plantuml(&ir).unwrap();
//! assert!(text.contains("AHero --|> ACharacter : inherits"));
//! ```
//!
//! # Advanced Usage
//!
//! The stages can be driven one at a time:
//!
//! ```rust
//! use umlscout::prelude::*;
//!
//! let dialect = Dialect::cpp();
//! let text = "class Weapon {};\nclass Player { Weapon* Gun; };";
//!
//! let normalized = SourceNormalizer::new(&dialect).normalize(text);
//! let entities: Vec<Entity> = EntityScanner::new(&dialect)
//!     .scan(&normalized)
//!     .into_iter()
//!     .map(|decl| decl.entity)
//!     .collect();
//! assert_eq!(entities.len(), 2);
//! ```

pub mod core;
pub mod dialects;
pub mod output;
pub mod pipeline;
pub mod project;

pub use core::*;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::core::{
        DiagramConfig, DiagramIr, Direction, Entity, EntityKind, EntitySet, Relation,
        RelationKind, RelationSet, Renderer, ScanError, Theme, Visibility,
    };
    pub use crate::dialects::{detect_dialect, Dialect, DialectId};
    pub use crate::output::{JsonRenderer, PlantUmlRenderer};
    pub use crate::pipeline::{
        Classifier, DiagramModelBuilder, EntityScanner, ExtractConfig, MemberExtractor,
        Orchestrator, RelationshipResolver, SourceFile, SourceNormalizer,
    };
    pub use crate::project::ProjectRoot;
}

/// Run the whole pipeline over in-memory or on-disk sources
///
/// Files that cannot be read are logged and skipped.
pub fn extract(files: &[pipeline::SourceFile], dialect: dialects::Dialect) -> DiagramIr {
    use crate::pipeline::{ExtractConfig, Orchestrator};

    Orchestrator::new(ExtractConfig::new(dialect)).process(files)
}

/// Render an IR as PlantUML text with the default presentation
///
/// # Example
/// ```rust
/// use umlscout::{render_plantuml, DiagramIr};
///
/// let text = render_plantuml(&DiagramIr::default()).unwrap();
/// assert!(text.contains("No entities found"));
/// ```
pub fn render_plantuml(ir: &DiagramIr) -> anyhow::Result<String> {
    output::PlantUmlRenderer::new().render(ir)
}

/// Render an IR as pretty JSON
pub fn render_json(ir: &DiagramIr) -> anyhow::Result<String> {
    output::JsonRenderer::new().render(ir)
}
