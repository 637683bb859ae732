//! The extraction-and-modeling pipeline
//!
//! Phase 1 (per file): [`SourceNormalizer`] → [`EntityScanner`] →
//! [`MemberExtractor`]. Phase 2 (global): [`RelationshipResolver`], then
//! [`Classifier`] and [`DiagramModelBuilder`]. [`Orchestrator`] runs both.

mod builder;
mod classifier;
mod members;
mod normalizer;
mod orchestrator;
mod resolver;
mod scanner;

pub use builder::{arrow_for, DiagramModelBuilder, ARROWS};
pub use classifier::{Classifier, Predicate, Rule};
pub use members::{clean_type, KeepAll, MemberExtractor, NoiseFilter, TruncationFilter};
pub use normalizer::{strip_comments, SourceNormalizer};
pub use orchestrator::{sample_text, ExtractConfig, Extraction, Orchestrator, SourceFile};
pub use resolver::{resolve, RelationshipResolver};
pub use scanner::{clean_bases, Declaration, EntityScanner};
