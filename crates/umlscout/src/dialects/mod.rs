//! Source dialects
//!
//! A dialect is a table of keywords, macros and classification rules. All
//! dialects share one extraction pipeline; nothing here branches on the
//! dialect beyond reading these tables.

mod cpp;
mod csharp;
mod unreal;

pub use cpp::CppDetector;
pub use csharp::CSharpDetector;
pub use unreal::UnrealDetector;

use serde::Serialize;
use std::fmt;
use std::path::Path;
use tracing::{debug, trace};

use crate::core::{Detector, EntityKind, ScanError, Visibility};
use crate::pipeline::Rule;

/// Identifier of a built-in dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DialectId {
    Cpp,
    Unreal,
    CSharp,
}

impl DialectId {
    pub fn all() -> &'static [DialectId] {
        &[DialectId::Cpp, DialectId::Unreal, DialectId::CSharp]
    }

    pub fn name(&self) -> &'static str {
        match self {
            DialectId::Cpp => "cpp",
            DialectId::Unreal => "unreal",
            DialectId::CSharp => "csharp",
        }
    }
}

impl fmt::Display for DialectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Keyword and rule tables for one source dialect
#[derive(Debug, Clone)]
pub struct Dialect {
    pub id: DialectId,
    /// Human readable name
    pub label: &'static str,
    pub declaration_keywords: &'static [(&'static str, EntityKind)],
    /// Annotation macro preceding a declaration, and the kind it implies
    pub annotation_keywords: &'static [(&'static str, EntityKind)],
    /// Macros stripped from the front of a member statement
    pub member_annotations: &'static [&'static str],
    /// Lines removed outright by the normalizer
    pub decoration_lines: &'static [&'static str],
    /// Members may carry their own visibility keyword
    pub inline_visibility: bool,
    /// `[Attribute]` groups may precede declarations and members
    pub attribute_brackets: bool,
    /// Bases named `I` + uppercase letter are interfaces
    pub interface_prefix: bool,
    /// Struct members start private, as class members do
    pub private_struct_members: bool,
    /// Entry that must exist directly under the project root
    pub required_marker: Option<&'static str>,
    pub extensions: &'static [&'static str],
    pub rules: &'static [Rule],
    pub default_group: &'static str,
    /// Lines the scanner looks ahead for the opening brace
    pub max_header_lines: usize,
}

impl Dialect {
    pub fn get(id: DialectId) -> Self {
        match id {
            DialectId::Cpp => Self::cpp(),
            DialectId::Unreal => Self::unreal(),
            DialectId::CSharp => Self::csharp(),
        }
    }

    /// Look up a dialect by name (`cpp`, `c++`, `unreal`, `ue`, `csharp`, `cs`, `c#`)
    pub fn from_name(name: &str) -> Result<Self, ScanError> {
        let id = match name.to_lowercase().as_str() {
            "cpp" | "c++" | "cxx" => DialectId::Cpp,
            "unreal" | "ue" | "unreal-engine" => DialectId::Unreal,
            "csharp" | "cs" | "c#" | "unity" => DialectId::CSharp,
            _ => {
                return Err(ScanError::UnknownDialect {
                    name: name.to_string(),
                })
            }
        };
        Ok(Self::get(id))
    }

    pub fn all() -> Vec<Self> {
        DialectId::all().iter().map(|&id| Self::get(id)).collect()
    }

    pub fn name(&self) -> &'static str {
        self.id.name()
    }

    pub fn declaration_kind(&self, word: &str) -> Option<EntityKind> {
        lookup(self.declaration_keywords, word)
    }

    pub fn annotation_kind(&self, word: &str) -> Option<EntityKind> {
        lookup(self.annotation_keywords, word)
    }

    pub fn is_member_annotation(&self, word: &str) -> bool {
        self.member_annotations.contains(&word)
    }

    pub fn is_decoration_line(&self, line: &str) -> bool {
        self.decoration_lines.contains(&line)
    }

    /// Whether a file belongs to this dialect by extension
    pub fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                self.extensions
                    .iter()
                    .any(|known| known.eq_ignore_ascii_case(ext))
            })
    }

    /// Visibility a member of `kind` gets before any marker is seen
    pub fn default_visibility(&self, kind: EntityKind) -> Visibility {
        match kind {
            EntityKind::Struct if self.private_struct_members => Visibility::Private,
            _ => kind.default_visibility(),
        }
    }

    /// Whether a name follows the `IThing` interface naming convention
    pub fn looks_like_interface(&self, name: &str) -> bool {
        let mut chars = name.chars();
        self.interface_prefix
            && chars.next() == Some('I')
            && chars.next().is_some_and(|c| c.is_ascii_uppercase())
    }

    pub fn detector(&self) -> Box<dyn Detector> {
        match self.id {
            DialectId::Cpp => Box::new(CppDetector::new()),
            DialectId::Unreal => Box::new(UnrealDetector::new()),
            DialectId::CSharp => Box::new(CSharpDetector::new()),
        }
    }
}

fn lookup(table: &[(&str, EntityKind)], word: &str) -> Option<EntityKind> {
    table
        .iter()
        .find(|(keyword, _)| *keyword == word)
        .map(|&(_, kind)| kind)
}

/// Pick the dialect whose detector is most confident about `sample`
///
/// Falls back to generic C++ when no detector claims the text.
pub fn detect_dialect(sample: &str) -> Dialect {
    let mut best: Option<(Dialect, f64)> = None;
    for dialect in Dialect::all() {
        let detector = dialect.detector();
        let confidence = detector.confidence(sample);
        trace!(dialect = dialect.name(), confidence, "Checking detector");
        if !detector.detect(sample) {
            continue;
        }
        if best.as_ref().map_or(true, |(_, c)| confidence > *c) {
            best = Some((dialect, confidence));
        }
    }

    match best {
        Some((dialect, confidence)) => {
            debug!(dialect = dialect.name(), confidence, "Detected dialect");
            dialect
        }
        None => {
            debug!("No detector matched, falling back to cpp");
            Dialect::cpp()
        }
    }
}
