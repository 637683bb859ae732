//! Generic C++ dialect

use super::{Dialect, DialectId};
use crate::core::{Detector, EntityKind};
use crate::pipeline::Rule;

const DECLARATIONS: &[(&str, EntityKind)] = &[
    ("class", EntityKind::Class),
    ("struct", EntityKind::Struct),
    ("enum", EntityKind::Enum),
];

const RULES: &[Rule] = &[
    Rule::kind(EntityKind::Enum, "Enums"),
    Rule::kind(EntityKind::Struct, "Structs"),
    Rule::kind(EntityKind::Interface, "Interfaces"),
];

impl Dialect {
    pub fn cpp() -> Self {
        Self {
            id: DialectId::Cpp,
            label: "C++",
            declaration_keywords: DECLARATIONS,
            annotation_keywords: &[],
            member_annotations: &[],
            decoration_lines: &["const", "const override"],
            inline_visibility: false,
            attribute_brackets: false,
            interface_prefix: false,
            private_struct_members: false,
            required_marker: None,
            extensions: &["h", "hh", "hpp", "hxx", "cpp", "cc", "cxx"],
            rules: RULES,
            default_group: "Classes",
            max_header_lines: 4,
        }
    }
}

/// Detector for plain C++ sources
pub struct CppDetector;

impl CppDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CppDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for CppDetector {
    fn detect(&self, input: &str) -> bool {
        self.confidence(input) > 0.5
    }

    fn confidence(&self, input: &str) -> f64 {
        let has_include = input.contains("#include");
        let has_sections = ["public:", "protected:", "private:"]
            .iter()
            .any(|marker| input.contains(marker));
        let has_std = input.contains("std::");
        let has_template = input.contains("template<") || input.contains("template <");

        if has_include && has_sections {
            return 0.7;
        }
        if has_include || has_sections {
            return 0.6;
        }
        if has_std || has_template {
            return 0.55;
        }
        0.0
    }

    fn dialect_name(&self) -> &'static str {
        "cpp"
    }

    fn patterns(&self) -> Vec<&'static str> {
        vec!["#include", "public:", "std::", "template<"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_scoring() {
        let detector = CppDetector::new();
        assert_eq!(detector.confidence("#include <x>\nclass A {\npublic:\n};"), 0.7);
        assert!(detector.detect("class A {\nprivate:\n int x;\n};"));
        assert!(detector.detect("std::vector<int> v;"));
        assert_eq!(detector.confidence("public class A { }"), 0.0);
        assert_eq!(detector.dialect_name(), "cpp");
    }
}
