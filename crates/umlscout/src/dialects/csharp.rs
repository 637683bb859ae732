//! C# dialect, including Unity projects

use super::{Dialect, DialectId};
use crate::core::{Detector, EntityKind};
use crate::pipeline::Rule;

const DECLARATIONS: &[(&str, EntityKind)] = &[
    ("class", EntityKind::Class),
    ("struct", EntityKind::Struct),
    ("interface", EntityKind::Interface),
    ("enum", EntityKind::Enum),
    ("record", EntityKind::Class),
];

const RULES: &[Rule] = &[
    Rule::kind(EntityKind::Enum, "Enums"),
    Rule::kind(EntityKind::Interface, "Interfaces"),
    Rule::base("MonoBehaviour", "MonoBehaviour"),
    Rule::base("ScriptableObject", "ScriptableObject"),
    Rule::base("Component", "Component"),
];

impl Dialect {
    pub fn csharp() -> Self {
        Self {
            id: DialectId::CSharp,
            label: "C#",
            declaration_keywords: DECLARATIONS,
            annotation_keywords: &[],
            member_annotations: &[],
            decoration_lines: &[],
            inline_visibility: true,
            attribute_brackets: true,
            interface_prefix: true,
            private_struct_members: true,
            required_marker: None,
            extensions: &["cs"],
            rules: RULES,
            default_group: "Other",
            max_header_lines: 4,
        }
    }
}

/// Detector for C# sources
pub struct CSharpDetector;

impl CSharpDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CSharpDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for CSharpDetector {
    fn detect(&self, input: &str) -> bool {
        self.confidence(input) > 0.5
    }

    fn confidence(&self, input: &str) -> f64 {
        if input.contains("using UnityEngine") || input.contains(": MonoBehaviour") {
            return 1.0;
        }
        if input.contains("using System") {
            return 0.9;
        }
        let has_property = input.contains("{ get;") || input.contains("{get;");
        let has_attribute = input.contains("[SerializeField]") || input.contains("[Serializable]");
        let has_namespace_block = input.contains("namespace ") && !input.contains("namespace std");
        let has_public_class = input.contains("public class ") || input.contains("public interface ");

        if has_property || has_attribute {
            return 0.8;
        }
        if has_public_class && has_namespace_block {
            return 0.7;
        }
        0.0
    }

    fn dialect_name(&self) -> &'static str {
        "csharp"
    }

    fn patterns(&self) -> Vec<&'static str> {
        vec!["using System", "using UnityEngine", "{ get;", "[SerializeField]"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_scoring() {
        let detector = CSharpDetector::new();
        assert_eq!(detector.confidence("using UnityEngine;"), 1.0);
        assert_eq!(detector.confidence("using System;\n"), 0.9);
        assert_eq!(detector.confidence("public int Hp { get; set; }"), 0.8);
        assert!(detector.detect("namespace Game {\n public class A { }\n}"));
        assert_eq!(detector.confidence("#include <x>"), 0.0);
    }
}
