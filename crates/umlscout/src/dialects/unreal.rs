//! Unreal Engine C++ dialect
//!
//! C++ with reflection macros (`UCLASS`, `UPROPERTY`, ...) and module
//! export qualifiers such as `MYGAME_API`.

use super::{Dialect, DialectId};
use crate::core::{Detector, EntityKind};
use crate::pipeline::Rule;

const DECLARATIONS: &[(&str, EntityKind)] = &[
    ("class", EntityKind::Class),
    ("struct", EntityKind::Struct),
    ("enum", EntityKind::Enum),
];

const ANNOTATIONS: &[(&str, EntityKind)] = &[
    ("UCLASS", EntityKind::Class),
    ("USTRUCT", EntityKind::Struct),
    ("UINTERFACE", EntityKind::Interface),
    ("UENUM", EntityKind::Enum),
];

const MEMBER_ANNOTATIONS: &[&str] = &[
    "UPROPERTY",
    "UFUNCTION",
    "GENERATED_BODY",
    "GENERATED_UCLASS_BODY",
    "GENERATED_USTRUCT_BODY",
    "GENERATED_UINTERFACE_BODY",
    "GENERATED_IINTERFACE_BODY",
    "UE_DEPRECATED",
    "ATTRIBUTE_ACCESSORS",
];

const DECORATIONS: &[&str] = &[
    "const",
    "const override",
    "GENERATED_BODY()",
    "GENERATED_UCLASS_BODY()",
    "GENERATED_USTRUCT_BODY()",
    "GENERATED_UINTERFACE_BODY()",
    "GENERATED_IINTERFACE_BODY()",
];

const RULES: &[Rule] = &[
    Rule::kind(EntityKind::Enum, "Enums"),
    Rule::kind(EntityKind::Struct, "Structs"),
    Rule::kind(EntityKind::Interface, "Interfaces"),
    Rule::base("GameMode", "GameModes"),
    Rule::base("Character", "Characters"),
    Rule::base("HUD", "HUD"),
    Rule::base("Controller", "Controllers"),
    Rule::base("Component", "Components"),
    Rule::base("Library", "BlueprintLibraries"),
    Rule::base("SaveGame", "Persistence"),
    Rule::base("DataAsset", "DataAssets"),
    Rule::base("Asset", "DataAssets"),
    Rule::base("Actor", "Actors"),
    Rule::base("Object", "Helpers"),
];

impl Dialect {
    pub fn unreal() -> Self {
        Self {
            id: DialectId::Unreal,
            label: "Unreal Engine C++",
            declaration_keywords: DECLARATIONS,
            annotation_keywords: ANNOTATIONS,
            member_annotations: MEMBER_ANNOTATIONS,
            decoration_lines: DECORATIONS,
            inline_visibility: false,
            attribute_brackets: false,
            interface_prefix: true,
            private_struct_members: false,
            required_marker: Some("Source"),
            extensions: &["h"],
            rules: RULES,
            default_group: "Others",
            max_header_lines: 4,
        }
    }
}

/// Detector for Unreal Engine headers
pub struct UnrealDetector;

impl UnrealDetector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for UnrealDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for UnrealDetector {
    fn detect(&self, input: &str) -> bool {
        self.confidence(input) > 0.5
    }

    fn confidence(&self, input: &str) -> f64 {
        let has_type_macro = ["UCLASS(", "USTRUCT(", "UINTERFACE(", "UENUM("]
            .iter()
            .any(|m| input.contains(m));
        let has_body_macro = input.contains("GENERATED_BODY") || input.contains("GENERATED_UCLASS_BODY");
        let has_member_macro = input.contains("UPROPERTY(") || input.contains("UFUNCTION(");
        let has_api_qualifier = input
            .split_whitespace()
            .any(|word| word.len() > 4 && word.ends_with("_API"));

        if has_type_macro && has_body_macro {
            return 1.0;
        }
        if has_type_macro || has_body_macro || has_member_macro {
            return 0.9;
        }
        if has_api_qualifier {
            return 0.7;
        }
        0.0
    }

    fn dialect_name(&self) -> &'static str {
        "unreal"
    }

    fn patterns(&self) -> Vec<&'static str> {
        vec!["UCLASS", "USTRUCT", "GENERATED_BODY", "UPROPERTY", "_API"]
    }
}
