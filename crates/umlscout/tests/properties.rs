//! Property tests for the extraction pipeline

use proptest::prelude::*;
use std::collections::BTreeSet;

use umlscout::dialects::Dialect;
use umlscout::pipeline::{Classifier, ExtractConfig, Orchestrator, SourceFile};
use umlscout::prelude::*;

// ===================
// Strategies
// ===================

/// Base class names that can never collide with a keyword
fn base_names() -> impl Strategy<Value = BTreeSet<String>> {
    prop::collection::btree_set("Base[A-Za-z0-9]{0,6}", 1..6)
}

fn access_prefix() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![
        "",
        "public ",
        "protected ",
        "private ",
        "virtual public ",
        "public virtual ",
    ])
}

/// Ways of spelling a member whose type is `Weapon`
fn weapon_member() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["Weapon", "Weapon*", "const Weapon&", "Weapon &"])
}

const UNREAL_BASES: &[&str] = &[
    "AActor",
    "ACharacter",
    "APlayerController",
    "UActorComponent",
    "UBlueprintFunctionLibrary",
    "USaveGame",
    "UPrimaryDataAsset",
    "UObject",
    "AGameModeBase",
    "AHUD",
    "FTableRowBase",
    "Widget",
    "TSharedFromThis",
];

const UNREAL_PATTERNS: &[&str] = &[
    "GameMode",
    "Character",
    "HUD",
    "Controller",
    "Component",
    "Library",
    "SaveGame",
    "DataAsset",
    "Asset",
    "Actor",
    "Object",
];

fn entity_kind() -> impl Strategy<Value = EntityKind> {
    prop::sample::select(vec![
        EntityKind::Class,
        EntityKind::Class,
        EntityKind::Class,
        EntityKind::Struct,
        EntityKind::Interface,
        EntityKind::Enum,
    ])
}

fn unreal_entities() -> impl Strategy<Value = Vec<Entity>> {
    prop::collection::vec(
        (
            entity_kind(),
            prop::collection::vec(prop::sample::select(UNREAL_BASES.to_vec()), 0..3),
        ),
        1..12,
    )
    .prop_map(|specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(i, (kind, bases))| {
                Entity::new(format!("E{}", i), kind)
                    .with_bases(bases.into_iter().map(String::from).collect())
            })
            .collect()
    })
}

/// A small project: class `C<i>` may inherit from and hold members of earlier classes
fn project_sources() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(
        (
            prop::option::of(0usize..8),
            prop::collection::vec(0usize..8, 0..4),
            any::<bool>(),
        ),
        1..8,
    )
    .prop_map(|specs| {
        specs
            .iter()
            .enumerate()
            .map(|(i, (base, members, external))| {
                let mut header = format!("class C{}", i);
                match base {
                    Some(b) if *b < i => header.push_str(&format!(" : public C{}", b)),
                    _ if *external => header.push_str(" : public ExternalBase"),
                    _ => {}
                }
                let fields: String = members
                    .iter()
                    .enumerate()
                    .map(|(m, target)| format!("    C{}* Field{};\n", target % (i + 1), m))
                    .collect();
                format!("{}\n{{\npublic:\n{}}};\n", header, fields)
            })
            .collect()
    })
}

fn files_from(sources: &[String]) -> Vec<SourceFile> {
    sources
        .iter()
        .enumerate()
        .map(|(i, text)| SourceFile::new(format!("C{}.h", i), text.clone()))
        .collect()
}

// ===================
// Checks
// ===================

fn check_one_edge_per_base(
    bases: &BTreeSet<String>,
    prefixes: &[&str],
) -> Result<(), TestCaseError> {
    let clause: Vec<String> = bases
        .iter()
        .zip(prefixes.iter().cycle())
        .map(|(base, prefix)| format!("{}{}", prefix, base))
        .collect();
    let source = format!("class Derived : {} {{ }};", clause.join(", "));
    let files = vec![SourceFile::new("Derived.h", source)];

    let extraction = Orchestrator::new(ExtractConfig::new(Dialect::cpp())).extract(&files);
    let edges: Vec<&Relation> = extraction
        .relations
        .from_source("Derived")
        .filter(|r| r.kind.is_inheritance())
        .collect();

    prop_assert_eq!(edges.len(), bases.len());
    let targets: BTreeSet<String> = edges.iter().map(|r| r.target.clone()).collect();
    prop_assert_eq!(&targets, bases);
    Ok(())
}

fn check_single_association(spellings: &[&str]) -> Result<(), TestCaseError> {
    let fields: String = spellings
        .iter()
        .enumerate()
        .map(|(i, ty)| format!("    {} Slot{};\n", ty, i))
        .collect();
    let source = format!(
        "class Weapon {{ }};\nclass Player\n{{\npublic:\n{}    void Equip(Weapon* Next, int Index);\n}};\n",
        fields
    );
    let files = vec![SourceFile::new("Player.h", source)];

    let extraction = Orchestrator::new(ExtractConfig::new(Dialect::cpp())).extract(&files);
    let player = extraction.entities.get("Player");
    prop_assert!(player.is_some());
    prop_assert_eq!(player.map(|p| p.attributes.len()), Some(spellings.len()));

    let associations: Vec<&Relation> = extraction
        .relations
        .from_source("Player")
        .filter(|r| r.kind == RelationKind::Association)
        .collect();
    prop_assert_eq!(associations.len(), 1);
    prop_assert_eq!(associations[0].target.as_str(), "Weapon");
    Ok(())
}

fn check_idempotent(sources: &[String]) -> Result<(), TestCaseError> {
    let files = files_from(sources);
    let orchestrator = Orchestrator::new(ExtractConfig::new(Dialect::cpp()));

    let first = orchestrator.extract(&files);
    let second = orchestrator.extract(&files);
    prop_assert_eq!(&first.relations, &second.relations);

    let sequential =
        Orchestrator::new(ExtractConfig::new(Dialect::cpp()).sequential()).extract(&files);
    prop_assert_eq!(&first.relations, &sequential.relations);
    Ok(())
}

fn check_classification_total(entities: Vec<Entity>) -> Result<(), TestCaseError> {
    let dialect = Dialect::unreal();
    let set = EntitySet::from_entities(entities);
    let groups = Classifier::for_dialect(&dialect).group(&set);

    let placed: usize = groups.values().map(Vec::len).sum();
    prop_assert_eq!(placed, set.len());

    for entity in set.entities() {
        let homes: Vec<&str> = groups
            .iter()
            .filter(|(_, members)| members.iter().any(|m| m.name == entity.name))
            .map(|(name, _)| *name)
            .collect();
        prop_assert_eq!(homes.len(), 1);

        let matches_any_rule = entity.kind != EntityKind::Class
            || entity
                .bases
                .iter()
                .any(|b| UNREAL_PATTERNS.iter().any(|p| b.contains(p)));
        prop_assert_eq!(homes[0] == dialect.default_group, !matches_any_rule);
    }
    prop_assert!(groups.values().all(|members| !members.is_empty()));
    Ok(())
}

fn check_projection_fidelity(sources: &[String]) -> Result<(), TestCaseError> {
    let files = files_from(sources);
    let orchestrator = Orchestrator::new(ExtractConfig::new(Dialect::cpp()));
    let extraction = orchestrator.extract(&files);
    let ir = orchestrator.process(&files);

    prop_assert_eq!(ir.entity_count(), extraction.entities.len());
    for projected in ir.entities() {
        let original = extraction.entities.get(&projected.name);
        prop_assert!(original.is_some());
        let original = original.map(|e| (&e.name, &e.attributes, &e.methods));
        prop_assert_eq!(
            original,
            Some((&projected.name, &projected.attributes, &projected.methods))
        );
    }
    Ok(())
}

// ===================
// Proptest Wrappers
// ===================

proptest! {
    #[test]
    fn k_bases_yield_k_inheritance_edges(
        bases in base_names(),
        prefixes in prop::collection::vec(access_prefix(), 6),
    ) {
        check_one_edge_per_base(&bases, &prefixes)?;
    }

    #[test]
    fn repeated_member_types_yield_one_association(
        spellings in prop::collection::vec(weapon_member(), 1..6),
    ) {
        check_single_association(&spellings)?;
    }

    #[test]
    fn extraction_is_idempotent(sources in project_sources()) {
        check_idempotent(&sources)?;
    }

    #[test]
    fn every_entity_has_exactly_one_group(entities in unreal_entities()) {
        check_classification_total(entities)?;
    }

    #[test]
    fn projection_keeps_members(sources in project_sources()) {
        check_projection_fidelity(&sources)?;
    }
}
