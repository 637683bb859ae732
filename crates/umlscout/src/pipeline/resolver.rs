//! Project-wide relationship inference
//!
//! Runs once, after every file has been scanned, over the finished
//! [`EntitySet`]. It reads nothing else and mutates nothing.

use tracing::{debug, info, span, trace, Level};

use crate::core::delimiters::identifiers;
use crate::core::{Entity, EntityKind, EntitySet, Relation, RelationKind, RelationSet};
use crate::dialects::Dialect;

/// Infers inheritance and association edges
pub struct RelationshipResolver<'d> {
    dialect: &'d Dialect,
}

impl<'d> RelationshipResolver<'d> {
    pub fn new(dialect: &'d Dialect) -> Self {
        Self { dialect }
    }

    pub fn resolve(&self, entities: &EntitySet) -> RelationSet {
        let span = span!(Level::INFO, "resolve", entities = entities.len());
        let _enter = span.enter();

        let mut relations = RelationSet::new();
        for entity in entities.entities() {
            self.inheritance(entity, entities, &mut relations);
            self.associations(entity, entities, &mut relations);
        }

        let external = relations.relations().iter().filter(|r| r.external).count();
        info!(
            relations = relations.len(),
            external, "Relationship resolution completed"
        );
        relations
    }

    fn inheritance(&self, entity: &Entity, entities: &EntitySet, relations: &mut RelationSet) {
        for base in &entity.bases {
            let target = entities.get(base);
            let kind = if self.is_implementation(entity, base, target) {
                RelationKind::Implements
            } else {
                RelationKind::Extends
            };
            let relation = Relation::new(&entity.name, base, kind).external(target.is_none());
            if relations.insert(relation) {
                trace!(source = %entity.name, target = %base, kind = %kind, "Inheritance");
            }
        }
    }

    /// Whether `entity : base` realizes an interface rather than extending a class
    fn is_implementation(&self, entity: &Entity, base: &str, target: Option<&Entity>) -> bool {
        if entity.kind == EntityKind::Interface {
            return false;
        }
        match target {
            Some(target) => target.kind == EntityKind::Interface,
            None => self.dialect.looks_like_interface(base),
        }
    }

    fn associations(&self, entity: &Entity, entities: &EntitySet, relations: &mut RelationSet) {
        let attribute_types = entity.attributes.iter().map(|a| a.declared_type.as_str());
        let parameter_lists = entity.methods.iter().map(|m| m.parameters.as_str());

        for text in attribute_types.chain(parameter_lists) {
            for (_, token) in identifiers(text) {
                if token == entity.name || !entities.contains(token) {
                    continue;
                }
                let relation = Relation::new(&entity.name, token, RelationKind::Association);
                if relations.insert(relation) {
                    debug!(source = %entity.name, target = token, "Association");
                }
            }
        }
    }
}

/// Resolve relations for a dialect in one call
pub fn resolve(entities: &EntitySet, dialect: &Dialect) -> RelationSet {
    RelationshipResolver::new(dialect).resolve(entities)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Attribute, Method, Visibility};

    fn class(name: &str, bases: &[&str]) -> Entity {
        Entity::new(name, EntityKind::Class).with_bases(bases.iter().map(|b| b.to_string()).collect())
    }

    fn kinds(relations: &RelationSet) -> Vec<(&str, &str, RelationKind, bool)> {
        relations
            .relations()
            .iter()
            .map(|r| (r.source.as_str(), r.target.as_str(), r.kind, r.external))
            .collect()
    }

    #[test]
    fn test_one_inheritance_edge_per_base() {
        let set = EntitySet::from_entities(vec![
            class("AHero", &["ACharacter", "UObject"]),
            class("ACharacter", &[]),
        ]);
        let relations = resolve(&set, &Dialect::cpp());
        assert_eq!(
            kinds(&relations),
            vec![
                ("AHero", "ACharacter", RelationKind::Extends, false),
                ("AHero", "UObject", RelationKind::Extends, true),
            ]
        );
    }

    #[test]
    fn test_implements_for_known_interfaces() {
        let set = EntitySet::from_entities(vec![
            class("AChest", &["AActor", "Lootable"]),
            Entity::new("Lootable", EntityKind::Interface),
        ]);
        let relations = resolve(&set, &Dialect::cpp());
        assert_eq!(relations.relations()[1].kind, RelationKind::Implements);
        assert_eq!(relations.relations()[1].label, "implements");
    }

    #[test]
    fn test_implements_by_naming_convention() {
        let set = EntitySet::from_entities(vec![class("AChest", &["AActor", "IInteractable"])]);

        let unreal = resolve(&set, &Dialect::unreal());
        assert_eq!(unreal.relations()[1].kind, RelationKind::Implements);
        assert!(unreal.relations()[1].external);

        let cpp = resolve(&set, &Dialect::cpp());
        assert_eq!(cpp.relations()[1].kind, RelationKind::Extends);
    }

    #[test]
    fn test_interface_extending_interface_is_extends() {
        let set = EntitySet::from_entities(vec![
            Entity::new("IUsable", EntityKind::Interface).with_bases(vec!["IInteractable".into()]),
            Entity::new("IInteractable", EntityKind::Interface),
        ]);
        let relations = resolve(&set, &Dialect::csharp());
        assert_eq!(relations.relations()[0].kind, RelationKind::Extends);
    }

    #[test]
    fn test_associations_deduplicated() {
        let mut player = class("Player", &[]);
        player.add_attribute(Attribute::new("Primary", "Weapon", Visibility::Private));
        player.add_attribute(Attribute::new("Secondary", "Weapon", Visibility::Private));
        player.add_method(Method::new("Equip", "void", "Weapon* NewWeapon, int Slot", Visibility::Public));
        player.add_attribute(Attribute::new("Self", "Player", Visibility::Private));

        let set = EntitySet::from_entities(vec![player, class("Weapon", &[])]);
        let relations = resolve(&set, &Dialect::cpp());
        assert_eq!(
            kinds(&relations),
            vec![("Player", "Weapon", RelationKind::Association, false)]
        );
    }

    #[test]
    fn test_unknown_association_targets_dropped() {
        let mut holder = class("B", &[]);
        holder.add_attribute(Attribute::new("Value", "Foo", Visibility::Public));
        let set = EntitySet::from_entities(vec![holder, class("A", &["Foo"])]);

        let relations = resolve(&set, &Dialect::cpp());
        assert!(relations.from_source("B").next().is_none());
        let inherits: Vec<_> = relations.from_source("A").collect();
        assert_eq!(inherits.len(), 1);
        assert!(inherits[0].external);
    }

    #[test]
    fn test_resolution_is_repeatable() {
        let mut player = class("Player", &["Pawn"]);
        player.add_attribute(Attribute::new("Gun", "Weapon", Visibility::Private));
        let set = EntitySet::from_entities(vec![player, class("Weapon", &[]), class("Pawn", &[])]);
        assert_eq!(resolve(&set, &Dialect::cpp()), resolve(&set, &Dialect::cpp()));
    }
}
