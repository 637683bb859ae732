//! Projection of the resolved graph into the diagram IR

use std::collections::BTreeSet;
use tracing::{debug, span, Level};

use crate::core::{DiagramIr, Edge, EntitySet, Group, RelationKind, RelationSet};

use super::classifier::Classifier;

/// Arrow drawn for each relation kind
pub const ARROWS: &[(RelationKind, &str)] = &[
    (RelationKind::Extends, "--|>"),
    (RelationKind::Implements, "..|>"),
    (RelationKind::Association, "-->"),
];

pub fn arrow_for(kind: RelationKind) -> &'static str {
    ARROWS
        .iter()
        .find(|(k, _)| *k == kind)
        .map(|&(_, arrow)| arrow)
        .unwrap_or("-->")
}

/// Assembles groups, entities and displayable relations into a [`DiagramIr`]
#[derive(Debug, Clone, Default)]
pub struct DiagramModelBuilder {
    title: Option<String>,
}

impl DiagramModelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn build(
        &self,
        entities: &EntitySet,
        relations: &RelationSet,
        classifier: &Classifier,
    ) -> DiagramIr {
        let span = span!(Level::INFO, "build_model");
        let _enter = span.enter();

        let groups: Vec<Group> = classifier
            .group(entities)
            .into_iter()
            .map(|(name, members)| Group {
                name: name.to_string(),
                entities: members.into_iter().cloned().collect(),
            })
            .collect();

        let edges: Vec<Edge> = relations
            .displayable()
            .map(|relation| Edge {
                relation: relation.clone(),
                arrow: arrow_for(relation.kind),
            })
            .collect();

        let externals: BTreeSet<String> = edges
            .iter()
            .filter(|e| e.relation.external)
            .map(|e| e.relation.target.clone())
            .collect();

        debug!(
            groups = groups.len(),
            edges = edges.len(),
            externals = externals.len(),
            "Diagram model built"
        );

        DiagramIr {
            title: self.title.clone(),
            groups,
            relations: edges,
            externals: externals.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Attribute, Entity, EntityKind, Relation, Visibility};
    use crate::dialects::Dialect;

    #[test]
    fn test_arrow_table_is_distinct() {
        let arrows: BTreeSet<_> = ARROWS.iter().map(|(_, a)| *a).collect();
        assert_eq!(arrows.len(), ARROWS.len());
        assert_eq!(arrow_for(RelationKind::Implements), "..|>");
    }

    #[test]
    fn test_projection_keeps_members() {
        let mut hero = Entity::new("AHero", EntityKind::Class).with_bases(vec!["ACharacter".into()]);
        hero.add_attribute(Attribute::new("Health", "int", Visibility::Public));
        let set = EntitySet::from_entities(vec![hero.clone()]);

        let mut relations = RelationSet::new();
        relations.insert(Relation::new("AHero", "ACharacter", RelationKind::Extends).external(true));
        relations.insert(Relation::new("AHero", "UFoo", RelationKind::Association).external(true));

        let ir = DiagramModelBuilder::new()
            .with_title("Demo")
            .build(&set, &relations, &Classifier::for_dialect(&Dialect::unreal()));

        assert_eq!(ir.title.as_deref(), Some("Demo"));
        assert_eq!(ir.group_of("AHero"), Some("Characters"));
        let projected = ir.entities().next().unwrap();
        assert_eq!(projected.attributes, hero.attributes);
        assert_eq!(projected.methods, hero.methods);
        assert_eq!(ir.relations.len(), 1);
        assert_eq!(ir.relations[0].arrow, "--|>");
        assert_eq!(ir.externals, vec!["ACharacter"]);
    }

    #[test]
    fn test_empty_input() {
        let ir = DiagramModelBuilder::new().build(
            &EntitySet::default(),
            &RelationSet::new(),
            &Classifier::for_dialect(&Dialect::cpp()),
        );
        assert!(ir.is_empty());
        assert!(ir.groups.is_empty());
        assert!(ir.relations.is_empty());
    }
}
