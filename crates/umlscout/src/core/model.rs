//! Object model produced by the extraction pipeline
//!
//! Entities are built once per declaration during the per-file phase and
//! are not mutated after they enter an [`EntitySet`]. Relations live in a
//! separate [`RelationSet`] computed from the finished entity set.

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use tracing::debug;

use super::types::{EntityKind, RelationKind, Visibility};

/// A data member of an entity
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Attribute {
    pub name: String,
    pub declared_type: String,
    pub visibility: Visibility,
}

impl Attribute {
    pub fn new(
        name: impl Into<String>,
        declared_type: impl Into<String>,
        visibility: Visibility,
    ) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
            visibility,
        }
    }
}

/// A member function of an entity
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Method {
    pub name: String,
    pub return_type: String,
    /// Raw parameter list, whitespace-collapsed
    pub parameters: String,
    pub visibility: Visibility,
}

impl Method {
    pub fn new(
        name: impl Into<String>,
        return_type: impl Into<String>,
        parameters: impl Into<String>,
        visibility: Visibility,
    ) -> Self {
        Self {
            name: name.into(),
            return_type: return_type.into(),
            parameters: parameters.into(),
            visibility,
        }
    }
}

/// A discovered type declaration
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub name: String,
    pub kind: EntityKind,
    pub bases: Vec<String>,
    pub attributes: Vec<Attribute>,
    pub methods: Vec<Method>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<String>,
    /// Annotation keyword that preceded the declaration, e.g. `UCLASS`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation: Option<String>,
    /// File the declaration was found in
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
}

impl Entity {
    pub fn new(name: impl Into<String>, kind: EntityKind) -> Self {
        Self {
            name: name.into(),
            kind,
            bases: Vec::new(),
            attributes: Vec::new(),
            methods: Vec::new(),
            enum_values: Vec::new(),
            annotation: None,
            source: None,
        }
    }

    pub fn with_bases(mut self, bases: Vec<String>) -> Self {
        self.bases = bases;
        self
    }

    pub fn with_annotation(mut self, annotation: impl Into<String>) -> Self {
        self.annotation = Some(annotation.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Add an attribute unless an identical one is already present
    pub fn add_attribute(&mut self, attribute: Attribute) {
        if !self.attributes.contains(&attribute) {
            self.attributes.push(attribute);
        }
    }

    /// Add a method unless an identical one is already present
    pub fn add_method(&mut self, method: Method) {
        if !self.methods.contains(&method) {
            self.methods.push(method);
        }
    }

    pub fn add_enum_value(&mut self, value: impl Into<String>) {
        let value = value.into();
        if !self.enum_values.contains(&value) {
            self.enum_values.push(value);
        }
    }

    /// Whether two declarations describe the same type
    ///
    /// Ignores the source file, so the same header scanned twice compares equal.
    pub fn same_declaration(&self, other: &Entity) -> bool {
        self.name == other.name
            && self.kind == other.kind
            && self.bases == other.bases
            && self.attributes == other.attributes
            && self.methods == other.methods
            && self.enum_values == other.enum_values
    }
}

/// A directed edge between two entity names
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Relation {
    pub source: String,
    pub target: String,
    pub kind: RelationKind,
    pub label: String,
    /// Target has no corresponding entity in the set
    pub external: bool,
}

impl Relation {
    pub fn new(source: impl Into<String>, target: impl Into<String>, kind: RelationKind) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            kind,
            label: kind.label().to_string(),
            external: false,
        }
    }

    pub fn external(mut self, external: bool) -> Self {
        self.external = external;
        self
    }
}

/// The immutable, project-wide set of entities
///
/// Names are unique: identical duplicate declarations are merged and
/// differing declarations with the same name get a stable `_2`, `_3`, ...
/// suffix in input order.
#[derive(Debug, Clone, Default)]
pub struct EntitySet {
    entities: Vec<Entity>,
    index: HashMap<String, usize>,
}

impl EntitySet {
    /// Merge entities from all files into one set
    pub fn from_entities(entities: impl IntoIterator<Item = Entity>) -> Self {
        let mut set = EntitySet::default();
        // Original name -> indices of entities declared under that name
        let mut by_declared_name: HashMap<String, Vec<usize>> = HashMap::new();

        for mut entity in entities {
            let declared_name = entity.name.clone();
            let previous = by_declared_name.entry(declared_name.clone()).or_default();

            let duplicate = previous.iter().any(|&idx| {
                let existing = &set.entities[idx];
                let mut renamed = entity.clone();
                renamed.name = existing.name.clone();
                existing.same_declaration(&renamed)
            });
            if duplicate {
                debug!(entity = %declared_name, "Merged identical declaration");
                continue;
            }

            if set.index.contains_key(&entity.name) {
                let mut suffix = 2;
                let mut candidate = format!("{}_{}", declared_name, suffix);
                while set.index.contains_key(&candidate) {
                    suffix += 1;
                    candidate = format!("{}_{}", declared_name, suffix);
                }
                debug!(entity = %declared_name, renamed = %candidate, "Disambiguated colliding name");
                entity.name = candidate;
            }

            let idx = set.entities.len();
            set.index.insert(entity.name.clone(), idx);
            previous.push(idx);
            set.entities.push(entity);
        }

        set
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn get(&self, name: &str) -> Option<&Entity> {
        self.index.get(name).map(|&idx| &self.entities[idx])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entities.iter().map(|e| e.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

/// Deduplicated relations in discovery order
#[derive(Debug, Clone, Default)]
pub struct RelationSet {
    relations: Vec<Relation>,
    seen: HashSet<(String, String, RelationKind)>,
}

impl RelationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a relation; returns false if its `(source, target, kind)` was already present
    pub fn insert(&mut self, relation: Relation) -> bool {
        let key = (
            relation.source.clone(),
            relation.target.clone(),
            relation.kind,
        );
        if !self.seen.insert(key) {
            return false;
        }
        self.relations.push(relation);
        true
    }

    pub fn relations(&self) -> &[Relation] {
        &self.relations
    }

    /// Relations that belong in a rendered diagram
    ///
    /// Inheritance edges to external references are kept, association edges are not.
    pub fn displayable(&self) -> impl Iterator<Item = &Relation> {
        self.relations
            .iter()
            .filter(|r| r.kind.is_inheritance() || !r.external)
    }

    pub fn from_source<'a>(&'a self, source: &'a str) -> impl Iterator<Item = &'a Relation> {
        self.relations.iter().filter(move |r| r.source == source)
    }

    pub fn len(&self) -> usize {
        self.relations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }
}

impl PartialEq for RelationSet {
    /// Set equality, ignoring discovery order
    fn eq(&self, other: &Self) -> bool {
        self.seen == other.seen
    }
}

impl Eq for RelationSet {}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(name: &str) -> Entity {
        let mut entity = Entity::new(name, EntityKind::Class).with_bases(vec!["AActor".into()]);
        entity.add_attribute(Attribute::new("Health", "int", Visibility::Public));
        entity
    }

    #[test]
    fn test_relation_label_follows_kind() {
        let labels: Vec<_> = [
            RelationKind::Extends,
            RelationKind::Implements,
            RelationKind::Association,
        ]
        .into_iter()
        .map(|kind| Relation::new("AChest", "AActor", kind).label)
        .collect();
        assert_eq!(labels, vec!["inherits", "implements", "uses"]);
        assert!(!Relation::new("AChest", "AActor", RelationKind::Extends).external);
    }

    #[test]
    fn test_add_members_deduplicates() {
        let mut entity = Entity::new("AMyActor", EntityKind::Class);
        entity.add_attribute(Attribute::new("Health", "int", Visibility::Public));
        entity.add_attribute(Attribute::new("Health", "int", Visibility::Public));
        entity.add_method(Method::new("Tick", "void", "float Dt", Visibility::Public));
        entity.add_method(Method::new("Tick", "void", "float Dt", Visibility::Public));
        entity.add_method(Method::new("Tick", "void", "", Visibility::Public));

        assert_eq!(entity.attributes.len(), 1);
        assert_eq!(entity.methods.len(), 2);
    }

    #[test]
    fn test_identical_declarations_merge() {
        let set = EntitySet::from_entities(vec![
            actor("AMyActor").with_source("A.h"),
            actor("AMyActor").with_source("B.h"),
        ]);
        assert_eq!(set.len(), 1);
        assert_eq!(set.entities()[0].attributes.len(), 1);
    }

    #[test]
    fn test_colliding_names_are_suffixed() {
        let other = Entity::new("AMyActor", EntityKind::Struct);
        let set = EntitySet::from_entities(vec![actor("AMyActor"), other.clone(), other]);

        let names: Vec<_> = set.names().collect();
        assert_eq!(names, vec!["AMyActor", "AMyActor_2"]);
        assert_eq!(set.get("AMyActor_2").unwrap().kind, EntityKind::Struct);
    }

    #[test]
    fn test_suffix_skips_taken_names() {
        let set = EntitySet::from_entities(vec![
            Entity::new("Foo", EntityKind::Class),
            Entity::new("Foo_2", EntityKind::Class),
            Entity::new("Foo", EntityKind::Enum),
        ]);
        let names: Vec<_> = set.names().collect();
        assert_eq!(names, vec!["Foo", "Foo_2", "Foo_3"]);
    }

    #[test]
    fn test_relation_set_deduplicates_by_triple() {
        let mut relations = RelationSet::new();
        assert!(relations.insert(Relation::new("A", "B", RelationKind::Extends)));
        assert!(!relations.insert(Relation::new("A", "B", RelationKind::Extends)));
        assert!(relations.insert(Relation::new("A", "B", RelationKind::Association)));
        assert_eq!(relations.len(), 2);
    }

    #[test]
    fn test_displayable_drops_external_associations() {
        let mut relations = RelationSet::new();
        relations.insert(Relation::new("A", "Base", RelationKind::Extends).external(true));
        relations.insert(Relation::new("A", "Foo", RelationKind::Association).external(true));
        relations.insert(Relation::new("A", "B", RelationKind::Association));

        let shown: Vec<_> = relations.displayable().map(|r| r.target.as_str()).collect();
        assert_eq!(shown, vec!["Base", "B"]);
    }

    #[test]
    fn test_relation_set_equality_ignores_order() {
        let mut first = RelationSet::new();
        first.insert(Relation::new("A", "B", RelationKind::Extends));
        first.insert(Relation::new("A", "C", RelationKind::Association));

        let mut second = RelationSet::new();
        second.insert(Relation::new("A", "C", RelationKind::Association));
        second.insert(Relation::new("A", "B", RelationKind::Extends));

        assert_eq!(first, second);
    }
}
