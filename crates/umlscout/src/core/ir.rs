//! Diagram intermediate representation
//!
//! The IR is the only thing renderers see. It is built once per run by
//! [`crate::pipeline::DiagramModelBuilder`] and is not retained afterwards.

use serde::Serialize;

use super::model::{Entity, Relation};

/// A named presentation cluster
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Group {
    pub name: String,
    pub entities: Vec<Entity>,
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entities: Vec::new(),
        }
    }

    pub fn entity_names(&self) -> impl Iterator<Item = &str> {
        self.entities.iter().map(|e| e.name.as_str())
    }
}

/// A relation together with the arrow used to draw it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Edge {
    #[serde(flatten)]
    pub relation: Relation,
    pub arrow: &'static str,
}

/// Renderer-agnostic description of one class diagram
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DiagramIr {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub groups: Vec<Group>,
    pub relations: Vec<Edge>,
    /// Inheritance targets with no entity of their own, sorted
    pub externals: Vec<String>,
}

impl DiagramIr {
    /// Every entity, in group order
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.groups.iter().flat_map(|g| g.entities.iter())
    }

    pub fn entity_count(&self) -> usize {
        self.groups.iter().map(|g| g.entities.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entity_count() == 0
    }

    /// Name of the group an entity was placed in
    pub fn group_of(&self, entity: &str) -> Option<&str> {
        self.groups
            .iter()
            .find(|g| g.entity_names().any(|n| n == entity))
            .map(|g| g.name.as_str())
    }
}
