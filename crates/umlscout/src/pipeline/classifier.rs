//! Rule-table classification into presentation groups
//!
//! The table is data: an ordered list of predicate/group pairs, tested in
//! order against an entity. First match wins; otherwise the entity lands in
//! the catch-all group.

use indexmap::IndexMap;
use tracing::{debug, span, trace, Level};

use crate::core::{Entity, EntityKind, EntitySet};
use crate::dialects::Dialect;

/// What a rule tests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predicate {
    /// The entity has this kind
    Kind(EntityKind),
    /// Any base name contains this substring
    BaseContains(&'static str),
}

/// One row of a classification table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    pub predicate: Predicate,
    pub group: &'static str,
}

impl Rule {
    pub const fn kind(kind: EntityKind, group: &'static str) -> Self {
        Self {
            predicate: Predicate::Kind(kind),
            group,
        }
    }

    pub const fn base(pattern: &'static str, group: &'static str) -> Self {
        Self {
            predicate: Predicate::BaseContains(pattern),
            group,
        }
    }

    pub fn matches(&self, entity: &Entity) -> bool {
        match self.predicate {
            Predicate::Kind(kind) => entity.kind == kind,
            Predicate::BaseContains(pattern) => entity.bases.iter().any(|b| b.contains(pattern)),
        }
    }
}

/// Ordered rule table plus catch-all group
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: Vec<Rule>,
    default_group: &'static str,
}

impl Classifier {
    pub fn new(rules: Vec<Rule>, default_group: &'static str) -> Self {
        Self {
            rules,
            default_group,
        }
    }

    /// Classifier using a dialect's built-in table
    pub fn for_dialect(dialect: &Dialect) -> Self {
        Self::new(dialect.rules.to_vec(), dialect.default_group)
    }

    /// Add a rule that is tested before every existing rule
    pub fn with_priority_rule(mut self, rule: Rule) -> Self {
        self.rules.insert(0, rule);
        self
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn default_group(&self) -> &'static str {
        self.default_group
    }

    /// Group name for one entity
    pub fn classify(&self, entity: &Entity) -> &'static str {
        match self.rules.iter().find(|rule| rule.matches(entity)) {
            Some(rule) => {
                trace!(entity = %entity.name, group = rule.group, rule = ?rule.predicate, "Rule matched");
                rule.group
            }
            None => {
                trace!(entity = %entity.name, group = self.default_group, "No rule matched");
                self.default_group
            }
        }
    }

    /// Assign every entity to exactly one group
    ///
    /// Groups come out in table order with the catch-all last, and only
    /// groups with at least one member are present. Entity order inside a
    /// group follows the entity set.
    pub fn group<'a>(&self, entities: &'a EntitySet) -> IndexMap<&'static str, Vec<&'a Entity>> {
        let span = span!(Level::INFO, "classify", entities = entities.len());
        let _enter = span.enter();

        let mut groups: IndexMap<&'static str, Vec<&'a Entity>> = IndexMap::new();
        for rule in &self.rules {
            groups.entry(rule.group).or_default();
        }
        groups.entry(self.default_group).or_default();
        // A rule may name the catch-all group; it still belongs last
        if let Some(idx) = groups.get_index_of(self.default_group) {
            let last = groups.len() - 1;
            groups.move_index(idx, last);
        }

        for entity in entities.entities() {
            let group = self.classify(entity);
            groups.entry(group).or_default().push(entity);
        }

        groups.retain(|_, members| !members.is_empty());
        debug!(groups = groups.len(), "Classification completed");
        groups
    }
}
