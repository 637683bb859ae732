//! Core type definitions for class-model extraction
//!
//! This module contains the small enums shared by every stage of the
//! pipeline: entity kinds, member visibility, relation kinds and the
//! presentation options used by the diagram renderers.

use serde::Serialize;
use std::fmt;

/// Kind of a discovered type declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Class,
    Struct,
    Interface,
    Enum,
}

impl EntityKind {
    /// Visibility a member gets before any section marker is seen
    ///
    /// Class-like declarations start private, struct and interface-like
    /// declarations start public.
    pub fn default_visibility(&self) -> Visibility {
        match self {
            EntityKind::Class => Visibility::Private,
            EntityKind::Struct | EntityKind::Interface | EntityKind::Enum => Visibility::Public,
        }
    }

    /// PlantUML keyword used to declare this kind
    pub fn keyword(&self) -> &'static str {
        match self {
            EntityKind::Class => "class",
            EntityKind::Struct => "struct",
            EntityKind::Interface => "interface",
            EntityKind::Enum => "enum",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Class => write!(f, "Class"),
            EntityKind::Struct => write!(f, "Struct"),
            EntityKind::Interface => write!(f, "Interface"),
            EntityKind::Enum => write!(f, "Enum"),
        }
    }
}

/// Visibility of a member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,    // +
    Protected, // #
    Private,   // -
}

impl Visibility {
    /// Parse a visibility keyword (`public`, `protected`, `private`)
    ///
    /// `internal` maps to public: it is visible to everything the diagram covers.
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "public" | "internal" => Some(Visibility::Public),
            "protected" => Some(Visibility::Protected),
            "private" => Some(Visibility::Private),
            _ => None,
        }
    }

    pub fn to_char(self) -> char {
        match self {
            Visibility::Public => '+',
            Visibility::Protected => '#',
            Visibility::Private => '-',
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visibility::Public => write!(f, "public"),
            Visibility::Protected => write!(f, "protected"),
            Visibility::Private => write!(f, "private"),
        }
    }
}

/// Kind of a relation between two entities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationKind {
    Extends,
    Implements,
    Association,
}

impl RelationKind {
    /// Display label attached to relations of this kind
    pub fn label(&self) -> &'static str {
        match self {
            RelationKind::Extends => "inherits",
            RelationKind::Implements => "implements",
            RelationKind::Association => "uses",
        }
    }

    /// Whether this is an inheritance edge (kept even for external targets)
    pub fn is_inheritance(&self) -> bool {
        matches!(self, RelationKind::Extends | RelationKind::Implements)
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelationKind::Extends => write!(f, "extends"),
            RelationKind::Implements => write!(f, "implements"),
            RelationKind::Association => write!(f, "association"),
        }
    }
}

/// Layout direction hint for the diagram renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    #[default]
    LeftToRight,
    TopToBottom,
}

impl Direction {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "lr" | "left-to-right" => Some(Direction::LeftToRight),
            "tb" | "td" | "top-to-bottom" => Some(Direction::TopToBottom),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::LeftToRight => write!(f, "left to right direction"),
            Direction::TopToBottom => write!(f, "top to bottom direction"),
        }
    }
}

/// Colour theme for the textual diagram
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Dark background with light text and blue borders
    #[default]
    Dark,
    /// Light background, renderer defaults for everything else
    Light,
    /// No skinparam block at all
    Plain,
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Dark => write!(f, "dark"),
            Theme::Light => write!(f, "light"),
            Theme::Plain => write!(f, "plain"),
        }
    }
}

/// Presentation options for diagram output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DiagramConfig {
    pub direction: Direction,
    pub theme: Theme,
    /// Emit a declaration for every external base class
    pub show_externals: bool,
}

impl DiagramConfig {
    pub fn new(direction: Direction, theme: Theme) -> Self {
        Self {
            direction,
            theme,
            show_externals: true,
        }
    }

    pub fn with_externals(mut self, show: bool) -> Self {
        self.show_externals = show;
        self
    }
}

impl Default for DiagramConfig {
    fn default() -> Self {
        Self::new(Direction::default(), Theme::default())
    }
}
