//! PlantUML class-diagram renderer
//!
//! Writes one `package` per group, entity members with visibility markers,
//! an `<<external>>` declaration per unresolved base and one line per edge.
//! An IR without entities still yields a complete `@startuml`/`@enduml`
//! document carrying a note, so the external renderer never sees an empty file.

use anyhow::Result;
use std::fmt::Write;
use tracing::{debug, span, Level};

use crate::core::delimiters::is_identifier;
use crate::core::{DiagramConfig, DiagramIr, Entity, EntityKind, Renderer, Theme};

/// Package colours for the dark theme: (group, background, border)
const DARK_PACKAGE_COLORS: &[(&str, &str, &str)] = &[
    ("Actors", "#193c7c", "#1e90ff"),
    ("Characters", "#ff8c00", "#ff6600"),
    ("Controllers", "#1f4e4e", "#00ced1"),
    ("GameModes", "#3c245c", "#a020f0"),
    ("Components", "#2c72a8", "#00bfff"),
    ("HUD", "#1d5e3b", "#00ff7f"),
    ("Helpers", "#484848", "#aaaaaa"),
    ("DataAssets", "#553300", "#ffaa00"),
    ("Persistence", "#006060", "#00cccc"),
    ("BlueprintLibraries", "#2e003e", "#b266ff"),
    ("Others", "#404040", "#999999"),
    ("MonoBehaviour", "#4e9fff", "#4e9fff"),
    ("ScriptableObject", "#b57bff", "#b57bff"),
    ("Component", "#6ee7b7", "#6ee7b7"),
    ("Other", "#ffb347", "#ffb347"),
];

const DARK_SKINPARAMS: &[(&str, &str)] = &[
    ("backgroundColor", "#1e1e1e"),
    ("TitleFontColor", "#ffffff"),
    ("ranksep", "1.3"),
    ("nodesep", "1.0"),
    ("linetype", "polyline"),
    ("ArrowThickness", "2"),
    ("ArrowFontColor", "#ffffff"),
    ("classBackgroundColor", "#3c3c3c"),
    ("classBorderColor", "#00bfff"),
    ("classFontColor", "#ffffff"),
    ("classAttributeFontColor", "#ffffff"),
    ("classMethodFontColor", "#ffffff"),
    ("classArrowColor", "#00bfff"),
    ("classAttributeIconSize", "0"),
    ("dpi", "150"),
];

const LIGHT_SKINPARAMS: &[(&str, &str)] = &[
    ("backgroundColor", "#ffffff"),
    ("classBackgroundColor", "#fefece"),
    ("classBorderColor", "#a80036"),
    ("classArrowColor", "#a80036"),
    ("classAttributeIconSize", "0"),
];

/// Renders a [`DiagramIr`] as PlantUML text
#[derive(Debug, Clone, Default)]
pub struct PlantUmlRenderer {
    config: DiagramConfig,
}

impl PlantUmlRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: DiagramConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &DiagramConfig {
        &self.config
    }

    fn write_theme(&self, out: &mut String, ir: &DiagramIr) -> std::fmt::Result {
        match self.config.theme {
            Theme::Plain => Ok(()),
            Theme::Light => write_skinparams(out, LIGHT_SKINPARAMS),
            Theme::Dark => {
                write_skinparams(out, DARK_SKINPARAMS)?;
                writeln!(out, "skinparam package {{")?;
                writeln!(out, "  BackgroundColor #2c2c2c")?;
                writeln!(out, "  BorderColor #00bfff")?;
                writeln!(out, "  FontColor #ffffff")?;
                for group in &ir.groups {
                    if let Some((_, background, border)) =
                        DARK_PACKAGE_COLORS.iter().find(|(name, _, _)| *name == group.name)
                    {
                        writeln!(out, "  BackgroundColor<<{}>> {}", group.name, background)?;
                        writeln!(out, "  BorderColor<<{}>> {}", group.name, border)?;
                    }
                }
                writeln!(out, "}}")
            }
        }
    }

    fn write_entity(&self, out: &mut String, entity: &Entity) -> std::fmt::Result {
        write!(out, "  {} {}", entity.kind.keyword(), quoted(&entity.name))?;
        if let Some(annotation) = &entity.annotation {
            write!(out, " <<{}>>", annotation)?;
        }

        let has_body = !entity.attributes.is_empty()
            || !entity.methods.is_empty()
            || !entity.enum_values.is_empty();
        if !has_body {
            return writeln!(out, " {{\n  }}");
        }

        writeln!(out, " {{")?;
        if entity.kind == EntityKind::Enum {
            for value in &entity.enum_values {
                writeln!(out, "    {}", value)?;
            }
        }
        for attribute in &entity.attributes {
            write!(out, "    {}{}", attribute.visibility.to_char(), attribute.name)?;
            if !attribute.declared_type.is_empty() {
                write!(out, " : {}", attribute.declared_type)?;
            }
            writeln!(out)?;
        }
        for method in &entity.methods {
            write!(
                out,
                "    {}{}({})",
                method.visibility.to_char(),
                method.name,
                method.parameters
            )?;
            if !method.return_type.is_empty() {
                write!(out, " : {}", method.return_type)?;
            }
            writeln!(out)?;
        }
        writeln!(out, "  }}")
    }

    fn write_document(&self, out: &mut String, ir: &DiagramIr) -> std::fmt::Result {
        writeln!(out, "@startuml")?;
        writeln!(out, "{}", self.config.direction)?;
        self.write_theme(out, ir)?;
        if let Some(title) = &ir.title {
            writeln!(out, "title {}", title)?;
        }

        if ir.is_empty() {
            writeln!(out, "note \"No entities found\" as N1")?;
            return writeln!(out, "@enduml");
        }

        for group in ir.groups.iter().filter(|g| !g.entities.is_empty()) {
            writeln!(out)?;
            writeln!(out, "package \"{0}\" <<{0}>> {{", group.name)?;
            for entity in &group.entities {
                self.write_entity(out, entity)?;
            }
            writeln!(out, "}}")?;
        }

        if self.config.show_externals && !ir.externals.is_empty() {
            writeln!(out)?;
            for external in &ir.externals {
                writeln!(out, "class {} <<external>>", quoted(external))?;
            }
        }

        if !ir.relations.is_empty() {
            writeln!(out)?;
            for edge in &ir.relations {
                let relation = &edge.relation;
                if relation.external && !self.config.show_externals {
                    continue;
                }
                writeln!(
                    out,
                    "{} {} {} : {}",
                    quoted(&relation.source),
                    edge.arrow,
                    quoted(&relation.target),
                    relation.label
                )?;
            }
        }

        writeln!(out, "@enduml")
    }
}

impl Renderer for PlantUmlRenderer {
    type Output = String;

    fn render(&self, ir: &DiagramIr) -> Result<String> {
        let span = span!(Level::INFO, "render_plantuml", entities = ir.entity_count());
        let _enter = span.enter();

        let mut out = String::new();
        self.write_document(&mut out, ir)?;

        debug!(bytes = out.len(), theme = %self.config.theme, "PlantUML rendered");
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "plantuml"
    }

    fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    fn format(&self) -> &'static str {
        "puml"
    }
}

fn write_skinparams(out: &mut String, params: &[(&str, &str)]) -> std::fmt::Result {
    for (key, value) in params {
        writeln!(out, "skinparam {} {}", key, value)?;
    }
    Ok(())
}

/// Names PlantUML cannot take bare (`ns::Base`, `TArray<int>`, non-ASCII) are quoted
fn quoted(name: &str) -> String {
    if name.is_ascii() && is_identifier(name) {
        name.to_string()
    } else {
        format!("\"{}\"", name)
    }
}
