//! Command-line interface for the umlscout utility
//!
//! Walks a project directory, runs the extraction pipeline and writes the
//! PlantUML and JSON descriptions next to it.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use umlscout::core::logging::init_logging;
use umlscout::dialects::{detect_dialect, Dialect, DialectId};
use umlscout::output::{JsonRenderer, PlantUmlRenderer};
use umlscout::pipeline::{sample_text, ExtractConfig, Orchestrator, SourceFile};
use umlscout::project::ProjectRoot;
use umlscout::{DiagramConfig, Direction, Renderer, Theme};

/// Bytes of source text read when guessing the dialect
const DETECTION_SAMPLE_BYTES: usize = 64 * 1024;

/// umlscout - Turn C++, Unreal and C# sources into UML class diagrams
#[derive(Parser)]
#[command(name = "umlscout")]
#[command(about = "Extract a class model from a source tree and write PlantUML and JSON diagrams")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Set log level (trace|debug|info|warn|error)
    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,

    /// Set log format (compact|pretty|json)
    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

/// Log level options
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Log format options
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Compact => "compact",
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract the class model and write <name>.puml and <name>.json
    Generate {
        /// Project root directory
        #[arg(short, long)]
        project: PathBuf,

        /// Source dialect
        #[arg(short, long, value_enum, default_value_t = DialectChoice::Auto)]
        dialect: DialectChoice,

        /// Directory for the output files (defaults to the project root)
        #[arg(short, long)]
        out_dir: Option<PathBuf>,

        /// Output file stem (defaults to the project directory name)
        #[arg(short, long)]
        name: Option<String>,

        /// Diagram title (defaults to one derived from the project)
        #[arg(long)]
        title: Option<String>,

        /// Layout direction
        #[arg(long, value_enum, default_value_t = DirectionChoice::Lr)]
        direction: DirectionChoice,

        /// Colour theme
        #[arg(long, value_enum, default_value_t = ThemeChoice::Dark)]
        theme: ThemeChoice,

        /// Do not declare external base classes
        #[arg(long)]
        no_externals: bool,

        /// Print the PlantUML text instead of writing files
        #[arg(long)]
        stdout: bool,

        /// Drop bytes that are not valid UTF-8 instead of skipping the file
        #[arg(long)]
        lossy: bool,
    },

    /// Guess the dialect of a project
    Detect {
        /// Project root directory
        #[arg(short, long)]
        project: PathBuf,
    },

    /// Show supported dialects
    Dialects {
        /// Show in JSON format
        #[arg(long)]
        json: bool,
    },
}

/// Dialect selection, `auto` samples the sources
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq, Default)]
pub enum DialectChoice {
    #[default]
    Auto,
    Cpp,
    Unreal,
    Csharp,
}

impl DialectChoice {
    fn fixed(self) -> Option<DialectId> {
        match self {
            DialectChoice::Auto => None,
            DialectChoice::Cpp => Some(DialectId::Cpp),
            DialectChoice::Unreal => Some(DialectId::Unreal),
            DialectChoice::Csharp => Some(DialectId::CSharp),
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq, Default)]
pub enum DirectionChoice {
    /// Left to right
    #[default]
    Lr,
    /// Top to bottom
    Tb,
}

impl From<DirectionChoice> for Direction {
    fn from(value: DirectionChoice) -> Self {
        match value {
            DirectionChoice::Lr => Direction::LeftToRight,
            DirectionChoice::Tb => Direction::TopToBottom,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq, Default)]
pub enum ThemeChoice {
    #[default]
    Dark,
    Light,
    Plain,
}

impl From<ThemeChoice> for Theme {
    fn from(value: ThemeChoice) -> Self {
        match value {
            ThemeChoice::Dark => Theme::Dark,
            ThemeChoice::Light => Theme::Light,
            ThemeChoice::Plain => Theme::Plain,
        }
    }
}

/// Options of one `generate` run
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub project: PathBuf,
    pub dialect: DialectChoice,
    pub out_dir: Option<PathBuf>,
    pub name: Option<String>,
    pub title: Option<String>,
    pub diagram: DiagramConfig,
    pub stdout: bool,
    pub lossy: bool,
}

/// Files written by `generate`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFiles {
    pub plantuml: PathBuf,
    pub json: PathBuf,
}

/// Main CLI application
#[derive(Debug, Default)]
pub struct UmlScoutApp {
    verbose: bool,
}

impl UmlScoutApp {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the application with the given CLI arguments
    pub fn run(&mut self, cli: Cli) -> Result<()> {
        // Environment variables take precedence over flags
        let log_level_str = std::env::var("UMLSCOUT_LOG_LEVEL")
            .ok()
            .or_else(|| std::env::var("RUST_LOG").ok())
            .or_else(|| {
                let level = if cli.verbose && cli.log_level == LogLevel::Warn {
                    LogLevel::Info
                } else {
                    cli.log_level
                };
                Some(level.as_str().to_string())
            });

        let log_format_str = std::env::var("UMLSCOUT_LOG_FORMAT")
            .ok()
            .or_else(|| Some(cli.log_format.as_str().to_string()));

        if let Err(e) = init_logging(log_level_str.as_deref(), log_format_str.as_deref()) {
            eprintln!("Warning: Failed to initialize logging: {}", e);
        }

        self.verbose = cli.verbose;
        if self.verbose {
            eprintln!("umlscout v{}", env!("CARGO_PKG_VERSION"));
        }

        match cli.command {
            Commands::Generate {
                project,
                dialect,
                out_dir,
                name,
                title,
                direction,
                theme,
                no_externals,
                stdout,
                lossy,
            } => {
                let options = GenerateOptions {
                    project,
                    dialect,
                    out_dir,
                    name,
                    title,
                    diagram: DiagramConfig::new(direction.into(), theme.into())
                        .with_externals(!no_externals),
                    stdout,
                    lossy,
                };
                self.generate_command(&options).map(|_| ())
            }
            Commands::Detect { project } => self.detect_command(&project),
            Commands::Dialects { json } => self.dialects_command(json),
        }
    }

    /// Handle the generate command
    ///
    /// Returns the written files, or `None` when printing to stdout.
    pub fn generate_command(&self, options: &GenerateOptions) -> Result<Option<GeneratedFiles>> {
        let dialect = self.resolve_dialect(&options.project, options.dialect)?;
        let root = ProjectRoot::open(&options.project, &dialect)?;

        let files = collect_sources(&root.source_dir(), &dialect);
        if self.verbose {
            eprintln!(
                "Scanning {} {} files under {}",
                files.len(),
                dialect.label,
                root.source_dir().display()
            );
        }
        if files.is_empty() {
            warn!(root = %root.path().display(), dialect = %dialect.id, "No source files found");
        }

        let title = options.title.clone().unwrap_or_else(|| root.title());
        let orchestrator = Orchestrator::new(
            ExtractConfig::new(dialect)
                .with_title(title)
                .with_lossy_decoding(options.lossy),
        );
        let ir = orchestrator.process(&files);

        let plantuml = PlantUmlRenderer::new()
            .with_config(options.diagram)
            .render(&ir)?;

        if options.stdout {
            print!("{}", plantuml);
            io::stdout().flush()?;
            return Ok(None);
        }

        let json = JsonRenderer::new().render(&ir)?;
        let stem = options.name.clone().unwrap_or_else(|| default_stem(root.path()));
        let out_dir = options
            .out_dir
            .clone()
            .unwrap_or_else(|| root.path().to_path_buf());
        fs::create_dir_all(&out_dir)
            .with_context(|| format!("Failed to create output directory '{}'", out_dir.display()))?;

        let written = GeneratedFiles {
            plantuml: out_dir.join(format!("{}.puml", stem)),
            json: out_dir.join(format!("{}.json", stem)),
        };
        write_file(&written.plantuml, &plantuml)?;
        write_file(&written.json, &json)?;

        info!(
            plantuml = %written.plantuml.display(),
            json = %written.json.display(),
            entities = ir.entity_count(),
            "Diagram written"
        );
        if self.verbose {
            eprintln!(
                "Wrote {} entities to {} and {}",
                ir.entity_count(),
                written.plantuml.display(),
                written.json.display()
            );
        }
        Ok(Some(written))
    }

    /// Handle the detect command
    fn detect_command(&self, project: &Path) -> Result<()> {
        let dialect = self.resolve_dialect(project, DialectChoice::Auto)?;
        println!("{}", dialect.id);
        Ok(())
    }

    /// Handle the dialects command
    fn dialects_command(&self, json: bool) -> Result<()> {
        let dialects = Dialect::all();

        if json {
            let entries: Vec<_> = dialects
                .iter()
                .map(|d| {
                    serde_json::json!({
                        "name": d.id,
                        "label": d.label,
                        "extensions": d.extensions,
                        "required_marker": d.required_marker,
                    })
                })
                .collect();
            let listing = serde_json::json!({
                "supported_dialects": entries,
                "total": dialects.len(),
            });
            println!("{}", serde_json::to_string_pretty(&listing)?);
        } else {
            println!("Supported dialects:");
            for dialect in &dialects {
                println!(
                    "  {:<8} - {} (.{})",
                    dialect.id,
                    dialect.label,
                    dialect.extensions.join(", .")
                );
            }
            println!();
            println!("Total: {} dialects supported", dialects.len());
        }
        Ok(())
    }

    /// Pick the dialect for a project, sampling its sources for `auto`
    pub fn resolve_dialect(&self, project: &Path, choice: DialectChoice) -> Result<Dialect> {
        if let Some(id) = choice.fixed() {
            return Ok(Dialect::get(id));
        }
        if !project.is_dir() {
            return Err(anyhow!(
                "Project root not found or not a directory: {}",
                project.display()
            ));
        }

        let dialects = Dialect::all();
        let candidates: Vec<SourceFile> = WalkDir::new(project)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| dialects.iter().any(|d| d.accepts(entry.path())))
            .map(|entry| SourceFile::from_path(entry.into_path()))
            .collect();

        let sample = sample_text(&candidates, DETECTION_SAMPLE_BYTES);
        let dialect = detect_dialect(&sample);
        debug!(files = candidates.len(), dialect = %dialect.id, "Dialect detected");
        if self.verbose {
            eprintln!("Detected dialect: {}", dialect.label);
        }
        Ok(dialect)
    }
}

/// Every file under `dir` the dialect accepts, in file-name order
pub fn collect_sources(dir: &Path, dialect: &Dialect) -> Vec<SourceFile> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(error) => {
                warn!(%error, "Skipping unreadable directory entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && dialect.accepts(entry.path()))
        .map(|entry| SourceFile::from_path(entry.into_path()))
        .collect()
}

fn default_stem(root: &Path) -> String {
    root.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "diagram".to_string())
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content)
        .map_err(|e| anyhow!("Failed to write output file '{}': {}", path.display(), e))
}
