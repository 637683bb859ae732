//! Pipeline orchestrator
//!
//! Coordinates the two phases of a run:
//! Normalizer → Scanner → MemberExtractor per file (parallel), then
//! Resolver → Classifier → DiagramModelBuilder over the merged entity set.

use rayon::prelude::*;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, span, warn, Level};

use crate::core::{DiagramIr, Entity, EntitySet, RelationSet, ScanError};
use crate::dialects::Dialect;

use super::builder::DiagramModelBuilder;
use super::classifier::{Classifier, Rule};
use super::members::{MemberExtractor, NoiseFilter, TruncationFilter};
use super::normalizer::SourceNormalizer;
use super::resolver::RelationshipResolver;
use super::scanner::EntityScanner;

/// One input file, either already loaded or to be read during phase 1
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub text: Option<String>,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: Some(text.into()),
        }
    }

    /// A file that is read from disk when it is scanned
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            text: None,
        }
    }

    pub fn load(&self) -> Result<Cow<'_, str>, ScanError> {
        self.load_with(false)
    }

    /// Read the file; with `lossy`, invalid UTF-8 sequences are dropped
    /// instead of failing the whole file
    pub fn load_with(&self, lossy: bool) -> Result<Cow<'_, str>, ScanError> {
        if let Some(text) = &self.text {
            return Ok(Cow::Borrowed(text));
        }
        let bytes = std::fs::read(&self.path).map_err(|e| ScanError::io(&self.path, e))?;
        match String::from_utf8(bytes) {
            Ok(text) => Ok(Cow::Owned(text)),
            Err(_) if !lossy => Err(ScanError::undecodable(&self.path)),
            Err(error) => {
                let bytes = error.into_bytes();
                let mut text = String::with_capacity(bytes.len());
                let mut dropped = 0;
                for chunk in bytes.utf8_chunks() {
                    text.push_str(chunk.valid());
                    dropped += chunk.invalid().len();
                }
                warn!(path = %self.path.display(), dropped, "Dropped undecodable bytes");
                Ok(Cow::Owned(text))
            }
        }
    }
}

/// Extraction settings
#[derive(Clone)]
pub struct ExtractConfig {
    pub dialect: Dialect,
    pub noise_filter: Arc<dyn NoiseFilter>,
    /// Rules tested before the dialect's own table
    pub extra_rules: Vec<Rule>,
    pub title: Option<String>,
    pub parallel: bool,
    /// Drop undecodable bytes instead of skipping the file
    pub lossy_decoding: bool,
}

impl ExtractConfig {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            noise_filter: Arc::new(TruncationFilter::default()),
            extra_rules: Vec::new(),
            title: None,
            parallel: true,
            lossy_decoding: false,
        }
    }

    pub fn with_noise_filter(mut self, filter: impl NoiseFilter + 'static) -> Self {
        self.noise_filter = Arc::new(filter);
        self
    }

    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.extra_rules.push(rule);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    pub fn with_lossy_decoding(mut self, lossy: bool) -> Self {
        self.lossy_decoding = lossy;
        self
    }

    /// Classifier with the extra rules ahead of the dialect table
    pub fn classifier(&self) -> Classifier {
        self.extra_rules
            .iter()
            .rev()
            .fold(Classifier::for_dialect(&self.dialect), |classifier, rule| {
                classifier.with_priority_rule(*rule)
            })
    }
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self::new(Dialect::cpp())
    }
}

impl std::fmt::Debug for ExtractConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractConfig")
            .field("dialect", &self.dialect.id)
            .field("noise_filter", &self.noise_filter.name())
            .field("extra_rules", &self.extra_rules.len())
            .field("title", &self.title)
            .field("parallel", &self.parallel)
            .field("lossy_decoding", &self.lossy_decoding)
            .finish()
    }
}

/// Result of both extraction phases
#[derive(Debug, Clone)]
pub struct Extraction {
    pub entities: EntitySet,
    pub relations: RelationSet,
    pub files_scanned: usize,
    pub files_skipped: usize,
}

/// Runs the full pipeline for one configuration
pub struct Orchestrator {
    config: ExtractConfig,
}

impl Orchestrator {
    pub fn new(config: ExtractConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExtractConfig {
        &self.config
    }

    /// Phase 1 for a single file: normalize, find declarations, extract members
    pub fn scan_text(&self, path: &Path, text: &str) -> Vec<Entity> {
        let dialect = &self.config.dialect;
        let normalized = SourceNormalizer::new(dialect).normalize(text);
        let extractor = MemberExtractor::new(dialect, self.config.noise_filter.as_ref());

        let entities: Vec<Entity> = EntityScanner::new(dialect)
            .scan(&normalized)
            .into_iter()
            .map(|declaration| {
                let mut entity = declaration.entity.with_source(path);
                extractor.extract(&mut entity, &normalized[declaration.body]);
                entity
            })
            .collect();

        debug!(path = %path.display(), entities = entities.len(), "Scanned file");
        entities
    }

    /// Phase 1 over all files, merged into one immutable set
    ///
    /// Files that cannot be read or decoded are logged and contribute nothing,
    /// unless lossy decoding is enabled.
    pub fn scan(&self, files: &[SourceFile]) -> (EntitySet, usize) {
        let span = span!(Level::INFO, "scan", files = files.len());
        let _enter = span.enter();

        let scan_one = |file: &SourceFile| -> Option<Vec<Entity>> {
            match file.load_with(self.config.lossy_decoding) {
                Ok(text) => Some(self.scan_text(&file.path, &text)),
                Err(error) => {
                    warn!(path = %file.path.display(), %error, "Skipping file");
                    None
                }
            }
        };

        let per_file: Vec<Option<Vec<Entity>>> = if self.config.parallel {
            files.par_iter().map(scan_one).collect()
        } else {
            files.iter().map(scan_one).collect()
        };

        let skipped = per_file.iter().filter(|r| r.is_none()).count();
        let entities = EntitySet::from_entities(per_file.into_iter().flatten().flatten());
        info!(
            entities = entities.len(),
            skipped, "Phase 1 completed"
        );
        (entities, skipped)
    }

    /// Both phases: scan every file, then resolve relations on the finished set
    pub fn extract(&self, files: &[SourceFile]) -> Extraction {
        let (entities, files_skipped) = self.scan(files);
        let relations = RelationshipResolver::new(&self.config.dialect).resolve(&entities);
        Extraction {
            entities,
            relations,
            files_scanned: files.len() - files_skipped,
            files_skipped,
        }
    }

    /// Full pipeline from source files to diagram IR
    pub fn process(&self, files: &[SourceFile]) -> DiagramIr {
        let span = span!(Level::INFO, "process", dialect = self.config.dialect.name());
        let _enter = span.enter();

        info!(files = files.len(), "Starting extraction pipeline");
        let extraction = self.extract(files);
        if extraction.entities.is_empty() {
            warn!("No entities found, emitting a minimal diagram");
        }

        let mut builder = DiagramModelBuilder::new();
        if let Some(title) = &self.config.title {
            builder = builder.with_title(title);
        }
        let ir = builder.build(
            &extraction.entities,
            &extraction.relations,
            &self.config.classifier(),
        );
        info!(
            entities = ir.entity_count(),
            relations = ir.relations.len(),
            "Pipeline completed successfully"
        );
        ir
    }
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new(ExtractConfig::default())
    }
}

/// Concatenate the start of each file, up to `max_bytes` in total
///
/// Used to feed dialect detection without reading whole projects.
pub fn sample_text(files: &[SourceFile], max_bytes: usize) -> String {
    let mut sample = String::new();
    for file in files {
        if sample.len() >= max_bytes {
            break;
        }
        let Ok(text) = file.load() else {
            continue;
        };
        let mut end = text.len().min(max_bytes - sample.len());
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        sample.push_str(&text[..end]);
        sample.push('\n');
    }
    sample
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{EntityKind, RelationKind};
    use crate::pipeline::KeepAll;

    const HERO: &str = r#"
#pragma once
#include "CoreMinimal.h"

UCLASS()
class MYGAME_API AHero : public ACharacter
{
    GENERATED_BODY()

public:
    AHero();

    UPROPERTY(EditAnywhere)
    UWeaponComponent* Weapon;

    UFUNCTION(BlueprintCallable)
    void Fire(AEnemy* Target);

protected:
    virtual void BeginPlay() override;
};
"#;

    const WEAPON: &str = r#"
UCLASS(ClassGroup = (Custom))
class MYGAME_API UWeaponComponent : public UActorComponent
{
    GENERATED_BODY()
public:
    UPROPERTY()
    int32 Ammo;
};
"#;

    fn unreal() -> Orchestrator {
        Orchestrator::new(ExtractConfig::new(Dialect::unreal()))
    }

    #[test]
    fn test_scan_text_extracts_members() {
        let entities = unreal().scan_text(Path::new("Hero.h"), HERO);
        assert_eq!(entities.len(), 1);
        let hero = &entities[0];
        assert_eq!(hero.name, "AHero");
        assert_eq!(hero.annotation.as_deref(), Some("UCLASS"));
        assert_eq!(hero.attributes.len(), 1);
        assert_eq!(hero.attributes[0].declared_type, "UWeaponComponent");
        let names: Vec<_> = hero.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Fire", "BeginPlay"]);
        assert_eq!(hero.source.as_deref(), Some(Path::new("Hero.h")));
    }

    #[test]
    fn test_process_two_files() {
        let files = vec![
            SourceFile::new("Hero.h", HERO),
            SourceFile::new("Weapon.h", WEAPON),
        ];
        let ir = unreal().process(&files);

        assert_eq!(ir.group_of("AHero"), Some("Characters"));
        assert_eq!(ir.group_of("UWeaponComponent"), Some("Components"));
        let association = ir
            .relations
            .iter()
            .find(|e| e.relation.kind == RelationKind::Association)
            .unwrap();
        assert_eq!(association.relation.source, "AHero");
        assert_eq!(association.relation.target, "UWeaponComponent");
        assert_eq!(ir.externals, vec!["ACharacter", "UActorComponent"]);
    }

    #[test]
    fn test_parallel_and_sequential_agree() {
        let files = vec![
            SourceFile::new("Hero.h", HERO),
            SourceFile::new("Weapon.h", WEAPON),
        ];
        let parallel = Orchestrator::new(ExtractConfig::new(Dialect::unreal())).extract(&files);
        let sequential =
            Orchestrator::new(ExtractConfig::new(Dialect::unreal()).sequential()).extract(&files);
        assert_eq!(parallel.relations, sequential.relations);
        let names = |e: &Extraction| e.entities.names().map(String::from).collect::<Vec<_>>();
        assert_eq!(names(&parallel), names(&sequential));
    }

    #[test]
    fn test_unreadable_file_is_skipped() {
        let files = vec![
            SourceFile::from_path("/definitely/not/here/Missing.h"),
            SourceFile::new("Weapon.h", WEAPON),
        ];
        let extraction = unreal().extract(&files);
        assert_eq!(extraction.files_skipped, 1);
        assert_eq!(extraction.files_scanned, 1);
        assert_eq!(extraction.entities.len(), 1);
    }

    #[test]
    fn test_undecodable_file_is_skipped() {
        let dir = tempfile::TempDir::new().unwrap();
        let latin = dir.path().join("Latin.h");
        let mut bytes = b"// \xA9 Studio\nclass Latin { public: int Year; };\n".to_vec();
        bytes.extend_from_slice(b"class Second { };\n");
        std::fs::write(&latin, bytes).unwrap();

        let files = vec![SourceFile::from_path(&latin), SourceFile::new("B.h", "class B { };")];
        assert!(matches!(files[0].load(), Err(ScanError::Undecodable { .. })));

        let strict = Orchestrator::new(ExtractConfig::new(Dialect::cpp())).extract(&files);
        assert_eq!(strict.files_skipped, 1);
        assert_eq!(strict.entities.names().collect::<Vec<_>>(), vec!["B"]);

        let lossy = Orchestrator::new(ExtractConfig::new(Dialect::cpp()).with_lossy_decoding(true))
            .extract(&files);
        assert_eq!(lossy.files_skipped, 0);
        assert_eq!(
            lossy.entities.names().collect::<Vec<_>>(),
            vec!["Latin", "Second", "B"]
        );
        assert_eq!(lossy.entities.get("Latin").unwrap().attributes[0].name, "Year");
    }

    #[test]
    fn test_noise_filter_is_configurable() {
        let source = "class Runner { public: void Go(); };";
        let files = vec![SourceFile::new("Runner.h", source)];

        let default = Orchestrator::new(ExtractConfig::new(Dialect::cpp())).extract(&files);
        assert!(default.entities.get("Runner").unwrap().methods.is_empty());

        let keep = Orchestrator::new(ExtractConfig::new(Dialect::cpp()).with_noise_filter(KeepAll))
            .extract(&files);
        assert_eq!(keep.entities.get("Runner").unwrap().methods.len(), 1);
    }

    #[test]
    fn test_extra_rules_take_priority() {
        let config = ExtractConfig::new(Dialect::cpp())
            .with_rule(Rule::kind(EntityKind::Class, "Mine"));
        let ir = Orchestrator::new(config).process(&[SourceFile::new("A.h", "class A {};")]);
        assert_eq!(ir.group_of("A"), Some("Mine"));
    }

    #[test]
    fn test_sample_text_limits_size() {
        let files = vec![SourceFile::new("a.h", "a".repeat(100)), SourceFile::new("b.h", "b")];
        let sample = sample_text(&files, 10);
        assert!(sample.len() <= 11);
        assert!(sample.starts_with("aaaa"));
    }
}
