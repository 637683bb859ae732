//! Integration tests for tracing spans and events
//!
//! The pipeline must behave the same with a subscriber installed at any level.

use tracing_subscriber::util::SubscriberInitExt;
use umlscout::core::logging::init_logging;
use umlscout::dialects::{detect_dialect, UnrealDetector};
use umlscout::pipeline::{ExtractConfig, Orchestrator, SourceFile};
use umlscout::prelude::*;
use umlscout::Detector;
use umlscout::{extract, render_plantuml};

const PAWN: &str = r#"
UCLASS()
class GAME_API APatrolPawn : public APawn
{
    GENERATED_BODY()
public:
    UPROPERTY(EditAnywhere)
    float Speed;

    void Patrol(float DeltaTime);
};
"#;

#[test]
fn test_pipeline_under_trace_subscriber() {
    let _guard = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::TRACE)
        .set_default();

    let ir = extract(&[SourceFile::new("PatrolPawn.h", PAWN)], Dialect::unreal());
    assert_eq!(ir.entity_count(), 1);

    let text = render_plantuml(&ir).unwrap();
    assert!(text.contains("APatrolPawn --|> APawn : inherits"));
}

#[test]
fn test_orchestrator_with_tracing() {
    let _ = init_logging(Some("debug"), Some("compact"));

    let orchestrator = Orchestrator::new(ExtractConfig::new(Dialect::unreal()).with_title("Patrol"));
    let ir = orchestrator.process(&[SourceFile::new("PatrolPawn.h", PAWN)]);
    assert_eq!(ir.title.as_deref(), Some("Patrol"));
    assert_eq!(ir.group_of("APatrolPawn"), Some("Others"));
}

#[test]
fn test_detector_with_tracing() {
    let _ = init_logging(Some("debug"), Some("compact"));

    let detector = UnrealDetector::new();
    assert!(detector.detect(PAWN));
    assert!(detector.confidence(PAWN) > 0.5);
    assert_eq!(detector.dialect_name(), "unreal");
    assert_eq!(detect_dialect(PAWN).id, DialectId::Unreal);
}

#[test]
fn test_empty_run_with_tracing() {
    let _ = init_logging(Some("warn"), Some("json"));

    let ir = extract(&[], Dialect::csharp());
    assert!(ir.is_empty());
    assert!(render_plantuml(&ir).unwrap().contains("No entities found"));
}
