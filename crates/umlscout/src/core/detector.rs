//! Core detector trait for source dialect identification

/// Core trait for dialect detectors
///
/// A detector looks at raw source text (usually a concatenated sample of
/// files from the project) and reports how strongly it resembles its
/// dialect. Auto-detection picks the detector with the highest confidence.
///
/// # Example
/// ```
/// use umlscout::core::Detector;
/// use umlscout::dialects::UnrealDetector;
///
/// let detector = UnrealDetector::new();
/// assert!(detector.detect("UCLASS()\nclass GAME_API AHero : public ACharacter {"));
/// ```
pub trait Detector: Send + Sync {
    /// Detect if the input matches this dialect
    fn detect(&self, input: &str) -> bool;

    /// Get the confidence level of the detection (0.0 to 1.0)
    fn confidence(&self, input: &str) -> f64;

    /// Get the dialect name
    fn dialect_name(&self) -> &'static str;

    /// Get key patterns that this detector looks for
    fn patterns(&self) -> Vec<&'static str>;
}
