//! Frozen model artifacts and the scoring pass

pub mod loader;
pub mod scaler;
pub mod scorer;

pub use loader::ArtifactLoader;
pub use scaler::StandardScaler;
pub use scorer::{score, OnnxClassifier, ProbabilityClassifier, ScoringContext};
