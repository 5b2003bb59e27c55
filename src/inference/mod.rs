//! Inference Module - vessel telemetry anomaly pipeline
//!
//! ```text
//! form fields ─► features ─► preprocess ─► scoring ─► threshold ─► Verdict
//!                (parse)     (scale+PCA)   (SVR/LR)   (|s|>t / label)
//! ```
//!
//! All fitted state lives in `InferencePipeline`, loaded once and shared
//! read-only between requests.

pub mod artifacts;
pub mod error;
pub mod features;
pub mod layout;
pub mod pipeline;
pub mod preprocess;
pub mod scoring;
pub mod threshold;

// Re-export common types
pub use artifacts::{ArtifactInfo, ArtifactManifest};
pub use error::{ArtifactError, PredictError};
pub use features::{parse_features, FeatureVector};
pub use layout::{LayoutInfo, FEATURE_COUNT, FEATURE_LAYOUT};
pub use pipeline::{InferencePipeline, Prediction, MODEL_CHOICE_FIELD};
pub use preprocess::{Preprocessor, ReducedVector, ReductionBasis, StandardScaler};
pub use scoring::{
    Classifier, Kernel, LogisticRegression, ModelChoice, Regressor, ScoreResult,
    SupportVectorRegressor,
};
pub use threshold::{classify, ThresholdConfig, Verdict};
