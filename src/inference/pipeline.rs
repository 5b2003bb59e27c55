//! Request orchestration: parse → preprocess → score → classify
//!
//! `InferencePipeline` is the read-only context built once at startup.
//! Tests build it from mock models with `InferencePipeline::new`.

use std::collections::HashMap;
use std::path::Path;

use serde::Serialize;

use super::artifacts::{load_artifacts, ArtifactManifest};
use super::error::{ArtifactError, PredictError};
use super::features::parse_features;
use super::preprocess::Preprocessor;
use super::scoring::{Classifier, ModelChoice, Regressor, ScoreResult, ScoringEngine};
use super::threshold::{classify, ThresholdConfig, Verdict};

/// Form key selecting the model
pub const MODEL_CHOICE_FIELD: &str = "model_choice";

/// Successful pipeline output
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Prediction {
    pub model: ModelChoice,
    pub verdict: Verdict,
}

pub struct InferencePipeline {
    preprocessor: Preprocessor,
    engine: ScoringEngine,
    thresholds: ThresholdConfig,
    manifest: ArtifactManifest,
}

impl InferencePipeline {
    pub fn new(
        preprocessor: Preprocessor,
        regressor: Box<dyn Regressor>,
        classifier: Box<dyn Classifier>,
        thresholds: ThresholdConfig,
    ) -> Self {
        Self {
            preprocessor,
            engine: ScoringEngine::new(regressor, classifier),
            thresholds,
            manifest: ArtifactManifest::default(),
        }
    }

    /// Build from the artifacts in `dir`
    pub fn load(dir: &Path, thresholds: ThresholdConfig) -> Result<Self, ArtifactError> {
        let loaded = load_artifacts(dir)?;

        let mut pipeline = Self::new(
            loaded.preprocessor,
            Box::new(loaded.regressor),
            Box::new(loaded.classifier),
            thresholds,
        );
        pipeline.manifest = loaded.manifest;
        Ok(pipeline)
    }

    pub fn thresholds(&self) -> &ThresholdConfig {
        &self.thresholds
    }

    pub fn manifest(&self) -> &ArtifactManifest {
        &self.manifest
    }

    pub fn preprocessor(&self) -> &Preprocessor {
        &self.preprocessor
    }

    /// Run one prediction. Features are validated before the model choice.
    pub fn predict(&self, form: &HashMap<String, String>) -> Result<Prediction, PredictError> {
        let features = parse_features(form)?;
        let reduced = self.preprocessor.transform(&features);
        if reduced.iter().any(|v| !v.is_finite()) {
            return Err(PredictError::NonFinite("preprocessing"));
        }

        let model: ModelChoice = form
            .get(MODEL_CHOICE_FIELD)
            .ok_or(PredictError::MissingField(MODEL_CHOICE_FIELD))?
            .parse()?;

        let result = self.engine.score(model, &reduced);
        if let ScoreResult::Score(score) = result {
            if !score.is_finite() {
                return Err(PredictError::NonFinite("scoring"));
            }
        }
        let verdict = classify(&result, &self.thresholds);

        match result {
            ScoreResult::Score(score) => {
                tracing::debug!(model = %model, score, verdict = %verdict, "Scored")
            }
            ScoreResult::Label(label) => {
                tracing::debug!(model = %model, label, verdict = %verdict, "Scored")
            }
        }

        Ok(Prediction { model, verdict })
    }
}
