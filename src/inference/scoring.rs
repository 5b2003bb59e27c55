//! Scoring Engine - fitted regressor and classifier
//!
//! Models are immutable after load and scored through `&self` only, so a
//! single instance is shared by every request.

use std::fmt;
use std::str::FromStr;

use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};

use super::error::{ArtifactError, PredictError};
use super::preprocess::ReducedVector;

// ============================================================================
// MODEL CHOICE
// ============================================================================

/// Which model scores the request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelChoice {
    Svr,
    Logreg,
}

impl ModelChoice {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Svr => "svr",
            Self::Logreg => "logreg",
        }
    }
}

impl FromStr for ModelChoice {
    type Err = PredictError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "svr" => Ok(Self::Svr),
            "logreg" => Ok(Self::Logreg),
            other => Err(PredictError::UnknownModel(other.to_string())),
        }
    }
}

impl fmt::Display for ModelChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw model output before the verdict is derived
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScoreResult {
    /// Continuous regressor output
    Score(f64),
    /// Classifier label in {0, 1}
    Label(u8),
}

// ============================================================================
// MODEL TRAITS
// ============================================================================

/// Model producing a continuous score
pub trait Regressor: Send + Sync {
    fn predict(&self, x: ArrayView1<'_, f64>) -> f64;
}

/// Model producing a binary label
pub trait Classifier: Send + Sync {
    fn predict(&self, x: ArrayView1<'_, f64>) -> u8;
}

// ============================================================================
// SUPPORT VECTOR REGRESSOR
// ============================================================================

/// Highest polynomial kernel degree accepted from an artifact
pub const MAX_POLY_DEGREE: u32 = 64;

/// SVR kernel function
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Kernel {
    Linear,
    Rbf { gamma: f64 },
    Poly { gamma: f64, coef0: f64, degree: u32 },
    Sigmoid { gamma: f64, coef0: f64 },
}

impl Kernel {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Rbf { .. } => "rbf",
            Self::Poly { .. } => "poly",
            Self::Sigmoid { .. } => "sigmoid",
        }
    }

    pub fn apply(&self, a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
        match *self {
            Self::Linear => a.dot(&b),
            Self::Rbf { gamma } => {
                let sq_dist: f64 = a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum();
                (-gamma * sq_dist).exp()
            }
            Self::Poly { gamma, coef0, degree } => {
                (gamma * a.dot(&b) + coef0).powi(degree.min(MAX_POLY_DEGREE) as i32)
            }
            Self::Sigmoid { gamma, coef0 } => (gamma * a.dot(&b) + coef0).tanh(),
        }
    }

    fn validate(&self) -> Result<(), String> {
        let finite = match *self {
            Self::Linear => true,
            Self::Rbf { gamma } => gamma.is_finite(),
            Self::Poly { gamma, coef0, .. } | Self::Sigmoid { gamma, coef0 } => {
                gamma.is_finite() && coef0.is_finite()
            }
        };
        if !finite {
            return Err("kernel parameters must be finite".to_string());
        }
        if let Self::Poly { degree, .. } = self {
            if *degree == 0 || *degree > MAX_POLY_DEGREE {
                return Err(format!(
                    "poly kernel degree must be between 1 and {}, got {}",
                    MAX_POLY_DEGREE, degree
                ));
            }
        }
        Ok(())
    }
}

/// Epsilon-SVR in dual form: `sum(dual_coef[i] * K(sv[i], x)) + intercept`
#[derive(Debug, Clone)]
pub struct SupportVectorRegressor {
    kernel: Kernel,
    support_vectors: Array2<f64>,
    dual_coef: Array1<f64>,
    intercept: f64,
}

impl SupportVectorRegressor {
    pub fn new(
        kernel: Kernel,
        support_vectors: Vec<Vec<f64>>,
        dual_coef: Vec<f64>,
        intercept: f64,
        n_features: usize,
    ) -> Result<Self, ArtifactError> {
        const NAME: &str = "svr";

        kernel.validate().map_err(|reason| ArtifactError::invalid(NAME, reason))?;

        if support_vectors.is_empty() {
            return Err(ArtifactError::invalid(NAME, "no support vectors"));
        }
        if dual_coef.len() != support_vectors.len() {
            return Err(ArtifactError::invalid(
                NAME,
                format!(
                    "{} dual coefficients for {} support vectors",
                    dual_coef.len(),
                    support_vectors.len()
                ),
            ));
        }
        if let Some(i) = support_vectors.iter().position(|sv| sv.len() != n_features) {
            return Err(ArtifactError::invalid(
                NAME,
                format!(
                    "support vector {} has {} dimensions, expected {}",
                    i,
                    support_vectors[i].len(),
                    n_features
                ),
            ));
        }
        let all_finite = support_vectors.iter().flatten().all(|v| v.is_finite())
            && dual_coef.iter().all(|c| c.is_finite())
            && intercept.is_finite();
        if !all_finite {
            return Err(ArtifactError::invalid(NAME, "non-finite parameters"));
        }

        let rows = support_vectors.len();
        let flat: Vec<f64> = support_vectors.into_iter().flatten().collect();
        let support_vectors = Array2::from_shape_vec((rows, n_features), flat)
            .map_err(|e| ArtifactError::invalid(NAME, e.to_string()))?;

        Ok(Self {
            kernel,
            support_vectors,
            dual_coef: Array1::from(dual_coef),
            intercept,
        })
    }

    pub fn kernel(&self) -> Kernel {
        self.kernel
    }

    pub fn n_support(&self) -> usize {
        self.support_vectors.nrows()
    }
}

impl Regressor for SupportVectorRegressor {
    fn predict(&self, x: ArrayView1<'_, f64>) -> f64 {
        self.support_vectors
            .outer_iter()
            .zip(self.dual_coef.iter())
            .map(|(sv, coef)| coef * self.kernel.apply(sv, x))
            .sum::<f64>()
            + self.intercept
    }
}

// ============================================================================
// LOGISTIC REGRESSION
// ============================================================================

/// Binary logistic regression; predicts `1` when the decision value is positive
#[derive(Debug, Clone)]
pub struct LogisticRegression {
    coef: Array1<f64>,
    intercept: f64,
}

impl LogisticRegression {
    pub fn new(
        coef: Vec<f64>,
        intercept: f64,
        classes: &[i64],
        n_features: usize,
    ) -> Result<Self, ArtifactError> {
        const NAME: &str = "logreg";

        if classes != [0i64, 1].as_slice() {
            return Err(ArtifactError::invalid(
                NAME,
                format!("classes must be [0, 1], got {:?}", classes),
            ));
        }
        if coef.len() != n_features {
            return Err(ArtifactError::invalid(
                NAME,
                format!("{} coefficients, expected {}", coef.len(), n_features),
            ));
        }
        if coef.iter().any(|c| !c.is_finite()) || !intercept.is_finite() {
            return Err(ArtifactError::invalid(NAME, "non-finite parameters"));
        }

        Ok(Self {
            coef: Array1::from(coef),
            intercept,
        })
    }

    pub fn decision_function(&self, x: ArrayView1<'_, f64>) -> f64 {
        self.coef.dot(&x) + self.intercept
    }
}

impl Classifier for LogisticRegression {
    fn predict(&self, x: ArrayView1<'_, f64>) -> u8 {
        u8::from(self.decision_function(x) > 0.0)
    }
}

// ============================================================================
// DISPATCH
// ============================================================================

/// The two loaded models, dispatched by `ModelChoice`
pub struct ScoringEngine {
    regressor: Box<dyn Regressor>,
    classifier: Box<dyn Classifier>,
}

impl ScoringEngine {
    pub fn new(regressor: Box<dyn Regressor>, classifier: Box<dyn Classifier>) -> Self {
        Self { regressor, classifier }
    }

    pub fn score(&self, choice: ModelChoice, reduced: &ReducedVector) -> ScoreResult {
        match choice {
            ModelChoice::Svr => ScoreResult::Score(self.regressor.predict(reduced.view())),
            ModelChoice::Logreg => ScoreResult::Label(self.classifier.predict(reduced.view())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_model_choice_parse() {
        assert_eq!("svr".parse::<ModelChoice>(), Ok(ModelChoice::Svr));
        assert_eq!("logreg".parse::<ModelChoice>(), Ok(ModelChoice::Logreg));
        assert_eq!(
            "SVR".parse::<ModelChoice>(),
            Err(PredictError::UnknownModel("SVR".into()))
        );
        assert_eq!(
            "unknown".parse::<ModelChoice>(),
            Err(PredictError::UnknownModel("unknown".into()))
        );
    }

    #[test]
    fn test_kernels() {
        let a = array![1.0, 2.0];
        let b = array![3.0, 0.5];

        assert_eq!(Kernel::Linear.apply(a.view(), b.view()), 4.0);
        assert_eq!(Kernel::Rbf { gamma: 0.5 }.apply(a.view(), a.view()), 1.0);

        let rbf = Kernel::Rbf { gamma: 0.1 }.apply(a.view(), b.view());
        assert!((rbf - (-0.1f64 * 6.25).exp()).abs() < 1e-12);

        let poly = Kernel::Poly { gamma: 1.0, coef0: 1.0, degree: 2 }.apply(a.view(), b.view());
        assert_eq!(poly, 25.0);

        let sig = Kernel::Sigmoid { gamma: 0.5, coef0: 0.0 }.apply(a.view(), b.view());
        assert!((sig - 2.0f64.tanh()).abs() < 1e-12);
    }

    #[test]
    fn test_kernel_deserialize() {
        let k: Kernel = serde_json::from_str(r#"{"type":"rbf","gamma":0.25}"#).unwrap();
        assert_eq!(k, Kernel::Rbf { gamma: 0.25 });
        let k: Kernel = serde_json::from_str(r#"{"type":"linear"}"#).unwrap();
        assert_eq!(k.name(), "linear");
    }

    #[test]
    fn test_linear_svr() {
        let svr = SupportVectorRegressor::new(
            Kernel::Linear,
            vec![vec![1.0, 0.0], vec![0.0, 1.0]],
            vec![2.0, -1.0],
            0.5,
            2,
        )
        .unwrap();
        // 2*x0 - x1 + 0.5
        assert_eq!(svr.predict(array![1.0, 3.0].view()), -0.5);
        assert_eq!(svr.n_support(), 2);
    }

    #[test]
    fn test_svr_shape_checks() {
        assert!(SupportVectorRegressor::new(Kernel::Linear, vec![], vec![], 0.0, 2).is_err());
        assert!(SupportVectorRegressor::new(
            Kernel::Linear,
            vec![vec![1.0, 0.0]],
            vec![1.0, 2.0],
            0.0,
            2
        )
        .is_err());
        assert!(
            SupportVectorRegressor::new(Kernel::Linear, vec![vec![1.0]], vec![1.0], 0.0, 2).is_err()
        );
        assert!(SupportVectorRegressor::new(
            Kernel::Poly { gamma: 1.0, coef0: 0.0, degree: 0 },
            vec![vec![1.0, 0.0]],
            vec![1.0],
            0.0,
            2
        )
        .is_err());
    }

    #[test]
    fn test_poly_degree_bounded() {
        let svr = |degree| {
            SupportVectorRegressor::new(
                Kernel::Poly { gamma: 1.0, coef0: 0.0, degree },
                vec![vec![1.0, 0.0]],
                vec![1.0],
                0.0,
                2,
            )
        };
        assert!(svr(MAX_POLY_DEGREE).is_ok());
        assert!(svr(MAX_POLY_DEGREE + 1).is_err());
        assert!(svr(u32::MAX).is_err());
    }

    #[test]
    fn test_logreg_labels() {
        let model = LogisticRegression::new(vec![1.0, -1.0], 0.0, &[0, 1], 2).unwrap();
        assert_eq!(model.predict(array![2.0, 1.0].view()), 1);
        assert_eq!(model.predict(array![1.0, 2.0].view()), 0);
        // decision exactly 0 falls to class 0
        assert_eq!(model.predict(array![1.0, 1.0].view()), 0);
        assert_eq!(model.decision_function(array![1.0, 1.0].view()), 0.0);
    }

    #[test]
    fn test_logreg_rejects_bad_classes() {
        assert!(LogisticRegression::new(vec![1.0], 0.0, &[1, 2], 1).is_err());
        assert!(LogisticRegression::new(vec![1.0], 0.0, &[0, 1, 2], 1).is_err());
        assert!(LogisticRegression::new(vec![1.0, 2.0], 0.0, &[0, 1], 1).is_err());
    }

    #[test]
    fn test_engine_dispatch() {
        let engine = ScoringEngine::new(
            Box::new(
                SupportVectorRegressor::new(Kernel::Linear, vec![vec![1.0]], vec![3.0], 0.0, 1)
                    .unwrap(),
            ),
            Box::new(LogisticRegression::new(vec![1.0], -5.0, &[0, 1], 1).unwrap()),
        );
        let r = array![2.0];
        assert_eq!(engine.score(ModelChoice::Svr, &r), ScoreResult::Score(6.0));
        assert_eq!(engine.score(ModelChoice::Logreg, &r), ScoreResult::Label(0));
    }
}
