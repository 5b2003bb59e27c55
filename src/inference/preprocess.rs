//! Preprocessing - standardization followed by linear projection
//!
//! Both transforms are fitted offline; here they are only applied.

use ndarray::{Array1, Array2};

use super::error::ArtifactError;
use super::features::FeatureVector;
use super::layout::FEATURE_COUNT;

/// Output of the reduction step, one entry per retained component
pub type ReducedVector = Array1<f64>;

/// Per-feature `(x - mean) / scale`
#[derive(Debug, Clone)]
pub struct StandardScaler {
    mean: Array1<f64>,
    scale: Array1<f64>,
}

impl StandardScaler {
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Result<Self, ArtifactError> {
        const NAME: &str = "scaler";

        if mean.len() != FEATURE_COUNT || scale.len() != FEATURE_COUNT {
            return Err(ArtifactError::invalid(
                NAME,
                format!(
                    "expected {} means and scales, got {} and {}",
                    FEATURE_COUNT,
                    mean.len(),
                    scale.len()
                ),
            ));
        }
        if let Some(i) = mean.iter().position(|m| !m.is_finite()) {
            return Err(ArtifactError::invalid(NAME, format!("mean[{}] is not finite", i)));
        }
        // A zero scale would divide by zero at request time
        if let Some(i) = scale.iter().position(|s| !s.is_finite() || *s == 0.0) {
            return Err(ArtifactError::invalid(
                NAME,
                format!("scale[{}] must be finite and non-zero, got {}", i, scale[i]),
            ));
        }

        Ok(Self {
            mean: Array1::from(mean),
            scale: Array1::from(scale),
        })
    }

    pub fn transform(&self, x: &Array1<f64>) -> Array1<f64> {
        (x - &self.mean) / &self.scale
    }
}

/// Fitted PCA projection
#[derive(Debug, Clone)]
pub struct ReductionBasis {
    /// k x FEATURE_COUNT, rows ordered by explained variance
    components: Array2<f64>,
    mean: Array1<f64>,
    /// Present only when the basis was fitted with whitening
    whiten_scale: Option<Array1<f64>>,
    explained_variance_ratio: Option<Vec<f64>>,
}

impl ReductionBasis {
    pub fn new(
        components: Vec<Vec<f64>>,
        mean: Option<Vec<f64>>,
        explained_variance: Option<Vec<f64>>,
        explained_variance_ratio: Option<Vec<f64>>,
        whiten: bool,
    ) -> Result<Self, ArtifactError> {
        const NAME: &str = "pca";

        let k = components.len();
        if k == 0 {
            return Err(ArtifactError::invalid(NAME, "no components"));
        }
        if let Some(row) = components.iter().position(|c| c.len() != FEATURE_COUNT) {
            return Err(ArtifactError::invalid(
                NAME,
                format!(
                    "component {} has {} weights, expected {}",
                    row,
                    components[row].len(),
                    FEATURE_COUNT
                ),
            ));
        }
        if components.iter().flatten().any(|w| !w.is_finite()) {
            return Err(ArtifactError::invalid(NAME, "components contain non-finite weights"));
        }

        let mean = mean.unwrap_or_else(|| vec![0.0; FEATURE_COUNT]);
        if mean.len() != FEATURE_COUNT || mean.iter().any(|m| !m.is_finite()) {
            return Err(ArtifactError::invalid(
                NAME,
                format!("mean must hold {} finite values", FEATURE_COUNT),
            ));
        }

        if let Some(ratio) = &explained_variance_ratio {
            if ratio.len() != k {
                return Err(ArtifactError::invalid(
                    NAME,
                    format!("explained_variance_ratio has {} entries, expected {}", ratio.len(), k),
                ));
            }
            if ratio.windows(2).any(|w| w[1] > w[0]) {
                return Err(ArtifactError::invalid(
                    NAME,
                    "components are not ordered by explained variance",
                ));
            }
        }

        let whiten_scale = if whiten {
            let variance = explained_variance
                .ok_or_else(|| ArtifactError::invalid(NAME, "whiten requires explained_variance"))?;
            if variance.len() != k {
                return Err(ArtifactError::invalid(
                    NAME,
                    format!("explained_variance has {} entries, expected {}", variance.len(), k),
                ));
            }
            if variance.iter().any(|v| !v.is_finite() || *v <= 0.0) {
                return Err(ArtifactError::invalid(
                    NAME,
                    "explained_variance must be positive to whiten",
                ));
            }
            Some(Array1::from(variance).mapv(f64::sqrt))
        } else {
            None
        };

        let flat: Vec<f64> = components.into_iter().flatten().collect();
        let components = Array2::from_shape_vec((k, FEATURE_COUNT), flat)
            .map_err(|e| ArtifactError::invalid(NAME, e.to_string()))?;

        Ok(Self {
            components,
            mean: Array1::from(mean),
            whiten_scale,
            explained_variance_ratio,
        })
    }

    /// Number of retained components
    pub fn n_components(&self) -> usize {
        self.components.nrows()
    }

    pub fn explained_variance_ratio(&self) -> Option<&[f64]> {
        self.explained_variance_ratio.as_deref()
    }

    pub fn transform(&self, z: &Array1<f64>) -> ReducedVector {
        let projected = self.components.dot(&(z - &self.mean));
        match &self.whiten_scale {
            Some(scale) => projected / scale,
            None => projected,
        }
    }
}

/// Standardize then reduce
#[derive(Debug, Clone)]
pub struct Preprocessor {
    scaler: StandardScaler,
    basis: ReductionBasis,
}

impl Preprocessor {
    pub fn new(scaler: StandardScaler, basis: ReductionBasis) -> Self {
        Self { scaler, basis }
    }

    pub fn basis(&self) -> &ReductionBasis {
        &self.basis
    }

    pub fn transform(&self, features: &FeatureVector) -> ReducedVector {
        let standardized = self.scaler.transform(&features.to_array());
        self.basis.transform(&standardized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity_scaler() -> StandardScaler {
        StandardScaler::new(vec![0.0; FEATURE_COUNT], vec![1.0; FEATURE_COUNT]).unwrap()
    }

    fn axis_basis(axes: &[usize]) -> Vec<Vec<f64>> {
        axes.iter()
            .map(|&a| {
                let mut row = vec![0.0; FEATURE_COUNT];
                row[a] = 1.0;
                row
            })
            .collect()
    }

    #[test]
    fn test_standardize() {
        let mut mean = vec![0.0; FEATURE_COUNT];
        let mut scale = vec![1.0; FEATURE_COUNT];
        mean[0] = 10.0;
        scale[0] = 4.0;
        let scaler = StandardScaler::new(mean, scale).unwrap();

        let mut x = Array1::zeros(FEATURE_COUNT);
        x[0] = 18.0;
        x[1] = 3.0;
        let z = scaler.transform(&x);
        assert_eq!(z[0], 2.0);
        assert_eq!(z[1], 3.0);
    }

    #[test]
    fn test_rejects_zero_scale() {
        let mut scale = vec![1.0; FEATURE_COUNT];
        scale[7] = 0.0;
        let err = StandardScaler::new(vec![0.0; FEATURE_COUNT], scale).unwrap_err();
        assert!(err.to_string().contains("scale[7]"));
    }

    #[test]
    fn test_rejects_wrong_width() {
        assert!(StandardScaler::new(vec![0.0; 3], vec![1.0; 3]).is_err());
        assert!(ReductionBasis::new(vec![vec![1.0; 4]], None, None, None, false).is_err());
        assert!(ReductionBasis::new(vec![], None, None, None, false).is_err());
    }

    #[test]
    fn test_projection_selects_axes() {
        let basis = ReductionBasis::new(axis_basis(&[2, 0]), None, None, None, false).unwrap();
        let mut z = Array1::zeros(FEATURE_COUNT);
        z[0] = 1.5;
        z[2] = -4.0;
        let r = basis.transform(&z);
        assert_eq!(r.len(), 2);
        assert_eq!(r[0], -4.0);
        assert_eq!(r[1], 1.5);
    }

    #[test]
    fn test_projection_centers_and_whitens() {
        let mut mean = vec![0.0; FEATURE_COUNT];
        mean[0] = 1.0;
        let basis = ReductionBasis::new(
            axis_basis(&[0]),
            Some(mean),
            Some(vec![4.0]),
            Some(vec![0.9]),
            true,
        )
        .unwrap();
        let mut z = Array1::zeros(FEATURE_COUNT);
        z[0] = 5.0;
        assert_eq!(basis.transform(&z)[0], 2.0);
    }

    #[test]
    fn test_rejects_unordered_variance() {
        let err = ReductionBasis::new(axis_basis(&[0, 1]), None, None, Some(vec![0.2, 0.5]), false)
            .unwrap_err();
        assert!(err.to_string().contains("ordered"));
    }

    #[test]
    fn test_whiten_needs_variance() {
        assert!(ReductionBasis::new(axis_basis(&[0]), None, None, None, true).is_err());
        assert!(ReductionBasis::new(axis_basis(&[0]), None, Some(vec![0.0]), None, true).is_err());
    }

    #[test]
    fn test_pipeline_deterministic() {
        let pre = Preprocessor::new(
            identity_scaler(),
            ReductionBasis::new(axis_basis(&[0, 5, 10]), None, None, None, false).unwrap(),
        );
        let fv = FeatureVector::from_values([
            10.0, 20.0, 5.0, 90.0, 88.0, 200.0, 30.0, 10.0, 1.0, 0.1, 0.2,
        ]);
        let a = pre.transform(&fv);
        let b = pre.transform(&fv);
        assert_eq!(a, b);
        assert_eq!(a.to_vec(), vec![10.0, 200.0, 0.2]);
        assert_eq!(pre.basis().n_components(), 3);
    }
}
