//! Fitted artifact loading
//!
//! The scaler, PCA basis and both models are exported offline as JSON and
//! loaded exactly once at startup. Any failure here is fatal.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::error::ArtifactError;
use super::layout::FEATURE_LAYOUT;
use super::preprocess::{Preprocessor, ReductionBasis, StandardScaler};
use super::scoring::{Kernel, LogisticRegression, SupportVectorRegressor};

pub const SCALER_FILE: &str = "scaler.json";
pub const PCA_FILE: &str = "pca.json";
pub const SVR_FILE: &str = "svr.json";
pub const LOGREG_FILE: &str = "logreg.json";

// ============================================================================
// ON-DISK FORMATS
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalerArtifact {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PcaArtifact {
    pub components: Vec<Vec<f64>>,
    #[serde(default)]
    pub mean: Option<Vec<f64>>,
    #[serde(default)]
    pub explained_variance: Option<Vec<f64>>,
    #[serde(default)]
    pub explained_variance_ratio: Option<Vec<f64>>,
    #[serde(default)]
    pub whiten: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SvrArtifact {
    pub kernel: Kernel,
    pub support_vectors: Vec<Vec<f64>>,
    pub dual_coef: Vec<f64>,
    pub intercept: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogregArtifact {
    pub coef: Vec<f64>,
    pub intercept: f64,
    pub classes: Vec<i64>,
}

// ============================================================================
// MANIFEST
// ============================================================================

/// Where an artifact came from, for the status endpoint and logs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactInfo {
    pub name: String,
    pub path: PathBuf,
    pub sha256: String,
    pub loaded_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArtifactManifest {
    pub artifacts: Vec<ArtifactInfo>,
}

/// Everything the pipeline needs, validated and ready to serve
pub struct LoadedArtifacts {
    pub preprocessor: Preprocessor,
    pub regressor: SupportVectorRegressor,
    pub classifier: LogisticRegression,
    pub manifest: ArtifactManifest,
}

// ============================================================================
// LOADING
// ============================================================================

/// Load and cross-validate the four artifacts from `dir`
pub fn load_artifacts(dir: &Path) -> Result<LoadedArtifacts, ArtifactError> {
    tracing::info!(dir = %dir.display(), "Loading fitted artifacts");

    let mut manifest = ArtifactManifest::default();

    let scaler: ScalerArtifact = read_json(&dir.join(SCALER_FILE), "scaler", &mut manifest)?;
    let pca: PcaArtifact = read_json(&dir.join(PCA_FILE), "pca", &mut manifest)?;
    let svr: SvrArtifact = read_json(&dir.join(SVR_FILE), "svr", &mut manifest)?;
    let logreg: LogregArtifact = read_json(&dir.join(LOGREG_FILE), "logreg", &mut manifest)?;

    if let Some(names) = &scaler.feature_names {
        if !names.iter().map(String::as_str).eq(FEATURE_LAYOUT.iter().copied()) {
            return Err(ArtifactError::invalid(
                "scaler",
                format!("feature_names {:?} do not match layout {:?}", names, FEATURE_LAYOUT),
            ));
        }
    }

    let scaler = StandardScaler::new(scaler.mean, scaler.scale)?;
    let basis = ReductionBasis::new(
        pca.components,
        pca.mean,
        pca.explained_variance,
        pca.explained_variance_ratio,
        pca.whiten,
    )?;
    let n_components = basis.n_components();

    let regressor = SupportVectorRegressor::new(
        svr.kernel,
        svr.support_vectors,
        svr.dual_coef,
        svr.intercept,
        n_components,
    )?;
    let classifier =
        LogisticRegression::new(logreg.coef, logreg.intercept, &logreg.classes, n_components)?;

    tracing::info!(
        components = n_components,
        kernel = regressor.kernel().name(),
        support_vectors = regressor.n_support(),
        "Artifacts loaded"
    );

    Ok(LoadedArtifacts {
        preprocessor: Preprocessor::new(scaler, basis),
        regressor,
        classifier,
        manifest,
    })
}

fn read_json<T: DeserializeOwned>(
    path: &Path,
    name: &str,
    manifest: &mut ArtifactManifest,
) -> Result<T, ArtifactError> {
    let bytes = std::fs::read(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let sha256 = format!("{:x}", Sha256::digest(&bytes));

    let value = serde_json::from_slice(&bytes).map_err(|source| ArtifactError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::debug!(artifact = name, sha256 = %sha256, "Artifact read");

    manifest.artifacts.push(ArtifactInfo {
        name: name.to_string(),
        path: path.to_path_buf(),
        sha256,
        loaded_at: chrono::Utc::now(),
    });

    Ok(value)
}
