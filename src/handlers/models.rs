//! Model status handler

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;
use crate::inference::{ArtifactInfo, LayoutInfo};

#[derive(Debug, Serialize)]
pub struct ModelStatus {
    pub layout: LayoutInfo,
    pub components: usize,
    pub explained_variance_ratio: Option<Vec<f64>>,
    pub svr_threshold: f64,
    pub models: [&'static str; 2],
    pub artifacts: Vec<ArtifactInfo>,
}

/// Describe the loaded inference artifacts
pub async fn status(State(state): State<AppState>) -> Json<ModelStatus> {
    let pipeline = &state.pipeline;
    let basis = pipeline.preprocessor().basis();

    Json(ModelStatus {
        layout: LayoutInfo::current(),
        components: basis.n_components(),
        explained_variance_ratio: basis.explained_variance_ratio().map(<[f64]>::to_vec),
        svr_threshold: pipeline.thresholds().svr_threshold,
        models: ["svr", "logreg"],
        artifacts: pipeline.manifest().artifacts.clone(),
    })
}
