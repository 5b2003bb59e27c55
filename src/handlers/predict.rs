//! Prediction handler

use std::collections::HashMap;

use axum::{extract::{rejection::FormRejection, State}, Form, Json};
use serde::Serialize;
use uuid::Uuid;

use crate::{AppState, AppResult};
use crate::inference::{ModelChoice, Verdict};

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub request_id: Uuid,
    pub prediction: Verdict,
    pub model: ModelChoice,
}

/// Run the anomaly pipeline on a submitted telemetry form
pub async fn predict(
    State(state): State<AppState>,
    body: Result<Form<HashMap<String, String>>, FormRejection>,
) -> AppResult<Json<PredictResponse>> {
    let Form(form) = body?;
    let request_id = Uuid::new_v4();

    let prediction = state.pipeline.predict(&form).map_err(|e| {
        tracing::info!(%request_id, error = %e, "Prediction rejected");
        e
    })?;

    if prediction.verdict.is_anomalous() {
        tracing::warn!(
            %request_id,
            model = %prediction.model,
            "Anomalous vessel behaviour flagged"
        );
    } else {
        tracing::info!(%request_id, model = %prediction.model, "Prediction served");
    }

    Ok(Json(PredictResponse {
        request_id,
        prediction: prediction.verdict,
        model: prediction.model,
    }))
}
