//! Feature Vector - parsed telemetry input
//!
//! Raw form fields are mapped **by name** onto the positions defined in
//! `layout.rs`. Submission order never matters.

use std::collections::HashMap;

use ndarray::Array1;
use serde::Serialize;

use super::error::PredictError;
use super::layout::{FEATURE_COUNT, FEATURE_LAYOUT};

/// Immutable vector of the 11 telemetry features in layout order
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureVector {
    values: [f64; FEATURE_COUNT],
}

impl FeatureVector {
    pub fn from_values(values: [f64; FEATURE_COUNT]) -> Self {
        Self { values }
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn to_array(&self) -> Array1<f64> {
        Array1::from(self.values.to_vec())
    }
}

/// Parse form fields into a `FeatureVector`.
///
/// Every layout field is required and must be a finite number. Values are
/// trimmed first; no range checks are applied.
pub fn parse_features(form: &HashMap<String, String>) -> Result<FeatureVector, PredictError> {
    let mut values = [0.0f64; FEATURE_COUNT];

    for (i, &field) in FEATURE_LAYOUT.iter().enumerate() {
        let raw = form.get(field).ok_or(PredictError::MissingField(field))?;
        values[i] = parse_finite(field, raw)?;
    }

    Ok(FeatureVector::from_values(values))
}

fn parse_finite(field: &'static str, raw: &str) -> Result<f64, PredictError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| PredictError::InvalidInput {
            field,
            value: raw.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    fn value(fv: &FeatureVector, name: &str) -> Option<f64> {
        FEATURE_LAYOUT
            .iter()
            .position(|&n| n == name)
            .map(|i| fv.as_slice()[i])
    }

    fn sample_form() -> HashMap<String, String> {
        [
            ("lat", "10.0"),
            ("lon", "20.0"),
            ("sog", "5.0"),
            ("cog", "90.0"),
            ("heading", "88.0"),
            ("length", "200.0"),
            ("width", "30.0"),
            ("draft", "10.0"),
            ("cargo", "1.0"),
            ("speed_delta", "0.1"),
            ("course_delta", "0.2"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    #[test]
    fn test_parse_layout_order() {
        let fv = parse_features(&sample_form()).unwrap();
        assert_eq!(
            fv.as_slice(),
            &[10.0, 20.0, 5.0, 90.0, 88.0, 200.0, 30.0, 10.0, 1.0, 0.1, 0.2]
        );
        assert_eq!(value(&fv, "heading"), Some(88.0));
    }

    #[test]
    fn test_every_field_required() {
        for field in FEATURE_LAYOUT {
            let mut form = sample_form();
            form.remove(*field);
            assert_eq!(
                parse_features(&form),
                Err(PredictError::MissingField(*field))
            );
        }
    }

    #[test]
    fn test_rejects_non_numeric() {
        for bad in ["abc", "", "   ", "NaN", "inf", "-infinity", "1.0.0"] {
            let mut form = sample_form();
            form.insert("sog".into(), bad.into());
            match parse_features(&form) {
                Err(PredictError::InvalidInput { field, value }) => {
                    assert_eq!(field, "sog");
                    assert_eq!(value, bad);
                }
                other => panic!("expected InvalidInput for {:?}, got {:?}", bad, other),
            }
        }
    }

    #[test]
    fn test_no_range_validation() {
        let mut form = sample_form();
        form.insert("lat".into(), "512.5".into());
        form.insert("draft".into(), "-3".into());
        let fv = parse_features(&form).unwrap();
        assert_eq!(value(&fv, "lat"), Some(512.5));
        assert_eq!(value(&fv, "draft"), Some(-3.0));
    }

    #[test]
    fn test_whitespace_and_extra_fields() {
        let mut form = sample_form();
        form.insert("cargo".into(), "  7 ".into());
        form.insert("model_choice".into(), "svr".into());
        form.insert("unrelated".into(), "x".into());
        let fv = parse_features(&form).unwrap();
        assert_eq!(value(&fv, "cargo"), Some(7.0));
    }

    #[test]
    fn test_swapped_values_change_vector() {
        let baseline = parse_features(&sample_form()).unwrap();

        let mut form = sample_form();
        form.insert("lat".into(), "20.0".into());
        form.insert("lon".into(), "10.0".into());
        let swapped = parse_features(&form).unwrap();

        assert_ne!(baseline, swapped);
        assert_eq!(value(&swapped, "lat"), Some(20.0));
    }
}
