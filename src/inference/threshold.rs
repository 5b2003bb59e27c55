//! Anomaly verdict from raw model output
//!
//! The regressor is judged by score magnitude against a configurable
//! threshold; the classifier label is used directly.

use serde::{Deserialize, Serialize};

use super::scoring::ScoreResult;

/// Default SVR magnitude threshold
pub const DEFAULT_SVR_THRESHOLD: f64 = 1.0;

/// Threshold Configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// `|score|` strictly above this is anomalous
    pub svr_threshold: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            svr_threshold: DEFAULT_SVR_THRESHOLD,
        }
    }
}

impl ThresholdConfig {
    pub fn new(svr_threshold: f64) -> Self {
        Self { svr_threshold }
    }
}

/// Final pipeline output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Anomalous,
    Normal,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Anomalous => "Anomalous",
            Self::Normal => "Normal",
        }
    }

    pub fn is_anomalous(&self) -> bool {
        matches!(self, Self::Anomalous)
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn classify(result: &ScoreResult, config: &ThresholdConfig) -> Verdict {
    let anomalous = match *result {
        ScoreResult::Score(score) => score.abs() > config.svr_threshold,
        ScoreResult::Label(label) => label == 1,
    };

    if anomalous {
        Verdict::Anomalous
    } else {
        Verdict::Normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_threshold() {
        assert_eq!(ThresholdConfig::default().svr_threshold, 1.0);
    }

    #[test]
    fn test_svr_boundary_is_strict() {
        let config = ThresholdConfig::default();
        assert_eq!(classify(&ScoreResult::Score(1.0), &config), Verdict::Normal);
        assert_eq!(classify(&ScoreResult::Score(-1.0), &config), Verdict::Normal);
        assert_eq!(classify(&ScoreResult::Score(1.0 + 1e-9), &config), Verdict::Anomalous);
        assert_eq!(classify(&ScoreResult::Score(-1.5), &config), Verdict::Anomalous);
        assert_eq!(classify(&ScoreResult::Score(0.0), &config), Verdict::Normal);
    }

    #[test]
    fn test_custom_threshold() {
        let config = ThresholdConfig::new(2.5);
        assert_eq!(classify(&ScoreResult::Score(2.0), &config), Verdict::Normal);
        assert_eq!(classify(&ScoreResult::Score(2.6), &config), Verdict::Anomalous);
    }

    #[test]
    fn test_label_ignores_threshold() {
        let config = ThresholdConfig::new(100.0);
        assert_eq!(classify(&ScoreResult::Label(1), &config), Verdict::Anomalous);
        assert_eq!(classify(&ScoreResult::Label(0), &config), Verdict::Normal);
    }

    #[test]
    fn test_verdict_strings() {
        assert_eq!(Verdict::Anomalous.to_string(), "Anomalous");
        assert_eq!(Verdict::Normal.as_str(), "Normal");
        assert!(Verdict::Anomalous.is_anomalous());
    }
}
