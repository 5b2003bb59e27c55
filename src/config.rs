//! Configuration module

use std::env;
use std::path::PathBuf;

use crate::inference::threshold::DEFAULT_SVR_THRESHOLD;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Database connection URL
    pub database_url: String,

    /// Server port
    pub port: u16,

    /// JWT secret key
    pub jwt_secret: String,

    /// JWT expiration in hours
    pub jwt_expiration_hours: u64,

    /// Directory holding scaler.json, pca.json, svr.json, logreg.json
    pub artifact_dir: PathBuf,

    /// SVR magnitude threshold
    pub svr_threshold: f64,

    /// Environment (development, production)
    pub environment: String,

    /// Log output format (pretty, json)
    pub log_format: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:vesselwatch.db".to_string()),

            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),

            jwt_secret: env::var("JWT_SECRET")
                .unwrap_or_else(|_| "vesselwatch-dev-secret-change-in-production".to_string()),

            jwt_expiration_hours: env::var("JWT_EXPIRATION_HOURS")
                .ok()
                .and_then(|h| h.parse().ok())
                .unwrap_or(24),

            artifact_dir: env::var("ARTIFACT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("artifacts")),

            svr_threshold: parse_threshold(env::var("SVR_THRESHOLD").ok()),

            environment: env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),

            log_format: env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string()),
        }
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

/// Unparsable, negative and non-finite values fall back to the default
fn parse_threshold(raw: Option<String>) -> f64 {
    raw.and_then(|t| t.trim().parse::<f64>().ok())
        .filter(|t| t.is_finite() && *t >= 0.0)
        .unwrap_or(DEFAULT_SVR_THRESHOLD)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            port: 8080,
            jwt_secret: "vesselwatch-test-secret".to_string(),
            jwt_expiration_hours: 24,
            artifact_dir: PathBuf::from("artifacts"),
            svr_threshold: DEFAULT_SVR_THRESHOLD,
            environment: "development".to_string(),
            log_format: "pretty".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_threshold() {
        assert_eq!(parse_threshold(Some("2.5".into())), 2.5);
        assert_eq!(parse_threshold(Some(" 0 ".into())), 0.0);
        assert_eq!(parse_threshold(None), DEFAULT_SVR_THRESHOLD);
    }

    #[test]
    fn test_parse_threshold_falls_back() {
        for raw in ["-1", "NaN", "inf", "abc", ""] {
            assert_eq!(parse_threshold(Some(raw.into())), DEFAULT_SVR_THRESHOLD, "{:?}", raw);
        }
    }
}
