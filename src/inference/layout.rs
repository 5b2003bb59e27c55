//! Feature Layout - Centralized Feature Definition
//!
//! **This file controls the feature schema.**
//!
//! The order below is the order the scaler and the PCA basis were fitted
//! with. Changing it silently corrupts every prediction, so any change
//! (add, remove, reorder) must bump `FEATURE_VERSION` and ship with
//! re-exported artifacts.

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

/// Current feature layout version
pub const FEATURE_VERSION: u8 = 1;

/// Form field names in exact vector order
pub const FEATURE_LAYOUT: &[&str] = &[
    // === Position (0-1) ===
    "lat",          // 0: Latitude (degrees)
    "lon",          // 1: Longitude (degrees)

    // === Motion (2-4) ===
    "sog",          // 2: Speed over ground (knots)
    "cog",          // 3: Course over ground (degrees)
    "heading",      // 4: True heading (degrees)

    // === Vessel (5-8) ===
    "length",       // 5: Vessel length (m)
    "width",        // 6: Vessel width (m)
    "draft",        // 7: Draft (m)
    "cargo",        // 8: Cargo type code

    // === Trajectory deltas (9-10) ===
    "speed_delta",  // 9: Change in speed since previous fix
    "course_delta", // 10: Change in course since previous fix
];

/// Total number of features
pub const FEATURE_COUNT: usize = 11;

/// CRC32 over version + ordered names; detects layout drift between builds
pub fn layout_hash() -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(&[FEATURE_VERSION]);

    for name in FEATURE_LAYOUT {
        hasher.update(name.as_bytes());
        hasher.update(&[0]);
    }

    hasher.finalize()
}

/// Layout information for the status endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub version: u8,
    pub hash: u32,
    pub feature_count: usize,
    pub feature_names: Vec<String>,
}

impl LayoutInfo {
    pub fn current() -> Self {
        Self {
            version: FEATURE_VERSION,
            hash: layout_hash(),
            feature_count: FEATURE_COUNT,
            feature_names: FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect(),
        }
    }
}
