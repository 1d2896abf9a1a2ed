// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cutter configuration, from code, environment variables or JSON.

use cutlite_core::{DegenerateFootprintPolicy, Tolerance};
use cutlite_geometry::DEFAULT_AREA_TOLERANCE_RATIO;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Number of candidate features above which a spatial index is used
pub const DEFAULT_SPATIAL_INDEX_THRESHOLD: usize = 100;

/// Feature cutter configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CutterConfig {
    /// Record failing features and continue with the next one instead of
    /// aborting the batch.
    pub continue_on_failure: bool,
    /// Use the XY cut for polygons without measures.
    pub use_custom_intersect: bool,
    /// Candidate count above which candidates are searched in a spatial index.
    pub spatial_index_threshold: usize,
    /// XY tolerance of the data.
    pub xy_tolerance: f64,
    /// Z tolerance of the data.
    pub z_tolerance: f64,
    /// Handling of multipatch results with a degenerate footprint.
    pub degenerate_footprint_policy: DegenerateFootprintPolicy,
    /// Maximum relative area change of a polygon cut.
    pub area_tolerance_ratio: f64,
}

impl Default for CutterConfig {
    fn default() -> Self {
        let tolerance = Tolerance::default();
        Self {
            continue_on_failure: false,
            use_custom_intersect: true,
            spatial_index_threshold: DEFAULT_SPATIAL_INDEX_THRESHOLD,
            xy_tolerance: tolerance.xy,
            z_tolerance: tolerance.z,
            degenerate_footprint_policy: DegenerateFootprintPolicy::Throw,
            area_tolerance_ratio: DEFAULT_AREA_TOLERANCE_RATIO,
        }
    }
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

impl CutterConfig {
    /// Load configuration from `CUTLITE_*` environment variables, falling
    /// back to the defaults for missing or unparsable values.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            continue_on_failure: env_or("CUTLITE_CONTINUE_ON_FAILURE", defaults.continue_on_failure),
            use_custom_intersect: env_or("CUTLITE_USE_CUSTOM_INTERSECT", defaults.use_custom_intersect),
            spatial_index_threshold: env_or(
                "CUTLITE_SPATIAL_INDEX_THRESHOLD",
                defaults.spatial_index_threshold,
            ),
            xy_tolerance: env_or("CUTLITE_XY_TOLERANCE", defaults.xy_tolerance),
            z_tolerance: env_or("CUTLITE_Z_TOLERANCE", defaults.z_tolerance),
            degenerate_footprint_policy: std::env::var("CUTLITE_DEGENERATE_FOOTPRINT_POLICY")
                .ok()
                .and_then(|value| parse_policy(&value))
                .unwrap_or(defaults.degenerate_footprint_policy),
            area_tolerance_ratio: env_or("CUTLITE_AREA_TOLERANCE_RATIO", defaults.area_tolerance_ratio),
        }
    }

    /// Parse a JSON tool setting; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.xy_tolerance > 0.0) || !(self.z_tolerance > 0.0) {
            return Err(Error::Config(format!(
                "Tolerances must be positive (xy: {}, z: {})",
                self.xy_tolerance, self.z_tolerance
            )));
        }
        if !(self.area_tolerance_ratio >= 0.0) {
            return Err(Error::Config(format!(
                "Area tolerance ratio must not be negative: {}",
                self.area_tolerance_ratio
            )));
        }
        Ok(())
    }

    pub fn tolerance(&self) -> Tolerance {
        Tolerance::new(self.xy_tolerance, self.z_tolerance)
    }
}

fn parse_policy(value: &str) -> Option<DegenerateFootprintPolicy> {
    match value.trim().to_ascii_lowercase().as_str() {
        "throw" => Some(DegenerateFootprintPolicy::Throw),
        "discard" => Some(DegenerateFootprintPolicy::Discard),
        "keep" => Some(DegenerateFootprintPolicy::Keep),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CutterConfig::default();
        assert!(!config.continue_on_failure);
        assert_eq!(config.spatial_index_threshold, 100);
        assert_eq!(config.degenerate_footprint_policy, DegenerateFootprintPolicy::Throw);
        assert_eq!(config.tolerance(), Tolerance::default());
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config =
            CutterConfig::from_json(r#"{"continue_on_failure": true, "degenerate_footprint_policy": "Discard"}"#)
                .unwrap();
        assert!(config.continue_on_failure);
        assert_eq!(config.degenerate_footprint_policy, DegenerateFootprintPolicy::Discard);
        assert_eq!(config.spatial_index_threshold, 100);
    }

    #[test]
    fn test_from_json_rejects_bad_tolerance() {
        assert!(matches!(
            CutterConfig::from_json(r#"{"xy_tolerance": 0.0}"#),
            Err(Error::Config(_))
        ));
        assert!(matches!(CutterConfig::from_json("{"), Err(Error::Json(_))));
    }

    #[test]
    fn test_parse_policy() {
        assert_eq!(parse_policy(" Keep "), Some(DegenerateFootprintPolicy::Keep));
        assert_eq!(parse_policy("ignore"), None);
    }
}
