// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use cutlite_core::Path;
use serde::Serialize;

/// Summary of one successfully cut feature
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CutOutcome {
    pub object_id: i64,
    pub result_count: usize,
    pub original_size: f64,
    /// Size of the smallest result
    pub smallest_size: f64,
    /// Size of the smallest result in percent of the original size
    pub smallest_size_percent: f64,
}

impl CutOutcome {
    pub fn new(object_id: i64, original_size: f64, result_sizes: &[f64]) -> Self {
        let smallest_size = result_sizes.iter().copied().fold(f64::INFINITY, f64::min);
        let smallest_size = if smallest_size.is_finite() { smallest_size } else { 0.0 };
        let smallest_size_percent = if original_size > 0.0 {
            smallest_size / original_size * 100.0
        } else {
            0.0
        };
        Self {
            object_id,
            result_count: result_sizes.len(),
            original_size,
            smallest_size,
            smallest_size_percent,
        }
    }
}

/// Feature that could not be cut in a batch that continues on failure
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedFeature {
    pub object_id: i64,
    pub message: String,
}

/// Intersection line derived by a 3D cut and whether cutting with it
/// produced results
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedCutLine {
    pub object_id: i64,
    pub line: Path,
    pub success: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smallest_result_percentage() {
        let outcome = CutOutcome::new(7, 10000.0, &[7500.0, 2500.0]);
        assert_eq!(outcome.result_count, 2);
        assert_eq!(outcome.smallest_size, 2500.0);
        assert_eq!(outcome.smallest_size_percent, 25.0);
    }

    #[test]
    fn test_outcome_serializes_to_json() {
        let json = serde_json::to_value(CutOutcome::new(3, 0.0, &[])).unwrap();
        assert_eq!(json["object_id"], 3);
        assert_eq!(json["smallest_size_percent"], 0.0);
    }
}
