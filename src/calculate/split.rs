//! Split and power conversion for ergometer pieces.
//!
//! A split is the pace per 500m. Power follows the Concept2 cube law:
//! `watts = 2.80 / (split / 500)^3`.

use serde::Serialize;

use super::time::{format_time, is_valid_time, parse_time, TimeValue, NOT_AVAILABLE};
use crate::models::normalize_test_type;

/// Metres covered by one split.
pub const SPLIT_DISTANCE_METERS: f64 = 500.0;

/// Constant of the pace-to-power relationship.
pub const WATTS_CONSTANT: f64 = 2.80;

/// Distance in metres for a distance-based test type.
///
/// Time-based pieces such as `30min` have no fixed distance.
pub fn distance_for(test_type: &str) -> Option<u32> {
    match normalize_test_type(test_type).as_str() {
        "500m" => Some(500),
        "1k" | "1000m" => Some(1000),
        "2k" | "2000m" => Some(2000),
        "5k" | "5000m" => Some(5000),
        "6k" | "6000m" => Some(6000),
        "10k" | "10000m" => Some(10000),
        _ => None,
    }
}

/// Average 500m split for a piece of the given type.
pub fn split_from_time(total_seconds: f64, test_type: &str) -> Option<f64> {
    if !is_valid_time(total_seconds) {
        return None;
    }
    let distance = distance_for(test_type)?;
    Some(total_seconds / f64::from(distance) * SPLIT_DISTANCE_METERS)
}

/// Power in watts for a 500m split.
pub fn watts_from_split(split_seconds: f64) -> Option<u32> {
    if !is_valid_time(split_seconds) {
        return None;
    }
    let pace = split_seconds / SPLIT_DISTANCE_METERS;
    let watts = (WATTS_CONSTANT / pace.powi(3)).round();
    (watts.is_finite() && watts <= f64::from(u32::MAX)).then_some(watts as u32)
}

/// 500m split that produces the given power.
pub fn split_from_watts(watts: f64) -> Option<f64> {
    if !watts.is_finite() || watts <= 0.0 {
        return None;
    }
    let split = SPLIT_DISTANCE_METERS * (WATTS_CONSTANT / watts).cbrt();
    split.is_finite().then_some(split)
}

/// Display form of a split, `N/A` when there is none.
pub fn format_split(split_seconds: Option<f64>) -> String {
    split_seconds
        .map(format_time)
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Everything derivable from a single logged piece.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieceMetrics {
    /// Total seconds, absent for incomplete pieces
    pub seconds: Option<f64>,
    pub time_display: String,
    pub split: Option<f64>,
    pub split_display: String,
    pub watts: Option<u32>,
    pub distance_meters: Option<u32>,
}

impl PieceMetrics {
    /// Derive time, split and power for a stored time and test type.
    pub fn derive(time: Option<&TimeValue>, test_type: &str) -> Self {
        Self::from_seconds(parse_time(time), test_type)
    }

    pub fn from_seconds(seconds: f64, test_type: &str) -> Self {
        let split = split_from_time(seconds, test_type);
        Self {
            seconds: is_valid_time(seconds).then_some(seconds),
            time_display: format_time(seconds),
            split,
            split_display: format_split(split),
            watts: split.and_then(watts_from_split),
            distance_meters: distance_for(test_type),
        }
    }
}
