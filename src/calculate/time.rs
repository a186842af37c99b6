//! Race time parsing and formatting.
//!
//! Times arrive either as raw seconds or as `M:SS.s` / `H:MM:SS.s` text.
//! Anything that cannot be read as a positive duration parses to
//! `f64::INFINITY`, so an ascending sort pushes incomplete results last.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Placeholder shown for pieces that were entered but never completed.
pub const PLACEHOLDER_TIME: &str = "--:--.-";

/// Text rendered for times that cannot be displayed.
pub const NOT_AVAILABLE: &str = "N/A";

/// A stored race time: raw seconds or formatted text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TimeValue {
    Seconds(f64),
    Text(String),
}

impl TimeValue {
    /// Total seconds, or infinity when the value is not a usable time.
    pub fn seconds(&self) -> f64 {
        match self {
            TimeValue::Seconds(s) => sanitize(*s),
            TimeValue::Text(text) => parse_time_str(text),
        }
    }
}

impl fmt::Display for TimeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeValue::Seconds(s) => write!(f, "{}", s),
            TimeValue::Text(text) => write!(f, "{}", text),
        }
    }
}

impl From<f64> for TimeValue {
    fn from(s: f64) -> Self {
        TimeValue::Seconds(s)
    }
}

impl From<&str> for TimeValue {
    fn from(s: &str) -> Self {
        TimeValue::Text(s.to_string())
    }
}

impl From<String> for TimeValue {
    fn from(s: String) -> Self {
        TimeValue::Text(s)
    }
}

/// Whether a parsed time counts as a completed piece.
pub fn is_valid_time(seconds: f64) -> bool {
    seconds.is_finite() && seconds > 0.0
}

fn sanitize(seconds: f64) -> f64 {
    if is_valid_time(seconds) {
        seconds
    } else {
        f64::INFINITY
    }
}

/// Parse an optional stored time into seconds.
pub fn parse_time(value: Option<&TimeValue>) -> f64 {
    value.map(TimeValue::seconds).unwrap_or(f64::INFINITY)
}

/// Parse `SS.s`, `M:SS.s` or `H:MM:SS.s` into seconds.
pub fn parse_time_str(text: &str) -> f64 {
    let text = text.trim();
    if text.is_empty() || text == PLACEHOLDER_TIME || !text.chars().any(|c| c.is_ascii_digit()) {
        return f64::INFINITY;
    }

    let mut parts = Vec::with_capacity(3);
    for part in text.split(':') {
        match part.trim().parse::<f64>() {
            Ok(v) if v.is_finite() && v >= 0.0 => parts.push(v),
            _ => return f64::INFINITY,
        }
    }

    let total = match parts.as_slice() {
        [s] => *s,
        [m, s] => m * 60.0 + s,
        [h, m, s] => h * 3600.0 + m * 60.0 + s,
        _ => return f64::INFINITY,
    };

    sanitize(total)
}

/// Format seconds as `M:SS.s`, or `H:MM:SS.s` from one hour up.
pub fn format_time(seconds: f64) -> String {
    if !is_valid_time(seconds) {
        return NOT_AVAILABLE.to_string();
    }

    // Round once to tenths so 59.96s becomes 1:00.0, not 0:60.0.
    let tenths = (seconds * 10.0).round();
    if tenths >= u64::MAX as f64 {
        return NOT_AVAILABLE.to_string();
    }
    let tenths = tenths as u64;
    let hours = tenths / 36_000;
    let minutes = (tenths / 600) % 60;
    let secs = (tenths % 600) as f64 / 10.0;

    if hours > 0 {
        format!("{}:{:02}:{:04.1}", hours, minutes, secs)
    } else {
        format!("{}:{:04.1}", minutes, secs)
    }
}
