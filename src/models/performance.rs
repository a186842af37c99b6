//! Logged test-piece performance model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{AthleteId, EntityId, PerformanceId};
use crate::calculate::time::{is_valid_time, parse_time, TimeValue};

/// Canonical form of a test-type label ("2K " -> "2k").
pub fn normalize_test_type(test_type: &str) -> String {
    test_type.trim().to_lowercase()
}

fn default_created_at() -> DateTime<Utc> {
    Utc::now()
}

/// One athlete's result on a standardized test piece.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceRecord {
    /// Unique identifier (derived from athlete + test type + date + time)
    pub id: PerformanceId,

    /// Athlete who rowed the piece
    pub athlete_id: AthleteId,

    /// Test type label (e.g., "2k", "6k", "30min")
    pub test_type: String,

    /// Result as raw seconds or formatted text; absent when not rowed
    #[serde(default)]
    pub time: Option<TimeValue>,

    /// Date of the piece
    pub date: NaiveDate,

    /// Split as entered by the athlete, if any
    #[serde(default)]
    pub split: Option<String>,

    /// Power as reported by the erg monitor, if any
    #[serde(default)]
    pub watts: Option<f64>,

    #[serde(default)]
    pub notes: Option<String>,

    /// When this record was created
    #[serde(default = "default_created_at")]
    pub created_at: DateTime<Utc>,
}

impl PerformanceRecord {
    /// Create a new PerformanceRecord with auto-generated ID.
    pub fn new(
        athlete_id: AthleteId,
        test_type: String,
        time: Option<TimeValue>,
        date: NaiveDate,
    ) -> Self {
        let time_key = time.as_ref().map(|t| t.to_string()).unwrap_or_default();
        let id = EntityId::generate(&[
            athlete_id.as_str(),
            &normalize_test_type(&test_type),
            &date.to_string(),
            &time_key,
        ]);

        Self {
            id,
            athlete_id,
            test_type,
            time,
            date,
            split: None,
            watts: None,
            notes: None,
            created_at: Utc::now(),
        }
    }

    /// Builder method to set the entered split.
    pub fn with_split(mut self, split: String) -> Self {
        self.split = Some(split);
        self
    }

    /// Builder method to set the monitor power.
    pub fn with_watts(mut self, watts: f64) -> Self {
        self.watts = Some(watts);
        self
    }

    /// Builder method to set notes.
    pub fn with_notes(mut self, notes: String) -> Self {
        self.notes = Some(notes);
        self
    }

    /// Total seconds, infinity for incomplete or unreadable times.
    pub fn seconds(&self) -> f64 {
        parse_time(self.time.as_ref())
    }

    /// Whether the record carries a usable time.
    pub fn is_completed(&self) -> bool {
        is_valid_time(self.seconds())
    }

    /// Whether the record belongs to the given test type.
    pub fn matches_test_type(&self, test_type: &str) -> bool {
        normalize_test_type(&self.test_type) == normalize_test_type(test_type)
    }
}
