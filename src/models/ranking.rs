//! Derived ranking models. Computed on demand, never stored.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::{normalize_test_type, AthleteId};

/// Which ranking to compute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RankingScope {
    /// Average percentile across every test type
    Overall,
    /// A single test type (normalized label)
    TestType(String),
}

impl RankingScope {
    /// Interpret a filter value; absent, empty or "overall" selects Overall.
    pub fn from_filter(filter: Option<&str>) -> Self {
        match filter.map(normalize_test_type) {
            None => RankingScope::Overall,
            Some(f) if f.is_empty() || f == "overall" => RankingScope::Overall,
            Some(f) => RankingScope::TestType(f),
        }
    }
}

impl fmt::Display for RankingScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RankingScope::Overall => write!(f, "overall"),
            RankingScope::TestType(t) => write!(f, "{}", t),
        }
    }
}

/// One athlete's position for a single test type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingRow {
    pub athlete_id: AthleteId,

    /// Filled in when a profile is available
    pub athlete_name: Option<String>,

    /// Personal best in seconds
    pub best_time: f64,

    pub best_time_display: String,

    /// 500m split of the personal best (distance pieces only)
    pub split: Option<f64>,

    pub watts: Option<u32>,

    /// 1-based position
    pub rank: u32,

    /// 0 = fastest, 100 = slowest
    pub percentile: f64,
}

/// One athlete's position in the combined team ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallRankingRow {
    pub athlete_id: AthleteId,

    pub athlete_name: Option<String>,

    /// Mean of per-test percentiles (lower is better)
    pub average_percentile: f64,

    /// Number of test types contributing to the average
    pub tests_counted: u32,

    /// Percentile per test type
    pub per_test: BTreeMap<String, f64>,

    /// 1-based position
    pub rank: u32,
}
