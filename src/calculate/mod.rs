//! Performance calculations.
//!
//! Pure functions over already-loaded records:
//! - Race time parsing and formatting
//! - 500m split and power (watts) conversion
//! - Per-test-type and overall team rankings

pub mod ranking;
pub mod split;
pub mod time;

pub use ranking::{personal_bests, rank_overall, rank_test_type, test_types_with_results};
pub use split::{
    distance_for, format_split, split_from_time, split_from_watts, watts_from_split, PieceMetrics,
};
pub use time::{format_time, is_valid_time, parse_time, parse_time_str, TimeValue};
