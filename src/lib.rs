//! # Crew Tracker
//!
//! Rowing team performance tracking: erg test logging, split and power
//! conversion, and team rankings.
//!
//! ## Architecture
//!
//! - **models**: Core data structures (athletes, teams, performances, rankings)
//! - **calculate**: Time parsing, split/watts conversion and ranking logic
//! - **storage**: Filesystem record store (JSONL)
//! - **api**: REST API endpoints
//! - **config**: Configuration loading and validation

pub mod api;
pub mod calculate;
pub mod config;
pub mod models;
pub mod storage;

pub use models::*;
