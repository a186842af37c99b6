//! Athlete profiles, team rosters and the joined roster view.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{AthleteId, EntityId, TeamId};

/// A user profile as stored by the identity side of the app.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AthleteProfile {
    /// Unique identifier (derived from the lowercased email)
    pub id: AthleteId,

    /// Display name
    pub name: String,

    pub email: String,
}

impl AthleteProfile {
    /// Create a new profile with auto-generated ID.
    pub fn new(name: String, email: String) -> Self {
        let id = EntityId::generate(&[&email.trim().to_lowercase()]);
        Self { id, name, email }
    }
}

/// A team and the ids of its rostered athletes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    #[serde(default)]
    pub members: Vec<AthleteId>,
}

impl Team {
    /// Create an empty team with auto-generated ID.
    pub fn new(name: String) -> Self {
        let id = EntityId::generate(&["team", &name.trim().to_lowercase()]);
        Self {
            id,
            name,
            members: Vec::new(),
        }
    }

    /// Builder method to add a member.
    pub fn with_member(mut self, athlete_id: AthleteId) -> Self {
        self.add_member(athlete_id);
        self
    }

    /// Add a member; returns false when already rostered.
    pub fn add_member(&mut self, athlete_id: AthleteId) -> bool {
        if self.has_member(&athlete_id) {
            return false;
        }
        self.members.push(athlete_id);
        true
    }

    pub fn has_member(&self, athlete_id: &AthleteId) -> bool {
        self.members.contains(athlete_id)
    }
}

/// Roster entry joined with its profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AthleteSummary {
    pub id: AthleteId,
    pub name: String,
    pub email: String,
}

impl From<&AthleteProfile> for AthleteSummary {
    fn from(profile: &AthleteProfile) -> Self {
        Self {
            id: profile.id.clone(),
            name: profile.name.clone(),
            email: profile.email.clone(),
        }
    }
}

/// Join a team roster with profile lookups, in roster order.
///
/// Roster ids without a profile are skipped.
pub fn join_roster(team: &Team, profiles: &[AthleteProfile]) -> Vec<AthleteSummary> {
    let by_id: HashMap<&AthleteId, &AthleteProfile> =
        profiles.iter().map(|p| (&p.id, p)).collect();

    team.members
        .iter()
        .filter_map(|id| match by_id.get(id) {
            Some(profile) => Some(AthleteSummary::from(*profile)),
            None => {
                warn!("No profile found for athlete {} on team {}", id, team.name);
                None
            }
        })
        .collect()
}
