//! Typed access to the team collections.

use std::collections::{HashMap, HashSet};

use tracing::info;

use super::{dedup_by_id, EntityType, JsonlReader, JsonlWriter, StorageConfig, StorageError};
use crate::models::{
    join_roster, AthleteId, AthleteProfile, AthleteSummary, PerformanceRecord, Team, TeamId,
};

/// Repository over athletes, teams and performances.
#[derive(Debug, Clone)]
pub struct TeamStore {
    config: StorageConfig,
}

impl TeamStore {
    pub fn new(config: StorageConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    // ── Athletes ────────────────────────────────────────────────

    pub fn athletes(&self) -> Result<Vec<AthleteProfile>, StorageError> {
        let athletes =
            JsonlReader::<AthleteProfile>::for_entity(&self.config, EntityType::Athlete)
                .read_all()?;
        Ok(dedup_by_id(athletes, |a| a.id.as_str()))
    }

    pub fn athlete(&self, id: &AthleteId) -> Result<Option<AthleteProfile>, StorageError> {
        Ok(self.athletes()?.into_iter().find(|a| &a.id == id))
    }

    /// Display names keyed by athlete id.
    pub fn athlete_names(&self) -> Result<HashMap<AthleteId, String>, StorageError> {
        Ok(self
            .athletes()?
            .into_iter()
            .map(|a| (a.id, a.name))
            .collect())
    }

    /// Store a profile, optionally rostering it on a team.
    ///
    /// Returns false when a profile with the same id already exists.
    /// The profile is stored before the roster changes, so a roster never
    /// names an athlete without a profile.
    pub fn add_athlete(
        &self,
        profile: &AthleteProfile,
        team_id: Option<&TeamId>,
    ) -> Result<bool, StorageError> {
        if let Some(team_id) = team_id {
            if self.team(team_id)?.is_none() {
                return Err(StorageError::NotFound(format!("team {}", team_id)));
            }
        }

        let created = if self.athlete(&profile.id)?.is_some() {
            false
        } else {
            JsonlWriter::for_entity(&self.config, EntityType::Athlete).append(profile)?;
            info!("Added athlete {} ({})", profile.name, profile.id);
            true
        };

        if let Some(team_id) = team_id {
            self.add_to_team(team_id, &profile.id)?;
        }
        Ok(created)
    }

    // ── Teams ───────────────────────────────────────────────────

    pub fn teams(&self) -> Result<Vec<Team>, StorageError> {
        let teams = JsonlReader::<Team>::for_entity(&self.config, EntityType::Team).read_all()?;
        Ok(dedup_by_id(teams, |t| t.id.as_str()))
    }

    pub fn team(&self, id: &TeamId) -> Result<Option<Team>, StorageError> {
        Ok(self.teams()?.into_iter().find(|t| &t.id == id))
    }

    /// Returns false when the team already exists.
    pub fn add_team(&self, team: &Team) -> Result<bool, StorageError> {
        if self.team(&team.id)?.is_some() {
            return Ok(false);
        }
        JsonlWriter::for_entity(&self.config, EntityType::Team).append(team)?;
        info!("Added team {} ({})", team.name, team.id);
        Ok(true)
    }

    fn add_to_team(&self, team_id: &TeamId, athlete_id: &AthleteId) -> Result<(), StorageError> {
        let mut teams = self.teams()?;
        let team = teams
            .iter_mut()
            .find(|t| &t.id == team_id)
            .ok_or_else(|| StorageError::NotFound(format!("team {}", team_id)))?;

        if team.add_member(athlete_id.clone()) {
            JsonlWriter::for_entity(&self.config, EntityType::Team).write_all(&teams)?;
        }
        Ok(())
    }

    /// A team's roster joined with profiles, or None for an unknown team.
    pub fn roster(&self, team_id: &TeamId) -> Result<Option<Vec<AthleteSummary>>, StorageError> {
        let Some(team) = self.team(team_id)? else {
            return Ok(None);
        };
        let profiles = self.athletes()?;
        Ok(Some(join_roster(&team, &profiles)))
    }

    // ── Performances ────────────────────────────────────────────

    pub fn performances(&self) -> Result<Vec<PerformanceRecord>, StorageError> {
        let records =
            JsonlReader::<PerformanceRecord>::for_entity(&self.config, EntityType::Performance)
                .read_all()?;
        Ok(dedup_by_id(records, |r| r.id.as_str()))
    }

    pub fn performances_for(
        &self,
        athlete_id: &AthleteId,
    ) -> Result<Vec<PerformanceRecord>, StorageError> {
        Ok(self
            .performances()?
            .into_iter()
            .filter(|r| &r.athlete_id == athlete_id)
            .collect())
    }

    /// Performances of athletes rostered on the team.
    pub fn performances_for_team(
        &self,
        team: &Team,
    ) -> Result<Vec<PerformanceRecord>, StorageError> {
        Ok(self
            .performances()?
            .into_iter()
            .filter(|r| team.has_member(&r.athlete_id))
            .collect())
    }

    /// Returns false when an identical record is already stored.
    pub fn add_performance(&self, record: &PerformanceRecord) -> Result<bool, StorageError> {
        let exists = !JsonlReader::<PerformanceRecord>::for_entity(
            &self.config,
            EntityType::Performance,
        )
        .read_where(|r| r.id == record.id)?
        .is_empty();
        if exists {
            return Ok(false);
        }

        JsonlWriter::for_entity(&self.config, EntityType::Performance).append(record)?;
        info!(
            "Logged {} for athlete {} ({})",
            record.test_type, record.athlete_id, record.id
        );
        Ok(true)
    }

    /// Append many records, skipping ones already stored. Returns the count written.
    pub fn import_performances(
        &self,
        records: Vec<PerformanceRecord>,
    ) -> Result<usize, StorageError> {
        let mut existing: HashSet<String> = self
            .performances()?
            .into_iter()
            .map(|r| r.id.as_str().to_string())
            .collect();

        let fresh: Vec<PerformanceRecord> = records
            .into_iter()
            .filter(|r| existing.insert(r.id.as_str().to_string()))
            .collect();

        JsonlWriter::for_entity(&self.config, EntityType::Performance).append_batch(&fresh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculate::TimeValue;
    use crate::storage::entity_path;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn store(temp_dir: &TempDir) -> TeamStore {
        TeamStore::new(StorageConfig::new(temp_dir.path().to_path_buf()))
    }

    fn record(athlete: &AthleteId, time: &str) -> PerformanceRecord {
        PerformanceRecord::new(
            athlete.clone(),
            "2k".to_string(),
            Some(TimeValue::from(time)),
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
        )
    }

    #[test]
    fn test_add_and_read_athlete() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        let ana = AthleteProfile::new("Ana".to_string(), "ana@club.org".to_string());

        assert!(store.add_athlete(&ana, None).unwrap());
        assert!(!store.add_athlete(&ana, None).unwrap());

        assert_eq!(store.athletes().unwrap().len(), 1);
        assert_eq!(store.athlete(&ana.id).unwrap(), Some(ana.clone()));
        assert_eq!(store.athlete_names().unwrap()[&ana.id], "Ana");
    }

    #[test]
    fn test_add_athlete_to_team_roster() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        let team = Team::new("Varsity".to_string());
        store.add_team(&team).unwrap();

        let ana = AthleteProfile::new("Ana".to_string(), "ana@club.org".to_string());
        store.add_athlete(&ana, Some(&team.id)).unwrap();

        let roster = store.roster(&team.id).unwrap().unwrap();
        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].name, "Ana");
    }

    #[test]
    fn test_add_athlete_unknown_team() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        let ana = AthleteProfile::new("Ana".to_string(), "ana@club.org".to_string());

        let err = store.add_athlete(&ana, Some(&"nope".into())).unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
        assert!(store.athletes().unwrap().is_empty());
    }

    #[test]
    fn test_add_athlete_leaves_roster_alone_when_profile_write_fails() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        let team = Team::new("Varsity".to_string());
        store.add_team(&team).unwrap();

        // A directory where the athletes file should be makes every read and write fail.
        std::fs::create_dir_all(entity_path(store.config(), EntityType::Athlete)).unwrap();

        let ana = AthleteProfile::new("Ana".to_string(), "ana@club.org".to_string());
        assert!(store.add_athlete(&ana, Some(&team.id)).is_err());

        let team = store.team(&team.id).unwrap().unwrap();
        assert!(team.members.is_empty());
    }

    #[test]
    fn test_roster_unknown_team() {
        let temp_dir = TempDir::new().unwrap();
        assert!(store(&temp_dir).roster(&"nope".into()).unwrap().is_none());
    }

    #[test]
    fn test_add_performance_dedups() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        let athlete: AthleteId = "a1".into();

        assert!(store.add_performance(&record(&athlete, "6:40.5")).unwrap());
        assert!(!store.add_performance(&record(&athlete, "6:40.5")).unwrap());
        assert!(store.add_performance(&record(&athlete, "6:38.0")).unwrap());

        assert_eq!(store.performances_for(&athlete).unwrap().len(), 2);
        assert!(store.performances_for(&"a2".into()).unwrap().is_empty());
    }

    #[test]
    fn test_import_skips_known_records() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        let athlete: AthleteId = "a1".into();
        store.add_performance(&record(&athlete, "6:40.5")).unwrap();

        let written = store
            .import_performances(vec![
                record(&athlete, "6:40.5"),
                record(&athlete, "6:35.0"),
                record(&athlete, "6:35.0"),
            ])
            .unwrap();

        assert_eq!(written, 1);
        assert_eq!(store.performances().unwrap().len(), 2);
    }

    #[test]
    fn test_performances_for_team() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        let team = Team::new("Varsity".to_string()).with_member("a1".into());

        store.add_performance(&record(&"a1".into(), "6:40.5")).unwrap();
        store.add_performance(&record(&"a2".into(), "6:30.0")).unwrap();

        let records = store.performances_for_team(&team).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].athlete_id.as_str(), "a1");
    }
}
