//! Offline results provider backed by a JSON snapshot
//!
//! ```json
//! { "events": [ {
//!     "id": "nfl-2024-10-13-kc-sf", "sport": "NFL", "date": "2024-10-13",
//!     "home": "KANSAS CITY CHIEFS", "away": "SAN FRANCISCO 49ERS",
//!     "completed": true,
//!     "stats": { "KANSAS CITY CHIEFS": { "points": 27 },
//!                "Travis Kelce": { "Receiving Yards": 72 } } } ] }
//! ```

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

use crate::domain::Sport;
use crate::error::Result;
use crate::settlement::provider::{names_match, EventHandle, GameResultsProvider};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEvent {
    pub id: String,
    pub sport: Sport,
    pub date: NaiveDate,
    pub home: String,
    pub away: String,
    #[serde(default)]
    pub completed: bool,
    /// participant → stat name → value
    #[serde(default)]
    pub stats: HashMap<String, HashMap<String, Decimal>>,
}

impl SnapshotEvent {
    fn handle(&self) -> EventHandle {
        EventHandle {
            id: self.id.clone(),
            sport: self.sport,
            date: self.date,
            home: self.home.clone(),
            away: self.away.clone(),
        }
    }

    fn involves(&self, participant: &str) -> bool {
        names_match(&self.home, participant)
            || names_match(&self.away, participant)
            || self.stats.keys().any(|name| names_match(name, participant))
    }

    fn stat(&self, participant: &str, stat: &str) -> Option<Decimal> {
        let by_participant = self
            .stats
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(participant))
            .or_else(|| {
                self.stats
                    .iter()
                    .find(|(name, _)| names_match(name, participant))
            })?
            .1;
        by_participant
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(stat))
            .map(|(_, value)| *value)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotResultsProvider {
    #[serde(default)]
    events: Vec<SnapshotEvent>,
}

impl SnapshotResultsProvider {
    pub fn from_json_str(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path.as_ref()).await?;
        let provider = Self::from_json_str(&raw)?;
        debug!(
            path = %path.as_ref().display(),
            events = provider.events.len(),
            "loaded results snapshot"
        );
        Ok(provider)
    }

    fn event(&self, handle: &EventHandle) -> Option<&SnapshotEvent> {
        self.events.iter().find(|e| e.id == handle.id)
    }
}

#[async_trait]
impl GameResultsProvider for SnapshotResultsProvider {
    async fn find_event(
        &self,
        sport: Sport,
        participant: &str,
        date: NaiveDate,
    ) -> Result<Option<EventHandle>> {
        Ok(self
            .events
            .iter()
            .find(|e| e.sport == sport && e.date == date && e.involves(participant))
            .map(SnapshotEvent::handle))
    }

    async fn is_complete(&self, event: &EventHandle) -> Result<bool> {
        Ok(self.event(event).map(|e| e.completed).unwrap_or(false))
    }

    async fn stat_value(
        &self,
        event: &EventHandle,
        participant: &str,
        stat: &str,
    ) -> Result<Option<Decimal>> {
        Ok(self.event(event).and_then(|e| e.stat(participant, stat)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const SNAPSHOT: &str = r#"{
        "events": [{
            "id": "kc-sf",
            "sport": "NFL",
            "date": "2024-10-13",
            "home": "KANSAS CITY CHIEFS",
            "away": "SAN FRANCISCO 49ERS",
            "completed": true,
            "stats": {
                "KANSAS CITY CHIEFS": { "points": 27 },
                "SAN FRANCISCO 49ERS": { "points": 20 },
                "Travis Kelce": { "Receiving Yards": 72 }
            }
        }]
    }"#;

    #[test]
    fn test_lookup_by_team_and_player() {
        let provider = SnapshotResultsProvider::from_json_str(SNAPSHOT).unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 10, 13).unwrap();

        let event = tokio_test::block_on(provider.find_event(Sport::Nfl, "CHIEFS", date))
            .unwrap()
            .unwrap();
        assert_eq!(event.id, "kc-sf");
        assert!(tokio_test::block_on(provider.is_complete(&event)).unwrap());

        let points =
            tokio_test::block_on(provider.stat_value(&event, "KANSAS CITY CHIEFS", "POINTS"))
                .unwrap();
        assert_eq!(points, Some(dec!(27)));

        let by_player =
            tokio_test::block_on(provider.find_event(Sport::Nfl, "Travis Kelce", date)).unwrap();
        assert!(by_player.is_some());
        let yards =
            tokio_test::block_on(provider.stat_value(&event, "Travis Kelce", "receiving yards"))
                .unwrap();
        assert_eq!(yards, Some(dec!(72)));
    }

    #[test]
    fn test_wrong_date_or_sport_not_found() {
        let provider = SnapshotResultsProvider::from_json_str(SNAPSHOT).unwrap();
        let next_day = NaiveDate::from_ymd_opt(2024, 10, 14).unwrap();
        let same_day = NaiveDate::from_ymd_opt(2024, 10, 13).unwrap();
        assert!(
            tokio_test::block_on(provider.find_event(Sport::Nfl, "CHIEFS", next_day))
                .unwrap()
                .is_none()
        );
        assert!(
            tokio_test::block_on(provider.find_event(Sport::Nba, "CHIEFS", same_day))
                .unwrap()
                .is_none()
        );
    }
}
