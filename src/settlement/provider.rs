use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::Sport;
use crate::error::Result;

/// A scheduled or finished game as known to the results provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventHandle {
    pub id: String,
    pub sport: Sport,
    pub date: NaiveDate,
    pub home: String,
    pub away: String,
}

impl EventHandle {
    /// The side opposite `participant`, if it is one of the two teams
    pub fn opponent_of(&self, participant: &str) -> Option<&str> {
        if names_match(&self.home, participant) {
            Some(&self.away)
        } else if names_match(&self.away, participant) {
            Some(&self.home)
        } else {
            None
        }
    }
}

/// Case-insensitive match where either name may be the shorter form
/// (`CHIEFS` against `KANSAS CITY CHIEFS`)
pub fn names_match(a: &str, b: &str) -> bool {
    let a = a.trim().to_uppercase();
    let b = b.trim().to_uppercase();
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a == b
        || crate::parser::sport_lookup::contains_word(&a, &b)
        || crate::parser::sport_lookup::contains_word(&b, &a)
}

/// External source of game results.
///
/// Implementations should return `Ok(None)` for "not found" and reserve
/// `Err` for transport or provider failures.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GameResultsProvider: Send + Sync {
    async fn find_event(
        &self,
        sport: Sport,
        participant: &str,
        date: NaiveDate,
    ) -> Result<Option<EventHandle>>;

    async fn is_complete(&self, event: &EventHandle) -> Result<bool>;

    /// Numeric stat for a team (`points`) or player (`Receiving Yards`)
    async fn stat_value(
        &self,
        event: &EventHandle,
        participant: &str,
        stat: &str,
    ) -> Result<Option<Decimal>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event() -> EventHandle {
        EventHandle {
            id: "evt-1".to_string(),
            sport: Sport::Nfl,
            date: NaiveDate::from_ymd_opt(2024, 10, 13).unwrap(),
            home: "KANSAS CITY CHIEFS".to_string(),
            away: "SAN FRANCISCO 49ERS".to_string(),
        }
    }

    #[test]
    fn test_opponent_of() {
        let evt = event();
        assert_eq!(evt.opponent_of("Chiefs"), Some("SAN FRANCISCO 49ERS"));
        assert_eq!(evt.opponent_of("SAN FRANCISCO 49ERS"), Some("KANSAS CITY CHIEFS"));
        assert_eq!(evt.opponent_of("RAVENS"), None);
    }

    #[test]
    fn test_names_match_is_word_bounded() {
        assert!(names_match("KANSAS CITY CHIEFS", "chiefs"));
        assert!(!names_match("KANSAS CITY CHIEFS", "CHIEF"));
        assert!(!names_match("", "CHIEFS"));
    }
}
