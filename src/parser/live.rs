//! Live (in-game) wagers
//!
//! Same selection grammar as straight bets. The in-game score may sit on the
//! bet line or on a line of its own.

use regex::Regex;
use std::sync::LazyLock;

use super::legs::Extraction;
use super::sport_lookup::SportLookup;
use super::straight::{find_selection, single_from_leg};
use crate::domain::Score;
use crate::error::{Result, WagerError};

static RE_LIVE_SCORE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)score:\s*(\d+)\s*-\s*(\d+)").unwrap());

pub fn extract_live(block: &str, lookup: &SportLookup) -> Result<Extraction> {
    let mut leg = find_selection(block, lookup)
        .ok_or_else(|| WagerError::Parse("no live selection line found".to_string()))?;
    if leg.score.is_none() {
        leg.score = live_score(block);
    }
    Ok(Extraction::Single(single_from_leg(block, leg)))
}

pub fn live_score(block: &str) -> Option<Score> {
    let caps = RE_LIVE_SCORE.captures(block)?;
    Some(Score {
        first: caps[1].parse().ok()?,
        second: caps[2].parse().ok()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_live_score_on_own_line() {
        let lookup = SportLookup::builtin().unwrap();
        let block = "Oct-13-2024\n02:10 PM\t401234570\tLIVE BETTING\n[Oct-13-2024 01:00 PM] [NFL] - [451] KANSAS CITY CHIEFS -3½ -115\nScore: 7-10\nPending\n$115/$100";
        let Extraction::Single(single) = extract_live(block, &lookup).unwrap() else {
            panic!("expected single selection");
        };
        assert_eq!(
            single.leg.score,
            Some(Score {
                first: 7,
                second: 10
            })
        );
        assert_eq!(single.leg.participant, "KANSAS CITY CHIEFS");
    }

    #[test]
    fn test_live_score_absent() {
        assert_eq!(live_score("no score here"), None);
    }
}
