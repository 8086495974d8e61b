//! Straight bet extractor

use tracing::debug;

use super::blocks::find_start_time;
use super::legs::{combat_leg, single_line_leg, Extraction, SingleSelection};
use super::sport_lookup::SportLookup;
use crate::domain::ParsedLeg;
use crate::error::{Result, WagerError};

/// Combat two-line grammar first, then the generic one-line grammar
pub fn extract_straight(block: &str, lookup: &SportLookup) -> Result<Extraction> {
    let leg = find_selection(block, lookup)
        .ok_or_else(|| WagerError::Parse("no selection line found".to_string()))?;
    Ok(Extraction::Single(single_from_leg(block, leg)))
}

pub(crate) fn find_selection(block: &str, lookup: &SportLookup) -> Option<ParsedLeg> {
    let lines: Vec<&str> = block
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let combat = lines
        .windows(2)
        .find_map(|pair| combat_leg(pair[0], pair[1], lookup));
    if combat.is_some() {
        debug!("straight bet matched combat grammar");
        return combat;
    }
    lines
        .iter()
        .find_map(|line| single_line_leg(line, lookup))
}

pub(crate) fn single_from_leg(block: &str, mut leg: ParsedLeg) -> SingleSelection {
    let game = leg
        .matchup
        .clone()
        .unwrap_or_else(|| leg.participant.clone());
    let start_time = leg.game_date.or_else(|| find_start_time(block));
    leg.game_date = start_time;
    SingleSelection {
        game,
        start_time,
        leg,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BetKind, Sport};

    #[test]
    fn test_generic_moneyline() {
        let lookup = SportLookup::builtin().unwrap();
        let block = "Oct-12-2024\n07:15 PM\t401234567\tSTRAIGHT BET\n[Oct-12-2024 08:00 PM] [CFB] - [123] OHIO STATE -215\nPending\n$151/$70";
        let Extraction::Single(single) = extract_straight(block, &lookup).unwrap() else {
            panic!("expected single selection");
        };
        assert_eq!(single.game, "OHIO STATE");
        assert_eq!(single.leg.sport, Sport::Ncaaf);
        assert_eq!(single.leg.bet_kind, BetKind::Moneyline);
        assert_eq!(single.leg.odds, Some(-215));
        assert!(single.start_time.is_some());
    }

    #[test]
    fn test_combat_grammar_takes_priority() {
        let lookup = SportLookup::builtin().unwrap();
        let block = "Oct-05-2024\n06:00 PM\t401230000\tSTRAIGHT BET\n[Oct-05-2024 10:00 PM] [MU] - UFC 307\n[301] KHALIL ROUNTREE +280 (ALEX PEREIRA vrs KHALIL ROUNTREE)\nLost\n$25/$70";
        let Extraction::Single(single) = extract_straight(block, &lookup).unwrap() else {
            panic!("expected single selection");
        };
        assert_eq!(single.game, "ALEX PEREIRA vs KHALIL ROUNTREE");
        assert_eq!(single.leg.participant, "KHALIL ROUNTREE");
        assert_eq!(single.leg.sport, Sport::Mma);
        assert_eq!(single.leg.odds, Some(280));
    }

    #[test]
    fn test_no_selection_is_an_error() {
        let lookup = SportLookup::builtin().unwrap();
        assert!(extract_straight("Oct-12-2024\nnothing\n$1/$1", &lookup).is_err());
    }
}
