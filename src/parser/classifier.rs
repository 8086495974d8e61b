//! Wager classifier
//!
//! An ordered list of `(matcher, extractor)` rules; the first matcher that
//! accepts the block decides the wager type. Order matters: a block that
//! mentions both "PLAYER PROPS" and "Parlay" must never fall through to the
//! plain parlay rule.

use regex::Regex;
use std::sync::LazyLock;

use super::legs::{
    extract_parlay, extract_player_prop_parlay, extract_round_robin, extract_teaser, Extraction,
};
use super::live::extract_live;
use super::player_prop::extract_player_prop;
use super::sport_lookup::SportLookup;
use super::straight::extract_straight;
use crate::domain::{RoundRobinLabel, WagerType};
use crate::error::Result;

static RE_ROUND_ROBIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+)\s*/\s*(\d+)\s+Round\s+Robin\s*\(\s*(\d+)\s+Bets?\s*\)").unwrap()
});
static RE_LIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(live|in[- ]?game|in[- ]?play)\b").unwrap());

pub type Matcher = fn(&str) -> bool;
pub type Extractor = fn(&str, &SportLookup) -> Result<Extraction>;

/// One entry of the decision list
pub struct Rule {
    pub wager_type: WagerType,
    pub matches: Matcher,
    pub extract: Extractor,
}

static RULES: [Rule; 7] = [
    Rule {
        wager_type: WagerType::PlayerPropParlay,
        matches: is_player_prop_parlay,
        extract: extract_player_prop_parlay,
    },
    Rule {
        wager_type: WagerType::PlayerProp,
        matches: is_player_prop,
        extract: extract_player_prop,
    },
    Rule {
        wager_type: WagerType::Parlay,
        matches: is_parlay,
        extract: extract_parlay,
    },
    Rule {
        wager_type: WagerType::Teaser,
        matches: is_teaser,
        extract: extract_teaser,
    },
    Rule {
        wager_type: WagerType::RoundRobin,
        matches: is_round_robin,
        extract: extract_round_robin,
    },
    Rule {
        wager_type: WagerType::Live,
        matches: is_live,
        extract: extract_live,
    },
    Rule {
        wager_type: WagerType::Straight,
        matches: always,
        extract: extract_straight,
    },
];

pub fn rules() -> &'static [Rule] {
    &RULES
}

/// First matching rule. The last rule accepts everything.
pub fn classify(block: &str) -> &'static Rule {
    RULES
        .iter()
        .find(|rule| (rule.matches)(block))
        .unwrap_or(&RULES[RULES.len() - 1])
}

fn always(_: &str) -> bool {
    true
}

fn contains_ci(block: &str, cue: &str) -> bool {
    block.to_lowercase().contains(&cue.to_lowercase())
}

pub fn is_player_prop_parlay(block: &str) -> bool {
    contains_ci(block, "PLAYER PROPS") && contains_ci(block, "Parlay")
}

pub fn is_player_prop(block: &str) -> bool {
    contains_ci(block, "PLAYER PROPS")
}

pub fn is_parlay(block: &str) -> bool {
    contains_ci(block, "PARLAY")
}

pub fn is_teaser(block: &str) -> bool {
    contains_ci(block, "TEAS")
}

pub fn is_round_robin(block: &str) -> bool {
    RE_ROUND_ROBIN.is_match(block)
}

pub fn is_live(block: &str) -> bool {
    RE_LIVE.is_match(block)
}

/// `2/3 Round Robin (3 Bets)`
pub fn parse_round_robin_label(block: &str) -> Option<RoundRobinLabel> {
    let caps = RE_ROUND_ROBIN.captures(block)?;
    Some(RoundRobinLabel {
        parlay_size: caps[1].parse().ok()?,
        total_legs: caps[2].parse().ok()?,
        total_parlays: caps[3].parse().ok()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind(block: &str) -> WagerType {
        classify(block).wager_type
    }

    #[test]
    fn test_order_is_first_match() {
        assert_eq!(
            kind("PLAYER PROPS\nParlay (2 picks)"),
            WagerType::PlayerPropParlay
        );
        assert_eq!(kind("PLAYER PROPS"), WagerType::PlayerProp);
        assert_eq!(kind("PARLAY (3 TEAMS)"), WagerType::Parlay);
        // teaser labels say "TEASER" but "parlay" wins when both appear
        assert_eq!(kind("TEASER 6 PT PARLAY"), WagerType::Parlay);
        assert_eq!(kind("TEASER 6 PT"), WagerType::Teaser);
        assert_eq!(kind("2/3 Round Robin (3 Bets)"), WagerType::RoundRobin);
        assert_eq!(kind("LIVE BETTING"), WagerType::Live);
        assert_eq!(kind("STRAIGHT BET"), WagerType::Straight);
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        assert_eq!(kind("player props parlay"), WagerType::PlayerPropParlay);
        assert_eq!(kind("Teaser"), WagerType::Teaser);
    }

    #[test]
    fn test_live_heuristic() {
        assert!(is_live("In-Game wager"));
        assert!(is_live("in play"));
        assert!(!is_live("DELIVERED"));
        assert!(!is_live("STRAIGHT BET"));
    }

    #[test]
    fn test_round_robin_label() {
        let label = parse_round_robin_label("07:15 PM\t1\t2/3 Round Robin (3 Bets)").unwrap();
        assert_eq!(label.parlay_size, 2);
        assert_eq!(label.total_legs, 3);
        assert_eq!(label.total_parlays, 3);
        assert!(parse_round_robin_label("PARLAY").is_none());
    }

    #[test]
    fn test_every_rule_is_reachable() {
        let types: Vec<WagerType> = rules().iter().map(|r| r.wager_type).collect();
        assert_eq!(types.len(), 7);
        assert_eq!(types.last(), Some(&WagerType::Straight));
    }
}
