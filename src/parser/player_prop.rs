//! Player prop extractor
//!
//! A prop ticket carries two kinds of lines: the matchup
//! (`Kansas City Chiefs vs San Francisco 49ers`) and the prop itself
//! (`Travis Kelce (KC) Over 65.5 Receiving Yards -115`), possibly behind
//! the usual `[DATE] [TAG] - [LINE#]` prefix.

use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use super::blocks::{find_start_time, parse_datetime};
use super::details::{collapse_ws, normalize_matchup, parse_line_value, strip_trailer};
use super::legs::{parse_bet_line, Extraction, SingleSelection};
use super::sport_lookup::SportLookup;
use crate::domain::{BetKind, LegStatus, OverUnder, ParsedLeg, PlayerPropFields, Sport};
use crate::error::{Result, WagerError};

static RE_PROP_WITH_TEAM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<player>[^()\[\]]+?)\s*\((?P<team>[A-Za-z]{2,5})\)\s+(?P<ou>(?i:over|under))\s+(?P<line>\d+(?:\.\d+)?½?|½)\s+(?P<stat>[A-Za-z][A-Za-z .'+]*?)\s*(?P<odds>[+-]\d{3,})?\s*$",
    )
    .unwrap()
});
static RE_PROP_NO_TEAM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<player>[^()\[\]]+?)\s+(?P<ou>(?i:over|under))\s+(?P<line>\d+(?:\.\d+)?½?|½)\s+(?P<stat>[A-Za-z][A-Za-z .'+]*?)\s*(?P<odds>[+-]\d{3,})?\s*$",
    )
    .unwrap()
});
static RE_OVER_UNDER_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(over|under)\b").unwrap());

/// Markets that only exist in football; these force the college-football
/// code unless the matchup already names the league.
const FOOTBALL_MARKETS: [&str; 8] = [
    "receiving yards",
    "rushing yards",
    "passing yards",
    "receptions",
    "carries",
    "touchdowns",
    "completions",
    "pass interceptions",
];

/// Words that disqualify a line from being the matchup line
const STAT_KEYWORDS: [&str; 12] = [
    "yards",
    "receptions",
    "carries",
    "touchdowns",
    "completions",
    "interceptions",
    "points",
    "rebounds",
    "assists",
    "strikeouts",
    "hits",
    "goals",
];

/// One prop pick with everything the ticket says about it
#[derive(Debug, Clone, PartialEq)]
pub struct PropPick {
    pub fields: PlayerPropFields,
    pub odds: Option<i32>,
    pub status: LegStatus,
    pub matchup: Option<String>,
    pub sport: Sport,
    pub game_date: Option<chrono::NaiveDateTime>,
}

impl PropPick {
    pub fn description(&self) -> String {
        match self.odds {
            Some(odds) if odds > 0 => format!("{} +{}", self.fields.description(), odds),
            Some(odds) => format!("{} {}", self.fields.description(), odds),
            None => self.fields.description(),
        }
    }

    pub fn into_leg(self) -> ParsedLeg {
        let raw_description = self.description();
        ParsedLeg {
            game_date: self.game_date,
            sport: self.sport,
            participant: self.fields.player.clone(),
            matchup: self.matchup,
            bet_kind: BetKind::PlayerProp,
            line: Some(self.fields.line),
            odds: self.odds,
            over_under: Some(self.fields.over_under),
            teaser_adjustment: None,
            status: self.status,
            score: None,
            prop: Some(self.fields),
            raw_description,
        }
    }
}

/// `PLAYER (TEAM) Over|Under LINE STAT [ODDS]`, falling back to the
/// variant without a team code
pub fn parse_prop_text(text: &str) -> Option<(PlayerPropFields, Option<i32>)> {
    let text = collapse_ws(text);
    let (caps, team) = match RE_PROP_WITH_TEAM.captures(&text) {
        Some(caps) => {
            let team = Some(caps["team"].to_string());
            (caps, team)
        }
        None => (RE_PROP_NO_TEAM.captures(&text)?, None),
    };
    let fields = PlayerPropFields {
        player: caps["player"].trim().to_string(),
        player_team: team,
        market: caps["stat"].trim().to_string(),
        over_under: OverUnder::parse(&caps["ou"])?,
        line: parse_line_value(&caps["line"])?,
    };
    let odds = caps.name("odds").and_then(|m| m.as_str().parse().ok());
    Some((fields, odds))
}

pub fn is_matchup_line(line: &str) -> bool {
    let lower = line.to_lowercase();
    lower.contains(" vs ")
        && !line.contains('[')
        && !line.contains(']')
        && !RE_OVER_UNDER_WORD.is_match(line)
        && !STAT_KEYWORDS.iter().any(|k| lower.contains(k))
}

pub fn is_prop_line(line: &str) -> bool {
    RE_OVER_UNDER_WORD.is_match(line) && !line.to_lowercase().contains(" vs ")
}

pub fn is_football_market(market: &str) -> bool {
    let lower = market.trim().to_lowercase();
    FOOTBALL_MARKETS.iter().any(|m| *m == lower)
}

/// Sport for a prop: football-only markets force NCAAF unless the matchup
/// already names a football league; otherwise matchup text, then the block.
pub fn prop_sport(
    market: &str,
    matchup: Option<&str>,
    block: &str,
    lookup: &SportLookup,
) -> Sport {
    let matchup_sport = matchup.and_then(|m| lookup.detect(m));
    if is_football_market(market) {
        return match matchup_sport {
            Some(sport) if sport.is_football() => sport,
            _ => Sport::Ncaaf,
        };
    }
    matchup_sport
        .or_else(|| lookup.detect(block))
        .unwrap_or(Sport::Unknown)
}

/// Matchup printed for the prop at `lines[i]`: the following line, then the
/// preceding one, then the first matchup anywhere in the block
pub fn adjacent_matchup(lines: &[&str], i: usize) -> Option<String> {
    let matchup_at = |j: usize| lines.get(j).copied().filter(|l| is_matchup_line(l));
    let line = matchup_at(i + 1)
        .or_else(|| i.checked_sub(1).and_then(matchup_at))
        .or_else(|| lines.iter().copied().find(|l| is_matchup_line(l)))?;
    Some(normalize_matchup(line).unwrap_or_else(|| line.to_string()))
}

/// Every prop pick in a block, each paired with its adjacent matchup line
pub fn extract_prop_picks(block: &str, lookup: &SportLookup) -> Vec<PropPick> {
    let lines: Vec<&str> = block
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    let mut picks = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        if !is_prop_line(line) {
            continue;
        }
        let (text, game_date) = match parse_bet_line(line) {
            Some(bet) => (bet.details.to_string(), parse_datetime(bet.date)),
            None => (line.to_string(), find_start_time(line)),
        };
        let trailer = strip_trailer(&text);
        let Some((fields, odds)) = parse_prop_text(&trailer.text) else {
            debug!(line = %line, "prop line did not match prop grammar");
            continue;
        };

        let matchup = adjacent_matchup(&lines, i);
        let sport = prop_sport(&fields.market, matchup.as_deref(), block, lookup);

        picks.push(PropPick {
            fields,
            odds,
            status: trailer.status.unwrap_or_default(),
            matchup,
            sport,
            game_date,
        });
    }
    picks
}

/// Single player prop wager
pub fn extract_player_prop(block: &str, lookup: &SportLookup) -> Result<Extraction> {
    let pick = extract_prop_picks(block, lookup)
        .into_iter()
        .next()
        .ok_or_else(|| WagerError::Parse("no player prop line found".to_string()))?;

    let game = pick
        .matchup
        .clone()
        .unwrap_or_else(|| pick.fields.player.clone());
    let start_time = pick.game_date.or_else(|| find_start_time(block));
    let mut leg = pick.into_leg();
    leg.game_date = start_time;

    Ok(Extraction::Single(SingleSelection {
        game,
        start_time,
        leg,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const PROP_BLOCK: &str = "Oct-12-2024\n07:15 PM\t401234569\tPLAYER PROPS\n[Oct-13-2024 04:25 PM] [PLAYER PROPS] - [9001] Travis Kelce (KC) Over 65.5 Receiving Yards -115\nKansas City Chiefs vs San Francisco 49ers\nPending\n$115/$100";

    #[test]
    fn test_parse_prop_text_with_team() {
        let (fields, odds) =
            parse_prop_text("Travis Kelce (KC) Over 65.5 Receiving Yards -115").unwrap();
        assert_eq!(fields.player, "Travis Kelce");
        assert_eq!(fields.player_team.as_deref(), Some("KC"));
        assert_eq!(fields.market, "Receiving Yards");
        assert_eq!(fields.over_under, OverUnder::Over);
        assert_eq!(fields.line, dec!(65.5));
        assert_eq!(odds, Some(-115));
    }

    #[test]
    fn test_parse_prop_text_without_team() {
        let (fields, odds) = parse_prop_text("LeBron James Under 7½ Assists").unwrap();
        assert_eq!(fields.player, "LeBron James");
        assert_eq!(fields.player_team, None);
        assert_eq!(fields.market, "Assists");
        assert_eq!(fields.line, dec!(7.5));
        assert_eq!(odds, None);
    }

    #[test]
    fn test_line_roles() {
        assert!(is_matchup_line("Kansas City Chiefs vs San Francisco 49ers"));
        assert!(!is_matchup_line("[Oct-13] Chiefs vs 49ers"));
        assert!(!is_matchup_line("Chiefs vs 49ers Over 45"));
        assert!(!is_matchup_line("Kelce vs coverage receiving yards"));
        assert!(is_prop_line("Travis Kelce (KC) Over 65.5 Receiving Yards"));
        assert!(!is_prop_line("Chiefs vs 49ers Over 45"));
    }

    #[test]
    fn test_extract_single_prop() {
        let lookup = SportLookup::builtin().unwrap();
        let Extraction::Single(single) = extract_player_prop(PROP_BLOCK, &lookup).unwrap() else {
            panic!("expected single selection");
        };
        assert_eq!(single.game, "Kansas City Chiefs vs San Francisco 49ers");
        // matchup names NFL teams, so the football market keeps NFL
        assert_eq!(single.leg.sport, Sport::Nfl);
        assert_eq!(single.leg.bet_kind, BetKind::PlayerProp);
        let prop = single.leg.prop.unwrap();
        assert_eq!(prop.player, "Travis Kelce");
        assert_eq!(prop.market, "Receiving Yards");
        assert!(single.start_time.is_some());
    }

    #[test]
    fn test_football_market_forces_college_code() {
        let lookup = SportLookup::builtin().unwrap();
        assert_eq!(
            prop_sport("Rushing Yards", Some("Tigers vs Bulldogs"), "", &lookup),
            Sport::Ncaaf
        );
        assert_eq!(
            prop_sport("Points", Some("Lakers vs Celtics"), "", &lookup),
            Sport::Nba
        );
        assert_eq!(
            prop_sport("Points", None, "NBA PLAYER PROPS", &lookup),
            Sport::Nba
        );
    }

    #[test]
    fn test_missing_prop_line_is_an_error() {
        let lookup = SportLookup::builtin().unwrap();
        let err = extract_player_prop("Oct-12-2024\nPLAYER PROPS\n$1/$1", &lookup).unwrap_err();
        assert!(matches!(err, WagerError::Parse(_)));
    }
}
