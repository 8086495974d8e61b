//! Parlay / teaser leg extractor
//!
//! Legs come in two shapes:
//! - one line: `[DATE] [SPORT] - [LINE#] DETAILS [STATUS]? (Score: A-B)?`
//! - combat two-liner: `[DATE] [MU] - EVENT` then
//!   `[LINE#] FIGHTER ODDS (MATCHUP) [STATUS]?`
//!
//! A cursor walks the lines, advancing by 2 after a combat leg and by 1
//! otherwise. Lines matching neither grammar are skipped.

use chrono::NaiveDateTime;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use super::blocks::parse_datetime;
use super::classifier::parse_round_robin_label;
use super::details::{normalize_matchup, parse_selection, strip_trailer};
use super::player_prop::{adjacent_matchup, parse_prop_text, prop_sport};
use super::sport_lookup::SportLookup;
use crate::domain::{BetKind, ParsedLeg, RoundRobinLabel, Sport};
use crate::error::{Result, WagerError};

static RE_BET_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\[(?P<date>[^\]]+)\]\s*\[(?P<tag>[^\]]+)\]\s*-\s*\[(?P<num>\d+)\]\s*(?P<details>.+)$",
    )
    .unwrap()
});
static RE_COMBAT_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[(?P<date>[^\]]+)\]\s*\[(?P<tag>[^\]]+)\]\s*-\s*(?P<event>[^\[\s].*)$").unwrap()
});
static RE_FIGHTER_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\[(?P<num>\d+)\]\s*(?P<fighter>.+?)\s+(?P<odds>[+-]\d{3,})\s*\((?P<matchup>[^()]+)\)\s*(?P<rest>.*)$",
    )
    .unwrap()
});
static RE_CANONICAL_LEG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\[(?P<date>[^\]]+)\]\s*\[(?P<sport>[^\]]+)\]\s*(?P<details>.+?)\s+(?P<status>Pending|Won|Lost|Push)$",
    )
    .unwrap()
});

/// Pieces of a single-line bet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BetLine<'a> {
    pub date: &'a str,
    pub tag: &'a str,
    pub line_number: &'a str,
    pub details: &'a str,
}

pub fn parse_bet_line(line: &str) -> Option<BetLine<'_>> {
    let caps = RE_BET_LINE.captures(line.trim())?;
    Some(BetLine {
        date: caps.name("date")?.as_str(),
        tag: caps.name("tag")?.as_str(),
        line_number: caps.name("num")?.as_str(),
        details: caps.name("details")?.as_str(),
    })
}

/// Output of an extractor, tagged by wager shape
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    /// Straight, live, and single player-prop wagers
    Single(SingleSelection),
    /// Parlays, teasers, prop parlays, and round robins
    Legs(LegExtraction),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SingleSelection {
    pub game: String,
    pub start_time: Option<NaiveDateTime>,
    pub leg: ParsedLeg,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LegExtraction {
    pub legs: Vec<ParsedLeg>,
    /// Canonical `[DATE] [SPORT] DETAILS STATUS` strings, one per leg
    pub canonical: Vec<String>,
    /// Earliest parsable leg date
    pub game_start: Option<NaiveDateTime>,
    pub round_robin: Option<RoundRobinLabel>,
}

/// One-line leg grammar
pub fn single_line_leg(line: &str, lookup: &SportLookup) -> Option<ParsedLeg> {
    let bet = parse_bet_line(line)?;
    let trailer = strip_trailer(bet.details);
    let game_date = parse_datetime(bet.date);

    let selection = parse_selection(&trailer.text);
    let sport = lookup.resolve(Some(bet.tag), &[&selection.text]);
    Some(ParsedLeg {
        game_date,
        sport,
        participant: selection.participant.clone(),
        matchup: selection.matchup.clone(),
        bet_kind: selection.bet_kind,
        line: selection.line,
        odds: selection.odds,
        over_under: selection.over_under,
        teaser_adjustment: selection.teaser_adjustment,
        status: trailer.status.unwrap_or_default(),
        score: trailer.score,
        prop: None,
        raw_description: selection.render(),
    })
}

/// One-line prop leg. A tag like `[PLAYER PROPS]` names no league, so the
/// sport then comes from `matchup`, the game line printed beside the prop.
pub fn prop_leg(line: &str, matchup: Option<&str>, lookup: &SportLookup) -> Option<ParsedLeg> {
    let bet = parse_bet_line(line)?;
    let trailer = strip_trailer(bet.details);
    let (fields, odds) = parse_prop_text(&trailer.text)?;

    let sport = lookup
        .sport_for_tag(bet.tag)
        .unwrap_or_else(|| prop_sport(&fields.market, matchup, line, lookup));
    let mut leg = ParsedLeg::new(sport, fields.player.clone(), BetKind::PlayerProp);
    leg.game_date = parse_datetime(bet.date);
    leg.matchup = matchup.map(str::to_string);
    leg.line = Some(fields.line);
    leg.odds = odds;
    leg.over_under = Some(fields.over_under);
    leg.status = trailer.status.unwrap_or_default();
    leg.raw_description = match odds {
        Some(o) => format!("{} {}", fields.description(), format_odds(o)),
        None => fields.description(),
    };
    leg.prop = Some(fields);
    Some(leg)
}

/// Combat two-line grammar. The fighter named on the selection line is the
/// bettor's side regardless of where it sits in the matchup.
pub fn combat_leg(header: &str, selection_line: &str, lookup: &SportLookup) -> Option<ParsedLeg> {
    let head = RE_COMBAT_HEADER.captures(header.trim())?;
    let caps = RE_FIGHTER_LINE.captures(selection_line.trim())?;

    let fighter = caps["fighter"].trim().to_string();
    let odds: i32 = caps["odds"].parse().ok()?;
    let matchup = normalize_matchup(&caps["matchup"]);
    let trailer = strip_trailer(&caps["rest"]);
    let event = head["event"].trim();
    let sport = lookup.resolve(Some(&head["tag"]), &[event]);

    let mut leg = ParsedLeg::new(sport, fighter, BetKind::Moneyline);
    leg.game_date = parse_datetime(&head["date"]);
    leg.odds = Some(odds);
    leg.status = trailer.status.unwrap_or_default();
    leg.score = trailer.score;
    leg.raw_description = match &matchup {
        Some(m) => format!("{} {} ({})", leg.participant, format_odds(odds), m),
        None => format!("{} {}", leg.participant, format_odds(odds)),
    };
    leg.matchup = matchup;
    Some(leg)
}

/// Walk the block and collect every leg in order
pub fn extract_legs(block: &str, lookup: &SportLookup, props: bool) -> LegExtraction {
    let lines: Vec<&str> = block
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let mut legs = Vec::new();
    let mut cursor = 0usize;
    while cursor < lines.len() {
        if props {
            let matchup = adjacent_matchup(&lines, cursor);
            if let Some(leg) = prop_leg(lines[cursor], matchup.as_deref(), lookup) {
                legs.push(leg);
                cursor += 1;
                continue;
            }
        }
        if let Some(leg) = single_line_leg(lines[cursor], lookup) {
            legs.push(leg);
            cursor += 1;
            continue;
        }
        if let Some(next) = lines.get(cursor + 1) {
            if let Some(leg) = combat_leg(lines[cursor], next, lookup) {
                legs.push(leg);
                cursor += 2;
                continue;
            }
        }
        cursor += 1;
    }

    let canonical = legs.iter().map(canonical_leg).collect();
    let game_start = legs.iter().filter_map(|l| l.game_date).min();
    debug!(legs = legs.len(), "extracted legs");

    LegExtraction {
        legs,
        canonical,
        game_start,
        round_robin: None,
    }
}

/// `[DATE] [SPORT] DETAILS STATUS`
pub fn canonical_leg(leg: &ParsedLeg) -> String {
    let date = leg
        .game_date
        .map(|d| d.format("%b-%d-%Y %I:%M %p").to_string())
        .unwrap_or_else(|| "TBD".to_string());
    format!(
        "[{}] [{}] {} {}",
        date,
        leg.sport.code(),
        leg.raw_description,
        leg.status
    )
}

/// Rebuild a leg from its canonical string
pub fn parse_canonical_leg(raw: &str) -> Option<ParsedLeg> {
    let caps = RE_CANONICAL_LEG.captures(raw.trim())?;
    let sport = caps["sport"].parse::<Sport>().unwrap_or_default();
    let details = caps["details"].trim();
    let status = crate::domain::LegStatus::parse(&caps["status"])?;
    let game_date = parse_datetime(&caps["date"]);

    let mut leg = match parse_prop_text(details) {
        Some((fields, odds)) => {
            let mut leg = ParsedLeg::new(sport, fields.player.clone(), BetKind::PlayerProp);
            leg.line = Some(fields.line);
            leg.odds = odds;
            leg.over_under = Some(fields.over_under);
            leg.prop = Some(fields);
            leg
        }
        None => {
            let selection = parse_selection(details);
            let mut leg = ParsedLeg::new(sport, selection.participant, selection.bet_kind);
            leg.matchup = selection.matchup;
            leg.line = selection.line;
            leg.odds = selection.odds;
            leg.over_under = selection.over_under;
            leg
        }
    };
    leg.game_date = game_date;
    leg.status = status;
    leg.raw_description = details.to_string();
    Some(leg)
}

fn require_legs(extraction: LegExtraction, what: &str) -> Result<Extraction> {
    if extraction.legs.is_empty() {
        return Err(WagerError::Parse(format!("no legs found in {}", what)));
    }
    Ok(Extraction::Legs(extraction))
}

pub fn extract_parlay(block: &str, lookup: &SportLookup) -> Result<Extraction> {
    require_legs(extract_legs(block, lookup, false), "parlay")
}

pub fn extract_teaser(block: &str, lookup: &SportLookup) -> Result<Extraction> {
    require_legs(extract_legs(block, lookup, false), "teaser")
}

pub fn extract_player_prop_parlay(block: &str, lookup: &SportLookup) -> Result<Extraction> {
    let mut extraction = extract_legs(block, lookup, true);
    if extraction.legs.is_empty() {
        // props printed without the bracket prefix
        let picks = super::player_prop::extract_prop_picks(block, lookup);
        extraction.legs = picks.into_iter().map(|p| p.into_leg()).collect();
        extraction.canonical = extraction.legs.iter().map(canonical_leg).collect();
        extraction.game_start = extraction.legs.iter().filter_map(|l| l.game_date).min();
    }
    require_legs(extraction, "player prop parlay")
}

pub fn extract_round_robin(block: &str, lookup: &SportLookup) -> Result<Extraction> {
    let label = parse_round_robin_label(block)
        .ok_or_else(|| WagerError::Parse("round robin label not found".to_string()))?;
    let mut extraction = extract_legs(block, lookup, false);
    extraction.round_robin = Some(label);
    require_legs(extraction, "round robin")
}

fn format_odds(odds: i32) -> String {
    if odds > 0 {
        format!("+{}", odds)
    } else {
        odds.to_string()
    }
}
