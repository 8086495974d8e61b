use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::Sport;

/// Kind of selection a leg (or straight wager) represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BetKind {
    Spread,
    Moneyline,
    Total,
    PlayerProp,
    Unknown,
}

impl fmt::Display for BetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BetKind::Spread => write!(f, "spread"),
            BetKind::Moneyline => write!(f, "moneyline"),
            BetKind::Total => write!(f, "total"),
            BetKind::PlayerProp => write!(f, "player_prop"),
            BetKind::Unknown => write!(f, "unknown"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OverUnder {
    Over,
    Under,
}

impl OverUnder {
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "over" => Some(OverUnder::Over),
            "under" => Some(OverUnder::Under),
            _ => None,
        }
    }
}

impl fmt::Display for OverUnder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverUnder::Over => write!(f, "Over"),
            OverUnder::Under => write!(f, "Under"),
        }
    }
}

/// Per-leg outcome as reported by the book or graded at settlement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum LegStatus {
    #[default]
    Pending,
    Won,
    Lost,
    Push,
}

impl LegStatus {
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(LegStatus::Pending),
            "won" | "win" => Some(LegStatus::Won),
            "lost" | "loss" => Some(LegStatus::Lost),
            "push" | "tie" => Some(LegStatus::Push),
            _ => None,
        }
    }

    /// Won or Lost. A push is not terminal for payout purposes.
    pub fn is_terminal(&self) -> bool {
        matches!(self, LegStatus::Won | LegStatus::Lost)
    }
}

impl fmt::Display for LegStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LegStatus::Pending => write!(f, "Pending"),
            LegStatus::Won => write!(f, "Won"),
            LegStatus::Lost => write!(f, "Lost"),
            LegStatus::Push => write!(f, "Push"),
        }
    }
}

/// Final score printed next to a leg, `(Score: A-B)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub first: u32,
    pub second: u32,
}

/// Structured player-prop selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerPropFields {
    pub player: String,
    pub player_team: Option<String>,
    pub market: String,
    pub over_under: OverUnder,
    pub line: Decimal,
}

impl PlayerPropFields {
    pub fn description(&self) -> String {
        match &self.player_team {
            Some(team) => format!(
                "{} ({}) {} {} {}",
                self.player, team, self.over_under, self.line, self.market
            ),
            None => format!(
                "{} {} {} {}",
                self.player, self.over_under, self.line, self.market
            ),
        }
    }
}

/// One selection of a wager, kept structured from import onwards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedLeg {
    pub game_date: Option<NaiveDateTime>,
    pub sport: Sport,
    /// Team, fighter, or player the selection is on
    pub participant: String,
    /// "A vs B" when the export names both sides
    #[serde(default)]
    pub matchup: Option<String>,
    pub bet_kind: BetKind,
    /// Spread or total line after any teaser adjustment
    pub line: Option<Decimal>,
    #[serde(default)]
    pub odds: Option<i32>,
    #[serde(default)]
    pub over_under: Option<OverUnder>,
    pub teaser_adjustment: Option<Decimal>,
    #[serde(default)]
    pub status: LegStatus,
    #[serde(default)]
    pub score: Option<Score>,
    #[serde(default)]
    pub prop: Option<PlayerPropFields>,
    pub raw_description: String,
}

impl ParsedLeg {
    pub fn new(sport: Sport, participant: impl Into<String>, bet_kind: BetKind) -> Self {
        Self {
            game_date: None,
            sport,
            participant: participant.into(),
            matchup: None,
            bet_kind,
            line: None,
            odds: None,
            over_under: None,
            teaser_adjustment: None,
            status: LegStatus::Pending,
            score: None,
            prop: None,
            raw_description: String::new(),
        }
    }
}
