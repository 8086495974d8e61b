use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{ParsedLeg, PlayerPropFields, Sport};

/// Wager structure as classified from the export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WagerType {
    Straight,
    Parlay,
    Teaser,
    PlayerProp,
    PlayerPropParlay,
    Live,
    RoundRobin,
}

impl WagerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WagerType::Straight => "straight",
            WagerType::Parlay => "parlay",
            WagerType::Teaser => "teaser",
            WagerType::PlayerProp => "player_prop",
            WagerType::PlayerPropParlay => "player_prop_parlay",
            WagerType::Live => "live",
            WagerType::RoundRobin => "round_robin",
        }
    }

    pub fn is_multi_leg(&self) -> bool {
        matches!(
            self,
            WagerType::Parlay
                | WagerType::Teaser
                | WagerType::PlayerPropParlay
                | WagerType::RoundRobin
        )
    }
}

impl fmt::Display for WagerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WagerStatus {
    #[default]
    Pending,
    Won,
    Lost,
}

impl WagerStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, WagerStatus::Pending)
    }
}

impl fmt::Display for WagerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WagerStatus::Pending => write!(f, "pending"),
            WagerStatus::Won => write!(f, "won"),
            WagerStatus::Lost => write!(f, "lost"),
        }
    }
}

/// Outcome of a settlement attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettlementDecision {
    Won,
    Lost,
    Unresolved,
}

impl SettlementDecision {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SettlementDecision::Unresolved)
    }
}

impl From<WagerStatus> for SettlementDecision {
    fn from(status: WagerStatus) -> Self {
        match status {
            WagerStatus::Pending => SettlementDecision::Unresolved,
            WagerStatus::Won => SettlementDecision::Won,
            WagerStatus::Lost => SettlementDecision::Lost,
        }
    }
}

impl fmt::Display for SettlementDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettlementDecision::Won => write!(f, "won"),
            SettlementDecision::Lost => write!(f, "lost"),
            SettlementDecision::Unresolved => write!(f, "unresolved"),
        }
    }
}

/// Parsed `k/n Round Robin (m Bets)` label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundRobinLabel {
    pub parlay_size: usize,
    pub total_legs: usize,
    pub total_parlays: usize,
}

/// Reduced-confidence conditions attached to an imported wager
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParseWarning {
    UnidentifiedGame { game: String },
    ZeroStake,
    UncalculableOdds,
    UnknownSport,
    RoundRobinCountMismatch { label: usize, computed: usize },
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseWarning::UnidentifiedGame { game } => {
                write!(f, "game could not be identified: {}", game)
            }
            ParseWarning::ZeroStake => write!(f, "zero stake"),
            ParseWarning::UncalculableOdds => write!(f, "odds could not be calculated"),
            ParseWarning::UnknownSport => write!(f, "sport could not be determined"),
            ParseWarning::RoundRobinCountMismatch { label, computed } => write!(
                f,
                "round robin label says {} bets, combinations give {}",
                label, computed
            ),
        }
    }
}

/// A parsed wager. Settlement only ever touches status, profit and settled_at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WagerRecord {
    pub id: String,
    pub placed_at: Option<NaiveDateTime>,
    pub wager_type: WagerType,
    /// Type label as printed in the export
    pub label: String,
    pub sport: Sport,
    pub game: String,
    pub stake: Decimal,
    pub potential_win: Decimal,
    pub odds: i32,
    pub status: WagerStatus,
    #[serde(default)]
    pub prop: Option<PlayerPropFields>,
    /// Canonical leg strings for display; empty for single-leg wagers
    #[serde(default)]
    pub legs: Vec<String>,
    /// Structured selections; single-leg wagers carry exactly one
    #[serde(default)]
    pub leg_details: Vec<ParsedLeg>,
    #[serde(default)]
    pub round_robin: Option<RoundRobinLabel>,
    pub game_start: Option<NaiveDateTime>,
    #[serde(default)]
    pub incomplete_matchup: bool,
    #[serde(default)]
    pub warnings: Vec<ParseWarning>,
    #[serde(default)]
    pub profit: Option<Decimal>,
    #[serde(default)]
    pub settled_at: Option<DateTime<Utc>>,
}

impl WagerRecord {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Record a terminal settlement result. No-op if already terminal.
    pub fn apply_settlement(&mut self, decision: SettlementDecision, profit: Decimal) -> bool {
        if self.is_terminal() {
            return false;
        }
        let status = match decision {
            SettlementDecision::Won => WagerStatus::Won,
            SettlementDecision::Lost => WagerStatus::Lost,
            SettlementDecision::Unresolved => return false,
        };
        self.status = status;
        self.profit = Some(profit);
        self.settled_at = Some(Utc::now());
        true
    }
}
