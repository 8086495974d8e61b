//! Bet-history import
//!
//! raw paste → blocks → classifier rule → extractor → odds/status →
//! [`WagerRecord`]. Each block is parsed on its own; a failing block is
//! recorded against its index and the rest of the batch carries on.

pub mod blocks;
pub mod classifier;
pub mod details;
pub mod legs;
pub mod live;
pub mod odds;
pub mod player_prop;
pub mod sport_lookup;
pub mod straight;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

pub use blocks::{split_blocks, RawBlock};
pub use classifier::classify;
pub use legs::{parse_canonical_leg, Extraction};
pub use odds::{american_odds, american_to_decimal, potential_win};
pub use sport_lookup::SportLookup;

use crate::config::AppConfig;
use crate::domain::{combined_sport, ParseWarning, Sport, WagerRecord};
use crate::error::Result;
use crate::settlement::round_robin::binomial;

/// Everything an import run needs besides the text itself
#[derive(Debug, Clone)]
pub struct ImportOptions {
    pub lookup: SportLookup,
    pub failure_excerpt_chars: usize,
    pub incomplete_matchup_max_len: usize,
}

impl ImportOptions {
    pub fn with_lookup(lookup: SportLookup) -> Self {
        Self {
            lookup,
            failure_excerpt_chars: 200,
            incomplete_matchup_max_len: 50,
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let lookup = match &config.sports.lookup_path {
            Some(path) => SportLookup::load(path)?,
            None => SportLookup::builtin()?,
        };
        Ok(Self {
            lookup,
            failure_excerpt_chars: config.import.failure_excerpt_chars,
            incomplete_matchup_max_len: config.import.incomplete_matchup_max_len,
        })
    }
}

/// A block whose extractor failed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockFailure {
    pub index: usize,
    /// Leading characters of the raw block
    pub excerpt: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportReport {
    pub records: Vec<WagerRecord>,
    pub failures: Vec<BlockFailure>,
    pub parsed: usize,
    pub warned: usize,
    pub failed: usize,
}

/// Parse a whole paste. Never fails; bad blocks land in `failures`.
pub fn import_text(text: &str, options: &ImportOptions) -> ImportReport {
    let mut report = ImportReport::default();

    for block in split_blocks(text) {
        match parse_block(&block, options) {
            Ok(record) => {
                if record.has_warnings() {
                    report.warned += 1;
                }
                report.parsed += 1;
                report.records.push(record);
            }
            Err(e) => {
                warn!(block = block.index, error = %e, "block failed to parse");
                report.failed += 1;
                report.failures.push(BlockFailure {
                    index: block.index,
                    excerpt: excerpt(block.text, options.failure_excerpt_chars),
                    error: e.to_string(),
                });
            }
        }
    }

    info!(
        parsed = report.parsed,
        warned = report.warned,
        failed = report.failed,
        "import finished"
    );
    report
}

/// Parse one block into a record
pub fn parse_block(block: &RawBlock<'_>, options: &ImportOptions) -> Result<WagerRecord> {
    let text = block.text;
    let header = blocks::parse_header(text);
    let rule = classify(text);
    let wager_type = rule.wager_type;
    debug!(block = block.index, wager_type = %wager_type, "classified block");

    let extraction = (rule.extract)(text, &options.lookup)?;

    let mut warnings = Vec::new();
    let (stake, win) = match odds::parse_stake_and_win(text) {
        Some(pair) => pair,
        None => {
            warnings.push(ParseWarning::UncalculableOdds);
            (Decimal::ZERO, Decimal::ZERO)
        }
    };
    if stake.is_zero() {
        warnings.push(ParseWarning::ZeroStake);
    }
    let american = american_odds(stake, win);
    if american == 0 && !stake.is_zero() {
        warnings.push(ParseWarning::UncalculableOdds);
    }

    let status = if wager_type.is_multi_leg() {
        odds::multi_leg_status(text)
    } else {
        odds::single_leg_status(text)
    };

    let id = header
        .ticket_id
        .clone()
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let mut record = WagerRecord {
        id,
        placed_at: header.placed_at,
        wager_type,
        label: header.label,
        sport: Sport::Unknown,
        game: String::new(),
        stake,
        potential_win: win,
        odds: american,
        status,
        prop: None,
        legs: Vec::new(),
        leg_details: Vec::new(),
        round_robin: None,
        game_start: None,
        incomplete_matchup: false,
        warnings: Vec::new(),
        profit: None,
        settled_at: None,
    };

    match extraction {
        Extraction::Single(single) => {
            let incomplete = !single.game.contains("vs")
                && single.game.chars().count() < options.incomplete_matchup_max_len;
            if incomplete && single.start_time.is_none() {
                warnings.push(ParseWarning::UnidentifiedGame {
                    game: single.game.clone(),
                });
            }
            record.sport = single.leg.sport;
            record.game = single.game;
            record.game_start = single.start_time;
            record.incomplete_matchup = incomplete;
            record.prop = single.leg.prop.clone();
            record.leg_details = vec![single.leg];
        }
        Extraction::Legs(extraction) => {
            record.sport = combined_sport(extraction.legs.iter().map(|l| l.sport));
            record.game = extraction
                .legs
                .iter()
                .map(|l| l.participant.as_str())
                .collect::<Vec<_>>()
                .join(" / ");
            record.game_start = extraction.game_start;
            if let Some(label) = extraction.round_robin {
                let computed = binomial(extraction.legs.len(), label.parlay_size);
                if computed != label.total_parlays {
                    warnings.push(ParseWarning::RoundRobinCountMismatch {
                        label: label.total_parlays,
                        computed,
                    });
                }
                record.round_robin = Some(label);
            }
            record.legs = extraction.canonical;
            record.leg_details = extraction.legs;
        }
    }

    if record.sport == Sport::Unknown {
        warnings.push(ParseWarning::UnknownSport);
    }
    record.warnings = warnings;

    debug_assert_eq!(record.wager_type.is_multi_leg(), !record.legs.is_empty());
    debug!(
        block = block.index,
        wager_id = %record.id,
        sport = %record.sport,
        odds = record.odds,
        status = %record.status,
        warnings = record.warnings.len(),
        "parsed wager"
    );
    Ok(record)
}

fn excerpt(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((pos, _)) => text[..pos].to_string(),
        None => text.to_string(),
    }
}
