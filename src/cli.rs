//! `wagerbook` command line

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tabled::{Table, Tabled};
use tracing::info;

use crate::adapters::{InMemoryWagerStore, SnapshotResultsProvider, WagerStore};
use crate::config::AppConfig;
use crate::domain::{WagerRecord, WagerType};
use crate::error::{Result, WagerError};
use crate::parser::{american_odds, american_to_decimal, import_text, ImportOptions};
use crate::settlement::{
    LegSettlementTracker, RoundRobinBreakdown, SettlementOptions, SettlementReport,
    ThrottledProvider,
};

#[derive(Parser)]
#[command(name = "wagerbook")]
#[command(version = "0.1.0")]
#[command(about = "Import sportsbook bet history and settle multi-leg wagers", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config directory
    #[arg(short, long, default_value = "config", global = true)]
    pub config: String,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse a bet-history paste into wager records
    Import {
        /// Text file holding the paste
        file: PathBuf,
        /// Wager file to add new records to
        #[arg(short, long, default_value = "wagers.json")]
        out: PathBuf,
    },
    /// Settle pending wagers against a results snapshot
    Settle {
        #[arg(short, long, default_value = "wagers.json")]
        wagers: PathBuf,
        /// Results snapshot (JSON)
        #[arg(short, long)]
        results: PathBuf,
        /// Only these wagers; all pending wagers when omitted
        #[arg(long = "id")]
        ids: Vec<String>,
    },
    /// Show the parlays behind a round-robin wager
    RoundRobin {
        #[arg(short, long, default_value = "wagers.json")]
        wagers: PathBuf,
        #[arg(long)]
        id: String,
    },
    /// American odds from a stake and potential win
    Odds {
        #[arg(long)]
        stake: Decimal,
        #[arg(long)]
        win: Decimal,
    },
}

/// Output mode for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Table,
    Json,
}

impl OutputMode {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            OutputMode::Json
        } else {
            OutputMode::Table
        }
    }
}

pub fn print_items<T: Tabled + Serialize>(items: &[T], mode: OutputMode) -> Result<()> {
    match mode {
        OutputMode::Table => {
            if items.is_empty() {
                println!("(no results)");
            } else {
                println!("{}", Table::new(items));
            }
        }
        OutputMode::Json => println!("{}", serde_json::to_string_pretty(items)?),
    }
    Ok(())
}

#[derive(Debug, Serialize, Tabled)]
pub struct WagerRow {
    pub id: String,
    #[tabled(rename = "type")]
    pub wager_type: String,
    pub sport: String,
    pub game: String,
    pub stake: String,
    pub win: String,
    pub odds: i32,
    pub status: String,
    pub warnings: String,
}

impl From<&WagerRecord> for WagerRow {
    fn from(record: &WagerRecord) -> Self {
        Self {
            id: record.id.clone(),
            wager_type: record.wager_type.to_string(),
            sport: record.sport.to_string(),
            game: record.game.clone(),
            stake: record.stake.to_string(),
            win: record.potential_win.to_string(),
            odds: record.odds,
            status: record.status.to_string(),
            warnings: record
                .warnings
                .iter()
                .map(|w| w.to_string())
                .collect::<Vec<_>>()
                .join("; "),
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
pub struct SettlementRow {
    pub wager_id: String,
    pub decision: String,
    pub changed: bool,
    pub reason: String,
}

impl From<&SettlementReport> for SettlementRow {
    fn from(report: &SettlementReport) -> Self {
        Self {
            wager_id: report.wager_id.clone(),
            decision: report.decision.to_string(),
            changed: report.changed,
            reason: report
                .abort
                .as_ref()
                .map(|a| a.to_string())
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
pub struct ParlayRow {
    pub legs: String,
    pub odds: i32,
    pub stake: String,
    pub win: String,
    pub status: String,
}

pub async fn run(cli: Cli, config: AppConfig) -> Result<()> {
    let mode = OutputMode::from_json_flag(cli.json);
    match cli.command {
        Commands::Import { file, out } => run_import(&file, &out, &config, mode).await,
        Commands::Settle {
            wagers,
            results,
            ids,
        } => run_settle(&wagers, &results, ids, &config, mode).await,
        Commands::RoundRobin { wagers, id } => run_round_robin(&wagers, &id, mode).await,
        Commands::Odds { stake, win } => run_odds(stake, win, mode),
    }
}

async fn open_store(path: &Path) -> Result<InMemoryWagerStore> {
    if tokio::fs::try_exists(path).await? {
        InMemoryWagerStore::load_json(path).await
    } else {
        Ok(InMemoryWagerStore::new())
    }
}

pub async fn run_import(file: &Path, out: &Path, config: &AppConfig, mode: OutputMode) -> Result<()> {
    let text = tokio::fs::read_to_string(file).await?;
    let options = ImportOptions::from_config(config)?;
    let report = import_text(&text, &options);

    // existing records keep their settlement state
    let store = open_store(out).await?;
    let mut added = 0usize;
    for record in &report.records {
        if store.get(&record.id).await?.is_none() {
            store.save(record.clone()).await?;
            added += 1;
        }
    }
    store.save_json(out).await?;
    info!(added, path = %out.display(), "import written");

    if mode == OutputMode::Json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    let rows: Vec<WagerRow> = report.records.iter().map(WagerRow::from).collect();
    print_items(&rows, mode)?;
    for failure in &report.failures {
        eprintln!(
            "\x1b[31mblock {}: {}\x1b[0m\n  {}",
            failure.index,
            failure.error,
            failure.excerpt.replace('\n', "\n  ")
        );
    }
    println!(
        "parsed: {}  warned: {}  failed: {}  (new: {})",
        report.parsed, report.warned, report.failed, added
    );
    Ok(())
}

pub async fn run_settle(
    wagers: &Path,
    results: &Path,
    ids: Vec<String>,
    config: &AppConfig,
    mode: OutputMode,
) -> Result<()> {
    let store = Arc::new(InMemoryWagerStore::load_json(wagers).await?);
    let snapshot = SnapshotResultsProvider::load(results).await?;
    let provider = Arc::new(ThrottledProvider::from_config(snapshot, &config.settlement));
    let tracker = LegSettlementTracker::new(
        store.clone(),
        provider,
        SettlementOptions::from(&config.settlement),
    );

    let outcomes = if ids.is_empty() {
        tracker.settle_pending().await?
    } else {
        tracker.settle_many(ids).await
    };

    let mut rows = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        match outcome {
            Ok(report) => rows.push(SettlementRow::from(&report)),
            Err(e) => eprintln!("\x1b[31m{}\x1b[0m", e),
        }
    }
    store.save_json(wagers).await?;
    print_items(&rows, mode)
}

pub async fn run_round_robin(wagers: &Path, id: &str, mode: OutputMode) -> Result<()> {
    let store = InMemoryWagerStore::load_json(wagers).await?;
    let record = store
        .get(id)
        .await?
        .ok_or_else(|| WagerError::WagerNotFound(id.to_string()))?;
    if record.wager_type != WagerType::RoundRobin {
        return Err(WagerError::Validation(format!(
            "wager {} is a {}, not a round robin",
            id, record.wager_type
        )));
    }
    let label = record
        .round_robin
        .ok_or_else(|| WagerError::Validation(format!("wager {} has no round robin label", id)))?;
    let breakdown = RoundRobinBreakdown::build(label, record.stake, &record.leg_details)?;

    if mode == OutputMode::Json {
        println!("{}", serde_json::to_string_pretty(&breakdown)?);
        return Ok(());
    }

    for (i, leg) in breakdown.legs.iter().enumerate() {
        println!("  {}. {} [{}]", i + 1, leg.description, leg.status);
    }
    let rows: Vec<ParlayRow> = breakdown
        .parlays
        .iter()
        .map(|p| ParlayRow {
            legs: p
                .leg_indices
                .iter()
                .map(|i| (i + 1).to_string())
                .collect::<Vec<_>>()
                .join("+"),
            odds: p.odds,
            stake: p.stake.round_dp(2).to_string(),
            win: p.potential_win.round_dp(2).to_string(),
            status: p.status.to_string(),
        })
        .collect();
    print_items(&rows, mode)?;
    println!(
        "{}/{} round robin, {} parlays at {} each",
        breakdown.parlay_size,
        breakdown.total_legs,
        breakdown.parlays.len(),
        breakdown.stake_per_parlay.round_dp(2)
    );
    match breakdown.settled_profit() {
        Some(profit) => println!("profit: {}", profit.round_dp(2)),
        None => println!("profit: pending"),
    }
    Ok(())
}

pub fn run_odds(stake: Decimal, win: Decimal, mode: OutputMode) -> Result<()> {
    let odds = american_odds(stake, win);
    let decimal = american_to_decimal(odds);
    match mode {
        OutputMode::Json => println!(
            "{}",
            serde_json::json!({ "american": odds, "decimal": decimal.round_dp(4) })
        ),
        OutputMode::Table => println!("{:+}  ({})", odds, decimal.round_dp(4)),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["wagerbook", "odds", "--stake", "151", "--win", "70"]).unwrap();
        assert!(matches!(cli.command, Commands::Odds { .. }));
        assert_eq!(cli.config, "config");

        let cli = Cli::try_parse_from([
            "wagerbook",
            "settle",
            "--results",
            "results.json",
            "--id",
            "a",
            "--id",
            "b",
            "--json",
        ])
        .unwrap();
        assert!(cli.json);
        match cli.command {
            Commands::Settle { ids, wagers, .. } => {
                assert_eq!(ids, vec!["a".to_string(), "b".to_string()]);
                assert_eq!(wagers, PathBuf::from("wagers.json"));
            }
            _ => panic!("expected settle"),
        }
    }

    #[test]
    fn test_wager_row_joins_warnings() {
        let text = "Oct-12-2024\n07:15 PM\t7\tSTRAIGHT BET\n[TBA] [XYZ] - [1] SOMEBODY -150\n$0/$10";
        let options = ImportOptions::with_lookup(crate::parser::SportLookup::builtin().unwrap());
        let report = import_text(text, &options);
        let row = WagerRow::from(&report.records[0]);
        assert!(row.warnings.contains("zero stake"));
        assert!(row.warnings.contains("; "));
    }
}
