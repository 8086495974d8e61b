//! Leg settlement tracker
//!
//! A wager moves from unresolved to resolved only when every leg has been
//! graded won or lost. Anything the tracker cannot verify (missing event,
//! sport without a results feed, push, provider failure) aborts the run and
//! leaves the stored wager exactly as it was.

use chrono::{Duration, NaiveDate};
use futures::stream::{self, StreamExt};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::grading::{grade_moneyline, grade_over_under, grade_spread, grade_total, POINTS};
use super::lease::WagerLeases;
use super::provider::{EventHandle, GameResultsProvider};
use super::round_robin::RoundRobinBreakdown;
use crate::adapters::wager_store::WagerStore;
use crate::config::SettlementConfig;
use crate::domain::{BetKind, LegStatus, ParsedLeg, SettlementDecision, WagerRecord, WagerType};
use crate::error::{Result, SettlementAbort, WagerError};
use crate::parser::parse_canonical_leg;

#[derive(Debug, Clone)]
pub struct SettlementOptions {
    pub trust_book_leg_status: bool,
    pub event_window_days: i64,
    pub max_concurrent_wagers: usize,
}

impl Default for SettlementOptions {
    fn default() -> Self {
        Self::from(&SettlementConfig::default())
    }
}

impl From<&SettlementConfig> for SettlementOptions {
    fn from(config: &SettlementConfig) -> Self {
        Self {
            trust_book_leg_status: config.trust_book_leg_status,
            event_window_days: config.event_window_days.max(0),
            max_concurrent_wagers: config.max_concurrent_wagers.max(1),
        }
    }
}

/// Outcome of one `settle` call
#[derive(Debug, Clone, PartialEq)]
pub struct SettlementReport {
    pub wager_id: String,
    pub decision: SettlementDecision,
    /// Why the run stopped early, if it did
    pub abort: Option<SettlementAbort>,
    /// True only on the run that wrote the terminal result
    pub changed: bool,
}

impl SettlementReport {
    fn unchanged(wager_id: &str, decision: SettlementDecision) -> Self {
        Self {
            wager_id: wager_id.to_string(),
            decision,
            abort: None,
            changed: false,
        }
    }

    fn aborted(wager_id: &str, abort: SettlementAbort) -> Self {
        Self {
            wager_id: wager_id.to_string(),
            decision: SettlementDecision::Unresolved,
            abort: Some(abort),
            changed: false,
        }
    }
}

pub struct LegSettlementTracker<S, P> {
    store: Arc<S>,
    provider: Arc<P>,
    leases: WagerLeases,
    options: SettlementOptions,
}

impl<S, P> LegSettlementTracker<S, P>
where
    S: WagerStore,
    P: GameResultsProvider,
{
    pub fn new(store: Arc<S>, provider: Arc<P>, options: SettlementOptions) -> Self {
        Self {
            store,
            provider,
            leases: WagerLeases::new(),
            options,
        }
    }

    /// Settle one wager. Re-running on a terminal wager is a no-op.
    pub async fn settle(&self, wager_id: &str) -> Result<SettlementReport> {
        let lease = self.leases.acquire(wager_id).await;
        let report = self.settle_leased(wager_id).await;
        self.leases.release(lease);
        report
    }

    async fn settle_leased(&self, wager_id: &str) -> Result<SettlementReport> {
        let mut record = self
            .store
            .get(wager_id)
            .await?
            .ok_or_else(|| WagerError::WagerNotFound(wager_id.to_string()))?;

        if record.is_terminal() {
            debug!(wager_id, status = %record.status, "already settled");
            return Ok(SettlementReport::unchanged(
                wager_id,
                SettlementDecision::from(record.status),
            ));
        }

        let legs = match settlement_legs(&record) {
            Ok(legs) => legs,
            Err(abort) => return Ok(self.abort(wager_id, abort)),
        };
        let breakdown = match round_robin_breakdown(&record, &legs) {
            Ok(breakdown) => breakdown,
            Err(abort) => return Ok(self.abort(wager_id, abort)),
        };

        let mut statuses = Vec::with_capacity(legs.len());
        for (index, leg) in legs.iter().enumerate() {
            match self.resolve_leg(index, leg, &record).await {
                Ok(status) => statuses.push(status),
                Err(abort) => return Ok(self.abort(wager_id, abort)),
            }
        }

        if statuses.iter().any(|s| !s.is_terminal()) {
            debug!(wager_id, "legs still pending");
            return Ok(SettlementReport::unchanged(
                wager_id,
                SettlementDecision::Unresolved,
            ));
        }

        let (decision, profit) = match aggregate(&record, breakdown, &statuses) {
            Ok(result) => result,
            Err(abort) => return Ok(self.abort(wager_id, abort)),
        };

        let changed = record.apply_settlement(decision, profit);
        if changed {
            self.store.save(record).await?;
            info!(wager_id, decision = %decision, profit = %profit, "wager settled");
        }
        Ok(SettlementReport {
            wager_id: wager_id.to_string(),
            decision,
            abort: None,
            changed,
        })
    }

    /// Settle several wagers, at most `max_concurrent_wagers` at a time
    pub async fn settle_many(&self, wager_ids: Vec<String>) -> Vec<Result<SettlementReport>> {
        stream::iter(wager_ids)
            .map(|id| async move { self.settle(&id).await })
            .buffer_unordered(self.options.max_concurrent_wagers)
            .collect()
            .await
    }

    pub async fn settle_pending(&self) -> Result<Vec<Result<SettlementReport>>> {
        let ids = self.store.pending_ids().await?;
        info!(count = ids.len(), "settling pending wagers");
        Ok(self.settle_many(ids).await)
    }

    fn abort(&self, wager_id: &str, abort: SettlementAbort) -> SettlementReport {
        warn!(wager_id, reason = %abort, "settlement aborted");
        SettlementReport::aborted(wager_id, abort)
    }

    async fn resolve_leg(
        &self,
        index: usize,
        leg: &ParsedLeg,
        record: &WagerRecord,
    ) -> std::result::Result<LegStatus, SettlementAbort> {
        if leg.status == LegStatus::Push {
            return Err(SettlementAbort::Push { leg: index });
        }
        if self.options.trust_book_leg_status && leg.status.is_terminal() {
            return Ok(leg.status);
        }
        if !leg.sport.has_results_feed() {
            return Err(SettlementAbort::UnsupportedSport {
                leg: index,
                sport: leg.sport.to_string(),
            });
        }

        let date = leg
            .game_date
            .or(record.game_start)
            .or(record.placed_at)
            .map(|dt| dt.date())
            .ok_or_else(|| SettlementAbort::Ungradable {
                leg: index,
                reason: "no game date".to_string(),
            })?;

        let event = self
            .find_event(index, leg, date)
            .await?
            .ok_or_else(|| SettlementAbort::EventNotFound {
                leg: index,
                participant: leg.participant.clone(),
            })?;

        let complete = self
            .provider
            .is_complete(&event)
            .await
            .map_err(|e| SettlementAbort::from_provider_error(index, e))?;
        if !complete {
            debug!(wager_id = %record.id, leg = index, event = %event.id, "event not final");
            return Ok(LegStatus::Pending);
        }

        let status = self.grade(index, leg, &event).await?;
        debug!(wager_id = %record.id, leg = index, status = %status, "leg graded");
        if status == LegStatus::Push {
            return Err(SettlementAbort::Push { leg: index });
        }
        Ok(status)
    }

    /// Search the leg date first, then widen one day at a time
    async fn find_event(
        &self,
        index: usize,
        leg: &ParsedLeg,
        date: NaiveDate,
    ) -> std::result::Result<Option<EventHandle>, SettlementAbort> {
        for day in search_dates(date, self.options.event_window_days) {
            let found = self
                .provider
                .find_event(leg.sport, &leg.participant, day)
                .await
                .map_err(|e| SettlementAbort::from_provider_error(index, e))?;
            if found.is_some() {
                return Ok(found);
            }
        }
        Ok(None)
    }

    async fn grade(
        &self,
        index: usize,
        leg: &ParsedLeg,
        event: &EventHandle,
    ) -> std::result::Result<LegStatus, SettlementAbort> {
        let ungradable = |reason: &str| SettlementAbort::Ungradable {
            leg: index,
            reason: reason.to_string(),
        };

        match leg.bet_kind {
            BetKind::Moneyline | BetKind::Spread => {
                let opponent = event
                    .opponent_of(&leg.participant)
                    .ok_or_else(|| ungradable("participant is not a side of the event"))?;
                let own = self.stat(index, event, &leg.participant, POINTS).await?;
                let theirs = self.stat(index, event, opponent, POINTS).await?;
                if leg.bet_kind == BetKind::Moneyline {
                    Ok(grade_moneyline(own, theirs))
                } else {
                    let line = leg.line.ok_or_else(|| ungradable("spread without a line"))?;
                    Ok(grade_spread(own, theirs, line))
                }
            }
            BetKind::Total => {
                let line = leg.line.ok_or_else(|| ungradable("total without a line"))?;
                let side = leg
                    .over_under
                    .ok_or_else(|| ungradable("total without over/under"))?;
                let home = self.stat(index, event, &event.home, POINTS).await?;
                let away = self.stat(index, event, &event.away, POINTS).await?;
                Ok(grade_total(home, away, line, side))
            }
            BetKind::PlayerProp => {
                let prop = leg
                    .prop
                    .as_ref()
                    .ok_or_else(|| ungradable("player prop without prop fields"))?;
                let value = self.stat(index, event, &prop.player, &prop.market).await?;
                Ok(grade_over_under(value, prop.line, prop.over_under))
            }
            BetKind::Unknown => Err(ungradable("unrecognised selection")),
        }
    }

    async fn stat(
        &self,
        index: usize,
        event: &EventHandle,
        participant: &str,
        stat: &str,
    ) -> std::result::Result<Decimal, SettlementAbort> {
        self.provider
            .stat_value(event, participant, stat)
            .await
            .map_err(|e| SettlementAbort::from_provider_error(index, e))?
            .ok_or_else(|| SettlementAbort::Ungradable {
                leg: index,
                reason: format!("no {} for {}", stat, participant),
            })
    }
}

/// Structured legs when present, otherwise re-derived from the leg strings
fn settlement_legs(record: &WagerRecord) -> std::result::Result<Vec<ParsedLeg>, SettlementAbort> {
    if !record.leg_details.is_empty() {
        return Ok(record.leg_details.clone());
    }
    if record.legs.is_empty() {
        return Err(SettlementAbort::NoLegs);
    }
    record
        .legs
        .iter()
        .enumerate()
        .map(|(index, raw)| {
            parse_canonical_leg(raw).ok_or_else(|| SettlementAbort::Ungradable {
                leg: index,
                reason: "leg string not in canonical form".to_string(),
            })
        })
        .collect()
}

/// Round robins are expanded before any provider call, so a ticket that
/// cannot be priced aborts without touching the feed
fn round_robin_breakdown(
    record: &WagerRecord,
    legs: &[ParsedLeg],
) -> std::result::Result<Option<RoundRobinBreakdown>, SettlementAbort> {
    if record.wager_type != WagerType::RoundRobin {
        return Ok(None);
    }
    let label = record.round_robin.ok_or_else(|| SettlementAbort::InvalidWager {
        reason: "round robin without a label".to_string(),
    })?;
    if let Some(index) = legs.iter().position(|leg| leg.odds.is_none()) {
        return Err(SettlementAbort::Ungradable {
            leg: index,
            reason: "round robin leg without odds".to_string(),
        });
    }
    RoundRobinBreakdown::build(label, record.stake, legs)
        .map(Some)
        .map_err(|e| SettlementAbort::InvalidWager {
            reason: e.to_string(),
        })
}

/// Decision and profit once every leg is won or lost
fn aggregate(
    record: &WagerRecord,
    breakdown: Option<RoundRobinBreakdown>,
    statuses: &[LegStatus],
) -> std::result::Result<(SettlementDecision, Decimal), SettlementAbort> {
    if let Some(mut breakdown) = breakdown {
        for (index, status) in statuses.iter().enumerate() {
            breakdown.set_leg_status(index, *status);
        }
        let profit = breakdown
            .settled_profit()
            .ok_or_else(|| SettlementAbort::InvalidWager {
                reason: "round robin legs not terminal".to_string(),
            })?;
        let decision = if profit > Decimal::ZERO {
            SettlementDecision::Won
        } else {
            SettlementDecision::Lost
        };
        return Ok((decision, profit));
    }

    if statuses.contains(&LegStatus::Lost) {
        Ok((SettlementDecision::Lost, -record.stake))
    } else {
        Ok((SettlementDecision::Won, record.potential_win))
    }
}

fn search_dates(date: NaiveDate, window_days: i64) -> Vec<NaiveDate> {
    let mut dates = vec![date];
    for offset in 1..=window_days {
        dates.push(date - Duration::days(offset));
        dates.push(date + Duration::days(offset));
    }
    dates
}
