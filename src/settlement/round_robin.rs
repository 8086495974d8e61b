//! Round-robin expansion
//!
//! A `k/n Round Robin (m Bets)` ticket is `m` independent k-leg parlays over
//! the same `n` legs, each staked `total / m`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{LegStatus, ParsedLeg, RoundRobinLabel, WagerStatus};
use crate::error::{Result, WagerError};
use crate::parser::odds::{american_odds, american_to_decimal};

/// C(n, k); zero when k > n
pub fn binomial(n: usize, k: usize) -> usize {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    let mut acc: u128 = 1;
    for i in 0..k {
        acc = acc * (n - i) as u128 / (i + 1) as u128;
    }
    usize::try_from(acc).unwrap_or(usize::MAX)
}

/// Every k-subset of `0..n` in lexicographic order
pub fn combinations(n: usize, k: usize) -> Vec<Vec<usize>> {
    if k > n {
        return Vec::new();
    }
    let mut out = Vec::with_capacity(binomial(n, k));
    let mut current: Vec<usize> = (0..k).collect();
    loop {
        out.push(current.clone());
        // rightmost position that can still move right
        let Some(pos) = (0..k).rev().find(|&i| current[i] != i + n - k) else {
            return out;
        };
        current[pos] += 1;
        for j in pos + 1..k {
            current[j] = current[j - 1] + 1;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundRobinLeg {
    pub description: String,
    pub odds: i32,
    pub status: LegStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComboParlay {
    pub leg_indices: Vec<usize>,
    pub decimal_odds: Decimal,
    /// American equivalent of `decimal_odds`
    pub odds: i32,
    pub stake: Decimal,
    pub potential_win: Decimal,
    pub status: WagerStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundRobinBreakdown {
    pub parlay_size: usize,
    pub total_legs: usize,
    pub total_parlays: usize,
    pub total_stake: Decimal,
    pub stake_per_parlay: Decimal,
    pub legs: Vec<RoundRobinLeg>,
    pub parlays: Vec<ComboParlay>,
}

impl RoundRobinBreakdown {
    /// Expand `label` over `legs`. The stake split follows the label's bet
    /// count; combinations always come from the legs actually present.
    pub fn build(label: RoundRobinLabel, total_stake: Decimal, legs: &[ParsedLeg]) -> Result<Self> {
        if label.total_parlays == 0 {
            return Err(WagerError::Validation(
                "round robin label has zero bets".to_string(),
            ));
        }
        if label.parlay_size == 0 || label.parlay_size > legs.len() {
            return Err(WagerError::Validation(format!(
                "cannot build {}-leg parlays from {} legs",
                label.parlay_size,
                legs.len()
            )));
        }

        let rr_legs = legs
            .iter()
            .enumerate()
            .map(|(i, leg)| {
                let odds = leg.odds.ok_or_else(|| {
                    WagerError::Validation(format!("round robin leg {} has no odds", i))
                })?;
                Ok(RoundRobinLeg {
                    description: leg.raw_description.clone(),
                    odds,
                    status: leg.status,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let stake_per_parlay = total_stake / Decimal::from(label.total_parlays);
        let parlays = combinations(rr_legs.len(), label.parlay_size)
            .into_iter()
            .map(|indices| combo(&rr_legs, indices, stake_per_parlay))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            parlay_size: label.parlay_size,
            total_legs: rr_legs.len(),
            total_parlays: label.total_parlays,
            total_stake,
            stake_per_parlay,
            legs: rr_legs,
            parlays,
        })
    }

    pub fn all_legs_terminal(&self) -> bool {
        self.legs.iter().all(|l| l.status.is_terminal())
    }

    /// Σ(stake + win over won parlays) − total stake
    pub fn total_profit(&self) -> Decimal {
        let returned: Decimal = self
            .parlays
            .iter()
            .filter(|p| p.status == WagerStatus::Won)
            .map(|p| p.stake + p.potential_win)
            .sum();
        returned - self.total_stake
    }

    /// Profit once every leg is won or lost
    pub fn settled_profit(&self) -> Option<Decimal> {
        self.all_legs_terminal().then(|| self.total_profit())
    }

    /// Update one leg's status and recompute the combinations
    pub fn set_leg_status(&mut self, index: usize, status: LegStatus) {
        if let Some(leg) = self.legs.get_mut(index) {
            leg.status = status;
        }
        for parlay in &mut self.parlays {
            parlay.status = combo_status(&self.legs, &parlay.leg_indices);
        }
    }
}

fn combo(legs: &[RoundRobinLeg], indices: Vec<usize>, stake: Decimal) -> Result<ComboParlay> {
    let overflow = || WagerError::Validation(format!("parlay {:?} price overflows", indices));
    let decimal_odds = indices
        .iter()
        .try_fold(Decimal::ONE, |acc, &i| {
            acc.checked_mul(american_to_decimal(legs[i].odds))
        })
        .ok_or_else(overflow)?;
    let potential_win = stake
        .checked_mul(decimal_odds)
        .ok_or_else(overflow)?
        - stake;
    Ok(ComboParlay {
        status: combo_status(legs, &indices),
        odds: american_odds(Decimal::ONE, decimal_odds - Decimal::ONE),
        leg_indices: indices,
        decimal_odds,
        stake,
        potential_win,
    })
}

/// Lost if any leg lost, won if all won, pending otherwise (pushes included)
fn combo_status(legs: &[RoundRobinLeg], indices: &[usize]) -> WagerStatus {
    let statuses = indices.iter().map(|&i| legs[i].status);
    if statuses.clone().any(|s| s == LegStatus::Lost) {
        WagerStatus::Lost
    } else if statuses.clone().all(|s| s == LegStatus::Won) {
        WagerStatus::Won
    } else {
        WagerStatus::Pending
    }
}
