//! Odds and status derivation
//!
//! American odds are derived from the stake/win pair printed under every
//! ticket rather than from the line odds, so free plays and boosted tickets
//! come out with the price the bettor actually got.

use regex::Regex;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::sync::LazyLock;

use crate::domain::WagerStatus;

static RE_BRACKET_STATUS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\[\s*(won|lost|pending)\s*\]").unwrap());
static RE_WORD_STATUS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(won|lost|pending)\b").unwrap());
static RE_STAKE_WIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\s*([\d,]+(?:\.\d+)?)\s*/\s*\$\s*([\d,]+(?:\.\d+)?)").unwrap()
});

/// American odds from stake and potential win.
///
/// `r = win / stake`; `r >= 1` gives `round(r * 100)`, otherwise
/// `round(-100 / r)`. A zero stake (free play) or zero win yields 0, as
/// does a pair whose price falls outside the Decimal or i32 range.
pub fn american_odds(stake: Decimal, win: Decimal) -> i32 {
    if stake <= Decimal::ZERO || win <= Decimal::ZERO {
        return 0;
    }
    let odds = win.checked_div(stake).and_then(|ratio| {
        if ratio >= Decimal::ONE {
            ratio.checked_mul(Decimal::ONE_HUNDRED)
        } else {
            Decimal::ONE_HUNDRED.checked_div(ratio).map(|o| -o)
        }
    });
    odds.and_then(|o| {
        o.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i32()
    })
    .unwrap_or(0)
}

/// Inverse of [`american_odds`]: profit on `stake` at `odds`
pub fn potential_win(stake: Decimal, odds: i32) -> Decimal {
    let odds_dec = Decimal::from(odds);
    if odds > 0 {
        stake * odds_dec / Decimal::ONE_HUNDRED
    } else if odds < 0 {
        stake * Decimal::ONE_HUNDRED / odds_dec.abs()
    } else {
        Decimal::ZERO
    }
}

/// Decimal odds (stake-inclusive multiplier). Zero odds map to 1.
pub fn american_to_decimal(odds: i32) -> Decimal {
    let odds_dec = Decimal::from(odds);
    if odds > 0 {
        Decimal::ONE + odds_dec / Decimal::ONE_HUNDRED
    } else if odds < 0 {
        Decimal::ONE + Decimal::ONE_HUNDRED / odds_dec.abs()
    } else {
        Decimal::ONE
    }
}

/// Parse the `$stake/$win` line of a block
pub fn parse_stake_and_win(block: &str) -> Option<(Decimal, Decimal)> {
    let caps = RE_STAKE_WIN.captures(block)?;
    let stake = parse_money(&caps[1])?;
    let win = parse_money(&caps[2])?;
    Some((stake, win))
}

fn parse_money(raw: &str) -> Option<Decimal> {
    raw.replace(',', "").parse::<Decimal>().ok()
}

/// Status of a single-leg wager.
///
/// Bracketed tags win, then a line holding only the status word, then a
/// whole-word scan of the block. In the scan a "won" is ignored when the
/// block mentions "winner" and a "lost" is ignored when it mentions "loss".
pub fn single_leg_status(block: &str) -> WagerStatus {
    if let Some(caps) = RE_BRACKET_STATUS.captures_iter(block).last() {
        if let Some(status) = status_word(&caps[1]) {
            return status;
        }
    }
    if let Some(status) = standalone_status_line(block) {
        return status;
    }
    scan_status_words(block).unwrap_or(WagerStatus::Pending)
}

/// Status of a multi-leg wager: only text after the final leg's closing
/// bracket counts, so per-leg tags never decide the overall result.
pub fn multi_leg_status(block: &str) -> WagerStatus {
    let tail = match block.rfind(']') {
        Some(pos) => &block[pos + 1..],
        None => block,
    };
    standalone_status_line(tail)
        .or_else(|| scan_status_words(tail))
        .unwrap_or(WagerStatus::Pending)
}

fn status_word(word: &str) -> Option<WagerStatus> {
    match word.to_ascii_lowercase().as_str() {
        "won" => Some(WagerStatus::Won),
        "lost" => Some(WagerStatus::Lost),
        "pending" => Some(WagerStatus::Pending),
        _ => None,
    }
}

fn standalone_status_line(text: &str) -> Option<WagerStatus> {
    text.lines().rev().find_map(|line| status_word(line.trim()))
}

fn scan_status_words(text: &str) -> Option<WagerStatus> {
    let lower = text.to_lowercase();
    let mut found_won = false;
    let mut found_lost = false;
    let mut found_pending = false;
    for caps in RE_WORD_STATUS.captures_iter(&lower) {
        match &caps[1] {
            "won" => found_won = true,
            "lost" => found_lost = true,
            _ => found_pending = true,
        }
    }

    if found_won && !lower.contains("winner") {
        return Some(WagerStatus::Won);
    }
    if found_lost && !lower.contains("loss") {
        return Some(WagerStatus::Lost);
    }
    if found_pending {
        return Some(WagerStatus::Pending);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_american_odds_favorite() {
        // r = 70 / 151 = 0.4636 -> -100 / r = -215.7
        assert_eq!(american_odds(dec!(151), dec!(70)), -216);
        assert_eq!(american_odds(dec!(110), dec!(100)), -110);
    }

    #[test]
    fn test_american_odds_underdog() {
        assert_eq!(american_odds(dec!(100), dec!(135)), 135);
        assert_eq!(american_odds(dec!(50), dec!(300)), 600);
        assert_eq!(american_odds(dec!(20), dec!(20)), 100);
    }

    #[test]
    fn test_american_odds_degenerate() {
        assert_eq!(american_odds(dec!(0), dec!(50)), 0);
        assert_eq!(american_odds(dec!(25), dec!(0)), 0);
    }

    #[test]
    fn test_american_odds_out_of_range_is_zero() {
        // 5e28 fits a Decimal but 5e30 does not
        assert_eq!(american_odds(dec!(0.0000000000000000000000000001), dec!(5)), 0);
        assert_eq!(american_odds(dec!(5), dec!(0.0000000000000000000000000001)), 0);
        // representable, but past i32
        assert_eq!(american_odds(dec!(1), dec!(100000000)), 0);
    }

    #[test]
    fn test_american_odds_inverse_within_one() {
        let stakes = [dec!(1), dec!(5), dec!(10), dec!(37.5), dec!(151), dec!(1000)];
        let wins = [
            dec!(0),
            dec!(0.91),
            dec!(3),
            dec!(9.09),
            dec!(12.5),
            dec!(70),
            dec!(100),
            dec!(455),
            dec!(2500),
        ];
        for stake in stakes {
            for win in wins {
                let odds = american_odds(stake, win);
                let back = american_odds(stake, potential_win(stake, odds));
                assert!(
                    (back - odds).abs() <= 1,
                    "stake={} win={} odds={} back={}",
                    stake,
                    win,
                    odds,
                    back
                );
            }
        }
    }

    #[test]
    fn test_american_to_decimal() {
        assert_eq!(american_to_decimal(150), dec!(2.5));
        assert_eq!(american_to_decimal(-200), dec!(1.5));
        assert_eq!(american_to_decimal(0), Decimal::ONE);
    }

    #[test]
    fn test_parse_stake_and_win() {
        assert_eq!(
            parse_stake_and_win("Pending\n$151/$70"),
            Some((dec!(151), dec!(70)))
        );
        assert_eq!(
            parse_stake_and_win("$1,000.00/$909.09"),
            Some((dec!(1000.00), dec!(909.09)))
        );
        assert_eq!(parse_stake_and_win("no money here"), None);
    }

    #[test]
    fn test_single_leg_status_winner_market_with_bracket_tag() {
        let block = "[Oct-12-2024 08:00 PM] [SOC] - [88] Winner (2 way) / ARSENAL -163 [Won]\nWon\n$163/$100";
        assert_eq!(single_leg_status(block), WagerStatus::Won);
    }

    #[test]
    fn test_single_leg_status_exclusions_in_text_scan() {
        // "won" buried in text is void when the block names a Winner market
        assert_eq!(
            single_leg_status("Match Winner pick, bettor won big"),
            WagerStatus::Pending
        );
        assert_eq!(
            single_leg_status("Stop loss order, lost ticket"),
            WagerStatus::Pending
        );
        assert_eq!(single_leg_status("this ticket lost"), WagerStatus::Lost);
    }

    #[test]
    fn test_single_leg_status_standalone_line() {
        assert_eq!(
            single_leg_status("[Oct-12-2024] [NFL] - [1] CHIEFS -150\nLost\n$150/$100"),
            WagerStatus::Lost
        );
        assert_eq!(single_leg_status("nothing here"), WagerStatus::Pending);
    }

    #[test]
    fn test_multi_leg_status_ignores_leg_tags() {
        let block = "PARLAY\n[Oct-13-2024 01:00 PM] [NFL] - [1] CHIEFS -150 [Won]\n[Oct-13-2024 04:00 PM] [NFL] - [2] BEARS +120 [Lost]\n$10/$25";
        assert_eq!(multi_leg_status(block), WagerStatus::Pending);
    }

    #[test]
    fn test_multi_leg_status_reads_tail() {
        let block = "[Oct-13-2024 01:00 PM] [NFL] - [1] CHIEFS -150 [Won]\n[Oct-13-2024 04:00 PM] [NFL] - [2] BEARS +120 [Won]\nWon\n$10/$25";
        assert_eq!(multi_leg_status(block), WagerStatus::Won);
    }
}
