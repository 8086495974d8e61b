//! Leg grading from final numbers
//!
//! Landing exactly on the line is a push everywhere.

use rust_decimal::Decimal;
use std::cmp::Ordering;

use crate::domain::{LegStatus, OverUnder};

/// Stat key the provider uses for a team's final score
pub const POINTS: &str = "points";

fn from_ordering(ord: Ordering) -> LegStatus {
    match ord {
        Ordering::Greater => LegStatus::Won,
        Ordering::Less => LegStatus::Lost,
        Ordering::Equal => LegStatus::Push,
    }
}

pub fn grade_moneyline(own: Decimal, opponent: Decimal) -> LegStatus {
    from_ordering(own.cmp(&opponent))
}

/// `line` is already teaser-adjusted
pub fn grade_spread(own: Decimal, opponent: Decimal, line: Decimal) -> LegStatus {
    from_ordering((own + line).cmp(&opponent))
}

pub fn grade_over_under(value: Decimal, line: Decimal, side: OverUnder) -> LegStatus {
    let ord = value.cmp(&line);
    from_ordering(match side {
        OverUnder::Over => ord,
        OverUnder::Under => ord.reverse(),
    })
}

pub fn grade_total(first: Decimal, second: Decimal, line: Decimal, side: OverUnder) -> LegStatus {
    grade_over_under(first + second, line, side)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_moneyline() {
        assert_eq!(grade_moneyline(dec!(27), dec!(20)), LegStatus::Won);
        assert_eq!(grade_moneyline(dec!(17), dec!(24)), LegStatus::Lost);
        assert_eq!(grade_moneyline(dec!(1), dec!(1)), LegStatus::Push);
    }

    #[test]
    fn test_spread() {
        // favorite -7.5 winning by 7 loses
        assert_eq!(grade_spread(dec!(27), dec!(20), dec!(-7.5)), LegStatus::Lost);
        assert_eq!(grade_spread(dec!(28), dec!(20), dec!(-7.5)), LegStatus::Won);
        // teased dog +9 losing by 9 pushes
        assert_eq!(grade_spread(dec!(11), dec!(20), dec!(9)), LegStatus::Push);
    }

    #[test]
    fn test_totals_and_props() {
        assert_eq!(
            grade_total(dec!(27), dec!(20), dec!(45.5), OverUnder::Over),
            LegStatus::Won
        );
        assert_eq!(
            grade_total(dec!(27), dec!(20), dec!(45.5), OverUnder::Under),
            LegStatus::Lost
        );
        assert_eq!(
            grade_over_under(dec!(65), dec!(65), OverUnder::Over),
            LegStatus::Push
        );
        assert_eq!(
            grade_over_under(dec!(72), dec!(65.5), OverUnder::Under),
            LegStatus::Lost
        );
    }
}
