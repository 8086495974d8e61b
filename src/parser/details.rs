//! Selection grammar shared by straight, live, and leg lines
//!
//! DETAILS is whatever follows `[LINE#]` on a bet line, e.g.
//! `KANSAS CITY CHIEFS -7½ (B+6) -110 [Won] (Score: 27-20)`.

use regex::Regex;
use rust_decimal::Decimal;
use std::sync::LazyLock;

use crate::domain::{BetKind, LegStatus, OverUnder, Score};

static RE_STATUS_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\[\s*(won|lost|pending|push|tie)\s*\]").unwrap());
static RE_SCORE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\(\s*score:\s*(\d+)\s*-\s*(\d+)\s*\)").unwrap());
static RE_MATCHUP_PARENS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\(\s*(?P<a>[^()]+?)\s+(?i:vrs|vs\.?)\s+(?P<b>[^()]+?)\s*\)").unwrap()
});
static RE_VS_SPLIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+(?i:vrs|vs\.?)\s+").unwrap());
static RE_SPREAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<sel>.+?)\s+(?P<line>[+-]\d{1,2}(?:\.5|½)?|[+-]½)\s*(?:\(\s*B\s*(?P<teaser>[+-]\s*\d+(?:\.5|½)?)\s*\)\s*)?(?P<odds>[+-]\d{3,})\b",
    )
    .unwrap()
});
static RE_TOTAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<sel>.*?)\s*\b(?P<ou>(?i:over|under))\s+(?P<line>\d+(?:\.\d+)?½?|½)\s*(?:\(\s*B\s*(?P<teaser>[+-]\s*\d+(?:\.5|½)?)\s*\)\s*)?(?P<odds>[+-]\d{3,})?",
    )
    .unwrap()
});
static RE_MONEYLINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<sel>.+?)\s+(?P<odds>[+-]\d{3,})\s*$").unwrap());

/// Largest magnitude still read as a point spread
const MAX_SPREAD: i64 = 20;

const MARKET_WORDS: [&str; 7] = [
    "winner",
    "moneyline",
    "money line",
    "spread",
    "handicap",
    "total",
    "match",
];

/// Result of reading one DETAILS string
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub participant: String,
    /// Market prefix such as `Winner (2 way)`
    pub market: Option<String>,
    pub matchup: Option<String>,
    pub bet_kind: BetKind,
    /// Line after the teaser adjustment has been applied
    pub line: Option<Decimal>,
    pub odds: Option<i32>,
    pub over_under: Option<OverUnder>,
    pub teaser_adjustment: Option<Decimal>,
    /// Cleaned details text the selection was read from
    pub text: String,
}

impl Selection {
    /// Canonical one-line rendering with the adjusted line
    pub fn render(&self) -> String {
        let mut out = match self.bet_kind {
            BetKind::Spread => format!(
                "{} {} {}",
                self.participant,
                format_signed(self.line.unwrap_or_default()),
                format_odds(self.odds)
            ),
            BetKind::Total => {
                let side = self
                    .over_under
                    .map(|ou| ou.to_string())
                    .unwrap_or_default();
                format!(
                    "{} {} {} {}",
                    self.participant,
                    side,
                    self.line.unwrap_or_default().normalize(),
                    format_odds(self.odds)
                )
            }
            BetKind::Moneyline => format!("{} {}", self.participant, format_odds(self.odds)),
            BetKind::PlayerProp | BetKind::Unknown => self.text.clone(),
        };
        if let (Some(matchup), BetKind::Spread | BetKind::Total | BetKind::Moneyline) =
            (&self.matchup, self.bet_kind)
        {
            out.push_str(&format!(" ({})", matchup));
        }
        out.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

/// Trailing `[Status]` and `(Score: A-B)` pulled off a bet line
#[derive(Debug, Clone, PartialEq)]
pub struct Trailer {
    pub text: String,
    pub status: Option<LegStatus>,
    pub score: Option<Score>,
}

pub fn strip_trailer(raw: &str) -> Trailer {
    let status = RE_STATUS_TAG
        .captures_iter(raw)
        .last()
        .and_then(|caps| LegStatus::parse(&caps[1]));
    let score = RE_SCORE.captures(raw).and_then(|caps| {
        Some(Score {
            first: caps[1].parse().ok()?,
            second: caps[2].parse().ok()?,
        })
    });
    let text = RE_STATUS_TAG.replace_all(raw, "");
    let text = RE_SCORE.replace_all(&text, "");
    Trailer {
        text: collapse_ws(&text),
        status,
        score,
    }
}

/// `A vrs B` / `A vs. B` → `A vs B`
pub fn normalize_matchup(raw: &str) -> Option<String> {
    let mut parts = RE_VS_SPLIT.splitn(raw.trim(), 2);
    let first = parts.next()?.trim();
    let second = parts.next()?.trim();
    if first.is_empty() || second.is_empty() {
        return None;
    }
    Some(format!("{} vs {}", first, second))
}

/// Read a DETAILS string: spread, then total, then moneyline
pub fn parse_selection(details: &str) -> Selection {
    let cleaned = strip_trailer(details).text;

    let (without_matchup, matchup) = match RE_MATCHUP_PARENS.captures(&cleaned) {
        Some(caps) => {
            let matchup = format!("{} vs {}", caps["a"].trim(), caps["b"].trim());
            let stripped = RE_MATCHUP_PARENS.replace(&cleaned, "");
            (collapse_ws(&stripped), Some(matchup))
        }
        None => (cleaned.clone(), None),
    };

    let (market, body) = split_market(&without_matchup);

    let mut selection = Selection {
        participant: body.to_string(),
        market,
        matchup,
        bet_kind: BetKind::Unknown,
        line: None,
        odds: None,
        over_under: None,
        teaser_adjustment: None,
        text: cleaned,
    };

    if let Some(caps) = RE_SPREAD.captures(body) {
        let nominal = parse_line_value(&caps["line"]);
        if let Some(nominal) = nominal.filter(|l| l.abs() <= Decimal::from(MAX_SPREAD)) {
            let teaser = caps.name("teaser").and_then(|m| parse_line_value(m.as_str()));
            selection.participant = caps["sel"].trim().to_string();
            selection.bet_kind = BetKind::Spread;
            selection.line = Some(nominal + teaser.unwrap_or_default());
            selection.teaser_adjustment = teaser;
            selection.odds = caps["odds"].parse().ok();
            return selection;
        }
    }

    if let Some(caps) = RE_TOTAL.captures(body) {
        if let Some(nominal) = parse_line_value(&caps["line"]) {
            let teaser = caps.name("teaser").and_then(|m| parse_line_value(m.as_str()));
            selection.participant = caps["sel"].trim().trim_end_matches('-').trim().to_string();
            selection.bet_kind = BetKind::Total;
            selection.over_under = OverUnder::parse(&caps["ou"]);
            selection.line = Some(nominal + teaser.unwrap_or_default());
            selection.teaser_adjustment = teaser;
            selection.odds = caps.name("odds").and_then(|m| m.as_str().parse().ok());
            return selection;
        }
    }

    if let Some(caps) = RE_MONEYLINE.captures(body) {
        if let Ok(odds) = caps["odds"].parse::<i32>() {
            if odds.abs() > 100 {
                selection.participant = caps["sel"].trim().to_string();
                selection.bet_kind = BetKind::Moneyline;
                selection.odds = Some(odds);
                return selection;
            }
        }
    }

    selection
}

/// `-7½`, `+3.5`, `45`, `-½`, `+ 6` → decimal
pub fn parse_line_value(raw: &str) -> Option<Decimal> {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    let (negative, body) = match compact.chars().next()? {
        '-' => (true, &compact[1..]),
        '+' => (false, &compact[1..]),
        _ => (false, compact.as_str()),
    };
    let mut body = body.replace('½', ".5");
    if body.starts_with('.') {
        body.insert(0, '0');
    }
    let value = body.parse::<Decimal>().ok()?;
    Some(if negative { -value } else { value })
}

fn split_market(text: &str) -> (Option<String>, &str) {
    if let Some(pos) = text.rfind(" / ") {
        let prefix = text[..pos].trim();
        let lower = prefix.to_lowercase();
        if prefix.contains('(') || MARKET_WORDS.iter().any(|w| lower.contains(w)) {
            return (Some(prefix.to_string()), text[pos + 3..].trim());
        }
    }
    (None, text.trim())
}

fn format_signed(value: Decimal) -> String {
    let value = value.normalize();
    if value > Decimal::ZERO {
        format!("+{}", value)
    } else {
        value.to_string()
    }
}

fn format_odds(odds: Option<i32>) -> String {
    match odds {
        Some(o) if o > 0 => format!("+{}", o),
        Some(o) => o.to_string(),
        None => String::new(),
    }
}

pub(crate) fn collapse_ws(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_moneyline() {
        let sel = parse_selection("OHIO STATE -215");
        assert_eq!(sel.bet_kind, BetKind::Moneyline);
        assert_eq!(sel.participant, "OHIO STATE");
        assert_eq!(sel.odds, Some(-215));
        assert_eq!(sel.line, None);
    }

    #[test]
    fn test_spread_with_half_glyph() {
        let sel = parse_selection("KANSAS CITY CHIEFS -7½ -110 [Won] (Score: 27-20)");
        assert_eq!(sel.bet_kind, BetKind::Spread);
        assert_eq!(sel.participant, "KANSAS CITY CHIEFS");
        assert_eq!(sel.line, Some(dec!(-7.5)));
        assert_eq!(sel.odds, Some(-110));
        assert_eq!(sel.render(), "KANSAS CITY CHIEFS -7.5 -110");
    }

    #[test]
    fn test_spread_teaser_adjustment_applied() {
        let sel = parse_selection("KANSAS CITY CHIEFS -7½ (B+6) -110");
        assert_eq!(sel.line, Some(dec!(-1.5)));
        assert_eq!(sel.teaser_adjustment, Some(dec!(6)));

        let dog = parse_selection("DENVER BRONCOS +3 (B+6) -120");
        assert_eq!(dog.line, Some(dec!(9)));
        assert_eq!(dog.render(), "DENVER BRONCOS +9 -120");
    }

    #[test]
    fn test_total_over_under() {
        let sel = parse_selection("CHIEFS/RAVENS Over 45½ -110");
        assert_eq!(sel.bet_kind, BetKind::Total);
        assert_eq!(sel.over_under, Some(OverUnder::Over));
        assert_eq!(sel.line, Some(dec!(45.5)));
        assert_eq!(sel.participant, "CHIEFS/RAVENS");

        let teased = parse_selection("CHIEFS/RAVENS Under 45½ (B+6) -110");
        assert_eq!(teased.over_under, Some(OverUnder::Under));
        assert_eq!(teased.line, Some(dec!(51.5)));
    }

    #[test]
    fn test_large_signed_number_is_moneyline_not_spread() {
        let sel = parse_selection("LAKERS +135");
        assert_eq!(sel.bet_kind, BetKind::Moneyline);
        let even = parse_selection("LAKERS +100");
        assert_eq!(even.bet_kind, BetKind::Unknown);
    }

    #[test]
    fn test_market_prefix_and_matchup() {
        let sel = parse_selection("Winner (2 way) / ARSENAL -163 (ARSENAL vrs CHELSEA)");
        assert_eq!(sel.market.as_deref(), Some("Winner (2 way)"));
        assert_eq!(sel.participant, "ARSENAL");
        assert_eq!(sel.matchup.as_deref(), Some("ARSENAL vs CHELSEA"));
        assert_eq!(sel.bet_kind, BetKind::Moneyline);
    }

    #[test]
    fn test_strip_trailer() {
        let trailer = strip_trailer("DALLAS COWBOYS +135 [Lost] (Score: 17-24)");
        assert_eq!(trailer.text, "DALLAS COWBOYS +135");
        assert_eq!(trailer.status, Some(LegStatus::Lost));
        assert_eq!(
            trailer.score,
            Some(Score {
                first: 17,
                second: 24
            })
        );
    }

    #[test]
    fn test_parse_line_value() {
        assert_eq!(parse_line_value("-7½"), Some(dec!(-7.5)));
        assert_eq!(parse_line_value("+½"), Some(dec!(0.5)));
        assert_eq!(parse_line_value("+ 6"), Some(dec!(6)));
        assert_eq!(parse_line_value("45"), Some(dec!(45)));
        assert_eq!(parse_line_value("abc"), None);
    }

    #[test]
    fn test_normalize_matchup() {
        assert_eq!(
            normalize_matchup("ALEX PEREIRA vrs KHALIL ROUNTREE").as_deref(),
            Some("ALEX PEREIRA vs KHALIL ROUNTREE")
        );
        assert_eq!(normalize_matchup("SOLO"), None);
    }
}
