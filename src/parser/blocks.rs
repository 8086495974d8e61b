//! Block splitter and ticket header
//!
//! A paste from the bet-history page is a run of tickets, each starting on a
//! line that begins with `Mon-DD-YYYY`. Leg lines carry their dates inside
//! brackets, so they never open a new block.

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use std::sync::LazyLock;

static RE_BLOCK_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)-\d{2}-\d{4}").unwrap()
});
static RE_HEADER_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<time>\d{1,2}:\d{2}\s*[AaPp][Mm])\s+(?P<ticket>[A-Za-z0-9-]*\d[A-Za-z0-9-]*)\s+(?P<label>.+)$")
        .unwrap()
});
static RE_EMBEDDED_DATETIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)-\d{2}-\d{4}[ \t]+\d{1,2}:\d{2}[ \t]*[AaPp][Mm]",
    )
    .unwrap()
});

const FOOTER_TOKEN: &str = "TOTAL";

/// Slice of the paste holding one ticket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawBlock<'a> {
    /// Position among all segments of the paste, dropped ones included
    pub index: usize,
    pub text: &'a str,
}

/// Split raw paste text into per-ticket blocks.
///
/// Blank segments and the `TOTAL` footer are dropped without shifting the
/// indices of the blocks that follow.
pub fn split_blocks(input: &str) -> Vec<RawBlock<'_>> {
    let mut starts = vec![0usize];
    let mut offset = 0usize;
    for line in input.split_inclusive('\n') {
        if offset > 0 && RE_BLOCK_START.is_match(line) {
            starts.push(offset);
        }
        offset += line.len();
    }

    let mut blocks = Vec::with_capacity(starts.len());
    for (index, window) in starts.iter().enumerate() {
        let end = starts.get(index + 1).copied().unwrap_or(input.len());
        let mut text = &input[*window..end];
        if let Some(pos) = footer_position(text) {
            text = &text[..pos];
        }
        let text = text.trim();
        if text.is_empty() || text == FOOTER_TOKEN {
            continue;
        }
        blocks.push(RawBlock { index, text });
    }
    blocks
}

/// Byte offset of a line holding only the footer token
fn footer_position(text: &str) -> Option<usize> {
    let mut offset = 0usize;
    for line in text.split_inclusive('\n') {
        if line.trim() == FOOTER_TOKEN {
            return Some(offset);
        }
        offset += line.len();
    }
    None
}

/// First two lines of a ticket: placement date, time, ticket id, type label
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BlockHeader {
    pub placed_at: Option<NaiveDateTime>,
    pub ticket_id: Option<String>,
    pub label: String,
}

pub fn parse_header(block: &str) -> BlockHeader {
    let mut lines = block.lines().map(str::trim).filter(|l| !l.is_empty());
    let date_line = lines.next().unwrap_or_default();
    let placed_date = RE_BLOCK_START
        .find(date_line)
        .and_then(|m| parse_date(m.as_str()));

    let Some(caps) = lines.next().and_then(|line| RE_HEADER_LINE.captures(line)) else {
        return BlockHeader {
            placed_at: placed_date.and_then(|d| d.and_hms_opt(0, 0, 0)),
            ..BlockHeader::default()
        };
    };

    let placed_at = placed_date.and_then(|date| {
        chrono::NaiveTime::parse_from_str(&normalize_meridiem(&caps["time"]), "%I:%M %p")
            .ok()
            .map(|time| date.and_time(time))
    });

    BlockHeader {
        placed_at,
        ticket_id: Some(caps["ticket"].to_string()),
        label: caps["label"].trim().to_string(),
    }
}

/// `Oct-12-2024`
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%b-%d-%Y").ok()
}

/// `Oct-12-2024 08:00 PM`, or a bare date at midnight
pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(&normalize_meridiem(raw), "%b-%d-%Y %I:%M %p")
        .ok()
        .or_else(|| parse_date(raw).and_then(|d| d.and_hms_opt(0, 0, 0)))
}

/// First `Mon-DD-YYYY HH:MM AM|PM` found anywhere in `text`
pub fn find_start_time(text: &str) -> Option<NaiveDateTime> {
    RE_EMBEDDED_DATETIME
        .find_iter(text)
        .find_map(|m| parse_datetime(m.as_str()))
}

fn normalize_meridiem(raw: &str) -> String {
    let trimmed = raw.trim_end();
    if trimmed.len() < 2 || !trimmed.is_char_boundary(trimmed.len() - 2) {
        return trimmed.to_string();
    }
    let (head, tail) = trimmed.split_at(trimmed.len() - 2);
    if tail.eq_ignore_ascii_case("AM") || tail.eq_ignore_ascii_case("PM") {
        format!("{} {}", head.trim_end(), tail.to_ascii_uppercase())
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_TICKETS: &str = "Oct-12-2024\n07:15 PM\t401234567\tSTRAIGHT BET\n[Oct-12-2024 08:00 PM] [CFB] - [123] OHIO STATE -215\nPending\n$151/$70\nOct-11-2024\n06:00 PM\t401234500\tSTRAIGHT BET\n[Oct-11-2024 07:00 PM] [NBA] - [501] LAKERS +135\nWon\n$100/$135\nTOTAL\n";

    #[test]
    fn test_split_on_date_lines_only() {
        let blocks = split_blocks(TWO_TICKETS);
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].text.starts_with("Oct-12-2024"));
        assert!(blocks[0].text.contains("OHIO STATE"));
        assert!(blocks[1].text.starts_with("Oct-11-2024"));
        // bracketed leg dates never split
        assert!(blocks[1].text.contains("[Oct-11-2024 07:00 PM]"));
    }

    #[test]
    fn test_footer_and_blank_blocks_dropped_with_stable_indices() {
        let input = "\n\nOct-12-2024\n07:15 PM\t1\tSTRAIGHT BET\n$1/$1\nOct-13-2024\n07:15 PM\t2\tSTRAIGHT BET\n$1/$1\n";
        let blocks = split_blocks(input);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].index, 1);
        assert_eq!(blocks[1].index, 2);

        let footer_only = split_blocks("TOTAL");
        assert!(footer_only.is_empty());

        let with_footer = split_blocks(TWO_TICKETS);
        assert!(!with_footer[1].text.contains("TOTAL"));
    }

    #[test]
    fn test_parse_header() {
        let blocks = split_blocks(TWO_TICKETS);
        let header = parse_header(blocks[0].text);
        assert_eq!(header.ticket_id.as_deref(), Some("401234567"));
        assert_eq!(header.label, "STRAIGHT BET");
        assert_eq!(
            header.placed_at,
            parse_datetime("Oct-12-2024 07:15 PM")
        );
    }

    #[test]
    fn test_parse_datetime_variants() {
        let dt = parse_datetime("Oct-12-2024 08:00 PM").unwrap();
        assert_eq!(dt.format("%Y-%m-%d %H:%M").to_string(), "2024-10-12 20:00");
        let compact = parse_datetime("Oct-12-2024 08:00PM").unwrap();
        assert_eq!(compact, dt);
        let date_only = parse_datetime("Oct-12-2024").unwrap();
        assert_eq!(date_only.format("%H:%M").to_string(), "00:00");
        assert!(parse_datetime("Foo-12-2024").is_none());
    }

    #[test]
    fn test_find_start_time() {
        let text = "[Oct-13-2024 01:00 PM] [NFL] - [451] CHIEFS -150";
        let start = find_start_time(text).unwrap();
        assert_eq!(start.format("%H:%M").to_string(), "13:00");
        assert!(find_start_time("no time").is_none());
        // the placement date and time sit on separate lines
        assert!(find_start_time("Oct-12-2024\n07:15 PM\t1\tSTRAIGHT BET").is_none());
    }
}
