use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sport codes used across import and settlement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Sport {
    Nfl,
    Ncaaf,
    Nba,
    Ncaab,
    Mlb,
    Nhl,
    Soccer,
    Tennis,
    Golf,
    Mma,
    Boxing,
    Esports,
    /// Multi-leg wager spanning more than one sport
    Multi,
    Unknown,
}

impl Default for Sport {
    fn default() -> Self {
        Self::Unknown
    }
}

impl Sport {
    pub fn code(&self) -> &'static str {
        match self {
            Sport::Nfl => "NFL",
            Sport::Ncaaf => "NCAAF",
            Sport::Nba => "NBA",
            Sport::Ncaab => "NCAAB",
            Sport::Mlb => "MLB",
            Sport::Nhl => "NHL",
            Sport::Soccer => "SOCCER",
            Sport::Tennis => "TENNIS",
            Sport::Golf => "GOLF",
            Sport::Mma => "MMA",
            Sport::Boxing => "BOXING",
            Sport::Esports => "ESPORTS",
            Sport::Multi => "MULTI",
            Sport::Unknown => "UNKNOWN",
        }
    }

    /// Whether the results provider publishes final scores for this sport
    pub fn has_results_feed(&self) -> bool {
        !matches!(
            self,
            Sport::Mma | Sport::Boxing | Sport::Esports | Sport::Multi | Sport::Unknown
        )
    }

    pub fn is_football(&self) -> bool {
        matches!(self, Sport::Nfl | Sport::Ncaaf)
    }
}

impl fmt::Display for Sport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Sport {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "NFL" => Ok(Sport::Nfl),
            "NCAAF" | "CFB" => Ok(Sport::Ncaaf),
            "NBA" => Ok(Sport::Nba),
            "NCAAB" | "CBB" => Ok(Sport::Ncaab),
            "MLB" => Ok(Sport::Mlb),
            "NHL" => Ok(Sport::Nhl),
            "SOCCER" => Ok(Sport::Soccer),
            "TENNIS" => Ok(Sport::Tennis),
            "GOLF" => Ok(Sport::Golf),
            "MMA" => Ok(Sport::Mma),
            "BOXING" => Ok(Sport::Boxing),
            "ESPORTS" => Ok(Sport::Esports),
            "MULTI" => Ok(Sport::Multi),
            "UNKNOWN" => Ok(Sport::Unknown),
            other => Err(format!("unknown sport code: {}", other)),
        }
    }
}

/// Collapse the sports of several legs into one wager-level sport
pub fn combined_sport<I: IntoIterator<Item = Sport>>(sports: I) -> Sport {
    let mut combined: Option<Sport> = None;
    for sport in sports {
        match combined {
            None => combined = Some(sport),
            Some(s) if s == sport => {}
            Some(_) => return Sport::Multi,
        }
    }
    combined.unwrap_or(Sport::Unknown)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sport_codes_round_trip_through_from_str() {
        for sport in [Sport::Nfl, Sport::Ncaaf, Sport::Mma, Sport::Esports] {
            assert_eq!(sport.code().parse::<Sport>().unwrap(), sport);
        }
        assert_eq!("cfb".parse::<Sport>().unwrap(), Sport::Ncaaf);
        assert!("curling".parse::<Sport>().is_err());
    }

    #[test]
    fn test_results_feed_excludes_combat_and_esports() {
        assert!(Sport::Nfl.has_results_feed());
        assert!(Sport::Nba.has_results_feed());
        assert!(!Sport::Mma.has_results_feed());
        assert!(!Sport::Boxing.has_results_feed());
        assert!(!Sport::Esports.has_results_feed());
        assert!(!Sport::Unknown.has_results_feed());
    }

    #[test]
    fn test_combined_sport() {
        assert_eq!(combined_sport([Sport::Nfl, Sport::Nfl]), Sport::Nfl);
        assert_eq!(combined_sport([Sport::Nfl, Sport::Nba]), Sport::Multi);
        assert_eq!(combined_sport(Vec::<Sport>::new()), Sport::Unknown);
    }
}
