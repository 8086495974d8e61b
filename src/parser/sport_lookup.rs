//! Versioned sport lookup table
//!
//! Tag aliases and team keywords live in TOML so they can be updated
//! without a release. The built-in table ships in `data/sports.toml`.

use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::debug;

use crate::domain::Sport;
use crate::error::{Result, WagerError};

const BUILTIN_TABLE: &str = include_str!("../../data/sports.toml");

#[derive(Debug, Deserialize)]
struct LookupFile {
    version: String,
    #[serde(default)]
    tags: BTreeMap<String, String>,
    #[serde(default)]
    keywords: BTreeMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct SportLookup {
    version: String,
    tags: HashMap<String, Sport>,
    /// Uppercased keywords, longest first
    keywords: Vec<(String, Sport)>,
}

impl SportLookup {
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(BUILTIN_TABLE)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let lookup = Self::from_toml_str(&raw)?;
        debug!(
            path = %path.as_ref().display(),
            version = %lookup.version,
            "loaded sport lookup table"
        );
        Ok(lookup)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let file: LookupFile = toml::from_str(raw)?;

        let mut tags = HashMap::with_capacity(file.tags.len());
        for (tag, code) in file.tags {
            tags.insert(tag.trim().to_ascii_uppercase(), parse_code(&code)?);
        }

        let mut keywords = Vec::with_capacity(file.keywords.len());
        for (keyword, code) in file.keywords {
            keywords.push((keyword.trim().to_uppercase(), parse_code(&code)?));
        }
        keywords.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));

        Ok(Self {
            version: file.version,
            tags,
            keywords,
        })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Sport for a bracket tag such as `CFB` or `MU`
    pub fn sport_for_tag(&self, tag: &str) -> Option<Sport> {
        self.tags.get(&tag.trim().to_ascii_uppercase()).copied()
    }

    /// Sport of the longest keyword found in `text` on word boundaries
    pub fn detect(&self, text: &str) -> Option<Sport> {
        let upper = text.to_uppercase();
        self.keywords
            .iter()
            .find(|(keyword, _)| contains_word(&upper, keyword))
            .map(|(_, sport)| *sport)
    }

    /// Tag alias first, then keyword detection over each text in order
    pub fn resolve(&self, tag: Option<&str>, texts: &[&str]) -> Sport {
        if let Some(sport) = tag.and_then(|t| self.sport_for_tag(t)) {
            return sport;
        }
        texts
            .iter()
            .find_map(|text| self.detect(text))
            .unwrap_or(Sport::Unknown)
    }
}

fn parse_code(code: &str) -> Result<Sport> {
    code.parse::<Sport>().map_err(WagerError::Validation)
}

/// Case-sensitive containment that refuses matches inside a larger word
pub(crate) fn contains_word(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    haystack.match_indices(needle).any(|(start, _)| {
        let end = start + needle.len();
        let before_ok = haystack[..start]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());
        let after_ok = haystack[end..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_alphanumeric());
        before_ok && after_ok
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table_loads() {
        let lookup = SportLookup::builtin().unwrap();
        assert!(!lookup.version().is_empty());
        assert_eq!(lookup.sport_for_tag("CFB"), Some(Sport::Ncaaf));
        assert_eq!(lookup.sport_for_tag("mu"), Some(Sport::Mma));
        assert_eq!(lookup.sport_for_tag("XYZ"), None);
    }

    #[test]
    fn test_detect_uses_word_boundaries() {
        let lookup = SportLookup::builtin().unwrap();
        assert_eq!(
            lookup.detect("Kansas City Chiefs vs Buffalo Bills"),
            Some(Sport::Nfl)
        );
        assert_eq!(lookup.detect("OHIO STATE -215"), Some(Sport::Ncaaf));
        // "METS" must not match inside "HELMETS"
        assert_eq!(lookup.detect("HELMETS"), None);
    }

    #[test]
    fn test_resolve_prefers_tag() {
        let lookup = SportLookup::builtin().unwrap();
        assert_eq!(lookup.resolve(Some("NBA"), &["CHIEFS"]), Sport::Nba);
        assert_eq!(lookup.resolve(Some("??"), &["", "CHIEFS"]), Sport::Nfl);
        assert_eq!(lookup.resolve(None, &["nothing"]), Sport::Unknown);
    }

    #[test]
    fn test_custom_table_replaces_builtin() {
        let lookup = SportLookup::from_toml_str(
            r#"
            version = "test-1"
            [tags]
            KBO = "MLB"
            [keywords]
            "DOOSAN BEARS" = "MLB"
            "BEARS" = "NFL"
            "#,
        )
        .unwrap();
        assert_eq!(lookup.version(), "test-1");
        assert_eq!(lookup.sport_for_tag("KBO"), Some(Sport::Mlb));
        assert_eq!(lookup.detect("Doosan Bears +120"), Some(Sport::Mlb));
        assert_eq!(lookup.detect("Chicago Bears +120"), Some(Sport::Nfl));
    }

    #[test]
    fn test_invalid_sport_code_is_rejected() {
        let err = SportLookup::from_toml_str("version = \"x\"\n[tags]\nFOO = \"CURLING\"\n")
            .unwrap_err();
        assert!(matches!(err, WagerError::Validation(_)));
    }
}
