// Player identifier normalization.
//
// Ranking sites, injury reports, and fantasy rosters all spell names a little
// differently ("Alperen Sengün" vs "Alperen Sengun", "P.J. Washington" vs
// "PJ Washington"). Every table is keyed by the normalized form so lookups
// line up across sources.

use std::fmt;

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

/// A normalized player identifier.
///
/// Lowercased, NFKD-decomposed with combining marks dropped, restricted to
/// ASCII letters and single spaces, trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerKey(String);

impl PlayerKey {
    pub fn new(name: &str) -> Self {
        PlayerKey(normalize_player_name(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for PlayerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalize a raw player name.
pub fn normalize_player_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_space = false;

    for ch in name.to_lowercase().nfkd() {
        if ch.is_ascii_lowercase() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(ch);
        } else if ch.is_whitespace() {
            pending_space = true;
        }
        // Everything else (punctuation, digits, combining marks) is dropped.
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_diacritics() {
        assert_eq!(normalize_player_name("Alperen Sengün"), "alperen sengun");
        assert_eq!(normalize_player_name("Nikola Jokić"), "nikola jokic");
        assert_eq!(normalize_player_name("Dennis Schröder"), "dennis schroder");
    }

    #[test]
    fn drops_punctuation_and_digits() {
        assert_eq!(normalize_player_name("P.J. Washington"), "pj washington");
        assert_eq!(normalize_player_name("Jaren Jackson Jr."), "jaren jackson jr");
        assert_eq!(normalize_player_name("Shai Gilgeous-Alexander"), "shai gilgeousalexander");
        assert_eq!(normalize_player_name("Player 2"), "player");
    }

    #[test]
    fn collapses_whitespace() {
        assert_eq!(normalize_player_name("  LeBron \t  James  "), "lebron james");
        assert_eq!(normalize_player_name(""), "");
        assert_eq!(normalize_player_name("   "), "");
    }

    #[test]
    fn keys_compare_by_normalized_form() {
        assert_eq!(PlayerKey::new("Luka Dončić"), PlayerKey::new("luka  doncic"));
        assert_ne!(PlayerKey::new("Anthony Davis"), PlayerKey::new("Anthony Edwards"));
    }
}
