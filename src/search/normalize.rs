//! Query normalization.
//!
//! Canonicalizes free-text search input so that "Season 1", "s1" and "s01"
//! all hit captions tagged `S01`. The normalized form is what gets encoded
//! into button payloads, so the whole pipeline is idempotent.

use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static SEASON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"season\s+(\d+)").unwrap());
static EPISODE_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"episode\s+(\d+)").unwrap());
static SHORT_SEASON: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bs(\d)\b").unwrap());
static SHORT_EPISODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\be(\d)\b").unwrap());

/// Normalize a raw query.
///
/// Applied in order: collapse whitespace runs, trim, lowercase,
/// `season N` -> `sNN`, `episode N` -> `eNN`, then zero-pad bare
/// single-digit `sN`/`eN` tokens. Idempotent.
pub fn normalize(raw: &str) -> String {
    let q = WHITESPACE.replace_all(raw, " ");
    let q = q.trim().to_lowercase();

    let q = SEASON_WORD.replace_all(&q, |caps: &regex::Captures<'_>| {
        format!("s{:02}", caps[1].parse::<u32>().unwrap_or(0))
    });
    let q = EPISODE_WORD.replace_all(&q, |caps: &regex::Captures<'_>| {
        format!("e{:02}", caps[1].parse::<u32>().unwrap_or(0))
    });
    let q = SHORT_SEASON.replace_all(&q, "s0$1");
    let q = SHORT_EPISODE.replace_all(&q, "e0$1");

    q.into_owned()
}

/// Build the case-insensitive matching pattern for a normalized query.
///
/// Each token becomes an escaped literal inside a lookahead, so an item
/// matches iff every token is a substring of its caption, in any order.
/// The store evaluates this server-side (PCRE supports lookaheads); with
/// zero tokens the pattern degenerates to match-all, which the dispatcher
/// rules out by rejecting queries shorter than 2 characters.
pub fn conjunction_pattern(normalized: &str) -> String {
    let lookaheads: String = normalized
        .split(' ')
        .filter(|t| !t.is_empty())
        .map(|t| format!("(?=.*{})", regex::escape(t)))
        .collect();

    if lookaheads.is_empty() {
        ".*".to_string()
    } else {
        format!("^{}.*$", lookaheads)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Reference semantics of `conjunction_pattern`: every token of the
    /// normalized query is a case-insensitive substring of the caption.
    fn matches(normalized: &str, caption: &str) -> bool {
        let caption = caption.to_lowercase();
        normalized
            .split(' ')
            .filter(|t| !t.is_empty())
            .all(|t| caption.contains(t))
    }

    #[test]
    fn test_whitespace_and_case() {
        assert_eq!(normalize("  The   Dark\tKnight "), "the dark knight");
    }

    #[test]
    fn test_season_episode_words() {
        assert_eq!(normalize("Loki Season 2"), "loki s02");
        assert_eq!(normalize("Loki episode 3"), "loki e03");
        assert_eq!(normalize("Loki Season 12"), "loki s12");
    }

    #[test]
    fn test_short_tokens_padded() {
        assert_eq!(normalize("loki s1"), "loki s01");
        assert_eq!(normalize("loki e7"), "loki e07");
        // Already padded tokens stay put.
        assert_eq!(normalize("loki s01e07"), "loki s01e07");
    }

    #[test]
    fn test_idempotent() {
        for q in ["Loki Season 2", "  mixed   CASE e4 ", "dune 2021", "s1 e1"] {
            let once = normalize(q);
            assert_eq!(normalize(&once), once, "query: {q}");
        }
    }

    #[test]
    fn test_pattern_shape() {
        assert_eq!(conjunction_pattern("loki s02"), "^(?=.*loki)(?=.*s02).*$");
        assert_eq!(conjunction_pattern(""), ".*");
    }

    #[test]
    fn test_year_token_is_plain_literal() {
        assert_eq!(conjunction_pattern("dune 2021"), "^(?=.*dune)(?=.*2021).*$");
    }

    #[test]
    fn test_tokens_escaped() {
        // A dot in the query must not act as a wildcard.
        assert_eq!(conjunction_pattern("mr.robot"), "^(?=.*mr\\.robot).*$");
    }

    #[test]
    fn test_match_semantics_order_independent() {
        let caption = "The.Dark.Knight.2008.1080p.BluRay";
        assert!(matches(&normalize("dark knight"), caption));
        assert!(matches(&normalize("knight dark"), caption));
        assert!(matches(&normalize("KNIGHT 2008"), caption));
        assert!(!matches(&normalize("dark rises"), caption));
    }
}
