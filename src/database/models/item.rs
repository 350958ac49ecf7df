//! Catalogue item model.
//!
//! One document per indexed media file. The document id equals the source
//! message id in the feed channel, which is what /delete and content
//! delivery key on.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Content category, inferred from caption tokens at ingestion time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Movie,
    Series,
}

impl Category {
    /// All categories in the fixed render order.
    pub const ALL: [Category; 2] = [Category::Movie, Category::Series];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Movie => "movie",
            Category::Series => "series",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "movie" => Ok(Category::Movie),
            "series" => Ok(Category::Series),
            _ => Err(()),
        }
    }
}

/// Video quality, inferred from caption tokens at ingestion time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Quality {
    #[serde(rename = "2160p")]
    P2160,
    #[serde(rename = "1080p")]
    P1080,
    #[serde(rename = "720p")]
    P720,
    #[serde(rename = "480p")]
    P480,
    #[serde(rename = "unknown")]
    Unknown,
}

impl Quality {
    /// Selectable qualities in the fixed descending render order.
    /// `Unknown` is stored but never offered as a facet.
    pub const ALL: [Quality; 4] = [Quality::P2160, Quality::P1080, Quality::P720, Quality::P480];

    pub fn as_str(&self) -> &'static str {
        match self {
            Quality::P2160 => "2160p",
            Quality::P1080 => "1080p",
            Quality::P720 => "720p",
            Quality::P480 => "480p",
            Quality::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Quality {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "2160p" => Ok(Quality::P2160),
            "1080p" => Ok(Quality::P1080),
            "720p" => Ok(Quality::P720),
            "480p" => Ok(Quality::P480),
            "unknown" => Ok(Quality::Unknown),
            _ => Err(()),
        }
    }
}

/// One indexed media file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CatalogueItem {
    /// Source message id in the feed channel.
    #[serde(rename = "_id")]
    pub id: i64,

    /// Free-text caption carrying title/season/episode/quality tokens.
    pub caption: String,

    /// Human-formatted size, e.g. `1.40 GB`.
    pub file_size: String,

    pub category: Category,
    pub quality: Quality,
}

static SERIES_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:S\d+E\d+|S\d+|E\d+)\b").unwrap());
static QUALITY_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(2160|1080|720|480)p\b").unwrap());

impl CatalogueItem {
    /// Build an item from a feed-channel video post.
    pub fn from_feed_post(message_id: i64, caption: &str, file_size: String) -> Self {
        Self {
            id: message_id,
            caption: caption.to_string(),
            file_size,
            category: Self::infer_category(caption),
            quality: Self::infer_quality(caption),
        }
    }

    fn infer_category(caption: &str) -> Category {
        if SERIES_TOKEN.is_match(caption) {
            Category::Series
        } else {
            Category::Movie
        }
    }

    fn infer_quality(caption: &str) -> Quality {
        match QUALITY_TOKEN.captures(caption) {
            Some(caps) => match caps.get(1).map(|m| m.as_str()) {
                Some("2160") => Quality::P2160,
                Some("1080") => Quality::P1080,
                Some("720") => Quality::P720,
                Some("480") => Quality::P480,
                _ => Quality::Unknown,
            },
            None => Quality::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_category_series_tokens() {
        for caption in ["Breaking Bad S01E01 1080p", "Show s2 pack", "Pilot E05"] {
            assert_eq!(
                CatalogueItem::from_feed_post(1, caption, "1 GB".into()).category,
                Category::Series,
                "caption: {caption}"
            );
        }
    }

    #[test]
    fn test_infer_category_movie_default() {
        let item = CatalogueItem::from_feed_post(1, "Inception 2010 1080p BluRay", "2 GB".into());
        assert_eq!(item.category, Category::Movie);
    }

    #[test]
    fn test_infer_quality() {
        let item = CatalogueItem::from_feed_post(1, "Dune 2160P HDR", "8 GB".into());
        assert_eq!(item.quality, Quality::P2160);

        let item = CatalogueItem::from_feed_post(1, "Dune CAMRip", "700 MB".into());
        assert_eq!(item.quality, Quality::Unknown);
    }

    #[test]
    fn test_quality_order_descending() {
        let order: Vec<&str> = Quality::ALL.iter().map(|q| q.as_str()).collect();
        assert_eq!(order, vec!["2160p", "1080p", "720p", "480p"]);
    }

    #[test]
    fn test_wire_round_trip() {
        for q in Quality::ALL {
            assert_eq!(q.as_str().parse::<Quality>().unwrap(), q);
        }
        for c in Category::ALL {
            assert_eq!(c.as_str().parse::<Category>().unwrap(), c);
        }
    }
}
