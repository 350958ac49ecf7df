//! Enrichment lookup against TMDB.
//!
//! Given free search text, resolves an optional structured record
//! (type, display name, poster, and descriptive lines) used as the header
//! of a result render. Lookup failures and misses both surface as `None`;
//! enrichment must never fail a search.

use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, warn};

const TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";
const TMDB_IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/original";
const FALLBACK_POSTER: &str = "https://via.placeholder.com/150";

static YEAR_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(19\d{2}|20\d{2})\b").unwrap());
static EPISODE_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(season\s+\d+|episode\s+\d+|s\d{1,2}(e\d{1,2})?|e\d{1,2})\b").unwrap());

/// Structured enrichment record. All lines are pre-formatted and optional;
/// the caption includes only the ones that are present.
#[derive(Clone, Debug, Default)]
pub struct TitleDetails {
    pub kind: String,
    pub name: String,
    pub poster_url: String,
    pub release_line: Option<String>,
    pub rating_line: Option<String>,
    pub duration_line: Option<String>,
    pub season_line: Option<String>,
    pub audio_line: Option<String>,
    pub genre_line: Option<String>,
    pub trailer_line: Option<String>,
    pub platforms_line: Option<String>,
}

impl TitleDetails {
    /// Render the attribute block shown above the result keyboard.
    /// Fixed line order; absent attributes are skipped entirely.
    pub fn caption(&self) -> String {
        let mut lines = vec![format!(
            "🎬 <b>{}</b> :- <a href='{}'>{}</a>",
            self.kind, self.poster_url, self.name
        )];
        let optional = [
            ("📅", &self.release_line),
            ("⭐", &self.rating_line),
            ("⏱", &self.duration_line),
            ("📺", &self.season_line),
            ("🔊", &self.audio_line),
            ("🎭", &self.genre_line),
            ("🎞", &self.trailer_line),
            ("📡", &self.platforms_line),
        ];
        for (emoji, line) in optional {
            if let Some(line) = line {
                lines.push(format!("{} {}", emoji, line));
            }
        }
        lines.join("\n")
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    id: i64,
    media_type: Option<String>,
    title: Option<String>,
    name: Option<String>,
    poster_path: Option<String>,
    release_date: Option<String>,
    first_air_date: Option<String>,
    vote_average: Option<f64>,
    original_language: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    runtime: Option<i64>,
    number_of_seasons: Option<i64>,
    #[serde(default)]
    episode_run_time: Vec<i64>,
    #[serde(default)]
    genres: Vec<Genre>,
    videos: Option<Videos>,
    #[serde(rename = "watch/providers")]
    watch_providers: Option<WatchProviders>,
}

#[derive(Debug, Deserialize)]
struct Genre {
    name: String,
}

#[derive(Debug, Deserialize)]
struct Videos {
    #[serde(default)]
    results: Vec<Video>,
}

#[derive(Debug, Deserialize)]
struct Video {
    key: String,
    site: String,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Deserialize)]
struct WatchProviders {
    results: Option<serde_json::Value>,
}

/// TMDB lookup client. Disabled (always `None`) when no API key is set.
#[derive(Clone)]
pub struct Enrichment {
    client: reqwest::Client,
    api_key: Option<String>,
}

impl Enrichment {
    pub fn new(api_key: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();
        Self { client, api_key }
    }

    /// Look up a title; `None` on miss, lookup error or disabled client.
    pub async fn lookup(&self, query: &str) -> Option<TitleDetails> {
        let api_key = self.api_key.as_ref()?;
        match self.lookup_inner(api_key, query).await {
            Ok(details) => details,
            Err(e) => {
                warn!("Enrichment lookup failed for '{}': {}", query, e);
                None
            }
        }
    }

    async fn lookup_inner(
        &self,
        api_key: &str,
        query: &str,
    ) -> anyhow::Result<Option<TitleDetails>> {
        let (base_title, year) = strip_search_tokens(query);
        if base_title.is_empty() {
            return Ok(None);
        }

        let url = format!(
            "{}/search/multi?api_key={}&query={}&include_adult=true",
            TMDB_BASE_URL,
            api_key,
            urlencode(&base_title)
        );
        let search: SearchResponse = self.client.get(&url).send().await?.json().await?;

        let mut hits: Vec<&SearchHit> = search
            .results
            .iter()
            .filter(|h| matches!(h.media_type.as_deref(), Some("movie") | Some("tv")))
            .collect();

        // A year token narrows the candidates but never empties them.
        if let Some(year) = &year {
            let by_year: Vec<&SearchHit> = hits
                .iter()
                .copied()
                .filter(|h| {
                    h.release_date
                        .as_deref()
                        .or(h.first_air_date.as_deref())
                        .map(|d| d.starts_with(year.as_str()))
                        .unwrap_or(false)
                })
                .collect();
            if !by_year.is_empty() {
                hits = by_year;
            }
        }

        let Some(hit) = hits.first() else {
            debug!("No enrichment hit for '{}'", base_title);
            return Ok(None);
        };

        let media_type = hit.media_type.as_deref().unwrap_or("movie");
        let mut details = TitleDetails {
            kind: if media_type == "movie" { "Movie" } else { "Series" }.to_string(),
            name: hit
                .title
                .clone()
                .or_else(|| hit.name.clone())
                .unwrap_or_else(|| base_title.clone()),
            poster_url: hit
                .poster_path
                .as_ref()
                .map(|p| format!("{}{}", TMDB_IMAGE_BASE_URL, p))
                .unwrap_or_else(|| FALLBACK_POSTER.to_string()),
            ..TitleDetails::default()
        };

        if let Some(date) = hit.release_date.as_deref().or(hit.first_air_date.as_deref()) {
            if !date.is_empty() {
                details.release_line = Some(format!("Release Date :- {}", date));
            }
        }
        if let Some(rating) = hit.vote_average.filter(|r| *r > 0.0) {
            details.rating_line = Some(format!("Rating :- {:.1}", rating));
        }
        if let Some(lang) = hit.original_language.as_deref() {
            let name = language_name(lang).map(str::to_string).unwrap_or_else(|| lang.to_uppercase());
            details.audio_line = Some(format!("Original Audio :- {}", name));
        }

        let url = format!(
            "{}/{}/{}?api_key={}&append_to_response=videos,watch/providers",
            TMDB_BASE_URL, media_type, hit.id, api_key
        );
        let extra: DetailsResponse = self.client.get(&url).send().await?.json().await?;

        if media_type == "movie" {
            if let Some(runtime) = extra.runtime.filter(|r| *r > 0) {
                details.duration_line =
                    Some(format!("Duration :- {}h {}m", runtime / 60, runtime % 60));
            }
        } else {
            if let Some(seasons) = extra.number_of_seasons {
                details.season_line = Some(format!("Total Seasons :- {}", seasons));
            }
            if let Some(runtime) = extra.episode_run_time.first().filter(|r| **r > 0) {
                details.duration_line = Some(format!("Avg Episode Duration :- {}m", runtime));
            }
        }

        if !extra.genres.is_empty() {
            let tags: Vec<String> = extra
                .genres
                .iter()
                .map(|g| format!("#{}", g.name.to_lowercase().replace(' ', "")))
                .collect();
            details.genre_line = Some(format!("Genre :- {}", tags.join(" ")));
        }

        if let Some(videos) = &extra.videos {
            if let Some(trailer) = videos
                .results
                .iter()
                .find(|v| v.kind == "Trailer" && v.site == "YouTube")
            {
                details.trailer_line = Some(format!(
                    "Trailer :- <a href='https://www.youtube.com/watch?v={}'>Click Here</a>",
                    trailer.key
                ));
            }
        }

        if let Some(providers) = extra
            .watch_providers
            .as_ref()
            .and_then(|w| w.results.as_ref())
        {
            let names: Vec<&str> = providers
                .get("IN")
                .and_then(|r| r.get("flatrate"))
                .and_then(|f| f.as_array())
                .map(|arr| {
                    arr.iter()
                        .filter_map(|p| p.get("provider_name").and_then(|n| n.as_str()))
                        .collect()
                })
                .unwrap_or_default();
            if !names.is_empty() {
                details.platforms_line = Some(format!("Platforms :- {}", names.join(", ")));
            }
        }

        Ok(Some(details))
    }
}

/// Remove year and season/episode tokens before hitting the search API.
/// Returns the cleaned title and the year token if one was present.
fn strip_search_tokens(query: &str) -> (String, Option<String>) {
    let lowered = query.trim().to_lowercase();
    let year = YEAR_TOKEN.find(&lowered).map(|m| m.as_str().to_string());

    let mut title = lowered;
    if let Some(year) = &year {
        title = title.replace(year.as_str(), " ");
    }
    let title = EPISODE_TAG.replace_all(&title, " ");
    let title = title.split_whitespace().collect::<Vec<_>>().join(" ");
    (title, year)
}

fn urlencode(s: &str) -> String {
    s.replace(' ', "%20")
}

fn language_name(code: &str) -> Option<&'static str> {
    let name = match code {
        "hi" => "Hindi",
        "en" => "English",
        "es" => "Spanish",
        "fr" => "French",
        "de" => "German",
        "ja" => "Japanese",
        "ko" => "Korean",
        "zh" => "Chinese",
        "ta" => "Tamil",
        "te" => "Telugu",
        "mr" => "Marathi",
        "bn" => "Bengali",
        "pa" => "Punjabi",
        "ml" => "Malayalam",
        "gu" => "Gujarati",
        "kn" => "Kannada",
        "ur" => "Urdu",
        "fa" => "Persian",
        "ru" => "Russian",
        "it" => "Italian",
        "pt" => "Portuguese",
        "tr" => "Turkish",
        "ar" => "Arabic",
        _ => return None,
    };
    Some(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_search_tokens() {
        assert_eq!(
            strip_search_tokens("Dune 2021"),
            ("dune".to_string(), Some("2021".to_string()))
        );
        assert_eq!(strip_search_tokens("Loki s01e03"), ("loki".to_string(), None));
        assert_eq!(
            strip_search_tokens("Breaking Bad Season 2"),
            ("breaking bad".to_string(), None)
        );
        assert_eq!(strip_search_tokens("Heat"), ("heat".to_string(), None));
    }

    #[test]
    fn test_caption_skips_absent_lines() {
        let details = TitleDetails {
            kind: "Movie".into(),
            name: "Dune".into(),
            poster_url: "https://example.com/p.jpg".into(),
            rating_line: Some("Rating :- 8.1".into()),
            ..TitleDetails::default()
        };
        let caption = details.caption();
        assert_eq!(caption.lines().count(), 2);
        assert!(caption.contains("⭐ Rating :- 8.1"));
        assert!(!caption.contains("Duration"));
    }

    #[test]
    fn test_caption_line_order() {
        let details = TitleDetails {
            kind: "Series".into(),
            name: "Loki".into(),
            poster_url: "p".into(),
            release_line: Some("Release Date :- 2021-06-09".into()),
            platforms_line: Some("Platforms :- Disney+".into()),
            season_line: Some("Total Seasons :- 2".into()),
            ..TitleDetails::default()
        };
        let caption = details.caption();
        let lines: Vec<&str> = caption.lines().collect();
        assert!(lines[1].starts_with("📅"));
        assert!(lines[2].starts_with("📺"));
        assert!(lines[3].starts_with("📡"));
    }

    #[test]
    fn test_language_name() {
        assert_eq!(language_name("hi"), Some("Hindi"));
        assert_eq!(language_name("xx"), None);
    }
}
