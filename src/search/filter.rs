//! Catalogue filter construction.
//!
//! A `SearchFilter` is the store-side view of one browse interaction:
//! the caption conjunction pattern plus whatever facets are active. It
//! renders to BSON for `count`/`find` and knows the facet-count rule:
//! counting candidates for one dimension honors the *other* active
//! dimension but never its own.

use mongodb::bson::{doc, Document};

use crate::database::models::{Category, Quality};

use super::{conjunction_pattern, normalize};

/// Active filter state for one search interaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchFilter {
    /// Caption matching pattern (lookahead conjunction, case-insensitive).
    pub pattern: String,
    pub category: Option<Category>,
    pub quality: Option<Quality>,
}

impl SearchFilter {
    /// Build a filter from a raw query with no facets active.
    pub fn from_query(raw_query: &str) -> Self {
        Self {
            pattern: conjunction_pattern(&normalize(raw_query)),
            category: None,
            quality: None,
        }
    }

    /// Build a filter from a raw query plus facets decoded from a payload.
    pub fn with_facets(raw_query: &str, category: Option<Category>, quality: Option<Quality>) -> Self {
        Self {
            category,
            quality,
            ..Self::from_query(raw_query)
        }
    }

    fn caption_clause(&self) -> Document {
        doc! { "$regex": &self.pattern, "$options": "i" }
    }

    /// Full filter document: caption pattern AND active facets.
    pub fn to_document(&self) -> Document {
        let mut filter = doc! { "caption": self.caption_clause() };
        if let Some(category) = self.category {
            filter.insert("category", category.as_str());
        }
        if let Some(quality) = self.quality {
            filter.insert("quality", quality.as_str());
        }
        filter
    }

    /// Count document for one quality facet value.
    ///
    /// Honors the active category, ignores the active quality.
    pub fn quality_count_document(&self, quality: Quality) -> Document {
        let mut filter = doc! { "caption": self.caption_clause() };
        if let Some(category) = self.category {
            filter.insert("category", category.as_str());
        }
        filter.insert("quality", quality.as_str());
        filter
    }

    /// Count document for one category facet value.
    ///
    /// Honors the active quality, ignores the active category.
    pub fn category_count_document(&self, category: Category) -> Document {
        let mut filter = doc! { "caption": self.caption_clause() };
        if let Some(quality) = self.quality {
            filter.insert("quality", quality.as_str());
        }
        filter.insert("category", category.as_str());
        filter
    }
}

/// Total number of pages for a match count.
pub fn total_pages(match_count: u64, per_page: u32) -> u64 {
    (match_count + per_page as u64 - 1) / per_page as u64
}

/// Clamp a requested page index to the valid range.
///
/// Negative pages clamp to 0, out-of-range pages to the last valid page.
pub fn clamp_page(requested: i64, total_pages: u64) -> u64 {
    if requested < 0 || total_pages == 0 {
        return 0;
    }
    (requested as u64).min(total_pages.saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::Bson;

    fn filter_with(category: Option<Category>, quality: Option<Quality>) -> SearchFilter {
        SearchFilter::with_facets("dark knight", category, quality)
    }

    #[test]
    fn test_document_has_caption_regex() {
        let doc = filter_with(None, None).to_document();
        let caption = doc.get_document("caption").unwrap();
        assert_eq!(
            caption.get_str("$regex").unwrap(),
            "^(?=.*dark)(?=.*knight).*$"
        );
        assert_eq!(caption.get_str("$options").unwrap(), "i");
        assert!(doc.get("category").is_none());
        assert!(doc.get("quality").is_none());
    }

    #[test]
    fn test_document_includes_active_facets() {
        let doc = filter_with(Some(Category::Series), Some(Quality::P720)).to_document();
        assert_eq!(doc.get_str("category").unwrap(), "series");
        assert_eq!(doc.get_str("quality").unwrap(), "720p");
    }

    #[test]
    fn test_quality_count_ignores_own_dimension() {
        // Active quality must not restrict the quality facet count...
        let active = filter_with(None, Some(Quality::P1080));
        let none = filter_with(None, None);
        assert_eq!(
            active.quality_count_document(Quality::P1080),
            none.quality_count_document(Quality::P1080)
        );

        // ...but an active category does.
        let with_cat = filter_with(Some(Category::Movie), Some(Quality::P1080));
        let doc = with_cat.quality_count_document(Quality::P1080);
        assert_eq!(doc.get_str("category").unwrap(), "movie");
        assert_eq!(doc.get_str("quality").unwrap(), "1080p");
    }

    #[test]
    fn test_category_count_ignores_own_dimension() {
        let active = filter_with(Some(Category::Series), Some(Quality::P480));
        let doc = active.category_count_document(Category::Movie);
        assert_eq!(doc.get_str("category").unwrap(), "movie");
        assert_eq!(doc.get_str("quality").unwrap(), "480p");
        assert!(matches!(doc.get("caption"), Some(Bson::Document(_))));
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 5), 0);
        assert_eq!(total_pages(5, 5), 1);
        assert_eq!(total_pages(7, 5), 2);
        assert_eq!(total_pages(11, 5), 3);
    }

    #[test]
    fn test_clamp_page() {
        assert_eq!(clamp_page(-3, 4), 0);
        assert_eq!(clamp_page(0, 4), 0);
        assert_eq!(clamp_page(3, 4), 3);
        assert_eq!(clamp_page(9, 4), 3);
        assert_eq!(clamp_page(2, 0), 0);
    }
}
