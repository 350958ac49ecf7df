//! Catalogue repository.
//!
//! Store operations for indexed media files: upsert on feed ingestion,
//! id-set deletion for the admin /delete command, and the count/page
//! queries behind the result browser. Pages are sorted by `_id` so that
//! repeated calls see a stable order - pagination depends on it.

use anyhow::Result;
use futures::TryStreamExt;
use mongodb::bson::doc;
use mongodb::Collection;
use tracing::debug;

use crate::database::models::{CatalogueItem, Category, Quality};
use crate::database::Database;
use crate::search::SearchFilter;

/// Repository for catalogue items.
pub struct CatalogueRepo {
    collection: Collection<CatalogueItem>,
}

impl CatalogueRepo {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("catalogue"),
        }
    }

    /// Upsert an item by id (insert on first ingestion, replace on edit).
    pub async fn upsert(&self, item: &CatalogueItem) -> Result<()> {
        let filter = doc! { "_id": item.id };
        let options = mongodb::options::ReplaceOptions::builder()
            .upsert(true)
            .build();

        self.collection
            .replace_one(filter, item)
            .with_options(options)
            .await?;

        debug!("Upserted catalogue item {}", item.id);
        Ok(())
    }

    /// Delete all items with the given ids. Returns the deleted count.
    pub async fn delete_many(&self, ids: &[i64]) -> Result<u64> {
        let result = self
            .collection
            .delete_many(doc! { "_id": { "$in": ids } })
            .await?;
        Ok(result.deleted_count)
    }

    /// Count items matching the filter.
    pub async fn count(&self, filter: &SearchFilter) -> Result<u64> {
        Ok(self.collection.count_documents(filter.to_document()).await?)
    }

    /// Candidate count per quality value (fixed descending order).
    ///
    /// Each count honors the filter's active category but not its active
    /// quality, so the facet row offers alternatives instead of
    /// self-filtering down to one value.
    pub async fn quality_counts(&self, filter: &SearchFilter) -> Result<Vec<(Quality, u64)>> {
        let mut counts = Vec::with_capacity(Quality::ALL.len());
        for quality in Quality::ALL {
            let count = self
                .collection
                .count_documents(filter.quality_count_document(quality))
                .await?;
            counts.push((quality, count));
        }
        Ok(counts)
    }

    /// Candidate count per category (fixed order), honoring the active
    /// quality but not the active category.
    pub async fn category_counts(&self, filter: &SearchFilter) -> Result<Vec<(Category, u64)>> {
        let mut counts = Vec::with_capacity(Category::ALL.len());
        for category in Category::ALL {
            let count = self
                .collection
                .count_documents(filter.category_count_document(category))
                .await?;
            counts.push((category, count));
        }
        Ok(counts)
    }

    /// Fetch one page of matches, `_id`-sorted.
    pub async fn find_page(
        &self,
        filter: &SearchFilter,
        page: u64,
        per_page: u32,
    ) -> Result<Vec<CatalogueItem>> {
        let items = self
            .collection
            .find(filter.to_document())
            .sort(doc! { "_id": 1 })
            .skip(page * per_page as u64)
            .limit(per_page as i64)
            .await?
            .try_collect()
            .await?;
        Ok(items)
    }
}
