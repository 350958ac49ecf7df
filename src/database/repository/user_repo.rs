//! User repository with a read cache.
//!
//! The privacy flag is checked on every inbound event, so reads go through
//! a short-TTL cache; every write refreshes the cached record.

use std::time::Duration;

use anyhow::Result;
use moka::sync::Cache;
use mongodb::bson::doc;
use mongodb::Collection;
use tracing::debug;

use crate::database::models::{Subscription, UserRecord};
use crate::database::Database;

/// Repository for user records.
pub struct UserRepo {
    collection: Collection<UserRecord>,
    cache: Cache<i64, UserRecord>,
}

impl UserRepo {
    pub fn new(db: &Database) -> Self {
        let cache = Cache::builder()
            .max_capacity(10_000)
            .time_to_live(Duration::from_secs(300))
            .build();

        Self {
            collection: db.collection("users"),
            cache,
        }
    }

    /// Get a user record by id.
    pub async fn get(&self, user_id: i64) -> Result<Option<UserRecord>> {
        if let Some(record) = self.cache.get(&user_id) {
            return Ok(Some(record));
        }

        let record = self.collection.find_one(doc! { "_id": user_id }).await?;
        if let Some(record) = &record {
            self.cache.insert(user_id, record.clone());
        }
        Ok(record)
    }

    /// Get the record for a user, creating a fresh one (privacy not
    /// accepted, no subscription) on first contact.
    pub async fn ensure_exists(&self, user_id: i64) -> Result<UserRecord> {
        if let Some(record) = self.get(user_id).await? {
            return Ok(record);
        }

        let record = UserRecord::new(user_id);
        self.save(&record).await?;
        debug!("Created user record {}", user_id);
        Ok(record)
    }

    /// Whether the user has accepted the privacy policy.
    pub async fn has_accepted_privacy(&self, user_id: i64) -> Result<bool> {
        Ok(self
            .get(user_id)
            .await?
            .map(|r| r.privacy_accepted)
            .unwrap_or(false))
    }

    /// Mark the privacy policy as accepted.
    pub async fn accept_privacy(&self, user_id: i64) -> Result<()> {
        let mut record = self.ensure_exists(user_id).await?;
        record.privacy_accepted = true;
        self.save(&record).await
    }

    /// Set or replace the subscription sub-record.
    pub async fn set_subscription(&self, user_id: i64, subscription: Subscription) -> Result<()> {
        let mut record = self.ensure_exists(user_id).await?;
        record.subscription = Some(subscription);
        self.save(&record).await
    }

    async fn save(&self, record: &UserRecord) -> Result<()> {
        let options = mongodb::options::ReplaceOptions::builder()
            .upsert(true)
            .build();

        self.collection
            .replace_one(doc! { "_id": record.id }, record)
            .with_options(options)
            .await?;

        self.cache.insert(record.id, record.clone());
        Ok(())
    }
}
