//! Database models.

mod item;
mod user;

pub use item::{CatalogueItem, Category, Quality};
pub use user::{Subscription, UserRecord};
