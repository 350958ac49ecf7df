//! Catalogue search.
//!
//! - `normalize` - canonicalizes free-text queries
//! - `filter` - builds store filters and facet counts from a query

pub mod filter;
pub mod normalize;

pub use filter::SearchFilter;
pub use normalize::{conjunction_pattern, normalize};
