//! Event handlers for non-command updates.

pub mod feed;
