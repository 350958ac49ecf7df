//! Per-concern repositories over the MongoDB collections.

mod catalogue_repo;
mod user_repo;

pub use catalogue_repo::CatalogueRepo;
pub use user_repo::UserRepo;
