//! Mkvdex DB - SQLite catalogue storage.

mod database;
mod error;
mod migrations;
mod operations;

pub use database::Database;
pub use error::{DbError, DbResult};
pub use operations::embeddings::l2_distance;
pub use operations::export::EXPORT_COLUMNS;
pub use operations::media::UpsertCounts;
pub use operations::search::{SearchPage, SearchRow};
pub use operations::summary::ReplaceOutcome;
