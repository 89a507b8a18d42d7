pub mod error;
pub mod favorites;

pub mod types;

pub use crate::error::EventFinderError;
pub use crate::favorites::{FavoriteRepository, UpsertOutcome};
