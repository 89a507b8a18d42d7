use crate::error::FavoriteError;
use crate::types::{FavoriteEvent, FavoritePayload};

/// Outcome of an upsert: the stored record plus whether this call inserted it.
#[derive(Debug, Clone)]
pub struct UpsertOutcome {
    pub favorite: FavoriteEvent,
    pub created: bool,
}

pub trait FavoriteRepository {
    /// All favorites ordered by `created_at` ascending (oldest first). The
    /// client re-sorts newest-first for display; ascending is the wire
    /// contract.
    fn list(&self) -> Result<Vec<FavoriteEvent>, FavoriteError>;

    /// Atomic upsert keyed by the external event id. A re-add overwrites the
    /// display fields and preserves the original `created_at`.
    fn add(&self, payload: &FavoritePayload) -> Result<UpsertOutcome, FavoriteError>;

    /// Deletes and returns the record, or `NotFound`.
    fn remove(&self, id: &str) -> Result<FavoriteEvent, FavoriteError>;
}
