use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A saved event. The display fields are denormalized copies supplied by the
/// client at favorite-time; the store never re-fetches them from the source
/// API. `image` is the poster image url.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteEvent {
    pub id: String,
    pub name: String,
    pub date: String,
    pub time: String,
    pub venue: String,
    pub genre: String,
    pub image: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

/// POST body for adding (or re-adding) a favorite. `created_at` is
/// server-assigned and absent here.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FavoritePayload {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub venue: String,
    #[serde(default)]
    pub genre: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub url: String,
}
