use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One row of a keyword/geo search, reshaped from the ticketing provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct EventSummary {
    pub id: String,
    pub name: String,
    pub date: String,
    pub time: String,
    pub venue: String,
    pub genre: String,
    pub image: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventDetail {
    pub id: String,
    pub name: String,
    pub url: String,
    pub date: String,
    pub time: String,
    pub status: String,
    pub venue: Option<VenueDetail>,
    pub genres: Vec<String>,
    pub artists: Vec<Artist>,
    pub price_ranges: Option<Vec<PriceRange>>,
    pub seatmap_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VenueDetail {
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub location: Option<VenueLocation>,
    pub url: Option<String>,
    pub image: Option<String>,
    pub general_rule: Option<String>,
    pub child_rule: Option<String>,
    pub parking_detail: Option<String>,
}

/// Coordinates as the ticketing provider reports them: strings, not numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct VenueLocation {
    pub latitude: Option<String>,
    pub longitude: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Artist {
    pub name: String,
    pub url: Option<String>,
    pub twitter: Option<String>,
    pub facebook: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PriceRange {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub currency: Option<String>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// One keyword suggestion from the ticketing provider's suggest endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Suggestion {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SuggestionList {
    pub suggestions: Vec<Suggestion>,
}

/// Music-metadata lookup result. `artist` is null when the provider has no
/// match or credentials are not configured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ArtistResponse {
    pub artist: Option<ArtistInfo>,
    pub albums: Vec<AlbumInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArtistInfo {
    pub id: String,
    pub name: String,
    pub followers: u64,
    pub popularity: u32,
    pub genres: Vec<String>,
    pub spotify_url: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AlbumInfo {
    pub id: String,
    pub name: String,
    pub release_date: Option<String>,
    pub total_tracks: Option<u32>,
    pub spotify_url: Option<String>,
    pub image: Option<String>,
}
