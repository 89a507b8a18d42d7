use ef_core::error::EventError;
use ef_core::types::event::{Suggestion, SuggestionList, VenueLocation};
use ef_core::types::{Artist, EventDetail, EventSummary, PriceRange, VenueDetail};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{error, warn};

pub struct TicketmasterClient {
    http: Client,
    base_url: String,
    api_key: String,
}

/// Search inputs as the mobile client sends them. Distance is in miles.
#[derive(Debug, Clone, Default)]
pub struct SearchParams {
    pub keyword: String,
    pub category: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub distance_miles: Option<u32>,
}

const DEFAULT_DISTANCE_MILES: u32 = 10;

/// Discovery API segment ids. `Default` (or anything unknown) means
/// unrestricted.
fn segment_id_for(category: &str) -> Option<&'static str> {
    match category {
        "Music" => Some("KZFzniwnSyZfZ7v7nJ"),
        "Sports" => Some("KZFzniwnSyZfZ7v7nE"),
        "Arts & Theatre" => Some("KZFzniwnSyZfZ7v7na"),
        "Film" => Some("KZFzniwnSyZfZ7v7nn"),
        "Miscellaneous" => Some("KZFzniwnSyZfZ7v7n1"),
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    #[serde(rename = "_embedded")]
    embedded: Option<SearchEmbedded>,
}

#[derive(Debug, Deserialize)]
struct SearchEmbedded {
    #[serde(default)]
    events: Vec<EventDoc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventDoc {
    id: String,
    name: Option<String>,
    url: Option<String>,
    #[serde(default)]
    images: Vec<ImageDoc>,
    dates: Option<DatesDoc>,
    classifications: Option<Vec<ClassificationDoc>>,
    price_ranges: Option<Vec<PriceRangeDoc>>,
    seatmap: Option<SeatmapDoc>,
    #[serde(rename = "_embedded")]
    embedded: Option<EventEmbedded>,
}

#[derive(Debug, Deserialize)]
struct ImageDoc {
    url: String,
}

#[derive(Debug, Deserialize)]
struct DatesDoc {
    start: Option<StartDoc>,
    status: Option<StatusDoc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StartDoc {
    local_date: Option<String>,
    local_time: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StatusDoc {
    code: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClassificationDoc {
    segment: Option<NamedDoc>,
    genre: Option<NamedDoc>,
    sub_genre: Option<NamedDoc>,
}

#[derive(Debug, Deserialize)]
struct NamedDoc {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PriceRangeDoc {
    #[serde(rename = "type")]
    kind: Option<String>,
    currency: Option<String>,
    min: Option<f64>,
    max: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeatmapDoc {
    static_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EventEmbedded {
    #[serde(default)]
    venues: Vec<VenueDoc>,
    #[serde(default)]
    attractions: Vec<AttractionDoc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VenueDoc {
    name: Option<String>,
    url: Option<String>,
    #[serde(default)]
    images: Vec<ImageDoc>,
    address: Option<AddressDoc>,
    city: Option<NamedDoc>,
    state: Option<StateDoc>,
    postal_code: Option<String>,
    country: Option<CountryDoc>,
    location: Option<LocationDoc>,
    general_info: Option<GeneralInfoDoc>,
    parking_detail: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AddressDoc {
    line1: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StateDoc {
    name: Option<String>,
    state_code: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CountryDoc {
    name: Option<String>,
    country_code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LocationDoc {
    latitude: Option<String>,
    longitude: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeneralInfoDoc {
    general_rule: Option<String>,
    child_rule: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AttractionDoc {
    id: Option<String>,
    name: Option<String>,
    url: Option<String>,
    #[serde(default)]
    images: Vec<ImageDoc>,
    external_links: Option<ExternalLinksDoc>,
}

#[derive(Debug, Deserialize)]
struct ExternalLinksDoc {
    #[serde(default)]
    twitter: Vec<LinkDoc>,
    #[serde(default)]
    facebook: Vec<LinkDoc>,
}

#[derive(Debug, Deserialize)]
struct LinkDoc {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SuggestEnvelope {
    #[serde(rename = "_embedded")]
    embedded: Option<SuggestEmbedded>,
}

#[derive(Debug, Deserialize)]
struct SuggestEmbedded {
    #[serde(default)]
    attractions: Vec<AttractionDoc>,
}

fn first_image(images: &[ImageDoc]) -> String {
    images.first().map(|image| image.url.clone()).unwrap_or_default()
}

fn start_date_time(dates: Option<&DatesDoc>) -> (String, String) {
    let start = dates.and_then(|dates| dates.start.as_ref());
    (
        start
            .and_then(|start| start.local_date.clone())
            .unwrap_or_default(),
        start
            .and_then(|start| start.local_time.clone())
            .unwrap_or_default(),
    )
}

/// Flattens one search row to the shape the client renders: first image,
/// first venue, first classification's segment.
fn summarize_event(doc: EventDoc) -> EventSummary {
    let (date, time) = start_date_time(doc.dates.as_ref());
    let venue = doc
        .embedded
        .as_ref()
        .and_then(|embedded| embedded.venues.first())
        .and_then(|venue| venue.name.clone())
        .unwrap_or_default();
    let genre = doc
        .classifications
        .as_ref()
        .and_then(|classifications| classifications.first())
        .and_then(|classification| classification.segment.as_ref())
        .and_then(|segment| segment.name.clone())
        .unwrap_or_default();

    EventSummary {
        id: doc.id,
        name: doc.name.unwrap_or_default(),
        date,
        time,
        venue,
        genre,
        image: first_image(&doc.images),
        url: doc.url.unwrap_or_default(),
    }
}

/// Segment, genre, and sub-genre names across all classifications, in order,
/// deduplicated, with the provider's `Undefined` placeholder dropped.
fn collect_genres(classifications: &[ClassificationDoc]) -> Vec<String> {
    let mut genres: Vec<String> = Vec::new();
    let names = classifications.iter().flat_map(|classification| {
        [
            classification.segment.as_ref(),
            classification.genre.as_ref(),
            classification.sub_genre.as_ref(),
        ]
    });
    for name in names.flatten().filter_map(|named| named.name.as_deref()) {
        if name.is_empty() || name.eq_ignore_ascii_case("undefined") {
            continue;
        }
        if !genres.iter().any(|existing| existing == name) {
            genres.push(name.to_string());
        }
    }
    genres
}

fn venue_detail(doc: VenueDoc) -> VenueDetail {
    VenueDetail {
        name: doc.name.unwrap_or_default(),
        address: doc
            .address
            .and_then(|address| address.line1)
            .unwrap_or_default(),
        city: doc.city.and_then(|city| city.name).unwrap_or_default(),
        state: doc
            .state
            .and_then(|state| state.name.or(state.state_code))
            .unwrap_or_default(),
        postal_code: doc.postal_code.unwrap_or_default(),
        country: doc
            .country
            .and_then(|country| country.name.or(country.country_code))
            .unwrap_or_default(),
        location: doc.location.map(|location| VenueLocation {
            latitude: location.latitude,
            longitude: location.longitude,
        }),
        url: doc.url,
        image: doc.images.first().map(|image| image.url.clone()),
        general_rule: doc
            .general_info
            .as_ref()
            .and_then(|info| info.general_rule.clone()),
        child_rule: doc
            .general_info
            .as_ref()
            .and_then(|info| info.child_rule.clone()),
        parking_detail: doc.parking_detail,
    }
}

fn artist_from(doc: AttractionDoc) -> Artist {
    let image = doc.images.first().map(|image| image.url.clone());
    let (twitter, facebook) = match doc.external_links {
        Some(links) => (
            links.twitter.into_iter().find_map(|link| link.url),
            links.facebook.into_iter().find_map(|link| link.url),
        ),
        None => (None, None),
    };
    Artist {
        name: doc.name.unwrap_or_default(),
        url: doc.url,
        twitter,
        facebook,
        image,
    }
}

fn detail_from_doc(doc: EventDoc) -> EventDetail {
    let (date, time) = start_date_time(doc.dates.as_ref());
    let status = doc
        .dates
        .as_ref()
        .and_then(|dates| dates.status.as_ref())
        .and_then(|status| status.code.clone())
        .unwrap_or_default();
    let genres = doc
        .classifications
        .as_deref()
        .map(collect_genres)
        .unwrap_or_default();
    let (venue, artists) = match doc.embedded {
        Some(embedded) => (
            embedded.venues.into_iter().next().map(venue_detail),
            embedded.attractions.into_iter().map(artist_from).collect(),
        ),
        None => (None, Vec::new()),
    };

    EventDetail {
        id: doc.id,
        name: doc.name.unwrap_or_default(),
        url: doc.url.unwrap_or_default(),
        date,
        time,
        status,
        venue,
        genres,
        artists,
        price_ranges: doc.price_ranges.map(|ranges| {
            ranges
                .into_iter()
                .map(|range| PriceRange {
                    kind: range.kind,
                    currency: range.currency,
                    min: range.min,
                    max: range.max,
                })
                .collect()
        }),
        seatmap_url: doc.seatmap.and_then(|seatmap| seatmap.static_url),
    }
}

fn suggestions_from(envelope: SuggestEnvelope) -> SuggestionList {
    let attractions = envelope
        .embedded
        .map(|embedded| embedded.attractions)
        .unwrap_or_default();
    SuggestionList {
        suggestions: attractions
            .into_iter()
            .filter_map(|attraction| {
                let name = attraction.name?;
                Some(Suggestion {
                    id: attraction.id.unwrap_or_default(),
                    name,
                })
            })
            .collect(),
    }
}

impl TicketmasterClient {
    pub fn new(http: Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Keyword/geo search, reshaped to the rows the client renders. With no
    /// API key configured the feature degrades to an empty result.
    ///
    /// # Errors
    ///
    /// `EventError::Upstream` on transport failure, `UpstreamStatus` on a
    /// non-success provider status, `Decode` when the payload is not the
    /// expected shape.
    pub async fn search(&self, params: &SearchParams) -> Result<Vec<EventSummary>, EventError> {
        if self.api_key.is_empty() {
            warn!("ticketmaster api key not configured, search disabled");
            return Ok(Vec::new());
        }

        let url = format!("{}/events.json", self.base_url);
        let mut query: Vec<(&str, String)> = vec![
            ("apikey", self.api_key.clone()),
            ("keyword", params.keyword.clone()),
            ("size", "50".to_string()),
        ];
        if let (Some(lat), Some(lng)) = (params.lat, params.lng) {
            query.push(("latlong", format!("{lat},{lng}")));
            query.push((
                "radius",
                params
                    .distance_miles
                    .unwrap_or(DEFAULT_DISTANCE_MILES)
                    .to_string(),
            ));
            query.push(("unit", "miles".to_string()));
        }
        if let Some(segment) = params
            .category
            .as_deref()
            .and_then(segment_id_for)
        {
            query.push(("segmentId", segment.to_string()));
        }

        let envelope: SearchEnvelope = self.get_json(&url, &query).await?;
        Ok(envelope
            .embedded
            .map(|embedded| embedded.events)
            .unwrap_or_default()
            .into_iter()
            .map(summarize_event)
            .collect())
    }

    /// Per-event detail.
    ///
    /// # Errors
    ///
    /// `EventError::NotFound` when the provider answers 404 (or no key is
    /// configured); otherwise as [`Self::search`].
    pub async fn detail(&self, id: &str) -> Result<EventDetail, EventError> {
        if self.api_key.is_empty() {
            warn!("ticketmaster api key not configured, detail disabled");
            return Err(EventError::NotFound);
        }

        let url = format!("{}/events/{id}.json", self.base_url);
        let query = [("apikey", self.api_key.clone())];
        let doc: EventDoc = self.get_json(&url, &query).await?;
        Ok(detail_from_doc(doc))
    }

    /// Keyword suggestions from the provider's suggest endpoint.
    ///
    /// # Errors
    ///
    /// As [`Self::search`]; no key degrades to an empty list.
    pub async fn suggest(&self, keyword: &str) -> Result<SuggestionList, EventError> {
        if self.api_key.is_empty() {
            warn!("ticketmaster api key not configured, suggestions disabled");
            return Ok(SuggestionList {
                suggestions: Vec::new(),
            });
        }

        let url = format!("{}/suggest.json", self.base_url);
        let query = [
            ("apikey", self.api_key.clone()),
            ("keyword", keyword.to_string()),
        ];
        let envelope: SuggestEnvelope = self.get_json(&url, &query).await?;
        Ok(suggestions_from(envelope))
    }

    async fn get_json<T, Q>(&self, url: &str, query: &Q) -> Result<T, EventError>
    where
        T: serde::de::DeserializeOwned,
        Q: serde::Serialize + ?Sized,
    {
        let response = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|err| EventError::Upstream {
                message: err.to_string(),
            })?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(EventError::NotFound);
        }
        if !status.is_success() {
            error!(status = status.as_u16(), url, "ticketmaster request failed");
            return Err(EventError::UpstreamStatus {
                status: status.as_u16(),
            });
        }
        response.json().await.map_err(|err| EventError::Decode {
            message: err.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn search_row() -> serde_json::Value {
        serde_json::json!({
            "id": "vvG1zZ9pB0eahG",
            "name": "The National",
            "url": "https://tickets.example/e/vvG1zZ9pB0eahG",
            "images": [
                { "url": "https://img.example/poster.jpg" },
                { "url": "https://img.example/thumb.jpg" }
            ],
            "dates": { "start": { "localDate": "2025-07-04", "localTime": "20:00:00" } },
            "classifications": [
                { "segment": { "name": "Music" }, "genre": { "name": "Rock" } }
            ],
            "_embedded": {
                "venues": [ { "name": "Paramount Theatre" }, { "name": "Other" } ]
            }
        })
    }

    #[test]
    fn search_row_flattens_to_first_of_everything() {
        let doc: EventDoc = serde_json::from_value(search_row()).unwrap();
        let summary = summarize_event(doc);

        assert_eq!(summary.id, "vvG1zZ9pB0eahG");
        assert_eq!(summary.date, "2025-07-04");
        assert_eq!(summary.time, "20:00:00");
        assert_eq!(summary.venue, "Paramount Theatre");
        assert_eq!(summary.genre, "Music");
        assert_eq!(summary.image, "https://img.example/poster.jpg");
    }

    #[test]
    fn missing_optional_fields_become_empty_strings() {
        let doc: EventDoc = serde_json::from_value(serde_json::json!({ "id": "x" })).unwrap();
        let summary = summarize_event(doc);

        assert_eq!(summary.name, "");
        assert_eq!(summary.date, "");
        assert_eq!(summary.venue, "");
        assert_eq!(summary.image, "");
    }

    #[test]
    fn genres_deduplicate_and_drop_undefined() {
        let classifications: Vec<ClassificationDoc> = serde_json::from_value(serde_json::json!([
            {
                "segment": { "name": "Music" },
                "genre": { "name": "Rock" },
                "subGenre": { "name": "Undefined" }
            },
            {
                "segment": { "name": "Music" },
                "genre": { "name": "Alternative" }
            }
        ]))
        .unwrap();

        assert_eq!(
            collect_genres(&classifications),
            vec!["Music", "Rock", "Alternative"]
        );
    }

    #[test]
    fn detail_extracts_venue_artists_and_seatmap() {
        let doc: EventDoc = serde_json::from_value(serde_json::json!({
            "id": "ev9",
            "name": "Festival",
            "url": "https://tickets.example/e/ev9",
            "dates": {
                "start": { "localDate": "2025-08-01", "localTime": "12:00:00" },
                "status": { "code": "onsale" }
            },
            "seatmap": { "staticUrl": "https://img.example/seatmap.png" },
            "priceRanges": [ { "type": "standard", "currency": "USD", "min": 39.5, "max": 120.0 } ],
            "_embedded": {
                "venues": [ {
                    "name": "Gorge Amphitheatre",
                    "postalCode": "98848",
                    "address": { "line1": "754 Silica Rd NW" },
                    "city": { "name": "Quincy" },
                    "state": { "name": "Washington", "stateCode": "WA" },
                    "country": { "name": "United States Of America", "countryCode": "US" },
                    "location": { "latitude": "47.0876", "longitude": "-119.9971" }
                } ],
                "attractions": [ {
                    "name": "Headliner",
                    "url": "https://artist.example",
                    "images": [ { "url": "https://img.example/artist.jpg" } ],
                    "externalLinks": {
                        "twitter": [ { "url": "https://twitter.com/headliner" } ],
                        "facebook": [ { "url": "https://facebook.com/headliner" } ]
                    }
                } ]
            }
        }))
        .unwrap();

        let detail = detail_from_doc(doc);
        assert_eq!(detail.status, "onsale");
        assert_eq!(detail.seatmap_url.as_deref(), Some("https://img.example/seatmap.png"));

        let venue = detail.venue.unwrap();
        assert_eq!(venue.name, "Gorge Amphitheatre");
        assert_eq!(venue.address, "754 Silica Rd NW");
        assert_eq!(venue.state, "Washington");
        assert_eq!(venue.location.unwrap().latitude.as_deref(), Some("47.0876"));

        assert_eq!(detail.artists.len(), 1);
        assert_eq!(
            detail.artists[0].twitter.as_deref(),
            Some("https://twitter.com/headliner")
        );

        let ranges = detail.price_ranges.unwrap();
        assert_eq!(ranges[0].min, Some(39.5));
    }

    #[test]
    fn suggestions_come_from_embedded_attractions() {
        let envelope: SuggestEnvelope = serde_json::from_value(serde_json::json!({
            "_embedded": {
                "attractions": [
                    { "id": "K8vZ1", "name": "Coldplay" },
                    { "name": "Cold War Kids" },
                    { "id": "K8vZ3" }
                ]
            }
        }))
        .unwrap();

        let list = suggestions_from(envelope);
        assert_eq!(list.suggestions.len(), 2);
        assert_eq!(list.suggestions[0].name, "Coldplay");
        assert_eq!(list.suggestions[1].id, "");
    }
}
