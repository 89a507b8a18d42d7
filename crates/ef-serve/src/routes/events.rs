use crate::middleware::correlation::CorrelationId;
use crate::routes::error::map_error;
use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Extension, Json, Router};
use ef_core::error::EventError;
use ef_core::types::{ArtistResponse, EventDetail, EventSummary, SuggestionList};
use ef_upstream::ticketmaster::SearchParams;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct SearchQuery {
    keyword: Option<String>,
    category: Option<String>,
    lat: Option<f64>,
    lng: Option<f64>,
    distance: Option<u32>,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct ArtistQuery {
    name: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct SuggestQuery {
    keyword: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/events/search", get(search_events))
        .route("/events/spotify/artist", get(artist_info))
        .route("/events/suggestions", get(suggestions))
        .route("/events/{id}", get(event_details))
        .with_state(state)
}

fn required<'a>(value: Option<&'a str>, name: &'static str) -> Result<&'a str, EventError> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or(EventError::MissingParam { name })
}

#[utoipa::path(
    get,
    path = "/api/events/search",
    params(SearchQuery),
    responses(
        (status = 200, body = Vec<EventSummary>),
        (status = 400, description = "Missing keyword")
    )
)]
pub(crate) async fn search_events(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Query(query): Query<SearchQuery>,
) -> Response {
    let keyword = match required(query.keyword.as_deref(), "keyword") {
        Ok(keyword) => keyword,
        Err(err) => return map_error(&err.into(), Some(&correlation.0)).into_response(),
    };

    let params = SearchParams {
        keyword: keyword.to_string(),
        category: query.category,
        lat: query.lat,
        lng: query.lng,
        distance_miles: query.distance,
    };
    match state.upstream.ticketmaster.search(&params).await {
        Ok(events) => Json(events).into_response(),
        Err(err) => map_error(&err.into(), Some(&correlation.0)).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/events/{id}",
    params(("id" = String, Path, description = "Ticketing provider event id")),
    responses(
        (status = 200, body = EventDetail),
        (status = 404, description = "Unknown event")
    )
)]
pub(crate) async fn event_details(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Path(id): Path<String>,
) -> Response {
    match state.upstream.ticketmaster.detail(&id).await {
        Ok(detail) => Json(detail).into_response(),
        Err(err) => map_error(&err.into(), Some(&correlation.0)).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/events/spotify/artist",
    params(ArtistQuery),
    responses(
        (status = 200, body = ArtistResponse),
        (status = 400, description = "Missing name")
    )
)]
pub(crate) async fn artist_info(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Query(query): Query<ArtistQuery>,
) -> Response {
    let name = match required(query.name.as_deref(), "name") {
        Ok(name) => name,
        Err(err) => return map_error(&err.into(), Some(&correlation.0)).into_response(),
    };

    match state.upstream.spotify.artist(name).await {
        Ok(response) => Json(response).into_response(),
        Err(err) => map_error(&err.into(), Some(&correlation.0)).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/events/suggestions",
    params(SuggestQuery),
    responses(
        (status = 200, body = SuggestionList),
        (status = 400, description = "Missing keyword")
    )
)]
pub(crate) async fn suggestions(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Query(query): Query<SuggestQuery>,
) -> Response {
    let keyword = match required(query.keyword.as_deref(), "keyword") {
        Ok(keyword) => keyword,
        Err(err) => return map_error(&err.into(), Some(&correlation.0)).into_response(),
    };

    match state.upstream.ticketmaster.suggest(keyword).await {
        Ok(list) => Json(list).into_response(),
        Err(err) => map_error(&err.into(), Some(&correlation.0)).into_response(),
    }
}
