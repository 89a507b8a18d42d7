use utoipa::OpenApi;

use crate::routes::error::ErrorBody;
use crate::routes::events::{ArtistQuery, SearchQuery, SuggestQuery};
use crate::routes::geo::{AutocompleteQuery, GeocodeQuery, PredictionsBody};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use ef_core::types::event::VenueLocation;
use ef_core::types::{
    AlbumInfo, Artist, ArtistInfo, ArtistResponse, EventDetail, EventSummary, FavoriteEvent,
    FavoritePayload, GeoLocation, PlacePrediction, PriceRange, Suggestion, SuggestionList,
    VenueDetail,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::favorites::list_favorites,
        crate::routes::favorites::add_favorite,
        crate::routes::favorites::remove_favorite,
        crate::routes::geo::ip_location,
        crate::routes::geo::geocode,
        crate::routes::geo::autocomplete,
        crate::routes::events::search_events,
        crate::routes::events::event_details,
        crate::routes::events::artist_info,
        crate::routes::events::suggestions
    ),
    components(schemas(
        FavoriteEvent,
        FavoritePayload,
        GeoLocation,
        PlacePrediction,
        PredictionsBody,
        GeocodeQuery,
        AutocompleteQuery,
        EventSummary,
        EventDetail,
        VenueDetail,
        VenueLocation,
        Artist,
        PriceRange,
        Suggestion,
        SuggestionList,
        ArtistResponse,
        ArtistInfo,
        AlbumInfo,
        SearchQuery,
        ArtistQuery,
        SuggestQuery,
        ErrorBody
    ))
)]
struct ApiDoc;

pub fn generate_spec() -> String {
    ApiDoc::openapi()
        .to_json()
        .unwrap_or_else(|_| "{}".to_string())
}

pub fn ensure_initialized() {
    let _ = ApiDoc::openapi();
}

pub fn router() -> Router {
    Router::new()
        .route("/openapi.json", get(openapi_json))
        .route("/docs", get(docs_page))
}

async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

async fn docs_page() -> impl IntoResponse {
    let html = r#"<!doctype html>
<html lang="en">
  <head>
    <meta charset="utf-8">
    <title>EventFinder API Docs</title>
    <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css">
  </head>
  <body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script>
      window.ui = SwaggerUIBundle({ url: '/api/openapi.json', dom_id: '#swagger-ui' });
    </script>
  </body>
</html>
"#;
    axum::response::Html(html)
}
