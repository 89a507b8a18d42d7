use std::net::SocketAddr;

use crate::middleware::correlation::CorrelationId;
use crate::routes::error::map_error;
use crate::AppState;
use axum::extract::{ConnectInfo, Query, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Extension, Json, Router};
use ef_core::error::GeoError;
use ef_core::types::{GeoLocation, PlacePrediction};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct GeocodeQuery {
    address: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct AutocompleteQuery {
    input: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PredictionsBody {
    pub predictions: Vec<PlacePrediction>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/geo/ip-location", get(ip_location))
        .route("/geo/geocode", get(geocode))
        .route("/geo/autocomplete", get(autocomplete))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/geo/ip-location",
    responses(
        (status = 200, body = GeoLocation),
        (status = 404, description = "Could not determine location")
    )
)]
pub(crate) async fn ip_location(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Response {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .map(ToString::to_string);
    let raw_ip = forwarded.unwrap_or_else(|| peer.ip().to_string());

    match state.upstream.ipinfo.lookup(Some(&raw_ip)).await {
        Ok(Some(location)) => Json(location).into_response(),
        Ok(None) => map_error(&GeoError::NotFound.into(), Some(&correlation.0)).into_response(),
        Err(err) => map_error(&err.into(), Some(&correlation.0)).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/geo/geocode",
    params(GeocodeQuery),
    responses(
        (status = 200, body = GeoLocation),
        (status = 400, description = "Missing address"),
        (status = 404, description = "Unresolvable address")
    )
)]
pub(crate) async fn geocode(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Query(query): Query<GeocodeQuery>,
) -> Response {
    let Some(address) = query
        .address
        .as_deref()
        .map(str::trim)
        .filter(|address| !address.is_empty())
    else {
        return map_error(
            &GeoError::MissingParam { name: "address" }.into(),
            Some(&correlation.0),
        )
        .into_response();
    };

    match state.upstream.maps.geocode(address).await {
        Ok(location) => Json(location).into_response(),
        Err(err) => map_error(&err.into(), Some(&correlation.0)).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/geo/autocomplete",
    params(AutocompleteQuery),
    responses(
        (status = 200, body = PredictionsBody),
        (status = 400, description = "Missing input")
    )
)]
pub(crate) async fn autocomplete(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Query(query): Query<AutocompleteQuery>,
) -> Response {
    let Some(input) = query
        .input
        .as_deref()
        .map(str::trim)
        .filter(|input| !input.is_empty())
    else {
        return map_error(
            &GeoError::MissingParam { name: "input" }.into(),
            Some(&correlation.0),
        )
        .into_response();
    };

    // Provider failures degrade to an empty list inside the client.
    let predictions = state.upstream.maps.autocomplete(input).await;
    Json(PredictionsBody { predictions }).into_response()
}
