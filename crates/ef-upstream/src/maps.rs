use ef_core::error::GeoError;
use ef_core::types::{GeoLocation, PlacePrediction};
use reqwest::Client;
use serde::Deserialize;
use tracing::{error, warn};

pub struct MapsClient {
    http: Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: Option<LatLng>,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize)]
struct AutocompleteResponse {
    status: String,
    error_message: Option<String>,
    #[serde(default)]
    predictions: Vec<PredictionDoc>,
}

#[derive(Debug, Deserialize)]
struct PredictionDoc {
    description: String,
    place_id: String,
}

/// Only the first candidate's coordinates count; a non-OK provider status or
/// an empty result list is "could not geocode".
fn geocode_outcome(payload: GeocodeResponse) -> Result<GeoLocation, GeoError> {
    if let Some(message) = &payload.error_message {
        error!(%message, "geocoding provider reported an error");
    }
    if payload.status != "OK" {
        return Err(GeoError::NotFound);
    }
    let location = payload
        .results
        .into_iter()
        .next()
        .and_then(|result| result.geometry)
        .and_then(|geometry| geometry.location)
        .ok_or(GeoError::NotFound)?;
    Ok(GeoLocation {
        lat: location.lat,
        lng: location.lng,
        city: None,
        region: None,
        country: None,
    })
}

fn predictions_from(payload: AutocompleteResponse) -> Vec<PlacePrediction> {
    if let Some(message) = &payload.error_message {
        error!(%message, "places provider reported an error");
    }
    if payload.status != "OK" {
        return Vec::new();
    }
    payload
        .predictions
        .into_iter()
        .map(|p| PlacePrediction {
            description: p.description,
            place_id: p.place_id,
        })
        .collect()
}

impl MapsClient {
    pub fn new(http: Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Resolves a free-text address to coordinates.
    ///
    /// # Errors
    ///
    /// `GeoError::NotFound` when the key is unconfigured, the provider
    /// answers a non-success HTTP or API status, or zero candidates come
    /// back; `GeoError::Upstream` on transport failure.
    pub async fn geocode(&self, address: &str) -> Result<GeoLocation, GeoError> {
        if self.api_key.is_empty() {
            warn!("maps api key not configured, geocoding disabled");
            return Err(GeoError::NotFound);
        }

        let url = format!("{}/geocode/json", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[("address", address), ("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|err| GeoError::Upstream {
                message: err.to_string(),
            })?;
        let status = response.status();
        if !status.is_success() {
            error!(status = status.as_u16(), "geocoding request failed");
            return Err(GeoError::NotFound);
        }

        let payload: GeocodeResponse =
            response.json().await.map_err(|err| GeoError::Upstream {
                message: err.to_string(),
            })?;
        geocode_outcome(payload)
    }

    /// City-level autocomplete. Provider failures of any kind degrade to an
    /// empty list; they are logged, never surfaced.
    pub async fn autocomplete(&self, input: &str) -> Vec<PlacePrediction> {
        if self.api_key.is_empty() {
            warn!("maps api key not configured, autocomplete disabled");
            return Vec::new();
        }

        let url = format!("{}/place/autocomplete/json", self.base_url);
        let response = match self
            .http
            .get(&url)
            .query(&[
                ("input", input),
                ("types", "(cities)"),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                error!(error = %err, "autocomplete request failed");
                return Vec::new();
            }
        };
        let status = response.status();
        if !status.is_success() {
            error!(status = status.as_u16(), "autocomplete request failed");
            return Vec::new();
        }

        match response.json::<AutocompleteResponse>().await {
            Ok(payload) => predictions_from(payload),
            Err(err) => {
                error!(error = %err, "autocomplete payload decode failed");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_candidate_wins() {
        let payload: GeocodeResponse = serde_json::from_value(serde_json::json!({
            "status": "OK",
            "results": [
                { "geometry": { "location": { "lat": 47.6062, "lng": -122.3321 } } },
                { "geometry": { "location": { "lat": 0.0, "lng": 0.0 } } }
            ]
        }))
        .unwrap();

        let location = geocode_outcome(payload).unwrap();
        assert_eq!(location.lat, 47.6062);
        assert_eq!(location.lng, -122.3321);
    }

    #[test]
    fn zero_results_is_not_found() {
        let payload: GeocodeResponse = serde_json::from_value(serde_json::json!({
            "status": "ZERO_RESULTS",
            "results": []
        }))
        .unwrap();

        assert!(matches!(geocode_outcome(payload), Err(GeoError::NotFound)));
    }

    #[test]
    fn ok_status_without_geometry_is_not_found() {
        let payload: GeocodeResponse = serde_json::from_value(serde_json::json!({
            "status": "OK",
            "results": [ {} ]
        }))
        .unwrap();

        assert!(matches!(geocode_outcome(payload), Err(GeoError::NotFound)));
    }

    #[test]
    fn predictions_pass_through_verbatim() {
        let payload: AutocompleteResponse = serde_json::from_value(serde_json::json!({
            "status": "OK",
            "predictions": [
                { "description": "Seattle, WA, USA", "place_id": "ChIJVTPokywQkFQRmtVEaUZlJRA" },
                { "description": "Seatac, WA, USA", "place_id": "ChIJk2MBmG5bkFQRtcYk-0vEYsY" }
            ]
        }))
        .unwrap();

        let predictions = predictions_from(payload);
        assert_eq!(predictions.len(), 2);
        assert_eq!(predictions[0].description, "Seattle, WA, USA");
        assert_eq!(predictions[1].place_id, "ChIJk2MBmG5bkFQRtcYk-0vEYsY");
    }

    #[test]
    fn denied_status_yields_empty_predictions() {
        let payload: AutocompleteResponse = serde_json::from_value(serde_json::json!({
            "status": "REQUEST_DENIED",
            "error_message": "The provided API key is invalid."
        }))
        .unwrap();

        assert!(predictions_from(payload).is_empty());
    }
}
