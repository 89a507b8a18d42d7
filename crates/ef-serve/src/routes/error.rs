use axum::http::StatusCode;
use axum::Json;
use ef_core::error::{EventError, FavoriteError, GeoError};
use ef_core::EventFinderError;
use serde::Serialize;
use tracing::error;
use utoipa::ToSchema;

const GENERIC_MESSAGE: &str = "Internal server error";

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

/// Maps a domain error to HTTP status + the `{ "error": ... }` body. Upstream
/// and storage detail never reaches the client; it is logged here with the
/// correlation id.
pub fn map_error(
    err: &EventFinderError,
    correlation_id: Option<&str>,
) -> (StatusCode, Json<ErrorBody>) {
    let (status, message) = match err {
        EventFinderError::Favorite(favorite) => map_favorite_error(favorite),
        EventFinderError::Geo(geo) => map_geo_error(geo),
        EventFinderError::Event(event) => map_event_error(event),
        EventFinderError::Internal { .. } => {
            (StatusCode::INTERNAL_SERVER_ERROR, GENERIC_MESSAGE.to_string())
        }
    };

    if status == StatusCode::INTERNAL_SERVER_ERROR && message == GENERIC_MESSAGE {
        error!(correlation_id, detail = %err, "request failed");
    }

    (status, Json(ErrorBody { error: message }))
}

fn map_favorite_error(err: &FavoriteError) -> (StatusCode, String) {
    match err {
        FavoriteError::NotFound => (StatusCode::NOT_FOUND, err.to_string()),
        FavoriteError::InvalidInput { .. } => (StatusCode::BAD_REQUEST, err.to_string()),
        FavoriteError::Storage { .. } => {
            (StatusCode::INTERNAL_SERVER_ERROR, GENERIC_MESSAGE.to_string())
        }
    }
}

fn map_geo_error(err: &GeoError) -> (StatusCode, String) {
    match err {
        GeoError::MissingParam { .. } => (StatusCode::BAD_REQUEST, err.to_string()),
        GeoError::NotFound => (StatusCode::NOT_FOUND, err.to_string()),
        GeoError::UpstreamStatus { .. } | GeoError::Upstream { .. } => {
            (StatusCode::INTERNAL_SERVER_ERROR, GENERIC_MESSAGE.to_string())
        }
    }
}

fn map_event_error(err: &EventError) -> (StatusCode, String) {
    match err {
        EventError::NotFound => (StatusCode::NOT_FOUND, err.to_string()),
        EventError::MissingParam { .. } => (StatusCode::BAD_REQUEST, err.to_string()),
        EventError::UpstreamStatus { .. }
        | EventError::Upstream { .. }
        | EventError::Decode { .. } => {
            (StatusCode::INTERNAL_SERVER_ERROR, GENERIC_MESSAGE.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_param_maps_to_bad_request() {
        let (status, Json(body)) = map_error(
            &EventFinderError::Geo(GeoError::MissingParam { name: "address" }),
            None,
        );
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error, "address is required");
    }

    #[test]
    fn geo_not_found_maps_to_404() {
        let (status, _body) = map_error(&EventFinderError::Geo(GeoError::NotFound), None);
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn upstream_detail_is_replaced_by_a_generic_message() {
        let (status, Json(body)) = map_error(
            &EventFinderError::Geo(GeoError::Upstream {
                message: "connection refused to ipinfo.io:443".to_string(),
            }),
            Some("corr_test"),
        );
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, GENERIC_MESSAGE);
    }

    #[test]
    fn favorite_not_found_maps_to_404() {
        let (status, _body) = map_error(&EventFinderError::Favorite(FavoriteError::NotFound), None);
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn storage_errors_stay_generic() {
        let (status, Json(body)) = map_error(
            &EventFinderError::Favorite(FavoriteError::Storage {
                message: "disk I/O error".to_string(),
            }),
            None,
        );
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, GENERIC_MESSAGE);
    }
}
