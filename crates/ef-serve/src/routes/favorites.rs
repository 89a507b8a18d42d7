use crate::middleware::correlation::CorrelationId;
use crate::routes::error::map_error;
use crate::{build_store, AppState};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Extension, Json, Router};
use ef_core::types::{FavoriteEvent, FavoritePayload};
use ef_core::FavoriteRepository;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/favorites", get(list_favorites).post(add_favorite))
        .route("/favorites/{id}", axum::routing::delete(remove_favorite))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/favorites",
    responses((status = 200, body = Vec<FavoriteEvent>))
)]
pub(crate) async fn list_favorites(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
) -> Response {
    let store = match build_store(&state) {
        Ok(store) => store,
        Err(err) => return map_error(&err, Some(&correlation.0)).into_response(),
    };
    match store.favorites().list() {
        Ok(favorites) => Json(favorites).into_response(),
        Err(err) => map_error(&err.into(), Some(&correlation.0)).into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/favorites",
    request_body = FavoritePayload,
    responses(
        (status = 201, description = "Inserted", body = FavoriteEvent),
        (status = 200, description = "Updated in place", body = FavoriteEvent)
    )
)]
pub(crate) async fn add_favorite(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Json(payload): Json<FavoritePayload>,
) -> Response {
    let store = match build_store(&state) {
        Ok(store) => store,
        Err(err) => return map_error(&err, Some(&correlation.0)).into_response(),
    };
    match store.favorites().add(&payload) {
        Ok(outcome) => {
            let status = if outcome.created {
                StatusCode::CREATED
            } else {
                StatusCode::OK
            };
            (status, Json(outcome.favorite)).into_response()
        }
        Err(err) => map_error(&err.into(), Some(&correlation.0)).into_response(),
    }
}

#[utoipa::path(
    delete,
    path = "/api/favorites/{id}",
    params(("id" = String, Path, description = "External event identifier")),
    responses(
        (status = 200, description = "Deleted record", body = FavoriteEvent),
        (status = 404, description = "No favorite with that id")
    )
)]
pub(crate) async fn remove_favorite(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Path(id): Path<String>,
) -> Response {
    let store = match build_store(&state) {
        Ok(store) => store,
        Err(err) => return map_error(&err, Some(&correlation.0)).into_response(),
    };
    match store.favorites().remove(&id) {
        Ok(favorite) => Json(favorite).into_response(),
        Err(err) => map_error(&err.into(), Some(&correlation.0)).into_response(),
    }
}
