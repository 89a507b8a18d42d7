use thiserror::Error;

#[derive(Debug, Error)]
pub enum FavoriteError {
    #[error("favorite not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("storage error: {message}")]
    Storage { message: String },
}

#[derive(Debug, Error)]
pub enum GeoError {
    #[error("{name} is required")]
    MissingParam { name: &'static str },
    #[error("could not determine location")]
    NotFound,
    #[error("upstream responded with status {status}")]
    UpstreamStatus { status: u16 },
    #[error("upstream request failed: {message}")]
    Upstream { message: String },
}

#[derive(Debug, Error)]
pub enum EventError {
    #[error("event not found")]
    NotFound,
    #[error("{name} is required")]
    MissingParam { name: &'static str },
    #[error("upstream responded with status {status}")]
    UpstreamStatus { status: u16 },
    #[error("upstream request failed: {message}")]
    Upstream { message: String },
    #[error("upstream payload decode failed: {message}")]
    Decode { message: String },
}

#[derive(Debug, Error)]
pub enum EventFinderError {
    #[error(transparent)]
    Favorite(#[from] FavoriteError),
    #[error(transparent)]
    Geo(#[from] GeoError),
    #[error(transparent)]
    Event(#[from] EventError),
    #[error("internal error: {message}")]
    Internal { message: String },
}
