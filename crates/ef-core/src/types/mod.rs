pub mod event;
pub mod favorite;
pub mod geo;

pub use event::{
    AlbumInfo, Artist, ArtistInfo, ArtistResponse, EventDetail, EventSummary, PriceRange,
    Suggestion, SuggestionList, VenueDetail,
};
pub use favorite::{FavoriteEvent, FavoritePayload};
pub use geo::{GeoLocation, PlacePrediction};
