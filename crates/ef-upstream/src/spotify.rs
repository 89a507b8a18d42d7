use std::time::{Duration, Instant};

use ef_core::error::EventError;
use ef_core::types::{AlbumInfo, ArtistInfo, ArtistResponse};
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{error, warn};

/// Refresh ahead of expiry so an in-flight request never carries a token
/// that lapses mid-call.
const TOKEN_REFRESH_MARGIN_SECS: u64 = 60;

pub struct SpotifyClient {
    http: Client,
    api_base: String,
    accounts_base: String,
    client_id: String,
    client_secret: String,
    token: Mutex<Option<CachedToken>>,
}

struct CachedToken {
    value: String,
    expires_at: Instant,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Debug, Deserialize)]
struct ArtistSearchEnvelope {
    artists: Option<ArtistPage>,
}

#[derive(Debug, Deserialize)]
struct ArtistPage {
    #[serde(default)]
    items: Vec<ArtistDoc>,
}

#[derive(Debug, Deserialize)]
struct ArtistDoc {
    id: String,
    name: String,
    popularity: Option<u32>,
    #[serde(default)]
    genres: Vec<String>,
    followers: Option<FollowersDoc>,
    external_urls: Option<ExternalUrlsDoc>,
    #[serde(default)]
    images: Vec<ImageDoc>,
}

#[derive(Debug, Deserialize)]
struct FollowersDoc {
    total: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ExternalUrlsDoc {
    spotify: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ImageDoc {
    url: String,
}

#[derive(Debug, Deserialize)]
struct AlbumPage {
    #[serde(default)]
    items: Vec<AlbumDoc>,
}

#[derive(Debug, Deserialize)]
struct AlbumDoc {
    id: String,
    name: String,
    release_date: Option<String>,
    total_tracks: Option<u32>,
    external_urls: Option<ExternalUrlsDoc>,
    #[serde(default)]
    images: Vec<ImageDoc>,
}

fn artist_info(doc: ArtistDoc) -> ArtistInfo {
    ArtistInfo {
        image: doc.images.first().map(|image| image.url.clone()),
        id: doc.id,
        name: doc.name,
        followers: doc.followers.and_then(|f| f.total).unwrap_or(0),
        popularity: doc.popularity.unwrap_or(0),
        genres: doc.genres,
        spotify_url: doc.external_urls.and_then(|urls| urls.spotify),
    }
}

fn album_info(doc: AlbumDoc) -> AlbumInfo {
    AlbumInfo {
        image: doc.images.first().map(|image| image.url.clone()),
        id: doc.id,
        name: doc.name,
        release_date: doc.release_date,
        total_tracks: doc.total_tracks,
        spotify_url: doc.external_urls.and_then(|urls| urls.spotify),
    }
}

impl SpotifyClient {
    pub fn new(
        http: Client,
        api_base: impl Into<String>,
        accounts_base: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            http,
            api_base: api_base.into(),
            accounts_base: accounts_base.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            token: Mutex::new(None),
        }
    }

    fn configured(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }

    /// Client-credentials token, cached until shortly before expiry. The
    /// mutex also serializes concurrent refreshes so only one token request
    /// goes out.
    async fn token(&self) -> Result<String, EventError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if token.expires_at > Instant::now() {
                return Ok(token.value.clone());
            }
        }

        let url = format!("{}/api/token", self.accounts_base);
        let response = self
            .http
            .post(&url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|err| EventError::Upstream {
                message: err.to_string(),
            })?;
        let status = response.status();
        if !status.is_success() {
            error!(status = status.as_u16(), "spotify token request failed");
            return Err(EventError::UpstreamStatus {
                status: status.as_u16(),
            });
        }
        let payload: TokenResponse =
            response.json().await.map_err(|err| EventError::Decode {
                message: err.to_string(),
            })?;

        let lifetime = payload
            .expires_in
            .saturating_sub(TOKEN_REFRESH_MARGIN_SECS)
            .max(1);
        *cached = Some(CachedToken {
            value: payload.access_token.clone(),
            expires_at: Instant::now() + Duration::from_secs(lifetime),
        });
        Ok(payload.access_token)
    }

    /// Looks up the best artist match for `name` plus that artist's albums.
    /// Missing credentials degrade to a null artist and no albums.
    ///
    /// # Errors
    ///
    /// `EventError::Upstream`/`UpstreamStatus`/`Decode` on provider failure.
    pub async fn artist(&self, name: &str) -> Result<ArtistResponse, EventError> {
        if !self.configured() {
            warn!("spotify credentials not configured, artist lookup disabled");
            return Ok(ArtistResponse {
                artist: None,
                albums: Vec::new(),
            });
        }

        let token = self.token().await?;

        let url = format!("{}/v1/search", self.api_base);
        let envelope: ArtistSearchEnvelope = self
            .get_json(&url, &token, &[("q", name), ("type", "artist"), ("limit", "1")])
            .await?;

        let Some(artist_doc) = envelope
            .artists
            .and_then(|page| page.items.into_iter().next())
        else {
            return Ok(ArtistResponse {
                artist: None,
                albums: Vec::new(),
            });
        };

        let albums_url = format!("{}/v1/artists/{}/albums", self.api_base, artist_doc.id);
        let albums: AlbumPage = self
            .get_json(
                &albums_url,
                &token,
                &[("include_groups", "album"), ("limit", "50")],
            )
            .await?;

        Ok(ArtistResponse {
            artist: Some(artist_info(artist_doc)),
            albums: albums.items.into_iter().map(album_info).collect(),
        })
    }

    async fn get_json<T>(
        &self,
        url: &str,
        token: &str,
        query: &[(&str, &str)],
    ) -> Result<T, EventError>
    where
        T: serde::de::DeserializeOwned,
    {
        let response = self
            .http
            .get(url)
            .bearer_auth(token)
            .query(query)
            .send()
            .await
            .map_err(|err| EventError::Upstream {
                message: err.to_string(),
            })?;
        let status = response.status();
        if !status.is_success() {
            error!(status = status.as_u16(), url, "spotify request failed");
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

    #[test]
    fn artist_doc_reshapes_with_defaults() {
        let doc: ArtistDoc = serde_json::from_value(serde_json::json!({
            "id": "4gzpq5DPGxSnKTe4SA8HAU",
            "name": "Coldplay",
            "popularity": 88,
            "genres": ["permanent wave", "pop"],
            "followers": { "total": 45000000 },
            "external_urls": { "spotify": "https://open.spotify.com/artist/4gzpq5DPGxSnKTe4SA8HAU" },
            "images": [ { "url": "https://img.example/coldplay.jpg" } ]
        }))
        .unwrap();

        let info = artist_info(doc);
        assert_eq!(info.followers, 45_000_000);
        assert_eq!(info.genres.len(), 2);
        assert_eq!(info.image.as_deref(), Some("https://img.example/coldplay.jpg"));
    }

    #[test]
    fn sparse_artist_doc_still_reshapes() {
        let doc: ArtistDoc =
            serde_json::from_value(serde_json::json!({ "id": "x", "name": "Unknown" })).unwrap();

        let info = artist_info(doc);
        assert_eq!(info.followers, 0);
        assert_eq!(info.popularity, 0);
        assert!(info.genres.is_empty());
        assert!(info.spotify_url.is_none());
    }

    #[test]
    fn album_doc_reshapes() {
        let doc: AlbumDoc = serde_json::from_value(serde_json::json!({
            "id": "alb1",
            "name": "Parachutes",
            "release_date": "2000-07-10",
            "total_tracks": 10,
            "external_urls": { "spotify": "https://open.spotify.com/album/alb1" },
            "images": []
        }))
        .unwrap();

        let info = album_info(doc);
        assert_eq!(info.release_date.as_deref(), Some("2000-07-10"));
        assert_eq!(info.total_tracks, Some(10));
        assert!(info.image.is_none());
    }
}
