pub mod ipinfo;
pub mod maps;
pub mod spotify;
pub mod ticketmaster;

use std::time::Duration;

use ipinfo::IpInfoClient;
use maps::MapsClient;
use spotify::SpotifyClient;
use ticketmaster::TicketmasterClient;

const UPSTREAM_TIMEOUT_SECS: u64 = 30;

/// Provider credentials and endpoints. Keys are optional; an empty key
/// degrades the corresponding feature instead of failing construction.
#[derive(Debug, Clone, Default)]
pub struct UpstreamConfig {
    pub ipinfo_token: String,
    pub maps_api_key: String,
    pub ticketmaster_api_key: String,
    pub spotify_client_id: String,
    pub spotify_client_secret: String,
}

/// The constructed-once client handles, one per upstream provider. They share
/// a single connection pool; each struct carries its own base URL and
/// credentials so tests and deployments can point them elsewhere.
pub struct Upstream {
    pub ipinfo: IpInfoClient,
    pub maps: MapsClient,
    pub ticketmaster: TicketmasterClient,
    pub spotify: SpotifyClient,
}

impl Upstream {
    /// Builds the shared HTTP client with bounded timeouts and fans it out to
    /// the provider clients.
    ///
    /// # Errors
    ///
    /// Returns the underlying builder error when the TLS backend cannot be
    /// initialized.
    pub fn new(config: &UpstreamConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(UPSTREAM_TIMEOUT_SECS))
            .timeout(Duration::from_secs(UPSTREAM_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            ipinfo: IpInfoClient::new(
                http.clone(),
                "https://ipinfo.io",
                config.ipinfo_token.clone(),
            ),
            maps: MapsClient::new(
                http.clone(),
                "https://maps.googleapis.com/maps/api",
                config.maps_api_key.clone(),
            ),
            ticketmaster: TicketmasterClient::new(
                http.clone(),
                "https://app.ticketmaster.com/discovery/v2",
                config.ticketmaster_api_key.clone(),
            ),
            spotify: SpotifyClient::new(
                http,
                "https://api.spotify.com",
                "https://accounts.spotify.com",
                config.spotify_client_id.clone(),
                config.spotify_client_secret.clone(),
            ),
        })
    }
}
