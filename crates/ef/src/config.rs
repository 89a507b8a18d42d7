use std::env;

use ef_upstream::UpstreamConfig;
use tracing::warn;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DB_PATH: &str = ".eventfinder/favorites.db";

pub struct Config {
    pub port: u16,
    pub db_path: String,
    pub upstream: UpstreamConfig,
}

impl Config {
    /// Reads the environment once at startup. Provider keys are optional;
    /// missing ones are logged and the matching feature degrades instead of
    /// failing.
    pub fn load() -> Self {
        let port = env::var("EF_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);
        let db_path =
            env::var("EF_DB_PATH").unwrap_or_else(|_| DEFAULT_DB_PATH.to_string());

        Self {
            port,
            db_path,
            upstream: UpstreamConfig {
                ipinfo_token: optional_key("IPINFO_TOKEN"),
                maps_api_key: optional_key("GOOGLE_MAPS_API_KEY"),
                ticketmaster_api_key: optional_key("TICKETMASTER_API_KEY"),
                spotify_client_id: optional_key("SPOTIFY_CLIENT_ID"),
                spotify_client_secret: optional_key("SPOTIFY_CLIENT_SECRET"),
            },
        }
    }
}

fn optional_key(key: &str) -> String {
    match env::var(key) {
        Ok(value) => value.trim().to_string(),
        Err(_) => {
            warn!("{key} not set, the dependent feature will degrade");
            String::new()
        }
    }
}
