use std::net::IpAddr;

use ef_core::error::GeoError;
use ef_core::types::GeoLocation;
use reqwest::Client;
use serde::Deserialize;
use tracing::error;

pub struct IpInfoClient {
    http: Client,
    base_url: String,
    token: String,
}

#[derive(Debug, Deserialize)]
struct IpInfoResponse {
    loc: Option<String>,
    city: Option<String>,
    region: Option<String>,
    country: Option<String>,
}

/// Takes the first address of a forwarded-for chain, strips the IPv4-mapped
/// IPv6 prefix, and drops loopback/private addresses. Forwarding a private
/// address upstream would always resolve to the server's own network, so
/// those (and anything unparseable) normalize to absent.
pub fn normalize_client_ip(raw: Option<&str>) -> Option<String> {
    let first = raw?.split(',').next()?.trim();
    let cleaned = first.strip_prefix("::ffff:").unwrap_or(first);
    let addr: IpAddr = cleaned.parse().ok()?;
    let usable = match addr {
        IpAddr::V4(v4) => !(v4.is_loopback() || v4.is_private()),
        IpAddr::V6(v6) => !v6.is_loopback(),
    };
    usable.then(|| cleaned.to_string())
}

/// Splits the provider's combined `"lat,lng"` field. Anything that does not
/// parse as two floats counts as "no location determined".
fn parse_loc(loc: &str) -> Option<(f64, f64)> {
    let (lat, lng) = loc.split_once(',')?;
    let lat = lat.trim().parse::<f64>().ok()?;
    let lng = lng.trim().parse::<f64>().ok()?;
    Some((lat, lng))
}

impl IpInfoClient {
    pub fn new(http: Client, base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            token: token.into(),
        }
    }

    /// Resolves a client IP to coordinates. With no usable address the
    /// provider is queried without one and infers from its own connection.
    /// `Ok(None)` means the provider answered but gave no usable location.
    ///
    /// # Errors
    ///
    /// `GeoError::Upstream` on transport failure, `GeoError::UpstreamStatus`
    /// on a non-success provider status.
    pub async fn lookup(&self, raw_ip: Option<&str>) -> Result<Option<GeoLocation>, GeoError> {
        let url = match normalize_client_ip(raw_ip) {
            Some(ip) => format!("{}/{ip}/json", self.base_url),
            None => format!("{}/json", self.base_url),
        };

        let mut request = self.http.get(&url);
        if !self.token.is_empty() {
            request = request.query(&[("token", self.token.as_str())]);
        }

        let response = request.send().await.map_err(|err| GeoError::Upstream {
            message: err.to_string(),
        })?;
        let status = response.status();
        if !status.is_success() {
            error!(status = status.as_u16(), "ipinfo lookup failed");
            return Err(GeoError::UpstreamStatus {
                status: status.as_u16(),
            });
        }

        let payload: IpInfoResponse =
            response.json().await.map_err(|err| GeoError::Upstream {
                message: err.to_string(),
            })?;

        let Some((lat, lng)) = payload.loc.as_deref().and_then(parse_loc) else {
            return Ok(None);
        };

        Ok(Some(GeoLocation {
            lat,
            lng,
            city: payload.city,
            region: payload.region,
            country: payload.country,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_address_of_forwarded_chain_wins() {
        assert_eq!(
            normalize_client_ip(Some("203.0.113.5, 10.0.0.1")).as_deref(),
            Some("203.0.113.5")
        );
    }

    #[test]
    fn ipv4_mapped_prefix_is_stripped() {
        assert_eq!(
            normalize_client_ip(Some("::ffff:203.0.113.5")).as_deref(),
            Some("203.0.113.5")
        );
    }

    #[test]
    fn private_and_loopback_ranges_normalize_to_absent() {
        for ip in [
            "127.0.0.1",
            "127.8.9.10",
            "10.0.0.1",
            "192.168.1.20",
            "172.16.0.1",
            "172.31.255.255",
            "::1",
            "::ffff:192.168.0.3",
        ] {
            assert_eq!(normalize_client_ip(Some(ip)), None, "{ip}");
        }
    }

    #[test]
    fn public_172_range_is_kept() {
        // 172.32.0.0 is outside 172.16.0.0/12.
        assert_eq!(
            normalize_client_ip(Some("172.32.0.1")).as_deref(),
            Some("172.32.0.1")
        );
    }

    #[test]
    fn garbage_and_empty_normalize_to_absent() {
        assert_eq!(normalize_client_ip(None), None);
        assert_eq!(normalize_client_ip(Some("")), None);
        assert_eq!(normalize_client_ip(Some("not-an-ip")), None);
    }

    #[test]
    fn loc_field_parses_into_coordinates() {
        assert_eq!(parse_loc("47.6062,-122.3321"), Some((47.6062, -122.3321)));
        assert_eq!(parse_loc("garbage"), None);
        assert_eq!(parse_loc("47.6,notanumber"), None);
        assert_eq!(parse_loc(""), None);
    }
}
