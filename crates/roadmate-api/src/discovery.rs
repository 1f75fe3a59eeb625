//! Nearby garage and fuel-station lookup using public Overpass servers.
//!
//! The lookup is tried against each configured interpreter in order, with a
//! short timeout per server; the first server that answers with an
//! `elements` array wins.

use std::collections::HashMap;
use std::time::Duration;

use roadmate_core::Location;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::ClientError;

/// Interpreters tried in order.
pub const DEFAULT_OVERPASS_SERVERS: [&str; 2] = [
    "https://overpass-api.de/api/interpreter",
    "https://overpass.kumi.systems/api/interpreter",
];

/// Per-server timeout.
pub const DEFAULT_DISCOVERY_TIMEOUT: Duration = Duration::from_secs(8);

/// Search radius around the mechanic, in metres.
pub const DEFAULT_RADIUS_METERS: u32 = 800;

/// Configuration for [`DiscoveryClient`].
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Interpreter URLs, tried in order.
    pub servers: Vec<String>,
    /// Timeout for each server.
    pub timeout: Duration,
    /// Search radius in metres.
    pub radius_meters: u32,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            servers: DEFAULT_OVERPASS_SERVERS.iter().map(|s| s.to_string()).collect(),
            timeout: DEFAULT_DISCOVERY_TIMEOUT,
            radius_meters: DEFAULT_RADIUS_METERS,
        }
    }
}

impl DiscoveryConfig {
    /// Replace the server list.
    pub fn with_servers<I, S>(mut self, servers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.servers = servers.into_iter().map(Into::into).collect();
        self
    }

    /// Set the per-server timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// A point of interest returned by Overpass.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Place {
    pub id: u64,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub tags: HashMap<String, String>,
}

impl Place {
    /// The place's name, or "Unnamed".
    pub fn display_name(&self) -> &str {
        self.tags.get("name").map(String::as_str).unwrap_or("Unnamed")
    }

    /// Shop, amenity or craft tag, whichever is present first.
    pub fn category(&self) -> &str {
        ["shop", "amenity", "craft"]
            .iter()
            .find_map(|key| self.tags.get(*key))
            .map(String::as_str)
            .unwrap_or("")
    }
}

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    elements: Option<Vec<Place>>,
}

/// Client for nearby-place lookups.
#[derive(Debug, Clone)]
pub struct DiscoveryClient {
    http: reqwest::Client,
    config: DiscoveryConfig,
}

impl DiscoveryClient {
    pub fn new(config: DiscoveryConfig) -> Result<Self, ClientError> {
        if config.servers.is_empty() {
            return Err(ClientError::Config("no discovery servers configured".to_string()));
        }
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ClientError::Http)?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    /// Overpass QL for repair-related places around `location`.
    pub fn build_query(location: Location, radius_meters: u32) -> String {
        let around = format!(
            "around:{},{},{}",
            radius_meters, location.latitude, location.longitude
        );
        format!(
            "[out:json];(\
             node[\"amenity\"=\"fuel\"]({around});\
             node[\"shop\"=\"car_parts\"]({around});\
             node[\"amenity\"=\"car_repair\"]({around});\
             node[\"craft\"=\"mechanic\"]({around});\
             );out;"
        )
    }

    /// Find places near `location`, failing over between servers.
    pub async fn nearby(&self, location: Location) -> Result<Vec<Place>, ClientError> {
        let query = Self::build_query(location, self.config.radius_meters);
        let mut last_error = String::new();

        for (index, server) in self.config.servers.iter().enumerate() {
            let url = format!("{}?data={}", server, urlencoding::encode(&query));
            debug!("Querying discovery server {}: {}", index + 1, server);

            match self.query_server(&url).await {
                Ok(places) => {
                    info!("Discovery server {} returned {} places", index + 1, places.len());
                    return Ok(places);
                }
                Err(e) => {
                    warn!("Discovery server {} failed: {}", index + 1, e);
                    last_error = e.to_string();
                }
            }
        }

        Err(ClientError::DiscoveryUnavailable(last_error))
    }

    async fn query_server(&self, url: &str) -> Result<Vec<Place>, ClientError> {
        let response = self.http.get(url).send().await.map_err(ClientError::Http)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }
        let body: OverpassResponse = response.json().await.map_err(ClientError::Http)?;
        body.elements.ok_or_else(|| ClientError::Status {
            status: status.as_u16(),
            body: "response has no elements".to_string(),
        })
    }
}
