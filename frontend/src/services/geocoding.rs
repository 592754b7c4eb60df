//! Address search and reverse geocoding against OpenStreetMap Nominatim.

use async_trait::async_trait;
use log::{info, warn};
use reqwest::Client;
use serde::Deserialize;
use shared::LatLng;

use crate::config::AdminConfig;
use crate::errors::{ApiError, ApiResult};

/// One place returned by a search
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub display_name: String,
    pub position: LatLng,
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    display_name: String,
}

#[derive(Debug, Deserialize)]
struct NominatimReverse {
    display_name: Option<String>,
    error: Option<String>,
}

/// Address lookup used by the checkpoint planner
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn search(&self, query: &str) -> ApiResult<Vec<SearchResult>>;

    async fn reverse(&self, position: LatLng) -> ApiResult<Option<String>>;
}

pub struct GeocodingClient {
    client: Client,
    base_url: String,
    limit: usize,
}

impl GeocodingClient {
    pub fn new(config: &AdminConfig) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self {
            client,
            base_url: config.nominatim_base_url.trim_end_matches('/').to_string(),
            limit: config.search_result_limit.max(1),
        })
    }
}

#[async_trait]
impl Geocoder for GeocodingClient {
    /// Free-text search. A blank query returns no results without a call.
    async fn search(&self, query: &str) -> ApiResult<Vec<SearchResult>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        info!("🗺️ Searching address: {}", query);
        let limit = self.limit.to_string();
        let response = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&[
                ("format", "json"),
                ("q", query),
                ("limit", limit.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::ExternalService(format!(
                "Nominatim search failed: {}",
                status
            )));
        }

        let places: Vec<NominatimPlace> = response.json().await?;
        let results = places.into_iter().filter_map(to_search_result).collect::<Vec<_>>();
        info!("✅ {} result(s) for '{}'", results.len(), query);
        Ok(results)
    }

    /// Human-readable address of a position, `None` when Nominatim has nothing there
    async fn reverse(&self, position: LatLng) -> ApiResult<Option<String>> {
        let response = self
            .client
            .get(format!("{}/reverse", self.base_url))
            .query(&[
                ("format", "json".to_string()),
                ("lat", position.lat.to_string()),
                ("lon", position.lng.to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::ExternalService(format!(
                "Nominatim reverse lookup failed: {}",
                status
            )));
        }

        let body: NominatimReverse = response.json().await?;
        if let Some(error) = body.error {
            warn!("⚠️ Reverse lookup found nothing at {:?}: {}", position, error);
        }
        Ok(body.display_name)
    }
}

fn to_search_result(place: NominatimPlace) -> Option<SearchResult> {
    match (place.lat.parse::<f64>(), place.lon.parse::<f64>()) {
        (Ok(lat), Ok(lng)) => Some(SearchResult {
            display_name: place.display_name,
            position: LatLng::new(lat, lng),
        }),
        _ => {
            warn!("⚠️ Skipping place with bad coordinates: {}", place.display_name);
            None
        }
    }
}
