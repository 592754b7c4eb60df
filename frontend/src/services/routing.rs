//! Driving geometry for a route through OSRM.

use async_trait::async_trait;
use log::info;
use reqwest::Client;
use serde::Deserialize;
use shared::LatLng;

use crate::config::AdminConfig;
use crate::errors::{ApiError, ApiResult};

/// Road-following polyline of a route
#[derive(Debug, Clone, PartialEq)]
pub struct RouteGeometry {
    /// `[lat, lng]` points in travel order
    pub points: Vec<LatLng>,
    pub distance_m: f64,
    pub duration_s: f64,
}

#[derive(Debug, Deserialize)]
struct OsrmResponse {
    code: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    distance: f64,
    duration: f64,
    geometry: OsrmGeometry,
}

/// GeoJSON line; coordinates are `[lon, lat]`
#[derive(Debug, Deserialize)]
struct OsrmGeometry {
    coordinates: Vec<[f64; 2]>,
}

/// Source of road geometry between stops
#[async_trait]
pub trait Directions: Send + Sync {
    async fn route_geometry(&self, stops: &[LatLng]) -> ApiResult<RouteGeometry>;
}

pub struct RoutingClient {
    client: Client,
    base_url: String,
}

impl RoutingClient {
    pub fn new(config: &AdminConfig) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self {
            client,
            base_url: config.osrm_base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Directions for RoutingClient {
    async fn route_geometry(&self, stops: &[LatLng]) -> ApiResult<RouteGeometry> {
        let url = format!("{}/route/v1/driving/{}", self.base_url, coordinate_list(stops)?);
        info!("🛣️ Requesting driving route through {} stops", stops.len());

        let response = self
            .client
            .get(&url)
            .query(&[("overview", "full"), ("geometries", "geojson")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() && status != reqwest::StatusCode::BAD_REQUEST {
            return Err(ApiError::ExternalService(format!("OSRM returned {}", status)));
        }

        let body: OsrmResponse = response.json().await?;
        into_geometry(body)
    }
}

/// `lon,lat;lon,lat;...` as OSRM expects
fn coordinate_list(stops: &[LatLng]) -> ApiResult<String> {
    if stops.len() < 2 {
        return Err(ApiError::InvalidInput(
            "A route needs at least two coordinates".to_string(),
        ));
    }
    if let Some(bad) = stops.iter().find(|p| !p.is_valid()) {
        return Err(ApiError::InvalidInput(format!(
            "Coordinate out of range: {}, {}",
            bad.lat, bad.lng
        )));
    }
    Ok(stops
        .iter()
        .map(|p| format!("{},{}", p.lng, p.lat))
        .collect::<Vec<_>>()
        .join(";"))
}

fn into_geometry(body: OsrmResponse) -> ApiResult<RouteGeometry> {
    if body.code != "Ok" {
        return Err(ApiError::ExternalService(format!(
            "OSRM: {} {}",
            body.code,
            body.message.unwrap_or_default()
        )));
    }
    let route = body
        .routes
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::ExternalService("OSRM returned no route".to_string()))?;

    Ok(RouteGeometry {
        points: route
            .geometry
            .coordinates
            .into_iter()
            .map(|[lng, lat]| LatLng::new(lat, lng))
            .collect(),
        distance_m: route.distance,
        duration_s: route.duration,
    })
}
