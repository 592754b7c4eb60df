//! # Configuration Module
//!
//! Client settings come from three layers, later layers winning:
//!
//! 1. Built-in defaults
//! 2. An optional YAML file
//! 3. `BUSADMIN_*` environment variables
//!
//! Request-type IDs may be pinned here; otherwise they are resolved from the
//! backend's taxonomy endpoint on first load.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use shared::{LatLng, RequestTaxonomy};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::batch::BatchMode;
use crate::errors::{AdminError, AdminResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Root of the backend, without the `/api` suffix
    pub api_base_url: String,
    pub nominatim_base_url: String,
    pub osrm_base_url: String,
    /// Sent on every request; Nominatim refuses anonymous clients
    pub user_agent: String,
    pub request_timeout_secs: u64,
    pub page_size: usize,
    pub search_result_limit: usize,
    pub batch_mode: BatchMode,
    pub export_dir: PathBuf,
    pub notification_history: usize,
    pub default_map_center: LatLng,
    /// Pinned request-type IDs, overlaid on the resolved taxonomy
    pub request_types: RequestTaxonomy,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080".to_string(),
            nominatim_base_url: "https://nominatim.openstreetmap.org".to_string(),
            osrm_base_url: "https://router.project-osrm.org".to_string(),
            user_agent: format!("busadmin/{}", env!("CARGO_PKG_VERSION")),
            request_timeout_secs: 30,
            page_size: 10,
            search_result_limit: 5,
            batch_mode: BatchMode::Sequential,
            export_dir: PathBuf::from("."),
            notification_history: 50,
            default_map_center: LatLng::new(21.0285, 105.8542),
            request_types: RequestTaxonomy::default(),
        }
    }
}

impl AdminConfig {
    /// Defaults, then `path` if given, then the process environment
    pub fn load(path: Option<&Path>) -> AdminResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_yaml_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        info!("⚙️ Using backend at {}", config.api_base_url);
        Ok(config)
    }

    pub fn from_yaml_file(path: &Path) -> AdminResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AdminError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_yaml_str(&content)
            .map_err(|e| AdminError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    /// Apply `BUSADMIN_*` overrides read through `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F) -> AdminResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("BUSADMIN_API_URL") {
            self.api_base_url = v;
        }
        if let Some(v) = lookup("BUSADMIN_NOMINATIM_URL") {
            self.nominatim_base_url = v;
        }
        if let Some(v) = lookup("BUSADMIN_OSRM_URL") {
            self.osrm_base_url = v;
        }
        if let Some(v) = lookup("BUSADMIN_TIMEOUT_SECS") {
            self.request_timeout_secs = parse_number("BUSADMIN_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = lookup("BUSADMIN_PAGE_SIZE") {
            self.page_size = parse_number("BUSADMIN_PAGE_SIZE", &v)?;
        }
        if let Some(v) = lookup("BUSADMIN_BATCH_MODE") {
            self.batch_mode = v
                .parse()
                .map_err(|e: String| AdminError::Config(format!("BUSADMIN_BATCH_MODE: {}", e)))?;
        }
        if let Some(v) = lookup("BUSADMIN_EXPORT_DIR") {
            self.export_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("BUSADMIN_LEAVE_TYPE_ID") {
            self.request_types.leave_type_id = Some(v);
        }
        if let Some(v) = lookup("BUSADMIN_PICKUP_TYPE_ID") {
            self.request_types.pickup_type_id = Some(v);
        }
        if let Some(v) = lookup("BUSADMIN_OTHER_TYPE_ID") {
            self.request_types.other_type_id = Some(v);
        }

        if self.page_size == 0 {
            warn!("⚠️ page_size of 0 is not usable, falling back to 10");
            self.page_size = 10;
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Full URL of an API path such as `/requests`
    pub fn api_url(&self, path: &str) -> String {
        format!("{}/api{}", self.api_base_url.trim_end_matches('/'), path)
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> AdminResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| AdminError::Config(format!("{} must be a number, got '{}'", key, value)))
}
