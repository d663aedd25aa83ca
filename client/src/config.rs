//! Remote service configuration loaded via OrthoConfig.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 30;

/// Connection settings for the remote data service.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "COSTWISE")]
pub struct ServiceSettings {
    /// Base URL of the remote data service project.
    pub service_url: Url,
    /// Publishable API key sent with every request.
    pub service_key: String,
    /// Per-request timeout in seconds.
    pub request_timeout_seconds: Option<u64>,
}

impl ServiceSettings {
    /// Return the configured request timeout, falling back to the default.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.request_timeout_seconds
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECONDS),
        )
    }
}
