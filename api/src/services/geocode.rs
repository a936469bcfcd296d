//! Reverse-geocoding client. Turns the submitted coordinates into a
//! human-readable address for the attendance record. Strictly best-effort:
//! any failure degrades to `None` and the caller stores a placeholder.

use util::config;

#[derive(Clone)]
pub struct GeocodeClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GeocodeClient {
    pub fn from_config() -> Self {
        Self::new(config::geocoding_api_url(), config::geocoding_api_key())
    }

    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Resolves a coordinate to the first formatted address the provider
    /// returns, or `None` when the lookup fails for any reason.
    pub async fn reverse(&self, lat: f64, lng: f64) -> Option<String> {
        let response = self
            .http
            .get(&self.base_url)
            .query(&[
                ("q", format!("{lat}+{lng}")),
                ("key", self.api_key.clone()),
                ("no_annotations", "1".to_owned()),
            ])
            .send()
            .await
            .map_err(|e| tracing::warn!(error = %e, "Reverse geocoding request failed"))
            .ok()?;

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| tracing::warn!(error = %e, "Reverse geocoding returned invalid JSON"))
            .ok()?;

        body["results"][0]["formatted"].as_str().map(str::to_owned)
    }
}
