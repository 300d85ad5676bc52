//! Address-to-coordinates resolution behind a trait, so handlers never
//! depend on the concrete provider and tests can substitute a stub.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use serde::Deserialize;
use thiserror::Error;

use crate::config::config;

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("No geocoding result for address: {0}")]
    NoResult(String),

    #[error("Geocoder request failed: {0}")]
    Upstream(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub formatted_address: Option<String>,
    pub city: Option<String>,
    pub zipcode: Option<String>,
    pub country: Option<String>,
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, address: &str) -> Result<GeoPoint, GeocodeError>;
}

/// Nominatim-compatible HTTP geocoder.
pub struct HttpGeocoder {
    client: reqwest::Client,
    base_url: String,
}

impl HttpGeocoder {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config().geocoder.base_url.clone(),
        }
    }
}

impl Default for HttpGeocoder {
    fn default() -> Self {
        Self::new()
    }
}

static GEOCODER: Lazy<HttpGeocoder> = Lazy::new(HttpGeocoder::new);

/// Process-wide geocoder instance.
pub fn geocoder() -> &'static dyn Geocoder {
    &*GEOCODER
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    lat: String,
    lon: String,
    display_name: Option<String>,
    address: Option<SearchAddress>,
}

#[derive(Debug, Deserialize)]
struct SearchAddress {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    postcode: Option<String>,
    country: Option<String>,
}

#[async_trait]
impl Geocoder for HttpGeocoder {
    async fn geocode(&self, address: &str) -> Result<GeoPoint, GeocodeError> {
        let url = format!("{}/search", self.base_url);
        let results: Vec<SearchResult> = self
            .client
            .get(&url)
            .query(&[
                ("q", address),
                ("format", "json"),
                ("limit", "1"),
                ("addressdetails", "1"),
            ])
            .send()
            .await
            .map_err(|e| GeocodeError::Upstream(e.to_string()))?
            .error_for_status()
            .map_err(|e| GeocodeError::Upstream(e.to_string()))?
            .json()
            .await
            .map_err(|e| GeocodeError::Upstream(e.to_string()))?;

        let hit = results
            .into_iter()
            .next()
            .ok_or_else(|| GeocodeError::NoResult(address.to_string()))?;

        let latitude = hit
            .lat
            .parse::<f64>()
            .map_err(|_| GeocodeError::Upstream(format!("bad latitude: {}", hit.lat)))?;
        let longitude = hit
            .lon
            .parse::<f64>()
            .map_err(|_| GeocodeError::Upstream(format!("bad longitude: {}", hit.lon)))?;

        let (city, zipcode, country) = match hit.address {
            Some(parts) => (
                parts.city.or(parts.town).or(parts.village),
                parts.postcode,
                parts.country,
            ),
            None => (None, None, None),
        };

        Ok(GeoPoint {
            latitude,
            longitude,
            formatted_address: hit.display_name,
            city,
            zipcode,
            country,
        })
    }
}
