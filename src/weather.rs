//! Weather index collaborator.
//!
//! Two independent read-only GETs, fetched once per view: the pollutant
//! standards index (24-hourly reading for one region) and the UV index.
//! Purely informational; nothing in the task lifecycle depends on these.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::WeatherConfig;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, Serialize)]
pub struct WeatherReport {
    pub psi: f64,
    pub uv_index: f64,
}

#[derive(Debug, Clone)]
pub struct WeatherClient {
    psi_url: String,
    uv_url: String,
    region: String,
    http: reqwest::blocking::Client,
}

impl WeatherClient {
    pub fn new(config: &WeatherConfig) -> Self {
        Self {
            psi_url: config.psi_url.clone(),
            uv_url: config.uv_url.clone(),
            region: config.region.clone(),
            http: reqwest::blocking::Client::new(),
        }
    }

    /// Fetch both indexes. The two calls are independent; either failure
    /// surfaces as-is.
    pub fn report(&self) -> Result<WeatherReport> {
        let psi = self.fetch_psi()?;
        let uv_index = self.fetch_uv()?;
        Ok(WeatherReport { psi, uv_index })
    }

    fn fetch_psi(&self) -> Result<f64> {
        let response: PsiResponse = self
            .http
            .get(&self.psi_url)
            .send()?
            .error_for_status()?
            .json()?;
        psi_reading(&response, &self.region)
    }

    fn fetch_uv(&self) -> Result<f64> {
        let response: UvResponse = self
            .http
            .get(&self.uv_url)
            .send()?
            .error_for_status()?
            .json()?;
        uv_reading(&response)
    }
}

#[derive(Debug, Deserialize)]
struct PsiResponse {
    items: Vec<PsiItem>,
}

#[derive(Debug, Deserialize)]
struct PsiItem {
    readings: PsiReadings,
}

#[derive(Debug, Deserialize)]
struct PsiReadings {
    psi_twenty_four_hourly: HashMap<String, f64>,
}

#[derive(Debug, Deserialize)]
struct UvResponse {
    items: Vec<UvItem>,
}

#[derive(Debug, Deserialize)]
struct UvItem {
    index: Vec<UvReading>,
}

#[derive(Debug, Deserialize)]
struct UvReading {
    value: f64,
}

fn psi_reading(response: &PsiResponse, region: &str) -> Result<f64> {
    response
        .items
        .first()
        .and_then(|item| item.readings.psi_twenty_four_hourly.get(region))
        .copied()
        .ok_or_else(|| Error::OperationFailed(format!("no PSI reading for region '{region}'")))
}

fn uv_reading(response: &UvResponse) -> Result<f64> {
    response
        .items
        .first()
        .and_then(|item| item.index.first())
        .map(|reading| reading.value)
        .ok_or_else(|| Error::OperationFailed("no UV reading available".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn psi_response_parses_region_reading() {
        let raw = r#"{
            "items": [{
                "readings": {
                    "psi_twenty_four_hourly": {
                        "central": 55.0, "west": 48.0, "east": 52.0
                    }
                }
            }]
        }"#;
        let response: PsiResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(psi_reading(&response, "central").unwrap(), 55.0);
        assert_eq!(psi_reading(&response, "west").unwrap(), 48.0);
    }

    #[test]
    fn psi_missing_region_is_an_error() {
        let raw = r#"{"items": [{"readings": {"psi_twenty_four_hourly": {}}}]}"#;
        let response: PsiResponse = serde_json::from_str(raw).unwrap();
        assert!(psi_reading(&response, "central").is_err());
    }

    #[test]
    fn uv_response_parses_first_reading() {
        let raw = r#"{"items": [{"index": [{"value": 7.0}, {"value": 6.0}]}]}"#;
        let response: UvResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(uv_reading(&response).unwrap(), 7.0);
    }

    #[test]
    fn uv_empty_items_is_an_error() {
        let raw = r#"{"items": []}"#;
        let response: UvResponse = serde_json::from_str(raw).unwrap();
        assert!(uv_reading(&response).is_err());
    }
}
