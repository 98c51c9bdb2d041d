//! Cutout download from a SkyView-compatible HTTP service.

use chrono::Local;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

use super::{artifact_path, FetchError, ImageSource};
use crate::artifact::fits::is_fits;
use crate::state::config::FetchConfig;

/// Blocking HTTP image source.
#[derive(Debug)]
pub struct SkyViewHttp {
    base_url: String,
    config: FetchConfig,
    client: reqwest::blocking::Client,
}

impl SkyViewHttp {
    /// Create a source that queries `base_url`.
    pub fn new(base_url: String, config: FetchConfig) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(300)) // large cutouts can be slow
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self::with_client(base_url, config, client))
    }

    /// Create a source around an existing client.
    pub fn with_client(
        base_url: String,
        config: FetchConfig,
        client: reqwest::blocking::Client,
    ) -> Self {
        Self {
            base_url,
            config,
            client,
        }
    }

    /// Query parameters for one cutout.
    pub fn query_params(&self, ra: f64, dec: f64) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("Position", format!("{},{}", ra, dec)),
            ("Survey", self.config.survey.clone()),
            ("Size", self.config.size_deg.to_string()),
            ("Return", "FITS".to_string()),
        ];
        if let Some(token) = &self.config.credentials {
            params.push(("api_key", token.clone()));
        }
        params
    }
}

impl ImageSource for SkyViewHttp {
    fn name(&self) -> &str {
        "skyview-http"
    }

    fn fetch(&self, ra: f64, dec: f64) -> Result<PathBuf, FetchError> {
        let url = self.base_url.clone();
        info!("Requesting {} cutout at ({}, {}) from {}", self.config.survey, ra, dec, url);

        let response = self
            .client
            .get(&url)
            .query(&self.query_params(ra, dec))
            .send()
            .map_err(|source| FetchError::Request {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { url, status });
        }

        let body = response.bytes().map_err(|source| FetchError::Request {
            url: url.clone(),
            source,
        })?;
        if !is_fits(&body) {
            return Err(FetchError::Malformed(format!(
                "{} returned {} bytes that are not FITS",
                url,
                body.len()
            )));
        }

        fs::create_dir_all(&self.config.output_dir).map_err(|source| FetchError::Io {
            path: self.config.output_dir.clone(),
            source,
        })?;
        let path = artifact_path(&self.config.output_dir, &self.config.survey, Local::now());
        fs::write(&path, &body).map_err(|source| FetchError::Io {
            path: path.clone(),
            source,
        })?;

        debug!("Wrote {} bytes", body.len());
        info!("Image successfully saved as {}", path.display());
        Ok(path)
    }
}
