/// Image sources
///
/// An image source turns a sky position into an artifact file on disk:
/// - `http.rs` queries a SkyView-compatible HTTP service
/// - `jar.rs` runs the local `skyview.jar` renderer
/// - `batch.rs` fetches a list of coordinates and records the successes

pub mod batch;
pub mod http;
pub mod jar;

use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use thiserror::Error;

use crate::state::config::{AppConfig, SourceConfig};

pub use batch::{fetch_and_store, BatchFailure, BatchReport};
pub use http::SkyViewHttp;
pub use jar::SkyViewJar;

/// Anything that went wrong producing an artifact
///
/// Callers treat every variant the same way ("fetch failed"); the variants
/// only carry diagnostics.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} exited with {status}")]
    ExitStatus { program: String, status: ExitStatus },
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("failed to write artifact {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A mechanism that produces one artifact per sky position
pub trait ImageSource {
    /// Short name for log messages
    fn name(&self) -> &str;

    /// Produce an artifact for (ra, dec) in degrees and return its path
    fn fetch(&self, ra: f64, dec: f64) -> Result<PathBuf, FetchError>;
}

/// Build the image source selected in `config`
pub fn from_config(config: &AppConfig) -> Result<Box<dyn ImageSource>, FetchError> {
    Ok(match &config.source {
        SourceConfig::Http { base_url } => {
            Box::new(SkyViewHttp::new(base_url.clone(), config.fetch.clone())?)
        }
        SourceConfig::Jar { java, jar } => Box::new(SkyViewJar::new(
            java.clone(),
            jar.clone(),
            config.fetch.clone(),
        )),
    })
}

/// Pick a fresh artifact path: `<dir>/output_<survey>_<YYYYmmdd_HHMMSS>.fits`
///
/// A numeric suffix is added when the name is already taken within the same second.
pub fn artifact_path(output_dir: &Path, survey: &str, now: DateTime<Local>) -> PathBuf {
    let survey: String = survey
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    let stem = format!("output_{}_{}", survey, now.format("%Y%m%d_%H%M%S"));

    let mut path = output_dir.join(format!("{}.fits", stem));
    let mut n = 1;
    while path.exists() {
        path = output_dir.join(format!("{}_{}.fits", stem, n));
        n += 1;
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::fs;

    #[test]
    fn test_artifact_path_format() {
        let now = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        let path = artifact_path(Path::new("outputs"), "dss", now);
        assert_eq!(path, PathBuf::from("outputs/output_dss_20240309_070501.fits"));
    }

    #[test]
    fn test_artifact_path_avoids_collisions() {
        let dir = tempfile::tempdir().unwrap();
        let now = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();

        let first = artifact_path(dir.path(), "dss", now);
        fs::write(&first, b"x").unwrap();
        let second = artifact_path(dir.path(), "dss", now);
        fs::write(&second, b"x").unwrap();
        let third = artifact_path(dir.path(), "dss", now);

        assert_ne!(first, second);
        assert!(second.to_string_lossy().ends_with("_1.fits"));
        assert!(third.to_string_lossy().ends_with("_2.fits"));
    }

    #[test]
    fn test_survey_names_are_sanitized() {
        let now = Local.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let path = artifact_path(Path::new("out"), "DSS2 Red/x", now);
        assert_eq!(
            path.file_name().unwrap().to_string_lossy(),
            "output_DSS2_Red_x_20240101_000000.fits"
        );
    }

    #[test]
    fn test_from_config_picks_source() {
        let mut config = AppConfig::default();
        assert_eq!(from_config(&config).unwrap().name(), "skyview-http");

        config.source = SourceConfig::default_jar();
        assert_eq!(from_config(&config).unwrap().name(), "skyview-jar");
    }
}
