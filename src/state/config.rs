/// Application configuration
///
/// Everything the fetchers, the scene assembler and the viewer need is passed
/// in through these structs. They are serialized to JSON so a config file can
/// override any subset of fields; missing fields fall back to the defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::artifact::enhance::DEFAULT_SIGMA;
use crate::scene::camera::CameraSpec;

/// Default SkyView query endpoint
pub const DEFAULT_SKYVIEW_URL: &str = "https://skyview.gsfc.nasa.gov/current/cgi/runquery.pl";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config {}: {reason}", path.display())]
    Invalid { path: PathBuf, reason: String },
}

/// Imaging parameters shared by every image source
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct FetchConfig {
    /// Survey to query (e.g. "dss", "dss2r", "2mass-j")
    pub survey: String,

    /// Angular extent of the cutout in degrees (square)
    pub size_deg: f64,

    /// Directory where fetched artifacts are written
    pub output_dir: PathBuf,

    /// API token, sent only when set
    pub credentials: Option<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            survey: "dss".to_string(),
            size_deg: 0.5,
            output_dir: PathBuf::from("outputs"),
            credentials: None,
        }
    }
}

/// Which mechanism produces the artifacts
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceConfig {
    /// HTTP query against a SkyView-compatible service
    Http { base_url: String },
    /// Local `skyview.jar` renderer
    Jar { java: PathBuf, jar: PathBuf },
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig::Http {
            base_url: DEFAULT_SKYVIEW_URL.to_string(),
        }
    }
}

impl SourceConfig {
    pub fn default_jar() -> Self {
        SourceConfig::Jar {
            java: PathBuf::from("java"),
            jar: PathBuf::from("skyview.jar"),
        }
    }
}

/// Scene assembly and display options
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SceneOptions {
    /// Directory that relative artifact paths are resolved against
    pub base_dir: Option<PathBuf>,

    /// Edge length of each sprite in scene units
    pub sprite_size: f64,

    /// Gaussian sigma (pixels) used when enhancing artifacts for display
    pub enhance_sigma: f32,
}

impl Default for SceneOptions {
    fn default() -> Self {
        Self {
            base_dir: None,
            sprite_size: 0.25,
            enhance_sigma: DEFAULT_SIGMA,
        }
    }
}

impl SceneOptions {
    /// Resolve an artifact path from a record against `base_dir`
    pub fn resolve(&self, file: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if file.is_relative() => base.join(file),
            _ => file.to_path_buf(),
        }
    }
}

/// Top-level configuration
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct AppConfig {
    pub fetch: FetchConfig,
    pub source: SourceConfig,
    pub camera: CameraSpec,
    pub scene: SceneOptions,
}

impl AppConfig {
    /// Parse from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Convert to a pretty JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load a config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.camera.validate().map_err(|reason| ConfigError::Invalid {
            path: path.to_path_buf(),
            reason,
        })?;
        info!("⚙️  Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load `path` if given, else the per-user config file if it exists, else defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            return Self::load(path);
        }
        match Self::default_path() {
            Some(path) if path.is_file() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Per-user config location:
    /// - Linux: ~/.config/sky-atlas/config.json
    /// - macOS: ~/Library/Application Support/sky-atlas/config.json
    /// - Windows: %APPDATA%\sky-atlas\config.json
    pub fn default_path() -> Option<PathBuf> {
        let mut path = dirs::config_dir()?;
        path.push("sky-atlas");
        path.push("config.json");
        Some(path)
    }
}
