//! Cutout rendering through the local `skyview.jar` tool.

use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

use super::{artifact_path, FetchError, ImageSource};
use crate::state::config::FetchConfig;

/// Runs `java -jar skyview.jar position=.. survey=.. size=.. output=..`
#[derive(Debug, Clone)]
pub struct SkyViewJar {
    java: PathBuf,
    jar: PathBuf,
    config: FetchConfig,
}

impl SkyViewJar {
    pub fn new(java: PathBuf, jar: PathBuf, config: FetchConfig) -> Self {
        if config.credentials.is_some() {
            debug!("skyview.jar takes no credentials; ignoring the configured token");
        }
        Self { java, jar, config }
    }

    /// The renderer invocation for one cutout written to `output`
    pub fn command(&self, ra: f64, dec: f64, output: &Path) -> Command {
        let size = self.config.size_deg;
        let mut command = Command::new(&self.java);
        command
            .arg("-jar")
            .arg(&self.jar)
            .arg(format!("position={},{}", ra, dec))
            .arg(format!("survey={}", self.config.survey))
            .arg(format!("size={},{}", size, size))
            .arg(format!("output={}", output.display()));
        command
    }
}

impl ImageSource for SkyViewJar {
    fn name(&self) -> &str {
        "skyview-jar"
    }

    fn fetch(&self, ra: f64, dec: f64) -> Result<PathBuf, FetchError> {
        fs::create_dir_all(&self.config.output_dir).map_err(|source| FetchError::Io {
            path: self.config.output_dir.clone(),
            source,
        })?;
        let output = artifact_path(&self.config.output_dir, &self.config.survey, Local::now());

        let program = self.java.display().to_string();
        info!("Rendering {} cutout at ({}, {}) with {}", self.config.survey, ra, dec, program);

        let status = self
            .command(ra, dec, &output)
            .status()
            .map_err(|source| FetchError::Spawn {
                program: program.clone(),
                source,
            })?;
        if !status.success() {
            return Err(FetchError::ExitStatus { program, status });
        }

        if !output.is_file() {
            return Err(FetchError::Malformed(format!(
                "{} exited cleanly but wrote no {}",
                program,
                output.display()
            )));
        }

        info!("Image successfully generated and saved as {}", output.display());
        Ok(output)
    }
}
