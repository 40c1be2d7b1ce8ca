//! JSON file configuration adapter.
//!
//! Implements [`ConfigPort`] over a single JSON document.  Missing fields
//! take their defaults (`#[serde(default)]` on [`AutoloadConfig`]); a
//! missing file yields the full default config.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::AutoloadConfig;

pub struct JsonConfigFile {
    path: PathBuf,
}

impl JsonConfigFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigPort for JsonConfigFile {
    fn load(&self) -> Result<AutoloadConfig, ConfigError> {
        if !self.path.exists() {
            debug!("JsonConfigFile: {:?} not found, using defaults", self.path);
            return Ok(AutoloadConfig::default());
        }

        let file = File::open(&self.path).map_err(|e| {
            warn!("JsonConfigFile: can't open {:?}: {}", self.path, e);
            ConfigError::IoError
        })?;
        let config: AutoloadConfig =
            serde_json::from_reader(BufReader::new(file)).map_err(|e| {
                warn!("JsonConfigFile: {:?} is not valid config: {}", self.path, e);
                ConfigError::Corrupted
            })?;

        config.validate()?;
        info!(
            "JsonConfigFile: loaded {:?} ({} lanes)",
            self.path,
            config.lane_count()
        );
        Ok(config)
    }

    fn save(&self, config: &AutoloadConfig) -> Result<(), ConfigError> {
        config.validate()?;

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|_| ConfigError::IoError)?;
        }
        let file = File::create(&self.path).map_err(|_| ConfigError::IoError)?;
        serde_json::to_writer_pretty(BufWriter::new(file), config)
            .map_err(|_| ConfigError::IoError)?;

        info!("JsonConfigFile: saved {:?}", self.path);
        Ok(())
    }
}
