use std::fs;
use std::path::Path;

use tracing::info;
use validator::Validate;

use crate::common::{RepomgrError, RepomgrResult};
use crate::domain::entities::config::ManagerConfig;

/// Loads the YAML configuration file.
///
/// Read-only: the tool never writes configuration back.
pub struct ConfigStore;

impl ConfigStore {
    /// Read, parse, and validate the configuration at `path`.
    ///
    /// Missing file, malformed YAML, and missing required keys are all
    /// fatal configuration errors raised before any session operation.
    pub fn load(path: &Path) -> RepomgrResult<ManagerConfig> {
        if !path.exists() {
            return Err(RepomgrError::config_error(format!(
                "Config file not found: {}\nCopy config.example.yaml to config.yaml and fill in your details",
                path.display()
            )));
        }

        let raw = fs::read_to_string(path).map_err(|e| {
            RepomgrError::filesystem_error_with_source(
                "failed to read config file",
                Some(path.to_path_buf()),
                e,
            )
        })?;

        let config: ManagerConfig = serde_yaml::from_str(&raw).map_err(|e| {
            RepomgrError::config_error_with_source(
                format!("malformed config file {}", path.display()),
                e,
            )
        })?;

        config.validate().map_err(|e| {
            RepomgrError::config_error_with_source(
                format!("invalid config file {}", path.display()),
                e,
            )
        })?;

        info!(path = %path.display(), "configuration loaded");
        Ok(config)
    }
}
