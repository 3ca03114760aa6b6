//! Engine configuration and config-file loading.
//!
//! Every field has a default, so an empty document (`{}`) is a valid config.
//! Files ending in `.yaml`/`.yml` are read as YAML, anything else as JSON.

use crate::error::ConfigError;
use crate::model::{KEY_CODE_LIMIT, MAX_KEY_CODE_LIMIT, MAX_STEPS, NOMINAL_FPS};
use crate::query::Bindings;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// How the first step is timed when the script omits its `frame`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FirstFrameDefault {
    /// The first step fires on frame 1.
    #[default]
    Zero,
    /// Legacy behaviour: offset from the unset-frame sentinel, placing the
    /// step more than eighteen minutes into the run at 60 fps.
    Sentinel,
}

/// Settings for one [`crate::ReplayEngine`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Maximum number of steps kept from a script.
    pub capacity: usize,
    /// Frames added to the previous step's frame when a step omits `frame`.
    pub frame_interval: u64,
    /// Frame used for a first step that omits `frame`.
    pub first_frame_default: FirstFrameDefault,
    /// One past the highest key code steps may press or release.
    pub key_code_limit: u32,
    /// Key bound to each joypad control.
    pub bindings: Bindings,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            capacity: MAX_STEPS,
            frame_interval: NOMINAL_FPS,
            first_frame_default: FirstFrameDefault::default(),
            key_code_limit: KEY_CODE_LIMIT,
            bindings: Bindings::default(),
        }
    }
}

impl EngineConfig {
    /// Reject settings the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::Invalid(
                "capacity must be at least 1".to_string(),
            ));
        }
        if self.key_code_limit == 0 {
            return Err(ConfigError::Invalid(
                "key_code_limit must be at least 1".to_string(),
            ));
        }
        if self.key_code_limit > MAX_KEY_CODE_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "key_code_limit must be at most {MAX_KEY_CODE_LIMIT}, got {}",
                self.key_code_limit
            )));
        }
        Ok(())
    }
}

/// Load and validate a config file.
pub fn load_config_file(path: &Path) -> Result<EngineConfig, ConfigError> {
    let data = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let parse_error = |message: String| ConfigError::Parse {
        path: path.to_path_buf(),
        message,
    };
    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext == "yaml" || ext == "yml");
    let config: EngineConfig = if is_yaml {
        serde_yml::from_str(&data).map_err(|err| parse_error(err.to_string()))?
    } else {
        serde_json::from_str(&data).map_err(|err| parse_error(err.to_string()))?
    };
    config.validate()?;
    Ok(config)
}
