//! 完整配置文件（`[link]` + `[pid]`）

use actlink_control::{ConfigError, PidConfig};
use actlink_driver::LinkConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// 配置文件
///
/// ```toml
/// [link]
/// baud_rate = 115200
/// transport = "raw_resync"
///
/// [pid]
/// p_gain = 8
/// p_base_gain = 2.0
/// min_dt_us = 1000
/// clip = { high = 4095.0, low = 0.0 }
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ActlinkConfig {
    pub link: LinkConfig,
    pub pid: PidConfig,
}

impl ActlinkConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: ActlinkConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// 从文件加载
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        info!(path = %path.display(), "config loaded");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.link
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        self.pid.validate()
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}
