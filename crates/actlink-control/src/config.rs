//! PID 配置（TOML `[pid]` 段）

use crate::pid::ClipLimit;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// 配置加载错误
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// 默认最小更新间隔（1 kHz）
pub const DEFAULT_MIN_DT_US: u32 = 1_000;

/// PID 配置
///
/// ```
/// use actlink_control::PidConfig;
///
/// let config = PidConfig::from_toml_str(r#"
///     p_gain = 8
///     p_base_gain = 2.0
///     clip = { high = 4095.0, low = 0.0 }
/// "#).unwrap();
/// assert_eq!(config.p_gain, 8);
/// assert_eq!(config.min_dt_us, 1_000);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PidConfig {
    pub p_gain: u8,
    pub i_gain: u8,
    pub d_gain: u8,
    pub p_base_gain: f32,
    pub i_base_gain: f32,
    pub d_base_gain: f32,
    /// 不设置则不限幅
    pub clip: Option<ClipLimit>,
    /// 最小更新间隔（微秒）
    pub min_dt_us: u32,
}

impl Default for PidConfig {
    fn default() -> Self {
        Self {
            p_gain: 0,
            i_gain: 0,
            d_gain: 0,
            p_base_gain: 0.0,
            i_base_gain: 0.0,
            d_base_gain: 0.0,
            clip: None,
            min_dt_us: DEFAULT_MIN_DT_US,
        }
    }
}

impl PidConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: PidConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// 基准增益必须是有限值；限幅必须满足 `low <= high`
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("p_base_gain", self.p_base_gain),
            ("i_base_gain", self.i_base_gain),
            ("d_base_gain", self.d_base_gain),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::Invalid(format!("{name} must be finite")));
            }
        }
        if let Some(clip) = &self.clip {
            if clip.low.is_nan() || clip.high.is_nan() || clip.low > clip.high {
                return Err(ConfigError::Invalid(format!(
                    "clip.low ({}) must not exceed clip.high ({})",
                    clip.low, clip.high
                )));
            }
        }
        Ok(())
    }
}
