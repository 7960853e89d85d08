//! Compute module configuration from environment variables.

use crate::errors::ConfigError;
use std::env;

/// Limits enforced by stateless message validation and the keeper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputeConfig {
    /// Maximum accepted bytecode size in bytes.
    pub max_wasm_size: usize,
    /// Maximum instantiate label length.
    pub max_label_size: usize,
    /// Maximum source URL length.
    pub max_source_size: usize,
    /// Maximum builder tag length.
    pub max_builder_size: usize,
    /// Capacity of the inbound request channel.
    pub channel_capacity: usize,
}

impl Default for ComputeConfig {
    fn default() -> Self {
        Self {
            max_wasm_size: 800 * 1024,
            max_label_size: 128,
            max_source_size: 256,
            max_builder_size: 128,
            channel_capacity: 1024,
        }
    }
}

impl ComputeConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `QC_COMPUTE_MAX_WASM_SIZE`: bytecode limit in bytes (default: 819200)
    /// - `QC_COMPUTE_MAX_LABEL_SIZE`: label limit (default: 128)
    /// - `QC_COMPUTE_MAX_SOURCE_SIZE`: source URL limit (default: 256)
    /// - `QC_COMPUTE_MAX_BUILDER_SIZE`: builder tag limit (default: 128)
    /// - `QC_COMPUTE_CHANNEL_CAPACITY`: request channel capacity (default: 1024)
    ///
    /// Unset variables fall back to defaults; unparsable ones are an error.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Self {
            max_wasm_size: env_usize("QC_COMPUTE_MAX_WASM_SIZE", defaults.max_wasm_size)?,
            max_label_size: env_usize("QC_COMPUTE_MAX_LABEL_SIZE", defaults.max_label_size)?,
            max_source_size: env_usize("QC_COMPUTE_MAX_SOURCE_SIZE", defaults.max_source_size)?,
            max_builder_size: env_usize(
                "QC_COMPUTE_MAX_BUILDER_SIZE",
                defaults.max_builder_size,
            )?,
            channel_capacity: env_usize(
                "QC_COMPUTE_CHANNEL_CAPACITY",
                defaults.channel_capacity,
            )?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Rejects zero limits.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let limits = [
            ("max_wasm_size", self.max_wasm_size),
            ("max_label_size", self.max_label_size),
            ("max_source_size", self.max_source_size),
            ("max_builder_size", self.max_builder_size),
            ("channel_capacity", self.channel_capacity),
        ];
        for (name, value) in limits {
            if value == 0 {
                return Err(ConfigError::ZeroLimit { name });
            }
        }
        Ok(())
    }
}

fn env_usize(var: &'static str, default: usize) -> Result<usize, ConfigError> {
    match env::var(var) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidEnv { var, value }),
        Err(_) => Ok(default),
    }
}
