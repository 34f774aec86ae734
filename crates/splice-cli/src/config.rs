use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use splice_core::{ErrorInfo, SpliceError};
use splice_structs::ContainerConfig;
use splice_synth::SynthConfig;

/// Top-level YAML document accepted by `--config`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpliceConfig {
    #[serde(default)]
    pub synth: SynthConfig,
    #[serde(default)]
    pub containers: ContainerConfig,
}

impl SpliceConfig {
    /// Reads and validates `path`, or returns the defaults when no file is given.
    pub fn load(path: Option<&Path>) -> Result<Self, SpliceError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path).map_err(|err| {
            SpliceError::Config(
                ErrorInfo::new("config-read", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        let config: SpliceConfig = serde_yaml::from_str(&text).map_err(|err| {
            SpliceError::Config(
                ErrorInfo::new("config-parse", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        config.synth.validate()?;
        config.containers.validate()?;
        Ok(config)
    }
}
