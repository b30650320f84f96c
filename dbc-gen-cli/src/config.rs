//! Configuration file loading

use anyhow::{Context, Result};
use dbc_gen::GeneratorConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Application configuration (loaded from a TOML file)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub generator: GeneratorConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct InputConfig {
    #[serde(default)]
    pub dbc_files: Vec<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OutputConfig {
    /// Target file; `-` or absent means stdout
    pub path: Option<PathBuf>,
}

/// Load configuration from a TOML file
///
/// Relative input and output paths are resolved against the directory
/// containing the configuration file.
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    config
        .generator
        .validate()
        .with_context(|| format!("Invalid [generator] section in {:?}", path))?;

    if let Some(base) = path.parent() {
        for file in &mut config.input.dbc_files {
            if file.is_relative() {
                *file = base.join(&*file);
            }
        }
        if let Some(out) = &mut config.output.path {
            if out.is_relative() && out.as_os_str() != "-" {
                *out = base.join(&*out);
            }
        }
    }

    Ok(config)
}
