use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::platform;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub player: PlayerConfig,
}

/// User-configurable file locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Path to a local TOML track catalog (highest priority).
    /// Defaults to `$XDG_CONFIG_HOME/mellow/catalog.toml`.
    #[serde(default = "default_catalog_toml")]
    pub catalog_toml: PathBuf,
    /// Base directory that relative track files resolve against.
    /// Defaults to `~/music`.
    #[serde(default = "default_music_dir")]
    pub music_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    #[serde(default = "default_volume")]
    pub default_volume: f32,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            catalog_toml: default_catalog_toml(),
            music_dir: default_music_dir(),
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            default_volume: default_volume(),
        }
    }
}

fn default_catalog_toml() -> PathBuf {
    // On Windows, check for portable catalog.toml in executable directory
    #[cfg(windows)]
    {
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let portable_catalog = exe_dir.join("catalog.toml");
                if portable_catalog.exists() {
                    return portable_catalog;
                }
            }
        }
    }

    platform::config_dir().join("catalog.toml")
}

fn default_music_dir() -> PathBuf {
    dirs::audio_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("music")
}

fn default_volume() -> f32 {
    0.7
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(&config_path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        platform::config_dir().join("config.toml")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            paths: PathsConfig::default(),
            player: PlayerConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.player.default_volume, 0.7);
        assert!(config.paths.catalog_toml.ends_with("mellow/catalog.toml"));
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str("[player]\ndefault_volume = 0.3\n").expect("parse");
        assert_eq!(config.player.default_volume, 0.3);
        assert!(config.paths.catalog_toml.ends_with("catalog.toml"));
    }
}
