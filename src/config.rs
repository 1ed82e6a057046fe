use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Contents of `audio-orbit.toml`. Every field is optional.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub canvas: CanvasConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CanvasConfig {
    /// Side length of the square output image in pixels
    #[serde(default = "default_size")]
    pub size: u32,
    /// Decorative background stars
    #[serde(default = "default_stars")]
    pub stars: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    /// Exponential smoothing between consecutive spectra (0.0-1.0)
    #[serde(default = "default_smoothing")]
    pub smoothing: f32,
    /// Level mapped to byte value 0
    #[serde(default = "default_min_db")]
    pub min_db: f32,
    /// Level mapped to byte value 255
    #[serde(default = "default_max_db")]
    pub max_db: f32,
    /// Minimum rise in frame energy that counts as an onset
    #[serde(default = "default_onset_threshold")]
    pub onset_threshold: f32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            size: default_size(),
            stars: default_stars(),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            smoothing: default_smoothing(),
            min_db: default_min_db(),
            max_db: default_max_db(),
            onset_threshold: default_onset_threshold(),
        }
    }
}

pub const DEFAULT_CANVAS_SIZE: u32 = 1024;
pub const DEFAULT_STARS: usize = 400;

fn default_size() -> u32 { DEFAULT_CANVAS_SIZE }
fn default_stars() -> usize { DEFAULT_STARS }
fn default_smoothing() -> f32 { 0.8 }
fn default_min_db() -> f32 { -100.0 }
fn default_max_db() -> f32 { -30.0 }
fn default_onset_threshold() -> f32 { 1.0e6 }

pub fn load_config(path: &Path) -> Option<Config> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(err) => {
            log::warn!("Invalid config {}: {}", path.display(), err);
            None
        }
    }
}

/// Explicit path, then `./audio-orbit.toml`, then the user config directories.
pub fn find_config(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let local = PathBuf::from("audio-orbit.toml");
    if local.exists() {
        return Some(local);
    }
    if let Some(home) = dirs::home_dir() {
        let xdg = home.join(".config").join("audio-orbit").join("config.toml");
        if xdg.exists() {
            return Some(xdg);
        }
    }
    if let Some(config_dir) = dirs::config_dir() {
        let platform = config_dir.join("audio-orbit").join("config.toml");
        if platform.exists() {
            return Some(platform);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.canvas.size, 1024);
        assert_eq!(config.canvas.stars, 400);
        assert_eq!(config.analysis.max_db, -30.0);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config: Config = toml::from_str(
            "[canvas]\nsize = 512\n\n[analysis]\nonset_threshold = 5e5\n",
        )
        .unwrap();
        assert_eq!(config.canvas.size, 512);
        assert_eq!(config.canvas.stars, 400);
        assert_eq!(config.analysis.onset_threshold, 5e5);
        assert_eq!(config.analysis.smoothing, 0.8);
    }
}
