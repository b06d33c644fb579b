//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{KsgError, KsgResult};

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Where the generated project is written.
    pub output_file: PathBuf,

    /// Default animation settings.
    pub animation: AnimationDefaults,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Default animation parameters.
///
/// Anchor and pan names are validated by the processing crate; a name may be
/// listed more than once to make it proportionally more likely.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationDefaults {
    /// Zoom applied on top of the covering scale (1.1 = 10%).
    pub zoom_factor: f64,

    /// Portrait start size as a multiple of `zoom_factor`.
    pub portrait_start_multiplier: f64,

    /// Portrait end size as a multiple of `zoom_factor`.
    pub portrait_end_multiplier: f64,

    /// First filter id assigned during a run.
    pub filter_id_base: u32,

    /// Playlist id of the asset bin, which is never animated.
    pub asset_bin_id: String,

    /// Anchors used by zoom-in and zoom-out effects.
    pub anchors: Vec<String>,

    /// Directions used by pan effects.
    pub pans: Vec<String>,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "ksg=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output_file: PathBuf::from("slideshow.kdenlive"),
            animation: AnimationDefaults::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for AnimationDefaults {
    fn default() -> Self {
        Self {
            zoom_factor: 1.1,
            portrait_start_multiplier: 2.0,
            portrait_end_multiplier: 1.5,
            filter_id_base: 10,
            asset_bin_id: "main_bin".to_string(),
            anchors: [
                "top-left",
                "top-center",
                "top-right",
                "middle-left",
                "middle-center",
                "middle-right",
                "bottom-left",
                "bottom-center",
                "bottom-right",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            pans: [
                "top-left-to-right",
                "middle-left-to-right",
                "bottom-left-to-right",
                "top-right-to-left",
                "middle-right-to-left",
                "bottom-right-to-left",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from an explicit path, falling back to defaults.
    pub fn load_from(config_path: &std::path::Path) -> Self {
        match Self::try_load_from(config_path) {
            Ok(Some(config)) => config,
            Ok(None) => Self::default(),
            Err(e) => {
                tracing::warn!("Failed to load config at {:?}: {}", config_path, e);
                Self::default()
            }
        }
    }

    /// Load config from `config_path`; `Ok(None)` if the file does not exist.
    pub fn try_load_from(config_path: &std::path::Path) -> KsgResult<Option<Self>> {
        if !config_path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(config_path).map_err(|e| KsgError::IoAt {
            path: config_path.to_path_buf(),
            source: e,
        })?;
        let config = serde_json::from_str(&content)
            .map_err(|e| KsgError::config(format!("{}: {e}", config_path.display())))?;
        Ok(Some(config))
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("ksg").join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_classic_behaviour() {
        let config = AppConfig::default();
        assert_eq!(config.output_file, PathBuf::from("slideshow.kdenlive"));
        assert!((config.animation.zoom_factor - 1.1).abs() < 1e-12);
        assert_eq!(config.animation.filter_id_base, 10);
        assert_eq!(config.animation.asset_bin_id, "main_bin");
        assert_eq!(config.animation.anchors.len(), 9);
        assert_eq!(config.animation.pans.len(), 6);
    }

    #[test]
    fn test_partial_animation_section_keeps_defaults() {
        let json = r#"{
            "output_file": "out.kdenlive",
            "animation": { "zoom_factor": 1.25 },
            "logging": { "level": "debug", "json": false, "file": null }
        }"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();
        assert!((config.animation.zoom_factor - 1.25).abs() < 1e-12);
        assert_eq!(config.animation.filter_id_base, 10);
        assert_eq!(config.animation.pans.len(), 6);

        let config: AppConfig = serde_json::from_str(r#"{ "logging": { "json": true } }"#).unwrap();
        assert_eq!(config.output_file, PathBuf::from("slideshow.kdenlive"));
        assert_eq!(config.logging.level, "info");
        assert!(config.logging.json);
    }

    #[test]
    fn test_missing_file_is_not_an_error() {
        let path = std::env::temp_dir().join("ksg_test_no_such_config.json");
        let _ = std::fs::remove_file(&path);
        assert!(AppConfig::try_load_from(&path).unwrap().is_none());
    }

    #[test]
    fn test_load_from_bad_file_falls_back_to_defaults() {
        let path = std::env::temp_dir().join("ksg_test_bad_config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let config = AppConfig::load_from(&path);
        assert_eq!(config.output_file, PathBuf::from("slideshow.kdenlive"));
        assert!(matches!(
            AppConfig::try_load_from(&path),
            Err(KsgError::Config { .. })
        ));

        std::fs::remove_file(&path).ok();
    }
}
