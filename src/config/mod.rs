use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::crop::{CropFractions, HandleHitArea, DEFAULT_MIN_CROP_SIZE};
use crate::render::DEFAULT_JPEG_QUALITY;
use crate::storage::DEFAULT_OUTPUT_PREFIX;

const APP_DIR: &str = "doccrop";
const APP_CONFIG_FILE: &str = "config.json";

/// Crop engine settings from `config.json`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CropConfig {
    pub min_crop_size: f64,
    /// Default rectangle when a freshly captured image is first displayed.
    pub capture_fractions: CropFractions,
    /// Default rectangle when the user enters crop mode.
    pub crop_mode_fractions: CropFractions,
    pub jpeg_quality: u8,
    pub corner_handle_size: f64,
    pub edge_handle_size: f64,
    pub output_prefix: String,
}

impl Default for CropConfig {
    fn default() -> Self {
        let hit_area = HandleHitArea::default();
        Self {
            min_crop_size: DEFAULT_MIN_CROP_SIZE,
            capture_fractions: CropFractions::new(0.85, 0.5),
            crop_mode_fractions: CropFractions::new(0.8, 0.6),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            corner_handle_size: hit_area.corner_size,
            edge_handle_size: hit_area.edge_size,
            output_prefix: DEFAULT_OUTPUT_PREFIX.to_string(),
        }
    }
}

impl CropConfig {
    /// Replaces out-of-range values with usable ones.
    pub fn normalized(mut self) -> Self {
        let defaults = Self::default();
        if !self.min_crop_size.is_finite() || self.min_crop_size < 1.0 {
            self.min_crop_size = defaults.min_crop_size;
        }
        self.capture_fractions = self.capture_fractions.normalized();
        self.crop_mode_fractions = self.crop_mode_fractions.normalized();
        self.jpeg_quality = self.jpeg_quality.clamp(1, 100);
        if !self.corner_handle_size.is_finite() || self.corner_handle_size <= 0.0 {
            self.corner_handle_size = defaults.corner_handle_size;
        }
        if !self.edge_handle_size.is_finite() || self.edge_handle_size <= 0.0 {
            self.edge_handle_size = defaults.edge_handle_size;
        }
        self
    }

    pub fn hit_area(&self) -> HandleHitArea {
        HandleHitArea {
            corner_size: self.corner_handle_size,
            edge_size: self.edge_handle_size,
        }
    }
}

pub fn load_crop_config() -> CropConfig {
    let xdg_config_home = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from);
    let home = std::env::var_os("HOME").map(PathBuf::from);
    load_crop_config_with(xdg_config_home.as_deref(), home.as_deref())
}

fn load_crop_config_with(xdg_config_home: Option<&Path>, home: Option<&Path>) -> CropConfig {
    match crop_config_path(xdg_config_home, home) {
        Some(path) if path.exists() => load_crop_config_from(&path),
        Some(_) => CropConfig::default(),
        None => {
            tracing::debug!("neither XDG_CONFIG_HOME nor HOME is set; using default crop config");
            CropConfig::default()
        }
    }
}

/// Reads `path`; unreadable or malformed files fall back to defaults with a warning.
pub fn load_crop_config_from(path: &Path) -> CropConfig {
    match std::fs::read_to_string(path) {
        Ok(contents) => serde_json::from_str::<CropConfig>(&contents)
            .map(CropConfig::normalized)
            .unwrap_or_else(|err| {
                tracing::warn!(?err, ?path, "failed to parse config.json; using defaults");
                CropConfig::default()
            }),
        Err(err) => {
            tracing::warn!(?err, ?path, "failed to read config.json; using defaults");
            CropConfig::default()
        }
    }
}

/// `<config root>/doccrop/config.json`, where the root is a non-empty
/// `XDG_CONFIG_HOME` or else `$HOME/.config`.
pub fn crop_config_path(xdg_config_home: Option<&Path>, home: Option<&Path>) -> Option<PathBuf> {
    let root = match xdg_config_home.filter(|path| !path.as_os_str().is_empty()) {
        Some(xdg) => xdg.to_path_buf(),
        None => home?.join(".config"),
    };
    Some(root.join(APP_DIR).join(APP_CONFIG_FILE))
}
