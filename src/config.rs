use std::path::{Path, PathBuf};

use crossterm::event::KeyCode;
use serde::Deserialize;

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub treemap: TreemapConfig,
    pub colors: ColorsConfig,
    pub keybinds: KeybindsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub currency: String,
    pub price_refresh_secs: u64,
    pub fetch_price: bool,
    pub default_color_mode: String,
    pub default_sort: String,
    pub color_support: String,
    pub show_detail_panel: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        GeneralConfig {
            currency: "eur".to_string(),
            price_refresh_secs: 300,
            fetch_price: true,
            default_color_mode: "size".to_string(),
            default_sort: "value".to_string(),
            color_support: "auto".to_string(),
            show_detail_panel: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TreemapConfig {
    pub min_label_width: u16,
    pub min_label_height: u16,
    pub border_style: String,
    pub animation_frames: u8,
}

impl Default for TreemapConfig {
    fn default() -> Self {
        TreemapConfig {
            min_label_width: 10,
            min_label_height: 3,
            border_style: "rounded".to_string(),
            animation_frames: 6,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ColorsConfig {
    pub theme: String,
    pub heat_low: String,
    pub heat_mid: String,
    pub heat_high: String,
}

impl Default for ColorsConfig {
    fn default() -> Self {
        ColorsConfig {
            theme: "dark".to_string(),
            heat_low: "#2d5a27".to_string(),
            heat_mid: "#b5890a".to_string(),
            heat_high: "#a12e2e".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KeybindsConfig {
    pub quit: String,
    pub add: String,
    pub delete: String,
    pub clear: String,
    pub cycle_color: String,
    pub cycle_theme: String,
    pub toggle_detail: String,
    pub cycle_sort: String,
    pub refresh_price: String,
    pub help: String,
}

impl Default for KeybindsConfig {
    fn default() -> Self {
        KeybindsConfig {
            quit: "q".to_string(),
            add: "a".to_string(),
            delete: "x".to_string(),
            clear: "C".to_string(),
            cycle_color: "c".to_string(),
            cycle_theme: "t".to_string(),
            toggle_detail: "d".to_string(),
            cycle_sort: "s".to_string(),
            refresh_price: "r".to_string(),
            help: "?".to_string(),
        }
    }
}

/// Parses a config keybind string into a key code. Single characters map to
/// themselves; a handful of named keys are accepted case-insensitively.
pub fn parse_key(s: &str) -> Option<KeyCode> {
    let mut chars = s.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Some(KeyCode::Char(c));
    }
    match s.to_lowercase().as_str() {
        "enter" => Some(KeyCode::Enter),
        "esc" | "escape" => Some(KeyCode::Esc),
        "tab" => Some(KeyCode::Tab),
        "space" => Some(KeyCode::Char(' ')),
        "backspace" => Some(KeyCode::Backspace),
        "del" | "delete" => Some(KeyCode::Delete),
        _ => None,
    }
}

pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("satmap").join("config.toml"))
}

pub fn load_config() -> Config {
    match config_path() {
        Some(path) if path.exists() => load_config_from_path(&path),
        _ => Config::default(),
    }
}

pub fn load_config_from_path(path: &Path) -> Config {
    match std::fs::read_to_string(path) {
        Ok(contents) => toml::from_str(&contents).unwrap_or_default(),
        Err(_) => Config::default(),
    }
}
