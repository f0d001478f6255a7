use crate::gallery::controls::ControlDefaults;
use crate::gallery::size::{
    SizeRange, DEFAULT_MAX_SIZE, DEFAULT_MIN_SIZE, DEFAULT_SIZE, DEFAULT_STEP,
};
use anyhow::Result;
use crossterm::event::KeyCode;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub gallery: GalleryConfig,
    #[serde(default)]
    pub thumbnails: ThumbnailConfig,
    #[serde(default)]
    pub slideshow: SlideshowConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub keybindings: KeybindingsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryConfig {
    pub directory: PathBuf,
    pub recursive: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThumbnailConfig {
    /// Size slider bounds (px) for synthesized controls
    pub min_size: u32,
    pub max_size: u32,
    pub default_size: u32,
    pub step: u32,
    /// Disk cache thumbnail bounds
    pub width: u32,
    pub height: u32,
    pub quality: u8,
    /// Decoded thumbnails kept in memory
    #[serde(default = "default_memory_capacity")]
    pub memory_capacity: usize,
}

fn default_memory_capacity() -> usize {
    96
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SlideshowConfig {
    pub interval_ms: u64,
    /// Start with the slideshow checkbox ticked
    pub autoplay: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Allow fullscreen at all
    pub fullscreen: bool,
    /// Also ask the terminal window to go fullscreen (XTWINOPS)
    #[serde(default)]
    pub window_ops: bool,
    #[serde(default)]
    pub start_fullscreen: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeybindingsConfig {
    pub next: String,
    pub prev: String,
    pub quit: String,
    pub search: String,
    pub autoplay: String,
    pub fullscreen: String,
    pub help: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when RUST_LOG is unset
    pub level: String,
    /// Log file; defaults to the cache directory
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            directory: dirs::picture_dir().unwrap_or_else(|| PathBuf::from("~/Pictures")),
            recursive: false,
        }
    }
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            min_size: DEFAULT_MIN_SIZE,
            max_size: DEFAULT_MAX_SIZE,
            default_size: DEFAULT_SIZE,
            step: DEFAULT_STEP,
            width: 640,
            height: 480,
            quality: 90,
            memory_capacity: default_memory_capacity(),
        }
    }
}

impl Default for SlideshowConfig {
    fn default() -> Self {
        Self {
            interval_ms: 2500,
            autoplay: false,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            fullscreen: true,
            window_ops: false,
            start_fullscreen: false,
        }
    }
}

impl Default for KeybindingsConfig {
    fn default() -> Self {
        Self {
            next: "l".to_string(),
            prev: "h".to_string(),
            quit: "q".to_string(),
            search: "/".to_string(),
            autoplay: "a".to_string(),
            fullscreen: "f".to_string(),
            help: "?".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl KeybindingsConfig {
    /// Parse a keybinding string into a KeyCode
    pub fn parse_key(s: &str) -> Option<KeyCode> {
        let s = s.trim();

        // Single character
        if s.chars().count() == 1 {
            if let Some(ch) = s.chars().next() {
                return Some(KeyCode::Char(ch));
            }
        }

        // Named keys (case insensitive)
        match s.to_lowercase().as_str() {
            "enter" | "return" => Some(KeyCode::Enter),
            "esc" | "escape" => Some(KeyCode::Esc),
            "tab" => Some(KeyCode::Tab),
            "backtab" | "shift+tab" | "s-tab" => Some(KeyCode::BackTab),
            "space" => Some(KeyCode::Char(' ')),
            "backspace" => Some(KeyCode::Backspace),
            "home" => Some(KeyCode::Home),
            "end" => Some(KeyCode::End),
            "pageup" | "pgup" => Some(KeyCode::PageUp),
            "pagedown" | "pgdn" => Some(KeyCode::PageDown),
            "up" | "arrow_up" => Some(KeyCode::Up),
            "down" | "arrow_down" => Some(KeyCode::Down),
            "left" | "arrow_left" => Some(KeyCode::Left),
            "right" | "arrow_right" => Some(KeyCode::Right),
            f if f.starts_with('f') => f[1..].parse::<u8>().ok().map(KeyCode::F),
            _ => None,
        }
    }

    /// Check if a KeyCode matches a keybinding
    pub fn matches(&self, key: KeyCode, binding: &str) -> bool {
        Self::parse_key(binding) == Some(key)
    }
}

impl Config {
    /// Return the path to the configuration file.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("com", "lightgrid", "lightgrid")
            .map(|dirs| dirs.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
            .join("config.toml")
    }

    /// Directory for thumbnails and logs.
    pub fn cache_dir() -> PathBuf {
        directories::ProjectDirs::from("com", "lightgrid", "lightgrid")
            .map(|dirs| dirs.cache_dir().to_path_buf())
            .unwrap_or_else(|| std::env::temp_dir().join("lightgrid"))
    }

    /// Load config from file, creating default if missing or corrupt.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let data = fs::read_to_string(path)?;
            match toml::from_str::<Config>(&data) {
                Ok(config) => Ok(config),
                Err(e) => {
                    eprintln!(
                        "Warning: Failed to parse config at {}: {}",
                        path.display(),
                        e
                    );
                    eprintln!("Using default configuration.");
                    Ok(Config::default())
                }
            }
        } else {
            // Create default config.
            let config = Config::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    /// Save config to file.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let data = toml::to_string_pretty(self)?;
        fs::write(path, data)?;

        Ok(())
    }

    /// Get gallery directory, expanding ~ if needed.
    pub fn gallery_dir(&self) -> PathBuf {
        crate::utils::expand_tilde(&self.gallery.directory)
    }

    pub fn size_range(&self) -> SizeRange {
        SizeRange::new(
            self.thumbnails.min_size,
            self.thumbnails.max_size,
            self.thumbnails.step,
        )
    }

    pub fn slideshow_interval(&self) -> Duration {
        Duration::from_millis(self.slideshow.interval_ms)
    }

    /// Defaults for controls the page does not declare.
    pub fn control_defaults(&self) -> ControlDefaults {
        ControlDefaults {
            size_range: self.size_range(),
            size_value: self.thumbnails.default_size,
            autoplay_checked: self.slideshow.autoplay,
        }
    }

    pub fn log_file(&self) -> PathBuf {
        self.logging
            .file
            .clone()
            .unwrap_or_else(|| Self::cache_dir().join("lightgrid.log"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_key_handles_chars_and_names() {
        assert_eq!(KeybindingsConfig::parse_key("l"), Some(KeyCode::Char('l')));
        assert_eq!(KeybindingsConfig::parse_key("/"), Some(KeyCode::Char('/')));
        assert_eq!(
            KeybindingsConfig::parse_key("Space"),
            Some(KeyCode::Char(' '))
        );
        assert_eq!(KeybindingsConfig::parse_key("ESC"), Some(KeyCode::Esc));
        assert_eq!(KeybindingsConfig::parse_key("f11"), Some(KeyCode::F(11)));
        assert_eq!(KeybindingsConfig::parse_key("nonsense"), None);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
[slideshow]
interval_ms = 4000
autoplay = true

[thumbnails]
max_size = 500
"#,
        )
        .unwrap();
        assert_eq!(config.slideshow_interval(), Duration::from_millis(4000));
        assert!(config.control_defaults().autoplay_checked);
        assert_eq!(config.size_range(), SizeRange::new(200, 500, 10));
        assert_eq!(config.thumbnails.quality, 90);
        assert_eq!(config.keybindings.next, "l");
    }

    #[test]
    fn load_from_creates_missing_file_and_tolerates_garbage() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested/config.toml");

        let created = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(created.thumbnails.default_size, DEFAULT_SIZE);

        fs::write(&path, "this is = = not toml").unwrap();
        let fallback = Config::load_from(&path).unwrap();
        assert_eq!(fallback.slideshow.interval_ms, 2500);
    }

    #[test]
    fn default_config_round_trips() {
        let text = toml::to_string_pretty(&Config::default()).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.thumbnails.max_size, DEFAULT_MAX_SIZE);
        assert_eq!(parsed.keybindings.search, "/");
    }
}
