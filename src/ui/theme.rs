use ratatui::style::Color;
use std::fs;

/// Gallery colors for light and dark terminals
#[derive(Clone)]
pub struct GridTheme {
    // Backgrounds
    pub bg: Color,
    pub card_bg: Color,
    /// Fill behind the lightbox panel
    pub backdrop: Color,

    // Foregrounds
    pub fg_primary: Color,
    pub fg_secondary: Color,
    pub fg_muted: Color,

    // Accents
    pub accent: Color,
    pub accent_alt: Color,
    pub highlight: Color,

    // Status
    pub success: Color,
    pub warning: Color,

    // Borders
    pub border: Color,
    pub border_focused: Color,
}

impl GridTheme {
    /// Paper - for light terminal backgrounds
    pub fn paper() -> Self {
        Self {
            // Transparent backgrounds (inherit from terminal)
            bg: Color::Reset,
            card_bg: Color::Reset,
            backdrop: Color::Rgb(225, 225, 220),

            fg_primary: Color::Rgb(20, 20, 24),
            fg_secondary: Color::Rgb(60, 60, 70),
            fg_muted: Color::Rgb(120, 120, 128),

            accent: Color::Rgb(32, 96, 160),
            accent_alt: Color::Rgb(24, 120, 96),
            highlight: Color::Rgb(176, 96, 16),

            success: Color::Rgb(24, 120, 64),
            warning: Color::Rgb(176, 96, 16),

            border: Color::Rgb(190, 190, 196),
            border_focused: Color::Rgb(32, 96, 160),
        }
    }

    /// Darkroom - for dark terminal backgrounds
    pub fn darkroom() -> Self {
        Self {
            bg: Color::Reset,
            card_bg: Color::Reset,
            backdrop: Color::Rgb(8, 8, 10),

            fg_primary: Color::Rgb(240, 240, 236),
            fg_secondary: Color::Rgb(200, 200, 196),
            fg_muted: Color::Rgb(110, 110, 118),

            accent: Color::Rgb(120, 190, 255),
            accent_alt: Color::Rgb(120, 230, 180),
            highlight: Color::Rgb(255, 200, 90),

            success: Color::Rgb(120, 230, 150),
            warning: Color::Rgb(255, 200, 90),

            border: Color::Rgb(70, 70, 80),
            border_focused: Color::Rgb(120, 190, 255),
        }
    }
}

impl Default for GridTheme {
    fn default() -> Self {
        if detect_light_theme() {
            Self::paper()
        } else {
            Self::darkroom()
        }
    }
}

/// Guess the terminal background from the environment and terminal configs
fn detect_light_theme() -> bool {
    if let Ok(theme) = std::env::var("LIGHTGRID_THEME") {
        return theme.eq_ignore_ascii_case("light");
    }

    // rxvt-style "fg;bg"; bg 7 or 15 is a light palette
    if let Ok(colors) = std::env::var("COLORFGBG") {
        if let Some(bg) = colors.rsplit(';').next().and_then(|b| b.parse::<u8>().ok()) {
            return bg == 7 || bg == 15;
        }
    }

    // Look for a theme hint at the top of Kitty/Alacritty configs
    if let Some(config_dir) = dirs::config_dir() {
        for rel in ["kitty/kitty.conf", "alacritty/alacritty.toml"] {
            if let Ok(content) = fs::read_to_string(config_dir.join(rel)) {
                let header = content
                    .lines()
                    .take(10)
                    .collect::<Vec<_>>()
                    .join(" ")
                    .to_lowercase();
                if header.contains("light") {
                    return true;
                }
                if header.contains("dark") {
                    return false;
                }
            }
        }
    }

    // Default to dark
    false
}

/// Get the current theme based on terminal detection
pub fn grid_theme() -> GridTheme {
    GridTheme::default()
}

/// Check if current theme is light (for change detection)
pub fn is_light_theme() -> bool {
    detect_light_theme()
}
