use serde::{Deserialize, Serialize};

use crate::cli::ThemeMode;
use crate::color::Color;
use crate::theme::DEFAULT_PALETTE;

/// Largest brightness offset, in lightness percent, either way.
pub const MAX_BRIGHTNESS: i32 = 30;

/// Engine configuration. Persisted alongside the registry; every field
/// falls back to its default when missing so older documents still load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub enabled: bool,
    /// Forced background mode. `None` means auto.
    pub theme_mode: Option<ThemeMode>,
    /// Palette used when allocating new colors.
    pub palette: String,
    pub brightness: i32,
    /// Ask for dialogue to be wrapped in color tags.
    pub highlight_dialogue: bool,
    /// Characters that mark inner thoughts, e.g. `*` for `*thinking*`.
    pub thought_symbols: String,
    pub narrator_color: Option<Color>,
    pub disable_narration: bool,
    pub css_effects: bool,
    /// Lock flag given to speakers first seen in an annotation.
    pub auto_lock_detected: bool,
    pub auto_scan_new_messages: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: true,
            theme_mode: None,
            palette: DEFAULT_PALETTE.to_string(),
            brightness: 0,
            highlight_dialogue: true,
            thought_symbols: "*".to_string(),
            narrator_color: None,
            disable_narration: true,
            css_effects: false,
            auto_lock_detected: true,
            auto_scan_new_messages: true,
        }
    }
}

impl Settings {
    /// Background mode to allocate for. Auto resolves to `hint` when the
    /// host knows its background, else dark.
    pub fn effective_mode(&self, hint: Option<ThemeMode>) -> ThemeMode {
        self.theme_mode.or(hint).unwrap_or(ThemeMode::Dark)
    }

    pub fn brightness_offset(&self) -> f32 {
        self.brightness.clamp(-MAX_BRIGHTNESS, MAX_BRIGHTNESS) as f32
    }
}
