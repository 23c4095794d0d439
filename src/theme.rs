use std::fmt;
use std::str::FromStr;

use tracing::warn;

use crate::error::StorageError;
use crate::storage::{KeyValueStore, THEME_KEY};

/// Colour theme preference shared by the views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("unknown theme '{}'. Use light or dark.", other)),
        }
    }
}

/// Loads the saved theme, falling back to light.
pub fn load_theme<S: KeyValueStore + ?Sized>(storage: &S) -> Theme {
    match storage.get(THEME_KEY) {
        Ok(Some(raw)) => raw.parse().unwrap_or_else(|e: String| {
            warn!(error = %e, "Ignoring stored theme");
            Theme::Light
        }),
        Ok(None) => Theme::Light,
        Err(e) => {
            warn!(error = %e, "Failed to read stored theme");
            Theme::Light
        }
    }
}

/// Saves the theme as the bare string `light` or `dark`.
pub fn save_theme<S: KeyValueStore + ?Sized>(storage: &mut S, theme: Theme) -> Result<(), StorageError> {
    storage.set(THEME_KEY, theme.as_str())
}
