//! Light/dark theme selection and the palette derived from it.

use std::sync::Arc;

use ratatui::style::palette::tailwind;
use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::{error, warn};

use crate::storage::KeyValueStore;

/// Storage key for the persisted theme.
pub const THEME_KEY: &str = "theme_mode";

/// Visual palette selection, independent of the active facet.
#[derive(
    Default, Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ThemeMode {
    Light,
    #[default]
    Dark,
}

impl ThemeMode {
    pub fn opposite(self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }
}

/// Semantic color roles resolved for one [`ThemeMode`].
///
/// A pure function of the theme with exactly two possible outputs — there
/// are no partial or custom palettes. The `*_light` fields are the washed
/// tints used behind badges and callouts.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ThemeColors {
    pub background: Color,
    pub surface: Color,
    pub text: Color,
    pub text_muted: Color,
    pub border: Color,
    pub primary: Color,
    pub primary_light: Color,
    pub success: Color,
    pub success_light: Color,
    pub warning: Color,
    pub warning_light: Color,
    pub danger: Color,
    pub danger_light: Color,
    pub info: Color,
    pub info_light: Color,
}

pub const LIGHT: ThemeColors = ThemeColors {
    background: tailwind::SLATE.c50,
    surface: Color::from_u32(0x00ffffff),
    text: tailwind::SLATE.c900,
    text_muted: tailwind::SLATE.c500,
    border: tailwind::SLATE.c200,
    primary: tailwind::BLUE.c600,
    primary_light: tailwind::BLUE.c100,
    success: tailwind::GREEN.c600,
    success_light: tailwind::GREEN.c100,
    warning: tailwind::AMBER.c600,
    warning_light: tailwind::AMBER.c100,
    danger: tailwind::RED.c600,
    danger_light: tailwind::RED.c100,
    info: tailwind::SKY.c600,
    info_light: tailwind::SKY.c100,
};

pub const DARK: ThemeColors = ThemeColors {
    background: tailwind::SLATE.c950,
    surface: tailwind::SLATE.c900,
    text: tailwind::SLATE.c200,
    text_muted: tailwind::SLATE.c400,
    border: tailwind::SLATE.c700,
    primary: tailwind::BLUE.c500,
    primary_light: tailwind::BLUE.c900,
    success: tailwind::GREEN.c500,
    success_light: tailwind::GREEN.c900,
    warning: tailwind::AMBER.c500,
    warning_light: tailwind::AMBER.c900,
    danger: tailwind::RED.c500,
    danger_light: tailwind::RED.c900,
    info: tailwind::SKY.c500,
    info_light: tailwind::SKY.c900,
};

impl ThemeColors {
    pub const fn of(mode: ThemeMode) -> Self {
        match mode {
            ThemeMode::Light => LIGHT,
            ThemeMode::Dark => DARK,
        }
    }
}

/// Holds the current [`ThemeMode`] and keeps it in sync with durable
/// storage. Same lifecycle and failure contract as the mode store; the two
/// are independent axes.
pub struct ThemeStore {
    storage: Arc<dyn KeyValueStore>,
    theme: ThemeMode,
    is_loading: bool,
}

impl ThemeStore {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            storage,
            theme: ThemeMode::default(),
            is_loading: true,
        }
    }

    pub async fn load(&mut self) {
        match self.storage.get(THEME_KEY).await {
            Ok(Some(raw)) => match raw.parse::<ThemeMode>() {
                Ok(theme) => self.theme = theme,
                Err(_) => warn!(value = %raw, "ignoring unrecognized persisted theme"),
            },
            Ok(None) => {}
            Err(e) => warn!(error = %e, "failed to read persisted theme"),
        }
        self.is_loading = false;
    }

    /// Persists `new_theme`, then updates the in-memory value. A failed
    /// write is logged and leaves the current theme in place.
    pub async fn set_theme(&mut self, new_theme: ThemeMode) {
        if let Err(e) = self.storage.set(THEME_KEY, &new_theme.to_string()).await {
            error!(error = %e, theme = %new_theme, "failed to persist theme");
            return;
        }
        self.theme = new_theme;
    }

    /// Flips between light and dark. No animation — the palette swap is
    /// instant. Returns the theme in effect afterwards.
    pub async fn toggle(&mut self) -> ThemeMode {
        let next = self.theme.opposite();
        self.set_theme(next).await;
        self.theme
    }

    pub fn theme(&self) -> ThemeMode {
        self.theme
    }

    pub fn colors(&self) -> ThemeColors {
        ThemeColors::of(self.theme)
    }

    pub fn is_dark(&self) -> bool {
        self.theme == ThemeMode::Dark
    }

    pub fn is_light(&self) -> bool {
        self.theme == ThemeMode::Light
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }
}
