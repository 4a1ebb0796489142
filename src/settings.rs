use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use libadwaita as adw;
use serde::{Deserialize, Serialize};

use crate::scan::DEFAULT_HIDDEN_SECTIONS;

const APP_SETTINGS_FILE: &str = "settings.json";
const APP_DIR_NAME: &str = "appvault";
const CONFIG_DIR_ENV: &str = "APPVAULT_CONFIG_DIR";
pub const DEFAULT_TERMINAL: &str = "x-terminal-emulator -e";

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThemePreference {
    System,
    Light,
    Dark,
}

impl Default for ThemePreference {
    fn default() -> Self {
        ThemePreference::System
    }
}

impl ThemePreference {
    pub fn key(self) -> &'static str {
        match self {
            ThemePreference::System => "system",
            ThemePreference::Light => "light",
            ThemePreference::Dark => "dark",
        }
    }

    pub fn from_key(value: &str) -> Self {
        match value {
            "light" => ThemePreference::Light,
            "dark" => ThemePreference::Dark,
            _ => ThemePreference::System,
        }
    }

    pub fn apply(self, style_manager: &adw::StyleManager) {
        match self {
            ThemePreference::System => style_manager.set_color_scheme(adw::ColorScheme::Default),
            ThemePreference::Light => style_manager.set_color_scheme(adw::ColorScheme::ForceLight),
            ThemePreference::Dark => style_manager.set_color_scheme(adw::ColorScheme::ForceDark),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default)]
    pub window_width: Option<i32>,
    #[serde(default)]
    pub window_height: Option<i32>,
    #[serde(default)]
    pub last_tab: Option<String>,
    #[serde(default = "default_true")]
    pub confirm_remove: bool,
    #[serde(default)]
    pub theme_preference: ThemePreference,
    /// Command prefix for entries that need a terminal.
    #[serde(default = "default_terminal")]
    pub terminal: String,
    #[serde(default = "default_hidden_sections")]
    pub hidden_sections: Vec<String>,
    #[serde(default)]
    pub extra_desktop_dirs: Vec<String>,
    #[serde(default = "default_true")]
    pub include_standalone_entries: bool,
}

fn default_true() -> bool {
    true
}

fn default_terminal() -> String {
    DEFAULT_TERMINAL.to_string()
}

fn default_hidden_sections() -> Vec<String> {
    DEFAULT_HIDDEN_SECTIONS
        .iter()
        .map(|section| section.to_string())
        .collect()
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            window_width: None,
            window_height: None,
            last_tab: None,
            confirm_remove: default_true(),
            theme_preference: ThemePreference::System,
            terminal: default_terminal(),
            hidden_sections: default_hidden_sections(),
            extra_desktop_dirs: Vec::new(),
            include_standalone_entries: default_true(),
        }
    }
}

impl AppSettings {
    pub fn terminal_command(&self) -> &str {
        let trimmed = self.terminal.trim();
        if trimmed.is_empty() {
            DEFAULT_TERMINAL
        } else {
            trimmed
        }
    }
}

pub fn load_app_settings() -> AppSettings {
    let Some(path) = app_settings_path() else {
        return AppSettings::default();
    };

    let Ok(content) = fs::read_to_string(&path) else {
        return AppSettings::default();
    };

    parse_app_settings(&content)
}

fn parse_app_settings(content: &str) -> AppSettings {
    serde_json::from_str(content).unwrap_or_else(|err| {
        log::warn!("Ignoring unreadable settings file: {}", err);
        AppSettings::default()
    })
}

pub fn save_app_settings(settings: &AppSettings) -> Result<()> {
    let path = app_settings_path().ok_or_else(|| anyhow!("Unable to determine settings directory"))?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Failed to create settings directory")?;
    }

    let data = serde_json::to_string_pretty(settings).context("Failed to serialize settings")?;

    fs::write(&path, data).with_context(|| format!("Failed to write {}", path.display()))
}

fn non_empty_var(name: &str) -> Option<PathBuf> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

fn app_config_dir() -> Option<PathBuf> {
    if let Some(custom) = non_empty_var(CONFIG_DIR_ENV) {
        return Some(custom);
    }

    if let Some(config_home) = non_empty_var("XDG_CONFIG_HOME") {
        return Some(config_home.join(APP_DIR_NAME));
    }

    non_empty_var("HOME").map(|home| home.join(".config").join(APP_DIR_NAME))
}

fn app_settings_path() -> Option<PathBuf> {
    app_config_dir().map(|dir| dir.join(APP_SETTINGS_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_every_field() {
        let settings = AppSettings::default();
        assert!(settings.confirm_remove);
        assert!(settings.include_standalone_entries);
        assert_eq!(settings.terminal_command(), DEFAULT_TERMINAL);
        assert!(settings.hidden_sections.iter().any(|s| s == "libs"));
        assert_eq!(settings.theme_preference, ThemePreference::System);
    }

    #[test]
    fn partial_file_keeps_defaults_for_missing_fields() {
        let settings = parse_app_settings(r#"{ "confirm_remove": false, "last_tab": "snap" }"#);
        assert!(!settings.confirm_remove);
        assert_eq!(settings.last_tab.as_deref(), Some("snap"));
        assert_eq!(settings.terminal, DEFAULT_TERMINAL);
        assert_eq!(settings.hidden_sections.len(), DEFAULT_HIDDEN_SECTIONS.len());
    }

    #[test]
    fn corrupt_file_falls_back_to_defaults() {
        let settings = parse_app_settings("{ not json");
        assert!(settings.confirm_remove);
        assert!(settings.last_tab.is_none());
    }

    #[test]
    fn blank_terminal_uses_default() {
        let settings = AppSettings {
            terminal: "   ".into(),
            ..AppSettings::default()
        };
        assert_eq!(settings.terminal_command(), DEFAULT_TERMINAL);
    }

    #[test]
    fn theme_keys_round_trip() {
        for theme in [ThemePreference::System, ThemePreference::Light, ThemePreference::Dark] {
            assert_eq!(ThemePreference::from_key(theme.key()), theme);
        }
    }
}
