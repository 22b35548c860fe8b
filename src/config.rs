//! Startup configuration
//!
//! Compiled-in defaults with a few environment overrides read once at startup.

use crate::animation::StartMode;

pub const MODELS_DIR_VAR: &str = "SANCTUM_MODELS_DIR";
pub const START_MODE_VAR: &str = "SANCTUM_START_MODE";
pub const PANEL_VAR: &str = "SANCTUM_PANEL";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub models_dir: String,
    pub width: u32,
    pub height: u32,
    /// Live parameter panel; without it the scene uses compiled defaults
    pub panel: bool,
    pub start_mode: StartMode,
    pub vsync: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            models_dir: "assets/models".to_string(),
            width: 1200,
            height: 800,
            panel: true,
            start_mode: StartMode::Auto,
            vsync: true,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults overridden by whatever `lookup` provides. Unrecognised
    /// values are logged and ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(dir) = lookup(MODELS_DIR_VAR).filter(|d| !d.trim().is_empty()) {
            config.models_dir = dir;
        }

        if let Some(mode) = lookup(START_MODE_VAR) {
            match mode.trim().to_ascii_lowercase().as_str() {
                "auto" => config.start_mode = StartMode::Auto,
                "trigger" | "click" => config.start_mode = StartMode::OnTrigger,
                other => log::warn!("ignoring {}={}", START_MODE_VAR, other),
            }
        }

        if let Some(panel) = lookup(PANEL_VAR) {
            config.panel = !matches!(panel.trim(), "0" | "false" | "off");
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_without_overrides() {
        let config = AppConfig::from_lookup(lookup(&[]));
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.models_dir, "assets/models");
        assert_eq!((config.width, config.height), (1200, 800));
        assert!(config.panel);
        assert_eq!(config.start_mode, StartMode::Auto);
    }

    #[test]
    fn environment_overrides_apply() {
        let config = AppConfig::from_lookup(lookup(&[
            (MODELS_DIR_VAR, "/srv/garden"),
            (START_MODE_VAR, "Trigger"),
            (PANEL_VAR, "0"),
        ]));
        assert_eq!(config.models_dir, "/srv/garden");
        assert_eq!(config.start_mode, StartMode::OnTrigger);
        assert!(!config.panel);
    }

    #[test]
    fn unknown_start_mode_keeps_default() {
        let config = AppConfig::from_lookup(lookup(&[(START_MODE_VAR, "sometimes"), (MODELS_DIR_VAR, " ")]));
        assert_eq!(config.start_mode, StartMode::Auto);
        assert_eq!(config.models_dir, "assets/models");
    }
}
