//! Settings for the dial shell: built-in defaults, then `dial.toml`, then
//! `DIAL__*` environment overrides.

use std::{collections::HashMap, fs, path::Path, time::Duration};

use crate::controller::rotation::{UpdateStrategy, DEFAULT_DEBOUNCE_WINDOW};

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub update_strategy: UpdateStrategy,
    pub debounce_window: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            update_strategy: UpdateStrategy::Session,
            debounce_window: DEFAULT_DEBOUNCE_WINDOW,
        }
    }
}

pub fn load_settings(config_path: Option<&Path>) -> Settings {
    let mut settings = Settings::default();

    let path = config_path.unwrap_or_else(|| Path::new("dial.toml"));
    if let Ok(raw) = fs::read_to_string(path) {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(&raw) {
            apply_overrides(&mut settings, &file_cfg);
        }
    }

    let mut env_cfg = HashMap::new();
    if let Ok(v) = std::env::var("DIAL__UPDATE_STRATEGY") {
        env_cfg.insert("update_strategy".to_string(), v);
    }
    if let Ok(v) = std::env::var("DIAL__DEBOUNCE_MS") {
        env_cfg.insert("debounce_ms".to_string(), v);
    }
    apply_overrides(&mut settings, &env_cfg);

    settings
}

fn apply_overrides(settings: &mut Settings, cfg: &HashMap<String, String>) {
    if let Some(v) = cfg.get("update_strategy") {
        if let Some(strategy) = UpdateStrategy::parse(v) {
            settings.update_strategy = strategy;
        }
    }
    if let Some(v) = cfg.get("debounce_ms") {
        if let Ok(ms) = v.parse::<u64>() {
            settings.debounce_window = Duration::from_millis(ms);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        env,
        time::{SystemTime, UNIX_EPOCH},
    };

    use super::*;

    #[test]
    fn defaults_use_the_session_strategy_and_200ms_window() {
        let settings = Settings::default();
        assert_eq!(settings.update_strategy, UpdateStrategy::Session);
        assert_eq!(settings.debounce_window, Duration::from_millis(200));
    }

    #[test]
    fn overrides_replace_strategy_and_window() {
        let mut settings = Settings::default();
        let mut cfg = HashMap::new();
        cfg.insert("update_strategy".to_string(), "debounced".to_string());
        cfg.insert("debounce_ms".to_string(), "350".to_string());

        apply_overrides(&mut settings, &cfg);

        assert_eq!(settings.update_strategy, UpdateStrategy::Debounced);
        assert_eq!(settings.debounce_window, Duration::from_millis(350));
    }

    #[test]
    fn malformed_overrides_are_ignored() {
        let mut settings = Settings::default();
        let mut cfg = HashMap::new();
        cfg.insert("update_strategy".to_string(), "telepathy".to_string());
        cfg.insert("debounce_ms".to_string(), "soon".to_string());

        apply_overrides(&mut settings, &cfg);

        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn settings_file_overrides_defaults() {
        let suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let path = env::temp_dir().join(format!("dial_gui_settings_test_{suffix}.toml"));
        fs::write(
            &path,
            "update_strategy = \"immediate\"\ndebounce_ms = \"120\"\n",
        )
        .expect("write settings file");

        let settings = load_settings(Some(path.as_path()));

        assert_eq!(settings.update_strategy, UpdateStrategy::Immediate);
        assert_eq!(settings.debounce_window, Duration::from_millis(120));

        fs::remove_file(path).expect("cleanup");
    }
}
