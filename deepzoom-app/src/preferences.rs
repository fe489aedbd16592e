use std::fs;
use std::path::{Path, PathBuf};

use deepzoom_core::EngineConfig;
use tracing::{debug, error, info};

const FILE_NAME: &str = "preferences.json";

/// The JSON file holding an [`EngineConfig`].
///
/// Read once at startup and again on every reload; unknown or missing fields
/// fall back to their defaults, and out-of-range values are clamped by the
/// engine.
#[derive(Debug, Clone)]
pub struct PreferenceFile {
    path: PathBuf,
}

impl PreferenceFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// `preferences.json` next to the executable, or in the working directory
    /// when the executable path is unavailable.
    pub fn beside_executable() -> Self {
        let dir = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."));
        Self::new(dir.join(FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the configuration; a missing file is created with defaults.
    pub fn load_or_init(&self) -> EngineConfig {
        if !self.path.exists() {
            debug!("No preferences file at {}", self.path.display());
            let config = EngineConfig::default();
            self.save(&config);
            return config;
        }
        self.load().unwrap_or_default()
    }

    /// Read the file, logging and returning `None` on any failure.
    pub fn load(&self) -> Option<EngineConfig> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to read preferences file: {e}");
                return None;
            }
        };
        match serde_json::from_str::<EngineConfig>(&json) {
            Ok(config) => {
                debug!("Loaded preferences from {}", self.path.display());
                Some(config)
            }
            Err(e) => {
                error!("Failed to parse preferences: {e}");
                None
            }
        }
    }

    pub fn save(&self, config: &EngineConfig) {
        if let Some(parent) = self.path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                error!("Failed to create config directory: {e}");
                return;
            }
        }
        match serde_json::to_string_pretty(config) {
            Ok(json) => {
                if let Err(e) = fs::write(&self.path, json) {
                    error!("Failed to write preferences: {e}");
                } else {
                    info!("Wrote default preferences to {}", self.path.display());
                }
            }
            Err(e) => error!("Failed to serialize preferences: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PreferenceFile {
        let dir = std::env::temp_dir().join(format!("deepzoom-prefs-{}-{name}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        PreferenceFile::new(dir.join(FILE_NAME))
    }

    #[test]
    fn missing_file_is_created_with_defaults() {
        let file = scratch("missing");
        assert!(!file.path().exists());
        let config = file.load_or_init();
        assert_eq!(config, EngineConfig::default());
        assert!(file.path().exists());
        assert_eq!(file.load(), Some(EngineConfig::default()));
    }

    #[test]
    fn partial_file_keeps_defaults_for_the_rest() {
        let file = scratch("partial");
        fs::create_dir_all(file.path().parent().unwrap()).unwrap();
        fs::write(file.path(), r#"{ "zoom_speed": 0.985, "julia_enabled": false }"#).unwrap();
        let config = file.load_or_init();
        assert_eq!(config.zoom_speed, 0.985);
        assert!(!config.julia_enabled);
        assert_eq!(config.palette_index, EngineConfig::default().palette_index);
    }

    #[test]
    fn unreadable_json_falls_back_to_defaults() {
        let file = scratch("broken");
        fs::create_dir_all(file.path().parent().unwrap()).unwrap();
        fs::write(file.path(), "not json").unwrap();
        assert_eq!(file.load(), None);
        assert_eq!(file.load_or_init(), EngineConfig::default());
    }
}
