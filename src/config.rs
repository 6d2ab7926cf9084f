use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::reader::ReadingMode;

pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000";

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base address of the conversion service, without trailing slash.
    pub backend_url: String,
    /// Reading mode selected on startup.
    pub mode: ReadingMode,
    /// Read-aloud speed factor (1.0 = engine default).
    pub speech_rate: f64,
    /// Program used for read aloud. `None` picks the platform default
    /// (espeak-ng on Linux, say on macOS).
    pub speech_command: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.into(),
            mode: ReadingMode::default(),
            speech_rate: 1.0,
            speech_command: None,
        }
    }
}

impl Config {
    /// Directory: ~/.config/easy-reader/
    fn dir() -> PathBuf {
        let mut p = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        p.push("easy-reader");
        p
    }

    fn path() -> PathBuf {
        Self::dir().join("config.json")
    }

    /// Load from disk, returning defaults if file doesn't exist or is invalid.
    pub fn load() -> Self {
        let path = Self::path();
        match fs::read_to_string(&path) {
            Ok(data) => Self::from_json(&data),
            Err(_) => Self::default(),
        }
    }

    fn from_json(data: &str) -> Self {
        match serde_json::from_str::<Self>(data) {
            Ok(mut config) => {
                let trimmed = config.backend_url.trim_end_matches('/').to_string();
                config.backend_url = trimmed;
                config
            }
            Err(e) => {
                log::warn!("Ignoring invalid config: {e}");
                Self::default()
            }
        }
    }

    /// Persist to disk.
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let dir = Self::dir();
        fs::create_dir_all(&dir)?;
        let data = serde_json::to_string_pretty(self)?;
        fs::write(Self::path(), data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config = Config::from_json(r#"{ "mode": "adhd" }"#);
        assert_eq!(config.mode, ReadingMode::Adhd);
        assert_eq!(config.backend_url, DEFAULT_BACKEND_URL);
        assert_eq!(config.speech_rate, 1.0);
        assert!(config.speech_command.is_none());
    }

    #[test]
    fn trailing_slash_is_stripped_from_backend_url() {
        let config = Config::from_json(r#"{ "backend_url": "http://reader.local:9000/" }"#);
        assert_eq!(config.backend_url, "http://reader.local:9000");
    }

    #[test]
    fn garbage_yields_defaults() {
        let config = Config::from_json("not json");
        assert_eq!(config.mode, ReadingMode::Dyslexia);
    }
}
