use std::path::{Path, PathBuf};

use eyre::Result;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::locale::Locale;
use crate::youtube::{DEFAULT_CLIENT_VERSION, SessionSettings};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub locale: Option<Locale>,
    pub default_format: Option<String>,
    pub hl: Option<String>,
    pub gl: Option<String>,
    pub client_version: Option<String>,
}

impl Config {
    /// Load config from ~/.config/ytscript/config.toml if it exists
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            debug!("Loading config from {}", path.display());
            let content = std::fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            debug!("No config file found at {}", path.display());
            Ok(Config::default())
        }
    }

    pub fn host(&self) -> &str {
        self.host.as_deref().unwrap_or(DEFAULT_HOST)
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    pub fn locale(&self) -> Locale {
        self.locale.unwrap_or_default()
    }

    pub fn session_settings(&self) -> SessionSettings {
        let defaults = SessionSettings::default();
        SessionSettings {
            base_url: defaults.base_url,
            hl: self.hl.clone().unwrap_or(defaults.hl),
            gl: self.gl.clone().unwrap_or(defaults.gl),
            client_version: self
                .client_version
                .clone()
                .unwrap_or_else(|| DEFAULT_CLIENT_VERSION.to_string()),
        }
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join("ytscript")
        .join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let toml_str = r#"
host = "0.0.0.0"
port = 8080
locale = "vi"
default_format = "timeline"
hl = "vi"
gl = "VN"
client_version = "2.20250101.00.00"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.host(), "0.0.0.0");
        assert_eq!(config.port(), 8080);
        assert_eq!(config.locale(), Locale::Vi);
        assert_eq!(config.default_format.as_deref(), Some("timeline"));

        let session = config.session_settings();
        assert_eq!(session.hl, "vi");
        assert_eq!(session.gl, "VN");
        assert_eq!(session.client_version, "2.20250101.00.00");
    }

    #[test]
    fn test_parse_empty_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.host(), DEFAULT_HOST);
        assert_eq!(config.port(), DEFAULT_PORT);
        assert_eq!(config.locale(), Locale::En);
        assert_eq!(config.session_settings().client_version, DEFAULT_CLIENT_VERSION);
    }

    #[test]
    fn test_parse_partial_config() {
        let config: Config = toml::from_str(r#"port = 4000"#).unwrap();
        assert_eq!(config.port(), 4000);
        assert!(config.locale.is_none());
        assert_eq!(config.session_settings().hl, "en");
    }

    #[test]
    fn test_load_missing_file() {
        let config = Config::load_from(Path::new("/nonexistent/ytscript/config.toml")).unwrap();
        assert!(config.host.is_none());
    }

    #[test]
    fn test_invalid_locale_rejected() {
        assert!(toml::from_str::<Config>(r#"locale = "fr""#).is_err());
    }
}
