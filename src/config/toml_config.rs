use crate::core::overlay::{OverlayOptions, SwitchProfile};
use crate::core::pump::{interval_for_rate, DEFAULT_CALLBACK_RATE_HZ};
use crate::domain::model::AppId;
use crate::utils::error::{Result, ShimError};
use crate::utils::validation::{validate_non_empty_string, validate_path, validate_range, Validate};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_DIST_DIR: &str = "dist";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShimConfig {
    #[serde(default)]
    pub steam: SteamConfig,
    pub overlay: Option<OverlayConfig>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SteamConfig {
    pub app_id: Option<u32>,
    pub dist_dir: Option<String>,
    pub callback_rate_hz: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlayConfig {
    pub enabled: bool,
    pub switches: Option<SwitchProfile>,
    pub frame_invalidation: Option<bool>,
    pub fps_limit: Option<u32>,
    pub require_ready: Option<bool>,
    pub skip_hidden: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub json: Option<bool>,
}

impl ShimConfig {
    /// Loads a TOML config file. An unreadable file is a configuration error.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content =
            std::fs::read_to_string(&path).map_err(|e| ShimError::ConfigError {
                message: format!("cannot read {}: {}", path.as_ref().display(), e),
            })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ShimError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unset variables are left as is.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ShimError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        if let Some(dist_dir) = &self.steam.dist_dir {
            validate_path("steam.dist_dir", dist_dir)?;
        }

        if let Some(rate) = self.steam.callback_rate_hz {
            validate_range("steam.callback_rate_hz", rate, 1, 1000)?;
        }

        if let Some(options) = self.overlay_options() {
            options.validate()?;
        }

        if let Some(level) = self.log_level() {
            validate_non_empty_string("logging.level", level)?;
        }

        Ok(())
    }

    pub fn app_id(&self) -> Option<AppId> {
        self.steam.app_id.map(AppId)
    }

    pub fn dist_dir(&self) -> PathBuf {
        PathBuf::from(self.steam.dist_dir.as_deref().unwrap_or(DEFAULT_DIST_DIR))
    }

    pub fn pump_interval(&self) -> Duration {
        interval_for_rate(self.steam.callback_rate_hz.unwrap_or(DEFAULT_CALLBACK_RATE_HZ))
    }

    /// `None` when the overlay section is absent or disabled.
    pub fn overlay_options(&self) -> Option<OverlayOptions> {
        let overlay = self.overlay.as_ref().filter(|o| o.enabled)?;
        let mut options = match overlay.switches {
            Some(SwitchProfile::Minimal) => {
                OverlayOptions::legacy(!overlay.frame_invalidation.unwrap_or(true))
            }
            _ => OverlayOptions::default(),
        };

        if let Some(frame_invalidation) = overlay.frame_invalidation {
            options.frame_invalidation = frame_invalidation;
        }
        if let Some(fps_limit) = overlay.fps_limit {
            options.fps_limit = fps_limit;
        }
        if let Some(require_ready) = overlay.require_ready {
            options.require_ready = require_ready;
        }
        if let Some(skip_hidden) = overlay.skip_hidden {
            options.skip_hidden = skip_hidden;
        }
        Some(options)
    }

    pub fn log_level(&self) -> Option<&str> {
        self.logging.as_ref().and_then(|l| l.level.as_deref())
    }

    pub fn json_logs(&self) -> bool {
        self.logging.as_ref().and_then(|l| l.json).unwrap_or(false)
    }
}

impl Validate for ShimConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::ErrorCategory;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[steam]
app_id = 480
dist_dir = "./vendor/steam"
callback_rate_hz = 60

[overlay]
enabled = true
switches = "extended"
fps_limit = 45

[logging]
level = "debug"
json = true
"#;

        let config = ShimConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.app_id(), Some(AppId(480)));
        assert_eq!(config.dist_dir(), PathBuf::from("./vendor/steam"));
        assert_eq!(config.pump_interval().as_millis(), 16);
        assert!(config.json_logs());
        assert_eq!(config.log_level(), Some("debug"));

        let overlay = config.overlay_options().unwrap();
        assert_eq!(overlay.switches, SwitchProfile::Extended);
        assert_eq!(overlay.fps_limit, 45);
        assert!(overlay.require_ready);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults_when_sections_missing() {
        let config = ShimConfig::from_toml_str("").unwrap();
        assert_eq!(config.app_id(), None);
        assert_eq!(config.dist_dir(), PathBuf::from(DEFAULT_DIST_DIR));
        assert_eq!(config.pump_interval().as_millis(), 33);
        assert!(config.overlay_options().is_none());
    }

    #[test]
    fn test_minimal_overlay_preset() {
        let toml_content = r#"
[overlay]
enabled = true
switches = "minimal"
frame_invalidation = false
"#;
        let config = ShimConfig::from_toml_str(toml_content).unwrap();
        let overlay = config.overlay_options().unwrap();
        assert_eq!(overlay, OverlayOptions::legacy(true));
    }

    #[test]
    fn test_disabled_overlay_yields_no_options() {
        let config = ShimConfig::from_toml_str("[overlay]\nenabled = false\n").unwrap();
        assert!(config.overlay_options().is_none());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("SHIM_TEST_DIST_DIR", "/opt/steam/dist");

        let toml_content = r#"
[steam]
dist_dir = "${SHIM_TEST_DIST_DIR}"
"#;

        let config = ShimConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.dist_dir(), PathBuf::from("/opt/steam/dist"));

        std::env::remove_var("SHIM_TEST_DIST_DIR");
    }

    #[test]
    fn test_config_validation() {
        let config = ShimConfig::from_toml_str(
            r#"
[overlay]
enabled = true
fps_limit = 0
"#,
        )
        .unwrap();
        assert!(config.validate().is_err());

        let config = ShimConfig::from_toml_str("[steam]\ncallback_rate_hz = 5000\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let result = ShimConfig::from_toml_str("[steam\napp_id = 480");
        assert!(matches!(result, Err(ShimError::ConfigError { .. })));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[steam]\napp_id = 480\n")
            .unwrap();

        let config = ShimConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.app_id(), Some(AppId(480)));
    }

    #[test]
    fn test_missing_config_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ShimConfig::from_file(dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, ShimError::ConfigError { .. }));
        assert_eq!(err.category(), ErrorCategory::Configuration);
    }
}
