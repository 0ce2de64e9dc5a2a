use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::AppError;
use crate::session::SessionRules;

pub const MATCH_THRESHOLD: f64 = 0.7;
pub const SESSION_SECONDS: u32 = 180;
pub const CONFIRMATION_DISPLAY_MS: u64 = 3000;
pub const CONFIRMATION_TEARDOWN_MS: u64 = 500;

const ENV_PREFIX: &str = "POSEMATCH";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub match_threshold: f64,
    pub session_seconds: u32,
    pub tick_interval_ms: u64,
    pub confirmation_display_ms: u64,
    pub confirmation_teardown_ms: u64,
    /// Display-refresh cadence of the frame loop.
    pub frame_interval_ms: u64,
    pub frame_size: u32,
    pub flip: bool,
    pub min_part_confidence: f64,
    pub log_level: String,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            match_threshold: MATCH_THRESHOLD,
            session_seconds: SESSION_SECONDS,
            tick_interval_ms: 1000,
            confirmation_display_ms: CONFIRMATION_DISPLAY_MS,
            confirmation_teardown_ms: CONFIRMATION_TEARDOWN_MS,
            frame_interval_ms: 16,
            frame_size: 400,
            flip: true,
            min_part_confidence: 0.5,
            log_level: "info".to_string(),
        }
    }
}

impl Configuration {
    /// Layers defaults, an optional TOML file and `POSEMATCH_*` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let mut builder = ::config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(::config::File::from(path).required(true));
        }
        let configuration: Configuration = builder
            .add_source(::config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()?;

        configuration
            .validate()
            .map_err(AppError::InvalidConfiguration)?;
        Ok(configuration)
    }

    pub fn rules(&self) -> SessionRules {
        SessionRules {
            match_threshold: self.match_threshold,
            session_seconds: self.session_seconds,
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    pub fn confirmation_display(&self) -> Duration {
        Duration::from_millis(self.confirmation_display_ms)
    }

    pub fn confirmation_teardown(&self) -> Duration {
        Duration::from_millis(self.confirmation_teardown_ms)
    }

    pub fn tracing_level(&self) -> tracing::Level {
        self.log_level.parse().unwrap_or(tracing::Level::INFO)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..1.0).contains(&self.match_threshold) {
            return Err("Match threshold must be in [0.0, 1.0)".to_string());
        }

        if self.session_seconds == 0 {
            return Err("Session length must be greater than 0".to_string());
        }

        if self.tick_interval_ms == 0 {
            return Err("Tick interval must be greater than 0".to_string());
        }

        if self.frame_interval_ms == 0 {
            return Err("Frame interval must be greater than 0".to_string());
        }

        if self.frame_size == 0 {
            return Err("Frame size must be greater than 0".to_string());
        }

        if !(0.0..=1.0).contains(&self.min_part_confidence) {
            return Err("Minimum part confidence must be between 0.0 and 1.0".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_the_game_constants() {
        let configuration = Configuration::default();
        assert_eq!(configuration.rules(), SessionRules::default());
        assert_eq!(configuration.rules().match_threshold, 0.7);
        assert_eq!(configuration.rules().session_seconds, 180);
        assert_eq!(
            configuration.confirmation_display() + configuration.confirmation_teardown(),
            Duration::from_millis(3500)
        );
        assert!(configuration.validate().is_ok());
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("posematch.toml");
        std::fs::write(&path, "session_seconds = 60\nflip = false\nlog_level = \"debug\"\n")
            .unwrap();

        let configuration = Configuration::load(Some(path.as_path())).unwrap();
        assert_eq!(configuration.session_seconds, 60);
        assert!(!configuration.flip);
        assert_eq!(configuration.match_threshold, 0.7);
        assert_eq!(configuration.tracing_level(), tracing::Level::DEBUG);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("posematch.toml");
        std::fs::write(&path, "match_threshold = 1.5\n").unwrap();

        assert!(matches!(
            Configuration::load(Some(path.as_path())),
            Err(AppError::InvalidConfiguration(_))
        ));

        let configuration = Configuration {
            frame_interval_ms: 0,
            ..Configuration::default()
        };
        assert!(configuration.validate().is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = Configuration::load(Some(dir.path().join("absent.toml").as_path()));
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
