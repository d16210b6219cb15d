// src/config.rs
//! Configuration management with a per-user JSON file

use crate::{
    error::{RelayError, Result},
    gps::{FixProfile, SentenceKind, TelemetrySample},
    telemetry::{TelemetrySchedule, DEFAULT_ITERATIONS},
};
use serde::{Deserialize, Serialize};
use std::{
    path::{Path, PathBuf},
    time::Duration,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub serial_port: String,
    pub serial_baudrate: u32,
    /// Pause before each transmit iteration
    pub interval_ms: u64,
    /// Pause between the last write and the stop signal
    pub drain_ms: u64,
    pub iterations: usize,
    pub sentences: Vec<SentenceKind>,
    pub profile: FixProfile,
    /// Replaces the built-in track when set
    pub samples: Option<Vec<TelemetrySample>>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self::platform_default()
    }
}

impl RelayConfig {
    /// Get platform-specific default configuration
    pub fn platform_default() -> Self {
        #[cfg(windows)]
        let serial_port = "COM3".to_string();

        #[cfg(not(windows))]
        let serial_port = "/dev/ttyUSB0".to_string();

        Self {
            serial_port,
            serial_baudrate: 9600,
            interval_ms: 1000,
            drain_ms: 2000,
            iterations: DEFAULT_ITERATIONS,
            sentences: vec![SentenceKind::Rmc],
            profile: FixProfile::default(),
            samples: None,
        }
    }

    /// Load configuration from `config_path`, or defaults if absent
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            tracing::debug!("No config at {}, using defaults", config_path.display());
            return Ok(Self::platform_default());
        }

        let contents = std::fs::read_to_string(config_path)
            .map_err(|e| RelayError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| RelayError::Config(format!("Failed to parse config file: {}", e)))?;

        tracing::debug!("Loaded config from {}", config_path.display());
        Ok(config)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                RelayError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let contents = serde_json::to_string_pretty(self)?;

        std::fs::write(config_path, contents)
            .map_err(|e| RelayError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// `~/.config/nmea-relay/config.json`
    pub fn get_config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .map_err(|_| RelayError::Config("HOME environment variable not set".to_string()))?;

        Ok(PathBuf::from(home)
            .join(".config")
            .join("nmea-relay")
            .join("config.json"))
    }

    /// Update serial port settings
    pub fn update_serial(&mut self, port: String, baudrate: u32) {
        self.serial_port = port;
        self.serial_baudrate = baudrate;
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn drain(&self) -> Duration {
        Duration::from_millis(self.drain_ms)
    }

    /// Build the transmit schedule from the configured or built-in samples
    pub fn schedule(&self) -> Result<TelemetrySchedule> {
        match &self.samples {
            Some(samples) => TelemetrySchedule::new(samples.clone(), self.iterations),
            None => Ok(TelemetrySchedule::default_track().with_iterations(self.iterations)),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.sentences.is_empty() {
            return Err(RelayError::Config(
                "At least one sentence kind must be configured".to_string(),
            ));
        }
        if self.serial_baudrate == 0 {
            return Err(RelayError::Config("Baud rate must be non-zero".to_string()));
        }
        self.schedule().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RelayConfig::default();

        #[cfg(windows)]
        assert_eq!(config.serial_port, "COM3");

        #[cfg(not(windows))]
        assert_eq!(config.serial_port, "/dev/ttyUSB0");

        assert_eq!(config.serial_baudrate, 9600);
        assert_eq!(config.sentences, vec![SentenceKind::Rmc]);
        assert_eq!(config.interval(), Duration::from_secs(1));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_update_serial() {
        let mut config = RelayConfig::default();
        config.update_serial("/dev/ttyACM0".to_string(), 115200);
        assert_eq!(config.serial_port, "/dev/ttyACM0");
        assert_eq!(config.serial_baudrate, 115200);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = RelayConfig::default();
        config.update_serial("COM7".to_string(), 4800);
        config.sentences = vec![SentenceKind::Gga, SentenceKind::Vtg];
        config.iterations = 3;
        config.save_to(&path).unwrap();

        let loaded = RelayConfig::load_from(&path).unwrap();
        assert_eq!(loaded.serial_port, "COM7");
        assert_eq!(loaded.serial_baudrate, 4800);
        assert_eq!(loaded.sentences, vec![SentenceKind::Gga, SentenceKind::Vtg]);
        assert_eq!(loaded.schedule().unwrap().iterations(), 3);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = RelayConfig::load_from(&dir.path().join("absent.json")).unwrap();
        assert_eq!(loaded.serial_baudrate, 9600);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "serial_port": "COM9", "sentences": ["GLL"] }"#).unwrap();

        let loaded = RelayConfig::load_from(&path).unwrap();
        assert_eq!(loaded.serial_port, "COM9");
        assert_eq!(loaded.sentences, vec![SentenceKind::Gll]);
        assert_eq!(loaded.drain_ms, 2000);
    }

    #[test]
    fn test_lowercase_sentence_kinds_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "sentences": ["gga", "vtg", "GPGSV"] }"#).unwrap();

        let loaded = RelayConfig::load_from(&path).unwrap();
        assert_eq!(
            loaded.sentences,
            vec![SentenceKind::Gga, SentenceKind::Vtg, SentenceKind::Gsv]
        );
    }

    #[test]
    fn test_unknown_sentence_kind_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "sentences": ["zda"] }"#).unwrap();

        assert!(matches!(RelayConfig::load_from(&path), Err(RelayError::Config(_))));
    }

    #[test]
    fn test_invalid_configs() {
        let mut config = RelayConfig::default();
        config.samples = Some(Vec::new());
        assert!(matches!(config.validate(), Err(RelayError::Config(_))));

        let mut config = RelayConfig::default();
        config.sentences.clear();
        assert!(config.validate().is_err());
    }
}
