//! Configuration surface: `settings.json`.
//!
//! Keys are camelCase to match the file users already carry around; every
//! key has a default, so a missing file (or any missing key) still yields a
//! runnable configuration.

use std::io;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::device::session::DeviceSettings;
use crate::device::transport::{DeviceOptions, ShotParams};
use crate::translate::FEET_TO_METERS;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("could not parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Seconds between device connect attempts.
    pub reconnect_interval: u64,
    /// Exact paired-device name to look up.
    pub bluetooth_device_name: String,
    pub auto_wake: bool,
    pub calibrate_tilt_on_connect: bool,
    pub debug_logging: bool,
    #[serde(rename = "sendStatusChangesToGSP")]
    pub send_status_changes_to_gsp: bool,
    /// Shot environment parameters, forwarded to the device.
    pub temperature: f32,
    pub humidity: f32,
    pub altitude: f32,
    pub air_density: f32,
    pub tee_distance_in_feet: f32,
    #[serde(rename = "X-Api-Key")]
    pub api_key: String,
    #[serde(rename = "X-CsrfToken")]
    pub csrf_token: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            reconnect_interval: 5,
            bluetooth_device_name: "Approach R10".to_string(),
            auto_wake: false,
            calibrate_tilt_on_connect: false,
            debug_logging: false,
            send_status_changes_to_gsp: false,
            temperature: 60.0,
            humidity: 1.0,
            altitude: 0.0,
            air_density: 1.0,
            tee_distance_in_feet: 7.0,
            api_key: String::new(),
            csrf_token: String::new(),
        }
    }
}

impl Settings {
    /// The device supervisor's slice of the configuration.
    pub fn device_settings(&self) -> DeviceSettings {
        DeviceSettings {
            name: self.bluetooth_device_name.clone(),
            reconnect_interval: Duration::from_secs(self.reconnect_interval),
            options: DeviceOptions {
                auto_wake: self.auto_wake,
                calibrate_tilt_on_connect: self.calibrate_tilt_on_connect,
                debug_logging: self.debug_logging,
            },
            shot_params: ShotParams {
                temperature: self.temperature,
                humidity: self.humidity,
                altitude: self.altitude,
                air_density: self.air_density,
                tee_range_m: self.tee_distance_in_feet * FEET_TO_METERS,
            },
            send_status_changes: self.send_status_changes_to_gsp,
        }
    }
}

/// Load settings from `path`. A missing file means all defaults; a malformed
/// one is an error.
pub fn load(path: &Path) -> Result<Settings, ConfigError> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Settings::default()),
        Err(e) => {
            return Err(ConfigError::Io {
                path: path.display().to_string(),
                source: e,
            })
        }
    };
    serde_json::from_str(&text).map_err(|e| ConfigError::Parse {
        path: path.display().to_string(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_yields_defaults() {
        let settings = load(Path::new("/nonexistent/settings.json")).unwrap();
        assert_eq!(settings.reconnect_interval, 5);
        assert_eq!(settings.bluetooth_device_name, "Approach R10");
        assert_eq!(settings.tee_distance_in_feet, 7.0);
        assert!(!settings.send_status_changes_to_gsp);
        assert!(settings.api_key.is_empty());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            br#"{
                "bluetoothDeviceName": "Approach R10 - ABC123",
                "reconnectInterval": 10,
                "sendStatusChangesToGSP": true,
                "X-Api-Key": "key123"
            }"#,
        )
        .unwrap();
        let settings = load(file.path()).unwrap();
        assert_eq!(settings.bluetooth_device_name, "Approach R10 - ABC123");
        assert_eq!(settings.reconnect_interval, 10);
        assert!(settings.send_status_changes_to_gsp);
        assert_eq!(settings.api_key, "key123");
        // Untouched keys keep their defaults.
        assert_eq!(settings.temperature, 60.0);
        assert_eq!(settings.humidity, 1.0);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();
        assert!(matches!(load(file.path()), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn tee_distance_converts_to_meters() {
        let settings = Settings::default();
        let device = settings.device_settings();
        assert!((device.shot_params.tee_range_m - 7.0 / 3.281).abs() < 1e-4);
        assert_eq!(device.reconnect_interval, Duration::from_secs(5));
    }
}
