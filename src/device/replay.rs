//! Scripted launch-monitor transport.
//!
//! Replays shots from a JSON script file at a fixed cadence, behind the same
//! [`DeviceTransport`] seam a radio-backed transport implements. Useful for
//! driving a live simulator connection without a device on the tee.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio::time::sleep;
use tracing::debug;

use crate::device::transport::{
    DeviceEvent, DeviceInfo, DeviceOptions, DeviceSession, DeviceTransport, ShotParams,
    TransportError,
};
use crate::metrics::RawShotMetrics;

fn default_device_name() -> String {
    "Approach R10".to_string()
}

fn default_interval_secs() -> u64 {
    10
}

/// A replay script: the device name it impersonates, the cadence, and the
/// shots to play.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayScript {
    #[serde(default = "default_device_name")]
    pub device_name: String,
    /// Seconds between replayed shots.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    pub shots: Vec<RawShotMetrics>,
}

/// Transport that hands out [`ReplaySession`]s for a single scripted device.
pub struct ReplayTransport {
    script: ReplayScript,
}

impl ReplayTransport {
    pub fn new(script: ReplayScript) -> Self {
        Self { script }
    }

    pub fn from_file(path: &Path) -> Result<Self, TransportError> {
        let text = std::fs::read_to_string(path)?;
        let script: ReplayScript = serde_json::from_str(&text)
            .map_err(|e| TransportError::Setup(format!("bad replay script: {e}")))?;
        Ok(Self::new(script))
    }
}

#[async_trait]
impl DeviceTransport for ReplayTransport {
    async fn find_paired(
        &self,
        name: &str,
    ) -> Result<Option<Box<dyn DeviceSession>>, TransportError> {
        if name != self.script.device_name {
            return Ok(None);
        }
        Ok(Some(Box::new(ReplaySession {
            script: self.script.clone(),
            connected: false,
        })))
    }
}

pub struct ReplaySession {
    script: ReplayScript,
    connected: bool,
}

#[async_trait]
impl DeviceSession for ReplaySession {
    fn id(&self) -> &str {
        "replay"
    }

    fn name(&self) -> &str {
        &self.script.device_name
    }

    async fn connect(&mut self) -> Result<(), TransportError> {
        self.connected = true;
        Ok(())
    }

    async fn disconnect(&mut self) {
        self.connected = false;
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn set_auto_reconnect(&mut self, _enabled: bool) {}

    async fn setup(&mut self, _options: &DeviceOptions) -> Result<DeviceInfo, TransportError> {
        Ok(DeviceInfo {
            model: "Replay".into(),
            firmware: env!("CARGO_PKG_VERSION").into(),
            battery_percent: 100,
            state: "standby".into(),
            tilt: "0.0".into(),
        })
    }

    async fn shot_config(&mut self, params: &ShotParams) -> Result<(), TransportError> {
        debug!(target: "device", "replay shot config: {params:?}");
        Ok(())
    }

    async fn club_changed(&mut self, club: i32) -> Result<(), TransportError> {
        debug!(target: "device", "replay club change: {club}");
        Ok(())
    }

    fn events(&mut self) -> mpsc::Receiver<DeviceEvent> {
        let (tx, rx) = mpsc::channel(16);
        let shots = self.script.shots.clone();
        let interval = Duration::from_secs(self.script.interval_secs);
        tokio::spawn(async move {
            for shot in shots {
                sleep(interval).await;
                if tx.send(DeviceEvent::Readiness(true)).await.is_err() {
                    return;
                }
                if tx.send(DeviceEvent::Shot(shot)).await.is_err() {
                    return;
                }
            }
            // Script exhausted: hold the stream open so the session idles
            // instead of looking disconnected.
            std::future::pending::<()>().await;
        });
        rx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SCRIPT: &str = r#"{
        "deviceName": "Approach R10",
        "intervalSecs": 1,
        "shots": [
            {
                "shotId": 1,
                "ball": {
                    "ballSpeed": 65.0,
                    "launchAngle": 13.0,
                    "launchDirection": 0.0,
                    "totalSpin": 2600.0,
                    "spinAxis": -2.0
                },
                "club": null,
                "swing": null
            }
        ]
    }"#;

    #[tokio::test]
    async fn loads_script_and_matches_name() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SCRIPT.as_bytes()).unwrap();
        let transport = ReplayTransport::from_file(file.path()).unwrap();

        assert!(transport
            .find_paired("Some Other Device")
            .await
            .unwrap()
            .is_none());
        let session = transport.find_paired("Approach R10").await.unwrap();
        assert!(session.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn replays_shots_at_interval() {
        let script: ReplayScript = serde_json::from_str(SCRIPT).unwrap();
        let mut session = ReplaySession {
            script,
            connected: false,
        };
        session.connect().await.unwrap();
        let mut events = session.events();

        match events.recv().await.unwrap() {
            DeviceEvent::Readiness(true) => {}
            other => panic!("unexpected event: {other:?}"),
        }
        match events.recv().await.unwrap() {
            DeviceEvent::Shot(shot) => assert_eq!(shot.shot_id, 1),
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
