//! Shot broadcaster.
//!
//! Fan-out with no retry of its own: each translated shot is logged, sent to
//! the simulator link (best-effort), and mirrored to the analytics sink on a
//! detached task. Inbound simulator state (club selection) is recorded here
//! and forwarded to the device session.

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::analytics::{AnalyticsSink, ShotReport};
use crate::device::session::DeviceCommand;
use crate::gsp::link::SimulatorLink;
use crate::gsp::protocol::{ShotMessage, SimulatorMessage};
use crate::metrics::RawShotMetrics;
use crate::translate::{self, TranslatedShot};

/// Events the device supervisor delivers to the broadcaster.
#[derive(Debug, Clone)]
pub enum BridgeEvent {
    Shot {
        raw: RawShotMetrics,
        translated: TranslatedShot,
    },
    Readiness(bool),
}

pub struct Bridge {
    device_events: mpsc::Receiver<BridgeEvent>,
    inbound: mpsc::Receiver<SimulatorMessage>,
    link: SimulatorLink,
    sink: AnalyticsSink,
    device_commands: mpsc::Sender<DeviceCommand>,
    /// Most recent simulator club selection.
    club: Option<i32>,
}

impl Bridge {
    pub fn new(
        device_events: mpsc::Receiver<BridgeEvent>,
        inbound: mpsc::Receiver<SimulatorMessage>,
        link: SimulatorLink,
        sink: AnalyticsSink,
        device_commands: mpsc::Sender<DeviceCommand>,
    ) -> Self {
        Self {
            device_events,
            inbound,
            link,
            sink,
            device_commands,
            club: None,
        }
    }

    /// Run until both input channels close.
    pub async fn run(mut self) {
        let mut device_open = true;
        let mut inbound_open = true;
        while device_open || inbound_open {
            tokio::select! {
                event = self.device_events.recv(), if device_open => match event {
                    Some(BridgeEvent::Shot { raw, translated }) => {
                        self.broadcast_shot(raw, translated).await;
                    }
                    Some(BridgeEvent::Readiness(ready)) => {
                        info!(
                            target: "bridge",
                            "launch monitor {}", if ready { "ready" } else { "not ready" }
                        );
                        self.link.send(ShotMessage::ready(ready)).await;
                    }
                    None => device_open = false,
                },
                message = self.inbound.recv(), if inbound_open => match message {
                    Some(message) => self.handle_inbound(message).await,
                    None => inbound_open = false,
                },
            }
        }
    }

    async fn broadcast_shot(&mut self, raw: RawShotMetrics, translated: TranslatedShot) {
        info!(target: "bridge", "\n{}", translate::summary(&raw));

        // Wire delivery is best-effort; a shot racing a down link is dropped
        // and the link's reconnect cycle owns recovery.
        self.link.send(ShotMessage::shot(&translated)).await;

        let club = self
            .club
            .map_or_else(|| "unknown".to_string(), |c| c.to_string());
        let report = ShotReport::from_metrics(&raw, &club);
        let sink = self.sink.clone();
        let shot_id = raw.shot_id;
        tokio::spawn(async move {
            sink.post_shot(shot_id, &report).await;
        });
    }

    async fn handle_inbound(&mut self, message: SimulatorMessage) {
        if let Some(club) = message.club() {
            info!(target: "bridge", "player club changed: {club}");
            self.club = Some(club);
            if self
                .device_commands
                .send(DeviceCommand::ClubChanged(club))
                .await
                .is_err()
            {
                warn!(target: "bridge", "device session is gone; club change not forwarded");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
