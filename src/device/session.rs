//! Device session supervisor.
//!
//! One owning task per device session drives the whole lifecycle: paired
//! lookup, connect loop, setup, event pump, and full re-discovery after an
//! unsolicited disconnect. Session objects are never reused across
//! reconnects, so no stale subscription can deliver into a new session.
//!
//! A missing paired device is a configuration error, not a transient one:
//! the supervisor reports it and stops. Connect failures, by contrast, retry
//! indefinitely at the configured interval.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::sleep;
use tracing::{debug, error, info, trace, warn};

use crate::bridge::BridgeEvent;
use crate::device::transport::{
    DeviceEvent, DeviceOptions, DeviceSession, DeviceTransport, ShotParams,
};
use crate::state::ConnectionState;
use crate::translate;

/// Everything the supervisor consumes from the configuration surface.
#[derive(Debug, Clone)]
pub struct DeviceSettings {
    /// Exact paired-device name to look up.
    pub name: String,
    /// Delay between connect attempts.
    pub reconnect_interval: Duration,
    pub options: DeviceOptions,
    pub shot_params: ShotParams,
    /// Forward readiness transitions to the simulator link.
    pub send_status_changes: bool,
}

/// Commands other components send to the device session.
#[derive(Debug, Clone, Copy)]
pub enum DeviceCommand {
    /// The simulator player switched clubs.
    ClubChanged(i32),
}

/// Handle to a running device session supervisor.
///
/// There is deliberately no stop operation: the session lives for the
/// process lifetime, matching the device's role as the primary input source.
pub struct DeviceSupervisor {
    commands: mpsc::Sender<DeviceCommand>,
    state: watch::Receiver<ConnectionState>,
}

impl DeviceSupervisor {
    /// Spawn the owning task. Translated shots and readiness updates are
    /// delivered to `bridge`.
    pub fn spawn(
        transport: Arc<dyn DeviceTransport>,
        settings: DeviceSettings,
        bridge: mpsc::Sender<BridgeEvent>,
    ) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel(8);
        let (state_tx, state_rx) = watch::channel(ConnectionState::Disconnected);
        tokio::spawn(run(transport, settings, bridge, cmd_rx, state_tx));
        Self {
            commands: cmd_tx,
            state: state_rx,
        }
    }

    /// Sender for [`DeviceCommand`]s.
    pub fn commands(&self) -> mpsc::Sender<DeviceCommand> {
        self.commands.clone()
    }

    /// Current connection state.
    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Watch the connection state. The channel closes when the supervisor
    /// stops (fatal configuration error or abandoned setup).
    pub fn state_changes(&self) -> watch::Receiver<ConnectionState> {
        self.state.clone()
    }
}

// ---------------------------------------------------------------------------
// Owning task
// ---------------------------------------------------------------------------

async fn run(
    transport: Arc<dyn DeviceTransport>,
    settings: DeviceSettings,
    bridge: mpsc::Sender<BridgeEvent>,
    mut commands: mpsc::Receiver<DeviceCommand>,
    state: watch::Sender<ConnectionState>,
) {
    loop {
        let _ = state.send(ConnectionState::Disconnected);
        let mut session = match transport.find_paired(&settings.name).await {
            Ok(Some(session)) => session,
            Ok(None) => {
                error!(
                    target: "device",
                    "could not find '{}' in the list of paired devices", settings.name
                );
                error!(
                    target: "device",
                    "the device must be paired through the system bluetooth settings before running"
                );
                error!(
                    target: "device",
                    "if it is paired, check that 'bluetoothDeviceName' in settings.json matches the name exactly"
                );
                return;
            }
            Err(e) => {
                error!(target: "device", "paired-device lookup failed: {e}");
                return;
            }
        };

        // Connect loop: transient failures retry forever.
        let _ = state.send(ConnectionState::Connecting);
        loop {
            info!(target: "device", "connecting to {}: {}", session.name(), session.id());
            match session.connect().await {
                Ok(()) => break,
                Err(e) => {
                    info!(
                        target: "device",
                        "could not connect ({e}); waiting {}s before trying again",
                        settings.reconnect_interval.as_secs()
                    );
                    sleep(settings.reconnect_interval).await;
                }
            }
        }
        session.set_auto_reconnect(true);
        let _ = state.send(ConnectionState::Connected);
        info!(target: "device", "connected to launch monitor");

        // Setup is one-shot: a rejection abandons the session.
        let info = match session.setup(&settings.options).await {
            Ok(info) => info,
            Err(e) => {
                error!(target: "device", "failed device setup: {e}");
                return;
            }
        };
        if let Err(e) = session.shot_config(&settings.shot_params).await {
            error!(target: "device", "failed device setup: {e}");
            return;
        }
        info!(target: "device", "device setup complete:");
        info!(target: "device", "   model: {}", info.model);
        info!(target: "device", "   firmware: {}", info.firmware);
        info!(target: "device", "   battery: {}%", info.battery_percent);
        info!(target: "device", "   state: {}", info.state);
        info!(target: "device", "   tilt: {}", info.tilt);

        if pump(session.as_mut(), &settings, &bridge, &mut commands).await {
            return; // bridge is gone; no one left to deliver shots to
        }

        // Unsolicited disconnect: drop the session and start over from the
        // paired lookup, so nothing from the old session leaks forward.
        error!(target: "device", "lost connection to launch monitor");
        drop(session);
    }
}

/// Deliver device events until the session disconnects. Returns true if the
/// bridge side has gone away and the supervisor should stop.
async fn pump(
    session: &mut dyn DeviceSession,
    settings: &DeviceSettings,
    bridge: &mpsc::Sender<BridgeEvent>,
    commands: &mut mpsc::Receiver<DeviceCommand>,
) -> bool {
    let mut events = session.events();
    let mut commands_open = true;
    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(DeviceEvent::Shot(raw)) => {
                    let translated = translate::translate(&raw);
                    if bridge
                        .send(BridgeEvent::Shot { raw, translated })
                        .await
                        .is_err()
                    {
                        return true;
                    }
                }
                Some(DeviceEvent::Readiness(ready)) => {
                    debug!(target: "device", "readiness changed: {ready}");
                    if settings.send_status_changes
                        && bridge.send(BridgeEvent::Readiness(ready)).await.is_err()
                    {
                        return true;
                    }
                }
                Some(DeviceEvent::Battery(percent)) => {
                    info!(target: "device", "battery life updated: {percent}%");
                }
                Some(DeviceEvent::Error { severity, message }) => {
                    error!(target: "device", "{severity}: {message}");
                }
                Some(DeviceEvent::MessageSent(raw)) => trace!(target: "device", ">> {raw}"),
                Some(DeviceEvent::MessageReceived(raw)) => trace!(target: "device", "<< {raw}"),
                Some(DeviceEvent::Disconnected) | None => return false,
            },
            cmd = commands.recv(), if commands_open => match cmd {
                Some(DeviceCommand::ClubChanged(club)) => {
                    if let Err(e) = session.club_changed(club).await {
                        warn!(target: "device", "could not forward club change: {e}");
                    }
                }
                None => commands_open = false,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
