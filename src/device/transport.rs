//! Launch-monitor transport seam.
//!
//! The supervisor in [`crate::device::session`] is written against these
//! traits, not against any particular radio stack. A production transport
//! wraps the platform's GATT client and the vendor's notification protocol;
//! [`crate::device::replay`] provides a scripted stand-in for the binary and
//! the tests.

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::metrics::RawShotMetrics;

/// Errors from the device transport.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connect failed: {0}")]
    Connect(String),

    #[error("device setup rejected: {0}")]
    Setup(String),

    #[error("device command failed: {0}")]
    Command(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Options applied during post-connect device setup.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeviceOptions {
    /// Wake the device automatically when it sleeps.
    pub auto_wake: bool,
    /// Recalibrate the tilt sensor on every connect.
    pub calibrate_tilt_on_connect: bool,
    /// Verbose transport-level logging.
    pub debug_logging: bool,
}

/// Environmental shot parameters, sent to the device as a single
/// shot-configuration command.
#[derive(Debug, Clone, Copy)]
pub struct ShotParams {
    pub temperature: f32,
    pub humidity: f32,
    pub altitude: f32,
    pub air_density: f32,
    /// Sensor-to-tee distance (meters).
    pub tee_range_m: f32,
}

/// Identity block reported by a successful setup.
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub model: String,
    pub firmware: String,
    pub battery_percent: u8,
    pub state: String,
    pub tilt: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Warning,
    Error,
    Fatal,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
            Self::Fatal => write!(f, "fatal"),
        }
    }
}

/// Device-pushed events, delivered on the session's event stream.
///
/// `Disconnected` (or the stream ending) marks the end of a session; the
/// supervisor never reuses the session object after seeing it.
#[derive(Debug, Clone)]
pub enum DeviceEvent {
    /// Raw outbound message, for wire-level tracing.
    MessageSent(String),
    /// Raw inbound message, for wire-level tracing.
    MessageReceived(String),
    /// Battery level update (percent).
    Battery(u8),
    /// Device-reported error.
    Error {
        severity: ErrorSeverity,
        message: String,
    },
    /// The device is (or is no longer) armed and awaiting a shot.
    Readiness(bool),
    /// A complete shot measurement.
    Shot(RawShotMetrics),
    /// The link dropped unsolicited.
    Disconnected,
}

/// Paired-device lookup. Never scans or pairs; pairing is a prerequisite
/// handled in the OS settings.
#[async_trait]
pub trait DeviceTransport: Send + Sync + 'static {
    /// Exact-name match among already-paired devices.
    async fn find_paired(
        &self,
        name: &str,
    ) -> Result<Option<Box<dyn DeviceSession>>, TransportError>;
}

/// One connection lifecycle to a located device.
///
/// Sessions are single-use: after a disconnect the supervisor drops the
/// session and performs a fresh [`DeviceTransport::find_paired`] lookup.
#[async_trait]
pub trait DeviceSession: Send {
    fn id(&self) -> &str;
    fn name(&self) -> &str;

    async fn connect(&mut self) -> Result<(), TransportError>;
    async fn disconnect(&mut self);
    fn is_connected(&self) -> bool;

    /// Let the underlying link retry transparently on short radio dropouts.
    fn set_auto_reconnect(&mut self, enabled: bool);

    /// Apply device options. Failure is terminal for the session.
    async fn setup(&mut self, options: &DeviceOptions) -> Result<DeviceInfo, TransportError>;

    /// Send the environmental shot-configuration command.
    async fn shot_config(&mut self, params: &ShotParams) -> Result<(), TransportError>;

    /// Inform the device of the simulator-side club selection.
    async fn club_changed(&mut self, club: i32) -> Result<(), TransportError>;

    /// Take the event stream. Yields until the session disconnects.
    fn events(&mut self) -> mpsc::Receiver<DeviceEvent>;
}
