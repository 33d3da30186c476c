//! Device side of the bridge: the transport seam, the session supervisor,
//! and the scripted replay transport.

pub mod replay;
pub mod session;
pub mod transport;

pub use session::{DeviceCommand, DeviceSettings, DeviceSupervisor};
pub use transport::{DeviceEvent, DeviceSession, DeviceTransport};
