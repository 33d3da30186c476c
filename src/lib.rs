pub mod analytics;
pub mod bridge;
pub mod config;
pub mod device;
pub mod gsp;
pub mod metrics;
pub mod state;
pub mod translate;

pub use bridge::{Bridge, BridgeEvent};
pub use config::Settings;
pub use device::{DeviceSettings, DeviceSupervisor};
pub use gsp::SimulatorLink;
pub use metrics::RawShotMetrics;
pub use state::ConnectionState;
pub use translate::TranslatedShot;
