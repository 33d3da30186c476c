//! Simulator side of the bridge: the Open Connect wire model, inbound frame
//! recovery, and the supervised TCP link.

pub mod link;
pub mod protocol;
pub mod reframe;

pub use link::SimulatorLink;
pub use protocol::{ShotMessage, SimulatorMessage};
