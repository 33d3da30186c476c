//! Open Connect wire model.
//!
//! - [`ShotMessage`] — messages we send to the simulator (shot payloads and
//!   readiness updates)
//! - [`SimulatorMessage`] — messages the simulator sends to us
//!
//! Field names follow the simulator's PascalCase JSON schema, so every struct
//! here carries serde renames rather than Rust-side naming compromises.

use serde::{Deserialize, Serialize};

use crate::translate::TranslatedShot;

/// Device identifier reported in every outbound envelope.
pub const DEVICE_ID: &str = "fairlink";
/// Unit system for distance-valued fields.
pub const UNITS: &str = "Yards";
/// Open Connect API version we speak.
pub const API_VERSION: &str = "1";

// ---------------------------------------------------------------------------
// Outbound
// ---------------------------------------------------------------------------

/// One outbound simulator envelope: a shot payload or a readiness update.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ShotMessage {
    #[serde(rename = "DeviceID")]
    pub device_id: &'static str,
    pub units: &'static str,
    pub shot_number: u32,
    #[serde(rename = "APIversion")]
    pub api_version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ball_data: Option<BallData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub club_data: Option<ClubData>,
    pub shot_data_options: ShotDataOptions,
}

impl ShotMessage {
    /// Build a shot envelope. Ball/club sections are carried through as-is;
    /// the `ShotDataOptions` flags mirror their presence.
    pub fn shot(shot: &TranslatedShot) -> Self {
        Self {
            device_id: DEVICE_ID,
            units: UNITS,
            shot_number: shot.shot_id,
            api_version: API_VERSION,
            ball_data: shot.ball.clone(),
            club_data: shot.club.clone(),
            shot_data_options: ShotDataOptions {
                contains_ball_data: shot.ball.is_some(),
                contains_club_data: shot.club.is_some(),
                launch_monitor_is_ready: None,
            },
        }
    }

    /// Build a readiness/status envelope (no metric sections).
    pub fn ready(ready: bool) -> Self {
        Self {
            device_id: DEVICE_ID,
            units: UNITS,
            shot_number: 0,
            api_version: API_VERSION,
            ball_data: None,
            club_data: None,
            shot_data_options: ShotDataOptions {
                contains_ball_data: false,
                contains_club_data: false,
                launch_monitor_is_ready: Some(ready),
            },
        }
    }
}

/// Ball section of a shot envelope. Speeds in mph, spin in RPM, angles in
/// degrees with the simulator's sign conventions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BallData {
    pub speed: f64,
    pub spin_axis: f64,
    pub total_spin: f64,
    pub back_spin: f64,
    pub side_spin: f64,
    #[serde(rename = "HLA")]
    pub hla: f64,
    #[serde(rename = "VLA")]
    pub vla: f64,
}

/// Club section of a shot envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ClubData {
    pub speed: f64,
    pub angle_of_attack: f64,
    pub face_to_target: f64,
    pub path: f64,
    pub speed_at_impact: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ShotDataOptions {
    pub contains_ball_data: bool,
    pub contains_club_data: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub launch_monitor_is_ready: Option<bool>,
}

// ---------------------------------------------------------------------------
// Inbound
// ---------------------------------------------------------------------------

/// A decoded inbound simulator message.
///
/// Only `Player.Club` is consumed today; everything else is tolerated and
/// ignored so newer simulator builds don't break the link.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SimulatorMessage {
    pub code: Option<i32>,
    pub message: Option<String>,
    pub player: Option<PlayerInfo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PlayerInfo {
    pub handed: Option<String>,
    pub club: Option<i32>,
}

impl SimulatorMessage {
    /// The player's club selection, if this message carries one.
    pub fn club(&self) -> Option<i32> {
        self.player.as_ref().and_then(|p| p.club)
    }
}
