//! Raw shot metrics as reported by the launch monitor.
//!
//! One [`RawShotMetrics`] snapshot is produced per shot event and never
//! mutated. Sections the device did not measure are `None`, not zero-filled;
//! [`crate::translate`] preserves that absence on the simulator wire.

use serde::{Deserialize, Serialize};

/// Immutable snapshot of one shot event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawShotMetrics {
    /// Device-assigned shot sequence id
    pub shot_id: u32,
    #[serde(default)]
    pub shot_type: ShotType,
    pub ball: Option<BallMetrics>,
    pub club: Option<ClubMetrics>,
    pub swing: Option<SwingMetrics>,
}

/// Ball flight measurements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BallMetrics {
    /// Ball speed (m/s)
    pub ball_speed: f64,
    /// Vertical launch angle (deg)
    pub launch_angle: f64,
    /// Horizontal launch direction (deg, neg = left)
    pub launch_direction: f64,
    /// Total spin (RPM)
    pub total_spin: f64,
    /// Spin axis tilt (deg, device sign convention)
    pub spin_axis: f64,
    #[serde(default)]
    pub spin_calculation: SpinCalculation,
    #[serde(default)]
    pub ball_type: BallType,
}

/// Club head measurements. Absent on ball-only shots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClubMetrics {
    /// Club head speed (m/s)
    pub head_speed: f64,
    /// Attack angle (deg)
    pub attack_angle: f64,
    /// Face angle relative to target line (deg)
    pub face_angle: f64,
    /// Club path angle (deg)
    pub path_angle: f64,
}

/// Swing timing, in device-clock milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwingMetrics {
    pub backswing_start_ms: u32,
    pub downswing_start_ms: u32,
    pub impact_ms: u32,
}

impl SwingMetrics {
    /// Backswing duration (ms). Saturates if the device clock stepped.
    pub fn backswing_ms(&self) -> u32 {
        self.downswing_start_ms.saturating_sub(self.backswing_start_ms)
    }

    /// Downswing duration (ms).
    pub fn downswing_ms(&self) -> u32 {
        self.impact_ms.saturating_sub(self.downswing_start_ms)
    }

    /// Backswing-to-downswing ratio; 0 when the downswing duration is zero.
    pub fn tempo(&self) -> f64 {
        let down = self.downswing_ms();
        if down == 0 {
            return 0.0;
        }
        f64::from(self.backswing_ms()) / f64::from(down)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ShotType {
    #[default]
    Normal,
    Practice,
}

/// How the device arrived at the spin numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SpinCalculation {
    #[default]
    Unknown,
    Measured,
    Calculated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BallType {
    #[default]
    Unknown,
    Conventional,
    Premium,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swing_durations() {
        let swing = SwingMetrics {
            backswing_start_ms: 1000,
            downswing_start_ms: 1750,
            impact_ms: 2000,
        };
        assert_eq!(swing.backswing_ms(), 750);
        assert_eq!(swing.downswing_ms(), 250);
        assert!((swing.tempo() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn tempo_zero_downswing() {
        let swing = SwingMetrics {
            backswing_start_ms: 0,
            downswing_start_ms: 500,
            impact_ms: 500,
        };
        assert_eq!(swing.tempo(), 0.0);
    }

    #[test]
    fn deserialize_ball_only_shot() {
        let json = r#"{
            "shotId": 3,
            "ball": {
                "ballSpeed": 62.0,
                "launchAngle": 14.2,
                "launchDirection": -1.1,
                "totalSpin": 2800.0,
                "spinAxis": 4.5
            },
            "club": null,
            "swing": null
        }"#;
        let metrics: RawShotMetrics = serde_json::from_str(json).unwrap();
        assert_eq!(metrics.shot_id, 3);
        assert_eq!(metrics.shot_type, ShotType::Normal);
        assert!(metrics.ball.is_some());
        assert!(metrics.club.is_none());
        assert_eq!(
            metrics.ball.unwrap().spin_calculation,
            SpinCalculation::Unknown
        );
    }
}
