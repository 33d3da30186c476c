//! Metric translation: raw device measurements → simulator shot records.
//!
//! Pure functions, no I/O, no state. Sections absent from the source metrics
//! stay absent in the output; the only place zero-defaults appear is the
//! human-readable [`summary`], which is never sent over the wire.

use crate::gsp::protocol::{BallData, ClubData};
use crate::metrics::{BallMetrics, ClubMetrics, RawShotMetrics};

/// m/s → mph conversion factor used for every speed-valued field.
pub const METERS_PER_S_TO_MILES_PER_HOUR: f64 = 2.2369;

/// feet → meters, for the tee-distance shot parameter.
pub const FEET_TO_METERS: f32 = 1.0 / 3.281;

/// A simulator-ready shot record derived from one [`RawShotMetrics`].
#[derive(Debug, Clone, PartialEq)]
pub struct TranslatedShot {
    pub shot_id: u32,
    pub ball: Option<BallData>,
    pub club: Option<ClubData>,
}

/// Translate one raw shot. Ball/club sections are present iff the device
/// reported them.
pub fn translate(metrics: &RawShotMetrics) -> TranslatedShot {
    TranslatedShot {
        shot_id: metrics.shot_id,
        ball: metrics.ball.as_ref().map(ball_data),
        club: metrics.club.as_ref().map(club_data),
    }
}

/// Ball section: unit conversion, sign flip on the spin axis, and spin
/// decomposition. The simulator's axis convention is the mirror of the
/// device's, so side/back spin are derived from the negated axis.
pub fn ball_data(ball: &BallMetrics) -> BallData {
    let axis_rad = (-ball.spin_axis).to_radians();
    BallData {
        hla: ball.launch_direction,
        vla: ball.launch_angle,
        speed: ball.ball_speed * METERS_PER_S_TO_MILES_PER_HOUR,
        spin_axis: -ball.spin_axis,
        total_spin: ball.total_spin,
        side_spin: ball.total_spin * axis_rad.sin(),
        back_spin: ball.total_spin * axis_rad.cos(),
    }
}

/// Club section. The device reports a single head speed; the simulator wants
/// it both pre-impact and at impact.
pub fn club_data(club: &ClubMetrics) -> ClubData {
    let speed = club.head_speed * METERS_PER_S_TO_MILES_PER_HOUR;
    ClubData {
        speed,
        speed_at_impact: speed,
        angle_of_attack: club.attack_angle,
        face_to_target: club.face_angle,
        path: club.path_angle,
    }
}

/// Multi-column shot summary for the log.
///
/// Display only: absent sections render as zeros here, which is why this
/// never feeds the wire path.
pub fn summary(metrics: &RawShotMetrics) -> String {
    let ball = metrics.ball.clone().unwrap_or(BallMetrics {
        ball_speed: 0.0,
        launch_angle: 0.0,
        launch_direction: 0.0,
        total_spin: 0.0,
        spin_axis: 0.0,
        spin_calculation: Default::default(),
        ball_type: Default::default(),
    });
    let club = metrics.club.clone().unwrap_or(ClubMetrics {
        head_speed: 0.0,
        attack_angle: 0.0,
        face_angle: 0.0,
        path_angle: 0.0,
    });
    let swing = metrics.swing.unwrap_or(crate::metrics::SwingMetrics {
        backswing_start_ms: 0,
        downswing_start_ms: 0,
        impact_ms: 0,
    });

    let mut s = String::new();
    s.push_str(&format!("===== Shot {} =====\n", metrics.shot_id));
    s.push_str(&format!(
        "{:<32}| {:<32}| {:<32}\n",
        "Ball", "Club", "Swing"
    ));
    s.push_str(&format!("{:-<32}+{:-<33}+{:-<33}\n", "", "", ""));
    s.push_str(&format!(
        " {:<14}{:>10.1} mph | {:<14}{:>10.1} mph | {:<20}{:>8} ms\n",
        "speed:",
        ball.ball_speed * METERS_PER_S_TO_MILES_PER_HOUR,
        "head speed:",
        club.head_speed * METERS_PER_S_TO_MILES_PER_HOUR,
        "backswing:",
        swing.backswing_ms(),
    ));
    s.push_str(&format!(
        " {:<14}{:>10.1} deg | {:<14}{:>10.1} deg | {:<20}{:>8} ms\n",
        "VLA:", ball.launch_angle, "path:", club.path_angle, "downswing:", swing.downswing_ms(),
    ));
    s.push_str(&format!(
        " {:<14}{:>10.1} deg | {:<14}{:>10.1} deg | {:<20}{:>8.2}\n",
        "HLA:",
        ball.launch_direction,
        "face:",
        club.face_angle,
        "tempo:",
        swing.tempo(),
    ));
    s.push_str(&format!(
        " {:<14}{:>10.1} deg | {:<14}{:>10.1} deg | {:<20}{:>8}\n",
        "spin axis:",
        -ball.spin_axis,
        "attack:",
        club.attack_angle,
        "type:",
        format!("{:?}", metrics.shot_type),
    ));
    s.push_str(&format!(
        " {:<14}{:>10.0} rpm | {:<14}{:>10} | {:<20}{:>8}\n",
        "total spin:",
        ball.total_spin,
        "ball:",
        format!("{:?}", ball.ball_type),
        "spin calc:",
        format!("{:?}", ball.spin_calculation),
    ));
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{BallType, ShotType, SpinCalculation, SwingMetrics};

    fn ball(spin_axis: f64, total_spin: f64) -> BallMetrics {
        BallMetrics {
            ball_speed: 67.0,
            launch_angle: 13.5,
            launch_direction: -2.0,
            total_spin,
            spin_axis,
            spin_calculation: SpinCalculation::Measured,
            ball_type: BallType::Conventional,
        }
    }

    fn club() -> ClubMetrics {
        ClubMetrics {
            head_speed: 45.0,
            attack_angle: -1.2,
            face_angle: 0.8,
            path_angle: 2.1,
        }
    }

    fn full_shot() -> RawShotMetrics {
        RawShotMetrics {
            shot_id: 12,
            shot_type: ShotType::Normal,
            ball: Some(ball(10.0, 5000.0)),
            club: Some(club()),
            swing: Some(SwingMetrics {
                backswing_start_ms: 100,
                downswing_start_ms: 850,
                impact_ms: 1100,
            }),
        }
    }

    #[test]
    fn both_sections_present_when_source_has_both() {
        let shot = translate(&full_shot());
        assert!(shot.ball.is_some());
        assert!(shot.club.is_some());
        assert_eq!(shot.shot_id, 12);
    }

    #[test]
    fn club_section_absent_when_source_lacks_club() {
        let mut metrics = full_shot();
        metrics.club = None;
        let shot = translate(&metrics);
        assert!(shot.ball.is_some());
        assert!(shot.club.is_none());
    }

    #[test]
    fn ball_section_absent_when_source_lacks_ball() {
        let mut metrics = full_shot();
        metrics.ball = None;
        assert!(translate(&metrics).ball.is_none());
    }

    #[test]
    fn spin_decomposition_preserves_magnitude() {
        for axis in [-45.0, -10.0, 0.0, 3.7, 30.0] {
            let b = ball_data(&ball(axis, 5000.0));
            let recomposed = (b.side_spin * b.side_spin + b.back_spin * b.back_spin).sqrt();
            assert!(
                (recomposed - 5000.0).abs() < 1e-6,
                "axis {axis}: {recomposed}"
            );
        }
    }

    #[test]
    fn spin_example_axis_10() {
        let b = ball_data(&ball(10.0, 5000.0));
        assert_eq!(b.spin_axis, -10.0);
        assert!((b.side_spin - -868.240_888).abs() < 1e-3);
        assert!((b.back_spin - 4_924.038_765).abs() < 1e-3);
    }

    #[test]
    fn speed_conversion_is_linear() {
        for mps in [-10.0, 0.0, 1.0, 62.5] {
            let mut b = ball(0.0, 0.0);
            b.ball_speed = mps;
            assert_eq!(ball_data(&b).speed, mps * 2.2369);
        }
        let mut c = club();
        c.head_speed = 45.0;
        let data = club_data(&c);
        assert_eq!(data.speed, 45.0 * 2.2369);
        assert_eq!(data.speed_at_impact, data.speed);
    }

    #[test]
    fn summary_tolerates_absent_sections() {
        let metrics = RawShotMetrics {
            shot_id: 1,
            shot_type: ShotType::Practice,
            ball: None,
            club: None,
            swing: None,
        };
        let text = summary(&metrics);
        assert!(text.contains("Shot 1"));
        assert!(text.contains("0.0 mph"));
    }
}
