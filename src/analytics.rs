//! Fire-and-forget shot mirror to the analytics endpoint.
//!
//! Outcomes are logged and never propagate: a failed POST must not be able
//! to touch the primary shot pipeline. The HTTP client is injected and
//! shared for the process lifetime (it is read, never reconfigured, per
//! request).

use serde::Serialize;
use tracing::{error, info};

use crate::metrics::RawShotMetrics;
use crate::translate::METERS_PER_S_TO_MILES_PER_HOUR;

/// Fixed ingestion endpoint.
pub const SHOT_ENDPOINT: &str = "https://dev-api-app.fairwaytec.com/api/shots/create/";

/// Handle to the analytics endpoint. Cheap to clone.
#[derive(Clone)]
pub struct AnalyticsSink {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    csrf_token: String,
}

/// One shot report. Field names match the ingestion schema verbatim, hence
/// the spaced serde renames.
#[derive(Debug, Serialize)]
pub struct ShotReport {
    pub sensor_data: SensorData,
    pub club: String,
}

#[derive(Debug, Serialize)]
pub struct SensorData {
    #[serde(rename = "Club Face")]
    pub club_face: f64,
    #[serde(rename = "HLA")]
    pub hla: f64,
    #[serde(rename = "Sidespin")]
    pub sidespin: f64,
    #[serde(rename = "Smash Factor")]
    pub smash_factor: f64,
    #[serde(rename = "VLA")]
    pub vla: f64,
    #[serde(rename = "Attack Angle")]
    pub attack_angle: f64,
    #[serde(rename = "Ball Speed")]
    pub ball_speed: f64,
    #[serde(rename = "Face to Path")]
    pub face_to_path: f64,
    #[serde(rename = "Club Speed")]
    pub club_speed: f64,
    #[serde(rename = "Spin Axis")]
    pub spin_axis: f64,
    #[serde(rename = "Backspin")]
    pub backspin: f64,
}

impl ShotReport {
    /// Build a report from raw metrics. Absent sections default to zero here
    /// (the schema has no notion of a missing section), and the spin
    /// decomposition uses the device's own axis sign, unlike the simulator
    /// wire path.
    pub fn from_metrics(metrics: &RawShotMetrics, club: &str) -> Self {
        let ball = metrics.ball.as_ref();
        let club_metrics = metrics.club.as_ref();

        let total_spin = ball.map_or(0.0, |b| b.total_spin);
        let axis_rad = ball.map_or(0.0, |b| b.spin_axis).to_radians();
        let ball_speed = ball.map_or(0.0, |b| b.ball_speed);
        let head_speed = club_metrics.map_or(0.0, |c| c.head_speed);
        let smash_factor = if head_speed > 0.0 {
            ball_speed / head_speed
        } else {
            0.0
        };

        Self {
            sensor_data: SensorData {
                club_face: club_metrics.map_or(0.0, |c| c.face_angle),
                hla: ball.map_or(0.0, |b| b.launch_direction),
                sidespin: total_spin * axis_rad.sin(),
                smash_factor,
                vla: ball.map_or(0.0, |b| b.launch_angle),
                attack_angle: club_metrics.map_or(0.0, |c| c.attack_angle),
                ball_speed: ball_speed * METERS_PER_S_TO_MILES_PER_HOUR,
                face_to_path: club_metrics.map_or(0.0, |c| c.face_angle - c.path_angle),
                club_speed: head_speed * METERS_PER_S_TO_MILES_PER_HOUR,
                spin_axis: ball.map_or(0.0, |b| b.spin_axis),
                backspin: total_spin * axis_rad.cos(),
            },
            club: club.to_string(),
        }
    }
}

impl AnalyticsSink {
    /// `client` is the process-wide shared HTTP transport.
    pub fn new(client: reqwest::Client, api_key: String, csrf_token: String) -> Self {
        Self {
            client,
            endpoint: SHOT_ENDPOINT.to_string(),
            api_key,
            csrf_token,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_endpoint(
        client: reqwest::Client,
        endpoint: String,
        api_key: String,
        csrf_token: String,
    ) -> Self {
        Self {
            client,
            endpoint,
            api_key,
            csrf_token,
        }
    }

    /// POST one report. Any 2xx is success; everything else is logged and
    /// forgotten.
    pub async fn post_shot(&self, shot_id: u32, report: &ShotReport) {
        let result = self
            .client
            .post(&self.endpoint)
            .header("Accept", "application/json")
            .header("X-API-Key", &self.api_key)
            .header("X-CSRFTOKEN", &self.csrf_token)
            .json(report)
            .send()
            .await;
        match result {
            Ok(resp) if resp.status().is_success() => {
                info!(target: "analytics", "posted shot #{shot_id}: {}", resp.status());
            }
            Ok(resp) => {
                let status = resp.status();
                let body = resp.text().await.unwrap_or_default();
                error!(target: "analytics", "POST failed {status}: {body}");
            }
            Err(e) => error!(target: "analytics", "error posting shot: {e}"),
        }
    }
}
