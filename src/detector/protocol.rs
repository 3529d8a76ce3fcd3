//! Wire types for the camera detection backend.
//!
//! REST: `GET /camera/status`, `GET|POST /camera/calibration`,
//! `POST /camera/auto_calibration?enable=`, `POST /camera/detect`.
//! Streaming: `/camera/ws` pushes [`StreamMessage`] frames.
//!
//! The engine only consumes these. Detected darts reach the turn engine as
//! [`Throw`]s through [`ScoreResult::detected_throws`].

use serde::{Deserialize, Serialize};

use crate::games::x01::board::{validate_throw_value, Dart, InputError, Throw, BULLSEYE, OUTER_BULL};

/// `GET /camera/status`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraStatus {
    pub is_running: bool,
    pub camera_source: serde_json::Value,
    pub model_loaded: bool,
}

/// `GET /camera/calibration`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    pub center_x: i32,
    pub center_y: i32,
    pub radius: i32,
    #[serde(default)]
    pub auto_calibrate: bool,
}

/// `POST /camera/calibration` body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationUpdate {
    pub center_x: i32,
    pub center_y: i32,
    pub radius: i32,
}

/// `{status}` reply of the calibration endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusReply {
    pub status: String,
}

/// `POST /camera/detect` body: a base64 frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectRequest {
    pub image: String,
}

/// Board section as the backend reports it.
///
/// The backend encodes the inner bull as number 50 ×1, the outer bull as
/// 25 ×1 and a miss as 0 ×0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringSection {
    pub number: u32,
    pub multiplier: u32,
    pub label: String,
}

impl ScoringSection {
    pub fn value(&self) -> u32 {
        self.number.saturating_mul(self.multiplier)
    }

    pub fn miss() -> Self {
        Self { number: 0, multiplier: 0, label: "Miss".into() }
    }

    pub fn bull() -> Self {
        Self { number: BULLSEYE, multiplier: 1, label: "Bull".into() }
    }

    pub fn outer_bull() -> Self {
        Self { number: OUTER_BULL, multiplier: 1, label: "25".into() }
    }

    /// The board segment this section names.
    pub fn dart(&self) -> Result<Dart, InputError> {
        let invalid = || InputError::InvalidSegment {
            number: self.number.min(u8::MAX as u32) as u8,
            multiplier: self.multiplier.min(u8::MAX as u32) as u8,
        };
        match (self.number, self.multiplier) {
            (0, _) => Ok(Dart::MISS),
            (BULLSEYE, 1) => Ok(Dart::bull()),
            (n, m) if n <= 25 && m <= 3 => Dart::new(n as u8, m as u8).map_err(|_| invalid()),
            _ => Err(invalid()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DartThrow {
    pub section: ScoringSection,
    pub x: f64,
    pub y: f64,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    #[serde(default)]
    pub throws: Vec<DartThrow>,
    pub total_score: u32,
    #[serde(default)]
    pub image_width: u32,
    #[serde(default)]
    pub image_height: u32,
}

impl ScoreResult {
    /// The frame as engine input: one dart per detected section, or the
    /// total checked as a single throw value when no breakdown was sent.
    pub fn detected_throws(&self) -> Result<Vec<Throw>, InputError> {
        if self.throws.is_empty() {
            return validate_throw_value(self.total_score).map(|v| vec![Throw::Value(v)]);
        }
        self.throws
            .iter()
            .map(|t| t.section.dart().map(Throw::Dart))
            .collect()
    }
}

/// `POST /camera/detect` reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectResponse {
    pub score: ScoreResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// One `/camera/ws` frame. Any field may be absent.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StreamMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<ScoreResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub fn parse_stream_message(text: &str) -> Result<StreamMessage, String> {
    serde_json::from_str(text).map_err(|e| format!("Invalid stream message: {}", e))
}
