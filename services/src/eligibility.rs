//! The eligibility gate: combines location, expiry, prior-submission, and
//! face-match signals into a single accept/reject decision.
//!
//! The gate is pure; persisting an accepted decision is the recorder's job.
//! The explicit "tidak hadir" self-report does not pass through here at all:
//! it is a direct record write that stays allowed even after expiry.

use crate::geofence::GeofenceOutcome;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minimum face-match confidence, in percent.
pub const FACE_CONFIDENCE_THRESHOLD: f64 = 70.0;

/// Result returned by the external face-recognition service.
///
/// Treated as untrusted: the gate re-validates the predicted label against
/// the claimed NIM and applies its own confidence threshold instead of
/// trusting the service's `match` flag alone.
#[derive(Debug, Clone, Deserialize)]
pub struct FaceMatch {
    pub predicted_label: Option<String>,
    /// Confidence as a 0..1 fraction.
    pub confidence: f64,
    #[serde(rename = "match")]
    pub matched: bool,
}

/// Method label recorded with an accepted presence submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PresenceMethod {
    Direct,
    CampusWifi,
    Geolocation,
}

impl PresenceMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PresenceMethod::Direct => "direct",
            PresenceMethod::CampusWifi => "campus WiFi",
            PresenceMethod::Geolocation => "geolocation",
        }
    }
}

impl std::fmt::Display for PresenceMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the gate needs to decide one presence submission.
#[derive(Debug, Clone)]
pub struct GateInput<'a> {
    /// A record already exists for this student in this session.
    pub already_recorded: bool,
    /// The session's validity window has passed.
    pub session_expired: bool,
    /// Geofence outcome for the capture-time coordinate.
    pub geofence: GeofenceOutcome,
    /// The student explicitly chose the campus-WiFi path.
    pub wifi_opt_in: bool,
    /// The client's public address passed the campus subnet check.
    pub wifi_subnet_ok: bool,
    /// External recognizer output.
    pub face: &'a FaceMatch,
    /// The acting student's own identifier.
    pub claimed_nim: &'a str,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    Accept { method: PresenceMethod },
    Reject(RejectReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RejectReason {
    #[error("Anda sudah melakukan presensi")]
    AlreadyRecorded,
    #[error("Tidak bisa presensi. Waktu telah habis")]
    Expired,
    #[error("Anda tidak berada di area kampus")]
    OutOfArea,
    #[error("Wajah tidak cocok dengan model")]
    FaceMismatch,
}

/// Applies the decision rules in order. A `FaceMismatch` rejection is the
/// only outcome that should consume a retry attempt.
pub fn decide(input: &GateInput) -> Decision {
    // 1. Never overwrite an existing record.
    if input.already_recorded {
        return Decision::Reject(RejectReason::AlreadyRecorded);
    }

    // 2. Presence submissions are blocked once the window has passed.
    if input.session_expired {
        return Decision::Reject(RejectReason::Expired);
    }

    // 3. One positive location signal is required: a zone match, a passed
    //    subnet check the student opted into, or the allow-all override.
    let wifi_ok = input.wifi_opt_in && input.wifi_subnet_ok;
    let location_ok = wifi_ok
        || matches!(
            input.geofence,
            GeofenceOutcome::Zone(_) | GeofenceOutcome::OverrideAllowed
        );
    if !location_ok {
        return Decision::Reject(RejectReason::OutOfArea);
    }

    // 4. Face outcome: all three conditions must hold.
    let label_ok = input.face.predicted_label.as_deref() == Some(input.claimed_nim);
    let confident = input.face.confidence * 100.0 >= FACE_CONFIDENCE_THRESHOLD;
    if !(input.face.matched && label_ok && confident) {
        return Decision::Reject(RejectReason::FaceMismatch);
    }

    // 5. Method label by priority: campus WiFi > geolocation > direct.
    let method = if wifi_ok {
        PresenceMethod::CampusWifi
    } else if matches!(input.geofence, GeofenceOutcome::Zone(_)) {
        PresenceMethod::Geolocation
    } else {
        PresenceMethod::Direct
    };

    Decision::Accept { method }
}
