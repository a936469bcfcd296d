use axum::{
    Json,
    extract::{ConnectInfo, Multipart, Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::Serialize;
use std::net::SocketAddr;
use tracing::{error, info, warn};
use util::config;

use db::models::user;
use services::attempts::{AttemptOutcome, MAX_ATTEMPTS};
use services::attendance::{self, AttendanceError, PresenceDetails};
use services::eligibility::{Decision, GateInput, RejectReason, decide};
use services::geofence::GeofenceOutcome;
use services::subnet::ip_in_subnet;

use crate::auth::AuthUser;
use crate::response::ApiResponse;
use crate::routes::attendance::common::{RecordResponse, load_session_context};
use crate::routes::common::client_ip;
use crate::services::email::EmailService;
use crate::services::storage;
use crate::state::AppState;

/// Fields collected from the presence submission form.
struct PresentForm {
    latitude: f64,
    longitude: f64,
    use_campus_wifi: bool,
    face: Vec<u8>,
    room: Option<Vec<u8>>,
}

async fn read_present_form(mut multipart: Multipart) -> Result<PresentForm, String> {
    let mut latitude = None;
    let mut longitude = None;
    let mut use_campus_wifi = false;
    let mut face = None;
    let mut room = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| "Form presensi tidak valid".to_owned())?
    {
        match field.name().unwrap_or_default() {
            "latitude" => {
                let text = field
                    .text()
                    .await
                    .map_err(|_| "Koordinat tidak valid".to_owned())?;
                latitude = Some(
                    text.trim()
                        .parse::<f64>()
                        .map_err(|_| "Koordinat tidak valid".to_owned())?,
                );
            }
            "longitude" => {
                let text = field
                    .text()
                    .await
                    .map_err(|_| "Koordinat tidak valid".to_owned())?;
                longitude = Some(
                    text.trim()
                        .parse::<f64>()
                        .map_err(|_| "Koordinat tidak valid".to_owned())?,
                );
            }
            "use_campus_wifi" => {
                let text = field
                    .text()
                    .await
                    .map_err(|_| "Form presensi tidak valid".to_owned())?;
                use_campus_wifi = text.trim() == "true";
            }
            "face" => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|_| "Foto wajah tidak valid".to_owned())?;
                face = Some(bytes.to_vec());
            }
            "room" => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|_| "Foto ruangan tidak valid".to_owned())?;
                room = Some(bytes.to_vec());
            }
            _ => {}
        }
    }

    Ok(PresentForm {
        latitude: latitude.ok_or("Lokasi wajib disertakan".to_owned())?,
        longitude: longitude.ok_or("Lokasi wajib disertakan".to_owned())?,
        use_campus_wifi,
        face: face.ok_or("Foto wajah wajib disertakan".to_owned())?,
        room,
    })
}

/// Payload returned on a failed face match: how many attempts have been
/// used, and whether the submission flow should terminate.
#[derive(Debug, Serialize, Default)]
pub struct AttemptData {
    pub attempts: u8,
    pub max_attempts: u8,
    pub terminated: bool,
}

fn reject_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ApiResponse::<RecordResponse>::error(message.into())),
    )
        .into_response()
}

fn exhausted_response() -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(ApiResponse {
            success: false,
            data: AttemptData {
                attempts: MAX_ATTEMPTS,
                max_attempts: MAX_ATTEMPTS,
                terminated: true,
            },
            message: "Gagal mencocokkan wajah, kembali ke halaman presensi".to_owned(),
        }),
    )
        .into_response()
}

/// POST /api/courses/{course_name}/meetings/{meeting_id}/session/present
///
/// The presence submission. A multipart form carrying the student's
/// coordinates, the captured face photo, an optional room photo, and the
/// campus WiFi opt-in flag.
///
/// The checks run in a fixed order: duplicate record, session expiry,
/// exhausted attempts, location, then face match. A face mismatch consumes
/// one of five attempts; the other rejections consume none, and once the
/// ceiling is reached every further submission is refused outright. The
/// recognition service being unreachable is a `502` and also consumes no
/// attempt.
pub async fn mark_present(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path((course_name, meeting_id)): Path<(String, i64)>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Response {
    let ctx = match load_session_context(state.db(), &course_name, meeting_id).await {
        Ok(ctx) => ctx,
        Err((status, message)) => return reject_response(status, message),
    };

    let form = match read_present_form(multipart).await {
        Ok(form) => form,
        Err(message) => return reject_response(StatusCode::BAD_REQUEST, message),
    };

    let already_recorded =
        match db::models::attendance_record::Model::find_for_student(
            state.db(),
            &ctx.session.id,
            &claims.nim,
        )
        .await
        {
            Ok(existing) => existing.is_some(),
            Err(e) => {
                return reject_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Database error: {e}"),
                );
            }
        };

    let geofence = state.geofence().locate(form.latitude, form.longitude);

    // The subnet check only runs when the student opted in; a malformed
    // address simply fails the check instead of failing the request.
    let wifi_subnet_ok = form.use_campus_wifi
        && ip_in_subnet(
            &client_ip(&headers, addr),
            &config::campus_subnet(),
            config::campus_subnet_prefix(),
        )
        .unwrap_or(false);

    // Reject on the cheap signals before spending a round-trip on the
    // recognition service. The gate re-checks everything but the ceiling.
    if already_recorded {
        return reject_response(
            StatusCode::CONFLICT,
            RejectReason::AlreadyRecorded.to_string(),
        );
    }
    if ctx.session.is_expired(Utc::now()) {
        return reject_response(StatusCode::BAD_REQUEST, RejectReason::Expired.to_string());
    }
    // A terminated flow stays terminated: once the fifth match has failed,
    // further captures are discarded without reaching the recognizer.
    if state.attempts().attempts(&ctx.session.id, &claims.nim) >= MAX_ATTEMPTS {
        return exhausted_response();
    }
    let wifi_ok = form.use_campus_wifi && wifi_subnet_ok;
    if !wifi_ok
        && !matches!(
            geofence,
            GeofenceOutcome::Zone(_) | GeofenceOutcome::OverrideAllowed
        )
    {
        return reject_response(StatusCode::BAD_REQUEST, RejectReason::OutOfArea.to_string());
    }

    let face_match = match state.face().recognize(&claims.nim, form.face.clone()).await {
        Ok(face_match) => face_match,
        Err(e) => {
            error!(error = %e, nim = %claims.nim, "Face recognition service unreachable");
            return reject_response(
                StatusCode::BAD_GATEWAY,
                "Layanan pengenalan wajah tidak dapat dihubungi",
            );
        }
    };

    let decision = decide(&GateInput {
        already_recorded,
        session_expired: ctx.session.is_expired(Utc::now()),
        geofence,
        wifi_opt_in: form.use_campus_wifi,
        wifi_subnet_ok,
        face: &face_match,
        claimed_nim: &claims.nim,
    });

    let method = match decision {
        Decision::Accept { method } => method,
        Decision::Reject(reason) => {
            return match reason {
                RejectReason::AlreadyRecorded => {
                    reject_response(StatusCode::CONFLICT, reason.to_string())
                }
                RejectReason::Expired | RejectReason::OutOfArea => {
                    reject_response(StatusCode::BAD_REQUEST, reason.to_string())
                }
                RejectReason::FaceMismatch => {
                    match state.attempts().record_failure(&ctx.session.id, &claims.nim) {
                        AttemptOutcome::Retry(attempts) => (
                            StatusCode::UNPROCESSABLE_ENTITY,
                            Json(ApiResponse {
                                success: false,
                                data: AttemptData {
                                    attempts,
                                    max_attempts: MAX_ATTEMPTS,
                                    terminated: false,
                                },
                                message: format!(
                                    "Wajah tidak cocok dengan model. Percobaan {attempts}/{MAX_ATTEMPTS}"
                                ),
                            }),
                        )
                            .into_response(),
                        AttemptOutcome::Exhausted => exhausted_response(),
                    }
                }
            };
        }
    };

    // Evidence first, record second: a record must never point at a face
    // photo that was not stored.
    let meeting_label = ctx.meeting.label();
    let timestamp = Utc::now().timestamp_millis();
    let face_filename = format!("{timestamp}.jpg");

    if let Err(e) = storage::save_face_image(
        &ctx.course.name,
        &meeting_label,
        &claims.nim,
        &face_filename,
        &form.face,
    )
    .await
    {
        error!(error = %e, nim = %claims.nim, "Failed to store face evidence");
        return reject_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Gagal menyimpan bukti kehadiran",
        );
    }

    let room_filename = match form.room {
        Some(bytes) => {
            let filename = format!("{timestamp}.jpg");
            match storage::save_room_image(
                &ctx.course.name,
                &meeting_label,
                &claims.nim,
                &filename,
                &bytes,
            )
            .await
            {
                Ok(_) => Some(filename),
                Err(e) => {
                    warn!(error = %e, nim = %claims.nim, "Failed to store room evidence");
                    None
                }
            }
        }
        None => None,
    };

    let location = state
        .geocode()
        .reverse(form.latitude, form.longitude)
        .await
        .unwrap_or_else(|| "Lokasi tidak tersedia".to_owned());

    let record = match attendance::record_presence(
        state.db(),
        &ctx.session.id,
        &claims.nim,
        PresenceDetails {
            location: Some(location),
            face_filename: Some(face_filename),
            room_filename,
            method,
        },
    )
    .await
    {
        Ok(record) => record,
        Err(AttendanceError::AlreadyRecorded) => {
            return reject_response(StatusCode::CONFLICT, "Anda sudah melakukan presensi");
        }
        Err(AttendanceError::Database(e)) => {
            return reject_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Database error: {e}"),
            );
        }
    };

    state.attempts().clear(&ctx.session.id, &claims.nim);
    info!(
        nim = %claims.nim,
        session = %ctx.session.id,
        method = %method,
        "Presence recorded"
    );

    // Fire-and-forget: a failed notification never affects the response.
    let db = state.db().clone();
    let nim = claims.nim.clone();
    let course_name = ctx.course.name.clone();
    let session_date = ctx.session.date.clone();
    tokio::spawn(async move {
        let recipient = match user::Model::get_by_nim(&db, &nim).await {
            Ok(Some(found)) => found,
            _ => {
                warn!(nim = %nim, "Skipping notification, user lookup failed");
                return;
            }
        };
        if let Err(e) = EmailService::send_presence_email(
            &recipient.email,
            &recipient.name,
            &course_name,
            &meeting_label,
            &session_date,
        )
        .await
        {
            warn!(error = %e, nim = %nim, "Failed to send presence notification");
        }
    });

    (
        StatusCode::CREATED,
        Json(ApiResponse::success(
            RecordResponse::from(record),
            "Presensi berhasil dicatat",
        )),
    )
        .into_response()
}

/// POST /api/courses/{course_name}/meetings/{meeting_id}/session/absent
///
/// Records an explicit "tidak hadir" self-report. Deliberately not gated by
/// session expiry, so a student who missed the window can still report, but
/// an existing record is never overwritten.
pub async fn mark_absent(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path((course_name, meeting_id)): Path<(String, i64)>,
) -> Response {
    let ctx = match load_session_context(state.db(), &course_name, meeting_id).await {
        Ok(ctx) => ctx,
        Err((status, message)) => return reject_response(status, message),
    };

    match attendance::record_absence(state.db(), &ctx.session.id, &claims.nim).await {
        Ok(record) => (
            StatusCode::CREATED,
            Json(ApiResponse::success(
                RecordResponse::from(record),
                "Ketidakhadiran tercatat",
            )),
        )
            .into_response(),
        Err(AttendanceError::AlreadyRecorded) => {
            reject_response(StatusCode::CONFLICT, "Anda sudah melakukan presensi")
        }
        Err(AttendanceError::Database(e)) => reject_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Database error: {e}"),
        ),
    }
}
