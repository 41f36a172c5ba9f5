//! # Attendance Capture Routes
//!
//! - `POST /api/attendance/records`: Write one attendance record
//!
//! Two caller populations share this endpoint. NFC readers authenticate with
//! `device_id` + `api_key` in the body and identify the subject by `card_id`;
//! a scan always records "present". Staff callers present a bearer token and
//! name the subject by kind and id, optionally with an explicit status.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::{DateTime, Utc};
use db::models::{
    actor::{Actor, ActorKind},
    attendance_record::AttendanceStatus,
    nfc_device::{self, DeviceAuthError},
};
use db::recorder::{self, RecordAttendance, RecordingActor, StaffActor};
use serde::Deserialize;
use util::{config, notifier::AttendanceEvent, state::AppState};
use validator::Validate;

use crate::auth::extractors::OptionalAuthUser;
use crate::response::ApiResponse;
use crate::routes::common::{
    AttendanceRecordResponse, device_rejected_response, format_validation_errors,
    record_error_response, with_timeout,
};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateRecordRequest {
    // Device credential path
    pub device_id: Option<String>,
    pub api_key: Option<String>,
    pub card_id: Option<String>,

    // Staff path
    pub subject_actor_kind: Option<ActorKind>,
    pub subject_actor_id: Option<i64>,

    pub schedule_id: i64,
    /// Staff may backfill an earlier instant; device scans always use the
    /// server clock.
    pub captured_at: Option<DateTime<Utc>>,
    pub status: Option<AttendanceStatus>,
    #[validate(length(max = 500, message = "Notes may not exceed 500 characters"))]
    pub notes: Option<String>,
}

/// POST /api/attendance/records
///
/// Records attendance for a session.
///
/// ### Request Body (device)
/// ```json
/// {
///   "device_id": "NFC-001",
///   "api_key": "…",
///   "card_id": "CARD-S-123",
///   "schedule_id": 42
/// }
/// ```
///
/// ### Request Body (staff, bearer token)
/// ```json
/// {
///   "subject_actor_kind": "student",
///   "subject_actor_id": 7,
///   "schedule_id": 42,
///   "status": "late",
///   "notes": "Arrived 20 minutes in"
/// }
/// ```
///
/// ### Response: 201 Created
/// - JSON body with the full attendance record
///
/// ### Errors
/// - 400 Bad Request — capture instant lies in the future
/// - 401 Unauthorized — device rejected, or missing/invalid staff token
/// - 403 Forbidden — subject not enrolled or not authorized for the session
/// - 404 Not Found — unknown session, card, or subject actor
/// - 409 Conflict — session inactive, or attendance already recorded today
/// - 422 Unprocessable Entity — body validation failure
/// - 503 Service Unavailable — operation deadline expired; safe to retry
pub async fn create_record(
    State(state): State<AppState>,
    user: OptionalAuthUser,
    Json(req): Json<CreateRecordRequest>,
) -> impl IntoResponse {
    if let Err(e) = req.validate() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ApiResponse::<()>::error_kind(
                "validation_error",
                format_validation_errors(&e),
            )),
        )
            .into_response();
    }

    let now = Utc::now();
    let tz_offset_minutes = config::timezone_offset_minutes();

    // Device path takes precedence when credentials are present in the body.
    let (device, subject, staff) = if let (Some(device_id), Some(api_key)) =
        (req.device_id.as_deref(), req.api_key.as_deref())
    {
        let auth = with_timeout(nfc_device::Model::authenticate(
            state.db(),
            device_id,
            api_key,
            now,
        ))
        .await;
        let device = match auth {
            Ok(Ok(device)) => device,
            Ok(Err(DeviceAuthError::Db(e))) => {
                tracing::error!(error = %e, "device authentication failed");
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ApiResponse::<()>::error_kind(
                        "internal_error",
                        "An internal error occurred",
                    )),
                )
                    .into_response();
            }
            Ok(Err(_)) => return device_rejected_response(),
            Err(resp) => return resp,
        };

        let Some(card_id) = req.card_id.as_deref() else {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ApiResponse::<()>::error_kind(
                    "validation_error",
                    "card_id is required for device captures",
                )),
            )
                .into_response();
        };
        let subject = match Actor::find_by_card(state.db(), card_id).await {
            Ok(Some(actor)) => actor,
            Ok(None) => {
                return (
                    StatusCode::NOT_FOUND,
                    Json(ApiResponse::<()>::error("Card not recognized")),
                )
                    .into_response();
            }
            Err(e) => {
                tracing::error!(error = %e, "card lookup failed");
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ApiResponse::<()>::error_kind(
                        "internal_error",
                        "An internal error occurred",
                    )),
                )
                    .into_response();
            }
        };
        (Some(device), subject, None)
    } else {
        let Some(user) = user.0 else {
            return (
                StatusCode::UNAUTHORIZED,
                Json(ApiResponse::<()>::error("Authentication required")),
            )
                .into_response();
        };
        if !user.is_staff() {
            return (
                StatusCode::FORBIDDEN,
                Json(ApiResponse::<()>::error("Staff access required")),
            )
                .into_response();
        }

        let (Some(kind), Some(subject_id)) = (req.subject_actor_kind, req.subject_actor_id) else {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ApiResponse::<()>::error_kind(
                    "validation_error",
                    "subject_actor_kind and subject_actor_id are required for staff captures",
                )),
            )
                .into_response();
        };
        let subject = match Actor::find(state.db(), kind, subject_id).await {
            Ok(Some(actor)) => actor,
            Ok(None) => {
                return (
                    StatusCode::NOT_FOUND,
                    Json(ApiResponse::<()>::error("Subject actor not found")),
                )
                    .into_response();
            }
            Err(e) => {
                tracing::error!(error = %e, "subject actor lookup failed");
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ApiResponse::<()>::error_kind(
                        "internal_error",
                        "An internal error occurred",
                    )),
                )
                    .into_response();
            }
        };
        let staff = StaffActor {
            id: user.0.sub,
            kind: user.0.role,
        };
        (None, subject, Some(staff))
    };

    let (actor, captured_at, status) = match (&device, staff) {
        (Some(device), _) => (RecordingActor::Device(device), now, None),
        (None, Some(staff)) => (
            RecordingActor::Staff(staff),
            req.captured_at.unwrap_or(now),
            req.status,
        ),
        // Unreachable: the staff branch always yields a staff actor.
        (None, None) => {
            return (
                StatusCode::UNAUTHORIZED,
                Json(ApiResponse::<()>::error("Authentication required")),
            )
                .into_response();
        }
    };

    let outcome = match with_timeout(recorder::record_attendance(
        state.db(),
        RecordAttendance {
            actor,
            subject_actor: &subject,
            schedule_id: req.schedule_id,
            captured_at,
            status,
            notes: req.notes.clone(),
            tz_offset_minutes,
        },
    ))
    .await
    {
        Ok(outcome) => outcome,
        Err(resp) => return resp,
    };

    match outcome {
        Ok(record) => {
            state.notifier().notify(AttendanceEvent {
                record_id: record.id,
                record_type: record.record_type.to_string(),
                subject_actor_id: record.subject_actor_id,
                schedule_id: record.schedule_id,
                status: record.status.to_string(),
                recorded_by: record.recorded_by.to_string(),
                captured_at: record.captured_at,
            });
            (
                StatusCode::CREATED,
                Json(ApiResponse::<AttendanceRecordResponse>::success(
                    record.into(),
                    "Attendance recorded",
                )),
            )
                .into_response()
        }
        Err(err) => record_error_response(err),
    }
}
