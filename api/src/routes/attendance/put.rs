//! # Attendance Correction Routes
//!
//! - `PUT /api/attendance/records/{record_id}`: Correct an existing record
//!
//! Corrections never rewrite history silently: the original capture
//! provenance survives and the record is flagged with who corrected it and
//! when.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use db::models::attendance_record::AttendanceStatus;
use db::recorder::{self, StaffActor};
use serde::Deserialize;
use util::state::AppState;
use validator::Validate;

use crate::auth::AuthUser;
use crate::response::ApiResponse;
use crate::routes::common::{
    AttendanceRecordResponse, format_validation_errors, record_error_response, with_timeout,
};

#[derive(Debug, Deserialize, Validate)]
pub struct CorrectRecordRequest {
    pub status: AttendanceStatus,
    #[validate(length(max = 500, message = "Notes may not exceed 500 characters"))]
    pub notes: Option<String>,
}

/// PUT /api/attendance/records/{record_id}
///
/// Applies a manual status correction. Only the session's assigned faculty
/// member or an admin may correct.
///
/// ### Request Body
/// ```json
/// {
///   "status": "excused",
///   "notes": "Medical certificate"
/// }
/// ```
///
/// ### Response: 200 OK
/// - JSON body with the corrected record
///
/// ### Errors
/// - 401 Unauthorized — missing or invalid token
/// - 403 Forbidden — caller may not correct this record
/// - 404 Not Found — no such record
/// - 422 Unprocessable Entity — body validation failure
/// - 503 Service Unavailable — operation deadline expired
pub async fn correct_record(
    State(state): State<AppState>,
    user: AuthUser,
    Path(record_id): Path<i64>,
    Json(req): Json<CorrectRecordRequest>,
) -> impl IntoResponse {
    if !user.is_staff() {
        return (
            StatusCode::FORBIDDEN,
            Json(ApiResponse::<()>::error("Staff access required")),
        )
            .into_response();
    }

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

    let correcting_actor = StaffActor {
        id: user.0.sub,
        kind: user.0.role,
    };

    let outcome = match with_timeout(recorder::correct_record(
        state.db(),
        record_id,
        req.status,
        req.notes,
        correcting_actor,
    ))
    .await
    {
        Ok(outcome) => outcome,
        Err(resp) => return resp,
    };

    match outcome {
        Ok(record) => (
            StatusCode::OK,
            Json(ApiResponse::<AttendanceRecordResponse>::success(
                record.into(),
                "Attendance record corrected",
            )),
        )
            .into_response(),
        Err(err) => record_error_response(err),
    }
}
