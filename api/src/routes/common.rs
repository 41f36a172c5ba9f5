//! Helpers shared by the route handlers: validation error formatting, the
//! operation timeout wrapper, and the record error to HTTP status mapping.

use axum::{Json, http::StatusCode, response::IntoResponse, response::Response};
use db::recorder::RecordError;
use serde::Serialize;
use std::future::Future;
use std::time::Duration;
use util::config;
use validator::ValidationErrors;

use crate::response::ApiResponse;

/// Collects all field-level validation messages into one string.
pub fn format_validation_errors(errors: &ValidationErrors) -> String {
    errors
        .field_errors()
        .values()
        .flat_map(|errs| {
            errs.iter()
                .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Serialized form of a ledger entry, timestamps as RFC 3339 strings.
#[derive(Debug, Serialize)]
pub struct AttendanceRecordResponse {
    pub id: i64,
    pub record_type: String,
    pub subject_actor_id: i64,
    pub schedule_id: i64,
    pub date: String,
    pub captured_at: String,
    pub status: String,
    pub recorded_by: String,
    pub device_id: Option<i64>,
    pub recording_actor_id: Option<i64>,
    pub notes: Option<String>,
    pub is_manual_correction: bool,
    pub corrected_by: Option<i64>,
    pub corrected_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<db::models::attendance_record::Model> for AttendanceRecordResponse {
    fn from(record: db::models::attendance_record::Model) -> Self {
        Self {
            id: record.id,
            record_type: record.record_type.to_string(),
            subject_actor_id: record.subject_actor_id,
            schedule_id: record.schedule_id,
            date: record.date.to_string(),
            captured_at: record.captured_at.to_rfc3339(),
            status: record.status.to_string(),
            recorded_by: record.recorded_by.to_string(),
            device_id: record.device_id,
            recording_actor_id: record.recording_actor_id,
            notes: record.notes,
            is_manual_correction: record.is_manual_correction,
            corrected_by: record.corrected_by,
            corrected_at: record.corrected_at.map(|t| t.to_rfc3339()),
            created_at: record.created_at.to_rfc3339(),
            updated_at: record.updated_at.to_rfc3339(),
        }
    }
}

/// Runs a core operation under the configured deadline.
///
/// An expired deadline yields a `503` with the `timeout` kind; nothing
/// partial is ever returned. Recording retries after a timeout are safe
/// because the ledger's unique key makes the write idempotent per day.
pub async fn with_timeout<F, T>(fut: F) -> Result<T, Response>
where
    F: Future<Output = T>,
{
    let deadline = Duration::from_millis(config::operation_timeout_ms());
    match tokio::time::timeout(deadline, fut).await {
        Ok(value) => Ok(value),
        Err(_) => Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ApiResponse::<()>::error_kind(
                "timeout",
                "Operation timed out, please retry",
            )),
        )
            .into_response()),
    }
}

/// Maps a recorder failure onto the HTTP error contract.
///
/// Database failures are logged with context and surfaced as an opaque
/// internal error; everything else carries its stable kind.
pub fn record_error_response(err: RecordError) -> Response {
    let status = match &err {
        RecordError::SessionNotFound | RecordError::RecordNotFound => StatusCode::NOT_FOUND,
        RecordError::SessionInactive | RecordError::DuplicateAttendance => StatusCode::CONFLICT,
        RecordError::NotEnrolled | RecordError::NotAuthorizedForSession => StatusCode::FORBIDDEN,
        RecordError::FutureCapture => StatusCode::BAD_REQUEST,
        RecordError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        RecordError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let message = match &err {
        RecordError::Db(e) => {
            tracing::error!(error = %e, "attendance operation failed");
            "An internal error occurred".to_string()
        }
        other => other.to_string(),
    };

    (
        status,
        Json(ApiResponse::<()>::error_kind(err.kind(), message)),
    )
        .into_response()
}

/// The single device rejection response. All device authentication failures
/// collapse to this so a caller cannot probe which gate failed.
pub fn device_rejected_response() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ApiResponse::<()>::error("Device rejected")),
    )
        .into_response()
}
